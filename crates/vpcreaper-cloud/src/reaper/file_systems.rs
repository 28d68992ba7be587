//! Shared filesystems
//!
//! Filesystems are not scoped to a network; their mount targets are, through
//! the subnet each one lives in. The reaper lists every filesystem, collects
//! their mount targets, keeps the ones in this network's subnets, deletes
//! them, waits for the detachment to propagate and then deletes the
//! filesystems that had a mount target here.

use super::{subnets, unique_ids};
use crate::context::TeardownContext;
use crate::policy::ErrorPolicy;
use crate::provider::{NetworkProvider, ProviderResult};
use crate::report::StepReport;
use crate::teardown::Step;
use futures_util::future::try_join_all;

pub async fn reap(provider: &dyn NetworkProvider, ctx: &TeardownContext) -> ProviderResult<StepReport> {
    tracing::trace!("Start deleting shared filesystems");
    let file_systems = provider.describe_file_systems().await?;
    tracing::trace!(count = file_systems.len(), "Filesystems in account");

    let mut mount_targets = Vec::new();
    for file_system in &file_systems {
        mount_targets.extend(provider.describe_mount_targets(&file_system.id).await?);
    }

    let subnet_ids = subnets::subnet_ids(provider, &ctx.vpc_id).await?;
    let in_network: Vec<_> = mount_targets
        .iter()
        .filter(|mt| subnet_ids.contains(&mt.subnet_id))
        .collect();
    let file_system_ids = unique_ids(in_network.iter().map(|mt| mt.file_system_id.as_str()));
    tracing::trace!(
        mount_targets = in_network.len(),
        ?file_system_ids,
        "Mount targets in network"
    );

    let policy = ctx.policy(ErrorPolicy::mount_target_delete());
    try_join_all(in_network.iter().map(|mt| {
        ctx.mutate("delete_mount_target", &mt.id, &policy, || {
            provider.delete_mount_target(&mt.id)
        })
    }))
    .await?;

    if file_system_ids.is_empty() {
        return Ok(StepReport::empty(Step::FileSystems));
    }

    ctx.settle("mount targets detaching", ctx.settings.mount_target_settle)
        .await;

    let policy = ctx
        .policy(ErrorPolicy::file_system_delete())
        .max_retries(ctx.settings.file_system_retries);
    try_join_all(file_system_ids.iter().map(|id| {
        ctx.mutate("delete_file_system", id, &policy, || {
            provider.delete_file_system(id)
        })
    }))
    .await?;

    let mut targeted: Vec<String> = in_network.iter().map(|mt| mt.id.clone()).collect();
    let discovered = targeted.len() + file_system_ids.len();
    targeted.extend(file_system_ids);
    Ok(StepReport::new(Step::FileSystems, discovered, targeted))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::ErrorCode;
    use crate::settings::TeardownSettings;
    use crate::testing::{FakeProvider, FakeState};
    use std::time::Duration;

    fn state() -> FakeState {
        FakeState::new()
            .vpc("vpc-1")
            .vpc("vpc-2")
            .subnet("vpc-1", "subnet-a")
            .subnet("vpc-1", "subnet-b")
            .subnet("vpc-2", "subnet-x")
            .file_system("fs-1")
            .mount_target("fs-1", "subnet-a", "fsmt-a")
            .mount_target("fs-1", "subnet-b", "fsmt-b")
            .mount_target("fs-1", "subnet-x", "fsmt-x")
            .file_system("fs-2")
            .mount_target("fs-2", "subnet-x", "fsmt-y")
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_in_network_mount_targets_are_deleted() {
        let provider = FakeProvider::with_state(state());
        let ctx = TeardownContext::new("vpc-1", false, TeardownSettings::default());

        let started = tokio::time::Instant::now();
        let report = reap(&provider, &ctx).await.unwrap();

        let mut deleted = provider.targets("delete_mount_target");
        deleted.sort();
        assert_eq!(deleted, vec!["fsmt-a", "fsmt-b"]);

        // fs-1 still has a mount target in vpc-2, so every attempt reports it
        // in use until the budget of 10 runs out; fs-2 is never touched
        assert_eq!(provider.targets("delete_file_system"), vec!["fs-1"; 10]);
        assert_eq!(report.targeted, vec!["fsmt-a", "fsmt-b", "fs-1"]);

        // 3s settle + 9 retry waits of 5s
        assert_eq!(started.elapsed(), Duration::from_secs(48));
    }

    #[tokio::test]
    async fn test_filesystem_deleted_once_unmounted() {
        let provider = FakeProvider::with_state(
            FakeState::new()
                .vpc("vpc-1")
                .subnet("vpc-1", "subnet-a")
                .file_system("fs-1")
                .mount_target("fs-1", "subnet-a", "fsmt-a"),
        );
        provider.fail_times("delete_file_system", "fs-1", ErrorCode::FileSystemInUse, 2);
        let ctx = TeardownContext::new("vpc-1", false, TeardownSettings::immediate());

        reap(&provider, &ctx).await.unwrap();

        assert_eq!(provider.count("delete_file_system"), 3);
        let state = provider.state();
        assert!(state.file_systems.is_empty());
        assert!(state.mount_targets.is_empty());
    }

    #[tokio::test]
    async fn test_no_mount_targets_in_network() {
        let provider = FakeProvider::with_state(state());
        let ctx = TeardownContext::new("vpc-3", false, TeardownSettings::immediate());

        let report = reap(&provider, &ctx).await.unwrap();

        assert!(report.targeted.is_empty());
        assert!(provider.mutations().is_empty());
        assert_eq!(provider.count("describe_mount_targets"), 2);
    }
}
