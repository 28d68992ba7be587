//! Subnets

use crate::context::TeardownContext;
use crate::policy::ErrorPolicy;
use crate::provider::{NetworkProvider, ProviderResult};
use crate::report::StepReport;
use crate::teardown::Step;
use futures_util::future::try_join_all;

/// Ids of the subnets currently in the network
pub async fn subnet_ids(provider: &dyn NetworkProvider, vpc_id: &str) -> ProviderResult<Vec<String>> {
    Ok(provider
        .describe_subnets(vpc_id)
        .await?
        .into_iter()
        .map(|s| s.id)
        .collect())
}

/// Delete every subnet, retrying while interfaces released by earlier steps
/// are still being cleaned up
pub async fn reap(provider: &dyn NetworkProvider, ctx: &TeardownContext) -> ProviderResult<StepReport> {
    tracing::trace!("Start deleting subnets");
    let ids = subnet_ids(provider, &ctx.vpc_id).await?;
    tracing::trace!(?ids, "Subnets");

    if ids.is_empty() {
        return Ok(StepReport::empty(Step::Subnets));
    }

    ctx.settle("subnet dependents detaching", ctx.settings.subnet_settle)
        .await;

    let policy = ctx.policy(ErrorPolicy::subnet_delete());
    try_join_all(ids.iter().map(|id| {
        tracing::trace!(subnet_id = %id, "Deleting subnet");
        ctx.mutate("delete_subnet", id, &policy, || provider.delete_subnet(id))
    }))
    .await?;

    Ok(StepReport::new(Step::Subnets, ids.len(), ids))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::ErrorCode;
    use crate::settings::TeardownSettings;
    use crate::testing::{FakeProvider, FakeState};
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_settles_then_retries_dependency_violation() {
        let provider = FakeProvider::with_state(
            FakeState::new()
                .vpc("vpc-1")
                .subnet("vpc-1", "subnet-a")
                .subnet("vpc-1", "subnet-b"),
        );
        provider.fail_times("delete_subnet", "subnet-a", ErrorCode::DependencyViolation, 2);
        let ctx = TeardownContext::new("vpc-1", false, TeardownSettings::default());

        let started = tokio::time::Instant::now();
        let report = reap(&provider, &ctx).await.unwrap();

        assert_eq!(report.targeted, vec!["subnet-a", "subnet-b"]);
        assert_eq!(provider.targets("delete_subnet").len(), 4);
        assert!(provider.state().subnets.is_empty());
        // 3s settle, then two 5s retry waits on subnet-a
        assert_eq!(started.elapsed(), Duration::from_secs(13));
    }

    #[tokio::test]
    async fn test_requeries_subnets() {
        let provider = FakeProvider::with_state(FakeState::new().vpc("vpc-1").subnet("vpc-1", "subnet-a"));
        let ctx = TeardownContext::new("vpc-1", false, TeardownSettings::immediate());

        reap(&provider, &ctx).await.unwrap();
        let report = reap(&provider, &ctx).await.unwrap();

        assert_eq!(provider.count("describe_subnets"), 2);
        assert_eq!(provider.count("delete_subnet"), 1);
        assert!(report.targeted.is_empty());
    }

    #[tokio::test]
    async fn test_unclassified_error_fails_the_step() {
        let provider = FakeProvider::with_state(FakeState::new().vpc("vpc-1").subnet("vpc-1", "subnet-a"));
        provider.fail_always("delete_subnet", "subnet-a", "InvalidSubnet.Busy");
        let ctx = TeardownContext::new("vpc-1", false, TeardownSettings::immediate());

        let err = reap(&provider, &ctx).await.unwrap_err();
        assert_eq!(err.code.as_str(), "InvalidSubnet.Busy");
    }
}
