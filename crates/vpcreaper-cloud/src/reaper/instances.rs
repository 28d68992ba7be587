//! Compute instances

use super::unique_ids;
use crate::context::TeardownContext;
use crate::policy::ErrorPolicy;
use crate::provider::{NetworkProvider, ProviderResult};
use crate::report::StepReport;
use crate::resource::InstanceState;
use crate::teardown::Step;

/// Terminate every instance in the network with one batched call
pub async fn reap(provider: &dyn NetworkProvider, ctx: &TeardownContext) -> ProviderResult<StepReport> {
    tracing::trace!("Start terminating instances");
    let instances = provider.describe_instances(&ctx.vpc_id).await?;

    // Terminated instances stay visible for a while after termination
    let ids = unique_ids(
        instances
            .iter()
            .filter(|i| i.state != InstanceState::Terminated)
            .map(|i| i.id.as_str()),
    );
    tracing::trace!(?ids, "Instances");

    if ids.is_empty() {
        tracing::trace!("No instances to terminate");
        return Ok(StepReport::new(Step::Instances, instances.len(), ids));
    }

    let policy = ctx.policy(ErrorPolicy::new());
    ctx.mutate("terminate_instances", &ids.join(","), &policy, || {
        provider.terminate_instances(&ids)
    })
    .await?;

    Ok(StepReport::new(Step::Instances, instances.len(), ids))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::TeardownSettings;
    use crate::testing::{FakeProvider, FakeState};

    #[tokio::test]
    async fn test_terminates_in_one_batch() {
        let provider = FakeProvider::with_state(
            FakeState::new()
                .vpc("vpc-1")
                .instance("vpc-1", "i-1")
                .instance("vpc-1", "i-2")
                .instance("vpc-2", "i-3"),
        );
        let ctx = TeardownContext::new("vpc-1", false, TeardownSettings::immediate());

        let report = reap(&provider, &ctx).await.unwrap();

        assert_eq!(report.targeted, vec!["i-1", "i-2"]);
        assert_eq!(provider.targets("terminate_instances"), vec!["i-1,i-2"]);
        let state = provider.state();
        assert_eq!(state.instances[2].state, InstanceState::Running);
    }

    #[tokio::test]
    async fn test_terminated_instances_are_skipped() {
        let provider = FakeProvider::with_state(FakeState::new().vpc("vpc-1").instance("vpc-1", "i-1"));
        let ctx = TeardownContext::new("vpc-1", false, TeardownSettings::immediate());

        reap(&provider, &ctx).await.unwrap();
        let report = reap(&provider, &ctx).await.unwrap();

        assert_eq!(report.discovered, 1);
        assert!(report.targeted.is_empty());
        assert_eq!(provider.count("terminate_instances"), 1);
    }

    #[tokio::test]
    async fn test_dry_run_only_describes() {
        let provider = FakeProvider::with_state(FakeState::new().vpc("vpc-1").instance("vpc-1", "i-1"));
        let ctx = TeardownContext::new("vpc-1", true, TeardownSettings::immediate());

        let report = reap(&provider, &ctx).await.unwrap();

        assert_eq!(report.targeted, vec!["i-1"]);
        assert_eq!(provider.count("describe_instances"), 1);
        assert!(provider.mutations().is_empty());
    }
}
