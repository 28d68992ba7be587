//! The network itself

use crate::context::TeardownContext;
use crate::policy::ErrorPolicy;
use crate::provider::{NetworkProvider, ProviderResult};
use crate::report::StepReport;
use crate::teardown::Step;

pub async fn reap(provider: &dyn NetworkProvider, ctx: &TeardownContext) -> ProviderResult<StepReport> {
    tracing::trace!("Start deleting VPC");
    let policy = ctx.policy(ErrorPolicy::vpc_delete());
    let deleted = ctx
        .mutate("delete_vpc", &ctx.vpc_id, &policy, || {
            provider.delete_vpc(&ctx.vpc_id)
        })
        .await?;

    if deleted.is_none() && !ctx.dry_run {
        tracing::info!("VPC was already gone");
    }
    Ok(StepReport::new(Step::Vpc, 1, vec![ctx.vpc_id.clone()]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::ErrorCode;
    use crate::settings::TeardownSettings;
    use crate::testing::{FakeProvider, FakeState};

    #[tokio::test]
    async fn test_missing_vpc_is_allowed() {
        let provider = FakeProvider::new();
        let ctx = TeardownContext::new("vpc-1", false, TeardownSettings::immediate());

        reap(&provider, &ctx).await.unwrap();
        assert_eq!(provider.targets("delete_vpc"), vec!["vpc-1"]);
    }

    #[tokio::test]
    async fn test_remaining_dependents_abort() {
        let provider = FakeProvider::with_state(
            FakeState::new().vpc("vpc-1").subnet("vpc-1", "subnet-a"),
        );
        let ctx = TeardownContext::new("vpc-1", false, TeardownSettings::immediate());

        let err = reap(&provider, &ctx).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::DependencyViolation);
    }
}
