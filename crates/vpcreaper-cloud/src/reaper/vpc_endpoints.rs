//! VPC endpoints

use crate::context::TeardownContext;
use crate::policy::ErrorPolicy;
use crate::provider::{NetworkProvider, ProviderResult};
use crate::report::StepReport;
use crate::teardown::Step;
use futures_util::future::try_join_all;

/// Delete endpoints one call per id, so one bad endpoint does not hide the
/// others' results
pub async fn reap(provider: &dyn NetworkProvider, ctx: &TeardownContext) -> ProviderResult<StepReport> {
    let endpoints = provider.describe_vpc_endpoints(&ctx.vpc_id).await?;
    let ids: Vec<String> = endpoints.iter().map(|e| e.id.clone()).collect();
    tracing::trace!(?ids, "VPC endpoints");

    let policy = ctx.policy(ErrorPolicy::vpc_endpoint_delete());
    try_join_all(ids.iter().map(|id| {
        ctx.mutate("delete_vpc_endpoints", id, &policy, || {
            provider.delete_vpc_endpoints(std::slice::from_ref(id))
        })
    }))
    .await?;

    tracing::trace!(dry_run = ctx.dry_run, "VPC endpoints deleted");
    Ok(StepReport::new(Step::VpcEndpoints, endpoints.len(), ids))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::TeardownSettings;
    use crate::testing::{FakeProvider, FakeState};

    #[tokio::test]
    async fn test_one_call_per_endpoint() {
        let provider = FakeProvider::with_state(
            FakeState::new()
                .vpc("vpc-1")
                .vpc_endpoint("vpc-1", "vpce-1")
                .vpc_endpoint("vpc-1", "vpce-2"),
        );
        let ctx = TeardownContext::new("vpc-1", false, TeardownSettings::immediate());

        reap(&provider, &ctx).await.unwrap();

        assert_eq!(provider.targets("delete_vpc_endpoints"), vec!["vpce-1", "vpce-2"]);
        assert!(provider.state().vpc_endpoints.is_empty());
    }
}
