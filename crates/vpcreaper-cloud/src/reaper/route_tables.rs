//! Route tables

use crate::context::TeardownContext;
use crate::policy::ErrorPolicy;
use crate::provider::{NetworkProvider, ProviderResult};
use crate::report::StepReport;
use crate::teardown::Step;
use futures_util::future::try_join_all;

/// Delete every route table. The main table refuses with a dependency
/// violation, which is expected: it goes away with the network.
pub async fn reap(provider: &dyn NetworkProvider, ctx: &TeardownContext) -> ProviderResult<StepReport> {
    let tables = provider.describe_route_tables(&ctx.vpc_id).await?;
    let ids: Vec<String> = tables.iter().map(|t| t.id.clone()).collect();
    tracing::trace!(?ids, "Route tables");

    let policy = ctx.policy(ErrorPolicy::route_table_delete());
    try_join_all(ids.iter().map(|id| {
        ctx.mutate("delete_route_table", id, &policy, || {
            provider.delete_route_table(id)
        })
    }))
    .await?;

    Ok(StepReport::new(Step::RouteTables, tables.len(), ids))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::TeardownSettings;
    use crate::testing::{FakeProvider, FakeState};

    #[tokio::test]
    async fn test_main_table_refusal_is_not_fatal() {
        let provider = FakeProvider::with_state(
            FakeState::new()
                .vpc("vpc-1")
                .route_table("vpc-1", "rtb-1")
                .route_table("vpc-1", "rtb-2"),
        );
        let ctx = TeardownContext::new("vpc-1", false, TeardownSettings::immediate());

        let report = reap(&provider, &ctx).await.unwrap();

        assert_eq!(report.targeted.len(), 3);
        assert_eq!(provider.count("delete_route_table"), 3);
        let remaining = provider.state().route_tables;
        assert_eq!(remaining.len(), 1);
        assert!(remaining[0].main);
    }
}
