//! NAT gateways

use crate::context::TeardownContext;
use crate::policy::ErrorPolicy;
use crate::provider::{NetworkProvider, ProviderResult};
use crate::report::StepReport;
use crate::teardown::Step;
use futures_util::future::try_join_all;

/// Delete every NAT gateway in the network.
///
/// The provider removes gateways asynchronously. There is no wait here;
/// the interface and subnet steps retry while the gateway's interface is
/// still around.
pub async fn reap(provider: &dyn NetworkProvider, ctx: &TeardownContext) -> ProviderResult<StepReport> {
    tracing::trace!("Start deleting NAT gateways");
    let gateways = provider.describe_nat_gateways(&ctx.vpc_id).await?;
    let ids: Vec<String> = gateways
        .iter()
        .filter(|g| !g.state.is_gone())
        .map(|g| g.id.clone())
        .collect();
    tracing::trace!(?ids, "NAT gateways");

    let policy = ctx.policy(ErrorPolicy::nat_gateway_delete());
    try_join_all(ids.iter().map(|id| {
        ctx.mutate("delete_nat_gateway", id, &policy, || {
            provider.delete_nat_gateway(id)
        })
    }))
    .await?;

    Ok(StepReport::new(Step::NatGateways, gateways.len(), ids))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::TeardownSettings;
    use crate::testing::{FakeProvider, FakeState};

    #[tokio::test]
    async fn test_deleted_gateways_are_not_deleted_again() {
        let provider = FakeProvider::with_state(
            FakeState::new()
                .vpc("vpc-1")
                .nat_gateway("vpc-1", "nat-1")
                .nat_gateway("vpc-1", "nat-2"),
        );
        let ctx = TeardownContext::new("vpc-1", false, TeardownSettings::immediate());

        let first = reap(&provider, &ctx).await.unwrap();
        let second = reap(&provider, &ctx).await.unwrap();

        assert_eq!(first.targeted.len(), 2);
        assert_eq!(second.discovered, 2);
        assert!(second.targeted.is_empty());
        assert_eq!(provider.count("delete_nat_gateway"), 2);
    }
}
