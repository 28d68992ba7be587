//! Load balancers, modern and classic
//!
//! Neither API filters by network on the provider side, so both reapers list
//! every balancer in the account and keep the ones in this network.

use crate::context::TeardownContext;
use crate::policy::ErrorPolicy;
use crate::provider::{NetworkProvider, ProviderResult};
use crate::report::StepReport;
use crate::teardown::Step;
use futures_util::future::try_join_all;

pub async fn reap(provider: &dyn NetworkProvider, ctx: &TeardownContext) -> ProviderResult<StepReport> {
    tracing::trace!("Start deleting load balancers");
    let balancers: Vec<_> = provider
        .describe_load_balancers()
        .await?
        .into_iter()
        .filter(|lb| lb.vpc_id.as_deref() == Some(ctx.vpc_id.as_str()))
        .collect();
    tracing::trace!(count = balancers.len(), "Load balancers in network");

    let policy = ctx.policy(ErrorPolicy::load_balancer_delete());
    try_join_all(balancers.iter().map(|lb| {
        ctx.mutate("delete_load_balancer", &lb.name, &policy, || {
            provider.delete_load_balancer(&lb.arn)
        })
    }))
    .await?;

    let names = balancers.iter().map(|lb| lb.name.clone()).collect();
    Ok(StepReport::new(Step::LoadBalancers, balancers.len(), names))
}

pub async fn reap_classic(
    provider: &dyn NetworkProvider,
    ctx: &TeardownContext,
) -> ProviderResult<StepReport> {
    tracing::trace!("Start deleting classic load balancers");
    let balancers: Vec<_> = provider
        .describe_classic_load_balancers()
        .await?
        .into_iter()
        .filter(|lb| lb.vpc_id.as_deref() == Some(ctx.vpc_id.as_str()))
        .collect();
    tracing::trace!(count = balancers.len(), "Classic load balancers in network");

    let policy = ctx.policy(ErrorPolicy::load_balancer_delete());
    try_join_all(balancers.iter().map(|lb| {
        ctx.mutate("delete_classic_load_balancer", &lb.name, &policy, || {
            provider.delete_classic_load_balancer(&lb.name)
        })
    }))
    .await?;

    let names = balancers.iter().map(|lb| lb.name.clone()).collect();
    Ok(StepReport::new(Step::ClassicLoadBalancers, balancers.len(), names))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::TeardownSettings;
    use crate::testing::{FakeProvider, FakeState};

    fn provider() -> FakeProvider {
        FakeProvider::with_state(
            FakeState::new()
                .vpc("vpc-1")
                .load_balancer("vpc-1", "web")
                .load_balancer("vpc-2", "other-web")
                .classic_load_balancer("vpc-1", "legacy")
                .classic_load_balancer("vpc-2", "other-legacy"),
        )
    }

    #[tokio::test]
    async fn test_only_in_network_balancer_is_deleted() {
        let provider = provider();
        let ctx = TeardownContext::new("vpc-1", false, TeardownSettings::immediate());

        let report = reap(&provider, &ctx).await.unwrap();

        assert_eq!(report.discovered, 1);
        assert_eq!(
            provider.targets("delete_load_balancer"),
            vec!["arn:aws:elasticloadbalancing:loadbalancer/app/web"]
        );
        let remaining = provider.state().load_balancers;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].name, "other-web");
    }

    #[tokio::test]
    async fn test_classic_uses_name() {
        let provider = provider();
        let ctx = TeardownContext::new("vpc-1", false, TeardownSettings::immediate());

        let report = reap_classic(&provider, &ctx).await.unwrap();

        assert_eq!(report.targeted, vec!["legacy"]);
        assert_eq!(provider.targets("delete_classic_load_balancer"), vec!["legacy"]);
    }

    #[tokio::test]
    async fn test_dry_run_skips_delete() {
        let provider = provider();
        let ctx = TeardownContext::new("vpc-1", true, TeardownSettings::immediate());

        reap(&provider, &ctx).await.unwrap();
        reap_classic(&provider, &ctx).await.unwrap();

        assert_eq!(provider.count("describe_load_balancers"), 1);
        assert_eq!(provider.count("describe_classic_load_balancers"), 1);
        assert!(provider.mutations().is_empty());
    }
}
