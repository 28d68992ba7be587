//! Internet gateways

use crate::context::TeardownContext;
use crate::error::ProviderError;
use crate::policy::ErrorPolicy;
use crate::provider::{NetworkProvider, ProviderResult};
use crate::report::StepReport;
use crate::teardown::Step;
use futures_util::future::try_join_all;

/// Detach each gateway from the network, then delete it
pub async fn reap(provider: &dyn NetworkProvider, ctx: &TeardownContext) -> ProviderResult<StepReport> {
    tracing::trace!("Start deleting internet gateways");
    let gateways = provider.describe_internet_gateways(&ctx.vpc_id).await?;
    let ids: Vec<String> = gateways.iter().map(|g| g.id.clone()).collect();
    tracing::trace!(?ids, "Internet gateways");

    let detach = &ctx.policy(ErrorPolicy::internet_gateway_detach());
    let delete = &ctx.policy(ErrorPolicy::internet_gateway_delete());
    try_join_all(ids.iter().map(|id| async move {
        ctx.mutate("detach_internet_gateway", id, detach, || {
            provider.detach_internet_gateway(id, &ctx.vpc_id)
        })
        .await?;
        ctx.mutate("delete_internet_gateway", id, delete, || {
            provider.delete_internet_gateway(id)
        })
        .await?;
        Ok::<_, ProviderError>(())
    }))
    .await?;

    tracing::trace!(dry_run = ctx.dry_run, "Internet gateways deleted");
    Ok(StepReport::new(Step::InternetGateways, gateways.len(), ids))
}
