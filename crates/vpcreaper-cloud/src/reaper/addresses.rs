//! Elastic addresses
//!
//! Off by default. Addresses are account-wide; the only thing tying one to a
//! network is the interface it is associated with, so this step has to run
//! before anything detaches those interfaces.

use crate::context::TeardownContext;
use crate::error::ProviderError;
use crate::policy::ErrorPolicy;
use crate::provider::{NetworkProvider, ProviderResult};
use crate::report::StepReport;
use crate::teardown::Step;
use futures_util::future::try_join_all;
use std::collections::HashSet;

/// Disassociate and release every address bound to an interface in the network
pub async fn reap(provider: &dyn NetworkProvider, ctx: &TeardownContext) -> ProviderResult<StepReport> {
    tracing::trace!("Start releasing addresses");
    let interfaces = provider.describe_network_interfaces(&ctx.vpc_id).await?;
    let interface_ids: HashSet<&str> = interfaces.iter().map(|n| n.id.as_str()).collect();

    let addresses = provider.describe_addresses().await?;
    let bound: Vec<_> = addresses
        .iter()
        .filter(|a| {
            a.network_interface_id
                .as_deref()
                .is_some_and(|id| interface_ids.contains(id))
        })
        .collect();
    tracing::trace!(count = bound.len(), "Addresses bound to the network");

    let disassociate = &ctx.policy(ErrorPolicy::address_disassociate());
    let release = &ctx.policy(ErrorPolicy::address_release());
    try_join_all(bound.iter().map(|address| async move {
        if let Some(association_id) = &address.association_id {
            ctx.mutate("disassociate_address", association_id, disassociate, || {
                provider.disassociate_address(association_id)
            })
            .await?;
        }
        ctx.mutate("release_address", &address.allocation_id, release, || {
            provider.release_address(&address.allocation_id)
        })
        .await?;
        Ok::<_, ProviderError>(())
    }))
    .await?;

    let ids = bound.iter().map(|a| a.allocation_id.clone()).collect();
    Ok(StepReport::new(Step::ReleaseAddresses, bound.len(), ids))
}
