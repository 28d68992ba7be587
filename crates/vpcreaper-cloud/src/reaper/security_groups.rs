//! Security groups
//!
//! Groups in a network can reference each other from their ingress rules, and
//! a referenced group cannot be deleted. Every ingress rule of every group is
//! revoked first, one group at a time and one rule at a time, which breaks
//! any reference cycle. Only then are the non-default groups deleted.

use crate::context::TeardownContext;
use crate::policy::ErrorPolicy;
use crate::provider::{NetworkProvider, ProviderResult};
use crate::report::StepReport;
use crate::resource::RevokeIngress;
use crate::teardown::Step;
use futures_util::future::try_join_all;

pub async fn reap(provider: &dyn NetworkProvider, ctx: &TeardownContext) -> ProviderResult<StepReport> {
    tracing::trace!("Start deleting security groups");
    let groups = provider.describe_security_groups(&ctx.vpc_id).await?;
    tracing::trace!(count = groups.len(), "Security groups");

    let revoke = ctx.policy(ErrorPolicy::ingress_revoke());
    for group in &groups {
        for rule in &group.ingress {
            let Some(request) = RevokeIngress::from_permission(&group.id, rule) else {
                tracing::trace!(group_id = %group.id, ?rule, "Nothing to revoke in rule");
                continue;
            };
            tracing::trace!(group_id = %group.id, ?request, "Revoking ingress rule");
            ctx.mutate("revoke_security_group_ingress", &group.id, &revoke, || {
                provider.revoke_security_group_ingress(&request)
            })
            .await?;
        }
    }

    let ids: Vec<String> = groups
        .iter()
        .filter(|g| !g.is_default())
        .map(|g| g.id.clone())
        .collect();
    tracing::trace!(?ids, "Security groups to delete");

    if ids.is_empty() {
        return Ok(StepReport::new(Step::SecurityGroups, groups.len(), ids));
    }

    ctx.settle("ingress revocation", ctx.settings.security_group_settle)
        .await;

    let delete = ctx.policy(ErrorPolicy::security_group_delete());
    try_join_all(ids.iter().map(|id| {
        ctx.mutate("delete_security_group", id, &delete, || {
            provider.delete_security_group(id)
        })
    }))
    .await?;

    Ok(StepReport::new(Step::SecurityGroups, groups.len(), ids))
}
