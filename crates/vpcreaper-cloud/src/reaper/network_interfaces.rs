//! Network interfaces
//!
//! Two passes: force-detach every attached interface, then delete every
//! interface. Detaching something already detached, or an attachment the
//! provider refuses to touch, is fine.

use crate::context::TeardownContext;
use crate::policy::ErrorPolicy;
use crate::provider::{NetworkProvider, ProviderResult};
use crate::report::StepReport;
use crate::teardown::Step;
use futures_util::future::try_join_all;

pub async fn reap(provider: &dyn NetworkProvider, ctx: &TeardownContext) -> ProviderResult<StepReport> {
    tracing::trace!("Start deleting network interfaces");
    let interfaces = provider.describe_network_interfaces(&ctx.vpc_id).await?;
    let interface_ids: Vec<String> = interfaces.iter().map(|n| n.id.clone()).collect();
    let attachment_ids: Vec<String> = interfaces
        .iter()
        .filter_map(|n| n.attachment_id.clone())
        .collect();
    tracing::trace!(?interface_ids, ?attachment_ids, "Network interfaces");

    let detach = ctx.policy(ErrorPolicy::network_interface_detach());
    try_join_all(attachment_ids.iter().map(|id| {
        ctx.mutate("detach_network_interface", id, &detach, || {
            provider.detach_network_interface(id)
        })
    }))
    .await?;

    let delete = ctx.policy(ErrorPolicy::network_interface_delete());
    try_join_all(interface_ids.iter().map(|id| {
        ctx.mutate("delete_network_interface", id, &delete, || {
            provider.delete_network_interface(id)
        })
    }))
    .await?;

    Ok(StepReport::new(
        Step::NetworkInterfaces,
        interfaces.len(),
        interface_ids,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::ErrorCode;
    use crate::settings::TeardownSettings;
    use crate::testing::{FakeProvider, FakeState};

    fn provider() -> FakeProvider {
        FakeProvider::with_state(
            FakeState::new()
                .vpc("vpc-1")
                .subnet("vpc-1", "subnet-a")
                .network_interface("vpc-1", "subnet-a", "eni-1", Some("eni-attach-1"))
                .network_interface("vpc-1", "subnet-a", "eni-2", None),
        )
    }

    #[tokio::test]
    async fn test_detaches_before_deleting() {
        let provider = provider();
        let ctx = TeardownContext::new("vpc-1", false, TeardownSettings::immediate());

        let report = reap(&provider, &ctx).await.unwrap();

        assert_eq!(report.targeted, vec!["eni-1", "eni-2"]);
        assert_eq!(provider.targets("detach_network_interface"), vec!["eni-attach-1"]);
        assert!(
            provider.last_call("detach_network_interface")
                < provider.first_call("delete_network_interface")
        );
        assert!(provider.state().network_interfaces.is_empty());
    }

    #[tokio::test]
    async fn test_already_detached_and_already_gone_are_allowed() {
        let provider = provider();
        provider.fail_always(
            "detach_network_interface",
            "eni-attach-1",
            ErrorCode::InvalidAttachmentIdNotFound,
        );
        provider.fail_always(
            "delete_network_interface",
            "eni-2",
            ErrorCode::InvalidNetworkInterfaceIdNotFound,
        );
        let ctx = TeardownContext::new("vpc-1", false, TeardownSettings::immediate());

        // eni-1 stays attached, so its delete fails with an unclassified code
        let err = reap(&provider, &ctx).await.unwrap_err();
        assert_eq!(err.code.as_str(), "InvalidNetworkInterface.InUse");
        assert_eq!(provider.count("detach_network_interface"), 1);
    }

    #[tokio::test]
    async fn test_throttled_detach_is_retried() {
        let provider = provider();
        provider.fail_times(
            "detach_network_interface",
            "eni-attach-1",
            ErrorCode::RequestLimitExceeded,
            3,
        );
        let ctx = TeardownContext::new("vpc-1", false, TeardownSettings::immediate());

        reap(&provider, &ctx).await.unwrap();

        assert_eq!(provider.count("detach_network_interface"), 4);
        assert!(provider.state().network_interfaces.is_empty());
    }
}
