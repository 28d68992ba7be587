//! Teardown orchestrator
//!
//! Runs one reaper per resource type in a fixed order that follows the
//! dependency graph of a network: whatever occupies a subnet or references a
//! group goes before the subnet or group, and the network itself goes last.
//! Steps run strictly one after another. The first escalated error aborts the
//! run; nothing is rolled back, and a re-run starts again from the first step.

use crate::context::TeardownContext;
use crate::error::{CloudError, Result};
use crate::provider::NetworkProvider;
use crate::reaper;
use crate::report::TeardownReport;
use crate::settings::TeardownSettings;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;

/// One teardown step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Step {
    /// Optional, off by default
    ReleaseAddresses,
    Instances,
    LoadBalancers,
    ClassicLoadBalancers,
    FileSystems,
    NatGateways,
    NetworkInterfaces,
    SecurityGroups,
    InternetGateways,
    Subnets,
    RouteTables,
    VpcEndpoints,
    Vpc,
}

impl Step {
    /// Default step order
    pub const ORDER: [Step; 12] = [
        Step::Instances,
        Step::LoadBalancers,
        Step::ClassicLoadBalancers,
        Step::FileSystems,
        Step::NatGateways,
        Step::NetworkInterfaces,
        Step::SecurityGroups,
        Step::InternetGateways,
        Step::Subnets,
        Step::RouteTables,
        Step::VpcEndpoints,
        Step::Vpc,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Step::ReleaseAddresses => "release-addresses",
            Step::Instances => "instances",
            Step::LoadBalancers => "load-balancers",
            Step::ClassicLoadBalancers => "classic-load-balancers",
            Step::FileSystems => "file-systems",
            Step::NatGateways => "nat-gateways",
            Step::NetworkInterfaces => "network-interfaces",
            Step::SecurityGroups => "security-groups",
            Step::InternetGateways => "internet-gateways",
            Step::Subnets => "subnets",
            Step::RouteTables => "route-tables",
            Step::VpcEndpoints => "vpc-endpoints",
            Step::Vpc => "vpc",
        }
    }

    /// Human readable label for progress output
    pub fn description(self) -> &'static str {
        match self {
            Step::ReleaseAddresses => "Releasing elastic addresses",
            Step::Instances => "Terminating instances",
            Step::LoadBalancers => "Deleting load balancers",
            Step::ClassicLoadBalancers => "Deleting classic load balancers",
            Step::FileSystems => "Deleting shared filesystems",
            Step::NatGateways => "Deleting NAT gateways",
            Step::NetworkInterfaces => "Deleting network interfaces",
            Step::SecurityGroups => "Deleting security groups",
            Step::InternetGateways => "Deleting internet gateways",
            Step::Subnets => "Deleting subnets",
            Step::RouteTables => "Deleting route tables",
            Step::VpcEndpoints => "Deleting VPC endpoints",
            Step::Vpc => "Deleting the VPC",
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dependency-ordered network teardown
pub struct Teardown {
    provider: Arc<dyn NetworkProvider>,
    settings: TeardownSettings,
}

impl Teardown {
    pub fn new(provider: Arc<dyn NetworkProvider>, settings: TeardownSettings) -> Self {
        Self { provider, settings }
    }

    pub fn settings(&self) -> &TeardownSettings {
        &self.settings
    }

    /// Steps this teardown will run, in order.
    ///
    /// Address release goes first when enabled: once instances and NAT
    /// gateways are gone, nothing ties an address to the network any more.
    pub fn plan(&self) -> Vec<Step> {
        Self::plan_for(&self.settings)
    }

    /// Steps a teardown with `settings` would run
    pub fn plan_for(settings: &TeardownSettings) -> Vec<Step> {
        let mut steps = Vec::with_capacity(Step::ORDER.len() + 1);
        if settings.release_addresses {
            steps.push(Step::ReleaseAddresses);
        }
        steps.extend(Step::ORDER);
        steps
    }

    /// Tear down `vpc_id` and everything in it
    pub async fn run(&self, vpc_id: &str, dry_run: bool) -> Result<TeardownReport> {
        if vpc_id.trim().is_empty() {
            return Err(CloudError::InvalidNetworkId(vpc_id.to_string()));
        }

        let ctx = TeardownContext::new(vpc_id, dry_run, self.settings.clone());
        let mut report = TeardownReport::new(vpc_id, dry_run);
        let started = Instant::now();

        tracing::info!(
            vpc_id,
            dry_run,
            provider = self.provider.name(),
            "Starting teardown"
        );

        for step in self.plan() {
            let span = tracing::info_span!("step", step = %step, vpc_id, dry_run);
            let step_report = reaper::run(step, self.provider.as_ref(), &ctx)
                .instrument(span)
                .await
                .map_err(|source| {
                    tracing::error!(
                        step = %step,
                        vpc_id,
                        code = %source.code,
                        "Teardown aborted"
                    );
                    CloudError::StepFailed { step, source }
                })?;

            tracing::info!(
                step = %step,
                vpc_id,
                discovered = step_report.discovered,
                targeted = step_report.targeted.len(),
                "Step completed"
            );
            report.push(step_report);
        }

        report.duration_ms = started.elapsed().as_millis() as u64;
        tracing::info!(
            vpc_id,
            duration_ms = report.duration_ms,
            "Teardown completed"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeProvider;

    #[test]
    fn test_default_plan_order() {
        let teardown = Teardown::new(
            Arc::new(FakeProvider::new()),
            TeardownSettings::immediate(),
        );
        let plan = teardown.plan();
        assert_eq!(plan, Step::ORDER.to_vec());
        assert_eq!(plan.first(), Some(&Step::Instances));
        assert_eq!(plan.last(), Some(&Step::Vpc));
    }

    #[test]
    fn test_release_addresses_runs_first_when_enabled() {
        let teardown = Teardown::new(
            Arc::new(FakeProvider::new()),
            TeardownSettings::immediate().with_release_addresses(true),
        );
        let plan = teardown.plan();
        assert_eq!(plan.len(), 13);
        assert_eq!(plan[0], Step::ReleaseAddresses);
        assert_eq!(plan[1], Step::Instances);
    }

    #[tokio::test]
    async fn test_empty_vpc_id_is_rejected() {
        let teardown = Teardown::new(
            Arc::new(FakeProvider::new()),
            TeardownSettings::immediate(),
        );
        let err = teardown.run("  ", false).await.unwrap_err();
        assert!(matches!(err, CloudError::InvalidNetworkId(_)));
    }

    #[test]
    fn test_step_display() {
        assert_eq!(Step::ClassicLoadBalancers.to_string(), "classic-load-balancers");
        assert_eq!(Step::Vpc.description(), "Deleting the VPC");
    }
}
