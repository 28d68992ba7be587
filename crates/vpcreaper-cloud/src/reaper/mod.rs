//! Resource reapers
//!
//! One module per resource type. Every reaper discovers the resources of its
//! type in the network with fresh describe calls, works out what to delete and
//! sends each mutation through [`TeardownContext::mutate`]. Deletions of
//! independent resources fan out and are awaited together; the first
//! escalated error fails the step.

pub mod addresses;
pub mod file_systems;
pub mod instances;
pub mod internet_gateways;
pub mod load_balancers;
pub mod nat_gateways;
pub mod network_interfaces;
pub mod route_tables;
pub mod security_groups;
pub mod subnets;
pub mod vpc;
pub mod vpc_endpoints;

use crate::context::TeardownContext;
use crate::provider::{NetworkProvider, ProviderResult};
use crate::report::StepReport;
use crate::teardown::Step;

/// Run the reaper for `step`
pub async fn run(
    step: Step,
    provider: &dyn NetworkProvider,
    ctx: &TeardownContext,
) -> ProviderResult<StepReport> {
    match step {
        Step::ReleaseAddresses => addresses::reap(provider, ctx).await,
        Step::Instances => instances::reap(provider, ctx).await,
        Step::LoadBalancers => load_balancers::reap(provider, ctx).await,
        Step::ClassicLoadBalancers => load_balancers::reap_classic(provider, ctx).await,
        Step::FileSystems => file_systems::reap(provider, ctx).await,
        Step::NatGateways => nat_gateways::reap(provider, ctx).await,
        Step::NetworkInterfaces => network_interfaces::reap(provider, ctx).await,
        Step::SecurityGroups => security_groups::reap(provider, ctx).await,
        Step::InternetGateways => internet_gateways::reap(provider, ctx).await,
        Step::Subnets => subnets::reap(provider, ctx).await,
        Step::RouteTables => route_tables::reap(provider, ctx).await,
        Step::VpcEndpoints => vpc_endpoints::reap(provider, ctx).await,
        Step::Vpc => vpc::reap(provider, ctx).await,
    }
}

/// Keep the first occurrence of each id
fn unique_ids<'a>(ids: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::new();
    for id in ids {
        if !unique.iter().any(|u| u == id) {
            unique.push(id.to_string());
        }
    }
    unique
}
