//! Network provider trait definition

use crate::error::ProviderError;
use crate::resource::{
    Address, ClassicLoadBalancer, FileSystem, Instance, InternetGateway, LoadBalancer,
    MountTarget, NatGateway, NetworkInterface, RevokeIngress, RouteTable, SecurityGroup, Subnet,
    VpcEndpoint,
};
use async_trait::async_trait;

pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// Cloud network provider abstraction
///
/// One method per provider operation the reapers need. Describe calls that
/// take a `vpc_id` apply the provider-side network filter; load balancers,
/// filesystems and addresses are listed account-wide and filtered by the
/// caller.
///
/// Implementations hold no teardown state; every call is a fresh round trip.
#[async_trait]
pub trait NetworkProvider: Send + Sync {
    /// Returns the provider name (e.g., "aws")
    fn name(&self) -> &str;

    // ---- Compute ----

    async fn describe_instances(&self, vpc_id: &str) -> ProviderResult<Vec<Instance>>;

    /// Terminate all given instances in one batched call
    async fn terminate_instances(&self, instance_ids: &[String]) -> ProviderResult<()>;

    // ---- Load balancers ----

    async fn describe_load_balancers(&self) -> ProviderResult<Vec<LoadBalancer>>;

    async fn delete_load_balancer(&self, arn: &str) -> ProviderResult<()>;

    async fn describe_classic_load_balancers(&self) -> ProviderResult<Vec<ClassicLoadBalancer>>;

    async fn delete_classic_load_balancer(&self, name: &str) -> ProviderResult<()>;

    // ---- Shared filesystems ----

    async fn describe_file_systems(&self) -> ProviderResult<Vec<FileSystem>>;

    async fn describe_mount_targets(&self, file_system_id: &str)
    -> ProviderResult<Vec<MountTarget>>;

    async fn delete_mount_target(&self, mount_target_id: &str) -> ProviderResult<()>;

    async fn delete_file_system(&self, file_system_id: &str) -> ProviderResult<()>;

    // ---- NAT gateways ----

    async fn describe_nat_gateways(&self, vpc_id: &str) -> ProviderResult<Vec<NatGateway>>;

    async fn delete_nat_gateway(&self, nat_gateway_id: &str) -> ProviderResult<()>;

    // ---- Network interfaces ----

    async fn describe_network_interfaces(
        &self,
        vpc_id: &str,
    ) -> ProviderResult<Vec<NetworkInterface>>;

    /// Force-detach an interface attachment
    async fn detach_network_interface(&self, attachment_id: &str) -> ProviderResult<()>;

    async fn delete_network_interface(&self, network_interface_id: &str) -> ProviderResult<()>;

    // ---- Security groups ----

    async fn describe_security_groups(&self, vpc_id: &str) -> ProviderResult<Vec<SecurityGroup>>;

    async fn revoke_security_group_ingress(&self, request: &RevokeIngress) -> ProviderResult<()>;

    async fn delete_security_group(&self, group_id: &str) -> ProviderResult<()>;

    // ---- Internet gateways ----

    /// Gateways attached to the network (`attachment.vpc-id` filter)
    async fn describe_internet_gateways(
        &self,
        vpc_id: &str,
    ) -> ProviderResult<Vec<InternetGateway>>;

    async fn detach_internet_gateway(&self, gateway_id: &str, vpc_id: &str)
    -> ProviderResult<()>;

    async fn delete_internet_gateway(&self, gateway_id: &str) -> ProviderResult<()>;

    // ---- Subnets, routes, endpoints ----

    async fn describe_subnets(&self, vpc_id: &str) -> ProviderResult<Vec<Subnet>>;

    async fn delete_subnet(&self, subnet_id: &str) -> ProviderResult<()>;

    async fn describe_route_tables(&self, vpc_id: &str) -> ProviderResult<Vec<RouteTable>>;

    async fn delete_route_table(&self, route_table_id: &str) -> ProviderResult<()>;

    async fn describe_vpc_endpoints(&self, vpc_id: &str) -> ProviderResult<Vec<VpcEndpoint>>;

    async fn delete_vpc_endpoints(&self, endpoint_ids: &[String]) -> ProviderResult<()>;

    // ---- Network ----

    async fn delete_vpc(&self, vpc_id: &str) -> ProviderResult<()>;

    // ---- Elastic addresses ----

    /// Addresses allocated for use in networks
    async fn describe_addresses(&self) -> ProviderResult<Vec<Address>>;

    async fn disassociate_address(&self, association_id: &str) -> ProviderResult<()>;

    async fn release_address(&self, allocation_id: &str) -> ProviderResult<()>;
}
