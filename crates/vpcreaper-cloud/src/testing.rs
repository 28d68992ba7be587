//! In-memory network provider for tests
//!
//! [`FakeProvider`] keeps a small model of an account's network resources,
//! applies mutations to it, enforces the dependency rules the teardown order
//! exists for, and records every call it receives. Failures can be scripted
//! per operation and target.

use crate::code::ErrorCode;
use crate::error::ProviderError;
use crate::provider::{NetworkProvider, ProviderResult};
use crate::resource::{
    Address, ClassicLoadBalancer, FileSystem, Instance, InstanceState, InternetGateway,
    IpPermission, LoadBalancer, MountTarget, NatGateway, NatGatewayState, NetworkInterface,
    RevokeIngress, RouteTable, SecurityGroup, Subnet, VpcEndpoint,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// Matches any target in [`FakeProvider::fail_times`] / [`FakeProvider::fail_always`]
pub const ANY_TARGET: &str = "*";

/// Resources known to the fake account
#[derive(Debug, Clone, Default)]
pub struct FakeState {
    pub vpcs: Vec<String>,
    pub instances: Vec<Instance>,
    pub load_balancers: Vec<LoadBalancer>,
    pub classic_load_balancers: Vec<ClassicLoadBalancer>,
    pub file_systems: Vec<FileSystem>,
    pub mount_targets: Vec<MountTarget>,
    pub nat_gateways: Vec<NatGateway>,
    pub network_interfaces: Vec<NetworkInterface>,
    pub security_groups: Vec<SecurityGroup>,
    pub internet_gateways: Vec<InternetGateway>,
    pub subnets: Vec<Subnet>,
    pub route_tables: Vec<RouteTable>,
    pub vpc_endpoints: Vec<VpcEndpoint>,
    pub addresses: Vec<Address>,
}

impl FakeState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a network with its default security group and main route table
    pub fn vpc(mut self, vpc_id: &str) -> Self {
        self.vpcs.push(vpc_id.to_string());
        self.security_groups.push(SecurityGroup {
            id: format!("sg-default-{vpc_id}"),
            name: "default".to_string(),
            vpc_id: Some(vpc_id.to_string()),
            ingress: Vec::new(),
        });
        self.route_tables.push(RouteTable {
            id: format!("rtb-main-{vpc_id}"),
            vpc_id: Some(vpc_id.to_string()),
            main: true,
        });
        self
    }

    pub fn instance(mut self, vpc_id: &str, id: &str) -> Self {
        self.instances.push(Instance {
            id: id.to_string(),
            vpc_id: Some(vpc_id.to_string()),
            state: InstanceState::Running,
        });
        self
    }

    pub fn load_balancer(mut self, vpc_id: &str, name: &str) -> Self {
        self.load_balancers.push(LoadBalancer {
            arn: format!("arn:aws:elasticloadbalancing:loadbalancer/app/{name}"),
            name: name.to_string(),
            vpc_id: Some(vpc_id.to_string()),
        });
        self
    }

    pub fn classic_load_balancer(mut self, vpc_id: &str, name: &str) -> Self {
        self.classic_load_balancers.push(ClassicLoadBalancer {
            name: name.to_string(),
            vpc_id: Some(vpc_id.to_string()),
        });
        self
    }

    pub fn file_system(mut self, id: &str) -> Self {
        self.file_systems.push(FileSystem { id: id.to_string() });
        self
    }

    pub fn mount_target(mut self, file_system_id: &str, subnet_id: &str, id: &str) -> Self {
        self.mount_targets.push(MountTarget {
            id: id.to_string(),
            file_system_id: file_system_id.to_string(),
            subnet_id: subnet_id.to_string(),
        });
        self
    }

    pub fn nat_gateway(mut self, vpc_id: &str, id: &str) -> Self {
        self.nat_gateways.push(NatGateway {
            id: id.to_string(),
            vpc_id: Some(vpc_id.to_string()),
            state: NatGatewayState::Available,
        });
        self
    }

    pub fn network_interface(
        mut self,
        vpc_id: &str,
        subnet_id: &str,
        id: &str,
        attachment_id: Option<&str>,
    ) -> Self {
        self.network_interfaces.push(NetworkInterface {
            id: id.to_string(),
            vpc_id: Some(vpc_id.to_string()),
            subnet_id: Some(subnet_id.to_string()),
            attachment_id: attachment_id.map(str::to_string),
        });
        self
    }

    pub fn security_group(
        mut self,
        vpc_id: &str,
        id: &str,
        name: &str,
        ingress: Vec<IpPermission>,
    ) -> Self {
        self.security_groups.push(SecurityGroup {
            id: id.to_string(),
            name: name.to_string(),
            vpc_id: Some(vpc_id.to_string()),
            ingress,
        });
        self
    }

    pub fn internet_gateway(mut self, vpc_id: &str, id: &str) -> Self {
        self.internet_gateways.push(InternetGateway {
            id: id.to_string(),
            attached_vpc_ids: vec![vpc_id.to_string()],
        });
        self
    }

    pub fn subnet(mut self, vpc_id: &str, id: &str) -> Self {
        self.subnets.push(Subnet {
            id: id.to_string(),
            vpc_id: Some(vpc_id.to_string()),
        });
        self
    }

    pub fn route_table(mut self, vpc_id: &str, id: &str) -> Self {
        self.route_tables.push(RouteTable {
            id: id.to_string(),
            vpc_id: Some(vpc_id.to_string()),
            main: false,
        });
        self
    }

    pub fn vpc_endpoint(mut self, vpc_id: &str, id: &str) -> Self {
        self.vpc_endpoints.push(VpcEndpoint {
            id: id.to_string(),
            vpc_id: Some(vpc_id.to_string()),
        });
        self
    }

    pub fn address(
        mut self,
        allocation_id: &str,
        association_id: Option<&str>,
        network_interface_id: Option<&str>,
    ) -> Self {
        self.addresses.push(Address {
            allocation_id: allocation_id.to_string(),
            association_id: association_id.map(str::to_string),
            network_interface_id: network_interface_id.map(str::to_string),
            public_ip: None,
        });
        self
    }

    /// Whether anything besides the default group and main route table is
    /// left in the network
    pub fn has_dependents(&self, vpc_id: &str) -> bool {
        let in_vpc = |v: &Option<String>| v.as_deref() == Some(vpc_id);
        self.subnets.iter().any(|s| in_vpc(&s.vpc_id))
            || self.network_interfaces.iter().any(|n| in_vpc(&n.vpc_id))
            || self
                .security_groups
                .iter()
                .any(|g| in_vpc(&g.vpc_id) && !g.is_default())
            || self
                .route_tables
                .iter()
                .any(|r| in_vpc(&r.vpc_id) && !r.main)
            || self
                .internet_gateways
                .iter()
                .any(|g| g.attached_vpc_ids.iter().any(|v| v == vpc_id))
            || self.vpc_endpoints.iter().any(|e| in_vpc(&e.vpc_id))
    }
}

/// A call received by the fake provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub operation: String,
    pub target: String,
}

#[derive(Debug, Clone)]
struct Failure {
    code: ErrorCode,
    /// `None` fails forever
    remaining: Option<u32>,
}

/// In-memory [`NetworkProvider`]
#[derive(Debug, Default)]
pub struct FakeProvider {
    state: Mutex<FakeState>,
    calls: Mutex<Vec<Call>>,
    failures: Mutex<HashMap<(String, String), Failure>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn not_found(code: ErrorCode, id: &str) -> ProviderError {
    ProviderError::new(code, format!("The resource '{id}' does not exist"))
}

fn dependency_violation(id: &str) -> ProviderError {
    ProviderError::new(
        ErrorCode::DependencyViolation,
        format!("The resource '{id}' has a dependent object"),
    )
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: FakeState) -> Self {
        Self {
            state: Mutex::new(state),
            ..Self::default()
        }
    }

    /// Snapshot of the current resources
    pub fn state(&self) -> FakeState {
        lock(&self.state).clone()
    }

    /// Fail the next `times` calls of `operation` on `target` with `code`
    pub fn fail_times(&self, operation: &str, target: &str, code: impl Into<ErrorCode>, times: u32) {
        lock(&self.failures).insert(
            (operation.to_string(), target.to_string()),
            Failure {
                code: code.into(),
                remaining: Some(times),
            },
        );
    }

    /// Fail every call of `operation` on `target` with `code`
    pub fn fail_always(&self, operation: &str, target: &str, code: impl Into<ErrorCode>) {
        lock(&self.failures).insert(
            (operation.to_string(), target.to_string()),
            Failure {
                code: code.into(),
                remaining: None,
            },
        );
    }

    /// Every call received so far, in order
    pub fn calls(&self) -> Vec<Call> {
        lock(&self.calls).clone()
    }

    /// Targets of every call to `operation`, in order
    pub fn targets(&self, operation: &str) -> Vec<String> {
        lock(&self.calls)
            .iter()
            .filter(|c| c.operation == operation)
            .map(|c| c.target.clone())
            .collect()
    }

    pub fn count(&self, operation: &str) -> usize {
        lock(&self.calls)
            .iter()
            .filter(|c| c.operation == operation)
            .count()
    }

    /// Index of the first call to `operation`, for ordering assertions
    pub fn first_call(&self, operation: &str) -> Option<usize> {
        lock(&self.calls)
            .iter()
            .position(|c| c.operation == operation)
    }

    /// Index of the last call to `operation`
    pub fn last_call(&self, operation: &str) -> Option<usize> {
        lock(&self.calls)
            .iter()
            .rposition(|c| c.operation == operation)
    }

    /// Names of every mutating operation called so far
    pub fn mutations(&self) -> Vec<Call> {
        lock(&self.calls)
            .iter()
            .filter(|c| !c.operation.starts_with("describe_"))
            .cloned()
            .collect()
    }

    /// Record the call and return a scripted failure if one applies
    fn enter(&self, operation: &str, target: &str) -> ProviderResult<()> {
        lock(&self.calls).push(Call {
            operation: operation.to_string(),
            target: target.to_string(),
        });

        let mut failures = lock(&self.failures);
        let key = [target, ANY_TARGET]
            .into_iter()
            .map(|t| (operation.to_string(), t.to_string()))
            .find(|k| failures.contains_key(k));
        let Some(key) = key else {
            return Ok(());
        };

        let (code, exhausted) = {
            let Some(failure) = failures.get_mut(&key) else {
                return Ok(());
            };
            match &mut failure.remaining {
                None => (Some(failure.code.clone()), false),
                Some(0) => (None, true),
                Some(n) => {
                    *n -= 1;
                    (Some(failure.code.clone()), *n == 0)
                }
            }
        };
        if exhausted {
            failures.remove(&key);
        }
        let Some(code) = code else {
            return Ok(());
        };
        Err(ProviderError::new(
            code,
            format!("scripted failure for {operation} on {target}"),
        ))
    }
}

#[async_trait]
impl NetworkProvider for FakeProvider {
    fn name(&self) -> &str {
        "fake"
    }

    async fn describe_instances(&self, vpc_id: &str) -> ProviderResult<Vec<Instance>> {
        self.enter("describe_instances", vpc_id)?;
        Ok(lock(&self.state)
            .instances
            .iter()
            .filter(|i| i.vpc_id.as_deref() == Some(vpc_id))
            .cloned()
            .collect())
    }

    async fn terminate_instances(&self, instance_ids: &[String]) -> ProviderResult<()> {
        self.enter("terminate_instances", &instance_ids.join(","))?;
        let mut state = lock(&self.state);
        for id in instance_ids {
            let instance = state
                .instances
                .iter_mut()
                .find(|i| &i.id == id)
                .ok_or_else(|| not_found(ErrorCode::parse("InvalidInstanceID.NotFound"), id))?;
            instance.state = InstanceState::Terminated;
        }
        Ok(())
    }

    async fn describe_load_balancers(&self) -> ProviderResult<Vec<LoadBalancer>> {
        self.enter("describe_load_balancers", "")?;
        Ok(lock(&self.state).load_balancers.clone())
    }

    async fn delete_load_balancer(&self, arn: &str) -> ProviderResult<()> {
        self.enter("delete_load_balancer", arn)?;
        let mut state = lock(&self.state);
        let before = state.load_balancers.len();
        state.load_balancers.retain(|lb| lb.arn != arn);
        if state.load_balancers.len() == before {
            return Err(not_found(ErrorCode::LoadBalancerNotFound, arn));
        }
        Ok(())
    }

    async fn describe_classic_load_balancers(&self) -> ProviderResult<Vec<ClassicLoadBalancer>> {
        self.enter("describe_classic_load_balancers", "")?;
        Ok(lock(&self.state).classic_load_balancers.clone())
    }

    async fn delete_classic_load_balancer(&self, name: &str) -> ProviderResult<()> {
        self.enter("delete_classic_load_balancer", name)?;
        // Classic deletion is idempotent on the provider side
        lock(&self.state)
            .classic_load_balancers
            .retain(|lb| lb.name != name);
        Ok(())
    }

    async fn describe_file_systems(&self) -> ProviderResult<Vec<FileSystem>> {
        self.enter("describe_file_systems", "")?;
        Ok(lock(&self.state).file_systems.clone())
    }

    async fn describe_mount_targets(
        &self,
        file_system_id: &str,
    ) -> ProviderResult<Vec<MountTarget>> {
        self.enter("describe_mount_targets", file_system_id)?;
        let state = lock(&self.state);
        if !state.file_systems.iter().any(|fs| fs.id == file_system_id) {
            return Err(not_found(ErrorCode::FileSystemNotFound, file_system_id));
        }
        Ok(state
            .mount_targets
            .iter()
            .filter(|mt| mt.file_system_id == file_system_id)
            .cloned()
            .collect())
    }

    async fn delete_mount_target(&self, mount_target_id: &str) -> ProviderResult<()> {
        self.enter("delete_mount_target", mount_target_id)?;
        let mut state = lock(&self.state);
        let before = state.mount_targets.len();
        state.mount_targets.retain(|mt| mt.id != mount_target_id);
        if state.mount_targets.len() == before {
            return Err(not_found(ErrorCode::MountTargetNotFound, mount_target_id));
        }
        Ok(())
    }

    async fn delete_file_system(&self, file_system_id: &str) -> ProviderResult<()> {
        self.enter("delete_file_system", file_system_id)?;
        let mut state = lock(&self.state);
        if !state.file_systems.iter().any(|fs| fs.id == file_system_id) {
            return Err(not_found(ErrorCode::FileSystemNotFound, file_system_id));
        }
        if state
            .mount_targets
            .iter()
            .any(|mt| mt.file_system_id == file_system_id)
        {
            return Err(ProviderError::new(
                ErrorCode::FileSystemInUse,
                format!("File system '{file_system_id}' has mount targets"),
            ));
        }
        state.file_systems.retain(|fs| fs.id != file_system_id);
        Ok(())
    }

    async fn describe_nat_gateways(&self, vpc_id: &str) -> ProviderResult<Vec<NatGateway>> {
        self.enter("describe_nat_gateways", vpc_id)?;
        Ok(lock(&self.state)
            .nat_gateways
            .iter()
            .filter(|n| n.vpc_id.as_deref() == Some(vpc_id))
            .cloned()
            .collect())
    }

    async fn delete_nat_gateway(&self, nat_gateway_id: &str) -> ProviderResult<()> {
        self.enter("delete_nat_gateway", nat_gateway_id)?;
        let mut state = lock(&self.state);
        let gateway = state
            .nat_gateways
            .iter_mut()
            .find(|n| n.id == nat_gateway_id)
            .ok_or_else(|| not_found(ErrorCode::NatGatewayNotFound, nat_gateway_id))?;
        // Deleted gateways stay visible for a while
        gateway.state = NatGatewayState::Deleted;
        Ok(())
    }

    async fn describe_network_interfaces(
        &self,
        vpc_id: &str,
    ) -> ProviderResult<Vec<NetworkInterface>> {
        self.enter("describe_network_interfaces", vpc_id)?;
        Ok(lock(&self.state)
            .network_interfaces
            .iter()
            .filter(|n| n.vpc_id.as_deref() == Some(vpc_id))
            .cloned()
            .collect())
    }

    async fn detach_network_interface(&self, attachment_id: &str) -> ProviderResult<()> {
        self.enter("detach_network_interface", attachment_id)?;
        let mut state = lock(&self.state);
        let interface = state
            .network_interfaces
            .iter_mut()
            .find(|n| n.attachment_id.as_deref() == Some(attachment_id))
            .ok_or_else(|| not_found(ErrorCode::InvalidAttachmentIdNotFound, attachment_id))?;
        interface.attachment_id = None;
        Ok(())
    }

    async fn delete_network_interface(&self, network_interface_id: &str) -> ProviderResult<()> {
        self.enter("delete_network_interface", network_interface_id)?;
        let mut state = lock(&self.state);
        let interface = state
            .network_interfaces
            .iter()
            .find(|n| n.id == network_interface_id)
            .ok_or_else(|| {
                not_found(
                    ErrorCode::InvalidNetworkInterfaceIdNotFound,
                    network_interface_id,
                )
            })?;
        if interface.attachment_id.is_some() {
            return Err(ProviderError::new(
                "InvalidNetworkInterface.InUse",
                format!("Interface '{network_interface_id}' is currently in use"),
            ));
        }
        state
            .network_interfaces
            .retain(|n| n.id != network_interface_id);
        Ok(())
    }

    async fn describe_security_groups(&self, vpc_id: &str) -> ProviderResult<Vec<SecurityGroup>> {
        self.enter("describe_security_groups", vpc_id)?;
        Ok(lock(&self.state)
            .security_groups
            .iter()
            .filter(|g| g.vpc_id.as_deref() == Some(vpc_id))
            .cloned()
            .collect())
    }

    async fn revoke_security_group_ingress(&self, request: &RevokeIngress) -> ProviderResult<()> {
        self.enter("revoke_security_group_ingress", &request.group_id)?;
        let mut state = lock(&self.state);
        let group = state
            .security_groups
            .iter_mut()
            .find(|g| g.id == request.group_id)
            .ok_or_else(|| not_found(ErrorCode::InvalidGroupNotFound, &request.group_id))?;

        let mut revoked = false;
        for rule in group.ingress.iter_mut() {
            if let Some(cidr) = &request.cidr {
                if rule.protocol == cidr.protocol
                    && rule.from_port == cidr.from_port
                    && rule.to_port == cidr.to_port
                    && rule.cidr_ranges.contains(&cidr.cidr)
                {
                    rule.cidr_ranges.retain(|c| c != &cidr.cidr);
                    revoked = true;
                }
            }
            for permission in &request.permissions {
                if rule.protocol == permission.protocol
                    && rule.from_port == permission.from_port
                    && rule.to_port == permission.to_port
                {
                    let before = rule.group_pairs.len();
                    rule.group_pairs
                        .retain(|p| !permission.group_pairs.iter().any(|r| r.group_id == p.group_id));
                    revoked |= rule.group_pairs.len() != before;
                }
            }
        }
        group
            .ingress
            .retain(|rule| !rule.cidr_ranges.is_empty() || !rule.group_pairs.is_empty());

        if !revoked {
            return Err(ProviderError::new(
                ErrorCode::InvalidPermissionNotFound,
                "The specified rule does not exist in this security group",
            ));
        }
        Ok(())
    }

    async fn delete_security_group(&self, group_id: &str) -> ProviderResult<()> {
        self.enter("delete_security_group", group_id)?;
        let mut state = lock(&self.state);
        let group = state
            .security_groups
            .iter()
            .find(|g| g.id == group_id)
            .ok_or_else(|| not_found(ErrorCode::InvalidGroupNotFound, group_id))?;
        if group.is_default() {
            return Err(ProviderError::new(
                "CannotDelete",
                "The default security group cannot be deleted",
            ));
        }
        let referenced = state.security_groups.iter().any(|g| {
            g.id != group_id
                && g.ingress
                    .iter()
                    .any(|rule| rule.group_pairs.iter().any(|p| p.group_id == group_id))
        });
        if referenced {
            return Err(dependency_violation(group_id));
        }
        state.security_groups.retain(|g| g.id != group_id);
        Ok(())
    }

    async fn describe_internet_gateways(
        &self,
        vpc_id: &str,
    ) -> ProviderResult<Vec<InternetGateway>> {
        self.enter("describe_internet_gateways", vpc_id)?;
        Ok(lock(&self.state)
            .internet_gateways
            .iter()
            .filter(|g| g.attached_vpc_ids.iter().any(|v| v == vpc_id))
            .cloned()
            .collect())
    }

    async fn detach_internet_gateway(
        &self,
        gateway_id: &str,
        vpc_id: &str,
    ) -> ProviderResult<()> {
        self.enter("detach_internet_gateway", gateway_id)?;
        let mut state = lock(&self.state);
        let gateway = state
            .internet_gateways
            .iter_mut()
            .find(|g| g.id == gateway_id)
            .ok_or_else(|| not_found(ErrorCode::InvalidInternetGatewayIdNotFound, gateway_id))?;
        if !gateway.attached_vpc_ids.iter().any(|v| v == vpc_id) {
            return Err(ProviderError::new(
                ErrorCode::GatewayNotAttached,
                format!("Gateway '{gateway_id}' is not attached to '{vpc_id}'"),
            ));
        }
        gateway.attached_vpc_ids.retain(|v| v != vpc_id);
        Ok(())
    }

    async fn delete_internet_gateway(&self, gateway_id: &str) -> ProviderResult<()> {
        self.enter("delete_internet_gateway", gateway_id)?;
        let mut state = lock(&self.state);
        let gateway = state
            .internet_gateways
            .iter()
            .find(|g| g.id == gateway_id)
            .ok_or_else(|| not_found(ErrorCode::InvalidInternetGatewayIdNotFound, gateway_id))?;
        if !gateway.attached_vpc_ids.is_empty() {
            return Err(dependency_violation(gateway_id));
        }
        state.internet_gateways.retain(|g| g.id != gateway_id);
        Ok(())
    }

    async fn describe_subnets(&self, vpc_id: &str) -> ProviderResult<Vec<Subnet>> {
        self.enter("describe_subnets", vpc_id)?;
        Ok(lock(&self.state)
            .subnets
            .iter()
            .filter(|s| s.vpc_id.as_deref() == Some(vpc_id))
            .cloned()
            .collect())
    }

    async fn delete_subnet(&self, subnet_id: &str) -> ProviderResult<()> {
        self.enter("delete_subnet", subnet_id)?;
        let mut state = lock(&self.state);
        if !state.subnets.iter().any(|s| s.id == subnet_id) {
            return Err(not_found(ErrorCode::InvalidSubnetIdNotFound, subnet_id));
        }
        let occupied = state
            .network_interfaces
            .iter()
            .any(|n| n.subnet_id.as_deref() == Some(subnet_id))
            || state.mount_targets.iter().any(|mt| mt.subnet_id == subnet_id);
        if occupied {
            return Err(dependency_violation(subnet_id));
        }
        state.subnets.retain(|s| s.id != subnet_id);
        Ok(())
    }

    async fn describe_route_tables(&self, vpc_id: &str) -> ProviderResult<Vec<RouteTable>> {
        self.enter("describe_route_tables", vpc_id)?;
        Ok(lock(&self.state)
            .route_tables
            .iter()
            .filter(|r| r.vpc_id.as_deref() == Some(vpc_id))
            .cloned()
            .collect())
    }

    async fn delete_route_table(&self, route_table_id: &str) -> ProviderResult<()> {
        self.enter("delete_route_table", route_table_id)?;
        let mut state = lock(&self.state);
        let table = state
            .route_tables
            .iter()
            .find(|r| r.id == route_table_id)
            .ok_or_else(|| not_found(ErrorCode::InvalidRouteTableIdNotFound, route_table_id))?;
        if table.main {
            return Err(dependency_violation(route_table_id));
        }
        state.route_tables.retain(|r| r.id != route_table_id);
        Ok(())
    }

    async fn describe_vpc_endpoints(&self, vpc_id: &str) -> ProviderResult<Vec<VpcEndpoint>> {
        self.enter("describe_vpc_endpoints", vpc_id)?;
        Ok(lock(&self.state)
            .vpc_endpoints
            .iter()
            .filter(|e| e.vpc_id.as_deref() == Some(vpc_id))
            .cloned()
            .collect())
    }

    async fn delete_vpc_endpoints(&self, endpoint_ids: &[String]) -> ProviderResult<()> {
        self.enter("delete_vpc_endpoints", &endpoint_ids.join(","))?;
        let mut state = lock(&self.state);
        for id in endpoint_ids {
            if !state.vpc_endpoints.iter().any(|e| &e.id == id) {
                return Err(not_found(ErrorCode::InvalidVpcEndpointIdNotFound, id));
            }
            state.vpc_endpoints.retain(|e| &e.id != id);
        }
        Ok(())
    }

    async fn delete_vpc(&self, vpc_id: &str) -> ProviderResult<()> {
        self.enter("delete_vpc", vpc_id)?;
        let mut state = lock(&self.state);
        if !state.vpcs.iter().any(|v| v == vpc_id) {
            return Err(not_found(ErrorCode::InvalidVpcIdNotFound, vpc_id));
        }
        if state.has_dependents(vpc_id) {
            return Err(dependency_violation(vpc_id));
        }
        // The default group and main route table go with the network
        state.vpcs.retain(|v| v != vpc_id);
        state
            .security_groups
            .retain(|g| g.vpc_id.as_deref() != Some(vpc_id));
        state
            .route_tables
            .retain(|r| r.vpc_id.as_deref() != Some(vpc_id));
        Ok(())
    }

    async fn describe_addresses(&self) -> ProviderResult<Vec<Address>> {
        self.enter("describe_addresses", "")?;
        Ok(lock(&self.state).addresses.clone())
    }

    async fn disassociate_address(&self, association_id: &str) -> ProviderResult<()> {
        self.enter("disassociate_address", association_id)?;
        let mut state = lock(&self.state);
        let address = state
            .addresses
            .iter_mut()
            .find(|a| a.association_id.as_deref() == Some(association_id))
            .ok_or_else(|| not_found(ErrorCode::InvalidAssociationIdNotFound, association_id))?;
        address.association_id = None;
        address.network_interface_id = None;
        Ok(())
    }

    async fn release_address(&self, allocation_id: &str) -> ProviderResult<()> {
        self.enter("release_address", allocation_id)?;
        let mut state = lock(&self.state);
        let address = state
            .addresses
            .iter()
            .find(|a| a.allocation_id == allocation_id)
            .ok_or_else(|| not_found(ErrorCode::InvalidAllocationIdNotFound, allocation_id))?;
        if address.association_id.is_some() {
            return Err(ProviderError::new(
                ErrorCode::InvalidIpAddressInUse,
                format!("Address '{allocation_id}' is in use"),
            ));
        }
        state.addresses.retain(|a| a.allocation_id != allocation_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_failure_runs_out() {
        let provider = FakeProvider::with_state(FakeState::new().vpc("vpc-1").subnet("vpc-1", "subnet-1"));
        provider.fail_times("delete_subnet", "subnet-1", ErrorCode::DependencyViolation, 2);

        assert!(provider.delete_subnet("subnet-1").await.is_err());
        assert!(provider.delete_subnet("subnet-1").await.is_err());
        assert!(provider.delete_subnet("subnet-1").await.is_ok());
        assert_eq!(provider.count("delete_subnet"), 3);
    }

    #[tokio::test]
    async fn test_wildcard_failure() {
        let provider = FakeProvider::new();
        provider.fail_always("describe_subnets", ANY_TARGET, ErrorCode::UnauthorizedOperation);

        let err = provider.describe_subnets("vpc-1").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::UnauthorizedOperation);
    }

    #[tokio::test]
    async fn test_vpc_delete_requires_empty_network() {
        let provider = FakeProvider::with_state(FakeState::new().vpc("vpc-1").subnet("vpc-1", "subnet-1"));

        let err = provider.delete_vpc("vpc-1").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::DependencyViolation);

        provider.delete_subnet("subnet-1").await.unwrap();
        provider.delete_vpc("vpc-1").await.unwrap();
        assert!(provider.state().vpcs.is_empty());
        assert!(provider.state().security_groups.is_empty());
    }
}
