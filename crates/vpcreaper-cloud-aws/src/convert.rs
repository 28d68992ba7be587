//! SDK type to descriptor conversions
//!
//! Items the SDK returns without an id are dropped: nothing can be done with
//! a resource that cannot be addressed.

use aws_sdk_ec2::types as ec2;
use aws_sdk_efs::types as efs;
use aws_sdk_elasticloadbalancing::types as elb;
use aws_sdk_elasticloadbalancingv2::types as elbv2;
use vpcreaper_cloud::resource::{
    Address, ClassicLoadBalancer, FileSystem, GroupPair, Instance, InstanceState,
    InternetGateway, IpPermission, LoadBalancer, MountTarget, NatGateway, NatGatewayState,
    NetworkInterface, RouteTable, SecurityGroup, Subnet, VpcEndpoint,
};

/// Describe filter on a single value
pub fn filter(name: &str, value: &str) -> ec2::Filter {
    ec2::Filter::builder().name(name).values(value).build()
}

/// The standard network filter used by most EC2 describe calls
pub fn vpc_filter(vpc_id: &str) -> ec2::Filter {
    filter("vpc-id", vpc_id)
}

fn owned(value: Option<&str>) -> Option<String> {
    value.map(str::to_string)
}

pub fn instance(item: &ec2::Instance) -> Option<Instance> {
    let state = match item.state().and_then(|s| s.name()) {
        Some(ec2::InstanceStateName::Pending) => InstanceState::Pending,
        Some(ec2::InstanceStateName::Running) => InstanceState::Running,
        Some(ec2::InstanceStateName::Stopping) => InstanceState::Stopping,
        Some(ec2::InstanceStateName::Stopped) => InstanceState::Stopped,
        Some(ec2::InstanceStateName::ShuttingDown) => InstanceState::ShuttingDown,
        Some(ec2::InstanceStateName::Terminated) => InstanceState::Terminated,
        _ => InstanceState::Unknown,
    };
    Some(Instance {
        id: item.instance_id()?.to_string(),
        vpc_id: owned(item.vpc_id()),
        state,
    })
}

pub fn load_balancer(item: &elbv2::LoadBalancer) -> Option<LoadBalancer> {
    Some(LoadBalancer {
        arn: item.load_balancer_arn()?.to_string(),
        name: item.load_balancer_name().unwrap_or_default().to_string(),
        vpc_id: owned(item.vpc_id()),
    })
}

pub fn classic_load_balancer(item: &elb::LoadBalancerDescription) -> Option<ClassicLoadBalancer> {
    Some(ClassicLoadBalancer {
        name: item.load_balancer_name()?.to_string(),
        vpc_id: owned(item.vpc_id()),
    })
}

pub fn file_system(item: &efs::FileSystemDescription) -> FileSystem {
    FileSystem {
        id: item.file_system_id().to_string(),
    }
}

pub fn mount_target(item: &efs::MountTargetDescription) -> MountTarget {
    MountTarget {
        id: item.mount_target_id().to_string(),
        file_system_id: item.file_system_id().to_string(),
        subnet_id: item.subnet_id().to_string(),
    }
}

pub fn nat_gateway(item: &ec2::NatGateway) -> Option<NatGateway> {
    let state = match item.state() {
        Some(ec2::NatGatewayState::Pending) => NatGatewayState::Pending,
        Some(ec2::NatGatewayState::Available) => NatGatewayState::Available,
        Some(ec2::NatGatewayState::Failed) => NatGatewayState::Failed,
        Some(ec2::NatGatewayState::Deleting) => NatGatewayState::Deleting,
        Some(ec2::NatGatewayState::Deleted) => NatGatewayState::Deleted,
        _ => NatGatewayState::Unknown,
    };
    Some(NatGateway {
        id: item.nat_gateway_id()?.to_string(),
        vpc_id: owned(item.vpc_id()),
        state,
    })
}

pub fn network_interface(item: &ec2::NetworkInterface) -> Option<NetworkInterface> {
    Some(NetworkInterface {
        id: item.network_interface_id()?.to_string(),
        vpc_id: owned(item.vpc_id()),
        subnet_id: owned(item.subnet_id()),
        attachment_id: owned(item.attachment().and_then(|a| a.attachment_id())),
    })
}

pub fn ip_permission(item: &ec2::IpPermission) -> IpPermission {
    IpPermission {
        protocol: item.ip_protocol().unwrap_or("-1").to_string(),
        from_port: item.from_port(),
        to_port: item.to_port(),
        cidr_ranges: item
            .ip_ranges()
            .iter()
            .filter_map(|r| owned(r.cidr_ip()))
            .collect(),
        group_pairs: item
            .user_id_group_pairs()
            .iter()
            .filter_map(|p| {
                Some(GroupPair {
                    group_id: p.group_id()?.to_string(),
                    user_id: owned(p.user_id()),
                })
            })
            .collect(),
    }
}

pub fn security_group(item: &ec2::SecurityGroup) -> Option<SecurityGroup> {
    Some(SecurityGroup {
        id: item.group_id()?.to_string(),
        name: item.group_name().unwrap_or_default().to_string(),
        vpc_id: owned(item.vpc_id()),
        ingress: item.ip_permissions().iter().map(ip_permission).collect(),
    })
}

pub fn internet_gateway(item: &ec2::InternetGateway) -> Option<InternetGateway> {
    Some(InternetGateway {
        id: item.internet_gateway_id()?.to_string(),
        attached_vpc_ids: item
            .attachments()
            .iter()
            .filter_map(|a| owned(a.vpc_id()))
            .collect(),
    })
}

pub fn subnet(item: &ec2::Subnet) -> Option<Subnet> {
    Some(Subnet {
        id: item.subnet_id()?.to_string(),
        vpc_id: owned(item.vpc_id()),
    })
}

pub fn route_table(item: &ec2::RouteTable) -> Option<RouteTable> {
    Some(RouteTable {
        id: item.route_table_id()?.to_string(),
        vpc_id: owned(item.vpc_id()),
        main: item
            .associations()
            .iter()
            .any(|a| a.main().unwrap_or(false)),
    })
}

pub fn vpc_endpoint(item: &ec2::VpcEndpoint) -> Option<VpcEndpoint> {
    Some(VpcEndpoint {
        id: item.vpc_endpoint_id()?.to_string(),
        vpc_id: owned(item.vpc_id()),
    })
}

pub fn address(item: &ec2::Address) -> Option<Address> {
    Some(Address {
        allocation_id: item.allocation_id()?.to_string(),
        association_id: owned(item.association_id()),
        network_interface_id: owned(item.network_interface_id()),
        public_ip: owned(item.public_ip()),
    })
}
