//! Resource descriptors returned by describe calls
//!
//! Descriptors are fetched fresh by each reaper and dropped once the step is
//! done. They carry the resource id plus whatever ties the resource to the
//! network.

use serde::{Deserialize, Serialize};

/// Compute instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    pub id: String,
    pub vpc_id: Option<String>,
    pub state: InstanceState,
}

/// Instance lifecycle state, reduced to what the teardown cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InstanceState {
    Pending,
    Running,
    Stopping,
    Stopped,
    ShuttingDown,
    Terminated,
    Unknown,
}

/// Application/network load balancer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadBalancer {
    pub arn: String,
    pub name: String,
    pub vpc_id: Option<String>,
}

/// Classic load balancer, identified by name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassicLoadBalancer {
    pub name: String,
    pub vpc_id: Option<String>,
}

/// Shared filesystem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSystem {
    pub id: String,
}

/// Shared filesystem mount target, tied to the network through its subnet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountTarget {
    pub id: String,
    pub file_system_id: String,
    pub subnet_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NatGateway {
    pub id: String,
    pub vpc_id: Option<String>,
    pub state: NatGatewayState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NatGatewayState {
    Pending,
    Available,
    Failed,
    Deleting,
    Deleted,
    Unknown,
}

impl NatGatewayState {
    /// Already on its way out; deleting again is pointless
    pub fn is_gone(self) -> bool {
        matches!(self, NatGatewayState::Deleting | NatGatewayState::Deleted)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkInterface {
    pub id: String,
    pub vpc_id: Option<String>,
    pub subnet_id: Option<String>,
    /// Present while the interface is attached to an instance or service
    pub attachment_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityGroup {
    pub id: String,
    pub name: String,
    pub vpc_id: Option<String>,
    pub ingress: Vec<IpPermission>,
}

impl SecurityGroup {
    /// Every network has one default group; it cannot be deleted
    pub fn is_default(&self) -> bool {
        self.name == "default"
    }
}

/// One ingress rule as the provider reports it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpPermission {
    pub protocol: String,
    pub from_port: Option<i32>,
    pub to_port: Option<i32>,
    pub cidr_ranges: Vec<String>,
    pub group_pairs: Vec<GroupPair>,
}

/// Reference to another security group inside a rule
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupPair {
    pub group_id: String,
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InternetGateway {
    pub id: String,
    pub attached_vpc_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subnet {
    pub id: String,
    pub vpc_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteTable {
    pub id: String,
    pub vpc_id: Option<String>,
    /// The main route table goes away with the network itself
    pub main: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VpcEndpoint {
    pub id: String,
    pub vpc_id: Option<String>,
}

/// Elastic (floating) address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub allocation_id: String,
    pub association_id: Option<String>,
    pub network_interface_id: Option<String>,
    pub public_ip: Option<String>,
}

// ============ Mutation requests ============

/// Parameters for one ingress revocation call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevokeIngress {
    pub group_id: String,
    /// Flat CIDR rule fields
    pub cidr: Option<CidrRule>,
    /// Nested permission list for group-reference rules
    pub permissions: Vec<GroupPermission>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CidrRule {
    pub protocol: String,
    pub from_port: Option<i32>,
    pub to_port: Option<i32>,
    pub cidr: String,
}

/// Group-reference permission with only the fields revocation accepts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupPermission {
    pub protocol: String,
    pub from_port: Option<i32>,
    pub to_port: Option<i32>,
    pub group_pairs: Vec<GroupPair>,
}

impl RevokeIngress {
    /// Build the revocation for one ingress rule.
    ///
    /// Only the first CIDR range is revoked; the remaining ranges of the rule
    /// are reported again by the next describe and revoked on a re-run.
    /// Returns `None` for rules with neither CIDR ranges nor group references.
    pub fn from_permission(group_id: &str, permission: &IpPermission) -> Option<Self> {
        let cidr = permission.cidr_ranges.first().map(|cidr| CidrRule {
            protocol: permission.protocol.clone(),
            from_port: permission.from_port,
            to_port: permission.to_port,
            cidr: cidr.clone(),
        });

        let permissions = if permission.group_pairs.is_empty() {
            Vec::new()
        } else {
            vec![GroupPermission {
                protocol: permission.protocol.clone(),
                from_port: permission.from_port,
                to_port: permission.to_port,
                group_pairs: permission.group_pairs.clone(),
            }]
        };

        if cidr.is_none() && permissions.is_empty() {
            return None;
        }

        Some(Self {
            group_id: group_id.to_string(),
            cidr,
            permissions,
        })
    }
}
