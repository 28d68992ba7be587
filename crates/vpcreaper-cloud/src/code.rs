//! Provider error codes
//!
//! Every code the teardown reasons about is a variant here. Codes the
//! provider may return but no policy mentions land in [`ErrorCode::Other`]
//! and are treated as unclassified by every policy.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Provider error code
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum ErrorCode {
    // Transient
    AuthFailure,
    UnsupportedOperation,
    InvalidParameterValue,
    OperationalError,
    RequestLimitExceeded,
    Throttling,

    // Permission
    OperationNotPermitted,
    UnauthorizedOperation,

    // Dependencies
    DependencyViolation,
    InvalidIpAddressInUse,
    FileSystemInUse,
    GatewayNotAttached,

    // Already gone
    InvalidAttachmentIdNotFound,
    InvalidNetworkInterfaceIdNotFound,
    InvalidVpcIdNotFound,
    InvalidGroupNotFound,
    InvalidPermissionNotFound,
    InvalidInternetGatewayIdNotFound,
    InvalidSubnetIdNotFound,
    InvalidRouteTableIdNotFound,
    InvalidVpcEndpointIdNotFound,
    NatGatewayNotFound,
    InvalidAllocationIdNotFound,
    InvalidAssociationIdNotFound,
    FileSystemNotFound,
    MountTargetNotFound,
    LoadBalancerNotFound,

    /// Any code not listed above
    Other(String),
}

impl ErrorCode {
    /// Parse a provider code string. Never fails: unknown codes become `Other`.
    pub fn parse(code: &str) -> Self {
        match code {
            "AuthFailure" => ErrorCode::AuthFailure,
            "UnsupportedOperation" => ErrorCode::UnsupportedOperation,
            "InvalidParameterValue" => ErrorCode::InvalidParameterValue,
            "OperationalError" => ErrorCode::OperationalError,
            "RequestLimitExceeded" => ErrorCode::RequestLimitExceeded,
            "Throttling" => ErrorCode::Throttling,
            "OperationNotPermitted" => ErrorCode::OperationNotPermitted,
            "UnauthorizedOperation" => ErrorCode::UnauthorizedOperation,
            "DependencyViolation" => ErrorCode::DependencyViolation,
            "InvalidIPAddress.InUse" => ErrorCode::InvalidIpAddressInUse,
            "FileSystemInUse" => ErrorCode::FileSystemInUse,
            "Gateway.NotAttached" => ErrorCode::GatewayNotAttached,
            "InvalidAttachmentID.NotFound" => ErrorCode::InvalidAttachmentIdNotFound,
            "InvalidNetworkInterfaceID.NotFound" => ErrorCode::InvalidNetworkInterfaceIdNotFound,
            "InvalidVpcID.NotFound" => ErrorCode::InvalidVpcIdNotFound,
            "InvalidGroup.NotFound" => ErrorCode::InvalidGroupNotFound,
            "InvalidPermission.NotFound" => ErrorCode::InvalidPermissionNotFound,
            "InvalidInternetGatewayID.NotFound" => ErrorCode::InvalidInternetGatewayIdNotFound,
            "InvalidSubnetID.NotFound" => ErrorCode::InvalidSubnetIdNotFound,
            "InvalidRouteTableID.NotFound" => ErrorCode::InvalidRouteTableIdNotFound,
            "InvalidVpcEndpointId.NotFound" => ErrorCode::InvalidVpcEndpointIdNotFound,
            "NatGatewayNotFound" => ErrorCode::NatGatewayNotFound,
            "InvalidAllocationID.NotFound" => ErrorCode::InvalidAllocationIdNotFound,
            "InvalidAssociationID.NotFound" => ErrorCode::InvalidAssociationIdNotFound,
            "FileSystemNotFound" => ErrorCode::FileSystemNotFound,
            "MountTargetNotFound" => ErrorCode::MountTargetNotFound,
            "LoadBalancerNotFound" => ErrorCode::LoadBalancerNotFound,
            other => ErrorCode::Other(other.to_string()),
        }
    }

    /// Wire representation of the code
    pub fn as_str(&self) -> &str {
        match self {
            ErrorCode::AuthFailure => "AuthFailure",
            ErrorCode::UnsupportedOperation => "UnsupportedOperation",
            ErrorCode::InvalidParameterValue => "InvalidParameterValue",
            ErrorCode::OperationalError => "OperationalError",
            ErrorCode::RequestLimitExceeded => "RequestLimitExceeded",
            ErrorCode::Throttling => "Throttling",
            ErrorCode::OperationNotPermitted => "OperationNotPermitted",
            ErrorCode::UnauthorizedOperation => "UnauthorizedOperation",
            ErrorCode::DependencyViolation => "DependencyViolation",
            ErrorCode::InvalidIpAddressInUse => "InvalidIPAddress.InUse",
            ErrorCode::FileSystemInUse => "FileSystemInUse",
            ErrorCode::GatewayNotAttached => "Gateway.NotAttached",
            ErrorCode::InvalidAttachmentIdNotFound => "InvalidAttachmentID.NotFound",
            ErrorCode::InvalidNetworkInterfaceIdNotFound => "InvalidNetworkInterfaceID.NotFound",
            ErrorCode::InvalidVpcIdNotFound => "InvalidVpcID.NotFound",
            ErrorCode::InvalidGroupNotFound => "InvalidGroup.NotFound",
            ErrorCode::InvalidPermissionNotFound => "InvalidPermission.NotFound",
            ErrorCode::InvalidInternetGatewayIdNotFound => "InvalidInternetGatewayID.NotFound",
            ErrorCode::InvalidSubnetIdNotFound => "InvalidSubnetID.NotFound",
            ErrorCode::InvalidRouteTableIdNotFound => "InvalidRouteTableID.NotFound",
            ErrorCode::InvalidVpcEndpointIdNotFound => "InvalidVpcEndpointId.NotFound",
            ErrorCode::NatGatewayNotFound => "NatGatewayNotFound",
            ErrorCode::InvalidAllocationIdNotFound => "InvalidAllocationID.NotFound",
            ErrorCode::InvalidAssociationIdNotFound => "InvalidAssociationID.NotFound",
            ErrorCode::FileSystemNotFound => "FileSystemNotFound",
            ErrorCode::MountTargetNotFound => "MountTargetNotFound",
            ErrorCode::LoadBalancerNotFound => "LoadBalancerNotFound",
            ErrorCode::Other(code) => code,
        }
    }

    /// Whether the provider is asking us to slow down
    pub fn is_throttling(&self) -> bool {
        matches!(
            self,
            ErrorCode::RequestLimitExceeded | ErrorCode::Throttling
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for ErrorCode {
    fn from(code: &str) -> Self {
        ErrorCode::parse(code)
    }
}

impl From<String> for ErrorCode {
    fn from(code: String) -> Self {
        ErrorCode::parse(&code)
    }
}

impl From<ErrorCode> for String {
    fn from(code: ErrorCode) -> Self {
        code.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dotted_codes() {
        assert_eq!(
            ErrorCode::parse("InvalidAttachmentID.NotFound"),
            ErrorCode::InvalidAttachmentIdNotFound
        );
        assert_eq!(
            ErrorCode::parse("InvalidIPAddress.InUse"),
            ErrorCode::InvalidIpAddressInUse
        );
        assert_eq!(
            ErrorCode::InvalidVpcIdNotFound.as_str(),
            "InvalidVpcID.NotFound"
        );
    }

    #[test]
    fn test_unknown_code_is_preserved() {
        let code = ErrorCode::parse("IncorrectState");
        assert_eq!(code, ErrorCode::Other("IncorrectState".to_string()));
        assert_eq!(code.to_string(), "IncorrectState");
    }

    #[test]
    fn test_throttling_codes() {
        assert!(ErrorCode::RequestLimitExceeded.is_throttling());
        assert!(ErrorCode::Throttling.is_throttling());
        assert!(!ErrorCode::AuthFailure.is_throttling());
    }

    #[test]
    fn test_serde_uses_wire_string() {
        let json = serde_json::to_string(&ErrorCode::GatewayNotAttached).unwrap();
        assert_eq!(json, "\"Gateway.NotAttached\"");

        let code: ErrorCode = serde_json::from_str("\"DependencyViolation\"").unwrap();
        assert_eq!(code, ErrorCode::DependencyViolation);
    }
}
