//! Error classification policies
//!
//! Each provider call carries an [`ErrorPolicy`] that sorts failure codes into
//! retry, allow and fatal sets. A code in none of the sets is unclassified and
//! escalates just like a fatal one.

use crate::code::ErrorCode;
use std::time::Duration;

/// Default retry budget per call
pub const DEFAULT_MAX_RETRIES: u32 = 20;

/// Default wait between retries
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Retry budget for deleting a filesystem whose mount targets are still detaching
pub const FILE_SYSTEM_MAX_RETRIES: u32 = 10;

/// Codes the provider returns for short-lived conditions on interface and
/// address mutations
const TRANSIENT: &[ErrorCode] = &[
    ErrorCode::AuthFailure,
    ErrorCode::UnsupportedOperation,
    ErrorCode::InvalidParameterValue,
    ErrorCode::OperationalError,
    ErrorCode::RequestLimitExceeded,
    ErrorCode::Throttling,
];

/// What to do with a failed call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Wait and try the same call again
    Retry,
    /// Target state already reached; treat as done
    Allow,
    /// Explicitly fatal; log at error level and abort
    Fatal,
    /// Not covered by the policy; abort
    Unclassified,
}

/// Per-call error classification
///
/// The three code sets are kept disjoint: adding a code to one set removes it
/// from the others.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorPolicy {
    retry: Vec<ErrorCode>,
    allow: Vec<ErrorCode>,
    fatal: Vec<ErrorCode>,
    max_retries: u32,
    retry_delay: Duration,
}

impl Default for ErrorPolicy {
    fn default() -> Self {
        Self {
            retry: Vec::new(),
            allow: Vec::new(),
            fatal: vec![ErrorCode::UnauthorizedOperation],
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl ErrorPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Retry on the given codes
    pub fn retry_on(mut self, codes: impl IntoIterator<Item = ErrorCode>) -> Self {
        for code in codes {
            self.allow.retain(|c| c != &code);
            self.fatal.retain(|c| c != &code);
            if !self.retry.contains(&code) {
                self.retry.push(code);
            }
        }
        self
    }

    /// Treat the given codes as success
    pub fn allow(mut self, codes: impl IntoIterator<Item = ErrorCode>) -> Self {
        for code in codes {
            self.retry.retain(|c| c != &code);
            self.fatal.retain(|c| c != &code);
            if !self.allow.contains(&code) {
                self.allow.push(code);
            }
        }
        self
    }

    /// Mark the given codes as explicitly fatal
    pub fn fatal_on(mut self, codes: impl IntoIterator<Item = ErrorCode>) -> Self {
        for code in codes {
            self.retry.retain(|c| c != &code);
            self.allow.retain(|c| c != &code);
            if !self.fatal.contains(&code) {
                self.fatal.push(code);
            }
        }
        self
    }

    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    pub fn retry_budget(&self) -> u32 {
        self.max_retries
    }

    pub fn delay(&self) -> Duration {
        self.retry_delay
    }

    pub fn classify(&self, code: &ErrorCode) -> Disposition {
        if self.retry.contains(code) {
            Disposition::Retry
        } else if self.allow.contains(code) {
            Disposition::Allow
        } else if self.fatal.contains(code) {
            Disposition::Fatal
        } else {
            Disposition::Unclassified
        }
    }

    // ---- Named per-call policies ----

    pub fn network_interface_detach() -> Self {
        Self::new()
            .allow([
                ErrorCode::OperationNotPermitted,
                ErrorCode::InvalidAttachmentIdNotFound,
            ])
            .retry_on(TRANSIENT.iter().cloned())
    }

    pub fn network_interface_delete() -> Self {
        Self::new()
            .allow([ErrorCode::InvalidNetworkInterfaceIdNotFound])
            .retry_on(TRANSIENT.iter().cloned())
    }

    pub fn mount_target_delete() -> Self {
        Self::new().allow([ErrorCode::MountTargetNotFound])
    }

    /// Mount targets take a while to detach, so the filesystem reports itself
    /// in use for a few attempts
    pub fn file_system_delete() -> Self {
        Self::new()
            .retry_on([ErrorCode::FileSystemInUse])
            .allow([ErrorCode::FileSystemNotFound])
            .max_retries(FILE_SYSTEM_MAX_RETRIES)
    }

    pub fn load_balancer_delete() -> Self {
        Self::new().allow([ErrorCode::LoadBalancerNotFound])
    }

    pub fn nat_gateway_delete() -> Self {
        Self::new().allow([ErrorCode::NatGatewayNotFound])
    }

    pub fn ingress_revoke() -> Self {
        Self::new().allow([
            ErrorCode::InvalidPermissionNotFound,
            ErrorCode::InvalidGroupNotFound,
        ])
    }

    pub fn security_group_delete() -> Self {
        Self::new().allow([ErrorCode::InvalidGroupNotFound])
    }

    pub fn internet_gateway_detach() -> Self {
        Self::new().allow([
            ErrorCode::GatewayNotAttached,
            ErrorCode::InvalidInternetGatewayIdNotFound,
        ])
    }

    pub fn internet_gateway_delete() -> Self {
        Self::new().allow([ErrorCode::InvalidInternetGatewayIdNotFound])
    }

    /// Interfaces released by earlier steps can linger on the subnet
    pub fn subnet_delete() -> Self {
        Self::new()
            .retry_on([ErrorCode::DependencyViolation])
            .allow([ErrorCode::InvalidSubnetIdNotFound])
    }

    /// The main route table cannot be deleted on its own; it goes with the VPC
    pub fn route_table_delete() -> Self {
        Self::new().allow([
            ErrorCode::DependencyViolation,
            ErrorCode::InvalidRouteTableIdNotFound,
        ])
    }

    pub fn vpc_endpoint_delete() -> Self {
        Self::new().allow([ErrorCode::InvalidVpcEndpointIdNotFound])
    }

    pub fn vpc_delete() -> Self {
        Self::new().allow([ErrorCode::InvalidVpcIdNotFound])
    }

    pub fn address_disassociate() -> Self {
        Self::new()
            .allow([
                ErrorCode::OperationNotPermitted,
                ErrorCode::InvalidAssociationIdNotFound,
            ])
            .retry_on(TRANSIENT.iter().cloned())
    }

    pub fn address_release() -> Self {
        Self::new()
            .allow([
                ErrorCode::OperationNotPermitted,
                ErrorCode::InvalidAttachmentIdNotFound,
                ErrorCode::InvalidAllocationIdNotFound,
            ])
            .retry_on(TRANSIENT.iter().cloned())
            .retry_on([ErrorCode::InvalidIpAddressInUse])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = ErrorPolicy::default();
        assert_eq!(policy.retry_budget(), 20);
        assert_eq!(policy.delay(), Duration::from_secs(5));
        assert_eq!(
            policy.classify(&ErrorCode::UnauthorizedOperation),
            Disposition::Fatal
        );
        assert_eq!(
            policy.classify(&ErrorCode::DependencyViolation),
            Disposition::Unclassified
        );
    }

    #[test]
    fn test_sets_stay_disjoint() {
        let policy = ErrorPolicy::new()
            .retry_on([ErrorCode::DependencyViolation])
            .allow([ErrorCode::DependencyViolation]);
        assert_eq!(
            policy.classify(&ErrorCode::DependencyViolation),
            Disposition::Allow
        );

        let policy = policy.fatal_on([ErrorCode::DependencyViolation]);
        assert_eq!(
            policy.classify(&ErrorCode::DependencyViolation),
            Disposition::Fatal
        );

        let policy = ErrorPolicy::new().retry_on([ErrorCode::UnauthorizedOperation]);
        assert_eq!(
            policy.classify(&ErrorCode::UnauthorizedOperation),
            Disposition::Retry
        );
    }

    #[test]
    fn test_network_interface_policies() {
        let detach = ErrorPolicy::network_interface_detach();
        assert_eq!(
            detach.classify(&ErrorCode::InvalidAttachmentIdNotFound),
            Disposition::Allow
        );
        assert_eq!(
            detach.classify(&ErrorCode::OperationNotPermitted),
            Disposition::Allow
        );
        assert_eq!(
            detach.classify(&ErrorCode::RequestLimitExceeded),
            Disposition::Retry
        );

        let delete = ErrorPolicy::network_interface_delete();
        assert_eq!(
            delete.classify(&ErrorCode::InvalidNetworkInterfaceIdNotFound),
            Disposition::Allow
        );
        assert_eq!(delete.classify(&ErrorCode::AuthFailure), Disposition::Retry);
    }

    #[test]
    fn test_file_system_policy_has_short_budget() {
        let policy = ErrorPolicy::file_system_delete();
        assert_eq!(policy.retry_budget(), FILE_SYSTEM_MAX_RETRIES);
        assert_eq!(
            policy.classify(&ErrorCode::FileSystemInUse),
            Disposition::Retry
        );
    }

    #[test]
    fn test_dependency_violation_differs_by_resource() {
        assert_eq!(
            ErrorPolicy::subnet_delete().classify(&ErrorCode::DependencyViolation),
            Disposition::Retry
        );
        assert_eq!(
            ErrorPolicy::route_table_delete().classify(&ErrorCode::DependencyViolation),
            Disposition::Allow
        );
        assert_eq!(
            ErrorPolicy::vpc_delete().classify(&ErrorCode::DependencyViolation),
            Disposition::Unclassified
        );
    }
}
