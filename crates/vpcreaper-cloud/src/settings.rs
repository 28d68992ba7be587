//! Teardown tuning knobs

use crate::policy::{DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY, FILE_SYSTEM_MAX_RETRIES};
use std::time::Duration;

/// Settings shared by every step of one teardown run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeardownSettings {
    /// Retry budget for calls with a retry set
    pub max_retries: u32,

    /// Wait between retries
    pub retry_delay: Duration,

    /// Retry budget for filesystem deletion
    pub file_system_retries: u32,

    /// Wait after deleting mount targets before deleting filesystems
    pub mount_target_settle: Duration,

    /// Wait after discovering subnets before deleting them
    pub subnet_settle: Duration,

    /// Wait after revoking ingress rules before deleting security groups
    pub security_group_settle: Duration,

    /// Run the address release step
    pub release_addresses: bool,
}

impl Default for TeardownSettings {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
            file_system_retries: FILE_SYSTEM_MAX_RETRIES,
            mount_target_settle: Duration::from_secs(3),
            subnet_settle: Duration::from_secs(3),
            security_group_settle: Duration::from_secs(1),
            release_addresses: false,
        }
    }
}

impl TeardownSettings {
    /// Settings with every wait set to zero, for tests and fake providers
    pub fn immediate() -> Self {
        Self {
            retry_delay: Duration::ZERO,
            mount_target_settle: Duration::ZERO,
            subnet_settle: Duration::ZERO,
            security_group_settle: Duration::ZERO,
            ..Self::default()
        }
    }

    pub fn with_release_addresses(mut self, enabled: bool) -> Self {
        self.release_addresses = enabled;
        self
    }
}
