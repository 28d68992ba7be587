//! Teardown error types

use crate::code::ErrorCode;
use crate::teardown::Step;
use thiserror::Error;

/// Error returned by a single provider call
///
/// Carries the provider-defined code and message untouched so that an
/// escalated error reads exactly as the provider reported it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{code}: {message}")]
pub struct ProviderError {
    pub code: ErrorCode,
    pub message: String,
}

impl ProviderError {
    pub fn new(code: impl Into<ErrorCode>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Teardown errors
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("Step '{step}' aborted the teardown: {source}")]
    StepFailed {
        step: Step,
        #[source]
        source: ProviderError,
    },

    #[error("Invalid network id: {0:?}")]
    InvalidNetworkId(String),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
}

impl CloudError {
    /// The provider error at the root of this failure, if any
    pub fn provider_error(&self) -> Option<&ProviderError> {
        match self {
            CloudError::StepFailed { source, .. } => Some(source),
            CloudError::Provider(err) => Some(err),
            CloudError::InvalidNetworkId(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, CloudError>;
