//! SDK error mapping
//!
//! Every SDK failure becomes a [`ProviderError`] carrying the service's error
//! code verbatim, so the per-call policies can classify it.

use aws_sdk_ec2::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_ec2::types::UnsuccessfulItem;
use vpcreaper_cloud::ProviderError;

/// Code used when the service answered without an error code
pub const UNKNOWN_CODE: &str = "Unknown";

/// Convert an SDK error from any of the AWS clients
pub fn from_sdk<E, R>(err: SdkError<E, R>) -> ProviderError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug + Send + Sync + 'static,
{
    match &err {
        SdkError::ServiceError(service) => {
            let inner = service.err();
            ProviderError::new(
                inner.code().unwrap_or(UNKNOWN_CODE),
                inner.message().unwrap_or_default(),
            )
        }
        SdkError::TimeoutError(_) => {
            ProviderError::new("TimeoutError", DisplayErrorContext(&err).to_string())
        }
        SdkError::DispatchFailure(_) => {
            ProviderError::new("DispatchFailure", DisplayErrorContext(&err).to_string())
        }
        SdkError::ConstructionFailure(_) => {
            ProviderError::new("ConstructionFailure", DisplayErrorContext(&err).to_string())
        }
        _ => ProviderError::new("ResponseError", DisplayErrorContext(&err).to_string()),
    }
}

/// EC2 batch calls report per-item failures in the response body instead of
/// failing the request. The first one is surfaced as the call's error.
pub fn from_unsuccessful(items: &[UnsuccessfulItem]) -> Option<ProviderError> {
    let item = items.first()?;
    let (code, message) = item
        .error()
        .map(|e| (e.code().unwrap_or(UNKNOWN_CODE), e.message().unwrap_or_default()))
        .unwrap_or((UNKNOWN_CODE, ""));
    let message = match item.resource_id() {
        Some(id) if !message.contains(id) => format!("{id}: {message}"),
        _ => message.to_string(),
    };
    Some(ProviderError::new(code, message))
}
