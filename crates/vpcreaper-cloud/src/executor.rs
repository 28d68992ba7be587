//! Call executor
//!
//! Wraps one provider call with an [`ErrorPolicy`]:
//!
//! - success returns `Some(result)`
//! - a retryable code spends one unit of the retry budget, waits and calls
//!   again; an exhausted budget gives up with `Ok(None)` so the rest of the
//!   teardown can still run
//! - an allowed code returns `Ok(None)`
//! - a fatal or unclassified code returns the provider error unchanged

use crate::context::TeardownContext;
use crate::error::ProviderError;
use crate::policy::{Disposition, ErrorPolicy};
use std::future::Future;

/// Execute `call` under `policy`.
///
/// The budget is a local counter, so one policy value can be reused across
/// calls without carrying spent retries over.
pub async fn execute<T, F, Fut>(
    ctx: &TeardownContext,
    operation: &str,
    target: &str,
    policy: &ErrorPolicy,
    mut call: F,
) -> Result<Option<T>, ProviderError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    let mut remaining = policy.retry_budget();
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;
        let err = match call().await {
            Ok(result) => {
                tracing::trace!(operation, target, attempt, "Call succeeded");
                return Ok(Some(result));
            }
            Err(err) => err,
        };

        match policy.classify(&err.code) {
            Disposition::Retry => {
                remaining = remaining.saturating_sub(1);
                if remaining == 0 {
                    tracing::warn!(
                        operation,
                        target,
                        attempts = attempt,
                        code = %err.code,
                        "Ran out of retries, giving up on this call"
                    );
                    return Ok(None);
                }
                tracing::trace!(
                    operation,
                    target,
                    retries_left = remaining,
                    code = %err.code,
                    "Retrying"
                );
                tokio::time::sleep(policy.delay()).await;
            }
            Disposition::Allow => {
                tracing::trace!(operation, target, code = %err.code, "Allowed error");
                return Ok(None);
            }
            Disposition::Fatal => {
                tracing::error!(
                    operation,
                    target,
                    vpc_id = %ctx.vpc_id,
                    code = %err.code,
                    message = %err.message,
                    "Unhandled error"
                );
                return Err(err);
            }
            Disposition::Unclassified => {
                tracing::error!(
                    operation,
                    target,
                    vpc_id = %ctx.vpc_id,
                    code = %err.code,
                    message = %err.message,
                    "Error executing provider call"
                );
                return Err(err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::ErrorCode;
    use crate::settings::TeardownSettings;
    use std::cell::Cell;
    use std::time::Duration;

    fn ctx() -> TeardownContext {
        TeardownContext::new("vpc-test", false, TeardownSettings::default())
    }

    /// Fails with `code` for the first `failures` attempts, then succeeds
    async fn flaky(
        calls: &Cell<u32>,
        failures: u32,
        code: ErrorCode,
    ) -> Result<&'static str, ProviderError> {
        calls.set(calls.get() + 1);
        if calls.get() <= failures {
            Err(ProviderError::new(code, "try again"))
        } else {
            Ok("done")
        }
    }

    #[tokio::test]
    async fn test_success_returns_result_unchanged() {
        let calls = Cell::new(0);
        let result = execute(&ctx(), "op", "id", &ErrorPolicy::new(), || {
            flaky(&calls, 0, ErrorCode::AuthFailure)
        })
        .await
        .unwrap();

        assert_eq!(result, Some("done"));
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_until_success() {
        let calls = Cell::new(0);
        let policy = ErrorPolicy::new()
            .retry_on([ErrorCode::DependencyViolation])
            .max_retries(5);

        let started = tokio::time::Instant::now();
        let result = execute(&ctx(), "op", "id", &policy, || {
            flaky(&calls, 3, ErrorCode::DependencyViolation)
        })
        .await
        .unwrap();

        assert_eq!(result, Some("done"));
        assert_eq!(calls.get(), 4);
        // Three failures, three waits
        assert_eq!(started.elapsed(), Duration::from_secs(15));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_budget_is_not_an_error() {
        let calls = Cell::new(0);
        let policy = ErrorPolicy::new()
            .retry_on([ErrorCode::FileSystemInUse])
            .max_retries(10)
            .retry_delay(Duration::from_millis(100));

        let started = tokio::time::Instant::now();
        let result = execute(&ctx(), "op", "id", &policy, || {
            flaky(&calls, u32::MAX, ErrorCode::FileSystemInUse)
        })
        .await
        .unwrap();

        assert_eq!(result, None);
        assert_eq!(calls.get(), 10);
        assert_eq!(started.elapsed(), Duration::from_millis(900));
    }

    #[tokio::test]
    async fn test_zero_budget_gives_up_after_first_attempt() {
        let calls = Cell::new(0);
        let policy = ErrorPolicy::new()
            .retry_on([ErrorCode::Throttling])
            .max_retries(0);

        let result = execute(&ctx(), "op", "id", &policy, || {
            flaky(&calls, u32::MAX, ErrorCode::Throttling)
        })
        .await
        .unwrap();

        assert_eq!(result, None);
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test]
    async fn test_allowed_error_ignores_budget() {
        let calls = Cell::new(0);
        let policy = ErrorPolicy::new()
            .allow([ErrorCode::InvalidVpcIdNotFound])
            .max_retries(0);

        let result = execute(&ctx(), "op", "id", &policy, || {
            flaky(&calls, u32::MAX, ErrorCode::InvalidVpcIdNotFound)
        })
        .await
        .unwrap();

        assert_eq!(result, None);
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test]
    async fn test_fatal_error_propagates() {
        let calls = Cell::new(0);
        let policy = ErrorPolicy::new().fatal_on([ErrorCode::OperationNotPermitted]);

        let err = execute(&ctx(), "op", "id", &policy, || {
            flaky(&calls, u32::MAX, ErrorCode::OperationNotPermitted)
        })
        .await
        .unwrap_err();

        assert_eq!(err.code, ErrorCode::OperationNotPermitted);
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test]
    async fn test_unclassified_error_propagates_unchanged() {
        let policy = ErrorPolicy::new()
            .retry_on([ErrorCode::Throttling])
            .allow([ErrorCode::InvalidGroupNotFound]);

        let err = execute(&ctx(), "op", "id", &policy, || async {
            Err::<(), _>(ProviderError::new("IncorrectState", "vpc is busy"))
        })
        .await
        .unwrap_err();

        assert_eq!(err.code, ErrorCode::Other("IncorrectState".to_string()));
        assert_eq!(err.message, "vpc is busy");
    }
}
