//! Per-run teardown context

use crate::error::ProviderError;
use crate::executor;
use crate::policy::ErrorPolicy;
use crate::settings::TeardownSettings;
use std::future::Future;
use std::time::Duration;

/// Read-only state threaded through every reaper and provider call
#[derive(Debug, Clone)]
pub struct TeardownContext {
    pub vpc_id: String,
    pub dry_run: bool,
    pub settings: TeardownSettings,
}

impl TeardownContext {
    pub fn new(vpc_id: impl Into<String>, dry_run: bool, settings: TeardownSettings) -> Self {
        Self {
            vpc_id: vpc_id.into(),
            dry_run,
            settings,
        }
    }

    /// Apply the run-wide retry settings to a per-call policy
    pub fn policy(&self, policy: ErrorPolicy) -> ErrorPolicy {
        policy
            .max_retries(self.settings.max_retries)
            .retry_delay(self.settings.retry_delay)
    }

    /// Run a mutating provider call through the executor.
    ///
    /// Under dry-run the call is announced and never made; the result is
    /// `Ok(None)`, the same as an allowed error.
    pub async fn mutate<T, F, Fut>(
        &self,
        operation: &str,
        target: &str,
        policy: &ErrorPolicy,
        call: F,
    ) -> Result<Option<T>, ProviderError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        if self.dry_run {
            tracing::info!(operation, target, "Dry run: skipping {operation}");
            return Ok(None);
        }
        executor::execute(self, operation, target, policy, call).await
    }

    /// Wait for provider-side eventual consistency. Nothing changed under
    /// dry-run, so there is nothing to wait for.
    pub async fn settle(&self, reason: &str, delay: Duration) {
        if delay.is_zero() || self.dry_run {
            return;
        }
        tracing::debug!(reason, delay_ms = delay.as_millis() as u64, "Settling");
        tokio::time::sleep(delay).await;
    }
}
