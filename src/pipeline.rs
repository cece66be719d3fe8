//! Timeout and retry around every outbound request.
//!
//! Only transport failures and timeouts are retried. Any HTTP response,
//! including 4xx and 5xx, goes straight back to the caller.

use crate::constants::{default_backoff_base, default_timeout, DEFAULT_RETRIES};
use crate::error::{Error, Result, TransportError};
use crate::host::{Notice, Notifier, RecoveryAction, Severity};
use crate::transport::{HttpRequest, HttpResponse, Transport};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Budget for one attempt, including reading the body.
    pub timeout: Duration,
    /// Extra attempts after the first.
    pub retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            timeout: default_timeout(),
            retries: DEFAULT_RETRIES,
            base_delay: default_backoff_base(),
        }
    }
}

impl RetryPolicy {
    pub fn attempts(&self) -> u32 {
        self.retries.saturating_add(1)
    }

    /// Sleep after the failed attempt at `attempt_index` (0-based).
    pub fn delay_for(&self, attempt_index: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt_index))
    }
}

pub struct RequestPipeline<T> {
    transport: T,
    policy: RetryPolicy,
    notifier: Arc<dyn Notifier>,
    web_app_url: String,
}

impl<T: Transport> RequestPipeline<T> {
    pub fn new(
        transport: T,
        policy: RetryPolicy,
        notifier: Arc<dyn Notifier>,
        web_app_url: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            policy,
            notifier,
            web_app_url: web_app_url.into(),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let attempts = self.policy.attempts();
        let mut attempt = 0;
        loop {
            tracing::debug!(
                method = %request.method,
                url = %request.url,
                attempt = attempt + 1,
                "sending request"
            );
            let outcome =
                tokio::time::timeout(self.policy.timeout, self.transport.send(request.clone()))
                    .await;
            let err = match outcome {
                Ok(Ok(response)) => return Ok(response),
                Ok(Err(err)) => err,
                Err(_) => TransportError::Timeout(self.policy.timeout),
            };

            attempt += 1;
            if attempt >= attempts {
                tracing::warn!(url = %request.url, attempts, error = %err, "giving up on request");
                self.notifier.notify(
                    Notice::new(Severity::Failure, "Could not reach the links service")
                        .message(format!("Failed after {attempts} attempt(s): {err}"))
                        .action(RecoveryAction::OpenWebApp(self.web_app_url.clone())),
                );
                return Err(Error::Network {
                    attempts,
                    source: err,
                });
            }

            let delay = self.policy.delay_for(attempt - 1);
            tracing::warn!(
                url = %request.url,
                attempt,
                ?delay,
                error = %err,
                "request failed, retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }
}
