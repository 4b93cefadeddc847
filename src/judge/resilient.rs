use async_trait::async_trait;
use tokio::time::{sleep, timeout, Instant};

use crate::error::EvalError;

use super::retry::RetryPolicy;
use super::{JudgeProvider, JudgeResponse};

/// Resilient wrapper that retries transient judge failures with exponential backoff.
pub struct ResilientJudge {
    inner: Box<dyn JudgeProvider>,
    policy: RetryPolicy,
}

impl ResilientJudge {
    pub fn new(inner: Box<dyn JudgeProvider>, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    fn is_retryable(err: &EvalError) -> bool {
        match err {
            EvalError::HttpError(_) => true,
            EvalError::ProviderError(_) => true,
            EvalError::ResponseFormatError { .. } => true,
            EvalError::JsonError(_) => true,
            EvalError::Generic(_) => true,
            EvalError::RetryExceeded { .. } => false,
            EvalError::AuthError(_) => false,
            EvalError::InvalidRequest(_) => false,
            EvalError::Io(_) => false,
            EvalError::MissingArtifact { .. } => false,
            EvalError::Checkpoint(_) => false,
            EvalError::Config(_) => false,
        }
    }
}

#[async_trait]
impl JudgeProvider for ResilientJudge {
    async fn judge(&self, composed_text: &str) -> Result<Box<dyn JudgeResponse>, EvalError> {
        let started = Instant::now();
        let deadline = self.policy.deadline();
        let mut attempt = 0usize;

        loop {
            // A zero deadline leaves the single attempt to the request timeout.
            let outcome = if deadline.is_zero() {
                self.inner.judge(composed_text).await
            } else {
                let remaining = deadline.saturating_sub(started.elapsed());
                match timeout(remaining, self.inner.judge(composed_text)).await {
                    Ok(outcome) => outcome,
                    Err(_) => Err(EvalError::HttpError(format!(
                        "judge call exceeded retry deadline of {}ms",
                        self.policy.deadline_ms
                    ))),
                }
            };

            let err = match outcome {
                Ok(response) => return Ok(response),
                Err(err) if !Self::is_retryable(&err) => return Err(err),
                Err(err) => err,
            };

            let delay = self.policy.backoff(attempt);
            if delay.is_zero() || started.elapsed() + delay >= deadline {
                return Err(EvalError::RetryExceeded {
                    attempts: attempt + 1,
                    last_error: err.to_string(),
                });
            }
            log::debug!(
                "judge attempt {} failed ({err}); retrying in {}ms",
                attempt + 1,
                delay.as_millis()
            );
            sleep(delay).await;
            attempt += 1;
        }
    }
}
