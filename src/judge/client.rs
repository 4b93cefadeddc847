use crate::config::JudgeConfig;
use crate::error::EvalError;

use super::google::GoogleJudge;
use super::resilient::ResilientJudge;
use super::JudgeProvider;

/// Front door the pipeline uses to rate a composed prompt.
///
/// Every failure, including an empty candidate list and an exhausted retry
/// policy, collapses to `None` after a warning.
pub struct JudgeClient {
    provider: Box<dyn JudgeProvider>,
}

impl JudgeClient {
    pub fn new(provider: Box<dyn JudgeProvider>) -> Self {
        Self { provider }
    }

    /// Gemini behind the configured retry policy.
    pub fn from_config(config: &JudgeConfig) -> Result<Self, EvalError> {
        let google = GoogleJudge::from_config(config)?;
        log::info!(
            "judge: {} (retry initial={}ms x{} max={}ms deadline={}ms)",
            google.model(),
            config.retry.initial_delay_ms,
            config.retry.multiplier,
            config.retry.max_delay_ms,
            config.retry.deadline_ms
        );
        log::debug!("judge retry sleeps: {:?}", config.retry.schedule());
        Ok(Self::new(Box::new(ResilientJudge::new(
            Box::new(google),
            config.retry.clone(),
        ))))
    }

    pub async fn evaluate(&self, composed_text: &str) -> Option<String> {
        match self.provider.judge(composed_text).await {
            Ok(response) => {
                let text = response.text();
                if text.is_none() {
                    log::warn!(
                        "No valid candidates in the judge response. Check the generated text or API settings."
                    );
                }
                text
            }
            Err(err) => {
                log::warn!("judge call failed: {err}");
                None
            }
        }
    }
}
