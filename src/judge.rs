//! External judge: rubric composition, the provider seam, retry and the client
//! the pipeline talks to.

#[path = "judge/retry.rs"]
mod retry;

#[path = "judge/resilient.rs"]
mod resilient;

#[path = "judge/google.rs"]
pub mod google;

#[path = "judge/client.rs"]
mod client;

#[path = "judge/rubric.rs"]
pub mod rubric;

use async_trait::async_trait;

use crate::error::EvalError;

pub use client::JudgeClient;
pub use resilient::ResilientJudge;
pub use retry::RetryPolicy;

/// Reply from a judge service.
pub trait JudgeResponse: std::fmt::Debug + Send + Sync {
    /// Text of the first candidate, if the service produced one.
    fn text(&self) -> Option<String>;
}

/// A service that rates a composed evaluation prompt.
#[async_trait]
pub trait JudgeProvider: Send + Sync {
    async fn judge(&self, composed_text: &str) -> Result<Box<dyn JudgeResponse>, EvalError>;
}
