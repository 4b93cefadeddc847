//! Google Gemini judge backend.
//!
//! Sends the composed evaluation prompt as a single user turn to the
//! `generateContent` endpoint and exposes the first candidate's text.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::config::JudgeConfig;
use crate::error::EvalError;

use super::{JudgeProvider, JudgeResponse};

/// Configuration for the Gemini judge.
#[derive(Debug)]
pub struct GoogleConfig {
    pub api_key: SecretString,
    pub model: String,
    pub base_url: String,
    pub timeout_seconds: Option<u64>,
}

/// Client for Google's Gemini `generateContent` API.
///
/// The client uses `Arc` internally for configuration, making cloning cheap.
#[derive(Debug, Clone)]
pub struct GoogleJudge {
    pub config: Arc<GoogleConfig>,
    pub client: Client,
}

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<GoogleContent<'a>>,
}

#[derive(Serialize)]
struct GoogleContent<'a> {
    role: &'a str,
    parts: Vec<GooglePart<'a>>,
}

#[derive(Serialize)]
struct GooglePart<'a> {
    text: &'a str,
}

#[derive(Deserialize, Debug)]
pub struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<GoogleCandidate>,
}

#[derive(Deserialize, Debug)]
struct GoogleCandidate {
    content: Option<GoogleResponseContent>,
}

#[derive(Deserialize, Debug)]
struct GoogleResponseContent {
    #[serde(default)]
    parts: Vec<GoogleResponsePart>,
}

#[derive(Deserialize, Debug)]
struct GoogleResponsePart {
    text: Option<String>,
}

#[derive(Deserialize, Debug)]
struct GoogleErrorBody {
    error: GoogleErrorDetail,
}

#[derive(Deserialize, Debug)]
struct GoogleErrorDetail {
    message: String,
}

impl JudgeResponse for GenerateContentResponse {
    fn text(&self) -> Option<String> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|content| content.parts.first())
            .and_then(|part| part.text.clone())
    }
}

impl GoogleJudge {
    pub fn new(
        api_key: SecretString,
        model: impl Into<String>,
        base_url: impl Into<String>,
        timeout_seconds: Option<u64>,
    ) -> Result<Self, EvalError> {
        let mut builder = Client::builder();
        if let Some(sec) = timeout_seconds {
            builder = builder.timeout(Duration::from_secs(sec));
        }
        let client = builder.build()?;
        Ok(Self::with_client(
            client,
            api_key,
            model,
            base_url,
            timeout_seconds,
        ))
    }

    /// Creates a new Gemini judge with a custom HTTP client.
    pub fn with_client(
        client: Client,
        api_key: SecretString,
        model: impl Into<String>,
        base_url: impl Into<String>,
        timeout_seconds: Option<u64>,
    ) -> Self {
        Self {
            config: Arc::new(GoogleConfig {
                api_key,
                model: model.into(),
                base_url: base_url.into(),
                timeout_seconds,
            }),
            client,
        }
    }

    /// Builds the judge from config, reading the key from `api_key_env`.
    pub fn from_config(config: &JudgeConfig) -> Result<Self, EvalError> {
        let key = std::env::var(&config.api_key_env).map_err(|_| {
            EvalError::AuthError(format!(
                "environment variable {} is not set",
                config.api_key_env
            ))
        })?;
        Self::new(
            SecretString::new(key),
            config.model.clone(),
            config.base_url.clone(),
            config.timeout_seconds,
        )
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

fn status_error(status: StatusCode, body: &str) -> EvalError {
    let message = serde_json::from_str::<GoogleErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| body.to_string());
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            EvalError::AuthError(format!("{status}: {message}"))
        }
        StatusCode::TOO_MANY_REQUESTS => EvalError::ProviderError(format!("{status}: {message}")),
        s if s.is_server_error() => EvalError::ProviderError(format!("{status}: {message}")),
        _ => EvalError::InvalidRequest(format!("{status}: {message}")),
    }
}

#[async_trait]
impl JudgeProvider for GoogleJudge {
    async fn judge(&self, composed_text: &str) -> Result<Box<dyn JudgeResponse>, EvalError> {
        if self.config.api_key.expose_secret().is_empty() {
            return Err(EvalError::AuthError("Missing Google API key".to_string()));
        }

        let body = GenerateContentRequest {
            contents: vec![GoogleContent {
                role: "user",
                parts: vec![GooglePart {
                    text: composed_text,
                }],
            }],
        };

        if log::log_enabled!(log::Level::Trace) {
            if let Ok(json) = serde_json::to_string(&body) {
                log::trace!("Google request payload: {}", json);
            }
        }

        let resp = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", self.config.api_key.expose_secret().as_str())
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        log::debug!("Google HTTP status: {}", status);

        let text = resp.text().await?;
        if !status.is_success() {
            return Err(status_error(status, &text));
        }

        let parsed: GenerateContentResponse =
            serde_json::from_str(&text).map_err(|err| EvalError::ResponseFormatError {
                message: err.to_string(),
                raw_response: text.clone(),
            })?;
        Ok(Box::new(parsed))
    }
}
