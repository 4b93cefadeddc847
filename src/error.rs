use std::path::PathBuf;

use thiserror::Error;

/// Error types that can occur while generating, judging or tabulating stories.
#[derive(Debug, Error)]
pub enum EvalError {
    /// HTTP request/response errors
    #[error("HTTP error: {0}")]
    HttpError(String),
    /// Authentication and authorization errors
    #[error("Auth error: {0}")]
    AuthError(String),
    /// Invalid request parameters or format
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    /// Errors returned by the judge service
    #[error("Provider error: {0}")]
    ProviderError(String),
    /// API response parsing or format error
    #[error("Response format error: {message}. Raw response: {raw_response}")]
    ResponseFormatError {
        message: String,
        raw_response: String,
    },
    /// JSON serialization/deserialization errors
    #[error("JSON parse error: {0}")]
    JsonError(String),
    /// Filesystem errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// A checkpoint, vocabulary or result table is not where the config says
    #[error("{kind} not found at {}", path.display())]
    MissingArtifact { kind: ArtifactKind, path: PathBuf },
    /// Checkpoint tensors do not match the configured model
    #[error("Checkpoint error: {0}")]
    Checkpoint(String),
    /// Invalid or unreadable configuration
    #[error("Config error: {0}")]
    Config(String),
    /// Generic error
    #[error("Generic error: {0}")]
    Generic(String),
    /// Retry attempts exceeded
    #[error("Retry attempts exceeded after {attempts} tries: {last_error}")]
    RetryExceeded { attempts: usize, last_error: String },
}

/// Persisted artifacts the pipeline reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Checkpoint,
    Vocabulary,
    ResultTable,
    PromptFile,
    Config,
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ArtifactKind::Checkpoint => "model checkpoint",
            ArtifactKind::Vocabulary => "vocabulary",
            ArtifactKind::ResultTable => "result table",
            ArtifactKind::PromptFile => "prompt file",
            ArtifactKind::Config => "config file",
        };
        f.write_str(name)
    }
}

impl EvalError {
    /// Maps a file read failure onto `MissingArtifact` when the file is absent.
    pub(crate) fn from_read(kind: ArtifactKind, path: &std::path::Path, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            EvalError::MissingArtifact {
                kind,
                path: path.to_path_buf(),
            }
        } else {
            EvalError::Io(err)
        }
    }
}

/// Converts reqwest HTTP errors into EvalErrors
impl From<reqwest::Error> for EvalError {
    fn from(err: reqwest::Error) -> Self {
        EvalError::HttpError(err.to_string())
    }
}

impl From<serde_json::Error> for EvalError {
    fn from(err: serde_json::Error) -> Self {
        EvalError::JsonError(format!(
            "{} at line {} column {}",
            err,
            err.line(),
            err.column()
        ))
    }
}

impl From<toml::de::Error> for EvalError {
    fn from(err: toml::de::Error) -> Self {
        EvalError::Config(err.to_string())
    }
}
