use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::EvalError;
use crate::judge::RetryPolicy;

const DEFAULT_LOG_ROTATE_SIZE: u64 = 10 * 1024 * 1024;
const DEFAULT_LOG_ROTATE_KEEP: usize = 5;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct EvalConfig {
    pub model: ModelConfig,
    pub generation: GenerationConfig,
    pub judge: JudgeConfig,
    pub paths: PathsConfig,
    pub logging: LoggingConfig,
}

impl EvalConfig {
    /// Parses a TOML document and validates it.
    pub fn from_toml_str(contents: &str) -> Result<Self, EvalError> {
        let config: EvalConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EvalError> {
        self.model.validate()?;
        if self.generation.max_out_tokens == 0 {
            return Err(EvalError::Config(
                "generation.max_out_tokens must be greater than zero".to_string(),
            ));
        }
        self.judge.retry.validate()?;
        if self.paths.model_name.trim().is_empty() {
            return Err(EvalError::Config(
                "paths.model_name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Hyperparameters of the story model.
///
/// Only `block_size`, `emb_size`, `vocab_size` and `max_length` shape
/// inference; the rest describe how the checkpoint was trained and are
/// logged alongside each run.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ModelConfig {
    pub block_size: usize,
    pub emb_size: usize,
    pub n_attention_heads: usize,
    pub n_encoder_blocks: usize,
    pub n_decoder_blocks: usize,
    pub dim_feedforward: usize,
    pub vocab_size: usize,
    pub dropout: f32,
    pub max_length: usize,
    pub lr: f64,
    pub batch_size: usize,
    pub epochs: usize,
    pub patience: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            block_size: 128,
            emb_size: 558,
            n_attention_heads: 18,
            n_encoder_blocks: 1,
            n_decoder_blocks: 1,
            dim_feedforward: 4096,
            vocab_size: 10_000,
            dropout: 0.1,
            max_length: 512,
            lr: 3e-4,
            batch_size: 32,
            epochs: 1,
            patience: 3,
        }
    }
}

impl ModelConfig {
    fn validate(&self) -> Result<(), EvalError> {
        if self.n_attention_heads == 0 || self.emb_size % self.n_attention_heads != 0 {
            return Err(EvalError::Config(format!(
                "model.emb_size ({}) must be divisible by model.n_attention_heads ({})",
                self.emb_size, self.n_attention_heads
            )));
        }
        if self.block_size == 0 {
            return Err(EvalError::Config(
                "model.block_size must be greater than zero".to_string(),
            ));
        }
        if self.block_size > self.max_length {
            return Err(EvalError::Config(format!(
                "model.block_size ({}) exceeds model.max_length ({})",
                self.block_size, self.max_length
            )));
        }
        if !(0.0..1.0).contains(&self.dropout) {
            return Err(EvalError::Config(format!(
                "model.dropout must be in [0, 1), got {}",
                self.dropout
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Tokens sampled per prompt.
    pub max_out_tokens: usize,
    /// Fixed RNG seed; entropy-seeded when absent.
    pub seed: Option<u64>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_out_tokens: 200,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct JudgeConfig {
    pub model: String,
    pub base_url: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Per-request timeout; the retry deadline bounds the whole call.
    pub timeout_seconds: Option<u64>,
    pub retry: RetryPolicy,
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            model: "gemini-1.5-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            timeout_seconds: Some(60),
            retry: RetryPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Names the run; the result table file is derived from it.
    pub model_name: String,
    pub working_dir: PathBuf,
    pub vocab_path: PathBuf,
    pub checkpoint_path: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            model_name: "custom-21".to_string(),
            working_dir: PathBuf::from("working"),
            vocab_path: PathBuf::from("vocab.json"),
            checkpoint_path: PathBuf::from("model/custom-21.json"),
        }
    }
}

impl PathsConfig {
    pub fn result_dir(&self) -> PathBuf {
        self.working_dir.join("result")
    }

    pub fn result_table_path(&self) -> PathBuf {
        self.result_dir()
            .join(format!("rating_df_{}.json", self.model_name))
    }

    /// Where an interrupted run's rows go, beside the complete table.
    pub fn partial_table_path(&self) -> PathBuf {
        self.result_dir()
            .join(format!("rating_df_{}.partial.json", self.model_name))
    }

    /// Complete runs replace the result table; interrupted ones never do.
    pub fn table_path_for(&self, interrupted: bool) -> PathBuf {
        if interrupted {
            self.partial_table_path()
        } else {
            self.result_table_path()
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub path: Option<PathBuf>,
    pub rotate_size: u64,
    pub rotate_keep: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            path: None,
            rotate_size: DEFAULT_LOG_ROTATE_SIZE,
            rotate_keep: DEFAULT_LOG_ROTATE_KEEP,
        }
    }
}
