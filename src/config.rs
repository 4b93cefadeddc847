//! Run configuration.
//!
//! One immutable [`EvalConfig`] is read at startup and handed by reference to
//! each component's constructor. Nothing reads configuration after that.

#[path = "config/types.rs"]
mod types;

#[path = "config/load.rs"]
mod load;

pub use load::{default_config_path, load_config};
pub use types::{
    EvalConfig, GenerationConfig, JudgeConfig, LoggingConfig, ModelConfig, PathsConfig,
};
