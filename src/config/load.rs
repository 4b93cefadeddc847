use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ArtifactKind, EvalError};

use super::types::EvalConfig;

/// `~/.config/story-eval/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join("story-eval").join("config.toml"))
}

/// Loads the run configuration.
///
/// An explicit path must exist. Without one, the default location is tried and
/// built-in defaults are used when it holds no file.
pub fn load_config(path_override: Option<&Path>) -> Result<EvalConfig, EvalError> {
    if let Some(path) = path_override {
        return read_config(path);
    }
    match default_config_path() {
        Some(path) => match read_config(&path) {
            Err(EvalError::MissingArtifact { .. }) => {
                log::debug!("no config at {}, using defaults", path.display());
                Ok(EvalConfig::default())
            }
            other => other,
        },
        None => Ok(EvalConfig::default()),
    }
}

fn read_config(path: &Path) -> Result<EvalConfig, EvalError> {
    let contents = fs::read_to_string(path)
        .map_err(|err| EvalError::from_read(ArtifactKind::Config, path, err))?;
    EvalConfig::from_toml_str(&contents)
}
