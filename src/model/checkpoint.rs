use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ArtifactKind, EvalError};

/// A dense row-major tensor as stored in a checkpoint.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TensorData {
    pub shape: Vec<usize>,
    pub data: Vec<f32>,
}

impl TensorData {
    pub fn new(shape: Vec<usize>, data: Vec<f32>) -> Result<Self, EvalError> {
        let tensor = Self { shape, data };
        tensor.check_len()?;
        Ok(tensor)
    }

    fn check_len(&self) -> Result<(), EvalError> {
        let expected = self
            .shape
            .iter()
            .try_fold(1usize, |acc, &dim| acc.checked_mul(dim))
            .ok_or_else(|| {
                EvalError::Checkpoint(format!("tensor shape {:?} overflows", self.shape))
            })?;
        if expected != self.data.len() {
            return Err(EvalError::Checkpoint(format!(
                "tensor of shape {:?} holds {} values, expected {expected}",
                self.shape,
                self.data.len()
            )));
        }
        Ok(())
    }
}

/// Saved model parameters plus the optimizer state they were trained with.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Checkpoint {
    pub model_state_dict: BTreeMap<String, TensorData>,
    #[serde(default)]
    pub optimizer_state_dict: serde_json::Value,
}

impl Checkpoint {
    pub fn load(path: &Path) -> Result<Self, EvalError> {
        let data =
            fs::read(path).map_err(|err| EvalError::from_read(ArtifactKind::Checkpoint, path, err))?;
        let checkpoint: Checkpoint = serde_json::from_slice(&data)?;
        for (name, tensor) in &checkpoint.model_state_dict {
            tensor
                .check_len()
                .map_err(|err| EvalError::Checkpoint(format!("{name}: {err}")))?;
        }
        log::info!(
            "loaded checkpoint with {} tensors ({} parameters) from {}",
            checkpoint.model_state_dict.len(),
            checkpoint.parameter_count(),
            path.display()
        );
        Ok(checkpoint)
    }

    pub fn save(&self, path: &Path) -> Result<(), EvalError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_vec(self)?)?;
        Ok(())
    }

    pub fn parameter_count(&self) -> usize {
        self.model_state_dict.values().map(|t| t.data.len()).sum()
    }

    /// Looks up a tensor and checks its shape.
    pub fn tensor(&self, name: &str, shape: &[usize]) -> Result<&TensorData, EvalError> {
        let tensor = self
            .model_state_dict
            .get(name)
            .ok_or_else(|| EvalError::Checkpoint(format!("missing tensor {name}")))?;
        if tensor.shape != shape {
            return Err(EvalError::Checkpoint(format!(
                "tensor {name} has shape {:?}, expected {shape:?}",
                tensor.shape
            )));
        }
        Ok(tensor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tensor_length_must_match_shape() {
        assert!(TensorData::new(vec![2, 3], vec![0.0; 6]).is_ok());
        assert!(matches!(
            TensorData::new(vec![2, 3], vec![0.0; 5]),
            Err(EvalError::Checkpoint(_))
        ));
    }

    #[test]
    fn oversized_shape_is_an_error() {
        assert!(matches!(
            TensorData::new(vec![usize::MAX, 2], vec![0.0; 2]),
            Err(EvalError::Checkpoint(msg)) if msg.contains("overflows")
        ));
    }

    #[test]
    fn save_then_load_keeps_tensors() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("model").join("tiny.json");
        let mut state = BTreeMap::new();
        state.insert(
            "fc_out.bias".to_string(),
            TensorData::new(vec![2], vec![0.5, -0.5]).expect("tensor"),
        );
        let checkpoint = Checkpoint {
            model_state_dict: state,
            optimizer_state_dict: serde_json::json!({"lr": 0.0003}),
        };
        checkpoint.save(&path).expect("save");

        let loaded = Checkpoint::load(&path).expect("load");
        assert_eq!(loaded.parameter_count(), 2);
        assert_eq!(loaded.tensor("fc_out.bias", &[2]).expect("bias").data, vec![0.5, -0.5]);
        assert!(loaded.tensor("fc_out.bias", &[3]).is_err());
        assert!(loaded.tensor("fc_out.weight", &[2, 2]).is_err());
    }

    #[test]
    fn corrupt_tensor_is_rejected_on_load() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("bad.json");
        fs::write(
            &path,
            r#"{"model_state_dict":{"w":{"shape":[2,2],"data":[1.0]}}}"#,
        )
        .expect("write");
        assert!(matches!(Checkpoint::load(&path), Err(EvalError::Checkpoint(msg)) if msg.starts_with("w:")));
    }

    #[test]
    fn missing_checkpoint_is_reported() {
        let dir = tempfile::tempdir().expect("temp dir");
        assert!(matches!(
            Checkpoint::load(&dir.path().join("absent.json")),
            Err(EvalError::MissingArtifact {
                kind: ArtifactKind::Checkpoint,
                ..
            })
        ));
    }
}
