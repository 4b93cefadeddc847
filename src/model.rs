//! Story model seam and the checkpoint-backed model shipped with the crate.

#[path = "model/checkpoint.rs"]
mod checkpoint;

#[path = "model/projection.rs"]
mod projection;

use crate::error::EvalError;

pub use checkpoint::{Checkpoint, TensorData};
pub use projection::ProjectionLm;

/// A trained next-token model. Parameters are read-only during inference.
pub trait LanguageModel {
    /// Number of ids the model scores.
    fn vocab_size(&self) -> usize;

    /// Longest context the model accepts.
    fn max_context(&self) -> usize;

    /// Unnormalized scores for the token following `context`.
    ///
    /// `context` is non-empty and no longer than [`Self::max_context`].
    fn next_token_logits(&self, context: &[u32]) -> Result<Vec<f32>, EvalError>;
}
