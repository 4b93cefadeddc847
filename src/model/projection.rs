use crate::config::ModelConfig;
use crate::error::EvalError;

use super::checkpoint::Checkpoint;
use super::LanguageModel;

pub const EMBEDDING: &str = "embedding.weight";
pub const POSITIONAL_ENCODING: &str = "positional_encoding";
pub const OUTPUT_WEIGHT: &str = "fc_out.weight";
pub const OUTPUT_BIAS: &str = "fc_out.bias";

/// Embedding and output head of a trained story model.
///
/// The context is embedded with learned positional encodings, mean-pooled,
/// and projected onto the vocabulary by the output layer.
#[derive(Debug, Clone)]
pub struct ProjectionLm {
    vocab_size: usize,
    emb_size: usize,
    max_length: usize,
    embedding: Vec<f32>,
    positional: Vec<f32>,
    out_weight: Vec<f32>,
    out_bias: Vec<f32>,
}

impl ProjectionLm {
    pub fn from_checkpoint(checkpoint: &Checkpoint, config: &ModelConfig) -> Result<Self, EvalError> {
        let (v, e, l) = (config.vocab_size, config.emb_size, config.max_length);
        let embedding = checkpoint.tensor(EMBEDDING, &[v, e])?.data.clone();
        let positional = checkpoint.tensor(POSITIONAL_ENCODING, &[1, l, e])?.data.clone();
        let out_weight = checkpoint.tensor(OUTPUT_WEIGHT, &[v, e])?.data.clone();
        let out_bias = checkpoint.tensor(OUTPUT_BIAS, &[v])?.data.clone();
        let unused = unused_tensors(checkpoint);
        if !unused.is_empty() {
            log::warn!(
                "scoring with embedding and output head only; {} checkpoint tensors unused: {}",
                unused.len(),
                unused.join(", ")
            );
        }
        Ok(Self {
            vocab_size: v,
            emb_size: e,
            max_length: l,
            embedding,
            positional,
            out_weight,
            out_bias,
        })
    }

    fn row<'a>(matrix: &'a [f32], idx: usize, width: usize) -> &'a [f32] {
        &matrix[idx * width..(idx + 1) * width]
    }

    fn pooled_context(&self, context: &[u32]) -> Result<Vec<f32>, EvalError> {
        let mut hidden = vec![0.0f32; self.emb_size];
        for (pos, &token) in context.iter().enumerate() {
            let token = token as usize;
            if token >= self.vocab_size {
                return Err(EvalError::InvalidRequest(format!(
                    "token id {token} outside vocabulary of {}",
                    self.vocab_size
                )));
            }
            let emb = Self::row(&self.embedding, token, self.emb_size);
            let pe = Self::row(&self.positional, pos, self.emb_size);
            for ((h, a), b) in hidden.iter_mut().zip(emb).zip(pe) {
                *h += a + b;
            }
        }
        let scale = 1.0 / context.len() as f32;
        hidden.iter_mut().for_each(|h| *h *= scale);
        Ok(hidden)
    }
}

/// Checkpoint tensors the projection model does not read.
fn unused_tensors(checkpoint: &Checkpoint) -> Vec<&str> {
    const USED: [&str; 4] = [EMBEDDING, POSITIONAL_ENCODING, OUTPUT_WEIGHT, OUTPUT_BIAS];
    checkpoint
        .model_state_dict
        .keys()
        .map(String::as_str)
        .filter(|name| !USED.contains(name))
        .collect()
}

impl LanguageModel for ProjectionLm {
    fn vocab_size(&self) -> usize {
        self.vocab_size
    }

    fn max_context(&self) -> usize {
        self.max_length
    }

    fn next_token_logits(&self, context: &[u32]) -> Result<Vec<f32>, EvalError> {
        if context.is_empty() || context.len() > self.max_length {
            return Err(EvalError::InvalidRequest(format!(
                "context of {} tokens, expected 1..={}",
                context.len(),
                self.max_length
            )));
        }
        let hidden = self.pooled_context(context)?;
        let logits = (0..self.vocab_size)
            .map(|v| {
                let w = Self::row(&self.out_weight, v, self.emb_size);
                self.out_bias[v] + w.iter().zip(&hidden).map(|(a, b)| a * b).sum::<f32>()
            })
            .collect();
        Ok(logits)
    }
}
