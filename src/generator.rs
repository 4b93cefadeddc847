//! Autoregressive continuation of story prompts.

use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::EvalConfig;
use crate::error::EvalError;
use crate::model::LanguageModel;
use crate::tokenizer::WordTokenizer;

/// A prompt and the text sampled after it.
#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
    pub prompt: String,
    pub continuation: String,
    /// Sampled ids, prompt excluded.
    pub new_tokens: Vec<u32>,
}

/// Samples continuations from a [`LanguageModel`].
pub struct Generator<M> {
    model: M,
    tokenizer: WordTokenizer,
    block_size: usize,
    rng: StdRng,
}

impl<M: LanguageModel> Generator<M> {
    pub fn new(model: M, tokenizer: WordTokenizer, config: &EvalConfig) -> Result<Self, EvalError> {
        if tokenizer.vocab_size() > model.vocab_size() {
            return Err(EvalError::Checkpoint(format!(
                "vocabulary has {} tokens but the model scores only {}",
                tokenizer.vocab_size(),
                model.vocab_size()
            )));
        }
        let block_size = config.model.block_size.min(model.max_context());
        let rng = match config.generation.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            model,
            tokenizer,
            block_size,
            rng,
        })
    }

    /// Samples exactly `max_new_tokens` tokens after `prompt`.
    ///
    /// Each step conditions on the last `block_size` tokens of the running
    /// sequence. There is no early stop on end-of-sequence.
    pub fn generate(&mut self, prompt: &str, max_new_tokens: usize) -> Result<Generation, EvalError> {
        if prompt.trim().is_empty() {
            return Err(EvalError::InvalidRequest("prompt must not be empty".to_string()));
        }
        if max_new_tokens == 0 {
            return Err(EvalError::InvalidRequest(
                "max_new_tokens must be greater than zero".to_string(),
            ));
        }

        let mut tokens = self.tokenizer.encode(prompt);
        let prompt_len = tokens.len();
        tokens.reserve(max_new_tokens);

        for _ in 0..max_new_tokens {
            let start = tokens.len().saturating_sub(self.block_size);
            let logits = self.model.next_token_logits(&tokens[start..])?;
            let next = self.sample(&logits)?;
            tokens.push(next);
        }

        let new_tokens = tokens.split_off(prompt_len);
        let continuation = self.tokenizer.decode(&new_tokens);
        log::debug!(
            "generated {} tokens for prompt of {} tokens",
            new_tokens.len(),
            prompt_len
        );
        Ok(Generation {
            prompt: prompt.to_string(),
            continuation,
            new_tokens,
        })
    }

    fn sample(&mut self, logits: &[f32]) -> Result<u32, EvalError> {
        let probs = softmax(logits);
        let dist = WeightedIndex::new(&probs)
            .map_err(|err| EvalError::Generic(format!("cannot sample from logits: {err}")))?;
        Ok(dist.sample(&mut self.rng) as u32)
    }
}

/// Numerically stable softmax.
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&x| (x - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|x| x / sum).collect()
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use proptest::prelude::*;

    use super::*;

    /// Strongly prefers `favourite` and records every context it sees.
    struct Recording {
        vocab: usize,
        favourite: u32,
        contexts: RefCell<Vec<usize>>,
    }

    impl Recording {
        fn new(vocab: usize, favourite: u32) -> Self {
            Self {
                vocab,
                favourite,
                contexts: RefCell::new(Vec::new()),
            }
        }
    }

    impl LanguageModel for Recording {
        fn vocab_size(&self) -> usize {
            self.vocab
        }

        fn max_context(&self) -> usize {
            512
        }

        fn next_token_logits(&self, context: &[u32]) -> Result<Vec<f32>, EvalError> {
            self.contexts.borrow_mut().push(context.len());
            let mut logits = vec![-1e9; self.vocab];
            logits[self.favourite as usize] = 0.0;
            Ok(logits)
        }
    }

    fn vocab() -> WordTokenizer {
        WordTokenizer::from_words(["once", "upon", "a", "time", "fox"]).expect("vocab")
    }

    fn config(block_size: usize) -> EvalConfig {
        let mut config = EvalConfig::default();
        config.model.block_size = block_size;
        config.generation.seed = Some(42);
        config
    }

    #[test]
    fn samples_exactly_the_requested_tokens() {
        let mut generator =
            Generator::new(Recording::new(9, 4), vocab(), &config(128)).expect("generator");
        let out = generator.generate("Once upon a time", 3).expect("generation");
        assert_eq!(out.new_tokens, vec![4, 4, 4]);
        assert_eq!(out.continuation, "fox fox fox");
        assert_eq!(out.prompt, "Once upon a time");
    }

    #[test]
    fn context_is_truncated_to_block_size() {
        let mut generator =
            Generator::new(Recording::new(9, 0), vocab(), &config(5)).expect("generator");
        generator.generate("once upon a time", 4).expect("generation");
        assert_eq!(*generator.model.contexts.borrow(), vec![4, 5, 5, 5]);
    }

    #[test]
    fn special_tokens_are_dropped_from_continuation() {
        let tok = vocab();
        let eos = tok.token_id(crate::tokenizer::EOS_TOKEN).expect("eos");
        let mut generator =
            Generator::new(Recording::new(9, eos), tok, &config(128)).expect("generator");
        let out = generator.generate("once", 2).expect("generation");
        assert_eq!(out.new_tokens.len(), 2);
        assert_eq!(out.continuation, "");
    }

    #[test]
    fn rejects_empty_prompt_and_zero_tokens() {
        let mut generator =
            Generator::new(Recording::new(9, 0), vocab(), &config(128)).expect("generator");
        assert!(matches!(
            generator.generate("   ", 3),
            Err(EvalError::InvalidRequest(_))
        ));
        assert!(matches!(
            generator.generate("once", 0),
            Err(EvalError::InvalidRequest(_))
        ));
    }

    #[test]
    fn model_smaller_than_vocabulary_is_rejected() {
        assert!(matches!(
            Generator::new(Recording::new(3, 0), vocab(), &config(128)),
            Err(EvalError::Checkpoint(_))
        ));
    }

    #[test]
    fn softmax_sums_to_one() {
        let probs = softmax(&[1.0, 2.0, 3.0]);
        let total: f32 = probs.iter().sum();
        assert!((total - 1.0).abs() < 1e-6);
        assert!(probs[2] > probs[1] && probs[1] > probs[0]);
    }

    proptest! {
        #[test]
        fn continuation_length_ignores_prompt_length(
            words in prop::collection::vec("[a-z]{1,6}", 1..40),
            max_new in 1usize..30,
        ) {
            let mut generator =
                Generator::new(Recording::new(9, 1), vocab(), &config(8)).expect("generator");
            let out = generator.generate(&words.join(" "), max_new).expect("generation");
            prop_assert_eq!(out.new_tokens.len(), max_new);
        }
    }
}
