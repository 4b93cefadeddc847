//! Story generation and LLM-judged scoring.
//!
//! A trained story model continues each seed prompt, an external judge grades
//! the continuation against a fixed rubric, and the parsed grades are collected
//! into a result table that is written once per run. Tables from different
//! models can then be compared.
//!
//! ```no_run
//! use story_eval::config::load_config;
//! use story_eval::generator::Generator;
//! use story_eval::judge::JudgeClient;
//! use story_eval::model::{Checkpoint, ProjectionLm};
//! use story_eval::pipeline::Pipeline;
//! use story_eval::prompts::default_prompts;
//! use story_eval::tokenizer::WordTokenizer;
//!
//! # async fn demo() -> Result<(), story_eval::EvalError> {
//! let config = load_config(None)?;
//! let tokenizer = WordTokenizer::load(&config.paths.vocab_path)?;
//! let checkpoint = Checkpoint::load(&config.paths.checkpoint_path)?;
//! let model = ProjectionLm::from_checkpoint(&checkpoint, &config.model)?;
//! let generator = Generator::new(model, tokenizer, &config)?;
//! let judge = JudgeClient::from_config(&config.judge)?;
//!
//! let mut pipeline = Pipeline::new(generator, judge, config.generation.max_out_tokens);
//! let table = pipeline.run(&default_prompts()).await;
//! table.persist(&config.paths.result_table_path())?;
//! # Ok(())
//! # }
//! ```

/// Side-by-side statistics over result tables
pub mod compare;
/// Run configuration
pub mod config;
/// Error types
pub mod error;
/// Prompt continuation by sampling
pub mod generator;
/// Judge client, retry policy and rubric
pub mod judge;
/// Next-token model seam and checkpoint loading
pub mod model;
/// Judge reply parsing
pub mod parser;
/// The generate, judge, parse loop
pub mod pipeline;
/// Seed prompts
pub mod prompts;
/// Result rows and their persistence
pub mod table;
/// Word-level tokenizer
pub mod tokenizer;

pub use error::EvalError;
