use std::path::{Path, PathBuf};

use anyhow::Context;

use story_eval::compare::{self, LabeledTable};
use story_eval::config::EvalConfig;
use story_eval::generator::Generator;
use story_eval::judge::JudgeClient;
use story_eval::model::{Checkpoint, ProjectionLm};
use story_eval::pipeline::Pipeline;
use story_eval::prompts::{default_prompts, load_prompts};
use story_eval::tokenizer::WordTokenizer;

pub async fn run_batch(
    config: &EvalConfig,
    prompt_file: Option<&Path>,
    limit: Option<usize>,
) -> anyhow::Result<()> {
    let mut prompts = match prompt_file {
        Some(path) => load_prompts(path)?,
        None => default_prompts(),
    };
    if let Some(limit) = limit {
        prompts.truncate(limit);
    }

    let tokenizer = WordTokenizer::load(&config.paths.vocab_path)?;
    let checkpoint = Checkpoint::load(&config.paths.checkpoint_path)?;
    log::info!("model hyperparameters: {:?}", config.model);
    let model = ProjectionLm::from_checkpoint(&checkpoint, &config.model)?;
    let generator = Generator::new(model, tokenizer, config)?;
    let judge = JudgeClient::from_config(&config.judge)?;

    let mut pipeline = Pipeline::new(generator, judge, config.generation.max_out_tokens);
    log::info!(
        "scoring {} prompts as {}",
        prompts.len(),
        config.paths.model_name
    );
    let outcome = pipeline.run_with_shutdown(&prompts, interrupted()).await;

    let path = config.paths.table_path_for(outcome.interrupted);
    outcome
        .table
        .persist(&path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    if outcome.interrupted {
        log::warn!(
            "run interrupted; saved {} of {} rows to {}, {} left untouched",
            outcome.table.len(),
            prompts.len(),
            path.display(),
            config.paths.result_table_path().display()
        );
    }
    println!("{}", path.display());
    Ok(())
}

/// Resolves on Ctrl-C. Never resolves if the handler cannot be installed.
async fn interrupted() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        log::warn!("cannot listen for Ctrl-C: {err}");
        std::future::pending::<()>().await;
    }
}

pub fn compare_tables(paths: &[PathBuf]) -> anyhow::Result<()> {
    let tables = paths
        .iter()
        .map(|path| LabeledTable::load(path))
        .collect::<Result<Vec<_>, _>>()?;
    let comparison = compare::compare(&tables)?;
    print!("{comparison}");
    Ok(())
}

pub fn list_prompts() {
    for (idx, prompt) in default_prompts().iter().enumerate() {
        println!("{:>3}  {prompt}", idx + 1);
    }
}
