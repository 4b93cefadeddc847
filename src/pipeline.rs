//! Drives each prompt through generation, judging and parsing.

use std::future::Future;

use crate::generator::Generator;
use crate::judge::{rubric, JudgeClient};
use crate::model::LanguageModel;
use crate::parser::{self, Verdict};
use crate::table::{ResultTable, ScoreRecord};

/// Table produced by a run and whether it stopped early.
#[derive(Debug)]
pub struct RunOutcome {
    pub table: ResultTable,
    pub interrupted: bool,
}

/// Sequential generate, judge, parse loop over a prompt list.
pub struct Pipeline<M> {
    generator: Generator<M>,
    judge: JudgeClient,
    max_new_tokens: usize,
}

impl<M: LanguageModel> Pipeline<M> {
    pub fn new(generator: Generator<M>, judge: JudgeClient, max_new_tokens: usize) -> Self {
        Self {
            generator,
            judge,
            max_new_tokens,
        }
    }

    /// Scores every prompt in order, one row each.
    pub async fn run(&mut self, prompts: &[String]) -> ResultTable {
        let outcome = self
            .run_with_shutdown(prompts, std::future::pending())
            .await;
        outcome.table
    }

    /// Like [`Pipeline::run`], but stops once `shutdown` resolves.
    ///
    /// Rows completed before the signal are kept; the prompt in flight when it
    /// fires gets no row.
    pub async fn run_with_shutdown<F>(&mut self, prompts: &[String], shutdown: F) -> RunOutcome
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut table = ResultTable::with_capacity(prompts.len());

        for (count, prompt) in prompts.iter().enumerate() {
            let record = tokio::select! {
                biased;
                _ = &mut shutdown => {
                    log::warn!(
                        "interrupted after {} of {} prompts; discarding in-flight row",
                        table.len(),
                        prompts.len()
                    );
                    return RunOutcome { table, interrupted: true };
                }
                record = self.score(count, prompt) => record,
            };
            table.push(record);
        }

        log::info!(
            "scored {} prompts ({} unscored)",
            table.len(),
            table.sentinel_count()
        );
        RunOutcome {
            table,
            interrupted: false,
        }
    }

    async fn score(&mut self, count: usize, prompt: &str) -> ScoreRecord {
        let generation = match self.generator.generate(prompt, self.max_new_tokens) {
            Ok(generation) => generation,
            Err(err) => {
                log::warn!("{count}- generation failed for {prompt:?}: {err}");
                return ScoreRecord::sentinel(prompt);
            }
        };

        let composed = rubric::compose(&generation.prompt, &generation.continuation);
        let response = self.judge.evaluate(&composed).await;
        log::info!(
            "{count}- {prompt}; {}",
            response.as_deref().unwrap_or("<no response>")
        );

        let verdict = parser::parse(response.as_deref());
        if let Verdict::Malformed(raw) = &verdict {
            log::warn!("{count}- judge reply did not match the rubric layout: {raw:?}");
        }
        ScoreRecord::from_verdict(prompt, &verdict)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;
    use proptest::prelude::*;

    use super::*;
    use crate::config::EvalConfig;
    use crate::error::EvalError;
    use crate::judge::{JudgeProvider, JudgeResponse};
    use crate::parser::AgeGroup;
    use crate::tokenizer::WordTokenizer;

    const CANONICAL: &str =
        "Grammar: 8/10; Consistency: 7/10; Creativity: 7/10; Plot: 6/10; Age group: E";

    struct Uniform;

    impl LanguageModel for Uniform {
        fn vocab_size(&self) -> usize {
            16
        }

        fn max_context(&self) -> usize {
            64
        }

        fn next_token_logits(&self, _context: &[u32]) -> Result<Vec<f32>, EvalError> {
            Ok(vec![0.0; 16])
        }
    }

    #[derive(Debug)]
    struct Reply(Option<String>);

    impl JudgeResponse for Reply {
        fn text(&self) -> Option<String> {
            self.0.clone()
        }
    }

    /// Replays scripted replies and records what it was asked.
    struct Scripted {
        replies: Mutex<Vec<Option<String>>>,
        seen: Arc<Mutex<Vec<String>>>,
        delay: Duration,
    }

    impl Scripted {
        fn new(replies: Vec<Option<&str>>) -> Self {
            let mut replies: Vec<Option<String>> =
                replies.into_iter().map(|r| r.map(str::to_string)).collect();
            replies.reverse();
            Self {
                replies: Mutex::new(replies),
                seen: Arc::new(Mutex::new(Vec::new())),
                delay: Duration::ZERO,
            }
        }
    }

    #[async_trait]
    impl JudgeProvider for Scripted {
        async fn judge(&self, composed: &str) -> Result<Box<dyn JudgeResponse>, EvalError> {
            self.seen.lock().expect("lock").push(composed.to_string());
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            let reply = self.replies.lock().expect("lock").pop().flatten();
            Ok(Box::new(Reply(reply)))
        }
    }

    fn pipeline(judge: Scripted) -> Pipeline<Uniform> {
        let tokenizer = WordTokenizer::from_words(["once", "upon", "a", "time", "fox", "ran"])
            .expect("vocab");
        let mut config = EvalConfig::default();
        config.generation.seed = Some(7);
        let generator = Generator::new(Uniform, tokenizer, &config).expect("generator");
        Pipeline::new(generator, JudgeClient::new(Box::new(judge)), 5)
    }

    fn prompts(items: &[&str]) -> Vec<String> {
        items.iter().map(|p| p.to_string()).collect()
    }

    #[tokio::test]
    async fn canonical_reply_becomes_one_scored_row() {
        let judge = Scripted::new(vec![Some(CANONICAL)]);
        let seen = Arc::clone(&judge.seen);
        let table = pipeline(judge).run(&prompts(&["Once upon a time"])).await;

        assert_eq!(table.len(), 1);
        let row = &table.records()[0];
        assert_eq!(row.prompt, "Once upon a time");
        assert_eq!(
            (row.grammar, row.consistency, row.creativity, row.plot),
            (8, 7, 7, 6)
        );
        assert_eq!(row.age_group, AgeGroup::E);

        let seen = seen.lock().expect("lock");
        assert_eq!(seen.len(), 1);
        assert!(seen[0].contains("Once upon a time Story begins here:***"));
    }

    #[tokio::test]
    async fn unusable_replies_keep_their_rows() {
        let judge = Scripted::new(vec![Some("I refuse."), None, Some(CANONICAL)]);
        let table = pipeline(judge)
            .run(&prompts(&["first", "second", "third"]))
            .await;

        let ages: Vec<AgeGroup> = table.records().iter().map(|r| r.age_group).collect();
        assert_eq!(ages, [AgeGroup::Dnf, AgeGroup::Dnf, AgeGroup::E]);
        assert_eq!(table.sentinel_count(), 2);
    }

    #[tokio::test]
    async fn failed_generation_records_a_sentinel() {
        let judge = Scripted::new(vec![Some(CANONICAL)]);
        let seen = Arc::clone(&judge.seen);
        let table = pipeline(judge).run(&prompts(&["   ", "once"])).await;

        assert_eq!(table.len(), 2);
        assert!(table.records()[0].is_sentinel());
        assert_eq!(table.records()[1].grammar, 8);
        assert_eq!(seen.lock().expect("lock").len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_discards_the_in_flight_row() {
        let mut judge = Scripted::new(vec![Some(CANONICAL); 3]);
        judge.delay = Duration::from_secs(10);
        let mut pipeline = pipeline(judge);

        let outcome = pipeline
            .run_with_shutdown(
                &prompts(&["one", "two", "three"]),
                tokio::time::sleep(Duration::from_secs(15)),
            )
            .await;

        assert!(outcome.interrupted);
        assert_eq!(outcome.table.len(), 1);
        assert_eq!(outcome.table.records()[0].prompt, "one");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]
        #[test]
        fn one_row_per_prompt_in_order(items in prop::collection::vec("[a-z]{1,8}", 0..12)) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("runtime");
            let judge = Scripted::new(vec![Some(CANONICAL); items.len()]);
            let table = runtime.block_on(pipeline(judge).run(&items));
            let got: Vec<&str> = table.records().iter().map(|r| r.prompt.as_str()).collect();
            let want: Vec<&str> = items.iter().map(String::as_str).collect();
            prop_assert_eq!(got, want);
        }
    }
}
