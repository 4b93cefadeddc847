//! Side-by-side statistics over result tables from different models.

#[path = "compare/stats.rs"]
pub mod stats;

#[path = "compare/report.rs"]
mod report;

use std::fmt;
use std::path::Path;

use crate::error::EvalError;
use crate::parser::AgeGroup;
use crate::table::{ResultTable, ScoreRecord};

pub use stats::PairedTTest;

/// Score columns compared across tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Criterion {
    Grammar,
    Creativity,
    Consistency,
}

impl Criterion {
    pub const ALL: [Criterion; 3] = [
        Criterion::Grammar,
        Criterion::Creativity,
        Criterion::Consistency,
    ];

    pub fn score(&self, record: &ScoreRecord) -> f64 {
        let value = match self {
            Criterion::Grammar => record.grammar,
            Criterion::Creativity => record.creativity,
            Criterion::Consistency => record.consistency,
        };
        f64::from(value)
    }

    fn column(&self, table: &ResultTable) -> Vec<f64> {
        table.records().iter().map(|r| self.score(r)).collect()
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Criterion::Grammar => "Grammar",
            Criterion::Creativity => "Creativity",
            Criterion::Consistency => "Consistency",
        };
        f.write_str(name)
    }
}

/// A result table and the name it is reported under.
#[derive(Debug, Clone)]
pub struct LabeledTable {
    pub label: String,
    pub table: ResultTable,
}

impl LabeledTable {
    /// Loads a table, labelling it with the file stem.
    pub fn load(path: &Path) -> Result<Self, EvalError> {
        let table = ResultTable::load(path)?;
        let label = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { label, table })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CriterionSummary {
    pub criterion: Criterion,
    pub mean: Option<f64>,
    pub std: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableSummary {
    pub label: String,
    pub rows: usize,
    pub criteria: Vec<CriterionSummary>,
    /// Share of rows per age group, every group listed.
    pub age_groups: Vec<(AgeGroup, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PairOutcome {
    Tested(PairedTTest),
    Skipped(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PairwiseTest {
    pub left: String,
    pub right: String,
    pub criterion: Criterion,
    pub outcome: PairOutcome,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub summaries: Vec<TableSummary>,
    pub tests: Vec<PairwiseTest>,
}

pub fn summarize(labeled: &LabeledTable) -> TableSummary {
    let criteria = Criterion::ALL
        .iter()
        .map(|&criterion| {
            let column = criterion.column(&labeled.table);
            CriterionSummary {
                criterion,
                mean: stats::mean(&column),
                std: stats::sample_std(&column),
            }
        })
        .collect();
    TableSummary {
        label: labeled.label.clone(),
        rows: labeled.table.len(),
        criteria,
        age_groups: age_distribution(&labeled.table),
    }
}

/// Normalized age-group counts; all zero for an empty table.
pub fn age_distribution(table: &ResultTable) -> Vec<(AgeGroup, f64)> {
    let total = table.len();
    AgeGroup::ALL
        .iter()
        .map(|&group| {
            let count = table
                .records()
                .iter()
                .filter(|r| r.age_group == group)
                .count();
            let share = if total == 0 {
                0.0
            } else {
                count as f64 / total as f64
            };
            (group, share)
        })
        .collect()
}

/// Summaries for every table and paired t-tests for every pair and criterion.
pub fn compare(tables: &[LabeledTable]) -> Result<Comparison, EvalError> {
    if tables.len() < 2 {
        return Err(EvalError::InvalidRequest(format!(
            "comparison needs at least two tables, got {}",
            tables.len()
        )));
    }

    let summaries = tables.iter().map(summarize).collect();
    let mut tests = Vec::new();
    for (i, left) in tables.iter().enumerate() {
        for right in &tables[i + 1..] {
            for criterion in Criterion::ALL {
                let outcome = match stats::paired_t_test(
                    &criterion.column(&left.table),
                    &criterion.column(&right.table),
                ) {
                    Ok(result) => PairOutcome::Tested(result),
                    Err(err) => {
                        log::warn!(
                            "skipping {criterion} t-test for {} vs {}: {err}",
                            left.label,
                            right.label
                        );
                        PairOutcome::Skipped(err.to_string())
                    }
                };
                tests.push(PairwiseTest {
                    left: left.label.clone(),
                    right: right.label.clone(),
                    criterion,
                    outcome,
                });
            }
        }
    }

    Ok(Comparison { summaries, tests })
}
