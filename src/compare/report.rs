use std::fmt;

use super::{Comparison, PairOutcome};

fn fixed(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.3}"))
}

/// Plain-text report: score summaries, paired t-tests, age-group shares.
impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== Scores ==")?;
        for summary in &self.summaries {
            writeln!(f, "{} ({} rows)", summary.label, summary.rows)?;
            for c in &summary.criteria {
                writeln!(
                    f,
                    "  {:<12} mean {:>7}  std {:>7}",
                    c.criterion.to_string(),
                    fixed(c.mean),
                    fixed(c.std)
                )?;
            }
        }

        writeln!(f, "\n== Paired t-tests ==")?;
        for test in &self.tests {
            match &test.outcome {
                PairOutcome::Tested(t) => writeln!(
                    f,
                    "{} vs {} [{}]: t = {:.4}, df = {}, p = {:.4}",
                    test.left, test.right, test.criterion, t.statistic, t.df, t.p_value
                )?,
                PairOutcome::Skipped(reason) => writeln!(
                    f,
                    "{} vs {} [{}]: skipped ({reason})",
                    test.left, test.right, test.criterion
                )?,
            }
        }

        writeln!(f, "\n== Age groups ==")?;
        for summary in &self.summaries {
            let shares: Vec<String> = summary
                .age_groups
                .iter()
                .map(|(group, share)| format!("{group}: {:.1}%", share * 100.0))
                .collect();
            writeln!(f, "{}: {}", summary.label, shares.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::{compare, LabeledTable};
    use crate::parser::AgeGroup;
    use crate::table::ScoreRecord;

    fn table(label: &str, grammar: &[u8]) -> LabeledTable {
        LabeledTable {
            label: label.to_string(),
            table: grammar
                .iter()
                .map(|&g| ScoreRecord {
                    prompt: "p".to_string(),
                    grammar: g,
                    consistency: 5,
                    creativity: 5,
                    plot: 5,
                    age_group: AgeGroup::E,
                })
                .collect(),
        }
    }

    #[test]
    fn report_has_every_section() {
        let comparison =
            compare(&[table("base", &[5, 6, 7]), table("tuned", &[6, 8, 7])]).expect("compare");
        let report = comparison.to_string();
        assert!(report.contains("== Scores =="));
        assert!(report.contains("base (3 rows)"));
        assert!(report.contains("mean   6.000"));
        assert!(report.contains("base vs tuned [Grammar]: t = "));
        assert!(report.contains("tuned: A: 0.0%"));
        assert!(report.contains("E: 100.0%"));
    }

    #[test]
    fn skipped_pairs_show_the_reason() {
        let comparison =
            compare(&[table("base", &[5, 6, 7]), table("short", &[6])]).expect("compare");
        assert!(comparison.to_string().contains("skipped (Invalid request: paired samples differ"));
    }
}
