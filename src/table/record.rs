use serde::{Deserialize, Serialize};

use crate::parser::{AgeGroup, Verdict};

/// Column names of a persisted result table, in order.
pub const COLUMNS: [&str; 6] = [
    "Input Prompt",
    "Grammar",
    "Consistency",
    "Creativity",
    "Plot",
    "Age Group",
];

/// Scores for one prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    #[serde(rename = "Input Prompt")]
    pub prompt: String,
    #[serde(rename = "Grammar")]
    pub grammar: u8,
    #[serde(rename = "Consistency")]
    pub consistency: u8,
    #[serde(rename = "Creativity")]
    pub creativity: u8,
    #[serde(rename = "Plot", default)]
    pub plot: u8,
    #[serde(rename = "Age Group", with = "age_group_label")]
    pub age_group: AgeGroup,
}

impl ScoreRecord {
    /// The all-zero `DNF` row recorded when a reply could not be scored.
    pub fn sentinel(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            grammar: 0,
            consistency: 0,
            creativity: 0,
            plot: 0,
            age_group: AgeGroup::Dnf,
        }
    }

    pub fn from_verdict(prompt: impl Into<String>, verdict: &Verdict) -> Self {
        match verdict {
            Verdict::Parsed(rating) => Self {
                prompt: prompt.into(),
                grammar: rating.grammar,
                consistency: rating.consistency,
                creativity: rating.creativity,
                plot: rating.plot,
                age_group: rating.age_group,
            },
            Verdict::Malformed(_) | Verdict::NoResponse => Self::sentinel(prompt),
        }
    }

    pub fn is_sentinel(&self) -> bool {
        self.age_group == AgeGroup::Dnf
    }
}

/// Age groups are stored as their code; older tables carry the bracket too.
mod age_group_label {
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::parser::AgeGroup;

    pub fn serialize<S: Serializer>(group: &AgeGroup, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(group.code())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<AgeGroup, D::Error> {
        let label = String::deserialize(deserializer)?;
        label.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse, Rating};

    #[test]
    fn parsed_verdict_fills_every_field() {
        let verdict = Verdict::Parsed(Rating {
            grammar: 8,
            consistency: 7,
            creativity: 6,
            plot: 5,
            age_group: AgeGroup::E,
        });
        let record = ScoreRecord::from_verdict("Once upon a time", &verdict);
        assert_eq!(record.grammar, 8);
        assert_eq!(record.consistency, 7);
        assert_eq!(record.creativity, 6);
        assert_eq!(record.plot, 5);
        assert_eq!(record.age_group, AgeGroup::E);
        assert!(!record.is_sentinel());
    }

    #[test]
    fn unparsed_verdicts_become_sentinels() {
        for verdict in [parse(None), parse(Some("I cannot grade this."))] {
            assert_eq!(
                ScoreRecord::from_verdict("p", &verdict),
                ScoreRecord::sentinel("p")
            );
        }
    }

    #[test]
    fn serializes_with_table_column_names() {
        let record = ScoreRecord::sentinel("p");
        let value = serde_json::to_value(&record).expect("json");
        let keys: Vec<&str> = value
            .as_object()
            .expect("object")
            .keys()
            .map(String::as_str)
            .collect();
        for column in COLUMNS {
            assert!(keys.contains(&column), "missing {column}");
        }
        assert_eq!(value["Age Group"], "DNF");
    }

    #[test]
    fn legacy_age_labels_are_accepted() {
        let record: ScoreRecord = serde_json::from_str(
            r#"{"Input Prompt":"p","Grammar":8,"Consistency":7,"Creativity":7,"Age Group":"E (10-12)"}"#,
        )
        .expect("legacy row");
        assert_eq!(record.age_group, AgeGroup::E);
        assert_eq!(record.plot, 0);
    }
}
