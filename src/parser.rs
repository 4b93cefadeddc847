//! Judge response parsing.
//!
//! The judge is asked for a single line such as
//! `Grammar: 8/10; Consistency: 7/10; Creativity: 7/10; Plot: 7/10; Age group: E`.
//! Anything else is reported as [`Verdict::Malformed`] rather than an error so
//! one bad reply cannot stop a batch.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

pub const RUBRIC_PATTERN: &str = r"Grammar: (\d+)/10; Consistency: (\d+)/10; Creativity: (\d+)/10; Plot: (\d+)/10; Age group: ([A-Z])";

/// Highest score the rubric allows.
pub const MAX_SCORE: u8 = 10;

fn rubric_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(RUBRIC_PATTERN).expect("rubric pattern compiles"))
}

/// Judge's guess of the writer's age, or `Dnf` when no guess could be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AgeGroup {
    A,
    B,
    C,
    D,
    E,
    F,
    #[serde(rename = "DNF")]
    Dnf,
}

impl AgeGroup {
    /// Every group in rubric order, `Dnf` last.
    pub const ALL: [AgeGroup; 7] = [
        AgeGroup::A,
        AgeGroup::B,
        AgeGroup::C,
        AgeGroup::D,
        AgeGroup::E,
        AgeGroup::F,
        AgeGroup::Dnf,
    ];

    pub fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'A' => Some(AgeGroup::A),
            'B' => Some(AgeGroup::B),
            'C' => Some(AgeGroup::C),
            'D' => Some(AgeGroup::D),
            'E' => Some(AgeGroup::E),
            'F' => Some(AgeGroup::F),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AgeGroup::A => "A",
            AgeGroup::B => "B",
            AgeGroup::C => "C",
            AgeGroup::D => "D",
            AgeGroup::E => "E",
            AgeGroup::F => "F",
            AgeGroup::Dnf => "DNF",
        }
    }

    /// Age bracket in years.
    pub fn bracket(&self) -> Option<&'static str> {
        match self {
            AgeGroup::A => Some("3 or under"),
            AgeGroup::B => Some("4-5"),
            AgeGroup::C => Some("6-7"),
            AgeGroup::D => Some("8-9"),
            AgeGroup::E => Some("10-12"),
            AgeGroup::F => Some("13-16"),
            AgeGroup::Dnf => None,
        }
    }
}

impl fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Accepts bare codes and labels that still carry the bracket, e.g. `E (10-12)`.
impl FromStr for AgeGroup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.split_whitespace().next().unwrap_or_default();
        if code == "DNF" {
            return Ok(AgeGroup::Dnf);
        }
        let mut chars = code.chars();
        match (chars.next(), chars.next()) {
            (Some(letter), None) => {
                AgeGroup::from_letter(letter).ok_or_else(|| format!("unknown age group {s:?}"))
            }
            _ => Err(format!("unknown age group {s:?}")),
        }
    }
}

/// Scores read from a well-formed judge reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rating {
    pub grammar: u8,
    pub consistency: u8,
    pub creativity: u8,
    pub plot: u8,
    pub age_group: AgeGroup,
}

/// Outcome of parsing one judge reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Parsed(Rating),
    /// The reply did not follow the rubric; carries the trimmed text.
    Malformed(String),
    /// The judge produced nothing to parse.
    NoResponse,
}

impl Verdict {
    pub fn rating(&self) -> Option<&Rating> {
        match self {
            Verdict::Parsed(rating) => Some(rating),
            Verdict::Malformed(_) | Verdict::NoResponse => None,
        }
    }
}

/// Parses a judge reply. Never panics and never fails; see [`Verdict`].
pub fn parse(response: Option<&str>) -> Verdict {
    let Some(raw) = response else {
        return Verdict::NoResponse;
    };
    let text = raw.trim();
    match extract(text) {
        Some(rating) => Verdict::Parsed(rating),
        None => Verdict::Malformed(text.to_string()),
    }
}

fn extract(text: &str) -> Option<Rating> {
    let caps = rubric_regex().captures(text)?;
    let score = |idx: usize| -> Option<u8> {
        caps.get(idx)?
            .as_str()
            .parse::<u8>()
            .ok()
            .filter(|v| *v <= MAX_SCORE)
    };
    let letter = caps.get(5)?.as_str().chars().next()?;
    Some(Rating {
        grammar: score(1)?,
        consistency: score(2)?,
        creativity: score(3)?,
        plot: score(4)?,
        age_group: AgeGroup::from_letter(letter)?,
    })
}
