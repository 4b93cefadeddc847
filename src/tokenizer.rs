//! Word-level tokenizer over a fixed vocabulary.
//!
//! Text is lowercased and split into runs of word characters and runs of
//! punctuation. Words outside the vocabulary map to `[UNK]`. Decoding skips
//! special tokens, glues `##` continuation pieces onto the previous word and
//! removes the space before punctuation.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;

use crate::error::{ArtifactKind, EvalError};

pub const UNK_TOKEN: &str = "[UNK]";
pub const PAD_TOKEN: &str = "[PAD]";
pub const SOS_TOKEN: &str = "<sos>";
pub const EOS_TOKEN: &str = "<eos>";

const CONTINUATION_PREFIX: &str = "##";

fn pre_tokenizer() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\w+|[^\w\s]+").expect("pre-tokenizer pattern compiles"))
}

/// Vocabulary artifact: either `{"token": id, ...}` or `["token", ...]`.
#[derive(Deserialize)]
#[serde(untagged)]
enum VocabFile {
    Map(HashMap<String, u32>),
    List(Vec<String>),
}

#[derive(Debug, Clone)]
pub struct WordTokenizer {
    token_to_id: HashMap<String, u32>,
    id_to_token: HashMap<u32, String>,
    special: HashSet<u32>,
    unk_id: u32,
}

impl WordTokenizer {
    /// Builds a tokenizer from words whose position is their id.
    pub fn from_words<I, S>(words: I) -> Result<Self, EvalError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entries = words
            .into_iter()
            .enumerate()
            .map(|(idx, word)| (word.into(), idx as u32));
        Self::from_entries(entries)
    }

    /// Builds a tokenizer from explicit `token -> id` pairs.
    ///
    /// `[UNK]`, `<sos>`, `<eos>` and `[PAD]` are appended after the highest id
    /// when absent.
    pub fn from_entries<I>(entries: I) -> Result<Self, EvalError>
    where
        I: IntoIterator<Item = (String, u32)>,
    {
        let mut token_to_id = HashMap::new();
        let mut id_to_token = HashMap::new();
        for (token, id) in entries {
            if let Some(existing) = id_to_token.insert(id, token.clone()) {
                return Err(EvalError::InvalidRequest(format!(
                    "vocabulary id {id} assigned to both {existing:?} and {token:?}"
                )));
            }
            if token_to_id.insert(token.clone(), id).is_some() {
                return Err(EvalError::InvalidRequest(format!(
                    "vocabulary token {token:?} appears twice"
                )));
            }
        }

        let mut next_id = id_to_token.keys().max().map_or(0, |max| max + 1);
        let mut special = HashSet::new();
        for token in [UNK_TOKEN, SOS_TOKEN, EOS_TOKEN, PAD_TOKEN] {
            let id = match token_to_id.get(token) {
                Some(id) => *id,
                None => {
                    if token == UNK_TOKEN {
                        log::info!("adding {UNK_TOKEN} token to the vocabulary");
                    }
                    let id = next_id;
                    next_id += 1;
                    token_to_id.insert(token.to_string(), id);
                    id_to_token.insert(id, token.to_string());
                    id
                }
            };
            special.insert(id);
        }
        let unk_id = token_to_id[UNK_TOKEN];

        Ok(Self {
            token_to_id,
            id_to_token,
            special,
            unk_id,
        })
    }

    /// Loads a vocabulary artifact from disk.
    pub fn load(path: &Path) -> Result<Self, EvalError> {
        let data =
            fs::read(path).map_err(|err| EvalError::from_read(ArtifactKind::Vocabulary, path, err))?;
        let tokenizer = match serde_json::from_slice::<VocabFile>(&data)? {
            VocabFile::Map(map) => Self::from_entries(map)?,
            VocabFile::List(words) => Self::from_words(words)?,
        };
        log::info!(
            "loaded vocabulary of {} tokens from {}",
            tokenizer.vocab_size(),
            path.display()
        );
        Ok(tokenizer)
    }

    /// Number of ids the model must be able to score.
    pub fn vocab_size(&self) -> usize {
        self.id_to_token.keys().max().map_or(0, |max| *max as usize + 1)
    }

    pub fn unk_id(&self) -> u32 {
        self.unk_id
    }

    pub fn token_id(&self, token: &str) -> Option<u32> {
        self.token_to_id.get(token).copied()
    }

    pub fn is_special(&self, id: u32) -> bool {
        self.special.contains(&id)
    }

    pub fn encode(&self, text: &str) -> Vec<u32> {
        let lowered = text.to_lowercase();
        pre_tokenizer()
            .find_iter(&lowered)
            .map(|m| self.token_to_id.get(m.as_str()).copied().unwrap_or(self.unk_id))
            .collect()
    }

    /// Decodes ids to text, skipping special tokens and ids outside the vocabulary.
    pub fn decode(&self, ids: &[u32]) -> String {
        let mut out = String::new();
        for id in ids {
            if self.is_special(*id) {
                continue;
            }
            let Some(token) = self.id_to_token.get(id) else {
                continue;
            };
            match token.strip_prefix(CONTINUATION_PREFIX) {
                Some(piece) if !out.is_empty() => out.push_str(piece),
                _ => {
                    if !out.is_empty() {
                        out.push(' ');
                    }
                    out.push_str(token);
                }
            }
        }
        cleanup(&out)
    }
}

/// Undoes tokenization artifacts around punctuation and contractions.
fn cleanup(text: &str) -> String {
    text.replace(" .", ".")
        .replace(" ?", "?")
        .replace(" !", "!")
        .replace(" ,", ",")
        .replace(" ' ", "'")
        .replace(" n't", "n't")
        .replace(" 'm", "'m")
        .replace(" do not", " don't")
        .replace(" 's", "'s")
        .replace(" 've", "'ve")
        .replace(" 're", "'re")
}
