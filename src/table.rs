//! One score row per prompt, persisted once per run.

#[path = "table/record.rs"]
mod record;

#[path = "table/store.rs"]
mod store;

pub use record::{ScoreRecord, COLUMNS};
pub use store::ResultTable;
