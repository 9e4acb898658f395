//! Shared helpers for unit tests: logger bootstrap plus entry/query builders.

use crate::Entry;
use crate::EntryContent;
use crate::Query;
use crate::Revision;

static LOGGER_INIT: once_cell::sync::Lazy<()> = once_cell::sync::Lazy::new(|| {
    env_logger::init();
});

pub fn enable_logger() {
    *LOGGER_INIT;
    println!("setup logger for unit test.");
}

pub fn text_entry(
    revision: u64,
    path: &str,
    content: &str,
) -> Entry {
    Entry::new(Revision::new(revision), path, EntryContent::text(content))
}

pub fn json_entry(
    revision: u64,
    path: &str,
    content: serde_json::Value,
) -> Entry {
    Entry::new(Revision::new(revision), path, EntryContent::json(content))
}

pub fn identity_query(path: &str) -> Query {
    Query::identity(path).expect("valid test path")
}
