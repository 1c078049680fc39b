use crate::logic;
use crate::model::Forest;
use crate::store::{FilterStore, IdAllocator};
use serde_json::Value;
use tracing::{debug, warn};

/// The tree read from a document plus, when the text was unusable, why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOutcome {
    pub forest: Forest,
    pub diagnostic: Option<String>,
}

impl ImportOutcome {
    fn empty() -> Self {
        Self {
            forest: Forest::empty(),
            diagnostic: None,
        }
    }

    fn malformed(reason: String) -> Self {
        Self {
            forest: Forest::empty(),
            diagnostic: Some(reason),
        }
    }
}

/// Parses JSON Logic text into a tree without ever failing.
///
/// Blank text and the literal `null` give the empty tree. Text that is not JSON,
/// or JSON of a shape that cannot be read as a filter tree, also gives the empty
/// tree, with the reason in [`ImportOutcome::diagnostic`].
pub fn read_document<A: IdAllocator + ?Sized>(text: &str, ids: &mut A) -> ImportOutcome {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return ImportOutcome::empty();
    }

    let value: Value = match serde_json::from_str(trimmed) {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, "import: document is not valid JSON");
            return ImportOutcome::malformed(format!("Invalid JSON: {}", e));
        }
    };

    let forest = logic::deserialize(Some(&value), ids);
    if forest.is_empty() && !value.is_null() {
        warn!("import: document contains no usable filter conditions");
        return ImportOutcome::malformed("No usable filter conditions in document".to_string());
    }
    ImportOutcome {
        forest,
        diagnostic: None,
    }
}

pub fn import_from_json<A: IdAllocator + ?Sized>(text: &str, ids: &mut A) -> Forest {
    read_document(text, ids).forest
}

/// Replaces the store's tree with the one read from `text`.
///
/// Counters are advanced past every imported id so later additions never collide.
pub fn run(store: &mut FilterStore, text: &str) -> ImportOutcome {
    let outcome = read_document(text, store);
    store.replace_forest(outcome.forest.clone());
    debug!(
        filters = outcome.forest.filters.len(),
        next_filter_id = store.counters().next_filter_id,
        next_group_id = store.counters().next_group_id,
        "import applied"
    );
    outcome
}
