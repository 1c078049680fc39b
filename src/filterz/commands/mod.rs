//! # Command Layer
//!
//! One module per operation on a [`FilterStore`](crate::store::FilterStore).
//! The mutation operations never fail: a missing filter or group turns the
//! call into a no-op, and only [`create_group`] reports a refusal (`None`).
//! Export and import live here too since they are operations over the whole
//! store.
//!
//! [`CmdResult`] is what the API facade hands back to a UI; commands
//! themselves return plain values.

use crate::model::{Filter, GroupId, Schema};
use crate::tree::DisplayNode;

pub mod add_filter;
pub mod create_group;
pub mod export;
pub mod import;
pub mod remove_filter;
pub mod remove_group;
pub mod toggle;
pub mod update;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
}

#[derive(Debug, Clone)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub affected_filters: Vec<Filter>,
    pub affected_groups: Vec<GroupId>,
    pub tree: Vec<DisplayNode>,
    /// Exported JSON Logic text, when the command produced one.
    pub document: Option<String>,
    pub schema: Option<Schema>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_affected_filters(mut self, filters: Vec<Filter>) -> Self {
        self.affected_filters = filters;
        self
    }

    pub fn with_affected_groups(mut self, groups: Vec<GroupId>) -> Self {
        self.affected_groups = groups;
        self
    }

    pub fn with_tree(mut self, tree: Vec<DisplayNode>) -> Self {
        self.tree = tree;
        self
    }

    pub fn with_document(mut self, document: String) -> Self {
        self.document = Some(document);
        self
    }

    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = Some(schema);
        self
    }
}
