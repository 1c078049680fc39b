//! # Store Layer
//!
//! This module owns the filter tree state. [`FilterStore`] is the single writer
//! of the three collections that make up a tree (the flat filter list, the
//! group map and the root group) plus the two id counters and the schema.
//!
//! ## Copy-on-write
//!
//! Each collection lives behind an `Arc`. Mutations go through
//! `Arc::make_mut`, so a [`Snapshot`] taken before a mutation keeps pointing at
//! the old value while the store moves on to a fresh one. Every mutation also
//! bumps [`FilterStore::revision`], which is what observers compare to detect a
//! change.
//!
//! ## Persistence
//!
//! The store itself is purely in-memory. The [`StateStore`] trait persists a
//! [`StoreState`] (everything but the schema) between sessions:
//!
//! - [`fs::FileStore`]: `state.json` inside a data directory
//! - [`memory::InMemoryStore`]: no persistence, for tests
//!
//! The exported JSON Logic document is not a substitute for this: it drops
//! empty groups and filters that have no reference value yet.

use crate::error::Result;
use crate::model::{Filter, FilterId, Forest, Group, GroupId, ItemRef, Relation, Schema};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

pub mod fs;
pub mod memory;

/// Source of fresh filter and group ids.
pub trait IdAllocator {
    fn next_filter_id(&mut self) -> FilterId;
    fn next_group_id(&mut self) -> GroupId;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Counters {
    pub next_filter_id: u64,
    pub next_group_id: u64,
}

impl IdAllocator for Counters {
    fn next_filter_id(&mut self) -> FilterId {
        let id = self.next_filter_id;
        self.next_filter_id += 1;
        id
    }

    fn next_group_id(&mut self) -> GroupId {
        let id = GroupId::from_index(self.next_group_id);
        self.next_group_id += 1;
        id
    }
}

impl Counters {
    /// Moves both counters past every id present in `forest`. Never moves them backwards.
    ///
    /// Group ids that are not of the `group-<n>` form are ignored.
    pub fn advance_past(&mut self, forest: &Forest) {
        if let Some(max) = forest.filters.iter().map(|f| f.id).max() {
            self.next_filter_id = self.next_filter_id.max(max.saturating_add(1));
        }
        if let Some(max) = forest.groups.keys().filter_map(GroupId::index).max() {
            self.next_group_id = self.next_group_id.max(max.saturating_add(1));
        }
    }
}

/// Everything needed to resume a session, minus the schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreState {
    #[serde(flatten)]
    pub forest: Forest,
    #[serde(flatten)]
    pub counters: Counters,
}

/// Persistence for [`StoreState`].
pub trait StateStore {
    /// Returns `None` when nothing has been saved yet.
    fn load(&self) -> Result<Option<StoreState>>;

    fn save(&mut self, state: &StoreState) -> Result<()>;

    /// Forget any saved state.
    fn clear(&mut self) -> Result<()>;
}

/// An immutable view of the store at one revision.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub filters: Arc<Vec<Filter>>,
    pub groups: Arc<BTreeMap<GroupId, Group>>,
    pub root: Arc<Group>,
    pub revision: u64,
}

#[derive(Debug, Clone)]
pub struct FilterStore {
    filters: Arc<Vec<Filter>>,
    groups: Arc<BTreeMap<GroupId, Group>>,
    root: Arc<Group>,
    counters: Counters,
    schema: Arc<Schema>,
    revision: u64,
}

impl Default for FilterStore {
    fn default() -> Self {
        Self::new(Schema::default())
    }
}

impl FilterStore {
    pub fn new(schema: Schema) -> Self {
        Self {
            filters: Arc::new(Vec::new()),
            groups: Arc::new(BTreeMap::new()),
            root: Arc::new(Group::root()),
            counters: Counters::default(),
            schema: Arc::new(schema),
            revision: 0,
        }
    }

    pub fn from_state(schema: Schema, state: StoreState) -> Self {
        let mut store = Self::new(schema);
        store.counters = state.counters;
        store.replace_forest(state.forest);
        store
    }

    pub fn to_state(&self) -> StoreState {
        StoreState {
            forest: self.forest(),
            counters: self.counters,
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn set_schema(&mut self, schema: Schema) {
        self.schema = Arc::new(schema);
        self.touch();
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn groups(&self) -> &BTreeMap<GroupId, Group> {
        &self.groups
    }

    pub fn root_group(&self) -> &Group {
        &self.root
    }

    pub fn filter(&self, id: FilterId) -> Option<&Filter> {
        self.filters.iter().find(|f| f.id == id)
    }

    /// Looks up root or a named group.
    pub fn group(&self, id: &GroupId) -> Option<&Group> {
        if id.is_root() {
            Some(&self.root)
        } else {
            self.groups.get(id)
        }
    }

    pub fn counters(&self) -> Counters {
        self.counters
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            filters: Arc::clone(&self.filters),
            groups: Arc::clone(&self.groups),
            root: Arc::clone(&self.root),
            revision: self.revision,
        }
    }

    /// An owned copy of the current tree.
    pub fn forest(&self) -> Forest {
        Forest {
            filters: self.filters.as_ref().clone(),
            root: self.root.as_ref().clone(),
            groups: self.groups.as_ref().clone(),
        }
    }

    pub fn default_filter_type(&self) -> String {
        self.schema.default_filter_type()
    }

    pub fn default_predicate(&self, filter_type: &str) -> Relation {
        self.schema.default_predicate(filter_type)
    }

    /// Back to an empty tree with both counters at zero. The schema is kept.
    pub fn reset(&mut self) {
        self.filters = Arc::new(Vec::new());
        self.groups = Arc::new(BTreeMap::new());
        self.root = Arc::new(Group::root());
        self.counters = Counters::default();
        self.touch();
    }

    /// Replaces the whole tree and fast-forwards the counters past its ids.
    pub fn replace_forest(&mut self, forest: Forest) {
        self.counters.advance_past(&forest);
        self.filters = Arc::new(forest.filters);
        self.groups = Arc::new(forest.groups);
        self.root = Arc::new(forest.root);
        self.touch();
    }

    pub(crate) fn filters_mut(&mut self) -> &mut Vec<Filter> {
        self.touch();
        Arc::make_mut(&mut self.filters)
    }

    pub(crate) fn groups_mut(&mut self) -> &mut BTreeMap<GroupId, Group> {
        self.touch();
        Arc::make_mut(&mut self.groups)
    }

    pub(crate) fn group_mut(&mut self, id: &GroupId) -> Option<&mut Group> {
        if id.is_root() {
            self.touch();
            return Some(Arc::make_mut(&mut self.root));
        }
        if !self.groups.contains_key(id) {
            return None;
        }
        self.groups_mut().get_mut(id)
    }

    /// Removes `item` from root and from every group that references it.
    ///
    /// Collections that do not reference it are left untouched.
    pub(crate) fn strip_references(&mut self, item: &ItemRef) {
        if self.root.items.contains(item) {
            self.touch();
            Arc::make_mut(&mut self.root).strip(item);
        }
        if self.groups.values().any(|g| g.items.contains(item)) {
            for group in self.groups_mut().values_mut() {
                group.strip(item);
            }
        }
    }

    fn touch(&mut self) {
        self.revision += 1;
    }
}

impl IdAllocator for FilterStore {
    fn next_filter_id(&mut self) -> FilterId {
        self.counters.next_filter_id()
    }

    fn next_group_id(&mut self) -> GroupId {
        self.counters.next_group_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Connector;

    #[test]
    fn new_store_is_empty() {
        let store = FilterStore::default();
        assert!(store.filters().is_empty());
        assert!(store.groups().is_empty());
        assert_eq!(store.root_group(), &Group::root());
        assert_eq!(store.counters(), Counters::default());
    }

    #[test]
    fn ids_are_monotonic() {
        let mut store = FilterStore::default();
        assert_eq!(store.next_filter_id(), 0);
        assert_eq!(store.next_filter_id(), 1);
        assert_eq!(store.next_group_id(), GroupId::from("group-0"));
        assert_eq!(store.next_group_id(), GroupId::from("group-1"));
        assert_eq!(store.next_filter_id(), 2);
    }

    #[test]
    fn snapshot_is_unaffected_by_later_mutation() {
        let mut store = FilterStore::default();
        let before = store.snapshot();

        store.filters_mut().push(Filter::new(
            0,
            "count",
            Relation::Lt,
            "",
            GroupId::root(),
        ));

        assert!(before.filters.is_empty());
        assert_eq!(store.filters().len(), 1);
        assert!(store.revision() > before.revision);
    }

    #[test]
    fn strip_references_leaves_unrelated_collections_shared() {
        let mut store = FilterStore::default();
        store
            .groups_mut()
            .insert(GroupId::from_index(0), Group::new(GroupId::from_index(0), Connector::Or));
        let before = store.snapshot();

        store.strip_references(&ItemRef::filter(42));

        let after = store.snapshot();
        assert!(Arc::ptr_eq(&before.groups, &after.groups));
        assert!(Arc::ptr_eq(&before.root, &after.root));
    }

    #[test]
    fn advance_past_never_moves_backwards() {
        let mut forest = Forest::empty();
        forest
            .filters
            .push(Filter::new(4, "count", Relation::Lt, "1", GroupId::root()));
        forest
            .groups
            .insert(GroupId::from_index(9), Group::new(GroupId::from_index(9), Connector::And));
        forest
            .groups
            .insert(GroupId::from("custom"), Group::new(GroupId::from("custom"), Connector::And));

        let mut counters = Counters {
            next_filter_id: 10,
            next_group_id: 2,
        };
        counters.advance_past(&forest);
        assert_eq!(counters.next_filter_id, 10);
        assert_eq!(counters.next_group_id, 10);
    }

    #[test]
    fn advance_past_saturates_at_the_largest_id() {
        let mut forest = Forest::empty();
        forest
            .filters
            .push(Filter::new(u64::MAX, "count", Relation::Lt, "1", GroupId::root()));
        let last = GroupId::from_index(u64::MAX);
        forest.groups.insert(last.clone(), Group::new(last, Connector::And));

        let mut counters = Counters::default();
        counters.advance_past(&forest);
        assert_eq!(counters.next_filter_id, u64::MAX);
        assert_eq!(counters.next_group_id, u64::MAX);
    }

    #[test]
    fn set_schema_keeps_tree_and_bumps_revision() {
        let mut store = FilterStore::default();
        store.group_mut(&GroupId::root()).unwrap().items.push(ItemRef::filter(0));
        let before = store.snapshot();

        store.set_schema(crate::config::sample_schema());

        assert_eq!(store.default_filter_type(), "count");
        assert!(Arc::ptr_eq(&before.root, &store.snapshot().root));
        assert!(store.revision() > before.revision);
    }

    #[test]
    fn reset_clears_tree_and_counters() {
        let mut store = FilterStore::default();
        store.next_filter_id();
        store.group_mut(&GroupId::root()).unwrap().items.push(ItemRef::filter(0));
        store.reset();
        assert!(store.root_group().is_empty());
        assert_eq!(store.counters(), Counters::default());
    }

    #[test]
    fn state_round_trips_through_json() {
        let mut store = FilterStore::default();
        store.next_filter_id();
        store
            .group_mut(&GroupId::root())
            .unwrap()
            .items
            .push(ItemRef::group(GroupId::from_index(0)));
        store
            .groups_mut()
            .insert(GroupId::from_index(0), Group::new(GroupId::from_index(0), Connector::Or));

        let json = serde_json::to_string(&store.to_state()).unwrap();
        assert!(json.contains("\"rootGroup\""));
        assert!(json.contains("\"nextFilterId\":1"));

        let state: StoreState = serde_json::from_str(&json).unwrap();
        let restored = FilterStore::from_state(Schema::default(), state);
        assert_eq!(restored.forest(), store.forest());
        assert_eq!(restored.counters(), store.counters());
    }
}
