//! # API Facade
//!
//! The API layer is a **thin facade** over the command layer and the single entry
//! point for a UI. It owns a [`FilterStore`] and a [`StateStore`] backend, and:
//!
//! - **Dispatches** to the command functions
//! - **Applies caller policy** the commands deliberately leave out: user supplied
//!   types and predicates are checked against the schema, and a type change picks
//!   a valid predicate when the current one is no longer allowed
//! - **Persists** the state after every mutation
//! - **Returns structured types** (`Result<CmdResult>`), never printing anything
//!
//! Not-found conditions are still no-ops underneath; the facade only turns them
//! into warning messages so a UI can tell the user.
//!
//! `FilterzApi<S: StateStore>` is generic over the backend:
//! - Production: `FilterzApi<FileStore>`
//! - Testing: `FilterzApi<InMemoryStore>`

use crate::commands::{self, CmdMessage, CmdResult};
use crate::error::{FilterzError, Result};
use crate::model::{Connector, Filter, FilterId, FilterUpdate, GroupId, Relation, Schema};
use crate::store::{FilterStore, StateStore};
use crate::tree::TreeView;
use tracing::info;

pub struct FilterzApi<S: StateStore> {
    store: FilterStore,
    backend: S,
}

impl<S: StateStore> FilterzApi<S> {
    /// Resumes whatever `backend` has saved, or starts from an empty tree.
    pub fn open(backend: S, schema: Schema) -> Result<Self> {
        let store = match backend.load()? {
            Some(state) => FilterStore::from_state(schema, state),
            None => FilterStore::new(schema),
        };
        Ok(Self { store, backend })
    }

    pub fn store(&self) -> &FilterStore {
        &self.store
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn show(&self) -> CmdResult {
        let mut result = CmdResult::default().with_tree(TreeView::of_store(&self.store).flatten());
        if self.store.root_group().is_empty() {
            result.add_message(CmdMessage::info("No filters yet."));
        }
        result
    }

    pub fn schema(&self) -> CmdResult {
        let mut result = CmdResult::default().with_schema(self.store.schema().clone());
        if self.store.schema().is_empty() {
            result.add_message(CmdMessage::warning(
                "The schema is empty. Run `filterz init` or edit config.json.",
            ));
        }
        result
    }

    /// Swaps in a new schema. The tree is kept as is; filters the new schema
    /// no longer describes are listed as warnings.
    pub fn set_schema(&mut self, schema: Schema) -> CmdResult {
        self.store.set_schema(schema);

        let mut result = self.schema();
        let schema = self.store.schema();
        for filter in self.store.filters() {
            if !schema.relations_for(&filter.filter_type).contains(&filter.predicate) {
                result.add_message(CmdMessage::warning(format!(
                    "Filter {} ({} {}) does not fit the new schema",
                    filter.id, filter.filter_type, filter.predicate
                )));
            }
        }
        result
    }

    /// Adds a filter to `group` and applies `update` to it.
    pub fn add_filter(&mut self, group: &GroupId, update: FilterUpdate) -> Result<CmdResult> {
        let default_type = self.store.default_filter_type();
        let template = Filter::new(
            0,
            default_type.clone(),
            self.store.default_predicate(&default_type),
            "",
            group.clone(),
        );
        let update = resolve_update(self.store.schema(), &template, update)?;

        let mut result = CmdResult::default();
        let Some(id) = commands::add_filter::run(&mut self.store, group) else {
            result.add_message(CmdMessage::warning(format!("Group {} not found", group)));
            return Ok(result);
        };
        commands::update::run(&mut self.store, id, update);
        self.persist()?;

        let filter = self.store.filter(id).cloned();
        result.add_message(CmdMessage::success(format!(
            "Filter {} added to {}",
            id,
            filter.as_ref().map(|f| &f.group_id).unwrap_or(group)
        )));
        Ok(result.with_affected_filters(filter.into_iter().collect()))
    }

    pub fn create_group(&mut self, parent: &GroupId, connector: Connector) -> Result<CmdResult> {
        let mut result = CmdResult::default();
        match commands::create_group::run(&mut self.store, parent, connector) {
            Some(id) => {
                self.persist()?;
                result.add_message(CmdMessage::success(format!(
                    "Group {} ({}) created in {}",
                    id, connector, parent
                )));
                Ok(result.with_affected_groups(vec![id]))
            }
            None => {
                result.add_message(CmdMessage::warning(format!(
                    "Could not create a group in {}",
                    parent
                )));
                Ok(result)
            }
        }
    }

    pub fn update_filter(&mut self, id: FilterId, update: FilterUpdate) -> Result<CmdResult> {
        let mut result = CmdResult::default();
        let Some(current) = self.store.filter(id).cloned() else {
            result.add_message(CmdMessage::warning(format!("Filter {} not found", id)));
            return Ok(result);
        };
        if update.is_empty() {
            result.add_message(CmdMessage::info("Nothing to update."));
            return Ok(result);
        }

        let update = resolve_update(self.store.schema(), &current, update)?;
        commands::update::run(&mut self.store, id, update);
        self.persist()?;

        result.add_message(CmdMessage::success(format!("Filter {} updated", id)));
        Ok(result.with_affected_filters(self.store.filter(id).cloned().into_iter().collect()))
    }

    pub fn remove_filter(&mut self, id: FilterId) -> Result<CmdResult> {
        let mut result = CmdResult::default();
        let Some(removed) = self.store.filter(id).cloned() else {
            result.add_message(CmdMessage::warning(format!("Filter {} not found", id)));
            return Ok(result);
        };
        commands::remove_filter::run(&mut self.store, id);
        self.persist()?;

        result.add_message(CmdMessage::success(format!("Filter {} removed", id)));
        Ok(result.with_affected_filters(vec![removed]))
    }

    pub fn remove_group(&mut self, id: &GroupId) -> Result<CmdResult> {
        let mut result = CmdResult::default();
        if id.is_root() {
            result.add_message(CmdMessage::warning(
                "The root group cannot be removed. Use `reset` to empty it.",
            ));
            return Ok(result);
        }
        if !self.store.groups().contains_key(id) {
            result.add_message(CmdMessage::warning(format!("Group {} not found", id)));
            return Ok(result);
        }

        let subtree = TreeView::of_store(&self.store).subtree(id);
        let removed: Vec<Filter> = subtree
            .filters
            .iter()
            .filter_map(|fid| self.store.filter(*fid).cloned())
            .collect();
        commands::remove_group::run(&mut self.store, id);
        self.persist()?;

        result.add_message(CmdMessage::success(format!(
            "Group {} removed ({} filters, {} groups)",
            id,
            removed.len(),
            subtree.groups.len()
        )));
        Ok(result
            .with_affected_filters(removed)
            .with_affected_groups(subtree.groups))
    }

    pub fn toggle_connector(&mut self, id: &GroupId) -> Result<CmdResult> {
        let mut result = CmdResult::default();
        if self.store.group(id).is_none() {
            result.add_message(CmdMessage::warning(format!("Group {} not found", id)));
            return Ok(result);
        }
        commands::toggle::run(&mut self.store, id);
        self.persist()?;

        if let Some(group) = self.store.group(id) {
            result.add_message(CmdMessage::success(format!(
                "Group {} is now {}",
                id, group.connector
            )));
        }
        Ok(result.with_affected_groups(vec![id.clone()]))
    }

    pub fn export(&self) -> Result<CmdResult> {
        let mut result = CmdResult::default();
        match commands::export::run(&self.store)? {
            Some(document) => Ok(result.with_document(document)),
            None => {
                result.add_message(CmdMessage::info(
                    "Nothing to export: no filter has a value yet.",
                ));
                Ok(result)
            }
        }
    }

    /// Replaces the current tree with the one in `text`.
    ///
    /// An unreadable document still empties the tree; the reason comes back as a warning.
    pub fn import(&mut self, text: &str) -> Result<CmdResult> {
        let outcome = commands::import::run(&mut self.store, text);
        self.persist()?;

        let mut result = CmdResult::default();
        match outcome.diagnostic {
            Some(reason) => result.add_message(CmdMessage::warning(format!(
                "Import failed, filters cleared: {}",
                reason
            ))),
            None => result.add_message(CmdMessage::success(format!(
                "Imported {} filters in {} groups",
                outcome.forest.filters.len(),
                outcome.forest.groups.len()
            ))),
        }
        Ok(result.with_affected_filters(outcome.forest.filters))
    }

    pub fn reset(&mut self) -> Result<CmdResult> {
        self.store.reset();
        self.backend.clear()?;

        let mut result = CmdResult::default();
        result.add_message(CmdMessage::success("All filters cleared."));
        Ok(result)
    }

    fn persist(&mut self) -> Result<()> {
        self.backend.save(&self.store.to_state())?;
        info!(revision = self.store.revision(), "state saved");
        Ok(())
    }
}

/// The predicate a filter should end up with after changing its type.
///
/// Keeps `current` when the new type still allows it, otherwise falls back to
/// the type's first relation.
pub fn resolve_predicate(schema: &Schema, filter_type: &str, current: Relation) -> Relation {
    let allowed = schema.relations_for(filter_type);
    if allowed.contains(&current) {
        current
    } else {
        schema.default_predicate(filter_type)
    }
}

/// Checks `update` against the schema and fills in a valid predicate when only
/// the type changes.
fn resolve_update(schema: &Schema, current: &Filter, mut update: FilterUpdate) -> Result<FilterUpdate> {
    if schema.is_empty() {
        return Ok(update);
    }

    let filter_type = update
        .filter_type
        .clone()
        .unwrap_or_else(|| current.filter_type.clone());
    if schema.get(&filter_type).is_none() {
        return Err(FilterzError::Api(format!("Unknown filter type: {}", filter_type)));
    }

    match update.predicate {
        Some(predicate) => {
            if !schema.relations_for(&filter_type).contains(&predicate) {
                return Err(FilterzError::Api(format!(
                    "Predicate {} is not allowed for {}",
                    predicate, filter_type
                )));
            }
        }
        None if update.filter_type.is_some() => {
            let resolved = resolve_predicate(schema, &filter_type, current.predicate);
            if resolved != current.predicate {
                update.predicate = Some(resolved);
            }
        }
        None => {}
    }
    Ok(update)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::MessageLevel;
    use crate::config::sample_schema;
    use crate::model::ItemRef;
    use crate::store::memory::InMemoryStore;

    fn api() -> FilterzApi<InMemoryStore> {
        FilterzApi::open(InMemoryStore::new(), sample_schema()).unwrap()
    }

    #[test]
    fn add_filter_persists_state() {
        let mut api = api();
        api.add_filter(&GroupId::root(), FilterUpdate::new().with_ref("3"))
            .unwrap();

        let saved = api.backend().load().unwrap().unwrap();
        assert_eq!(saved.forest.filters.len(), 1);
        assert_eq!(saved.forest.filters[0].ref_value, "3");
        assert_eq!(saved.counters.next_filter_id, 1);
    }

    #[test]
    fn reopening_resumes_saved_state() {
        let mut api = api();
        api.add_filter(&GroupId::root(), FilterUpdate::new()).unwrap();
        let backend = api.backend;

        let reopened = FilterzApi::open(backend, sample_schema()).unwrap();
        assert_eq!(reopened.store().filters().len(), 1);
        assert_eq!(reopened.store().counters().next_group_id, 1);
    }

    #[test]
    fn type_change_resolves_predicate() {
        let mut api = api();
        let added = api
            .add_filter(
                &GroupId::root(),
                FilterUpdate::new().with_predicate(Relation::Lt),
            )
            .unwrap();
        let id = added.affected_filters[0].id;

        // "name" only allows == and !=, so < must be replaced.
        api.update_filter(id, FilterUpdate::new().with_type("name"))
            .unwrap();
        assert_eq!(api.store().filter(id).unwrap().predicate, Relation::Eq);

        // "count" allows ==, so it is kept.
        api.update_filter(id, FilterUpdate::new().with_type("count"))
            .unwrap();
        assert_eq!(api.store().filter(id).unwrap().predicate, Relation::Eq);
    }

    #[test]
    fn invalid_type_or_predicate_is_rejected() {
        let mut api = api();
        assert!(api
            .add_filter(&GroupId::root(), FilterUpdate::new().with_type("shoe_size"))
            .is_err());
        assert!(api.store().filters().is_empty());

        let id = api
            .add_filter(&GroupId::root(), FilterUpdate::new())
            .unwrap()
            .affected_filters[0]
            .id;
        let err = api
            .update_filter(
                id,
                FilterUpdate::new().with_type("active").with_predicate(Relation::Gt),
            )
            .unwrap_err();
        assert_eq!(err.to_string(), "Api error: Predicate > is not allowed for active");
    }

    #[test]
    fn missing_targets_become_warnings() {
        let mut api = api();
        for result in [
            api.remove_filter(4).unwrap(),
            api.remove_group(&GroupId::from("group-4")).unwrap(),
            api.remove_group(&GroupId::root()).unwrap(),
            api.toggle_connector(&GroupId::from("group-4")).unwrap(),
            api.update_filter(4, FilterUpdate::new().with_ref("1")).unwrap(),
        ] {
            assert_eq!(result.messages.len(), 1);
            assert_eq!(result.messages[0].level, MessageLevel::Warning);
        }
        assert!(api.backend().load().unwrap().is_none());
    }

    #[test]
    fn remove_group_reports_cascade() {
        let mut api = api();
        let group = api
            .create_group(&GroupId::root(), Connector::Or)
            .unwrap()
            .affected_groups[0]
            .clone();
        api.add_filter(&group, FilterUpdate::new()).unwrap();
        api.add_filter(&group, FilterUpdate::new()).unwrap();

        let result = api.remove_group(&group).unwrap();
        assert_eq!(result.affected_filters.len(), 2);
        assert!(api.store().filters().is_empty());
        assert!(!api
            .store()
            .root_group()
            .items
            .contains(&ItemRef::group(group)));
    }

    #[test]
    fn set_schema_keeps_tree_and_flags_misfits() {
        use crate::model::{SchemaEntry, ValueType};

        let mut api = api();
        api.add_filter(
            &GroupId::root(),
            FilterUpdate::new().with_type("count").with_predicate(Relation::Gt),
        )
        .unwrap();
        api.add_filter(
            &GroupId::root(),
            FilterUpdate::new().with_type("name").with_predicate(Relation::Eq),
        )
        .unwrap();
        let revision = api.store().revision();

        let narrower = Schema::new(vec![SchemaEntry::new(
            "count",
            vec![Relation::Gt],
            ValueType::Int,
        )]);
        let result = api.set_schema(narrower.clone());

        assert_eq!(api.store().schema(), &narrower);
        assert_eq!(result.schema.as_ref(), Some(&narrower));
        assert_eq!(api.store().filters().len(), 2);
        assert!(api.store().revision() > revision);
        assert_eq!(result.messages.len(), 1);
        assert_eq!(result.messages[0].level, MessageLevel::Warning);
        assert!(result.messages[0].content.starts_with("Filter 1 (name =="));

        // New filters now default to the new schema.
        let added = api.add_filter(&GroupId::root(), FilterUpdate::new()).unwrap();
        assert_eq!(added.affected_filters[0].predicate, Relation::Gt);
    }

    #[test]
    fn export_empty_is_informational() {
        let api = api();
        let result = api.export().unwrap();
        assert!(result.document.is_none());
        assert_eq!(result.messages[0].level, MessageLevel::Info);
    }

    #[test]
    fn import_of_garbage_warns_and_clears() {
        let mut api = api();
        api.add_filter(&GroupId::root(), FilterUpdate::new().with_ref("1"))
            .unwrap();

        let result = api.import("{not valid json").unwrap();
        assert_eq!(result.messages[0].level, MessageLevel::Warning);
        assert!(api.store().filters().is_empty());
    }

    #[test]
    fn reset_clears_backend() {
        let mut api = api();
        api.add_filter(&GroupId::root(), FilterUpdate::new()).unwrap();
        api.reset().unwrap();
        assert!(api.backend().load().unwrap().is_none());
        assert!(api.store().root_group().is_empty());
        assert_eq!(api.store().counters().next_filter_id, 0);
    }
}
