//! # JSON Logic codec
//!
//! Converts a filter tree to a JSON Logic shaped document and back.
//!
//! A filter becomes a tagged condition that keeps enough metadata to rebuild it:
//!
//! ```json
//! {"filter_condition": {"type": "salary", "predicate": ">", "ref": "100000", "id": 3}}
//! ```
//!
//! A group becomes `{"and": [...]}` or `{"or": [...]}` over its surviving
//! children. Filters without a reference value and groups with nothing left
//! in them are dropped, so an empty tree serializes to `None`. When root ends
//! up with a single filter condition, that condition is emitted bare.
//!
//! Deserializing assigns fresh group ids (`group-<n>`) to every nested
//! connector, keeps embedded filter ids where they are usable and finally
//! rewrites every filter's `group_id` from the tree it actually ended up in.

use crate::model::{Connector, Filter, FilterId, Forest, Group, GroupId, ItemRef, Relation};
use crate::store::IdAllocator;
use crate::tree::{assign_group_ids, TreeView};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, warn};

pub const FILTER_CONDITION_KEY: &str = "filter_condition";

/// Serializes a tree. Returns `None` when nothing in it survives.
pub fn serialize(
    filters: &[Filter],
    root: &Group,
    groups: &BTreeMap<GroupId, Group>,
) -> Option<Value> {
    let view = TreeView::new(filters, root, groups);
    let mut visited = HashSet::new();
    serialize_group(&view, root, &mut visited)
}

pub fn serialize_forest(forest: &Forest) -> Option<Value> {
    serialize(&forest.filters, &forest.root, &forest.groups)
}

fn serialize_filter(filter: &Filter) -> Option<Value> {
    if !filter.is_specified() {
        return None;
    }
    let mut condition = Map::new();
    condition.insert("type".into(), Value::String(filter.filter_type.clone()));
    condition.insert(
        "predicate".into(),
        Value::String(filter.predicate.as_str().to_string()),
    );
    condition.insert("ref".into(), Value::String(filter.ref_value.clone()));
    condition.insert("id".into(), Value::from(filter.id));

    let mut tagged = Map::new();
    tagged.insert(FILTER_CONDITION_KEY.into(), Value::Object(condition));
    Some(Value::Object(tagged))
}

fn serialize_group(
    view: &TreeView<'_>,
    group: &Group,
    visited: &mut HashSet<GroupId>,
) -> Option<Value> {
    if !visited.insert(group.id.clone()) {
        warn!(group = %group.id, "group reached twice while serializing, skipping");
        return None;
    }

    let mut conditions: Vec<Value> = Vec::with_capacity(group.items.len());
    for item in &group.items {
        let condition = match item {
            ItemRef::Filter { id } => view.filter(*id).and_then(serialize_filter),
            ItemRef::Group { id } => view
                .group(id)
                .and_then(|child| serialize_group(view, child, visited)),
        };
        conditions.extend(condition);
    }

    if conditions.is_empty() {
        return None;
    }
    if group.id.is_root() && conditions.len() == 1 && is_filter_condition(&conditions[0]) {
        return conditions.pop();
    }

    let mut expr = Map::new();
    expr.insert(group.connector.key().into(), Value::Array(conditions));
    Some(Value::Object(expr))
}

fn is_filter_condition(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|map| map.contains_key(FILTER_CONDITION_KEY))
}

/// The recognised shapes of a JSON Logic node.
enum Node<'v> {
    Condition(&'v Map<String, Value>),
    Connector(Connector, &'v [Value]),
    Invalid,
}

fn classify(value: &Value) -> Node<'_> {
    let Some(map) = value.as_object() else {
        return Node::Invalid;
    };
    if map.len() != 1 {
        return Node::Invalid;
    }
    let Some((key, inner)) = map.iter().next() else {
        return Node::Invalid;
    };

    if key == FILTER_CONDITION_KEY {
        return match inner.as_object() {
            Some(body) => Node::Condition(body),
            None => Node::Invalid,
        };
    }
    match (Connector::from_key(key), inner.as_array()) {
        (Some(connector), Some(items)) if !items.is_empty() => Node::Connector(connector, items),
        _ => Node::Invalid,
    }
}

/// Rebuilds a tree from a JSON Logic document.
///
/// `None` and `null` give the empty tree, as does any top-level shape that is
/// not a filter condition or a non-empty `and`/`or`.
pub fn deserialize<A: IdAllocator + ?Sized>(expr: Option<&Value>, ids: &mut A) -> Forest {
    let Some(expr) = expr.filter(|v| !v.is_null()) else {
        return Forest::empty();
    };

    let mut builder = ForestBuilder {
        ids,
        forest: Forest::empty(),
        used_filter_ids: HashSet::new(),
    };
    let root_id = GroupId::root();

    match classify(expr) {
        Node::Connector(connector, children) => {
            let items = builder.build_items(children, &root_id);
            if !items.is_empty() {
                builder.forest.root.connector = connector;
                builder.forest.root.items = items;
            }
        }
        Node::Condition(body) => {
            if let Some(id) = builder.build_filter(body, &root_id) {
                builder.forest.root.items.push(ItemRef::filter(id));
            }
        }
        Node::Invalid => {
            warn!("document is neither a filter condition nor an and/or expression");
        }
    }

    let mut forest = builder.forest;
    assign_group_ids(&mut forest);
    debug!(
        filters = forest.filters.len(),
        groups = forest.groups.len(),
        "deserialized filter tree"
    );
    forest
}

struct ForestBuilder<'a, A: IdAllocator + ?Sized> {
    ids: &'a mut A,
    forest: Forest,
    used_filter_ids: HashSet<FilterId>,
}

impl<A: IdAllocator + ?Sized> ForestBuilder<'_, A> {
    fn build_items(&mut self, children: &[Value], parent: &GroupId) -> Vec<ItemRef> {
        let mut items = Vec::with_capacity(children.len());
        for child in children {
            match classify(child) {
                Node::Condition(body) => {
                    if let Some(id) = self.build_filter(body, parent) {
                        items.push(ItemRef::filter(id));
                    }
                }
                Node::Connector(connector, grandchildren) => {
                    let group_id = self.ids.next_group_id();
                    let mut group = Group::new(group_id.clone(), connector);
                    group.items = self.build_items(grandchildren, &group_id);
                    if group.items.is_empty() {
                        debug!(group = %group_id, "dropping nested group with no usable children");
                        continue;
                    }
                    self.forest.groups.insert(group_id.clone(), group);
                    items.push(ItemRef::group(group_id));
                }
                Node::Invalid => {
                    warn!(node = %child, "skipping unrecognised node");
                }
            }
        }
        items
    }

    fn build_filter(&mut self, body: &Map<String, Value>, group: &GroupId) -> Option<FilterId> {
        let Some(filter_type) = body
            .get("type")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
        else {
            warn!("skipping filter condition without a type");
            return None;
        };
        let Some(predicate) = body
            .get("predicate")
            .and_then(Value::as_str)
            .and_then(|p| p.parse::<Relation>().ok())
        else {
            warn!(filter_type, "skipping filter condition with a missing or unknown predicate");
            return None;
        };
        let ref_value = body.get("ref").map(coerce_ref).unwrap_or_default();

        let id = match body.get("id").and_then(embedded_id) {
            Some(id) if !self.used_filter_ids.contains(&id) => id,
            Some(id) => {
                debug!(id, "embedded filter id already used, allocating a new one");
                self.fresh_filter_id()
            }
            None => self.fresh_filter_id(),
        };
        self.used_filter_ids.insert(id);

        self.forest.filters.push(Filter::new(
            id,
            filter_type,
            predicate,
            ref_value,
            group.clone(),
        ));
        Some(id)
    }

    fn fresh_filter_id(&mut self) -> FilterId {
        loop {
            let id = self.ids.next_filter_id();
            if !self.used_filter_ids.contains(&id) {
                return id;
            }
        }
    }
}

/// An id embedded in a condition, if it is one the counters can move past.
fn embedded_id(value: &Value) -> Option<FilterId> {
    let id = match value {
        Value::Number(n) => n.as_u64()?,
        Value::String(s) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => {
            s.parse().ok()?
        }
        _ => return None,
    };
    (id < FilterId::MAX).then_some(id)
}

fn coerce_ref(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
