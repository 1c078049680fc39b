//! Traversals over the group graph.
//!
//! Groups reference their children by id, so nothing in the data model stops a
//! group from (directly or transitively) listing itself. Every walk here keeps a
//! visited set and refuses to descend into a group twice.

use crate::model::{Connector, Filter, FilterId, Forest, Group, GroupId, ItemRef};
use crate::store::FilterStore;
use std::collections::{BTreeMap, HashMap, HashSet};

/// A borrowed view of the three tree collections.
#[derive(Debug, Clone, Copy)]
pub struct TreeView<'a> {
    pub filters: &'a [Filter],
    pub root: &'a Group,
    pub groups: &'a BTreeMap<GroupId, Group>,
}

/// One line of a depth-first rendering of the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayNode {
    pub depth: usize,
    pub entry: TreeEntry,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeEntry {
    Group {
        id: GroupId,
        connector: Connector,
        len: usize,
    },
    Filter(Filter),
    /// An item whose target does not exist.
    Dangling(ItemRef),
    /// A group reached a second time on the current walk.
    Cycle(GroupId),
}

/// Everything reachable from one group, the group itself included.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Subtree {
    pub filters: Vec<FilterId>,
    pub groups: Vec<GroupId>,
}

impl<'a> TreeView<'a> {
    pub fn new(filters: &'a [Filter], root: &'a Group, groups: &'a BTreeMap<GroupId, Group>) -> Self {
        Self {
            filters,
            root,
            groups,
        }
    }

    pub fn of_store(store: &'a FilterStore) -> Self {
        Self::new(store.filters(), store.root_group(), store.groups())
    }

    pub fn of_forest(forest: &'a Forest) -> Self {
        Self::new(&forest.filters, &forest.root, &forest.groups)
    }

    pub fn group(&self, id: &GroupId) -> Option<&'a Group> {
        if id.is_root() {
            Some(self.root)
        } else {
            self.groups.get(id)
        }
    }

    pub fn filter(&self, id: FilterId) -> Option<&'a Filter> {
        self.filters.iter().find(|f| f.id == id)
    }

    /// Depth-first listing starting at root (depth 0).
    pub fn flatten(&self) -> Vec<DisplayNode> {
        let mut out = Vec::new();
        let mut visited = HashSet::new();
        self.flatten_group(self.root, 0, &mut visited, &mut out);
        out
    }

    fn flatten_group(
        &self,
        group: &'a Group,
        depth: usize,
        visited: &mut HashSet<GroupId>,
        out: &mut Vec<DisplayNode>,
    ) {
        if !visited.insert(group.id.clone()) {
            out.push(DisplayNode {
                depth,
                entry: TreeEntry::Cycle(group.id.clone()),
            });
            return;
        }
        out.push(DisplayNode {
            depth,
            entry: TreeEntry::Group {
                id: group.id.clone(),
                connector: group.connector,
                len: group.items.len(),
            },
        });
        for item in &group.items {
            match item {
                ItemRef::Filter { id } => {
                    let entry = match self.filter(*id) {
                        Some(filter) => TreeEntry::Filter(filter.clone()),
                        None => TreeEntry::Dangling(item.clone()),
                    };
                    out.push(DisplayNode {
                        depth: depth + 1,
                        entry,
                    });
                }
                ItemRef::Group { id } => match self.group(id) {
                    Some(child) => self.flatten_group(child, depth + 1, visited, out),
                    None => out.push(DisplayNode {
                        depth: depth + 1,
                        entry: TreeEntry::Dangling(item.clone()),
                    }),
                },
            }
        }
    }

    /// The group each filter is actually placed in, found by walking down from root.
    ///
    /// A filter referenced from more than one group keeps its first placement.
    pub fn placements(&self) -> HashMap<FilterId, GroupId> {
        let mut placements = HashMap::new();
        let mut visited = HashSet::new();
        self.collect_placements(self.root, &mut visited, &mut placements);
        placements
    }

    fn collect_placements(
        &self,
        group: &'a Group,
        visited: &mut HashSet<GroupId>,
        placements: &mut HashMap<FilterId, GroupId>,
    ) {
        if !visited.insert(group.id.clone()) {
            return;
        }
        for item in &group.items {
            match item {
                ItemRef::Filter { id } => {
                    placements.entry(*id).or_insert_with(|| group.id.clone());
                }
                ItemRef::Group { id } => {
                    if let Some(child) = self.group(id) {
                        self.collect_placements(child, visited, placements);
                    }
                }
            }
        }
    }

    /// All filters and groups transitively contained in `id`, `id` first.
    ///
    /// Returns an empty subtree when `id` does not exist.
    pub fn subtree(&self, id: &GroupId) -> Subtree {
        let mut subtree = Subtree::default();
        let mut visited = HashSet::new();
        if let Some(group) = self.group(id) {
            self.collect_subtree(group, &mut visited, &mut subtree);
        }
        subtree
    }

    fn collect_subtree(
        &self,
        group: &'a Group,
        visited: &mut HashSet<GroupId>,
        subtree: &mut Subtree,
    ) {
        if !visited.insert(group.id.clone()) {
            return;
        }
        subtree.groups.push(group.id.clone());
        for item in &group.items {
            match item {
                ItemRef::Filter { id } => subtree.filters.push(*id),
                ItemRef::Group { id } => {
                    if let Some(child) = self.group(id) {
                        self.collect_subtree(child, visited, subtree);
                    }
                }
            }
        }
    }
}

/// Rewrites every filter's `group_id` to match where the tree actually places it.
///
/// Filters that are not reachable from root keep their previous value.
pub fn assign_group_ids(forest: &mut Forest) {
    let placements = TreeView::of_forest(forest).placements();
    for filter in &mut forest.filters {
        if let Some(group_id) = placements.get(&filter.id) {
            filter.group_id = group_id.clone();
        }
    }
}
