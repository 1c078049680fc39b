use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

pub type FilterId = u64;

const ROOT_GROUP_ID: &str = "root";
const GROUP_ID_PREFIX: &str = "group-";

/// Identifier of a group node: either the `root` sentinel or `group-<n>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(String);

impl GroupId {
    pub fn root() -> Self {
        Self(ROOT_GROUP_ID.to_string())
    }

    pub fn from_index(index: u64) -> Self {
        Self(format!("{}{}", GROUP_ID_PREFIX, index))
    }

    pub fn is_root(&self) -> bool {
        self.0 == ROOT_GROUP_ID
    }

    /// The trailing integer of a `group-<n>` id. `None` for root or any other shape.
    pub fn index(&self) -> Option<u64> {
        let digits = self.0.strip_prefix(GROUP_ID_PREFIX)?;
        let canonical = !digits.is_empty()
            && digits.bytes().all(|b| b.is_ascii_digit())
            && (digits == "0" || !digits.starts_with('0'));
        if !canonical {
            return None;
        }
        digits.parse().ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for GroupId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for GroupId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A comparison operator a filter applies between a field and its reference value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Relation {
    #[default]
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
}

impl Relation {
    pub const ALL: [Relation; 6] = [
        Relation::Lt,
        Relation::Le,
        Relation::Gt,
        Relation::Ge,
        Relation::Eq,
        Relation::Ne,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Relation::Lt => "<",
            Relation::Le => "<=",
            Relation::Gt => ">",
            Relation::Ge => ">=",
            Relation::Eq => "==",
            Relation::Ne => "!=",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Relation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Relation::ALL
            .iter()
            .copied()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| format!("Invalid relation: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Int,
    Float,
    String,
    Boolean,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::Int => "int",
            ValueType::Float => "float",
            ValueType::String => "string",
            ValueType::Boolean => "boolean",
        };
        f.write_str(name)
    }
}

/// An allowed value for a string field, either bare or with a display label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaOption {
    Plain(String),
    Labeled { value: String, label: String },
}

impl SchemaOption {
    pub fn value(&self) -> &str {
        match self {
            SchemaOption::Plain(v) => v,
            SchemaOption::Labeled { value, .. } => value,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            SchemaOption::Plain(v) => v,
            SchemaOption::Labeled { label, .. } => label,
        }
    }
}

/// One filterable field: its name, the operators it allows and the type of its values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaEntry {
    pub name: String,
    pub relations: Vec<Relation>,
    #[serde(rename = "valueType")]
    pub value_type: ValueType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<SchemaOption>>,
}

impl SchemaEntry {
    pub fn new(name: impl Into<String>, relations: Vec<Relation>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            relations,
            value_type,
            options: None,
        }
    }

    pub fn with_options(mut self, options: Vec<SchemaOption>) -> Self {
        self.options = Some(options);
        self
    }
}

/// The caller-supplied list of filterable fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    entries: Vec<SchemaEntry>,
}

impl Schema {
    pub fn new(entries: Vec<SchemaEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[SchemaEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&SchemaEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Relations allowed for `filter_type`, empty when the type is unknown.
    pub fn relations_for(&self, filter_type: &str) -> &[Relation] {
        self.get(filter_type)
            .map(|e| e.relations.as_slice())
            .unwrap_or(&[])
    }

    /// Name of the first schema entry, or `""` for an empty schema.
    pub fn default_filter_type(&self) -> String {
        self.entries
            .first()
            .map(|e| e.name.clone())
            .unwrap_or_default()
    }

    /// First relation of the matching entry, `<` when the type is unknown or has none.
    pub fn default_predicate(&self, filter_type: &str) -> Relation {
        self.relations_for(filter_type)
            .first()
            .copied()
            .unwrap_or_default()
    }
}

impl From<Vec<SchemaEntry>> for Schema {
    fn from(entries: Vec<SchemaEntry>) -> Self {
        Self::new(entries)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Connector {
    And,
    Or,
}

impl Connector {
    pub fn toggled(self) -> Self {
        match self {
            Connector::And => Connector::Or,
            Connector::Or => Connector::And,
        }
    }

    /// The JSON Logic operator key for this connector.
    pub fn key(self) -> &'static str {
        match self {
            Connector::And => "and",
            Connector::Or => "or",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "and" => Some(Connector::And),
            "or" => Some(Connector::Or),
            _ => None,
        }
    }
}

impl fmt::Display for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Connector::And => f.write_str("AND"),
            Connector::Or => f.write_str("OR"),
        }
    }
}

/// A reference from a group to one of its children.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ItemRef {
    Filter { id: FilterId },
    Group { id: GroupId },
}

impl ItemRef {
    pub fn filter(id: FilterId) -> Self {
        ItemRef::Filter { id }
    }

    pub fn group(id: GroupId) -> Self {
        ItemRef::Group { id }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub id: FilterId,
    #[serde(rename = "type")]
    pub filter_type: String,
    pub predicate: Relation,
    #[serde(rename = "ref")]
    pub ref_value: String,
    #[serde(rename = "groupId")]
    pub group_id: GroupId,
}

impl Filter {
    pub fn new(
        id: FilterId,
        filter_type: impl Into<String>,
        predicate: Relation,
        ref_value: impl Into<String>,
        group_id: GroupId,
    ) -> Self {
        Self {
            id,
            filter_type: filter_type.into(),
            predicate,
            ref_value: ref_value.into(),
            group_id,
        }
    }

    /// A filter is only exported once it has a type and a reference value.
    pub fn is_specified(&self) -> bool {
        !self.filter_type.is_empty() && !self.ref_value.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub connector: Connector,
    pub items: Vec<ItemRef>,
}

impl Group {
    pub fn new(id: GroupId, connector: Connector) -> Self {
        Self {
            id,
            connector,
            items: Vec::new(),
        }
    }

    pub fn root() -> Self {
        Self::new(GroupId::root(), Connector::And)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Drops every occurrence of `item`. Returns whether anything was removed.
    pub fn strip(&mut self, item: &ItemRef) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i != item);
        self.items.len() != before
    }
}

/// A partial update applied to a filter. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterUpdate {
    pub filter_type: Option<String>,
    pub predicate: Option<Relation>,
    pub ref_value: Option<String>,
}

impl FilterUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_type(mut self, filter_type: impl Into<String>) -> Self {
        self.filter_type = Some(filter_type.into());
        self
    }

    pub fn with_predicate(mut self, predicate: Relation) -> Self {
        self.predicate = Some(predicate);
        self
    }

    pub fn with_ref(mut self, ref_value: impl Into<String>) -> Self {
        self.ref_value = Some(ref_value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.filter_type.is_none() && self.predicate.is_none() && self.ref_value.is_none()
    }
}

/// The three collections that make up a filter tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Forest {
    pub filters: Vec<Filter>,
    #[serde(rename = "rootGroup")]
    pub root: Group,
    pub groups: BTreeMap<GroupId, Group>,
}

impl Default for Forest {
    fn default() -> Self {
        Self::empty()
    }
}

impl Forest {
    pub fn empty() -> Self {
        Self {
            filters: Vec::new(),
            root: Group::root(),
            groups: BTreeMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty() && self.groups.is_empty() && self.root.is_empty()
    }

    pub fn filter(&self, id: FilterId) -> Option<&Filter> {
        self.filters.iter().find(|f| f.id == id)
    }

    pub fn group(&self, id: &GroupId) -> Option<&Group> {
        if id.is_root() {
            Some(&self.root)
        } else {
            self.groups.get(id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_schema() -> Schema {
        Schema::new(vec![
            SchemaEntry::new("count", vec![Relation::Le, Relation::Gt], ValueType::Int),
            SchemaEntry::new("name", vec![Relation::Eq], ValueType::String).with_options(vec![
                SchemaOption::Plain("alice".into()),
                SchemaOption::Labeled {
                    value: "bob".into(),
                    label: "Bob".into(),
                },
            ]),
        ])
    }

    #[test]
    fn group_id_index_parses_generated_ids_only() {
        assert_eq!(GroupId::from_index(7).index(), Some(7));
        assert_eq!(GroupId::root().index(), None);
        assert_eq!(GroupId::from("group-x").index(), None);
        assert_eq!(GroupId::from("grp-3").index(), None);
        assert_eq!(GroupId::from("group-0").index(), Some(0));
        assert_eq!(GroupId::from("group-+3").index(), None);
        assert_eq!(GroupId::from("group-007").index(), None);
        assert_eq!(GroupId::from("group-").index(), None);
    }

    #[test]
    fn relation_parses_all_operators() {
        for rel in Relation::ALL {
            assert_eq!(rel.as_str().parse::<Relation>().unwrap(), rel);
        }
        assert!("=~".parse::<Relation>().is_err());
    }

    #[test]
    fn schema_defaults() {
        let schema = sample_schema();
        assert_eq!(schema.default_filter_type(), "count");
        assert_eq!(schema.default_predicate("count"), Relation::Le);
        assert_eq!(schema.default_predicate("name"), Relation::Eq);
        assert_eq!(schema.default_predicate("missing"), Relation::Lt);
    }

    #[test]
    fn empty_schema_defaults_degrade() {
        let schema = Schema::default();
        assert_eq!(schema.default_filter_type(), "");
        assert_eq!(schema.default_predicate(""), Relation::Lt);
    }

    #[test]
    fn schema_json_shape() {
        let json = r#"[
            {"name": "active", "relations": ["==", "!="], "valueType": "boolean"},
            {"name": "team", "relations": ["=="], "valueType": "string",
             "options": ["red", {"value": "b", "label": "Blue"}]}
        ]"#;
        let schema: Schema = serde_json::from_str(json).unwrap();
        assert_eq!(schema.entries().len(), 2);
        assert_eq!(schema.entries()[0].value_type, ValueType::Boolean);
        let options = schema.entries()[1].options.as_ref().unwrap();
        assert_eq!(options[0].value(), "red");
        assert_eq!(options[1].label(), "Blue");
    }

    #[test]
    fn item_ref_is_tagged_by_kind() {
        let json = serde_json::to_string(&ItemRef::filter(3)).unwrap();
        assert_eq!(json, r#"{"kind":"filter","id":3}"#);
        let json = serde_json::to_string(&ItemRef::group(GroupId::from_index(1))).unwrap();
        assert_eq!(json, r#"{"kind":"group","id":"group-1"}"#);
    }

    #[test]
    fn strip_removes_every_occurrence() {
        let mut group = Group::root();
        group.items = vec![ItemRef::filter(1), ItemRef::filter(2), ItemRef::filter(1)];
        assert!(group.strip(&ItemRef::filter(1)));
        assert_eq!(group.items, vec![ItemRef::filter(2)]);
        assert!(!group.strip(&ItemRef::filter(1)));
    }
}
