//! # Data Tree
//!
//! Instance data, keyed by node name. A data tree does not hold a reference
//! to its schema: every container records the data path of the schema node
//! it instantiates, and the codec and validator look the schema up on each
//! call. The same tree can therefore be checked against a base schema and
//! against a deviated one.
//!
//! Absent and zero are different: a leaf that was never set is simply not in
//! its container.

use std::collections::BTreeMap;

use ydm_core::{SchemaPath, Value};

/// Root of an instance data tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataTree {
    root: DataContainer,
}

impl Default for DataTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DataTree {
    pub fn new() -> Self {
        Self {
            root: DataContainer::new(SchemaPath::root()),
        }
    }

    pub(crate) fn from_root(root: DataContainer) -> Self {
        Self { root }
    }

    /// The synthetic container holding the top-level nodes.
    pub fn root(&self) -> &DataContainer {
        &self.root
    }

    pub(crate) fn root_mut(&mut self) -> &mut DataContainer {
        &mut self.root
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }
}

/// One node of instance data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataNode {
    Leaf(Value),
    LeafList(Vec<Value>),
    Container(DataContainer),
    List(DataList),
}

impl DataNode {
    pub fn kind_name(&self) -> &'static str {
        match self {
            DataNode::Leaf(_) => "leaf",
            DataNode::LeafList(_) => "leaf-list",
            DataNode::Container(_) => "container",
            DataNode::List(_) => "list",
        }
    }
}

/// A container or a list entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataContainer {
    pub(crate) schema_path: SchemaPath,
    pub(crate) children: BTreeMap<String, DataNode>,
}

impl DataContainer {
    pub(crate) fn new(schema_path: SchemaPath) -> Self {
        Self {
            schema_path,
            children: BTreeMap::new(),
        }
    }

    /// Data path of the schema node this container instantiates.
    pub fn schema_path(&self) -> &SchemaPath {
        &self.schema_path
    }

    pub fn child(&self, name: &str) -> Option<&DataNode> {
        self.children.get(name)
    }

    /// Present children, ordered by name.
    pub fn children(&self) -> impl Iterator<Item = (&str, &DataNode)> {
        self.children.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn leaf(&self, name: &str) -> Option<&Value> {
        match self.children.get(name)? {
            DataNode::Leaf(v) => Some(v),
            _ => None,
        }
    }

    pub fn leaf_list(&self, name: &str) -> Option<&[Value]> {
        match self.children.get(name)? {
            DataNode::LeafList(v) => Some(v),
            _ => None,
        }
    }

    pub fn container(&self, name: &str) -> Option<&DataContainer> {
        match self.children.get(name)? {
            DataNode::Container(c) => Some(c),
            _ => None,
        }
    }

    pub fn list(&self, name: &str) -> Option<&DataList> {
        match self.children.get(name)? {
            DataNode::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

/// Entries of a list, in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataList {
    pub(crate) schema_path: SchemaPath,
    pub(crate) key: String,
    pub(crate) entries: Vec<DataContainer>,
}

impl DataList {
    pub(crate) fn new(schema_path: SchemaPath, key: &str) -> Self {
        Self {
            schema_path,
            key: key.to_string(),
            entries: Vec::new(),
        }
    }

    pub fn schema_path(&self) -> &SchemaPath {
        &self.schema_path
    }

    /// Name of the key leaf.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Entry whose key leaf has canonical text `key`.
    pub fn entry(&self, key: &str) -> Option<&DataContainer> {
        self.entries.iter().find(|e| self.key_of(e).as_deref() == Some(key))
    }

    pub(crate) fn entry_mut(&mut self, key: &str) -> Option<&mut DataContainer> {
        let leaf = self.key.as_str();
        self.entries
            .iter_mut()
            .find(|e| e.leaf(leaf).map(Value::to_string).as_deref() == Some(key))
    }

    pub(crate) fn remove(&mut self, key: &str) -> Option<DataContainer> {
        let idx = self
            .entries
            .iter()
            .position(|e| self.key_of(e).as_deref() == Some(key))?;
        Some(self.entries.remove(idx))
    }

    /// Canonical key text of an entry.
    pub fn key_of(&self, entry: &DataContainer) -> Option<String> {
        entry.leaf(&self.key).map(Value::to_string)
    }

    pub fn keys(&self) -> impl Iterator<Item = String> + '_ {
        self.entries.iter().filter_map(|e| self.key_of(e))
    }

    pub fn entries(&self) -> &[DataContainer] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_tree_is_empty() {
        let tree = DataTree::new();
        assert!(tree.is_empty());
        assert!(tree.root().schema_path().is_root());
    }

    #[test]
    fn test_accessors_check_node_kind() {
        let mut c = DataContainer::new(SchemaPath::root().child("device"));
        c.children
            .insert("hostname".into(), DataNode::Leaf(Value::from("r1")));
        c.children
            .insert("ports".into(), DataNode::LeafList(vec![Value::from("a")]));
        assert_eq!(c.leaf("hostname"), Some(&Value::from("r1")));
        assert!(c.leaf("ports").is_none());
        assert_eq!(c.leaf_list("ports").map(<[Value]>::len), Some(1));
        assert!(c.container("hostname").is_none());
        let names: Vec<&str> = c.children().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["hostname", "ports"]);
    }

    #[test]
    fn test_list_entry_lookup_by_canonical_key() {
        let path = SchemaPath::root().child("vlan");
        let mut list = DataList::new(path.clone(), "id");
        for id in [10u16, 20] {
            let mut e = DataContainer::new(path.clone());
            e.children.insert("id".into(), DataNode::Leaf(Value::Uint(u64::from(id))));
            list.entries.push(e);
        }
        assert!(list.entry("10").is_some());
        assert!(list.entry("30").is_none());
        assert_eq!(list.keys().collect::<Vec<_>>(), vec!["10", "20"]);
        assert!(list.remove("10").is_some());
        assert_eq!(list.len(), 1);
    }
}
