//! # Schema Tree
//!
//! Arena of [`SchemaNode`]s addressed by [`NodeId`], with two hash indices:
//! one by full schema path (choice and case levels included) and one by
//! data path (choice and case levels elided). The tree is immutable once the
//! builder returns it and is `Send + Sync`, so any number of threads may
//! share one `Arc<SchemaTree>`.

use std::collections::HashMap;

use ydm_core::{SchemaPath, TargetPath};

use crate::node::{NodeId, NodeKind, SchemaNode};

/// Identity of a module that contributed to the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleInfo {
    pub name: String,
    pub prefix: String,
    pub namespace: String,
    pub revision: Option<String>,
}

/// A compiled, immutable schema.
#[derive(Debug, Clone, Default)]
pub struct SchemaTree {
    nodes: Vec<SchemaNode>,
    roots: Vec<NodeId>,
    modules: Vec<ModuleInfo>,
    by_path: HashMap<SchemaPath, NodeId>,
    by_data_path: HashMap<SchemaPath, NodeId>,
}

impl SchemaTree {
    /// Number of schema nodes, choice and case nodes included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True for a tree with no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node by arena index.
    pub fn node(&self, id: NodeId) -> Option<&SchemaNode> {
        self.nodes.get(id.0)
    }

    /// All nodes in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &SchemaNode> {
        self.nodes.iter()
    }

    /// Top-level schema nodes in declaration order.
    pub fn roots(&self) -> impl Iterator<Item = &SchemaNode> {
        self.roots.iter().map(move |id| &self.nodes[id.0])
    }

    /// Modules that contributed to the tree, in the order they were added.
    pub fn modules(&self) -> &[ModuleInfo] {
        &self.modules
    }

    /// Module by name.
    pub fn module(&self, name: &str) -> Option<&ModuleInfo> {
        self.modules.iter().find(|m| m.name == name)
    }

    /// Look up a data node by path text. Module prefixes are accepted and
    /// ignored; choice and case names must not appear.
    pub fn find(&self, path: &str) -> Option<&SchemaNode> {
        let path = SchemaPath::parse(path).ok()?;
        self.find_data(&path)
    }

    /// Look up a data node by data path.
    pub fn find_data(&self, path: &SchemaPath) -> Option<&SchemaNode> {
        self.by_data_path.get(path).map(|id| &self.nodes[id.0])
    }

    /// Look up any node, choice and case included, by full schema path.
    pub fn find_schema(&self, path: &SchemaPath) -> Option<&SchemaNode> {
        self.by_path.get(path).map(|id| &self.nodes[id.0])
    }

    /// Direct schema children in declaration order.
    pub fn children<'a>(&'a self, node: &'a SchemaNode) -> impl Iterator<Item = &'a SchemaNode> {
        node.children.iter().map(move |id| &self.nodes[id.0])
    }

    /// Schema parent, which may be a choice or a case.
    pub fn parent(&self, node: &SchemaNode) -> Option<&SchemaNode> {
        node.parent.map(|id| &self.nodes[id.0])
    }

    /// Nearest ancestor that is a data node.
    pub fn data_parent(&self, node: &SchemaNode) -> Option<&SchemaNode> {
        let mut cur = self.parent(node);
        while let Some(n) = cur {
            if n.is_data_node() {
                return Some(n);
            }
            cur = self.parent(n);
        }
        None
    }

    /// Data child called `name` of `parent` (the root when `None`), looking
    /// through choice and case levels.
    pub fn data_child(&self, parent: Option<&SchemaNode>, name: &str) -> Option<&SchemaNode> {
        let base = parent.map_or_else(SchemaPath::root, |p| p.data_path.clone());
        self.find_data(&base.child(name))
    }

    /// Data children of `parent` (the root when `None`) in declaration
    /// order, looking through choice and case levels.
    pub fn data_children(&self, parent: Option<&SchemaNode>) -> Vec<&SchemaNode> {
        let ids = match parent {
            Some(p) => p.children.as_slice(),
            None => self.roots.as_slice(),
        };
        let mut out = Vec::new();
        self.collect_data(ids, &mut out);
        out
    }

    fn collect_data<'a>(&'a self, ids: &[NodeId], out: &mut Vec<&'a SchemaNode>) {
        for id in ids {
            let node = &self.nodes[id.0];
            if node.is_data_node() {
                out.push(node);
            } else {
                self.collect_data(&node.children, out);
            }
        }
    }

    /// Choice nodes whose data appears directly under `parent`, nested
    /// choices included.
    pub fn choices(&self, parent: Option<&SchemaNode>) -> Vec<&SchemaNode> {
        let ids = match parent {
            Some(p) => p.children.as_slice(),
            None => self.roots.as_slice(),
        };
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = ids.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id.0];
            if node.is_data_node() {
                continue;
            }
            if node.kind == NodeKind::Choice {
                out.push(node);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    /// Key leaf of a list node.
    pub fn key_leaf<'a>(&'a self, list: &'a SchemaNode) -> Option<&'a SchemaNode> {
        let key = list.key.as_deref()?;
        self.children(list)
            .find(|c| c.kind == NodeKind::Leaf && c.name == key)
    }

    // Construction; only the builder mutates a tree.

    pub(crate) fn add_module(&mut self, info: ModuleInfo) {
        self.modules.push(info);
    }

    pub(crate) fn push(&mut self, mut node: SchemaNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        node.id = id;
        match node.parent {
            Some(parent) => self.nodes[parent.0].children.push(id),
            None => self.roots.push(id),
        }
        self.nodes.push(node);
        id
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> &mut SchemaNode {
        &mut self.nodes[id.0]
    }

    pub(crate) fn get(&self, id: NodeId) -> &SchemaNode {
        &self.nodes[id.0]
    }

    /// Resolve a statement target against the tree under construction.
    /// Every segment names a direct schema child, choice and case included.
    pub(crate) fn locate(&self, target: &TargetPath) -> Option<NodeId> {
        let mut level: &[NodeId] = &self.roots;
        let mut found = None;
        for seg in target.segments() {
            let id = level
                .iter()
                .copied()
                .find(|id| self.nodes[id.0].name == seg.name)?;
            level = &self.nodes[id.0].children;
            found = Some(id);
        }
        found
    }

    /// Returns true if `name` is already used by a schema node sharing the
    /// data namespace of `parent`. Choice and case levels are transparent,
    /// so siblings inside different cases of one choice collide too.
    pub(crate) fn name_taken(&self, parent: Option<NodeId>, name: &str) -> bool {
        let mut scope = parent;
        while let Some(id) = scope {
            if self.nodes[id.0].is_data_node() {
                break;
            }
            scope = self.nodes[id.0].parent;
        }
        let mut stack: Vec<NodeId> = match scope {
            Some(id) => self.nodes[id.0].children.clone(),
            None => self.roots.clone(),
        };
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id.0];
            if node.name == name {
                return true;
            }
            if !node.is_data_node() {
                stack.extend(node.children.iter().copied());
            }
        }
        false
    }

    pub(crate) fn finalize(mut self) -> Self {
        self.by_path.clear();
        self.by_data_path.clear();
        for node in &self.nodes {
            self.by_path.insert(node.path.clone(), node.id);
            if node.is_data_node() {
                self.by_data_path.insert(node.data_path.clone(), node.id);
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_tree_is_shareable() {
        assert_send_sync::<SchemaTree>();
    }

    #[test]
    fn test_empty_tree() {
        let tree = SchemaTree::default().finalize();
        assert!(tree.is_empty());
        assert!(tree.find("/device").is_none());
        assert!(tree.data_children(None).is_empty());
    }
}
