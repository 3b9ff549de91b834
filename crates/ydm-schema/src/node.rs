//! Schema nodes as stored in the compiled tree.

use std::fmt;

use ydm_core::{SchemaPath, Value};

use crate::types::TypeSpec;

/// Index of a node in its [`SchemaTree`](crate::SchemaTree) arena.
///
/// Only meaningful for the tree that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Position in the arena.
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Statement kind a schema node was compiled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Container,
    Leaf,
    LeafList,
    List,
    Choice,
    Case,
}

impl NodeKind {
    /// The YANG keyword.
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Container => "container",
            NodeKind::Leaf => "leaf",
            NodeKind::LeafList => "leaf-list",
            NodeKind::List => "list",
            NodeKind::Choice => "choice",
            NodeKind::Case => "case",
        }
    }

    /// Choice and case nodes never appear in instance data.
    pub fn is_data(&self) -> bool {
        !matches!(self, NodeKind::Choice | NodeKind::Case)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One node of a compiled schema.
///
/// `path` includes choice and case names; `data_path` is the path under
/// which the node's data appears, with choice and case levels elided. For
/// choice and case nodes `data_path` is the data path of the nearest data
/// ancestor.
#[derive(Debug, Clone)]
pub struct SchemaNode {
    pub(crate) id: NodeId,
    pub(crate) name: String,
    pub(crate) module: String,
    pub(crate) kind: NodeKind,
    pub(crate) path: SchemaPath,
    pub(crate) data_path: SchemaPath,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) type_spec: Option<TypeSpec>,
    pub(crate) default: Option<Value>,
    pub(crate) mandatory: bool,
    pub(crate) key: Option<String>,
    pub(crate) description: Option<String>,
}

impl SchemaNode {
    /// Arena index of this node.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Identifier without module prefix.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Module that defines the node. Augmented nodes belong to the
    /// augmenting module.
    pub fn module(&self) -> &str {
        &self.module
    }

    /// Statement kind.
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Full schema path, choice and case levels included.
    pub fn path(&self) -> &SchemaPath {
        &self.path
    }

    /// Path under which the node's data appears.
    pub fn data_path(&self) -> &SchemaPath {
        &self.data_path
    }

    /// Schema parent; `None` for top-level nodes.
    pub fn parent_id(&self) -> Option<NodeId> {
        self.parent
    }

    /// Direct children in declaration order (augmented children last).
    pub fn child_ids(&self) -> &[NodeId] {
        &self.children
    }

    /// Type of a leaf or leaf-list.
    pub fn type_spec(&self) -> Option<&TypeSpec> {
        self.type_spec.as_ref()
    }

    /// Default value of a leaf, in the leaf type's native shape.
    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Mandatory leaves and choices must be present in every instance of
    /// their (present) parent.
    pub fn is_mandatory(&self) -> bool {
        self.mandatory
    }

    /// Key leaf name of a list.
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Free-text description from the source statement.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// True unless the node is a choice or a case.
    pub fn is_data_node(&self) -> bool {
        self.kind.is_data()
    }
}
