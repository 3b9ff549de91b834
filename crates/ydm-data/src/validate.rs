//! # Aggregating Validator
//!
//! Walks a data tree against a schema and reports every problem it finds.
//! Validation never stops at the first failure: callers get the complete
//! list in one pass, in schema declaration order.
//!
//! ## What Is Checked
//!
//! - Every present leaf and leaf-list value against its type (shape, range,
//!   length, pattern, enumeration, union).
//! - Mandatory leaves and choices, inside containers and list entries that
//!   are present. An absent container is not descended into.
//! - Data for names the schema does not define (`UnknownNode`).
//! - Data from more than one case of the same choice (`ChoiceConflict`).
//!
//! Findings are values, not errors: [`Violations`] is returned even when it
//! is empty.

use std::fmt;

use serde::Serialize;
use ydm_core::{DataPath, SchemaPath, Value};
use ydm_schema::{NodeKind, SchemaNode, SchemaTree, ViolationKind};

use crate::tree::{DataContainer, DataNode, DataTree};

/// A single validation finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Data path of the offending node, e.g. `/device/vlan[id=10]/name`.
    pub path: String,
    pub kind: ViolationKind,
    /// Human-readable description.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Collection of validation findings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Violations {
    violations: Vec<Violation>,
}

impl Violations {
    /// Returns the number of violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Returns true if the data is valid.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Returns a slice of all violations.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Consumes self and returns the inner Vec.
    pub fn into_inner(self) -> Vec<Violation> {
        self.violations
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Violation> {
        self.violations.iter()
    }

    /// Violations of one kind.
    pub fn of_kind(&self, kind: ViolationKind) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(move |v| v.kind == kind)
    }

    /// Violations reported at exactly `path`.
    pub fn at(&self, path: &str) -> impl Iterator<Item = &Violation> + '_ {
        let path = path.to_string();
        self.violations.iter().filter(move |v| v.path == path)
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Violations {
    type Item = &'a Violation;
    type IntoIter = std::slice::Iter<'a, Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.iter()
    }
}

/// Validate a whole data tree.
pub fn validate(tree: &DataTree, schema: &SchemaTree) -> Violations {
    Validator::new(schema).validate(tree)
}

/// Validator bound to one schema tree.
///
/// Holds no state besides the schema reference; one validator may check any
/// number of data trees, from any number of threads.
#[derive(Debug, Clone, Copy)]
pub struct Validator<'s> {
    schema: &'s SchemaTree,
}

impl<'s> Validator<'s> {
    pub fn new(schema: &'s SchemaTree) -> Self {
        Self { schema }
    }

    pub fn validate(&self, tree: &DataTree) -> Violations {
        let mut out = Vec::new();
        self.walk(None, tree.root(), &DataPath::root(), &mut out);
        tracing::debug!(violations = out.len(), "validated data tree");
        Violations { violations: out }
    }

    /// Validate one container or list entry in isolation, as if it were
    /// present in a tree.
    pub fn validate_container(&self, container: &DataContainer) -> Violations {
        let path = container.schema_path();
        let data_path = path
            .segments()
            .fold(DataPath::root(), |p, s| p.child(s));
        let mut out = Vec::new();
        match self.node_for(path) {
            Some(node) => self.walk(node, container, &data_path, &mut out),
            None => out.push(Violation {
                path: data_path.to_string(),
                kind: ViolationKind::UnknownNode,
                message: format!("no schema node at {path}"),
            }),
        }
        Violations { violations: out }
    }

    fn node_for(&self, path: &SchemaPath) -> Option<Option<&'s SchemaNode>> {
        if path.is_root() {
            return Some(None);
        }
        self.schema
            .find_data(path)
            .filter(|n| matches!(n.kind(), NodeKind::Container | NodeKind::List))
            .map(Some)
    }

    fn walk(
        &self,
        node: Option<&SchemaNode>,
        data: &DataContainer,
        path: &DataPath,
        out: &mut Vec<Violation>,
    ) {
        for child in self.schema.data_children(node) {
            let child_path = path.child(child.name());
            match (child.kind(), data.child(child.name())) {
                (NodeKind::Leaf, None)
                    if child.is_mandatory() && self.in_selected_case(child, data) =>
                {
                    out.push(Violation {
                        path: child_path.to_string(),
                        kind: ViolationKind::MissingMandatory,
                        message: format!("mandatory leaf \"{}\" is missing", child.name()),
                    })
                }
                (_, None) => {}
                (NodeKind::Leaf, Some(DataNode::Leaf(v))) => {
                    self.check_value(child, v, &child_path, out);
                }
                (NodeKind::LeafList, Some(DataNode::LeafList(values))) => {
                    for v in values {
                        self.check_value(child, v, &child_path, out);
                    }
                }
                (NodeKind::Container, Some(DataNode::Container(c))) => {
                    self.walk(Some(child), c, &child_path, out);
                }
                (NodeKind::List, Some(DataNode::List(list))) => {
                    for entry in list.entries() {
                        match list.key_of(entry) {
                            Some(key) => {
                                let entry_path = path.entry(child.name(), list.key(), &key);
                                self.walk(Some(child), entry, &entry_path, out);
                            }
                            None => {
                                out.push(Violation {
                                    path: child_path.to_string(),
                                    kind: ViolationKind::MissingMandatory,
                                    message: format!(
                                        "list entry is missing its key leaf \"{}\"",
                                        list.key()
                                    ),
                                });
                                self.walk(Some(child), entry, &child_path, out);
                            }
                        }
                    }
                }
                (kind, Some(other)) => out.push(Violation {
                    path: child_path.to_string(),
                    kind: ViolationKind::TypeMismatch,
                    message: format!("expected a {kind}, found a {}", other.kind_name()),
                }),
            }
        }

        for (name, _) in data.children() {
            if self.schema.data_child(node, name).is_none() {
                out.push(Violation {
                    path: path.child(name).to_string(),
                    kind: ViolationKind::UnknownNode,
                    message: format!("no schema node \"{name}\" at {path}"),
                });
            }
        }

        for choice in self.schema.choices(node) {
            self.check_choice(choice, data, path, out);
        }
    }

    fn check_value(&self, node: &SchemaNode, value: &Value, path: &DataPath, out: &mut Vec<Violation>) {
        let Some(spec) = node.type_spec() else {
            return;
        };
        out.extend(spec.check(value).into_iter().map(|f| Violation {
            path: path.to_string(),
            kind: f.kind,
            message: f.reason,
        }));
    }

    fn check_choice(
        &self,
        choice: &SchemaNode,
        data: &DataContainer,
        path: &DataPath,
        out: &mut Vec<Violation>,
    ) {
        if !self.in_selected_case(choice, data) {
            return;
        }
        let present: Vec<&str> = self
            .schema
            .children(choice)
            .filter(|case| self.case_present(case, data))
            .map(SchemaNode::name)
            .collect();
        if present.len() > 1 {
            out.push(Violation {
                path: path.to_string(),
                kind: ViolationKind::ChoiceConflict,
                message: format!(
                    "data from multiple cases of choice \"{}\": {}",
                    choice.name(),
                    present.join(", ")
                ),
            });
        } else if present.is_empty() && choice.is_mandatory() {
            out.push(Violation {
                path: path.to_string(),
                kind: ViolationKind::MissingMandatory,
                message: format!("mandatory choice \"{}\" has no case present", choice.name()),
            });
        }
    }

    /// Every case between `node` and its data parent has data in `data`.
    /// Mandatory statements inside a case only bind once that case is chosen.
    fn in_selected_case(&self, node: &SchemaNode, data: &DataContainer) -> bool {
        let mut cur = self.schema.parent(node);
        while let Some(n) = cur {
            if n.is_data_node() {
                break;
            }
            if n.kind() == NodeKind::Case && !self.case_present(n, data) {
                return false;
            }
            cur = self.schema.parent(n);
        }
        true
    }

    fn case_present(&self, case: &SchemaNode, data: &DataContainer) -> bool {
        self.schema
            .data_children(Some(case))
            .iter()
            .any(|n| data.child(n.name()).is_some())
    }
}
