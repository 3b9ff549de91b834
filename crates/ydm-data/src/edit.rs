//! # Editing Surface
//!
//! [`NodeMut`] is a cursor on one container of a [`DataTree`] paired with the
//! schema node it instantiates. Every write is resolved against the schema
//! first: unknown names, wrong node kinds and values that cannot be
//! represented in the leaf's type are rejected at assignment, so the tree
//! only ever holds values in their type's native shape.
//!
//! Constraint checks (ranges, patterns, ...) are not applied here; a value
//! of the right shape that violates a constraint is stored and reported by
//! the validator.
//!
//! ```ignore
//! let mut data = DataTree::new();
//! let mut device = data.edit(&schema).container("device")?;
//! device.set("hostname", "edge-1")?;
//! device.container("interface")?.set("name", "eth0")?.set("mtu", 9000u16)?;
//! device.list_entry("vlan", 10u16)?.set("name", "mgmt")?;
//! ```

use ydm_core::{DataError, DataPath, Value};
use ydm_schema::{NodeKind, SchemaNode, SchemaTree};

use crate::codec;
use crate::tree::{DataContainer, DataList, DataNode, DataTree};

impl DataTree {
    /// Cursor on the root container.
    pub fn edit<'s>(&mut self, schema: &'s SchemaTree) -> NodeMut<'s, '_> {
        NodeMut {
            schema,
            node: None,
            data: self.root_mut(),
            path: DataPath::root(),
            key: None,
        }
    }
}

/// Mutable cursor on one container or list entry.
#[derive(Debug)]
pub struct NodeMut<'s, 'd> {
    schema: &'s SchemaTree,
    node: Option<&'s SchemaNode>,
    data: &'d mut DataContainer,
    path: DataPath,
    key: Option<&'s str>,
}

impl<'s, 'd> NodeMut<'s, 'd> {
    /// Data path of this container.
    pub fn path(&self) -> &DataPath {
        &self.path
    }

    /// Schema node of this container; `None` at the root.
    pub fn schema_node(&self) -> Option<&'s SchemaNode> {
        self.node
    }

    pub fn data(&self) -> &DataContainer {
        self.data
    }

    /// Get or create the child container `name`.
    pub fn container(&mut self, name: &str) -> Result<NodeMut<'s, '_>, DataError> {
        let node = self.child_schema(name, NodeKind::Container)?;
        let path = self.path.child(name);
        let slot = self
            .data
            .children
            .entry(name.to_string())
            .or_insert_with(|| DataNode::Container(DataContainer::new(node.data_path().clone())));
        match slot {
            DataNode::Container(data) => Ok(NodeMut {
                schema: self.schema,
                node: Some(node),
                data,
                path,
                key: None,
            }),
            other => Err(kind_mismatch(&path, NodeKind::Container, other)),
        }
    }

    /// Assign leaf `name`, coercing `value` into the leaf's type.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<&mut Self, DataError> {
        let node = self.child_schema(name, NodeKind::Leaf)?;
        let value = self.coerce(node, value.into(), name)?;
        if self.key == Some(name) {
            if let Some(current) = self.data.leaf(name) {
                if current != &value {
                    return Err(DataError::KeyChange {
                        path: self.path.to_string(),
                        key: name.to_string(),
                    });
                }
            }
        }
        self.data
            .children
            .insert(name.to_string(), DataNode::Leaf(value));
        Ok(self)
    }

    /// Remove leaf `name`, returning its previous value.
    pub fn unset(&mut self, name: &str) -> Result<Option<Value>, DataError> {
        self.child_schema(name, NodeKind::Leaf)?;
        if self.key == Some(name) {
            return Err(DataError::KeyChange {
                path: self.path.to_string(),
                key: name.to_string(),
            });
        }
        Ok(match self.data.children.remove(name) {
            Some(DataNode::Leaf(v)) => Some(v),
            _ => None,
        })
    }

    /// Current value of leaf `name`; absent leaves yield `None`.
    pub fn get(&self, name: &str) -> Result<Option<&Value>, DataError> {
        self.child_schema(name, NodeKind::Leaf)?;
        Ok(self.data.leaf(name))
    }

    /// Current value of leaf `name`, or its schema default when absent.
    pub fn get_or_default(&self, name: &str) -> Result<Option<Value>, DataError> {
        let node = self.child_schema(name, NodeKind::Leaf)?;
        Ok(self
            .data
            .leaf(name)
            .or_else(|| node.default())
            .cloned())
    }

    /// Append `value` to leaf-list `name`.
    pub fn push(&mut self, name: &str, value: impl Into<Value>) -> Result<&mut Self, DataError> {
        let node = self.child_schema(name, NodeKind::LeafList)?;
        let value = self.coerce(node, value.into(), name)?;
        let path = self.path.child(name);
        match self
            .data
            .children
            .entry(name.to_string())
            .or_insert_with(|| DataNode::LeafList(Vec::new()))
        {
            DataNode::LeafList(values) => values.push(value),
            other => return Err(kind_mismatch(&path, NodeKind::LeafList, other)),
        }
        Ok(self)
    }

    /// Get or create the entry of list `name` whose key leaf equals `key`.
    pub fn list_entry(
        &mut self,
        name: &str,
        key: impl Into<Value>,
    ) -> Result<NodeMut<'s, '_>, DataError> {
        let node = self.child_schema(name, NodeKind::List)?;
        let key_leaf = self
            .schema
            .key_leaf(node)
            .ok_or_else(|| DataError::UnknownNode {
                path: self.path.child(name).to_string(),
            })?;
        let key_value = self.coerce(key_leaf, key.into(), name)?;
        let key_text = key_value.to_string();
        let path = self.path.entry(name, key_leaf.name(), &key_text);
        let list_path = self.path.child(name);

        let slot = self
            .data
            .children
            .entry(name.to_string())
            .or_insert_with(|| DataNode::List(DataList::new(node.data_path().clone(), key_leaf.name())));
        let list = match slot {
            DataNode::List(list) => list,
            other => return Err(kind_mismatch(&list_path, NodeKind::List, other)),
        };
        if list.entry(&key_text).is_none() {
            let mut entry = DataContainer::new(node.data_path().clone());
            entry
                .children
                .insert(key_leaf.name().to_string(), DataNode::Leaf(key_value));
            list.entries.push(entry);
        }
        let data = list
            .entry_mut(&key_text)
            .ok_or_else(|| DataError::UnknownNode {
                path: path.to_string(),
            })?;
        Ok(NodeMut {
            schema: self.schema,
            node: Some(node),
            data,
            path,
            key: Some(key_leaf.name()),
        })
    }

    /// Remove the entry of list `name` whose key leaf equals `key`.
    /// Returns false if no such entry exists.
    pub fn remove_entry(&mut self, name: &str, key: impl Into<Value>) -> Result<bool, DataError> {
        let node = self.child_schema(name, NodeKind::List)?;
        let Some(key_leaf) = self.schema.key_leaf(node) else {
            return Ok(false);
        };
        let key_text = self.coerce(key_leaf, key.into(), name)?.to_string();
        Ok(match self.data.children.get_mut(name) {
            Some(DataNode::List(list)) => list.remove(&key_text).is_some(),
            _ => false,
        })
    }

    /// Remove child `name` of any kind.
    pub fn remove(&mut self, name: &str) -> Result<Option<DataNode>, DataError> {
        if self.schema.data_child(self.node, name).is_none() {
            return Err(DataError::UnknownNode {
                path: self.path.child(name).to_string(),
            });
        }
        if self.key == Some(name) {
            return Err(DataError::KeyChange {
                path: self.path.to_string(),
                key: name.to_string(),
            });
        }
        Ok(self.data.children.remove(name))
    }

    fn child_schema(&self, name: &str, kind: NodeKind) -> Result<&'s SchemaNode, DataError> {
        let node = self
            .schema
            .data_child(self.node, name)
            .ok_or_else(|| DataError::UnknownNode {
                path: self.path.child(name).to_string(),
            })?;
        if node.kind() != kind {
            return Err(DataError::KindMismatch {
                path: self.path.child(name).to_string(),
                expected: kind.as_str().to_string(),
                found: node.kind().as_str().to_string(),
            });
        }
        Ok(node)
    }

    fn coerce(&self, node: &SchemaNode, value: Value, name: &str) -> Result<Value, DataError> {
        let mismatch = |expected: String| DataError::TypeMismatch {
            path: self.path.child(name).to_string(),
            expected,
            found: format!("{} \"{value}\"", value.kind_name()),
        };
        let spec = node
            .type_spec()
            .ok_or_else(|| mismatch(node.kind().as_str().to_string()))?;
        codec::assign(spec, &value).ok_or_else(|| mismatch(spec.describe()))
    }
}

fn kind_mismatch(path: &DataPath, expected: NodeKind, found: &DataNode) -> DataError {
    DataError::KindMismatch {
        path: path.to_string(),
        expected: expected.as_str().to_string(),
        found: found.kind_name().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ydm_schema::{
        CaseStmt, ChoiceStmt, ContainerStmt, LeafListStmt, LeafStmt, ListStmt, ModuleFragment,
        SchemaBuilder, TypeStmt,
    };

    fn schema() -> SchemaTree {
        SchemaBuilder::new()
            .module(
                ModuleFragment::new("m", "m", "urn:m").node(
                    ContainerStmt::new("device")
                        .child(LeafStmt::new("hostname", TypeStmt::named("string")))
                        .child(
                            LeafStmt::new("mtu", TypeStmt::named("uint16").with_range("68..9216"))
                                .default_value("1500"),
                        )
                        .child(LeafListStmt::new("ports", TypeStmt::named("string")))
                        .child(
                            ListStmt::new("vlan", "id")
                                .child(LeafStmt::new("id", TypeStmt::named("uint16")))
                                .child(LeafStmt::new("name", TypeStmt::named("string"))),
                        )
                        .child(ChoiceStmt::new("mode").case(
                            CaseStmt::new("dhcp")
                                .child(LeafStmt::new("dhcp-client", TypeStmt::named("boolean"))),
                        )),
                ),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn test_set_and_get() {
        let schema = schema();
        let mut data = DataTree::new();
        let mut root = data.edit(&schema);
        let mut device = root.container("device").unwrap();
        device.set("hostname", "edge-1").unwrap().set("mtu", 9000u16).unwrap();
        assert_eq!(device.get("mtu").unwrap(), Some(&Value::Uint(9000)));
        assert_eq!(device.path().to_string(), "/device");

        let stored = data.root().container("device").unwrap();
        assert_eq!(stored.leaf("hostname"), Some(&Value::from("edge-1")));
    }

    #[test]
    fn test_signed_input_is_stored_in_native_shape() {
        let schema = schema();
        let mut data = DataTree::new();
        data.edit(&schema)
            .container("device")
            .unwrap()
            .set("mtu", 1400i32)
            .unwrap();
        let device = data.root().container("device").unwrap();
        assert_eq!(device.leaf("mtu"), Some(&Value::Uint(1400)));
    }

    #[test]
    fn test_set_rejects_bad_shapes_and_names() {
        let schema = schema();
        let mut data = DataTree::new();
        let mut root = data.edit(&schema);
        let mut device = root.container("device").unwrap();
        let err = device.set("mtu", "big").unwrap_err();
        assert!(matches!(err, DataError::TypeMismatch { ref path, .. } if path == "/device/mtu"));
        let err = device.set("mtu", 70000u32).unwrap_err();
        assert!(matches!(err, DataError::TypeMismatch { .. }));
        let err = device.set("nope", 1u8).unwrap_err();
        assert!(matches!(err, DataError::UnknownNode { .. }));
        let err = device.set("ports", "a").unwrap_err();
        assert!(matches!(err, DataError::KindMismatch { .. }));
    }

    #[test]
    fn test_constraint_violations_are_stored() {
        let schema = schema();
        let mut data = DataTree::new();
        let mut root = data.edit(&schema);
        let mut device = root.container("device").unwrap();
        device.set("mtu", 10u16).unwrap();
        assert_eq!(device.get("mtu").unwrap(), Some(&Value::Uint(10)));
    }

    #[test]
    fn test_get_or_default_and_unset() {
        let schema = schema();
        let mut data = DataTree::new();
        let mut root = data.edit(&schema);
        let mut device = root.container("device").unwrap();
        assert_eq!(device.get("mtu").unwrap(), None);
        assert_eq!(device.get_or_default("mtu").unwrap(), Some(Value::Uint(1500)));
        device.set("mtu", 9000u16).unwrap();
        assert_eq!(device.unset("mtu").unwrap(), Some(Value::Uint(9000)));
        assert_eq!(device.get("mtu").unwrap(), None);
    }

    #[test]
    fn test_leaf_list_push() {
        let schema = schema();
        let mut data = DataTree::new();
        let mut root = data.edit(&schema);
        let mut device = root.container("device").unwrap();
        device.push("ports", "eth0").unwrap().push("ports", "eth1").unwrap();
        assert_eq!(device.data().leaf_list("ports").unwrap().len(), 2);
    }

    #[test]
    fn test_list_entries() {
        let schema = schema();
        let mut data = DataTree::new();
        let mut root = data.edit(&schema);
        let mut device = root.container("device").unwrap();
        {
            let mut vlan = device.list_entry("vlan", 10u16).unwrap();
            assert_eq!(vlan.path().to_string(), "/device/vlan[id=10]");
            vlan.set("name", "mgmt").unwrap();
            vlan.set("id", 10u16).unwrap();
            let err = vlan.set("id", 11u16).unwrap_err();
            assert!(matches!(err, DataError::KeyChange { .. }));
            assert!(matches!(vlan.unset("id"), Err(DataError::KeyChange { .. })));
        }
        device.list_entry("vlan", 20u16).unwrap();
        device.list_entry("vlan", 10u16).unwrap();
        let list = device.data().list("vlan").unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(
            list.entry("10").unwrap().leaf("name"),
            Some(&Value::from("mgmt"))
        );
        assert!(device.remove_entry("vlan", 10u16).unwrap());
        assert!(!device.remove_entry("vlan", 10u16).unwrap());
        assert!(matches!(
            device.list_entry("vlan", "ten"),
            Err(DataError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_case_leaves_are_direct_children() {
        let schema = schema();
        let mut data = DataTree::new();
        let mut root = data.edit(&schema);
        let mut device = root.container("device").unwrap();
        device.set("dhcp-client", true).unwrap();
        assert!(device.remove("dhcp-client").unwrap().is_some());
        assert!(matches!(device.remove("mode"), Err(DataError::UnknownNode { .. })));
    }
}
