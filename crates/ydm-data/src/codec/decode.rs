use serde_json::{Map, Value as Json};
use ydm_core::{DataPath, DecodeError, SchemaPath};
use ydm_schema::{NodeKind, SchemaNode, SchemaTree};

use super::options::DecodeOptions;
use super::scalar;
use crate::tree::{DataContainer, DataList, DataNode, DataTree};

/// Decode a JSON document into a data tree.
pub fn decode(json: &str, schema: &SchemaTree, opts: &DecodeOptions) -> Result<DataTree, DecodeError> {
    let doc: Json = serde_json::from_str(json).map_err(|e| DecodeError::Malformed(e.to_string()))?;
    decode_value(&doc, schema, opts)
}

/// Decode an already-parsed JSON document into a data tree.
pub fn decode_value(
    doc: &Json,
    schema: &SchemaTree,
    opts: &DecodeOptions,
) -> Result<DataTree, DecodeError> {
    let obj = expect_object(doc, &DataPath::root())?;
    let mut root = DataContainer::new(SchemaPath::root());
    Decoder { schema, opts }.fill(None, &mut root, obj, &DataPath::root())?;
    Ok(DataTree::from_root(root))
}

/// Decode a JSON object holding the contents of the container (or one
/// entry of the list) at `path`.
pub fn decode_subtree(
    json: &str,
    schema: &SchemaTree,
    path: &str,
    opts: &DecodeOptions,
) -> Result<DataContainer, DecodeError> {
    let unknown = || DecodeError::UnknownPath(path.to_string());
    let schema_path = SchemaPath::parse(path).map_err(|_| unknown())?;
    let node = schema
        .find_data(&schema_path)
        .filter(|n| matches!(n.kind(), NodeKind::Container | NodeKind::List))
        .ok_or_else(unknown)?;
    let doc: Json = serde_json::from_str(json).map_err(|e| DecodeError::Malformed(e.to_string()))?;
    let data_path = schema_path
        .segments()
        .fold(DataPath::root(), |p, s| p.child(s));
    let obj = expect_object(&doc, &data_path)?;
    let mut container = DataContainer::new(node.data_path().clone());
    Decoder { schema, opts }.fill(Some(node), &mut container, obj, &data_path)?;
    Ok(container)
}

fn expect_object<'j>(json: &'j Json, path: &DataPath) -> Result<&'j Map<String, Json>, DecodeError> {
    json.as_object().ok_or_else(|| DecodeError::TypeMismatch {
        path: path.to_string(),
        expected: "object".to_string(),
        found: scalar::describe(json),
    })
}

struct Decoder<'a> {
    schema: &'a SchemaTree,
    opts: &'a DecodeOptions,
}

impl<'a> Decoder<'a> {
    /// Resolve a member name, qualified or not, to a data child of `parent`.
    fn resolve(&self, parent: Option<&SchemaNode>, member: &str) -> Option<&'a SchemaNode> {
        let (module, name) = match member.split_once(':') {
            Some((m, n)) => (Some(m), n),
            None => (None, member),
        };
        self.schema
            .data_child(parent, name)
            .filter(|n| module.map_or(true, |m| m == n.module()))
    }

    fn fill(
        &self,
        parent: Option<&SchemaNode>,
        target: &mut DataContainer,
        obj: &Map<String, Json>,
        path: &DataPath,
    ) -> Result<(), DecodeError> {
        for (member, json) in obj {
            let Some(node) = self.resolve(parent, member) else {
                if self.opts.lenient {
                    tracing::debug!(path = %path.child(member), "ignoring unknown member");
                    continue;
                }
                return Err(DecodeError::UnknownField {
                    path: path.child(member).to_string(),
                });
            };
            let node_path = path.child(node.name());
            if target.children.contains_key(node.name()) {
                return Err(DecodeError::Malformed(format!(
                    "member {node_path} appears more than once"
                )));
            }
            let value = match node.kind() {
                NodeKind::Leaf => DataNode::Leaf(self.scalar(node, json, &node_path)?),
                NodeKind::LeafList => {
                    let items = json.as_array().ok_or_else(|| DecodeError::TypeMismatch {
                        path: node_path.to_string(),
                        expected: "array".to_string(),
                        found: scalar::describe(json),
                    })?;
                    DataNode::LeafList(
                        items
                            .iter()
                            .map(|item| self.scalar(node, item, &node_path))
                            .collect::<Result<_, _>>()?,
                    )
                }
                NodeKind::Container => {
                    let obj = expect_object(json, &node_path)?;
                    let mut child = DataContainer::new(node.data_path().clone());
                    self.fill(Some(node), &mut child, obj, &node_path)?;
                    DataNode::Container(child)
                }
                NodeKind::List => DataNode::List(self.list(node, json, path)?),
                NodeKind::Choice | NodeKind::Case => {
                    return Err(DecodeError::UnknownField {
                        path: node_path.to_string(),
                    })
                }
            };
            target.children.insert(node.name().to_string(), value);
        }
        Ok(())
    }

    fn list(&self, node: &SchemaNode, json: &Json, parent: &DataPath) -> Result<DataList, DecodeError> {
        let list_path = parent.child(node.name());
        let items = json.as_array().ok_or_else(|| DecodeError::TypeMismatch {
            path: list_path.to_string(),
            expected: "array".to_string(),
            found: scalar::describe(json),
        })?;
        let key_leaf = self
            .schema
            .key_leaf(node)
            .ok_or_else(|| DecodeError::UnknownPath(list_path.to_string()))?;

        let mut list = DataList::new(node.data_path().clone(), key_leaf.name());
        for item in items {
            let obj = expect_object(item, &list_path)?;
            let key_json = obj
                .iter()
                .find(|(member, _)| {
                    self.resolve(Some(node), member)
                        .is_some_and(|n| n.id() == key_leaf.id())
                })
                .map(|(_, v)| v)
                .ok_or_else(|| DecodeError::MissingKey {
                    path: list_path.to_string(),
                    key: key_leaf.name().to_string(),
                })?;
            let key = self
                .scalar(key_leaf, key_json, &list_path.child(key_leaf.name()))?
                .to_string();
            if list.entry(&key).is_some() {
                return Err(DecodeError::DuplicateKey {
                    path: list_path.to_string(),
                    key,
                });
            }
            let entry_path = parent.entry(node.name(), key_leaf.name(), &key);
            let mut entry = DataContainer::new(node.data_path().clone());
            self.fill(Some(node), &mut entry, obj, &entry_path)?;
            list.entries.push(entry);
        }
        Ok(list)
    }

    fn scalar(&self, node: &SchemaNode, json: &Json, path: &DataPath) -> Result<ydm_core::Value, DecodeError> {
        let mismatch = |expected: String| DecodeError::TypeMismatch {
            path: path.to_string(),
            expected,
            found: scalar::describe(json),
        };
        let spec = node
            .type_spec()
            .ok_or_else(|| mismatch(node.kind().as_str().to_string()))?;
        scalar::from_json(spec, json).ok_or_else(|| mismatch(spec.describe()))
    }
}
