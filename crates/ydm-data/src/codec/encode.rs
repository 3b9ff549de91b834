use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value as Json};
use ydm_core::{DataPath, EncodeError, SchemaPath, Value};
use ydm_schema::{NodeKind, SchemaNode, SchemaTree};

use super::options::EncodeOptions;
use super::scalar;
use crate::tree::{DataContainer, DataNode, DataTree};

/// Encode a whole data tree as JSON text.
pub fn encode(
    tree: &DataTree,
    schema: &SchemaTree,
    opts: &EncodeOptions,
) -> Result<String, EncodeError> {
    render(&to_value(tree, schema, opts)?, opts)
}

/// Encode a whole data tree as a `serde_json::Value`.
pub fn to_value(
    tree: &DataTree,
    schema: &SchemaTree,
    opts: &EncodeOptions,
) -> Result<Json, EncodeError> {
    let encoder = Encoder { schema, opts };
    let members = encoder.container(None, tree.root(), None, &DataPath::root())?;
    Ok(Json::Object(members))
}

/// Encode one container or list entry as a standalone JSON object. Its
/// members are qualified as top-level members would be.
pub fn encode_container(
    container: &DataContainer,
    schema: &SchemaTree,
    opts: &EncodeOptions,
) -> Result<String, EncodeError> {
    let path = container.schema_path();
    let node = if path.is_root() {
        None
    } else {
        Some(
            schema
                .find_data(path)
                .filter(|n| matches!(n.kind(), NodeKind::Container | NodeKind::List))
                .ok_or_else(|| EncodeError::UnknownNode {
                    path: path.to_string(),
                })?,
        )
    };
    let encoder = Encoder { schema, opts };
    let members = encoder.container(node, container, None, &data_path_of(path))?;
    render(&Json::Object(members), opts)
}

fn data_path_of(path: &SchemaPath) -> DataPath {
    path.segments().fold(DataPath::root(), |p, s| p.child(s))
}

fn render(json: &Json, opts: &EncodeOptions) -> Result<String, EncodeError> {
    match &opts.indent {
        None => Ok(serde_json::to_string(json)?),
        Some(indent) => {
            let mut buf = Vec::new();
            let formatter = PrettyFormatter::with_indent(indent.as_bytes());
            let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
            json.serialize(&mut ser)?;
            Ok(String::from_utf8_lossy(&buf).into_owned())
        }
    }
}

struct Encoder<'a> {
    schema: &'a SchemaTree,
    opts: &'a EncodeOptions,
}

impl Encoder<'_> {
    fn container(
        &self,
        node: Option<&SchemaNode>,
        data: &DataContainer,
        parent_module: Option<&str>,
        path: &DataPath,
    ) -> Result<Map<String, Json>, EncodeError> {
        if let Some((name, _)) = data
            .children()
            .find(|(name, _)| self.schema.data_child(node, name).is_none())
        {
            return Err(EncodeError::UnknownNode {
                path: path.child(name).to_string(),
            });
        }

        let mut out = Map::new();
        for child in self.schema.data_children(node) {
            let Some(value) = data.child(child.name()) else {
                continue;
            };
            let child_path = path.child(child.name());
            let json = match (child.kind(), value) {
                (NodeKind::Leaf, DataNode::Leaf(v)) => self.scalar(child, v, &child_path)?,
                (NodeKind::LeafList, DataNode::LeafList(values)) => Json::Array(
                    values
                        .iter()
                        .map(|v| self.scalar(child, v, &child_path))
                        .collect::<Result<_, _>>()?,
                ),
                (NodeKind::Container, DataNode::Container(c)) => {
                    Json::Object(self.container(Some(child), c, Some(child.module()), &child_path)?)
                }
                (NodeKind::List, DataNode::List(list)) => {
                    let mut entries = Vec::with_capacity(list.len());
                    for entry in list.entries() {
                        let key = list.key_of(entry).unwrap_or_default();
                        let entry_path = path.entry(child.name(), list.key(), &key);
                        entries.push(Json::Object(self.container(
                            Some(child),
                            entry,
                            Some(child.module()),
                            &entry_path,
                        )?));
                    }
                    Json::Array(entries)
                }
                (kind, other) => {
                    return Err(EncodeError::TypeMismatch {
                        path: child_path.to_string(),
                        expected: kind.as_str().to_string(),
                        found: other.kind_name().to_string(),
                    })
                }
            };
            out.insert(self.member_name(child, parent_module), json);
        }
        Ok(out)
    }

    fn member_name(&self, node: &SchemaNode, parent_module: Option<&str>) -> String {
        if self.opts.append_module_name && parent_module != Some(node.module()) {
            format!("{}:{}", node.module(), node.name())
        } else {
            node.name().to_string()
        }
    }

    fn scalar(&self, node: &SchemaNode, value: &Value, path: &DataPath) -> Result<Json, EncodeError> {
        let mismatch = |expected: String| EncodeError::TypeMismatch {
            path: path.to_string(),
            expected,
            found: format!("{} \"{value}\"", value.kind_name()),
        };
        let spec = node
            .type_spec()
            .ok_or_else(|| mismatch(node.kind().as_str().to_string()))?;
        scalar::to_json(spec, value).ok_or_else(|| mismatch(spec.describe()))
    }
}
