//! # Module Fragments: Schema Statements
//!
//! A [`ModuleFragment`] is the structured, already-parsed form of one YANG
//! module: its identity, imports, typedefs, groupings, data definitions,
//! deviations and augmentations. Fragments are plain serde documents and are
//! usually loaded from YAML:
//!
//! ```yaml
//! module: network-device
//! prefix: nd
//! namespace: urn:example:network-device
//! body:
//!   - kind: container
//!     name: device
//!     children:
//!       - kind: leaf
//!         name: hostname
//!         type: { name: string }
//! ```
//!
//! They can also be assembled in code with the builder-style constructors.

use std::path::Path;

use serde::{Deserialize, Serialize};
use ydm_core::BuildError;

/// One module's worth of schema statements.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleFragment {
    /// Module name.
    #[serde(rename = "module")]
    pub name: String,
    /// XML namespace URI.
    #[serde(default)]
    pub namespace: String,
    /// Prefix used to qualify this module's identifiers.
    pub prefix: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub imports: Vec<ImportStmt>,
    #[serde(default)]
    pub typedefs: Vec<TypedefStmt>,
    #[serde(default)]
    pub groupings: Vec<GroupingStmt>,
    /// Top-level data definitions.
    #[serde(default)]
    pub body: Vec<NodeStmt>,
    #[serde(default)]
    pub deviations: Vec<DeviationStmt>,
    #[serde(default)]
    pub augments: Vec<AugmentStmt>,
}

impl ModuleFragment {
    pub fn new(name: &str, prefix: &str, namespace: &str) -> Self {
        Self {
            name: name.to_string(),
            prefix: prefix.to_string(),
            namespace: namespace.to_string(),
            ..Self::default()
        }
    }

    /// Parse a fragment from YAML.
    pub fn from_yaml_str(s: &str) -> Result<Self, BuildError> {
        serde_yaml::from_str(s).map_err(|e| BuildError::Load(e.to_string()))
    }

    /// Parse a fragment from JSON.
    pub fn from_json_str(s: &str) -> Result<Self, BuildError> {
        serde_json::from_str(s).map_err(|e| BuildError::Load(e.to_string()))
    }

    /// Load a fragment from a `.yaml`, `.yml` or `.json` file.
    pub fn from_path(path: &Path) -> Result<Self, BuildError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| BuildError::Load(format!("{}: {e}", path.display())))?;
        let is_json = path.extension().and_then(|e| e.to_str()) == Some("json");
        let parsed = if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_yaml_str(&content)
        };
        parsed.map_err(|e| match e {
            BuildError::Load(msg) => BuildError::Load(format!("{}: {msg}", path.display())),
            other => other,
        })
    }

    pub fn import(mut self, module: &str, prefix: &str) -> Self {
        self.imports.push(ImportStmt {
            module: module.to_string(),
            prefix: prefix.to_string(),
        });
        self
    }

    pub fn typedef(mut self, typedef: TypedefStmt) -> Self {
        self.typedefs.push(typedef);
        self
    }

    pub fn grouping(mut self, grouping: GroupingStmt) -> Self {
        self.groupings.push(grouping);
        self
    }

    /// Add a top-level data definition.
    pub fn node(mut self, node: impl Into<NodeStmt>) -> Self {
        self.body.push(node.into());
        self
    }

    pub fn deviation(mut self, deviation: DeviationStmt) -> Self {
        self.deviations.push(deviation);
        self
    }

    pub fn augment(mut self, augment: AugmentStmt) -> Self {
        self.augments.push(augment);
        self
    }
}

/// `import <module> { prefix <prefix>; }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportStmt {
    pub module: String,
    pub prefix: String,
}

/// A type reference with optional restrictions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeStmt {
    /// Built-in keyword or (prefixed) typedef name.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub patterns: Vec<PatternStmt>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enums: Vec<EnumStmt>,
    /// Union member types.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<TypeStmt>,
}

impl TypeStmt {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    /// An `enumeration` with the given symbols and implicit values.
    pub fn enumeration(symbols: &[&str]) -> Self {
        Self {
            name: "enumeration".to_string(),
            enums: symbols
                .iter()
                .map(|s| EnumStmt {
                    name: s.to_string(),
                    value: None,
                })
                .collect(),
            ..Self::default()
        }
    }

    /// A `union` of the given member types.
    pub fn union(members: Vec<TypeStmt>) -> Self {
        Self {
            name: "union".to_string(),
            types: members,
            ..Self::default()
        }
    }

    pub fn with_range(mut self, range: &str) -> Self {
        self.range = Some(range.to_string());
        self
    }

    pub fn with_length(mut self, length: &str) -> Self {
        self.length = Some(length.to_string());
        self
    }

    pub fn with_pattern(mut self, pattern: &str) -> Self {
        self.patterns.push(PatternStmt {
            pattern: pattern.to_string(),
            invert_match: false,
        });
        self
    }

    pub fn with_inverted_pattern(mut self, pattern: &str) -> Self {
        self.patterns.push(PatternStmt {
            pattern: pattern.to_string(),
            invert_match: true,
        });
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PatternStmt {
    pub pattern: String,
    #[serde(default)]
    pub invert_match: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumStmt {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<i32>,
}

/// `typedef <name> { type ...; default ...; }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedefStmt {
    pub name: String,
    #[serde(rename = "type")]
    pub type_: TypeStmt,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl TypedefStmt {
    pub fn new(name: &str, type_: TypeStmt) -> Self {
        Self {
            name: name.to_string(),
            type_,
            default: None,
            description: None,
        }
    }

    pub fn default_value(mut self, literal: &str) -> Self {
        self.default = Some(literal.to_string());
        self
    }
}

/// `grouping <name> { ... }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupingStmt {
    pub name: String,
    #[serde(default)]
    pub children: Vec<NodeStmt>,
}

impl GroupingStmt {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            children: Vec::new(),
        }
    }

    pub fn child(mut self, node: impl Into<NodeStmt>) -> Self {
        self.children.push(node.into());
        self
    }
}

/// A data definition statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum NodeStmt {
    Container(ContainerStmt),
    Leaf(LeafStmt),
    LeafList(LeafListStmt),
    List(ListStmt),
    Choice(ChoiceStmt),
    Uses(UsesStmt),
}

impl NodeStmt {
    /// Statement name (the grouping name for `uses`).
    pub fn name(&self) -> &str {
        match self {
            NodeStmt::Container(s) => &s.name,
            NodeStmt::Leaf(s) => &s.name,
            NodeStmt::LeafList(s) => &s.name,
            NodeStmt::List(s) => &s.name,
            NodeStmt::Choice(s) => &s.name,
            NodeStmt::Uses(s) => &s.grouping,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerStmt {
    pub name: String,
    #[serde(default)]
    pub children: Vec<NodeStmt>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ContainerStmt {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            children: Vec::new(),
            description: None,
        }
    }

    pub fn child(mut self, node: impl Into<NodeStmt>) -> Self {
        self.children.push(node.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeafStmt {
    pub name: String,
    #[serde(rename = "type")]
    pub type_: TypeStmt,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(default)]
    pub mandatory: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl LeafStmt {
    pub fn new(name: &str, type_: TypeStmt) -> Self {
        Self {
            name: name.to_string(),
            type_,
            default: None,
            mandatory: false,
            description: None,
        }
    }

    pub fn default_value(mut self, literal: &str) -> Self {
        self.default = Some(literal.to_string());
        self
    }

    pub fn mandatory(mut self) -> Self {
        self.mandatory = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeafListStmt {
    pub name: String,
    #[serde(rename = "type")]
    pub type_: TypeStmt,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl LeafListStmt {
    pub fn new(name: &str, type_: TypeStmt) -> Self {
        Self {
            name: name.to_string(),
            type_,
            description: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListStmt {
    pub name: String,
    /// Key leaf name. Only single keys are supported.
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub children: Vec<NodeStmt>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ListStmt {
    pub fn new(name: &str, key: &str) -> Self {
        Self {
            name: name.to_string(),
            key: key.to_string(),
            children: Vec::new(),
            description: None,
        }
    }

    pub fn child(mut self, node: impl Into<NodeStmt>) -> Self {
        self.children.push(node.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceStmt {
    pub name: String,
    #[serde(default)]
    pub cases: Vec<CaseStmt>,
    #[serde(default)]
    pub mandatory: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ChoiceStmt {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            cases: Vec::new(),
            mandatory: false,
            description: None,
        }
    }

    pub fn case(mut self, case: CaseStmt) -> Self {
        self.cases.push(case);
        self
    }

    pub fn mandatory(mut self) -> Self {
        self.mandatory = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseStmt {
    pub name: String,
    #[serde(default)]
    pub children: Vec<NodeStmt>,
}

impl CaseStmt {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            children: Vec::new(),
        }
    }

    pub fn child(mut self, node: impl Into<NodeStmt>) -> Self {
        self.children.push(node.into());
        self
    }
}

/// `uses <grouping>;`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsesStmt {
    pub grouping: String,
}

impl UsesStmt {
    pub fn new(grouping: &str) -> Self {
        Self {
            grouping: grouping.to_string(),
        }
    }
}

macro_rules! impl_into_node {
    ($($stmt:ident => $variant:ident),*) => {
        $(impl From<$stmt> for NodeStmt {
            fn from(s: $stmt) -> Self {
                NodeStmt::$variant(s)
            }
        })*
    };
}

impl_into_node!(
    ContainerStmt => Container,
    LeafStmt => Leaf,
    LeafListStmt => LeafList,
    ListStmt => List,
    ChoiceStmt => Choice,
    UsesStmt => Uses
);

/// `deviation <target> { deviate replace { ... } }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviationStmt {
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub replace: DeviateReplace,
}

impl DeviationStmt {
    pub fn new(target: &str) -> Self {
        Self {
            target: target.to_string(),
            description: None,
            replace: DeviateReplace::default(),
        }
    }

    pub fn replace_type(mut self, type_: TypeStmt) -> Self {
        self.replace.type_ = Some(type_);
        self
    }

    pub fn replace_default(mut self, literal: &str) -> Self {
        self.replace.default = Some(literal.to_string());
        self
    }

    pub fn replace_mandatory(mut self, mandatory: bool) -> Self {
        self.replace.mandatory = Some(mandatory);
        self
    }
}

/// Facets a `deviate replace` substitutes. Absent facets are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviateReplace {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_: Option<TypeStmt>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mandatory: Option<bool>,
}

impl DeviateReplace {
    pub fn is_empty(&self) -> bool {
        self.type_.is_none() && self.default.is_none() && self.mandatory.is_none()
    }
}

/// `augment <target> { ... }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AugmentStmt {
    pub target: String,
    #[serde(default)]
    pub children: Vec<NodeStmt>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl AugmentStmt {
    pub fn new(target: &str) -> Self {
        Self {
            target: target.to_string(),
            children: Vec::new(),
            description: None,
        }
    }

    pub fn child(mut self, node: impl Into<NodeStmt>) -> Self {
        self.children.push(node.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAGMENT: &str = r#"
module: sample
prefix: s
namespace: urn:example:sample
typedefs:
  - name: percent
    type: { name: uint8, range: "0..100" }
body:
  - kind: container
    name: top
    children:
      - kind: leaf
        name: load
        type: { name: percent }
        default: "0"
      - kind: list
        name: entry
        key: id
        children:
          - kind: leaf
            name: id
            type: { name: string, patterns: [{ pattern: "[a-z]+", invert-match: false }] }
      - kind: choice
        name: mode
        cases:
          - name: a
            children:
              - kind: leaf-list
                name: tags
                type: { name: string }
deviations:
  - target: /s:top/s:load
    replace: { default: "5" }
"#;

    #[test]
    fn test_yaml_fragment_parses() {
        let m = ModuleFragment::from_yaml_str(FRAGMENT).unwrap();
        assert_eq!(m.name, "sample");
        assert_eq!(m.prefix, "s");
        assert_eq!(m.typedefs[0].type_.range.as_deref(), Some("0..100"));
        let NodeStmt::Container(top) = &m.body[0] else {
            panic!("expected container");
        };
        assert_eq!(top.children.len(), 3);
        assert!(matches!(&top.children[1], NodeStmt::List(l) if l.key == "id"));
        assert!(matches!(&top.children[2], NodeStmt::Choice(c) if c.cases.len() == 1));
        assert_eq!(m.deviations[0].replace.default.as_deref(), Some("5"));
    }

    #[test]
    fn test_builder_matches_yaml_shape() {
        let built = ModuleFragment::new("sample", "s", "urn:example:sample").node(
            ContainerStmt::new("top")
                .child(LeafStmt::new("load", TypeStmt::named("percent")).default_value("0")),
        );
        let json = serde_json::to_string(&built).unwrap();
        let back = ModuleFragment::from_json_str(&json).unwrap();
        assert_eq!(back, built);
    }

    #[test]
    fn test_load_error_is_reported() {
        let err = ModuleFragment::from_yaml_str("module: [").unwrap_err();
        assert!(matches!(err, BuildError::Load(_)));
        let err = ModuleFragment::from_yaml_str("prefix: x").unwrap_err();
        assert!(matches!(err, BuildError::Load(_)));
    }

    #[test]
    fn test_deviate_replace_empty() {
        assert!(DeviateReplace::default().is_empty());
        assert!(!DeviationStmt::new("/a").replace_mandatory(true).replace.is_empty());
    }
}
