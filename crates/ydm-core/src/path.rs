//! # Paths: Schema, Target and Data Addressing
//!
//! Three path flavours exist because the same tree is addressed from three
//! directions:
//!
//! - `SchemaPath`: normalized, prefix-free slash path (`/device/interface/mtu`).
//!   The finalized schema tree indexes its nodes by this form, so lookups are
//!   a single hash probe instead of a string walk.
//! - `TargetPath`: the form written in deviation and augmentation statements,
//!   where every segment may carry a module prefix (`/nd:device/nd:interface`).
//! - `DataPath`: the address of one value inside a data tree. List entries
//!   carry their key predicate (`/device/vlan[id=10]/name`). Violations and
//!   decode errors are reported with this form.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PathError;

/// Returns true if `s` is a valid YANG identifier: a letter or underscore
/// followed by letters, digits, `_`, `-` or `.`.
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

/// Normalized, prefix-free path of a schema node.
///
/// The root is `/`. Every other path starts with `/` and has no trailing
/// slash. The inner string is private; construct via [`SchemaPath::parse`],
/// [`SchemaPath::root`] or [`SchemaPath::child`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SchemaPath(String);

impl SchemaPath {
    /// The path of the (synthetic) root above all top-level nodes.
    pub fn root() -> Self {
        Self("/".to_string())
    }

    /// Parse a slash path, dropping any module prefixes.
    ///
    /// `"/nd:device/interface"` and `"/device/interface"` parse to the same
    /// `SchemaPath`.
    pub fn parse(s: &str) -> Result<Self, PathError> {
        if s == "/" {
            return Ok(Self::root());
        }
        Ok(TargetPath::parse(s)?.to_schema_path())
    }

    /// Returns true for the root path.
    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// Path of the child called `name`.
    pub fn child(&self, name: &str) -> Self {
        if self.is_root() {
            Self(format!("/{name}"))
        } else {
            Self(format!("{}/{name}", self.0))
        }
    }

    /// Path of the parent node, or `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        match self.0.rfind('/') {
            Some(0) => Some(Self::root()),
            Some(idx) => Some(Self(self.0[..idx].to_string())),
            None => None,
        }
    }

    /// Last segment of the path, or `None` for the root.
    pub fn name(&self) -> Option<&str> {
        self.segments().last()
    }

    /// Iterate over the path segments from the top down.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }

    /// Number of segments (0 for the root).
    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    /// The normalized string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SchemaPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An identifier with an optional module prefix (`nd:interface`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QualifiedName {
    /// Module prefix, if one was written.
    pub prefix: Option<String>,
    /// Local identifier.
    pub name: String,
}

impl QualifiedName {
    /// Parse `prefix:name` or `name`.
    pub fn parse(s: &str) -> Result<Self, PathError> {
        let (prefix, name) = match s.split_once(':') {
            Some((p, n)) => (Some(p), n),
            None => (None, s),
        };
        if let Some(p) = prefix {
            if !is_identifier(p) {
                return Err(PathError::InvalidIdentifier(s.to_string()));
            }
        }
        if !is_identifier(name) {
            return Err(PathError::InvalidIdentifier(s.to_string()));
        }
        Ok(Self {
            prefix: prefix.map(str::to_string),
            name: name.to_string(),
        })
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.prefix {
            Some(p) => write!(f, "{p}:{}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// Absolute, possibly prefix-qualified path written in a deviation or
/// augmentation statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetPath {
    segments: Vec<QualifiedName>,
}

impl TargetPath {
    /// Parse an absolute target such as `/nd:device/nd:interface/nd:name`.
    ///
    /// # Errors
    ///
    /// - `PathError::Relative` if the path does not start with `/`.
    /// - `PathError::EmptySegment` for `//`, a trailing slash, or a bare `/`.
    /// - `PathError::InvalidIdentifier` for a malformed segment.
    pub fn parse(s: &str) -> Result<Self, PathError> {
        let rest = s
            .strip_prefix('/')
            .ok_or_else(|| PathError::Relative(s.to_string()))?;
        let mut segments = Vec::new();
        for raw in rest.split('/') {
            if raw.is_empty() {
                return Err(PathError::EmptySegment(s.to_string()));
            }
            segments.push(QualifiedName::parse(raw)?);
        }
        Ok(Self { segments })
    }

    /// The parsed segments, top down.
    pub fn segments(&self) -> &[QualifiedName] {
        &self.segments
    }

    /// Drop the prefixes.
    pub fn to_schema_path(&self) -> SchemaPath {
        self.segments
            .iter()
            .fold(SchemaPath::root(), |acc, seg| acc.child(&seg.name))
    }
}

impl fmt::Display for TargetPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for seg in &self.segments {
            write!(f, "/{seg}")?;
        }
        Ok(())
    }
}

/// One step of a [`DataPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DataSegment {
    /// Node name.
    pub name: String,
    /// Key leaf name and canonical key value, for list entries.
    pub key: Option<(String, String)>,
}

/// Address of a value inside a data tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DataPath {
    segments: Vec<DataSegment>,
}

impl DataPath {
    /// The data tree root.
    pub fn root() -> Self {
        Self::default()
    }

    /// Returns true for the root.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Path of the child node called `name`.
    pub fn child(&self, name: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(DataSegment {
            name: name.to_string(),
            key: None,
        });
        Self { segments }
    }

    /// Path of the entry of list `list` whose key leaf `key_leaf` equals `key`.
    pub fn entry(&self, list: &str, key_leaf: &str, key: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(DataSegment {
            name: list.to_string(),
            key: Some((key_leaf.to_string(), key.to_string())),
        });
        Self { segments }
    }

    /// The segments, top down.
    pub fn segments(&self) -> &[DataSegment] {
        &self.segments
    }

    /// The schema path this data path instantiates (key predicates dropped).
    pub fn to_schema_path(&self) -> SchemaPath {
        self.segments
            .iter()
            .fold(SchemaPath::root(), |acc, seg| acc.child(&seg.name))
    }
}

impl fmt::Display for DataPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for seg in &self.segments {
            write!(f, "/{}", seg.name)?;
            if let Some((leaf, value)) = &seg.key {
                write!(f, "[{leaf}={value}]")?;
            }
        }
        Ok(())
    }
}
