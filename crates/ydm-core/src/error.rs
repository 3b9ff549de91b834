//! # Error Types: Structured Error Hierarchy
//!
//! Defines the error types used throughout the workspace. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Schema build errors are fatal: building stops and no tree is produced.
//!   They name the module or statement that caused them.
//! - Decode errors are fatal to one decode call and carry the data path of
//!   the offending JSON member.
//! - Data errors come from the programmatic editing surface and carry the
//!   data path of the node being touched.
//! - Validation findings are NOT errors. They are collected as
//!   `ydm_data::Violation` values so callers see every problem in one pass.

use thiserror::Error;

/// Top-level error type for the workspace.
#[derive(Error, Debug)]
pub enum YdmError {
    /// Schema tree construction failed.
    #[error("schema build error: {0}")]
    Build(#[from] BuildError),

    /// JSON decoding failed.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// JSON encoding failed.
    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),

    /// Programmatic data access failed.
    #[error("data error: {0}")]
    Data(#[from] DataError),

    /// A path could not be parsed.
    #[error("path error: {0}")]
    Path(#[from] PathError),
}

/// Malformed path text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// The path does not start with `/`.
    #[error("path '{0}' must be absolute")]
    Relative(String),

    /// The path contains an empty segment.
    #[error("path '{0}' contains an empty segment")]
    EmptySegment(String),

    /// A segment is not a valid (optionally prefixed) identifier.
    #[error("'{0}' is not a valid identifier")]
    InvalidIdentifier(String),
}

/// Schema tree construction failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// A deviation or augmentation path does not resolve in the tree as it
    /// stands when the statement is applied.
    #[error("{origin} targets unknown node '{target}'")]
    UnknownTarget {
        /// Statement description, e.g. `deviation in module 'x'`.
        origin: String,
        /// The target path as written.
        target: String,
    },

    /// An augmentation child collides with an existing child of the target.
    #[error("augmentation from module '{module}' cannot add '{child}': {target} already has a child with that name")]
    DuplicateChild {
        /// Augmenting module.
        module: String,
        /// Target node path.
        target: String,
        /// Colliding child name.
        child: String,
    },

    /// A range, length, pattern, enumeration or union definition is empty
    /// or malformed.
    #[error("invalid constraint at {path}: {reason}")]
    InvalidConstraint {
        /// Schema path (or typedef name) the constraint belongs to.
        path: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A type name is neither built-in nor a resolvable typedef.
    #[error("unknown type '{name}' referenced at {path}")]
    UnknownType {
        /// Where the type was referenced.
        path: String,
        /// The type name as written.
        name: String,
    },

    /// A prefix is neither the module's own prefix nor an import prefix.
    #[error("unknown prefix '{prefix}' used in module '{module}'")]
    UnknownPrefix {
        /// Module containing the reference.
        module: String,
        /// The unresolved prefix.
        prefix: String,
    },

    /// A `uses` statement names a grouping that does not exist.
    #[error("unknown grouping '{name}' used at {path}")]
    UnknownGrouping {
        /// Where the grouping was used.
        path: String,
        /// The grouping name as written.
        name: String,
    },

    /// Two statements of the base model define the same data node name.
    #[error("duplicate node '{name}' under {parent}")]
    DuplicateNode {
        /// Parent schema path.
        parent: String,
        /// Colliding name.
        name: String,
    },

    /// A list key is missing, unknown, composite, or not a leaf.
    #[error("invalid key for list {path}: {reason}")]
    InvalidKey {
        /// List schema path.
        path: String,
        /// What is wrong with the key.
        reason: String,
    },

    /// A deviation or augmentation resolves to a node of the wrong kind.
    #[error("{origin} cannot target '{target}': {reason}")]
    InvalidTarget {
        /// Statement description.
        origin: String,
        /// The target path as written.
        target: String,
        /// Why the node is unsuitable.
        reason: String,
    },

    /// A default value does not parse or does not satisfy its type.
    #[error("invalid default for {path}: {reason}")]
    InvalidDefault {
        /// Schema path of the leaf (or typedef name).
        path: String,
        /// Why the default is rejected.
        reason: String,
    },

    /// A deviation that replaces no facet.
    #[error("{origin} for '{target}' replaces nothing")]
    InvalidDeviation {
        /// Statement description.
        origin: String,
        /// The target path as written.
        target: String,
    },

    /// A typedef or grouping refers back to itself.
    #[error("definition cycle through '{name}' at {path}")]
    DefinitionCycle {
        /// Where the cycle was detected.
        path: String,
        /// Typedef or grouping name.
        name: String,
    },

    /// Two fragments declare the same module name.
    #[error("module '{0}' is defined more than once")]
    DuplicateModule(String),

    /// A path in a statement is malformed.
    #[error("invalid path: {0}")]
    Path(#[from] PathError),

    /// A fragment document could not be parsed.
    #[error("cannot load module fragment: {0}")]
    Load(String),
}

/// JSON decode failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The input is not syntactically valid JSON.
    #[error("malformed JSON: {0}")]
    Malformed(String),

    /// An object member has no matching schema node.
    #[error("unknown field {path}")]
    UnknownField {
        /// Data path of the unknown member.
        path: String,
    },

    /// A JSON value does not fit the node's declared type.
    #[error("type mismatch at {path}: expected {expected}, found {found}")]
    TypeMismatch {
        /// Data path of the offending member.
        path: String,
        /// Expected type description.
        expected: String,
        /// JSON shape actually found.
        found: String,
    },

    /// Two entries of one list share a key value.
    #[error("duplicate key '{key}' in list {path}")]
    DuplicateKey {
        /// Data path of the list.
        path: String,
        /// Canonical key value.
        key: String,
    },

    /// A list entry lacks its key leaf.
    #[error("list entry at {path} is missing its key leaf '{key}'")]
    MissingKey {
        /// Data path of the list.
        path: String,
        /// Key leaf name.
        key: String,
    },

    /// The requested subtree path has no schema node.
    #[error("no schema node at {0}")]
    UnknownPath(String),
}

/// JSON encode failure.
#[derive(Error, Debug)]
pub enum EncodeError {
    /// The data tree holds a node the schema does not know.
    #[error("no schema node for data at {path}")]
    UnknownNode {
        /// Data path of the orphan node.
        path: String,
    },

    /// A stored value cannot be represented in the node's type.
    #[error("cannot encode {path}: expected {expected}, found {found}")]
    TypeMismatch {
        /// Data path of the value.
        path: String,
        /// Expected type description.
        expected: String,
        /// Shape of the stored value.
        found: String,
    },

    /// Serialization of the JSON document failed.
    #[error("serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Programmatic data access failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataError {
    /// No schema node with this name exists at this point of the tree.
    #[error("no schema node at {path}")]
    UnknownNode {
        /// Data path that failed to resolve.
        path: String,
    },

    /// The schema node exists but is of another kind.
    #[error("{path} is a {found}, not a {expected}")]
    KindMismatch {
        /// Data path of the node.
        path: String,
        /// Kind the operation requires.
        expected: String,
        /// Kind the schema declares.
        found: String,
    },

    /// The value cannot be represented in the leaf's type.
    #[error("type mismatch at {path}: expected {expected}, found {found}")]
    TypeMismatch {
        /// Data path of the leaf.
        path: String,
        /// Expected type description.
        expected: String,
        /// Shape (and text) of the rejected value.
        found: String,
    },

    /// Attempt to change the key leaf of an existing list entry.
    #[error("key leaf '{key}' of {path} cannot be changed")]
    KeyChange {
        /// Data path of the list entry.
        path: String,
        /// Key leaf name.
        key: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_error_display_names_target() {
        let err = BuildError::UnknownTarget {
            origin: "deviation in module 'network-device-deviations'".into(),
            target: "/nd:device/nd:port".into(),
        };
        let display = err.to_string();
        assert!(display.contains("deviation"));
        assert!(display.contains("/nd:device/nd:port"));
    }

    #[test]
    fn test_decode_error_carries_path() {
        let err = DecodeError::TypeMismatch {
            path: "/device/interface/mtu".into(),
            expected: "uint16".into(),
            found: "string".into(),
        };
        assert_eq!(
            err.to_string(),
            "type mismatch at /device/interface/mtu: expected uint16, found string"
        );
    }

    #[test]
    fn test_umbrella_conversion() {
        let err: YdmError = PathError::Relative("x".into()).into();
        assert!(matches!(err, YdmError::Path(_)));
        let err: YdmError = BuildError::DuplicateModule("m".into()).into();
        assert!(err.to_string().contains("schema build error"));
    }
}
