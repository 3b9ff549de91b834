//! # ydm-core: Foundational Types for the ydm Data-Model Engine
//!
//! This crate is the leaf of the workspace DAG. It defines the primitives
//! shared by the schema compiler (`ydm-schema`) and the runtime data layer
//! (`ydm-data`):
//!
//! 1. **Paths.** `SchemaPath` identifies a schema node by its slash path,
//!    `TargetPath` is the prefix-qualified form used by deviation and
//!    augmentation statements, and `DataPath` addresses one value inside a
//!    data tree (list entries carry their key predicate).
//!
//! 2. **Typed values.** `Value` is the runtime representation of a leaf.
//!    Union values carry an explicit branch tag (`UnionValue`) chosen when
//!    the value is assigned or decoded, never re-inferred later.
//!
//! 3. **Errors.** One `thiserror` enum per failure domain: schema build,
//!    JSON decode, JSON encode, programmatic data access. Validation issues
//!    are not errors; they are reported as data by `ydm-data`.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `ydm-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod path;
pub mod value;

pub use error::{BuildError, DataError, DecodeError, EncodeError, PathError, YdmError};
pub use path::{is_identifier, DataPath, DataSegment, QualifiedName, SchemaPath, TargetPath};
pub use value::{UnionValue, Value};
