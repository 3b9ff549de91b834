//! # ydm-schema: Schema Compilation and Type Constraints
//!
//! Turns YANG-style module fragments into an immutable [`SchemaTree`], the
//! structure every data operation is checked against.
//!
//! ## Modules
//!
//! - **statement**: serde model of module fragments (typedefs, groupings,
//!   data definitions, deviations, augmentations). Loadable from YAML/JSON.
//! - **constraint**: range, length, pattern, enumeration and union
//!   predicates, plus the [`ConstraintViolation`] they report.
//! - **types**: resolved leaf types ([`TypeSpec`]): shape coercion, literal
//!   parsing, union alternative selection.
//! - **node** / **tree**: the compiled arena and its path indices.
//! - **builder**: the compile, deviate, augment and finalize phases.
//!
//! ## Crate Policy
//!
//! - Depends only on `ydm-core` internally.
//! - A built tree is never mutated. Share it behind an `Arc`.

pub mod builder;
pub mod constraint;
pub mod node;
pub mod statement;
pub mod tree;
pub mod types;

pub use builder::{build, SchemaBuilder};
pub use constraint::{
    Constraint, ConstraintViolation, EnumMember, EnumSet, Interval, Pattern, RangeSet,
    ViolationKind,
};
pub use node::{NodeId, NodeKind, SchemaNode};
pub use statement::{
    AugmentStmt, CaseStmt, ChoiceStmt, ContainerStmt, DeviateReplace, DeviationStmt, EnumStmt,
    GroupingStmt, ImportStmt, LeafListStmt, LeafStmt, ListStmt, ModuleFragment, NodeStmt,
    PatternStmt, TypeStmt, TypedefStmt, UsesStmt,
};
pub use tree::{ModuleInfo, SchemaTree};
pub use types::{BaseType, TypeSpec};
