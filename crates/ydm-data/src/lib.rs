//! # ydm-data: Instance Data, JSON Codec, Validation
//!
//! Everything that operates on instance data bound to a compiled
//! [`SchemaTree`](ydm_schema::SchemaTree):
//!
//! - **tree**: [`DataTree`], [`DataContainer`], [`DataList`], [`DataNode`].
//! - **edit**: [`NodeMut`], the schema-checked editing cursor.
//! - **codec**: RFC 7951-style JSON [`encode`] / [`decode`].
//! - **validate**: the aggregating [`Validator`].
//! - **shared**: [`SharedTree`], single-writer / multi-reader access.
//!
//! No operation keeps global state; every call receives the schema it works
//! against.

pub mod codec;
pub mod edit;
pub mod shared;
pub mod tree;
pub mod validate;

pub use codec::{
    decode, decode_subtree, decode_value, encode, encode_container, to_value, DecodeOptions,
    EncodeOptions,
};
pub use edit::NodeMut;
pub use shared::SharedTree;
pub use tree::{DataContainer, DataList, DataNode, DataTree};
pub use validate::{validate, Validator, Violation, Violations};
