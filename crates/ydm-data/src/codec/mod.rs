//! # JSON Codec
//!
//! Bidirectional mapping between a [`DataTree`](crate::DataTree) and the
//! JSON encoding of RFC 7951:
//!
//! | YANG type                | JSON                                   |
//! |--------------------------|----------------------------------------|
//! | string                   | string                                 |
//! | boolean                  | `true` / `false`                       |
//! | int8..int32, uint8..32   | number                                 |
//! | int64, uint64            | decimal string (numbers accepted in)   |
//! | enumeration              | the symbol as a string                 |
//! | binary                   | base64 string                          |
//! | union                    | the selected member's encoding         |
//! | container / list entry   | object                                 |
//! | list / leaf-list         | array                                  |
//!
//! Absent leaves are omitted, never written as `null`. Object members come
//! out in name order, so output is deterministic.
//!
//! With [`EncodeOptions::append_module_name`] member names are qualified as
//! `module:name` at the top level and wherever the owning module changes,
//! which is how augmented nodes are told apart. The decoder accepts
//! qualified and plain names alike.

mod decode;
mod encode;
mod options;
mod scalar;

pub use decode::{decode, decode_subtree, decode_value};
pub use encode::{encode, encode_container, to_value};
pub use options::{DecodeOptions, EncodeOptions};
pub(crate) use scalar::assign;
