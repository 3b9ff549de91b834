//! # Typed Leaf Values
//!
//! `Value` is the runtime payload of a leaf or leaf-list element. It is
//! deliberately schema-agnostic: integer width, enumeration membership and
//! union alternatives are properties of the schema type, not of the value.
//! The schema crate coerces a raw `Value` into a node's native shape when it
//! is assigned or decoded.
//!
//! Unions are the exception to "schema-agnostic": a value stored in a union
//! leaf is wrapped in a `UnionValue` whose `branch` records which alternative
//! it was resolved to. The tag is chosen once and travels with the value.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

/// A typed scalar held by a leaf.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Value {
    /// UTF-8 string.
    String(String),
    /// Boolean.
    Bool(bool),
    /// Signed integer (any of int8..int64).
    Int(i64),
    /// Unsigned integer (any of uint8..uint64).
    Uint(u64),
    /// Enumeration symbol.
    Enum(String),
    /// Raw bytes.
    Binary(Vec<u8>),
    /// Value resolved to one alternative of a union type.
    Union(UnionValue),
}

/// A union value tagged with the index of the alternative it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnionValue {
    /// Zero-based index into the union's member types.
    pub branch: usize,
    /// The value in the member's native shape.
    pub value: Box<Value>,
}

impl Value {
    /// Construct an enumeration symbol.
    pub fn enumeration(symbol: impl Into<String>) -> Self {
        Value::Enum(symbol.into())
    }

    /// Wrap `value` as alternative `branch` of a union.
    pub fn union(branch: usize, value: Value) -> Self {
        Value::Union(UnionValue {
            branch,
            value: Box::new(value),
        })
    }

    /// Short name of the value's shape, used in mismatch messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "signed integer",
            Value::Uint(_) => "unsigned integer",
            Value::Enum(_) => "enumeration",
            Value::Binary(_) => "binary",
            Value::Union(u) => u.value.kind_name(),
        }
    }

    /// The value with every union wrapper removed.
    pub fn inner(&self) -> &Value {
        match self {
            Value::Union(u) => u.value.inner(),
            other => other,
        }
    }

    /// Text of a string or enumeration value.
    pub fn as_str(&self) -> Option<&str> {
        match self.inner() {
            Value::String(s) | Value::Enum(s) => Some(s),
            _ => None,
        }
    }

    /// Boolean payload.
    pub fn as_bool(&self) -> Option<bool> {
        match self.inner() {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer payload widened to `i128`, so signed and unsigned values
    /// compare on one axis.
    pub fn as_i128(&self) -> Option<i128> {
        match self.inner() {
            Value::Int(n) => Some(i128::from(*n)),
            Value::Uint(n) => Some(i128::from(*n)),
            _ => None,
        }
    }

    /// Binary payload.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self.inner() {
            Value::Binary(b) => Some(b),
            _ => None,
        }
    }

    /// Branch tag, for union values.
    pub fn branch(&self) -> Option<usize> {
        match self {
            Value::Union(u) => Some(u.branch),
            _ => None,
        }
    }
}

/// Canonical text form: the form used for list key predicates and for
/// parsing defaults. Binary values render as standard base64.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) | Value::Enum(s) => f.write_str(s),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Uint(n) => write!(f, "{n}"),
            Value::Binary(b) => f.write_str(&STANDARD.encode(b)),
            Value::Union(u) => u.value.fmt(f),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Binary(b)
    }
}

macro_rules! impl_from_signed {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(n: $t) -> Self {
                Value::Int(i64::from(n))
            }
        })*
    };
}

macro_rules! impl_from_unsigned {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(n: $t) -> Self {
                Value::Uint(u64::from(n))
            }
        })*
    };
}

impl_from_signed!(i8, i16, i32, i64);
impl_from_unsigned!(u8, u16, u32, u64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_conversions() {
        assert_eq!(Value::from("eth0"), Value::String("eth0".into()));
        assert_eq!(Value::from(1500u16), Value::Uint(1500));
        assert_eq!(Value::from(-3i8), Value::Int(-3));
        assert_eq!(Value::from(true), Value::Bool(true));
    }

    #[test]
    fn test_inner_strips_union_wrappers() {
        let v = Value::union(1, Value::union(0, Value::enumeration("up")));
        assert_eq!(v.inner(), &Value::Enum("up".into()));
        assert_eq!(v.as_str(), Some("up"));
        assert_eq!(v.branch(), Some(1));
        assert_eq!(v.kind_name(), "enumeration");
    }

    #[test]
    fn test_integer_widening() {
        assert_eq!(Value::Uint(u64::MAX).as_i128(), Some(i128::from(u64::MAX)));
        assert_eq!(Value::Int(-7).as_i128(), Some(-7));
        assert_eq!(Value::from("7").as_i128(), None);
    }

    #[test]
    fn test_display_canonical_forms() {
        assert_eq!(Value::Uint(10).to_string(), "10");
        assert_eq!(Value::Bool(false).to_string(), "false");
        assert_eq!(Value::Binary(b"hi".to_vec()).to_string(), "aGk=");
        assert_eq!(Value::union(1, Value::from("x")).to_string(), "x");
    }
}
