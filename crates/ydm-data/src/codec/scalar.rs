//! Leaf value <-> JSON scalar mapping.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::Value as Json;
use ydm_core::Value;
use ydm_schema::{BaseType, TypeSpec};

/// Encode `value` under `spec`. `None` if the value cannot be represented.
pub(crate) fn to_json(spec: &TypeSpec, value: &Value) -> Option<Json> {
    let native = spec.coerce(value)?;
    let json = match spec.base() {
        BaseType::Union => {
            let Value::Union(u) = &native else {
                return None;
            };
            return to_json(spec.members().get(u.branch)?, &u.value);
        }
        BaseType::String | BaseType::Enumeration => Json::String(native.as_str()?.to_string()),
        BaseType::Boolean => Json::Bool(native.as_bool()?),
        BaseType::Binary => Json::String(STANDARD.encode(native.as_bytes()?)),
        base if base.is_64_bit() => Json::String(native.to_string()),
        _ => match native {
            Value::Int(n) => Json::from(n),
            Value::Uint(n) => Json::from(n),
            _ => return None,
        },
    };
    Some(json)
}

/// Decode `json` under `spec`. `None` on a shape or width mismatch.
pub(crate) fn from_json(spec: &TypeSpec, json: &Json) -> Option<Value> {
    let raw = match spec.base() {
        BaseType::Union => {
            return spec.select_member(
                spec.members()
                    .iter()
                    .enumerate()
                    .filter_map(|(i, m)| from_json(m, json).map(|v| (i, v))),
            );
        }
        BaseType::String => Value::String(json.as_str()?.to_string()),
        BaseType::Enumeration => Value::Enum(json.as_str()?.to_string()),
        BaseType::Boolean => Value::Bool(json.as_bool()?),
        BaseType::Binary => Value::Binary(STANDARD.decode(json.as_str()?).ok()?),
        base => match json {
            Json::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else {
                    Value::Uint(n.as_u64()?)
                }
            }
            Json::String(s) if base.is_64_bit() => return spec.parse_literal(s),
            _ => return None,
        },
    };
    spec.coerce(&raw)
}

/// Coerce `value` for assignment to a leaf of type `spec`.
///
/// An untagged union value takes the alternative that decoding its JSON
/// encoding would pick, so editor-built and decoded trees agree. An explicit
/// branch tag is kept when that alternative can hold the value.
pub(crate) fn assign(spec: &TypeSpec, value: &Value) -> Option<Value> {
    let native = spec.coerce(value)?;
    if spec.base() != BaseType::Union || matches!(value, Value::Union(_)) {
        return Some(native);
    }
    to_json(spec, &native)
        .and_then(|json| from_json(spec, &json))
        .or(Some(native))
}

/// Short description of a JSON value for mismatch messages.
pub(crate) fn describe(json: &Json) -> String {
    match json {
        Json::Null => "null".to_string(),
        Json::Bool(b) => format!("boolean {b}"),
        Json::Number(n) if n.is_f64() => format!("non-integer number {n}"),
        Json::Number(n) => format!("number {n}"),
        Json::String(s) => format!("string \"{s}\""),
        Json::Array(_) => "array".to_string(),
        Json::Object(_) => "object".to_string(),
    }
}
