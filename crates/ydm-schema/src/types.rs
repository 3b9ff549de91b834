//! # Schema Types
//!
//! A [`TypeSpec`] is a resolved leaf type: one of the built-in base types
//! plus the constraints accumulated along its typedef chain. Typedef
//! resolution happens in the builder; by the time a `TypeSpec` is attached to
//! a node it is self-contained.
//!
//! Integer types always carry a `Range` constraint. A plain `uint8` gets
//! `0..255`, and a restriction narrows it. The range is therefore also the
//! width check.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use ydm_core::{BuildError, Value};

use crate::constraint::{
    Constraint, ConstraintViolation, EnumSet, Pattern, RangeSet, ViolationKind,
};
use crate::statement::TypeStmt;

/// Built-in YANG base types supported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseType {
    String,
    Boolean,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Enumeration,
    Union,
    Binary,
}

impl BaseType {
    /// Every supported base type.
    pub const ALL: [BaseType; 13] = [
        BaseType::String,
        BaseType::Boolean,
        BaseType::Int8,
        BaseType::Int16,
        BaseType::Int32,
        BaseType::Int64,
        BaseType::Uint8,
        BaseType::Uint16,
        BaseType::Uint32,
        BaseType::Uint64,
        BaseType::Enumeration,
        BaseType::Union,
        BaseType::Binary,
    ];

    /// Look up a base type by its YANG keyword.
    pub fn from_keyword(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.keyword() == s)
    }

    /// The YANG keyword.
    pub fn keyword(&self) -> &'static str {
        match self {
            BaseType::String => "string",
            BaseType::Boolean => "boolean",
            BaseType::Int8 => "int8",
            BaseType::Int16 => "int16",
            BaseType::Int32 => "int32",
            BaseType::Int64 => "int64",
            BaseType::Uint8 => "uint8",
            BaseType::Uint16 => "uint16",
            BaseType::Uint32 => "uint32",
            BaseType::Uint64 => "uint64",
            BaseType::Enumeration => "enumeration",
            BaseType::Union => "union",
            BaseType::Binary => "binary",
        }
    }

    /// Value bounds of an integer type.
    pub fn bounds(&self) -> Option<(i128, i128)> {
        let b = match self {
            BaseType::Int8 => (i128::from(i8::MIN), i128::from(i8::MAX)),
            BaseType::Int16 => (i128::from(i16::MIN), i128::from(i16::MAX)),
            BaseType::Int32 => (i128::from(i32::MIN), i128::from(i32::MAX)),
            BaseType::Int64 => (i128::from(i64::MIN), i128::from(i64::MAX)),
            BaseType::Uint8 => (0, i128::from(u8::MAX)),
            BaseType::Uint16 => (0, i128::from(u16::MAX)),
            BaseType::Uint32 => (0, i128::from(u32::MAX)),
            BaseType::Uint64 => (0, i128::from(u64::MAX)),
            _ => return None,
        };
        Some(b)
    }

    /// True for the eight integer types.
    pub fn is_integer(&self) -> bool {
        self.bounds().is_some()
    }

    /// True for int8 through int64.
    pub fn is_signed(&self) -> bool {
        matches!(
            self,
            BaseType::Int8 | BaseType::Int16 | BaseType::Int32 | BaseType::Int64
        )
    }

    /// 64-bit integers are carried as JSON strings.
    pub fn is_64_bit(&self) -> bool {
        matches!(self, BaseType::Int64 | BaseType::Uint64)
    }
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A resolved leaf type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSpec {
    base: BaseType,
    name: String,
    constraints: Vec<Constraint>,
    default: Option<String>,
}

impl TypeSpec {
    /// The unrestricted built-in type.
    pub fn builtin(base: BaseType) -> Self {
        let constraints = match base.bounds() {
            Some((lo, hi)) => vec![Constraint::Range(RangeSet::span(lo, hi))],
            None => Vec::new(),
        };
        Self {
            base,
            name: base.keyword().to_string(),
            constraints,
            default: None,
        }
    }

    /// Built-in type at the root of the typedef chain.
    pub fn base(&self) -> BaseType {
        self.base
    }

    /// Type name: the typedef name for derived types, the keyword otherwise.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Every constraint, in the order it was applied.
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Default literal inherited from a typedef.
    pub fn default_literal(&self) -> Option<&str> {
        self.default.as_deref()
    }

    /// Effective range of an integer type.
    pub fn range(&self) -> Option<&RangeSet> {
        self.constraints.iter().find_map(|c| match c {
            Constraint::Range(r) => Some(r),
            _ => None,
        })
    }

    /// Effective length of a string or binary type.
    pub fn length(&self) -> Option<&RangeSet> {
        self.constraints.iter().find_map(|c| match c {
            Constraint::Length(r) => Some(r),
            _ => None,
        })
    }

    /// Patterns; a value must satisfy all of them.
    pub fn patterns(&self) -> impl Iterator<Item = &Pattern> {
        self.constraints.iter().filter_map(|c| match c {
            Constraint::Pattern(p) => Some(p),
            _ => None,
        })
    }

    /// Symbols of an enumeration type.
    pub fn enumeration(&self) -> Option<&EnumSet> {
        self.constraints.iter().find_map(|c| match c {
            Constraint::Enumeration(e) => Some(e),
            _ => None,
        })
    }

    /// Union alternatives in declaration order; empty for other types.
    pub fn members(&self) -> &[TypeSpec] {
        self.constraints
            .iter()
            .find_map(|c| match c {
                Constraint::Union(m) => Some(m.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }

    /// Human-readable description for mismatch messages.
    pub fn describe(&self) -> String {
        if self.name == self.base.keyword() {
            self.name.clone()
        } else {
            format!("{} ({})", self.name, self.base)
        }
    }

    pub(crate) fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub(crate) fn with_default(mut self, literal: Option<String>) -> Self {
        self.default = literal;
        self
    }

    /// Convert `value` into this type's native shape, if its shape fits.
    ///
    /// Only the shape and the integer width are checked here. A string that
    /// fails a pattern still coerces; [`TypeSpec::check`] reports it.
    ///
    /// Union values keep an explicit branch tag when that alternative can
    /// hold the value. Otherwise the first alternative whose shape fits and
    /// whose constraints pass is chosen, falling back to the first whose
    /// shape fits.
    pub fn coerce(&self, value: &Value) -> Option<Value> {
        if self.base == BaseType::Union {
            return self.coerce_union(value);
        }
        let v = value.inner();
        let native = match (self.base, v) {
            (BaseType::String, Value::String(s) | Value::Enum(s)) => Value::String(s.clone()),
            (BaseType::Enumeration, Value::Enum(s) | Value::String(s)) => Value::Enum(s.clone()),
            (BaseType::Boolean, Value::Bool(b)) => Value::Bool(*b),
            (BaseType::Binary, Value::Binary(b)) => Value::Binary(b.clone()),
            (base, _) if base.is_integer() => {
                let n = v.as_i128()?;
                let (lo, hi) = base.bounds()?;
                if n < lo || n > hi {
                    return None;
                }
                if base.is_signed() {
                    Value::Int(i64::try_from(n).ok()?)
                } else {
                    Value::Uint(u64::try_from(n).ok()?)
                }
            }
            _ => return None,
        };
        Some(native)
    }

    fn coerce_union(&self, value: &Value) -> Option<Value> {
        let members = self.members();
        if let Value::Union(u) = value {
            if let Some(member) = members.get(u.branch) {
                if let Some(v) = member.coerce(&u.value) {
                    return Some(Value::union(u.branch, v));
                }
            }
        }
        let raw = match value {
            Value::Union(u) => u.value.as_ref(),
            other => other,
        };
        self.select_member(
            members
                .iter()
                .enumerate()
                .filter_map(|(i, m)| m.coerce(raw).map(|v| (i, v))),
        )
    }

    /// Choose a union alternative among `(member index, native value)`
    /// candidates: the first whose constraints pass, else the first given.
    pub fn select_member(
        &self,
        candidates: impl IntoIterator<Item = (usize, Value)>,
    ) -> Option<Value> {
        let members = self.members();
        let mut fallback = None;
        for (i, v) in candidates {
            if members.get(i).is_some_and(|m| m.check(&v).is_empty()) {
                return Some(Value::union(i, v));
            }
            if fallback.is_none() {
                fallback = Some((i, v));
            }
        }
        fallback.map(|(i, v)| Value::union(i, v))
    }

    /// Parse a literal (a default, a list key, a JSON string) into this
    /// type's native shape. No constraints are checked.
    pub fn parse_literal(&self, text: &str) -> Option<Value> {
        let value = match self.base {
            BaseType::String => Value::String(text.to_string()),
            BaseType::Enumeration => Value::Enum(text.to_string()),
            BaseType::Boolean => match text {
                "true" => Value::Bool(true),
                "false" => Value::Bool(false),
                _ => return None,
            },
            BaseType::Binary => Value::Binary(STANDARD.decode(text).ok()?),
            BaseType::Union => {
                return self.select_member(
                    self.members()
                        .iter()
                        .enumerate()
                        .filter_map(|(i, m)| m.parse_literal(text).map(|v| (i, v))),
                );
            }
            base if base.is_signed() => Value::Int(text.parse::<i64>().ok()?),
            _ => Value::Uint(text.parse::<u64>().ok()?),
        };
        self.coerce(&value)
    }

    /// Check `value` against this type: shape first, then every constraint.
    pub fn check(&self, value: &Value) -> Vec<ConstraintViolation> {
        let Some(native) = self.coerce(value) else {
            return vec![ConstraintViolation::new(
                ViolationKind::TypeMismatch,
                format!(
                    "{} value \"{value}\" is not a valid {}",
                    value.kind_name(),
                    self.describe()
                ),
            )];
        };
        self.constraints
            .iter()
            .filter_map(|c| c.check(&native).err())
            .collect()
    }

    /// Apply the restrictions written in `stmt` on top of this type.
    ///
    /// `members` are the already-compiled union alternatives of `stmt`.
    /// The derived type keeps this type's name.
    pub(crate) fn restrict(
        &self,
        stmt: &TypeStmt,
        members: Vec<TypeSpec>,
        at: &str,
    ) -> Result<TypeSpec, BuildError> {
        let invalid = |reason: String| BuildError::InvalidConstraint {
            path: at.to_string(),
            reason,
        };
        let mut derived = self.clone();

        if let Some(expr) = &stmt.range {
            let parent = self
                .range()
                .ok_or_else(|| invalid(format!("range is not allowed on type {}", self.name)))?;
            let set = RangeSet::parse(expr, parent).map_err(invalid)?;
            derived.replace(Constraint::Range(set));
        }

        if let Some(expr) = &stmt.length {
            if !matches!(self.base, BaseType::String | BaseType::Binary) {
                return Err(invalid(format!("length is not allowed on type {}", self.name)));
            }
            let full = RangeSet::span(0, i128::from(u64::MAX));
            let parent = self.length().unwrap_or(&full);
            let set = RangeSet::parse(expr, parent).map_err(invalid)?;
            derived.replace(Constraint::Length(set));
        }

        if !stmt.patterns.is_empty() {
            if self.base != BaseType::String {
                return Err(invalid(format!("pattern is not allowed on type {}", self.name)));
            }
            for p in &stmt.patterns {
                let pattern = Pattern::new(&p.pattern, p.invert_match).map_err(invalid)?;
                derived.constraints.push(Constraint::Pattern(pattern));
            }
        }

        let symbols: Vec<(String, Option<i32>)> =
            stmt.enums.iter().map(|e| (e.name.clone(), e.value)).collect();
        if self.base == BaseType::Enumeration {
            match (self.enumeration(), symbols.is_empty()) {
                (None, true) => return Err(invalid("enumeration declares no symbols".into())),
                (None, false) => {
                    let set = EnumSet::new(&symbols).map_err(invalid)?;
                    derived.constraints.push(Constraint::Enumeration(set));
                }
                (Some(parent), false) => {
                    let set = parent.restrict(&symbols).map_err(invalid)?;
                    derived.replace(Constraint::Enumeration(set));
                }
                (Some(_), true) => {}
            }
        } else if !symbols.is_empty() {
            return Err(invalid(format!("enum is not allowed on type {}", self.name)));
        }

        if self.base == BaseType::Union {
            match (self.members().is_empty(), members.is_empty()) {
                (true, true) => return Err(invalid("union declares no member types".into())),
                (true, false) => derived.constraints.push(Constraint::Union(members)),
                (false, false) => {
                    return Err(invalid("a derived union cannot redeclare its member types".into()))
                }
                (false, true) => {}
            }
        } else if !members.is_empty() {
            return Err(invalid(format!("member types are not allowed on type {}", self.name)));
        }

        Ok(derived)
    }

    fn replace(&mut self, constraint: Constraint) {
        let same = |c: &Constraint| std::mem::discriminant(c) == std::mem::discriminant(&constraint);
        match self.constraints.iter().position(same) {
            Some(idx) => self.constraints[idx] = constraint,
            None => self.constraints.push(constraint),
        }
    }
}

impl fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}
