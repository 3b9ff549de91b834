//! # Type Constraint Engine
//!
//! Encodes and evaluates the restrictions a schema type places on a value:
//!
//! - **Range**: ordered list of disjoint closed intervals. A value is valid
//!   if it falls inside *any* interval (disjunction).
//! - **Length**: same shape as a range, applied to the character count of a
//!   string or the byte count of a binary value.
//! - **Pattern**: a regular expression that must match the *entire* value.
//!   Patterns are always anchored at both ends; `eth[0-9]+` does not accept
//!   `eth0x`.
//! - **Enumeration**: closed, case-sensitive set of symbols.
//! - **Union**: ordered alternative types. Satisfied when any alternative
//!   whose base type accepts the value's shape also accepts it under its own
//!   constraints.
//!
//! Every failed check produces a [`ConstraintViolation`] whose reason text is
//! reused verbatim by the validator, so a caller sees the same message
//! whether it checks a single value or a whole data tree.

use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};
use ydm_core::Value;

use crate::types::TypeSpec;

/// Classification of a validation finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViolationKind {
    /// Integer outside every declared interval.
    RangeViolation,
    /// String or binary length outside every declared interval.
    LengthViolation,
    /// String not (fully) matched by a pattern.
    PatternViolation,
    /// Symbol not in the enumeration.
    EnumViolation,
    /// No union alternative accepts the value.
    UnionViolation,
    /// A mandatory leaf or choice is absent.
    MissingMandatory,
    /// The value's shape cannot be represented in the node's type.
    TypeMismatch,
    /// Data exists for a node the schema does not define.
    UnknownNode,
    /// Data from more than one case of a choice is present.
    ChoiceConflict,
}

impl ViolationKind {
    /// Stable identifier of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationKind::RangeViolation => "RangeViolation",
            ViolationKind::LengthViolation => "LengthViolation",
            ViolationKind::PatternViolation => "PatternViolation",
            ViolationKind::EnumViolation => "EnumViolation",
            ViolationKind::UnionViolation => "UnionViolation",
            ViolationKind::MissingMandatory => "MissingMandatory",
            ViolationKind::TypeMismatch => "TypeMismatch",
            ViolationKind::UnknownNode => "UnknownNode",
            ViolationKind::ChoiceConflict => "ChoiceConflict",
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a failed constraint check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintViolation {
    /// What kind of constraint failed.
    pub kind: ViolationKind,
    /// Human-readable reason.
    pub reason: String,
}

impl ConstraintViolation {
    pub(crate) fn new(kind: ViolationKind, reason: impl Into<String>) -> Self {
        Self {
            kind,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason)
    }
}

/// A closed interval `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Interval {
    /// Inclusive lower bound.
    pub min: i128,
    /// Inclusive upper bound.
    pub max: i128,
}

impl Interval {
    /// Returns true if `v` lies inside the interval.
    pub fn contains(&self, v: i128) -> bool {
        self.min <= v && v <= self.max
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.min == self.max {
            write!(f, "{}", self.min)
        } else {
            write!(f, "{}..{}", self.min, self.max)
        }
    }
}

/// Ordered, disjoint set of closed intervals.
///
/// # Invariants
///
/// - At least one interval.
/// - Every interval has `min <= max`.
/// - Intervals are sorted ascending and never overlap.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RangeSet {
    intervals: Vec<Interval>,
}

impl RangeSet {
    /// Build a range set, enforcing the invariants.
    pub fn new(intervals: Vec<Interval>) -> Result<Self, String> {
        if intervals.is_empty() {
            return Err("range is empty".to_string());
        }
        for iv in &intervals {
            if iv.min > iv.max {
                return Err(format!(
                    "lower bound {} exceeds upper bound {}",
                    iv.min, iv.max
                ));
            }
        }
        for pair in intervals.windows(2) {
            if pair[1].min <= pair[0].max {
                return Err(format!(
                    "intervals {} and {} overlap or are out of order",
                    pair[0], pair[1]
                ));
            }
        }
        Ok(Self { intervals })
    }

    /// A single interval. Callers guarantee `min <= max`.
    pub(crate) fn span(min: i128, max: i128) -> Self {
        Self {
            intervals: vec![Interval { min, max }],
        }
    }

    /// Parse a YANG range or length expression such as `1..5 | 10..15`.
    ///
    /// `min` and `max` resolve against `base`, and the result must lie
    /// inside `base`: a derived type can only narrow its parent.
    pub fn parse(expr: &str, base: &RangeSet) -> Result<Self, String> {
        let mut intervals = Vec::new();
        for part in expr.split('|') {
            let part = part.trim();
            if part.is_empty() {
                return Err(format!("empty part in range expression '{expr}'"));
            }
            let (lo, hi) = match part.split_once("..") {
                Some((lo, hi)) => (lo.trim(), hi.trim()),
                None => (part, part),
            };
            intervals.push(Interval {
                min: parse_bound(lo, base)?,
                max: parse_bound(hi, base)?,
            });
        }
        let set = Self::new(intervals)?;
        if !set.is_within(base) {
            return Err(format!("range {set} is not within the base range {base}"));
        }
        Ok(set)
    }

    /// Returns true if `v` falls inside any interval.
    pub fn contains(&self, v: i128) -> bool {
        self.intervals.iter().any(|iv| iv.contains(v))
    }

    /// Returns true if every interval of `self` is covered by one interval
    /// of `outer`.
    pub fn is_within(&self, outer: &RangeSet) -> bool {
        self.intervals.iter().all(|iv| {
            outer
                .intervals
                .iter()
                .any(|o| o.min <= iv.min && iv.max <= o.max)
        })
    }

    /// The intervals, ascending.
    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    /// Smallest admitted value.
    pub fn min(&self) -> i128 {
        self.intervals.first().map_or(0, |iv| iv.min)
    }

    /// Largest admitted value.
    pub fn max(&self) -> i128 {
        self.intervals.last().map_or(0, |iv| iv.max)
    }
}

fn parse_bound(token: &str, base: &RangeSet) -> Result<i128, String> {
    match token {
        "min" => Ok(base.min()),
        "max" => Ok(base.max()),
        _ => token
            .parse::<i128>()
            .map_err(|_| format!("'{token}' is not an integer bound")),
    }
}

impl fmt::Display for RangeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, iv) in self.intervals.iter().enumerate() {
            if i > 0 {
                f.write_str(" | ")?;
            }
            write!(f, "{iv}")?;
        }
        Ok(())
    }
}

/// Anchored regular expression.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    anchored: String,
    regex: Regex,
    invert: bool,
}

impl Pattern {
    /// Compile `source`, anchoring it at both ends. With `invert` the
    /// pattern accepts exactly the values it does not match.
    pub fn new(source: &str, invert: bool) -> Result<Self, String> {
        if source.is_empty() {
            return Err("pattern is empty".to_string());
        }
        let anchored = format!("^({source})$");
        let regex = Regex::new(&anchored)
            .map_err(|e| format!("pattern \"{source}\" does not compile: {e}"))?;
        Ok(Self {
            source: source.to_string(),
            anchored,
            regex,
            invert,
        })
    }

    /// The pattern as written.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The anchored form actually evaluated.
    pub fn anchored(&self) -> &str {
        &self.anchored
    }

    /// Whether this is an `invert-match` pattern.
    pub fn is_inverted(&self) -> bool {
        self.invert
    }

    /// Returns true if `s` satisfies the pattern.
    pub fn accepts(&self, s: &str) -> bool {
        self.regex.is_match(s) != self.invert
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source && self.invert == other.invert
    }
}

impl Eq for Pattern {}

/// One symbol of an enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumMember {
    /// Symbol name.
    pub name: String,
    /// Assigned integer value.
    pub value: i32,
}

/// Closed set of enumeration symbols.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumSet {
    members: Vec<EnumMember>,
}

impl EnumSet {
    /// Build an enumeration from `(name, explicit value)` pairs.
    ///
    /// Implicit values are one greater than the highest value assigned so
    /// far, starting at zero.
    pub fn new(symbols: &[(String, Option<i32>)]) -> Result<Self, String> {
        if symbols.is_empty() {
            return Err("enumeration declares no symbols".to_string());
        }
        let mut members: Vec<EnumMember> = Vec::with_capacity(symbols.len());
        let mut highest: Option<i32> = None;
        for (name, explicit) in symbols {
            if name.is_empty() || name.trim() != name {
                return Err(format!("invalid enumeration symbol \"{name}\""));
            }
            if members.iter().any(|m| &m.name == name) {
                return Err(format!("duplicate enumeration symbol \"{name}\""));
            }
            let value = match (explicit, highest) {
                (Some(v), _) => *v,
                (None, None) => 0,
                (None, Some(h)) => h
                    .checked_add(1)
                    .ok_or_else(|| format!("no value left for enumeration symbol \"{name}\""))?,
            };
            if members.iter().any(|m| m.value == value) {
                return Err(format!(
                    "enumeration value {value} of \"{name}\" is already assigned"
                ));
            }
            highest = Some(highest.map_or(value, |h| h.max(value)));
            members.push(EnumMember {
                name: name.clone(),
                value,
            });
        }
        Ok(Self { members })
    }

    /// Restrict this enumeration to a subset of its symbols.
    pub fn restrict(&self, symbols: &[(String, Option<i32>)]) -> Result<Self, String> {
        let mut members = Vec::with_capacity(symbols.len());
        for (name, explicit) in symbols {
            let parent = self
                .members
                .iter()
                .find(|m| &m.name == name)
                .ok_or_else(|| format!("\"{name}\" is not a symbol of the base enumeration"))?;
            if let Some(v) = explicit {
                if *v != parent.value {
                    return Err(format!(
                        "\"{name}\" must keep its base value {}",
                        parent.value
                    ));
                }
            }
            if members.iter().any(|m: &EnumMember| &m.name == name) {
                return Err(format!("duplicate enumeration symbol \"{name}\""));
            }
            members.push(parent.clone());
        }
        Ok(Self { members })
    }

    /// Returns true if `symbol` is a member (case-sensitive).
    pub fn contains(&self, symbol: &str) -> bool {
        self.members.iter().any(|m| m.name == symbol)
    }

    /// Integer value of `symbol`.
    pub fn value_of(&self, symbol: &str) -> Option<i32> {
        self.members
            .iter()
            .find(|m| m.name == symbol)
            .map(|m| m.value)
    }

    /// The members in declaration order.
    pub fn members(&self) -> &[EnumMember] {
        &self.members
    }

    /// Symbol names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(|m| m.name.as_str())
    }
}

/// A predicate attached to a schema type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// Integer value range.
    Range(RangeSet),
    /// String character count or binary byte count.
    Length(RangeSet),
    /// Anchored regular expression over the string value.
    Pattern(Pattern),
    /// Closed symbol set.
    Enumeration(EnumSet),
    /// Ordered alternatives.
    Union(Vec<TypeSpec>),
}

impl Constraint {
    /// Check `value` against this constraint.
    ///
    /// `value` is expected to be in the native shape of the owning type
    /// (see [`TypeSpec::coerce`]); a shape the constraint cannot interpret
    /// is reported as `TypeMismatch`.
    pub fn check(&self, value: &Value) -> Result<(), ConstraintViolation> {
        match self {
            Constraint::Range(set) => {
                let n = value.as_i128().ok_or_else(|| not_applicable(value, "range"))?;
                if set.contains(n) {
                    Ok(())
                } else {
                    Err(ConstraintViolation::new(
                        ViolationKind::RangeViolation,
                        format!("value {n} is outside specified ranges {set}"),
                    ))
                }
            }
            Constraint::Length(set) => {
                let len = match value.inner() {
                    Value::String(s) => s.chars().count(),
                    Value::Binary(b) => b.len(),
                    other => return Err(not_applicable(other, "length")),
                };
                if set.contains(len as i128) {
                    Ok(())
                } else {
                    Err(ConstraintViolation::new(
                        ViolationKind::LengthViolation,
                        format!("length {len} of value \"{value}\" is outside specified lengths {set}"),
                    ))
                }
            }
            Constraint::Pattern(p) => {
                let s = value.as_str().ok_or_else(|| not_applicable(value, "pattern"))?;
                if p.accepts(s) {
                    Ok(())
                } else if p.is_inverted() {
                    Err(ConstraintViolation::new(
                        ViolationKind::PatternViolation,
                        format!(
                            "\"{s}\" matches inverted regular expression pattern \"{}\"",
                            p.anchored()
                        ),
                    ))
                } else {
                    Err(ConstraintViolation::new(
                        ViolationKind::PatternViolation,
                        format!(
                            "\"{s}\" does not match regular expression pattern \"{}\"",
                            p.anchored()
                        ),
                    ))
                }
            }
            Constraint::Enumeration(set) => {
                let s = value
                    .as_str()
                    .ok_or_else(|| not_applicable(value, "enumeration"))?;
                if set.contains(s) {
                    Ok(())
                } else {
                    let expected: Vec<&str> = set.names().collect();
                    Err(ConstraintViolation::new(
                        ViolationKind::EnumViolation,
                        format!(
                            "value \"{s}\" is not a valid enumeration symbol; expected one of: {}",
                            expected.join(", ")
                        ),
                    ))
                }
            }
            Constraint::Union(members) => check_union(members, value),
        }
    }
}

fn not_applicable(value: &Value, what: &str) -> ConstraintViolation {
    ConstraintViolation::new(
        ViolationKind::TypeMismatch,
        format!(
            "{what} constraint cannot apply to {} value \"{value}\"",
            value.kind_name()
        ),
    )
}

/// Try the alternatives in order (the tagged branch first, if any).
fn check_union(members: &[TypeSpec], value: &Value) -> Result<(), ConstraintViolation> {
    let (raw, tagged) = match value {
        Value::Union(u) => (u.value.as_ref(), Some(u.branch)),
        other => (other, None),
    };
    let order = tagged
        .filter(|b| *b < members.len())
        .into_iter()
        .chain((0..members.len()).filter(|i| Some(*i) != tagged));

    let mut attempts = Vec::with_capacity(members.len());
    for i in order {
        let member = &members[i];
        match member.coerce(raw) {
            None => attempts.push(format!(
                "{} (cannot hold a {} value)",
                member.describe(),
                raw.kind_name()
            )),
            Some(candidate) => {
                let failures = member.check(&candidate);
                if failures.is_empty() {
                    return Ok(());
                }
                let reasons: Vec<String> = failures.into_iter().map(|v| v.reason).collect();
                attempts.push(format!("{} ({})", member.describe(), reasons.join("; ")));
            }
        }
    }
    Err(ConstraintViolation::new(
        ViolationKind::UnionViolation,
        format!(
            "value \"{raw}\" does not satisfy any union alternative: {}",
            attempts.join("; ")
        ),
    ))
}
