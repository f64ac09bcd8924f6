//! # Canonical Form: Equality Semantics for `const`, `enum`, `uniqueItems`
//!
//! JSON values that are "the same" for schema purposes can differ in their
//! in-memory representation: object key order, Unicode composition of
//! strings, and `1` versus `1.0`. This module defines `CanonicalForm`, the
//! sole construction path for the string used in equality comparisons.
//!
//! ## Normalization Rules
//!
//! 1. **Strings** are Unicode NFC-normalized.
//! 2. **Numbers** with an integral value inside the exactly-representable
//!    range are stored as integers, so `1` and `1.0` compare equal.
//! 3. **Objects** are normalized recursively; key order is irrelevant
//!    because serialization sorts keys.
//! 4. **Arrays** are normalized element-wise and keep their order:
//!    `[1, 2]` and `[2, 1]` are different values.
//! 5. `null` and booleans pass through unchanged.
//!
//! After normalization, serialization uses `serde_jcs` (RFC 8785): sorted
//! keys, compact separators, deterministic output.

use serde_json::{Map, Number, Value};
use unicode_normalization::UnicodeNormalization;

/// Largest integer magnitude an `f64` represents exactly (2^53 - 1).
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// The canonical serialization of a normalized JSON value.
///
/// # Invariants
///
/// - The only constructor is `CanonicalForm::new()`.
/// - Two values have equal canonical forms exactly when they are equal
///   under the normalization rules of this module.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalForm(String);

impl CanonicalForm {
    /// Normalize `value` and serialize it in JCS-canonical form.
    pub fn new(value: &Value) -> Self {
        let normalized = normalize(value);
        let s = serde_jcs::to_string(&normalized).unwrap_or_else(|_| normalized.to_string());
        Self(s)
    }

    /// Access the canonical string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume and return the canonical string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for CanonicalForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Recursively normalize a JSON value for equality comparison.
pub fn normalize(value: &Value) -> Value {
    match value {
        Value::Null | Value::Bool(_) => value.clone(),
        Value::String(s) => Value::String(s.nfc().collect()),
        Value::Number(n) => Value::Number(normalize_number(n)),
        Value::Array(items) => Value::Array(items.iter().map(normalize).collect()),
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));
            let mut out = Map::new();
            for (key, v) in entries {
                out.insert(key.nfc().collect(), normalize(v));
            }
            Value::Object(out)
        }
    }
}

fn normalize_number(n: &Number) -> Number {
    if n.is_i64() || n.is_u64() {
        return n.clone();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER => Number::from(f as i64),
        _ => n.clone(),
    }
}

/// Structural equality under the canonical normalization rules.
pub fn canonical_eq(a: &Value, b: &Value) -> bool {
    CanonicalForm::new(a) == CanonicalForm::new(b)
}
