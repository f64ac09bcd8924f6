//! # Error Types: Schema Authoring and Path Errors
//!
//! Defines the errors raised by the jsonv engine. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! Validation failures are *data* problems and are never represented here:
//! they travel as structured error details inside a validation result.
//! The types in this module describe problems with the schema tree itself
//! or with caller misuse. They are raised at the first offending keyword
//! or reference and are never accumulated.

use thiserror::Error;

/// A problem with a schema definition or its use.
///
/// Raised synchronously because it cannot be attributed to the data being
/// validated: the schema tree is malformed, references something that does
/// not exist, or declares a feature the engine does not support.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    /// A `type` keyword names something other than the seven JSON types.
    #[error("unknown type: {0}")]
    UnknownType(String),

    /// A value that is not a schema appears where a schema is required.
    #[error("invalid schema at '{location}': {reason}")]
    InvalidSchema {
        /// Keyword location of the offending value.
        location: String,
        /// What was wrong with it.
        reason: String,
    },

    /// A `pattern` or `patternProperties` key is not a valid regular expression.
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The pattern source as written in the schema.
        pattern: String,
        /// Compiler diagnostic.
        reason: String,
    },

    /// `multipleOf` must be a finite number greater than zero, and the
    /// checked value must be finite.
    #[error("multipleOf must be a positive finite number (multipleOf: {multiple_of}, value: {value})")]
    InvalidMultipleOf {
        /// Divisor declared by the schema.
        multiple_of: f64,
        /// Value being checked.
        value: f64,
    },

    /// A `$ref` pointer does not resolve to any node in the schema tree.
    #[error("no schema found for $ref '{0}'")]
    UnresolvedRef(String),

    /// The schema declares a feature the engine does not implement.
    #[error("{feature} not implemented")]
    Unsupported {
        /// Keyword naming the feature, e.g. `$defs`.
        feature: String,
    },

    /// `$ref` delegation nested deeper than the engine allows.
    #[error("$ref resolution exceeded the maximum depth of {0}")]
    RecursionLimit(usize),

    /// `strict`/`partial` or a property operation was applied to a node
    /// that is not an object schema.
    #[error("operation '{0}' requires an object schema")]
    NotAnObject(&'static str),
}

/// Error parsing a JSON pointer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PointerError {
    /// Non-empty pointers must start with `/` (optionally after a `#`).
    #[error("JSON pointer must be empty or start with '/': {0}")]
    MissingLeadingSlash(String),

    /// `~` must be followed by `0` or `1`.
    #[error("invalid escape sequence in JSON pointer: {0}")]
    InvalidEscape(String),
}
