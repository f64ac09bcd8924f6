//! # Validation
//!
//! Validation walks a schema tree against a value and collects structured
//! [`ErrorDetail`]s. Data problems are always returned inside a
//! [`ValidationResult`]; only problems with the schema itself (an
//! unresolvable `$ref`, a non-positive `multipleOf`, a declared `$defs`)
//! surface as `Err(SchemaError)`.
//!
//! ## Per-node algorithm
//!
//! 1. Follow self-reference links.
//! 2. Boolean schemas accept or reject outright.
//! 3. A custom validate hook runs first; if it fails, its errors are the
//!    node's result.
//! 4. `$defs` is rejected unless unsupported keywords are ignored.
//! 5. A `$ref` delegates to its target and the node's own keywords are
//!    not evaluated.
//! 6. Otherwise every keyword present on the node is evaluated in order.
//!    Absent values are not checked at all.
//!
//! In short-circuit mode the first failing keyword ends evaluation of
//! that node.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use jsonv_core::{from_json_pointer, to_json_pointer, PathSegment, SchemaError};

use crate::format::FormatRegistry;
use crate::keywords;
use crate::node::{SchemaId, SchemaKind};
use crate::resolver::MAX_REF_DEPTH;
use crate::schema::{Schema, SchemaRef};

/// Options for a validation run.
#[derive(Debug, Clone, Default)]
pub struct ValidationOptions {
    /// Coerce the value before validating it.
    pub coerce: bool,
    /// Stop each node at its first failing keyword.
    pub short_circuit: bool,
    /// Evaluate schemas declaring `$defs` instead of rejecting them.
    pub ignore_unsupported: bool,
    /// Prefix for reported keyword locations.
    pub keyword_path: Vec<PathSegment>,
    /// Prefix for reported instance locations.
    pub instance_path: Vec<PathSegment>,
    /// Formats to check against. Defaults to [`FormatRegistry::global`].
    pub formats: Option<Arc<FormatRegistry>>,
}

impl ValidationOptions {
    pub fn coerced() -> Self {
        Self {
            coerce: true,
            ..Self::default()
        }
    }

    pub fn short_circuit() -> Self {
        Self {
            short_circuit: true,
            ..Self::default()
        }
    }
}

/// One validation failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetail {
    /// JSON pointer to the failing keyword.
    pub keyword_location: String,
    /// JSON pointer to the offending value.
    pub instance_location: String,
    /// Human-readable message.
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl std::fmt::Display for ErrorDetail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let at = if self.instance_location.is_empty() {
            "/"
        } else {
            &self.instance_location
        };
        write!(f, "{} at {} ({})", self.error, at, self.keyword_location)
    }
}

/// The outcome of validating one value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ErrorDetail>,
}

/// An error message with the instance path it refers to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Issue {
    pub message: String,
    pub path: Vec<PathSegment>,
}

impl ValidationResult {
    pub fn success() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
        }
    }

    pub fn from_errors(errors: Vec<ErrorDetail>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    /// Errors as message/path pairs.
    pub fn issues(&self) -> Vec<Issue> {
        self.errors
            .iter()
            .map(|e| Issue {
                message: e.error.clone(),
                path: from_json_pointer(&e.instance_location).unwrap_or_default(),
            })
            .collect()
    }
}

/// Where in the schema and the instance an evaluation is happening.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Location {
    pub keyword_path: Vec<PathSegment>,
    pub instance_path: Vec<PathSegment>,
}

impl Location {
    /// An error for `keyword` at this location. An empty keyword reports
    /// the location itself.
    pub fn error(&self, keyword: &str, message: impl Into<String>, data: Option<Value>) -> ErrorDetail {
        let mut keyword_path = self.keyword_path.clone();
        if !keyword.is_empty() {
            keyword_path.push(PathSegment::from(keyword));
        }
        ErrorDetail {
            keyword_location: to_json_pointer(&keyword_path),
            instance_location: to_json_pointer(&self.instance_path),
            error: message.into(),
            data,
        }
    }

    /// Descend into a subschema, optionally also into the instance.
    pub(crate) fn descend(&self, keyword: &[PathSegment], instance: Option<PathSegment>) -> Location {
        let mut next = self.clone();
        next.keyword_path.extend_from_slice(keyword);
        if let Some(segment) = instance {
            next.instance_path.push(segment);
        }
        next
    }
}

/// Evaluates nodes of one schema tree.
pub(crate) struct Evaluator<'s> {
    pub(crate) schema: &'s Schema,
    pub(crate) formats: &'s FormatRegistry,
    short_circuit: bool,
    ignore_unsupported: bool,
}

impl<'s> Evaluator<'s> {
    pub(crate) fn new(schema: &'s Schema, options: &'s ValidationOptions) -> Self {
        Self {
            schema,
            formats: options.formats.as_deref().unwrap_or_else(|| FormatRegistry::global()),
            short_circuit: options.short_circuit,
            ignore_unsupported: options.ignore_unsupported,
        }
    }

    /// An evaluator with default options, for internal yes/no checks.
    pub(crate) fn lenient(schema: &'s Schema) -> Self {
        Self {
            schema,
            formats: FormatRegistry::global(),
            short_circuit: true,
            ignore_unsupported: true,
        }
    }

    pub(crate) fn validate(
        &self,
        id: SchemaId,
        value: Option<&Value>,
        at: &Location,
        depth: usize,
    ) -> Result<Vec<ErrorDetail>, SchemaError> {
        let mut depth = depth;
        let id = self.schema.follow(id, &mut depth)?;
        let node = self.schema.node(id);

        match node.kind {
            SchemaKind::Bool(true) | SchemaKind::Hole(_) => return Ok(Vec::new()),
            SchemaKind::Bool(false) => {
                return Ok(vec![at.error("", "Always fails", value.cloned())]);
            }
            _ => {}
        }

        if let (Some(hook), Some(v)) = (&node.hooks.validate, value) {
            let result = hook.validate(v, at);
            if !result.valid {
                return Ok(result.errors);
            }
        }

        if !self.ignore_unsupported && node.keyword("$defs").is_some() {
            tracing::debug!(location = %to_json_pointer(&at.keyword_path), "schema declares $defs");
            return Err(SchemaError::Unsupported {
                feature: "$defs".to_string(),
            });
        }

        let Some(value) = value else {
            return Ok(Vec::new());
        };

        if let Some(reference) = node.reference() {
            let target = self.schema.resolver().resolve(reference)?;
            if depth + 1 > MAX_REF_DEPTH {
                return Err(SchemaError::RecursionLimit(MAX_REF_DEPTH));
            }
            return self.validate(target, Some(value), &at.descend(&[PathSegment::from("$ref")], None), depth + 1);
        }

        let mut errors = Vec::new();
        for keyword in node.keywords() {
            let found = keywords::evaluate(self, node, keyword, value, at, depth)?;
            if found.is_empty() {
                continue;
            }
            if self.short_circuit {
                tracing::trace!(keyword = keyword.name(), "short-circuit on first failure");
                return Ok(found);
            }
            errors.extend(found);
        }
        Ok(errors)
    }

    /// Validate with a throwaway error buffer.
    pub(crate) fn accepts(&self, id: SchemaId, value: &Value, at: &Location, depth: usize) -> Result<bool, SchemaError> {
        Ok(self.validate(id, Some(value), at, depth)?.is_empty())
    }
}

impl Schema {
    /// Validate `value` with default options.
    pub fn validate(&self, value: &Value) -> Result<ValidationResult, SchemaError> {
        self.view().validate(value)
    }

    pub fn validate_with(&self, value: &Value, options: &ValidationOptions) -> Result<ValidationResult, SchemaError> {
        self.view().validate_with(value, options)
    }

    /// Validate a possibly absent value. Absence is only ever rejected by
    /// the boolean schema `false` or a custom hook.
    pub fn validate_optional(
        &self,
        value: Option<&Value>,
        options: &ValidationOptions,
    ) -> Result<ValidationResult, SchemaError> {
        self.view().validate_optional(value, options)
    }
}

impl<'s> SchemaRef<'s> {
    pub fn validate(&self, value: &Value) -> Result<ValidationResult, SchemaError> {
        self.validate_optional(Some(value), &ValidationOptions::default())
    }

    pub fn validate_with(&self, value: &Value, options: &ValidationOptions) -> Result<ValidationResult, SchemaError> {
        self.validate_optional(Some(value), options)
    }

    pub fn validate_optional(
        &self,
        value: Option<&Value>,
        options: &ValidationOptions,
    ) -> Result<ValidationResult, SchemaError> {
        let coerced = match value {
            Some(v) if options.coerce => Some(self.schema.coerce_at(self.id, v, &Default::default())?),
            _ => None,
        };
        let value = coerced.as_ref().or(value);
        let at = Location {
            keyword_path: options.keyword_path.clone(),
            instance_path: options.instance_path.clone(),
        };
        let errors = Evaluator::new(self.schema, options).validate(self.id, value, &at, 0)?;
        Ok(ValidationResult::from_errors(errors))
    }
}
