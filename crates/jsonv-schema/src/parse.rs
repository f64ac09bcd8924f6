//! # Parse Pipeline
//!
//! `coerce` → `template` → `validate`, in that order, returning the final
//! value or the validation errors. This is the usual entry point for
//! loosely typed input such as query parameters or form fields.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use jsonv_core::SchemaError;

use crate::coerce::CoercionOptions;
use crate::schema::Schema;
use crate::template::TemplateOptions;
use crate::validate::{ErrorDetail, ValidationOptions};

/// Options for [`Schema::parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Coerce the input first.
    pub coerce: bool,
    /// Drop undeclared object keys while coercing.
    pub coerce_drop_unknown: bool,
    /// Fill defaults and optional properties from the template.
    pub with_defaults: bool,
    /// Template with `with_extended_optional`.
    pub with_extended_defaults: bool,
    /// Run coercion and templating against a copy rebuilt from the schema's
    /// JSON form. Custom hooks do not survive the copy.
    pub clone: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            coerce: true,
            coerce_drop_unknown: false,
            with_defaults: true,
            with_extended_defaults: false,
            clone: false,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// The processed value failed validation.
    #[error("{}", summary(.errors))]
    Invalid { value: Value, errors: Vec<ErrorDetail> },

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl ParseError {
    /// The first validation error, if this is a validation failure.
    pub fn first(&self) -> Option<&ErrorDetail> {
        match self {
            Self::Invalid { errors, .. } => errors.first(),
            Self::Schema(_) => None,
        }
    }

    /// `"<message> at <instance location>"` for the first error.
    pub fn first_to_string(&self) -> Option<String> {
        self.first()
            .map(|e| format!("{} at {}", e.error, e.instance_location))
    }
}

fn summary(errors: &[ErrorDetail]) -> String {
    match errors {
        [] => "validation failed".to_string(),
        [only] => format!("validation failed: {only}"),
        [first, rest @ ..] => format!("validation failed: {first} (and {} more)", rest.len()),
    }
}

impl Schema {
    /// Coerce, template and validate `value`.
    pub fn parse(&self, value: &Value, options: &ParseOptions) -> Result<Value, ParseError> {
        let copy;
        let working = if options.clone {
            copy = Schema::from_json(&self.to_json())?;
            &copy
        } else {
            self
        };

        let mut value = if options.coerce {
            working.coerce_with(
                value,
                &CoercionOptions {
                    drop_unknown: options.coerce_drop_unknown,
                },
            )?
        } else {
            value.clone()
        };

        if options.with_defaults {
            let template = TemplateOptions {
                with_optional: true,
                with_extended_optional: options.with_extended_defaults,
            };
            if let Some(filled) = working.template_with(Some(&value), &template) {
                value = filled;
            }
        }

        let result = self.validate_with(
            &value,
            &ValidationOptions {
                short_circuit: true,
                ignore_unsupported: true,
                ..ValidationOptions::default()
            },
        )?;
        if result.valid {
            Ok(value)
        } else {
            tracing::debug!(errors = result.errors.len(), "parse rejected value");
            Err(ParseError::Invalid {
                value,
                errors: result.errors,
            })
        }
    }
}

/// Free-function form of [`Schema::parse`].
pub fn parse(schema: &Schema, value: &Value, options: &ParseOptions) -> Result<Value, ParseError> {
    schema.parse(value, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::SplitDelimited;
    use serde_json::json;

    fn query() -> Schema {
        Schema::object([
            ("page", Schema::integer().minimum(1.0).default_value(json!(1))),
            ("active", Schema::boolean().optional()),
            ("q", Schema::string()),
        ])
    }

    #[test]
    fn test_coerces_and_fills_defaults() {
        let out = query()
            .parse(&json!({"q": "rust", "active": "true"}), &ParseOptions::default())
            .unwrap();
        assert_eq!(out, json!({"q": "rust", "active": true, "page": 1}));
    }

    #[test]
    fn test_optional_properties_are_templated() {
        let out = query().parse(&json!({"q": "x"}), &ParseOptions::default()).unwrap();
        assert_eq!(out, json!({"q": "x", "page": 1, "active": false}));
    }

    #[test]
    fn test_without_defaults() {
        let options = ParseOptions {
            with_defaults: false,
            ..ParseOptions::default()
        };
        let out = query().parse(&json!({"q": "x", "page": "3"}), &options).unwrap();
        assert_eq!(out, json!({"q": "x", "page": 3}));
    }

    #[test]
    fn test_invalid_reports_first_error() {
        let err = query()
            .parse(&json!({"q": "x", "page": "0"}), &ParseOptions::default())
            .unwrap_err();
        let first = err.first().unwrap();
        assert_eq!(first.instance_location, "/page");
        assert_eq!(err.first_to_string().unwrap(), format!("{} at /page", first.error));
        match err {
            ParseError::Invalid { value, errors } => {
                assert_eq!(value["page"], json!(0));
                assert_eq!(errors.len(), 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_without_coercion_strings_fail() {
        let options = ParseOptions {
            coerce: false,
            ..ParseOptions::default()
        };
        assert!(query().parse(&json!({"q": "x", "page": "2"}), &options).is_err());
    }

    #[test]
    fn test_drop_unknown() {
        let options = ParseOptions {
            coerce_drop_unknown: true,
            ..ParseOptions::default()
        };
        let out = query().parse(&json!({"q": "x", "extra": 1}), &options).unwrap();
        assert_eq!(out.get("extra"), None);
    }

    #[test]
    fn test_clone_drops_hooks() {
        let schema = Schema::object([(
            "tags",
            Schema::array(Schema::string()).coerce_hook(SplitDelimited::default()),
        )]);
        let input = json!({"tags": "a,b"});
        assert_eq!(
            parse(&schema, &input, &ParseOptions::default()).unwrap(),
            json!({"tags": ["a", "b"]})
        );
        let cloned = ParseOptions {
            clone: true,
            ..ParseOptions::default()
        };
        assert!(parse(&schema, &input, &cloned).is_err());
    }

    #[test]
    fn test_schema_errors_propagate() {
        let schema = Schema::object([("a", Schema::reference("#/nowhere"))]);
        let err = schema.parse(&json!({"a": 1}), &ParseOptions::default()).unwrap_err();
        assert!(matches!(err, ParseError::Schema(SchemaError::UnresolvedRef(_))));
    }
}
