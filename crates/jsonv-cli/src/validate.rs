//! # Validate Subcommand
//!
//! `jsonv validate <schema> <data>` prints the validation result. The
//! process exits with status 1 when the document is invalid.

use std::path::PathBuf;

use clap::Args;
use serde_json::Value;

use jsonv_schema::{Schema, ValidationOptions};

use crate::document::{load_document, load_schema};
use crate::Report;

/// Arguments for the validate subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Schema file (.json, .yaml or .yml).
    pub schema: PathBuf,

    /// Document to validate.
    pub data: PathBuf,

    /// Coerce the document before validating it.
    #[arg(long)]
    pub coerce: bool,

    /// Stop each node at its first failing keyword.
    #[arg(long)]
    pub short_circuit: bool,

    /// Evaluate schemas that declare `$defs` instead of rejecting them.
    #[arg(long)]
    pub ignore_unsupported: bool,
}

impl ValidateArgs {
    fn options(&self) -> ValidationOptions {
        ValidationOptions {
            coerce: self.coerce,
            short_circuit: self.short_circuit,
            ignore_unsupported: self.ignore_unsupported,
            ..ValidationOptions::default()
        }
    }
}

pub fn run(args: &ValidateArgs) -> anyhow::Result<Report> {
    let schema = load_schema(&args.schema)?;
    let data = load_document(&args.data)?;
    execute(&schema, &data, &args.options())
}

pub fn execute(schema: &Schema, data: &Value, options: &ValidationOptions) -> anyhow::Result<Report> {
    let result = schema.validate_with(data, options)?;
    tracing::debug!(valid = result.valid, errors = result.errors.len(), "validated document");
    Ok(Report {
        success: result.valid,
        output: serde_json::to_value(&result)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> Schema {
        Schema::from_json(&json!({
            "type": "object",
            "properties": {"port": {"type": "integer"}},
            "required": ["port"]
        }))
        .unwrap()
    }

    #[test]
    fn test_valid_document() {
        let report = execute(&schema(), &json!({"port": 80}), &ValidationOptions::default()).unwrap();
        assert!(report.success);
        assert_eq!(report.output, json!({"valid": true, "errors": []}));
    }

    #[test]
    fn test_invalid_document_fails() {
        let report = execute(&schema(), &json!({"port": "80"}), &ValidationOptions::default()).unwrap();
        assert!(!report.success);
        assert_eq!(report.output["errors"][0]["instanceLocation"], json!("/port"));
    }

    #[test]
    fn test_coerce_flag() {
        let report = execute(&schema(), &json!({"port": "80"}), &ValidationOptions::coerced()).unwrap();
        assert!(report.success);
    }

    #[test]
    fn test_defs_rejected_unless_ignored() {
        let schema = Schema::from_json(&json!({"$defs": {"a": {}}, "type": "string"})).unwrap();
        assert!(execute(&schema, &json!("x"), &ValidationOptions::default()).is_err());
        let lenient = ValidationOptions {
            ignore_unsupported: true,
            ..ValidationOptions::default()
        };
        assert!(execute(&schema, &json!("x"), &lenient).unwrap().success);
    }
}
