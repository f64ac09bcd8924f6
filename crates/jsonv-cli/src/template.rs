//! # Template Subcommand
//!
//! Prints the default instance of a schema, or `null` when the schema has
//! no template.

use std::path::PathBuf;

use clap::Args;
use serde_json::Value;

use jsonv_schema::{Schema, TemplateOptions};

use crate::document::load_schema;
use crate::Report;

/// Arguments for the template subcommand.
#[derive(Args, Debug)]
pub struct TemplateArgs {
    /// Schema file (.json, .yaml or .yml).
    pub schema: PathBuf,

    /// Include optional properties.
    #[arg(long)]
    pub with_optional: bool,

    /// Use the first `enum` value as a fallback and keep empty nested objects.
    #[arg(long)]
    pub with_extended_optional: bool,
}

pub fn run(args: &TemplateArgs) -> anyhow::Result<Report> {
    let schema = load_schema(&args.schema)?;
    Ok(execute(
        &schema,
        &TemplateOptions {
            with_optional: args.with_optional,
            with_extended_optional: args.with_extended_optional,
        },
    ))
}

pub fn execute(schema: &Schema, options: &TemplateOptions) -> Report {
    Report::ok(schema.template_with(None, options).unwrap_or(Value::Null))
}
