//! # Coerce Subcommand

use std::path::PathBuf;

use clap::Args;
use serde_json::Value;

use jsonv_schema::{CoercionOptions, Schema};

use crate::document::{load_document, load_schema};
use crate::Report;

/// Arguments for the coerce subcommand.
#[derive(Args, Debug)]
pub struct CoerceArgs {
    /// Schema file (.json, .yaml or .yml).
    pub schema: PathBuf,

    /// Document to coerce.
    pub data: PathBuf,

    /// Drop object keys the schema does not declare.
    #[arg(long)]
    pub drop_unknown: bool,
}

pub fn run(args: &CoerceArgs) -> anyhow::Result<Report> {
    let schema = load_schema(&args.schema)?;
    let data = load_document(&args.data)?;
    execute(
        &schema,
        &data,
        &CoercionOptions {
            drop_unknown: args.drop_unknown,
        },
    )
}

pub fn execute(schema: &Schema, data: &Value, options: &CoercionOptions) -> anyhow::Result<Report> {
    Ok(Report::ok(schema.coerce_with(data, options)?))
}
