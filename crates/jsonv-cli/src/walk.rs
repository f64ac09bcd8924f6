//! # Walk Subcommand
//!
//! Lists the nodes of a schema in pre-order, one JSON object per node.

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use serde_json::Value;

use jsonv_schema::{Schema, WalkOptions};

use crate::document::{load_document, load_schema};
use crate::Report;

/// Arguments for the walk subcommand.
#[derive(Args, Debug)]
pub struct WalkArgs {
    /// Schema file (.json, .yaml or .yml).
    pub schema: PathBuf,

    /// Document to bind to the visited nodes.
    #[arg(long)]
    pub data: Option<PathBuf>,

    /// Do not descend below this instance depth.
    #[arg(long)]
    pub max_depth: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Visit {
    instance_location: String,
    keyword_location: String,
    depth: usize,
    schema: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

pub fn run(args: &WalkArgs) -> anyhow::Result<Report> {
    let schema = load_schema(&args.schema)?;
    let data = args.data.as_deref().map(load_document).transpose()?;
    execute(&schema, data.as_ref(), args.max_depth)
}

pub fn execute(schema: &Schema, data: Option<&Value>, max_depth: Option<usize>) -> anyhow::Result<Report> {
    let options = WalkOptions {
        data,
        max_depth,
        ..WalkOptions::default()
    };
    let visits: Vec<Visit> = schema
        .walk(options)
        .map(|node| Visit {
            instance_location: node.instance_location(),
            keyword_location: node.keyword_location(),
            depth: node.depth,
            schema: node.schema.to_json(),
            data: node.data,
        })
        .collect();
    Ok(Report::ok(serde_json::to_value(visits)?))
}
