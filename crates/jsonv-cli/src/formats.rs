//! # Formats Subcommand

use serde_json::Value;

use jsonv_schema::list_formats;

use crate::Report;

pub fn run() -> Report {
    Report::ok(Value::from(list_formats()))
}
