//! # jsonv-cli: Command-Line Interface
//!
//! A thin clap front end over `jsonv-schema`. Schemas and documents are
//! read from `.json`, `.yaml` or `.yml` files; results are printed as
//! pretty JSON on stdout.
//!
//! ## Subcommands
//!
//! - `validate`: validate a document, exit status 1 on failure
//! - `coerce`: print the coerced document
//! - `template`: print the default instance of a schema
//! - `walk`: list the nodes of a schema, optionally bound to data
//! - `formats`: list registered string formats
//!
//! ## Crate Policy
//!
//! - Argument parsing is separated from the handlers.
//! - Handlers delegate to `jsonv-schema` and return a [`Report`]; only
//!   `main` prints or exits.

pub mod coerce;
pub mod document;
pub mod formats;
pub mod template;
pub mod validate;
pub mod walk;

use serde_json::Value;

/// The outcome of one subcommand.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    /// Printed to stdout as pretty JSON.
    pub output: Value,
    /// `false` makes the process exit with status 1.
    pub success: bool,
}

impl Report {
    pub fn ok(output: Value) -> Self {
        Self {
            output,
            success: true,
        }
    }
}
