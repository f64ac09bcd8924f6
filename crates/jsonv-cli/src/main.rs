//! # jsonv CLI Entry Point
//!
//! Assembles subcommands and dispatches to handler modules.

use std::process::ExitCode;

use clap::Parser;

use jsonv_cli::Report;

/// jsonv: validate, coerce and template JSON documents against schemas.
#[derive(Parser, Debug)]
#[command(name = "jsonv", version, about)]
struct Cli {
    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Validate a document against a schema.
    Validate(jsonv_cli::validate::ValidateArgs),
    /// Coerce a document into the shape a schema describes.
    Coerce(jsonv_cli::coerce::CoerceArgs),
    /// Print the default instance of a schema.
    Template(jsonv_cli::template::TemplateArgs),
    /// List the nodes of a schema.
    Walk(jsonv_cli::walk::WalkArgs),
    /// List registered string formats.
    Formats,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::from_default_env();
    if cli.json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    let report: Report = match &cli.command {
        Commands::Validate(args) => jsonv_cli::validate::run(args)?,
        Commands::Coerce(args) => jsonv_cli::coerce::run(args)?,
        Commands::Template(args) => jsonv_cli::template::run(args)?,
        Commands::Walk(args) => jsonv_cli::walk::run(args)?,
        Commands::Formats => jsonv_cli::formats::run(),
    };

    println!("{}", serde_json::to_string_pretty(&report.output)?);
    Ok(if report.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
