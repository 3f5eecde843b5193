//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Stagehand -- integration tests against real cloud resources.
///
/// Use `stagehand <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "stagehand", version, about, long_about = None)]
pub struct Cli {
    /// Path to the stagehand.toml configuration file.
    #[arg(short, long, global = true, default_value = "stagehand.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

/// Where resources live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendKind {
    /// Real AWS services (or an endpoint override such as localstack).
    Aws,
    /// In-process memory backend (dry run).
    Memory,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Provision resources, run suites, tear everything down.
    Run(RunArgs),

    /// Delete the explicitly named resources declared in the config.
    Teardown(TeardownArgs),

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- run ----

/// Provision, run and tear down.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Run only this suite (repeatable). Overrides `suites` in the config.
    #[arg(long = "suite")]
    pub suites: Vec<String>,

    /// Write the JSON run report to this path (overrides `general.report_path`).
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Service backend.
    #[arg(long, value_enum, default_value = "aws")]
    pub backend: BackendKind,
}

// ---- teardown ----

/// Delete leftover resources by their configured names.
#[derive(Args, Debug)]
pub struct TeardownArgs {
    /// Service backend.
    #[arg(long, value_enum, default_value = "aws")]
    pub backend: BackendKind,
}

// ---- config ----

/// Manage stagehand configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, aws, readiness, assertions, queues, buckets, tables, targets).
        #[arg(long)]
        section: Option<String>,
    },
}
