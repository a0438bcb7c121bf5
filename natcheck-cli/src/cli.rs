//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's
//! derive macros. It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// natcheck -- NAT rule lifecycle verification harness.
///
/// Use `natcheck <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "natcheck", version, about, long_about = None)]
pub struct Cli {
    /// Path to the natcheck.toml configuration file.
    #[arg(short, long, default_value = "natcheck.toml")]
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
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run lifecycle scenarios against the manager.
    Run(RunArgs),

    /// Render a scenario's declarative configuration text.
    Render(RenderArgs),

    /// Check that a specific rule exists with the expected display name.
    Check(CheckArgs),

    /// Check manager connectivity.
    Ping,

    /// Manage configuration.
    Config(ConfigArgs),
}

/// Built-in lifecycle scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScenarioKind {
    /// Source NAT scenario.
    Snat,
    /// Destination NAT scenario.
    Dnat,
    /// Both scenarios in sequence.
    All,
}

/// Which half of a scenario to render.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RenderPhase {
    /// The create-time configuration.
    Create,
    /// The update-time configuration.
    Update,
}

// ---- run ----

/// Run one or both lifecycle scenarios end to end.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Scenario to run.
    #[arg(default_value = "all")]
    pub scenario: ScenarioKind,

    /// Override the logical router id from the configuration.
    #[arg(long)]
    pub router_id: Option<String>,
}

// ---- render ----

/// Render a scenario's configuration text without contacting the manager.
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Scenario to render (snat or dnat).
    pub scenario: ScenarioKind,

    /// Which phase to render.
    #[arg(long, default_value = "create")]
    pub phase: RenderPhase,

    /// Override the logical router id from the configuration.
    #[arg(long)]
    pub router_id: Option<String>,
}

// ---- check ----

/// One-shot existence check for a single rule.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Logical router owning the rule.
    #[arg(long)]
    pub router_id: String,

    /// System-assigned rule identifier.
    #[arg(long)]
    pub rule_id: String,

    /// Expected display name.
    #[arg(long)]
    pub display_name: String,
}

// ---- config ----

/// Manage natcheck configuration.
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
    Show,
}
