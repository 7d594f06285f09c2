//! CLI argument definitions for the match review tool.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use pmatch_model::{MatchKey, MatchStatus};

use pmatch_cli::workflow::StatusFilter;

#[derive(Parser)]
#[command(
    name = "pmatch",
    version,
    about = "Link patients between an internal and an external registry",
    long_about = "Propose, search and review matches between an internal and an \
                  external patient registry.\n\n\
                  Registries are read from <DATA_DIR>/internal.csv and \
                  <DATA_DIR>/external.csv; review decisions live in \
                  <DATA_DIR>/matches.csv."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow patient field values in log output.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,

    /// Directory holding the registry files and the decision table.
    #[arg(
        long = "data-dir",
        value_name = "DIR",
        default_value = "data",
        global = true
    )]
    pub data_dir: PathBuf,

    /// TOML file overriding matching thresholds and weights.
    #[arg(long = "config", value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compare every internal record with every external record.
    Match(MatchArgs),

    /// Find likely matches for internal patients relevant to a query.
    Search(SearchArgs),

    /// List persisted matches with freshly computed scores.
    Review(ReviewArgs),

    /// Approve a stored match.
    Approve(PairArgs),

    /// Deny a stored match, removing it from the decision table.
    Deny(PairArgs),

    /// Return a stored match to pending.
    Reset(PairArgs),

    /// Remove every stored decision.
    Clear,

    /// Show how one external and one internal record compare.
    Explain(PairArgs),
}

#[derive(Args)]
pub struct MatchArgs {
    /// Save the results as pending decisions if the decision table is empty.
    #[arg(long = "persist")]
    pub persist: bool,

    /// Clear the decision table before persisting.
    #[arg(long = "replace", requires = "persist")]
    pub replace: bool,

    #[arg(long = "format", value_enum, default_value = "table")]
    pub format: OutputFormatArg,
}

#[derive(Args)]
pub struct SearchArgs {
    /// Name, date of birth, phone, city, zip code or address fragment.
    #[arg(value_name = "QUERY")]
    pub query: String,

    #[arg(long = "format", value_enum, default_value = "table")]
    pub format: OutputFormatArg,
}

#[derive(Args)]
pub struct ReviewArgs {
    /// Only list decisions with this status.
    #[arg(long = "status", value_enum, default_value = "all")]
    pub status: StatusArg,

    #[arg(long = "format", value_enum, default_value = "table")]
    pub format: OutputFormatArg,
}

#[derive(Args)]
pub struct PairArgs {
    #[arg(value_name = "EXTERNAL_ID")]
    pub external_id: String,

    #[arg(value_name = "INTERNAL_ID")]
    pub internal_id: String,
}

impl PairArgs {
    pub fn key(&self) -> MatchKey {
        MatchKey::new(self.external_id.as_str(), self.internal_id.as_str())
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormatArg {
    Table,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum StatusArg {
    None,
    Approved,
    Denied,
    All,
}

impl From<StatusArg> for StatusFilter {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::None => Self::Only(MatchStatus::None),
            StatusArg::Approved => Self::Only(MatchStatus::Approved),
            StatusArg::Denied => Self::Only(MatchStatus::Denied),
            StatusArg::All => Self::All,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
