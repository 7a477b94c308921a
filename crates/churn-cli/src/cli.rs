//! CLI argument definitions for the churn scorer.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "churn-scorer",
    version,
    about = "Churn Risk Scorer - Score customer accounts for churn risk",
    long_about = "Score a customer-level CSV/TSV upload for churn risk.\n\n\
                  Arbitrary column names are bridged to the canonical field\n\
                  catalogue via a mapping file; features are derived, a trained\n\
                  logistic model produces probabilities, and each account gets\n\
                  a risk tier, timeline, and rule-based drivers and actions."
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
}

#[derive(Subcommand)]
pub enum Command {
    /// Score an uploaded account table against the trained model.
    Score(ScoreArgs),

    /// Train a model from a labeled account table.
    Train(TrainArgs),

    /// List the canonical field catalogue.
    Fields,
}

#[derive(Parser)]
pub struct ScoreArgs {
    /// Path to the account table (CSV, or TSV by extension).
    #[arg(value_name = "UPLOAD")]
    pub upload: PathBuf,

    /// JSON mapping of canonical fields to upload columns, e.g.
    /// {"account_id": "cust"}. Defaults to matching column names
    /// case-insensitively against the catalogue.
    #[arg(long = "mapping", value_name = "PATH")]
    pub mapping: Option<PathBuf>,

    /// Trained model artifact to score with.
    #[arg(
        long = "model",
        value_name = "PATH",
        default_value = churn_score::DEFAULT_MODEL_PATH
    )]
    pub model: PathBuf,

    /// Write the full scored table as CSV.
    #[arg(long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// How many accounts to show in the summary table.
    #[arg(long = "top", value_name = "N", default_value_t = 10)]
    pub top: usize,
}

#[derive(Parser)]
pub struct TrainArgs {
    /// Path to the labeled account table (CSV, or TSV by extension).
    #[arg(value_name = "UPLOAD")]
    pub upload: PathBuf,

    /// JSON mapping of canonical fields to upload columns. Defaults to
    /// matching column names case-insensitively against the catalogue.
    #[arg(long = "mapping", value_name = "PATH")]
    pub mapping: Option<PathBuf>,

    /// Column holding the churn label (1/true = churned).
    #[arg(long = "label", value_name = "COLUMN", default_value = "churned")]
    pub label: String,

    /// Where to write the trained model artifact.
    #[arg(
        long = "model-out",
        value_name = "PATH",
        default_value = churn_score::DEFAULT_MODEL_PATH
    )]
    pub model_out: PathBuf,

    /// Gradient descent epochs.
    #[arg(long = "epochs", value_name = "N", default_value_t = 500)]
    pub epochs: usize,

    /// Gradient descent learning rate.
    #[arg(long = "learning-rate", value_name = "RATE", default_value_t = 0.1)]
    pub learning_rate: f64,
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
