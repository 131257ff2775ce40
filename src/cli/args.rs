//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};

use crate::cli::commands::{price::PriceArgs, quote::QuoteCommands, work::WorkCommands};

#[derive(Parser)]
#[command(name = "devis")]
#[command(author, version, about = "Construction quote pricing engine")]
#[command(
    long_about = "Price quote lines, total quotes with their VAT breakdown, and roll up the cost of composite works from YAML catalog snapshots."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Only log errors
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Log rollup details to stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Price a single line
    Price(PriceArgs),

    /// Quote totals and global adjustments
    #[command(subcommand)]
    Quote(QuoteCommands),

    /// Work cost rollup and bill of materials
    #[command(subcommand)]
    Work(WorkCommands),
}

/// Output format for results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human tables on a terminal
    #[default]
    Auto,
    /// Styled tables
    Human,
    /// YAML document
    Yaml,
    /// JSON document
    Json,
}
