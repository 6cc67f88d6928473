//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::generate::GenerateArgs;

#[derive(Parser, Debug)]
#[command(name = "drd")]
#[command(author, version, about = "Data Resource Directory generator")]
#[command(
    long_about = "Render a registry of entities (a CSV file with \"Entity Full Name\", \"Type\" and \"URL\" columns) into a categorized wiki listing or an HTML data depot page."
)]
pub struct Cli {
    #[command(flatten)]
    pub generate: GenerateArgs,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', value_enum, default_value_t = OutputFormat::Template)]
    pub format: OutputFormat,

    /// Suppress the summary line on stderr
    #[arg(long, short = 'q')]
    pub quiet: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(long, short = 'v', action = ArgAction::Count)]
    pub verbose: u8,

    /// Extra configuration file, applied over ~/.config/drd/config.yaml and ./drd.yaml
    #[arg(long, env = "DRD_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Rendered page (wiki markup or HTML, per layout)
    #[default]
    Template,
    /// The grouped entities as JSON (for programming)
    Json,
}
