//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Feedwright RSS content enhancer CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: feedwright.toml)
    #[arg(short = 'C', long, default_value = "feedwright.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Enhance the generated feed with sanitized full-page content
    #[command(visible_alias = "e")]
    Enhance {
        #[command(flatten)]
        args: EnhanceArgs,
    },

    /// Remove the item cache directory
    #[command(visible_alias = "c")]
    Clean,
}

/// Enhance command arguments (override feedwright.toml values)
#[derive(clap::Args, Debug, Clone)]
pub struct EnhanceArgs {
    /// Build output directory containing the feed and rendered pages
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub dist: Option<PathBuf>,

    /// Feed file name inside the build output directory
    #[arg(short, long)]
    pub feed_file: Option<String>,

    /// Base URL for rewriting relative links (default: the channel link)
    #[arg(short, long)]
    pub base_url: Option<String>,

    /// Timestamp of the last successful build (RFC 3339); enables cache reuse
    #[arg(short, long)]
    pub last_build_time: Option<String>,

    /// Show per-item cache decisions and skip reasons
    #[arg(short, long)]
    pub verbose: bool,
}
