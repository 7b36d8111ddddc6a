//! Feedwright - a post-build RSS content enhancer for static sites.

mod cache;
mod cli;
mod config;
mod feed;
mod logger;
mod pipeline;
mod sanitize;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::EnhancerConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    match &cli.command {
        Commands::Enhance { args } => {
            logger::set_verbose(args.verbose);
            let config = EnhancerConfig::load(&cli, Some(args))?;
            pipeline::run(&config)
        }
        Commands::Clean => {
            let config = EnhancerConfig::load(&cli, None)?;
            clean_cache(&config)
        }
    }
}

/// Remove the item cache directory, forcing a full re-sanitization next run.
fn clean_cache(config: &EnhancerConfig) -> Result<()> {
    let dir = config.cache_dir();
    if dir.exists() {
        std::fs::remove_dir_all(&dir)?;
        log!("cache"; "removed {}", dir.display());
    } else {
        log!("cache"; "nothing to clean");
    }
    Ok(())
}
