//! # genrenet CLI Module
//!
//! This module implements the CLI interface for genrenet.
//!
//! ## Available Commands
//!
//! - `run` - Refresh the cache if needed and render the genre graph (default)
//! - `refresh` - Delete the cached dataset and fetch it again
//! - `status` - Show cache timestamp, age and files
//! - `counts` - Print genre and pair counts without rendering

mod commands;

use crate::config::{DatasetOverrides, ParamOverrides};
use crate::render::OutputFormat;
use clap::{Parser, Subcommand};
use genrenet_core::GenreNetError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// genrenet - genre co-occurrence graphs
///
/// Downloads the public title datasets, keeps a local cache fresh and
/// draws which genres appear together.
#[derive(Parser, Debug)]
#[command(name = "genrenet")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file (default: genrenet.toml if present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory of the dataset cache
    #[arg(short = 'D', long, global = true)]
    pub cache_dir: Option<PathBuf>,

    /// Maximum cache age in days
    #[arg(long, global = true)]
    pub freshness_days: Option<u32>,

    /// Also fetch and cache the crew resource
    #[arg(long, global = true)]
    pub include_crew: bool,

    /// Remote location of the dataset files
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Download timeout per resource, in seconds
    #[arg(long, global = true, default_value = "600")]
    pub timeout: u64,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// `[dataset]` overrides taken from the global flags.
    #[must_use]
    pub fn dataset_overrides(&self) -> DatasetOverrides {
        DatasetOverrides {
            cache_dir: self.cache_dir.clone(),
            freshness_days: self.freshness_days,
            include_crew: self.include_crew,
            base_url: self.base_url.clone(),
        }
    }
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render the genre co-occurrence graph
    Run {
        #[command(flatten)]
        params: ParamOverrides,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short = 't', long, value_enum, default_value = "dot")]
        format: OutputFormat,
    },

    /// Delete the cached dataset and fetch it again
    Refresh,

    /// Show cache status
    Status,

    /// Print genre and pair counts
    Counts {
        #[command(flatten)]
        params: ParamOverrides,

        /// Number of pairs to list
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub fn execute(cli: Cli) -> Result<(), GenreNetError> {
    let dataset = cli.dataset_overrides();
    let config_path = cli.config.as_deref();
    let context = CommandContext {
        json_mode: cli.json_mode,
        timeout: std::time::Duration::from_secs(cli.timeout),
    };

    match cli.command {
        Some(Commands::Run {
            params,
            output,
            format,
        }) => {
            let config = crate::config::load_config(config_path, &params, &dataset)?;
            cmd_run(&context, &config, output.as_deref(), format)
        }
        Some(Commands::Refresh) => {
            let config =
                crate::config::load_config(config_path, &ParamOverrides::default(), &dataset)?;
            cmd_refresh(&context, &config)
        }
        Some(Commands::Status) => {
            let config =
                crate::config::load_config(config_path, &ParamOverrides::default(), &dataset)?;
            cmd_status(&context, &config)
        }
        Some(Commands::Counts { params, limit }) => {
            let config = crate::config::load_config(config_path, &params, &dataset)?;
            cmd_counts(&context, &config, limit)
        }
        None => {
            // No subcommand - render with configured defaults
            let config =
                crate::config::load_config(config_path, &ParamOverrides::default(), &dataset)?;
            cmd_run(&context, &config, None, OutputFormat::default())
        }
    }
}
