//! CLI parse: clap types for arbor. No behavior; definitions only.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// arbor - content-addressed directory trees
#[derive(Parser)]
#[command(name = "arbor")]
#[command(about = "Load, filter, diff, digest and export content-addressed directory trees")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (layered over the global config)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (default: off)
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long, global = true)]
    pub log_format: Option<String>,
}

/// Include/exclude patterns applied while loading a host directory.
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Only load paths matching this pattern (repeatable)
    #[arg(long = "include")]
    pub include: Vec<String>,

    /// Skip paths matching this pattern (repeatable)
    #[arg(long = "exclude")]
    pub exclude: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the content digest of a host directory
    Digest {
        path: PathBuf,
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// List a directory of a loaded tree
    Ls {
        path: PathBuf,
        /// Directory inside the tree to list
        #[arg(long, default_value = "/")]
        at: String,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Print every path of a host directory matching a pattern
    Glob {
        path: PathBuf,
        pattern: String,
    },
    /// Show what OTHER adds or changes relative to BASE
    Diff {
        base: PathBuf,
        other: PathBuf,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Copy a host directory through a filter into another host directory
    Copy {
        source: PathBuf,
        dest: PathBuf,
        #[command(flatten)]
        filter: FilterArgs,
        /// Remove destination entries absent from the source
        #[arg(long)]
        wipe: bool,
        /// Set every copied node's modification time
        #[arg(long)]
        timestamp: Option<i64>,
    },
    /// Print the effective configuration
    Config,
}
