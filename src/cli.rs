//! CLI definitions for uiprobe.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use uuid::Uuid;

/// uiprobe CLI.
#[derive(Parser)]
#[command(name = "uiprobe")]
#[command(about = "Perception and resilience engine for UI test agents")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/uiprobe.toml", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Find a template image inside a screenshot
    Match {
        /// Screenshot path (physical pixels)
        #[arg(long)]
        screen: PathBuf,

        /// Template image path
        #[arg(long)]
        template: PathBuf,

        /// Maximum number of matches to print
        #[arg(long)]
        max_results: Option<usize>,
    },

    /// Element index management
    Index {
        #[command(subcommand)]
        action: IndexAction,
    },

    /// Locate an element on the live screen
    Locate {
        /// Element description
        #[arg(short, long)]
        query: String,
    },

    /// Wait until a template appears on the live screen
    WaitFor {
        /// Template image path
        #[arg(long)]
        template: PathBuf,

        /// Wait for the template to disappear instead
        #[arg(long)]
        gone: bool,

        /// Overall wait in milliseconds (default: the verification policy timeout plus a grace margin)
        #[arg(long)]
        timeout_ms: Option<u64>,
    },

    /// Check the configuration file and print warnings
    Validate,
}

#[derive(Subcommand)]
pub(crate) enum IndexAction {
    /// Store an element (overwrites an existing id)
    Store {
        /// Short element name
        #[arg(long)]
        name: String,

        /// Description used for retrieval
        #[arg(long)]
        description: String,

        /// Template image for pixel matching
        #[arg(long)]
        template: Option<PathBuf>,

        /// Last known logical bounds as x,y,width,height
        #[arg(long, value_parser = parse_bounds)]
        bounds: Option<uiprobe_protocols::Rect>,

        /// Reuse an existing id
        #[arg(long)]
        id: Option<Uuid>,
    },

    /// Search elements by description
    Search {
        /// Query text
        #[arg(short, long)]
        query: String,

        /// Maximum number of results (default from config)
        #[arg(long)]
        top_n: Option<usize>,

        /// Minimum similarity score (default from config)
        #[arg(long)]
        min_score: Option<f32>,
    },

    /// Remove an element by id
    Remove {
        /// Element id
        id: Uuid,
    },
}

fn parse_bounds(value: &str) -> Result<uiprobe_protocols::Rect, String> {
    fn field<T: std::str::FromStr>(s: &str) -> Result<T, String>
    where
        T::Err: std::fmt::Display,
    {
        s.trim().parse::<T>().map_err(|e| format!("'{}': {}", s, e))
    }

    let parts: Vec<&str> = value.split(',').collect();
    if parts.len() != 4 {
        return Err(format!("expected x,y,width,height, got '{}'", value));
    }
    Ok(uiprobe_protocols::Rect::new(
        field(parts[0])?,
        field(parts[1])?,
        field(parts[2])?,
        field(parts[3])?,
    ))
}
