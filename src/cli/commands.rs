//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Search and merge tweet streams, look up tweets and profiles
#[derive(Parser, Debug)]
#[command(name = "tweet-stream")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Scraper configuration file (YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Maximum requests in flight across all queries
    #[arg(long, global = true)]
    pub concurrency: Option<usize>,

    /// Retries per page on transient failures
    #[arg(long, global = true)]
    pub retries: Option<u32>,

    /// Base URL of the search service
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Stream the results of one query
    Search {
        /// Search query, e.g. `rust from:rustlang since:2020-01-01`
        query: String,

        /// Maximum tweets to print (0 = unbounded)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Merge several queries into one newest-first stream
    Merge {
        /// Search queries
        #[arg(required = true, num_args = 1..)]
        queries: Vec<String>,

        /// Maximum tweets per query (0 = unbounded)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Look up tweets by id
    Status {
        /// Numeric tweet ids
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
    },

    /// Look up account profiles
    Account {
        /// Usernames, with or without a leading `@`
        #[arg(required = true, num_args = 1..)]
        usernames: Vec<String>,
    },

    /// Check query syntax without fetching
    Validate {
        /// Search queries
        #[arg(required = true, num_args = 1..)]
        queries: Vec<String>,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one tweet per line)
    Json,
    /// Human-readable output
    Pretty,
}
