//! CLI module
//!
//! Command-line interface for running searches.
//!
//! # Commands
//!
//! - `search` - Stream one query
//! - `merge` - Merge several queries newest first
//! - `status` - Look up tweets by id
//! - `account` - Look up account profiles
//! - `validate` - Check query syntax

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
