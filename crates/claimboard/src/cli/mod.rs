//! Command-line interface for claimboard.
//!
//! This module provides the CLI structure for the `claimboard` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AddCommand, ConfigCommand, ExportCommand, ListCommand, OutputFormat, RemoveCommand,
    SetOwnerCommand, SetStatusCommand, StatusArg, StatusFilterArg, SummaryCommand,
};

/// claimboard - Track who has the shared gear
///
/// Keeps a list of shared physical resources (camping gear, event equipment)
/// with their status and owner, and exports it to CSV.
#[derive(Debug, Parser)]
#[command(name = "claimboard")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List items, newest update first
    List(ListCommand),

    /// Add an item
    Add(AddCommand),

    /// Change an item's status
    SetStatus(SetStatusCommand),

    /// Set or clear an item's owner
    SetOwner(SetOwnerCommand),

    /// Remove an item
    Remove(RemoveCommand),

    /// Export every item to CSV
    Export(ExportCommand),

    /// Show counts per status and storage details
    Summary(SummaryCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}
