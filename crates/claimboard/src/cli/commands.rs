//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::item::ResourceStatus;
use crate::view::StatusFilter;

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Only show items with this status
    #[arg(short, long, value_enum, default_value = "all")]
    pub status: StatusFilterArg,

    /// Case-insensitive text matched against name, description and owner
    #[arg(long)]
    pub search: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t)]
    pub format: OutputFormat,
}

/// Add command arguments.
#[derive(Debug, Args)]
pub struct AddCommand {
    /// Item name
    pub name: String,

    /// Free-text description (storage place, usage notes, ...)
    #[arg(short, long)]
    pub description: Option<String>,

    /// Person responsible for or claiming the item
    #[arg(short, long)]
    pub owner: Option<String>,

    /// Initial status
    #[arg(short, long, value_enum, default_value = "available")]
    pub status: StatusArg,
}

/// Set-status command arguments.
#[derive(Debug, Args)]
pub struct SetStatusCommand {
    /// Item id
    pub id: String,

    /// New status
    #[arg(value_enum)]
    pub status: StatusArg,
}

/// Set-owner command arguments.
#[derive(Debug, Args)]
pub struct SetOwnerCommand {
    /// Item id
    pub id: String,

    /// New owner; omit or pass an empty string to clear
    pub owner: Option<String>,
}

/// Remove command arguments.
#[derive(Debug, Args)]
pub struct RemoveCommand {
    /// Item id
    pub id: String,
}

/// Export command arguments.
#[derive(Debug, Args)]
pub struct ExportCommand {
    /// Directory to write the CSV file into
    #[arg(short, long, value_name = "DIR", conflicts_with = "stdout")]
    pub output: Option<PathBuf>,

    /// Print the CSV to stdout instead of writing a file
    #[arg(long)]
    pub stdout: bool,
}

/// Summary command arguments.
#[derive(Debug, Args)]
pub struct SummaryCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Status argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatusArg {
    /// Free to take
    Available,
    /// Held but not yet taken
    Reserved,
    /// In use by an owner
    Claimed,
}

impl From<StatusArg> for ResourceStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Available => Self::Available,
            StatusArg::Reserved => Self::Reserved,
            StatusArg::Claimed => Self::Claimed,
        }
    }
}

/// Status filter argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum StatusFilterArg {
    /// Every status
    #[default]
    All,
    /// Free to take
    Available,
    /// Held but not yet taken
    Reserved,
    /// In use by an owner
    Claimed,
}

impl From<StatusFilterArg> for StatusFilter {
    fn from(arg: StatusFilterArg) -> Self {
        match arg {
            StatusFilterArg::All => Self::All,
            StatusFilterArg::Available => Self::Only(ResourceStatus::Available),
            StatusFilterArg::Reserved => Self::Only(ResourceStatus::Reserved),
            StatusFilterArg::Claimed => Self::Only(ResourceStatus::Claimed),
        }
    }
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Tab-separated lines
    Plain,
    /// Formatted table
    #[default]
    Table,
    /// JSON output
    Json,
}
