//! `claimboard` - A status board for shared physical resources
//!
//! This library tracks resources (camping gear, event equipment) through
//! three claim states, keeps the collection in a local key-value store, and
//! exports it to CSV.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod board;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod item;
pub mod logging;
pub mod seed;
pub mod storage;
pub mod view;

pub use board::{Board, BoardSummary};
pub use config::Config;
pub use error::{Error, Result};
pub use export::CsvExporter;
pub use item::{NewItem, ResourceItem, ResourceStatus};
pub use logging::init_logging;
pub use storage::{KeyValueStore, Storage, StorageStats};
pub use view::StatusFilter;
