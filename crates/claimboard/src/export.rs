//! CSV export of the full item collection.
//!
//! Every field, header included, is double-quoted. Embedded quotes are
//! doubled and line breaks are flattened to spaces, so each record occupies
//! exactly one line.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use tracing::info;

use crate::config::{Config, DEFAULT_FILE_PREFIX, DEFAULT_TIMESTAMP_FORMAT};
use crate::error::{Error, Result};
use crate::item::{self, ResourceItem};

/// Column headers: name, status, owner, description, updated at.
pub const CSV_HEADER: [&str; 5] = ["名称", "状态", "领取人", "说明", "更新时间"];

/// Renders items as CSV.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExporter {
    timestamp_format: String,
    offset: FixedOffset,
    file_prefix: String,
}

impl Default for CsvExporter {
    fn default() -> Self {
        Self {
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
            offset: Utc.fix(),
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
        }
    }
}

impl CsvExporter {
    /// Exporter using the display and naming settings from `config`.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            timestamp_format: config.export.timestamp_format.clone(),
            offset: config.display_offset(),
            file_prefix: config.export.file_prefix.clone(),
        }
    }

    /// Render timestamps in a different offset.
    #[must_use]
    pub fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = offset;
        self
    }

    /// Render timestamps with a different strftime pattern.
    #[must_use]
    pub fn with_timestamp_format(mut self, format: impl Into<String>) -> Self {
        self.timestamp_format = format.into();
        self
    }

    /// Human-readable timestamp in the configured offset and pattern.
    ///
    /// Falls back to RFC 3339 when the pattern cannot be rendered.
    #[must_use]
    pub fn format_timestamp(&self, value: &DateTime<Utc>) -> String {
        let local = value.with_timezone(&self.offset);
        let mut out = String::new();
        if write!(out, "{}", local.format(&self.timestamp_format)).is_err() {
            return item::timestamp::format(value);
        }
        out
    }

    /// Render the header and one row per item, joined with `\n`.
    #[must_use]
    pub fn render(&self, items: &[ResourceItem]) -> String {
        let mut lines = Vec::with_capacity(items.len() + 1);
        lines.push(csv_line(CSV_HEADER));

        for item in items {
            let updated = self.format_timestamp(&item.updated_at);
            lines.push(csv_line([
                item.name.as_str(),
                item.status.label(),
                item.owner.as_deref().unwrap_or_default(),
                item.description.as_deref().unwrap_or_default(),
                updated.as_str(),
            ]));
        }

        lines.join("\n")
    }

    /// Export file name for `date`, e.g. `物资领取状态-2024-06-01.csv`.
    #[must_use]
    pub fn file_name(&self, date: NaiveDate) -> String {
        format!("{}-{}.csv", self.file_prefix, date.format("%Y-%m-%d"))
    }

    /// Render `items` and write them into `dir` under today's (UTC) file name.
    ///
    /// Creates `dir` if needed and returns the written path.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn write_to_dir(&self, dir: &Path, items: &[ResourceItem]) -> Result<PathBuf> {
        if !dir.exists() {
            std::fs::create_dir_all(dir).map_err(|source| Error::DirectoryCreate {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        let path = dir.join(self.file_name(Utc::now().date_naive()));
        std::fs::write(&path, self.render(items)).map_err(|source| Error::ExportWrite {
            path: path.clone(),
            source,
        })?;

        info!(path = %path.display(), count = items.len(), "Exported items");
        Ok(path)
    }
}

/// Quote one field.
#[must_use]
pub fn escape_field(value: &str) -> String {
    let flattened = value.replace('"', "\"\"").replace(['\r', '\n'], " ");
    format!("\"{flattened}\"")
}

fn csv_line<'a>(fields: impl IntoIterator<Item = &'a str>) -> String {
    fields
        .into_iter()
        .map(escape_field)
        .collect::<Vec<_>>()
        .join(",")
}
