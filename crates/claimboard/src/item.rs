//! Core item types for claimboard.
//!
//! This module defines the resource record tracked by the board, its
//! three-state status, and the input used to create new records.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// Prefix of generated item identifiers.
const ID_PREFIX: &str = "item-";

/// Claim status of a resource.
///
/// Any status may move to any other; there is no terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceStatus {
    /// Free to take.
    #[default]
    Available,
    /// Held but not yet taken.
    Reserved,
    /// In use by an owner.
    Claimed,
}

impl ResourceStatus {
    /// All statuses in display order.
    pub const ALL: [Self; 3] = [Self::Available, Self::Reserved, Self::Claimed];

    /// Stable machine name, as persisted.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Reserved => "reserved",
            Self::Claimed => "claimed",
        }
    }

    /// Human-facing label, as shown on the board and in exports.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Available => "可领取",
            Self::Reserved => "已预留",
            Self::Claimed => "已领取",
        }
    }
}

impl fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown status name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown status '{0}' (expected available, reserved or claimed)")]
pub struct ParseStatusError(String);

impl FromStr for ResourceStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "available" => Ok(Self::Available),
            "reserved" => Ok(Self::Reserved),
            "claimed" => Ok(Self::Claimed),
            _ => Err(ParseStatusError(s.to_string())),
        }
    }
}

/// A trackable physical resource.
///
/// Serializes to the persisted shape
/// `{id, name, description?, owner?, status, updatedAt}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceItem {
    /// Unique, immutable identifier.
    pub id: String,

    /// Display name; never empty.
    pub name: String,

    /// Optional free text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Person responsible for or claiming the item.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    /// Current claim status.
    pub status: ResourceStatus,

    /// Time of the last mutation to this record.
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl ResourceItem {
    /// Lower-cased text searched by the free-text filter.
    #[must_use]
    pub fn search_text(&self) -> String {
        format!(
            "{} {} {}",
            self.name,
            self.description.as_deref().unwrap_or_default(),
            self.owner.as_deref().unwrap_or_default()
        )
        .to_lowercase()
    }

    /// Set the status and refresh the timestamp.
    pub fn set_status(&mut self, status: ResourceStatus) {
        self.status = status;
        self.updated_at = now();
    }

    /// Set or clear the owner and refresh the timestamp.
    pub fn set_owner(&mut self, owner: &str) {
        self.owner = normalize_text(Some(owner));
        self.updated_at = now();
    }
}

/// Input for creating a new record.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewItem {
    /// Required name; blank names are rejected by the board.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Optional owner.
    pub owner: Option<String>,
    /// Initial status.
    pub status: ResourceStatus,
}

impl NewItem {
    /// Start a new item with the given name and `available` status.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the owner.
    #[must_use]
    pub fn owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    /// Set the initial status.
    #[must_use]
    pub fn status(mut self, status: ResourceStatus) -> Self {
        self.status = status;
        self
    }

    /// Build the record, or `None` when the name is blank.
    #[must_use]
    pub fn into_item(self, id: String) -> Option<ResourceItem> {
        let name = self.name.trim();
        if name.is_empty() {
            return None;
        }
        Some(ResourceItem {
            id,
            name: name.to_string(),
            description: normalize_text(self.description.as_deref()),
            owner: normalize_text(self.owner.as_deref()),
            status: self.status,
            updated_at: now(),
        })
    }
}

/// Generate a fresh item identifier.
#[must_use]
pub fn generate_id() -> String {
    format!("{ID_PREFIX}{}", uuid::Uuid::new_v4())
}

/// Current time at the precision used on disk.
///
/// Truncating here keeps a persisted and reloaded record equal to the
/// in-memory one.
#[must_use]
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Trim optional text, mapping blank values to `None`.
#[must_use]
pub fn normalize_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// RFC 3339 UTC timestamps with millisecond precision, e.g.
/// `2024-06-01T09:00:00.000Z`.
pub mod timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    /// Format a timestamp the way it is persisted.
    #[must_use]
    pub fn format(value: &DateTime<Utc>) -> String {
        value.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Parse a persisted timestamp. Any RFC 3339 offset is accepted.
    #[must_use]
    pub fn parse(value: &str) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(value.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Serialize with [`format`].
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(value))
    }

    /// Deserialize with [`parse`].
    ///
    /// # Errors
    ///
    /// Fails on strings that are not RFC 3339 timestamps.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
    }
}
