//! Filtered, sorted views over the item collection.

use std::fmt;

use crate::item::{ResourceItem, ResourceStatus};

/// Status filter for the board view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StatusFilter {
    /// Show every status.
    #[default]
    All,
    /// Show a single status.
    Only(ResourceStatus),
}

impl StatusFilter {
    /// Whether an item with `status` passes this filter.
    #[must_use]
    pub fn matches(&self, status: ResourceStatus) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => *wanted == status,
        }
    }

    /// Human-facing label.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::All => "全部",
            Self::Only(status) => status.label(),
        }
    }
}

impl From<ResourceStatus> for StatusFilter {
    fn from(status: ResourceStatus) -> Self {
        Self::Only(status)
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Only(status) => fmt::Display::fmt(status, f),
        }
    }
}

/// Items matching `filter` and `query`, most recently updated first.
///
/// The query is trimmed and matched case-insensitively as a substring of
/// the item's name, description and owner; a blank query matches everything.
/// Items updated at the same instant keep their collection order.
#[must_use]
pub fn filter_items<'a>(
    items: &'a [ResourceItem],
    filter: StatusFilter,
    query: &str,
) -> Vec<&'a ResourceItem> {
    let needle = query.trim().to_lowercase();

    let mut view: Vec<&ResourceItem> = items
        .iter()
        .filter(|item| filter.matches(item.status))
        .filter(|item| needle.is_empty() || item.search_text().contains(&needle))
        .collect();

    view.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    view
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn item(id: &str, name: &str, status: ResourceStatus, minutes: i64) -> ResourceItem {
        ResourceItem {
            id: id.to_string(),
            name: name.to_string(),
            description: None,
            owner: None,
            status,
            updated_at: Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
                + Duration::minutes(minutes),
        }
    }

    fn fixture() -> Vec<ResourceItem> {
        let mut stove = item("a", "Camp Stove", ResourceStatus::Claimed, 10);
        stove.owner = Some("Alice".to_string());
        let mut tent = item("b", "Tent", ResourceStatus::Available, 30);
        tent.description = Some("Rain fly included".to_string());
        let speaker = item("c", "Speaker", ResourceStatus::Reserved, 20);
        let chairs = item("d", "Folding chairs", ResourceStatus::Available, 5);
        vec![stove, tent, speaker, chairs]
    }

    fn ids(view: &[&ResourceItem]) -> Vec<String> {
        view.iter().map(|i| i.id.clone()).collect()
    }

    #[test]
    fn test_all_returns_everything_sorted() {
        let items = fixture();
        let view = filter_items(&items, StatusFilter::All, "");

        assert_eq!(ids(&view), ["b", "c", "a", "d"]);
    }

    #[test]
    fn test_status_filter_returns_only_that_status() {
        let items = fixture();
        for status in ResourceStatus::ALL {
            let view = filter_items(&items, status.into(), "");
            assert!(view.iter().all(|i| i.status == status));
            let expected = items.iter().filter(|i| i.status == status).count();
            assert_eq!(view.len(), expected);
        }
    }

    #[test]
    fn test_query_case_insensitive_across_fields() {
        let items = fixture();

        assert_eq!(ids(&filter_items(&items, StatusFilter::All, "TENT")), ["b"]);
        assert_eq!(ids(&filter_items(&items, StatusFilter::All, "rain")), ["b"]);
        assert_eq!(ids(&filter_items(&items, StatusFilter::All, "alice")), ["a"]);
        assert!(filter_items(&items, StatusFilter::All, "projector").is_empty());
    }

    #[test]
    fn test_query_and_status_combined() {
        let items = fixture();
        let view = filter_items(&items, ResourceStatus::Available.into(), "chair");

        assert_eq!(ids(&view), ["d"]);
        assert!(filter_items(&items, ResourceStatus::Claimed.into(), "chair").is_empty());
    }

    #[test]
    fn test_blank_query_matches_all() {
        let items = fixture();
        let view = filter_items(&items, ResourceStatus::Available.into(), "   ");

        assert_eq!(ids(&view), ["b", "d"]);
    }

    #[test]
    fn test_unicode_query() {
        let items = crate::seed::default_items();
        let view = filter_items(&items, StatusFilter::All, "帐篷");

        assert_eq!(view.len(), 1);
        assert_eq!(view[0].id, "workspace-03");
    }

    #[test]
    fn test_ties_keep_collection_order() {
        let items = vec![
            item("x", "One", ResourceStatus::Available, 0),
            item("y", "Two", ResourceStatus::Available, 0),
            item("z", "Three", ResourceStatus::Available, 1),
        ];

        assert_eq!(ids(&filter_items(&items, StatusFilter::All, "")), ["z", "x", "y"]);
    }

    #[test]
    fn test_filter_labels() {
        assert_eq!(StatusFilter::All.label(), "全部");
        assert_eq!(StatusFilter::from(ResourceStatus::Reserved).label(), "已预留");
        assert_eq!(StatusFilter::All.to_string(), "all");
        assert_eq!(StatusFilter::Only(ResourceStatus::Claimed).to_string(), "claimed");
    }
}
