//! The resource board: the in-memory collection and its write-through
//! persistence.
//!
//! The board owns the collection and the store it came from. Loading never
//! fails; if the stored value is missing or unusable the built-in seed set is
//! used instead. Every mutation builds the next collection and writes it under
//! the board's key; the board only adopts it once the write has succeeded.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::Result;
use crate::item::{self, NewItem, ResourceItem, ResourceStatus};
use crate::seed;
use crate::storage::{KeyValueStore, Storage};
use crate::view::{self, StatusFilter};

/// Resource collection backed by a key-value store.
#[derive(Debug)]
pub struct Board<S> {
    store: S,
    key: String,
    items: Vec<ResourceItem>,
}

impl<S: KeyValueStore> Board<S> {
    /// Load the collection stored under `key`, falling back to the seed set.
    pub fn load(store: S, key: impl Into<String>) -> Self {
        let key = key.into();
        let items = load_items(&store, &key).unwrap_or_else(seed::default_items);
        Self { store, key, items }
    }

    /// Every item in collection order (newest creations first).
    #[must_use]
    pub fn items(&self) -> &[ResourceItem] {
        &self.items
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the board has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look up an item by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ResourceItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// The storage key this board persists under.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The backing store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Filtered view, most recently updated first.
    #[must_use]
    pub fn view(&self, filter: StatusFilter, query: &str) -> Vec<&ResourceItem> {
        view::filter_items(&self.items, filter, query)
    }

    /// Item counts per status.
    #[must_use]
    pub fn summary(&self) -> BoardSummary {
        self.items
            .iter()
            .fold(BoardSummary::default(), |mut summary, item| {
                match item.status {
                    ResourceStatus::Available => summary.available += 1,
                    ResourceStatus::Reserved => summary.reserved += 1,
                    ResourceStatus::Claimed => summary.claimed += 1,
                }
                summary
            })
    }

    /// Create an item and put it at the front of the collection.
    ///
    /// Returns `None` without touching storage when the name is blank.
    ///
    /// # Errors
    ///
    /// Returns an error if the updated collection cannot be written.
    pub fn add(&mut self, new_item: NewItem) -> Result<Option<&ResourceItem>> {
        let Some(created) = new_item.into_item(self.fresh_id()) else {
            debug!("Ignoring item with blank name");
            return Ok(None);
        };

        debug!(id = %created.id, name = %created.name, "Adding item");
        let mut next = Vec::with_capacity(self.items.len() + 1);
        next.push(created);
        next.extend(self.items.iter().cloned());
        self.commit(next)?;
        Ok(self.items.first())
    }

    /// Remove an item. Returns `false` if no item has this id.
    ///
    /// # Errors
    ///
    /// Returns an error if the updated collection cannot be written.
    pub fn remove(&mut self, id: &str) -> Result<bool> {
        let Some(index) = self.position(id) else {
            debug!(id, "No item to remove");
            return Ok(false);
        };

        let mut next = self.items.clone();
        next.remove(index);
        self.commit(next)?;
        Ok(true)
    }

    /// Change an item's status. Returns `false` if no item has this id.
    ///
    /// # Errors
    ///
    /// Returns an error if the updated collection cannot be written.
    pub fn set_status(&mut self, id: &str, status: ResourceStatus) -> Result<bool> {
        self.update(id, |item| item.set_status(status))
    }

    /// Set or clear an item's owner. A blank owner clears it.
    /// Returns `false` if no item has this id.
    ///
    /// # Errors
    ///
    /// Returns an error if the updated collection cannot be written.
    pub fn set_owner(&mut self, id: &str, owner: &str) -> Result<bool> {
        self.update(id, |item| item.set_owner(owner))
    }

    /// Write the complete collection to the store.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the store write fails.
    pub fn save(&self) -> Result<()> {
        self.write(&self.items)
    }

    fn write(&self, items: &[ResourceItem]) -> Result<()> {
        let json = serde_json::to_string(items)?;
        self.store.set(&self.key, &json)
    }

    fn commit(&mut self, next: Vec<ResourceItem>) -> Result<()> {
        self.write(&next)?;
        self.items = next;
        Ok(())
    }

    fn update(&mut self, id: &str, change: impl FnOnce(&mut ResourceItem)) -> Result<bool> {
        let Some(index) = self.position(id) else {
            debug!(id, "No item to update");
            return Ok(false);
        };

        let mut next = self.items.clone();
        change(&mut next[index]);
        self.commit(next)?;
        Ok(true)
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }

    fn fresh_id(&self) -> String {
        loop {
            let id = item::generate_id();
            if self.position(&id).is_none() {
                return id;
            }
        }
    }
}

impl Board<Storage> {
    /// Open the board database at `path` and load the collection under `key`.
    ///
    /// A file that cannot be opened as a board database is treated like
    /// unreadable state: the board starts from the seed set over an in-memory
    /// store, and its changes are not persisted.
    ///
    /// # Errors
    ///
    /// Returns an error only if the in-memory store cannot be created.
    pub fn open(path: impl AsRef<Path>, key: impl Into<String>) -> Result<Self> {
        let path = path.as_ref();
        let store = match Storage::open(path) {
            Ok(store) => store,
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "Board database is unreadable, using defaults"
                );
                Storage::open_in_memory()?
            }
        };
        Ok(Self::load(store, key))
    }
}

/// Item counts per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct BoardSummary {
    /// Items free to take.
    pub available: usize,
    /// Items held but not yet taken.
    pub reserved: usize,
    /// Items in use.
    pub claimed: usize,
}

impl BoardSummary {
    /// Total number of items.
    #[must_use]
    pub fn total(&self) -> usize {
        self.available + self.reserved + self.claimed
    }

    /// Count for a single status.
    #[must_use]
    pub fn count(&self, status: ResourceStatus) -> usize {
        match status {
            ResourceStatus::Available => self.available,
            ResourceStatus::Reserved => self.reserved,
            ResourceStatus::Claimed => self.claimed,
        }
    }
}

/// Persisted record as found on disk, before normalisation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredItem {
    id: String,
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    owner: Option<String>,
    status: ResourceStatus,
    #[serde(default)]
    updated_at: Option<serde_json::Value>,
}

/// Read and normalise the stored collection; `None` means "use the seed".
fn load_items(store: &impl KeyValueStore, key: &str) -> Option<Vec<ResourceItem>> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            debug!(key, "No stored items, using defaults");
            return None;
        }
        Err(e) => {
            warn!(key, error = %e, "Failed to read stored items, using defaults");
            return None;
        }
    };

    let stored: Vec<StoredItem> = match serde_json::from_str(&raw) {
        Ok(stored) => stored,
        Err(e) => {
            warn!(key, error = %e, "Stored items are malformed, using defaults");
            return None;
        }
    };

    let loaded_at = item::now();
    let mut seen = HashSet::new();
    let mut items = Vec::with_capacity(stored.len());

    for record in stored {
        if record.name.trim().is_empty() {
            warn!(id = %record.id, "Dropping stored item with blank name");
            continue;
        }
        if !seen.insert(record.id.clone()) {
            warn!(id = %record.id, "Dropping stored item with duplicate id");
            continue;
        }

        let updated_at = record
            .updated_at
            .as_ref()
            .and_then(serde_json::Value::as_str)
            .and_then(item::timestamp::parse)
            .unwrap_or_else(|| {
                warn!(id = %record.id, "Stored item has no valid timestamp, stamping load time");
                loaded_at
            });

        items.push(ResourceItem {
            id: record.id,
            name: record.name,
            description: item::normalize_text(record.description.as_deref()),
            owner: item::normalize_text(record.owner.as_deref()),
            status: record.status,
            updated_at,
        });
    }

    debug!(key, count = items.len(), "Loaded stored items");
    Some(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use chrono::{TimeZone, Utc};

    const KEY: &str = "test-items";

    fn empty_board() -> Board<Storage> {
        let storage = Storage::open_in_memory().unwrap();
        storage.set(KEY, "[]").unwrap();
        Board::load(storage, KEY)
    }

    fn seeded_board() -> Board<Storage> {
        Board::load(Storage::open_in_memory().unwrap(), KEY)
    }

    fn stored_json(board: &Board<Storage>) -> serde_json::Value {
        let raw = board.store().get(KEY).unwrap().expect("value stored");
        serde_json::from_str(&raw).unwrap()
    }

    /// Store whose reads and writes always fail.
    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(Error::DatabaseQuery(rusqlite::Error::InvalidQuery))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(Error::DatabaseQuery(rusqlite::Error::InvalidQuery))
        }
    }

    #[test]
    fn test_load_missing_key_uses_seed() {
        let board = seeded_board();
        assert_eq!(board.items(), seed::default_items().as_slice());
        // Loading alone does not write
        assert!(board.store().get(KEY).unwrap().is_none());
    }

    #[test]
    fn test_load_malformed_uses_seed() {
        let storage = Storage::open_in_memory().unwrap();
        storage.set(KEY, "{not json").unwrap();

        let board = Board::load(storage, KEY);
        assert_eq!(board.items(), seed::default_items().as_slice());
    }

    #[test]
    fn test_load_unknown_status_uses_seed() {
        let storage = Storage::open_in_memory().unwrap();
        storage
            .set(KEY, r#"[{"id":"a","name":"Tent","status":"lost"}]"#)
            .unwrap();

        let board = Board::load(storage, KEY);
        assert_eq!(board.len(), 5);
    }

    #[test]
    fn test_load_unreadable_store_uses_seed() {
        let board = Board::load(BrokenStore, KEY);
        assert_eq!(board.items(), seed::default_items().as_slice());
    }

    #[test]
    fn test_load_empty_array_is_respected() {
        let board = empty_board();
        assert!(board.is_empty());
    }

    #[test]
    fn test_load_normalizes_records() {
        let storage = Storage::open_in_memory().unwrap();
        storage
            .set(
                KEY,
                r#"[
                    {"id":"a","name":"Tent","owner":"","description":"  ","status":"available","updatedAt":"2024-06-01T09:00:00.000Z"},
                    {"id":"a","name":"Duplicate","status":"claimed","updatedAt":"2024-06-02T09:00:00.000Z"},
                    {"id":"b","name":"   ","status":"claimed","updatedAt":"2024-06-02T09:00:00.000Z"},
                    {"id":"c","name":"Stove","status":"reserved","updatedAt":"yesterday"},
                    {"id":"d","name":"Lamp","status":"claimed"}
                ]"#,
            )
            .unwrap();

        let before = item::now();
        let board = Board::load(storage, KEY);

        let ids: Vec<_> = board.items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["a", "c", "d"]);

        let tent = board.get("a").unwrap();
        assert_eq!(tent.name, "Tent");
        assert!(tent.owner.is_none());
        assert!(tent.description.is_none());
        assert_eq!(
            tent.updated_at,
            Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap()
        );

        assert!(board.get("c").unwrap().updated_at >= before);
        assert!(board.get("d").unwrap().updated_at >= before);
    }

    #[test]
    fn test_add_prepends_with_fresh_id() {
        let mut board = seeded_board();
        let before_len = board.len();
        let before = item::now();

        let created = board
            .add(NewItem::new("Tent").status(ResourceStatus::Available))
            .unwrap()
            .cloned()
            .expect("item created");

        assert_eq!(board.len(), before_len + 1);
        assert_eq!(board.items()[0], created);
        assert_eq!(created.name, "Tent");
        assert_eq!(created.status, ResourceStatus::Available);
        assert!(created.updated_at >= before);
        assert!(created.updated_at <= item::now());
        assert_eq!(
            board.items().iter().filter(|i| i.id == created.id).count(),
            1
        );
    }

    #[test]
    fn test_add_writes_through() {
        let mut board = empty_board();
        board.add(NewItem::new("Tent").owner("Kim")).unwrap();

        let json = stored_json(&board);
        assert_eq!(json.as_array().unwrap().len(), 1);
        assert_eq!(json[0]["name"], "Tent");
        assert_eq!(json[0]["owner"], "Kim");
    }

    #[test]
    fn test_add_blank_name_is_noop() {
        let mut board = seeded_board();

        assert!(board.add(NewItem::new("")).unwrap().is_none());
        assert!(board.add(NewItem::new(" \t ")).unwrap().is_none());
        assert_eq!(board.items(), seed::default_items().as_slice());
        assert!(board.store().get(KEY).unwrap().is_none());
    }

    #[test]
    fn test_remove_existing() {
        let mut board = seeded_board();

        assert!(board.remove("workspace-03").unwrap());
        assert_eq!(board.len(), 4);
        assert!(board.get("workspace-03").is_none());
        assert_eq!(stored_json(&board).as_array().unwrap().len(), 4);
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let mut board = seeded_board();

        assert!(!board.remove("missing").unwrap());
        assert_eq!(board.items(), seed::default_items().as_slice());
    }

    #[test]
    fn test_set_status_touches_only_target() {
        let mut board = seeded_board();
        let before = board.items().to_vec();

        assert!(board.set_status("workspace-02", ResourceStatus::Claimed).unwrap());

        for (old, new) in before.iter().zip(board.items()) {
            if old.id == "workspace-02" {
                assert_eq!(new.status, ResourceStatus::Claimed);
                assert!(new.updated_at > old.updated_at);
                assert_eq!(new.name, old.name);
                assert_eq!(new.owner, old.owner);
                assert_eq!(new.description, old.description);
            } else {
                assert_eq!(new, old);
            }
        }
    }

    #[test]
    fn test_set_status_unknown_is_noop() {
        let mut board = seeded_board();

        assert!(!board.set_status("missing", ResourceStatus::Claimed).unwrap());
        assert!(board.store().get(KEY).unwrap().is_none());
    }

    #[test]
    fn test_set_owner_and_clear() {
        let mut board = seeded_board();

        assert!(board.set_owner("workspace-02", "小王").unwrap());
        assert_eq!(board.get("workspace-02").unwrap().owner.as_deref(), Some("小王"));

        assert!(board.set_owner("workspace-02", "").unwrap());
        assert!(board.get("workspace-02").unwrap().owner.is_none());
        assert!(stored_json(&board)[1].get("owner").is_none());
    }

    #[test]
    fn test_write_failure_propagates() {
        let mut board = Board::load(BrokenStore, KEY);

        assert!(board.set_status("workspace-01", ResourceStatus::Available).is_err());
        assert!(board.set_owner("workspace-01", "").is_err());
        assert!(board.add(NewItem::new("Tent")).is_err());
        assert!(board.remove("workspace-03").is_err());
    }

    #[test]
    fn test_failed_write_leaves_collection_unchanged() {
        let mut board = Board::load(BrokenStore, KEY);

        let _ = board.set_status("workspace-01", ResourceStatus::Available);
        let _ = board.set_owner("workspace-01", "");
        let _ = board.add(NewItem::new("Tent"));
        let _ = board.remove("workspace-03");

        assert_eq!(board.items(), seed::default_items().as_slice());
    }

    #[test]
    fn test_open_unreadable_database_uses_seed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("board.db");
        std::fs::write(&path, b"this is not a sqlite database. ".repeat(32)).unwrap();

        let board = Board::open(&path, KEY).unwrap();
        assert_eq!(board.items(), seed::default_items().as_slice());
        assert_eq!(board.store().path(), Path::new(":memory:"));
    }

    #[test]
    fn test_open_fresh_path_uses_seed_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("board.db");

        let mut board = Board::open(&path, KEY).unwrap();
        assert_eq!(board.len(), 5);
        board.remove("workspace-01").unwrap();

        let reopened = Board::open(&path, KEY).unwrap();
        assert_eq!(reopened.store().path(), path);
        assert_eq!(reopened.len(), 4);
        assert!(reopened.get("workspace-01").is_none());
    }

    #[test]
    fn test_persist_and_reload_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("board.db");

        let expected = {
            let mut board = Board::load(Storage::open(&path).unwrap(), KEY);
            board
                .add(
                    NewItem::new("Tom's \"big\" tent")
                        .description("line one\nline two")
                        .owner("Tom"),
                )
                .unwrap();
            board.set_status("workspace-04", ResourceStatus::Reserved).unwrap();
            board.set_owner("workspace-01", "").unwrap();
            board.items().to_vec()
        };

        let reloaded = Board::load(Storage::open(&path).unwrap(), KEY);
        assert_eq!(reloaded.items(), expected.as_slice());
    }

    #[test]
    fn test_view_delegates_to_filter() {
        let board = seeded_board();
        let view = board.view(ResourceStatus::Claimed.into(), "");

        let ids: Vec<_> = view.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["workspace-05", "workspace-01"]);
    }

    #[test]
    fn test_summary_counts() {
        let summary = seeded_board().summary();

        assert_eq!(summary.available, 2);
        assert_eq!(summary.reserved, 1);
        assert_eq!(summary.claimed, 2);
        assert_eq!(summary.total(), 5);
        assert_eq!(summary.count(ResourceStatus::Claimed), 2);
    }
}
