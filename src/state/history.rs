// src/state/history.rs
use std::fmt;
use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::HistoryEntry;
use crate::file::{KeyValueStorage, StorageError};

pub const HISTORY_KEY: &str = "analyses";

/// Past analyses in insertion order, mirrored to storage after every change.
pub struct HistoryStore {
    entries: Vec<HistoryEntry>,
    storage: Box<dyn KeyValueStorage>,
    // Stored value that did not load cleanly; copied aside before the first write
    pending_backup: Option<String>,
    // Set when the stored value could not be read at all
    unread: bool,
}

impl HistoryStore {
    /// Loads the persisted list once. Entries that fail to decode are
    /// skipped, and a missing or unreadable value starts the store empty.
    pub fn hydrate(storage: Box<dyn KeyValueStorage>) -> Self {
        let mut store = Self {
            entries: Vec::new(),
            storage,
            pending_backup: None,
            unread: false,
        };

        match store.storage.get_item(HISTORY_KEY) {
            Ok(Some(raw)) => {
                let (entries, skipped) = decode_entries(&raw);
                if skipped > 0 {
                    warn!(skipped, "Skipping unreadable history entries");
                    store.pending_backup = Some(raw);
                }
                store.entries = entries;
            }
            Ok(None) => {}
            Err(e) => {
                warn!("Failed to read history: {}", e);
                store.unread = true;
            }
        }
        info!(entries = store.entries.len(), "History loaded");

        store
    }

    /// Appends and persists. The entry stays in memory even when the write fails.
    pub fn push(&mut self, entry: HistoryEntry) -> Result<(), StorageError> {
        self.entries.push(entry);
        self.persist()
    }

    pub fn persist(&mut self) -> Result<(), StorageError> {
        if self.unread {
            // Never overwrite a value that was never seen
            self.pending_backup = self.storage.get_item(HISTORY_KEY)?;
            self.unread = false;
        }
        if let Some(raw) = &self.pending_backup {
            let key = format!("{}.bak-{}", HISTORY_KEY, Utc::now().timestamp_millis());
            self.storage.set_item(&key, raw)?;
            info!(key = %key, "Previous history kept as backup");
            self.pending_backup = None;
        }

        let raw = serde_json::to_string(&self.entries)?;
        self.storage.set_item(HISTORY_KEY, &raw)?;
        debug!(entries = self.entries.len(), bytes = raw.len(), "History saved");
        Ok(())
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Display order, most recent first, with each entry's insertion index.
    pub fn newest_first(&self) -> impl Iterator<Item = (usize, &HistoryEntry)> + '_ {
        self.entries.iter().enumerate().rev()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Returns the decodable entries and how many were skipped. A value that
/// is not a JSON array counts as one skipped entry.
fn decode_entries(raw: &str) -> (Vec<HistoryEntry>, usize) {
    let items = match serde_json::from_str::<Vec<Value>>(raw) {
        Ok(items) => items,
        Err(e) => {
            warn!("Ignoring unreadable history: {}", e);
            return (Vec::new(), 1);
        }
    };

    let total = items.len();
    let entries: Vec<HistoryEntry> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect();
    let skipped = total - entries.len();
    (entries, skipped)
}

impl fmt::Debug for HistoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HistoryStore")
            .field("entries", &self.entries.len())
            .finish()
    }
}
