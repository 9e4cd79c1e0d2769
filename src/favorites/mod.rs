//! Favorites store collaborator.
//!
//! The stream consumer reconciles incoming results against a favorites store
//! keyed by [`UniversityKey`](crate::models::UniversityKey). The store is
//! constructed once per application lifetime and injected into the session
//! controller; its operations are atomic and idempotent from the consumer's
//! perspective.

use std::sync::Mutex;

use crate::models::University;

/// Membership and synchronization operations over favorited results.
pub trait FavoritesStore: Send + Sync {
    /// Whether a record with this identity key is currently favorited.
    fn is_favorite(&self, university: &University) -> bool;

    /// Add the record when absent, remove it when present.
    fn toggle_favorite(&self, university: &University);

    /// Replace the stored record in place when present; no-op otherwise.
    fn sync_favorite(&self, university: &University);
}

/// In-memory favorites store with insertion-ordered entries.
#[derive(Debug, Default)]
pub struct MemoryFavorites {
    entries: Mutex<Vec<University>>,
}

impl MemoryFavorites {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the stored favorites in insertion order.
    pub fn favorites(&self) -> Vec<University> {
        self.entries.lock().unwrap().clone()
    }

    /// Remove every stored favorite.
    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }

    /// Number of stored favorites.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FavoritesStore for MemoryFavorites {
    fn is_favorite(&self, university: &University) -> bool {
        let key = university.identity_key();
        self.entries
            .lock()
            .unwrap()
            .iter()
            .any(|item| item.identity_key() == key)
    }

    fn toggle_favorite(&self, university: &University) {
        let key = university.identity_key();
        let mut entries = self.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|item| item.identity_key() != key);
        if entries.len() == before {
            entries.push(university.clone());
        }
    }

    fn sync_favorite(&self, university: &University) {
        let key = university.identity_key();
        let mut entries = self.entries.lock().unwrap();
        for item in entries.iter_mut() {
            if item.identity_key() == key {
                *item = university.clone();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, summary: &str) -> University {
        University {
            id: id.to_string(),
            name: format!("大学{id}"),
            official_url: String::new(),
            faculty: "理工学部".to_string(),
            department: String::new(),
            deviation_score: String::new(),
            common_test_score: String::new(),
            exam_type: "一般選抜".to_string(),
            required_subjects: Vec::new(),
            exam_date: String::new(),
            ai_summary: summary.to_string(),
            sources: Vec::new(),
        }
    }

    #[test]
    fn test_toggle_adds_then_removes() {
        let store = MemoryFavorites::new();
        let university = record("1", "");

        store.toggle_favorite(&university);
        assert!(store.is_favorite(&university));
        assert_eq!(store.len(), 1);

        store.toggle_favorite(&university);
        assert!(!store.is_favorite(&university));
        assert!(store.is_empty());
    }

    #[test]
    fn test_toggle_preserves_insertion_order() {
        let store = MemoryFavorites::new();
        store.toggle_favorite(&record("1", ""));
        store.toggle_favorite(&record("2", ""));
        store.toggle_favorite(&record("3", ""));

        store.toggle_favorite(&record("2", ""));

        let ids: Vec<_> = store.favorites().into_iter().map(|u| u.id).collect();
        assert_eq!(ids, ["1", "3"]);
    }

    #[test]
    fn test_sync_replaces_in_place_only_when_present() {
        let store = MemoryFavorites::new();
        store.toggle_favorite(&record("1", "old"));

        store.sync_favorite(&record("1", "new"));
        assert_eq!(store.favorites()[0].ai_summary, "new");

        store.sync_favorite(&record("2", "ignored"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_double_toggle_refreshes_payload_without_changing_membership() {
        let store = MemoryFavorites::new();
        store.toggle_favorite(&record("1", "stale"));

        let fresh = record("1", "fresh");
        store.toggle_favorite(&fresh);
        store.toggle_favorite(&fresh);

        assert!(store.is_favorite(&fresh));
        assert_eq!(store.favorites()[0].ai_summary, "fresh");
    }
}
