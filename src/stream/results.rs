//! Ordered, de-duplicated accumulation of streamed results.

use std::collections::HashSet;

use crate::favorites::FavoritesStore;
use crate::models::{demo_universities, University, UniversityKey};

/// Collects result records in arrival order, deduplicating on the
/// (id, faculty, examType) identity key and keeping the favorites store in
/// step with refreshed payloads.
#[derive(Debug, Default)]
pub struct ResultAccumulator {
    records: Vec<University>,
    seen: HashSet<UniversityKey>,
    expected_total: Option<u64>,
}

impl ResultAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one streamed record.
    ///
    /// Returns `true` when the record was appended, `false` when it
    /// deduplicated against an earlier arrival. A duplicate's fresher payload
    /// is forwarded to the favorites store so a favorited copy of the row
    /// stays current; the visible list keeps its original entry and order.
    pub fn insert(&mut self, university: University, favorites: &dyn FavoritesStore) -> bool {
        let key = university.identity_key();

        if self.seen.contains(&key) {
            if favorites.is_favorite(&university) {
                favorites.sync_favorite(&university);
            }
            return false;
        }

        if favorites.is_favorite(&university) {
            // Membership exists before the record was ever displayed this
            // session: left over from a previous one. Toggling twice swaps
            // the stored payload for the fresh one without changing
            // membership.
            favorites.toggle_favorite(&university);
            favorites.toggle_favorite(&university);
        }

        self.seen.insert(key);
        self.records.push(university);
        true
    }

    /// Update the estimated final result count. Last write wins; the backend
    /// refines its estimate as the stream goes. A zero clears the estimate.
    pub fn set_expected_total(&mut self, total: Option<u64>) {
        if let Some(total) = total {
            self.expected_total = (total > 0).then_some(total);
        }
    }

    pub fn expected_total(&self) -> Option<u64> {
        self.expected_total
    }

    /// Accumulated records in arrival order.
    pub fn records(&self) -> &[University] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Replace the collection with the fixed demonstration dataset.
    pub fn load_demo_data(&mut self) {
        self.records = demo_universities();
        self.seen = self.records.iter().map(University::identity_key).collect();
    }
}
