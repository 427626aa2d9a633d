//! In-memory record cache
//!
//! The cache is the single local source of truth for the view layer.
//! It mirrors the remote table and is only ever mutated by the sync
//! controller: replaced wholesale on reconciliation, patched entry by
//! entry on confirmed writes. All operations are synchronous and touch
//! memory only.

use crate::models::Application;

/// Ordered collection of application records, unique by id
///
/// Order is `submitted_at` descending after a full load; individual
/// upserts keep existing entries in place and put unseen ids at the
/// front.
#[derive(Debug, Default)]
pub struct RecordCache {
    records: Vec<Application>,
}

impl RecordCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard all contents and replace with `records`
    pub fn replace_all(&mut self, records: Vec<Application>) {
        self.records = records;
    }

    /// Insert or overwrite the record with the same id
    ///
    /// An existing entry is overwritten in place; an unseen id is
    /// inserted at the front (newest-first, matching the create path).
    pub fn upsert(&mut self, record: Application) {
        match self.records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = record,
            None => self.records.insert(0, record),
        }
    }

    /// Remove the record with the given id, if present
    pub fn remove(&mut self, id: &str) {
        self.records.retain(|r| r.id != id);
    }

    /// Look up a record by id
    pub fn get(&self, id: &str) -> Option<&Application> {
        self.records.iter().find(|r| r.id == id)
    }

    /// All records, in cache order
    pub fn records(&self) -> &[Application] {
        &self.records
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Status;
    use chrono::{TimeZone, Utc};

    fn app(id: &str, status: Status) -> Application {
        Application {
            id: id.to_string(),
            name: format!("Candidate {}", id),
            age: 25,
            email: format!("{}@example.com", id),
            contact: "+258 84 000 0000".to_string(),
            region: "maputo".to_string(),
            photo_url: None,
            status,
            has_prior_experience: None,
            motivation: None,
            availability: None,
            submitted_at: Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_upsert_inserts_at_front() {
        let mut cache = RecordCache::new();
        cache.upsert(app("a", Status::Pending));
        cache.upsert(app("b", Status::Pending));

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.records()[0].id, "b");
        assert_eq!(cache.records()[1].id, "a");
    }

    #[test]
    fn test_upsert_overwrites_in_place() {
        let mut cache = RecordCache::new();
        cache.upsert(app("a", Status::Pending));
        cache.upsert(app("b", Status::Pending));

        cache.upsert(app("a", Status::Approved));

        assert_eq!(cache.len(), 2);
        // Position preserved, status replaced
        assert_eq!(cache.records()[1].id, "a");
        assert_eq!(cache.records()[1].status, Status::Approved);
    }

    #[test]
    fn test_no_duplicate_ids_under_repeated_upsert() {
        let mut cache = RecordCache::new();
        for _ in 0..5 {
            cache.upsert(app("a", Status::Pending));
        }
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_remove_is_noop_when_absent() {
        let mut cache = RecordCache::new();
        cache.upsert(app("a", Status::Pending));

        cache.remove("missing");
        assert_eq!(cache.len(), 1);

        cache.remove("a");
        assert!(cache.is_empty());
    }

    #[test]
    fn test_get_returns_none_for_absent_id() {
        let cache = RecordCache::new();
        assert!(cache.get("nope").is_none());
    }

    #[test]
    fn test_replace_all_discards_previous_contents() {
        let mut cache = RecordCache::new();
        cache.upsert(app("a", Status::Pending));
        cache.upsert(app("b", Status::Pending));

        cache.replace_all(vec![app("c", Status::Approved)]);

        assert_eq!(cache.len(), 1);
        assert!(cache.get("a").is_none());
        assert_eq!(cache.records()[0].id, "c");
    }
}
