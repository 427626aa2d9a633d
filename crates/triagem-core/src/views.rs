//! Derived views over the record cache
//!
//! Pure functions recomputed from current cache contents on every
//! call. Nothing here mutates state or performs I/O.

use serde::Serialize;

use crate::models::{Application, Status};

/// Filter criteria for the application list
///
/// All three predicates are conjunctive: a record must match the
/// search text AND the status filter AND the region filter.
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    /// Case-insensitive substring matched against name or email.
    /// Empty matches everything.
    pub search: String,
    /// Status to match, or `None` for all
    pub status: Option<Status>,
    /// Region code to match, or `None` for all
    pub region: Option<String>,
}

impl RecordFilter {
    fn matches(&self, app: &Application) -> bool {
        let search = self.search.to_lowercase();
        let matches_search = search.is_empty()
            || app.name.to_lowercase().contains(&search)
            || app.email.to_lowercase().contains(&search);
        let matches_status = self.status.map_or(true, |s| app.status == s);
        let matches_region = self
            .region
            .as_deref()
            .map_or(true, |r| app.region == r);

        matches_search && matches_status && matches_region
    }
}

/// Aggregate statistics over the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub total: usize,
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
    /// Percentage of approved over total, rounded; 0 when empty
    pub approval_rate: u32,
}

/// Records matching the filter, in cache order
pub fn filter_records<'a>(records: &'a [Application], filter: &RecordFilter) -> Vec<&'a Application> {
    records.iter().filter(|app| filter.matches(app)).collect()
}

/// Compute aggregate statistics
pub fn compute_stats(records: &[Application]) -> Stats {
    let total = records.len();
    let pending = records.iter().filter(|a| a.status == Status::Pending).count();
    let approved = records.iter().filter(|a| a.status == Status::Approved).count();
    let rejected = records.iter().filter(|a| a.status == Status::Rejected).count();

    let approval_rate = if total > 0 {
        (approved as f64 / total as f64 * 100.0).round() as u32
    } else {
        0
    };

    Stats {
        total,
        pending,
        approved,
        rejected,
        approval_rate,
    }
}

/// Top `n` records by `submitted_at` descending
///
/// Ties break by id ascending so the output is deterministic when
/// timestamps collide.
pub fn most_recent(records: &[Application], n: usize) -> Vec<&Application> {
    let mut sorted: Vec<&Application> = records.iter().collect();
    sorted.sort_by(|a, b| {
        b.submitted_at
            .cmp(&a.submitted_at)
            .then_with(|| a.id.cmp(&b.id))
    });
    sorted.truncate(n);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, day, 12, 0, 0).unwrap()
    }

    fn app(id: &str, name: &str, status: Status, region: &str, day: u32) -> Application {
        Application {
            id: id.to_string(),
            name: name.to_string(),
            age: 25,
            email: format!("{}@example.com", id),
            contact: "+258 84 000 0000".to_string(),
            region: region.to_string(),
            photo_url: None,
            status,
            has_prior_experience: None,
            motivation: None,
            availability: None,
            submitted_at: at(day),
            updated_at: at(day),
        }
    }

    #[test]
    fn test_identity_filter_returns_everything() {
        let records = vec![
            app("a", "Ana Silva", Status::Pending, "sofala", 1),
            app("b", "Maria", Status::Approved, "gaza", 2),
        ];
        let filtered = filter_records(&records, &RecordFilter::default());
        assert_eq!(filtered.len(), records.len());
    }

    #[test]
    fn test_search_is_case_insensitive_on_name() {
        let records = vec![
            app("a", "Ana Silva", Status::Pending, "sofala", 1),
            app("b", "Maria", Status::Pending, "gaza", 2),
        ];
        let filter = RecordFilter {
            search: "ana".to_string(),
            ..Default::default()
        };
        let filtered = filter_records(&records, &filter);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].name, "Ana Silva");
    }

    #[test]
    fn test_search_matches_email_too() {
        let records = vec![app("a", "Ana", Status::Pending, "sofala", 1)];
        let filter = RecordFilter {
            search: "A@EXAMPLE".to_string(),
            ..Default::default()
        };
        assert_eq!(filter_records(&records, &filter).len(), 1);
    }

    #[test]
    fn test_predicates_are_conjunctive() {
        let records = vec![
            app("a", "Ana", Status::Pending, "sofala", 1),
            app("b", "Ana", Status::Approved, "sofala", 2),
            app("c", "Ana", Status::Pending, "gaza", 3),
        ];
        let filter = RecordFilter {
            search: "ana".to_string(),
            status: Some(Status::Pending),
            region: Some("sofala".to_string()),
        };
        let filtered = filter_records(&records, &filter);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, "a");
    }

    #[test]
    fn test_stats_partition_the_total() {
        let records = vec![
            app("a", "Ana", Status::Pending, "sofala", 1),
            app("b", "Bia", Status::Approved, "gaza", 2),
            app("c", "Carla", Status::Rejected, "tete", 3),
            app("d", "Dina", Status::Approved, "tete", 4),
        ];
        let stats = compute_stats(&records);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.pending + stats.approved + stats.rejected, stats.total);
        assert_eq!(stats.approval_rate, 50);
    }

    #[test]
    fn test_stats_empty_cache_has_zero_approval_rate() {
        let stats = compute_stats(&[]);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.approval_rate, 0);
    }

    #[test]
    fn test_approval_rate_rounds() {
        let records = vec![
            app("a", "Ana", Status::Approved, "sofala", 1),
            app("b", "Bia", Status::Pending, "gaza", 2),
            app("c", "Carla", Status::Pending, "tete", 3),
        ];
        // 1/3 = 33.33.. rounds to 33
        assert_eq!(compute_stats(&records).approval_rate, 33);
    }

    #[test]
    fn test_most_recent_orders_by_submission_desc() {
        let records = vec![
            app("a", "Ana", Status::Pending, "sofala", 1),
            app("c", "Carla", Status::Pending, "tete", 3),
            app("b", "Bia", Status::Pending, "gaza", 2),
        ];
        let recent = most_recent(&records, 2);
        assert_eq!(recent[0].id, "c");
        assert_eq!(recent[1].id, "b");
    }

    #[test]
    fn test_most_recent_breaks_ties_by_id() {
        let records = vec![
            app("b", "Bia", Status::Pending, "gaza", 1),
            app("a", "Ana", Status::Pending, "sofala", 1),
        ];
        let recent = most_recent(&records, 2);
        assert_eq!(recent[0].id, "a");
        assert_eq!(recent[1].id, "b");
    }
}
