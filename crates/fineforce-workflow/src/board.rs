//! Root state: the signed-in officer and the in-memory violation list.

use std::sync::Arc;

use chrono::NaiveDate;
use fineforce_core::{
    DashboardMetrics, NewViolation, User, Violation, ViolationFilter, ViolationStatus,
};
use fineforce_store::{StoreError, ViolationStore};
use tracing::{info, warn};

/// Holds the violation list the pages render, and is the only path through
/// which they mutate it.
pub struct ViolationBoard {
    user: User,
    store: Arc<dyn ViolationStore>,
    violations: Vec<Violation>,
}

impl ViolationBoard {
    pub fn new(user: User, store: Arc<dyn ViolationStore>) -> Self {
        Self {
            user,
            store,
            violations: Vec::new(),
        }
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    /// Newest first.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn get(&self, id: &str) -> Option<&Violation> {
        self.violations.iter().find(|v| v.id == id)
    }

    /// Reload the list from the store. Returns the number of records.
    pub async fn refresh(&mut self) -> Result<usize, StoreError> {
        let mut list = self.store.list().await?;
        list.sort_by(|a, b| b.date.cmp(&a.date));
        info!(count = list.len(), "violations loaded");
        self.violations = list;
        Ok(self.violations.len())
    }

    /// Insert through the store and prepend the stored record.
    pub async fn add(&mut self, new: NewViolation) -> Result<Violation, StoreError> {
        let violation = self.store.insert(new).await?;
        info!(
            violation_id = %violation.id,
            officer = %self.user.officer_id,
            "violation added"
        );
        self.violations.insert(0, violation.clone());
        Ok(violation)
    }

    /// Update remotely, then replace the matching entry. An id the store does
    /// not know surfaces as [`StoreError::NotFound`].
    pub async fn update_status(
        &mut self,
        id: &str,
        status: ViolationStatus,
    ) -> Result<Violation, StoreError> {
        let updated = self.store.update_status(id, status).await?;
        match self.violations.iter_mut().find(|v| v.id == updated.id) {
            Some(slot) => *slot = updated.clone(),
            None => warn!(violation_id = %id, "updated violation was not in the loaded list"),
        }
        info!(violation_id = %id, status = %status, "violation status updated");
        Ok(updated)
    }

    pub fn filtered(&self, filter: &ViolationFilter) -> Vec<&Violation> {
        filter.apply(&self.violations)
    }

    pub fn metrics(&self, today: NaiveDate) -> DashboardMetrics {
        DashboardMetrics::compute(&self.violations, today)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use fineforce_core::ViolationType;
    use fineforce_store::MemoryStore;

    fn officer() -> User {
        User::from_parts(
            "u-1".into(),
            Some("asha@traffic.gov.in".into()),
            Some("Asha".into()),
            Some("KA-0421".into()),
        )
    }

    fn record(id: &str, day: u32) -> Violation {
        Violation {
            id: id.into(),
            vehicle_number: format!("KA 05 {id}"),
            violation_type: ViolationType::NoParking,
            date: Utc.with_ymd_and_hms(2026, 4, day, 10, 0, 0).unwrap(),
            location: "Church Street".into(),
            status: ViolationStatus::Pending,
            image_url: String::new(),
            fine: 300,
            description: String::new(),
            confidence_score: fineforce_core::Confidence::new(90).unwrap(),
            contributing_factors: vec![],
        }
    }

    #[tokio::test]
    async fn refresh_orders_newest_first() {
        let store = Arc::new(MemoryStore::with_violations(
            "u-1",
            vec![record("A", 1), record("C", 3), record("B", 2)],
        ));
        let mut board = ViolationBoard::new(officer(), store);
        assert_eq!(board.refresh().await.unwrap(), 3);
        let ids: Vec<&str> = board.violations().iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, ["C", "B", "A"]);
    }

    #[tokio::test]
    async fn add_prepends() {
        let store = Arc::new(MemoryStore::with_violations("u-1", vec![record("A", 1)]));
        let mut board = ViolationBoard::new(officer(), store.clone());
        board.refresh().await.unwrap();
        let new = NewViolation {
            vehicle_number: "KA 01 Z 1".into(),
            violation_type: ViolationType::RedLight,
            location: "Hebbal".into(),
            image_url: "memory://x".into(),
            fine: 1000,
            description: "Jumped the signal.".into(),
            confidence_score: fineforce_core::Confidence::new(93).unwrap(),
            contributing_factors: vec![],
        };
        let saved = board.add(new).await.unwrap();
        assert_eq!(board.violations()[0].id, saved.id);
        assert_eq!(saved.status, ViolationStatus::Pending);
        assert_eq!(store.insert_count(), 1);
    }

    #[tokio::test]
    async fn update_replaces_entry_and_reports_unknown_ids() {
        let store = Arc::new(MemoryStore::with_violations("u-1", vec![record("A", 1)]));
        let mut board = ViolationBoard::new(officer(), store);
        board.refresh().await.unwrap();

        board.update_status("A", ViolationStatus::Paid).await.unwrap();
        assert_eq!(board.get("A").unwrap().status, ViolationStatus::Paid);

        let err = board.update_status("nope", ViolationStatus::Paid).await.unwrap_err();
        assert!(err.is_not_found());
    }
}
