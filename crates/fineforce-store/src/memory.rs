//! In-process store for tests and offline runs.
//!
//! Implements both [`ViolationStore`] and [`BlobStore`]. Individual operations
//! can be made to fail with [`MemoryStore::inject`] to exercise error paths.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use fineforce_core::{NewViolation, Violation, ViolationStatus};
use tracing::debug;

use crate::{BlobStore, StoreError, ViolationStore, object_name};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fault {
    Upload,
    Insert,
    InsertPermission,
    Update,
}

#[derive(Default)]
struct Inner {
    violations: Vec<Violation>,
    blobs: HashMap<String, Vec<u8>>,
    faults: HashSet<Fault>,
    inserts: usize,
    uploads: usize,
}

pub struct MemoryStore {
    owner: String,
    inner: Mutex<Inner>,
}

impl MemoryStore {
    /// Empty store whose uploads are namespaced under `owner`.
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            inner: Mutex::new(Inner::default()),
        }
    }

    pub fn with_violations(owner: impl Into<String>, violations: Vec<Violation>) -> Self {
        let store = Self::new(owner);
        store.lock().violations = violations;
        store
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn inject(&self, fault: Fault) {
        self.lock().faults.insert(fault);
    }

    pub fn clear_faults(&self) {
        self.lock().faults.clear();
    }

    pub fn violations(&self) -> Vec<Violation> {
        self.lock().violations.clone()
    }

    pub fn get(&self, id: &str) -> Option<Violation> {
        self.lock().violations.iter().find(|v| v.id == id).cloned()
    }

    /// Successful inserts so far.
    pub fn insert_count(&self) -> usize {
        self.lock().inserts
    }

    /// Successful uploads so far.
    pub fn upload_count(&self) -> usize {
        self.lock().uploads
    }

    pub fn blob(&self, path: &str) -> Option<Vec<u8>> {
        self.lock().blobs.get(path).cloned()
    }
}

#[async_trait]
impl ViolationStore for MemoryStore {
    async fn list(&self) -> Result<Vec<Violation>, StoreError> {
        let mut list = self.violations();
        list.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(list)
    }

    async fn insert(&self, new: NewViolation) -> Result<Violation, StoreError> {
        let mut inner = self.lock();
        if inner.faults.contains(&Fault::InsertPermission) {
            return Err(StoreError::PermissionDenied(
                "new row violates row-level security policy".into(),
            ));
        }
        if inner.faults.contains(&Fault::Insert) {
            return Err(StoreError::Server {
                status: 500,
                body: "insert failed".into(),
            });
        }
        let violation = new.into_violation(uuid::Uuid::new_v4().to_string(), Utc::now());
        debug!(violation_id = %violation.id, "stored violation in memory");
        inner.violations.push(violation.clone());
        inner.inserts += 1;
        Ok(violation)
    }

    async fn update_status(
        &self,
        id: &str,
        status: ViolationStatus,
    ) -> Result<Violation, StoreError> {
        let mut inner = self.lock();
        if inner.faults.contains(&Fault::Update) {
            return Err(StoreError::Server {
                status: 503,
                body: "update failed".into(),
            });
        }
        let v = inner
            .violations
            .iter_mut()
            .find(|v| v.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        v.status = status;
        Ok(v.clone())
    }
}

#[async_trait]
impl BlobStore for MemoryStore {
    async fn upload(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<String, StoreError> {
        let mut inner = self.lock();
        if inner.faults.contains(&Fault::Upload) {
            return Err(StoreError::Other("The resource already exists".into()));
        }
        let path = format!(
            "{}/{}",
            self.owner,
            object_name(file_name, Utc::now().timestamp_millis())
        );
        inner.blobs.insert(path.clone(), bytes);
        inner.uploads += 1;
        Ok(format!("memory://violations/{path}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fineforce_core::ViolationType;

    fn new_violation() -> NewViolation {
        NewViolation {
            vehicle_number: "MH 12 AB 1234".into(),
            violation_type: ViolationType::WrongLane,
            location: "Silk Board Junction".into(),
            image_url: "memory://x".into(),
            fine: 400,
            description: "Lane cut.".into(),
            confidence_score: fineforce_core::Confidence::new(81).unwrap(),
            contributing_factors: vec![],
        }
    }

    #[tokio::test]
    async fn insert_then_update() {
        let store = MemoryStore::new("officer-1");
        let v = store.insert(new_violation()).await.unwrap();
        assert_eq!(v.status, ViolationStatus::Pending);
        let paid = store.update_status(&v.id, ViolationStatus::Paid).await.unwrap();
        assert_eq!(paid.status, ViolationStatus::Paid);
        assert_eq!(store.get(&v.id).unwrap().status, ViolationStatus::Paid);
    }

    #[tokio::test]
    async fn update_unknown_id_is_not_found() {
        let store = MemoryStore::new("officer-1");
        let err = store
            .update_status("missing", ViolationStatus::Paid)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn uploads_are_namespaced_by_owner() {
        let store = MemoryStore::new("officer-1");
        let url = store.upload("cam 1.jpg", vec![1, 2, 3], "image/jpeg").await.unwrap();
        let path = url.trim_start_matches("memory://violations/");
        assert!(path.starts_with("officer-1/"));
        assert!(path.ends_with("-cam_1.jpg"));
        assert_eq!(store.blob(path), Some(vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn injected_faults() {
        let store = MemoryStore::new("officer-1");
        store.inject(Fault::InsertPermission);
        assert!(store.insert(new_violation()).await.unwrap_err().is_permission_denied());
        store.clear_faults();
        store.inject(Fault::Upload);
        assert!(store.upload("a.jpg", vec![], "image/jpeg").await.is_err());
        assert_eq!(store.insert_count(), 0);
        assert_eq!(store.upload_count(), 0);
    }
}
