//! Storage layer: auth provider, `violations` table and evidence bucket adapters.
//!
//! The workflow consumes these through the [`AuthProvider`], [`ViolationStore`]
//! and [`BlobStore`] traits; [`SupabaseClient`] talks to the hosted backend and
//! [`MemoryStore`] keeps everything in process.

mod error;
pub use error::StoreError;

pub mod memory;
pub mod record;
pub mod supabase;

pub use memory::{Fault, MemoryStore};
pub use record::ViolationRow;
pub use supabase::{Session, SignUp, SupabaseClient, SupabaseConfig};

use async_trait::async_trait;
use fineforce_core::{NewViolation, User, Violation, ViolationStatus};

#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<User, StoreError>;
    async fn sign_up(&self, signup: &SignUp) -> Result<User, StoreError>;
    async fn sign_out(&self) -> Result<(), StoreError>;
    /// The user behind the current session, if any.
    async fn current_user(&self) -> Result<Option<User>, StoreError>;
}

#[async_trait]
pub trait ViolationStore: Send + Sync {
    /// All violations, newest first.
    async fn list(&self) -> Result<Vec<Violation>, StoreError>;

    /// Insert a new violation with a fresh id, status `Pending` and the current
    /// instant. Requires an authenticated caller.
    async fn insert(&self, new: NewViolation) -> Result<Violation, StoreError>;

    /// Returns [`StoreError::NotFound`] when no row has the given id.
    async fn update_status(
        &self,
        id: &str,
        status: ViolationStatus,
    ) -> Result<Violation, StoreError>;
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Upload evidence under the caller's namespace and return its public URL.
    async fn upload(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StoreError>;
}

/// `<epoch millis>-<name with whitespace replaced by '_'>`.
pub fn object_name(file_name: &str, epoch_millis: i64) -> String {
    let cleaned: String = file_name
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect();
    format!("{epoch_millis}-{cleaned}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_name_replaces_whitespace() {
        assert_eq!(
            object_name("red light cam\t01.jpg", 1700000000000),
            "1700000000000-red_light_cam_01.jpg"
        );
    }
}
