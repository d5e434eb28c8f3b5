use async_trait::async_trait;
use chrono::Utc;
use fineforce_core::{NewViolation, Violation, ViolationStatus};
use serde_json::json;
use tracing::{info, warn};

use super::{SupabaseClient, TABLE, check, error_message, is_permission_denied};
use crate::{StoreError, ViolationRow, ViolationStore};

impl SupabaseClient {
    fn table_url(&self) -> String {
        format!("{}/rest/v1/{TABLE}", self.base_url)
    }
}

/// Re-classify a PostgREST failure into permission-denied where it applies.
fn classify(err: StoreError) -> StoreError {
    match err {
        StoreError::Server { status, body } if is_permission_denied(status, &body) => {
            StoreError::PermissionDenied(error_message(&body))
        }
        other => other,
    }
}

#[async_trait]
impl ViolationStore for SupabaseClient {
    async fn list(&self) -> Result<Vec<Violation>, StoreError> {
        let url = self.table_url();
        info!(url = %url, "fetching violations");
        let resp = self
            .request(reqwest::Method::GET, &url)
            .query(&[("select", "*"), ("order", "date.desc")])
            .send()
            .await?;
        let resp = check(resp).await.map_err(classify)?;
        let rows: Vec<ViolationRow> = resp.json().await?;
        info!(count = rows.len(), "fetched violations");
        Ok(rows.into_iter().map(Violation::from).collect())
    }

    async fn insert(&self, new: NewViolation) -> Result<Violation, StoreError> {
        let session = self.require_session("create a violation")?;
        // Ids are generated here; the table has no default for `id`.
        let violation = new.into_violation(uuid::Uuid::new_v4().to_string(), Utc::now());
        let row = ViolationRow::from_violation(&violation, Some(session.user.id));

        let url = self.table_url();
        info!(violation_id = %violation.id, "inserting violation");
        let resp = self
            .request(reqwest::Method::POST, &url)
            .header("Prefer", "return=representation")
            .json(&row)
            .send()
            .await?;
        let resp = check(resp).await.map_err(|e| {
            let e = classify(e);
            warn!(error = %e, "insert rejected");
            e
        })?;
        let rows: Vec<ViolationRow> = resp.json().await?;
        let saved = rows.into_iter().next().ok_or(StoreError::MissingRecord)?;
        Ok(saved.into())
    }

    async fn update_status(
        &self,
        id: &str,
        status: ViolationStatus,
    ) -> Result<Violation, StoreError> {
        let url = self.table_url();
        info!(violation_id = %id, status = %status, "updating violation status");
        let resp = self
            .request(reqwest::Method::PATCH, &url)
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=representation")
            .json(&json!({ "status": status }))
            .send()
            .await?;
        let resp = check(resp).await.map_err(classify)?;
        let rows: Vec<ViolationRow> = resp.json().await?;
        rows.into_iter()
            .next()
            .map(Violation::from)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SupabaseConfig;

    #[test]
    fn classify_maps_rls_rejection() {
        let err = classify(StoreError::Server {
            status: 401,
            body: r#"{"code":"42501","message":"new row violates row-level security policy"}"#.into(),
        });
        assert!(err.is_permission_denied());
        assert!(err.to_string().contains("row-level security"));
    }

    #[test]
    fn classify_keeps_other_failures() {
        let err = classify(StoreError::Server {
            status: 500,
            body: "boom".into(),
        });
        assert!(matches!(err, StoreError::Server { status: 500, .. }));
    }

    #[tokio::test]
    async fn insert_without_session_is_rejected_locally() {
        let client = SupabaseClient::new(SupabaseConfig::new("http://127.0.0.1:9", "anon"));
        let new = NewViolation {
            vehicle_number: "x".into(),
            violation_type: fineforce_core::ViolationType::Speeding,
            location: "x".into(),
            image_url: "x".into(),
            fine: 500,
            description: "x".into(),
            confidence_score: fineforce_core::Confidence::new(50).unwrap(),
            contributing_factors: vec![],
        };
        let err = client.insert(new).await.unwrap_err();
        assert!(matches!(err, StoreError::NotAuthenticated(_)));
    }

    #[test]
    fn table_url_targets_rest_endpoint() {
        let client = SupabaseClient::new(SupabaseConfig::new("https://abc.supabase.co", "anon"));
        assert_eq!(client.table_url(), "https://abc.supabase.co/rest/v1/violations");
    }
}
