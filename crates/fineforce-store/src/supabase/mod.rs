//! HTTP client for a Supabase-style backend: GoTrue auth, PostgREST rows and
//! the storage object API.

mod auth;
mod rest;
mod storage;

pub use auth::SignUp;

use std::sync::{Mutex, PoisonError};

use fineforce_core::User;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::StoreError;

pub const DEFAULT_BUCKET: &str = "violations";
/// Access tokens this close to expiry are refreshed before use.
pub const EXPIRY_MARGIN_SECS: i64 = 60;
pub(crate) const TABLE: &str = "violations";

#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    /// Project URL like `https://xyz.supabase.co` (no trailing slash needed).
    pub url: String,
    pub anon_key: String,
    pub bucket: String,
}

impl SupabaseConfig {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            anon_key: anon_key.into(),
            bucket: DEFAULT_BUCKET.to_string(),
        }
    }
}

/// An authenticated session. Serialisable so front ends can persist it
/// between runs and hand it back with [`SupabaseClient::restore_session`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Unix seconds.
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: User,
}

impl Session {
    /// True once `now` (unix seconds) is within [`EXPIRY_MARGIN_SECS`] of
    /// `expires_at`. Sessions without an expiry never expire locally.
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expires_at.is_some_and(|at| now >= at - EXPIRY_MARGIN_SECS)
    }
}

/// Stateful client: holds the current session and attaches its token to
/// every request, falling back to the anon key.
pub struct SupabaseClient {
    client: reqwest::Client,
    base_url: String,
    anon_key: String,
    bucket: String,
    session: Mutex<Option<Session>>,
}

impl SupabaseClient {
    pub fn new(config: SupabaseConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key,
            bucket: config.bucket,
            session: Mutex::new(None),
        }
    }

    pub fn session(&self) -> Option<Session> {
        self.session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn restore_session(&self, session: Option<Session>) {
        *self.session.lock().unwrap_or_else(PoisonError::into_inner) = session;
    }

    fn bearer(&self) -> String {
        let token = self
            .session()
            .map(|s| s.access_token)
            .unwrap_or_else(|| self.anon_key.clone());
        format!("Bearer {token}")
    }

    fn require_session(&self, action: &str) -> Result<Session, StoreError> {
        self.session().ok_or_else(|| {
            StoreError::NotAuthenticated(format!("user must be logged in to {action}"))
        })
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", &self.anon_key)
            .header(reqwest::header::AUTHORIZATION, self.bearer())
    }

    /// Request carrying only the anon key, for token grants.
    fn anon_request(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .post(url)
            .header("apikey", &self.anon_key)
            .header(reqwest::header::AUTHORIZATION, format!("Bearer {}", self.anon_key))
    }
}

/// Fail with [`StoreError::Server`] on a non-success status, keeping the body.
pub(crate) async fn check(resp: reqwest::Response) -> Result<reqwest::Response, StoreError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(StoreError::Server {
        status: status.as_u16(),
        body,
    })
}

/// Pull a human-readable message out of a GoTrue/PostgREST/storage error body.
pub(crate) fn error_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return body.trim().to_string();
    };
    ["msg", "message", "error_description", "error"]
        .iter()
        .find_map(|k| value.get(k).and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| body.trim().to_string())
}

/// Row-level-security and grant failures surface as 401/403, SQLSTATE 42501,
/// or a "permission denied" message depending on the layer that rejected them.
pub(crate) fn is_permission_denied(status: u16, body: &str) -> bool {
    if status == 401 || status == 403 {
        return true;
    }
    let code = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("code").and_then(Value::as_str).map(str::to_string));
    code.as_deref() == Some("42501") || body.to_ascii_lowercase().contains("permission denied")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_trims_trailing_slash() {
        let client = SupabaseClient::new(SupabaseConfig::new("https://abc.supabase.co/", "anon"));
        assert_eq!(client.base_url, "https://abc.supabase.co");
        assert_eq!(client.bucket, DEFAULT_BUCKET);
    }

    #[test]
    fn bearer_falls_back_to_anon_key() {
        let client = SupabaseClient::new(SupabaseConfig::new("https://abc.supabase.co", "anon"));
        assert_eq!(client.bearer(), "Bearer anon");
        client.restore_session(Some(Session {
            access_token: "jwt".into(),
            refresh_token: None,
            expires_at: None,
            user: User::from_parts("u1".into(), None, None, None),
        }));
        assert_eq!(client.bearer(), "Bearer jwt");
        client.restore_session(None);
        assert!(client.require_session("upload").is_err());
    }

    #[test]
    fn error_message_variants() {
        assert_eq!(
            error_message(
                r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#
            ),
            "Invalid login credentials"
        );
        assert_eq!(
            error_message(r#"{"code":400,"msg":"User already registered"}"#),
            "User already registered"
        );
        assert_eq!(error_message("gateway timeout"), "gateway timeout");
    }

    #[test]
    fn permission_denied_detection() {
        assert!(is_permission_denied(
            400,
            r#"{"code":"42501","message":"new row violates row-level security policy for table \"violations\""}"#
        ));
        assert!(is_permission_denied(403, "{}"));
        assert!(is_permission_denied(
            400,
            r#"{"message":"permission denied for table violations"}"#
        ));
        assert!(!is_permission_denied(
            400,
            r#"{"code":"23502","message":"null value in column"}"#
        ));
    }
}
