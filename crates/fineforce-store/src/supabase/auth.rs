use async_trait::async_trait;
use chrono::Utc;
use fineforce_core::User;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, warn};

use super::{Session, SupabaseClient, check, error_message};
use crate::{AuthProvider, StoreError};

/// Signup form fields; `name` and `officer_id` are stored as user metadata.
#[derive(Debug, Clone)]
pub struct SignUp {
    pub name: String,
    pub email: String,
    pub officer_id: String,
    pub password: String,
}

#[derive(Deserialize)]
struct AuthUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user_metadata: UserMetadata,
}

#[derive(Deserialize, Default)]
struct UserMetadata {
    #[serde(default)]
    name: Option<String>,
    #[serde(default, rename = "officerId")]
    officer_id: Option<String>,
}

impl From<AuthUser> for User {
    fn from(u: AuthUser) -> Self {
        User::from_parts(u.id, u.email, u.user_metadata.name, u.user_metadata.officer_id)
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: AuthUser,
}

impl From<TokenResponse> for Session {
    fn from(t: TokenResponse) -> Self {
        Session {
            access_token: t.access_token,
            refresh_token: t.refresh_token,
            expires_at: t.expires_at,
            user: t.user.into(),
        }
    }
}

/// Signup returns a full session when email confirmation is off, and just the
/// user object when a confirmation mail is pending.
fn parse_signup(value: Value) -> Result<(User, Option<Session>), StoreError> {
    if value.get("access_token").is_some() {
        let session: Session = serde_json::from_value::<TokenResponse>(value)?.into();
        Ok((session.user.clone(), Some(session)))
    } else {
        let user: AuthUser = serde_json::from_value(value)?;
        Ok((user.into(), None))
    }
}

impl SupabaseClient {
    /// Trade the refresh token for a new session. A missing or rejected
    /// refresh token ends the session and yields `Ok(None)`; transport
    /// errors leave the session in place.
    pub async fn refresh_session(&self) -> Result<Option<User>, StoreError> {
        let Some(refresh_token) = self.session().and_then(|s| s.refresh_token) else {
            info!("session expired without a refresh token");
            self.restore_session(None);
            return Ok(None);
        };
        let url = format!("{}/auth/v1/token?grant_type=refresh_token", self.base_url);
        info!("refreshing session");
        let resp = self
            .anon_request(&url)
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .await?;
        let resp = match Self::auth_failure(resp).await {
            Ok(resp) => resp,
            Err(StoreError::Auth(reason)) => {
                warn!(reason = %reason, "session refresh rejected");
                self.restore_session(None);
                return Ok(None);
            }
            Err(e) => return Err(e),
        };
        let session: Session = resp.json::<TokenResponse>().await?.into();
        let user = session.user.clone();
        self.restore_session(Some(session));
        Ok(Some(user))
    }

    async fn auth_failure(resp: reqwest::Response) -> Result<reqwest::Response, StoreError> {
        match check(resp).await {
            Err(StoreError::Server { body, .. }) => Err(StoreError::Auth(error_message(&body))),
            other => other,
        }
    }
}

#[async_trait]
impl AuthProvider for SupabaseClient {
    async fn sign_in(&self, email: &str, password: &str) -> Result<User, StoreError> {
        let url = format!("{}/auth/v1/token?grant_type=password", self.base_url);
        info!(email = %email, "signing in");
        let resp = self
            .request(reqwest::Method::POST, &url)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        let resp = Self::auth_failure(resp).await?;
        let session: Session = resp.json::<TokenResponse>().await?.into();
        let user = session.user.clone();
        self.restore_session(Some(session));
        info!(user_id = %user.id, "signed in");
        Ok(user)
    }

    async fn sign_up(&self, signup: &SignUp) -> Result<User, StoreError> {
        let url = format!("{}/auth/v1/signup", self.base_url);
        info!(email = %signup.email, officer_id = %signup.officer_id, "creating account");
        let resp = self
            .request(reqwest::Method::POST, &url)
            .json(&json!({
                "email": signup.email,
                "password": signup.password,
                "data": { "name": signup.name, "officerId": signup.officer_id },
            }))
            .send()
            .await?;
        let resp = Self::auth_failure(resp).await?;
        let (user, session) = parse_signup(resp.json().await?)?;
        if session.is_some() {
            self.restore_session(session);
        }
        Ok(user)
    }

    async fn sign_out(&self) -> Result<(), StoreError> {
        if self.session().is_none() {
            return Ok(());
        }
        let url = format!("{}/auth/v1/logout", self.base_url);
        let resp = self.request(reqwest::Method::POST, &url).send().await;
        // The local session is dropped even if the server call fails.
        self.restore_session(None);
        Self::auth_failure(resp?).await?;
        info!("signed out");
        Ok(())
    }

    async fn current_user(&self) -> Result<Option<User>, StoreError> {
        let Some(session) = self.session() else {
            return Ok(None);
        };
        if session.is_expired_at(Utc::now().timestamp()) {
            return self.refresh_session().await;
        }
        let url = format!("{}/auth/v1/user", self.base_url);
        let resp = self.request(reqwest::Method::GET, &url).send().await?;
        if resp.status() == reqwest::StatusCode::UNAUTHORIZED {
            return self.refresh_session().await;
        }
        let resp = Self::auth_failure(resp).await?;
        let user: AuthUser = resp.json().await?;
        Ok(Some(user.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_response_maps_metadata() {
        let json = r#"{
            "access_token": "jwt",
            "token_type": "bearer",
            "expires_in": 3600,
            "expires_at": 1760000000,
            "refresh_token": "r1",
            "user": {
                "id": "u-1",
                "email": "rohan@police.gov.in",
                "user_metadata": { "name": "Rohan Sharma", "officerId": "O-001" }
            }
        }"#;
        let session: Session = serde_json::from_str::<TokenResponse>(json).unwrap().into();
        assert_eq!(session.user.name, "Rohan Sharma");
        assert_eq!(session.user.officer_id, "O-001");
        assert_eq!(session.refresh_token.as_deref(), Some("r1"));
    }

    fn stale_session(refresh_token: Option<&str>) -> Session {
        Session {
            access_token: "old".into(),
            refresh_token: refresh_token.map(str::to_string),
            expires_at: Some(Utc::now().timestamp() - 10),
            user: User::from_parts("u-1".into(), None, None, None),
        }
    }

    #[test]
    fn expiry_includes_margin() {
        let mut session = stale_session(None);
        session.expires_at = Some(1_000);
        assert!(!session.is_expired_at(1_000 - crate::supabase::EXPIRY_MARGIN_SECS - 1));
        assert!(session.is_expired_at(1_000 - crate::supabase::EXPIRY_MARGIN_SECS));
        assert!(session.is_expired_at(2_000));
        session.expires_at = None;
        assert!(!session.is_expired_at(i64::MAX));
    }

    #[tokio::test]
    async fn expired_session_without_refresh_token_signs_out() {
        let client =
            SupabaseClient::new(crate::SupabaseConfig::new("http://127.0.0.1:9", "anon"));
        client.restore_session(Some(stale_session(None)));
        assert!(client.current_user().await.unwrap().is_none());
        assert!(client.session().is_none());
    }

    #[tokio::test]
    async fn unreachable_refresh_keeps_the_session() {
        let client =
            SupabaseClient::new(crate::SupabaseConfig::new("http://127.0.0.1:9", "anon"));
        client.restore_session(Some(stale_session(Some("r1"))));
        let err = client.current_user().await.unwrap_err();
        assert!(matches!(err, StoreError::Http(_)));
        assert_eq!(client.session().unwrap().refresh_token.as_deref(), Some("r1"));
    }

    #[test]
    fn missing_metadata_uses_defaults() {
        let user: User = serde_json::from_str::<AuthUser>(r#"{"id":"u-2"}"#).unwrap().into();
        assert_eq!(user.name, "Officer");
        assert_eq!(user.officer_id, "N/A");
        assert_eq!(user.email, "");
    }

    #[test]
    fn signup_pending_confirmation_has_no_session() {
        let value = json!({
            "id": "u-3",
            "email": "priya@police.gov.in",
            "user_metadata": { "name": "Priya Singh", "officerId": "O-002" }
        });
        let (user, session) = parse_signup(value).unwrap();
        assert_eq!(user.officer_id, "O-002");
        assert!(session.is_none());
    }

    #[test]
    fn signup_with_autoconfirm_returns_session() {
        let value = json!({
            "access_token": "jwt",
            "user": { "id": "u-4", "email": "a@b.in", "user_metadata": {} }
        });
        let (user, session) = parse_signup(value).unwrap();
        assert_eq!(user.id, "u-4");
        assert_eq!(session.unwrap().access_token, "jwt");
    }
}
