use serde::{Deserialize, Serialize};

pub const DEFAULT_NAME: &str = "Officer";
pub const DEFAULT_OFFICER_ID: &str = "N/A";

/// The signed-in officer, as reported by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub officer_id: String,
}

impl User {
    /// Build from provider fields, filling in the dashboard's defaults for
    /// absent profile attributes.
    pub fn from_parts(
        id: String,
        email: Option<String>,
        name: Option<String>,
        officer_id: Option<String>,
    ) -> Self {
        Self {
            id,
            email: email.unwrap_or_default(),
            name: name.unwrap_or_else(|| DEFAULT_NAME.to_string()),
            officer_id: officer_id.unwrap_or_else(|| DEFAULT_OFFICER_ID.to_string()),
        }
    }
}
