use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid service URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Authentication error: {0}")]
    NotAuthenticated(String),

    #[error("{0}")]
    Auth(String),

    #[error(
        "Database Permission Denied: the current user is not allowed to modify violations ({0}). \
         Check the row level security policies on the 'violations' table."
    )]
    PermissionDenied(String),

    #[error("violation {0} not found")]
    NotFound(String),

    #[error("the database did not return the new violation record")]
    MissingRecord,

    #[error("{0}")]
    Other(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::PermissionDenied(_))
    }
}
