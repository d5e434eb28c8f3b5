use thiserror::Error;

#[derive(Debug, Error)]
pub enum AiError {
    #[error("API key is not configured")]
    NotConfigured,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },

    /// The service answered, but not with the structure we asked for.
    #[error("invalid response format: {0}")]
    Malformed(String),

    #[error("message is empty")]
    EmptyMessage,
}

impl AiError {
    /// True for responses that arrived but could not be parsed, as opposed to
    /// an unreachable or misconfigured service.
    pub fn is_unparseable(&self) -> bool {
        matches!(self, Self::Malformed(_))
    }

    /// Missing key locally, or a key the service rejected.
    pub fn is_key_problem(&self) -> bool {
        match self {
            Self::NotConfigured => true,
            Self::Server { status, body } => {
                matches!(status, 400 | 401 | 403) && body.contains("API key")
            }
            _ => false,
        }
    }

    /// Text shown in place of an assistant reply when a chat turn fails.
    pub fn chat_reply(&self) -> &'static str {
        if self.is_key_problem() {
            "AI Assistant is not available. The API key is missing or invalid."
        } else {
            "Sorry, I couldn't connect to the AI service. Please check the configuration."
        }
    }

    pub(crate) fn malformed(reason: impl std::fmt::Display, raw: &str) -> Self {
        let cut = raw
            .char_indices()
            .nth(200)
            .map(|(i, _)| i)
            .unwrap_or(raw.len());
        Self::Malformed(format!("{reason}; raw: {}", &raw[..cut]))
    }
}
