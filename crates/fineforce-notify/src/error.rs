use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid payment URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("QR code generation failed: {0}")]
    Qr(#[from] qrcode::types::QrError),
    #[error("notification rejected")]
    Rejected,
}
