use fineforce_ai::AiError;
use fineforce_core::ValidationError;
use fineforce_notify::NotifyError;
use fineforce_store::StoreError;
use thiserror::Error;

use crate::workflow::Stage;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("AI analysis returned an invalid format. The image might be unclear or unsupported.")]
    AiUnparseable(#[source] AiError),

    #[error("AI analysis failed: {0}")]
    AiUnavailable(#[source] AiError),

    #[error("File Upload Failed: {0}")]
    Upload(#[source] StoreError),

    #[error("Saving failed: {0}")]
    Save(#[source] StoreError),

    #[error("Saving failed: {0}")]
    PermissionDenied(#[source] StoreError),

    /// The record exists; only the notice failed.
    #[error("Violation {violation_id} saved, but email failed: {source}")]
    Notify {
        violation_id: String,
        source: NotifyError,
    },

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error("cannot {action} while {stage}")]
    InvalidStage { action: &'static str, stage: Stage },
}

impl WorkflowError {
    pub(crate) fn from_ai(err: AiError) -> Self {
        if err.is_unparseable() {
            Self::AiUnparseable(err)
        } else {
            Self::AiUnavailable(err)
        }
    }

    pub(crate) fn from_insert(err: StoreError) -> Self {
        if err.is_permission_denied() {
            Self::PermissionDenied(err)
        } else {
            Self::Save(err)
        }
    }
}

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Invalid QR Code: No violation ID found.")]
    MissingId,

    #[error("Invalid QR Code format. Please scan a valid payment QR code.")]
    InvalidFormat,

    #[error("QR code scanning is not supported on this device.")]
    Unsupported,

    #[error("Could not access camera. Please grant permission. ({0})")]
    Camera(String),

    #[error("QR code detection failed: {0}")]
    Detector(String),

    #[error("Failed to update violation {id}: {source}")]
    Update { id: String, source: StoreError },
}
