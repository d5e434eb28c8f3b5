//! Evidence → analysis → review → save → notify, and the scan side path.

use std::fmt;
use std::future::Future;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use fineforce_ai::{ImageAnalyzer, ProcessedImage};
use fineforce_core::{AnalysisResult, ValidationError, Violation, ViolationType, is_valid_email};
use fineforce_notify::{
    DEFAULT_PAYMENT_BASE, NotificationPayload, Notifier, NotifyError, NotifyReceipt,
    payment_qr_data_url, payment_url,
};
use fineforce_store::BlobStore;
use tracing::{debug, info, warn};

use crate::scan::{StreamGuard, watch_for_code};
use crate::{
    Camera, CodeDetector, ScanError, Toast, ViolationBoard, WorkflowError, redeem_payment_code,
};

/// Roughly one probe per display refresh.
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Upload,
    Analyzing,
    Review,
    Saving,
    SendingEmail,
    Success,
    Scanning,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Upload => "upload",
            Self::Analyzing => "analyzing",
            Self::Review => "review",
            Self::Saving => "saving",
            Self::SendingEmail => "sending-email",
            Self::Success => "success",
            Self::Scanning => "scanning",
        })
    }
}

/// The original evidence file, uploaded as-is on save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evidence {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// The violation with this id is now paid.
    Redeemed(String),
    Cancelled,
}

/// One officer's fine-issuing session.
///
/// Every transition takes `&mut self`, so at most one remote call is in
/// flight. Failures move the workflow to the stage named in the transition
/// table, record a human-readable message, and are also returned.
pub struct UploadWorkflow {
    blobs: Arc<dyn BlobStore>,
    analyzer: Arc<dyn ImageAnalyzer>,
    notifier: Arc<dyn Notifier>,
    payment_base: String,
    frame_interval: Duration,

    stage: Stage,
    evidence: Option<Evidence>,
    processed: Option<ProcessedImage>,
    analysis: Option<AnalysisResult>,
    email: String,
    uploaded_url: Option<String>,
    // Saved record whose notice has not gone out yet.
    unnotified: Option<Violation>,
    last_saved_id: Option<String>,
    error: Option<String>,
    toast: Option<Toast>,
}

impl UploadWorkflow {
    pub fn new(
        blobs: Arc<dyn BlobStore>,
        analyzer: Arc<dyn ImageAnalyzer>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            blobs,
            analyzer,
            notifier,
            payment_base: DEFAULT_PAYMENT_BASE.to_string(),
            frame_interval: DEFAULT_FRAME_INTERVAL,
            stage: Stage::Upload,
            evidence: None,
            processed: None,
            analysis: None,
            email: String::new(),
            uploaded_url: None,
            unnotified: None,
            last_saved_id: None,
            error: None,
            toast: None,
        }
    }

    pub fn with_payment_base(mut self, base: impl Into<String>) -> Self {
        self.payment_base = base.into();
        self
    }

    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval;
        self
    }

    // ── Accessors ──

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn evidence(&self) -> Option<&Evidence> {
        self.evidence.as_ref()
    }

    pub fn processed(&self) -> Option<&ProcessedImage> {
        self.processed.as_ref()
    }

    pub fn analysis(&self) -> Option<&AnalysisResult> {
        self.analysis.as_ref()
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn last_saved_id(&self) -> Option<&str> {
        self.last_saved_id.as_deref()
    }

    /// A record that was saved but whose notice failed.
    pub fn unnotified(&self) -> Option<&Violation> {
        self.unnotified.as_ref()
    }

    pub fn toast_at(&self, now: DateTime<Utc>) -> Option<&Toast> {
        self.toast.as_ref().filter(|t| t.is_visible(now))
    }

    pub fn dismiss_toast(&mut self) {
        self.toast = None;
    }

    fn transition(&mut self, to: Stage) {
        debug!(from = %self.stage, to = %to, "workflow transition");
        self.stage = to;
    }

    fn fail(&mut self, to: Stage, err: WorkflowError) -> WorkflowError {
        warn!(stage = %self.stage, error = %err, "workflow step failed");
        self.transition(to);
        self.error = Some(err.to_string());
        err
    }

    fn require(&self, action: &'static str, allowed: &[Stage]) -> Result<(), WorkflowError> {
        if allowed.contains(&self.stage) {
            Ok(())
        } else {
            Err(WorkflowError::InvalidStage {
                action,
                stage: self.stage,
            })
        }
    }

    // ── Upload ──

    /// Store the original file and its processed payload.
    pub fn select_evidence(
        &mut self,
        evidence: Evidence,
        processed: ProcessedImage,
    ) -> Result<(), WorkflowError> {
        self.require("select evidence", &[Stage::Upload])?;
        info!(
            file = %evidence.file_name,
            bytes = evidence.bytes.len(),
            "evidence selected"
        );
        self.evidence = Some(evidence);
        self.processed = Some(processed);
        self.analysis = None;
        self.uploaded_url = None;
        self.unnotified = None;
        self.error = None;
        Ok(())
    }

    /// Submit the processed payload for analysis. On success the workflow
    /// is in review with the returned assessment.
    pub async fn analyze(&mut self) -> Result<&AnalysisResult, WorkflowError> {
        self.require("analyze", &[Stage::Upload])?;
        if self.processed.is_none() {
            return Err(self.fail(Stage::Upload, ValidationError::MissingImage.into()));
        }
        self.transition(Stage::Analyzing);
        self.error = None;

        let outcome = match &self.processed {
            Some(image) => self.analyzer.analyze(image).await,
            None => return Err(ValidationError::MissingImage.into()),
        };
        match outcome {
            Ok(result) => {
                info!(
                    violation_type = %result.violation_type,
                    confidence = result.confidence_score.value(),
                    "analysis ready for review"
                );
                self.transition(Stage::Review);
                Ok(&*self.analysis.insert(result))
            }
            Err(e) => Err(self.fail(Stage::Upload, WorkflowError::from_ai(e))),
        }
    }

    // ── Review ──

    /// The assessment under review. Every field may be edited; changing the
    /// type should go through [`Self::set_violation_type`] so the fine follows.
    pub fn review_mut(&mut self) -> Result<&mut AnalysisResult, WorkflowError> {
        let stage = self.stage;
        match (stage, self.analysis.as_mut()) {
            (Stage::Review, Some(analysis)) => Ok(analysis),
            _ => Err(WorkflowError::InvalidStage {
                action: "edit the review",
                stage,
            }),
        }
    }

    /// Select a type; the fine is reset from the table.
    pub fn set_violation_type(&mut self, t: ViolationType) -> Result<(), WorkflowError> {
        self.review_mut()?.set_violation_type(t);
        Ok(())
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.email = email.into();
    }

    pub fn can_save(&self) -> bool {
        self.stage == Stage::Review
            && self
                .analysis
                .as_ref()
                .is_some_and(|a| !a.violation_type.is_unclear())
            && is_valid_email(&self.email)
    }

    /// Shown when the model is unsure about a concrete type. Never blocks
    /// saving.
    pub fn low_confidence_advisory(&self) -> Option<String> {
        self.analysis
            .as_ref()
            .filter(|a| a.is_low_confidence())
            .map(|a| {
                format!(
                    "Low Confidence Warning ({}%): The AI's confidence is low. Please carefully \
                     review the violation type and all details before saving.",
                    a.confidence_score.value()
                )
            })
    }

    // ── Save & notify ──

    /// Upload the evidence, insert the record through `board`, then send the
    /// notice. A record saved by an earlier attempt whose notice failed is
    /// reused, so retrying only re-sends the notice.
    pub async fn confirm_save(
        &mut self,
        board: &mut ViolationBoard,
    ) -> Result<Violation, WorkflowError> {
        self.require("save", &[Stage::Review])?;
        let unresolved = self
            .analysis
            .as_ref()
            .is_none_or(|a| a.violation_type.is_unclear());
        if unresolved {
            return Err(self.fail(Stage::Review, ValidationError::UnresolvedType.into()));
        }
        if !is_valid_email(&self.email) {
            return Err(self.fail(Stage::Review, ValidationError::InvalidEmail.into()));
        }
        if self.evidence.is_none() && self.unnotified.is_none() {
            return Err(self.fail(Stage::Review, ValidationError::MissingImage.into()));
        }

        self.transition(Stage::Saving);
        self.error = None;
        let violation = match self.unnotified.clone() {
            Some(saved) => {
                info!(violation_id = %saved.id, "record already saved; resending notice only");
                saved
            }
            None => self.persist(board).await?,
        };
        self.unnotified = Some(violation.clone());

        self.transition(Stage::SendingEmail);
        match self.send_notice(&violation).await {
            Ok(receipt) => {
                info!(
                    violation_id = %violation.id,
                    message_id = %receipt.message_id,
                    "violation issued"
                );
                let message = format!(
                    "Violation {} saved & notification sent to {}.",
                    violation.id, self.email
                );
                self.toast = Some(Toast::new(message, Utc::now()));
                self.last_saved_id = Some(violation.id.clone());
                self.unnotified = None;
                self.transition(Stage::Success);
                Ok(violation)
            }
            Err(source) => {
                let err = WorkflowError::Notify {
                    violation_id: violation.id.clone(),
                    source,
                };
                Err(self.fail(Stage::Review, err))
            }
        }
    }

    async fn persist(&mut self, board: &mut ViolationBoard) -> Result<Violation, WorkflowError> {
        let image_url = match self.uploaded_url.clone() {
            Some(url) => url,
            None => {
                let evidence = match &self.evidence {
                    Some(evidence) => evidence,
                    None => return Err(ValidationError::MissingImage.into()),
                };
                let uploaded = self
                    .blobs
                    .upload(
                        &evidence.file_name,
                        evidence.bytes.clone(),
                        &evidence.content_type,
                    )
                    .await;
                match uploaded {
                    Ok(url) => {
                        info!(url = %url, "evidence uploaded");
                        self.uploaded_url = Some(url.clone());
                        url
                    }
                    Err(e) => return Err(self.fail(Stage::Review, WorkflowError::Upload(e))),
                }
            }
        };

        let built = self.analysis.as_ref().map(|a| a.to_new_violation(image_url));
        let new = match built {
            Some(Ok(new)) => new,
            Some(Err(e)) => return Err(self.fail(Stage::Review, e.into())),
            None => {
                return Err(self.fail(Stage::Review, ValidationError::UnresolvedType.into()));
            }
        };
        match board.add(new).await {
            Ok(violation) => Ok(violation),
            Err(e) => Err(self.fail(Stage::Review, WorkflowError::from_insert(e))),
        }
    }

    async fn send_notice(&self, violation: &Violation) -> Result<NotifyReceipt, NotifyError> {
        let url = payment_url(&self.payment_base, &violation.id)?;
        let payload = NotificationPayload {
            violation: violation.clone(),
            email: self.email.clone(),
            qr_code_url: payment_qr_data_url(&url)?,
        };
        self.notifier.notify(&payload).await
    }

    // ── Scan ──

    /// Watch the camera for a payment code until one is found or `cancel`
    /// resolves. A valid code marks its violation paid and resets the
    /// workflow; anything else returns to success with an error. The camera
    /// is released on every exit, including this future being dropped.
    pub async fn scan<F>(
        &mut self,
        board: &mut ViolationBoard,
        camera: &dyn Camera,
        detector: Option<&dyn CodeDetector>,
        cancel: F,
    ) -> Result<ScanOutcome, WorkflowError>
    where
        F: Future<Output = ()>,
    {
        self.require("scan", &[Stage::Success])?;
        let mut this = ScanStage::enter(self);
        this.error = None;

        let Some(detector) = detector else {
            return Err(this.fail(Stage::Success, ScanError::Unsupported.into()));
        };
        let stream = match camera.open().await {
            Ok(stream) => stream,
            Err(e) => return Err(this.fail(Stage::Success, e.into())),
        };
        let mut guard = StreamGuard::new(stream);
        let found = watch_for_code(&mut guard, detector, this.frame_interval, cancel).await;
        drop(guard);

        let payload = match found {
            Ok(Some(payload)) => payload,
            Ok(None) => {
                info!("scan cancelled");
                this.transition(Stage::Success);
                return Ok(ScanOutcome::Cancelled);
            }
            Err(e) => return Err(this.fail(Stage::Success, e.into())),
        };
        match redeem_payment_code(board, &payload).await {
            Ok(id) => {
                this.reset();
                let message = format!("Success! Violation {id} has been marked as paid.");
                this.toast = Some(Toast::new(message, Utc::now()));
                Ok(ScanOutcome::Redeemed(id))
            }
            Err(e) => Err(this.fail(Stage::Success, e.into())),
        }
    }

    /// Back to an empty upload form. Visible toasts survive.
    pub fn reset(&mut self) {
        self.transition(Stage::Upload);
        self.evidence = None;
        self.processed = None;
        self.analysis = None;
        self.email.clear();
        self.uploaded_url = None;
        self.unnotified = None;
        self.last_saved_id = None;
        self.error = None;
    }
}

/// Holds the workflow in `Scanning`; falls back to `Success` if the scan
/// is abandoned before it settles on a stage.
struct ScanStage<'a>(&'a mut UploadWorkflow);

impl<'a> ScanStage<'a> {
    fn enter(wf: &'a mut UploadWorkflow) -> Self {
        wf.transition(Stage::Scanning);
        Self(wf)
    }
}

impl Deref for ScanStage<'_> {
    type Target = UploadWorkflow;

    fn deref(&self) -> &UploadWorkflow {
        self.0
    }
}

impl DerefMut for ScanStage<'_> {
    fn deref_mut(&mut self) -> &mut UploadWorkflow {
        self.0
    }
}

impl Drop for ScanStage<'_> {
    fn drop(&mut self) {
        if self.0.stage == Stage::Scanning {
            info!("scan abandoned");
            self.0.transition(Stage::Success);
        }
    }
}
