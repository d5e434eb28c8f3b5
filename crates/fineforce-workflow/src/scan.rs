//! Payment-code scanning: camera and detector seams, the frame loop, and
//! turning a decoded payload into a "paid" status update.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use fineforce_core::ViolationStatus;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};
use url::Url;

use crate::{ScanError, ViolationBoard};

/// One captured video frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Source of the rear-facing video stream.
#[async_trait]
pub trait Camera: Send + Sync {
    async fn open(&self) -> Result<Box<dyn VideoStream>, ScanError>;
}

pub trait VideoStream: Send {
    /// Latest frame, or `None` while the stream has no data yet.
    fn frame(&mut self) -> Option<Frame>;

    /// Release the device. Called exactly once per opened stream.
    fn stop(&mut self);
}

#[async_trait]
pub trait CodeDetector: Send + Sync {
    /// Raw values of the QR codes found in `frame`, in detection order.
    async fn detect(&self, frame: &Frame) -> Result<Vec<String>, ScanError>;
}

/// Owns an open stream and stops it when dropped, whichever way the scan ends.
pub(crate) struct StreamGuard {
    stream: Box<dyn VideoStream>,
}

impl StreamGuard {
    pub(crate) fn new(stream: Box<dyn VideoStream>) -> Self {
        Self { stream }
    }
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        self.stream.stop();
        debug!("camera stream stopped");
    }
}

/// Probe one frame per tick until a code is seen or `cancel` resolves.
/// `Ok(None)` means cancelled.
pub(crate) async fn watch_for_code<F>(
    guard: &mut StreamGuard,
    detector: &dyn CodeDetector,
    period: Duration,
    cancel: F,
) -> Result<Option<String>, ScanError>
where
    F: Future<Output = ()>,
{
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tokio::pin!(cancel);

    loop {
        tokio::select! {
            biased;
            _ = &mut cancel => return Ok(None),
            _ = ticker.tick() => {
                let Some(frame) = guard.stream.frame() else {
                    continue;
                };
                if let Some(code) = detector.detect(&frame).await?.into_iter().next() {
                    debug!(len = code.len(), "code detected");
                    return Ok(Some(code));
                }
            }
        }
    }
}

/// Extract the violation id from a scanned payment URL (`...?id=<id>`).
pub fn parse_payment_code(payload: &str) -> Result<String, ScanError> {
    let url = Url::parse(payload.trim()).map_err(|_| ScanError::InvalidFormat)?;
    url.query_pairs()
        .find(|(key, _)| key == "id")
        .map(|(_, value)| value.into_owned())
        .filter(|id| !id.is_empty())
        .ok_or(ScanError::MissingId)
}

/// Mark the violation named by a scanned payment code as paid.
pub async fn redeem_payment_code(
    board: &mut ViolationBoard,
    payload: &str,
) -> Result<String, ScanError> {
    let id = parse_payment_code(payload)?;
    board
        .update_status(&id, ViolationStatus::Paid)
        .await
        .map_err(|source| ScanError::Update {
            id: id.clone(),
            source,
        })?;
    info!(violation_id = %id, "payment code redeemed");
    Ok(id)
}
