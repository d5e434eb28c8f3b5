//! In-process stand-ins for the camera, detector, analyzer and notifier.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use fineforce_ai::{AiError, ImageAnalyzer, ProcessedImage};
use fineforce_core::{AnalysisResult, AssessedType, Confidence, ViolationType};
use fineforce_notify::{NotificationPayload, Notifier, NotifyError, NotifyReceipt};

use crate::{Camera, CodeDetector, Frame, ScanError, VideoStream};

pub struct FakeCamera {
    warmup: usize,
    deny: bool,
    stopped: Arc<AtomicBool>,
}

impl FakeCamera {
    pub fn ready() -> Self {
        Self::warming_up(0)
    }

    pub fn warming_up(frames: usize) -> Self {
        Self {
            warmup: frames,
            deny: false,
            stopped: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn denied() -> Self {
        Self {
            deny: true,
            ..Self::ready()
        }
    }

    pub fn stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

struct FakeStream {
    warmup: usize,
    stopped: Arc<AtomicBool>,
}

impl VideoStream for FakeStream {
    fn frame(&mut self) -> Option<Frame> {
        if self.warmup > 0 {
            self.warmup -= 1;
            return None;
        }
        Some(Frame {
            width: 2,
            height: 2,
            pixels: vec![0; 4],
        })
    }

    fn stop(&mut self) {
        self.stopped.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl Camera for FakeCamera {
    async fn open(&self) -> Result<Box<dyn VideoStream>, ScanError> {
        if self.deny {
            return Err(ScanError::Camera("NotAllowedError".into()));
        }
        Ok(Box::new(FakeStream {
            warmup: self.warmup,
            stopped: self.stopped.clone(),
        }))
    }
}

pub struct FakeDetector {
    misses: usize,
    code: Option<String>,
    broken: bool,
    calls: AtomicUsize,
}

impl FakeDetector {
    pub fn after_misses(misses: usize, code: &str) -> Self {
        Self {
            misses,
            code: Some(code.to_string()),
            broken: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn immediately(code: &str) -> Self {
        Self::after_misses(0, code)
    }

    pub fn never() -> Self {
        Self {
            misses: 0,
            code: None,
            broken: false,
            calls: AtomicUsize::new(0),
        }
    }

    /// Fails on the first frame it is given.
    pub fn broken() -> Self {
        Self {
            broken: true,
            ..Self::never()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CodeDetector for FakeDetector {
    async fn detect(&self, _frame: &Frame) -> Result<Vec<String>, ScanError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.broken {
            return Err(ScanError::Detector("decoder crashed".into()));
        }
        match &self.code {
            Some(code) if n >= self.misses => Ok(vec![code.clone()]),
            _ => Ok(Vec::new()),
        }
    }
}

pub enum Verdict {
    Assess(AnalysisResult),
    Garbled,
    Offline,
}

pub struct FakeAnalyzer {
    verdict: Verdict,
    calls: AtomicUsize,
}

impl FakeAnalyzer {
    pub fn new(verdict: Verdict) -> Self {
        Self {
            verdict,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageAnalyzer for FakeAnalyzer {
    async fn analyze(&self, _image: &ProcessedImage) -> Result<AnalysisResult, AiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.verdict {
            Verdict::Assess(result) => Ok(result.clone()),
            Verdict::Garbled => Err(AiError::Malformed(
                "expected value at line 1; raw: Sorry".into(),
            )),
            Verdict::Offline => Err(AiError::Server {
                status: 503,
                body: "The model is overloaded.".into(),
            }),
        }
    }
}

/// Fails the first `failures` notices, then succeeds.
pub struct FakeNotifier {
    failures: AtomicUsize,
    sent: Mutex<Vec<NotificationPayload>>,
    attempts: AtomicUsize,
}

impl FakeNotifier {
    pub fn failing(failures: usize) -> Self {
        Self {
            failures: AtomicUsize::new(failures),
            sent: Mutex::new(Vec::new()),
            attempts: AtomicUsize::new(0),
        }
    }

    pub fn working() -> Self {
        Self::failing(0)
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<NotificationPayload> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for FakeNotifier {
    async fn notify(&self, payload: &NotificationPayload) -> Result<NotifyReceipt, NotifyError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let remaining = self.failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures.store(remaining - 1, Ordering::SeqCst);
            return Err(NotifyError::Server {
                status: 502,
                body: "mail relay unavailable".into(),
            });
        }
        self.sent.lock().unwrap().push(payload.clone());
        Ok(NotifyReceipt {
            message_id: format!("msg_{}", self.attempts()),
            timestamp: Utc::now(),
        })
    }
}

pub fn assessment(violation_type: AssessedType, confidence: u8) -> AnalysisResult {
    AnalysisResult {
        vehicle_number: "MH 12 AB 1234".into(),
        fine: violation_type.concrete().map(|t| t.fine()).unwrap_or(0),
        violation_type,
        location: "Not Detected".into(),
        description: "A car is speeding.".into(),
        confidence_score: Confidence::new(confidence).unwrap(),
        contributing_factors: vec!["Open road".into()],
    }
}

pub fn speeding(confidence: u8) -> AnalysisResult {
    assessment(AssessedType::Concrete(ViolationType::Speeding), confidence)
}
