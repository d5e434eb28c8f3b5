//! The officer's fine-issuing life-cycle.
//!
//! [`UploadWorkflow`] walks one piece of evidence through
//! `Upload → Analyzing → Review → Saving → SendingEmail → Success`, and from
//! `Success` can scan a payment code to mark a violation paid. State that is
//! shared with the rest of the application (the violation list) lives in
//! [`ViolationBoard`], which the workflow calls back into.

mod error;
pub use error::{ScanError, WorkflowError};

pub mod board;
pub mod scan;
pub mod toast;
pub mod workflow;

#[cfg(test)]
mod testing;

pub use board::ViolationBoard;
pub use scan::{Camera, CodeDetector, Frame, VideoStream, parse_payment_code, redeem_payment_code};
pub use toast::Toast;
pub use workflow::{Evidence, ScanOutcome, Stage, UploadWorkflow};
