//! Violation notices: payment links, payment QR codes, the email body, and
//! the delivery adapters.

mod error;
pub use error::NotifyError;

pub mod email;
pub mod http;
pub mod payment;

pub use email::render_email_html;
pub use http::{HttpNotifier, LogNotifier};
pub use payment::{DEFAULT_PAYMENT_BASE, payment_qr_data_url, payment_url};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fineforce_core::Violation;
use serde::{Deserialize, Serialize};

/// Everything a violation notice carries: the saved record, the recipient,
/// and the payment code image as a data URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    #[serde(flatten)]
    pub violation: Violation,
    pub email: String,
    pub qr_code_url: String,
}

/// Delivery acknowledgement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifyReceipt {
    pub message_id: String,
    pub timestamp: DateTime<Utc>,
}

/// Sends a violation notice to the recipient in the payload.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, payload: &NotificationPayload) -> Result<NotifyReceipt, NotifyError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use fineforce_core::{ViolationStatus, ViolationType};

    pub(crate) fn sample_payload() -> NotificationPayload {
        NotificationPayload {
            violation: Violation {
                id: "ABC123".into(),
                vehicle_number: "KA 01 MJ 4455".into(),
                violation_type: ViolationType::TripleRiding,
                date: Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap(),
                location: "MG Road & <Brigade>".into(),
                status: ViolationStatus::Pending,
                image_url: "https://cdn.example/violations/u1/1-shot.jpg".into(),
                fine: 1200,
                description: "Three riders on one motorcycle.".into(),
                confidence_score: fineforce_core::Confidence::new(88).unwrap(),
                contributing_factors: vec!["Peak hour".into()],
            },
            email: "owner@example.in".into(),
            qr_code_url: "data:image/svg+xml;base64,PHN2Zy8+".into(),
        }
    }

    #[test]
    fn payload_flattens_violation_fields() {
        let v = serde_json::to_value(sample_payload()).unwrap();
        assert_eq!(v["id"], "ABC123");
        assert_eq!(v["vehicleNumber"], "KA 01 MJ 4455");
        assert_eq!(v["violationType"], "Triple Riding");
        assert_eq!(v["email"], "owner@example.in");
        assert!(v["qrCodeUrl"].as_str().unwrap().starts_with("data:image/svg+xml"));
        assert!(v.get("violation").is_none());
    }

    #[test]
    fn receipt_parses_server_shape() {
        let json = r#"{"success":true,"messageId":"msg_1","timestamp":"2026-03-14T09:31:00Z"}"#;
        let receipt: NotifyReceipt = serde_json::from_str(json).unwrap();
        assert_eq!(receipt.message_id, "msg_1");
    }
}
