//! Notice delivery: an HTTP endpoint, or the log when none is configured.

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::email::render_email_html;
use crate::{NotificationPayload, Notifier, NotifyError, NotifyReceipt};

#[derive(Serialize)]
struct Outgoing<'a> {
    #[serde(flatten)]
    payload: &'a NotificationPayload,
    html: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeliveryResponse {
    #[serde(default = "accepted")]
    success: bool,
    #[serde(flatten)]
    receipt: NotifyReceipt,
}

fn accepted() -> bool {
    true
}

/// POSTs each notice, rendered HTML included, to a mail relay endpoint.
pub struct HttpNotifier {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpNotifier {
    pub fn new(endpoint: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn notify(&self, payload: &NotificationPayload) -> Result<NotifyReceipt, NotifyError> {
        let body = Outgoing {
            payload,
            html: render_email_html(payload),
        };

        info!(
            url = %self.endpoint,
            violation_id = %payload.violation.id,
            recipient = %payload.email,
            "sending violation notice"
        );
        let resp = self.client.post(&self.endpoint).json(&body).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(NotifyError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let text = resp.text().await?;
        let result: DeliveryResponse = serde_json::from_str(&text)?;
        if !result.success {
            return Err(NotifyError::Rejected);
        }
        info!(message_id = %result.receipt.message_id, "notice delivered");
        Ok(result.receipt)
    }
}

/// Renders the notice and writes it to the log instead of sending it.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, payload: &NotificationPayload) -> Result<NotifyReceipt, NotifyError> {
        let html = render_email_html(payload);
        let now = Utc::now();
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        let message_id = format!("msg_{}_{}", now.timestamp_millis(), &suffix[..7]);

        info!(
            recipient = %payload.email,
            violation_id = %payload.violation.id,
            message_id = %message_id,
            "violation notice rendered (no delivery endpoint configured)"
        );
        debug!(html = %html, "notice body");
        Ok(NotifyReceipt {
            message_id,
            timestamp: now,
        })
    }
}
