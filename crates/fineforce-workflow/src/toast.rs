use chrono::{DateTime, TimeDelta, Utc};

/// How long a confirmation stays visible, in seconds.
pub const TOAST_TTL_SECS: i64 = 5;

/// Transient confirmation message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub expires_at: DateTime<Utc>,
}

impl Toast {
    pub fn new(message: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            message: message.into(),
            expires_at: now + TimeDelta::seconds(TOAST_TTL_SECS),
        }
    }

    pub fn is_visible(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expires_after_five_seconds() {
        let now = Utc::now();
        let toast = Toast::new("saved", now);
        assert!(toast.is_visible(now + TimeDelta::milliseconds(4999)));
        assert!(!toast.is_visible(now + TimeDelta::seconds(5)));
    }
}
