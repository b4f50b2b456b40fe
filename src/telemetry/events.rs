use serde::Serialize;
use tracing::info;

#[derive(Debug, Serialize)]
#[serde(tag = "event_type")]
pub enum BusinessEvent {
    CommentCreated {
        comment_id: i64,
        related: String,
        thread_of: Option<i64>,
        author_id: String,
        approval_status: String,
    },
    CommentUpdated {
        comment_id: i64,
        related: String,
        author_id: String,
    },
    CommentRemoved {
        comment_id: i64,
        related: String,
        author_id: String,
        cascaded: usize,
    },
    AbuseReported {
        report_id: i64,
        comment_id: i64,
        reporter_id: String,
        reason: String,
    },
    NotificationFailed {
        kind: String,
        recipient_redacted: Option<String>,
        reason: String,
    },
}

pub fn redact_email(email: &str) -> String {
    let trimmed = email.trim();
    if trimmed.is_empty() {
        return "***".to_string();
    }
    let mut parts = trimmed.splitn(2, '@');
    let local = parts.next().unwrap_or("");
    let domain = parts.next().unwrap_or("");
    if local.is_empty() || domain.is_empty() {
        return "***".to_string();
    }
    let first_char = local.chars().next().unwrap_or('*');
    format!("{first_char}***@{domain}")
}

impl BusinessEvent {
    pub fn log(&self) {
        let event_json = serde_json::to_string(self).unwrap_or_else(|_| format!("{:?}", self));
        info!(
            target: "business_events",
            event = %event_json,
            "Business event occurred"
        );
    }
}
