use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Report reason mapping for comments.report_reason.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "comments.report_reason", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportReason {
    BadLanguage,
    Discrimination,
    Other,
}

impl ReportReason {
    pub fn as_str(self) -> &'static str {
        match self {
            ReportReason::BadLanguage => "BAD_LANGUAGE",
            ReportReason::Discrimination => "DISCRIMINATION",
            ReportReason::Other => "OTHER",
        }
    }
}

/// Abuse report model mapped to comments.abuse_report.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AbuseReport {
    pub id: i64,
    pub comment_id: i64,
    pub reason: ReportReason,
    pub content: String,
    pub resolved: bool,
    pub created_at: DateTime<Utc>,
}
