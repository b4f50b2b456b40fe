use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{dto::comments::CommentResponse, models::reports::ReportReason};

#[derive(Debug, Deserialize)]
pub struct ReportAbuseRequest {
    pub reason: ReportReason,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub id: i64,
    pub reason: ReportReason,
    pub content: String,
    pub resolved: bool,
    pub created_at: DateTime<Utc>,
    pub related: CommentResponse,
}
