use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    error::AppError,
    models::reports::{AbuseReport, ReportReason},
};

#[derive(Debug, Clone)]
pub struct NewAbuseReport {
    pub comment_id: i64,
    pub reason: ReportReason,
    pub content: String,
}

#[async_trait]
pub trait ReportRepository: Send + Sync {
    async fn create(&self, report: NewAbuseReport) -> Result<AbuseReport, AppError>;
}

#[derive(Clone)]
pub struct PgReportRepository {
    pool: PgPool,
}

impl PgReportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReportRepository for PgReportRepository {
    async fn create(&self, report: NewAbuseReport) -> Result<AbuseReport, AppError> {
        let row = crate::log_query_fetch_one!(
            "reports.create",
            sqlx::query_as::<_, AbuseReport>(
                r#"
                INSERT INTO comments.abuse_report (comment_id, reason, content, resolved)
                VALUES ($1, $2, $3, FALSE)
                RETURNING id, comment_id, reason, content, resolved, created_at
                "#,
            )
            .bind(report.comment_id)
            .bind(report.reason)
            .bind(report.content)
            .fetch_one(&self.pool)
        )?;

        Ok(row)
    }
}
