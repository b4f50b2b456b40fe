use crate::{
    auth::middleware::AuthUser,
    dto::reports::{ReportAbuseRequest, ReportResponse},
    error::{AppError, AppResult},
    models::comments::{CommentRef, RelatedRef},
    repositories::reports::NewAbuseReport,
    telemetry::BusinessEvent,
    usecases::{
        content::MAX_COMMENT_LENGTH,
        context::{WorkflowContext, spawn_notification},
        sanitize::sanitize_comment,
        threads::locate_comment,
    },
};

const NOT_ALLOWED: &str = "You're not allowed to take an action on that entity. Make sure that comment exist or you've authenticated your request properly.";

pub struct ReportService {
    ctx: WorkflowContext,
}

impl ReportService {
    pub fn new(ctx: WorkflowContext) -> Self {
        Self { ctx }
    }

    /// Files an abuse report against a comment in `relation`. Moderators are
    /// notified in the background.
    pub async fn report_abuse(
        &self,
        relation: &str,
        comment_id: &str,
        req: ReportAbuseRequest,
        user: Option<&AuthUser>,
    ) -> AppResult<ReportResponse> {
        let Some(reporter) = user else {
            return Err(AppError::Forbidden(NOT_ALLOWED.to_string()));
        };
        let content = req.content.trim().to_string();
        if content.chars().count() > MAX_COMMENT_LENGTH {
            return Err(AppError::ValidationError(format!(
                "Report content exceeds {MAX_COMMENT_LENGTH} characters"
            )));
        }

        let related = RelatedRef::parse(relation)?;
        let reference = CommentRef::parse(comment_id)
            .ok_or_else(|| AppError::Forbidden(NOT_ALLOWED.to_string()))?;
        let comment = locate_comment(self.ctx.comments.as_ref(), &reference, &related)
            .await?
            .ok_or_else(|| AppError::Forbidden(NOT_ALLOWED.to_string()))?;
        if comment.is_admin_comment {
            return Err(AppError::Forbidden(
                "You're not allowed to take an action on that entity. This is an admin comment."
                    .to_string(),
            ));
        }

        let report = self
            .ctx
            .reports
            .create(NewAbuseReport {
                comment_id: comment.id,
                reason: req.reason,
                content,
            })
            .await
            .map_err(|error| {
                tracing::error!(error = %error, comment_id = comment.id, "Failed to persist abuse report");
                AppError::Internal("Report cannot be created".to_string())
            })?;

        BusinessEvent::AbuseReported {
            report_id: report.id,
            comment_id: comment.id,
            reporter_id: reporter.id.to_string(),
            reason: report.reason.as_str().to_string(),
        }
        .log();

        let notifier = self.ctx.notifier.clone();
        let reason = report.reason;
        let body = report.content.clone();
        spawn_notification("abuse_report", async move {
            notifier.send_abuse_report(reason, &body).await
        });

        let blocked_props = self.ctx.config.blocked_author_props();
        Ok(ReportResponse {
            id: report.id,
            reason: report.reason,
            content: report.content,
            resolved: report.resolved,
            created_at: report.created_at,
            related: sanitize_comment(comment, None, &blocked_props),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::reports::ReportReason,
        testing::{Harness, auth_user, comment_fixture},
    };

    fn request() -> ReportAbuseRequest {
        ReportAbuseRequest {
            reason: ReportReason::BadLanguage,
            content: "Rude".to_string(),
        }
    }

    #[tokio::test]
    async fn report_creates_unresolved_report_and_notifies() {
        let harness = Harness::new().with_comments(vec![comment_fixture(1, "article:1")]);
        let response = harness
            .reports()
            .report_abuse("article:1", "1", request(), Some(&auth_user(2)))
            .await
            .unwrap();

        assert!(!response.resolved);
        assert_eq!(response.reason, ReportReason::BadLanguage);
        assert_eq!(response.related.id, 1);
        assert_eq!(harness.report_store.all().len(), 1);

        harness.notifier.wait_for_calls(1).await;
        assert_eq!(harness.notifier.abuse_reasons(), vec![ReportReason::BadLanguage]);
    }

    #[tokio::test]
    async fn report_without_identity_is_forbidden() {
        let harness = Harness::new().with_comments(vec![comment_fixture(1, "article:1")]);
        let result = harness
            .reports()
            .report_abuse("article:1", "1", request(), None)
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn report_on_admin_comment_is_forbidden() {
        let mut comment = comment_fixture(1, "article:1");
        comment.is_admin_comment = true;
        let harness = Harness::new().with_comments(vec![comment]);
        let result = harness
            .reports()
            .report_abuse("article:1", "1", request(), Some(&auth_user(2)))
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
        assert!(harness.report_store.all().is_empty());
    }

    #[tokio::test]
    async fn report_on_missing_comment_is_forbidden() {
        let harness = Harness::new().with_comments(vec![comment_fixture(1, "article:2")]);
        let result = harness
            .reports()
            .report_abuse("article:1", "1", request(), Some(&auth_user(2)))
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn failing_notification_still_returns_report() {
        let harness = Harness::new()
            .with_comments(vec![comment_fixture(1, "article:1")])
            .with_failing_notifier();
        let response = harness
            .reports()
            .report_abuse("article:1", "doc-1", request(), Some(&auth_user(2)))
            .await
            .unwrap();
        assert_eq!(response.related.document_id, "doc-1");
    }

    #[tokio::test]
    async fn persistence_failure_is_internal() {
        let harness = Harness::new().with_comments(vec![comment_fixture(1, "article:1")]);
        harness.report_store.fail_writes();
        let result = harness
            .reports()
            .report_abuse("article:1", "1", request(), Some(&auth_user(2)))
            .await;
        assert!(matches!(result, Err(AppError::Internal(_))));
    }
}
