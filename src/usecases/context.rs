use std::{future::Future, sync::Arc};

use crate::{
    error::AppError,
    repositories::{
        comments::CommentRepository, related::RelatedEntityRepository,
        reports::ReportRepository, users::ProfileLookup,
    },
    services::{config::ConfigCache, content_filter::ContentFilter, notifier::Notifier},
    telemetry::BusinessEvent,
};

/// Collaborators the comment and report workflows depend on, assembled
/// once at startup.
#[derive(Clone)]
pub struct WorkflowContext {
    pub comments: Arc<dyn CommentRepository>,
    pub related: Arc<dyn RelatedEntityRepository>,
    pub reports: Arc<dyn ReportRepository>,
    pub profiles: Arc<dyn ProfileLookup>,
    pub filter: Arc<dyn ContentFilter>,
    pub config: Arc<ConfigCache>,
    pub notifier: Arc<dyn Notifier>,
}

/// Runs a notification in the background. Failures are logged and never
/// reach the caller.
pub fn spawn_notification<F>(kind: &'static str, send: F)
where
    F: Future<Output = Result<(), AppError>> + Send + 'static,
{
    tokio::spawn(async move {
        if let Err(error) = send.await {
            tracing::warn!(kind, error = %error, "Notification failed");
            BusinessEvent::NotificationFailed {
                kind: kind.to_string(),
                recipient_redacted: None,
                reason: error.to_string(),
            }
            .log();
        }
    });
}
