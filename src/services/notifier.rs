use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    error::AppError,
    models::{comments::Comment, reports::ReportReason},
    repositories::users::AdminDirectory,
    services::{config::ConfigCache, email::EmailService},
    telemetry::redact_email,
};

/// Outbound notifications. Callers treat every send as best-effort.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_abuse_report(&self, reason: ReportReason, content: &str)
    -> Result<(), AppError>;

    async fn send_reply_notification(
        &self,
        reply: &Comment,
        parent: &Comment,
    ) -> Result<(), AppError>;
}

pub struct EmailNotifier {
    email: Option<EmailService>,
    directory: Arc<dyn AdminDirectory>,
    config: Arc<ConfigCache>,
}

impl EmailNotifier {
    pub fn new(
        email: Option<EmailService>,
        directory: Arc<dyn AdminDirectory>,
        config: Arc<ConfigCache>,
    ) -> Self {
        Self {
            email,
            directory,
            config,
        }
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn send_abuse_report(
        &self,
        reason: ReportReason,
        content: &str,
    ) -> Result<(), AppError> {
        let Some(email) = &self.email else {
            tracing::debug!("Email service not configured, skipping abuse report mail");
            return Ok(());
        };
        let roles = self.config.moderator_roles();
        if roles.is_empty() {
            return Ok(());
        }
        let recipients = self.directory.find_emails_by_roles(&roles).await?;
        if recipients.is_empty() {
            tracing::warn!(?roles, "No moderators found for abuse report mail");
            return Ok(());
        }

        email.send_abuse_report(&recipients, reason, content).await
    }

    async fn send_reply_notification(
        &self,
        reply: &Comment,
        parent: &Comment,
    ) -> Result<(), AppError> {
        if !self.config.reply_notifications_enabled() {
            return Ok(());
        }
        let Some(email) = &self.email else {
            return Ok(());
        };
        let Some(recipient) = reply_recipient(reply, parent) else {
            return Ok(());
        };
        let replier = reply
            .author
            .snapshot()
            .name
            .as_deref()
            .unwrap_or("Someone");
        tracing::debug!(
            recipient = %redact_email(recipient),
            parent_id = parent.id,
            "Sending reply notification"
        );

        email
            .send_reply_notification(recipient, replier, &reply.related, &reply.content)
            .await
    }
}

/// Parent author's email, unless they are replying to themselves.
fn reply_recipient<'a>(reply: &Comment, parent: &'a Comment) -> Option<&'a str> {
    let recipient = parent.author.snapshot().email.as_deref()?;
    let replier = reply.author.snapshot().email.as_deref();
    if replier.is_some_and(|email| email.eq_ignore_ascii_case(recipient)) {
        return None;
    }
    Some(recipient)
}
