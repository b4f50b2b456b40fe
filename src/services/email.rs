use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, SinglePart, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use std::env;

use crate::{error::AppError, models::reports::ReportReason};

#[derive(Clone)]
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl EmailService {
    pub fn from_env() -> Result<Self, String> {
        let host = get_env("SMTP_HOST")?;
        let port = env::var("SMTP_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(587);
        let username = get_env("SMTP_USERNAME")?;
        let password = get_env("SMTP_PASSWORD")?;
        let from_email = get_env("SMTP_FROM")?;
        let from_name = env::var("SMTP_FROM_NAME").unwrap_or_else(|_| "Comments".to_string());

        let from_address = from_email
            .parse()
            .map_err(|_| "SMTP_FROM must be a valid email address".to_string())?;
        let from = Mailbox::new(Some(from_name), from_address);
        let creds = Credentials::new(username, password);
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&host)
            .map_err(|e| format!("SMTP relay error: {}", e))?
            .port(port)
            .credentials(creds)
            .build();

        Ok(Self { mailer, from })
    }

    /// Tells moderators about a new abuse report.
    pub async fn send_abuse_report(
        &self,
        recipients: &[String],
        reason: ReportReason,
        content: &str,
    ) -> Result<(), AppError> {
        self.send_plain(
            recipients,
            "New abuse report on comment",
            abuse_report_body(reason, content),
        )
        .await
    }

    /// Tells a comment author that somebody replied.
    pub async fn send_reply_notification(
        &self,
        recipient: &str,
        replier: &str,
        related: &str,
        content: &str,
    ) -> Result<(), AppError> {
        let body = format!(
            "{} replied to your comment on {}:\n\n{}\n",
            replier, related, content
        );
        self.send_plain(&[recipient.to_string()], "New reply to your comment", body)
            .await
    }

    async fn send_plain(
        &self,
        recipients: &[String],
        subject: &str,
        body: String,
    ) -> Result<(), AppError> {
        let mut builder = Message::builder().from(self.from.clone()).subject(subject);
        for recipient in recipients {
            let to_address = recipient
                .parse()
                .map_err(|_| AppError::BadRequest("Invalid recipient email".to_string()))?;
            builder = builder.to(Mailbox::new(None, to_address));
        }
        let message = builder
            .singlepart(
                SinglePart::builder()
                    .header(ContentType::TEXT_PLAIN)
                    .body(body),
            )
            .map_err(|e| AppError::ExternalService(format!("Email build failed: {}", e)))?;

        self.mailer
            .send(message)
            .await
            .map_err(|e| AppError::ExternalService(format!("Email send failed: {}", e)))?;
        Ok(())
    }
}

fn abuse_report_body(reason: ReportReason, content: &str) -> String {
    format!(
        "There was a new abuse report on your app.\nReason: {}\nMessage: {}\n",
        reason.as_str(),
        content
    )
}

fn get_env(key: &str) -> Result<String, String> {
    env::var(key).map_err(|_| format!("Missing {}", key))
}
