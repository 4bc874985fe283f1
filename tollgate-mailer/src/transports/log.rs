use crate::{Email, Mailer, MailerError};
use async_trait::async_trait;

/// Logs outgoing mail at debug level instead of delivering it.
#[derive(Debug, Clone, Default)]
pub struct LogTransport;

impl LogTransport {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Mailer for LogTransport {
    async fn send_email(&self, email: Email) -> Result<(), MailerError> {
        email.validate()?;

        let body = email
            .html_body
            .as_deref()
            .or(email.text_body.as_deref())
            .unwrap_or_default();

        tracing::debug!(
            to = %email.to.join(", "),
            from = %email.from,
            subject = %email.subject,
            body = %body,
            "Email not delivered; logged only"
        );
        Ok(())
    }
}
