use crate::{Email, MailerError};
use async_trait::async_trait;

/// A transport that can deliver a fully formed [`Email`].
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_email(&self, email: Email) -> Result<(), MailerError>;
}

#[async_trait]
impl Mailer for Box<dyn Mailer> {
    async fn send_email(&self, email: Email) -> Result<(), MailerError> {
        (**self).send_email(email).await
    }
}

/// The capability the identity layer depends on to send account emails.
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), MailerError>;
}

#[derive(Debug, Clone)]
pub struct MailerService<T: Mailer> {
    transport: T,
    from: String,
}

impl<T: Mailer> MailerService<T> {
    pub fn new(transport: T, from: impl Into<String>) -> Self {
        Self {
            transport,
            from: from.into(),
        }
    }

    pub fn from_address(&self) -> &str {
        &self.from
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}

#[async_trait]
impl<T: Mailer> Mailer for MailerService<T> {
    async fn send_email(&self, email: Email) -> Result<(), MailerError> {
        self.transport.send_email(email).await
    }
}

#[async_trait]
impl<T: Mailer> EmailSender for MailerService<T> {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), MailerError> {
        let email = Email::builder()
            .to(to)
            .from(self.from.as_str())
            .subject(subject)
            .html_body(html_body)
            .build()?;

        self.transport.send_email(email).await?;
        tracing::info!(to = %to, subject = %subject, "Email sent");
        Ok(())
    }
}
