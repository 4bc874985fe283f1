//! Email sending for tollgate.
//!
//! The identity layer only sees [`EmailSender`]. [`MailerService`] implements it on top of any
//! [`Mailer`] transport: [`LogTransport`] for development, [`FileTransport`] for inspecting
//! generated messages, and [`SmtpTransport`] for real delivery through a relay.
pub mod config;
pub mod email;
pub mod error;
pub mod mailer;
pub mod transports;

pub use config::{MailerConfig, TransportConfig};
pub use email::{Email, EmailBuilder};
pub use error::MailerError;
pub use mailer::{EmailSender, Mailer, MailerService};
pub use transports::{FileTransport, LogTransport, SmtpTransport, TlsConfig};

pub mod prelude {
    pub use crate::{
        Email, EmailBuilder, EmailSender, FileTransport, LogTransport, Mailer, MailerConfig,
        MailerError, MailerService, SmtpTransport,
    };
}
