use crate::transports::TlsConfig;
use crate::{FileTransport, LogTransport, Mailer, MailerError, SmtpTransport};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailerConfig {
    pub transport: TransportConfig,
    pub from_address: String,
    pub from_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransportConfig {
    Log,
    File {
        output_dir: PathBuf,
    },
    Smtp {
        host: String,
        port: Option<u16>,
        username: Option<String>,
        password: Option<String>,
        tls: Option<TlsConfig>,
    },
}

impl MailerConfig {
    /// Read configuration from `MAILER_*` environment variables.
    ///
    /// `MAILER_FROM_ADDRESS` and `MAILER_FROM_NAME` are required. `MAILER_SMTP_HOST` selects the SMTP transport,
    /// `MAILER_FILE_OUTPUT_DIR` the file transport, and without either mail is only logged.
    pub fn from_env() -> Result<Self, MailerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`MailerConfig::from_env`] with an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, MailerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |key: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| MailerError::Config(format!("{key} is not configured")))
        };

        let transport = if let Some(host) = lookup("MAILER_SMTP_HOST") {
            let port = match lookup("MAILER_SMTP_PORT") {
                Some(port) => Some(port.parse::<u16>().map_err(|_| {
                    MailerError::Config(format!("MAILER_SMTP_PORT is not a valid port: {port}"))
                })?),
                None => None,
            };

            let username = lookup("MAILER_SMTP_USERNAME");
            let password = match username {
                Some(_) => Some(require("MAILER_SMTP_PASSWORD")?),
                None => None,
            };

            let tls = lookup("MAILER_SMTP_TLS")
                .map(|tls| tls.parse::<TlsConfig>())
                .transpose()?;

            TransportConfig::Smtp {
                host,
                port,
                username,
                password,
                tls,
            }
        } else if let Some(output_dir) = lookup("MAILER_FILE_OUTPUT_DIR") {
            TransportConfig::File {
                output_dir: PathBuf::from(output_dir),
            }
        } else {
            TransportConfig::Log
        };

        Ok(Self {
            transport,
            from_address: require("MAILER_FROM_ADDRESS")?,
            from_name: Some(require("MAILER_FROM_NAME")?),
        })
    }

    pub fn build_transport(&self) -> Result<Box<dyn Mailer>, MailerError> {
        match &self.transport {
            TransportConfig::Log => Ok(Box::new(LogTransport::new())),
            TransportConfig::File { output_dir } => Ok(Box::new(FileTransport::new(output_dir)?)),
            TransportConfig::Smtp {
                host,
                port,
                username,
                password,
                tls,
            } => {
                let mut builder = SmtpTransport::builder(host);

                if let Some(port) = port {
                    builder = builder.port(*port);
                }

                if let (Some(username), Some(password)) = (username, password) {
                    builder = builder.credentials(username, password);
                }

                if let Some(tls) = tls {
                    builder = builder.tls(*tls);
                }

                Ok(Box::new(builder.build()?))
            }
        }
    }

    pub fn get_from_address(&self) -> String {
        if let Some(name) = &self.from_name {
            format!("{} <{}>", name, self.from_address)
        } else {
            self.from_address.clone()
        }
    }
}

impl Default for MailerConfig {
    fn default() -> Self {
        Self {
            transport: TransportConfig::Log,
            from_address: "noreply@example.com".to_string(),
            from_name: None,
        }
    }
}
