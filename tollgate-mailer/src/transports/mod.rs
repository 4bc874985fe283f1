mod file;
mod log;
pub mod smtp;

pub use file::FileTransport;
pub use log::LogTransport;
pub use smtp::{SmtpTransport, TlsConfig};
