//! Email delivery backends

pub mod errors;
pub mod mailtrap;
pub mod smtp;

#[cfg(test)]
mod sink;

pub use errors::ConfigError;
pub use mailtrap::{ApiPayload, MailtrapApiConfig, MailtrapApiMailer};
pub use smtp::{SmtpConfig, SmtpMailer};
