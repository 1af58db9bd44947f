//! Email message

use lettre::message::{header::ContentType, Mailbox};

use super::MailerError;

/// Email message
///
/// Immutable once built; every backend receives the same fully populated value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    sender: String,
    recipient: String,
    subject: String,
    body: String,
}

impl Message {
    /// Create a new message
    pub fn new(
        sender: impl Into<String>,
        recipient: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            sender: sender.into(),
            recipient: recipient.into(),
            subject: subject.into(),
            body: body.into(),
        }
    }

    /// The envelope sender
    pub fn sender(&self) -> &str {
        &self.sender
    }

    /// The envelope recipient
    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    /// The subject line
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// The plain text body
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Builds the SMTP envelope: From, To and Subject headers and a plain text body.
    ///
    /// The envelope sender and recipient are derived from the From and To headers.
    pub fn to_email(&self) -> Result<lettre::Message, MailerError> {
        let email = lettre::Message::builder()
            .from(mailbox(&self.sender)?)
            .to(mailbox(&self.recipient)?)
            .subject(self.subject.as_str())
            .header(ContentType::TEXT_PLAIN)
            .body(self.body.clone())?;

        Ok(email)
    }

    /// Renders the SMTP envelope as RFC 5322 text.
    pub fn render(&self) -> Result<String, MailerError> {
        let email = self.to_email()?;

        Ok(String::from_utf8_lossy(&email.formatted()).into_owned())
    }
}

fn mailbox(address: &str) -> Result<Mailbox, MailerError> {
    address
        .parse()
        .map_err(|source| MailerError::InvalidAddress {
            address: address.to_string(),
            source,
        })
}
