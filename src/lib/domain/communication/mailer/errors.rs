//! Mailer errors

use lettre::{address::AddressError, error::Error as EmailError};
use thiserror::Error;

/// Why a single delivery attempt failed.
///
/// Every variant is recoverable from the caller's point of view: it describes
/// one failed send and never affects later sends.
#[derive(Debug, Error)]
pub enum MailerError {
    /// The sender or recipient is not a valid mailbox
    #[error("invalid email address \"{address}\"")]
    InvalidAddress {
        /// The offending address
        address: String,

        /// The parse failure
        #[source]
        source: AddressError,
    },

    /// The message could not be assembled into an SMTP envelope
    #[error("could not build the email message")]
    InvalidMessage(#[source] EmailError),

    /// The SMTP server could not be reached, or the connection dropped
    #[error("could not connect to {host}")]
    Connection {
        /// The SMTP host
        host: String,

        /// Underlying transport diagnostic
        #[source]
        source: anyhow::Error,
    },

    /// The STARTTLS upgrade failed
    #[error("TLS negotiation with {host} failed")]
    Tls {
        /// The SMTP host
        host: String,

        /// Underlying transport diagnostic
        #[source]
        source: anyhow::Error,
    },

    /// The SMTP server refused the credentials
    #[error("authentication with {host} was rejected")]
    Authentication {
        /// The SMTP host
        host: String,

        /// Underlying transport diagnostic
        #[source]
        source: anyhow::Error,
    },

    /// The SMTP server refused the message
    #[error("{host} rejected the message")]
    Rejected {
        /// The SMTP host
        host: String,

        /// Underlying transport diagnostic
        #[source]
        source: anyhow::Error,
    },

    /// The API refused the bearer token
    #[error("unauthorized: the API rejected the token (HTTP {status})")]
    Unauthorized {
        /// The HTTP status code
        status: u16,

        /// The response body, if any
        body: String,
    },

    /// The API answered with a non-success status
    #[error("the API responded with HTTP {status}")]
    HttpStatus {
        /// The HTTP status code
        status: u16,

        /// The response body, if any
        body: String,
    },

    /// The API request never produced a response
    #[error("could not reach the API")]
    Network(#[source] anyhow::Error),
}

impl From<EmailError> for MailerError {
    fn from(err: EmailError) -> Self {
        MailerError::InvalidMessage(err)
    }
}
