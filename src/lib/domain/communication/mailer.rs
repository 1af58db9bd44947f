//! Mailer capability

use async_trait::async_trait;

#[cfg(test)]
use mockall::mock;

mod errors;
mod message;

pub use errors::MailerError;
pub use message::Message;

/// Something that can deliver a [`Message`].
///
/// Implementations make a single attempt per call: no retries, no queueing and
/// no state carried over between calls.
#[async_trait]
pub trait Mailer: Send + Sync + 'static {
    /// Send an email
    ///
    /// # Arguments
    /// * `message` - The fully populated [`Message`] to deliver.
    ///
    /// # Returns
    /// - [`Ok`] if the backend accepted the message.
    /// - [`Err`] containing a [`MailerError`] describing why delivery failed.
    async fn send(&self, message: &Message) -> Result<(), MailerError>;
}

#[cfg(test)]
mock! {
    pub Mailer {}

    #[async_trait]
    impl Mailer for Mailer {
        async fn send(&self, message: &Message) -> Result<(), MailerError>;
    }
}
