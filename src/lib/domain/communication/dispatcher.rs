//! Sequential dispatch of one message over several mailers

use std::{fmt, sync::Arc};

use tracing::debug;

use super::mailer::{Mailer, MailerError, Message};

/// The outcome of sending a message through one registered mailer
#[derive(Debug)]
pub struct Delivery {
    /// The label the mailer was registered under
    pub backend: String,

    /// Success, or the typed failure cause
    pub outcome: Result<(), MailerError>,
}

impl Delivery {
    /// Whether the backend accepted the message
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Sends a message through every registered mailer, one after the other
#[derive(Clone, Default)]
pub struct Dispatcher {
    mailers: Vec<(String, Arc<dyn Mailer>)>,
}

impl Dispatcher {
    /// Creates a dispatcher with no mailers
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a mailer under a label
    pub fn register(mut self, backend: impl Into<String>, mailer: impl Mailer) -> Self {
        self.mailers.push((backend.into(), Arc::new(mailer)));
        self
    }

    /// Sends `message` through each mailer in registration order.
    ///
    /// A failure in one backend never prevents the following ones from being tried.
    pub async fn dispatch(&self, message: &Message) -> Vec<Delivery> {
        let mut deliveries = Vec::with_capacity(self.mailers.len());

        for (backend, mailer) in &self.mailers {
            let outcome = mailer.send(message).await;

            debug!("{backend}: delivered: {}", outcome.is_ok());

            deliveries.push(Delivery {
                backend: backend.clone(),
                outcome,
            });
        }

        deliveries
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field(
                "mailers",
                &self.mailers.iter().map(|(name, _)| name).collect::<Vec<_>>(),
            )
            .finish()
    }
}
