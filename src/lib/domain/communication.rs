//! Communication module: messages, mailers and dispatching

pub mod dispatcher;
pub mod mailer;
