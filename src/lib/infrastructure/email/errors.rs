//! Backend construction errors

use thiserror::Error;

/// A backend could not be constructed from its configuration.
///
/// These are fatal: they surface once, at startup, before any send is attempted.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No SMTP host was configured
    #[error("SMTP host is empty")]
    MissingHost,

    /// Only one of username and password was configured
    #[error("SMTP {present} is set but {missing} is not; set both to authenticate or neither to skip authentication")]
    PartialCredentials {
        /// The credential that was provided
        present: &'static str,

        /// The credential that was missing
        missing: &'static str,
    },

    /// The HTTP client could not be built
    #[error("could not build the HTTP client")]
    HttpClient(#[source] reqwest::Error),
}
