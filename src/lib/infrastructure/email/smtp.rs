//! SMTP email service implementation

use std::{convert::Infallible, fmt, time::Duration};

use async_trait::async_trait;
use clap::{ArgAction, Parser};
use lettre::{
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
        Error as SmtpError,
    },
    AsyncSmtpTransport, AsyncTransport, Tokio1Executor,
};
use tracing::{debug, error, info, warn};

use crate::domain::communication::mailer::{Mailer, MailerError, Message};

use super::ConfigError;

/// Reply codes a server uses to refuse credentials
const AUTH_REJECTION_CODES: [&str; 4] = ["530", "534", "535", "538"];

/// SMTP configuration
#[derive(Clone, PartialEq, Eq, Parser)]
pub struct SmtpConfig {
    /// The SMTP host
    #[clap(long = "smtp-host", env = "SMTP_HOST")]
    pub host: String,

    /// The SMTP port
    #[clap(long = "smtp-port", env = "SMTP_PORT")]
    pub port: u16,

    /// The SMTP username
    #[clap(long = "smtp-username", env = "SMTP_USERNAME")]
    pub username: Option<String>,

    /// The SMTP password
    #[clap(long = "smtp-password", env = "SMTP_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Upgrade the connection with STARTTLS before authenticating
    #[clap(
        long = "smtp-use-tls",
        env = "SMTP_USE_TLS",
        default_value = "False",
        action = ArgAction::Set,
        value_parser = parse_flag
    )]
    pub use_tls: bool,

    /// Seconds to wait on the server before giving up
    #[clap(long = "smtp-timeout-secs", env = "SMTP_TIMEOUT_SECS", default_value = "10")]
    pub timeout_secs: u64,
}

impl SmtpConfig {
    /// Connection parameters for a MailHog instance on the loopback interface
    pub fn mailhog() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 1025,
            username: None,
            password: None,
            use_tls: false,
            timeout_secs: 10,
        }
    }

    /// The configured timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Credentials, if both a username and a password are set
    pub fn credentials(&self) -> Option<Credentials> {
        match (present(&self.username), present(&self.password)) {
            (Some(username), Some(password)) => {
                Some(Credentials::new(username.to_string(), password.to_string()))
            }
            _ => None,
        }
    }

    /// Checks the configuration for a relay.
    ///
    /// Setting exactly one of username and password is rejected rather than
    /// silently skipping authentication.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::MissingHost);
        }

        match (present(&self.username), present(&self.password)) {
            (Some(_), None) => Err(ConfigError::PartialCredentials {
                present: "username",
                missing: "password",
            }),
            (None, Some(_)) => Err(ConfigError::PartialCredentials {
                present: "password",
                missing: "username",
            }),
            _ => Ok(()),
        }
    }
}

impl fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("use_tls", &self.use_tls)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Only the exact literal `True` turns the flag on.
fn parse_flag(raw: &str) -> Result<bool, Infallible> {
    Ok(raw == "True")
}

/// SMTP mailer
///
/// Opens a fresh connection for every message and closes it once the
/// submission has finished, successfully or not.
#[derive(Debug, Clone)]
pub struct SmtpMailer {
    config: SmtpConfig,
}

impl SmtpMailer {
    /// Create a new SMTP mailer without validating the configuration.
    ///
    /// Authentication is skipped unless both username and password are set.
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    /// A mailer for a local MailHog test server: loopback, no TLS, no credentials
    pub fn mailhog() -> Self {
        Self::new(SmtpConfig::mailhog())
    }

    /// A mailer for an authenticated relay, validated up front
    pub fn relay(config: SmtpConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        if config.credentials().is_none() {
            warn!(
                "no SMTP credentials configured for {}, sending unauthenticated",
                config.host
            );
        }

        Ok(Self::new(config))
    }

    /// The connection parameters
    pub fn config(&self) -> &SmtpConfig {
        &self.config
    }

    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, MailerError> {
        let mut builder =
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(self.config.host.as_str())
                .port(self.config.port)
                .timeout(Some(self.config.timeout()));

        if self.config.use_tls {
            let parameters = TlsParameters::new(self.config.host.clone()).map_err(|e| {
                MailerError::Tls {
                    host: self.config.host.clone(),
                    source: e.into(),
                }
            })?;

            builder = builder.tls(Tls::Required(parameters));
        }

        if let Some(credentials) = self.config.credentials() {
            builder = builder.credentials(credentials);
        }

        Ok(builder.build())
    }

    async fn deliver(&self, message: &Message) -> Result<(), MailerError> {
        let email = message.to_email()?;

        debug!(
            "connecting to {}:{} (tls: {})",
            self.config.host, self.config.port, self.config.use_tls
        );

        self.transport()?
            .send(email)
            .await
            .map_err(|e| self.classify(e))?;

        Ok(())
    }

    fn classify(&self, err: SmtpError) -> MailerError {
        let host = self.config.host.clone();

        if err.is_tls() {
            MailerError::Tls {
                host,
                source: err.into(),
            }
        } else if self.config.use_tls && is_starttls_refusal(&err) {
            MailerError::Tls {
                host,
                source: err.into(),
            }
        } else if is_auth_rejection(&err) {
            MailerError::Authentication {
                host,
                source: err.into(),
            }
        } else if err.is_transient() || err.is_permanent() {
            MailerError::Rejected {
                host,
                source: err.into(),
            }
        } else {
            MailerError::Connection {
                host,
                source: err.into(),
            }
        }
    }
}

/// lettre reports a server without STARTTLS as a client error
fn is_starttls_refusal(err: &SmtpError) -> bool {
    err.is_client() && err.to_string().contains("STARTTLS")
}

fn is_auth_rejection(err: &SmtpError) -> bool {
    err.status()
        .is_some_and(|code| AUTH_REJECTION_CODES.contains(&code.to_string().as_str()))
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, message: &Message) -> Result<(), MailerError> {
        let result = self.deliver(message).await;

        match &result {
            Ok(()) => info!("Email sent successfully via {}", self.config.host),
            Err(e) => error!("Error sending email via {}: {}", self.config.host, e),
        }

        result
    }
}
