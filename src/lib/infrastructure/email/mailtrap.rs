//! Mailtrap sending API implementation

use std::{fmt, time::Duration};

use async_trait::async_trait;
use clap::Parser;
use reqwest::{Client, StatusCode, Url};
use serde::Serialize;
use tracing::{debug, error, info};

use crate::domain::communication::mailer::{Mailer, MailerError, Message};

use super::ConfigError;

/// Mailtrap API configuration
#[derive(Clone, PartialEq, Eq, Parser)]
pub struct MailtrapApiConfig {
    /// The send endpoint
    #[clap(long = "mailtrap-api-url", env = "MAILTRAP_API_URL")]
    pub api_url: Url,

    /// The bearer token
    #[clap(long = "mailtrap-api-token", env = "MAILTRAP_API_TOKEN", hide_env_values = true)]
    pub api_token: String,

    /// Display name shown for the sender
    #[clap(
        long = "mailtrap-sender-name",
        env = "MAILTRAP_SENDER_NAME",
        default_value = "Mailtrap Test"
    )]
    pub sender_name: String,

    /// Category attached to every message
    #[clap(
        long = "mailtrap-category",
        env = "MAILTRAP_CATEGORY",
        default_value = "Integration Test"
    )]
    pub category: String,

    /// Seconds to wait for the API before giving up
    #[clap(
        long = "mailtrap-api-timeout-secs",
        env = "MAILTRAP_API_TIMEOUT_SECS",
        default_value = "10"
    )]
    pub timeout_secs: u64,
}

impl MailtrapApiConfig {
    /// The configured timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl fmt::Debug for MailtrapApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailtrapApiConfig")
            .field("api_url", &self.api_url.as_str())
            .field("api_token", &"<redacted>")
            .field("sender_name", &self.sender_name)
            .field("category", &self.category)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// JSON body of a send request
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct ApiPayload<'a> {
    /// The sender
    pub from: Sender<'a>,

    /// The recipients
    pub to: Vec<Recipient<'a>>,

    /// The subject line
    pub subject: &'a str,

    /// The plain text body
    pub text: &'a str,

    /// The message category
    pub category: &'a str,
}

/// Sender of a send request
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct Sender<'a> {
    /// Sender address
    pub email: &'a str,

    /// Sender display name
    pub name: &'a str,
}

/// Recipient of a send request
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct Recipient<'a> {
    /// Recipient address
    pub email: &'a str,
}

impl<'a> ApiPayload<'a> {
    /// Maps a [`Message`] onto the API's JSON shape; fields are carried verbatim.
    pub fn new(message: &'a Message, sender_name: &'a str, category: &'a str) -> Self {
        Self {
            from: Sender {
                email: message.sender(),
                name: sender_name,
            },
            to: vec![Recipient {
                email: message.recipient(),
            }],
            subject: message.subject(),
            text: message.body(),
            category,
        }
    }
}

/// Mailer that posts messages to the Mailtrap sending API
#[derive(Debug, Clone)]
pub struct MailtrapApiMailer {
    config: MailtrapApiConfig,
    client: Client,
}

impl MailtrapApiMailer {
    /// Create a new API mailer
    pub fn new(config: MailtrapApiConfig) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(ConfigError::HttpClient)?;

        Ok(Self { config, client })
    }

    /// The request body that would be sent for `message`
    pub fn payload<'a>(&'a self, message: &'a Message) -> ApiPayload<'a> {
        ApiPayload::new(message, &self.config.sender_name, &self.config.category)
    }

    async fn deliver(&self, message: &Message) -> Result<(), MailerError> {
        debug!("posting message to {}", self.config.api_url);

        let response = self
            .client
            .post(self.config.api_url.clone())
            .bearer_auth(&self.config.api_token)
            .json(&self.payload(message))
            .send()
            .await
            .map_err(|e| MailerError::Network(e.into()))?;

        let status = response.status();

        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(MailerError::Unauthorized {
                status: status.as_u16(),
                body,
            }),
            _ => Err(MailerError::HttpStatus {
                status: status.as_u16(),
                body,
            }),
        }
    }
}

#[async_trait]
impl Mailer for MailtrapApiMailer {
    async fn send(&self, message: &Message) -> Result<(), MailerError> {
        let result = self.deliver(message).await;

        match &result {
            Ok(()) => info!("Email sent successfully via Mailtrap API!"),
            Err(e) => error!("Error sending email via Mailtrap API: {}", e),
        }

        result
    }
}
