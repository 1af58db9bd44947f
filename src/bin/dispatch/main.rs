#![warn(
    missing_debug_implementations,
    rust_2018_idioms,
    missing_docs,
    rustdoc::broken_intra_doc_links,
    rustdoc::missing_crate_level_docs
)]

//! Sends one demonstration message through every configured backend

use anyhow::Result;
use clap::Parser;
use mail_dispatch::{
    domain::communication::{dispatcher::Dispatcher, mailer::Message},
    infrastructure::email::{MailtrapApiConfig, MailtrapApiMailer, SmtpConfig, SmtpMailer},
};
use tracing::{debug, info};

/// Command-line arguments / environment variables
#[derive(Debug, Parser)]
pub struct Args {
    /// The SMTP relay configuration
    #[clap(flatten)]
    pub smtp: SmtpConfig,

    /// The Mailtrap API configuration
    #[clap(flatten)]
    pub api: MailtrapApiConfig,
}

#[mutants::skip]
#[tokio::main]
async fn main() -> Result<()> {
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    if let Err(e) = dotenv {
        debug!("no .env file loaded: {}", e);
    }

    let args = Args::parse();

    let dispatcher = Dispatcher::new()
        .register("MailHog", SmtpMailer::mailhog())
        .register("Mailtrap SMTP", SmtpMailer::relay(args.smtp)?)
        .register("Mailtrap API", MailtrapApiMailer::new(args.api)?);

    let message = Message::new(
        "from@example.com",
        "to@example.com",
        "Hi Mailtrap",
        "This is a test email message.",
    );

    let deliveries = dispatcher.dispatch(&message).await;
    let delivered = deliveries.iter().filter(|d| d.is_success()).count();

    info!("{} of {} backends delivered", delivered, deliveries.len());

    Ok(())
}
