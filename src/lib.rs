//! Library root for `taggart`.
//!
//! Taggart is a Slack bot that watches channels for ticket references
//! (e.g., `TT-123`, `DESK-45`) and replies with links to the issue tracker.
//!
//! The bot polls its chat session for events, extracts ticket references
//! from plain text messages, and posts one message of links per originating
//! message. The chat platform sits behind a trait so the loop can run against
//! any implementation.

pub mod base;
pub mod interaction;
pub mod prelude;
pub mod runtime;
pub mod service;

use base::{config::Config, types::Void};
use interaction::user_lookup::lookup_users;
use rustls::crypto;
use service::chat::ChatClient;
use tracing::info;

/// Installs the process-wide crypto provider, if none is installed yet.
fn install_crypto_provider() {
    let _ = crypto::ring::default_provider().install_default();
}

/// Public async entry for the binary crate.
///
/// Sets up necessary services and starts the taggart poll loop:
/// - Initializes the crypto provider
/// - Creates the runtime with the Slack chat client
/// - Connects and polls until the process is stopped
pub async fn start(config: Config) -> Void {
    info!("Starting taggart ...");

    install_crypto_provider();

    // Initialize the runtime.
    let mut runtime = runtime::Runtime::new(config)?;

    // Start the runtime.
    runtime.start().await?;

    Ok(())
}

/// Prints the user IDs for the given names (or every user).
///
/// This is a diagnostic helper and does not start the poll loop.
pub async fn print_users(config: Config, names: Vec<String>) -> Void {
    install_crypto_provider();

    let chat = ChatClient::slack(&config)?;

    for user in lookup_users(&chat, &names).await {
        println!("{}: {}", user.name, user.id);
    }

    Ok(())
}
