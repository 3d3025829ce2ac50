//! Library root for `wpd-bot`.
//!
//! Wpd-bot watches chat messages for embedded Wattpad story and part links and
//! replies with one rich card per unique story:
//! - Extracts story/part ids from message text
//! - Resolves each reference against the Wattpad v3 API
//! - Deduplicates references that point at the same story
//! - Replies with a summary card carrying download/view buttons, then attaches
//!   thumbs-up/down feedback reactions
//!
//! The bot integrates with Slack for chat and Wattpad for story metadata. The
//! architecture is built around extensible traits that allow for different
//! implementations of each service.

#[deny(missing_docs)]
pub mod base;
pub mod interaction;
pub mod runtime;
pub mod service;

use base::{config::Config, types::Void};
use rustls::crypto;
use tracing::info;

/// Public async entry for the binary crate.
///
/// Sets up necessary services and starts the wpd-bot runtime:
/// - Initializes the crypto provider
/// - Creates the runtime context with the story and chat clients
/// - Starts the main event loop for processing messages
pub async fn start(config: Config) -> Void {
    info!("Starting wpd-bot ...");

    // Start the crypto provider.
    crypto::ring::default_provider().install_default().unwrap();

    // Initialize the runtime.
    let runtime = runtime::Runtime::new(config).await?;

    // Start the runtime.
    runtime.start().await?;

    Ok(())
}
