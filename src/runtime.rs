//! Runtime services and shared state for wpd-bot.

use tracing::instrument;

use crate::{
    base::{
        config::Config,
        types::{Res, Void},
    },
    service::{chat::ChatClient, wattpad::StoryClient},
};

/// Runtime service context that can be shared across the application.
///
/// This struct holds the configuration, story client, and chat client.
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct Runtime {
    /// The configuration for the application.
    pub config: Config,
    /// The story metadata client instance.
    pub stories: StoryClient,
    /// The chat client instance.
    pub chat: ChatClient,
}

impl Runtime {
    /// Create a new runtime instance.
    #[instrument(skip_all)]
    pub async fn new(config: Config) -> Res<Self> {
        // Initialize the story metadata client.
        let stories = StoryClient::wattpad();

        // Initialize the chat client.
        let chat = ChatClient::slack(&config, stories.clone()).await?;

        Ok(Self { config, stories, chat })
    }

    pub async fn start(&self) -> Void {
        self.chat.start().await
    }
}
