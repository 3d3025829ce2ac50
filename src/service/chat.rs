//! Wrapper around chat clients.

use crate::{
    base::{
        config::Config,
        types::{ActionStyle, ResponseCard, Res, Void},
    },
    interaction,
    service::wattpad::StoryClient,
};
use async_trait::async_trait;
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use slack_morphism::prelude::*;
use tracing::{info, instrument, warn};
use url::Url;

use std::{ops::Deref, sync::Arc};

// Type aliases.

type FullClient = slack_morphism::SlackClient<SlackClientHyperConnector<HttpsConnector<HttpConnector>>>;

// Traits.

/// Generic "chat" trait that clients must implement.
#[async_trait]
pub trait GenericChatClient {
    /// Get the bot user ID.
    fn bot_user_id(&self) -> &str;
    /// Start the chat client listener.
    async fn start(&self) -> Void;
    /// Send a response card as a threaded reply, returning the sent message's timestamp.
    async fn send_card(&self, channel_id: &str, thread_ts: &str, card: &ResponseCard) -> Res<String>;
    /// React to a message with an emoji.
    async fn react_to_message(&self, channel_id: &str, ts: &str, emoji: &str) -> Void;
}

// Structs.

/// User state for the slack socket client.
struct SlackUserState {
    config: Config,
    stories: StoryClient,
    chat_client: ChatClient,
    bot_user_id: String,
}

/// Chat client for the application.
///
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct ChatClient {
    inner: Arc<dyn GenericChatClient + Send + Sync + 'static>,
}

impl Deref for ChatClient {
    type Target = dyn GenericChatClient + Send + Sync + 'static;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl ChatClient {
    /// Creates a new Slack chat client.
    pub async fn slack(config: &Config, stories: StoryClient) -> Res<Self> {
        let client = SlackChatClient::new(config, stories).await?;
        Ok(Self { inner: Arc::new(client) })
    }

    /// Creates a chat client from any [`GenericChatClient`] implementation.
    pub fn new(inner: Arc<dyn GenericChatClient + Send + Sync + 'static>) -> Self {
        Self { inner }
    }
}

impl From<SlackChatClient> for ChatClient {
    fn from(client: SlackChatClient) -> Self {
        Self { inner: Arc::new(client) }
    }
}

// Specific implementations.

/// Slack client implementation.
#[derive(Clone)]
struct SlackChatClient {
    app_token: SlackApiToken,
    bot_token: SlackApiToken,
    bot_user_id: String,
    client: Arc<FullClient>,
    config: Config,
    stories: StoryClient,
}

impl Deref for SlackChatClient {
    type Target = FullClient;

    fn deref(&self) -> &Self::Target {
        &self.client
    }
}

impl SlackChatClient {
    /// Create a new Slack chat client.
    #[instrument(name = "SlackChatClient::new", skip_all)]
    pub async fn new(config: &Config, stories: StoryClient) -> Res<Self> {
        // Initialize tokens.

        let app_token = SlackApiToken::new(SlackApiTokenValue(config.slack_app_token.clone()));
        let bot_token = SlackApiToken::new(SlackApiTokenValue(config.slack_bot_token.clone()));

        // Initialize the Slack client.

        let https_connector = HttpsConnector::<HttpConnector>::builder().with_native_roots()?.https_only().enable_all_versions().build();
        let connector = SlackClientHyperConnector::with_connector(https_connector);
        let client = Arc::new(slack_morphism::SlackClient::new(connector));

        // Get the bot's user ID, so its own replies never re-trigger the pipeline.

        let session = client.open_session(&bot_token);
        let bot_user = session.auth_test().await?;
        let bot_user_id = bot_user.user_id.0;

        info!("Slack bot user ID: {}", bot_user_id);

        Ok(Self {
            app_token,
            bot_token,
            bot_user_id,
            client,
            config: config.clone(),
            stories,
        })
    }
}

/// Renders a platform-neutral response card as Slack blocks.
///
/// Block Kit has no color rail, so the card's color is not painted here.
fn card_blocks(card: &ResponseCard) -> Res<Vec<SlackBlock>> {
    let image_url = Url::parse(&card.image_url)?;

    let mut buttons: Vec<SlackActionBlockElement> = Vec::with_capacity(card.actions.len());
    for (index, action) in card.actions.iter().enumerate() {
        let mut button = SlackBlockButtonElement::new(format!("story-card-action-{index}").into(), pt!("{}", action.label)).with_url(Url::parse(&action.url)?);

        if action.style == ActionStyle::Emphasized {
            button = button.with_style(SlackBlockButtonStyle::Primary);
        }

        buttons.push(button.into());
    }

    Ok(slack_blocks![
        some_into(SlackHeaderBlock::new(pt!("{}", card.title))),
        some_into(SlackSectionBlock::new().with_text(md!("{}", card.summary))),
        some_into(SlackImageBlock::new(SlackImageUrlOrFile::ImageUrl { image_url }, card.title.clone())),
        some_into(SlackActionsBlock::new(buttons))
    ])
}

#[async_trait]
impl GenericChatClient for SlackChatClient {
    fn bot_user_id(&self) -> &str {
        &self.bot_user_id
    }

    async fn start(&self) -> Void {
        // Initialize the socket mode listener.

        let socket_mode_callbacks = SlackSocketModeListenerCallbacks::new()
            .with_command_events(handle_command_event)
            .with_interaction_events(handle_interaction_event)
            .with_push_events(handle_push_event);

        // Initialize the socket mode listener environment.

        let listener_environment = Arc::new(SlackClientEventsListenerEnvironment::new(self.client.clone()).with_user_state(SlackUserState {
            config: self.config.clone(),
            stories: self.stories.clone(),
            bot_user_id: self.bot_user_id.clone(),
            chat_client: ChatClient::from(self.clone()),
        }));

        let socket_mode_listener = Arc::new(SlackClientSocketModeListener::new(
            &SlackClientSocketModeConfig::new(),
            listener_environment.clone(),
            socket_mode_callbacks,
        ));

        // Register an app token to listen for events,
        socket_mode_listener.listen_for(&self.app_token).await?;

        // Start WS connections calling Slack API to get WS url for the token,
        // and wait for Ctrl-C to shutdown.
        socket_mode_listener.serve().await;

        Ok(())
    }

    #[instrument(skip(self, card))]
    async fn send_card(&self, channel_id: &str, thread_ts: &str, card: &ResponseCard) -> Res<String> {
        let content = SlackMessageContent::new().with_blocks(card_blocks(card)?);

        let request = SlackApiChatPostMessageRequest::new(SlackChannelId(channel_id.to_string()), content).with_as_user(true).with_thread_ts(SlackTs(thread_ts.to_string()));

        let session = self.client.open_session(&self.bot_token);

        let response = session.chat_post_message(&request).await.map_err(|e| anyhow::anyhow!("Failed to send card: {}", e))?;

        Ok(response.ts.0)
    }

    #[instrument(skip(self))]
    async fn react_to_message(&self, channel_id: &str, ts: &str, emoji: &str) -> Void {
        let request = SlackApiReactionsAddRequest { channel: SlackChannelId(channel_id.to_string()), name: SlackReactionName(emoji.to_string()), timestamp: SlackTs(ts.to_string()) };

        let session = self.client.open_session(&self.bot_token);

        let _ = session.reactions_add(&request).await.map_err(|e| anyhow::anyhow!("Failed to react to message: {}", e))?;

        Ok(())
    }
}

// Socket mode listener callbacks for Slack.

/// Handles command events from Slack.
async fn handle_command_event(
    event: SlackCommandEvent,
    _client: Arc<SlackHyperClient>,
    _states: SlackClientEventsUserState,
) -> Result<SlackCommandEventResponse, Box<dyn std::error::Error + Send + Sync>> {
    warn!("[COMMAND] {:#?}", event);
    Ok(SlackCommandEventResponse::new(SlackMessageContent::new().with_text("No app commands are currently supported.".into())))
}

/// Handles interaction events from Slack.
async fn handle_interaction_event(event: SlackInteractionEvent, _client: Arc<SlackHyperClient>, _states: SlackClientEventsUserState) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    warn!("[INTERACTION] {:#?}", event);
    Ok(())
}

/// Handles push events from Slack.
#[instrument(skip_all)]
async fn handle_push_event(event_callback: SlackPushEventCallback, _client: Arc<SlackHyperClient>, states: SlackClientEventsUserState) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let event = event_callback.event;
    let states = states.read().await;
    let user_state = states.get_user_state::<SlackUserState>().ok_or(anyhow::anyhow!("Failed to get user state"))?;

    match event {
        SlackEventCallbackBody::Message(slack_message_event) => {
            // Never react to bots (including this one); their replies would re-trigger the pipeline.
            if slack_message_event.sender.bot_id.is_some() {
                return Ok(());
            }

            if slack_message_event.sender.user.as_ref().is_some_and(|user| user.0 == user_state.bot_user_id) {
                return Ok(());
            }

            let text = slack_message_event.content.as_ref().and_then(|c| c.text.clone()).unwrap_or_default();
            let channel_id = slack_message_event.origin.channel.as_ref().ok_or(anyhow::anyhow!("Failed to get channel ID"))?.0.to_owned();
            let thread_ts = slack_message_event.origin.ts.0.to_owned();

            interaction::link_event::handle_link_event(text, channel_id, thread_ts, user_state.config.clone(), user_state.stories.clone(), user_state.chat_client.clone());
        }
        _ => {
            warn!("Received unhandled push event.")
        }
    }

    Ok(())
}
