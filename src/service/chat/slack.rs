//! Slack chat session for taggart.
//!
//! This module connects to Slack in socket mode and adapts its push events to
//! the poll-based `GenericChatClient` contract:
//! - `connect` authenticates and starts the socket mode listener
//! - push events are queued as they arrive
//! - `read_events` drains the queue once per poll cycle
//! - replies are posted with `chat.postMessage`

use crate::base::{
    config::Config,
    types::{RawEvent, Res, Void},
};
use anyhow::Context;
use async_trait::async_trait;
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use serde_json::Value;
use slack_morphism::prelude::*;
use tokio::sync::{
    Mutex,
    mpsc::{self, UnboundedReceiver, UnboundedSender, error::TryRecvError},
};
use tracing::{debug, info, instrument};

use std::sync::{Arc, OnceLock};

use super::{ChatClient, GenericChatClient};

// Type aliases.

type FullClient = slack_morphism::SlackClient<SlackClientHyperConnector<HttpsConnector<HttpConnector>>>;
type Listener = SlackClientSocketModeListener<SlackClientHyperConnector<HttpsConnector<HttpConnector>>>;

// Extra methods on `ChatClient` applied by the slack implementation.

impl ChatClient {
    /// Creates a new Slack chat client.
    pub fn slack(config: &Config) -> Res<Self> {
        let client = SlackChatClient::new(config)?;
        Ok(Self { inner: Arc::new(client) })
    }
}

// Structs.

/// User state for the slack socket client.
struct SlackUserState {
    events: UnboundedSender<RawEvent>,
}

/// Slack client implementation.
struct SlackChatClient {
    app_token: SlackApiToken,
    bot_token: SlackApiToken,
    bot_user_id: OnceLock<String>,
    client: Arc<FullClient>,
    /// Handed to the listener on connect.
    sender: Mutex<Option<UnboundedSender<RawEvent>>>,
    receiver: Mutex<UnboundedReceiver<RawEvent>>,
    /// Kept alive for as long as the session is.
    listener: Mutex<Option<Arc<Listener>>>,
}

impl SlackChatClient {
    /// Create a new Slack chat client.
    #[instrument(name = "SlackChatClient::new", skip_all)]
    pub fn new(config: &Config) -> Res<Self> {
        // Initialize tokens.

        let app_token = SlackApiToken::new(SlackApiTokenValue(config.app_token.clone()));
        let bot_token = SlackApiToken::new(SlackApiTokenValue(config.bot_token.clone()));

        // Initialize the Slack client.

        let https_connector = HttpsConnector::<HttpConnector>::builder().with_native_roots()?.https_only().enable_all_versions().build();
        let connector = SlackClientHyperConnector::with_connector(https_connector);
        let client = Arc::new(slack_morphism::SlackClient::new(connector));

        let (sender, receiver) = mpsc::unbounded_channel();

        Ok(Self {
            app_token,
            bot_token,
            bot_user_id: OnceLock::new(),
            client,
            sender: Mutex::new(Some(sender)),
            receiver: Mutex::new(receiver),
            listener: Mutex::new(None),
        })
    }
}

#[async_trait]
impl GenericChatClient for SlackChatClient {
    fn bot_user_id(&self) -> Option<String> {
        self.bot_user_id.get().cloned()
    }

    #[instrument(skip(self))]
    async fn connect(&self) -> Void {
        // Get the bot's user ID, which also validates the bot token.

        let session = self.client.open_session(&self.bot_token);
        let bot_user = session.auth_test().await.context("Connection failed. Invalid Slack token or bot ID.")?;
        let bot_user_id = bot_user.user_id.0;

        info!("Slack bot user ID: {}", bot_user_id);

        let _ = self.bot_user_id.set(bot_user_id);

        // Initialize the socket mode listener.

        let sender = self.sender.lock().await.take().ok_or_else(|| anyhow::anyhow!("Slack session is already connected."))?;

        let socket_mode_callbacks = SlackSocketModeListenerCallbacks::new().with_push_events(handle_push_event);

        let listener_environment = Arc::new(SlackClientEventsListenerEnvironment::new(self.client.clone()).with_user_state(SlackUserState { events: sender }));

        let socket_mode_listener = Arc::new(SlackClientSocketModeListener::new(
            &SlackClientSocketModeConfig::new(),
            listener_environment,
            socket_mode_callbacks,
        ));

        // Register the app token, and start the WS connections without blocking.
        socket_mode_listener.listen_for(&self.app_token).await.context("Connection failed. Invalid Slack app token.")?;
        socket_mode_listener.start().await;

        *self.listener.lock().await = Some(socket_mode_listener);

        Ok(())
    }

    async fn read_events(&self) -> Res<Vec<RawEvent>> {
        let mut receiver = self.receiver.lock().await;
        drain(&mut receiver)
    }

    #[instrument(skip(self, text))]
    async fn post_message(&self, channel_id: &str, text: &str) -> Void {
        let message = SlackMessageContent::new().with_text(text.to_string());

        let request = SlackApiChatPostMessageRequest::new(SlackChannelId(channel_id.to_string()), message).with_as_user(true);

        let session = self.client.open_session(&self.bot_token);

        let _ = session.chat_post_message(&request).await.map_err(|e| anyhow::anyhow!("Failed to send message: {}", e))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_users(&self) -> Res<Vec<Value>> {
        let session = self.client.open_session(&self.bot_token);

        let response = session.users_list(&SlackApiUsersListRequest::new()).await.map_err(|e| anyhow::anyhow!("Failed to list users: {}", e))?;

        let users = response.members.iter().map(serde_json::to_value).collect::<Result<Vec<_>, _>>()?;

        Ok(users)
    }
}

// Helpers.

/// Takes everything currently queued without waiting.
fn drain(receiver: &mut UnboundedReceiver<RawEvent>) -> Res<Vec<RawEvent>> {
    let mut events = Vec::new();

    loop {
        match receiver.try_recv() {
            Ok(event) => events.push(event),
            Err(TryRecvError::Empty) => break,
            Err(TryRecvError::Disconnected) if events.is_empty() => return Err(anyhow::anyhow!("Slack event stream closed.")),
            Err(TryRecvError::Disconnected) => break,
        }
    }

    Ok(events)
}

/// Converts a push event (in its JSON form) to a `RawEvent`.
///
/// Returns `None` for payloads without a `type` tag.
fn raw_event(value: Value) -> Option<RawEvent> {
    serde_json::from_value(value).ok()
}

// Socket mode listener callbacks for Slack.

/// Handles push events from Slack by queueing them for the next read.
#[instrument(skip_all)]
async fn handle_push_event(event_callback: SlackPushEventCallback, _client: Arc<SlackHyperClient>, states: SlackClientEventsUserState) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let states = states.read().await;
    let user_state = states.get_user_state::<SlackUserState>().ok_or(anyhow::anyhow!("Failed to get user state"))?;

    let Some(event) = raw_event(serde_json::to_value(&event_callback.event)?) else {
        debug!("Skipping malformed push event.");
        return Ok(());
    };

    user_state.events.send(event).map_err(|_| anyhow::anyhow!("Event queue is closed."))?;

    Ok(())
}

// Tests.
