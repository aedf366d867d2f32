pub mod slack;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;
use serde_json::Value;

use crate::base::types::{RawEvent, Res, Void};

// Traits.

/// Generic "chat" trait that clients must implement.
///
/// This trait defines the session the poll loop runs against: connect once,
/// then repeatedly read a batch of events and post replies. Implementing this
/// trait allows different chat services to be used with taggart.
#[async_trait]
pub trait GenericChatClient: Send + Sync + 'static {
    /// Get the bot user ID, once it is known.
    fn bot_user_id(&self) -> Option<String>;

    /// Establish the session and begin receiving events.
    ///
    /// A failure here is fatal to the poll loop.
    async fn connect(&self) -> Void;

    /// Read every event received since the previous read.
    ///
    /// Returns an empty batch when nothing new has arrived, and an error when
    /// the event stream is gone for good.
    async fn read_events(&self) -> Res<Vec<RawEvent>>;

    /// Post a message to a channel as the bot.
    async fn post_message(&self, channel_id: &str, text: &str) -> Void;

    /// List the raw user directory records of the workspace.
    ///
    /// Only used by diagnostics; never called from the poll loop.
    async fn list_users(&self) -> Res<Vec<Value>>;
}

// Structs.

/// Chat client for the application.
///
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct ChatClient {
    inner: Arc<dyn GenericChatClient>,
}

impl Deref for ChatClient {
    type Target = dyn GenericChatClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl ChatClient {
    pub fn new(inner: Arc<dyn GenericChatClient>) -> Self {
        Self { inner }
    }
}
