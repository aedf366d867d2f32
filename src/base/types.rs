use std::{fmt, ops::Deref};

use serde::{Deserialize, Serialize};

pub type Err = anyhow::Error;
pub type Res<T> = Result<T, Err>;
pub type Void = Res<()>;

/// A single event as delivered by the chat transport.
///
/// Only the fields the bot cares about are kept; everything else in the
/// transport payload is ignored during deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEvent {
    /// The event `type` tag (e.g., `message`, `presence_change`).
    #[serde(rename = "type")]
    pub kind: String,
    /// The message text, if any.
    #[serde(default)]
    pub text: Option<String>,
    /// The originating channel ID.
    #[serde(default)]
    pub channel: Option<String>,
}

impl RawEvent {
    /// Convenience constructor for a plain text message event.
    pub fn message(channel: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            kind: "message".to_string(),
            text: Some(text.into()),
            channel: Some(channel.into()),
        }
    }
}

/// A normalized (uppercase) ticket key, e.g. `TT-123`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketReference(String);

impl TicketReference {
    /// Normalizes a raw match into a reference.
    pub fn normalize(raw: &str) -> Self {
        Self(raw.to_uppercase())
    }
}

impl Deref for TicketReference {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for TicketReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The tickets found in one message, and the channel to reply in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelResponse {
    pub tickets: Vec<TicketReference>,
    pub channel: String,
}

/// A fully-qualified tracker URL for a ticket.
pub type ResolvedLink = String;

/// What to do with a message that mentions no tickets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyTicketPolicy {
    /// Produce no response at all.
    #[default]
    Suppress,
    /// Produce a response with no tickets, which posts an empty message.
    PostEmpty,
}
