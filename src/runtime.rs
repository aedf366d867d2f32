//! The poll loop that drives taggart.
//!
//! Once connected, the loop repeats forever:
//! - read a batch of events from the chat session
//! - dispatch them into per-message responses
//! - post the resolved links for each response
//! - sleep for the configured delay

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error, info, instrument, warn};

use crate::{
    base::{
        config::Config,
        types::{Res, Void},
    },
    interaction::{dispatch::EventDispatcher, extract::TicketExtractor, link::LinkResolver},
    service::chat::ChatClient,
};

// Traits.

/// Waits between poll cycles.
///
/// Injected so that tests can run many cycles without real delay.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

// Structs.

/// Where the loop is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Connecting,
    Running,
}

/// Runtime service context and poll loop.
///
/// This struct holds the chat client, the message processing components and
/// configuration.
pub struct Runtime<S = TokioSleeper>
where
    S: Sleeper,
{
    /// The configuration for the application.
    pub config: Config,
    /// The chat client instance.
    pub chat: ChatClient,
    dispatcher: EventDispatcher,
    resolver: LinkResolver,
    sleeper: S,
    state: LoopState,
}

impl Runtime {
    /// Create a new runtime instance backed by Slack.
    #[instrument(skip_all)]
    pub fn new(config: Config) -> Res<Self> {
        config.validate_listener()?;

        let chat = ChatClient::slack(&config)?;

        Self::with_parts(config, chat, TokioSleeper)
    }
}

impl<S> Runtime<S>
where
    S: Sleeper,
{
    /// Create a runtime from an explicit chat client and sleeper.
    pub fn with_parts(config: Config, chat: ChatClient, sleeper: S) -> Res<Self> {
        let extractor = TicketExtractor::new(&config)?;
        let dispatcher = EventDispatcher::new(extractor, config.empty_ticket_policy);
        let resolver = LinkResolver::new(&config);

        Ok(Self {
            config,
            chat,
            dispatcher,
            resolver,
            sleeper,
            state: LoopState::Connecting,
        })
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Connect, then poll until the event stream fails.
    ///
    /// A connect failure is returned immediately and never retried.
    pub async fn start(&mut self) -> Void {
        self.connect().await?;

        loop {
            self.cycle().await?;
        }
    }

    /// Connect the chat session and move to `Running`.
    #[instrument(skip_all)]
    pub async fn connect(&mut self) -> Void {
        self.state = LoopState::Connecting;

        self.chat.connect().await?;

        match (self.chat.bot_user_id(), self.config.bot_id.as_deref()) {
            (Some(actual), Some(expected)) if actual != expected => {
                warn!("Configured bot ID `{}` does not match the connected user `{}`.", expected, actual);
            }
            (None, _) => warn!("Connected without a bot user ID."),
            _ => {}
        }

        self.state = LoopState::Running;
        info!("Taggart is listening.");

        Ok(())
    }

    /// Run a single read → dispatch → post → sleep cycle.
    ///
    /// Returns the number of messages posted. Post failures are logged and
    /// skipped; read failures are returned.
    #[instrument(level = "trace", skip_all)]
    pub async fn cycle(&self) -> Res<usize> {
        let events = self.chat.read_events().await?;
        let responses = self.dispatcher.dispatch(&events);

        let mut posted = 0;

        for response in responses {
            let text = self.resolver.render(&response.tickets);

            debug!("Posting {} link(s) to {}.", response.tickets.len(), response.channel);

            match self.chat.post_message(&response.channel, &text).await {
                Ok(()) => {
                    info!("Posted {} link(s) to {}.", response.tickets.len(), response.channel);
                    posted += 1;
                }
                Err(err) => error!("Failed to post to {}: {}", response.channel, err),
            }
        }

        self.sleeper.sleep(Duration::from_millis(self.config.read_delay_ms)).await;

        Ok(posted)
    }
}
