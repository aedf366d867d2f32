pub use crate::{
    base::{
        config::Config,
        types::{ChannelResponse, Err, RawEvent, Res, TicketReference, Void},
    },
    interaction::{dispatch::EventDispatcher, extract::TicketExtractor, link::LinkResolver},
    runtime::{LoopState, Runtime, Sleeper},
    service::chat::{ChatClient, GenericChatClient},
};
pub use anyhow::anyhow;
pub use tracing::{debug, error, info, instrument, warn};
