//! Message handling for taggart.
//!
//! This module turns chat events into replies:
//! - Extracting ticket references from message text
//! - Resolving tickets into issue tracker links
//! - Dispatching a batch of events into per-channel responses
//! - Looking up user IDs for diagnostics

pub mod dispatch;
pub mod extract;
pub mod link;
pub mod user_lookup;
