//! Turns a batch of raw chat events into channel responses.

use tracing::{debug, instrument};

use crate::base::types::{ChannelResponse, EmptyTicketPolicy, RawEvent};

use super::extract::TicketExtractor;

/// The only event kind that is scanned for tickets.
const MESSAGE_KIND: &str = "message";

/// Filters events down to text messages and extracts their tickets.
#[derive(Debug, Clone)]
pub struct EventDispatcher {
    extractor: TicketExtractor,
    empty_ticket_policy: EmptyTicketPolicy,
}

impl EventDispatcher {
    pub fn new(extractor: TicketExtractor, empty_ticket_policy: EmptyTicketPolicy) -> Self {
        Self { extractor, empty_ticket_policy }
    }

    /// Produces one response per message that mentions tickets, in event order.
    ///
    /// Responses are never merged, even when several messages share a channel.
    #[instrument(level = "trace", skip_all, fields(events = events.len()))]
    pub fn dispatch(&self, events: &[RawEvent]) -> Vec<ChannelResponse> {
        let mut responses = Vec::new();

        for event in events {
            if event.kind != MESSAGE_KIND {
                continue;
            }

            let Some(text) = event.text.as_deref() else {
                continue;
            };

            let Some(channel) = event.channel.as_deref() else {
                debug!("Skipping message event without a channel.");
                continue;
            };

            let tickets = self.extractor.extract(text);

            if tickets.is_empty() && self.empty_ticket_policy == EmptyTicketPolicy::Suppress {
                continue;
            }

            responses.push(ChannelResponse {
                tickets,
                channel: channel.to_string(),
            });
        }

        responses
    }
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::{config::TicketPattern, types::TicketReference};

    fn dispatcher(policy: EmptyTicketPolicy) -> EventDispatcher {
        let extractor = TicketExtractor::from_patterns(&[TicketPattern::prefix("TT"), TicketPattern::prefix("DESK")]).unwrap();

        EventDispatcher::new(extractor, policy)
    }

    fn tickets(keys: &[&str]) -> Vec<TicketReference> {
        keys.iter().map(|k| TicketReference::normalize(k)).collect()
    }

    #[test]
    fn test_skips_non_message_events() {
        let events = vec![
            RawEvent {
                kind: "presence_change".to_string(),
                text: Some("TT-1".to_string()),
                channel: Some("C0".to_string()),
            },
            RawEvent::message("C1", "look at TT-2"),
        ];

        let responses = dispatcher(EmptyTicketPolicy::Suppress).dispatch(&events);

        assert_eq!(
            responses,
            vec![ChannelResponse {
                tickets: tickets(&["TT-2"]),
                channel: "C1".to_string()
            }]
        );
    }

    #[test]
    fn test_skips_messages_without_text_or_channel() {
        let events = vec![
            RawEvent {
                kind: "message".to_string(),
                text: None,
                channel: Some("C1".to_string()),
            },
            RawEvent {
                kind: "message".to_string(),
                text: Some("TT-1".to_string()),
                channel: None,
            },
        ];

        assert!(dispatcher(EmptyTicketPolicy::Suppress).dispatch(&events).is_empty());
    }

    #[test]
    fn test_keeps_messages_separate_in_order() {
        let events = vec![RawEvent::message("C1", "TT-2"), RawEvent::message("C2", "desk-1"), RawEvent::message("C1", "TT-3 TT-1")];

        let responses = dispatcher(EmptyTicketPolicy::Suppress).dispatch(&events);

        assert_eq!(
            responses,
            vec![
                ChannelResponse {
                    tickets: tickets(&["TT-2"]),
                    channel: "C1".to_string()
                },
                ChannelResponse {
                    tickets: tickets(&["DESK-1"]),
                    channel: "C2".to_string()
                },
                ChannelResponse {
                    tickets: tickets(&["TT-1", "TT-3"]),
                    channel: "C1".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_suppresses_messages_without_tickets() {
        let events = vec![RawEvent::message("C1", "hello there")];

        assert!(dispatcher(EmptyTicketPolicy::Suppress).dispatch(&events).is_empty());
    }

    #[test]
    fn test_post_empty_policy_keeps_messages_without_tickets() {
        let events = vec![RawEvent::message("C1", "hello there")];

        let responses = dispatcher(EmptyTicketPolicy::PostEmpty).dispatch(&events);

        assert_eq!(
            responses,
            vec![ChannelResponse {
                tickets: vec![],
                channel: "C1".to_string()
            }]
        );
    }

    #[test]
    fn test_empty_batch() {
        assert!(dispatcher(EmptyTicketPolicy::PostEmpty).dispatch(&[]).is_empty());
    }
}
