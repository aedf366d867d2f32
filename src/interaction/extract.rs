//! Ticket reference extraction from message text.

use regex::Regex;

use crate::base::{
    config::{Config, TicketPattern},
    types::{Res, TicketReference},
};

/// Finds ticket references (e.g., `TT-123`) in message text.
///
/// Matches immediately preceded by a `/` are ignored, so tickets that are
/// already part of a link (e.g., `.../browse/TT-123`) are not picked up again.
#[derive(Debug, Clone)]
pub struct TicketExtractor {
    patterns: Vec<Regex>,
}

impl TicketExtractor {
    /// Creates an extractor from the configured ticket patterns.
    pub fn new(config: &Config) -> Res<Self> {
        Self::from_patterns(&config.ticket_patterns)
    }

    /// Creates an extractor from an explicit set of patterns.
    pub fn from_patterns(patterns: &[TicketPattern]) -> Res<Self> {
        let patterns = patterns.iter().map(TicketPattern::compile).collect::<Res<Vec<_>>>()?;

        Ok(Self { patterns })
    }

    /// Returns every reference in `text`, uppercased and sorted.
    ///
    /// Repeated references are kept.
    pub fn extract(&self, text: &str) -> Vec<TicketReference> {
        let mut found = Vec::new();

        for pattern in &self.patterns {
            found.extend(find_unlinked(pattern, text).map(TicketReference::normalize));
        }

        found.sort();
        found
    }
}

/// Iterates over the matches of `pattern` that do not directly follow a `/`.
///
/// When a match is rejected, the search restarts one character past its start
/// rather than past its end, which gives the same results as a `(?<!/)` lookbehind.
fn find_unlinked<'t>(pattern: &'t Regex, text: &'t str) -> impl Iterator<Item = &'t str> + 't {
    let mut position = 0;

    std::iter::from_fn(move || {
        while position <= text.len() {
            let m = pattern.find_at(text, position)?;

            if text[..m.start()].ends_with('/') {
                position = next_char_boundary(text, m.start());
                continue;
            }

            // Empty matches only come from custom patterns.
            if m.is_empty() {
                position = next_char_boundary(text, m.end());
                continue;
            }

            position = m.end();
            return Some(m.as_str());
        }

        None
    })
}

fn next_char_boundary(text: &str, index: usize) -> usize {
    text[index..].chars().next().map_or(text.len() + 1, |c| index + c.len_utf8())
}

// Tests.
