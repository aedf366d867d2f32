//! Turns ticket references into issue tracker links.

use crate::base::{
    config::Config,
    types::{ResolvedLink, TicketReference},
};

/// Substitutes tickets into the configured tracker URL template.
#[derive(Debug, Clone)]
pub struct LinkResolver {
    template: String,
}

impl LinkResolver {
    pub fn new(config: &Config) -> Self {
        Self::from_template(&config.tracker_url)
    }

    /// Creates a resolver from a template such as `https://example.atlassian.net/browse/%s`.
    pub fn from_template(template: impl Into<String>) -> Self {
        Self { template: template.into() }
    }

    pub fn resolve(&self, ticket: &TicketReference) -> ResolvedLink {
        self.template.replacen("%s", ticket, 1)
    }

    /// Builds the reply text for a set of tickets: one link per line.
    pub fn render(&self, tickets: &[TicketReference]) -> String {
        tickets.iter().map(|t| self.resolve(t)).collect::<Vec<_>>().join("\n")
    }
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;

    const TEMPLATE: &str = "https://example.atlassian.net/browse/%s";

    #[test]
    fn test_resolve() {
        let resolver = LinkResolver::from_template(TEMPLATE);

        assert_eq!(resolver.resolve(&TicketReference::normalize("TT-123")), "https://example.atlassian.net/browse/TT-123");
    }

    #[test]
    fn test_render_joins_lines() {
        let resolver = LinkResolver::from_template(TEMPLATE);
        let tickets = vec![TicketReference::normalize("DESK-9"), TicketReference::normalize("TT-7")];

        assert_eq!(resolver.render(&tickets), "https://example.atlassian.net/browse/DESK-9\nhttps://example.atlassian.net/browse/TT-7");
    }

    #[test]
    fn test_render_empty() {
        let resolver = LinkResolver::from_template(TEMPLATE);

        assert_eq!(resolver.render(&[]), "");
    }
}
