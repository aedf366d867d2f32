//! Load configuration via `config` crate with env-override support.

use std::{ops::Deref, sync::Arc};

use regex::Regex;
use serde::Deserialize;

use super::types::{EmptyTicketPolicy, Res};

/// Default ticket patterns to watch for.
fn default_ticket_patterns() -> Vec<TicketPattern> {
    vec![TicketPattern::prefix("TT"), TicketPattern::prefix("DESK")]
}

/// Default delay between reads of the event stream, in milliseconds.
fn default_read_delay_ms() -> u64 {
    1000
}

/// A ticket prefix, and optionally the regex used to find it.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct TicketPattern {
    /// The ticket prefix (e.g., `TT`).
    pub prefix: String,
    /// Custom regex; defaults to the escaped prefix followed by `-\d+`.
    #[serde(default)]
    pub pattern: Option<String>,
}

impl TicketPattern {
    /// A pattern matching `PREFIX-<digits>`.
    pub fn prefix(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into(), pattern: None }
    }

    /// Compiles the (case-insensitive) regex for this pattern.
    pub fn compile(&self) -> Res<Regex> {
        let source = match &self.pattern {
            Some(pattern) => pattern.clone(),
            None => format!(r"{}-\d+", regex::escape(&self.prefix)),
        };

        Regex::new(&format!("(?i){source}")).map_err(|e| anyhow::anyhow!("Invalid pattern for ticket prefix `{}`: {}", self.prefix, e))
    }
}

/// Configuration for the taggart application.
#[derive(Debug, Clone)]
pub struct Config {
    pub inner: Arc<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ConfigInner {
    /// Expected user ID of the bot (`BOT_ID`).
    #[serde(default)]
    pub bot_id: Option<String>,
    /// Slack bot token (`BOT_TOKEN`).
    pub bot_token: String,
    /// Slack app-level token used for socket mode (`APP_TOKEN`); only needed to listen.
    #[serde(default)]
    pub app_token: String,
    /// Issue tracker link template with a single `%s` (`TRACKER_URL`).
    pub tracker_url: String,
    /// Ticket patterns to watch for.
    #[serde(default = "default_ticket_patterns")]
    pub ticket_patterns: Vec<TicketPattern>,
    /// Delay between reads of the event stream (`READ_DELAY_MS`).
    #[serde(default = "default_read_delay_ms")]
    pub read_delay_ms: u64,
    /// Whether messages without tickets still get a (blank) reply (`EMPTY_TICKET_POLICY`).
    #[serde(default)]
    pub empty_ticket_policy: EmptyTicketPolicy,
}

impl Default for ConfigInner {
    fn default() -> Self {
        Self {
            bot_id: None,
            bot_token: String::new(),
            app_token: String::new(),
            tracker_url: String::new(),
            ticket_patterns: default_ticket_patterns(),
            read_delay_ms: default_read_delay_ms(),
            empty_ticket_policy: EmptyTicketPolicy::default(),
        }
    }
}

impl From<ConfigInner> for Config {
    fn from(inner: ConfigInner) -> Self {
        Self { inner: Arc::new(inner) }
    }
}

impl Config {
    pub fn load(explicit_path: Option<&std::path::Path>) -> Res<Self> {
        let mut cfg = config::Config::builder().add_source(config::Environment::default().prefix("TAGGART"));

        if let Some(p) = explicit_path {
            cfg = cfg.add_source(config::File::from(p.to_path_buf()));
        } else if std::path::Path::new(".hidden/config.toml").exists() {
            cfg = cfg.add_source(config::File::with_name(".hidden/config.toml"));
        }

        let result = Config {
            inner: Arc::new(cfg.build()?.try_deserialize()?),
        };

        result.validate()?;

        Ok(result)
    }

    /// Checks the values that deserialization alone cannot.
    pub fn validate(&self) -> Res<()> {
        if self.bot_token.is_empty() {
            return Err(anyhow::anyhow!("Bot token must not be empty."));
        }

        if self.tracker_url.matches("%s").count() != 1 {
            return Err(anyhow::anyhow!("Tracker URL must contain exactly one `%s` placeholder."));
        }

        if self.ticket_patterns.is_empty() {
            return Err(anyhow::anyhow!("At least one ticket pattern must be configured."));
        }

        for pattern in &self.ticket_patterns {
            pattern.compile()?;
        }

        if self.read_delay_ms == 0 {
            return Err(anyhow::anyhow!("Read delay must be greater than zero."));
        }

        Ok(())
    }

    /// Checks the values only the listener needs, on top of `validate`.
    pub fn validate_listener(&self) -> Res<()> {
        self.validate()?;

        if self.app_token.is_empty() {
            return Err(anyhow::anyhow!("App token must not be empty."));
        }

        Ok(())
    }
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> ConfigInner {
        ConfigInner {
            bot_token: "xoxb-test".to_string(),
            app_token: "xapp-test".to_string(),
            tracker_url: "https://example.atlassian.net/browse/%s".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults() {
        let config = Config::from(valid());

        assert!(config.validate().is_ok());
        assert!(config.validate_listener().is_ok());
        assert_eq!(config.read_delay_ms, 1000);
        assert_eq!(config.empty_ticket_policy, EmptyTicketPolicy::Suppress);
        assert_eq!(config.ticket_patterns, vec![TicketPattern::prefix("TT"), TicketPattern::prefix("DESK")]);
    }

    #[test]
    fn test_rejects_bad_template() {
        let config = Config::from(ConfigInner {
            tracker_url: "https://example.atlassian.net/browse/".to_string(),
            ..valid()
        });
        assert!(config.validate().is_err());

        let config = Config::from(ConfigInner {
            tracker_url: "https://%s/browse/%s".to_string(),
            ..valid()
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_missing_tokens() {
        let config = Config::from(ConfigInner { bot_token: String::new(), ..valid() });
        assert!(config.validate().is_err());

        let config = Config::from(ConfigInner { app_token: String::new(), ..valid() });
        assert!(config.validate().is_ok());
        assert!(config.validate_listener().is_err());
    }

    #[test]
    fn test_app_token_is_optional_in_file() {
        let source = r#"
            bot_token = "xoxb-test"
            tracker_url = "https://example.atlassian.net/browse/%s"
        "#;

        let inner: ConfigInner = config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        let config = Config::from(inner);

        assert!(config.validate().is_ok());
        assert!(config.validate_listener().is_err());
    }

    #[test]
    fn test_rejects_bad_patterns() {
        let config = Config::from(ConfigInner { ticket_patterns: vec![], ..valid() });
        assert!(config.validate().is_err());

        let config = Config::from(ConfigInner {
            ticket_patterns: vec![TicketPattern {
                prefix: "BAD".to_string(),
                pattern: Some("BAD-(\\d+".to_string()),
            }],
            ..valid()
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_delay() {
        let config = Config::from(ConfigInner { read_delay_ms: 0, ..valid() });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_prefix_is_escaped() {
        let regex = TicketPattern::prefix("A.B").compile().unwrap();

        assert!(regex.is_match("a.b-1"));
        assert!(!regex.is_match("AXB-1"));
    }

    #[test]
    fn test_deserialize_from_toml() {
        let source = r#"
            bot_token = "xoxb-test"
            app_token = "xapp-test"
            tracker_url = "https://example.atlassian.net/browse/%s"
            read_delay_ms = 250
            empty_ticket_policy = "post_empty"

            [[ticket_patterns]]
            prefix = "OPS"
        "#;

        let inner: ConfigInner = config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(inner.read_delay_ms, 250);
        assert_eq!(inner.empty_ticket_policy, EmptyTicketPolicy::PostEmpty);
        assert_eq!(inner.ticket_patterns, vec![TicketPattern::prefix("OPS")]);
        assert_eq!(inner.bot_id, None);
    }
}
