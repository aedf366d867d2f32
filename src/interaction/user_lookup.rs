//! Diagnostic lookup of user IDs by name.
//!
//! Handy when filling in `bot_id`. This never runs as part of the poll loop,
//! and it never fails: problems are logged and an empty (or partial) result
//! is returned.

use std::collections::HashSet;

use serde_json::Value;
use tracing::{error, instrument, warn};

use crate::service::chat::ChatClient;

/// A user's name and platform ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserEntry {
    pub name: String,
    pub id: String,
}

/// Finds the IDs of the given users; or, of every user when `names` is empty.
#[instrument(skip(chat))]
pub async fn lookup_users(chat: &ChatClient, names: &[String]) -> Vec<UserEntry> {
    let users = match chat.list_users().await {
        Ok(users) => users,
        Err(err) => {
            error!("Failed to list users: {}", err);
            return Vec::new();
        }
    };

    filter_users(&users, names)
}

fn filter_users(users: &[Value], names: &[String]) -> Vec<UserEntry> {
    let wanted: HashSet<&str> = names.iter().map(String::as_str).collect();

    let mut entries = Vec::new();

    for user in users {
        let name = user.get("name").and_then(Value::as_str);

        if !wanted.is_empty() && !name.is_some_and(|n| wanted.contains(n)) {
            continue;
        }

        match (name, user.get("id").and_then(Value::as_str)) {
            (Some(name), Some(id)) => entries.push(UserEntry {
                name: name.to_string(),
                id: id.to_string(),
            }),
            _ => warn!("Unexpected user data: {}", user),
        }
    }

    entries
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn users() -> Vec<Value> {
        vec![
            json!({ "id": "U1", "name": "taggart" }),
            json!({ "id": "U2", "name": "lamarr" }),
            json!({ "name": "nobody" }),
            json!({ "id": "U4" }),
        ]
    }

    #[test]
    fn test_filters_by_name() {
        let entries = filter_users(&users(), &["taggart".to_string()]);

        assert_eq!(
            entries,
            vec![UserEntry {
                name: "taggart".to_string(),
                id: "U1".to_string()
            }]
        );
    }

    #[test]
    fn test_all_users_skips_malformed() {
        let entries = filter_users(&users(), &[]);

        assert_eq!(entries.iter().map(|e| e.id.as_str()).collect::<Vec<_>>(), vec!["U1", "U2"]);
    }

    #[test]
    fn test_unknown_name() {
        assert!(filter_users(&users(), &["mongo".to_string()]).is_empty());
    }
}
