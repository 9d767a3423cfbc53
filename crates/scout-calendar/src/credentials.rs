//! The externally-produced `user_tokens.json`:
//! `{ "<oauth state>": { "credentials": {...}, "slack_user_id": "U..." } }`.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::debug;

use scout_core::JsonMapFile;

use crate::error::Result;

/// OAuth credentials for one Google account, in the layout Google's own
/// client libraries write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserCredentials {
    /// Access token.
    #[serde(alias = "access_token")]
    pub token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub scopes: Vec<String>,
    /// Access-token expiry (RFC 3339) when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<String>,
    /// Fields such as `universe_domain` or `account`; written back untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

/// One entry of the credentials file. Either half may be missing while the
/// connect flow is still in progress; such entries are skipped by the scan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoredUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<UserCredentials>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slack_user_id: Option<String>,
    /// Anything else the connect flow stored; written back untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A fully connected user, ready to scan.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectedUser {
    /// Key of the entry in the credentials file.
    pub state: String,
    pub slack_user_id: String,
    pub credentials: UserCredentials,
}

pub struct CredentialStore {
    file: JsonMapFile<StoredUser>,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: JsonMapFile::new(path),
        }
    }

    /// Every entry that carries both credentials and a Slack user.
    pub fn connected_users(&self) -> Vec<ConnectedUser> {
        self.file
            .load()
            .into_iter()
            .filter_map(|(state, entry)| match (entry.credentials, entry.slack_user_id) {
                (Some(credentials), Some(slack_user_id)) => Some(ConnectedUser {
                    state,
                    slack_user_id,
                    credentials,
                }),
                _ => {
                    debug!(%state, "skipping incomplete credentials entry");
                    None
                }
            })
            .collect()
    }

    /// Replace the credentials stored under `state`, keeping the rest of the entry.
    pub fn update_credentials(&self, state: &str, credentials: &UserCredentials) -> Result<()> {
        let mut entries = self.file.load();
        let entry = entries.entry(state.to_string()).or_default();
        entry.credentials = Some(credentials.clone());
        self.file.save(&entries)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKENS: &str = r#"{
        "state-a": {
            "credentials": {
                "token": "ya29.old",
                "refresh_token": "1//refresh",
                "token_uri": "https://oauth2.googleapis.com/token",
                "client_id": "cid",
                "client_secret": "secret",
                "scopes": ["https://www.googleapis.com/auth/calendar.readonly"],
                "universe_domain": "googleapis.com",
                "account": ""
            },
            "slack_user_id": "U123",
            "email": "rep@seller.com"
        },
        "state-b": { "slack_user_id": "U456" },
        "state-c": { "credentials": { "token": "t", "client_id": "c" } }
    }"#;

    fn store_with(contents: &str) -> (CredentialStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("user_tokens.json");
        std::fs::write(&path, contents).unwrap();
        (CredentialStore::new(path), dir)
    }

    #[test]
    fn only_complete_entries_are_connected() {
        let (store, _dir) = store_with(TOKENS);
        let users = store.connected_users();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].state, "state-a");
        assert_eq!(users[0].slack_user_id, "U123");
        assert_eq!(users[0].credentials.token, "ya29.old");
    }

    #[test]
    fn missing_file_has_no_users() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = CredentialStore::new(dir.path().join("absent.json"));
        assert!(store.connected_users().is_empty());
    }

    #[test]
    fn update_keeps_other_fields() {
        let (store, dir) = store_with(TOKENS);
        let mut creds = store.connected_users().remove(0).credentials;
        creds.token = "ya29.new".to_string();
        store.update_credentials("state-a", &creds).expect("update");

        assert_eq!(store.connected_users()[0].credentials.token, "ya29.new");

        let raw = std::fs::read_to_string(dir.path().join("user_tokens.json")).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["state-a"]["email"], "rep@seller.com");
        assert_eq!(json["state-a"]["credentials"]["token"], "ya29.new");
        assert_eq!(
            json["state-a"]["credentials"]["universe_domain"],
            "googleapis.com"
        );
        assert_eq!(json["state-a"]["credentials"]["account"], "");
        assert_eq!(json["state-b"]["slack_user_id"], "U456");
    }
}
