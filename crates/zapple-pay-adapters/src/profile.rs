//! Profile lookup against a Primal cache server.
//!
//! The cache answers `["user_profile", {"pubkey": <hex>}]` with a list of
//! events; the kind-0 event authored by that pubkey carries the metadata JSON
//! in its `content`.

use async_trait::async_trait;
use nostr::PublicKey;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use zapple_pay_core::{PortError, Profile, ProfilePort};

use crate::config::ZappleConfig;
use crate::http::{ensure_success, malformed, transport};

const METADATA_KIND: u64 = 0;

#[derive(Debug, Deserialize)]
struct CacheEvent {
    kind: u64,
    #[serde(default)]
    pubkey: String,
    #[serde(default)]
    content: String,
}

#[derive(Debug, Clone)]
pub struct ProfileAdapter {
    client: reqwest::Client,
    url: String,
}

impl ProfileAdapter {
    pub fn with_config(cfg: &ZappleConfig) -> Result<Self, PortError> {
        Ok(Self {
            client: cfg.http_client().map_err(transport)?,
            url: cfg.profile_api_url.clone(),
        })
    }
}

#[async_trait]
impl ProfilePort for ProfileAdapter {
    async fn fetch_profile(&self, pubkey: &PublicKey) -> Result<Option<Profile>, PortError> {
        let hex = pubkey.to_hex();
        let response = self
            .client
            .post(&self.url)
            .json(&json!(["user_profile", { "pubkey": hex }]))
            .send()
            .await
            .map_err(transport)?;
        let events: Vec<Value> = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(malformed)?;
        find_metadata(events, &hex)
    }
}

// Non-event entries (stats, cursors) are mixed into the array and skipped.
fn find_metadata(events: Vec<Value>, hex: &str) -> Result<Option<Profile>, PortError> {
    let metadata = events
        .into_iter()
        .filter_map(|v| serde_json::from_value::<CacheEvent>(v).ok())
        .find(|e| e.kind == METADATA_KIND && e.pubkey == hex);

    let Some(event) = metadata else {
        debug!(pubkey = hex, "no metadata event in profile response");
        return Ok(None);
    };
    serde_json::from_str(&event.content)
        .map(Some)
        .map_err(malformed)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PK: &str = "32e1827635450ebb3c5a7d12c1f8e7b2b514439ac10a67eef3d9fd9c5c68e245";

    #[test]
    fn picks_metadata_event_for_the_requested_key() {
        let events = vec![
            json!({"kind": 10000105, "content": "{\"followers_count\": 12}"}),
            json!({"kind": 0, "pubkey": "ff", "content": "{\"name\": \"other\"}"}),
            json!({"kind": 0, "pubkey": PK, "content": "{\"name\": \"jb55\", \"lud16\": \"jb55@example.com\"}"}),
        ];
        let profile = find_metadata(events, PK).expect("parse").expect("profile");
        assert_eq!(profile.name.as_deref(), Some("jb55"));
        assert_eq!(profile.lud16.as_deref(), Some("jb55@example.com"));
        assert_eq!(profile.label(), Some("jb55"));
    }

    #[test]
    fn missing_metadata_is_not_an_error() {
        let events = vec![json!({"kind": 10000105, "content": "{}"})];
        assert_eq!(find_metadata(events, PK).expect("parse"), None);
    }

    #[test]
    fn unparsable_content_is_malformed() {
        let events = vec![json!({"kind": 0, "pubkey": PK, "content": "not json"})];
        assert!(matches!(
            find_metadata(events, PK),
            Err(PortError::Malformed(_))
        ));
    }
}
