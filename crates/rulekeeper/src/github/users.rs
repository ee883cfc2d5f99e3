//! User public-key lookup.
//!
//! Fetches the SSH public keys GitHub publishes for a user, optionally
//! filtered to a set of key ids. Keys are public data, so requests go out
//! unauthenticated.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::Deserialize;

use crate::http::{HttpMethod, HttpRequest, HttpTransport};

use super::client::API_ROOT;

/// Which keys to fetch for a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserKeys {
    /// All published keys for the user.
    All(String),
    /// Only the keys with the given ids.
    Selected { user: String, ids: Vec<u64> },
}

impl UserKeys {
    fn user(&self) -> &str {
        match self {
            UserKeys::All(user) => user,
            UserKeys::Selected { user, .. } => user,
        }
    }

    fn wants(&self, id: u64) -> bool {
        match self {
            UserKeys::All(_) => true,
            UserKeys::Selected { ids, .. } => ids.contains(&id),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PublicKey {
    id: u64,
    key: String,
}

/// Fetch public keys for each requested user.
///
/// Returns `user -> {key id -> key}`. A user whose keys cannot be fetched or
/// decoded maps to an empty set rather than failing the whole call.
pub async fn user_pubkeys(
    transport: &Arc<dyn HttpTransport>,
    users: &[UserKeys],
) -> HashMap<String, BTreeMap<u64, String>> {
    let mut result = HashMap::new();

    for selection in users {
        let user = selection.user();
        let keys = fetch_keys(transport, user).await;
        let filtered: BTreeMap<u64, String> = keys
            .into_iter()
            .filter(|k| selection.wants(k.id))
            .map(|k| (k.id, k.key))
            .collect();
        result.insert(user.to_string(), filtered);
    }

    result
}

async fn fetch_keys(transport: &Arc<dyn HttpTransport>, user: &str) -> Vec<PublicKey> {
    let request = HttpRequest {
        method: HttpMethod::Get,
        url: format!("{}/users/{}/keys", API_ROOT, user),
        headers: vec![
            (
                "Accept".to_string(),
                "application/vnd.github+json".to_string(),
            ),
            ("User-Agent".to_string(), "rulekeeper".to_string()),
        ],
        body: Vec::new(),
    };

    let resp = match transport.send(request).await {
        Ok(resp) => resp,
        Err(e) => {
            tracing::debug!(user, error = %e, "public key fetch failed");
            return Vec::new();
        }
    };

    if !(200..300).contains(&resp.status) {
        tracing::debug!(user, status = resp.status, "public key fetch rejected");
        return Vec::new();
    }

    serde_json::from_slice(&resp.body).unwrap_or_default()
}
