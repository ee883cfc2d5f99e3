//! HTTP ruleset client.
//!
//! Each operation issues exactly one HTTP call against the GitHub REST API
//! and translates status plus payload into a uniform result: decoded JSON on
//! success, [`QueryError`] otherwise. No retries, no pagination.

use std::sync::Arc;

use serde_json::Value;

use super::error::QueryError;
use super::types::{RulesetParams, RulesetScope};
use crate::config::Profile;
use crate::http::{HttpHeaders, HttpMethod, HttpRequest, HttpTransport};

/// Base URL for the GitHub REST API.
pub const API_ROOT: &str = "https://api.github.com";

const USER_AGENT: &str = "rulekeeper";

/// Outcome of a successful ruleset deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deleted {
    pub comment: String,
    pub status: u16,
}

/// Client for GitHub's repository/organization ruleset endpoints.
///
/// The client is an explicit value: callers construct one (typically via
/// [`RulesetClient::for_profile`]) and pass it to each operation. There is no
/// ambient instance cache.
#[derive(Clone)]
pub struct RulesetClient {
    transport: Arc<dyn HttpTransport>,
    token: String,
    extra_headers: HttpHeaders,
}

impl RulesetClient {
    pub fn new(transport: Arc<dyn HttpTransport>, token: impl Into<String>) -> Self {
        Self {
            transport,
            token: token.into(),
            extra_headers: Vec::new(),
        }
    }

    /// Build a client authenticated with a profile's token.
    pub fn for_profile(profile: &Profile, transport: Arc<dyn HttpTransport>) -> Self {
        Self::new(transport, profile.token.clone())
    }

    /// Attach additional headers sent with every request.
    #[must_use]
    pub fn with_headers(mut self, headers: HttpHeaders) -> Self {
        self.extra_headers.extend(headers);
        self
    }

    /// Fetch a single ruleset by id.
    pub async fn get(&self, scope: &RulesetScope, id: u64) -> Result<Value, QueryError> {
        let resp = self
            .query(HttpMethod::Get, scope.route(Some(id)), None)
            .await?;
        decode(&resp.body, "Error getting ruleset")
    }

    /// Create a ruleset; returns the created object as GitHub echoes it back.
    pub async fn add(
        &self,
        scope: &RulesetScope,
        params: &RulesetParams,
    ) -> Result<Value, QueryError> {
        let body = serde_json::to_vec(params)
            .map_err(|_| QueryError::Malformed {
                comment: "Error adding ruleset",
            })?;
        let resp = self
            .query(HttpMethod::Post, scope.route(None), Some(body))
            .await?;
        decode(&resp.body, "Error adding ruleset")
    }

    /// List all rulesets in scope.
    ///
    /// Returns `Ok(None)` when the remote list is empty.
    pub async fn list(&self, scope: &RulesetScope) -> Result<Option<Vec<Value>>, QueryError> {
        let resp = self.query(HttpMethod::Get, scope.route(None), None).await?;
        let rulesets: Vec<Value> = serde_json::from_slice(&resp.body).map_err(|_| {
            QueryError::Malformed {
                comment: "Error getting rulesets",
            }
        })?;
        if rulesets.is_empty() {
            Ok(None)
        } else {
            Ok(Some(rulesets))
        }
    }

    /// Update an existing ruleset; returns the updated object.
    pub async fn update(
        &self,
        scope: &RulesetScope,
        id: u64,
        params: &RulesetParams,
    ) -> Result<Value, QueryError> {
        let body = serde_json::to_vec(params)
            .map_err(|_| QueryError::Malformed {
                comment: "Error updating ruleset",
            })?;
        let resp = self
            .query(HttpMethod::Put, scope.route(Some(id)), Some(body))
            .await?;
        decode(&resp.body, "Error updating ruleset")
    }

    /// Delete a ruleset by id. GitHub answers 204 on success.
    pub async fn delete(&self, scope: &RulesetScope, id: u64) -> Result<Deleted, QueryError> {
        let resp = self
            .query(HttpMethod::Delete, scope.route(Some(id)), None)
            .await?;
        if resp.status == 204 {
            Ok(Deleted {
                comment: format!("ruleset {} successfully deleted", id),
                status: resp.status,
            })
        } else {
            Err(QueryError::Malformed {
                comment: "Error deleting ruleset",
            })
        }
    }

    async fn query(
        &self,
        method: HttpMethod,
        route: String,
        body: Option<Vec<u8>>,
    ) -> Result<crate::http::HttpResponse, QueryError> {
        tracing::debug!(method = method.as_str(), route = %route, "github api request");

        let mut headers: HttpHeaders = vec![
            (
                "Authorization".to_string(),
                format!("token {}", self.token),
            ),
            (
                "Accept".to_string(),
                "application/vnd.github+json".to_string(),
            ),
            ("User-Agent".to_string(), USER_AGENT.to_string()),
        ];
        if body.is_some() {
            headers.push(("Content-Type".to_string(), "application/json".to_string()));
        }
        headers.extend(self.extra_headers.iter().cloned());

        let request = HttpRequest {
            method,
            url: format!("{}/{}", API_ROOT, route),
            headers,
            body: body.unwrap_or_default(),
        };

        let resp = self.transport.send(request).await?;
        if !(200..300).contains(&resp.status) {
            tracing::debug!(status = resp.status, route = %route, "github api error response");
            return Err(QueryError::remote(resp.status));
        }
        Ok(resp)
    }
}

fn decode(body: &[u8], comment: &'static str) -> Result<Value, QueryError> {
    serde_json::from_slice(body).map_err(|_| QueryError::Malformed { comment })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{HttpResponse, MockTransport};
    use serde_json::json;

    fn repo_scope() -> RulesetScope {
        RulesetScope::Repo {
            owner: "acme".to_string(),
            repo: "widgets".to_string(),
        }
    }

    fn client(transport: &MockTransport) -> RulesetClient {
        RulesetClient::new(Arc::new(transport.clone()), "ghp_test")
    }

    const LIST_URL: &str = "https://api.github.com/repos/acme/widgets/rulesets";
    const RULESET_1_URL: &str = "https://api.github.com/repos/acme/widgets/rulesets/1";

    #[tokio::test]
    async fn get_returns_decoded_payload() {
        let transport = MockTransport::new();
        transport.push_response(
            HttpMethod::Get,
            RULESET_1_URL,
            HttpResponse::json(200, &json!({"id": 1, "name": "protect-main"})),
        );

        let ruleset = client(&transport).get(&repo_scope(), 1).await.unwrap();
        assert_eq!(ruleset, json!({"id": 1, "name": "protect-main"}));
    }

    #[tokio::test]
    async fn get_maps_404_to_remote_error() {
        let transport = MockTransport::new();
        transport.push_response(HttpMethod::Get, RULESET_1_URL, HttpResponse::empty(404));

        let err = client(&transport).get(&repo_scope(), 1).await.unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert_eq!(
            err.to_string(),
            "GitHub Response Status Code: 404 Not Found"
        );
    }

    #[tokio::test]
    async fn get_maps_empty_body_to_malformed() {
        let transport = MockTransport::new();
        transport.push_response(HttpMethod::Get, RULESET_1_URL, HttpResponse::empty(200));

        let err = client(&transport).get(&repo_scope(), 1).await.unwrap_err();
        assert_eq!(err.to_string(), "Error getting ruleset");
    }

    #[tokio::test]
    async fn add_posts_params_and_returns_created_object() {
        let transport = MockTransport::new();
        transport.push_response(
            HttpMethod::Post,
            LIST_URL,
            HttpResponse::json(201, &json!({"id": 9, "name": "new", "enforcement": "disabled"})),
        );

        let params = RulesetParams::new()
            .with("name", "new")
            .with("enforcement", "disabled");
        let created = client(&transport)
            .add(&repo_scope(), &params)
            .await
            .unwrap();
        assert_eq!(created["id"], 9);

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        let sent: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(sent, json!({"name": "new", "enforcement": "disabled"}));
        assert!(requests[0]
            .headers
            .contains(&("Content-Type".to_string(), "application/json".to_string())));
    }

    #[tokio::test]
    async fn add_maps_empty_body_to_malformed() {
        let transport = MockTransport::new();
        transport.push_response(HttpMethod::Post, LIST_URL, HttpResponse::empty(201));

        let err = client(&transport)
            .add(&repo_scope(), &RulesetParams::new())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Error adding ruleset");
    }

    #[tokio::test]
    async fn list_returns_entries() {
        let transport = MockTransport::new();
        transport.push_response(
            HttpMethod::Get,
            LIST_URL,
            HttpResponse::json(200, &json!([{"name": "a", "id": 1}, {"name": "b", "id": 2}])),
        );

        let rulesets = client(&transport).list(&repo_scope()).await.unwrap();
        let rulesets = rulesets.expect("non-empty list");
        assert_eq!(rulesets.len(), 2);
        assert_eq!(rulesets[0]["name"], "a");
    }

    #[tokio::test]
    async fn empty_list_is_none_not_empty_vec() {
        let transport = MockTransport::new();
        transport.push_response(HttpMethod::Get, LIST_URL, HttpResponse::json(200, &json!([])));

        let rulesets = client(&transport).list(&repo_scope()).await.unwrap();
        assert!(rulesets.is_none());
    }

    #[tokio::test]
    async fn list_maps_non_array_body_to_malformed() {
        let transport = MockTransport::new();
        transport.push_response(
            HttpMethod::Get,
            LIST_URL,
            HttpResponse::json(200, &json!({"message": "unexpected"})),
        );

        let err = client(&transport).list(&repo_scope()).await.unwrap_err();
        assert_eq!(err.to_string(), "Error getting rulesets");
    }

    #[tokio::test]
    async fn list_maps_404_to_remote_error() {
        let transport = MockTransport::new();
        transport.push_response(HttpMethod::Get, LIST_URL, HttpResponse::empty(404));

        let err = client(&transport).list(&repo_scope()).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "GitHub Response Status Code: 404 Not Found"
        );
    }

    #[tokio::test]
    async fn update_puts_params_and_returns_updated_object() {
        let transport = MockTransport::new();
        transport.push_response(
            HttpMethod::Put,
            RULESET_1_URL,
            HttpResponse::json(200, &json!({"id": 1, "target": "tag"})),
        );

        let params = RulesetParams::new().with("target", "tag");
        let updated = client(&transport)
            .update(&repo_scope(), 1, &params)
            .await
            .unwrap();
        assert_eq!(updated["target"], "tag");

        let requests = transport.requests();
        let sent: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(sent, json!({"target": "tag"}));
    }

    #[tokio::test]
    async fn update_maps_empty_body_to_malformed() {
        let transport = MockTransport::new();
        transport.push_response(HttpMethod::Put, RULESET_1_URL, HttpResponse::empty(200));

        let err = client(&transport)
            .update(&repo_scope(), 1, &RulesetParams::new())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Error updating ruleset");
    }

    #[tokio::test]
    async fn delete_204_reports_success_comment() {
        let transport = MockTransport::new();
        transport.push_response(HttpMethod::Delete, RULESET_1_URL, HttpResponse::empty(204));

        let deleted = client(&transport).delete(&repo_scope(), 1).await.unwrap();
        assert_eq!(deleted.comment, "ruleset 1 successfully deleted");
        assert_eq!(deleted.status, 204);
    }

    #[tokio::test]
    async fn delete_maps_404_to_remote_error() {
        let transport = MockTransport::new();
        transport.push_response(HttpMethod::Delete, RULESET_1_URL, HttpResponse::empty(404));

        let err = client(&transport).delete(&repo_scope(), 1).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "GitHub Response Status Code: 404 Not Found"
        );
    }

    #[tokio::test]
    async fn delete_with_unexpected_success_status_is_malformed() {
        let transport = MockTransport::new();
        transport.push_response(
            HttpMethod::Delete,
            RULESET_1_URL,
            HttpResponse::json(200, &json!({"message": "gone"})),
        );

        let err = client(&transport).delete(&repo_scope(), 1).await.unwrap_err();
        assert_eq!(err.to_string(), "Error deleting ruleset");
    }

    #[tokio::test]
    async fn requests_carry_auth_and_extra_headers() {
        let transport = MockTransport::new();
        transport.push_response(
            HttpMethod::Get,
            RULESET_1_URL,
            HttpResponse::json(200, &json!({"id": 1})),
        );

        let client = client(&transport)
            .with_headers(vec![("X-GitHub-Api-Version".to_string(), "2022-11-28".to_string())]);
        client.get(&repo_scope(), 1).await.unwrap();

        let requests = transport.requests();
        let headers = &requests[0].headers;
        assert!(headers.contains(&("Authorization".to_string(), "token ghp_test".to_string())));
        assert!(headers.contains(&(
            "Accept".to_string(),
            "application/vnd.github+json".to_string()
        )));
        assert!(headers.contains(&(
            "X-GitHub-Api-Version".to_string(),
            "2022-11-28".to_string()
        )));
    }

    #[tokio::test]
    async fn org_scope_hits_org_routes() {
        let transport = MockTransport::new();
        transport.push_response(
            HttpMethod::Get,
            "https://api.github.com/orgs/acme/rulesets",
            HttpResponse::json(200, &json!([{"name": "org-wide", "id": 3}])),
        );

        let scope = RulesetScope::Org {
            org: "acme".to_string(),
        };
        let rulesets = client(&transport).list(&scope).await.unwrap().unwrap();
        assert_eq!(rulesets[0]["name"], "org-wide");
    }
}
