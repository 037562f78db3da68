/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Gateway URL resolution.
//!
//! Before connecting, the client asks the REST API where the gateway lives.
//! The answer is fetched once per connection and never cached.

use crate::http;
use herald_core::error::HttpError;
use herald_session::config::Credentials;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

/// Session start quota reported by the gateway lookup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionStartLimit {
    /// Total session starts allowed per window.
    pub total: u32,
    /// Session starts left in the current window.
    pub remaining: u32,
    /// Milliseconds until the window resets.
    pub reset_after: u64,
    /// Identify requests allowed per 5 seconds.
    #[serde(default)]
    pub max_concurrency: u32,
}

/// Result of the gateway lookup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GatewayEndpoint {
    /// Base WebSocket URL, e.g. `wss://gateway.discord.gg`.
    pub url: String,
    /// Recommended shard count.
    #[serde(default)]
    pub shards: u32,
    /// Session start quota.
    #[serde(default)]
    pub session_start_limit: Option<SessionStartLimit>,
}

impl GatewayEndpoint {
    /// Creates an endpoint from a bare URL.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            shards: 1,
            session_start_limit: None,
        }
    }

    /// Builds the WebSocket URL to dial.
    ///
    /// The path is reset to `/` and the query carries the gateway version and
    /// JSON encoding. An `address` of the form `host[:port]` replaces the
    /// resolved host and uses `wss`; one carrying a scheme replaces the whole
    /// base URL.
    ///
    /// # Errors
    /// Returns `HttpError::InvalidUrl` if the resulting URL does not parse.
    pub fn connect_url(&self, version: u8, address: Option<&str>) -> Result<Url, HttpError> {
        let base = match address {
            Some(addr) if addr.contains("://") => addr.to_string(),
            Some(addr) => format!("wss://{addr}"),
            None => self.url.clone(),
        };
        let mut url = Url::parse(&base).map_err(|e| HttpError::InvalidUrl(format!("{base}: {e}")))?;
        url.set_path("/");
        url.query_pairs_mut()
            .clear()
            .append_pair("v", &version.to_string())
            .append_pair("encoding", "json");
        Ok(url)
    }
}

/// Looks up the gateway URL over REST.
#[derive(Debug, Clone)]
pub struct GatewayResolver {
    client: reqwest::Client,
    api_base: String,
    credentials: Credentials,
}

impl GatewayResolver {
    /// Creates a resolver.
    ///
    /// # Arguments
    /// * `client` - HTTP client to send the request with
    /// * `api_base` - REST API base URL
    /// * `credentials` - Bot token
    #[must_use]
    pub fn new(client: reqwest::Client, api_base: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            client,
            api_base: api_base.into(),
            credentials,
        }
    }

    /// Returns the REST API base URL.
    #[must_use]
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Performs `GET /gateway/bot`.
    ///
    /// # Errors
    /// Returns `HttpError::Request` if the request cannot be sent,
    /// `HttpError::Status` for a non-success answer, and `HttpError::Decode`
    /// if the body does not describe a gateway.
    pub async fn resolve(&self) -> Result<GatewayEndpoint, HttpError> {
        let endpoint = http::endpoint(&self.api_base, "gateway/bot");
        debug!(endpoint = %endpoint, "resolving gateway");

        let response = self
            .client
            .get(&endpoint)
            .header(AUTHORIZATION, self.credentials.bot_authorization())
            .send()
            .await
            .map_err(|e| HttpError::Request(e.to_string()))?;
        let body = http::success_body(response).await?;

        let gateway: GatewayEndpoint =
            serde_json::from_str(&body).map_err(|e| HttpError::Decode(e.to_string()))?;
        info!(
            url = %gateway.url,
            shards = gateway.shards,
            remaining = gateway.session_start_limit.as_ref().map(|l| l.remaining),
            "gateway resolved"
        );
        Ok(gateway)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn resolver(server: &MockServer) -> GatewayResolver {
        let client = http::client(Duration::from_secs(5)).unwrap();
        GatewayResolver::new(client, server.uri(), Credentials::new("tok"))
    }

    #[tokio::test]
    async fn test_resolve_gateway() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gateway/bot"))
            .and(header("authorization", "Bot tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "url": "wss://gateway.discord.gg",
                "shards": 1,
                "session_start_limit": {
                    "total": 1000,
                    "remaining": 999,
                    "reset_after": 14400000,
                    "max_concurrency": 1
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let gateway = resolver(&server).resolve().await.unwrap();
        assert_eq!(gateway.url, "wss://gateway.discord.gg");
        assert_eq!(gateway.shards, 1);
        let limit = gateway.session_start_limit.unwrap();
        assert_eq!(limit.remaining, 999);
        assert_eq!(limit.reset_after, 14_400_000);
    }

    #[tokio::test]
    async fn test_resolve_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gateway/bot"))
            .respond_with(ResponseTemplate::new(401).set_body_string("401: Unauthorized"))
            .mount(&server)
            .await;

        let err = resolver(&server).resolve().await.unwrap_err();
        assert_eq!(
            err,
            HttpError::Status {
                status: 401,
                body: "401: Unauthorized".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_resolve_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gateway/bot"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"shards\": 1}"))
            .mount(&server)
            .await;

        let err = resolver(&server).resolve().await.unwrap_err();
        assert!(matches!(err, HttpError::Decode(_)));
    }

    #[test]
    fn test_connect_url_from_resolved() {
        let url = GatewayEndpoint::new("wss://gateway.discord.gg")
            .connect_url(10, None)
            .unwrap();
        assert_eq!(url.as_str(), "wss://gateway.discord.gg/?v=10&encoding=json");
    }

    #[test]
    fn test_connect_url_with_address_override() {
        let gateway = GatewayEndpoint::new("wss://gateway.discord.gg");

        let host = gateway.connect_url(10, Some("gateway-us-east1-b.discord.gg")).unwrap();
        assert_eq!(
            host.as_str(),
            "wss://gateway-us-east1-b.discord.gg/?v=10&encoding=json"
        );

        let local = gateway.connect_url(6, Some("ws://127.0.0.1:8080")).unwrap();
        assert_eq!(local.as_str(), "ws://127.0.0.1:8080/?v=6&encoding=json");
    }

    #[test]
    fn test_connect_url_replaces_existing_query() {
        let url = GatewayEndpoint::new("wss://gateway.discord.gg/path?v=6")
            .connect_url(10, None)
            .unwrap();
        assert_eq!(url.as_str(), "wss://gateway.discord.gg/?v=10&encoding=json");
    }

    #[test]
    fn test_connect_url_invalid() {
        let result = GatewayEndpoint::new("not a url").connect_url(10, None);
        assert!(matches!(result, Err(HttpError::InvalidUrl(_))));
    }
}
