/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Client builder for fluent configuration.
//!
//! This module provides a builder API that resolves the gateway, opens the
//! WebSocket connection, and hands it to a [`SessionController`].

use crate::http::{self, DEFAULT_API_BASE, DEFAULT_REQUEST_TIMEOUT};
use crate::resolver::{GatewayEndpoint, GatewayResolver};
use herald_core::error::{GatewayError, HttpError, TransportError};
use herald_session::config::SessionConfig;
use herald_session::controller::{SessionController, SessionReport};
use herald_session::handler::{CommandHandler, NoOpHandler};
use herald_transport::websocket::{self, WsSink, WsSource};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::info;
use url::Url;

/// Default gateway protocol version.
pub const DEFAULT_GATEWAY_VERSION: u8 = 10;

/// Builder for configuring a gateway client.
#[derive(Debug)]
pub struct ClientBuilder<H: CommandHandler = NoOpHandler> {
    /// Session configuration.
    config: SessionConfig,
    /// Command handler.
    handler: Arc<H>,
    /// REST API base URL.
    api_base: String,
    /// Gateway protocol version.
    gateway_version: u8,
    /// Gateway address override.
    address: Option<String>,
    /// Connection timeout.
    connect_timeout: Duration,
    /// REST request timeout.
    request_timeout: Duration,
}

impl ClientBuilder<NoOpHandler> {
    /// Creates a new client builder with default settings.
    ///
    /// # Arguments
    /// * `config` - Session configuration
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            handler: Arc::new(NoOpHandler),
            api_base: DEFAULT_API_BASE.to_string(),
            gateway_version: DEFAULT_GATEWAY_VERSION,
            address: None,
            connect_timeout: Duration::from_secs(30),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl<H: CommandHandler + 'static> ClientBuilder<H> {
    /// Sets the command handler.
    #[must_use]
    pub fn with_handler<B: CommandHandler>(self, handler: B) -> ClientBuilder<B> {
        ClientBuilder {
            config: self.config,
            handler: Arc::new(handler),
            api_base: self.api_base,
            gateway_version: self.gateway_version,
            address: self.address,
            connect_timeout: self.connect_timeout,
            request_timeout: self.request_timeout,
        }
    }

    /// Sets the REST API base URL.
    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Sets the gateway protocol version.
    #[must_use]
    pub const fn with_gateway_version(mut self, version: u8) -> Self {
        self.gateway_version = version;
        self
    }

    /// Overrides the gateway address.
    ///
    /// Accepts `host[:port]` or a full `ws://`/`wss://` URL. When set, the
    /// REST lookup is skipped.
    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Sets the connection timeout.
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the REST request timeout.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Returns the session configuration.
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Returns the REST API base URL.
    #[must_use]
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Returns the gateway protocol version.
    #[must_use]
    pub const fn gateway_version(&self) -> u8 {
        self.gateway_version
    }

    /// Returns the gateway address override.
    #[must_use]
    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    /// Returns the connection timeout.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Returns the command handler.
    #[must_use]
    pub fn handler(&self) -> Arc<H> {
        Arc::clone(&self.handler)
    }

    /// Creates a gateway resolver for this client.
    ///
    /// # Errors
    /// Returns `HttpError::Request` if the HTTP client cannot be created.
    pub fn resolver(&self) -> Result<GatewayResolver, HttpError> {
        let client = http::client(self.request_timeout)?;
        Ok(GatewayResolver::new(
            client,
            self.api_base.clone(),
            self.config.credentials.clone(),
        ))
    }

    /// Determines the WebSocket URL to dial.
    ///
    /// # Errors
    /// Returns `GatewayError::Http` if the lookup fails or yields a bad URL.
    pub async fn gateway_url(&self) -> Result<Url, GatewayError> {
        let url = match self.address.as_deref() {
            Some(address) => {
                GatewayEndpoint::new(address).connect_url(self.gateway_version, Some(address))?
            }
            None => self
                .resolver()?
                .resolve()
                .await?
                .connect_url(self.gateway_version, None)?,
        };
        Ok(url)
    }

    /// Opens a gateway connection and returns a controller ready to run.
    ///
    /// # Errors
    /// Returns `GatewayError::Session` for invalid configuration,
    /// `GatewayError::Http` if resolution fails, and
    /// `GatewayError::Transport` if the connection cannot be established.
    pub async fn connect(&self) -> Result<SessionController<WsSink, WsSource>, GatewayError> {
        self.config.validate()?;
        let url = self.gateway_url().await?;
        info!(url = %url, "connecting to gateway");

        let (sink, source) = timeout(self.connect_timeout, websocket::connect(url.as_str()))
            .await
            .map_err(|_| TransportError::Connect(format!("timed out connecting to {url}")))??;

        let handler: Arc<dyn CommandHandler> = self.handler.clone();
        Ok(SessionController::new(self.config.clone(), sink, source).with_handler(handler))
    }

    /// Connects and runs a session until it ends.
    ///
    /// Cancelling `shutdown` starts a graceful close.
    ///
    /// # Errors
    /// Returns an error only if the session could not be started; how a
    /// running session ended is reported in [`SessionReport::outcome`].
    pub async fn run(&self, shutdown: CancellationToken) -> Result<SessionReport, GatewayError> {
        let controller = self.connect().await?.with_shutdown(shutdown);
        Ok(controller.run().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::{SinkExt, StreamExt};
    use herald_session::config::Credentials;
    use herald_session::controller::SessionOutcome;
    use tokio::net::TcpListener;
    use tokio_tungstenite::tungstenite::Message;
    use tokio_tungstenite::tungstenite::protocol::CloseFrame;
    use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config() -> SessionConfig {
        SessionConfig::new(Credentials::new("tok"))
    }

    #[test]
    fn test_client_builder_default() {
        let builder = ClientBuilder::new(config());
        assert_eq!(builder.api_base(), DEFAULT_API_BASE);
        assert_eq!(builder.gateway_version(), 10);
        assert_eq!(builder.address(), None);
        assert_eq!(builder.connect_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_client_builder_options() {
        let builder = ClientBuilder::new(config())
            .with_api_base("http://localhost:1/api")
            .with_gateway_version(9)
            .with_address("127.0.0.1:9000")
            .with_connect_timeout(Duration::from_secs(5));

        assert_eq!(builder.api_base(), "http://localhost:1/api");
        assert_eq!(builder.gateway_version(), 9);
        assert_eq!(builder.address(), Some("127.0.0.1:9000"));
        assert_eq!(builder.connect_timeout(), Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_gateway_url_resolved_over_rest() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gateway/bot"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"url": "wss://gateway.discord.gg", "shards": 1})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let builder = ClientBuilder::new(config()).with_api_base(server.uri());
        let url = builder.gateway_url().await.unwrap();
        assert_eq!(url.as_str(), "wss://gateway.discord.gg/?v=10&encoding=json");
    }

    #[tokio::test]
    async fn test_gateway_url_override_skips_lookup() {
        let builder = ClientBuilder::new(config())
            .with_api_base("http://127.0.0.1:1")
            .with_address("gateway.example.com:443");
        let url = builder.gateway_url().await.unwrap();
        assert_eq!(url.as_str(), "wss://gateway.example.com/?v=10&encoding=json");
    }

    #[tokio::test]
    async fn test_connect_rejects_blank_token() {
        let builder = ClientBuilder::new(SessionConfig::new(Credentials::new("")))
            .with_address("ws://127.0.0.1:1");
        let result = builder.connect().await;
        assert!(matches!(result, Err(GatewayError::Session(_))));
    }

    #[tokio::test]
    async fn test_connect_lookup_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let builder = ClientBuilder::new(config()).with_api_base(server.uri());
        let result = builder.connect().await;
        assert!(matches!(
            result,
            Err(GatewayError::Http(HttpError::Status { status: 401, .. }))
        ));
    }

    #[tokio::test]
    async fn test_run_against_local_gateway() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let gateway = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();

            ws.send(Message::text(r#"{"op":10,"d":{"heartbeat_interval":45000}}"#))
                .await
                .unwrap();
            let identify = match ws.next().await {
                Some(Ok(Message::Text(text))) => {
                    serde_json::from_str::<serde_json::Value>(text.as_str()).unwrap()
                }
                other => panic!("expected identify, got {other:?}"),
            };

            ws.close(Some(CloseFrame {
                code: CloseCode::Normal,
                reason: "bye".to_string().into(),
            }))
            .await
            .unwrap();
            let reply = ws.next().await;
            (identify, reply)
        });

        let builder = ClientBuilder::new(config()).with_address(format!("ws://{addr}"));
        let report = builder.run(CancellationToken::new()).await.unwrap();

        let (identify, reply) = gateway.await.unwrap();
        assert!(
            matches!(reply, Some(Ok(Message::Close(_)))),
            "expected close reply, got {reply:?}"
        );
        assert_eq!(identify["op"], 2);
        assert_eq!(identify["d"]["token"], "tok");
        assert_eq!(
            report.outcome,
            SessionOutcome::RemoteClosed {
                code: Some(1000),
                reason: "bye".to_string()
            }
        );
        assert!(report.session.is_closed());
    }
}
