/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Reply command.
//!
//! Answers every recognized command with a fixed message posted to the
//! channel the command came from.

use crate::http;
use async_trait::async_trait;
use herald_core::error::HttpError;
use herald_core::payload::MessageCreate;
use herald_session::config::Credentials;
use herald_session::handler::CommandHandler;
use reqwest::header::AUTHORIZATION;
use serde::Serialize;
use tracing::{debug, warn};

/// Default reply text.
pub const DEFAULT_REPLY: &str = "Buy cheese and bread for breakfast.";

#[derive(Serialize)]
struct CreateMessage<'a> {
    content: &'a str,
}

/// Command handler that posts a reply through the REST API.
#[derive(Debug, Clone)]
pub struct ReplyCommand {
    client: reqwest::Client,
    api_base: String,
    credentials: Credentials,
    reply: String,
}

impl ReplyCommand {
    /// Creates a reply command with the default reply text.
    ///
    /// # Arguments
    /// * `client` - HTTP client to post with
    /// * `api_base` - REST API base URL
    /// * `credentials` - Bot token
    #[must_use]
    pub fn new(client: reqwest::Client, api_base: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            client,
            api_base: api_base.into(),
            credentials,
            reply: DEFAULT_REPLY.to_string(),
        }
    }

    /// Sets the reply text.
    #[must_use]
    pub fn with_reply(mut self, reply: impl Into<String>) -> Self {
        self.reply = reply.into();
        self
    }

    /// Returns the reply text.
    #[must_use]
    pub fn reply(&self) -> &str {
        &self.reply
    }

    /// Posts the reply to the channel of `message`.
    ///
    /// # Errors
    /// Returns `HttpError::Request` if the request cannot be sent and
    /// `HttpError::Status` for a non-success answer.
    pub async fn reply_to(&self, message: &MessageCreate) -> Result<(), HttpError> {
        let endpoint = http::endpoint(
            &self.api_base,
            &format!("channels/{}/messages", message.channel_id),
        );
        let response = self
            .client
            .post(&endpoint)
            .header(AUTHORIZATION, self.credentials.bot_authorization())
            .json(&CreateMessage {
                content: &self.reply,
            })
            .send()
            .await
            .map_err(|e| HttpError::Request(e.to_string()))?;
        http::success_body(response).await?;
        debug!(channel_id = %message.channel_id, "reply posted");
        Ok(())
    }
}

#[async_trait]
impl CommandHandler for ReplyCommand {
    async fn on_command(&self, message: MessageCreate) {
        if let Err(e) = self.reply_to(&message).await {
            warn!(channel_id = %message.channel_id, error = %e, "failed to post reply");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use herald_core::payload::Author;
    use std::time::Duration;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn command(server: &MockServer) -> ReplyCommand {
        let client = http::client(Duration::from_secs(5)).unwrap();
        ReplyCommand::new(client, server.uri(), Credentials::new("tok"))
    }

    fn message(channel_id: &str) -> MessageCreate {
        MessageCreate {
            channel_id: channel_id.to_string(),
            author: Author {
                username: "ann".to_string(),
                ..Author::default()
            },
            content: "go ping".to_string(),
            ..MessageCreate::default()
        }
    }

    #[tokio::test]
    async fn test_reply_posted_to_origin_channel() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/channels/42/messages"))
            .and(header("authorization", "Bot tok"))
            .and(header("content-type", "application/json"))
            .and(body_json(serde_json::json!({"content": "pong"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "1"})))
            .expect(1)
            .mount(&server)
            .await;

        let command = command(&server).with_reply("pong");
        command.reply_to(&message("42")).await.unwrap();
    }

    #[tokio::test]
    async fn test_reply_default_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/channels/7/messages"))
            .and(body_json(serde_json::json!({"content": DEFAULT_REPLY})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        command(&server).on_command(message("7")).await;
    }

    #[tokio::test]
    async fn test_reply_failure_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("Missing Access"))
            .mount(&server)
            .await;

        let err = command(&server).reply_to(&message("42")).await.unwrap_err();
        assert!(matches!(err, HttpError::Status { status: 403, .. }));
    }

    #[tokio::test]
    async fn test_on_command_swallows_failures() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        command(&server).on_command(message("42")).await;
    }
}
