/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Shared REST plumbing.

use herald_core::error::HttpError;
use std::time::Duration;

/// Default REST API base URL.
pub const DEFAULT_API_BASE: &str = "https://discord.com/api/v10";

/// `User-Agent` sent with every REST request.
pub const USER_AGENT: &str = concat!(
    "DiscordBot (https://github.com/joaquinbejar/Herald, ",
    env!("CARGO_PKG_VERSION"),
    ")"
);

/// Default REST request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Longest response body kept in `HttpError::Status`.
const MAX_ERROR_BODY: usize = 512;

/// Builds the HTTP client used for REST calls.
///
/// # Errors
/// Returns `HttpError::Request` if the client cannot be created.
pub fn client(timeout: Duration) -> Result<reqwest::Client, HttpError> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(|e| HttpError::Request(e.to_string()))
}

/// Joins an API base and a path, tolerating a trailing slash on the base.
#[must_use]
pub fn endpoint(api_base: &str, path: &str) -> String {
    format!("{}/{}", api_base.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// Returns the response body, or `HttpError::Status` for non-2xx answers.
///
/// A 2xx body that cannot be read fully is a `HttpError::Request`. For error
/// statuses the body is best effort.
pub(crate) async fn success_body(response: reqwest::Response) -> Result<String, HttpError> {
    let status = response.status();
    if status.is_success() {
        return response
            .text()
            .await
            .map_err(|e| HttpError::Request(format!("failed to read response body: {e}")));
    }
    let body = response.text().await.unwrap_or_default();
    Err(HttpError::Status {
        status: status.as_u16(),
        body: truncate(body),
    })
}

fn truncate(mut body: String) -> String {
    if body.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_join() {
        assert_eq!(
            endpoint("https://discord.com/api/v10/", "/gateway/bot"),
            "https://discord.com/api/v10/gateway/bot"
        );
        assert_eq!(endpoint("http://x", "a/b"), "http://x/a/b");
    }

    #[test]
    fn test_truncate_respects_char_boundary() {
        let body = "é".repeat(MAX_ERROR_BODY);
        let cut = truncate(body);
        assert!(cut.len() <= MAX_ERROR_BODY);
        assert!(cut.chars().all(|c| c == 'é'));
    }

    /// Serves one response whose body stops short of its declared length.
    async fn truncated_body_server(status: &'static str) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = stream.read(&mut buf).await;
            let head = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: 100\r\n\r\n{{\"url\""
            );
            stream.write_all(head.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();
        });
        format!("http://{addr}/gateway/bot")
    }

    #[tokio::test]
    async fn test_unreadable_success_body_is_request_error() {
        let url = truncated_body_server("200 OK").await;
        let response = client(DEFAULT_REQUEST_TIMEOUT)
            .unwrap()
            .get(url)
            .send()
            .await
            .unwrap();

        let err = success_body(response).await.unwrap_err();
        assert!(matches!(err, HttpError::Request(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_unreadable_error_body_keeps_status() {
        let url = truncated_body_server("503 Service Unavailable").await;
        let response = client(DEFAULT_REQUEST_TIMEOUT)
            .unwrap()
            .get(url)
            .send()
            .await
            .unwrap();

        let err = success_body(response).await.unwrap_err();
        assert_eq!(
            err,
            HttpError::Status {
                status: 503,
                body: String::new()
            }
        );
    }

    #[test]
    fn test_user_agent_format() {
        assert!(USER_AGENT.starts_with("DiscordBot ("));
    }
}
