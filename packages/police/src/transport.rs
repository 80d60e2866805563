//! Single-attempt HTTP transport behind the retrying session.
//!
//! [`HttpTransport`] performs exactly one GET and decodes the body as JSON.
//! Retry and backoff live in [`crate::PoliceApiSession`], so tests can swap
//! in a scripted transport without touching the network.

use std::time::Duration;

use async_trait::async_trait;

use crate::PoliceApiError;

/// One GET attempt returning decoded JSON.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Sends a GET to `url` with `params` as the query string.
    ///
    /// A non-success status must be reported as an error. An empty body
    /// decodes as [`serde_json::Value::Null`].
    ///
    /// # Errors
    ///
    /// Returns [`PoliceApiError`] if the request fails, times out, returns a
    /// non-success status, or the body is not valid JSON.
    async fn get_json(
        &self,
        url: &str,
        params: &[(&str, String)],
        timeout: Duration,
    ) -> Result<serde_json::Value, PoliceApiError>;
}

/// [`HttpTransport`] backed by a [`reqwest::Client`].
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Wraps an existing client.
    #[must_use]
    pub const fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get_json(
        &self,
        url: &str,
        params: &[(&str, String)],
        timeout: Duration,
    ) -> Result<serde_json::Value, PoliceApiError> {
        let response = self
            .client
            .get(url)
            .query(params)
            .timeout(timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PoliceApiError::Status {
                status: status.as_u16(),
                url: response.url().to_string(),
            });
        }

        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }

        Ok(serde_json::from_str(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;

    /// Serves one canned HTTP response on a local port and returns the base
    /// URL to request.
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();

            let mut request = Vec::new();
            let mut buf = [0_u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }

            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();
        });

        format!("http://{addr}")
    }

    async fn fetch(base: &str) -> Result<serde_json::Value, PoliceApiError> {
        ReqwestTransport::default()
            .get_json(&format!("{base}/x"), &[], Duration::from_secs(5))
            .await
    }

    #[tokio::test]
    async fn server_error_status_is_a_failure() {
        let base = serve_once("500 Internal Server Error", "{}").await;

        let err = fetch(&base).await.unwrap_err();

        match err {
            PoliceApiError::Status { status, url } => {
                assert_eq!(status, 500);
                assert_eq!(url, format!("{base}/x"));
            }
            other => panic!("expected a status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_success_body_is_null() {
        let base = serve_once("200 OK", "").await;

        assert_eq!(fetch(&base).await.unwrap(), serde_json::Value::Null);
    }

    #[tokio::test]
    async fn success_body_is_decoded() {
        let base = serve_once("200 OK", r#"[{"category":"drugs"}]"#).await;

        assert_eq!(
            fetch(&base).await.unwrap(),
            serde_json::json!([{ "category": "drugs" }])
        );
    }

    #[tokio::test]
    async fn malformed_body_is_a_json_error() {
        let base = serve_once("200 OK", "<html>").await;

        assert!(matches!(
            fetch(&base).await.unwrap_err(),
            PoliceApiError::Json(_)
        ));
    }
}
