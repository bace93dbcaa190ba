//! HTTP client abstraction for testability

use std::time::Duration;

use async_trait::async_trait;

use crate::error::TransportError;

/// HTTP response from a request
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Abstraction over HTTP client for dependency injection
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait HttpClient: Send + Sync {
    /// Send a GET request to the given URL
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError>;
}

/// Production HTTP client using reqwest.
///
/// Connecting and each read are bounded by `timeout`; the whole exchange is
/// bounded by twice that.
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    pub fn new(timeout: Duration) -> crate::Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .read_timeout(timeout)
            .timeout(timeout * 2)
            .build()
            .map_err(|e| crate::MotionFlashError::HttpClient(e.to_string()))?;
        Ok(Self { client })
    }
}

/// Whether the error chain bottoms out in the peer going away
fn is_disconnect(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(io) = e.downcast_ref::<std::io::Error>() {
            if matches!(
                io.kind(),
                std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::BrokenPipe
                    | std::io::ErrorKind::UnexpectedEof
                    | std::io::ErrorKind::NotConnected
            ) {
                return true;
            }
        }
        current = e.source();
    }
    false
}

fn classify(url: &str, err: reqwest::Error) -> TransportError {
    let detail = || format!("GET {} failed: {}", url, err);
    if err.is_timeout() && err.is_connect() {
        // The server never accepted the connection
        TransportError::Connect(detail())
    } else if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_connect() || err.is_request() || is_disconnect(&err) {
        TransportError::Connect(detail())
    } else {
        TransportError::Other(detail())
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        tracing::debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify(url, e))?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| classify(url, e))?;

        tracing::debug!("GET {} -> {} ({} bytes)", url, status, body.len());
        Ok(HttpResponse { status, body })
    }
}
