//! HTTP transport
//!
//! [`HttpRequester`] is the seam between the signed-request builder and the
//! network. [`ReqwestRequester`] is the production implementation; tests
//! substitute their own.

use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode};
use url::Url;

use crate::config::ClientConfig;
use crate::error::{ClientError, MAX_RESPONSE_SIZE};

/// A fully signed request, ready to send.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

/// Status and body of a completed exchange.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

impl HttpResponse {
    #[must_use]
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Sends requests. Implementations own pooling, timeouts and TLS.
///
/// Network failures are reported as [`pili_core::ApiError::Transport`];
/// non-2xx statuses are *not* errors at this layer.
#[async_trait]
pub trait HttpRequester: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ClientError>;
}

/// `reqwest`-backed requester.
///
/// Redirects are disabled: a redirect would be re-sent with an
/// `Authorization` header signed for the original path.
#[derive(Debug, Clone)]
pub struct ReqwestRequester {
    client: reqwest::Client,
}

impl ReqwestRequester {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.timeout())
            .pool_max_idle_per_host(10)
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| ClientError::InvalidConfig(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Wrap an existing client (shared connection pool).
    #[must_use]
    pub const fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpRequester for ReqwestRequester {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ClientError> {
        let mut builder = self
            .client
            .request(request.method, request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        if let Some(cl) = response.content_length() {
            check_response_size(cl)?;
        }

        let status = response.status();
        let body = response.bytes().await?;
        check_response_size(body.len() as u64)?;

        Ok(HttpResponse { status, body })
    }
}

/// Sizes are compared as `u64` so a declared length never truncates.
fn check_response_size(size: u64) -> Result<(), ClientError> {
    if size > MAX_RESPONSE_SIZE as u64 {
        return Err(ClientError::ResponseTooLarge { size });
    }
    Ok(())
}
