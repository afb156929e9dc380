//! Pili HTTP Client
//!
//! Signs every request with the `Qiniu` authorization scheme and turns
//! non-2xx responses into semantic [`ApiError`](pili_core::ApiError)s.

use std::sync::Arc;

use bytes::Bytes;
use http::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use http::{HeaderMap, Method};
use pili_core::auth::CONTENT_TYPE_JSON;
use pili_core::{classify, ApiContext, AuthScheme, Mac, SigningRequest};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::hub::Hub;
use crate::meeting::Meeting;
use crate::transport::{HttpRequest, HttpRequester, ReqwestRequester};

struct Inner {
    mac: Mac,
    config: ClientConfig,
    requester: Arc<dyn HttpRequester>,
}

/// Pili API client
///
/// Cheap to clone; clones share the credential, configuration and
/// connection pool.
#[derive(Clone)]
pub struct Client {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("mac", &self.inner.mac)
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Create a client backed by `reqwest`.
    pub fn new(mac: Mac, config: ClientConfig) -> Result<Self, ClientError> {
        config.validate()?;
        let requester = ReqwestRequester::new(&config)?;
        Ok(Self::with_requester(mac, config, Arc::new(requester)))
    }

    /// Create a client with a custom transport.
    #[must_use]
    pub fn with_requester(mac: Mac, config: ClientConfig, requester: Arc<dyn HttpRequester>) -> Self {
        Self {
            inner: Arc::new(Inner {
                mac,
                config,
                requester,
            }),
        }
    }

    #[must_use]
    pub fn mac(&self) -> &Mac {
        &self.inner.mac
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Handle to the streams of `hub`.
    #[must_use]
    pub fn hub(&self, name: impl Into<String>) -> Hub {
        Hub::new(self.clone(), name.into())
    }

    /// Handle to the RTC room API acting for `owner_id`.
    #[must_use]
    pub fn meeting(&self, owner_id: impl Into<String>) -> Meeting {
        Meeting::new(self.clone(), owner_id.into())
    }

    /// `<scheme>://<api_host>/<version><path>`
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, ClientError> {
        Ok(Url::parse(&format!("{}{path}", self.inner.config.api_base()))?)
    }

    /// `<scheme>://<rtc_host>/<version><path>`
    pub(crate) fn rtc_url(&self, path: &str) -> Result<Url, ClientError> {
        Ok(Url::parse(&format!("{}{path}", self.inner.config.rtc_base()))?)
    }

    /// Call the API and decode a JSON response.
    pub(crate) async fn call<T, B>(
        &self,
        context: ApiContext,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let bytes = self.execute(context, method, url, body).await?;
        // Some endpoints answer 200 with an empty body.
        let bytes: &[u8] = if bytes.is_empty() { b"{}" } else { &bytes };
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Call the API, ignoring the response body.
    pub(crate) async fn call_no_content<B>(
        &self,
        context: ApiContext,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<(), ClientError>
    where
        B: Serialize + ?Sized,
    {
        self.execute(context, method, url, body).await.map(|_| ())
    }

    async fn execute<B>(
        &self,
        context: ApiContext,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<Bytes, ClientError>
    where
        B: Serialize + ?Sized,
    {
        let body = body.map(serde_json::to_vec).transpose()?.map(Bytes::from);
        let request = self.sign(method, url, body)?;

        debug!(method = %request.method, url = %request.url, "pili request");
        let method = request.method.clone();
        let url = request.url.clone();
        let response = self.inner.requester.send(request).await?;

        let status = response.status.as_u16();
        if response.status.is_success() {
            return Ok(response.body);
        }

        let err = classify(context, status, &response.body);
        warn!(
            method = %method,
            url = %url,
            status,
            kind = ?err.kind(),
            "pili request failed: {}",
            err.message()
        );
        Err(err.into())
    }

    /// Attach `Authorization`, `Content-Type` and `User-Agent` headers.
    fn sign(&self, method: Method, url: Url, body: Option<Bytes>) -> Result<HttpRequest, ClientError> {
        let host = match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => format!("{host}:{port}"),
            (Some(host), None) => host.to_string(),
            (None, _) => {
                return Err(ClientError::InvalidConfig(format!("url has no host: {url}")));
            }
        };

        let mut signing = SigningRequest::new(method.as_str(), &host, url.path());
        if let Some(query) = url.query() {
            signing = signing.with_query(query);
        }
        if let Some(body) = body.as_deref() {
            signing = signing.with_body(CONTENT_TYPE_JSON, body);
        }
        let authorization = self.inner.mac.authorization(AuthScheme::Qiniu, &signing);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&authorization)?);
        headers.insert(USER_AGENT, HeaderValue::from_str(&self.inner.config.user_agent)?);
        if body.is_some() {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE_JSON));
        }

        Ok(HttpRequest {
            method,
            url,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockRequester;
    use http::StatusCode;
    use pili_core::ErrorKind;
    use serde_json::{json, Value};

    fn client(mock: &Arc<MockRequester>) -> Client {
        Client::with_requester(
            Mac::new("ak", "sk").unwrap(),
            ClientConfig::default(),
            mock.clone(),
        )
    }

    #[test]
    fn test_client_creation() {
        let client = Client::new(Mac::new("ak", "sk").unwrap(), ClientConfig::default()).unwrap();
        assert_eq!(client.mac().access_key(), "ak");
        assert_eq!(client.config().api_host, "pili.qiniuapi.com");
    }

    #[test]
    fn test_client_rejects_invalid_config() {
        let config = ClientConfig::default().with_api_host("");
        let err = Client::new(Mac::new("ak", "sk").unwrap(), config).unwrap_err();
        assert!(matches!(err, ClientError::InvalidConfig(_)));
    }

    #[test]
    fn test_urls() {
        let mock = Arc::new(MockRequester::new());
        let client = client(&mock);
        assert_eq!(
            client.api_url("/hubs/h/streams").unwrap().as_str(),
            "http://pili.qiniuapi.com/v2/hubs/h/streams"
        );
        assert_eq!(
            client.rtc_url("/rooms").unwrap().as_str(),
            "http://rtc.qiniuapi.com/v1/rooms"
        );
    }

    #[tokio::test]
    async fn test_request_is_signed() {
        let mock = Arc::new(MockRequester::new());
        mock.push_json(StatusCode::OK, json!({"ok": true})).await;
        let client = client(&mock);

        let url = client.api_url("/hubs/h/streams").unwrap();
        let body = json!({"key": "k"});
        let _: Value = client
            .call(ApiContext::General, Method::POST, url, Some(&body))
            .await
            .unwrap();

        let requests = mock.requests().await;
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        let sent_body = request.body.clone().unwrap();

        let expected = client.mac().authorization(
            AuthScheme::Qiniu,
            &SigningRequest::new("POST", "pili.qiniuapi.com", "/v2/hubs/h/streams")
                .with_body(CONTENT_TYPE_JSON, &sent_body),
        );
        assert_eq!(request.headers[AUTHORIZATION], expected.as_str());
        assert_eq!(request.headers[CONTENT_TYPE], CONTENT_TYPE_JSON);
        assert!(request.headers.contains_key(USER_AGENT));
    }

    #[tokio::test]
    async fn test_host_with_port_is_signed() {
        let mock = Arc::new(MockRequester::new());
        mock.push_json(StatusCode::OK, json!({})).await;
        let client = Client::with_requester(
            Mac::new("ak", "sk").unwrap(),
            ClientConfig::default().with_api_host("127.0.0.1:9000"),
            mock.clone(),
        );

        let url = client.api_url("/hubs/h/streams").unwrap();
        client
            .call_no_content::<()>(ApiContext::General, Method::GET, url, None)
            .await
            .unwrap();

        let requests = mock.requests().await;
        let expected = client.mac().authorization(
            AuthScheme::Qiniu,
            &SigningRequest::new("GET", "127.0.0.1:9000", "/v2/hubs/h/streams"),
        );
        assert_eq!(requests[0].headers[AUTHORIZATION], expected.as_str());
        assert!(!requests[0].headers.contains_key(CONTENT_TYPE));
    }

    #[tokio::test]
    async fn test_error_is_classified() {
        let mock = Arc::new(MockRequester::new());
        mock.push_json(StatusCode::from_u16(612).unwrap(), json!({"error": "stream not found"}))
            .await;
        let client = client(&mock);

        let url = client.api_url("/hubs/h/streams/x").unwrap();
        let err = client
            .call::<Value, ()>(ApiContext::General, Method::GET, url, None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::NotFound));
        assert!(err.is_not_exists());
    }

    #[tokio::test]
    async fn test_empty_success_body() {
        let mock = Arc::new(MockRequester::new());
        mock.push(StatusCode::OK, "").await;
        let client = client(&mock);

        let url = client.api_url("/hubs/h").unwrap();
        let value: Value = client
            .call::<Value, ()>(ApiContext::General, Method::GET, url, None)
            .await
            .unwrap();
        assert_eq!(value, json!({}));
    }

    #[tokio::test]
    async fn test_transport_error_passes_through() {
        let mock = Arc::new(MockRequester::new());
        mock.push_transport_error("connection reset").await;
        let client = client(&mock);

        let url = client.api_url("/hubs/h").unwrap();
        let err = client
            .call_no_content::<()>(ApiContext::General, Method::GET, url, None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::Transport));
    }
}
