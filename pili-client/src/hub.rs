//! Hub: a namespace of streams

use http::Method;
use pili_core::{ApiContext, ArgumentError};
use url::Url;

use crate::client::Client;
use crate::error::ClientError;
use crate::stream::Stream;
use crate::types::{BatchLiveStatusArgs, BatchLiveStatusResp, CreateStreamArgs, ListResp, LiveStatusWithKey};

/// One page of stream keys plus the marker of the next page
/// (empty when there are no more).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamList {
    pub keys: Vec<String>,
    pub marker: String,
}

#[derive(Debug, Clone)]
pub struct Hub {
    client: Client,
    name: String,
}

impl Hub {
    pub(crate) const fn new(client: Client, name: String) -> Self {
        Self { client, name }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Handle to an existing stream. No request is made.
    #[must_use]
    pub fn stream(&self, key: impl Into<String>) -> Stream {
        Stream::new(self.client.clone(), self.name.clone(), key.into())
    }

    fn url(&self, suffix: &str) -> Result<Url, ClientError> {
        if self.name.is_empty() {
            return Err(ArgumentError::Empty("hub").into());
        }
        self.client.api_url(&format!("/hubs/{}{suffix}", self.name))
    }

    /// Create a stream. Fails with `AlreadyExists` if the key is taken.
    pub async fn create(&self, key: &str) -> Result<Stream, ClientError> {
        if key.is_empty() {
            return Err(ArgumentError::Empty("stream key").into());
        }
        let url = self.url("/streams")?;
        self.client
            .call_no_content(
                ApiContext::General,
                Method::POST,
                url,
                Some(&CreateStreamArgs { key }),
            )
            .await?;
        Ok(self.stream(key))
    }

    /// List streams whose key starts with `prefix`.
    ///
    /// `limit` of zero uses the server default; pass the returned marker to
    /// fetch the next page.
    pub async fn list(&self, prefix: &str, limit: u32, marker: &str) -> Result<StreamList, ClientError> {
        self.list_inner(false, prefix, limit, marker).await
    }

    /// Like [`list`](Self::list), only streams that are live right now.
    pub async fn list_live(&self, prefix: &str, limit: u32, marker: &str) -> Result<StreamList, ClientError> {
        self.list_inner(true, prefix, limit, marker).await
    }

    async fn list_inner(
        &self,
        live_only: bool,
        prefix: &str,
        limit: u32,
        marker: &str,
    ) -> Result<StreamList, ClientError> {
        let mut url = self.url("/streams")?;
        {
            let mut query = url.query_pairs_mut();
            if live_only {
                query.append_pair("liveonly", "true");
            }
            if !prefix.is_empty() {
                query.append_pair("prefix", prefix);
            }
            if limit > 0 {
                query.append_pair("limit", &limit.to_string());
            }
            if !marker.is_empty() {
                query.append_pair("marker", marker);
            }
        }
        if url.query() == Some("") {
            url.set_query(None);
        }

        let resp: ListResp = self
            .client
            .call::<_, ()>(ApiContext::General, Method::GET, url, None)
            .await?;
        Ok(StreamList {
            keys: resp.items.into_iter().map(|item| item.key).collect(),
            marker: resp.marker,
        })
    }

    /// Live status of several streams at once. Streams that are not live
    /// are absent from the result.
    pub async fn batch_live_status(&self, keys: &[String]) -> Result<Vec<LiveStatusWithKey>, ClientError> {
        let url = self.url("/livestreams")?;
        let resp: BatchLiveStatusResp = self
            .client
            .call(
                ApiContext::General,
                Method::POST,
                url,
                Some(&BatchLiveStatusArgs { items: keys }),
            )
            .await?;
        Ok(resp.items)
    }
}
