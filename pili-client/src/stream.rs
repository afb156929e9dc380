//! Stream: a single live stream resource
//!
//! Every call addresses `/v2/hubs/<hub>/streams/<urlsafe_base64(key)>`.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use http::Method;
use pili_core::{ApiContext, ArgumentError, DisableStatus, StreamInfo};
use url::Url;

use crate::client::Client;
use crate::error::ClientError;
use crate::types::{
    ActivityRecord, ConvertsArgs, DisabledArgs, HistoryResp, LiveStatus, SaveasOptions,
    SaveasResp, SnapshotOptions, SnapshotResp, StreamInfoResp,
};

/// File name and persistent task id of a saved recording.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveasResult {
    pub fname: String,
    /// Id of the asynchronous conversion task, empty without a pipeline
    pub persistent_id: String,
}

#[derive(Debug, Clone)]
pub struct Stream {
    client: Client,
    hub: String,
    key: String,
}

impl Stream {
    pub(crate) const fn new(client: Client, hub: String, key: String) -> Self {
        Self { client, hub, key }
    }

    #[must_use]
    pub fn hub(&self) -> &str {
        &self.hub
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    fn url(&self, suffix: &str) -> Result<Url, ClientError> {
        if self.hub.is_empty() {
            return Err(ArgumentError::Empty("hub").into());
        }
        if self.key.is_empty() {
            return Err(ArgumentError::Empty("stream key").into());
        }
        let encoded_key = URL_SAFE.encode(self.key.as_bytes());
        self.client
            .api_url(&format!("/hubs/{}/streams/{encoded_key}{suffix}", self.hub))
    }

    /// Fetch the stream's current state.
    pub async fn info(&self) -> Result<StreamInfo, ClientError> {
        let url = self.url("")?;
        let resp: StreamInfoResp = self
            .client
            .call::<_, ()>(ApiContext::General, Method::GET, url, None)
            .await?;
        Ok(StreamInfo {
            hub: self.hub.clone(),
            key: self.key.clone(),
            disable_status: DisableStatus::from_raw(resp.disabled_till),
            converts: resp.converts,
        })
    }

    async fn set_disable_status(&self, status: DisableStatus) -> Result<(), ClientError> {
        let url = self.url("/disabled")?;
        let args = DisabledArgs {
            disabled_till: status.as_raw(),
        };
        self.client
            .call_no_content(ApiContext::General, Method::POST, url, Some(&args))
            .await
    }

    /// Disable until explicitly re-enabled.
    pub async fn disable(&self) -> Result<(), ClientError> {
        self.set_disable_status(DisableStatus::PERMANENT).await
    }

    /// Disable until unix time `till`; the stream re-enables itself afterwards.
    pub async fn disable_till(&self, till: i64) -> Result<(), ClientError> {
        if till <= 0 {
            return Err(ArgumentError::NonPositiveTtl(till).into());
        }
        self.set_disable_status(DisableStatus::until(till)).await
    }

    pub async fn enable(&self) -> Result<(), ClientError> {
        self.set_disable_status(DisableStatus::ENABLED).await
    }

    /// Replace the live transcoding profiles. `None` or empty clears them.
    pub async fn update_converts(&self, profiles: Option<&[String]>) -> Result<(), ClientError> {
        let url = self.url("/converts")?;
        let args = ConvertsArgs {
            converts: profiles.unwrap_or_default(),
        };
        self.client
            .call_no_content(ApiContext::General, Method::POST, url, Some(&args))
            .await
    }

    /// Status of the ongoing live session. Fails with `NoActiveLiveSession`
    /// when nobody is publishing.
    pub async fn live_status(&self) -> Result<LiveStatus, ClientError> {
        let url = self.url("/live")?;
        self.client
            .call::<_, ()>(ApiContext::LiveStatus, Method::GET, url, None)
            .await
    }

    /// Save the recording between `start` and `end` (zero: whole session)
    /// and return the file name.
    pub async fn save(&self, start: i64, end: i64) -> Result<String, ClientError> {
        let opts = SaveasOptions {
            start,
            end,
            ..SaveasOptions::default()
        };
        Ok(self.saveas(Some(&opts)).await?.fname)
    }

    /// Save the recording with explicit options.
    ///
    /// Fails with `NoRecordedData` when the range holds nothing and with
    /// `PipelineNotFound` when `pipeline` names an unknown pipeline.
    pub async fn saveas(&self, opts: Option<&SaveasOptions>) -> Result<SaveasResult, ClientError> {
        let url = self.url("/saveas")?;
        let default_opts = SaveasOptions::default();
        let opts = opts.unwrap_or(&default_opts);
        let resp: SaveasResp = self
            .client
            .call(ApiContext::Recording, Method::POST, url, Some(opts))
            .await?;
        Ok(SaveasResult {
            fname: resp.fname,
            persistent_id: resp.persistent_id,
        })
    }

    /// Save a still image of the stream and return its file name.
    pub async fn snapshot(&self, opts: Option<&SnapshotOptions>) -> Result<String, ClientError> {
        let url = self.url("/snapshot")?;
        let default_opts = SnapshotOptions::default();
        let opts = opts.unwrap_or(&default_opts);
        let resp: SnapshotResp = self
            .client
            .call(ApiContext::Recording, Method::POST, url, Some(opts))
            .await?;
        Ok(resp.fname)
    }

    /// Publishing sessions between `start` and `end` (zero: unbounded).
    pub async fn history_activity(&self, start: i64, end: i64) -> Result<Vec<ActivityRecord>, ClientError> {
        let mut url = self.url("/historyrecord")?;
        if start > 0 || end > 0 {
            let mut query = url.query_pairs_mut();
            if start > 0 {
                query.append_pair("start", &start.to_string());
            }
            if end > 0 {
                query.append_pair("end", &end.to_string());
            }
        }
        let resp: HistoryResp = self
            .client
            .call::<_, ()>(ApiContext::General, Method::GET, url, None)
            .await?;
        Ok(resp.items)
    }
}
