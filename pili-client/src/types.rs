//! Request and response bodies of the Pili v2 and RTC v1 APIs

use pili_core::stream::null_as_empty;
use serde::{Deserialize, Serialize};

// === Hub ===

#[derive(Debug, Clone, Serialize)]
pub(crate) struct CreateStreamArgs<'a> {
    pub key: &'a str,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ListItem {
    pub key: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ListResp {
    #[serde(default)]
    pub items: Vec<ListItem>,
    #[serde(default)]
    pub marker: String,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct BatchLiveStatusArgs<'a> {
    pub items: &'a [String],
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct BatchLiveStatusResp {
    #[serde(default)]
    pub items: Vec<LiveStatusWithKey>,
}

// === Stream ===

/// Raw stream record as returned by `GET /v2/hubs/<hub>/streams/<key>`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct StreamInfoResp {
    pub created_at: i64,
    pub updated_at: i64,
    pub expire_at: i64,
    pub disabled_till: i64,
    #[serde(deserialize_with = "null_as_empty")]
    pub converts: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DisabledArgs {
    pub disabled_till: i64,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ConvertsArgs<'a> {
    pub converts: &'a [String],
}

/// Frame rates of a live session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FpsStatus {
    pub audio: i64,
    pub video: i64,
    pub data: i64,
}

/// Status of an ongoing live session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LiveStatus {
    /// Unix time the session started
    pub start_at: i64,
    #[serde(rename = "clientIP")]
    pub client_ip: String,
    /// Current bitrate in bits per second
    pub bps: i64,
    pub fps: FpsStatus,
}

/// [`LiveStatus`] of one stream in a batch query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveStatusWithKey {
    #[serde(default)]
    pub key: String,
    #[serde(flatten)]
    pub status: LiveStatus,
}

/// Options for saving a live stream's recording as a file.
///
/// Zero / empty fields are omitted and take the server defaults
/// (whole session, `m3u8`, default pipeline).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveasOptions {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub fname: String,
    #[serde(skip_serializing_if = "is_zero")]
    pub start: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub end: i64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub format: String,
    /// Named processing pipeline for format conversion
    #[serde(skip_serializing_if = "String::is_empty")]
    pub pipeline: String,
    /// Callback URL notified when conversion finishes
    #[serde(skip_serializing_if = "String::is_empty")]
    pub notify: String,
    #[serde(skip_serializing_if = "is_zero")]
    pub expire_days: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct SaveasResp {
    pub fname: String,
    #[serde(rename = "persistentID")]
    pub persistent_id: String,
}

/// Options for saving a still image of a live stream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SnapshotOptions {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub fname: String,
    /// Unix time of the frame; zero means "now"
    #[serde(skip_serializing_if = "is_zero")]
    pub time: i64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub format: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct SnapshotResp {
    pub fname: String,
}

/// One publishing session in a stream's history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityRecord {
    pub start: i64,
    pub end: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct HistoryResp {
    pub items: Vec<ActivityRecord>,
}

// === Meeting (RTC) ===

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRoomArgs {
    pub owner_id: String,
    pub room_name: String,
    pub user_max: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CreateRoomReturn {
    pub room_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RoomStatusReturn {
    pub room_name: String,
    #[serde(rename = "owner_id")]
    pub owner_user_id: String,
    pub user_max: i64,
}

/// Payload of a room access token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomAccessPolicy {
    pub room_name: String,
    pub user_id: String,
    /// `admin` or `user`
    pub perm: String,
    pub version: String,
    /// Unix time after which the token is rejected
    pub expire_at: i64,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_zero(value: &i64) -> bool {
    *value == 0
}
