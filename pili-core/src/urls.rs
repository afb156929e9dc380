//! Publish and play URLs
//!
//! Publish URLs are signed and expire: the token binds the exact
//! `/<hub>/<key>?e=<expiry>` string, so a captured URL cannot be pointed at
//! another stream or extended.
//!
//! Play URLs are plain, stable paths with no clock dependency.

use std::fmt;

use chrono::Utc;
use url::Url;

use crate::{error::ArgumentError, mac::Mac};

/// Default extension of snapshot play URLs.
pub const DEFAULT_SNAPSHOT_FORMAT: &str = "jpg";

/// Protocol of a play URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayKind {
    Rtmp,
    Hls,
    Hdl,
    Snapshot,
}

impl PlayKind {
    pub const ALL: [Self; 4] = [Self::Rtmp, Self::Hls, Self::Hdl, Self::Snapshot];

    #[must_use]
    pub const fn scheme(self) -> &'static str {
        match self {
            Self::Rtmp => "rtmp",
            Self::Hls | Self::Hdl | Self::Snapshot => "http",
        }
    }

    /// File extension appended to the stream key, if any.
    #[must_use]
    pub const fn extension(self) -> Option<&'static str> {
        match self {
            Self::Rtmp => None,
            Self::Hls => Some("m3u8"),
            Self::Hdl => Some("flv"),
            Self::Snapshot => Some(DEFAULT_SNAPSHOT_FORMAT),
        }
    }
}

impl fmt::Display for PlayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Rtmp => "rtmp",
            Self::Hls => "hls",
            Self::Hdl => "hdl",
            Self::Snapshot => "snapshot",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for PlayKind {
    type Err = ArgumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rtmp" => Ok(Self::Rtmp),
            "hls" => Ok(Self::Hls),
            "hdl" | "flv" => Ok(Self::Hdl),
            "snapshot" => Ok(Self::Snapshot),
            _ => Err(ArgumentError::InvalidUrl(format!("unknown play protocol: {s}"))),
        }
    }
}

/// Play URL for `kind`: `<scheme>://<host>/<hub>/<key>[.<ext>]`
#[must_use]
pub fn play_url(kind: PlayKind, host: &str, hub: &str, stream_key: &str) -> String {
    match kind.extension() {
        Some(ext) => format!("{}://{host}/{hub}/{stream_key}.{ext}", kind.scheme()),
        None => format!("{}://{host}/{hub}/{stream_key}", kind.scheme()),
    }
}

#[must_use]
pub fn rtmp_play_url(host: &str, hub: &str, stream_key: &str) -> String {
    play_url(PlayKind::Rtmp, host, hub, stream_key)
}

#[must_use]
pub fn hls_play_url(host: &str, hub: &str, stream_key: &str) -> String {
    play_url(PlayKind::Hls, host, hub, stream_key)
}

#[must_use]
pub fn hdl_play_url(host: &str, hub: &str, stream_key: &str) -> String {
    play_url(PlayKind::Hdl, host, hub, stream_key)
}

#[must_use]
pub fn snapshot_play_url(host: &str, hub: &str, stream_key: &str) -> String {
    play_url(PlayKind::Snapshot, host, hub, stream_key)
}

/// Snapshot play URL with a configured image format instead of `jpg`.
#[must_use]
pub fn snapshot_play_url_with_format(host: &str, hub: &str, stream_key: &str, format: &str) -> String {
    let format = format.trim_start_matches('.');
    if format.is_empty() {
        return snapshot_play_url(host, hub, stream_key);
    }
    format!("http://{host}/{hub}/{stream_key}.{format}")
}

/// Characters that would change how a publish URL splits into path and query.
const RESERVED_PATH_CHARS: [char; 4] = ['/', '?', '&', '#'];

fn publish_path(hub: &str, stream_key: &str, expire_at: i64) -> String {
    format!("/{hub}/{stream_key}?e={expire_at}")
}

/// Signed RTMP publish URL expiring `ttl_seconds` after `now`.
///
/// `rtmp://<host>/<hub>/<key>?e=<now+ttl>&token=<access_key>:<digest>`
pub fn rtmp_publish_url_at(
    host: &str,
    hub: &str,
    stream_key: &str,
    mac: &Mac,
    ttl_seconds: i64,
    now: i64,
) -> Result<String, ArgumentError> {
    if ttl_seconds <= 0 {
        return Err(ArgumentError::NonPositiveTtl(ttl_seconds));
    }
    for (name, value) in [("host", host), ("hub", hub), ("stream key", stream_key)] {
        if value.is_empty() {
            return Err(ArgumentError::Empty(name));
        }
    }
    for (name, value) in [("hub", hub), ("stream key", stream_key)] {
        if value.contains(RESERVED_PATH_CHARS) {
            return Err(ArgumentError::InvalidUrl(format!(
                "{name} must not contain any of {RESERVED_PATH_CHARS:?}: {value:?}"
            )));
        }
    }

    let expire_at = now.saturating_add(ttl_seconds);
    let path = publish_path(hub, stream_key, expire_at);
    let token = mac.sign(path.as_bytes());
    Ok(format!("rtmp://{host}{path}&token={token}"))
}

/// [`rtmp_publish_url_at`] against the current wall clock.
pub fn rtmp_publish_url(
    host: &str,
    hub: &str,
    stream_key: &str,
    mac: &Mac,
    ttl_seconds: i64,
) -> Result<String, ArgumentError> {
    rtmp_publish_url_at(host, hub, stream_key, mac, ttl_seconds, Utc::now().timestamp())
}

/// Why a publish URL was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PublishUrlError {
    #[error("malformed publish url: {0}")]
    Malformed(String),

    #[error("publish url expired at {expire_at}")]
    Expired { expire_at: i64 },

    #[error("publish url signature mismatch")]
    BadSignature,
}

/// A publish URL that passed [`verify_publish_url`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishGrant {
    pub host: String,
    pub hub: String,
    pub stream_key: String,
    pub expire_at: i64,
}

/// Check a publish URL the way the ingest side does: the expiry must not
/// have elapsed at `now` and the token must sign exactly `path?e=expiry`.
pub fn verify_publish_url(raw: &str, mac: &Mac, now: i64) -> Result<PublishGrant, PublishUrlError> {
    let url = Url::parse(raw).map_err(|e| PublishUrlError::Malformed(e.to_string()))?;
    let host = url
        .host_str()
        .ok_or_else(|| PublishUrlError::Malformed("missing host".to_string()))?;

    // Hub, key and query are read from the raw text: the token signs the
    // path exactly as written, and `Url` would percent-encode it.
    let rest = raw
        .split_once("://")
        .map(|(_, rest)| rest)
        .ok_or_else(|| PublishUrlError::Malformed("missing scheme".to_string()))?;
    let path_and_query = rest
        .find('/')
        .map(|start| &rest[start..])
        .ok_or_else(|| PublishUrlError::Malformed("missing path".to_string()))?;
    let path_and_query = path_and_query
        .split_once('#')
        .map_or(path_and_query, |(before, _)| before);
    let (path, query) = path_and_query.split_once('?').unwrap_or((path_and_query, ""));

    let mut segments = path.strip_prefix('/').unwrap_or(path).split('/');
    let (Some(hub), Some(stream_key), None) = (segments.next(), segments.next(), segments.next()) else {
        return Err(PublishUrlError::Malformed("path must be /<hub>/<key>".to_string()));
    };
    if hub.is_empty() || stream_key.is_empty() {
        return Err(PublishUrlError::Malformed("path must be /<hub>/<key>".to_string()));
    }

    let (expiry_part, token) = query
        .split_once("&token=")
        .ok_or_else(|| PublishUrlError::Malformed("missing token".to_string()))?;
    let expire_at: i64 = expiry_part
        .strip_prefix("e=")
        .ok_or_else(|| PublishUrlError::Malformed("missing expiry".to_string()))?
        .parse()
        .map_err(|_| PublishUrlError::Malformed("expiry is not an integer".to_string()))?;

    if expire_at <= now {
        return Err(PublishUrlError::Expired { expire_at });
    }
    if !mac.verify(publish_path(hub, stream_key, expire_at).as_bytes(), token) {
        return Err(PublishUrlError::BadSignature);
    }

    Ok(PublishGrant {
        host: host.to_string(),
        hub: hub.to_string(),
        stream_key: stream_key.to_string(),
        expire_at,
    })
}
