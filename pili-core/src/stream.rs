//! Stream state model
//!
//! A stream's disabled-ness lives in one signed integer (`disabledTill`):
//! `0` enabled, `-1` disabled until re-enabled, `t > 0` disabled until unix
//! time `t`. Nothing flips the value when `t` passes; every read compares it
//! against the caller's clock.

use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize};

/// Tri-state disable status of a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DisableStatus(i64);

impl DisableStatus {
    pub const ENABLED: Self = Self(0);
    pub const PERMANENT: Self = Self(-1);

    /// Wrap a raw `disabledTill` value as returned by the API.
    #[must_use]
    pub const fn from_raw(value: i64) -> Self {
        Self(value)
    }

    /// Disabled until unix time `timestamp`.
    #[must_use]
    pub const fn until(timestamp: i64) -> Self {
        Self(timestamp)
    }

    #[must_use]
    pub const fn as_raw(self) -> i64 {
        self.0
    }

    /// Disabled at `now` (unix seconds)?
    #[must_use]
    pub const fn is_disabled_at(self, now: i64) -> bool {
        self.0 == -1 || (self.0 > 0 && self.0 > now)
    }

    /// Unix time the stream re-enables itself, for timed disables only.
    #[must_use]
    pub const fn disabled_until(self) -> Option<i64> {
        if self.0 > 0 { Some(self.0) } else { None }
    }
}

/// `(status == -1) || (status > 0 && status > now)`
#[must_use]
pub const fn is_disabled(status: i64, now: i64) -> bool {
    DisableStatus::from_raw(status).is_disabled_at(now)
}

/// Deserialize a possibly-null list as an empty one.
pub fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Snapshot of a stream resource.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StreamInfo {
    pub hub: String,
    pub key: String,
    #[serde(rename = "disabledTill", default)]
    pub disable_status: DisableStatus,
    /// Transcoding profiles, e.g. `480p`, `720p`. Never null.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub converts: Vec<String>,
}

impl StreamInfo {
    /// An enabled stream with no converts.
    #[must_use]
    pub fn new(hub: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            hub: hub.into(),
            key: key.into(),
            disable_status: DisableStatus::ENABLED,
            converts: Vec::new(),
        }
    }

    #[must_use]
    pub const fn is_disabled_at(&self, now: i64) -> bool {
        self.disable_status.is_disabled_at(now)
    }

    /// Disabled according to the local wall clock.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.is_disabled_at(Utc::now().timestamp())
    }

    pub fn enable(&mut self) {
        self.disable_status = DisableStatus::ENABLED;
    }

    pub fn disable(&mut self) {
        self.disable_status = DisableStatus::PERMANENT;
    }

    pub fn disable_until(&mut self, timestamp: i64) {
        self.disable_status = DisableStatus::until(timestamp);
    }

    /// Replace the converts list; `None` clears it.
    pub fn set_converts(&mut self, converts: Option<Vec<String>>) {
        self.converts = converts.unwrap_or_default();
    }

    /// Canonical text form evaluated at `now`:
    /// `{hub:<hub>,key:<key>,disabled:<bool>,converts:[<a>,<b>]}`
    #[must_use]
    pub fn describe_at(&self, now: i64) -> String {
        format!(
            "{{hub:{},key:{},disabled:{},converts:[{}]}}",
            self.hub,
            self.key,
            self.is_disabled_at(now),
            self.converts.join(",")
        )
    }
}

impl fmt::Display for StreamInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe_at(Utc::now().timestamp()))
    }
}
