// Pili Client
//
// Async HTTP client for the Pili live streaming API (hubs and streams)
// and the RTC room API. Requests are signed with pili-core's `Mac` and
// failures are classified into `ApiError` kinds.
//
// Layout:
// - client: shared signing/dispatch core
// - hub, stream, meeting: resource handles
// - transport: pluggable `HttpRequester` (reqwest by default)

pub mod client;
pub mod config;
pub mod error;
pub mod hub;
pub mod meeting;
pub mod stream;
pub mod transport;
pub mod types;

#[cfg(test)]
mod mock;

pub use client::Client;
pub use config::ClientConfig;
pub use error::{is_exists, is_not_exists, ClientError};
pub use hub::{Hub, StreamList};
pub use meeting::Meeting;
pub use stream::{SaveasResult, Stream};
pub use transport::{HttpRequest, HttpRequester, HttpResponse, ReqwestRequester};
pub use types::{
    ActivityRecord, CreateRoomReturn, FpsStatus, LiveStatus, LiveStatusWithKey, RoomAccessPolicy,
    RoomStatusReturn, SaveasOptions, SnapshotOptions,
};

pub use pili_core;
