// Pili Core
//
// Signing and timed-access primitives for the Pili live streaming API.
// Everything here is pure and synchronous: no I/O, no hidden clock reads
// except in the explicitly named wall-clock conveniences.
//
// Architecture:
// - pili-core: credentials, request authorization, data tokens, URLs,
//   stream state model, error classification
// - pili-client: HTTP client (Hub / Stream / Meeting) built on this crate
// - pili-cli: command line front end

pub mod auth;
pub mod error;
pub mod mac;
pub mod stream;
pub mod urls;

pub use auth::{AuthScheme, SigningRequest};
pub use error::{classify, is_exists, is_not_exists, ApiContext, ApiError, ArgumentError, ErrorKind};
pub use mac::{KeyedSigner, Mac};
pub use stream::{is_disabled, DisableStatus, StreamInfo};
pub use urls::{
    hdl_play_url, hls_play_url, play_url, rtmp_play_url, rtmp_publish_url, rtmp_publish_url_at,
    snapshot_play_url, snapshot_play_url_with_format, verify_publish_url, PlayKind, PublishGrant,
    PublishUrlError,
};
