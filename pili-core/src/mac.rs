//! Credentials and keyed signing
//!
//! Every token the Pili API accepts is derived from one primitive:
//! `urlsafe_base64(HMAC-SHA1(secret_key, input))`, prefixed with the access key.
//!
//! - [`Mac::sign`]: `<access_key>:<digest>` over arbitrary bytes
//! - [`Mac::sign_with_data`]: `<access_key>:<digest>:<payload>` where the digest
//!   covers the already-encoded payload
//! - [`Mac::sign_request`](crate::auth): request authorization, see [`crate::auth`]

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use hmac::{Hmac, Mac as _};
use sha1::Sha1;
use subtle::ConstantTimeEq;

use crate::error::ArgumentError;

type HmacSha1 = Hmac<Sha1>;

/// Length in bytes of an HMAC-SHA1 digest.
pub const DIGEST_LEN: usize = 20;

/// HMAC-SHA1 keyed with a secret.
///
/// The key schedule runs once at construction; each [`digest`](Self::digest)
/// clones the keyed state, so a signer can be shared freely across threads.
#[derive(Clone)]
pub struct KeyedSigner {
    keyed: HmacSha1,
}

impl KeyedSigner {
    /// Key a new signer. An empty secret is rejected.
    pub fn new(secret_key: &[u8]) -> Result<Self, ArgumentError> {
        if secret_key.is_empty() {
            return Err(ArgumentError::EmptySecretKey);
        }
        let keyed = HmacSha1::new_from_slice(secret_key)
            .map_err(|e| ArgumentError::InvalidSecretKey(e.to_string()))?;
        Ok(Self { keyed })
    }

    /// Compute the raw HMAC-SHA1 digest of `message`.
    #[must_use]
    pub fn digest(&self, message: &[u8]) -> [u8; DIGEST_LEN] {
        let mut mac = self.keyed.clone();
        mac.update(message);
        let mut out = [0u8; DIGEST_LEN];
        out.copy_from_slice(&mac.finalize().into_bytes());
        out
    }

    /// Digest of `message`, URL-safe base64 encoded (always 28 characters).
    #[must_use]
    pub fn encoded_digest(&self, message: &[u8]) -> String {
        URL_SAFE.encode(self.digest(message))
    }
}

impl fmt::Debug for KeyedSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("KeyedSigner([REDACTED])")
    }
}

/// Access key / secret key pair used to sign everything sent to Pili.
#[derive(Clone)]
pub struct Mac {
    access_key: String,
    signer: KeyedSigner,
}

impl Mac {
    /// Create a credential. Both keys must be non-empty.
    pub fn new(
        access_key: impl Into<String>,
        secret_key: impl AsRef<[u8]>,
    ) -> Result<Self, ArgumentError> {
        let access_key = access_key.into();
        if access_key.is_empty() {
            return Err(ArgumentError::EmptyAccessKey);
        }
        Ok(Self {
            access_key,
            signer: KeyedSigner::new(secret_key.as_ref())?,
        })
    }

    #[must_use]
    pub fn access_key(&self) -> &str {
        &self.access_key
    }

    #[must_use]
    pub const fn signer(&self) -> &KeyedSigner {
        &self.signer
    }

    /// Sign arbitrary bytes: `<access_key>:<urlsafe_base64(digest)>`
    #[must_use]
    pub fn sign(&self, data: &[u8]) -> String {
        format!("{}:{}", self.access_key, self.signer.encoded_digest(data))
    }

    /// Build a data token: `<access_key>:<digest>:<urlsafe_base64(payload)>`
    ///
    /// The digest is computed over the encoded payload, not the raw bytes.
    #[must_use]
    pub fn sign_with_data(&self, payload: &[u8]) -> String {
        let encoded = URL_SAFE.encode(payload);
        let digest = self.signer.encoded_digest(encoded.as_bytes());
        format!("{}:{}:{}", self.access_key, digest, encoded)
    }

    /// Check `token` against a freshly computed [`sign`](Self::sign) of `data`.
    ///
    /// Comparison is constant-time over the token bytes.
    #[must_use]
    pub fn verify(&self, data: &[u8], token: &str) -> bool {
        let expected = self.sign(data);
        token.len() == expected.len() && bool::from(token.as_bytes().ct_eq(expected.as_bytes()))
    }
}

impl fmt::Debug for Mac {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mac")
            .field("access_key", &self.access_key)
            .field("secret_key", &"[REDACTED]")
            .finish()
    }
}
