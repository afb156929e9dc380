//! Request authorization
//!
//! Builds the value of the `Authorization` header for Pili API calls.
//!
//! Two canonical forms are supported:
//!
//! - `Qiniu` (v2 API):
//!   `<METHOD> <path>[?<query>]\nHost: <host>[\nContent-Type: <ct>]\n\n[<body>]`,
//!   body included when a content type other than `application/octet-stream`
//!   is set and the body is non-empty
//! - `QBox` (legacy): `<path>[?<query>]\n[<body>]`, body included only for
//!   `application/x-www-form-urlencoded`

use std::fmt;

use crate::mac::Mac;

pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_FORM: &str = "application/x-www-form-urlencoded";
pub const CONTENT_TYPE_OCTET_STREAM: &str = "application/octet-stream";

/// Authorization header scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthScheme {
    #[default]
    Qiniu,
    QBox,
}

impl AuthScheme {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Qiniu => "Qiniu",
            Self::QBox => "QBox",
        }
    }
}

impl fmt::Display for AuthScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The parts of an HTTP request covered by the signature.
#[derive(Debug, Clone, Copy, Default)]
pub struct SigningRequest<'a> {
    pub method: &'a str,
    pub host: &'a str,
    pub path: &'a str,
    /// Raw query string without the leading `?`
    pub query: Option<&'a str>,
    pub content_type: Option<&'a str>,
    pub body: Option<&'a [u8]>,
}

impl<'a> SigningRequest<'a> {
    #[must_use]
    pub const fn new(method: &'a str, host: &'a str, path: &'a str) -> Self {
        Self {
            method,
            host,
            path,
            query: None,
            content_type: None,
            body: None,
        }
    }

    #[must_use]
    pub fn with_query(mut self, query: &'a str) -> Self {
        self.query = Some(query);
        self
    }

    #[must_use]
    pub fn with_body(mut self, content_type: &'a str, body: &'a [u8]) -> Self {
        self.content_type = Some(content_type);
        self.body = Some(body);
        self
    }

    fn non_empty_query(&self) -> Option<&'a str> {
        self.query.filter(|q| !q.is_empty())
    }

    fn non_empty_body(&self) -> Option<&'a [u8]> {
        self.body.filter(|b| !b.is_empty())
    }

    /// Canonical signing input for `scheme`.
    #[must_use]
    pub fn canonical(&self, scheme: AuthScheme) -> Vec<u8> {
        match scheme {
            AuthScheme::Qiniu => self.canonical_qiniu(),
            AuthScheme::QBox => self.canonical_qbox(),
        }
    }

    fn canonical_qiniu(&self) -> Vec<u8> {
        let mut data = format!("{} {}", self.method, self.path);
        if let Some(query) = self.non_empty_query() {
            data.push('?');
            data.push_str(query);
        }
        data.push_str("\nHost: ");
        data.push_str(self.host);

        let content_type = self.content_type.filter(|ct| !ct.is_empty());
        if let Some(ct) = content_type {
            data.push_str("\nContent-Type: ");
            data.push_str(ct);
        }
        data.push_str("\n\n");

        let mut data = data.into_bytes();
        if let (Some(ct), Some(body)) = (content_type, self.non_empty_body()) {
            if ct != CONTENT_TYPE_OCTET_STREAM {
                data.extend_from_slice(body);
            }
        }
        data
    }

    fn canonical_qbox(&self) -> Vec<u8> {
        let mut data = self.path.to_string();
        if let Some(query) = self.non_empty_query() {
            data.push('?');
            data.push_str(query);
        }
        data.push('\n');

        let mut data = data.into_bytes();
        if self.content_type == Some(CONTENT_TYPE_FORM) {
            if let Some(body) = self.non_empty_body() {
                data.extend_from_slice(body);
            }
        }
        data
    }
}

impl Mac {
    /// Authorization token for `request`: `<access_key>:<digest>`.
    #[must_use]
    pub fn sign_request(&self, scheme: AuthScheme, request: &SigningRequest<'_>) -> String {
        self.sign(&request.canonical(scheme))
    }

    /// Full `Authorization` header value, e.g. `Qiniu ak:digest`.
    #[must_use]
    pub fn authorization(&self, scheme: AuthScheme, request: &SigningRequest<'_>) -> String {
        format!("{scheme} {}", self.sign_request(scheme, request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mac() -> Mac {
        Mac::new("ak", "sk").unwrap()
    }

    #[test]
    fn test_qiniu_canonical_without_body() {
        let req = SigningRequest::new("GET", "pili.qiniuapi.com", "/v2/hubs/h/streams")
            .with_query("prefix=a&limit=10");
        assert_eq!(
            req.canonical(AuthScheme::Qiniu),
            b"GET /v2/hubs/h/streams?prefix=a&limit=10\nHost: pili.qiniuapi.com\n\n".to_vec()
        );
    }

    #[test]
    fn test_qiniu_canonical_with_json_body() {
        let body = br#"{"key":"k"}"#;
        let req = SigningRequest::new("POST", "pili.qiniuapi.com", "/v2/hubs/h/streams")
            .with_body(CONTENT_TYPE_JSON, body);
        assert_eq!(
            req.canonical(AuthScheme::Qiniu),
            b"POST /v2/hubs/h/streams\nHost: pili.qiniuapi.com\nContent-Type: application/json\n\n{\"key\":\"k\"}"
                .to_vec()
        );
    }

    #[test]
    fn test_qiniu_canonical_skips_octet_stream_body() {
        let req = SigningRequest::new("POST", "h", "/p").with_body(CONTENT_TYPE_OCTET_STREAM, b"raw");
        assert_eq!(
            req.canonical(AuthScheme::Qiniu),
            b"POST /p\nHost: h\nContent-Type: application/octet-stream\n\n".to_vec()
        );
    }

    #[test]
    fn test_qiniu_empty_query_is_omitted() {
        let req = SigningRequest::new("GET", "h", "/p").with_query("");
        assert_eq!(req.canonical(AuthScheme::Qiniu), b"GET /p\nHost: h\n\n".to_vec());
    }

    #[test]
    fn test_qbox_canonical() {
        let req = SigningRequest::new("POST", "h", "/p").with_query("a=1");
        assert_eq!(req.canonical(AuthScheme::QBox), b"/p?a=1\n".to_vec());

        let form = req.with_body(CONTENT_TYPE_FORM, b"x=1&y=2");
        assert_eq!(form.canonical(AuthScheme::QBox), b"/p?a=1\nx=1&y=2".to_vec());

        let json = req.with_body(CONTENT_TYPE_JSON, b"{}");
        assert_eq!(json.canonical(AuthScheme::QBox), b"/p?a=1\n".to_vec());
    }

    #[test]
    fn test_sign_request_matches_manual_sign() {
        let mac = mac();
        let req = SigningRequest::new("GET", "h", "/p");
        assert_eq!(
            mac.sign_request(AuthScheme::Qiniu, &req),
            mac.sign(b"GET /p\nHost: h\n\n")
        );
    }

    #[test]
    fn test_any_part_changes_token() {
        let mac = mac();
        let base = SigningRequest::new("POST", "h", "/p").with_body(CONTENT_TYPE_JSON, b"{}");
        let token = mac.sign_request(AuthScheme::Qiniu, &base);

        let variants = [
            SigningRequest { method: "PUT", ..base },
            SigningRequest { host: "h2", ..base },
            SigningRequest { path: "/q", ..base },
            SigningRequest { query: Some("x=1"), ..base },
            SigningRequest { body: Some(&b"{ }"[..]), ..base },
        ];
        for variant in variants {
            assert_ne!(mac.sign_request(AuthScheme::Qiniu, &variant), token);
        }
    }

    #[test]
    fn test_authorization_header() {
        let mac = mac();
        let req = SigningRequest::new("GET", "h", "/p");
        let header = mac.authorization(AuthScheme::Qiniu, &req);
        assert!(header.starts_with("Qiniu ak:"));

        let header = mac.authorization(AuthScheme::QBox, &req);
        assert!(header.starts_with("QBox ak:"));
    }
}
