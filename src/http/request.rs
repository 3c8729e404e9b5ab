//! Inbound request representation.
//!
//! # Responsibilities
//! - Carry method and path for dispatch
//! - Expose headers, cookies, query and body to handlers unchanged
//! - Hold path variables captured by the matched endpoint
//!
//! # Design Decisions
//! - Body is fully buffered (bounded by `limits.max_body_bytes`) before
//!   the chain runs, so handlers stay synchronous
//! - Cookies are parsed on demand from the `Cookie` headers

use axum::body::Bytes;
use axum::http::header::{HeaderMap, HeaderName, HeaderValue, COOKIE};
use axum::http::request::Parts;
use axum::http::Method;
use tower_http::request_id::{MakeRequestId, RequestId};

use crate::routing::PathParams;

/// Header carrying the request correlation id.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Generates a UUID v4 request id when the client did not send one.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&uuid::Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// A request as seen by filters and endpoints.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    path: String,
    query: Option<String>,
    headers: HeaderMap,
    body: Bytes,
    params: PathParams,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: None,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            params: PathParams::new(),
        }
    }

    /// Build from the parts the socket collaborator parsed.
    pub fn from_parts(parts: &Parts, body: Bytes) -> Self {
        Self {
            method: parts.method.clone(),
            path: parts.uri.path().to_string(),
            query: parts.uri.query().map(str::to_string),
            headers: parts.headers.clone(),
            body,
            params: PathParams::new(),
        }
    }

    /// Add a header. Invalid names or values are ignored.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers.append(name, value);
        }
        self
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub(crate) fn set_params(&mut self, params: PathParams) {
        self.params = params;
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Request path as received, without the query string.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// First value of the header, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn has_header(&self, name: &str) -> bool {
        self.headers.contains_key(name)
    }

    /// Value of the named cookie across all `Cookie` headers.
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v)
    }

    /// Variable captured by a templated endpoint such as `/users/{id}`.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn params(&self) -> &PathParams {
        &self.params
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn request_id(&self) -> Option<&str> {
        self.header(X_REQUEST_ID)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_parsing() {
        let req = Request::new(Method::GET, "/")
            .with_header("Cookie", "theme=dark; logged-in=7C65o6I2>A=6]4@>")
            .with_header("Cookie", "other=1;");
        assert_eq!(req.cookie("logged-in"), Some("7C65o6I2>A=6]4@>"));
        assert_eq!(req.cookie("theme"), Some("dark"));
        assert_eq!(req.cookie("other"), Some("1"));
        assert_eq!(req.cookie("missing"), None);
    }

    #[test]
    fn headers_are_case_insensitive() {
        let req = Request::new(Method::GET, "/").with_header("Sucks", "true");
        assert!(req.has_header("sucks"));
        assert_eq!(req.header("SUCKS"), Some("true"));
    }

    #[test]
    fn from_parts_splits_query() {
        let (parts, _) = axum::http::Request::builder()
            .method(Method::POST)
            .uri("http://example.com/api/items?page=2")
            .header("x-request-id", "abc")
            .body(())
            .unwrap()
            .into_parts();
        let req = Request::from_parts(&parts, Bytes::from_static(b"payload"));
        assert_eq!(req.method(), &Method::POST);
        assert_eq!(req.path(), "/api/items");
        assert_eq!(req.query(), Some("page=2"));
        assert_eq!(req.request_id(), Some("abc"));
        assert_eq!(req.body().as_ref(), b"payload");
    }
}
