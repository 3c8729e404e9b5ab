//! Response sink handed to filters and endpoints.
//!
//! # Responsibilities
//! - Accept exactly one `write(body, status)` per request
//! - Carry response headers set by handlers
//! - Convert into the socket collaborator's response type
//!
//! # Design Decisions
//! - First write wins; later writes are dropped with a warning
//! - A request that finishes without any write becomes a 500

use axum::body::{Body, Bytes};
use axum::http::header::{HeaderMap, HeaderName, HeaderValue};
use axum::http::StatusCode;
use axum::response::IntoResponse;

/// Buffered response produced by a filter chain.
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
    written: bool,
}

impl Response {
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            written: false,
        }
    }

    /// Write the body and status. Only the first call has any effect.
    pub fn write(&mut self, body: impl Into<Bytes>, status: StatusCode) {
        if self.written {
            tracing::warn!(
                status = %status,
                previous_status = %self.status,
                "Response already written, ignoring second write"
            );
            return;
        }
        self.body = body.into();
        self.status = status;
        self.written = true;
    }

    /// Write the body with `200 OK`.
    pub fn ok(&mut self, body: impl Into<Bytes>) {
        self.write(body, StatusCode::OK);
    }

    pub fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    pub fn is_written(&self) -> bool {
        self.written
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Body as text, replacing invalid UTF-8.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

impl IntoResponse for Response {
    fn into_response(self) -> axum::response::Response {
        if !self.written {
            tracing::error!("Handler chain finished without writing a response");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response();
        }
        let mut response = axum::response::Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        response.headers_mut().extend(self.headers);
        response
    }
}
