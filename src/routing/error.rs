//! Registration error definitions.
//!
//! The `Display` text of every variant is part of the public contract:
//! callers match on it, so changing wording is a breaking change.

use std::fmt;

use axum::http::Method;
use thiserror::Error;

/// The registration operation that was attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationKind {
    Path,
    Endpoint,
    /// Both method filters and any-method filters.
    Filter,
}

impl fmt::Display for RegistrationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistrationKind::Path => f.write_str("paths"),
            RegistrationKind::Endpoint => f.write_str("endpoints"),
            RegistrationKind::Filter => f.write_str("filters"),
        }
    }
}

/// Errors raised synchronously by `path`, `end_point` and the filter calls.
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// The absolute path was already claimed by an earlier `path` call.
    #[error("Path already registered: {0}")]
    DuplicatePath(String),

    /// The same (method, sub-path) was bound twice under one node.
    #[error("Endpoint already registered: {method} {path}")]
    DuplicateEndpoint { method: Method, path: String },

    /// A mutation was attempted outside the configurable state.
    #[error("Cannot add {0} after the server has started.")]
    ServerStarted(RegistrationKind),

    /// A path prefix contained an empty segment (`""`, `"/"`, `"/a//b"`).
    #[error("Path contains an empty segment: {0:?}")]
    EmptySegment(String),

    /// Prefixes and sub-paths are absolute.
    #[error("Path must start with '/': {0:?}")]
    MissingLeadingSlash(String),

    /// A filter or endpoint pattern failed to compile.
    #[error("Invalid path pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
