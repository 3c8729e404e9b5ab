//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, limits, body buffering)
//!     → request.rs (method, path, headers, cookies, body)
//!     → routing (resolve + filter chain, with a fresh context.rs per request)
//!     → response.rs (status + body written once by a handler)
//!     → Send to client
//! ```

pub mod context;
pub mod request;
pub mod response;
pub mod server;

pub use context::RequestContext;
pub use request::{Request, UuidRequestId, X_REQUEST_ID};
pub use response::Response;
pub use server::HttpServer;
