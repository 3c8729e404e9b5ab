//! tinyweb: an embeddable HTTP route registry and dispatch engine.
//!
//! Routes are declared as a tree of path prefixes holding endpoints and
//! filters. Registration blocks are plain functions of a [`routing::Scope`],
//! so one block can be mounted under several prefixes. Once
//! [`WebServer::start`] is called the tree is frozen and served.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod server;

pub use config::ServerConfig;
pub use http::{HttpServer, Request, RequestContext, Response};
pub use lifecycle::{LifecycleError, LifecycleState, Shutdown};
pub use routing::{FilterResult, RegistrationError, RouteRegistry, RouteTable, Scope};
pub use server::WebServer;
