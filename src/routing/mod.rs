//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Registration (while CONFIGURABLE):
//!     path / end_point / filter calls
//!     → registry.rs (lifecycle gate, duplicate checks)
//!     → matcher.rs (compile patterns once)
//!     → table.rs (PathNode arena rooted at "/")
//!
//! start():
//!     → freeze as Arc<RouteTable>, shared with request threads
//!
//! Incoming Request (method, path)
//!     → dispatch.rs (deepest node, endpoint, filters root → leaf)
//!     → chain.rs (filters in order, Stop short-circuits, endpoint last)
//!     → Return: response written by handlers, or NotFound
//! ```
//!
//! # Design Decisions
//! - Routes registered before start, immutable at runtime
//! - Deterministic: same input always resolves to the same chain
//! - Filter order is outer node first, then registration order

pub mod chain;
pub mod dispatch;
pub mod error;
pub mod matcher;
pub mod node;
pub mod registry;
pub mod table;

pub use chain::{ChainOutcome, Endpoint, Filter, FilterResult};
pub use dispatch::{normalize_path, Resolution, Route};
pub use error::{RegistrationError, RegistrationKind};
pub use matcher::{PathMatcher, PathParams};
pub use node::{EndpointBinding, FilterBinding, MethodFilter, NodeId, PathNode};
pub use registry::{RouteRegistry, Scope};
pub use table::RouteTable;
