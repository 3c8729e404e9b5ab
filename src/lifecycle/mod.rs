//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! State machine (state.rs):
//!     CONFIGURABLE → STARTED → STOPPED
//!     Registration allowed only while CONFIGURABLE
//!
//! Shutdown (shutdown.rs):
//!     stop() → trigger → stop accepting → drain connections → join thread
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → binary calls stop()
//! ```
//!
//! # Design Decisions
//! - No transition back to CONFIGURABLE
//! - Lifecycle errors carry fixed message text
//! - Shutdown has a deadline: draining is abandoned after `shutdown_secs`

pub mod shutdown;
pub mod signals;
pub mod state;

pub use shutdown::{Shutdown, ShutdownSignal};
pub use state::{Lifecycle, LifecycleError, LifecycleState};
