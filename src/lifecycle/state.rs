//! Server lifecycle state machine.
//!
//! ```text
//! Configurable --start()--> Started --stop()--> Stopped
//! ```
//!
//! There is no way back to `Configurable`. Every mutating registration
//! call checks the state here, which is also the one place the stable
//! error messages are produced.

use std::fmt;

use thiserror::Error;

use crate::routing::{RegistrationError, RegistrationKind};

/// Where a server is in its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecycleState {
    #[default]
    Configurable,
    Started,
    Stopped,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleState::Configurable => f.write_str("CONFIGURABLE"),
            LifecycleState::Started => f.write_str("STARTED"),
            LifecycleState::Stopped => f.write_str("STOPPED"),
        }
    }
}

/// Errors from `start()` and `stop()`.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Server has already been started.")]
    AlreadyStarted,

    #[error("Server has been stopped and cannot be restarted.")]
    Stopped,

    #[error("Server is not running.")]
    NotRunning,

    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to build server runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("Server thread terminated abnormally")]
    ServerThread,
}

/// Tagged lifecycle state with checked transitions.
#[derive(Debug, Default)]
pub struct Lifecycle {
    state: LifecycleState,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Gate for every registration entry point.
    pub fn ensure_configurable(&self, kind: RegistrationKind) -> Result<(), RegistrationError> {
        match self.state {
            LifecycleState::Configurable => Ok(()),
            LifecycleState::Started | LifecycleState::Stopped => {
                Err(RegistrationError::ServerStarted(kind))
            }
        }
    }

    /// Check that `start` is currently allowed, without transitioning.
    pub fn can_start(&self) -> Result<(), LifecycleError> {
        match self.state {
            LifecycleState::Configurable => Ok(()),
            LifecycleState::Started => Err(LifecycleError::AlreadyStarted),
            LifecycleState::Stopped => Err(LifecycleError::Stopped),
        }
    }

    /// `Configurable -> Started`.
    pub fn start(&mut self) -> Result<(), LifecycleError> {
        self.can_start()?;
        self.state = LifecycleState::Started;
        Ok(())
    }

    /// `Started -> Stopped`.
    pub fn stop(&mut self) -> Result<(), LifecycleError> {
        match self.state {
            LifecycleState::Started => {
                self.state = LifecycleState::Stopped;
                Ok(())
            }
            LifecycleState::Configurable | LifecycleState::Stopped => Err(LifecycleError::NotRunning),
        }
    }
}
