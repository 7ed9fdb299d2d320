//! `aerolink-types` – shared vocabulary of the aerolink workspace.
//!
//! Holds the telemetry [`units`], the six vehicle [`ActionKind`]s and the two
//! error shapes callers of the vehicle model ever see: [`VehicleError`] for an
//! action invocation and the backend-agnostic [`ActionError`] it wraps.

pub mod units;

pub use units::{
    Altitude, Degrees, Distance, Euler, HomeDistance, HomePosition, PositionAbsolute, Radian,
    Speed, VelocityNed, VideoStreamInfo,
};

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Boxed error used as the opaque cause of an [`ActionError`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The commands a vehicle accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Arm,
    Disarm,
    Takeoff,
    Land,
    Hold,
    ReturnToLaunch,
}

impl ActionKind {
    /// Every action, in declaration order.
    pub const ALL: [ActionKind; 6] = [
        ActionKind::Arm,
        ActionKind::Disarm,
        ActionKind::Takeoff,
        ActionKind::Land,
        ActionKind::Hold,
        ActionKind::ReturnToLaunch,
    ];

    /// Stable lowercase name, used in logs and error messages.
    pub fn name(self) -> &'static str {
        match self {
            ActionKind::Arm => "arm",
            ActionKind::Disarm => "disarm",
            ActionKind::Takeoff => "takeoff",
            ActionKind::Land => "land",
            ActionKind::Hold => "hold",
            ActionKind::ReturnToLaunch => "return_to_launch",
        }
    }

    /// Position of this action in [`ActionKind::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A command was rejected or failed on the backend.
///
/// Carries the backend's message and the original error as an opaque cause,
/// so callers never depend on a backend-specific error type.
#[derive(Error, Debug)]
#[error("{}", .message.as_deref().unwrap_or("action failed"))]
pub struct ActionError {
    message: Option<String>,
    #[source]
    cause: Option<BoxError>,
}

impl ActionError {
    /// An error with a message and no underlying cause.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            cause: None,
        }
    }

    /// An error with an optional message and an underlying cause.
    pub fn with_cause(message: Option<String>, cause: impl Into<BoxError>) -> Self {
        Self {
            message,
            cause: Some(cause.into()),
        }
    }

    /// An error that only wraps `cause`; its message is taken from the cause.
    pub fn from_cause(cause: impl Into<BoxError>) -> Self {
        let cause = cause.into();
        Self {
            message: Some(cause.to_string()),
            cause: Some(cause),
        }
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn cause(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        self.cause.as_deref()
    }
}

/// Error returned by an action invocation.
#[derive(Error, Debug)]
pub enum VehicleError {
    /// The action has no implementation bound, usually because no backend is
    /// connected.
    #[error("{0} is not bound to any backend")]
    NotBound(ActionKind),

    #[error("{action} failed: {source}")]
    Action {
        action: ActionKind,
        #[source]
        source: ActionError,
    },
}

impl VehicleError {
    /// The action that produced this error.
    pub fn action(&self) -> ActionKind {
        match self {
            VehicleError::NotBound(action) => *action,
            VehicleError::Action { action, .. } => *action,
        }
    }
}
