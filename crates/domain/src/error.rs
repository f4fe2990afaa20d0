//! Common error types used across the workspace.
//!
//! Each failure mode gets its own typed source error; the top-level
//! [`AfterglowError`] aggregates them via `#[from]` conversions. No
//! stringly-typed variants.

use crate::capability::Capability;
use crate::id::DeviceId;

/// Top-level error for every fallible operation in the workspace.
#[derive(Debug, thiserror::Error)]
pub enum AfterglowError {
    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("device unavailable")]
    DeviceUnavailable(#[from] DeviceUnavailableError),

    #[error("capability unsupported")]
    CapabilityUnsupported(#[from] CapabilityUnsupportedError),

    #[error("stale handle")]
    StaleHandle(#[from] StaleHandleError),
}

/// Domain invariant violations.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("{value:?} is not a valid device id")]
    InvalidDeviceId { value: String },

    #[error("duration of {seconds} seconds is out of range")]
    DurationOutOfRange { seconds: i64 },
}

/// The actuator could not reach the device for a read or write.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("device {device} is unavailable")]
pub struct DeviceUnavailableError {
    pub device: DeviceId,
}

/// The requested capability is not present or not settable on the device.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("device {device} does not support capability {capability}")]
pub struct CapabilityUnsupportedError {
    pub device: DeviceId,
    pub capability: Capability,
}

/// A countdown or watcher handle was already invalidated.
///
/// Benign: callers log it and move on, it never aborts an operation.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("stale {kind} handle {id}")]
pub struct StaleHandleError {
    pub kind: HandleKind,
    pub id: u64,
}

/// Which kind of scheduling handle went stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleKind {
    Countdown,
    Watcher,
}

impl std::fmt::Display for HandleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Countdown => f.write_str("countdown"),
            Self::Watcher => f.write_str("watcher"),
        }
    }
}
