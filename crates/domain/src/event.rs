//! Realtime timer lifecycle events.

use serde::{Deserialize, Serialize};

use crate::capability::{Capability, CapabilityValue};
use crate::id::{DeviceId, EventId};
use crate::time::{Timestamp, now};
use crate::timer::TimerExport;

/// What happened to a timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerEventKind {
    /// A countdown was armed or rearmed (`timer_started`).
    Started,
    /// A countdown fired or was cancelled (`timer_deleted`).
    Deleted,
}

/// A tagged realtime event published on every timer lifecycle change.
///
/// Carries a full ordered snapshot of all active timers alongside the
/// affected device; `Started` events additionally describe the applied
/// action (capability, value, and the pre-action value when captured).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerEvent {
    pub id: EventId,
    pub kind: TimerEventKind,
    pub device: DeviceId,
    pub capability: Option<Capability>,
    pub value: Option<CapabilityValue>,
    pub old_value: Option<CapabilityValue>,
    pub timers: TimerExport,
    pub timestamp: Timestamp,
}

impl TimerEvent {
    /// Build a `timer_started` event for `device`.
    #[must_use]
    pub fn started(
        device: DeviceId,
        capability: Capability,
        value: CapabilityValue,
        old_value: Option<CapabilityValue>,
        timers: TimerExport,
    ) -> Self {
        Self {
            id: EventId::new(),
            kind: TimerEventKind::Started,
            device,
            capability: Some(capability),
            value: Some(value),
            old_value,
            timers,
            timestamp: now(),
        }
    }

    /// Build a `timer_deleted` event for `device`.
    #[must_use]
    pub fn deleted(device: DeviceId, timers: TimerExport) -> Self {
        Self {
            id: EventId::new(),
            kind: TimerEventKind::Deleted,
            device,
            capability: None,
            value: None,
            old_value: None,
            timers,
            timestamp: now(),
        }
    }
}
