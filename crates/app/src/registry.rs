//! In-memory map from device id to its active timer record.
//!
//! No concurrency control of its own: the scheduler owns the registry inside
//! a single mutex and guarantees serialized access.

use std::collections::HashMap;

use afterglow_domain::capability::{Capability, CapabilityValue};
use afterglow_domain::id::DeviceId;
use afterglow_domain::time::Timestamp;
use afterglow_domain::timer::{TimerExport, TimerSummary};

use crate::ports::{CountdownHandle, WatcherHandle};

/// One active countdown, with its scheduling handles.
///
/// At most one entry exists per device; the entry never out-lives its
/// countdown handle.
#[derive(Debug, Clone)]
pub struct TimerEntry {
    pub device: DeviceId,
    /// Capability the triggering action set.
    pub capability: Capability,
    /// Value applied when the timer started.
    pub target_value: CapabilityValue,
    /// Pre-action value to reapply at expiry; `None` means "turn off".
    pub restore_value: Option<CapabilityValue>,
    /// Absolute time at which the timer fires.
    pub expires_at: Timestamp,
    /// Reference to the scheduled expiry callback.
    pub countdown: CountdownHandle,
    /// Reference to the manual-off subscription.
    pub watcher: WatcherHandle,
}

impl TimerEntry {
    /// The handle-free reporting form of this entry.
    #[must_use]
    pub fn summary(&self) -> TimerSummary {
        TimerSummary {
            device: self.device,
            off_time: self.expires_at,
            capability: self.capability.clone(),
            value: self.target_value.clone(),
            old_value: self.restore_value.clone(),
        }
    }
}

/// Map from device id to its active [`TimerEntry`].
#[derive(Debug, Default)]
pub struct TimerRegistry {
    entries: HashMap<DeviceId, TimerEntry>,
}

impl TimerRegistry {
    #[must_use]
    pub fn get(&self, device: DeviceId) -> Option<&TimerEntry> {
        self.entries.get(&device)
    }

    /// Insert `entry`, overwriting any existing entry for the same device.
    pub fn put(&mut self, entry: TimerEntry) {
        self.entries.insert(entry.device, entry);
    }

    /// Remove and return the entry for `device`. Absent key is a no-op.
    pub fn remove(&mut self, device: DeviceId) -> Option<TimerEntry> {
        self.entries.remove(&device)
    }

    #[must_use]
    pub fn contains(&self, device: DeviceId) -> bool {
        self.entries.contains_key(&device)
    }

    /// Ordered, handle-free snapshot of all active timers.
    #[must_use]
    pub fn export(&self) -> TimerExport {
        self.entries
            .iter()
            .map(|(device, entry)| (*device, entry.summary()))
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
