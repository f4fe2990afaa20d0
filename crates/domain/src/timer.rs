//! Timer snapshots — the reporting form of an active countdown.
//!
//! Internal scheduling handles never appear here; this is what gets exported
//! to realtime event payloads and the HTTP API.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::capability::{Capability, CapabilityValue};
use crate::id::DeviceId;
use crate::time::Timestamp;

/// Handle-free view of one active timer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerSummary {
    /// The device the countdown is armed for.
    pub device: DeviceId,
    /// Absolute time at which the timer fires.
    pub off_time: Timestamp,
    /// Capability the triggering action set.
    pub capability: Capability,
    /// Value applied when the timer started.
    pub value: CapabilityValue,
    /// Previous value to restore at expiry; `None` means "turn off".
    pub old_value: Option<CapabilityValue>,
}

/// Ordered snapshot of all active timers, keyed by device.
pub type TimerExport = BTreeMap<DeviceId, TimerSummary>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::now;

    #[test]
    fn should_serialize_summary_without_any_handle_fields() {
        let summary = TimerSummary {
            device: DeviceId::new(),
            off_time: now(),
            capability: Capability::OnOff,
            value: CapabilityValue::Bool(true),
            old_value: None,
        };
        let json = serde_json::to_value(&summary).unwrap();
        let mut keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        assert_eq!(
            keys,
            vec!["capability", "device", "off_time", "old_value", "value"]
        );
    }

    #[test]
    fn should_key_export_by_device_id_string() {
        let device = DeviceId::new();
        let mut export = TimerExport::new();
        export.insert(
            device,
            TimerSummary {
                device,
                off_time: now(),
                capability: Capability::Dim,
                value: CapabilityValue::Number(0.8),
                old_value: Some(CapabilityValue::Number(0.3)),
            },
        );
        let json = serde_json::to_value(&export).unwrap();
        assert!(json.as_object().unwrap().contains_key(&device.to_string()));
    }
}
