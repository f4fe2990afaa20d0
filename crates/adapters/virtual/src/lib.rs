//! # afterglow-adapter-virtual
//!
//! Virtual device platform for demos and tests. Keeps a set of in-memory
//! devices with capability values and implements both the actuator and the
//! directory ports against them, including change notifications for watchers.
//!
//! ## Dependency rule
//!
//! Depends on `afterglow-app` (port traits) and `afterglow-domain` only.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use afterglow_app::ports::{ChangeCallback, DeviceActuator, DeviceDirectory, WatcherHandle};
use afterglow_domain::capability::{Capability, CapabilityValue};
use afterglow_domain::device::Device;
use afterglow_domain::error::{
    AfterglowError, CapabilityUnsupportedError, DeviceUnavailableError, HandleKind,
    StaleHandleError,
};
use afterglow_domain::id::DeviceId;

struct Watcher {
    device: DeviceId,
    capability: Capability,
    on_change: Arc<ChangeCallback>,
}

#[derive(Default)]
struct Inner {
    devices: HashMap<DeviceId, Device>,
    values: HashMap<(DeviceId, Capability), CapabilityValue>,
    watchers: HashMap<u64, Watcher>,
    next_watcher: u64,
}

impl Inner {
    fn device(&self, id: DeviceId) -> Result<&Device, AfterglowError> {
        self.devices
            .get(&id)
            .ok_or_else(|| DeviceUnavailableError { device: id }.into())
    }

    fn check_capability(
        &self,
        id: DeviceId,
        capability: &Capability,
    ) -> Result<(), AfterglowError> {
        if !self.device(id)?.has_capability(capability) {
            return Err(CapabilityUnsupportedError {
                device: id,
                capability: capability.clone(),
            }
            .into());
        }
        Ok(())
    }

    /// Watchers registered for this device/capability pair, cloned out so
    /// they can run after the lock is released.
    fn listeners(
        &self,
        device: DeviceId,
        capability: &Capability,
    ) -> Vec<(WatcherHandle, Arc<ChangeCallback>)> {
        self.watchers
            .iter()
            .filter(|(_, watcher)| watcher.device == device && watcher.capability == *capability)
            .map(|(id, watcher)| (WatcherHandle::new(*id), Arc::clone(&watcher.on_change)))
            .collect()
    }
}

/// In-memory device platform.
///
/// All devices start with every capability at its default value (`onoff`
/// off, `dim` fully bright). State changes from any caller — the scheduler
/// or a test simulating a wall switch — go through [`DeviceActuator::set_value`]
/// and fan out to watchers, exactly like a real platform's event feed.
#[derive(Default)]
pub struct VirtualActuator {
    inner: Mutex<Inner>,
}

impl VirtualActuator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A platform pre-populated with a handful of demo devices.
    ///
    /// # Errors
    ///
    /// Returns [`AfterglowError::Validation`] if a demo device fails to
    /// build, which would be a programming error in this crate.
    pub async fn with_demo_devices() -> Result<Self, AfterglowError> {
        let platform = Self::new();
        platform
            .add_device(
                Device::builder()
                    .name("Hallway Light")
                    .zone("Hallway")
                    .capability(Capability::OnOff)
                    .capability(Capability::Dim)
                    .build()?,
            )
            .await;
        platform
            .add_device(
                Device::builder()
                    .name("Kitchen Socket")
                    .zone("Kitchen")
                    .capability(Capability::OnOff)
                    .build()?,
            )
            .await;
        platform
            .add_device(
                Device::builder()
                    .name("Reading Lamp")
                    .zone("Living Room")
                    .capability(Capability::OnOff)
                    .capability(Capability::Dim)
                    .build()?,
            )
            .await;
        Ok(platform)
    }

    /// Register a device, initializing every capability to its default value.
    pub async fn add_device(&self, device: Device) {
        let mut inner = self.inner.lock().await;
        for capability in &device.capabilities {
            inner.values.insert(
                (device.id, capability.clone()),
                Self::default_value(capability),
            );
        }
        tracing::debug!(device = %device.id, name = %device.name, "device registered");
        inner.devices.insert(device.id, device);
    }

    /// Remove a device along with its values and watchers.
    ///
    /// Returns `false` when the device was not registered.
    pub async fn remove_device(&self, id: DeviceId) -> bool {
        let mut inner = self.inner.lock().await;
        if inner.devices.remove(&id).is_none() {
            return false;
        }
        inner.values.retain(|(device, _), _| *device != id);
        inner.watchers.retain(|_, watcher| watcher.device != id);
        tracing::debug!(device = %id, "device removed");
        true
    }

    fn default_value(capability: &Capability) -> CapabilityValue {
        match capability {
            Capability::Dim => CapabilityValue::Number(1.0),
            Capability::OnOff | Capability::Custom(_) => CapabilityValue::Bool(false),
        }
    }
}

impl DeviceActuator for VirtualActuator {
    async fn get_value(
        &self,
        device: DeviceId,
        capability: &Capability,
    ) -> Result<CapabilityValue, AfterglowError> {
        let inner = self.inner.lock().await;
        inner.check_capability(device, capability)?;
        inner
            .values
            .get(&(device, capability.clone()))
            .cloned()
            .ok_or_else(|| {
                CapabilityUnsupportedError {
                    device,
                    capability: capability.clone(),
                }
                .into()
            })
    }

    async fn set_value(
        &self,
        device: DeviceId,
        capability: &Capability,
        value: CapabilityValue,
    ) -> Result<(), AfterglowError> {
        let listeners = {
            let mut inner = self.inner.lock().await;
            inner.check_capability(device, capability)?;
            let previous = inner
                .values
                .insert((device, capability.clone()), value.clone());
            tracing::trace!(device = %device, capability = %capability, "value written");
            if previous.as_ref() == Some(&value) {
                Vec::new()
            } else {
                inner.listeners(device, capability)
            }
        };
        for (handle, on_change) in listeners {
            on_change(handle, value.clone());
        }
        Ok(())
    }

    async fn subscribe(
        &self,
        device: DeviceId,
        capability: &Capability,
        on_change: ChangeCallback,
    ) -> Result<WatcherHandle, AfterglowError> {
        let mut inner = self.inner.lock().await;
        inner.check_capability(device, capability)?;
        let id = inner.next_watcher;
        inner.next_watcher += 1;
        inner.watchers.insert(
            id,
            Watcher {
                device,
                capability: capability.clone(),
                on_change: Arc::new(on_change),
            },
        );
        Ok(WatcherHandle::new(id))
    }

    async fn unsubscribe(&self, handle: WatcherHandle) -> Result<(), AfterglowError> {
        let mut inner = self.inner.lock().await;
        if inner.watchers.remove(&handle.id()).is_none() {
            return Err(StaleHandleError {
                kind: HandleKind::Watcher,
                id: handle.id(),
            }
            .into());
        }
        Ok(())
    }
}

impl DeviceDirectory for VirtualActuator {
    async fn all_devices(&self) -> Result<Vec<Device>, AfterglowError> {
        let inner = self.inner.lock().await;
        let mut devices: Vec<Device> = inner.devices.values().cloned().collect();
        devices.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(devices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    async fn platform_with_lamp() -> (VirtualActuator, DeviceId) {
        let platform = VirtualActuator::new();
        let device = Device::builder()
            .name("Lamp")
            .zone("Office")
            .capability(Capability::OnOff)
            .capability(Capability::Dim)
            .build()
            .unwrap();
        let id = device.id;
        platform.add_device(device).await;
        (platform, id)
    }

    #[tokio::test]
    async fn should_initialize_capabilities_with_defaults() {
        let (platform, id) = platform_with_lamp().await;

        let onoff = platform.get_value(id, &Capability::OnOff).await.unwrap();
        let dim = platform.get_value(id, &Capability::Dim).await.unwrap();

        assert_eq!(onoff, CapabilityValue::Bool(false));
        assert_eq!(dim, CapabilityValue::Number(1.0));
    }

    #[tokio::test]
    async fn should_roundtrip_written_value() {
        let (platform, id) = platform_with_lamp().await;

        platform
            .set_value(id, &Capability::Dim, CapabilityValue::Number(0.4))
            .await
            .unwrap();

        assert_eq!(
            platform.get_value(id, &Capability::Dim).await.unwrap(),
            CapabilityValue::Number(0.4)
        );
    }

    #[tokio::test]
    async fn should_fail_for_unknown_device() {
        let platform = VirtualActuator::new();

        let result = platform
            .get_value(DeviceId::new(), &Capability::OnOff)
            .await;

        assert!(matches!(result, Err(AfterglowError::DeviceUnavailable(_))));
    }

    #[tokio::test]
    async fn should_fail_for_unsupported_capability() {
        let platform = VirtualActuator::new();
        let device = Device::builder()
            .name("Plain Socket")
            .capability(Capability::OnOff)
            .build()
            .unwrap();
        let id = device.id;
        platform.add_device(device).await;

        let result = platform
            .set_value(id, &Capability::Dim, CapabilityValue::Number(0.5))
            .await;

        assert!(matches!(
            result,
            Err(AfterglowError::CapabilityUnsupported(_))
        ));
    }

    #[tokio::test]
    async fn should_notify_watcher_on_value_change() {
        let (platform, id) = platform_with_lamp().await;
        let seen: Arc<StdMutex<Vec<CapabilityValue>>> = Arc::default();
        let sink = Arc::clone(&seen);
        platform
            .subscribe(
                id,
                &Capability::OnOff,
                Box::new(move |_, value| sink.lock().unwrap().push(value)),
            )
            .await
            .unwrap();

        platform
            .set_value(id, &Capability::OnOff, CapabilityValue::Bool(true))
            .await
            .unwrap();

        assert_eq!(seen.lock().unwrap().clone(), vec![CapabilityValue::Bool(true)]);
    }

    #[tokio::test]
    async fn should_not_notify_when_value_is_unchanged() {
        let (platform, id) = platform_with_lamp().await;
        let seen: Arc<StdMutex<Vec<CapabilityValue>>> = Arc::default();
        let sink = Arc::clone(&seen);
        platform
            .subscribe(
                id,
                &Capability::OnOff,
                Box::new(move |_, value| sink.lock().unwrap().push(value)),
            )
            .await
            .unwrap();

        platform
            .set_value(id, &Capability::OnOff, CapabilityValue::Bool(false))
            .await
            .unwrap();

        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_stop_notifying_after_unsubscribe() {
        let (platform, id) = platform_with_lamp().await;
        let seen: Arc<StdMutex<Vec<CapabilityValue>>> = Arc::default();
        let sink = Arc::clone(&seen);
        let handle = platform
            .subscribe(
                id,
                &Capability::OnOff,
                Box::new(move |_, value| sink.lock().unwrap().push(value)),
            )
            .await
            .unwrap();

        platform.unsubscribe(handle).await.unwrap();
        platform
            .set_value(id, &Capability::OnOff, CapabilityValue::Bool(true))
            .await
            .unwrap();

        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_fail_with_stale_handle_on_double_unsubscribe() {
        let (platform, id) = platform_with_lamp().await;
        let handle = platform
            .subscribe(id, &Capability::OnOff, Box::new(|_, _| {}))
            .await
            .unwrap();

        platform.unsubscribe(handle).await.unwrap();
        let result = platform.unsubscribe(handle).await;

        assert!(matches!(result, Err(AfterglowError::StaleHandle(_))));
    }

    #[tokio::test]
    async fn should_drop_values_and_watchers_with_device() {
        let (platform, id) = platform_with_lamp().await;
        platform
            .subscribe(id, &Capability::OnOff, Box::new(|_, _| {}))
            .await
            .unwrap();

        assert!(platform.remove_device(id).await);
        assert!(!platform.remove_device(id).await);

        let result = platform.get_value(id, &Capability::OnOff).await;
        assert!(matches!(result, Err(AfterglowError::DeviceUnavailable(_))));
        assert!(platform.inner.lock().await.watchers.is_empty());
    }

    #[tokio::test]
    async fn should_list_demo_devices_sorted_by_name() {
        let platform = VirtualActuator::with_demo_devices().await.unwrap();

        let devices = platform.all_devices().await.unwrap();

        let names: Vec<&str> = devices.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Hallway Light", "Kitchen Socket", "Reading Lamp"]);
    }
}
