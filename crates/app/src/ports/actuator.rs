//! Actuator port — read/write capability values on the external platform.

use std::future::Future;
use std::sync::Arc;

use afterglow_domain::capability::{Capability, CapabilityValue};
use afterglow_domain::error::AfterglowError;
use afterglow_domain::id::DeviceId;

/// Opaque reference to a capability-change subscription.
///
/// The handle is passed back into the change callback so a late delivery can
/// be recognized as stale by whoever owns the subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatcherHandle(u64);

impl WatcherHandle {
    /// Wrap a raw subscription id.
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw subscription id.
    #[must_use]
    pub fn id(self) -> u64 {
        self.0
    }
}

/// Callback invoked on every value change of a watched capability.
pub type ChangeCallback = Box<dyn Fn(WatcherHandle, CapabilityValue) + Send + Sync>;

/// Abstracts "set a capability value on a device" and "read current
/// capability value" against the external platform. Pure interface; no logic
/// of its own.
pub trait DeviceActuator: Send + Sync {
    /// Read the current value of `capability` on `device`.
    fn get_value(
        &self,
        device: DeviceId,
        capability: &Capability,
    ) -> impl Future<Output = Result<CapabilityValue, AfterglowError>> + Send;

    /// Write `value` to `capability` on `device`.
    fn set_value(
        &self,
        device: DeviceId,
        capability: &Capability,
        value: CapabilityValue,
    ) -> impl Future<Output = Result<(), AfterglowError>> + Send;

    /// Subscribe to value changes of `capability` on `device`.
    ///
    /// `on_change` receives the subscription's own handle plus the new value
    /// on every change, until [`unsubscribe`](Self::unsubscribe) releases it.
    fn subscribe(
        &self,
        device: DeviceId,
        capability: &Capability,
        on_change: ChangeCallback,
    ) -> impl Future<Output = Result<WatcherHandle, AfterglowError>> + Send;

    /// Release a subscription.
    ///
    /// Releasing an already-invalidated handle fails with
    /// [`AfterglowError::StaleHandle`], which callers treat as benign.
    fn unsubscribe(
        &self,
        handle: WatcherHandle,
    ) -> impl Future<Output = Result<(), AfterglowError>> + Send;
}

impl<T: DeviceActuator> DeviceActuator for Arc<T> {
    fn get_value(
        &self,
        device: DeviceId,
        capability: &Capability,
    ) -> impl Future<Output = Result<CapabilityValue, AfterglowError>> + Send {
        T::get_value(self, device, capability)
    }

    fn set_value(
        &self,
        device: DeviceId,
        capability: &Capability,
        value: CapabilityValue,
    ) -> impl Future<Output = Result<(), AfterglowError>> + Send {
        T::set_value(self, device, capability, value)
    }

    fn subscribe(
        &self,
        device: DeviceId,
        capability: &Capability,
        on_change: ChangeCallback,
    ) -> impl Future<Output = Result<WatcherHandle, AfterglowError>> + Send {
        T::subscribe(self, device, capability, on_change)
    }

    fn unsubscribe(
        &self,
        handle: WatcherHandle,
    ) -> impl Future<Output = Result<(), AfterglowError>> + Send {
        T::unsubscribe(self, handle)
    }
}
