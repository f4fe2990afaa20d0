//! Directory port — source of truth for the devices the platform knows.

use std::future::Future;
use std::sync::Arc;

use afterglow_domain::device::Device;
use afterglow_domain::error::AfterglowError;

/// Lists the devices known to the external platform.
pub trait DeviceDirectory: Send + Sync {
    fn all_devices(&self) -> impl Future<Output = Result<Vec<Device>, AfterglowError>> + Send;
}

impl<T: DeviceDirectory> DeviceDirectory for Arc<T> {
    fn all_devices(&self) -> impl Future<Output = Result<Vec<Device>, AfterglowError>> + Send {
        T::all_devices(self)
    }
}
