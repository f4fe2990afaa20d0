//! Cached device listing and autocomplete search.
//!
//! Device enumeration on the real platform is an expensive round-trip, so the
//! service memoizes both the full list and the per-capability filtered lists
//! until [`DirectoryService::invalidate`] is called (wired to device
//! create/delete notifications by the hosting binary).

use std::collections::HashMap;

use tokio::sync::Mutex;

use afterglow_domain::capability::Capability;
use afterglow_domain::device::Device;
use afterglow_domain::error::AfterglowError;

use crate::ports::DeviceDirectory;

#[derive(Debug, Default)]
struct DirectoryCache {
    all: Option<Vec<Device>>,
    by_capability: HashMap<Capability, Vec<Device>>,
}

/// Cached view over a [`DeviceDirectory`] port.
pub struct DirectoryService<D> {
    directory: D,
    cache: Mutex<DirectoryCache>,
}

impl<D> DirectoryService<D>
where
    D: DeviceDirectory,
{
    pub fn new(directory: D) -> Self {
        Self {
            directory,
            cache: Mutex::new(DirectoryCache::default()),
        }
    }

    /// All known devices, from cache when warm.
    ///
    /// # Errors
    ///
    /// Propagates the underlying directory failure on a cold cache.
    pub async fn all_devices(&self) -> Result<Vec<Device>, AfterglowError> {
        let mut cache = self.cache.lock().await;
        Ok(Self::load_all(&self.directory, &mut cache).await?.clone())
    }

    /// Devices exposing `capability`, from cache when warm.
    ///
    /// Presence of the capability is all that is checked; whether it can be
    /// written is left to the actuator at trigger time.
    ///
    /// # Errors
    ///
    /// Propagates the underlying directory failure on a cold cache.
    pub async fn with_capability(
        &self,
        capability: &Capability,
    ) -> Result<Vec<Device>, AfterglowError> {
        let mut cache = self.cache.lock().await;
        if let Some(filtered) = cache.by_capability.get(capability) {
            return Ok(filtered.clone());
        }
        let filtered: Vec<Device> = Self::load_all(&self.directory, &mut cache)
            .await?
            .iter()
            .filter(|device| device.has_capability(capability))
            .cloned()
            .collect();
        cache
            .by_capability
            .insert(capability.clone(), filtered.clone());
        Ok(filtered)
    }

    /// Autocomplete: case-insensitive substring match of `query` against
    /// device and zone names, optionally restricted to devices exposing
    /// `capability`. An empty query matches everything.
    ///
    /// # Errors
    ///
    /// Propagates the underlying directory failure on a cold cache.
    pub async fn search(
        &self,
        query: &str,
        capability: Option<&Capability>,
    ) -> Result<Vec<Device>, AfterglowError> {
        let candidates = match capability {
            Some(capability) => self.with_capability(capability).await?,
            None => self.all_devices().await?,
        };
        Ok(candidates
            .into_iter()
            .filter(|device| device.matches_query(query))
            .collect())
    }

    /// Drop every cached list; the next read refetches from the platform.
    pub async fn invalidate(&self) {
        let mut cache = self.cache.lock().await;
        cache.all = None;
        cache.by_capability.clear();
        tracing::debug!("device cache invalidated");
    }

    async fn load_all<'c>(
        directory: &D,
        cache: &'c mut DirectoryCache,
    ) -> Result<&'c Vec<Device>, AfterglowError> {
        if cache.all.is_none() {
            let devices = directory.all_devices().await?;
            tracing::debug!(count = devices.len(), "device cache refreshed");
            cache.all = Some(devices);
        }
        Ok(cache.all.get_or_insert_with(Vec::new))
    }
}
