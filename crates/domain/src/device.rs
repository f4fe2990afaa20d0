//! Device — a physical or virtual thing that exposes capabilities.

use serde::{Deserialize, Serialize};

use crate::capability::Capability;
use crate::error::{AfterglowError, ValidationError};
use crate::id::DeviceId;

/// A device known to the platform, grouped by zone (room).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    pub name: String,
    /// Name of the zone (room, floor) the device lives in.
    pub zone: String,
    pub capabilities: Vec<Capability>,
}

impl Device {
    /// Create a builder for constructing a [`Device`].
    #[must_use]
    pub fn builder() -> DeviceBuilder {
        DeviceBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`AfterglowError::Validation`] when `name` is empty.
    pub fn validate(&self) -> Result<(), AfterglowError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        Ok(())
    }

    /// Whether the device exposes `capability`.
    ///
    /// Returns `false` when absent, never errors.
    #[must_use]
    pub fn has_capability(&self, capability: &Capability) -> bool {
        self.capabilities.contains(capability)
    }

    /// Case-insensitive substring match against device name or zone name.
    ///
    /// This is the autocomplete predicate used by the directory service.
    #[must_use]
    pub fn matches_query(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.name.to_lowercase().contains(&query) || self.zone.to_lowercase().contains(&query)
    }
}

/// Step-by-step builder for [`Device`].
#[derive(Debug, Default)]
pub struct DeviceBuilder {
    id: Option<DeviceId>,
    name: Option<String>,
    zone: Option<String>,
    capabilities: Vec<Capability>,
}

impl DeviceBuilder {
    #[must_use]
    pub fn id(mut self, id: DeviceId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn zone(mut self, zone: impl Into<String>) -> Self {
        self.zone = Some(zone.into());
        self
    }

    #[must_use]
    pub fn capability(mut self, capability: Capability) -> Self {
        self.capabilities.push(capability);
        self
    }

    /// Consume the builder, validate, and return a [`Device`].
    ///
    /// # Errors
    ///
    /// Returns [`AfterglowError::Validation`] if `name` is missing or empty.
    pub fn build(self) -> Result<Device, AfterglowError> {
        let device = Device {
            id: self.id.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            zone: self.zone.unwrap_or_default(),
            capabilities: self.capabilities,
        };
        device.validate()?;
        Ok(device)
    }
}
