//! Capabilities — named, typed, settable/readable properties of a device.

use serde::{Deserialize, Serialize};

/// A named device capability (e.g. on/off, dimmer level).
///
/// Serialized as its plain wire name (`"onoff"`, `"dim"`, …); unknown names
/// round-trip through [`Capability::Custom`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Capability {
    OnOff,
    Dim,
    Custom(String),
}

impl Capability {
    /// The wire name of this capability.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::OnOff => "onoff",
            Self::Dim => "dim",
            Self::Custom(name) => name,
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl From<String> for Capability {
    fn from(name: String) -> Self {
        match name.as_str() {
            "onoff" => Self::OnOff,
            "dim" => Self::Dim,
            _ => Self::Custom(name),
        }
    }
}

impl From<Capability> for String {
    fn from(capability: Capability) -> Self {
        match capability {
            Capability::Custom(name) => name,
            other => other.name().to_string(),
        }
    }
}

impl std::str::FromStr for Capability {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s.to_string()))
    }
}

/// A capability value as read from or written to a device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CapabilityValue {
    Bool(bool),
    Number(f64),
}

impl CapabilityValue {
    /// Interpret this value as an on/off state.
    ///
    /// Booleans map directly; numbers (dim levels) count as "on" when
    /// strictly positive.
    #[must_use]
    pub fn is_on(&self) -> bool {
        match self {
            Self::Bool(on) => *on,
            Self::Number(level) => *level > 0.0,
        }
    }
}

impl From<bool> for CapabilityValue {
    fn from(on: bool) -> Self {
        Self::Bool(on)
    }
}

impl From<f64> for CapabilityValue {
    fn from(level: f64) -> Self {
        Self::Number(level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_serialize_known_capability_as_wire_name() {
        let json = serde_json::to_string(&Capability::OnOff).unwrap();
        assert_eq!(json, "\"onoff\"");
    }

    #[test]
    fn should_deserialize_unknown_name_as_custom() {
        let parsed: Capability = serde_json::from_str("\"volume_set\"").unwrap();
        assert_eq!(parsed, Capability::Custom("volume_set".to_string()));
    }

    #[test]
    fn should_roundtrip_dim_through_serde_json() {
        let json = serde_json::to_string(&Capability::Dim).unwrap();
        let parsed: Capability = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, Capability::Dim);
    }

    #[test]
    fn should_parse_capability_from_str() {
        let parsed: Capability = "dim".parse().unwrap();
        assert_eq!(parsed, Capability::Dim);
    }

    #[test]
    fn should_serialize_bool_value_as_plain_bool() {
        let json = serde_json::to_string(&CapabilityValue::Bool(true)).unwrap();
        assert_eq!(json, "true");
    }

    #[test]
    fn should_serialize_number_value_as_plain_number() {
        let json = serde_json::to_string(&CapabilityValue::Number(0.4)).unwrap();
        assert_eq!(json, "0.4");
    }

    #[test]
    fn should_report_on_for_true_bool() {
        assert!(CapabilityValue::Bool(true).is_on());
        assert!(!CapabilityValue::Bool(false).is_on());
    }

    #[test]
    fn should_report_on_for_positive_number() {
        assert!(CapabilityValue::Number(0.1).is_on());
        assert!(!CapabilityValue::Number(0.0).is_on());
    }
}
