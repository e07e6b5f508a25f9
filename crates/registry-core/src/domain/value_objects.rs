//! # Value Objects
//!
//! Registry configuration and the issuance-id codec.

use registry_types::{DeviceId, Timestamp};

use crate::domain::errors::ValidationError;

/// Registry-wide configuration, injected at service construction.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Production period each bundle is issued over, in hours.
    pub certificate_granularity_hours: f64,
    /// Tolerance above nameplate capacity before a bundle is refused.
    pub capacity_margin: f64,
    /// Years until an issued bundle expires uncancelled.
    pub certificate_expiry_years: u32,
    /// Stream the event log appends to.
    pub event_stream_name: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            certificate_granularity_hours: 1.0,
            capacity_margin: 1.1,
            certificate_expiry_years: 2,
            event_stream_name: "events".to_string(),
        }
    }
}

/// Half-open issuance window `[from, to)` over production intervals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IssuancePeriod {
    pub from: Timestamp,
    pub to: Timestamp,
}

/// Deterministic issuance id for a device and production start.
///
/// Bundles issued for the same device and interval are recognised as one
/// issuance everywhere in the system, even when no split ever related them.
pub fn create_issuance_id(device_id: DeviceId, production_starting_interval: Timestamp) -> String {
    format!("{device_id}-{production_starting_interval}")
}

/// Recover the device and production start from an issuance id.
pub fn issuance_id_to_device_and_interval(
    issuance_id: &str,
) -> Result<(DeviceId, Timestamp), ValidationError> {
    let invalid = || ValidationError::InvalidIssuanceId(issuance_id.to_string());
    let (device_part, interval_part) = issuance_id.split_once('-').ok_or_else(invalid)?;
    let device_id: DeviceId = device_part.parse().map_err(|_| invalid())?;
    let interval: Timestamp = interval_part.parse().map_err(|_| invalid())?;
    Ok((device_id, interval))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issuance_id_round_trip() {
        let issuance_id = create_issuance_id(42, 1_704_067_200);
        assert_eq!(issuance_id, "42-1704067200");
        assert_eq!(
            issuance_id_to_device_and_interval(&issuance_id).unwrap(),
            (42, 1_704_067_200)
        );
    }

    #[test]
    fn test_issuance_id_rejects_malformed_input() {
        assert!(issuance_id_to_device_and_interval("no-delimiter-here").is_err());
        assert!(issuance_id_to_device_and_interval("justonepart").is_err());
        assert!(issuance_id_to_device_and_interval("x-123").is_err());
    }

    #[test]
    fn test_default_config() {
        let config = RegistryConfig::default();
        assert_eq!(config.certificate_granularity_hours, 1.0);
        assert_eq!(config.capacity_margin, 1.1);
        assert_eq!(config.event_stream_name, "events");
    }
}
