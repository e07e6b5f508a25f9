//! # Bundle Validation
//!
//! Admission checks for a proposed bundle: device-capacity bound, the
//! quantity formula, and strict per-device id contiguity. All inputs arrive
//! as values; the service resolves device capacity and the running max
//! certificate id from the stores before calling in.

use crate::domain::entities::GranularCertificateBundle;
use crate::domain::errors::ValidationError;
use crate::domain::value_objects::RegistryConfig;

/// Watts per megawatt.
pub const W_IN_MW: f64 = 1e6;

/// Maximum energy a device of `capacity_mw` can produce over `hours`, in
/// Watt-hours.
pub fn device_mw_capacity_to_wh_max(capacity_mw: f64, hours: f64) -> f64 {
    capacity_mw * hours * W_IN_MW
}

/// Validate a proposed bundle before admission.
///
/// - `bundle_quantity` must be below the device's maximum output for one
///   granularity period, scaled by the configured capacity margin
/// - `bundle_quantity == range_end - range_start + 1`
/// - `range_start` must sit exactly one past `device_max_certificate_id`:
///   no gaps and no overlaps across every bundle ever issued to the device,
///   tombstoned or not
///
/// Storage devices get an extra pass through [`validate_storage_bundle`].
pub fn validate_bundle(
    bundle: &GranularCertificateBundle,
    device_capacity_w: f64,
    is_storage_device: bool,
    device_max_certificate_id: u64,
    config: &RegistryConfig,
) -> Result<(), ValidationError> {
    let device_mw = device_capacity_w / W_IN_MW;
    let device_max_wh =
        device_mw_capacity_to_wh_max(device_mw, config.certificate_granularity_hours);

    if (bundle.bundle_quantity as f64) >= device_max_wh * config.capacity_margin {
        return Err(ValidationError::Criteria {
            field: "bundle_quantity",
            comparison: "less_than",
        });
    }

    if !bundle.quantity_matches_range() {
        return Err(ValidationError::Criteria {
            field: "bundle_quantity",
            comparison: "equal",
        });
    }

    if bundle.bundle_id_range_start != device_max_certificate_id + 1 {
        return Err(ValidationError::Criteria {
            field: "bundle_id_range_start",
            comparison: "equal",
        });
    }

    if is_storage_device {
        validate_storage_bundle(bundle)?;
    }

    Ok(())
}

/// Extension point for storage-device bundles.
///
/// Discharge-record checks (SDR allocation, efficiency factors) slot in here
/// once storage issuance is switched on; until then every storage bundle
/// passes.
pub fn validate_storage_bundle(
    _bundle: &GranularCertificateBundle,
) -> Result<(), ValidationError> {
    Ok(())
}
