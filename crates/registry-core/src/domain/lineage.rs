//! # Bundle Hash / Lineage
//!
//! Content hash over a bundle's immutable fields, chained with the parent
//! bundle's hash as nonce. Any two bundles can be checked for common lineage
//! without a shared database: recompute the child's hash from its immutable
//! fields and the claimed parent's hash, and compare.
//!
//! The hash basis deliberately excludes everything that changes over a
//! bundle's lifecycle (status, holder, beneficiary, storage allocation,
//! deletion flag, and the id range bounds, which shrink on splits) plus the
//! autogenerated row id, so lineage stays verifiable at every stage.
//! `bundle_quantity` is part of the basis.

use serde::Serialize;
use sha2::{Digest, Sha256};
use registry_types::{DeviceId, EnergyCarrierType, EnergySourceType, EntityId, Timestamp};

use crate::domain::entities::GranularCertificateBundle;

/// The immutable-field subset, serialized in declaration order so the
/// canonical JSON encoding is stable.
#[derive(Serialize)]
struct LineageFields<'a> {
    issuance_id: &'a str,
    bundle_quantity: u64,
    energy_carrier: EnergyCarrierType,
    energy_source: EnergySourceType,
    face_value: u64,
    issuance_post_energy_carrier_conversion: bool,
    metadata_id: EntityId,
    emissions_factor_production_device: Option<f64>,
    emissions_factor_source: Option<&'a str>,
    device_id: DeviceId,
    production_starting_interval: Timestamp,
    production_ending_interval: Timestamp,
    issuance_datestamp: Timestamp,
    expiry_datestamp: Timestamp,
    is_storage: bool,
}

impl<'a> From<&'a GranularCertificateBundle> for LineageFields<'a> {
    fn from(bundle: &'a GranularCertificateBundle) -> Self {
        Self {
            issuance_id: &bundle.issuance_id,
            bundle_quantity: bundle.bundle_quantity,
            energy_carrier: bundle.energy_carrier,
            energy_source: bundle.energy_source,
            face_value: bundle.face_value,
            issuance_post_energy_carrier_conversion: bundle
                .issuance_post_energy_carrier_conversion,
            metadata_id: bundle.metadata_id,
            emissions_factor_production_device: bundle.emissions_factor_production_device,
            emissions_factor_source: bundle.emissions_factor_source.as_deref(),
            device_id: bundle.device_id,
            production_starting_interval: bundle.production_starting_interval,
            production_ending_interval: bundle.production_ending_interval,
            issuance_datestamp: bundle.issuance_datestamp,
            expiry_datestamp: bundle.expiry_datestamp,
            is_storage: bundle.is_storage,
        }
    }
}

/// Compute the lineage hash for a bundle.
///
/// Deterministic and pure: canonical JSON of the immutable fields,
/// concatenated with `nonce`, SHA-256, lowercase hex. Root issuances pass
/// the empty string as nonce; split children pass the parent's hash.
pub fn bundle_hash(bundle: &GranularCertificateBundle, nonce: &str) -> String {
    // Serializing a borrow-only field struct cannot fail.
    let canonical = serde_json::to_string(&LineageFields::from(bundle)).unwrap_or_default();
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    hasher.update(nonce.as_bytes());
    hex::encode(hasher.finalize())
}

/// Whether `child` descends from `parent`: its hash must be reproducible
/// from its own immutable fields and the parent's hash as nonce.
pub fn verify_lineage(
    parent: &GranularCertificateBundle,
    child: &GranularCertificateBundle,
) -> bool {
    bundle_hash(child, &parent.hash) == child.hash
}
