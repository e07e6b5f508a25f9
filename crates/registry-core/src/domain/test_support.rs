//! Shared fixtures for domain unit tests.

use registry_types::{CertificateStatus, EnergyCarrierType, EnergySourceType};

use crate::domain::entities::GranularCertificateBundle;
use crate::domain::lineage::bundle_hash;

/// An admitted root bundle: quantity 1000 over ids 1..=1000, hashed with the
/// empty nonce.
pub fn bundle_fixture() -> GranularCertificateBundle {
    let mut bundle = GranularCertificateBundle {
        id: Some(1),
        issuance_id: "3-1704067200".to_string(),
        hash: String::new(),
        certificate_status: CertificateStatus::Active,
        account_id: 1,
        beneficiary: None,
        bundle_id_range_start: 1,
        bundle_id_range_end: 1000,
        bundle_quantity: 1000,
        energy_carrier: EnergyCarrierType::Electricity,
        energy_source: EnergySourceType::Wind,
        face_value: 1,
        issuance_post_energy_carrier_conversion: false,
        metadata_id: 1,
        emissions_factor_production_device: None,
        emissions_factor_source: None,
        device_id: 3,
        production_starting_interval: 1_704_067_200,
        production_ending_interval: 1_704_070_800,
        issuance_datestamp: 1_704_153_600,
        expiry_datestamp: 1_767_225_600,
        is_storage: false,
        sdr_allocation_id: None,
        storage_efficiency_factor: None,
        is_deleted: false,
    };
    bundle.hash = bundle_hash(&bundle, "");
    bundle
}
