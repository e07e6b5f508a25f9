//! The canonical lifecycle walk-through: a 1000-certificate bundle is
//! split 250/750, the larger child is cancelled, a claim without a
//! beneficiary is refused, and the claim with one succeeds.

use registry_core::{
    bundle_hash, create_issuance_id, ActionRequest, CertificateFilter, CertificateRegistryApi,
    GranularCertificateBundle, Repository,
};
use registry_types::{
    ActionResponseStatus, CertificateActionType, CertificateStatus, EnergyCarrierType,
    EnergySourceType,
};

use crate::fixtures::{seeded_registry, Seed, TestRegistry, HOUR, T0};

/// A 1000-certificate root bundle over ids 0–999, as issued to the
/// producer account.
fn root_bundle(seed: &Seed) -> GranularCertificateBundle {
    let mut bundle = GranularCertificateBundle {
        id: None,
        issuance_id: create_issuance_id(seed.device, T0),
        hash: String::new(),
        certificate_status: CertificateStatus::Active,
        account_id: seed.producer_account,
        beneficiary: None,
        bundle_id_range_start: 0,
        bundle_id_range_end: 999,
        bundle_quantity: 1000,
        energy_carrier: EnergyCarrierType::Electricity,
        energy_source: EnergySourceType::Wind,
        face_value: 1,
        issuance_post_energy_carrier_conversion: false,
        metadata_id: seed.metadata,
        emissions_factor_production_device: None,
        emissions_factor_source: None,
        device_id: seed.device,
        production_starting_interval: T0,
        production_ending_interval: T0 + HOUR,
        issuance_datestamp: T0,
        expiry_datestamp: T0 + 2 * 365 * 86_400,
        is_storage: false,
        sdr_allocation_id: None,
        storage_efficiency_factor: None,
        is_deleted: false,
    };
    bundle.hash = bundle_hash(&bundle, "");
    bundle
}

fn live_bundles(service: &TestRegistry) -> Vec<GranularCertificateBundle> {
    service
        .write_store()
        .select(&|bundle: &GranularCertificateBundle| !bundle.is_deleted)
        .unwrap()
}

#[test]
fn test_split_cancel_claim_walkthrough() {
    let (mut service, seed) = seeded_registry();

    let parent = service
        .create_entities(vec![root_bundle(&seed)])
        .unwrap()
        .remove(0);
    let parent_id = parent.id.unwrap();

    // Split 250 off the front
    let (child1, child2) = service.split_certificate_bundle(parent_id, 250).unwrap();
    assert_eq!(child1.bundle_quantity, 250);
    assert_eq!(child2.bundle_quantity, 750);
    assert_eq!(
        child1.bundle_quantity + child2.bundle_quantity,
        parent.bundle_quantity
    );
    assert_eq!(child2.bundle_id_range_start, child1.bundle_id_range_end + 1);
    assert_eq!(child2.bundle_id_range_end, parent.bundle_id_range_end);
    assert_eq!(child1.issuance_id, parent.issuance_id);
    assert_eq!(child2.issuance_id, parent.issuance_id);

    // Both children verify against the parent without any shared database
    assert!(service
        .verify_bundle_lineage(parent_id, child1.id.unwrap())
        .unwrap());
    assert!(service
        .verify_bundle_lineage(parent_id, child2.id.unwrap())
        .unwrap());

    // Cancel child2, selecting it by issuance id and range start
    let cancel_filter = CertificateFilter {
        issuance_id: Some(parent.issuance_id.clone()),
        bundle_id_range_start: Some(child2.bundle_id_range_start),
        ..CertificateFilter::default()
    };
    let cancel = service
        .process_action(ActionRequest {
            action_type: CertificateActionType::Cancel,
            source_id: seed.producer_account,
            user_id: 1,
            target_id: None,
            filter: cancel_filter.clone(),
            certificate_quantity: None,
            beneficiary: None,
            recurrence: None,
        })
        .unwrap();
    assert_eq!(
        cancel.action_response_status,
        Some(ActionResponseStatus::Accepted)
    );

    let bundles = live_bundles(&service);
    let cancelled = bundles
        .iter()
        .find(|b| b.id == child2.id)
        .expect("child2 still live");
    assert_eq!(cancelled.certificate_status, CertificateStatus::Cancelled);
    let untouched = bundles.iter().find(|b| b.id == child1.id).unwrap();
    assert_eq!(untouched.certificate_status, CertificateStatus::Active);

    // Claiming without a beneficiary is a validation rejection
    let rejected = service
        .process_action(ActionRequest {
            action_type: CertificateActionType::Claim,
            source_id: seed.producer_account,
            user_id: 1,
            target_id: None,
            filter: cancel_filter.clone(),
            certificate_quantity: None,
            beneficiary: None,
            recurrence: None,
        })
        .unwrap();
    assert_eq!(
        rejected.action_response_status,
        Some(ActionResponseStatus::Rejected)
    );

    // Claiming with a beneficiary succeeds
    let claim = service
        .process_action(ActionRequest {
            action_type: CertificateActionType::Claim,
            source_id: seed.producer_account,
            user_id: 1,
            target_id: None,
            filter: cancel_filter,
            certificate_quantity: None,
            beneficiary: Some("Beneficiary Ltd".to_string()),
            recurrence: None,
        })
        .unwrap();
    assert_eq!(
        claim.action_response_status,
        Some(ActionResponseStatus::Accepted)
    );

    let bundles = live_bundles(&service);
    let claimed = bundles.iter().find(|b| b.id == child2.id).unwrap();
    assert_eq!(claimed.certificate_status, CertificateStatus::Claimed);

    // The parent survives only as a tombstone
    let parent_row: Option<GranularCertificateBundle> =
        service.write_store().get(parent_id).unwrap();
    let parent_row = parent_row.unwrap();
    assert!(parent_row.is_deleted);
    assert_eq!(
        parent_row.certificate_status,
        CertificateStatus::BundleSplit
    );

    // Every recorded action carries its outcome
    let actions: Vec<registry_core::GranularCertificateAction> = service
        .write_store()
        .select(&|_: &registry_core::GranularCertificateAction| true)
        .unwrap();
    assert_eq!(actions.len(), 3);
    assert!(actions
        .iter()
        .all(|action| action.action_response_status.is_some()
            && action.action_completed_datetime.is_some()));
}
