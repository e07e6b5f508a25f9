//! # Inbound Port (Driving Port)
//!
//! The primary API of the lifecycle engine, exposed to the hosting
//! application's routing layer.

use registry_types::{DeviceId, EntityId};

use crate::cqrs::ReconciliationReport;
use crate::domain::entities::{ActionRequest, GranularCertificateAction,
    GranularCertificateBundle};
use crate::domain::errors::{ActionError, IssuanceError};
use crate::domain::query::{CertificateQueryRequest, CertificateQueryResponse};
use crate::domain::value_objects::IssuancePeriod;
use crate::ports::outbound::MeterDataClient;

/// Primary API of the certificate registry.
///
/// Implementations must enforce every domain invariant listed in the crate
/// docs.
pub trait CertificateRegistryApi {
    /// Resolve a submitted action and persist its request record.
    ///
    /// The record's `action_response_status` is the single authoritative
    /// success/failure signal: handler errors are logged and recorded as a
    /// rejection, never propagated to the caller. Returns `None` only when
    /// the record itself could not be persisted.
    fn process_action(&mut self, request: ActionRequest) -> Option<GranularCertificateAction>;

    /// Bundles held by the requesting account that match the filter, from
    /// the read store.
    ///
    /// A filter that matches nothing yields an empty response, not an
    /// error; a malformed filter or unauthorised caller is an error.
    fn query_certificate_bundles(
        &self,
        request: CertificateQueryRequest,
    ) -> Result<CertificateQueryResponse, ActionError>;

    /// Split a bundle into two children, tombstoning the parent.
    ///
    /// All three writes share one logical transaction: a failure leaves the
    /// parent untouched.
    fn split_certificate_bundle(
        &mut self,
        bundle_id: EntityId,
        size_to_split: u64,
    ) -> Result<(GranularCertificateBundle, GranularCertificateBundle), ActionError>;

    /// Issue certificates for one device over `[from, to)`.
    ///
    /// Devices without a meter-data id, with the window already issued, or
    /// with no readings are skipped with an empty result.
    fn issue_certificates_by_device_in_range(
        &mut self,
        device_id: DeviceId,
        period: IssuancePeriod,
        metadata_id: EntityId,
        meter: &dyn MeterDataClient,
    ) -> Result<Vec<GranularCertificateBundle>, IssuanceError>;

    /// Issue certificates across the whole device fleet.
    ///
    /// Per-device failures are logged and skipped; partial success is
    /// expected and acceptable.
    fn issue_certificates_in_range(
        &mut self,
        period: IssuancePeriod,
        metadata_id: EntityId,
        meter: &dyn MeterDataClient,
    ) -> Vec<GranularCertificateBundle>;

    /// Whether the stored child bundle descends from the stored parent.
    fn verify_bundle_lineage(
        &self,
        parent_id: EntityId,
        child_id: EntityId,
    ) -> Result<bool, ActionError>;

    /// Repair hook for write/mirror divergence: re-merge authoritative rows
    /// over the mirror and report what was repaired.
    fn reconcile_mirror(&mut self) -> ReconciliationReport;
}
