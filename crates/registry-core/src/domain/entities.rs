//! # Domain Entities
//!
//! The certificate bundle and the action request record, plus the `Entity`
//! seam the persistence layer is parameterized over.
//!
//! A bundle row is created either by the issuance pipeline (fresh
//! `issuance_id`, empty lineage nonce) or by the split engine (inherits the
//! parent's `issuance_id`, chains the parent's hash). It is mutated only
//! through the action dispatcher and never physically deleted: splits and
//! full consumption tombstone the row via `is_deleted`.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use registry_types::{
    Account, AccountId, ActionResponseStatus, Attributes, CertificateActionType,
    CertificateStatus, Device, DeviceId, EnergyCarrierType, EnergySourceType, EntityId,
    IssuanceMetadata, Organisation, RecurrencePeriodUnit, Timestamp, User, UserId,
};

use crate::domain::errors::ValidationError;
use crate::domain::query::CertificateFilter;

/// The central entity: a contiguous, inclusive range of certificate ids
/// issued against one device and production interval.
///
/// `issuance_id` is assigned once at first issuance and preserved through
/// every split; the row id distinguishes fragments sharing one issuance.
/// The quantity formula `bundle_quantity == range_end - range_start + 1`
/// holds on every admitted bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GranularCertificateBundle {
    /// Row id assigned by the store; fragments of one issuance differ here.
    pub id: Option<EntityId>,
    /// Stable across the bundle's entire lineage.
    pub issuance_id: String,
    /// SHA-256 over the immutable fields, chained with the parent's hash.
    pub hash: String,

    // Mutable attributes
    pub certificate_status: CertificateStatus,
    /// Current holder.
    pub account_id: AccountId,
    /// Beneficiary recorded on cancellation, ahead of a claim.
    pub beneficiary: Option<String>,

    // Bundle characteristics
    /// First certificate id in the bundle, inclusive.
    pub bundle_id_range_start: u64,
    /// Last certificate id in the bundle, inclusive.
    pub bundle_id_range_end: u64,
    pub bundle_quantity: u64,
    pub energy_carrier: EnergyCarrierType,
    pub energy_source: EnergySourceType,
    /// Watt-hours represented by each certificate in the bundle.
    pub face_value: u64,
    pub issuance_post_energy_carrier_conversion: bool,
    /// Reference to the issuing-body metadata of the issuance run.
    pub metadata_id: EntityId,

    // Optional characteristics
    pub emissions_factor_production_device: Option<f64>,
    pub emissions_factor_source: Option<String>,

    // Production device characteristics
    pub device_id: DeviceId,

    // Temporal characteristics
    pub production_starting_interval: Timestamp,
    pub production_ending_interval: Timestamp,
    pub issuance_datestamp: Timestamp,
    pub expiry_datestamp: Timestamp,

    // Storage characteristics
    pub is_storage: bool,
    /// Storage Discharge Record allocated to this bundle, if any.
    pub sdr_allocation_id: Option<EntityId>,
    pub storage_efficiency_factor: Option<f64>,

    pub is_deleted: bool,
}

impl GranularCertificateBundle {
    /// Whether the quantity formula holds against the id range.
    pub fn quantity_matches_range(&self) -> bool {
        self.bundle_id_range_end
            .checked_sub(self.bundle_id_range_start)
            .and_then(|span| span.checked_add(1))
            == Some(self.bundle_quantity)
    }
}

/// Patch applied to a bundle by the action handlers.
///
/// Only the mutable attributes appear here; everything else on a bundle is
/// fixed at admission.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BundlePatch {
    pub account_id: Option<AccountId>,
    pub certificate_status: Option<CertificateStatus>,
    pub beneficiary: Option<String>,
}

impl BundlePatch {
    /// Patch that only moves the bundle to another account.
    pub fn account(account_id: AccountId) -> Self {
        Self {
            account_id: Some(account_id),
            ..Self::default()
        }
    }

    /// Patch that only changes the lifecycle status.
    pub fn status(status: CertificateStatus) -> Self {
        Self {
            certificate_status: Some(status),
            ..Self::default()
        }
    }
}

/// Scheduling parameters captured on recurring action requests.
///
/// The registry records and validates these; executing the schedule belongs
/// to the calling layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurrencePolicy {
    /// When the first action of the series is to run.
    pub initial_action_datetime: Timestamp,
    pub period_unit: RecurrencePeriodUnit,
    /// Number of period units between actions.
    pub period_quantity: u32,
    /// Total actions in the series, including the first.
    pub total_actions: u32,
}

impl RecurrencePolicy {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.period_quantity == 0 {
            return Err(ValidationError::Criteria {
                field: "recurring_action_period_quantity",
                comparison: "greater_than",
            });
        }
        if self.total_actions == 0 {
            return Err(ValidationError::Criteria {
                field: "number_of_recurring_actions",
                comparison: "greater_than",
            });
        }
        Ok(())
    }
}

/// An action as submitted by a caller, before the registry stamps it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRequest {
    pub action_type: CertificateActionType,
    /// Account within which the action occurs or originates from.
    pub source_id: AccountId,
    /// The user performing the action.
    pub user_id: UserId,
    /// Destination account, transfers only.
    pub target_id: Option<AccountId>,
    /// Sparse filter selecting the bundles to act on.
    #[serde(flatten)]
    pub filter: CertificateFilter,
    /// If given and smaller than a matched bundle, split first and act on
    /// the leading child only.
    pub certificate_quantity: Option<u64>,
    /// Claim beneficiary; required for claims.
    pub beneficiary: Option<String>,
    pub recurrence: Option<RecurrencePolicy>,
}

/// The persisted request record: one per submitted action, accepted or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GranularCertificateAction {
    /// Row id assigned by the store.
    pub id: Option<EntityId>,
    pub action_type: CertificateActionType,
    pub source_id: AccountId,
    pub user_id: UserId,
    pub target_id: Option<AccountId>,
    #[serde(flatten)]
    pub filter: CertificateFilter,
    pub certificate_quantity: Option<u64>,
    pub beneficiary: Option<String>,
    pub recurrence: Option<RecurrencePolicy>,
    /// Stamped by the registry when the request is received.
    pub action_request_datetime: Timestamp,
    /// Stamped by the registry once the action is resolved.
    pub action_completed_datetime: Option<Timestamp>,
    /// The single authoritative success/failure signal.
    pub action_response_status: Option<ActionResponseStatus>,
    pub is_deleted: bool,
}

impl GranularCertificateAction {
    /// Build the record for a submitted request, stamping the request time.
    pub fn from_request(request: ActionRequest, now: Timestamp) -> Self {
        Self {
            id: None,
            action_type: request.action_type,
            source_id: request.source_id,
            user_id: request.user_id,
            target_id: request.target_id,
            filter: request.filter,
            certificate_quantity: request.certificate_quantity,
            beneficiary: request.beneficiary,
            recurrence: request.recurrence,
            action_request_datetime: now,
            action_completed_datetime: None,
            action_response_status: None,
            is_deleted: false,
        }
    }

    /// Structural checks that do not need store access: required fields per
    /// action type and recurrence shape.
    pub fn validate_shape(&self) -> Result<(), ValidationError> {
        if self.action_type == CertificateActionType::Transfer && self.target_id.is_none() {
            return Err(ValidationError::MissingTarget);
        }
        if self.action_type == CertificateActionType::Claim && self.beneficiary.is_none() {
            return Err(ValidationError::MissingBeneficiary);
        }
        if let Some(recurrence) = &self.recurrence {
            recurrence.validate()?;
        }
        Ok(())
    }
}

// =============================================================================
// PERSISTENCE SEAM
// =============================================================================

/// A typed update applied through the write-through layer.
///
/// The patched keys drive the `attributes_before`/`attributes_after`
/// snapshots on the resulting update event.
pub trait Patch: Clone {
    /// Serde names of the fields this patch sets.
    fn patched_keys(&self) -> Vec<&'static str>;

    /// The patch as an attribute map, for the update event.
    fn as_attributes(&self) -> Attributes;
}

/// A patch for entities the registry never updates in place.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyPatch;

impl Patch for EmptyPatch {
    fn patched_keys(&self) -> Vec<&'static str> {
        Vec::new()
    }

    fn as_attributes(&self) -> Attributes {
        Attributes::new()
    }
}

impl Patch for BundlePatch {
    fn patched_keys(&self) -> Vec<&'static str> {
        let mut keys = Vec::new();
        if self.account_id.is_some() {
            keys.push("account_id");
        }
        if self.certificate_status.is_some() {
            keys.push("certificate_status");
        }
        if self.beneficiary.is_some() {
            keys.push("beneficiary");
        }
        keys
    }

    fn as_attributes(&self) -> Attributes {
        let mut attributes = Attributes::new();
        if let Some(account_id) = self.account_id {
            attributes.insert("account_id".to_string(), json!(account_id));
        }
        if let Some(status) = self.certificate_status {
            attributes.insert("certificate_status".to_string(), json!(status));
        }
        if let Some(beneficiary) = &self.beneficiary {
            attributes.insert("beneficiary".to_string(), json!(beneficiary));
        }
        attributes
    }
}

/// The persistence-facing view of an entity: identity, tombstone flag, and
/// patch application. Stores are parameterized over this instead of each
/// entity carrying its own data access.
pub trait Entity: Clone + PartialEq + Serialize {
    type Patch: Patch;

    /// Entity type name as recorded on events.
    const NAME: &'static str;

    fn id(&self) -> Option<EntityId>;
    fn set_id(&mut self, id: EntityId);
    fn is_deleted(&self) -> bool;
    fn set_deleted(&mut self, deleted: bool);
    fn apply_patch(&mut self, patch: &Self::Patch);

    /// Pre-mutation values of the keys the patch will set.
    fn attributes_before(&self, patch: &Self::Patch) -> Attributes {
        let Value::Object(all) = serde_json::to_value(self).unwrap_or(Value::Null) else {
            return Attributes::new();
        };
        patch
            .patched_keys()
            .into_iter()
            .filter_map(|key| all.get(key).map(|value| (key.to_string(), value.clone())))
            .collect()
    }
}

impl Entity for GranularCertificateBundle {
    type Patch = BundlePatch;
    const NAME: &'static str = "GranularCertificateBundle";

    fn id(&self) -> Option<EntityId> {
        self.id
    }
    fn set_id(&mut self, id: EntityId) {
        self.id = Some(id);
    }
    fn is_deleted(&self) -> bool {
        self.is_deleted
    }
    fn set_deleted(&mut self, deleted: bool) {
        self.is_deleted = deleted;
    }
    fn apply_patch(&mut self, patch: &Self::Patch) {
        if let Some(account_id) = patch.account_id {
            self.account_id = account_id;
        }
        if let Some(status) = patch.certificate_status {
            self.certificate_status = status;
        }
        if let Some(beneficiary) = &patch.beneficiary {
            self.beneficiary = Some(beneficiary.clone());
        }
    }
}

impl Entity for GranularCertificateAction {
    type Patch = EmptyPatch;
    const NAME: &'static str = "GranularCertificateAction";

    fn id(&self) -> Option<EntityId> {
        self.id
    }
    fn set_id(&mut self, id: EntityId) {
        self.id = Some(id);
    }
    fn is_deleted(&self) -> bool {
        self.is_deleted
    }
    fn set_deleted(&mut self, deleted: bool) {
        self.is_deleted = deleted;
    }
    fn apply_patch(&mut self, _patch: &Self::Patch) {}
}

impl Entity for Account {
    type Patch = EmptyPatch;
    const NAME: &'static str = "Account";

    fn id(&self) -> Option<EntityId> {
        self.id
    }
    fn set_id(&mut self, id: EntityId) {
        self.id = Some(id);
    }
    fn is_deleted(&self) -> bool {
        self.is_deleted
    }
    fn set_deleted(&mut self, deleted: bool) {
        self.is_deleted = deleted;
    }
    fn apply_patch(&mut self, _patch: &Self::Patch) {}
}

impl Entity for Device {
    type Patch = EmptyPatch;
    const NAME: &'static str = "Device";

    fn id(&self) -> Option<EntityId> {
        self.id
    }
    fn set_id(&mut self, id: EntityId) {
        self.id = Some(id);
    }
    fn is_deleted(&self) -> bool {
        self.is_deleted
    }
    fn set_deleted(&mut self, deleted: bool) {
        self.is_deleted = deleted;
    }
    fn apply_patch(&mut self, _patch: &Self::Patch) {}
}

impl Entity for User {
    type Patch = EmptyPatch;
    const NAME: &'static str = "User";

    fn id(&self) -> Option<EntityId> {
        self.id
    }
    fn set_id(&mut self, id: EntityId) {
        self.id = Some(id);
    }
    fn is_deleted(&self) -> bool {
        self.is_deleted
    }
    fn set_deleted(&mut self, deleted: bool) {
        self.is_deleted = deleted;
    }
    fn apply_patch(&mut self, _patch: &Self::Patch) {}
}

impl Entity for Organisation {
    type Patch = EmptyPatch;
    const NAME: &'static str = "Organisation";

    fn id(&self) -> Option<EntityId> {
        self.id
    }
    fn set_id(&mut self, id: EntityId) {
        self.id = Some(id);
    }
    fn is_deleted(&self) -> bool {
        self.is_deleted
    }
    fn set_deleted(&mut self, deleted: bool) {
        self.is_deleted = deleted;
    }
    fn apply_patch(&mut self, _patch: &Self::Patch) {}
}

impl Entity for IssuanceMetadata {
    type Patch = EmptyPatch;
    const NAME: &'static str = "IssuanceMetadata";

    fn id(&self) -> Option<EntityId> {
        self.id
    }
    fn set_id(&mut self, id: EntityId) {
        self.id = Some(id);
    }
    fn is_deleted(&self) -> bool {
        self.is_deleted
    }
    fn set_deleted(&mut self, deleted: bool) {
        self.is_deleted = deleted;
    }
    fn apply_patch(&mut self, _patch: &Self::Patch) {}
}
