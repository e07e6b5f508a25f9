//! # Domain Errors
//!
//! Error types for the lifecycle engine, one enum per failure family:
//! structural validation, action preconditions, issuance, and the outbound
//! collaborators (store, event log, meter data).
//!
//! ## Design Principles
//!
//! - Each variant names the invariant or precondition that failed
//! - Handlers return errors; the dispatcher records them as a rejection and
//!   never propagates them raw to the caller
//! - No panics in domain logic

use registry_types::{AccountId, CertificateActionType, CertificateStatus, DeviceId, EntityId,
    UserId};
use thiserror::Error;

/// A bundle, filter, or action request fails a structural invariant.
///
/// Always surfaced synchronously, never retried. Criteria failures carry the
/// field and the comparison that failed, e.g.
/// `"bundle_id_range_start does not match criteria for equal"`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} does not match criteria for {comparison}")]
    Criteria {
        field: &'static str,
        comparison: &'static str,
    },

    #[error("The size to split must be greater than 0")]
    SplitSizeZero,

    #[error("The size to split must be less than the total certificates in the parent bundle")]
    SplitSizeTooLarge { size: u64, quantity: u64 },

    #[error("certificate_period_end must be greater than certificate_period_start")]
    PeriodBoundsReversed,

    #[error("certificate_period_start must be provided if certificate_period_end is provided")]
    PeriodEndWithoutStart,

    #[error("beneficiary is required for claim actions")]
    MissingBeneficiary,

    #[error("target account is required for transfer actions")]
    MissingTarget,

    #[error("invalid issuance id: {0}")]
    InvalidIssuanceId(String),
}

/// A referenced entity is missing or a matched bundle is not in the required
/// source state. Surfaced as an action rejection, not a transport fault.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ActionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("user {user_id} is not authorised to act on account {account_id}")]
    Unauthorized {
        user_id: UserId,
        account_id: AccountId,
    },

    #[error("target account does not exist: {0}")]
    TargetAccountNotFound(AccountId),

    #[error("target account {target_id} has not whitelisted source account {source_id} for transfer")]
    NotWhitelisted {
        target_id: AccountId,
        source_id: AccountId,
    },

    #[error("certificate bundle not found: {0}")]
    BundleNotFound(EntityId),

    #[error("no certificates found matching the given filter parameters")]
    NoMatchingCertificates,

    #[error("can only {action} certificates in {required} status, found: {found}")]
    WrongStatus {
        action: CertificateActionType,
        required: &'static str,
        found: CertificateStatus,
    },

    #[error("action type {0} cannot be dispatched")]
    NotDispatchable(CertificateActionType),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("persistence failed during {operation}")]
    Persistence { operation: &'static str },
}

/// A device could not be taken through the issuance pipeline.
///
/// Fleet-level issuance logs these and continues with the next device;
/// partial success across a fleet is expected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IssuanceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("device not found: {0}")]
    DeviceNotFound(DeviceId),

    #[error("issuance metadata not found: {0}")]
    MetadataNotFound(EntityId),

    #[error("device {0} already has an issuance run in progress")]
    DeviceBusy(DeviceId),

    #[error(transparent)]
    MeterData(#[from] MeterDataError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("persistence failed during {operation}")]
    Persistence { operation: &'static str },
}

/// Persistence collaborator errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("store I/O error: {message}")]
    Io { message: String },

    #[error("cannot merge an entity that has no id")]
    MissingId,
}

/// Event log collaborator errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventLogError {
    #[error("event log append failed: {message}")]
    AppendFailed { message: String },

    #[error("event stream version conflict: expected {expected}, actual {actual}")]
    VersionConflict { expected: u64, actual: u64 },
}

/// Meter-data collaborator errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MeterDataError {
    #[error("meter data unavailable for device {device_id}: {message}")]
    Unavailable { device_id: DeviceId, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_criteria_message_names_field_and_comparison() {
        let err = ValidationError::Criteria {
            field: "bundle_id_range_start",
            comparison: "equal",
        };
        assert_eq!(
            err.to_string(),
            "bundle_id_range_start does not match criteria for equal"
        );
    }

    #[test]
    fn test_validation_error_converts_to_action_error() {
        let err: ActionError = ValidationError::MissingBeneficiary.into();
        assert!(matches!(err, ActionError::Validation(_)));
        assert_eq!(err.to_string(), "beneficiary is required for claim actions");
    }
}
