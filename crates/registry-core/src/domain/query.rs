//! # Certificate Query Engine
//!
//! Translates a sparse filter into a conjunctive predicate over stored
//! bundles. Period bounds become `>=` / `<=` comparisons against the
//! production interval; every other supplied field is an equality
//! predicate. Unset fields are ignored. There is no implicit status filter:
//! callers wanting only `Active` bundles must say so.

use serde::{Deserialize, Serialize};
use registry_types::{AccountId, CertificateStatus, DeviceId, EnergySourceType, Timestamp,
    UserId};

use crate::domain::entities::GranularCertificateBundle;
use crate::domain::errors::ValidationError;

/// Sparse filter over stored bundles.
///
/// Appears both standalone (queries) and embedded in action requests, where
/// it selects the bundles the action applies to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CertificateFilter {
    /// Match every fragment of one issuance.
    pub issuance_id: Option<String>,
    pub bundle_id_range_start: Option<u64>,
    pub bundle_id_range_end: Option<u64>,
    pub device_id: Option<DeviceId>,
    pub energy_source: Option<EnergySourceType>,
    /// Lower bound (inclusive) on the production starting interval.
    pub certificate_period_start: Option<Timestamp>,
    /// Upper bound (inclusive) on the production ending interval.
    pub certificate_period_end: Option<Timestamp>,
    pub certificate_status: Option<CertificateStatus>,
}

impl CertificateFilter {
    /// Filter on a single issuance id.
    pub fn for_issuance(issuance_id: impl Into<String>) -> Self {
        Self {
            issuance_id: Some(issuance_id.into()),
            ..Self::default()
        }
    }

    /// Shape checks for the period bounds. A malformed filter is a caller
    /// error, distinct from a filter that simply matches nothing.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match (self.certificate_period_start, self.certificate_period_end) {
            (None, Some(_)) => Err(ValidationError::PeriodEndWithoutStart),
            (Some(start), Some(end)) if start >= end => {
                Err(ValidationError::PeriodBoundsReversed)
            }
            _ => Ok(()),
        }
    }

    /// The conjunction of every supplied predicate.
    pub fn matches(&self, bundle: &GranularCertificateBundle) -> bool {
        if let Some(issuance_id) = &self.issuance_id {
            if &bundle.issuance_id != issuance_id {
                return false;
            }
        }
        if let Some(range_start) = self.bundle_id_range_start {
            if bundle.bundle_id_range_start != range_start {
                return false;
            }
        }
        if let Some(range_end) = self.bundle_id_range_end {
            if bundle.bundle_id_range_end != range_end {
                return false;
            }
        }
        if let Some(device_id) = self.device_id {
            if bundle.device_id != device_id {
                return false;
            }
        }
        if let Some(energy_source) = self.energy_source {
            if bundle.energy_source != energy_source {
                return false;
            }
        }
        if let Some(period_start) = self.certificate_period_start {
            if bundle.production_starting_interval < period_start {
                return false;
            }
        }
        if let Some(period_end) = self.certificate_period_end {
            if bundle.production_ending_interval > period_end {
                return false;
            }
        }
        if let Some(status) = self.certificate_status {
            if bundle.certificate_status != status {
                return false;
            }
        }
        true
    }
}

/// Predicate over live bundles held by `source_id` that match `filter`.
///
/// Tombstoned rows never match; the holding account is always applied.
pub fn build_predicate<'a>(
    source_id: AccountId,
    filter: &'a CertificateFilter,
) -> impl Fn(&GranularCertificateBundle) -> bool + 'a {
    move |bundle| bundle.account_id == source_id && !bundle.is_deleted && filter.matches(bundle)
}

/// A read-side query as submitted by a caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CertificateQueryRequest {
    /// Account whose holdings are queried.
    pub source_id: AccountId,
    /// The user performing the query.
    pub user_id: UserId,
    #[serde(flatten)]
    pub filter: CertificateFilter,
}

/// The matched bundles plus their total certificate volume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CertificateQueryResponse {
    pub granular_certificate_bundles: Vec<GranularCertificateBundle>,
    pub total_certificate_volume: u64,
}

impl CertificateQueryResponse {
    pub fn from_bundles(bundles: Vec<GranularCertificateBundle>) -> Self {
        let total_certificate_volume = bundles.iter().map(|b| b.bundle_quantity).sum();
        Self {
            granular_certificate_bundles: bundles,
            total_certificate_volume,
        }
    }
}
