//! # Reference Entities
//!
//! Supporting entities around the certificate bundle: accounts, devices,
//! users, organisations, issuance metadata, and raw meter readings. These are
//! reference data; the lifecycle logic that acts on them lives in
//! `registry-core`.

use serde::{Deserialize, Serialize};

use crate::enums::{DeviceTechnologyType, EnergySourceType};
use crate::{AccountId, DeviceId, EntityId, OrganisationId, Timestamp};

/// A holder of certificate bundles.
///
/// An account owns zero or more devices and is linked to users through a
/// many-to-many association carried on [`User::account_ids`]. Transfers into
/// an account are only accepted from source accounts it has whitelisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Row id assigned by the store.
    pub id: Option<EntityId>,
    pub account_name: String,
    /// Source accounts this account accepts transfers from.
    pub account_whitelist: Vec<AccountId>,
    pub is_deleted: bool,
}

impl Account {
    /// New account with an empty whitelist.
    pub fn new(account_name: impl Into<String>) -> Self {
        Self {
            id: None,
            account_name: account_name.into(),
            account_whitelist: Vec::new(),
            is_deleted: false,
        }
    }

    /// Builder-style whitelist extension.
    pub fn with_whitelist(mut self, sources: Vec<AccountId>) -> Self {
        self.account_whitelist = sources;
        self
    }
}

/// A production (or storage) device registered to an account.
///
/// `capacity` is the nameplate capacity in Watts; the bundle validator uses
/// it to bound the quantity any single bundle may carry. `meter_data_id` is
/// the identifier under which the device's meter-data source reports
/// readings; a device without one cannot be issued certificates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    /// Row id assigned by the store.
    pub id: Option<EntityId>,
    pub device_name: String,
    pub meter_data_id: Option<String>,
    /// Grid or market area the device injects into.
    pub grid: String,
    pub energy_source: EnergySourceType,
    pub technology_type: DeviceTechnologyType,
    /// When the device began operating.
    pub operational_date: Timestamp,
    /// Nameplate capacity in Watts.
    pub capacity: f64,
    /// Peak demand in Watts, for storage and demand-side devices.
    pub peak_demand: f64,
    pub location: String,
    pub is_storage: bool,
    /// The account into which bundles for this device's production are issued.
    pub account_id: AccountId,
    pub is_deleted: bool,
}

/// A registry user, linked to the accounts it may act on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Row id assigned by the store.
    pub id: Option<EntityId>,
    pub name: String,
    pub organisation_id: OrganisationId,
    /// Accounts this user is authorised to act on.
    pub account_ids: Vec<AccountId>,
    pub is_deleted: bool,
}

/// An organisation that users belong to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organisation {
    /// Row id assigned by the store.
    pub id: Option<EntityId>,
    pub name: String,
    /// Company registration reference, where one exists.
    pub registration_id: Option<String>,
    pub is_deleted: bool,
}

/// Issuing-body characteristics shared by every bundle of an issuance run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssuanceMetadata {
    /// Row id assigned by the store.
    pub id: Option<EntityId>,
    /// Domain under which the issuing body has authority to issue.
    pub country_of_issuance: String,
    /// Infrastructure into which the energy has been injected.
    pub connected_grid_identification: String,
    pub issuing_body: String,
    pub legal_status: Option<String>,
    pub issuance_purpose: Option<String>,
    pub support_received: Option<String>,
    pub quality_scheme_reference: Option<String>,
    pub dissemination_level: Option<String>,
    /// Bidding zone / market authority / price node of issuance.
    pub issue_market_zone: String,
    pub is_deleted: bool,
}

/// One generation interval reported by a meter-data source.
///
/// `energy_wh` is rounded down to the nearest Wh by the reporting source;
/// one reading maps to exactly one issued bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeterReading {
    pub device_id: DeviceId,
    pub interval_start: Timestamp,
    pub interval_end: Timestamp,
    /// Energy generated in the interval, in Watt-hours.
    pub energy_wh: u64,
}
