//! # Registry Enumerations
//!
//! Closed vocabularies used throughout the registry. Serde renames keep the
//! wire strings identical to the values the registry has always recorded, so
//! event-log payloads stay readable by external auditors.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a certificate bundle.
///
/// `Active` is the only state a bundle is issued in. `BundleSplit` marks the
/// tombstoned parent of a split and never appears on a live row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CertificateStatus {
    Active,
    Cancelled,
    Claimed,
    Expired,
    Withdrawn,
    Locked,
    Reserved,
    #[serde(rename = "Bundle Split")]
    BundleSplit,
}

impl fmt::Display for CertificateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CertificateStatus::Active => "Active",
            CertificateStatus::Cancelled => "Cancelled",
            CertificateStatus::Claimed => "Claimed",
            CertificateStatus::Expired => "Expired",
            CertificateStatus::Withdrawn => "Withdrawn",
            CertificateStatus::Locked => "Locked",
            CertificateStatus::Reserved => "Reserved",
            CertificateStatus::BundleSplit => "Bundle Split",
        };
        f.write_str(s)
    }
}

/// The kind of action requested against a set of bundles.
///
/// `Query` is recordable for audit but has no mutation handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CertificateActionType {
    Transfer,
    Cancel,
    Claim,
    Withdraw,
    Lock,
    Reserve,
    Query,
}

impl fmt::Display for CertificateActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CertificateActionType::Transfer => "transfer",
            CertificateActionType::Cancel => "cancel",
            CertificateActionType::Claim => "claim",
            CertificateActionType::Withdraw => "withdraw",
            CertificateActionType::Lock => "lock",
            CertificateActionType::Reserve => "reserve",
            CertificateActionType::Query => "query",
        };
        f.write_str(s)
    }
}

/// Whether the registry accepted or rejected a submitted action.
///
/// This is the single authoritative success/failure signal for callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionResponseStatus {
    Accepted,
    Rejected,
}

impl fmt::Display for ActionResponseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionResponseStatus::Accepted => f.write_str("accepted"),
            ActionResponseStatus::Rejected => f.write_str("rejected"),
        }
    }
}

/// The form of energy a bundle represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnergyCarrierType {
    Electricity,
    NaturalGas,
    Hydrogen,
    Heat,
    Other,
}

/// The fuel type used to generate the energy a bundle represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnergySourceType {
    SolarPv,
    Wind,
    Hydro,
    Biomass,
    Nuclear,
    Electrolysis,
    Geothermal,
    BatteryStorage,
    Chp,
    Other,
}

/// The technology class of a production device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceTechnologyType {
    SolarPv,
    WindTurbine,
    Hydro,
    BatteryStorage,
    EvCharger,
    Chp,
    Other,
}

/// Unit of time for recurring action schedules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrencePeriodUnit {
    Days,
    Weeks,
    Months,
    Years,
}
