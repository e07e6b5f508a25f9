//! # Certificate Bundle Lifecycle Engine
//!
//! The core of the GC Registry: issues, splits, transfers, cancels, claims,
//! withdraws, locks and reserves quantized, range-addressed certificate
//! bundles while preserving lineage, conservation of quantity, and an
//! auditable event trail.
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Description |
//! |----|-----------|-------------|
//! | 1 | Quantity Formula | `bundle_quantity == range_end - range_start + 1` on every admitted bundle |
//! | 2 | Conservation | A split's children carry exactly the parent's quantity between them |
//! | 3 | Contiguity | Per device, each issuance starts one past the previous max certificate id |
//! | 4 | Lineage | Every bundle's hash chains to its parent's hash; roots chain to the empty nonce |
//! | 5 | Tombstones | Bundles are never hard-deleted; splits tombstone the parent row |
//! | 6 | Status Monotonicity | `Cancelled` bundles may only become `Claimed`; no path back to `Active` |
//! | 7 | Recorded Actions | Every action is persisted with its outcome, accepted or rejected |
//! | 8 | Event Ordering | Events within a batch keep the entity order of the mutation |
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Pure domain logic (entities, lineage, split arithmetic,
//!   validation, query predicates)
//! - `ports/` - Port traits (inbound API, outbound SPI) with in-memory
//!   adapters for tests and light hosts
//! - `cqrs/` - Dual-store write-through discipline shared by every mutation
//! - `service/` - Application service implementing the API
//!
//! ## Usage
//!
//! ```ignore
//! use registry_core::{RegistryConfig, RegistryService};
//!
//! // Create service with in-memory adapters
//! let config = RegistryConfig::default();
//! let mut service = RegistryService::new_in_memory(config);
//!
//! // Issue certificates for a device, then act on them
//! let issued = service.issue_certificates_by_device_in_range(device_id, from, to, metadata_id, &meter)?;
//! let action = service.process_action(request);
//! ```

pub mod cqrs;
pub mod domain;
pub mod ports;
pub mod service;

// Re-export key types for convenience
pub use domain::entities::{
    ActionRequest, BundlePatch, EmptyPatch, Entity, GranularCertificateAction,
    GranularCertificateBundle, Patch, RecurrencePolicy,
};
pub use domain::errors::{
    ActionError, EventLogError, IssuanceError, MeterDataError, StoreError, ValidationError,
};
pub use domain::lineage::{bundle_hash, verify_lineage};
pub use domain::query::{CertificateFilter, CertificateQueryRequest, CertificateQueryResponse};
pub use domain::split::carve;
pub use domain::value_objects::{
    create_issuance_id, issuance_id_to_device_and_interval, IssuancePeriod, RegistryConfig,
};
pub use ports::inbound::CertificateRegistryApi;
pub use ports::outbound::{
    AllowAllAuthClient, AuthClient, EventSink, ExpectedVersion, FixedTimeSource,
    InMemoryEventStore, InMemoryStore, MeterDataClient, RegistryStore, Repository,
    StaticAuthClient, StaticMeterDataClient, SystemTimeSource, TimeSource, Transactional,
};
pub use cqrs::{MirrorStore, ReconciliationReport, WriteStore};
pub use service::{
    DeviceGuard, DeviceGuardSet, InMemoryRegistryService, RegistryDependencies, RegistryService,
};
