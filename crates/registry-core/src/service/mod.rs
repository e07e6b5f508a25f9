//! # Registry Service
//!
//! The application service implementing [`CertificateRegistryApi`].
//!
//! ## Architecture
//!
//! This service:
//! 1. Dispatches typed actions to their handlers and records every outcome
//! 2. Runs the issuance pipeline per device behind a device-scoped guard
//! 3. Routes every mutation through the CQRS write-through layer
//! 4. Uses dependency injection for all external collaborators

mod actions;
mod issuance;
mod locks;
mod query;
mod split;

pub use locks::{DeviceGuard, DeviceGuardSet};

use registry_types::{DeviceId, EntityId, Timestamp};

use crate::cqrs::{reconcile_entity, MirrorStore, ReconciliationReport, WriteStore};
use crate::domain::entities::{Entity, GranularCertificateAction, GranularCertificateBundle};
use crate::domain::errors::StoreError;
use crate::domain::value_objects::RegistryConfig;
use crate::ports::inbound::CertificateRegistryApi;
use crate::ports::outbound::{
    AllowAllAuthClient, AuthClient, EventSink, InMemoryEventStore, InMemoryStore, RegistryStore,
    Repository, SystemTimeSource, TimeSource,
};
use registry_types::CertificateStatus;

/// Fetch one row by id from a store that holds many entity types.
pub(crate) fn fetch<T, S>(store: &S, id: EntityId) -> Result<Option<T>, StoreError>
where
    T: Entity,
    S: Repository<T>,
{
    store.get(id)
}

/// Select matching rows from a store that holds many entity types.
pub(crate) fn select_where<T, S>(
    store: &S,
    predicate: &dyn Fn(&T) -> bool,
) -> Result<Vec<T>, StoreError>
where
    T: Entity,
    S: Repository<T>,
{
    store.select(predicate)
}

/// The certificate registry service.
///
/// Generic over its collaborators: write-of-record store, read mirror,
/// event sink, time source, and authorization.
pub struct RegistryService<W, M, E, TS, AU>
where
    W: RegistryStore,
    M: RegistryStore,
    E: EventSink,
    TS: TimeSource,
    AU: AuthClient,
{
    /// Write-of-record store; authoritative.
    pub(crate) write: WriteStore<W>,
    /// Read replica; eventually consistent.
    pub(crate) mirror: MirrorStore<M>,
    /// Append-only audit stream.
    pub(crate) events: E,
    /// Time source for request/completion stamps.
    pub(crate) time_source: TS,
    /// Resolved per-request authorization decisions.
    pub(crate) auth: AU,
    /// Registry-wide configuration.
    pub(crate) config: RegistryConfig,
    /// Per-device serialization for the issuance pipeline.
    pub(crate) device_guards: DeviceGuardSet,
}

/// Dependencies for [`RegistryService`].
pub struct RegistryDependencies<W, M, E, TS, AU> {
    pub write: W,
    pub mirror: M,
    pub events: E,
    pub time_source: TS,
    pub auth: AU,
}

impl<W, M, E, TS, AU> RegistryService<W, M, E, TS, AU>
where
    W: RegistryStore,
    M: RegistryStore,
    E: EventSink,
    TS: TimeSource,
    AU: AuthClient,
{
    /// Create a new registry service with the given collaborators.
    pub fn new(deps: RegistryDependencies<W, M, E, TS, AU>, config: RegistryConfig) -> Self {
        Self {
            write: WriteStore(deps.write),
            mirror: MirrorStore(deps.mirror),
            events: deps.events,
            time_source: deps.time_source,
            auth: deps.auth,
            config,
            device_guards: DeviceGuardSet::default(),
        }
    }

    /// The audit stream, for hosts exposing read access to it.
    pub fn events(&self) -> &E {
        &self.events
    }

    /// The write-of-record store.
    pub fn write_store(&self) -> &W {
        &self.write
    }

    /// The read mirror.
    pub fn mirror_store(&self) -> &M {
        &self.mirror
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Create reference entities (accounts, devices, users, metadata)
    /// through the same write-through discipline as everything else.
    pub fn create_entities<T>(&mut self, entities: Vec<T>) -> Option<Vec<T>>
    where
        T: Entity,
        W: Repository<T>,
        M: Repository<T>,
    {
        let now = self.time_source.now();
        crate::cqrs::write_to_stores(
            entities,
            &mut self.write,
            &mut self.mirror,
            &mut self.events,
            now,
        )
    }

    /// Highest certificate id ever issued to a device, excluding
    /// `Withdrawn` bundles but counting tombstoned rows: the contiguity
    /// baseline for the next issuance.
    pub(crate) fn max_certificate_id_for_device(
        &self,
        device_id: DeviceId,
    ) -> Result<Option<u64>, StoreError> {
        let bundles: Vec<GranularCertificateBundle> = select_where(
            &*self.mirror,
            &move |bundle: &GranularCertificateBundle| {
                bundle.device_id == device_id
                    && bundle.certificate_status != CertificateStatus::Withdrawn
            },
        )?;
        Ok(bundles.iter().map(|b| b.bundle_id_range_end).max())
    }

    /// Latest production interval already issued for a device, excluding
    /// `Withdrawn` bundles.
    pub(crate) fn max_certificate_timestamp_for_device(
        &self,
        device_id: DeviceId,
    ) -> Result<Option<Timestamp>, StoreError> {
        let bundles: Vec<GranularCertificateBundle> = select_where(
            &*self.mirror,
            &move |bundle: &GranularCertificateBundle| {
                bundle.device_id == device_id
                    && bundle.certificate_status != CertificateStatus::Withdrawn
            },
        )?;
        Ok(bundles.iter().map(|b| b.production_ending_interval).max())
    }

    fn reconcile_all(&mut self) -> ReconciliationReport {
        fn count(result: Result<usize, StoreError>, entity: &str) -> usize {
            result.unwrap_or_else(|err| {
                tracing::error!("[registry] reconciliation failed for {entity}: {err}");
                0
            })
        }
        ReconciliationReport {
            bundles: count(
                reconcile_entity::<GranularCertificateBundle, _, _>(&self.write, &mut self.mirror),
                GranularCertificateBundle::NAME,
            ),
            actions: count(
                reconcile_entity::<GranularCertificateAction, _, _>(&self.write, &mut self.mirror),
                GranularCertificateAction::NAME,
            ),
            accounts: count(
                reconcile_entity::<registry_types::Account, _, _>(&self.write, &mut self.mirror),
                "Account",
            ),
            devices: count(
                reconcile_entity::<registry_types::Device, _, _>(&self.write, &mut self.mirror),
                "Device",
            ),
            users: count(
                reconcile_entity::<registry_types::User, _, _>(&self.write, &mut self.mirror),
                "User",
            ),
            organisations: count(
                reconcile_entity::<registry_types::Organisation, _, _>(
                    &self.write,
                    &mut self.mirror,
                ),
                "Organisation",
            ),
            issuance_metadata: count(
                reconcile_entity::<registry_types::IssuanceMetadata, _, _>(
                    &self.write,
                    &mut self.mirror,
                ),
                "IssuanceMetadata",
            ),
        }
    }
}

/// The all-in-memory composition used by tests and light hosts.
pub type InMemoryRegistryService =
    RegistryService<InMemoryStore, InMemoryStore, InMemoryEventStore, SystemTimeSource,
        AllowAllAuthClient>;

impl InMemoryRegistryService {
    /// Create a service with in-memory adapters throughout.
    pub fn new_in_memory(config: RegistryConfig) -> Self {
        let events = InMemoryEventStore::new(config.event_stream_name.clone());
        Self::new(
            RegistryDependencies {
                write: InMemoryStore::new(),
                mirror: InMemoryStore::new(),
                events,
                time_source: SystemTimeSource,
                auth: AllowAllAuthClient,
            },
            config,
        )
    }
}

impl<W, M, E, TS, AU> CertificateRegistryApi for RegistryService<W, M, E, TS, AU>
where
    W: RegistryStore,
    M: RegistryStore,
    E: EventSink,
    TS: TimeSource,
    AU: AuthClient,
{
    fn process_action(
        &mut self,
        request: crate::domain::entities::ActionRequest,
    ) -> Option<GranularCertificateAction> {
        self.process_action_impl(request)
    }

    fn query_certificate_bundles(
        &self,
        request: crate::domain::query::CertificateQueryRequest,
    ) -> Result<crate::domain::query::CertificateQueryResponse, crate::domain::errors::ActionError>
    {
        self.query_certificate_bundles_impl(request)
    }

    fn split_certificate_bundle(
        &mut self,
        bundle_id: EntityId,
        size_to_split: u64,
    ) -> Result<
        (GranularCertificateBundle, GranularCertificateBundle),
        crate::domain::errors::ActionError,
    > {
        self.split_certificate_bundle_impl(bundle_id, size_to_split)
    }

    fn issue_certificates_by_device_in_range(
        &mut self,
        device_id: DeviceId,
        period: crate::domain::value_objects::IssuancePeriod,
        metadata_id: EntityId,
        meter: &dyn crate::ports::outbound::MeterDataClient,
    ) -> Result<Vec<GranularCertificateBundle>, crate::domain::errors::IssuanceError> {
        self.issue_by_device_impl(device_id, period, metadata_id, meter)
    }

    fn issue_certificates_in_range(
        &mut self,
        period: crate::domain::value_objects::IssuancePeriod,
        metadata_id: EntityId,
        meter: &dyn crate::ports::outbound::MeterDataClient,
    ) -> Vec<GranularCertificateBundle> {
        self.issue_fleet_impl(period, metadata_id, meter)
    }

    fn verify_bundle_lineage(
        &self,
        parent_id: EntityId,
        child_id: EntityId,
    ) -> Result<bool, crate::domain::errors::ActionError> {
        use crate::domain::errors::ActionError;
        let parent: Option<GranularCertificateBundle> = fetch(&*self.mirror, parent_id)?;
        let parent = parent.ok_or(ActionError::BundleNotFound(parent_id))?;
        let child: Option<GranularCertificateBundle> = fetch(&*self.mirror, child_id)?;
        let child = child.ok_or(ActionError::BundleNotFound(child_id))?;
        Ok(crate::domain::lineage::verify_lineage(&parent, &child))
    }

    fn reconcile_mirror(&mut self) -> ReconciliationReport {
        self.reconcile_all()
    }
}
