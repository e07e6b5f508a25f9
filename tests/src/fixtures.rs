//! Shared builders for integration scenarios.

use registry_core::{
    AllowAllAuthClient, FixedTimeSource, InMemoryEventStore, InMemoryStore, RegistryConfig,
    RegistryDependencies, RegistryService, StaticMeterDataClient,
};
use registry_types::{
    Account, Device, DeviceTechnologyType, EnergySourceType, EntityId, IssuanceMetadata,
    MeterReading,
};

/// Epoch anchor shared by every scenario.
pub const T0: u64 = 1_700_000_000;
pub const HOUR: u64 = 3600;

/// The all-in-memory composition with a controllable clock.
pub type TestRegistry = RegistryService<
    InMemoryStore,
    InMemoryStore,
    InMemoryEventStore,
    FixedTimeSource,
    AllowAllAuthClient,
>;

/// Ids of the entities [`seeded_registry`] creates.
pub struct Seed {
    pub producer_account: EntityId,
    pub trading_account: EntityId,
    pub device: EntityId,
    pub metadata: EntityId,
}

pub fn registry() -> TestRegistry {
    RegistryService::new(
        RegistryDependencies {
            write: InMemoryStore::new(),
            mirror: InMemoryStore::new(),
            events: InMemoryEventStore::default(),
            time_source: FixedTimeSource::new(T0),
            auth: AllowAllAuthClient,
        },
        RegistryConfig::default(),
    )
}

/// A registry seeded with a producer account, a trading account that
/// whitelists it, one 2 MW wind device, and issuance metadata.
pub fn seeded_registry() -> (TestRegistry, Seed) {
    let mut service = registry();

    let producer = service
        .create_entities(vec![Account::new("producer")])
        .expect("seed producer account")
        .remove(0);
    let producer_account = producer.id.expect("assigned id");

    let trading = service
        .create_entities(vec![
            Account::new("trading").with_whitelist(vec![producer_account])
        ])
        .expect("seed trading account")
        .remove(0);

    let device = service
        .create_entities(vec![Device {
            id: None,
            device_name: "windfarm-1".to_string(),
            meter_data_id: Some("BMU-1".to_string()),
            grid: "national".to_string(),
            energy_source: EnergySourceType::Wind,
            technology_type: DeviceTechnologyType::WindTurbine,
            operational_date: T0 - 365 * 86_400,
            capacity: 2_000_000.0,
            peak_demand: 0.0,
            location: "55.0,-1.5".to_string(),
            is_storage: false,
            account_id: producer_account,
            is_deleted: false,
        }])
        .expect("seed device")
        .remove(0);

    let metadata = service
        .create_entities(vec![IssuanceMetadata {
            id: None,
            country_of_issuance: "GB".to_string(),
            connected_grid_identification: "national".to_string(),
            issuing_body: "Test Issuing Body".to_string(),
            legal_status: None,
            issuance_purpose: None,
            support_received: None,
            quality_scheme_reference: None,
            dissemination_level: None,
            issue_market_zone: "GB-N".to_string(),
            is_deleted: false,
        }])
        .expect("seed metadata")
        .remove(0);

    let seed = Seed {
        producer_account,
        trading_account: trading.id.expect("assigned id"),
        device: device.id.expect("assigned id"),
        metadata: metadata.id.expect("assigned id"),
    };
    (service, seed)
}

/// One reading per hour window, starting at `T0`.
pub fn hourly_meter(device_id: EntityId, energies_wh: &[u64]) -> StaticMeterDataClient {
    StaticMeterDataClient::new(
        energies_wh
            .iter()
            .enumerate()
            .map(|(i, &energy_wh)| MeterReading {
                device_id,
                interval_start: T0 + i as u64 * HOUR,
                interval_end: T0 + (i as u64 + 1) * HOUR,
                energy_wh,
            })
            .collect(),
    )
}
