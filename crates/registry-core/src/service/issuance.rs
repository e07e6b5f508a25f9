//! # Issuance Pipeline
//!
//! Per device: fetch interval readings, map them to contiguously numbered
//! bundles, validate, hash with the empty nonce, and commit in bulk. A
//! device lacking a meter-data id or returning no readings is skipped with
//! a logged warning; fleet-level issuance treats per-device failures the
//! same way. Partial success across a fleet is expected.
//!
//! The whole "read max id → validate → write" sequence runs behind the
//! device's guard, so two runs against one device cannot compute the same
//! range start.

use registry_types::{Device, DeviceId, EntityId, IssuanceMetadata};
use tracing::{error, info, warn};

use super::{fetch, select_where, RegistryService};
use crate::cqrs;
use crate::domain::entities::GranularCertificateBundle;
use crate::domain::errors::IssuanceError;
use crate::domain::lineage::bundle_hash;
use crate::domain::validation::validate_bundle;
use crate::domain::value_objects::{create_issuance_id, IssuancePeriod};
use crate::ports::outbound::{AuthClient, EventSink, MeterDataClient, RegistryStore, TimeSource};

impl<W, M, E, TS, AU> RegistryService<W, M, E, TS, AU>
where
    W: RegistryStore,
    M: RegistryStore,
    E: EventSink,
    TS: TimeSource,
    AU: AuthClient,
{
    pub(crate) fn issue_by_device_impl(
        &mut self,
        device_id: DeviceId,
        period: IssuancePeriod,
        metadata_id: EntityId,
        meter: &dyn MeterDataClient,
    ) -> Result<Vec<GranularCertificateBundle>, IssuanceError> {
        let device: Option<Device> = fetch(&*self.mirror, device_id)?;
        let device = device
            .filter(|d| !d.is_deleted)
            .ok_or(IssuanceError::DeviceNotFound(device_id))?;

        if device.meter_data_id.is_none() {
            warn!("[registry] no meter data id for device {device_id}, skipping issuance");
            return Ok(Vec::new());
        }

        let metadata: Option<IssuanceMetadata> = fetch(&*self.mirror, metadata_id)?;
        if metadata.is_none() {
            return Err(IssuanceError::MetadataNotFound(metadata_id));
        }

        let _guard = self
            .device_guards
            .acquire(device_id)
            .ok_or(IssuanceError::DeviceBusy(device_id))?;

        let IssuancePeriod { mut from, to } = period;
        if let Some(max_issued) = self.max_certificate_timestamp_for_device(device_id)? {
            if max_issued >= to {
                info!(
                    "[registry] device {device_id} already issued through {max_issued}, \
                     nothing to do for [{from}, {to})"
                );
                return Ok(Vec::new());
            }
            if max_issued > from {
                from = max_issued;
            }
        }

        let readings = meter.get_readings(&device, from, to)?;
        if readings.is_empty() {
            warn!(
                "[registry] no meter data retrieved for device {device_id} from source {}",
                meter.source_name()
            );
            return Ok(Vec::new());
        }

        let max_certificate_id = self.max_certificate_id_for_device(device_id)?;
        let range_start = max_certificate_id.map_or(1, |max| max + 1);
        let now = self.time_source.now();

        let mut drafts = meter.map_readings_to_bundles(
            &readings,
            &device,
            metadata_id,
            range_start,
            now,
            &self.config,
        );
        if drafts.is_empty() {
            warn!("[registry] meter data for device {device_id} mapped to no bundles");
            return Ok(Vec::new());
        }

        let mut running_max = max_certificate_id.unwrap_or(0);
        for draft in drafts.iter_mut() {
            validate_bundle(
                draft,
                device.capacity,
                device.is_storage,
                running_max,
                &self.config,
            )?;
            draft.hash = bundle_hash(draft, "");
            draft.issuance_id = create_issuance_id(device_id, draft.production_starting_interval);
            // One device per run, so the latest draft always carries the
            // highest range end
            running_max = draft.bundle_id_range_end;
        }

        let created = cqrs::write_to_stores(
            drafts,
            &mut self.write,
            &mut self.mirror,
            &mut self.events,
            now,
        )
        .ok_or(IssuanceError::Persistence { operation: "issue" })?;

        info!(
            "[registry] issued {} bundle(s) for device {device_id} over [{from}, {to})",
            created.len()
        );
        Ok(created)
    }

    pub(crate) fn issue_fleet_impl(
        &mut self,
        period: IssuancePeriod,
        metadata_id: EntityId,
        meter: &dyn MeterDataClient,
    ) -> Vec<GranularCertificateBundle> {
        let devices: Vec<Device> =
            match select_where(&*self.mirror, &|device: &Device| !device.is_deleted) {
                Ok(devices) => devices,
                Err(err) => {
                    error!("[registry] could not list devices for issuance: {err}");
                    return Vec::new();
                }
            };
        if devices.is_empty() {
            error!("[registry] no devices found in the registry");
            return Vec::new();
        }

        let mut issued = Vec::new();
        for device in devices {
            let Some(device_id) = device.id else { continue };
            info!("[registry] issuing certificates for device {device_id}");

            if device.meter_data_id.is_none() {
                warn!("[registry] no meter data id for device {device_id}");
                continue;
            }
            match self.issue_by_device_impl(device_id, period, metadata_id, meter) {
                Ok(bundles) => issued.extend(bundles),
                Err(err) => {
                    error!("[registry] issuance failed for device {device_id}: {err}");
                }
            }
        }
        issued
    }
}
