//! # Bundle Split Engine (persistence half)
//!
//! Tombstones the parent and creates both children in one logical
//! transaction across both stores. A failure at any stage rolls everything
//! back; the parent's tombstone is never left isolated.

use registry_types::{CertificateStatus, EntityId};
use tracing::{error, info};

use super::{fetch, RegistryService};
use crate::cqrs;
use crate::domain::entities::GranularCertificateBundle;
use crate::domain::errors::ActionError;
use crate::domain::split::carve;
use crate::ports::outbound::{AuthClient, EventSink, ExpectedVersion, RegistryStore, TimeSource};

impl<W, M, E, TS, AU> RegistryService<W, M, E, TS, AU>
where
    W: RegistryStore,
    M: RegistryStore,
    E: EventSink,
    TS: TimeSource,
    AU: AuthClient,
{
    pub(crate) fn split_certificate_bundle_impl(
        &mut self,
        bundle_id: EntityId,
        size_to_split: u64,
    ) -> Result<(GranularCertificateBundle, GranularCertificateBundle), ActionError> {
        let parent: Option<GranularCertificateBundle> = fetch(&*self.write, bundle_id)?;
        let parent = parent
            .filter(|bundle| !bundle.is_deleted)
            .ok_or(ActionError::BundleNotFound(bundle_id))?;
        self.split_bundle(&parent, size_to_split)
    }

    /// Split a loaded bundle: tombstone the parent (status `BundleSplit`,
    /// soft delete) and create both children, all-or-nothing.
    ///
    /// The event stream records DELETE(parent), CREATE(child1),
    /// CREATE(child2), in that order.
    pub(crate) fn split_bundle(
        &mut self,
        parent: &GranularCertificateBundle,
        size_to_split: u64,
    ) -> Result<(GranularCertificateBundle, GranularCertificateBundle), ActionError> {
        let (child1, child2) = carve(parent, size_to_split)?;
        let now = self.time_source.now();

        self.write.begin();
        self.mirror.begin();
        let mut staged_events = Vec::new();

        let mut tombstone = parent.clone();
        tombstone.certificate_status = CertificateStatus::BundleSplit;
        let mut tombstones = [tombstone];

        let staged_children = cqrs::stage_delete(
            &mut tombstones,
            &mut self.write,
            &mut self.mirror,
            &mut staged_events,
            now,
        )
        .then(|| {
            cqrs::stage_create(
                vec![child1, child2],
                &mut self.write,
                &mut self.mirror,
                &mut staged_events,
                now,
            )
        })
        .flatten();

        let Some(mut children) = staged_children else {
            cqrs::rollback_both(&mut self.write, &mut self.mirror);
            return Err(ActionError::Persistence { operation: "split" });
        };

        if let Err(err) = self.events.append(&staged_events, ExpectedVersion::Any) {
            error!("[registry] error appending split events, rolling back: {err}");
            cqrs::rollback_both(&mut self.write, &mut self.mirror);
            return Err(ActionError::Persistence { operation: "split" });
        }
        cqrs::commit_both(&mut self.write, &mut self.mirror);

        let second = children
            .pop()
            .ok_or(ActionError::Persistence { operation: "split" })?;
        let first = children
            .pop()
            .ok_or(ActionError::Persistence { operation: "split" })?;
        info!(
            "[registry] split bundle {:?} of issuance {} into {} + {}",
            parent.id, parent.issuance_id, first.bundle_quantity, second.bundle_quantity
        );
        Ok((first, second))
    }
}
