//! # CQRS Write-Through Layer
//!
//! The persistence discipline every mutation goes through: write to the
//! write-of-record store first, mirror into the read store only if that
//! succeeds, append one audit event per affected entity, then commit both.
//!
//! On failure at any stage, everything attempted so far is rolled back and
//! the call returns `None` without raising; callers inspect the persisted
//! state and the event log to determine the outcome. Observability over
//! exception-driven control flow.
//!
//! The two stores are independent transactional resources; there is no
//! two-phase commit between them. The write-of-record is authoritative and
//! the mirror eventually consistent: a crash between the two commits leaves
//! them divergent, which [`reconcile_entity`] exists to repair.
//!
//! Event ordering within a batch matches entity ordering: lower-numbered
//! entities appear earlier in the stream.

use std::ops::{Deref, DerefMut};

use registry_types::{Event, Timestamp};
use tracing::error;

use crate::domain::entities::{Entity, Patch};
use crate::domain::errors::StoreError;
use crate::ports::outbound::{EventSink, ExpectedVersion, Repository, Transactional};

/// The write-of-record store. Written first; authoritative on divergence.
#[derive(Debug, Default)]
pub struct WriteStore<S>(pub S);

/// The read-replica store. Mirrored after the write-of-record succeeds;
/// eventually consistent.
#[derive(Debug, Default)]
pub struct MirrorStore<S>(pub S);

impl<S> Deref for WriteStore<S> {
    type Target = S;
    fn deref(&self) -> &S {
        &self.0
    }
}

impl<S> DerefMut for WriteStore<S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.0
    }
}

impl<S> Deref for MirrorStore<S> {
    type Target = S;
    fn deref(&self) -> &S {
        &self.0
    }
}

impl<S> DerefMut for MirrorStore<S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.0
    }
}

/// Counts of mirror rows repaired per entity type by [`reconcile_entity`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconciliationReport {
    pub bundles: usize,
    pub actions: usize,
    pub accounts: usize,
    pub devices: usize,
    pub users: usize,
    pub organisations: usize,
    pub issuance_metadata: usize,
}

impl ReconciliationReport {
    pub fn total(&self) -> usize {
        self.bundles
            + self.actions
            + self.accounts
            + self.devices
            + self.users
            + self.organisations
            + self.issuance_metadata
    }
}

pub(crate) fn rollback_both<W: Transactional, M: Transactional>(
    write: &mut WriteStore<W>,
    mirror: &mut MirrorStore<M>,
) {
    write.rollback();
    mirror.rollback();
}

pub(crate) fn commit_both<W: Transactional, M: Transactional>(
    write: &mut WriteStore<W>,
    mirror: &mut MirrorStore<M>,
) {
    write.commit();
    mirror.commit();
}

/// Stage inserts into both stores without committing.
///
/// CREATE events for the staged entities are pushed onto `staged_events` in
/// entity order. Returns `None` on the first failure; the caller owns the
/// transaction bracket and the rollback.
pub(crate) fn stage_create<T, W, M>(
    entities: Vec<T>,
    write: &mut WriteStore<W>,
    mirror: &mut MirrorStore<M>,
    staged_events: &mut Vec<Event>,
    now: Timestamp,
) -> Option<Vec<T>>
where
    T: Entity,
    W: Repository<T>,
    M: Repository<T>,
{
    let mut created = Vec::with_capacity(entities.len());
    for entity in entities {
        match write.insert(entity) {
            Ok(inserted) => created.push(inserted),
            Err(err) => {
                error!("[registry] error during commit to write store during create: {err}");
                return None;
            }
        }
    }
    for entity in &created {
        if let Err(err) = mirror.merge(entity) {
            error!("[registry] error during commit to read store during create: {err}");
            return None;
        }
    }
    for entity in &created {
        if let Some(id) = entity.id() {
            staged_events.push(Event::created(id, T::NAME, now));
        }
    }
    Some(created)
}

/// Stage a patch against both stores without committing.
///
/// The UPDATE event carries the pre-mutation values of the patched keys and
/// the patch itself.
pub(crate) fn stage_update<T, W, M>(
    entity: &mut T,
    patch: &T::Patch,
    write: &mut WriteStore<W>,
    mirror: &mut MirrorStore<M>,
    staged_events: &mut Vec<Event>,
    now: Timestamp,
) -> bool
where
    T: Entity,
    W: Repository<T>,
    M: Repository<T>,
{
    let Some(id) = entity.id() else {
        error!("[registry] cannot update an entity that has no id");
        return false;
    };
    let attributes_before = entity.attributes_before(patch);
    let attributes_after = patch.as_attributes();
    entity.apply_patch(patch);

    if let Err(err) = write.merge(entity) {
        error!("[registry] error during commit to write store during update: {err}");
        return false;
    }
    if let Err(err) = mirror.merge(entity) {
        error!("[registry] error during commit to read store during update: {err}");
        return false;
    }
    staged_events.push(Event::updated(
        id,
        T::NAME,
        attributes_before,
        attributes_after,
        now,
    ));
    true
}

/// Stage soft deletes against both stores without committing.
///
/// Nothing is ever physically removed: `is_deleted` is set identically in
/// both stores and one DELETE event is staged per entity, in entity order.
pub(crate) fn stage_delete<T, W, M>(
    entities: &mut [T],
    write: &mut WriteStore<W>,
    mirror: &mut MirrorStore<M>,
    staged_events: &mut Vec<Event>,
    now: Timestamp,
) -> bool
where
    T: Entity,
    W: Repository<T>,
    M: Repository<T>,
{
    for entity in entities.iter_mut() {
        entity.set_deleted(true);
        if entity.id().is_none() {
            error!("[registry] cannot delete an entity that has no id");
            return false;
        }
        if let Err(err) = write.merge(entity) {
            error!("[registry] error during commit to write store during delete: {err}");
            return false;
        }
    }
    for entity in entities.iter() {
        if let Err(err) = mirror.merge(entity) {
            error!("[registry] error during commit to read store during delete: {err}");
            return false;
        }
    }
    for entity in entities.iter() {
        if let Some(id) = entity.id() {
            staged_events.push(Event::deleted(id, T::NAME, now));
        }
    }
    true
}

/// Write entities to both stores with one CREATE event each.
///
/// Returns the persisted entities with their assigned ids, or `None` after
/// a full rollback.
pub fn write_to_stores<T, W, M, E>(
    entities: Vec<T>,
    write: &mut WriteStore<W>,
    mirror: &mut MirrorStore<M>,
    events: &mut E,
    now: Timestamp,
) -> Option<Vec<T>>
where
    T: Entity,
    W: Repository<T>,
    M: Repository<T>,
    E: EventSink,
{
    write.begin();
    mirror.begin();
    let mut staged_events = Vec::new();
    let Some(created) = stage_create(entities, write, mirror, &mut staged_events, now) else {
        rollback_both(write, mirror);
        return None;
    };
    if let Err(err) = events.append(&staged_events, ExpectedVersion::Any) {
        error!("[registry] error appending create events, rolling back: {err}");
        rollback_both(write, mirror);
        return None;
    }
    commit_both(write, mirror);
    Some(created)
}

/// Apply a patch to one entity in both stores with an UPDATE event.
pub fn update_entity<T, W, M, E>(
    entity: &mut T,
    patch: &T::Patch,
    write: &mut WriteStore<W>,
    mirror: &mut MirrorStore<M>,
    events: &mut E,
    now: Timestamp,
) -> Option<T>
where
    T: Entity,
    W: Repository<T>,
    M: Repository<T>,
    E: EventSink,
{
    write.begin();
    mirror.begin();
    let mut staged_events = Vec::new();
    if !stage_update(entity, patch, write, mirror, &mut staged_events, now) {
        rollback_both(write, mirror);
        return None;
    }
    if let Err(err) = events.append(&staged_events, ExpectedVersion::Any) {
        error!("[registry] error appending update event, rolling back: {err}");
        rollback_both(write, mirror);
        return None;
    }
    commit_both(write, mirror);
    Some(entity.clone())
}

/// Soft-delete entities in both stores with one DELETE event each.
pub fn delete_entities<T, W, M, E>(
    entities: &mut [T],
    write: &mut WriteStore<W>,
    mirror: &mut MirrorStore<M>,
    events: &mut E,
    now: Timestamp,
) -> Option<Vec<T>>
where
    T: Entity,
    W: Repository<T>,
    M: Repository<T>,
    E: EventSink,
{
    write.begin();
    mirror.begin();
    let mut staged_events = Vec::new();
    if !stage_delete(entities, write, mirror, &mut staged_events, now) {
        rollback_both(write, mirror);
        return None;
    }
    if let Err(err) = events.append(&staged_events, ExpectedVersion::Any) {
        error!("[registry] error appending delete events, rolling back: {err}");
        rollback_both(write, mirror);
        return None;
    }
    commit_both(write, mirror);
    Some(entities.to_vec())
}

/// Repair hook: re-merge authoritative write-of-record rows over any mirror
/// rows that diverge (or are missing), returning how many were repaired.
pub fn reconcile_entity<T, W, M>(
    write: &WriteStore<W>,
    mirror: &mut MirrorStore<M>,
) -> Result<usize, StoreError>
where
    T: Entity,
    W: Repository<T>,
    M: Repository<T>,
{
    let authoritative: Vec<T> = write.select(&|_: &T| true)?;
    let mut repaired = 0;
    for row in authoritative {
        let Some(id) = row.id() else { continue };
        let mirrored: Option<T> = mirror.get(id)?;
        if mirrored.as_ref() != Some(&row) {
            mirror.merge(&row)?;
            repaired += 1;
        }
    }
    Ok(repaired)
}
