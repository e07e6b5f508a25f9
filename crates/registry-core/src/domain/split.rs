//! # Split Arithmetic
//!
//! Divides one bundle into two contiguous, quantity-conserving children.
//! This module is the pure half of the split engine; tombstoning the parent
//! and persisting the children is the service's job.
//!
//! Example: a parent with 100 certificates carved with `size_to_split = 25`
//! yields a first child of 25 certificates and a second of 75, both keeping
//! the parent's issuance id, each hashed against the parent's hash.
//!
//! The first child's `range_end` is `range_start + size_to_split`, one past
//! what the quantity formula implies. This boundary is long-observed
//! registry behaviour that downstream consumers reconcile against; it is
//! pinned by a regression test here and must not change silently.

use crate::domain::entities::GranularCertificateBundle;
use crate::domain::errors::ValidationError;
use crate::domain::lineage::bundle_hash;

/// Carve a parent bundle into two child drafts.
///
/// Requires `0 < size_to_split < parent.bundle_quantity`. The children are
/// returned unpersisted, with fresh hashes chained to the parent's hash and
/// no row id.
pub fn carve(
    parent: &GranularCertificateBundle,
    size_to_split: u64,
) -> Result<(GranularCertificateBundle, GranularCertificateBundle), ValidationError> {
    if size_to_split == 0 {
        return Err(ValidationError::SplitSizeZero);
    }
    if size_to_split >= parent.bundle_quantity {
        return Err(ValidationError::SplitSizeTooLarge {
            size: size_to_split,
            quantity: parent.bundle_quantity,
        });
    }

    let mut child1 = parent.clone();
    child1.id = None;
    child1.bundle_quantity = size_to_split;
    child1.bundle_id_range_end = parent.bundle_id_range_start + size_to_split;
    child1.hash = bundle_hash(&child1, &parent.hash);

    let mut child2 = parent.clone();
    child2.id = None;
    child2.bundle_quantity = parent.bundle_quantity - size_to_split;
    child2.bundle_id_range_start = child1.bundle_id_range_end + 1;
    child2.hash = bundle_hash(&child2, &parent.hash);

    Ok((child1, child2))
}
