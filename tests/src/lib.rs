//! # GC Registry Test Suite
//!
//! Cross-crate integration scenarios over the all-in-memory composition:
//! the full bundle lifecycle (issue → split → transfer → cancel → claim),
//! audit-trail ordering, lineage chains, and write/mirror consistency.
//!
//! Unit tests live beside the code they cover in each crate; this crate
//! holds the flows that span modules.

pub mod fixtures;

#[cfg(test)]
mod integration;
