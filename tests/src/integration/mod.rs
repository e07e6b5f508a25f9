//! Integration scenarios.
//!
//! 1. **Scenario**: the canonical lifecycle walk-through (split, cancel,
//!    claim, with the rejected claim in between)
//! 2. **Lifecycle**: cross-cutting properties over longer flows: audit
//!    ordering, lineage chains, contiguity, store consistency

mod lifecycle;
mod scenario;
