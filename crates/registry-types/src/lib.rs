//! # Registry Types Crate
//!
//! Entity and value types shared across the GC Registry crates.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: every type that crosses a crate boundary
//!   lives here, exactly once.
//! - **Plain data**: no persistence or transport logic; behaviour belongs to
//!   `registry-core`.
//! - **Tombstones over deletion**: every stored entity carries an
//!   `is_deleted` flag; rows are never removed, only marked.

pub mod entities;
pub mod enums;
pub mod events;

pub use entities::*;
pub use enums::*;
pub use events::*;

/// Unix timestamp in seconds since epoch.
pub type Timestamp = u64;

/// Row identifier assigned by a store on insert.
pub type EntityId = i64;

/// Identifier of an [`entities::Account`].
pub type AccountId = i64;

/// Identifier of a [`entities::Device`].
pub type DeviceId = i64;

/// Identifier of a [`entities::User`].
pub type UserId = i64;

/// Identifier of an [`entities::Organisation`].
pub type OrganisationId = i64;
