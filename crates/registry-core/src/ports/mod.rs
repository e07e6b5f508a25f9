//! # Ports
//!
//! - `inbound` - the API this crate exposes to the hosting application
//! - `outbound` - the collaborators the lifecycle engine requires the host
//!   to provide, with in-memory adapters for tests and light hosts

pub mod inbound;
pub mod outbound;
