//! # Device Issuance Guards
//!
//! The per-device serialization point for the issuance pipeline. Picking
//! the next certificate id is a read-then-write sequence; two issuance runs
//! interleaving on one device would compute the same range start and break
//! contiguity. Holding the device's guard across
//! "read max id → validate → write" closes that window.
//!
//! Acquisition refuses rather than blocks: the engine is synchronous, and a
//! second run against a busy device is a caller error to surface, not a
//! queue to wait in.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use registry_types::DeviceId;

/// The set of devices with an issuance run in flight.
#[derive(Debug, Clone, Default)]
pub struct DeviceGuardSet {
    busy: Arc<Mutex<HashSet<DeviceId>>>,
}

impl DeviceGuardSet {
    fn lock(&self) -> MutexGuard<'_, HashSet<DeviceId>> {
        match self.busy.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Claim a device for issuance. Returns `None` while another run holds
    /// the device.
    pub fn acquire(&self, device_id: DeviceId) -> Option<DeviceGuard> {
        let mut busy = self.lock();
        if !busy.insert(device_id) {
            return None;
        }
        Some(DeviceGuard {
            busy: Arc::clone(&self.busy),
            device_id,
        })
    }

    /// Whether a run currently holds the device.
    pub fn is_busy(&self, device_id: DeviceId) -> bool {
        self.lock().contains(&device_id)
    }
}

/// Exclusive claim on one device's issuance critical section; released on
/// drop.
#[derive(Debug)]
pub struct DeviceGuard {
    busy: Arc<Mutex<HashSet<DeviceId>>>,
    device_id: DeviceId,
}

impl Drop for DeviceGuard {
    fn drop(&mut self) {
        let mut busy = match self.busy.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        busy.remove(&self.device_id);
    }
}
