//! Shared device registry.
//!
//! Known plug addresses live here together with the per-device timestamp of
//! the last successful report fetch. The announcement listener inserts
//! addresses, the poller snapshots and removes them; both sides only ever
//! hold a lock for the duration of a map operation.

use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use time::OffsetDateTime;

#[derive(Default)]
pub struct DeviceRegistry {
    devices: Mutex<HashSet<String>>,
    last_seen: Mutex<HashMap<String, OffsetDateTime>>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a device address. Returns true if it was not known before.
    pub fn add(&self, addr: &str) -> bool {
        self.devices.lock().insert(addr.to_string())
    }

    /// Drops a device and its fetch history. No-op for unknown addresses;
    /// the device comes back once it announces itself again.
    pub fn remove(&self, addr: &str) {
        self.devices.lock().remove(addr);
        self.last_seen.lock().remove(addr);
    }

    /// Point-in-time copy of the current membership, safe to iterate while
    /// announcements keep arriving.
    pub fn snapshot(&self) -> Vec<String> {
        self.devices.lock().iter().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.lock().is_empty()
    }

    pub fn len(&self) -> usize {
        self.devices.lock().len()
    }

    /// Records "now" as the device's last successful fetch and returns the
    /// elapsed wall-clock time since the previous one. First fetch for a
    /// device yields a zero interval.
    pub fn touch(&self, addr: &str) -> Duration {
        let now = OffsetDateTime::now_utc();
        let last = self
            .last_seen
            .lock()
            .insert(addr.to_string(), now)
            .unwrap_or(now);
        Duration::try_from(now - last).unwrap_or(Duration::ZERO)
    }

    pub fn last_seen(&self, addr: &str) -> Option<OffsetDateTime> {
        self.last_seen.lock().get(addr).copied()
    }
}
