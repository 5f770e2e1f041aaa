//! Devices observed during a Bluetooth scan.
//!
//! The registry lives for the duration of one scan session: it is cleared
//! when a new scan starts and accumulates every device the transport
//! reports, deduplicated by hardware address, in first-seen order.

use core::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::error::DecodeError;

// ───────────────────────────────────────────────────────────────
// DeviceIdentity
// ───────────────────────────────────────────────────────────────

/// A device observed during discovery.
///
/// Immutable once observed.  Identity is the hardware address alone — two
/// observations with the same address are the same device even if the
/// advertised name differs between them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceIdentity {
    /// Unique hardware identifier (MAC address).
    pub address: String,
    /// Advertised display name, when the device broadcast one.
    #[serde(rename = "name", default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl DeviceIdentity {
    /// Identity with an address and no advertised name.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            display_name: None,
        }
    }

    /// Parse a discovery payload as handed over by the transport,
    /// e.g. `{"address":"00:07:80:4D:2E:76","name":"biosignalsplux"}`.
    pub fn from_json(payload: &str) -> Result<Self, DecodeError> {
        serde_json::from_str(payload).map_err(|_| DecodeError::Malformed("device payload"))
    }
}

impl PartialEq for DeviceIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.address == other.address
    }
}

impl Eq for DeviceIdentity {}

impl Hash for DeviceIdentity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.address.hash(state);
    }
}

// ───────────────────────────────────────────────────────────────
// DeviceRegistry
// ───────────────────────────────────────────────────────────────

/// Ordered, address-deduplicated collection of discovered devices.
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    devices: Vec<DeviceIdentity>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget every known device.  Called when a new scan begins.
    pub fn reset(&mut self) {
        self.devices.clear();
    }

    /// Register a device unless its address is already known.
    ///
    /// Returns `true` when the device was newly added.  Idempotent under
    /// repeated observation of the same address; the first observation wins
    /// (a later one with a different name does not overwrite it).
    pub fn observe(&mut self, identity: DeviceIdentity) -> bool {
        if self.devices.iter().any(|d| d.address == identity.address) {
            return false;
        }
        self.devices.push(identity);
        true
    }

    /// Snapshot of known devices in discovery order.
    pub fn list(&self) -> &[DeviceIdentity] {
        &self.devices
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

// ── Tests ────────────────────────────────────────────────────
