//! Typed notification fan-out.
//!
//! The controller publishes four notification kinds; presentation and any
//! other consumer subscribe per kind and get back a [`SubscriptionId`] to
//! detach with.  Teardown is deterministic: `close()` clears every list, so
//! no callback outlives the session it observed.
//!
//! Frames are handed to each subscriber **by value** — no shared mutable
//! frame state between consumers.

use log::debug;

use crate::error::DecodeError;
use crate::frame::DataFrame;
use crate::fsm::ConnectionState;
use crate::registry::DeviceIdentity;

// ───────────────────────────────────────────────────────────────
// Subscription handle
// ───────────────────────────────────────────────────────────────

/// Token returned by every subscribe call; unique across notification kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

// ───────────────────────────────────────────────────────────────
// Observer list (one per notification kind)
// ───────────────────────────────────────────────────────────────

type DeviceFoundFn = dyn FnMut(&DeviceIdentity) + Send;
type ConnectionChangedFn = dyn FnMut(&str, ConnectionState) + Send;
type FrameReceivedFn = dyn FnMut(DataFrame) + Send;
type DecodeFailedFn = dyn FnMut(&DecodeError) + Send;

struct Observers<F: ?Sized> {
    entries: Vec<(SubscriptionId, Box<F>)>,
}

impl<F: ?Sized> Observers<F> {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn push(&mut self, id: SubscriptionId, callback: Box<F>) {
        self.entries.push((id, callback));
    }

    fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    fn clear(&mut self) {
        self.entries.clear();
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

// ───────────────────────────────────────────────────────────────
// EventDispatcher
// ───────────────────────────────────────────────────────────────

/// Per-kind observer lists with subscribe/unsubscribe bookkeeping.
pub struct EventDispatcher {
    next_id: u64,
    device_found: Observers<DeviceFoundFn>,
    connection_changed: Observers<ConnectionChangedFn>,
    frame_received: Observers<FrameReceivedFn>,
    decode_failed: Observers<DecodeFailedFn>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            device_found: Observers::new(),
            connection_changed: Observers::new(),
            frame_received: Observers::new(),
            decode_failed: Observers::new(),
        }
    }

    fn fresh_id(&mut self) -> SubscriptionId {
        self.next_id += 1;
        SubscriptionId(self.next_id)
    }

    // ── Subscribe ─────────────────────────────────────────────

    /// A device was newly observed during a scan.
    pub fn subscribe_device_found(
        &mut self,
        callback: impl FnMut(&DeviceIdentity) + Send + 'static,
    ) -> SubscriptionId {
        let id = self.fresh_id();
        self.device_found.push(id, Box::new(callback));
        id
    }

    /// The session's connection state changed; carries the reporting
    /// identifier and the resolved state.
    pub fn subscribe_connection_changed(
        &mut self,
        callback: impl FnMut(&str, ConnectionState) + Send + 'static,
    ) -> SubscriptionId {
        let id = self.fresh_id();
        self.connection_changed.push(id, Box::new(callback));
        id
    }

    /// A data frame was decoded; each subscriber receives its own copy.
    pub fn subscribe_frame_received(
        &mut self,
        callback: impl FnMut(DataFrame) + Send + 'static,
    ) -> SubscriptionId {
        let id = self.fresh_id();
        self.frame_received.push(id, Box::new(callback));
        id
    }

    /// An inbound record failed to decode (non-fatal).
    pub fn subscribe_decode_failed(
        &mut self,
        callback: impl FnMut(&DecodeError) + Send + 'static,
    ) -> SubscriptionId {
        let id = self.fresh_id();
        self.decode_failed.push(id, Box::new(callback));
        id
    }

    // ── Unsubscribe / teardown ────────────────────────────────

    /// Detach one subscriber; returns whether the token was known.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.device_found.remove(id)
            || self.connection_changed.remove(id)
            || self.frame_received.remove(id)
            || self.decode_failed.remove(id)
    }

    /// Detach every subscriber of every kind.
    pub fn clear(&mut self) {
        self.device_found.clear();
        self.connection_changed.clear();
        self.frame_received.clear();
        self.decode_failed.clear();
    }

    /// Total live subscriptions across all kinds.
    pub fn subscription_count(&self) -> usize {
        self.device_found.len()
            + self.connection_changed.len()
            + self.frame_received.len()
            + self.decode_failed.len()
    }

    // ── Publish (controller-side) ─────────────────────────────

    pub(crate) fn emit_device_found(&mut self, identity: &DeviceIdentity) {
        debug!("emit DeviceFound {}", identity.address);
        for (_, callback) in &mut self.device_found.entries {
            callback(identity);
        }
    }

    pub(crate) fn emit_connection_changed(&mut self, identifier: &str, state: ConnectionState) {
        debug!("emit ConnectionChanged {identifier} {}", state.name());
        for (_, callback) in &mut self.connection_changed.entries {
            callback(identifier, state);
        }
    }

    pub(crate) fn emit_frame_received(&mut self, frame: &DataFrame) {
        for (_, callback) in &mut self.frame_received.entries {
            callback(frame.clone());
        }
    }

    pub(crate) fn emit_decode_failed(&mut self, error: &DecodeError) {
        debug!("emit DecodeFailed {error}");
        for (_, callback) in &mut self.decode_failed.entries {
            callback(error);
        }
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tests ────────────────────────────────────────────────────
