//! Session controller — the core façade.
//!
//! [`SessionController`] owns the connection state machine, the device
//! registry, and the notification dispatcher.  Outbound commands flow
//! through the [`Transport`] port; inbound transport events are fed into
//! the `on_*` handlers by the adapter.
//!
//! ```text
//!  commands ──▶ ┌──────────────────────────────┐ ──▶ Transport
//!               │       SessionController       │
//!  on_* events ─▶│  registry · fsm · dispatcher │──▶ subscribers
//!               └──────────────────────────────┘
//! ```
//!
//! The core is logically single-threaded: every mutation goes through
//! `&mut self`, and the embedder is responsible for marshalling transport
//! callbacks onto whatever serializes access (a dispatch queue, a mutex
//! around the controller).  No handler blocks; commands are fire-and-forget
//! and their results surface later as inbound events.

use log::{debug, info, warn};

use crate::config::AcquisitionConfig;
use crate::error::{ProtocolAnomaly, Result, TransportError};
use crate::frame::{DataFrame, RawRecord};
use crate::fsm::{ConnectionState, ConnectionStateMachine, FollowUp};
use crate::registry::{DeviceIdentity, DeviceRegistry};

use super::commands::SessionCommand;
use super::events::EventDispatcher;
use super::ports::Transport;

// ───────────────────────────────────────────────────────────────
// SessionController
// ───────────────────────────────────────────────────────────────

/// Owns the single device session and fans its events out to subscribers.
pub struct SessionController<T: Transport> {
    transport: Option<T>,
    registry: DeviceRegistry,
    machine: ConnectionStateMachine,
    dispatcher: EventDispatcher,
    profile: AcquisitionConfig,
}

impl<T: Transport> SessionController<T> {
    /// Construct without a transport.  Every command is a silent no-op
    /// until [`attach_transport`](Self::attach_transport) is called.
    pub fn new(profile: AcquisitionConfig) -> Self {
        Self {
            transport: None,
            registry: DeviceRegistry::new(),
            machine: ConnectionStateMachine::new(),
            dispatcher: EventDispatcher::new(),
            profile,
        }
    }

    /// Construct with a ready transport.
    pub fn with_transport(transport: T, profile: AcquisitionConfig) -> Self {
        let mut controller = Self::new(profile);
        controller.attach_transport(transport);
        controller
    }

    /// Attach (or replace) the transport handle.
    pub fn attach_transport(&mut self, transport: T) {
        self.transport = Some(transport);
        info!("transport attached");
    }

    pub fn has_transport(&self) -> bool {
        self.transport.is_some()
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> ConnectionState {
        self.machine.state()
    }

    pub fn target(&self) -> Option<&str> {
        self.machine.target()
    }

    /// True iff the session state says a sensor is connected
    /// (see [`ConnectionState::is_connected`]).
    pub fn is_sensor_connected(&self) -> bool {
        self.machine.is_connected()
    }

    /// The transport's own view of link connectivity toward the session
    /// target.  Diagnostic only — consumers should trust
    /// [`is_sensor_connected`](Self::is_sensor_connected), which follows the
    /// reported session state.  `false` without a transport or a target.
    pub fn link_is_connected(&self) -> bool {
        match (&self.transport, self.machine.target()) {
            (Some(transport), Some(target)) => transport.is_sensor_connected(target),
            _ => false,
        }
    }

    /// Devices observed during the current scan session.
    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    /// Profile used by [`start_acquisition_default`](Self::start_acquisition_default)
    /// and by the device-ready auto-start.
    pub fn profile(&self) -> AcquisitionConfig {
        self.profile
    }

    /// Subscription surface for notifications.
    pub fn events(&mut self) -> &mut EventDispatcher {
        &mut self.dispatcher
    }

    // ── Outbound commands ─────────────────────────────────────

    /// Start or stop a device scan.  Starting a scan clears the registry.
    pub fn scan(&mut self, enable: bool) {
        let Some(transport) = self.transport.as_mut() else {
            debug!("scan({enable}) dropped: {}", TransportError::Unavailable);
            return;
        };
        if enable {
            self.registry.reset();
        }
        transport.scan(enable);
    }

    /// Connect to `identifier`.
    ///
    /// Rejected with [`CommandError::SessionBusy`](crate::error::CommandError)
    /// when a session is already in flight toward a different device; the
    /// rejection leaves all state untouched.  The target device is
    /// registered before the command goes out, so it is listed even when it
    /// was picked without a scan.
    pub fn connect(&mut self, identifier: &str) -> Result<()> {
        let Some(transport) = self.transport.as_mut() else {
            debug!("connect({identifier}) dropped: {}", TransportError::Unavailable);
            return Ok(());
        };
        self.machine.request_connect(identifier)?;
        self.registry.observe(DeviceIdentity::new(identifier));
        transport.connect(identifier);
        Ok(())
    }

    /// Disconnect from `identifier`.
    ///
    /// While streaming (`AcquisitionOk`) this issues a stop-acquisition
    /// command; the resulting `AcquisitionStopping` report then triggers the
    /// actual disconnect.  In every other state no outbound command is
    /// issued — disconnection is transport-driven.
    pub fn disconnect(&mut self, identifier: &str) {
        let Some(transport) = self.transport.as_mut() else {
            debug!("disconnect({identifier}) dropped: {}", TransportError::Unavailable);
            return;
        };
        if self.machine.state() == ConnectionState::AcquisitionOk {
            transport.stop_acquisition(identifier);
        } else {
            debug!(
                "disconnect({identifier}): no command issued in state {}",
                self.machine.state().name()
            );
        }
    }

    /// Begin streaming with explicit parameters, passed through unvalidated.
    /// The caller must ensure a connection exists.
    pub fn start_acquisition(
        &mut self,
        identifier: &str,
        frequency_hz: u32,
        channel_count: u8,
        frequency_divisor: u32,
    ) {
        let Some(transport) = self.transport.as_mut() else {
            debug!("start_acquisition({identifier}) dropped: {}", TransportError::Unavailable);
            return;
        };
        transport.start_acquisition(identifier, frequency_hz, channel_count, frequency_divisor);
    }

    /// Begin streaming with the configured default profile.
    pub fn start_acquisition_default(&mut self, identifier: &str) {
        let profile = self.profile;
        self.start_acquisition(
            identifier,
            profile.sampling_frequency_hz,
            profile.channel_count,
            profile.frequency_divisor,
        );
    }

    /// Stop streaming from `identifier`.
    pub fn stop_acquisition(&mut self, identifier: &str) {
        let Some(transport) = self.transport.as_mut() else {
            debug!("stop_acquisition({identifier}) dropped: {}", TransportError::Unavailable);
            return;
        };
        transport.stop_acquisition(identifier);
    }

    /// Reset the session to its initial values, clear the registry, detach
    /// every subscriber, and release the transport handle.  Idempotent.
    pub fn close(&mut self) {
        self.machine.reset();
        self.registry.reset();
        self.dispatcher.clear();
        if self.transport.take().is_some() {
            info!("session closed, transport released");
        }
    }

    /// Route a [`SessionCommand`] to the matching operation.
    pub fn handle_command(&mut self, command: SessionCommand) -> Result<()> {
        match command {
            SessionCommand::Scan { enable } => self.scan(enable),
            SessionCommand::Connect { identifier } => self.connect(&identifier)?,
            SessionCommand::Disconnect { identifier } => self.disconnect(&identifier),
            SessionCommand::StartAcquisition {
                identifier,
                profile,
            } => self.start_acquisition(
                &identifier,
                profile.sampling_frequency_hz,
                profile.channel_count,
                profile.frequency_divisor,
            ),
            SessionCommand::StopAcquisition { identifier } => self.stop_acquisition(&identifier),
            SessionCommand::Close => self.close(),
        }
        Ok(())
    }

    // ── Inbound transport events ──────────────────────────────

    /// A device was reported during a scan.  Duplicate observations of the
    /// same address emit nothing.
    pub fn on_device_found(&mut self, identity: DeviceIdentity) {
        if self.registry.observe(identity.clone()) {
            self.dispatcher.emit_device_found(&identity);
        } else {
            debug!("device {} already known", identity.address);
        }
    }

    /// The transport reported a connection state for `identifier`.
    ///
    /// Unknown wire codes resolve to `NoConnection` (logged as an anomaly).
    /// When the resolved state is `AcquisitionStopping`, the disconnect
    /// command is issued automatically — streaming stop always implies
    /// disconnect.
    pub fn on_connection_state_changed(&mut self, identifier: &str, state_code: i32) {
        let state = ConnectionState::from_code(state_code).unwrap_or_else(|| {
            warn!(
                "session anomaly: {}",
                ProtocolAnomaly::UnknownStateCode(state_code)
            );
            ConnectionState::NoConnection
        });

        let change = self.machine.apply_reported(identifier, state);
        self.dispatcher.emit_connection_changed(identifier, change.to);

        if change.follow_up == Some(FollowUp::Disconnect) {
            match self.transport.as_mut() {
                Some(transport) => transport.disconnect(identifier),
                None => debug!(
                    "auto-disconnect({identifier}) dropped: {}",
                    TransportError::Unavailable
                ),
            }
        }
    }

    /// A raw record arrived from the stream.
    ///
    /// Decode failures are non-fatal: the record is dropped, a
    /// `DecodeFailed` notification goes out, and subsequent records keep
    /// flowing.  A frame from a device other than the session target is a
    /// protocol anomaly — logged, still delivered.
    pub fn on_frame_received(&mut self, raw: RawRecord) {
        match DataFrame::decode(raw) {
            Ok(frame) => {
                if let Some(target) = self.machine.target() {
                    if target != frame.source_identifier {
                        warn!(
                            "frame anomaly: {}",
                            ProtocolAnomaly::IdentifierMismatch {
                                expected: target.to_string(),
                                reported: frame.source_identifier.clone(),
                            }
                        );
                    }
                }
                self.dispatcher.emit_frame_received(&frame);
            }
            Err(error) => {
                warn!("dropping record: {error}");
                self.dispatcher.emit_decode_failed(&error);
            }
        }
    }

    /// The device reported readiness: acquisition starts immediately with
    /// the default profile, no separate user action required.
    pub fn on_device_ready(&mut self, identifier: &str) {
        info!("device ready, starting acquisition: {identifier}");
        self.start_acquisition_default(identifier);
    }
}

// ── Tests ────────────────────────────────────────────────────
