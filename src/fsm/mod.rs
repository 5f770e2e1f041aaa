//! Connection state machine for the single active device session.
//!
//! The transport owns the ground truth: every state it reports is mirrored
//! verbatim, even when the transition is not one the protocol defines
//! (those are logged as anomalies, not rejected).  The machine's own
//! contribution is the session bookkeeping around that mirror:
//!
//! ```text
//!  NoConnection ──[connect]──▶ Connecting ──▶ Connected
//!                                                 │
//!                                        AcquisitionTrying
//!                                                 │
//!                                          AcquisitionOk
//!                                                 │
//!                                       AcquisitionStopping ──[auto]──▶ disconnect
//!                                                 │
//!  Any state ──[transport]──▶ Disconnected / Ended  (target cleared)
//! ```

use core::fmt;

use log::{info, warn};

use crate::error::{CommandError, ProtocolAnomaly};

// ---------------------------------------------------------------------------
// Connection state
// ---------------------------------------------------------------------------

/// Connection state of the device session, as asserted by the transport.
///
/// Discriminants are the wire codes the transport reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ConnectionState {
    NoConnection = 0,
    Listen = 1,
    Connecting = 2,
    Connected = 3,
    AcquisitionTrying = 4,
    AcquisitionOk = 5,
    AcquisitionStopping = 6,
    Disconnected = 7,
    Ended = 8,
}

impl ConnectionState {
    /// Total number of states.
    pub const COUNT: usize = 9;

    /// Every state, in wire-code order.  Used by exhaustive tests.
    pub const ALL: [Self; Self::COUNT] = [
        Self::NoConnection,
        Self::Listen,
        Self::Connecting,
        Self::Connected,
        Self::AcquisitionTrying,
        Self::AcquisitionOk,
        Self::AcquisitionStopping,
        Self::Disconnected,
        Self::Ended,
    ];

    /// Map a transport wire code back to a state.
    /// Returns `None` for codes outside the protocol.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::NoConnection),
            1 => Some(Self::Listen),
            2 => Some(Self::Connecting),
            3 => Some(Self::Connected),
            4 => Some(Self::AcquisitionTrying),
            5 => Some(Self::AcquisitionOk),
            6 => Some(Self::AcquisitionStopping),
            7 => Some(Self::Disconnected),
            8 => Some(Self::Ended),
            _ => None,
        }
    }

    /// The wire code for this state.
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// State name for logs.
    pub const fn name(self) -> &'static str {
        match self {
            Self::NoConnection => "NoConnection",
            Self::Listen => "Listen",
            Self::Connecting => "Connecting",
            Self::Connected => "Connected",
            Self::AcquisitionTrying => "AcquisitionTrying",
            Self::AcquisitionOk => "AcquisitionOk",
            Self::AcquisitionStopping => "AcquisitionStopping",
            Self::Disconnected => "Disconnected",
            Self::Ended => "Ended",
        }
    }

    /// Human-readable status label for presentation consumers.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Listen => "listening",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::AcquisitionTrying => "starting",
            Self::AcquisitionOk => "in acquisition",
            Self::AcquisitionStopping => "stopping",
            Self::Disconnected => "disconnected",
            Self::NoConnection | Self::Ended => "no connection",
        }
    }

    /// True for every state past `Connecting` and before
    /// `Disconnected`/`Ended` — the predicate consumers should use to decide
    /// "a sensor is connected", rather than matching raw states.
    pub const fn is_connected(self) -> bool {
        matches!(
            self,
            Self::Connected
                | Self::AcquisitionTrying
                | Self::AcquisitionOk
                | Self::AcquisitionStopping
        )
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// The single active device-connection context.
///
/// Created once, never destroyed; reset to initial values on close.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    target: Option<String>,
    state: ConnectionState,
}

impl Session {
    fn new() -> Self {
        Self {
            target: None,
            state: ConnectionState::NoConnection,
        }
    }

    /// Identifier of the device the session targets, if a connect was issued.
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }
}

// ---------------------------------------------------------------------------
// State change result
// ---------------------------------------------------------------------------

/// Command the machine asks its owner to issue after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowUp {
    /// Streaming teardown implies disconnect; never a lingering
    /// idle-connected session.
    Disconnect,
}

/// Outcome of applying one transport-reported state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateChange {
    pub from: ConnectionState,
    pub to: ConnectionState,
    /// Outbound command the owner must issue, at most one per change.
    pub follow_up: Option<FollowUp>,
}

// ---------------------------------------------------------------------------
// ConnectionStateMachine
// ---------------------------------------------------------------------------

/// Owns the session and validates what happens to it.
///
/// Transport-reported states are always applied; user commands are the only
/// thing the machine rejects (a second connect toward a different device
/// while one is in flight).
#[derive(Debug)]
pub struct ConnectionStateMachine {
    session: Session,
}

impl ConnectionStateMachine {
    pub fn new() -> Self {
        Self {
            session: Session::new(),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.session.state
    }

    pub fn target(&self) -> Option<&str> {
        self.session.target()
    }

    /// Delegates to [`ConnectionState::is_connected`].
    pub fn is_connected(&self) -> bool {
        self.session.state.is_connected()
    }

    /// Record a caller-requested connect toward `identifier`.
    ///
    /// Rejected when a session is already in flight (state `Connecting` or
    /// later) toward a **different** identifier; the rejection mutates
    /// nothing.  Re-requesting the current target is allowed and leaves the
    /// session untouched — the command is simply forwarded again.
    pub fn request_connect(&mut self, identifier: &str) -> Result<(), CommandError> {
        let in_flight = matches!(
            self.session.state,
            ConnectionState::Connecting
                | ConnectionState::Connected
                | ConnectionState::AcquisitionTrying
                | ConnectionState::AcquisitionOk
                | ConnectionState::AcquisitionStopping
        );

        if in_flight {
            if let Some(active) = self.session.target() {
                if active != identifier {
                    return Err(CommandError::SessionBusy {
                        active: active.to_string(),
                        requested: identifier.to_string(),
                    });
                }
            }
            return Ok(());
        }

        info!(
            "session: {} -> Connecting (connect {identifier})",
            self.session.state.name()
        );
        self.session.target = Some(identifier.to_string());
        self.session.state = ConnectionState::Connecting;
        Ok(())
    }

    /// Mirror a transport-reported state into the session.
    ///
    /// Anomalies (identifier not matching the target, transitions the
    /// protocol does not define) are logged, never rejected.  Entering
    /// `AcquisitionStopping` yields a [`FollowUp::Disconnect`] exactly once
    /// per entry into that state.
    pub fn apply_reported(&mut self, identifier: &str, state: ConnectionState) -> StateChange {
        let from = self.session.state;

        if let Some(target) = self.session.target() {
            if target != identifier {
                warn!(
                    "session anomaly: {}",
                    ProtocolAnomaly::IdentifierMismatch {
                        expected: target.to_string(),
                        reported: identifier.to_string(),
                    }
                );
            }
        }

        if !expected_transition(from, state) {
            warn!(
                "session anomaly: {}",
                ProtocolAnomaly::UnexpectedTransition {
                    from: from.name(),
                    to: state.name(),
                }
            );
        }

        if state != from {
            info!("session: {} -> {} ({identifier})", from.name(), state.name());
        }
        self.session.state = state;

        let mut follow_up = None;
        match state {
            ConnectionState::Disconnected | ConnectionState::Ended => {
                self.session.target = None;
            }
            ConnectionState::AcquisitionStopping if from != ConnectionState::AcquisitionStopping => {
                follow_up = Some(FollowUp::Disconnect);
            }
            _ => {}
        }

        StateChange {
            from,
            to: state,
            follow_up,
        }
    }

    /// Return the session to its initial values.
    pub fn reset(&mut self) {
        if self.session != Session::new() {
            info!("session: reset to NoConnection");
        }
        self.session = Session::new();
    }
}

impl Default for ConnectionStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether `from -> to` is a transition the protocol defines.
/// Anything else is mirrored anyway but logged as an anomaly.
fn expected_transition(from: ConnectionState, to: ConnectionState) -> bool {
    use ConnectionState::{
        AcquisitionOk, AcquisitionStopping, AcquisitionTrying, Connected, Connecting, Disconnected,
        Ended, Listen, NoConnection,
    };

    if from == to {
        return true; // transport re-asserting the current state
    }

    matches!(
        (from, to),
        (_, Disconnected)
            | (_, Ended)
            | (NoConnection | Listen | Disconnected | Ended, Connecting)
            | (NoConnection | Connecting | Disconnected | Ended, Listen)
            | (Connecting | Listen, Connected)
            | (Connected, AcquisitionTrying)
            | (AcquisitionTrying, AcquisitionOk)
            | (AcquisitionOk, AcquisitionStopping)
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
