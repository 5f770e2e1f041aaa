//! Unified error types for the biolink session core.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! façade's error handling uniform.  None of these are fatal: a malformed
//! frame is dropped and the stream continues, a rejected command leaves the
//! session untouched, and a missing transport turns the command into a no-op.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the session core funnels into this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// An inbound data record failed structural validation.
    Decode(DecodeError),
    /// A command was rejected without touching session state.
    Command(CommandError),
    /// The transport collaborator could not accept the command.
    Transport(TransportError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decode(e) => write!(f, "decode: {e}"),
            Self::Command(e) => write!(f, "command: {e}"),
            Self::Transport(e) => write!(f, "transport: {e}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Frame decode errors
// ---------------------------------------------------------------------------

/// A data record arriving from the transport failed validation.
///
/// Decode failures are non-fatal: the offending record is dropped and
/// subsequent records keep flowing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// A required field is absent or structurally invalid.
    /// The `&'static str` names the offending field.
    Malformed(&'static str),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed(field) => write!(f, "malformed record: {field}"),
        }
    }
}

impl From<DecodeError> for Error {
    fn from(e: DecodeError) -> Self {
        Self::Decode(e)
    }
}

// ---------------------------------------------------------------------------
// Command errors
// ---------------------------------------------------------------------------

/// A caller-issued command was refused.  Session state is never mutated by
/// a rejected command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// A connect was attempted toward a different device while a session is
    /// already in flight.  The caller must disconnect first.
    SessionBusy {
        /// Identifier of the device the active session targets.
        active: String,
        /// Identifier the rejected connect asked for.
        requested: String,
    },
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SessionBusy { active, requested } => write!(
                f,
                "session busy: connected toward {active}, rejected connect to {requested}"
            ),
        }
    }
}

impl From<CommandError> for Error {
    fn from(e: CommandError) -> Self {
        Self::Command(e)
    }
}

// ---------------------------------------------------------------------------
// Transport errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// No transport handle is attached (not yet initialized, or released by
    /// `close()`).  Commands hitting this are silently dropped.
    Unavailable,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => write!(f, "transport unavailable"),
        }
    }
}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

// ---------------------------------------------------------------------------
// Protocol anomalies
// ---------------------------------------------------------------------------

/// The transport asserted something inconsistent with the active session.
///
/// Anomalies are a special category: they are logged, never returned.  The
/// asserted state/data is still applied — the transport owns the ground
/// truth and the core mirrors it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolAnomaly {
    /// A state-change wire code outside the known range.
    UnknownStateCode(i32),
    /// An event carried an identifier that does not match the session target.
    IdentifierMismatch {
        expected: String,
        reported: String,
    },
    /// A known state arrived via a transition the protocol does not define.
    UnexpectedTransition {
        from: &'static str,
        to: &'static str,
    },
}

impl fmt::Display for ProtocolAnomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownStateCode(code) => write!(f, "unknown state code {code}"),
            Self::IdentifierMismatch { expected, reported } => {
                write!(f, "identifier mismatch: session targets {expected}, event reports {reported}")
            }
            Self::UnexpectedTransition { from, to } => {
                write!(f, "unexpected transition {from} -> {to}")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
