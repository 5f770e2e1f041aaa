//! Data-frame codec.
//!
//! The transport hands over one raw record per streamed packet, already
//! deserialized into [`RawRecord`] (or still JSON-shaped, see
//! [`RawRecord::from_json`]).  The codec validates structure and produces an
//! immutable [`DataFrame`].  It performs **no** channel-count or value-range
//! validation: raw samples pass through unmodified, sign and overflow
//! characteristics of the channel width included.  Baseline removal and
//! scaling are downstream concerns (see [`crate::level`]).

use serde::{Deserialize, Serialize};

use crate::error::DecodeError;

// ───────────────────────────────────────────────────────────────
// RawRecord — the transport-boundary shape
// ───────────────────────────────────────────────────────────────

/// One inbound record exactly as the transport delivers it.
///
/// Every field is optional at this boundary; [`DataFrame::decode`] decides
/// what is required.  Wire names match the device's JSON payloads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRecord {
    /// Source device identifier (MAC address).
    #[serde(default)]
    pub identifier: Option<String>,
    /// Per-stream packet counter.
    #[serde(default)]
    pub sequence: Option<u32>,
    /// Raw samples, one per active analog channel.
    #[serde(default)]
    pub analog_channels: Vec<i32>,
    /// Digital-input bitfield.
    #[serde(default)]
    pub digital_input: Option<i32>,
    /// Free-form acquisition comments.
    #[serde(default)]
    pub comments: Option<String>,
}

impl RawRecord {
    /// Parse a JSON-shaped record, e.g.
    /// `{"identifier":"AA:BB","sequence":7,"analogChannels":[12345],"digitalInput":0}`.
    pub fn from_json(payload: &str) -> Result<Self, DecodeError> {
        serde_json::from_str(payload).map_err(|_| DecodeError::Malformed("record payload"))
    }
}

// ───────────────────────────────────────────────────────────────
// DataFrame
// ───────────────────────────────────────────────────────────────

/// One decoded unit of streamed sensor data.
///
/// Immutable; each subscriber receives its own copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataFrame {
    /// Identifier of the device that produced the frame.
    pub source_identifier: String,
    /// Monotonically increasing packet counter (may wrap).
    pub sequence: u32,
    /// Raw samples in channel order, unscaled.
    pub analog_channels: Vec<i32>,
    /// Digital-input bitfield; 0 when the record omitted it.
    pub digital_input: i32,
    /// Acquisition comments, when present.
    pub comments: Option<String>,
}

impl DataFrame {
    /// Validate a raw record and build a frame from it.
    ///
    /// Required: `identifier`, `sequence`, and a non-empty
    /// `analog_channels`.  `digital_input` and `comments` are defaulted when
    /// absent, matching the device's own record semantics.
    pub fn decode(raw: RawRecord) -> Result<Self, DecodeError> {
        let source_identifier = raw
            .identifier
            .ok_or(DecodeError::Malformed("identifier"))?;
        let sequence = raw.sequence.ok_or(DecodeError::Malformed("sequence"))?;
        if raw.analog_channels.is_empty() {
            return Err(DecodeError::Malformed("analogChannels"));
        }

        Ok(Self {
            source_identifier,
            sequence,
            analog_channels: raw.analog_channels,
            digital_input: raw.digital_input.unwrap_or(0),
            comments: raw.comments,
        })
    }
}

impl TryFrom<RawRecord> for DataFrame {
    type Error = DecodeError;

    fn try_from(raw: RawRecord) -> Result<Self, DecodeError> {
        Self::decode(raw)
    }
}

// ── Tests ────────────────────────────────────────────────────
