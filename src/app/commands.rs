//! Inbound commands to the session controller.
//!
//! These represent actions requested by the outside world (UI buttons, a
//! remote bridge, a script runner) that the
//! [`SessionController`](super::service::SessionController) interprets and
//! forwards to the transport.

use crate::config::AcquisitionConfig;

/// Commands that external adapters can send into the session core.
#[derive(Debug, Clone)]
pub enum SessionCommand {
    /// Start (`true`) or stop (`false`) a device scan.
    Scan { enable: bool },

    /// Connect to the device with this identifier.
    Connect { identifier: String },

    /// Disconnect from this identifier (stops acquisition first when
    /// streaming; otherwise teardown is transport-driven).
    Disconnect { identifier: String },

    /// Begin streaming with an explicit acquisition profile.
    StartAcquisition {
        identifier: String,
        profile: AcquisitionConfig,
    },

    /// Stop streaming from this identifier.
    StopAcquisition { identifier: String },

    /// Reset the session, clear subscriptions, release the transport.
    Close,
}
