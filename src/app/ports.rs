//! Port traits — the boundary between the session core and the radio link.
//!
//! ```text
//!   SessionController ──▶ Transport trait ──▶ radio adapter
//! ```
//!
//! The driven adapter (a BLE plugin binding, a serial bridge, a simulator)
//! implements [`Transport`].  The
//! [`SessionController`](super::service::SessionController) consumes it via
//! generics, so the core never touches the radio directly.  Commands are
//! fire-and-forget: nothing here blocks
//! waiting for a reply, and results surface later as inbound events the
//! adapter feeds into the controller's `on_*` handlers.

/// Outbound command surface of the radio link.
pub trait Transport {
    /// Start (`true`) or stop (`false`) a device scan.
    fn scan(&mut self, enable: bool);

    /// Open a connection toward the device with this identifier.
    fn connect(&mut self, identifier: &str);

    /// Tear down the connection toward this identifier.
    fn disconnect(&mut self, identifier: &str);

    /// Begin streaming with the given acquisition parameters.
    /// Parameters are passed through unvalidated.
    fn start_acquisition(
        &mut self,
        identifier: &str,
        frequency_hz: u32,
        channel_count: u8,
        frequency_divisor: u32,
    );

    /// Stop streaming from this identifier.
    fn stop_acquisition(&mut self, identifier: &str);

    /// Link-level connectivity as the transport itself sees it.
    fn is_sensor_connected(&self, identifier: &str) -> bool;
}
