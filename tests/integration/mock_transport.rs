//! Mock transport for integration tests.
//!
//! Records every outbound command so tests can assert on the full command
//! history without a real radio link.  Shared behind `Rc<RefCell<_>>` so a
//! test can keep inspecting the log after handing the transport to the
//! controller.

use std::cell::RefCell;
use std::rc::Rc;

use biolink::app::ports::Transport;

// ── Command record ────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCall {
    Scan { enable: bool },
    Connect { identifier: String },
    Disconnect { identifier: String },
    StartAcquisition {
        identifier: String,
        frequency_hz: u32,
        channel_count: u8,
        frequency_divisor: u32,
    },
    StopAcquisition { identifier: String },
}

// ── MockTransport ─────────────────────────────────────────────

#[derive(Default)]
pub struct MockTransport {
    pub calls: Rc<RefCell<Vec<TransportCall>>>,
    pub link_connected: bool,
}

#[allow(dead_code)]
impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle onto the shared call log, valid after the transport moves
    /// into the controller.
    pub fn log(&self) -> Rc<RefCell<Vec<TransportCall>>> {
        Rc::clone(&self.calls)
    }
}

#[allow(dead_code)]
pub fn disconnect_count(calls: &[TransportCall], identifier: &str) -> usize {
    calls
        .iter()
        .filter(|c| {
            matches!(c, TransportCall::Disconnect { identifier: id } if id.as_str() == identifier)
        })
        .count()
}

impl Transport for MockTransport {
    fn scan(&mut self, enable: bool) {
        self.calls.borrow_mut().push(TransportCall::Scan { enable });
    }

    fn connect(&mut self, identifier: &str) {
        self.calls.borrow_mut().push(TransportCall::Connect {
            identifier: identifier.to_string(),
        });
    }

    fn disconnect(&mut self, identifier: &str) {
        self.calls.borrow_mut().push(TransportCall::Disconnect {
            identifier: identifier.to_string(),
        });
    }

    fn start_acquisition(
        &mut self,
        identifier: &str,
        frequency_hz: u32,
        channel_count: u8,
        frequency_divisor: u32,
    ) {
        self.calls.borrow_mut().push(TransportCall::StartAcquisition {
            identifier: identifier.to_string(),
            frequency_hz,
            channel_count,
            frequency_divisor,
        });
    }

    fn stop_acquisition(&mut self, identifier: &str) {
        self.calls.borrow_mut().push(TransportCall::StopAcquisition {
            identifier: identifier.to_string(),
        });
    }

    fn is_sensor_connected(&self, _identifier: &str) -> bool {
        self.link_connected
    }
}
