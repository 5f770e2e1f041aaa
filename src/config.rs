//! Acquisition configuration parameters
//!
//! Tunable parameters for a streaming session.  The defaults mirror the
//! device's convenience profile: 1000 Hz ADC sampling downsampled by a
//! divisor of 100, so only 10 effective samples per second cross the link.

use serde::{Deserialize, Serialize};

/// Acquisition profile forwarded to the transport when streaming starts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AcquisitionConfig {
    /// ADC sampling rate in Hz.
    pub sampling_frequency_hz: u32,
    /// Number of active analog channels.
    pub channel_count: u8,
    /// Downsampling divisor applied device-side before transmission.
    pub frequency_divisor: u32,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            sampling_frequency_hz: 1000,
            channel_count: 1,
            frequency_divisor: 100, // 1000 / 100 = 10 samples/s on the wire
        }
    }
}

impl AcquisitionConfig {
    /// Effective sample rate delivered over the link, in Hz.
    ///
    /// A divisor of zero is passed through to the transport unvalidated like
    /// every other parameter; here it is treated as no downsampling.
    pub fn effective_rate_hz(&self) -> u32 {
        if self.frequency_divisor == 0 {
            self.sampling_frequency_hz
        } else {
            self.sampling_frequency_hz / self.frequency_divisor
        }
    }
}
