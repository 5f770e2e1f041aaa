//! Signal level mapping for display consumers.
//!
//! Maps raw channel samples to a 0..=1 fill fraction: remove the resting
//! baseline (midpoint of the 16-bit ADC range), rectify, then normalize by
//! the largest excursion seen so far.  The running maximum adapts upward as
//! stronger contractions arrive, so the fraction is always relative to the
//! session's own peak rather than a fixed calibration.

/// Resting baseline: midpoint of the device's 16-bit sample range.
const BASELINE: i32 = 32_767;

/// Running baseline-removal and peak-normalization state.
#[derive(Debug, Clone, Copy)]
pub struct SignalLevel {
    peak: i32,
    fraction: f32,
}

impl SignalLevel {
    pub fn new() -> Self {
        Self {
            peak: -1,
            fraction: 0.0,
        }
    }

    /// Feed one raw sample; returns the updated fill fraction in 0..=1.
    pub fn update(&mut self, raw: i32) -> f32 {
        // Saturating math: samples are nominally 16-bit but the codec passes
        // any i32 through, so the extremes must not overflow here.
        let excursion = raw.saturating_sub(BASELINE).saturating_abs();
        if excursion > self.peak {
            self.peak = excursion;
        }
        // peak >= excursion >= 0 here; a zero peak means a zero excursion.
        self.fraction = if self.peak == 0 {
            0.0
        } else {
            excursion as f32 / self.peak as f32
        };
        self.fraction
    }

    /// Most recently computed fraction.
    pub fn fraction(&self) -> f32 {
        self.fraction
    }

    /// Drop the learned peak and return to an empty level.
    /// Called when the session disconnects.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for SignalLevel {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tests ────────────────────────────────────────────────────
