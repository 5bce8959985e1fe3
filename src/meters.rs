//! Thread-safe metering for the processing chain.
//!
//! Atomic float storage (bit-cast through `AtomicU32`) so the audio thread can
//! publish telemetry and a UI or tool thread can poll it without locks. The
//! clip indicator is sticky: it stays set across blocks until a reader clears
//! it, so a single overshoot cannot slip between polls.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// Gain-reduction LED ladder thresholds, in dB of reduction.
pub const GR_LED_THRESHOLDS_DB: [f32; 8] = [-1.0, -2.0, -3.0, -4.0, -6.0, -8.0, -10.0, -12.0];

/// Number of LEDs lit for a given gain reduction. 0 dB lights nothing,
/// -1 dB lights one, -12 dB or more lights the full ladder of 8.
pub fn gr_to_leds(gain_reduction_db: f32) -> usize {
    let mut lit = 0;
    for (i, &threshold) in GR_LED_THRESHOLDS_DB.iter().enumerate() {
        if gain_reduction_db <= threshold {
            lit = i + 1;
        }
    }
    lit
}

#[derive(Default)]
pub struct Meters {
    input_peak: AtomicU32,
    output_peak: AtomicU32,
    gain_reduction_db: AtomicU32,
    width_now: AtomicU32,
    transient_activity: AtomicU32,
    clip: AtomicBool,
}

impl Meters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_input_peak(&self, val: f32) {
        self.input_peak.store(val.to_bits(), Ordering::Relaxed);
    }

    pub fn set_output_peak(&self, val: f32) {
        self.output_peak.store(val.to_bits(), Ordering::Relaxed);
    }

    pub fn set_gain_reduction_db(&self, val: f32) {
        self.gain_reduction_db
            .store(val.to_bits(), Ordering::Relaxed);
    }

    pub fn set_width_now(&self, val: f32) {
        self.width_now.store(val.to_bits(), Ordering::Relaxed);
    }

    pub fn set_transient_activity(&self, val: f32) {
        self.transient_activity
            .store(val.to_bits(), Ordering::Relaxed);
    }

    /// Latches the clip indicator; never cleared by the audio thread.
    pub fn flag_clip(&self) {
        self.clip.store(true, Ordering::Relaxed);
    }

    pub fn get_input_peak(&self) -> f32 {
        f32::from_bits(self.input_peak.load(Ordering::Relaxed))
    }

    pub fn get_output_peak(&self) -> f32 {
        f32::from_bits(self.output_peak.load(Ordering::Relaxed))
    }

    pub fn get_gain_reduction_db(&self) -> f32 {
        f32::from_bits(self.gain_reduction_db.load(Ordering::Relaxed))
    }

    pub fn get_width_now(&self) -> f32 {
        f32::from_bits(self.width_now.load(Ordering::Relaxed))
    }

    pub fn get_transient_activity(&self) -> f32 {
        f32::from_bits(self.transient_activity.load(Ordering::Relaxed))
    }

    /// Reads and clears the sticky clip indicator in one step.
    pub fn take_clip(&self) -> bool {
        self.clip.swap(false, Ordering::Relaxed)
    }
}
