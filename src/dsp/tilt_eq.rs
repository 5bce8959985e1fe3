//! Tilt Equalizer
//!
//! Single-pole low/high split around a fixed 1 kHz pivot with a matched gain
//! pair: positive tilt leans the spectrum bright, negative leans it warm. Both
//! halves share one pole so the pivot stays phase-coherent. Applied to the mid
//! channel in the chain.

use crate::dsp::utils::{db_to_lin, one_pole_alpha};

const PIVOT_HZ: f32 = 1000.0;
const DEFAULT_SAMPLE_RATE: f32 = 44100.0;
// Tilt in dB/oct maps to a symmetric shelf pair; doubling the spread keeps the
// control audible across its small range.
const TILT_SPREAD: f32 = 2.0;

#[derive(Clone, Copy, Debug)]
pub struct TiltEq {
    alpha: f32,
    low: f32,
    low_gain: f32,
    high_gain: f32,
    tilt_db_per_oct: f32,
    sample_rate: f32,
}

impl Default for TiltEq {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_RATE)
    }
}

impl TiltEq {
    pub fn new(sample_rate: f32) -> Self {
        let mut eq = Self {
            alpha: 0.0,
            low: 0.0,
            low_gain: 1.0,
            high_gain: 1.0,
            tilt_db_per_oct: 0.0,
            sample_rate: if sample_rate > 0.0 {
                sample_rate
            } else {
                DEFAULT_SAMPLE_RATE
            },
        };
        eq.update_coefficients();
        eq
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        if sample_rate > 0.0 {
            self.sample_rate = sample_rate;
            self.update_coefficients();
        }
    }

    /// Tilt in dB/octave, clamped to -6..+6.
    pub fn set_tilt_db_per_oct(&mut self, db_per_oct: f32) {
        self.tilt_db_per_oct = db_per_oct.clamp(-6.0, 6.0);
        self.update_coefficients();
    }

    fn update_coefficients(&mut self) {
        let half = 0.5 * (self.tilt_db_per_oct * TILT_SPREAD);
        self.low_gain = db_to_lin(-half);
        self.high_gain = db_to_lin(half);
        self.alpha = one_pole_alpha(PIVOT_HZ, self.sample_rate);
    }

    pub fn reset(&mut self) {
        self.low = 0.0;
    }

    #[inline]
    pub fn process_sample(&mut self, x: f32) -> f32 {
        self.low += self.alpha * (x - self.low);
        let low = self.low;
        let high = x - low;
        low * self.low_gain + high * self.high_gain
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_tilt_is_identity() {
        let mut eq = TiltEq::new(48000.0);
        eq.set_tilt_db_per_oct(0.0);
        for i in 0..64 {
            let x = ((i as f32) * 0.37).sin() * 0.5;
            let y = eq.process_sample(x);
            // low*1 + high*1 == low + (x - low) == x
            assert!((y - x).abs() < 1e-6);
        }
    }

    #[test]
    fn tilt_clamps_to_documented_range() {
        let mut eq = TiltEq::new(48000.0);
        eq.set_tilt_db_per_oct(20.0);
        // +6 dB/oct doubled and halved: high shelf at +6 dB
        assert!((eq.high_gain - db_to_lin(6.0)).abs() < 1e-4);
        assert!((eq.low_gain - db_to_lin(-6.0)).abs() < 1e-4);
    }

    #[test]
    fn positive_tilt_attenuates_dc() {
        let mut eq = TiltEq::new(48000.0);
        eq.set_tilt_db_per_oct(6.0);
        // Feed DC long enough for the pole to settle; the low shelf cut dominates.
        let mut y = 0.0;
        for _ in 0..48000 {
            y = eq.process_sample(1.0);
        }
        // Full tilt puts the low shelf at -6 dB; DC should settle near 0.5.
        assert!((y - 0.5).abs() < 0.05, "DC should settle near -6 dB, got {y}");
    }

    #[test]
    fn reset_clears_filter_state() {
        let mut eq = TiltEq::new(48000.0);
        eq.set_tilt_db_per_oct(-4.0);
        for _ in 0..100 {
            eq.process_sample(0.9);
        }
        eq.reset();
        assert_eq!(eq.low, 0.0);
    }
}
