//! Air Equalizer
//!
//! Same one-pole split topology as the tilt EQ, but with an adjustable corner
//! in the 4-16 kHz range and gain applied to the high band only. Used on the
//! side channel to open up or damp the top octave without touching the mono
//! core of the mix.

use crate::dsp::utils::{db_to_lin, one_pole_alpha};

const MIN_FREQ_HZ: f32 = 4000.0;
const MAX_FREQ_HZ: f32 = 16000.0;
// Component-level gain bound; call sites narrow this further.
const MAX_GAIN_DB: f32 = 12.0;
const DEFAULT_SAMPLE_RATE: f32 = 44100.0;

#[derive(Clone, Copy, Debug)]
pub struct AirEq {
    alpha: f32,
    low: f32,
    high_gain: f32,
    freq_hz: f32,
    sample_rate: f32,
}

impl Default for AirEq {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_RATE)
    }
}

impl AirEq {
    pub fn new(sample_rate: f32) -> Self {
        let mut eq = Self {
            alpha: 0.0,
            low: 0.0,
            high_gain: 1.0,
            freq_hz: 10000.0,
            sample_rate: if sample_rate > 0.0 {
                sample_rate
            } else {
                DEFAULT_SAMPLE_RATE
            },
        };
        eq.set_freq_and_gain(eq.freq_hz, 0.0);
        eq
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        if sample_rate > 0.0 {
            self.sample_rate = sample_rate;
            self.alpha = one_pole_alpha(self.freq_hz, self.sample_rate);
        }
    }

    /// Corner clamps to 4-16 kHz, gain to +/-12 dB.
    pub fn set_freq_and_gain(&mut self, freq_hz: f32, gain_db: f32) {
        self.freq_hz = freq_hz.clamp(MIN_FREQ_HZ, MAX_FREQ_HZ);
        self.alpha = one_pole_alpha(self.freq_hz, self.sample_rate);
        self.high_gain = db_to_lin(gain_db.clamp(-MAX_GAIN_DB, MAX_GAIN_DB));
    }

    pub fn reset(&mut self) {
        self.low = 0.0;
    }

    #[inline]
    pub fn process_sample(&mut self, x: f32) -> f32 {
        self.low += self.alpha * (x - self.low);
        let low = self.low;
        let high = x - low;
        low + high * self.high_gain
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_gain_is_identity() {
        let mut eq = AirEq::new(48000.0);
        eq.set_freq_and_gain(10000.0, 0.0);
        for i in 0..64 {
            let x = ((i as f32) * 0.9).sin();
            assert!((eq.process_sample(x) - x).abs() < 1e-6);
        }
    }

    #[test]
    fn corner_clamps_to_musical_range() {
        let mut eq = AirEq::new(48000.0);
        eq.set_freq_and_gain(100.0, 3.0);
        assert_eq!(eq.freq_hz, MIN_FREQ_HZ);
        eq.set_freq_and_gain(40000.0, 3.0);
        assert_eq!(eq.freq_hz, MAX_FREQ_HZ);
    }

    #[test]
    fn boost_leaves_dc_untouched() {
        let mut eq = AirEq::new(48000.0);
        eq.set_freq_and_gain(8000.0, 6.0);
        let mut y = 0.0;
        for _ in 0..48000 {
            y = eq.process_sample(0.5);
        }
        // DC sits fully in the low band, which the air gain never touches.
        assert!((y - 0.5).abs() < 1e-3);
    }

    #[test]
    fn boost_raises_first_sample_of_a_step() {
        // The very first sample of a step is nearly all "high" energy.
        let mut flat = AirEq::new(48000.0);
        flat.set_freq_and_gain(8000.0, 0.0);
        let mut boosted = AirEq::new(48000.0);
        boosted.set_freq_and_gain(8000.0, 6.0);
        assert!(boosted.process_sample(1.0) > flat.process_sample(1.0));
    }
}
