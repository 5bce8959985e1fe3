//! Transient Detector
//!
//! Asymmetric envelope follower (fast attack, slow release) mapped to a
//! normalized 0..1 "transient activity" score. The sensitivity control moves
//! the score threshold across a ~0.05..0.5 span. Drives the dynamic width
//! stage and the limiter's adaptive release.

use crate::dsp::utils::{time_constant_coeff, update_env};

const ATTACK_MS: f32 = 2.0;
const RELEASE_MS: f32 = 80.0;
const DEFAULT_SAMPLE_RATE: f32 = 44100.0;

#[derive(Clone, Copy, Debug)]
pub struct TransientDetector {
    env: f32,
    sensitivity: f32,
    attack_coeff: f32,
    release_coeff: f32,
    sample_rate: f32,
}

impl Default for TransientDetector {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_RATE)
    }
}

impl TransientDetector {
    pub fn new(sample_rate: f32) -> Self {
        let mut det = Self {
            env: 0.0,
            sensitivity: 0.5,
            attack_coeff: 0.0,
            release_coeff: 0.0,
            sample_rate: if sample_rate > 0.0 {
                sample_rate
            } else {
                DEFAULT_SAMPLE_RATE
            },
        };
        det.update_coefficients();
        det
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        if sample_rate > 0.0 {
            self.sample_rate = sample_rate;
            self.update_coefficients();
        }
    }

    fn update_coefficients(&mut self) {
        self.attack_coeff = time_constant_coeff(ATTACK_MS, self.sample_rate);
        self.release_coeff = time_constant_coeff(RELEASE_MS, self.sample_rate);
    }

    /// Sensitivity 0..1, spanning an activity threshold of ~0.05..0.5.
    pub fn set_sensitivity(&mut self, s: f32) {
        self.sensitivity = s.clamp(0.0, 1.0);
    }

    pub fn reset(&mut self) {
        self.env = 0.0;
    }

    /// Returns transient activity in [0, 1].
    #[inline]
    pub fn process_sample(&mut self, x: f32) -> f32 {
        let ax = x.abs();
        self.env = update_env(self.env, ax, self.attack_coeff, self.release_coeff);

        let threshold = 0.05 + self.sensitivity * 0.45; // ~0.05 .. 0.5
        ((self.env - threshold) / (1.0 - threshold)).clamp(0.0, 1.0)
    }
}
