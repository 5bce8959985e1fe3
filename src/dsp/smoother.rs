//! Parameter Smoother
//!
//! One-pole glide for control values so block-rate parameter changes never
//! step discontinuously into the signal path. The first `process` call seeds
//! to the target exactly; there is no attack transient from a default of zero.

/// Smooths a single parameter toward its target.
///
/// `alpha` is the fraction of the remaining distance covered per call
/// (0 = frozen, 1 = instant). It can be set directly or derived from a
/// millisecond time constant and the calling cadence.
#[derive(Clone, Copy, Debug)]
pub struct ParamSmoother {
    alpha: f32,
    value: f32,
    initialized: bool,
}

impl Default for ParamSmoother {
    fn default() -> Self {
        Self::new(0.2)
    }
}

impl ParamSmoother {
    pub fn new(alpha: f32) -> Self {
        Self {
            alpha: alpha.clamp(0.0, 1.0),
            value: 0.0,
            initialized: false,
        }
    }

    pub fn set_alpha(&mut self, alpha: f32) {
        self.alpha = alpha.clamp(0.0, 1.0);
    }

    /// Derive alpha from a time constant and how often `process` runs:
    /// `alpha = 1 - exp(-dt / tau)` with `dt = samples_per_update / sample_rate`.
    /// Degenerate inputs (non-positive time constant, rate, or cadence) fall
    /// back to instant tracking.
    pub fn set_time_constant_ms(&mut self, ms: f32, sample_rate: f64, samples_per_update: usize) {
        if ms <= 0.0 || sample_rate <= 0.0 || samples_per_update == 0 {
            self.alpha = 1.0;
            return;
        }
        let dt = samples_per_update as f64 / sample_rate;
        let tau = f64::from(ms) * 1e-3;
        self.alpha = (1.0 - (-dt / tau).exp()) as f32;
    }

    /// Seed the smoother to a value; the next `process` glides from here.
    pub fn reset(&mut self, v: f32) {
        self.value = v;
        self.initialized = true;
    }

    pub fn process(&mut self, target: f32) -> f32 {
        if !self.initialized {
            self.value = target;
            self.initialized = true;
            return self.value;
        }
        self.value += self.alpha * (target - self.value);
        self.value
    }

    pub fn value(&self) -> f32 {
        self.value
    }
}
