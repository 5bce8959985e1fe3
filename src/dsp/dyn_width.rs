//! Dynamic Width
//!
//! Scales the side channel by a width factor that follows transient activity:
//! narrower on hits so attacks stay focused, wider at rest so tails bloom. The
//! side is split at a low anchor frequency and the low band is scaled toward
//! mono regardless of the width setting, keeping bass anchored in the center.

use crate::dsp::utils::one_pole_alpha;

const DEFAULT_SAMPLE_RATE: f32 = 44100.0;
const MIN_ANCHOR_HZ: f32 = 40.0;
const MAX_ANCHOR_HZ: f32 = 250.0;
const MAX_WIDTH: f32 = 1.5;
// Low band keeps only a quarter of the width so bass stays mono-leaning.
const LOW_WIDTH_SCALE: f32 = 0.25;
// Fraction of the dynamic amount used to pull width down on hits.
const NARROW_DEPTH: f32 = 0.9;

#[derive(Clone, Copy, Debug)]
pub struct DynWidth {
    base_width: f32,
    dyn_amount: f32,
    low_anchor_hz: f32,
    low_side_state: f32,
    low_alpha: f32,
    last_width: f32,
    sample_rate: f32,
}

impl Default for DynWidth {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_RATE)
    }
}

impl DynWidth {
    pub fn new(sample_rate: f32) -> Self {
        let mut dw = Self {
            base_width: 0.6,
            dyn_amount: 0.35,
            low_anchor_hz: 100.0,
            low_side_state: 0.0,
            low_alpha: 0.0,
            last_width: 0.6,
            sample_rate: if sample_rate > 0.0 {
                sample_rate
            } else {
                DEFAULT_SAMPLE_RATE
            },
        };
        dw.set_low_anchor_hz(dw.low_anchor_hz);
        dw
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        if sample_rate > 0.0 {
            self.sample_rate = sample_rate;
            self.low_alpha = one_pole_alpha(self.low_anchor_hz, self.sample_rate);
        }
    }

    pub fn set_base_width(&mut self, w: f32) {
        self.base_width = w.clamp(0.0, MAX_WIDTH);
    }

    pub fn set_dyn_amount(&mut self, a: f32) {
        self.dyn_amount = a.clamp(0.0, 1.0);
    }

    pub fn set_low_anchor_hz(&mut self, hz: f32) {
        self.low_anchor_hz = hz.clamp(MIN_ANCHOR_HZ, MAX_ANCHOR_HZ);
        self.low_alpha = one_pole_alpha(self.low_anchor_hz, self.sample_rate);
    }

    pub fn reset(&mut self) {
        self.low_side_state = 0.0;
        self.last_width = self.base_width;
    }

    /// Rescales `side` in place; `mid` passes through untouched (kept in the
    /// signature so the stage owns the whole M/S frame).
    #[inline]
    pub fn process_sample(&mut self, _mid: f32, side: &mut f32, transient_activity: f32) {
        let t = transient_activity.clamp(0.0, 1.0);

        self.low_side_state += self.low_alpha * (*side - self.low_side_state);
        let low = self.low_side_state;
        let high = *side - low;

        let widen = (self.base_width + self.dyn_amount).min(MAX_WIDTH);
        let narrow = (self.base_width * (1.0 - NARROW_DEPTH * self.dyn_amount)).max(0.0);

        let width_now = narrow * t + widen * (1.0 - t);
        self.last_width = width_now;

        *side = low * (width_now * LOW_WIDTH_SCALE) + high * width_now;
    }

    /// Width applied to the most recent sample, for telemetry.
    pub fn last_width(&self) -> f32 {
        self.last_width
    }
}
