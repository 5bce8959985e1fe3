//! Soft Saturation
//!
//! Normalized tanh waveshaper: `tanh(x * drive) / tanh(drive)`, so full-scale
//! input maps back near full scale regardless of drive. Adds gentle harmonic
//! color at low amounts and acts as a safety clip for anything hotter. Amounts
//! at or below the bypass epsilon are a bit-exact pass-through.

const BYPASS_AMOUNT_EPS: f32 = 0.0001;
// amount 0..1 maps to drive 1..10.
const DRIVE_RANGE: f32 = 9.0;

#[derive(Clone, Copy, Debug)]
pub struct SoftSaturation {
    amount: f32,
    drive: f32,
    inv_tanh_drive: f32,
}

impl Default for SoftSaturation {
    fn default() -> Self {
        Self::new()
    }
}

impl SoftSaturation {
    pub fn new() -> Self {
        Self {
            amount: 0.0,
            drive: 1.0,
            inv_tanh_drive: 1.0,
        }
    }

    pub fn set_amount(&mut self, amount: f32) {
        self.amount = amount.clamp(0.0, 1.0);
        if self.amount <= BYPASS_AMOUNT_EPS {
            self.drive = 1.0;
            self.inv_tanh_drive = 1.0;
            return;
        }
        self.drive = 1.0 + DRIVE_RANGE * self.amount;
        let t = self.drive.tanh();
        self.inv_tanh_drive = if t != 0.0 { 1.0 / t } else { 1.0 };
    }

    #[inline]
    pub fn process_sample(&self, x: f32) -> f32 {
        if self.amount <= BYPASS_AMOUNT_EPS {
            return x;
        }
        (x * self.drive).tanh() * self.inv_tanh_drive
    }

    #[inline]
    pub fn process_stereo(&self, l: &mut f32, r: &mut f32) {
        *l = self.process_sample(*l);
        *r = self.process_sample(*r);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_amount_is_bit_exact_identity() {
        let mut sat = SoftSaturation::new();
        sat.set_amount(0.0);
        for &x in &[0.0f32, 0.3, -0.42, 1.5, -2.0] {
            assert_eq!(sat.process_sample(x), x);
        }
    }

    #[test]
    fn output_bounded_for_hot_input() {
        let mut sat = SoftSaturation::new();
        sat.set_amount(0.9);
        for &x in &[1.5f32, -3.0, 10.0, 0.99] {
            assert!(sat.process_sample(x).abs() <= 1.0);
        }
    }

    #[test]
    fn full_scale_maps_back_to_full_scale() {
        let mut sat = SoftSaturation::new();
        for amount in [0.1f32, 0.5, 1.0] {
            sat.set_amount(amount);
            assert!((sat.process_sample(1.0) - 1.0).abs() < 1e-6);
            assert!((sat.process_sample(-1.0) + 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn odd_symmetry() {
        let mut sat = SoftSaturation::new();
        sat.set_amount(0.4);
        for &x in &[0.1f32, 0.45, 0.8] {
            assert!((sat.process_sample(x) + sat.process_sample(-x)).abs() < 1e-7);
        }
    }

    #[test]
    fn stereo_maps_both_channels() {
        let mut sat = SoftSaturation::new();
        sat.set_amount(0.5);
        let mut l = 0.6;
        let mut r = -0.6;
        sat.process_stereo(&mut l, &mut r);
        assert!((l + r).abs() < 1e-7);
        assert!(l < 0.6 * 1.01 && l > 0.0);
    }
}
