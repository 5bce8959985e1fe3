//! Host-side processing chain.
//!
//! [`HostProcessor`] wires the whole signal path together for a DAW shell,
//! offline renderer, or test harness feeding plain float buffers. Per block it
//! advances one step of every parameter smoother, pushes the smoothed values
//! into the stages, then runs the per-sample chain:
//!
//! mid/side encode -> mid tilt -> side air -> transient detect ->
//! dynamic width -> decode -> lookahead limiter -> soft saturation ->
//! output trim -> hard clamp.
//!
//! Parameter setters only write targets and are safe to call from any thread
//! relative to nothing; the processor itself is single-owner. Telemetry is
//! published through an [`Arc<Meters>`] after every block.

use std::sync::Arc;

use crate::dsp::{
    AirEq, DynWidth, LimiterTelemetry, LinkMode, LookaheadLimiter, MsMatrix, ParamSmoother,
    SoftSaturation, TiltEq, TransientDetector,
};
use crate::hz_log;
use crate::meters::Meters;

const PARAM_SMOOTH_MS: f32 = 35.0;
const TRIM_SMOOTH_MS: f32 = 28.0;
const OUTPUT_CLAMP: f32 = 1.0;
const MIN_TRIM_DB: f32 = -12.0;
const MAX_TRIM_DB: f32 = 6.0;
const DEFAULT_SAMPLE_RATE: f64 = 44100.0;
const DEFAULT_BLOCK_SIZE: usize = 128;

/// Stereo processing over an interleaved `[L, R, L, R, ..]` buffer. The seam
/// the render tool (and any host adapter) talks to.
pub trait InterleavedProcessor {
    fn process_interleaved(&mut self, frames: &mut [f32], sample_rate: f64);
    fn latency_samples(&self) -> usize;
}

pub struct HostProcessor {
    // Parameter targets; setters clamp, smoothers glide toward these.
    width_target: f32,
    dyn_width_target: f32,
    transient_sens_target: f32,
    mid_tilt_target: f32,
    side_air_freq_target: f32,
    side_air_gain_target: f32,
    low_anchor_target: f32,
    dirt_target: f32,
    ceiling_db_target: f32,
    limiter_release_target_ms: f32,
    limiter_lookahead_target_ms: f32,
    limiter_tilt_target: f32,
    limiter_mix_target: f32,
    limiter_link_target: LinkMode,
    limiter_bypass_target: bool,
    out_trim_db_target: f32,

    width_sm: ParamSmoother,
    dyn_width_sm: ParamSmoother,
    transient_sm: ParamSmoother,
    mid_tilt_sm: ParamSmoother,
    side_air_freq_sm: ParamSmoother,
    side_air_gain_sm: ParamSmoother,
    low_anchor_sm: ParamSmoother,
    dirt_sm: ParamSmoother,
    ceiling_sm: ParamSmoother,
    limiter_release_sm: ParamSmoother,
    limiter_lookahead_sm: ParamSmoother,
    limiter_tilt_sm: ParamSmoother,
    limiter_mix_sm: ParamSmoother,
    out_trim_sm: ParamSmoother,

    ms: MsMatrix,
    mid_tilt: TiltEq,
    side_air: AirEq,
    detector: TransientDetector,
    dyn_width: DynWidth,
    limiter: LookaheadLimiter,
    soft_sat: SoftSaturation,

    // Deinterleave scratch, sized at construction and prepare_to_play.
    scratch_l: Vec<f32>,
    scratch_r: Vec<f32>,

    meters: Arc<Meters>,
    telemetry_width: f32,
    telemetry_transient: f32,
    telemetry_limiter_gain: f32,
    limiter_telemetry: LimiterTelemetry,

    sample_rate: f64,
    block_size: usize,
}

impl Default for HostProcessor {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_RATE, DEFAULT_BLOCK_SIZE)
    }
}

impl HostProcessor {
    pub fn new(sample_rate: f64, block_size: usize) -> Self {
        let sample_rate = if sample_rate > 0.0 {
            sample_rate
        } else {
            DEFAULT_SAMPLE_RATE
        };
        let block_size = if block_size > 0 {
            block_size
        } else {
            DEFAULT_BLOCK_SIZE
        };
        let sr = sample_rate as f32;

        let mut p = Self {
            width_target: 0.6,
            dyn_width_target: 0.35,
            transient_sens_target: 0.5,
            mid_tilt_target: 0.0,
            side_air_freq_target: 10000.0,
            side_air_gain_target: 2.0,
            low_anchor_target: 100.0,
            dirt_target: 0.1,
            ceiling_db_target: -1.0,
            limiter_release_target_ms: 80.0,
            limiter_lookahead_target_ms: 5.8,
            limiter_tilt_target: 0.0,
            limiter_mix_target: 0.7,
            limiter_link_target: LinkMode::Linked,
            limiter_bypass_target: false,
            out_trim_db_target: 0.0,

            width_sm: ParamSmoother::new(1.0),
            dyn_width_sm: ParamSmoother::new(1.0),
            transient_sm: ParamSmoother::new(1.0),
            mid_tilt_sm: ParamSmoother::new(1.0),
            side_air_freq_sm: ParamSmoother::new(1.0),
            side_air_gain_sm: ParamSmoother::new(1.0),
            low_anchor_sm: ParamSmoother::new(1.0),
            dirt_sm: ParamSmoother::new(1.0),
            ceiling_sm: ParamSmoother::new(1.0),
            limiter_release_sm: ParamSmoother::new(1.0),
            limiter_lookahead_sm: ParamSmoother::new(1.0),
            limiter_tilt_sm: ParamSmoother::new(1.0),
            limiter_mix_sm: ParamSmoother::new(1.0),
            out_trim_sm: ParamSmoother::new(1.0),

            ms: MsMatrix,
            mid_tilt: TiltEq::new(sr),
            side_air: AirEq::new(sr),
            detector: TransientDetector::new(sr),
            dyn_width: DynWidth::new(sr),
            limiter: LookaheadLimiter::new(sr),
            soft_sat: SoftSaturation::new(),

            scratch_l: vec![0.0; block_size],
            scratch_r: vec![0.0; block_size],

            meters: Arc::new(Meters::new()),
            telemetry_width: 0.6,
            telemetry_transient: 0.0,
            telemetry_limiter_gain: 1.0,
            limiter_telemetry: LimiterTelemetry::default(),

            sample_rate,
            block_size,
        };

        p.refresh_smoothers();
        p.reset_smoothers_to_targets();

        p.dyn_width.set_base_width(p.width_target);
        p.dyn_width.set_dyn_amount(p.dyn_width_target);
        p.dyn_width.set_low_anchor_hz(p.low_anchor_target);
        p.detector.set_sensitivity(p.transient_sens_target);
        p.mid_tilt.set_tilt_db_per_oct(p.mid_tilt_target);
        p.side_air
            .set_freq_and_gain(p.side_air_freq_target, p.side_air_gain_target);
        p.soft_sat.set_amount(p.dirt_target);
        p.limiter.set_ceiling_db(p.ceiling_db_target);
        p.limiter.set_release_ms(p.limiter_release_target_ms);
        p.limiter.set_lookahead_ms(p.limiter_lookahead_target_ms);
        p.limiter
            .set_detector_tilt_db_per_oct(p.limiter_tilt_target);
        p.limiter.set_link_mode(p.limiter_link_target);
        p.limiter.set_mix(p.limiter_mix_target);
        p
    }

    /// Full reconfiguration: retunes everything and clears continuity state.
    pub fn prepare_to_play(&mut self, sample_rate: f64, block_size: usize) {
        self.update_for_sample_rate(sample_rate, block_size, true);
    }

    fn update_for_sample_rate(&mut self, sample_rate: f64, block_size: usize, reset_state: bool) {
        let desired_rate = if sample_rate > 0.0 {
            sample_rate
        } else {
            self.sample_rate
        };
        let desired_block = if block_size > 0 {
            block_size
        } else {
            self.block_size
        };

        let rate_changed = (desired_rate - self.sample_rate).abs() > 1e-6;
        let block_changed = desired_block != self.block_size;
        if !rate_changed && !block_changed && !reset_state {
            return;
        }

        self.sample_rate = desired_rate;
        self.block_size = desired_block;
        hz_log!(
            "retune: rate={:.0} block={} reset={}",
            self.sample_rate,
            self.block_size,
            reset_state
        );

        self.refresh_smoothers();
        if reset_state {
            self.reset_smoothers_to_targets();
            // Reconfiguration is the one place the scratch may grow.
            if self.scratch_l.len() != self.block_size {
                self.scratch_l = vec![0.0; self.block_size];
                self.scratch_r = vec![0.0; self.block_size];
            }
        }

        let sr = self.sample_rate as f32;
        self.dyn_width.set_sample_rate(sr);
        self.dyn_width.set_low_anchor_hz(self.low_anchor_target);
        self.detector.set_sample_rate(sr);
        self.mid_tilt.set_sample_rate(sr);
        self.side_air.set_sample_rate(sr);
        self.limiter.set_sample_rate(sr);
        self.limiter.set_release_ms(self.limiter_release_target_ms);
        self.limiter
            .set_lookahead_ms(self.limiter_lookahead_target_ms);
        if reset_state {
            self.dyn_width.reset();
            self.detector.reset();
            self.mid_tilt.reset();
            self.side_air.reset();
            self.limiter.reset();
        }
    }

    fn refresh_smoothers(&mut self) {
        let sr = self.sample_rate;
        let block = self.block_size;
        self.width_sm.set_time_constant_ms(PARAM_SMOOTH_MS, sr, block);
        self.dyn_width_sm
            .set_time_constant_ms(PARAM_SMOOTH_MS, sr, block);
        self.transient_sm
            .set_time_constant_ms(PARAM_SMOOTH_MS, sr, block);
        self.mid_tilt_sm
            .set_time_constant_ms(PARAM_SMOOTH_MS, sr, block);
        self.side_air_freq_sm
            .set_time_constant_ms(PARAM_SMOOTH_MS, sr, block);
        self.side_air_gain_sm
            .set_time_constant_ms(PARAM_SMOOTH_MS, sr, block);
        self.low_anchor_sm
            .set_time_constant_ms(PARAM_SMOOTH_MS, sr, block);
        self.dirt_sm.set_time_constant_ms(PARAM_SMOOTH_MS, sr, block);
        self.ceiling_sm
            .set_time_constant_ms(PARAM_SMOOTH_MS, sr, block);
        self.limiter_release_sm
            .set_time_constant_ms(PARAM_SMOOTH_MS, sr, block);
        self.limiter_lookahead_sm
            .set_time_constant_ms(PARAM_SMOOTH_MS, sr, block);
        self.limiter_tilt_sm
            .set_time_constant_ms(PARAM_SMOOTH_MS, sr, block);
        self.limiter_mix_sm
            .set_time_constant_ms(PARAM_SMOOTH_MS, sr, block);
        self.out_trim_sm
            .set_time_constant_ms(TRIM_SMOOTH_MS, sr, block);
    }

    fn reset_smoothers_to_targets(&mut self) {
        self.width_sm.reset(self.width_target);
        self.dyn_width_sm.reset(self.dyn_width_target);
        self.transient_sm.reset(self.transient_sens_target);
        self.mid_tilt_sm.reset(self.mid_tilt_target);
        self.side_air_freq_sm.reset(self.side_air_freq_target);
        self.side_air_gain_sm.reset(self.side_air_gain_target);
        self.low_anchor_sm.reset(self.low_anchor_target);
        self.dirt_sm.reset(self.dirt_target);
        self.ceiling_sm.reset(self.ceiling_db_target);
        self.limiter_release_sm.reset(self.limiter_release_target_ms);
        self.limiter_lookahead_sm
            .reset(self.limiter_lookahead_target_ms);
        self.limiter_tilt_sm.reset(self.limiter_tilt_target);
        self.limiter_mix_sm.reset(self.limiter_mix_target);
        self.out_trim_sm.reset(self.out_trim_db_target);
    }

    // -------------------------------------------------------------------------
    // Parameter targets
    // -------------------------------------------------------------------------

    pub fn set_width(&mut self, w: f32) {
        self.width_target = w.clamp(0.0, 1.0);
    }

    pub fn set_dyn_width(&mut self, a: f32) {
        self.dyn_width_target = a.clamp(0.0, 1.0);
    }

    pub fn set_transient_sens(&mut self, s: f32) {
        self.transient_sens_target = s.clamp(0.0, 1.0);
    }

    pub fn set_mid_tilt(&mut self, db_per_oct: f32) {
        self.mid_tilt_target = db_per_oct.clamp(-6.0, 6.0);
    }

    pub fn set_side_air(&mut self, freq_hz: f32, gain_db: f32) {
        self.side_air_freq_target = freq_hz.clamp(4000.0, 16000.0);
        self.side_air_gain_target = gain_db.clamp(-6.0, 6.0);
    }

    pub fn set_low_anchor(&mut self, hz: f32) {
        self.low_anchor_target = hz.clamp(40.0, 250.0);
    }

    pub fn set_dirt(&mut self, amt: f32) {
        self.dirt_target = amt.clamp(0.0, 1.0);
    }

    pub fn set_ceiling(&mut self, db: f32) {
        self.ceiling_db_target = db.clamp(-12.0, -0.1);
    }

    pub fn set_limiter_release_ms(&mut self, ms: f32) {
        self.limiter_release_target_ms = ms.clamp(20.0, 200.0);
    }

    pub fn set_limiter_lookahead_ms(&mut self, ms: f32) {
        self.limiter_lookahead_target_ms = ms.clamp(1.0, 8.0);
    }

    pub fn set_limiter_detector_tilt(&mut self, db_per_oct: f32) {
        self.limiter_tilt_target = db_per_oct.clamp(-3.0, 3.0);
    }

    pub fn set_limiter_link_mode(&mut self, mode: LinkMode) {
        self.limiter_link_target = mode;
    }

    pub fn set_limiter_mix(&mut self, m: f32) {
        self.limiter_mix_target = m.clamp(0.0, 1.0);
    }

    pub fn set_limiter_bypass(&mut self, on: bool) {
        self.limiter_bypass_target = on;
    }

    /// Macro control: the chain's wet/dry lives in the limiter stage, so this
    /// pins the limiter mix to the same value.
    pub fn set_mix(&mut self, m: f32) {
        self.limiter_mix_target = m.clamp(0.0, 1.0);
    }

    pub fn set_output_trim(&mut self, db: f32) {
        self.out_trim_db_target = db.clamp(MIN_TRIM_DB, MAX_TRIM_DB);
    }

    // -------------------------------------------------------------------------
    // Processing
    // -------------------------------------------------------------------------

    /// Copies inputs through the chain into the output slices. Frame count is
    /// the shortest of the four slices; zero frames is a no-op.
    pub fn process_block(
        &mut self,
        in_l: &[f32],
        in_r: &[f32],
        out_l: &mut [f32],
        out_r: &mut [f32],
        sample_rate: f64,
    ) {
        let frames = in_l
            .len()
            .min(in_r.len())
            .min(out_l.len())
            .min(out_r.len());
        if frames == 0 {
            return;
        }
        out_l[..frames].copy_from_slice(&in_l[..frames]);
        out_r[..frames].copy_from_slice(&in_r[..frames]);
        self.process_block_in_place(&mut out_l[..frames], &mut out_r[..frames], sample_rate);
    }

    /// Runs the chain over the buffers in place.
    pub fn process_block_in_place(&mut self, l: &mut [f32], r: &mut [f32], sample_rate: f64) {
        let frames = l.len().min(r.len());
        if frames == 0 {
            return;
        }
        self.update_for_sample_rate(sample_rate, frames, false);

        // One smoother step per block.
        let width = self.width_sm.process(self.width_target);
        let dyn_amt = self.dyn_width_sm.process(self.dyn_width_target);
        let sens = self.transient_sm.process(self.transient_sens_target);
        let mid_tilt_db = self.mid_tilt_sm.process(self.mid_tilt_target);
        let air_freq = self.side_air_freq_sm.process(self.side_air_freq_target);
        let air_gain_db = self.side_air_gain_sm.process(self.side_air_gain_target);
        let low_anchor = self.low_anchor_sm.process(self.low_anchor_target);
        let dirt_amt = self.dirt_sm.process(self.dirt_target);
        let ceiling_db = self.ceiling_sm.process(self.ceiling_db_target);
        let lim_release = self
            .limiter_release_sm
            .process(self.limiter_release_target_ms);
        let lim_look = self
            .limiter_lookahead_sm
            .process(self.limiter_lookahead_target_ms);
        let lim_tilt = self.limiter_tilt_sm.process(self.limiter_tilt_target);
        let lim_mix = self.limiter_mix_sm.process(self.limiter_mix_target);
        let out_trim_db = self.out_trim_sm.process(self.out_trim_db_target);
        let out_trim_lin = 10.0f32.powf(0.05 * out_trim_db);

        self.dyn_width.set_base_width(width);
        self.dyn_width.set_dyn_amount(dyn_amt);
        self.dyn_width.set_low_anchor_hz(low_anchor);
        self.detector.set_sensitivity(sens);
        self.mid_tilt.set_tilt_db_per_oct(mid_tilt_db);
        self.side_air.set_freq_and_gain(air_freq, air_gain_db);
        self.soft_sat.set_amount(dirt_amt);
        self.limiter.set_ceiling_db(ceiling_db);
        self.limiter.set_release_ms(lim_release);
        self.limiter.set_lookahead_ms(lim_look);
        self.limiter.set_detector_tilt_db_per_oct(lim_tilt);
        self.limiter.set_link_mode(self.limiter_link_target);
        self.limiter.set_mix(lim_mix);
        self.limiter.set_bypass(self.limiter_bypass_target);

        let mut in_peak = 0.0f32;
        let mut out_peak = 0.0f32;

        for i in 0..frames {
            let dry_l = l[i];
            let dry_r = r[i];
            in_peak = in_peak.max(dry_l.abs().max(dry_r.abs()));

            let (mut m, mut s) = self.ms.encode(dry_l, dry_r);

            m = self.mid_tilt.process_sample(m);
            s = self.side_air.process_sample(s);

            let detector_in = 0.5 * (m.abs() + s.abs());
            let activity = self.detector.process_sample(detector_in);
            self.telemetry_transient = activity;

            self.dyn_width.process_sample(m, &mut s, activity);
            self.telemetry_width = self.dyn_width.last_width();

            let (mut wet_l, mut wet_r) = self.ms.decode(m, s);

            self.limiter.process_stereo(&mut wet_l, &mut wet_r);
            self.telemetry_limiter_gain = self.limiter.gain();

            self.soft_sat.process_stereo(&mut wet_l, &mut wet_r);

            wet_l *= out_trim_lin;
            wet_r *= out_trim_lin;

            let y_l = wet_l.clamp(-OUTPUT_CLAMP, OUTPUT_CLAMP);
            let y_r = wet_r.clamp(-OUTPUT_CLAMP, OUTPUT_CLAMP);
            out_peak = out_peak.max(y_l.abs().max(y_r.abs()));
            l[i] = y_l;
            r[i] = y_r;
        }

        self.limiter_telemetry = self.limiter.finalize_block();

        self.meters.set_input_peak(in_peak);
        self.meters.set_output_peak(out_peak);
        self.meters
            .set_gain_reduction_db(self.limiter_telemetry.gain_reduction_db);
        self.meters.set_width_now(self.telemetry_width);
        self.meters.set_transient_activity(self.telemetry_transient);
        if self.limiter.clip_flag_and_clear() {
            self.meters.flag_clip();
        }
    }

    // -------------------------------------------------------------------------
    // Telemetry
    // -------------------------------------------------------------------------

    pub fn meters(&self) -> Arc<Meters> {
        Arc::clone(&self.meters)
    }

    /// Width at the end of the last processed block.
    pub fn block_width(&self) -> f32 {
        self.telemetry_width
    }

    /// Transient activity at the end of the last processed block.
    pub fn block_transient(&self) -> f32 {
        self.telemetry_transient
    }

    /// Limiter envelope gain at the end of the last block.
    pub fn limiter_gain(&self) -> f32 {
        self.telemetry_limiter_gain
    }

    pub fn limiter_gr_db(&self) -> f32 {
        self.limiter.gain_reduction_db()
    }

    pub fn limiter_telemetry(&self) -> LimiterTelemetry {
        self.limiter_telemetry
    }

    /// Sticky clip indicator for the whole chain; cleared by this read. Same
    /// latch as `meters().take_clip()`.
    pub fn clip_flag_and_clear(&self) -> bool {
        self.meters.take_clip()
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }
}

impl InterleavedProcessor for HostProcessor {
    fn process_interleaved(&mut self, frames: &mut [f32], sample_rate: f64) {
        // Deinterleave through the persistent scratch in chunks of its size;
        // no allocation here, the scratch is sized at construction and
        // prepare_to_play.
        let total = frames.len() / 2;
        let mut l = std::mem::take(&mut self.scratch_l);
        let mut r = std::mem::take(&mut self.scratch_r);
        let chunk = l.len().min(r.len());
        if chunk == 0 {
            self.scratch_l = l;
            self.scratch_r = r;
            return;
        }

        let mut offset = 0;
        while offset < total {
            let n = chunk.min(total - offset);
            for i in 0..n {
                l[i] = frames[2 * (offset + i)];
                r[i] = frames[2 * (offset + i) + 1];
            }
            self.process_block_in_place(&mut l[..n], &mut r[..n], sample_rate);
            for i in 0..n {
                frames[2 * (offset + i)] = l[i];
                frames[2 * (offset + i) + 1] = r[i];
            }
            offset += n;
        }

        self.scratch_l = l;
        self.scratch_r = r;
    }

    fn latency_samples(&self) -> usize {
        self.limiter.latency_samples()
    }
}
