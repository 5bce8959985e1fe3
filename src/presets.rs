//! Parameter snapshots and baked-in factory flavors.
//!
//! [`HorizonParams`] is the full serializable parameter set; a snapshot can be
//! pushed onto a [`HostProcessor`](crate::HostProcessor) in one call. The
//! factory flavors live in `presets.json` at the crate root and are compiled
//! in with `include_str!`, so loading is fallible but never fatal.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::dsp::LinkMode;
use crate::processor::HostProcessor;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HorizonParams {
    pub width: f32,
    pub dyn_width: f32,
    pub transient_sens: f32,
    pub mid_tilt_db_per_oct: f32,
    pub side_air_freq_hz: f32,
    pub side_air_gain_db: f32,
    pub low_anchor_hz: f32,
    pub dirt_amount: f32,
    pub ceiling_db: f32,
    pub limiter_release_ms: f32,
    pub limiter_lookahead_ms: f32,
    pub limiter_tilt_db_per_oct: f32,
    pub limiter_link: LinkMode,
    pub limiter_mix: f32,
    pub limiter_bypass: bool,
    pub mix: f32,
    pub output_trim_db: f32,
}

impl Default for HorizonParams {
    fn default() -> Self {
        Self {
            width: 0.6,
            dyn_width: 0.35,
            transient_sens: 0.5,
            mid_tilt_db_per_oct: 0.0,
            side_air_freq_hz: 10000.0,
            side_air_gain_db: 2.0,
            low_anchor_hz: 100.0,
            dirt_amount: 0.1,
            ceiling_db: -1.0,
            limiter_release_ms: 80.0,
            limiter_lookahead_ms: 5.8,
            limiter_tilt_db_per_oct: 0.0,
            limiter_link: LinkMode::Linked,
            limiter_mix: 0.7,
            limiter_bypass: false,
            mix: 0.6,
            output_trim_db: 0.0,
        }
    }
}

impl HorizonParams {
    /// Pushes every field onto the processor's parameter targets. Values glide
    /// in over the smoothing window rather than snapping.
    pub fn apply_to(&self, p: &mut HostProcessor) {
        p.set_width(self.width);
        p.set_dyn_width(self.dyn_width);
        p.set_transient_sens(self.transient_sens);
        p.set_mid_tilt(self.mid_tilt_db_per_oct);
        p.set_side_air(self.side_air_freq_hz, self.side_air_gain_db);
        p.set_low_anchor(self.low_anchor_hz);
        p.set_dirt(self.dirt_amount);
        p.set_ceiling(self.ceiling_db);
        p.set_limiter_release_ms(self.limiter_release_ms);
        p.set_limiter_lookahead_ms(self.limiter_lookahead_ms);
        p.set_limiter_detector_tilt(self.limiter_tilt_db_per_oct);
        p.set_limiter_link_mode(self.limiter_link);
        p.set_limiter_mix(self.limiter_mix);
        p.set_limiter_bypass(self.limiter_bypass);
        p.set_mix(self.mix);
        p.set_output_trim(self.output_trim_db);
    }
}

/// Factory flavor names, in the order a menu would present them.
pub const FACTORY_FLAVOR_ORDER: [&str; 6] = [
    "light",
    "mid",
    "heavy",
    "kitchen_sink",
    "tilt_air_extremes",
    "link_toggle_scope",
];

static FACTORY_PRESETS: Lazy<HashMap<String, HorizonParams>> = Lazy::new(|| {
    let raw = include_str!("../presets.json");
    match serde_json::from_str::<HashMap<String, HorizonParams>>(raw) {
        Ok(map) => map,
        Err(e) => {
            log::warn!("factory presets failed to parse: {}", e);
            HashMap::new()
        }
    }
});

pub fn factory_preset(name: &str) -> Option<HorizonParams> {
    FACTORY_PRESETS.get(name).copied()
}

pub fn factory_preset_names() -> Vec<&'static str> {
    FACTORY_FLAVOR_ORDER
        .iter()
        .copied()
        .filter(|name| FACTORY_PRESETS.contains_key(*name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_round_trip_through_json() {
        let p = HorizonParams::default();
        let json = serde_json::to_string(&p).unwrap();
        let back: HorizonParams = serde_json::from_str(&json).unwrap();
        assert_eq!(p, back);
    }

    #[test]
    fn partial_json_fills_missing_fields_with_defaults() {
        let back: HorizonParams = serde_json::from_str(r#"{"width": 0.9}"#).unwrap();
        assert_eq!(back.width, 0.9);
        assert_eq!(back.ceiling_db, HorizonParams::default().ceiling_db);
    }

    #[test]
    fn all_factory_flavors_parse() {
        let names = factory_preset_names();
        assert_eq!(names.len(), FACTORY_FLAVOR_ORDER.len());
        for name in names {
            let p = factory_preset(name).unwrap();
            assert!(p.width >= 0.0 && p.width <= 1.0);
            assert!(p.ceiling_db <= -0.1 && p.ceiling_db >= -12.0);
        }
    }

    #[test]
    fn heavy_flavor_uses_mid_side_link() {
        let p = factory_preset("heavy").unwrap();
        assert_eq!(p.limiter_link, LinkMode::MidSide);
    }

    #[test]
    fn apply_pushes_values_into_the_chain() {
        let mut proc = HostProcessor::new(44100.0, 128);
        let p = factory_preset("kitchen_sink").unwrap();
        p.apply_to(&mut proc);
        // Snap smoothers to the new targets, then confirm the ceiling landed.
        proc.prepare_to_play(44100.0, 128);
        let mut l = vec![0.95f32; 128];
        let mut r = vec![0.95f32; 128];
        for _ in 0..40 {
            l.fill(0.95);
            r.fill(0.95);
            proc.process_block_in_place(&mut l, &mut r, 44100.0);
        }
        // -6 dB ceiling flavor holds hot program well below full scale.
        assert!(proc.limiter_gr_db() < -2.0);
    }
}
