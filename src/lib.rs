//! Horizon: a stereo image and loudness control chain.
//!
//! The signal path splits the stereo pair into mid/side, shapes tonal balance
//! with a mid tilt and a side air shelf, rides the stereo width against a
//! transient detector, then runs a lookahead limiter followed by a soft
//! saturator and output trim. [`HostProcessor`] owns the whole chain and is
//! the entry point for hosts feeding plain float buffers.

pub mod debug;
pub mod dsp;
pub mod meters;
pub mod presets;
pub mod processor;

pub use dsp::{LimiterTelemetry, LinkMode, LookaheadLimiter};
pub use meters::{gr_to_leds, Meters, GR_LED_THRESHOLDS_DB};
pub use presets::{factory_preset, factory_preset_names, HorizonParams};
pub use processor::{HostProcessor, InterleavedProcessor};
