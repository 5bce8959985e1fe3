pub mod air_eq;
pub mod dyn_width;
pub mod limiter;
pub mod ms_matrix;
pub mod saturation;
pub mod smoother;
pub mod tilt_eq;
pub mod transient;
pub mod utils;

pub use air_eq::AirEq;
pub use dyn_width::DynWidth;
pub use limiter::{LimiterTelemetry, LinkMode, LookaheadLimiter};
pub use ms_matrix::MsMatrix;
pub use saturation::SoftSaturation;
pub use smoother::ParamSmoother;
pub use tilt_eq::TiltEq;
pub use transient::TransientDetector;
