//! Oscillator and impulse analytics for the pulse swing bot.
//!
//! Pure functions over candle slices; no I/O, no state. Insufficient
//! input (too few candles, warm-up indices) yields `None` so callers can
//! treat a data gap as a per-cycle no-op.

pub mod divergence;
pub mod impulse;
pub mod oscillator;
pub mod swing;
pub mod trend;

pub use divergence::{detect_divergence, Divergence, DivergenceKind};
pub use impulse::{detect_impulse, volume_contraction, Impulse};
pub use oscillator::{crossed_into_extreme, OscTrend, OscillatorSeries};
pub use swing::{pullback_extreme, swing_points, SwingKind, SwingPoint};
pub use trend::htf_bias;
