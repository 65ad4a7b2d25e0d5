//! Redraw timing.
//!
//! The render loop runs on a fixed period with no delta-time. The timer is
//! fed explicit `Instant`s so it can be driven from tests.

mod redraw_timer;

pub use redraw_timer::{FrameTick, RedrawTimer, DEFAULT_REDRAW_INTERVAL};
