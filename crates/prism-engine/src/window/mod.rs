//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and the single window, wires them to the GPU
//! layer and paces redraws with a fixed-interval timer.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig};
