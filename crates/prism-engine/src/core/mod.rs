//! Core engine-facing contracts.
//!
//! The runtime drives an [`App`] through three callbacks: a one-time setup
//! once the GPU exists, window events as they arrive, and a frame callback
//! on every redraw tick.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::{FrameCtx, SetupCtx, WindowCtx};
