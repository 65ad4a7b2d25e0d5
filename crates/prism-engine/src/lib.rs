//! Prism engine crate.
//!
//! A minimal rendering bootstrap (shader program, static buffers, fixed-rate
//! redraw) plus the host bridge an application talks to: a texture vault
//! with background loading, and pointer/slider input forwarded as typed
//! events.

pub mod device;
pub mod window;
pub mod input;
pub mod time;
pub mod core;

pub mod logging;
pub mod coords;
pub mod render;
pub mod texture;
