//! Geometry and color primitives.
//!
//! CPU space is logical pixels, origin top-left, +X right, +Y down. The mesh
//! shader converts to NDC with a viewport uniform.

mod color;
mod rect;
mod vec2;
mod viewport;

pub use color::Color;
pub use rect::Rect;
pub use vec2::Vec2;
pub use viewport::Viewport;
