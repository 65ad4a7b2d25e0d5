//! Input bridge.
//!
//! Pointer and slider input is turned into typed [`InputEvent`]s and pushed
//! through a channel to whoever drives the simulation. The public API does
//! not expose winit types; `platform::winit` does the translation.

mod bridge;
mod platform;
mod slider;
mod state;
mod types;

pub use bridge::{channel, EventReceiver, EventSender, HostBridge};
pub use slider::{Slider, SliderPanel, SliderRoute};
pub use state::InputState;
pub use types::{InputEvent, LegacyEvent, MouseButton, PointerPhase, SliderChannel};
