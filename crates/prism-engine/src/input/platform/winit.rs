use winit::dpi::PhysicalPosition;
use winit::event::{ElementState, MouseButton as WinitMouseButton, WindowEvent};
use winit::window::Window;

use crate::coords::{Vec2, Viewport};
use crate::input::{HostBridge, MouseButton};

impl HostBridge {
    /// Feeds one winit window event into the bridge.
    ///
    /// Events the bridge does not care about are ignored.
    pub fn handle_window_event(&mut self, window: &Window, event: &WindowEvent) {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.pointer_moved(to_logical(window, *position));
            }

            WindowEvent::MouseInput { state, button, .. } => {
                self.button(map_mouse_button(*button), *state == ElementState::Pressed);
            }

            WindowEvent::CursorLeft { .. } => self.pointer_left(),

            WindowEvent::Focused(false) => self.focus_lost(),

            WindowEvent::Resized(size) => {
                self.layout(Viewport::from_physical(*size, window.scale_factor()));
            }

            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                self.layout(Viewport::from_physical(window.inner_size(), *scale_factor));
            }

            _ => {}
        }
    }
}

/// Surface-relative logical position. winit already reports cursor
/// positions relative to the client area.
fn to_logical(window: &Window, pos: PhysicalPosition<f64>) -> Vec2 {
    let logical = pos.to_logical::<f64>(window.scale_factor());
    Vec2::new(logical.x as f32, logical.y as f32)
}

fn map_mouse_button(b: WinitMouseButton) -> MouseButton {
    match b {
        WinitMouseButton::Left => MouseButton::Left,
        WinitMouseButton::Right => MouseButton::Right,
        WinitMouseButton::Middle => MouseButton::Middle,
        WinitMouseButton::Back => MouseButton::Other(3),
        WinitMouseButton::Forward => MouseButton::Other(4),
        WinitMouseButton::Other(v) => MouseButton::Other(v),
    }
}
