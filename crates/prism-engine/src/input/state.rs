use crate::coords::Vec2;

use super::types::{InputEvent, MouseButton};

/// Pointer state for the surface.
///
/// Button events from the window system carry no coordinates, so the last
/// known pointer position is tracked here and stamped onto them. Held
/// buttons are tracked so leaving the surface can release them.
#[derive(Debug, Default)]
pub struct InputState {
    /// Pointer position in logical pixels; `None` while outside the surface.
    pub pointer_pos: Option<Vec2>,

    /// Currently held buttons, in press order.
    pub buttons_down: Vec<MouseButton>,
}

impl InputState {
    fn position(&self) -> Vec2 {
        self.pointer_pos.unwrap_or_default()
    }

    pub fn button_down(&self, button: MouseButton) -> bool {
        self.buttons_down.contains(&button)
    }

    pub fn pointer_moved(&mut self, pos: Vec2) -> InputEvent {
        self.pointer_pos = Some(pos);
        InputEvent::PointerMove { x: pos.x, y: pos.y }
    }

    /// Returns `None` for a repeated press of a button already held.
    pub fn button_pressed(&mut self, button: MouseButton) -> Option<InputEvent> {
        if self.button_down(button) {
            return None;
        }
        self.buttons_down.push(button);

        let Vec2 { x, y } = self.position();
        Some(InputEvent::PointerDown { button, x, y })
    }

    /// Returns `None` for a release of a button that was never pressed here
    /// (e.g. pressed outside the window, or already released by a leave).
    pub fn button_released(&mut self, button: MouseButton) -> Option<InputEvent> {
        let idx = self.buttons_down.iter().position(|b| *b == button)?;
        self.buttons_down.remove(idx);

        let Vec2 { x, y } = self.position();
        Some(InputEvent::PointerUp { button: Some(button), x, y })
    }

    /// Pointer left the surface. Always yields at least one `PointerUp`.
    pub fn pointer_left(&mut self) -> Vec<InputEvent> {
        let events = self.release_all();
        self.pointer_pos = None;
        events
    }

    /// Window lost focus; releases held buttons so none stay stuck.
    pub fn focus_lost(&mut self) -> Vec<InputEvent> {
        if self.buttons_down.is_empty() {
            return Vec::new();
        }
        self.release_all()
    }

    fn release_all(&mut self) -> Vec<InputEvent> {
        let Vec2 { x, y } = self.position();

        if self.buttons_down.is_empty() {
            return vec![InputEvent::PointerUp { button: None, x, y }];
        }

        self.buttons_down
            .drain(..)
            .map(|b| InputEvent::PointerUp { button: Some(b), x, y })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::PointerPhase;

    #[test]
    fn press_uses_last_pointer_position() {
        let mut s = InputState::default();
        s.pointer_moved(Vec2::new(12.0, 34.0));
        assert_eq!(
            s.button_pressed(MouseButton::Left),
            Some(InputEvent::PointerDown { button: MouseButton::Left, x: 12.0, y: 34.0 })
        );
    }

    #[test]
    fn repeated_press_is_ignored() {
        let mut s = InputState::default();
        assert!(s.button_pressed(MouseButton::Right).is_some());
        assert!(s.button_pressed(MouseButton::Right).is_none());
        assert_eq!(s.buttons_down, vec![MouseButton::Right]);
    }

    #[test]
    fn release_of_unknown_button_is_ignored() {
        let mut s = InputState::default();
        assert!(s.button_released(MouseButton::Left).is_none());
    }

    #[test]
    fn leave_releases_every_held_button() {
        let mut s = InputState::default();
        s.pointer_moved(Vec2::new(5.0, 5.0));
        s.button_pressed(MouseButton::Left);
        s.button_pressed(MouseButton::Middle);

        let events = s.pointer_left();
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.phase() == Some(PointerPhase::Up)));
        assert!(s.buttons_down.is_empty());
        assert!(s.pointer_pos.is_none());
    }

    #[test]
    fn leave_with_nothing_held_still_reports_up() {
        let mut s = InputState::default();
        s.pointer_moved(Vec2::new(1.0, 2.0));
        assert_eq!(
            s.pointer_left(),
            vec![InputEvent::PointerUp { button: None, x: 1.0, y: 2.0 }]
        );
    }

    #[test]
    fn focus_loss_with_nothing_held_is_silent() {
        let mut s = InputState::default();
        assert!(s.focus_lost().is_empty());
    }
}
