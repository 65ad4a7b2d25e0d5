use std::fmt;

/// Mouse button identifier.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    Other(u16),
}

impl MouseButton {
    /// Numeric button code of the legacy host protocol (`1` left, `2` middle,
    /// `3` right). Buttons the protocol cannot name map to `0`.
    pub const fn legacy_code(self) -> i32 {
        match self {
            MouseButton::Left => 1,
            MouseButton::Middle => 2,
            MouseButton::Right => 3,
            MouseButton::Other(_) => 0,
        }
    }
}

/// Phase of a pointer interaction.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum PointerPhase {
    Down,
    Move,
    /// Button released, or pointer left the surface.
    Up,
}

impl PointerPhase {
    pub const fn legacy_code(self) -> i32 {
        match self {
            PointerPhase::Down => 0,
            PointerPhase::Move => 1,
            PointerPhase::Up => 2,
        }
    }
}

/// Fixed slider channels of the simulation controls.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum SliderChannel {
    Stretch,
    Restore,
    Friction,
}

impl SliderChannel {
    pub const ALL: [SliderChannel; 3] = [
        SliderChannel::Stretch,
        SliderChannel::Restore,
        SliderChannel::Friction,
    ];

    /// Channel id on the wire.
    pub const fn id(self) -> i32 {
        match self {
            SliderChannel::Stretch => 0,
            SliderChannel::Restore => 1,
            SliderChannel::Friction => 2,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            SliderChannel::Stretch => "stretch factor",
            SliderChannel::Restore => "restore factor",
            SliderChannel::Friction => "friction",
        }
    }
}

impl fmt::Display for SliderChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Events forwarded by the host bridge.
///
/// Coordinates are surface-relative logical pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown {
        button: MouseButton,
        x: f32,
        y: f32,
    },
    PointerMove {
        x: f32,
        y: f32,
    },
    /// `button` is `None` when the pointer left the surface with nothing held.
    PointerUp {
        button: Option<MouseButton>,
        x: f32,
        y: f32,
    },
    /// `value` is normalized into `[0, 1]`.
    SliderChanged {
        channel: SliderChannel,
        value: f32,
    },
}

/// The numeric view of an [`InputEvent`] for hosts that still speak the
/// four-integer mouse / two-argument slider protocol.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum LegacyEvent {
    Mouse { which: i32, kind: i32, x: i32, y: i32 },
    Slider { channel: i32, value: f32 },
}

impl InputEvent {
    /// Pointer phase, or `None` for slider events.
    pub fn phase(&self) -> Option<PointerPhase> {
        match self {
            InputEvent::PointerDown { .. } => Some(PointerPhase::Down),
            InputEvent::PointerMove { .. } => Some(PointerPhase::Move),
            InputEvent::PointerUp { .. } => Some(PointerPhase::Up),
            InputEvent::SliderChanged { .. } => None,
        }
    }

    pub fn legacy_code(&self) -> LegacyEvent {
        let mouse = |which: i32, phase: PointerPhase, x: f32, y: f32| LegacyEvent::Mouse {
            which,
            kind: phase.legacy_code(),
            x: x.round() as i32,
            y: y.round() as i32,
        };

        match *self {
            InputEvent::PointerDown { button, x, y } => {
                mouse(button.legacy_code(), PointerPhase::Down, x, y)
            }
            InputEvent::PointerMove { x, y } => mouse(0, PointerPhase::Move, x, y),
            InputEvent::PointerUp { button, x, y } => mouse(
                button.map_or(0, MouseButton::legacy_code),
                PointerPhase::Up,
                x,
                y,
            ),
            InputEvent::SliderChanged { channel, value } => LegacyEvent::Slider {
                channel: channel.id(),
                value,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_codes_are_zero_one_two() {
        assert_eq!(PointerPhase::Down.legacy_code(), 0);
        assert_eq!(PointerPhase::Move.legacy_code(), 1);
        assert_eq!(PointerPhase::Up.legacy_code(), 2);
    }

    #[test]
    fn button_codes_follow_dom_which() {
        assert_eq!(MouseButton::Left.legacy_code(), 1);
        assert_eq!(MouseButton::Middle.legacy_code(), 2);
        assert_eq!(MouseButton::Right.legacy_code(), 3);
        assert_eq!(MouseButton::Other(7).legacy_code(), 0);
    }

    #[test]
    fn channel_ids_follow_stacking_order() {
        let ids: Vec<i32> = SliderChannel::ALL.iter().map(|c| c.id()).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn leave_without_button_is_phase_two() {
        let ev = InputEvent::PointerUp { button: None, x: 10.4, y: 20.6 };
        assert_eq!(
            ev.legacy_code(),
            LegacyEvent::Mouse { which: 0, kind: 2, x: 10, y: 21 }
        );
    }

    #[test]
    fn slider_event_keeps_normalized_value() {
        let ev = InputEvent::SliderChanged { channel: SliderChannel::Friction, value: 0.8 };
        assert_eq!(ev.phase(), None);
        assert_eq!(ev.legacy_code(), LegacyEvent::Slider { channel: 2, value: 0.8 });
    }
}
