use crate::coords::{Rect, Vec2, Viewport};

use super::types::{InputEvent, MouseButton, SliderChannel};

/// Raw slider range. Values move in whole steps and are forwarded divided
/// by this, so listeners always see `[0, 1]`.
const RANGE_MAX: f32 = 100.0;

const PANEL_MARGIN: f32 = 16.0;
const PANEL_WIDTH: f32 = 240.0;
const ROW_HEIGHT: f32 = 24.0;

/// A horizontal slider bound to one channel.
#[derive(Debug, Clone)]
pub struct Slider {
    channel: SliderChannel,
    /// Raw value in `0..=RANGE_MAX`, whole steps.
    value: f32,
    /// Hit area; the drawn track is centered vertically inside it.
    track: Rect,
}

impl Slider {
    /// Creates a slider positioned at `normalized` (clamped to `[0, 1]`).
    pub fn new(channel: SliderChannel, normalized: f32) -> Self {
        Self {
            channel,
            value: (normalized.clamp(0.0, 1.0) * RANGE_MAX).round(),
            track: Rect::default(),
        }
    }

    pub fn channel(&self) -> SliderChannel {
        self.channel
    }

    /// Value in `[0, 1]`.
    pub fn normalized(&self) -> f32 {
        self.value / RANGE_MAX
    }

    pub fn track(&self) -> Rect {
        self.track
    }

    fn set_from_x(&mut self, x: f32) {
        self.value = (self.track.fraction_x(x) * RANGE_MAX).round();
    }

    fn changed_event(&self) -> InputEvent {
        InputEvent::SliderChanged {
            channel: self.channel,
            value: self.normalized(),
        }
    }
}

/// Outcome of offering a pointer event to the slider panel.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum SliderRoute {
    /// Not a slider interaction; forward the event unchanged.
    Pass,
    /// Swallowed by a slider drag in progress.
    Consumed,
    /// A drag was released; forward this `SliderChanged` instead.
    Changed(InputEvent),
}

/// The three simulation sliders, stacked in the bottom-left corner.
///
/// A primary-button press on a track starts a drag owned by that slider.
/// While it lasts moves and primary-button events are consumed; other
/// buttons pass through. The value is committed (and `SliderChanged`
/// emitted) once, on primary release.
#[derive(Debug, Clone)]
pub struct SliderPanel {
    sliders: [Slider; 3],
    active: Option<usize>,
}

impl SliderPanel {
    /// Starting values of the stretch, restore and friction channels.
    pub const DEFAULT_VALUES: [f32; 3] = [0.7, 0.3, 0.8];

    pub fn new() -> Self {
        Self::with_values(Self::DEFAULT_VALUES)
    }

    /// Creates a panel with normalized starting values in channel-id order.
    pub fn with_values(values: [f32; 3]) -> Self {
        let [stretch, restore, friction] = values;
        Self {
            sliders: [
                Slider::new(SliderChannel::Stretch, stretch),
                Slider::new(SliderChannel::Restore, restore),
                Slider::new(SliderChannel::Friction, friction),
            ],
            active: None,
        }
    }

    /// Re-anchors the sliders for a new viewport size.
    pub fn layout(&mut self, viewport: Viewport) {
        let width = PANEL_WIDTH.min(viewport.width - 2.0 * PANEL_MARGIN).max(0.0);
        let rows = self.sliders.len() as f32;
        let top = viewport.height - PANEL_MARGIN - rows * ROW_HEIGHT;

        for (i, slider) in self.sliders.iter_mut().enumerate() {
            let y = top + i as f32 * ROW_HEIGHT;
            slider.track = Rect::new(PANEL_MARGIN, y, width, ROW_HEIGHT);
        }
    }

    pub fn sliders(&self) -> &[Slider] {
        &self.sliders
    }

    pub fn slider(&self, channel: SliderChannel) -> &Slider {
        &self.sliders[channel.id() as usize]
    }

    /// Channel of the slider currently being dragged.
    pub fn active(&self) -> Option<SliderChannel> {
        self.active.map(|i| self.sliders[i].channel)
    }

    /// Current values as `SliderChanged` events, for announcing the initial
    /// state to a freshly connected listener.
    pub fn snapshot(&self) -> impl Iterator<Item = InputEvent> + '_ {
        self.sliders.iter().map(Slider::changed_event)
    }

    pub fn route(&mut self, event: &InputEvent) -> SliderRoute {
        let Some(i) = self.active else {
            return match *event {
                InputEvent::PointerDown { button: MouseButton::Left, x, y } => {
                    self.begin_drag(Vec2::new(x, y))
                }
                _ => SliderRoute::Pass,
            };
        };

        match *event {
            InputEvent::PointerMove { x, .. } => {
                self.sliders[i].set_from_x(x);
                SliderRoute::Consumed
            }
            InputEvent::PointerUp { button: Some(MouseButton::Left) | None, x, .. } => {
                self.active = None;
                let slider = &mut self.sliders[i];
                slider.set_from_x(x);
                log::debug!("slider {} -> {:.2}", slider.channel, slider.normalized());
                SliderRoute::Changed(slider.changed_event())
            }
            InputEvent::PointerDown { button: MouseButton::Left, .. } => SliderRoute::Consumed,
            // Other buttons keep their own down/up pairing with the host.
            InputEvent::PointerDown { .. }
            | InputEvent::PointerUp { .. }
            | InputEvent::SliderChanged { .. } => SliderRoute::Pass,
        }
    }

    fn begin_drag(&mut self, pos: Vec2) -> SliderRoute {
        let Some(i) = self.sliders.iter().position(|s| s.track.contains(pos)) else {
            return SliderRoute::Pass;
        };
        self.active = Some(i);
        self.sliders[i].set_from_x(pos.x);
        SliderRoute::Consumed
    }
}

impl Default for SliderPanel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel() -> SliderPanel {
        let mut p = SliderPanel::new();
        p.layout(Viewport::new(640.0, 480.0));
        p
    }

    fn down(x: f32, y: f32) -> InputEvent {
        InputEvent::PointerDown { button: MouseButton::Left, x, y }
    }

    fn up(x: f32, y: f32) -> InputEvent {
        InputEvent::PointerUp { button: Some(MouseButton::Left), x, y }
    }

    #[test]
    fn defaults_match_simulation_values() {
        let p = SliderPanel::new();
        assert_eq!(p.slider(SliderChannel::Stretch).normalized(), 0.7);
        assert_eq!(p.slider(SliderChannel::Restore).normalized(), 0.3);
        assert_eq!(p.slider(SliderChannel::Friction).normalized(), 0.8);
    }

    #[test]
    fn layout_stacks_rows_above_bottom_margin() {
        let p = panel();
        let tracks: Vec<Rect> = p.sliders().iter().map(Slider::track).collect();
        assert_eq!(tracks[0], Rect::new(16.0, 392.0, 240.0, 24.0));
        assert_eq!(tracks[2].bottom(), 464.0);
    }

    #[test]
    fn press_outside_tracks_passes_through() {
        let mut p = panel();
        assert_eq!(p.route(&down(320.0, 100.0)), SliderRoute::Pass);
        assert_eq!(p.active(), None);
    }

    #[test]
    fn drag_is_consumed_and_commits_on_release() {
        let mut p = panel();
        let y = p.slider(SliderChannel::Restore).track().center_y();

        assert_eq!(p.route(&down(20.0, y)), SliderRoute::Consumed);
        assert_eq!(p.active(), Some(SliderChannel::Restore));
        assert_eq!(
            p.route(&InputEvent::PointerMove { x: 100.0, y }),
            SliderRoute::Consumed
        );

        // 16 + 0.5 * 240 = 136 → half way.
        assert_eq!(
            p.route(&up(136.0, y)),
            SliderRoute::Changed(InputEvent::SliderChanged {
                channel: SliderChannel::Restore,
                value: 0.5,
            })
        );
        assert_eq!(p.active(), None);
    }

    #[test]
    fn release_beyond_track_clamps_to_unit_range() {
        let mut p = panel();
        let y = p.slider(SliderChannel::Friction).track().center_y();
        p.route(&down(30.0, y));

        let SliderRoute::Changed(InputEvent::SliderChanged { value, .. }) = p.route(&up(9000.0, y))
        else {
            panic!("expected a committed change");
        };
        assert_eq!(value, 1.0);
    }

    #[test]
    fn leaving_surface_commits_the_drag() {
        let mut p = panel();
        let y = p.slider(SliderChannel::Stretch).track().center_y();
        p.route(&down(16.0, y));

        let route = p.route(&InputEvent::PointerUp { button: None, x: 16.0, y });
        assert_eq!(
            route,
            SliderRoute::Changed(InputEvent::SliderChanged {
                channel: SliderChannel::Stretch,
                value: 0.0,
            })
        );
    }

    #[test]
    fn right_button_does_not_start_a_drag() {
        let mut p = panel();
        let y = p.slider(SliderChannel::Stretch).track().center_y();
        let ev = InputEvent::PointerDown { button: MouseButton::Right, x: 50.0, y };
        assert_eq!(p.route(&ev), SliderRoute::Pass);
    }

    #[test]
    fn other_buttons_pass_through_an_active_drag() {
        let mut p = panel();
        let y = p.slider(SliderChannel::Stretch).track().center_y();
        p.route(&down(50.0, y));

        let right_down = InputEvent::PointerDown { button: MouseButton::Right, x: 60.0, y };
        let right_up = InputEvent::PointerUp { button: Some(MouseButton::Right), x: 60.0, y };
        assert_eq!(p.route(&right_down), SliderRoute::Pass);
        assert_eq!(p.route(&right_up), SliderRoute::Pass);
        assert_eq!(p.active(), Some(SliderChannel::Stretch));

        let left_up = InputEvent::PointerUp { button: Some(MouseButton::Left), x: 60.0, y };
        assert!(matches!(p.route(&left_up), SliderRoute::Changed(_)));
        assert_eq!(p.active(), None);
    }

    #[test]
    fn values_are_quantized_to_whole_steps() {
        let s = Slider::new(SliderChannel::Stretch, 0.123_4);
        assert_eq!(s.normalized(), 0.12);
    }
}
