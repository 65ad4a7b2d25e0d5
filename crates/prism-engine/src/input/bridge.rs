use crate::coords::{Vec2, Viewport};

use super::slider::{SliderPanel, SliderRoute};
use super::state::InputState;
use super::types::{InputEvent, MouseButton};

/// Creates the event channel between the host bridge and its listener.
pub fn channel() -> (EventSender, EventReceiver) {
    let (tx, rx) = flume::unbounded();
    (EventSender(tx), EventReceiver(rx))
}

/// Sending half; cheap to clone.
#[derive(Debug, Clone)]
pub struct EventSender(flume::Sender<InputEvent>);

impl EventSender {
    /// Sends an event. Returns `false` once the receiver has been dropped;
    /// events are then discarded.
    pub fn send(&self, event: InputEvent) -> bool {
        self.0.send(event).is_ok()
    }
}

/// Receiving half.
#[derive(Debug)]
pub struct EventReceiver(flume::Receiver<InputEvent>);

impl EventReceiver {
    /// Takes every event queued so far without blocking.
    pub fn drain(&self) -> impl Iterator<Item = InputEvent> + '_ {
        self.0.try_iter()
    }

    pub fn try_recv(&self) -> Option<InputEvent> {
        self.0.try_recv().ok()
    }

    /// Waits for the next event; `None` once every sender is gone.
    pub async fn recv(&self) -> Option<InputEvent> {
        self.0.recv_async().await.ok()
    }
}

/// Routes surface pointer input through the slider panel and forwards the
/// resulting events.
#[derive(Debug)]
pub struct HostBridge {
    state: InputState,
    sliders: SliderPanel,
    sender: EventSender,
    disconnected: bool,
}

impl HostBridge {
    pub fn new(sender: EventSender, sliders: SliderPanel) -> Self {
        Self {
            state: InputState::default(),
            sliders,
            sender,
            disconnected: false,
        }
    }

    pub fn state(&self) -> &InputState {
        &self.state
    }

    pub fn sliders(&self) -> &SliderPanel {
        &self.sliders
    }

    pub fn layout(&mut self, viewport: Viewport) {
        self.sliders.layout(viewport);
    }

    /// Forwards the current slider values, as if each had just been changed.
    pub fn announce_sliders(&mut self) {
        let snapshot: Vec<InputEvent> = self.sliders.snapshot().collect();
        for ev in snapshot {
            self.send(ev);
        }
    }

    pub fn pointer_moved(&mut self, pos: Vec2) {
        let ev = self.state.pointer_moved(pos);
        self.forward(ev);
    }

    pub fn button(&mut self, button: MouseButton, pressed: bool) {
        let ev = if pressed {
            self.state.button_pressed(button)
        } else {
            self.state.button_released(button)
        };
        if let Some(ev) = ev {
            self.forward(ev);
        }
    }

    pub fn pointer_left(&mut self) {
        for ev in self.state.pointer_left() {
            self.forward(ev);
        }
    }

    pub fn focus_lost(&mut self) {
        for ev in self.state.focus_lost() {
            self.forward(ev);
        }
    }

    fn forward(&mut self, ev: InputEvent) {
        match self.sliders.route(&ev) {
            SliderRoute::Pass => self.send(ev),
            SliderRoute::Changed(changed) => self.send(changed),
            SliderRoute::Consumed => {}
        }
    }

    fn send(&mut self, ev: InputEvent) {
        log::trace!("bridge event {ev:?}");
        if !self.sender.send(ev) && !self.disconnected {
            log::warn!("input listener dropped; further events are discarded");
            self.disconnected = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{PointerPhase, SliderChannel};

    fn bridge() -> (HostBridge, EventReceiver) {
        let (tx, rx) = channel();
        let mut b = HostBridge::new(tx, SliderPanel::new());
        b.layout(Viewport::new(640.0, 480.0));
        (b, rx)
    }

    #[test]
    fn click_on_canvas_forwards_down_and_up() {
        let (mut b, rx) = bridge();
        b.pointer_moved(Vec2::new(320.0, 200.0));
        b.button(MouseButton::Left, true);
        b.button(MouseButton::Left, false);

        let phases: Vec<_> = rx.drain().filter_map(|e| e.phase()).collect();
        assert_eq!(phases, vec![PointerPhase::Move, PointerPhase::Down, PointerPhase::Up]);
    }

    #[test]
    fn slider_drag_forwards_only_the_change() {
        let (mut b, rx) = bridge();
        let y = b.sliders().slider(SliderChannel::Friction).track().center_y();

        b.pointer_moved(Vec2::new(16.0, y));
        rx.drain().for_each(drop);

        b.button(MouseButton::Left, true);
        b.pointer_moved(Vec2::new(100.0, y));
        b.pointer_moved(Vec2::new(256.0, y));
        b.button(MouseButton::Left, false);

        let events: Vec<_> = rx.drain().collect();
        assert_eq!(
            events,
            vec![InputEvent::SliderChanged { channel: SliderChannel::Friction, value: 1.0 }]
        );
    }

    fn right_presses(events: &[InputEvent]) -> (usize, usize) {
        let downs = events
            .iter()
            .filter(|e| matches!(e, InputEvent::PointerDown { button: MouseButton::Right, .. }))
            .count();
        let ups = events
            .iter()
            .filter(|e| matches!(e, InputEvent::PointerUp { button: Some(MouseButton::Right), .. }))
            .count();
        (downs, ups)
    }

    fn changed_count(events: &[InputEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, InputEvent::SliderChanged { .. }))
            .count()
    }

    /// Holds Right on the canvas, then starts a Friction drag with Left.
    fn drag_with_right_held(b: &mut HostBridge) {
        let y = b.sliders().slider(SliderChannel::Friction).track().center_y();
        b.pointer_moved(Vec2::new(320.0, 100.0));
        b.button(MouseButton::Right, true);
        b.pointer_moved(Vec2::new(100.0, y));
        b.button(MouseButton::Left, true);
    }

    #[test]
    fn other_button_released_mid_drag_still_reaches_host() {
        let (mut b, rx) = bridge();
        drag_with_right_held(&mut b);
        b.button(MouseButton::Right, false);
        b.button(MouseButton::Left, false);

        let events: Vec<_> = rx.drain().collect();
        assert_eq!(right_presses(&events), (1, 1));
        assert_eq!(changed_count(&events), 1);
        assert!(!b.state().button_down(MouseButton::Right));
    }

    #[test]
    fn other_button_pressed_mid_drag_still_reaches_host() {
        let (mut b, rx) = bridge();
        let y = b.sliders().slider(SliderChannel::Friction).track().center_y();
        b.pointer_moved(Vec2::new(100.0, y));
        b.button(MouseButton::Left, true);
        b.button(MouseButton::Right, true);
        b.button(MouseButton::Left, false);
        b.button(MouseButton::Right, false);

        let events: Vec<_> = rx.drain().collect();
        assert_eq!(right_presses(&events), (1, 1));
        assert_eq!(changed_count(&events), 1);
    }

    #[test]
    fn leaving_mid_drag_releases_every_button() {
        let (mut b, rx) = bridge();
        drag_with_right_held(&mut b);
        b.pointer_left();

        let events: Vec<_> = rx.drain().collect();
        assert_eq!(right_presses(&events), (1, 1));
        assert_eq!(changed_count(&events), 1);
        assert_eq!(b.sliders().active(), None);
    }

    #[test]
    fn focus_loss_mid_drag_releases_every_button() {
        let (mut b, rx) = bridge();
        drag_with_right_held(&mut b);
        b.focus_lost();

        let events: Vec<_> = rx.drain().collect();
        assert_eq!(right_presses(&events), (1, 1));
        assert_eq!(changed_count(&events), 1);
        assert_eq!(b.sliders().active(), None);
    }

    #[test]
    fn leave_always_reports_up() {
        let (mut b, rx) = bridge();
        b.pointer_moved(Vec2::new(300.0, 100.0));
        b.pointer_left();

        let last = rx.drain().last();
        assert_eq!(last.and_then(|e| e.phase()), Some(PointerPhase::Up));
    }

    #[test]
    fn announce_sends_every_channel_in_unit_range() {
        let (mut b, rx) = bridge();
        b.announce_sliders();

        let events: Vec<_> = rx.drain().collect();
        assert_eq!(events.len(), 3);
        for (ev, channel) in events.iter().zip(SliderChannel::ALL) {
            let InputEvent::SliderChanged { channel: c, value } = *ev else {
                panic!("unexpected {ev:?}");
            };
            assert_eq!(c, channel);
            assert!((0.0..=1.0).contains(&value));
        }
    }

    #[test]
    fn async_recv_sees_sent_event() {
        let (tx, rx) = channel();
        assert!(tx.send(InputEvent::PointerMove { x: 1.0, y: 2.0 }));
        let ev = pollster::block_on(rx.recv());
        assert_eq!(ev, Some(InputEvent::PointerMove { x: 1.0, y: 2.0 }));
    }

    #[test]
    fn send_after_receiver_dropped_reports_failure() {
        let (tx, rx) = channel();
        drop(rx);
        assert!(!tx.send(InputEvent::PointerMove { x: 0.0, y: 0.0 }));
    }
}
