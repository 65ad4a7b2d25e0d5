use crate::coords::{Color, Rect};
use crate::input::SliderPanel;

use super::Mesh;

const TRACK_HEIGHT: f32 = 6.0;
const THUMB_SIZE: f32 = 12.0;

const TRACK_COLOR: Color = Color::new(0.15, 0.2, 0.3, 1.0);
const FILL_COLOR: Color = Color::new(0.2, 0.6, 1.0, 1.0);
const THUMB_COLOR: Color = Color::WHITE;
const ACTIVE_THUMB_COLOR: Color = Color::new(0.4, 0.6, 0.9, 1.0);

/// Builds the quads for every slider of `panel`: track, filled part, thumb.
///
/// Draw untextured; the quad UVs are not meaningful.
pub fn slider_overlay(panel: &SliderPanel) -> Mesh {
    let mut mesh = Mesh::new();
    let active = panel.active();

    for slider in panel.sliders() {
        let area = slider.track();
        if area.is_empty() {
            continue;
        }

        let cy = area.center_y();
        let track = Rect::new(area.origin.x, cy - TRACK_HEIGHT * 0.5, area.size.x, TRACK_HEIGHT);
        mesh.push_quad(track, TRACK_COLOR);

        let thumb_cx = track.origin.x + slider.normalized() * track.size.x;
        let fill_w = thumb_cx - track.origin.x;
        if fill_w > 0.0 {
            mesh.push_quad(
                Rect::new(track.origin.x, track.origin.y, fill_w, track.size.y),
                FILL_COLOR,
            );
        }

        let thumb_color = if active == Some(slider.channel()) {
            ACTIVE_THUMB_COLOR
        } else {
            THUMB_COLOR
        };
        mesh.push_quad(
            Rect::new(
                thumb_cx - THUMB_SIZE * 0.5,
                cy - THUMB_SIZE * 0.5,
                THUMB_SIZE,
                THUMB_SIZE,
            ),
            thumb_color,
        );
    }

    mesh
}
