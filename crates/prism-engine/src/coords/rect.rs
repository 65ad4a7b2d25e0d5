use super::Vec2;

/// Axis-aligned rectangle in logical pixels (top-left origin).
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    #[inline]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    #[inline]
    pub fn right(self) -> f32 {
        self.origin.x + self.size.x
    }

    #[inline]
    pub fn bottom(self) -> f32 {
        self.origin.y + self.size.y
    }

    #[inline]
    pub fn center_y(self) -> f32 {
        self.origin.y + self.size.y * 0.5
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.size.x <= 0.0 || self.size.y <= 0.0
    }

    /// Half-open containment: `[min, max)`. Empty rects contain nothing.
    #[inline]
    pub fn contains(self, p: Vec2) -> bool {
        !self.is_empty()
            && p.x >= self.origin.x
            && p.y >= self.origin.y
            && p.x < self.right()
            && p.y < self.bottom()
    }

    /// Fraction of the width at which `x` lies, clamped to `[0, 1]`.
    #[inline]
    pub fn fraction_x(self, x: f32) -> f32 {
        if self.size.x <= 0.0 {
            return 0.0;
        }
        ((x - self.origin.x) / self.size.x).clamp(0.0, 1.0)
    }

    /// Corners in winding order: top-left, top-right, bottom-right, bottom-left.
    #[inline]
    pub fn corners(self) -> [Vec2; 4] {
        [
            self.origin,
            Vec2::new(self.right(), self.origin.y),
            Vec2::new(self.right(), self.bottom()),
            Vec2::new(self.origin.x, self.bottom()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(x: f32, y: f32, w: f32, h: f32) -> Rect { Rect::new(x, y, w, h) }

    // ── contains ──────────────────────────────────────────────────────────

    #[test]
    fn contains_top_left_inclusive() {
        assert!(r(0.0, 0.0, 10.0, 10.0).contains(Vec2::new(0.0, 0.0)));
    }

    #[test]
    fn contains_bottom_right_exclusive() {
        assert!(!r(0.0, 0.0, 10.0, 10.0).contains(Vec2::new(10.0, 10.0)));
    }

    #[test]
    fn empty_rect_contains_nothing() {
        assert!(!r(5.0, 5.0, 0.0, 10.0).contains(Vec2::new(5.0, 6.0)));
    }

    // ── fraction_x ────────────────────────────────────────────────────────

    #[test]
    fn fraction_x_interior() {
        assert_eq!(r(100.0, 0.0, 200.0, 10.0).fraction_x(150.0), 0.25);
    }

    #[test]
    fn fraction_x_clamps_outside() {
        let rect = r(100.0, 0.0, 200.0, 10.0);
        assert_eq!(rect.fraction_x(0.0), 0.0);
        assert_eq!(rect.fraction_x(1000.0), 1.0);
    }

    #[test]
    fn fraction_x_zero_width() {
        assert_eq!(r(100.0, 0.0, 0.0, 10.0).fraction_x(150.0), 0.0);
    }

    // ── corners ───────────────────────────────────────────────────────────

    #[test]
    fn corners_wind_clockwise_in_screen_space() {
        let c = r(1.0, 2.0, 3.0, 4.0).corners();
        assert_eq!(c[0], Vec2::new(1.0, 2.0));
        assert_eq!(c[1], Vec2::new(4.0, 2.0));
        assert_eq!(c[2], Vec2::new(4.0, 6.0));
        assert_eq!(c[3], Vec2::new(1.0, 6.0));
    }
}
