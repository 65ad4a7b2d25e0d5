use winit::dpi::PhysicalSize;

/// Viewport size in logical pixels; the basis for the pixel → NDC mapping.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Logical viewport of a surface with the given physical size and scale factor.
    pub fn from_physical(size: PhysicalSize<u32>, scale_factor: f64) -> Self {
        let logical = size.to_logical::<f64>(scale_factor);
        Self::new(logical.width as f32, logical.height as f32)
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_physical_divides_by_scale() {
        let vp = Viewport::from_physical(PhysicalSize::new(1280, 960), 2.0);
        assert_eq!(vp, Viewport::new(640.0, 480.0));
        assert!(vp.is_valid());
    }

    #[test]
    fn zero_sized_viewport_is_invalid() {
        assert!(!Viewport::new(0.0, 480.0).is_valid());
        assert!(!Viewport::new(f32::INFINITY, 480.0).is_valid());
    }
}
