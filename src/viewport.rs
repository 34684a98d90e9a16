use glam::Vec2;

/// Logical screen width. Everything is laid out in this space.
pub const LOGICAL_WIDTH: u32 = 1280;
/// Logical screen height.
pub const LOGICAL_HEIGHT: u32 = 720;

/// Maps the fixed logical screen onto the physical surface, letterboxed and
/// centered with the aspect ratio preserved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    physical: (u32, u32),
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            physical: (width.max(1), height.max(1)),
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        *self = Self::new(width, height);
    }

    pub fn physical_size(&self) -> (u32, u32) {
        self.physical
    }

    pub fn logical_size() -> Vec2 {
        Vec2::new(LOGICAL_WIDTH as f32, LOGICAL_HEIGHT as f32)
    }

    /// Physical pixels per logical pixel.
    pub fn scale(&self) -> f32 {
        let (w, h) = self.physical;
        (w as f32 / LOGICAL_WIDTH as f32).min(h as f32 / LOGICAL_HEIGHT as f32)
    }

    /// Physical offset of the logical screen's top-left corner.
    pub fn offset(&self) -> Vec2 {
        let (w, h) = self.physical;
        let used = Self::logical_size() * self.scale();
        (Vec2::new(w as f32, h as f32) - used) * 0.5
    }

    /// Physical `(x, y, w, h)` the logical screen occupies.
    pub fn pixel_rect(&self) -> [f32; 4] {
        let o = self.offset();
        let size = Self::logical_size() * self.scale();
        [o.x, o.y, size.x, size.y]
    }

    /// Physical window position to logical screen pixels.
    pub fn to_logical(&self, x: f64, y: f64) -> Vec2 {
        (Vec2::new(x as f32, y as f32) - self.offset()) / self.scale()
    }

    /// Logical origin in units of the physical surface divided by `scale`,
    /// for layers (egui) that only apply the scale, not the offset.
    pub fn scaled_origin(&self) -> Vec2 {
        self.offset() / self.scale()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_size_is_identity() {
        let vp = Viewport::new(1280, 720);
        assert_eq!(vp.scale(), 1.0);
        assert_eq!(vp.offset(), Vec2::ZERO);
        assert_eq!(vp.to_logical(100.0, 200.0), Vec2::new(100.0, 200.0));
    }

    #[test]
    fn hidpi_scales_cursor_down() {
        let vp = Viewport::new(2560, 1440);
        assert_eq!(vp.scale(), 2.0);
        assert_eq!(vp.to_logical(1280.0, 720.0), Vec2::new(640.0, 360.0));
    }

    #[test]
    fn wide_window_is_pillarboxed() {
        let vp = Viewport::new(1920, 720);
        assert_eq!(vp.scale(), 1.0);
        assert_eq!(vp.offset(), Vec2::new(320.0, 0.0));
        assert_eq!(vp.pixel_rect(), [320.0, 0.0, 1280.0, 720.0]);
        assert_eq!(vp.to_logical(320.0, 10.0), Vec2::new(0.0, 10.0));
    }

    #[test]
    fn tall_window_is_letterboxed() {
        let vp = Viewport::new(640, 720);
        assert_eq!(vp.scale(), 0.5);
        assert_eq!(vp.offset(), Vec2::new(0.0, 180.0));
        assert_eq!(vp.scaled_origin(), Vec2::new(0.0, 360.0));
    }

    #[test]
    fn zero_size_is_clamped() {
        let vp = Viewport::new(0, 0);
        assert_eq!(vp.physical_size(), (1, 1));
        assert!(vp.scale() > 0.0);
    }
}
