/// Framebuffer size in pixels, fed to the text shader as `u_screenSize`.
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

    /// Viewport from an integer framebuffer size (e.g. a window's physical size).
    #[inline]
    pub fn from_pixels(width: u32, height: u32) -> Self {
        Self::new(width as f32, height as f32)
    }

    /// A zero or non-finite dimension would divide by zero in the NDC transform.
    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_size_is_invalid() {
        assert!(!Viewport::new(0.0, 600.0).is_valid());
        assert!(Viewport::from_pixels(800, 600).is_valid());
    }
}
