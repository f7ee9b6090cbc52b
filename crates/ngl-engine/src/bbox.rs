//! Axis-aligned bounding box.

use crate::coords::Vec3;

/// Axis-aligned box kept in two equivalent forms: center + dimensions, and
/// min/max extents. Every setter recomputes the other form.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BBox {
    center: Vec3,
    width: f32,
    height: f32,
    depth: f32,
    min: Vec3,
    max: Vec3,
}

impl Default for BBox {
    /// Unit-ish box: centered on the origin, 2 × 2 × 2.
    fn default() -> Self {
        Self::new(Vec3::zero(), 2.0, 2.0, 2.0)
    }
}

impl BBox {
    pub fn new(center: Vec3, width: f32, height: f32, depth: f32) -> Self {
        let mut b = Self {
            center,
            width,
            height,
            depth,
            min: Vec3::zero(),
            max: Vec3::zero(),
        };
        b.recalculate_from_center_dims();
        b
    }

    pub fn from_extents(
        min_x: f32,
        max_x: f32,
        min_y: f32,
        max_y: f32,
        min_z: f32,
        max_z: f32,
    ) -> Self {
        let mut b = Self::default();
        b.set_extents(min_x, max_x, min_y, max_y, min_z, max_z);
        b
    }

    /// Smallest box containing every point; `None` for an empty slice.
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let (lo, hi) = rest.iter().fold((*first, *first), |(lo, hi), p| (lo.min(*p), hi.max(*p)));
        Some(Self::from_extents(lo.x, hi.x, lo.y, hi.y, lo.z, hi.z))
    }

    // ── accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn center(&self) -> Vec3 {
        self.center
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.height
    }

    #[inline]
    pub fn depth(&self) -> f32 {
        self.depth
    }

    #[inline]
    pub fn min(&self) -> Vec3 {
        self.min
    }

    #[inline]
    pub fn max(&self) -> Vec3 {
        self.max
    }

    // ── setters ───────────────────────────────────────────────────────────

    pub fn set_center(&mut self, center: Vec3) {
        self.center = center;
        self.recalculate_from_center_dims();
    }

    pub fn set_width(&mut self, width: f32) {
        self.width = width;
        self.recalculate_from_center_dims();
    }

    pub fn set_height(&mut self, height: f32) {
        self.height = height;
        self.recalculate_from_center_dims();
    }

    pub fn set_depth(&mut self, depth: f32) {
        self.depth = depth;
        self.recalculate_from_center_dims();
    }

    pub fn set_extents(
        &mut self,
        min_x: f32,
        max_x: f32,
        min_y: f32,
        max_y: f32,
        min_z: f32,
        max_z: f32,
    ) {
        self.min = Vec3::new(min_x, min_y, min_z);
        self.max = Vec3::new(max_x, max_y, max_z);
        self.recalculate_from_extents();
    }

    fn recalculate_from_center_dims(&mut self) {
        let half = Vec3::new(self.width, self.height, self.depth) * 0.5;
        self.min = self.center - half;
        self.max = self.center + half;
    }

    fn recalculate_from_extents(&mut self) {
        self.width = self.max.x - self.min.x;
        self.height = self.max.y - self.min.y;
        self.depth = self.max.z - self.min.z;
        self.center = Vec3::new(
            self.min.x + self.width / 2.0,
            self.min.y + self.height / 2.0,
            self.min.z + self.depth / 2.0,
        );
    }

    // ── geometry ──────────────────────────────────────────────────────────

    /// Corners: top face (max y) first, then bottom face, each wound
    /// `(-x,-z) (+x,-z) (+x,+z) (-x,+z)`.
    pub fn vertices(&self) -> [Vec3; 8] {
        let (lo, hi) = (self.min, self.max);
        [
            Vec3::new(lo.x, hi.y, lo.z),
            Vec3::new(hi.x, hi.y, lo.z),
            Vec3::new(hi.x, hi.y, hi.z),
            Vec3::new(lo.x, hi.y, hi.z),
            Vec3::new(lo.x, lo.y, lo.z),
            Vec3::new(hi.x, lo.y, lo.z),
            Vec3::new(hi.x, lo.y, hi.z),
            Vec3::new(lo.x, lo.y, hi.z),
        ]
    }

    /// Face normals: +Y, -Y, +X, -X, +Z, -Z.
    pub fn normals(&self) -> [Vec3; 6] {
        [
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, -1.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(-1.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(0.0, 0.0, -1.0),
        ]
    }

    /// Closed-interval containment.
    #[inline]
    pub fn contains(&self, p: Vec3) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }
}
