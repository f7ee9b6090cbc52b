use std::iter::FusedIterator;
use std::str::Chars;

use bytemuck::{Pod, Zeroable};

use crate::coords::Vec2;

use super::FontAtlas;

/// One glyph quad, expanded from a point by the text geometry shader.
///
/// Layout (32 bytes):
///
///  offset  0  position  [f32; 2]   loc 0   glyph top-left, screen px
///  offset  8  uv_rect   [f32; 4]   loc 1   (u0, v0, u1, v1), normalized
///  offset 24  size      [f32; 2]   loc 2   bitmap (w, h), px
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct TextInstance {
    pub position: [f32; 2],
    pub uv_rect: [f32; 4],
    pub size: [f32; 2],
}

impl TextInstance {
    pub const STRIDE: i32 = std::mem::size_of::<TextInstance>() as i32;

    /// `(x, y, u0, v0, u1, v1, w, h)`.
    pub fn to_array(&self) -> [f32; 8] {
        bytemuck::cast(*self)
    }
}

/// Lazily yields one [`TextInstance`] per glyph of a string.
///
/// Characters without an atlas entry are skipped and do not move the pen.
/// Cloning restarts from the clone point.
#[derive(Debug, Clone)]
pub struct Instances<'a> {
    atlas: &'a FontAtlas,
    chars: Chars<'a>,
    pen: Vec2,
    atlas_size: (u32, u32),
}

impl Iterator for Instances<'_> {
    type Item = TextInstance;

    fn next(&mut self) -> Option<TextInstance> {
        loop {
            let ch = self.chars.next()?;
            let Some(g) = self.atlas.glyph(ch) else { continue };

            let (atlas_w, atlas_h) = self.atlas_size;
            let inst = TextInstance {
                position: self.pen.offset(g.bearing_x as f32, -(g.bearing_y as f32)).to_array(),
                uv_rect: g.uv(atlas_w, atlas_h),
                size: [g.width as f32, g.height as f32],
            };
            self.pen += Vec2::new(g.advance as f32, 0.0);
            return Some(inst);
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.chars.size_hint().1)
    }
}

impl FusedIterator for Instances<'_> {}

/// Glyph instances for `text` with the pen starting on the baseline at
/// `origin` (screen space, +Y down).
pub fn build_instances<'a>(atlas: &'a FontAtlas, text: &'a str, origin: Vec2) -> Instances<'a> {
    Instances {
        atlas,
        chars: text.chars(),
        pen: origin,
        atlas_size: (atlas.width(), atlas.height()),
    }
}

/// Collected instances, or `None` when nothing would be drawn.
pub fn collect_instances(atlas: &FontAtlas, text: &str, origin: Vec2) -> Option<Vec<TextInstance>> {
    let out: Vec<TextInstance> = build_instances(atlas, text, origin).collect();
    (!out.is_empty()).then_some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::fake::FakeRasterizer;
    use crate::text::AtlasConfig;
    use approx::assert_relative_eq;

    fn a_atlas() -> FontAtlas {
        let r = FakeRasterizer::new().with_glyph('A', 6, 9, (1, 8), 10);
        FontAtlas::build(&r, 16, &AtlasConfig::default()).unwrap()
    }

    #[test]
    fn layout_is_eight_packed_floats() {
        assert_eq!(TextInstance::STRIDE, 32);
        let inst = TextInstance {
            position: [1.0, 2.0],
            uv_rect: [3.0, 4.0, 5.0, 6.0],
            size: [7.0, 8.0],
        };
        assert_eq!(inst.to_array(), [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
    }

    // ── placement ─────────────────────────────────────────────────────────

    #[test]
    fn single_glyph_anchor_uses_bearing() {
        let atlas = a_atlas();
        let out: Vec<_> = build_instances(&atlas, "A", Vec2::zero()).collect();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].position, [1.0, -8.0]);
        assert_eq!(out[0].size, [6.0, 9.0]);
    }

    #[test]
    fn pen_advances_by_glyph_advance() {
        let atlas = a_atlas();
        let out: Vec<_> = build_instances(&atlas, "AAA", Vec2::new(100.0, 50.0)).collect();
        let xs: Vec<f32> = out.iter().map(|i| i.position[0]).collect();
        assert_eq!(xs, vec![101.0, 111.0, 121.0]);
        assert!(out.iter().all(|i| i.position[1] == 42.0));
    }

    #[test]
    fn uv_rect_matches_atlas_rect() {
        let atlas = a_atlas();
        let g = atlas.glyph('A').unwrap();
        let inst = build_instances(&atlas, "A", Vec2::zero()).next().unwrap();
        let (w, h) = (atlas.width() as f32, atlas.height() as f32);
        assert_relative_eq!(inst.uv_rect[0], g.rect.x as f32 / w);
        assert_relative_eq!(inst.uv_rect[1], g.rect.y as f32 / h);
        assert_relative_eq!(inst.uv_rect[2], (g.rect.x + 6) as f32 / w);
        assert_relative_eq!(inst.uv_rect[3], (g.rect.y + 9) as f32 / h);
    }

    // ── skipping ──────────────────────────────────────────────────────────

    #[test]
    fn unsupported_chars_do_not_move_pen() {
        let atlas = a_atlas();
        let plain: Vec<_> = build_instances(&atlas, "AA", Vec2::zero()).collect();
        let noisy: Vec<_> = build_instances(&atlas, "\tA\n\u{7f}é😀A\u{0}", Vec2::zero()).collect();
        assert_eq!(plain, noisy);
    }

    #[test]
    fn space_advances_without_bitmap() {
        let atlas = a_atlas();
        let out: Vec<_> = build_instances(&atlas, "A A", Vec2::zero()).collect();
        assert_eq!(out.len(), 3);
        assert_eq!(out[1].size, [0.0, 0.0]);
        let space = atlas.glyph(' ').unwrap().advance as f32;
        assert_eq!(out[2].position[0], 1.0 + 10.0 + space);
    }

    #[test]
    fn nothing_to_draw_is_none() {
        let atlas = a_atlas();
        assert!(collect_instances(&atlas, "", Vec2::zero()).is_none());
        assert!(collect_instances(&atlas, "\n\t€", Vec2::zero()).is_none());
        assert_eq!(collect_instances(&atlas, "A", Vec2::zero()).map(|v| v.len()), Some(1));
    }

    // ── iterator behaviour ────────────────────────────────────────────────

    #[test]
    fn clone_restarts_from_same_point() {
        let atlas = a_atlas();
        let mut it = build_instances(&atlas, "AAA", Vec2::zero());
        it.next();
        let rest: Vec<_> = it.clone().collect();
        assert_eq!(rest, it.collect::<Vec<_>>());
        assert_eq!(rest.len(), 2);
    }

    #[test]
    fn uvs_normalized_for_whole_charset() {
        let atlas = FontAtlas::build(&FakeRasterizer::new(), 40, &AtlasConfig::default()).unwrap();
        let text: String = AtlasConfig::default().chars().collect();
        for inst in build_instances(&atlas, &text, Vec2::zero()) {
            assert!(inst.uv_rect.iter().all(|c| (0.0..=1.0).contains(c)));
        }
    }
}
