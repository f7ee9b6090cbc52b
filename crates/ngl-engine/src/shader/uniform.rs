use crate::coords::{Rgb, Vec2, Vec3, Viewport};

/// Value written to a shader uniform.
///
/// Matrices are column-major and uploaded without transposition.
#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    Int(i32),
    Float(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    Mat2([f32; 4]),
    Mat3([f32; 9]),
    Mat4([f32; 16]),
}

impl UniformValue {
    /// Number of `f32`/`i32` components the value occupies.
    pub fn components(&self) -> usize {
        match self {
            UniformValue::Int(_) | UniformValue::Float(_) => 1,
            UniformValue::Vec2(_) => 2,
            UniformValue::Vec3(_) => 3,
            UniformValue::Vec4(_) | UniformValue::Mat2(_) => 4,
            UniformValue::Mat3(_) => 9,
            UniformValue::Mat4(_) => 16,
        }
    }
}

impl From<i32> for UniformValue {
    fn from(v: i32) -> Self {
        UniformValue::Int(v)
    }
}

impl From<f32> for UniformValue {
    fn from(v: f32) -> Self {
        UniformValue::Float(v)
    }
}

impl From<[f32; 2]> for UniformValue {
    fn from(v: [f32; 2]) -> Self {
        UniformValue::Vec2(v)
    }
}

impl From<[f32; 3]> for UniformValue {
    fn from(v: [f32; 3]) -> Self {
        UniformValue::Vec3(v)
    }
}

impl From<[f32; 4]> for UniformValue {
    fn from(v: [f32; 4]) -> Self {
        UniformValue::Vec4(v)
    }
}

impl From<(f32, f32)> for UniformValue {
    fn from((x, y): (f32, f32)) -> Self {
        UniformValue::Vec2([x, y])
    }
}

impl From<(f32, f32, f32)> for UniformValue {
    fn from((x, y, z): (f32, f32, f32)) -> Self {
        UniformValue::Vec3([x, y, z])
    }
}

impl From<(f32, f32, f32, f32)> for UniformValue {
    fn from((x, y, z, w): (f32, f32, f32, f32)) -> Self {
        UniformValue::Vec4([x, y, z, w])
    }
}

impl From<[f32; 9]> for UniformValue {
    fn from(m: [f32; 9]) -> Self {
        UniformValue::Mat3(m)
    }
}

impl From<[f32; 16]> for UniformValue {
    fn from(m: [f32; 16]) -> Self {
        UniformValue::Mat4(m)
    }
}

impl From<[[f32; 2]; 2]> for UniformValue {
    fn from(m: [[f32; 2]; 2]) -> Self {
        UniformValue::Mat2([m[0][0], m[0][1], m[1][0], m[1][1]])
    }
}

impl From<[[f32; 3]; 3]> for UniformValue {
    fn from(m: [[f32; 3]; 3]) -> Self {
        let mut flat = [0.0; 9];
        for (i, col) in m.iter().enumerate() {
            flat[i * 3..i * 3 + 3].copy_from_slice(col);
        }
        UniformValue::Mat3(flat)
    }
}

impl From<[[f32; 4]; 4]> for UniformValue {
    fn from(m: [[f32; 4]; 4]) -> Self {
        let mut flat = [0.0; 16];
        for (i, col) in m.iter().enumerate() {
            flat[i * 4..i * 4 + 4].copy_from_slice(col);
        }
        UniformValue::Mat4(flat)
    }
}

impl From<Vec2> for UniformValue {
    fn from(v: Vec2) -> Self {
        UniformValue::Vec2(v.to_array())
    }
}

impl From<Vec3> for UniformValue {
    fn from(v: Vec3) -> Self {
        UniformValue::Vec3([v.x, v.y, v.z])
    }
}

impl From<Viewport> for UniformValue {
    fn from(v: Viewport) -> Self {
        UniformValue::Vec2([v.width, v.height])
    }
}

impl From<Rgb> for UniformValue {
    fn from(c: Rgb) -> Self {
        UniformValue::Vec3([c.r, c.g, c.b])
    }
}
