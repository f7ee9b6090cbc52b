//! Coordinate, geometry and colour types.
//!
//! Canonical screen space for text:
//! - pixels, origin top-left
//! - +X right, +Y down
//! - the text pen sits on the baseline
//!
//! The text geometry shader converts to NDC using the screen size uniform.

mod color;
mod vec2;
mod vec3;
mod viewport;

pub use color::Rgb;
pub use vec2::Vec2;
pub use vec3::Vec3;
pub use viewport::Viewport;
