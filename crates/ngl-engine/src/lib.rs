//! NGL engine crate.
//!
//! Thin OpenGL toolkit: a context abstraction, a named shader registry,
//! vertex array objects, bounding boxes, meshes, and bitmap-font text drawn
//! through a geometry shader.

pub mod device;
pub mod shader;
pub mod render;
pub mod text;

pub mod bbox;
pub mod coords;
pub mod logging;
pub mod mesh;
