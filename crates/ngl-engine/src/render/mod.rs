//! Vertex array objects and draw submission.
//!
//! A VAO owns its GL buffers. Uploads and attribute setup require the VAO to
//! be bound; [`VertexArray::scoped`] binds for the duration of a closure.

mod error;
mod vao;

pub use error::VaoError;
pub use vao::{
    IndexElement, IndexVao, IndexVertexData, MultiBufferVao, SimpleVao, VaoState, VertexArray,
    VertexData,
};
