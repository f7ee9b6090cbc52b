//! Indexed polygon mesh and its interleaved GPU upload.

use bytemuck::{Pod, Zeroable};
use thiserror::Error;

use crate::bbox::BBox;
use crate::coords::{Vec2, Vec3};
use crate::device::{GlContext, Primitive, TextureId};
use crate::render::{SimpleVao, VaoError, VertexArray, VertexData};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeshError {
    /// Only all-triangle meshes can be packed.
    #[error("face {face} has {corners} corners, only triangles can be packed")]
    NotTriangular { face: usize, corners: usize },

    #[error("face {face}: {attribute} index {index} out of range")]
    IndexOutOfRange {
        face: usize,
        attribute: &'static str,
        index: u32,
    },

    #[error(transparent)]
    Vao(#[from] VaoError),
}

/// Per-corner indices into the mesh attribute lists.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Face {
    pub vertex: Vec<u32>,
    pub uv: Vec<u32>,
    pub normal: Vec<u32>,
}

impl Face {
    /// Triangle with the same index for position, uv and normal.
    pub fn triangle(a: u32, b: u32, c: u32) -> Self {
        Self { vertex: vec![a, b, c], uv: vec![a, b, c], normal: vec![a, b, c] }
    }
}

/// Interleaved vertex as uploaded (32 bytes).
///
///  offset  0  position  [f32; 3]   loc 0
///  offset 12  normal    [f32; 3]   loc 1
///  offset 24  uv        [f32; 2]   loc 2
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl MeshVertex {
    pub const STRIDE: i32 = std::mem::size_of::<MeshVertex>() as i32;
}

/// Attribute lists plus faces, with an optional uploaded VAO.
#[derive(Debug, Default)]
pub struct Mesh {
    pub vertices: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub faces: Vec<Face>,
    pub texture: Option<TextureId>,
    vao: Option<SimpleVao>,
    bbox: Option<BBox>,
}

fn fetch<T: Copy>(
    list: &[T],
    indices: &[u32],
    corner: usize,
    face: usize,
    attribute: &'static str,
) -> Result<T, MeshError> {
    let index = indices.get(corner).copied().unwrap_or(u32::MAX);
    list.get(index as usize)
        .copied()
        .ok_or(MeshError::IndexOutOfRange { face, attribute, index })
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_triangular(&self) -> bool {
        self.faces.iter().all(|f| f.vertex.len() == 3)
    }

    /// Expands faces into one vertex per triangle corner.
    ///
    /// Normals and uvs are used only when the mesh has them; otherwise those
    /// components are zero. The v coordinate is flipped to `1 - v`.
    pub fn pack_vertices(&self) -> Result<Vec<MeshVertex>, MeshError> {
        if !self.is_triangular() {
            log::error!("Mesh: can only pack all-triangle data");
            let (face, corners) = self
                .faces
                .iter()
                .enumerate()
                .find_map(|(i, f)| (f.vertex.len() != 3).then_some((i, f.vertex.len())))
                .unwrap_or_default();
            return Err(MeshError::NotTriangular { face, corners });
        }

        let mut out = Vec::with_capacity(self.faces.len() * 3);
        for (fi, face) in self.faces.iter().enumerate() {
            for corner in 0..3 {
                let p = fetch(&self.vertices, &face.vertex, corner, fi, "vertex")?;
                let mut v = MeshVertex { position: p.to_array(), ..MeshVertex::default() };
                if !self.normals.is_empty() {
                    v.normal = fetch(&self.normals, &face.normal, corner, fi, "normal")?.to_array();
                }
                if !self.uvs.is_empty() {
                    let uv = fetch(&self.uvs, &face.uv, corner, fi, "uv")?;
                    v.uv = [uv.x, 1.0 - uv.y];
                }
                out.push(v);
            }
        }
        Ok(out)
    }

    /// Extents of the vertex list; `None` for an empty mesh.
    pub fn bounds(&self) -> Option<BBox> {
        BBox::from_points(&self.vertices)
    }

    /// Packs and uploads the mesh, replacing any previous VAO.
    pub fn create_vao(&mut self, gl: &mut dyn GlContext) -> Result<(), MeshError> {
        let packed = self.pack_vertices()?;

        if let Some(old) = self.vao.take() {
            log::warn!("Mesh: replacing existing VAO");
            old.release(gl);
        }

        let mut vao = SimpleVao::new(gl, Primitive::Triangles)?;
        let count = packed.len() as u32;
        vao.scoped(gl, |gl, vao| -> Result<(), VaoError> {
            vao.set_data(gl, VertexData::from_slice(&packed, count))?;
            vao.set_vertex_attribute_pointer(gl, 0, 3, MeshVertex::STRIDE, 0);
            vao.set_vertex_attribute_pointer(gl, 1, 3, MeshVertex::STRIDE, 12);
            vao.set_vertex_attribute_pointer(gl, 2, 2, MeshVertex::STRIDE, 24);
            vao.set_num_indices(count);
            Ok(())
        })?;

        log::debug!("Mesh: uploaded {count} vertices");
        self.vao = Some(vao);
        self.bbox = self.bounds();
        Ok(())
    }

    /// Box computed by the last [`create_vao`](Mesh::create_vao).
    pub fn bbox(&self) -> Option<&BBox> {
        self.bbox.as_ref()
    }

    pub fn vao(&self) -> Option<&SimpleVao> {
        self.vao.as_ref()
    }

    /// Binds the texture (if any) and draws the uploaded VAO.
    pub fn draw(&mut self, gl: &mut dyn GlContext) {
        let texture = self.texture;
        let Some(vao) = self.vao.as_mut() else { return; };
        if let Some(t) = texture {
            gl.bind_texture_2d(Some(t));
        }
        vao.scoped(gl, |gl, vao| vao.draw(gl));
    }

    pub fn release(&mut self, gl: &mut dyn GlContext) {
        if let Some(vao) = self.vao.take() {
            vao.release(gl);
        }
    }
}
