use bytemuck::Pod;

use crate::device::{
    BufferId, BufferTarget, BufferUsage, GlContext, IndexType, Primitive, VertexArrayId,
};

use super::VaoError;

// ── upload descriptors ────────────────────────────────────────────────────

/// Vertex bytes plus the element count a draw should use.
#[derive(Debug, Copy, Clone)]
pub struct VertexData<'a> {
    pub data: &'a [u8],
    /// Vertices (or points) described by `data`.
    pub size: u32,
    pub usage: BufferUsage,
}

impl<'a> VertexData<'a> {
    pub fn new(data: &'a [u8], size: u32) -> Self {
        Self { data, size, usage: BufferUsage::default() }
    }

    /// Views a slice of plain-old-data vertices as bytes.
    pub fn from_slice<T: Pod>(data: &'a [T], size: u32) -> Self {
        Self::new(bytemuck::cast_slice(data), size)
    }

    pub fn with_usage(mut self, usage: BufferUsage) -> Self {
        self.usage = usage;
        self
    }
}

/// Index element types accepted by [`IndexVertexData`].
pub trait IndexElement: Pod {
    const TYPE: IndexType;
}

impl IndexElement for u8 {
    const TYPE: IndexType = IndexType::U8;
}

impl IndexElement for u16 {
    const TYPE: IndexType = IndexType::U16;
}

impl IndexElement for u32 {
    const TYPE: IndexType = IndexType::U32;
}

/// Vertex data plus an element buffer.
#[derive(Debug, Copy, Clone)]
pub struct IndexVertexData<'a> {
    pub vertices: VertexData<'a>,
    pub indices: &'a [u8],
    pub index_type: IndexType,
    pub index_count: u32,
}

impl<'a> IndexVertexData<'a> {
    pub fn new<I: IndexElement>(vertices: VertexData<'a>, indices: &'a [I]) -> Self {
        Self {
            vertices,
            indices: bytemuck::cast_slice(indices),
            index_type: I::TYPE,
            index_count: indices.len() as u32,
        }
    }
}

// ── shared state ──────────────────────────────────────────────────────────

/// Bookkeeping common to every VAO flavour.
#[derive(Debug)]
pub struct VaoState {
    id: VertexArrayId,
    mode: Primitive,
    bound: bool,
    allocated: bool,
    num_indices: u32,
}

impl VaoState {
    fn new(gl: &mut dyn GlContext, mode: Primitive) -> Result<Self, VaoError> {
        Ok(Self {
            id: gl.create_vertex_array()?,
            mode,
            bound: false,
            allocated: false,
            num_indices: 0,
        })
    }

    fn can_draw(&self, kind: &str) -> bool {
        if self.bound && self.allocated {
            true
        } else {
            log::error!("{kind}: not bound or not allocated, draw skipped");
            false
        }
    }
}

/// Common VAO surface.
///
/// Implementors expose their [`VaoState`]; binding, attribute layout and
/// index bookkeeping are provided here.
pub trait VertexArray {
    fn state(&self) -> &VaoState;
    fn state_mut(&mut self) -> &mut VaoState;

    /// Issues the draw call. Logs and does nothing unless bound and allocated.
    fn draw(&self, gl: &mut dyn GlContext);

    fn buffer_id(&self, index: usize) -> Option<BufferId>;

    #[inline]
    fn id(&self) -> VertexArrayId {
        self.state().id
    }

    #[inline]
    fn is_bound(&self) -> bool {
        self.state().bound
    }

    #[inline]
    fn is_allocated(&self) -> bool {
        self.state().allocated
    }

    fn bind(&mut self, gl: &mut dyn GlContext) {
        gl.bind_vertex_array(Some(self.state().id));
        self.state_mut().bound = true;
    }

    fn unbind(&mut self, gl: &mut dyn GlContext) {
        gl.bind_vertex_array(None);
        self.state_mut().bound = false;
    }

    /// Binds, runs `f`, unbinds.
    fn scoped<R>(
        &mut self,
        gl: &mut dyn GlContext,
        f: impl FnOnce(&mut dyn GlContext, &mut Self) -> R,
    ) -> R
    where
        Self: Sized,
    {
        self.bind(gl);
        let out = f(&mut *gl, self);
        self.unbind(gl);
        out
    }

    /// Maps buffer `index` read-write, runs `f` over its bytes and unmaps it.
    ///
    /// The buffer is left bound to the array target. `None` when the VAO has
    /// no such buffer or the driver refused the mapping.
    fn map_buffer<R>(
        &self,
        gl: &mut dyn GlContext,
        index: usize,
        f: impl FnOnce(&mut [u8]) -> R,
    ) -> Option<R>
    where
        Self: Sized,
    {
        let Some(buffer) = self.buffer_id(index) else {
            log::error!("VAO {} has no buffer {index} to map", self.id().0);
            return None;
        };
        gl.bind_buffer(BufferTarget::Array, Some(buffer));

        let mut f = Some(f);
        let mut out = None;
        let mapped = gl.map_buffer(BufferTarget::Array, &mut |bytes| {
            if let Some(f) = f.take() {
                out = Some(f(bytes));
            }
        });
        if !mapped {
            log::error!("VAO {}: failed to map buffer {index}", self.id().0);
        }
        out
    }

    /// Describes float attribute `index` of the last uploaded array buffer
    /// and enables it. `stride` and `offset` are in bytes.
    fn set_vertex_attribute_pointer(
        &mut self,
        gl: &mut dyn GlContext,
        index: u32,
        size: i32,
        stride: i32,
        offset: i32,
    ) {
        if !self.state().bound {
            log::error!("VAO not bound in set_vertex_attribute_pointer");
        }
        gl.vertex_attrib_pointer_f32(index, size, false, stride, offset);
        gl.enable_vertex_attrib_array(index);
    }

    fn set_num_indices(&mut self, count: u32) {
        self.state_mut().num_indices = count;
    }

    #[inline]
    fn num_indices(&self) -> u32 {
        self.state().num_indices
    }

    #[inline]
    fn mode(&self) -> Primitive {
        self.state().mode
    }

    fn set_mode(&mut self, mode: Primitive) {
        self.state_mut().mode = mode;
    }
}

// ── simple ────────────────────────────────────────────────────────────────

/// One array buffer, drawn with `draw_arrays`.
#[derive(Debug)]
pub struct SimpleVao {
    state: VaoState,
    buffer: BufferId,
}

impl SimpleVao {
    pub fn new(gl: &mut dyn GlContext, mode: Primitive) -> Result<Self, VaoError> {
        let state = VaoState::new(gl, mode)?;
        let buffer = gl.create_buffer()?;
        Ok(Self { state, buffer })
    }

    /// Uploads `data` and sets the draw count to `data.size`.
    pub fn set_data(
        &mut self,
        gl: &mut dyn GlContext,
        data: VertexData<'_>,
    ) -> Result<(), VaoError> {
        if !self.state.bound {
            log::error!("SimpleVao not bound");
            return Err(VaoError::NotBound("SimpleVao"));
        }
        gl.bind_buffer(BufferTarget::Array, Some(self.buffer));
        gl.buffer_data(BufferTarget::Array, data.data, data.usage);
        self.state.allocated = true;
        self.state.num_indices = data.size;
        Ok(())
    }

    pub fn release(self, gl: &mut dyn GlContext) {
        gl.delete_buffer(self.buffer);
        gl.delete_vertex_array(self.state.id);
    }
}

impl VertexArray for SimpleVao {
    fn state(&self) -> &VaoState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut VaoState {
        &mut self.state
    }

    fn draw(&self, gl: &mut dyn GlContext) {
        if self.state.can_draw("SimpleVao") {
            gl.draw_arrays(self.state.mode, 0, self.state.num_indices as i32);
        }
    }

    fn buffer_id(&self, index: usize) -> Option<BufferId> {
        (index == 0).then_some(self.buffer)
    }
}

// ── indexed ───────────────────────────────────────────────────────────────

/// Array buffer plus element buffer, drawn with `draw_elements`.
#[derive(Debug)]
pub struct IndexVao {
    state: VaoState,
    buffer: BufferId,
    index_buffer: BufferId,
    index_type: IndexType,
}

impl IndexVao {
    pub fn new(gl: &mut dyn GlContext, mode: Primitive) -> Result<Self, VaoError> {
        let state = VaoState::new(gl, mode)?;
        let buffer = gl.create_buffer()?;
        let index_buffer = gl.create_buffer()?;
        Ok(Self { state, buffer, index_buffer, index_type: IndexType::U32 })
    }

    #[inline]
    pub fn index_type(&self) -> IndexType {
        self.index_type
    }

    /// Element buffer; also reachable as `buffer_id(1)`.
    #[inline]
    pub fn index_buffer_id(&self) -> BufferId {
        self.index_buffer
    }

    /// Uploads vertices and indices; the draw count becomes the index count.
    ///
    /// An `index_count` larger than `indices` holds is clamped to what was
    /// uploaded.
    pub fn set_data(
        &mut self,
        gl: &mut dyn GlContext,
        data: IndexVertexData<'_>,
    ) -> Result<(), VaoError> {
        if !self.state.bound {
            log::error!("IndexVao not bound");
            return Err(VaoError::NotBound("IndexVao"));
        }
        let usage = data.vertices.usage;
        gl.bind_buffer(BufferTarget::Array, Some(self.buffer));
        gl.buffer_data(BufferTarget::Array, data.vertices.data, usage);
        gl.bind_buffer(BufferTarget::ElementArray, Some(self.index_buffer));
        gl.buffer_data(BufferTarget::ElementArray, data.indices, usage);

        let available = (data.indices.len() / data.index_type.size_bytes()) as u32;
        if data.index_count > available {
            log::warn!(
                "IndexVao: {} indices requested, only {available} uploaded",
                data.index_count
            );
        }
        self.state.allocated = true;
        self.state.num_indices = data.index_count.min(available);
        self.index_type = data.index_type;
        Ok(())
    }

    pub fn release(self, gl: &mut dyn GlContext) {
        gl.delete_buffer(self.buffer);
        gl.delete_buffer(self.index_buffer);
        gl.delete_vertex_array(self.state.id);
    }
}

impl VertexArray for IndexVao {
    fn state(&self) -> &VaoState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut VaoState {
        &mut self.state
    }

    fn draw(&self, gl: &mut dyn GlContext) {
        if self.state.can_draw("IndexVao") {
            let count = self.state.num_indices as i32;
            gl.draw_elements(self.state.mode, count, self.index_type, 0);
        }
    }

    /// 0 is the vertex buffer, 1 the element buffer.
    fn buffer_id(&self, index: usize) -> Option<BufferId> {
        match index {
            0 => Some(self.buffer),
            1 => Some(self.index_buffer),
            _ => None,
        }
    }
}

// ── multi-buffer ──────────────────────────────────────────────────────────

/// Any number of array buffers (one per attribute stream).
///
/// Buffer 0 determines the draw count.
#[derive(Debug)]
pub struct MultiBufferVao {
    state: VaoState,
    buffers: Vec<BufferId>,
}

impl MultiBufferVao {
    pub fn new(gl: &mut dyn GlContext, mode: Primitive) -> Result<Self, VaoError> {
        Ok(Self { state: VaoState::new(gl, mode)?, buffers: Vec::new() })
    }

    #[inline]
    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    /// Uploads into buffer `index`, or a new buffer when `index` is `None`.
    ///
    /// Buffers up to `index` are created on demand.
    pub fn set_data(
        &mut self,
        gl: &mut dyn GlContext,
        data: VertexData<'_>,
        index: Option<usize>,
    ) -> Result<(), VaoError> {
        if !self.state.bound {
            log::error!("MultiBufferVao not bound");
            return Err(VaoError::NotBound("MultiBufferVao"));
        }
        let index = index.unwrap_or(self.buffers.len());
        while self.buffers.len() <= index {
            self.buffers.push(gl.create_buffer()?);
        }

        gl.bind_buffer(BufferTarget::Array, Some(self.buffers[index]));
        gl.buffer_data(BufferTarget::Array, data.data, data.usage);
        self.state.allocated = true;
        if index == 0 {
            self.state.num_indices = data.size;
        }
        Ok(())
    }

    pub fn release(self, gl: &mut dyn GlContext) {
        for b in self.buffers {
            gl.delete_buffer(b);
        }
        gl.delete_vertex_array(self.state.id);
    }
}

impl VertexArray for MultiBufferVao {
    fn state(&self) -> &VaoState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut VaoState {
        &mut self.state
    }

    fn draw(&self, gl: &mut dyn GlContext) {
        if self.state.can_draw("MultiBufferVao") {
            gl.draw_arrays(self.state.mode, 0, self.state.num_indices as i32);
        }
    }

    fn buffer_id(&self, index: usize) -> Option<BufferId> {
        self.buffers.get(index).copied()
    }
}
