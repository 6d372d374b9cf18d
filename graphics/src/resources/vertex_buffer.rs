//! Vertex buffers.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use crate::error::GraphicsError;
use crate::types::{BufferUsage, GpuBufferFormat, GpuBufferType, GpuViewKey, VertexBufferDesc};

use super::buffer_view::{GpuBufferView, ViewCache};
use super::hardware_buffer::HardwareBuffer;

/// A buffer holding one vertex stream.
///
/// Created by [`GraphicsDevice::create_vertex_buffer`](crate::GraphicsDevice::create_vertex_buffer).
/// Locking, reading and writing come from the underlying [`HardwareBuffer`].
#[derive(Debug)]
pub struct VertexBuffer {
    buffer: HardwareBuffer,
    desc: VertexBufferDesc,
    views: ViewCache,
}

impl VertexBuffer {
    pub(crate) fn new(buffer: HardwareBuffer, desc: VertexBufferDesc) -> Self {
        Self {
            buffer,
            desc,
            views: ViewCache::default(),
        }
    }

    pub fn desc(&self) -> &VertexBufferDesc {
        &self.desc
    }

    pub fn vertex_size(&self) -> u32 {
        self.desc.vertex_size
    }

    pub fn num_vertices(&self) -> u32 {
        self.desc.num_verts
    }

    /// Copy a range from another vertex buffer.
    pub fn copy_data(
        &mut self,
        src: &VertexBuffer,
        src_offset: u64,
        dst_offset: u64,
        length: u64,
        discard_whole_buffer: bool,
    ) -> Result<(), GraphicsError> {
        self.buffer
            .copy_data(&src.buffer, src_offset, dst_offset, length, discard_whole_buffer)
    }

    /// Copy the entire contents of an equally sized vertex buffer.
    pub fn copy_all(&mut self, src: &VertexBuffer) -> Result<(), GraphicsError> {
        self.buffer.copy_all(&src.buffer)
    }

    /// Read-write view for compute access.
    ///
    /// Requires [`BufferUsage::LOAD_STORE`]. Views with equal format and
    /// element size are shared.
    pub fn load_store(
        &self,
        format: GpuBufferFormat,
        element_size: u32,
    ) -> Result<Arc<GpuBufferView>, GraphicsError> {
        if !self.buffer.usage().contains(BufferUsage::LOAD_STORE) {
            return Err(GraphicsError::InvalidArgument(
                "vertex buffer was not created with LOAD_STORE usage".to_string(),
            ));
        }
        if element_size == 0 {
            return Err(GraphicsError::InvalidArgument(
                "view element size cannot be zero".to_string(),
            ));
        }

        let key = GpuViewKey::new(GpuBufferType::Standard, format, element_size);
        let num_elements = (self.buffer.size() / element_size as u64) as u32;
        Ok(self
            .views
            .get_or_create(key, || GpuBufferView::new(&self.buffer, key, num_elements, true)))
    }

    /// Number of live views.
    pub fn view_count(&self) -> usize {
        self.views.live_count()
    }
}

impl Deref for VertexBuffer {
    type Target = HardwareBuffer;

    fn deref(&self) -> &HardwareBuffer {
        &self.buffer
    }
}

impl DerefMut for VertexBuffer {
    fn deref_mut(&mut self) -> &mut HardwareBuffer {
        &mut self.buffer
    }
}

static_assertions::assert_impl_all!(VertexBuffer: Send, Sync);
