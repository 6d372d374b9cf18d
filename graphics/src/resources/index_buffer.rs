//! Index buffers.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use tessel_core::mesh::IndexType;

use crate::error::GraphicsError;
use crate::types::{BufferUsage, GpuBufferFormat, GpuBufferType, GpuViewKey, IndexBufferDesc};

use super::buffer_view::{GpuBufferView, ViewCache};
use super::hardware_buffer::HardwareBuffer;

/// A buffer of 16- or 32-bit indices.
#[derive(Debug)]
pub struct IndexBuffer {
    buffer: HardwareBuffer,
    desc: IndexBufferDesc,
    views: ViewCache,
}

impl IndexBuffer {
    pub(crate) fn new(buffer: HardwareBuffer, desc: IndexBufferDesc) -> Self {
        Self {
            buffer,
            desc,
            views: ViewCache::default(),
        }
    }

    pub fn desc(&self) -> &IndexBufferDesc {
        &self.desc
    }

    pub fn index_type(&self) -> IndexType {
        self.desc.index_type
    }

    pub fn num_indices(&self) -> u32 {
        self.desc.num_indices
    }

    /// Copy a range from another index buffer.
    pub fn copy_data(
        &mut self,
        src: &IndexBuffer,
        src_offset: u64,
        dst_offset: u64,
        length: u64,
        discard_whole_buffer: bool,
    ) -> Result<(), GraphicsError> {
        self.buffer
            .copy_data(&src.buffer, src_offset, dst_offset, length, discard_whole_buffer)
    }

    /// Copy the entire contents of an equally sized index buffer.
    pub fn copy_all(&mut self, src: &IndexBuffer) -> Result<(), GraphicsError> {
        self.buffer.copy_all(&src.buffer)
    }

    /// Read-write view for compute access, typed by the index width.
    ///
    /// Requires [`BufferUsage::LOAD_STORE`].
    pub fn load_store(&self) -> Result<Arc<GpuBufferView>, GraphicsError> {
        if !self.buffer.usage().contains(BufferUsage::LOAD_STORE) {
            return Err(GraphicsError::InvalidArgument(
                "index buffer was not created with LOAD_STORE usage".to_string(),
            ));
        }

        let format = match self.desc.index_type {
            IndexType::Index16 => GpuBufferFormat::R16Uint,
            IndexType::Index32 => GpuBufferFormat::R32Uint,
        };
        let key = GpuViewKey::new(GpuBufferType::Standard, format, format.size());
        let num_elements = self.desc.num_indices;
        Ok(self
            .views
            .get_or_create(key, || GpuBufferView::new(&self.buffer, key, num_elements, true)))
    }

    /// Number of live views.
    pub fn view_count(&self) -> usize {
        self.views.live_count()
    }
}

impl Deref for IndexBuffer {
    type Target = HardwareBuffer;

    fn deref(&self) -> &HardwareBuffer {
        &self.buffer
    }
}

impl DerefMut for IndexBuffer {
    fn deref_mut(&mut self) -> &mut HardwareBuffer {
        &mut self.buffer
    }
}

static_assertions::assert_impl_all!(IndexBuffer: Send, Sync);
