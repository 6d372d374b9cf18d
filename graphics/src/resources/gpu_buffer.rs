//! Generic GPU buffers.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use crate::error::GraphicsError;
use crate::types::{BufferUsage, GpuBufferDesc, GpuBufferFormat, GpuBufferType, GpuViewKey};

use super::buffer_view::{GpuBufferView, ViewCache};
use super::hardware_buffer::HardwareBuffer;

/// A typed, structured or raw buffer bound to shaders by name.
#[derive(Debug)]
pub struct GpuBuffer {
    buffer: HardwareBuffer,
    desc: GpuBufferDesc,
    views: ViewCache,
}

impl GpuBuffer {
    pub(crate) fn new(buffer: HardwareBuffer, desc: GpuBufferDesc) -> Self {
        Self {
            buffer,
            desc,
            views: ViewCache::default(),
        }
    }

    pub fn desc(&self) -> &GpuBufferDesc {
        &self.desc
    }

    pub fn buffer_type(&self) -> GpuBufferType {
        self.desc.buffer_type
    }

    pub fn format(&self) -> GpuBufferFormat {
        self.desc.format
    }

    pub fn element_count(&self) -> u32 {
        self.desc.element_count
    }

    pub fn element_size(&self) -> u32 {
        self.desc.resolved_element_size()
    }

    /// Copy a range from another GPU buffer.
    pub fn copy_data(
        &mut self,
        src: &GpuBuffer,
        src_offset: u64,
        dst_offset: u64,
        length: u64,
        discard_whole_buffer: bool,
    ) -> Result<(), GraphicsError> {
        self.buffer
            .copy_data(&src.buffer, src_offset, dst_offset, length, discard_whole_buffer)
    }

    /// Copy the entire contents of an equally sized GPU buffer.
    pub fn copy_all(&mut self, src: &GpuBuffer) -> Result<(), GraphicsError> {
        self.buffer.copy_all(&src.buffer)
    }

    /// Default view using the buffer's own type, format and element size.
    pub fn default_view(&self) -> Arc<GpuBufferView> {
        let key = GpuViewKey::new(self.desc.buffer_type, self.desc.format, self.element_size());
        let num_elements = self.desc.element_count;
        let load_store = self.buffer.usage().contains(BufferUsage::LOAD_STORE);
        self.views
            .get_or_create(key, || GpuBufferView::new(&self.buffer, key, num_elements, load_store))
    }

    /// View reinterpreting the buffer with another layout.
    ///
    /// Read-write views require [`BufferUsage::LOAD_STORE`].
    pub fn view(
        &self,
        buffer_type: GpuBufferType,
        format: GpuBufferFormat,
        element_size: u32,
        load_store: bool,
    ) -> Result<Arc<GpuBufferView>, GraphicsError> {
        if element_size == 0 {
            return Err(GraphicsError::InvalidArgument(
                "view element size cannot be zero".to_string(),
            ));
        }
        if load_store && !self.buffer.usage().contains(BufferUsage::LOAD_STORE) {
            return Err(GraphicsError::InvalidArgument(
                "GPU buffer was not created with LOAD_STORE usage".to_string(),
            ));
        }

        let key = GpuViewKey::new(buffer_type, format, element_size);
        let num_elements = (self.buffer.size() / element_size as u64) as u32;
        Ok(self
            .views
            .get_or_create(key, || GpuBufferView::new(&self.buffer, key, num_elements, load_store)))
    }

    /// Number of live views.
    pub fn view_count(&self) -> usize {
        self.views.live_count()
    }
}

impl Deref for GpuBuffer {
    type Target = HardwareBuffer;

    fn deref(&self) -> &HardwareBuffer {
        &self.buffer
    }
}

impl DerefMut for GpuBuffer {
    fn deref_mut(&mut self) -> &mut HardwareBuffer {
        &mut self.buffer
    }
}

static_assertions::assert_impl_all!(GpuBuffer: Send, Sync);
