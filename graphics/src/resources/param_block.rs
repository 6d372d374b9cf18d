//! Uniform/constant parameter blocks.

use crate::error::GraphicsError;
use crate::types::{BufferUsage, BufferWriteType};

use super::hardware_buffer::HardwareBuffer;

/// A parameter block buffer with a CPU-side shadow copy.
///
/// Writes go to the shadow and mark the block dirty; nothing reaches the GPU
/// until [`flush_to_gpu`](Self::flush_to_gpu) is called. Flushing a clean
/// block does nothing.
///
/// # Example
///
/// ```ignore
/// let mut block = device.create_param_block_buffer(64, BufferUsage::DYNAMIC)?;
/// block.write_value(0, &[1.0f32, 0.0, 0.0, 1.0])?;
/// assert!(block.flush_to_gpu()?);
/// assert!(!block.flush_to_gpu()?);
/// ```
pub struct GpuParamBlockBuffer {
    buffer: HardwareBuffer,
    cached: Vec<u8>,
    dirty: bool,
}

impl GpuParamBlockBuffer {
    pub(crate) fn new(buffer: HardwareBuffer) -> Self {
        let size = buffer.size() as usize;
        Self {
            buffer,
            cached: vec![0; size],
            // Upload the zeroed shadow on first flush.
            dirty: true,
        }
    }

    /// Size in bytes.
    pub fn size(&self) -> u32 {
        self.cached.len() as u32
    }

    pub fn usage(&self) -> BufferUsage {
        self.buffer.usage()
    }

    /// Whether the shadow holds changes not yet flushed.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Copy `data` into the shadow at `offset`.
    pub fn write(&mut self, offset: u32, data: &[u8]) -> Result<(), GraphicsError> {
        let range = self.check_range(offset, data.len())?;
        self.cached[range].copy_from_slice(data);
        self.dirty = true;
        Ok(())
    }

    /// Copy a plain-old-data value into the shadow at `offset`.
    pub fn write_value<T: bytemuck::Pod>(
        &mut self,
        offset: u32,
        value: &T,
    ) -> Result<(), GraphicsError> {
        self.write(offset, bytemuck::bytes_of(value))
    }

    /// Copy `dest.len()` bytes of the shadow at `offset` into `dest`.
    pub fn read(&self, offset: u32, dest: &mut [u8]) -> Result<(), GraphicsError> {
        let range = self.check_range(offset, dest.len())?;
        dest.copy_from_slice(&self.cached[range]);
        Ok(())
    }

    /// Zero `size` bytes of the shadow starting at `offset`.
    pub fn zero_out(&mut self, offset: u32, size: u32) -> Result<(), GraphicsError> {
        let range = self.check_range(offset, size as usize)?;
        self.cached[range].fill(0);
        self.dirty = true;
        Ok(())
    }

    /// Shadow contents.
    pub fn cached_data(&self) -> &[u8] {
        &self.cached
    }

    /// Upload the shadow if it changed since the last flush.
    ///
    /// Returns whether an upload happened.
    pub fn flush_to_gpu(&mut self) -> Result<bool, GraphicsError> {
        if !self.dirty {
            return Ok(false);
        }
        self.buffer
            .write_data(0, &self.cached, BufferWriteType::Discard)?;
        self.dirty = false;
        log::trace!("GpuParamBlockBuffer: flushed {} bytes", self.cached.len());
        Ok(true)
    }

    /// Contents of the GPU-side buffer, as last flushed.
    pub fn read_gpu_data(&self) -> Result<Vec<u8>, GraphicsError> {
        self.buffer.read_all()
    }

    fn check_range(
        &self,
        offset: u32,
        length: usize,
    ) -> Result<std::ops::Range<usize>, GraphicsError> {
        let start = offset as usize;
        match start.checked_add(length) {
            Some(end) if end <= self.cached.len() => Ok(start..end),
            _ => Err(GraphicsError::OutOfRange {
                offset: offset as u64,
                length: length as u64,
                size: self.cached.len() as u64,
            }),
        }
    }
}

impl std::fmt::Debug for GpuParamBlockBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GpuParamBlockBuffer")
            .field("size", &self.cached.len())
            .field("usage", &self.buffer.usage())
            .field("dirty", &self.dirty)
            .finish()
    }
}

static_assertions::assert_impl_all!(GpuParamBlockBuffer: Send, Sync);
