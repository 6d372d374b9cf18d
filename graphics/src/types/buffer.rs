//! Buffer types and descriptors.

use bitflags::bitflags;
use tessel_core::mesh::IndexType;

bitflags! {
    /// Usage hints for hardware buffers.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BufferUsage: u32 {
        /// Written once, read many times by the GPU.
        const STATIC = 1 << 0;
        /// Rewritten frequently from the CPU.
        const DYNAMIC = 1 << 1;
        /// Buffer can be bound for unordered read/write access.
        const LOAD_STORE = 1 << 2;
        /// Buffer can be the target of stream output.
        const STREAM_OUT = 1 << 3;
        /// Buffer can be copied from.
        const COPY_SRC = 1 << 4;
        /// Buffer can be copied to.
        const COPY_DST = 1 << 5;
        /// Buffer is mappable for CPU reads.
        const MAP_READ = 1 << 6;
    }
}

impl Default for BufferUsage {
    fn default() -> Self {
        Self::STATIC
    }
}

/// Access requested when locking a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GpuLockOptions {
    /// Read and write access.
    #[default]
    ReadWrite,
    /// Read-only access.
    ReadOnly,
    /// Write-only access.
    WriteOnly,
    /// Write-only; previous contents may be discarded.
    WriteDiscard,
    /// Write-only; caller promises not to touch data the GPU is using.
    WriteNoOverwrite,
}

impl GpuLockOptions {
    /// Whether the lock may modify the buffer.
    pub fn is_write(&self) -> bool {
        !matches!(self, Self::ReadOnly)
    }
}

/// How a write interacts with data the GPU may still be reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BufferWriteType {
    /// Regular write.
    #[default]
    Normal,
    /// The rest of the buffer may be discarded.
    Discard,
    /// The written range is guaranteed not to be in use by the GPU.
    NoOverwrite,
}

/// Descriptor for creating a vertex buffer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VertexBufferDesc {
    /// Size of one vertex in bytes.
    pub vertex_size: u32,
    /// Number of vertices.
    pub num_verts: u32,
    /// Usage hints.
    pub usage: BufferUsage,
    /// Whether the buffer is bound as a stream-output target.
    pub stream_out: bool,
}

impl VertexBufferDesc {
    /// Create a vertex buffer descriptor.
    pub fn new(vertex_size: u32, num_verts: u32) -> Self {
        Self {
            vertex_size,
            num_verts,
            usage: BufferUsage::default(),
            stream_out: false,
        }
    }

    /// Set the usage hints.
    pub fn with_usage(mut self, usage: BufferUsage) -> Self {
        self.usage = usage;
        self
    }

    /// Mark the buffer as a stream-output target.
    pub fn with_stream_out(mut self) -> Self {
        self.stream_out = true;
        self
    }

    /// Total size in bytes.
    pub fn size(&self) -> u64 {
        self.vertex_size as u64 * self.num_verts as u64
    }
}

/// Descriptor for creating an index buffer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IndexBufferDesc {
    /// Index width.
    pub index_type: IndexType,
    /// Number of indices.
    pub num_indices: u32,
    /// Usage hints.
    pub usage: BufferUsage,
}

impl IndexBufferDesc {
    /// Create an index buffer descriptor.
    pub fn new(index_type: IndexType, num_indices: u32) -> Self {
        Self {
            index_type,
            num_indices,
            usage: BufferUsage::default(),
        }
    }

    /// Set the usage hints.
    pub fn with_usage(mut self, usage: BufferUsage) -> Self {
        self.usage = usage;
        self
    }

    /// Total size in bytes.
    pub fn size(&self) -> u64 {
        self.index_type.size() as u64 * self.num_indices as u64
    }
}

/// Kind of generic GPU buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GpuBufferType {
    /// Typed buffer whose elements are described by a [`GpuBufferFormat`].
    #[default]
    Standard,
    /// Buffer of user-defined structures.
    Structured,
    /// Raw byte-addressed buffer.
    Raw,
    /// Arguments for indirect draws or dispatches.
    IndirectArgument,
}

/// Element format of a standard GPU buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GpuBufferFormat {
    /// No format (structured and raw buffers).
    #[default]
    Unknown,
    R16Float,
    R16Uint,
    R32Float,
    Rg32Float,
    Rgb32Float,
    Rgba32Float,
    R32Sint,
    R32Uint,
    Rg32Uint,
    Rgba32Uint,
    Rgba8Unorm,
}

impl GpuBufferFormat {
    /// Size of one element in bytes, zero for [`GpuBufferFormat::Unknown`].
    pub fn size(&self) -> u32 {
        match self {
            Self::Unknown => 0,
            Self::R16Float | Self::R16Uint => 2,
            Self::R32Float | Self::R32Sint | Self::R32Uint | Self::Rgba8Unorm => 4,
            Self::Rg32Float | Self::Rg32Uint => 8,
            Self::Rgb32Float => 12,
            Self::Rgba32Float | Self::Rgba32Uint => 16,
        }
    }
}

/// Descriptor for creating a generic GPU buffer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GpuBufferDesc {
    /// Buffer kind.
    pub buffer_type: GpuBufferType,
    /// Number of elements.
    pub element_count: u32,
    /// Size of one element. Zero means "derive from `format`".
    pub element_size: u32,
    /// Element format for standard buffers.
    pub format: GpuBufferFormat,
    /// Usage hints.
    pub usage: BufferUsage,
}

impl GpuBufferDesc {
    /// Standard buffer with the given element format.
    pub fn standard(format: GpuBufferFormat, element_count: u32) -> Self {
        Self {
            buffer_type: GpuBufferType::Standard,
            element_count,
            element_size: format.size(),
            format,
            usage: BufferUsage::default(),
        }
    }

    /// Structured buffer with the given element stride.
    pub fn structured(element_size: u32, element_count: u32) -> Self {
        Self {
            buffer_type: GpuBufferType::Structured,
            element_count,
            element_size,
            format: GpuBufferFormat::Unknown,
            usage: BufferUsage::default(),
        }
    }

    /// Set the usage hints.
    pub fn with_usage(mut self, usage: BufferUsage) -> Self {
        self.usage = usage;
        self
    }

    /// Element size, falling back to the format size.
    pub fn resolved_element_size(&self) -> u32 {
        if self.element_size == 0 {
            self.format.size()
        } else {
            self.element_size
        }
    }

    /// Total size in bytes.
    pub fn size(&self) -> u64 {
        self.resolved_element_size() as u64 * self.element_count as u64
    }
}

/// Identifies a cached view over a buffer.
///
/// Requesting a view with a key equal to a live view returns that view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GpuViewKey {
    /// How the view interprets the buffer.
    pub buffer_type: GpuBufferType,
    /// Element format seen through the view.
    pub format: GpuBufferFormat,
    /// Element stride seen through the view.
    pub element_size: u32,
}

impl GpuViewKey {
    /// Create a view key.
    pub fn new(buffer_type: GpuBufferType, format: GpuBufferFormat, element_size: u32) -> Self {
        Self {
            buffer_type,
            format,
            element_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_sizes() {
        assert_eq!(VertexBufferDesc::new(32, 10).size(), 320);
        assert_eq!(IndexBufferDesc::new(IndexType::Index16, 6).size(), 12);
        assert_eq!(GpuBufferDesc::standard(GpuBufferFormat::Rgba32Float, 4).size(), 64);
        assert_eq!(GpuBufferDesc::structured(24, 3).size(), 72);
    }

    #[test]
    fn test_element_size_falls_back_to_format() {
        let mut desc = GpuBufferDesc::standard(GpuBufferFormat::R32Uint, 8);
        desc.element_size = 0;
        assert_eq!(desc.resolved_element_size(), 4);
    }

    #[test]
    fn test_lock_options() {
        assert!(!GpuLockOptions::ReadOnly.is_write());
        assert!(GpuLockOptions::WriteDiscard.is_write());
        assert_eq!(BufferUsage::default(), BufferUsage::STATIC);
    }
}
