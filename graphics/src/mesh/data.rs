//! Mesh resource backed by vertex and index buffers.

use std::sync::Arc;

use tessel_core::math::Bounds;
use tessel_core::mesh::{IndexType, MeshData, SubMesh, VertexDataDesc};
use crate::profiling::profile_function;

use crate::device::GraphicsDevice;
use crate::error::GraphicsError;
use crate::resource::{Resource, ResourceIdentity};
use crate::resources::{IndexBuffer, VertexBuffer, VertexDeclaration};
use crate::types::{BufferUsage, BufferWriteType, IndexBufferDesc, VertexBufferDesc};

/// Creation options for a [`Mesh`].
#[derive(Debug, Clone, Default)]
pub struct MeshDesc {
    /// Usage hints for every buffer of the mesh.
    pub usage: BufferUsage,
    /// Index ranges drawn separately. Empty means one range covering every index.
    pub sub_meshes: Vec<SubMesh>,
}

impl MeshDesc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_usage(mut self, usage: BufferUsage) -> Self {
        self.usage = usage;
        self
    }

    pub fn with_sub_mesh(mut self, sub_mesh: SubMesh) -> Self {
        self.sub_meshes.push(sub_mesh);
        self
    }
}

/// Geometry living in GPU buffers.
///
/// Created in two phases: [`Mesh::new`] keeps the CPU data and
/// [`Resource::initialize`] uploads it. [`Mesh::create`] does both.
///
/// # Example
///
/// ```ignore
/// let desc = Arc::new(VertexDataDesc::position_normal_uv());
/// let mut data = MeshData::new(4, 6, desc, IndexType::Index16);
/// data.set_vertex_data(VertexElementSemantic::Position, bytemuck::cast_slice(&positions), 0, 0)?;
///
/// let mesh = Mesh::create(&device, "Quad", data, MeshDesc::new())?;
/// let bounds = mesh.bounds();
/// ```
pub struct Mesh {
    identity: ResourceIdentity,
    device: Arc<GraphicsDevice>,
    usage: BufferUsage,
    vertex_desc: Arc<VertexDataDesc>,
    declaration: Arc<VertexDeclaration>,
    num_vertices: u32,
    num_indices: u32,
    index_type: IndexType,
    pending: Option<MeshData>,
    index_buffer: Option<IndexBuffer>,
    vertex_buffers: Vec<Option<VertexBuffer>>,
    sub_meshes: Vec<SubMesh>,
    bounds: Bounds,
}

impl Mesh {
    /// First construction phase. Buffers are created by [`Resource::initialize`].
    pub fn new(device: &Arc<GraphicsDevice>, name: &str, data: MeshData, desc: MeshDesc) -> Self {
        let vertex_desc = Arc::clone(data.vertex_desc());
        let declaration = device.create_vertex_declaration(&vertex_desc.create_elements());
        let sub_meshes = if desc.sub_meshes.is_empty() && data.num_indices() > 0 {
            vec![SubMesh::new(0, data.num_indices())]
        } else {
            desc.sub_meshes
        };

        Self {
            identity: ResourceIdentity::new(device.registry(), name),
            device: Arc::clone(device),
            usage: desc.usage,
            vertex_desc,
            declaration,
            num_vertices: data.num_vertices(),
            num_indices: data.num_indices(),
            index_type: data.index_type(),
            pending: Some(data),
            index_buffer: None,
            vertex_buffers: Vec::new(),
            sub_meshes,
            bounds: Bounds::default(),
        }
    }

    /// Create a mesh and upload `data`.
    pub fn create(
        device: &Arc<GraphicsDevice>,
        name: &str,
        data: MeshData,
        desc: MeshDesc,
    ) -> Result<Self, GraphicsError> {
        let mut mesh = Self::new(device, name, data, desc);
        mesh.initialize()?;
        Ok(mesh)
    }

    pub fn vertex_desc(&self) -> &Arc<VertexDataDesc> {
        &self.vertex_desc
    }

    /// Declaration shared with every mesh of the same layout.
    pub fn vertex_declaration(&self) -> &Arc<VertexDeclaration> {
        &self.declaration
    }

    pub fn num_vertices(&self) -> u32 {
        self.num_vertices
    }

    pub fn num_indices(&self) -> u32 {
        self.num_indices
    }

    pub fn index_type(&self) -> IndexType {
        self.index_type
    }

    pub fn usage(&self) -> BufferUsage {
        self.usage
    }

    /// Whether the buffers exist.
    pub fn is_initialized(&self) -> bool {
        self.pending.is_none()
    }

    pub fn index_buffer(&self) -> Option<&IndexBuffer> {
        self.index_buffer.as_ref()
    }

    /// Vertex buffer of `stream`, `None` for streams without elements.
    pub fn vertex_buffer(&self, stream: u32) -> Option<&VertexBuffer> {
        self.vertex_buffers.get(stream as usize)?.as_ref()
    }

    pub fn num_streams(&self) -> u32 {
        self.vertex_desc.stream_count()
    }

    pub fn sub_meshes(&self) -> &[SubMesh] {
        &self.sub_meshes
    }

    pub fn sub_mesh(&self, idx: usize) -> Option<&SubMesh> {
        self.sub_meshes.get(idx)
    }

    /// Bounds of the referenced vertices at the last upload.
    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    /// Replace the buffer contents with `data`.
    ///
    /// `data` must have the mesh's layout, index width and counts.
    pub fn write_data(&mut self, data: &MeshData, discard: bool) -> Result<(), GraphicsError> {
        if !self.is_initialized() {
            return Err(GraphicsError::InvalidState(format!(
                "mesh '{}' is not initialized",
                self.identity.name()
            )));
        }
        self.check_compatible(data)?;
        self.upload(data, discard)?;
        self.bounds = data.calculate_bounds();
        Ok(())
    }

    /// Read the buffer contents back into a new [`MeshData`].
    pub fn read_data(&self) -> Result<MeshData, GraphicsError> {
        let mut data = MeshData::new(
            self.num_vertices,
            self.num_indices,
            Arc::clone(&self.vertex_desc),
            self.index_type,
        );
        if let Some(pending) = &self.pending {
            data.raw_data_mut().copy_from_slice(pending.raw_data());
            return Ok(data);
        }

        let index_size = data.index_buffer_size();
        let stream_ranges: Vec<_> = (0..self.num_streams())
            .map(|stream| (data.stream_offset(stream), data.stream_size(stream)))
            .collect();
        let raw = data.raw_data_mut();

        if let Some(buffer) = &self.index_buffer {
            buffer.read_data(0, &mut raw[..index_size])?;
        }
        for (stream, (offset, size)) in stream_ranges.into_iter().enumerate() {
            if let Some(Some(buffer)) = self.vertex_buffers.get(stream) {
                buffer.read_data(0, &mut raw[offset..offset + size])?;
            }
        }
        Ok(data)
    }

    fn check_compatible(&self, data: &MeshData) -> Result<(), GraphicsError> {
        if data.vertex_desc().as_ref() != self.vertex_desc.as_ref() {
            return Err(GraphicsError::InvalidArgument(
                "mesh data has a different vertex layout".to_string(),
            ));
        }
        if data.index_type() != self.index_type {
            return Err(GraphicsError::InvalidArgument(format!(
                "mesh uses {:?} indices, data has {:?}",
                self.index_type,
                data.index_type()
            )));
        }
        if data.num_vertices() != self.num_vertices || data.num_indices() != self.num_indices {
            return Err(GraphicsError::SizeMismatch {
                expected: self.size_in_bytes(),
                actual: data.size() as u64,
            });
        }
        Ok(())
    }

    fn size_in_bytes(&self) -> u64 {
        self.num_indices as u64 * self.index_type.size() as u64
            + self.num_vertices as u64 * self.vertex_desc.total_vertex_stride() as u64
    }

    fn upload(&mut self, data: &MeshData, discard: bool) -> Result<(), GraphicsError> {
        let write_type = if discard {
            BufferWriteType::Discard
        } else {
            BufferWriteType::Normal
        };
        if let Some(buffer) = &mut self.index_buffer {
            buffer.write_data(0, data.index_data(), write_type)?;
        }
        for (stream, slot) in self.vertex_buffers.iter_mut().enumerate() {
            if let Some(buffer) = slot {
                buffer.write_data(0, data.stream_data(stream as u32), write_type)?;
            }
        }
        Ok(())
    }

    fn create_buffers(&mut self) -> Result<(), GraphicsError> {
        if self.num_indices > 0 {
            let desc = IndexBufferDesc::new(self.index_type, self.num_indices).with_usage(self.usage);
            self.index_buffer = Some(self.device.create_index_buffer(&desc)?);
        }

        let max_streams = self.device.capabilities().max_vertex_streams;
        if self.num_streams() > max_streams {
            return Err(GraphicsError::FeatureNotSupported(format!(
                "mesh uses {} vertex streams, device supports {}",
                self.num_streams(),
                max_streams
            )));
        }

        self.vertex_buffers = (0..self.num_streams())
            .map(|stream| {
                let stride = self.vertex_desc.vertex_stride(stream);
                if stride == 0 || self.num_vertices == 0 {
                    return Ok(None);
                }
                let desc = VertexBufferDesc::new(stride, self.num_vertices).with_usage(self.usage);
                self.device.create_vertex_buffer(&desc).map(Some)
            })
            .collect::<Result<_, GraphicsError>>()?;
        Ok(())
    }
}

impl Resource for Mesh {
    fn identity(&self) -> &ResourceIdentity {
        &self.identity
    }

    /// Create the buffers and upload the pending data.
    fn initialize(&mut self) -> Result<(), GraphicsError> {
        profile_function!();
        let Some(data) = self.pending.take() else {
            return Ok(());
        };

        let uploaded = self
            .create_buffers()
            .and_then(|()| self.upload(&data, true));
        if let Err(err) = uploaded {
            self.index_buffer = None;
            self.vertex_buffers.clear();
            self.pending = Some(data);
            return Err(err);
        }

        self.bounds = data.calculate_bounds();
        log::debug!(
            "Mesh: '{}' uploaded {} vertices, {} indices in {} streams",
            self.identity.name(),
            self.num_vertices,
            self.num_indices,
            self.num_streams()
        );
        Ok(())
    }
}

impl std::fmt::Debug for Mesh {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mesh")
            .field("name", &self.identity.name())
            .field("num_vertices", &self.num_vertices)
            .field("num_indices", &self.num_indices)
            .field("index_type", &self.index_type)
            .field("streams", &self.num_streams())
            .field("sub_meshes", &self.sub_meshes.len())
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

static_assertions::assert_impl_all!(Mesh: Send, Sync);
