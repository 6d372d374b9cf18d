//! Graphics device.
//!
//! The [`GraphicsDevice`] is the factory for hardware buffers, vertex
//! declarations, textures and samplers, and the gateway to GPU program
//! compilation. It wraps one [`GpuBackend`] and owns the shared services
//! engine objects draw on: the [`IdAllocator`] and the [`ResourceRegistry`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};
use tessel_core::id::IdAllocator;
use tessel_core::mesh::VertexElement;

use crate::backend::{GpuBackend, ProgramCompileOutput, ProgramCompileRequest};
use crate::error::GraphicsError;
use crate::profiling::profile_message;
use crate::resource::{LocalRegistry, ResourceRegistry};
use crate::resources::{
    GpuBuffer, GpuParamBlockBuffer, HardwareBuffer, IndexBuffer, Sampler, Texture, VertexBuffer,
    VertexDeclaration,
};
use crate::types::{
    BufferUsage, FilterType, GpuBufferDesc, GpuBufferType, GpuProgramType, IndexBufferDesc,
    SamplerDescriptor, TextureDescriptor, TextureUsage, VertexBufferDesc,
};

/// Capabilities of a graphics device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceCapabilities {
    /// Maximum texture dimension.
    pub max_texture_dimension: u32,
    /// Maximum buffer size.
    pub max_buffer_size: u64,
    /// Maximum number of vertex streams.
    pub max_vertex_streams: u32,
    /// Whether compute programs and load-store resources are supported.
    pub compute_shaders: bool,
    /// Whether geometry programs are supported.
    pub geometry_shaders: bool,
    /// Whether hull and domain programs are supported.
    pub tessellation_shaders: bool,
}

impl DeviceCapabilities {
    /// Whether programs of `program_type` can run on the device.
    pub fn supports_program(&self, program_type: GpuProgramType) -> bool {
        match program_type {
            GpuProgramType::Vertex | GpuProgramType::Fragment => true,
            GpuProgramType::Geometry => self.geometry_shaders,
            GpuProgramType::Hull | GpuProgramType::Domain => self.tessellation_shaders,
            GpuProgramType::Compute => self.compute_shaders,
        }
    }
}

impl Default for DeviceCapabilities {
    fn default() -> Self {
        Self {
            max_texture_dimension: 16384,
            max_buffer_size: 1 << 30, // 1 GB
            max_vertex_streams: 16,
            compute_shaders: true,
            geometry_shaders: true,
            tessellation_shaders: true,
        }
    }
}

/// Configuration for creating a [`GraphicsDevice`].
#[derive(Debug, Clone, Default)]
pub struct DeviceDescriptor {
    /// Device name. Defaults to the backend name.
    pub label: Option<String>,
    pub capabilities: DeviceCapabilities,
    /// Shared id source. A fresh allocator is created when unset.
    pub ids: Option<Arc<IdAllocator>>,
    /// Resource registry. A [`LocalRegistry`] is created when unset.
    pub registry: Option<Arc<dyn ResourceRegistry>>,
}

impl DeviceDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_capabilities(mut self, capabilities: DeviceCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn with_id_allocator(mut self, ids: Arc<IdAllocator>) -> Self {
        self.ids = Some(ids);
        self
    }

    pub fn with_registry(mut self, registry: Arc<dyn ResourceRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }
}

/// A graphics device for creating GPU resources.
///
/// # Thread Safety
///
/// `GraphicsDevice` is `Send + Sync` and can be shared across threads. The
/// declaration cache and resource tracking use interior locking.
///
/// # Example
///
/// ```ignore
/// let device = GraphicsDevice::new(create_backend()?);
///
/// let mut vb = device.create_vertex_buffer(&VertexBufferDesc::new(32, 1024))?;
/// let decl = device.create_vertex_declaration(&VertexDataDesc::position_normal_uv().create_elements());
/// let sampler = device.create_sampler(&SamplerDescriptor::linear())?;
/// ```
pub struct GraphicsDevice {
    backend: Arc<dyn GpuBackend>,
    name: String,
    capabilities: DeviceCapabilities,
    ids: Arc<IdAllocator>,
    registry: Arc<dyn ResourceRegistry>,
    declarations: Mutex<HashMap<Vec<VertexElement>, Weak<VertexDeclaration>>>,
    next_declaration_id: AtomicU32,
    // Track allocated resources (weak references for cleanup/debugging)
    textures: RwLock<Vec<Weak<Texture>>>,
    samplers: RwLock<Vec<Weak<Sampler>>>,
}

impl GraphicsDevice {
    /// Create a device with default configuration.
    pub fn new(backend: Arc<dyn GpuBackend>) -> Arc<Self> {
        Self::with_descriptor(backend, DeviceDescriptor::default())
    }

    /// Create a device from a descriptor.
    pub fn with_descriptor(backend: Arc<dyn GpuBackend>, descriptor: DeviceDescriptor) -> Arc<Self> {
        let name = descriptor
            .label
            .unwrap_or_else(|| format!("{} Device", backend.name()));
        log::info!("GraphicsDevice: created '{}'", name);
        profile_message!(&name);

        Arc::new(Self {
            backend,
            name,
            capabilities: descriptor.capabilities,
            ids: descriptor.ids.unwrap_or_default(),
            registry: descriptor
                .registry
                .unwrap_or_else(|| Arc::new(LocalRegistry::new())),
            declarations: Mutex::new(HashMap::new()),
            next_declaration_id: AtomicU32::new(0),
            textures: RwLock::new(Vec::new()),
            samplers: RwLock::new(Vec::new()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn backend(&self) -> &Arc<dyn GpuBackend> {
        &self.backend
    }

    pub fn capabilities(&self) -> &DeviceCapabilities {
        &self.capabilities
    }

    /// Id source shared by shaders, techniques and materials.
    pub fn ids(&self) -> &Arc<IdAllocator> {
        &self.ids
    }

    pub fn registry(&self) -> &Arc<dyn ResourceRegistry> {
        &self.registry
    }

    /// Create a vertex buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer is empty, exceeds device limits, or
    /// requests load-store access on a device without compute support.
    pub fn create_vertex_buffer(&self, desc: &VertexBufferDesc) -> Result<VertexBuffer, GraphicsError> {
        let buffer = self.create_hardware_buffer("vertex", desc.size(), desc.usage)?;
        log::trace!(
            "GraphicsDevice: created vertex buffer, {} x {} bytes",
            desc.num_verts,
            desc.vertex_size
        );
        Ok(VertexBuffer::new(buffer, desc.clone()))
    }

    /// Create an index buffer.
    pub fn create_index_buffer(&self, desc: &IndexBufferDesc) -> Result<IndexBuffer, GraphicsError> {
        let buffer = self.create_hardware_buffer("index", desc.size(), desc.usage)?;
        log::trace!(
            "GraphicsDevice: created index buffer, {} x {:?}",
            desc.num_indices,
            desc.index_type
        );
        Ok(IndexBuffer::new(buffer, desc.clone()))
    }

    /// Create a parameter block buffer of `size` bytes.
    pub fn create_param_block_buffer(
        &self,
        size: u32,
        usage: BufferUsage,
    ) -> Result<GpuParamBlockBuffer, GraphicsError> {
        let buffer = self.create_hardware_buffer("param block", size as u64, usage)?;
        log::trace!("GraphicsDevice: created param block buffer, size={}", size);
        Ok(GpuParamBlockBuffer::new(buffer))
    }

    /// Create a generic GPU buffer.
    pub fn create_gpu_buffer(&self, desc: &GpuBufferDesc) -> Result<GpuBuffer, GraphicsError> {
        if desc.buffer_type == GpuBufferType::Standard && desc.format.size() == 0 {
            return Err(GraphicsError::InvalidArgument(
                "standard GPU buffers need an element format".to_string(),
            ));
        }
        let buffer = self.create_hardware_buffer("GPU", desc.size(), desc.usage)?;
        log::trace!(
            "GraphicsDevice: created {:?} GPU buffer, {} elements",
            desc.buffer_type,
            desc.element_count
        );
        Ok(GpuBuffer::new(buffer, desc.clone()))
    }

    fn create_hardware_buffer(
        &self,
        kind: &str,
        size: u64,
        usage: BufferUsage,
    ) -> Result<HardwareBuffer, GraphicsError> {
        if size == 0 {
            return Err(GraphicsError::InvalidArgument(format!(
                "{kind} buffer size cannot be zero"
            )));
        }
        if size > self.capabilities.max_buffer_size {
            return Err(GraphicsError::InvalidArgument(format!(
                "{kind} buffer size {size} exceeds maximum {}",
                self.capabilities.max_buffer_size
            )));
        }
        if usage.contains(BufferUsage::LOAD_STORE) && !self.capabilities.compute_shaders {
            return Err(GraphicsError::FeatureNotSupported(
                "load-store buffers require compute support".to_string(),
            ));
        }

        let storage = self.backend.create_buffer_storage(size, usage)?;
        Ok(HardwareBuffer::new(storage, usage))
    }

    /// Get or create the declaration for `elements`.
    ///
    /// Identical element lists share one declaration for as long as any
    /// holder keeps it alive.
    pub fn create_vertex_declaration(&self, elements: &[VertexElement]) -> Arc<VertexDeclaration> {
        let mut declarations = self.declarations.lock();
        declarations.retain(|_, decl| decl.strong_count() > 0);

        if let Some(decl) = declarations.get(elements).and_then(Weak::upgrade) {
            return decl;
        }

        let id = self.next_declaration_id.fetch_add(1, Ordering::Relaxed);
        let decl = Arc::new(VertexDeclaration::new(id, elements.to_vec()));
        declarations.insert(elements.to_vec(), Arc::downgrade(&decl));
        log::debug!(
            "GraphicsDevice: created vertex declaration {} with {} elements",
            id,
            elements.len()
        );
        decl
    }

    /// Create a texture.
    ///
    /// # Errors
    ///
    /// Returns an error if the descriptor is invalid or exceeds device limits.
    pub fn create_texture(
        self: &Arc<Self>,
        descriptor: &TextureDescriptor,
    ) -> Result<Arc<Texture>, GraphicsError> {
        descriptor.validate(self.capabilities.max_texture_dimension)?;
        if descriptor.usage.contains(TextureUsage::LOAD_STORE) && !self.capabilities.compute_shaders {
            return Err(GraphicsError::FeatureNotSupported(
                "load-store textures require compute support".to_string(),
            ));
        }

        let texture = Arc::new(Texture::new(Arc::downgrade(self), descriptor.clone()));
        self.textures.write().push(Arc::downgrade(&texture));

        log::trace!(
            "GraphicsDevice: created texture {:?}, size={}x{}",
            descriptor.label,
            descriptor.width,
            descriptor.height
        );

        Ok(texture)
    }

    /// Create a texture sampler.
    pub fn create_sampler(
        self: &Arc<Self>,
        descriptor: &SamplerDescriptor,
    ) -> Result<Arc<Sampler>, GraphicsError> {
        if descriptor.min_lod > descriptor.max_lod {
            return Err(GraphicsError::InvalidArgument(format!(
                "sampler lod range {}..{} is inverted",
                descriptor.min_lod, descriptor.max_lod
            )));
        }

        let anisotropic = [descriptor.filter.min, descriptor.filter.mag]
            .contains(&FilterType::Anisotropic);
        if anisotropic && descriptor.max_anisotropy == 0 {
            return Err(GraphicsError::InvalidArgument(
                "anisotropic filtering needs max_anisotropy above zero".to_string(),
            ));
        }

        let sampler = Arc::new(Sampler::new(Arc::downgrade(self), descriptor.clone()));
        self.samplers.write().push(Arc::downgrade(&sampler));

        log::trace!("GraphicsDevice: created sampler {:?}", descriptor.label);

        Ok(sampler)
    }

    /// Whether GPU programs written in `language` can be compiled.
    pub fn is_language_supported(&self, language: &str) -> bool {
        self.backend.is_language_supported(language)
    }

    /// Compile a GPU program through the backend.
    ///
    /// Failures are reported in the returned output, uninterpreted.
    pub fn compile_program(&self, request: &ProgramCompileRequest) -> ProgramCompileOutput {
        if !self.capabilities.supports_program(request.program_type) {
            return ProgramCompileOutput::failure(format!(
                "{:?} programs are not supported by '{}'",
                request.program_type, self.name
            ));
        }
        let output = self.backend.compile_program(request);
        log::debug!(
            "GraphicsDevice: compiled {:?} program '{}': {}",
            request.program_type,
            request.entry_point,
            if output.success { "ok" } else { "failed" }
        );
        output
    }

    /// Number of live vertex declarations.
    pub fn vertex_declaration_count(&self) -> usize {
        self.declarations
            .lock()
            .values()
            .filter(|w| w.strong_count() > 0)
            .count()
    }

    /// Get the number of live textures created by this device.
    pub fn texture_count(&self) -> usize {
        self.textures
            .read()
            .iter()
            .filter(|w| w.strong_count() > 0)
            .count()
    }

    /// Get the number of live samplers created by this device.
    pub fn sampler_count(&self) -> usize {
        self.samplers
            .read()
            .iter()
            .filter(|w| w.strong_count() > 0)
            .count()
    }

    /// Clean up dead weak references to released resources.
    pub fn cleanup_dead_resources(&self) {
        self.textures.write().retain(|w| w.strong_count() > 0);
        self.samplers.write().retain(|w| w.strong_count() > 0);
        self.declarations.lock().retain(|_, w| w.strong_count() > 0);
    }
}

impl std::fmt::Debug for GraphicsDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphicsDevice")
            .field("name", &self.name)
            .field("backend", &self.backend.name())
            .field("capabilities", &self.capabilities)
            .finish()
    }
}

static_assertions::assert_impl_all!(GraphicsDevice: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::DummyBackend;
    use crate::types::{GpuBufferFormat, TextureFormat};
    use tessel_core::mesh::{IndexType, VertexDataDesc};

    fn create_test_device() -> Arc<GraphicsDevice> {
        GraphicsDevice::new(Arc::new(DummyBackend::new()))
    }

    #[test]
    fn test_device_name() {
        let device = create_test_device();
        assert_eq!(device.name(), "Dummy Device");

        let named = GraphicsDevice::with_descriptor(
            Arc::new(DummyBackend::new()),
            DeviceDescriptor::new().with_label("Tools"),
        );
        assert_eq!(named.name(), "Tools");
    }

    #[test]
    fn test_create_buffers() {
        let device = create_test_device();
        let vb = device.create_vertex_buffer(&VertexBufferDesc::new(32, 4)).unwrap();
        assert_eq!(vb.size(), 128);

        let ib = device
            .create_index_buffer(&IndexBufferDesc::new(IndexType::Index16, 6))
            .unwrap();
        assert_eq!(ib.size(), 12);

        let block = device.create_param_block_buffer(64, BufferUsage::DYNAMIC).unwrap();
        assert_eq!(block.size(), 64);

        let gpu = device
            .create_gpu_buffer(&GpuBufferDesc::standard(GpuBufferFormat::Rgba32Float, 8))
            .unwrap();
        assert_eq!(gpu.size(), 128);
    }

    #[test]
    fn test_create_buffer_zero_size() {
        let device = create_test_device();
        assert!(matches!(
            device.create_vertex_buffer(&VertexBufferDesc::new(32, 0)),
            Err(GraphicsError::InvalidArgument(_))
        ));
        assert!(device.create_param_block_buffer(0, BufferUsage::STATIC).is_err());
        assert!(
            device
                .create_gpu_buffer(&GpuBufferDesc::standard(GpuBufferFormat::Unknown, 4))
                .is_err()
        );
    }

    #[test]
    fn test_buffer_size_limit() {
        let device = GraphicsDevice::with_descriptor(
            Arc::new(DummyBackend::new()),
            DeviceDescriptor::new().with_capabilities(DeviceCapabilities {
                max_buffer_size: 64,
                compute_shaders: false,
                ..Default::default()
            }),
        );
        assert!(device.create_vertex_buffer(&VertexBufferDesc::new(16, 4)).is_ok());
        assert!(device.create_vertex_buffer(&VertexBufferDesc::new(16, 5)).is_err());
        assert!(matches!(
            device.create_vertex_buffer(
                &VertexBufferDesc::new(16, 1).with_usage(BufferUsage::LOAD_STORE)
            ),
            Err(GraphicsError::FeatureNotSupported(_))
        ));
    }

    #[test]
    fn test_vertex_declaration_cache() {
        let device = create_test_device();
        let elements = VertexDataDesc::position_normal_uv().create_elements();

        let a = device.create_vertex_declaration(&elements);
        let b = device.create_vertex_declaration(&elements);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(device.vertex_declaration_count(), 1);

        let other = device.create_vertex_declaration(&elements[..1]);
        assert!(!Arc::ptr_eq(&a, &other));
        assert_ne!(a.id(), other.id());

        drop(a);
        drop(b);
        assert_eq!(device.vertex_declaration_count(), 1);
    }

    #[test]
    fn test_create_texture() {
        let device = create_test_device();
        let texture = device
            .create_texture(&TextureDescriptor::new_2d(
                512,
                512,
                TextureFormat::Rgba8,
                TextureUsage::SAMPLED,
            ))
            .unwrap();
        assert_eq!(texture.width(), 512);
        assert!(texture.device().is_some());
        assert_eq!(device.texture_count(), 1);

        let zero = device.create_texture(&TextureDescriptor::new_2d(
            0,
            512,
            TextureFormat::Rgba8,
            TextureUsage::SAMPLED,
        ));
        assert!(zero.is_err());
    }

    #[test]
    fn test_invalid_samplers() {
        let device = create_test_device();
        let inverted = SamplerDescriptor::linear().with_lod_range(4.0, 1.0);
        assert!(matches!(
            device.create_sampler(&inverted),
            Err(GraphicsError::InvalidArgument(_))
        ));

        let mut aniso = SamplerDescriptor::anisotropic(16);
        assert!(device.create_sampler(&aniso).is_ok());
        aniso.max_anisotropy = 0;
        assert!(device.create_sampler(&aniso).is_err());
    }

    #[test]
    fn test_resource_cleanup() {
        let device = create_test_device();
        {
            let _sampler = device.create_sampler(&SamplerDescriptor::linear()).unwrap();
            assert_eq!(device.sampler_count(), 1);
        }
        device.cleanup_dead_resources();
        assert_eq!(device.sampler_count(), 0);
    }

    #[test]
    fn test_unsupported_program_stage() {
        let device = GraphicsDevice::with_descriptor(
            Arc::new(DummyBackend::new()),
            DeviceDescriptor::new().with_capabilities(DeviceCapabilities {
                geometry_shaders: false,
                ..Default::default()
            }),
        );
        let output = device.compile_program(&ProgramCompileRequest {
            program_type: GpuProgramType::Geometry,
            entry_point: "gs_main".to_string(),
            source: String::new(),
            language: "hlsl".to_string(),
            include_path: None,
            defines: Vec::new(),
        });
        assert!(!output.success);
        assert!(device.is_language_supported("glsl"));
    }
}
