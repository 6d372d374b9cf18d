//! Shaders.
//!
//! A [`Shader`] pairs a [`ShaderDesc`] (parameter declarations plus
//! techniques) with a resource identity. Materials are created from shaders
//! and look parameters up by name; asking for a name the shader does not
//! declare is a programming error and panics.
//!
//! # Example
//!
//! ```ignore
//! let mut desc = ShaderDesc::new();
//! desc.add_data_parameter(
//!     DataParamDesc::new("Tint", "gTint", GpuParamDataType::Color).with_default(&[1.0f32; 4]),
//! );
//! desc.add_texture_parameter("Albedo", "gAlbedoTex", GpuParamObjectType::Texture2D, None);
//! desc.add_technique(technique);
//!
//! let shader = Shader::create(&device, "Standard", desc)?;
//! let material = Material::create(&device, "Standard", shader)?;
//! ```

mod desc;
mod program;
mod variation;

use std::sync::Arc;

use crate::device::GraphicsDevice;
use crate::error::GraphicsError;
use crate::materials::Technique;
use crate::resource::{Resource, ResourceIdentity};

pub use desc::{DataParamDesc, ObjectParamDesc, ParamBlockAttribs, QueueSortType, ShaderDesc};
pub use program::{GpuProgram, GpuProgramDesc};
pub use variation::{
    MAX_VARIATIONS, ParamKind, ShaderDefines, ShaderVariation, ShaderVariationParam,
    ShaderVariations, VariationAxis, generate_variations,
};

/// A shader: declared parameters and the techniques implementing it.
pub struct Shader {
    identity: ResourceIdentity,
    id: u32,
    desc: ShaderDesc,
    compatible: Vec<Arc<Technique>>,
    initialized: bool,
}

impl Shader {
    /// First construction phase. Call [`Resource::initialize`] before use.
    pub fn new(device: &Arc<GraphicsDevice>, name: &str, desc: ShaderDesc) -> Self {
        let id = device.ids().next_shader_id();
        log::trace!("Shader: created '{}' with id {}", name, id);
        Self {
            identity: ResourceIdentity::new(device.registry(), name),
            id,
            desc,
            compatible: Vec::new(),
            initialized: false,
        }
    }

    /// Create and initialize a shader.
    pub fn create(
        device: &Arc<GraphicsDevice>,
        name: &str,
        desc: ShaderDesc,
    ) -> Result<Arc<Self>, GraphicsError> {
        let mut shader = Self::new(device, name, desc);
        shader.initialize()?;
        Ok(Arc::new(shader))
    }

    /// A shader with no parameters and no techniques.
    pub fn create_empty(device: &Arc<GraphicsDevice>, name: &str) -> Arc<Self> {
        let mut shader = Self::new(device, name, ShaderDesc::new());
        shader.initialized = true;
        Arc::new(shader)
    }

    /// Process-unique shader id.
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn desc(&self) -> &ShaderDesc {
        &self.desc
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Every technique, supported or not.
    pub fn techniques(&self) -> &[Arc<Technique>] {
        &self.desc.techniques
    }

    /// Techniques the current backend can run, in declaration order.
    ///
    /// Empty until the shader is initialized.
    pub fn compatible_techniques(&self) -> &[Arc<Technique>] {
        &self.compatible
    }

    pub fn has_data_param(&self, name: &str) -> bool {
        self.desc.data_params.contains_key(name)
    }

    pub fn has_texture_param(&self, name: &str) -> bool {
        self.desc.texture_params.contains_key(name)
    }

    pub fn has_load_store_texture_param(&self, name: &str) -> bool {
        self.desc.load_store_texture_params.contains_key(name)
    }

    pub fn has_buffer_param(&self, name: &str) -> bool {
        self.desc.buffer_params.contains_key(name)
    }

    pub fn has_sampler_param(&self, name: &str) -> bool {
        self.desc.sampler_params.contains_key(name)
    }

    /// # Panics
    ///
    /// Panics if the shader declares no data parameter `name`.
    pub fn data_param(&self, name: &str) -> &DataParamDesc {
        match self.desc.data_params.get(name) {
            Some(param) => param,
            None => panic!("shader '{}' has no data parameter '{}'", self.identity.name(), name),
        }
    }

    /// # Panics
    ///
    /// Panics if the shader declares no texture parameter `name`.
    pub fn texture_param(&self, name: &str) -> &ObjectParamDesc {
        self.object_param(&self.desc.texture_params, "texture", name)
    }

    /// # Panics
    ///
    /// Panics if the shader declares no load-store texture parameter `name`.
    pub fn load_store_texture_param(&self, name: &str) -> &ObjectParamDesc {
        self.object_param(&self.desc.load_store_texture_params, "load-store texture", name)
    }

    /// # Panics
    ///
    /// Panics if the shader declares no buffer parameter `name`.
    pub fn buffer_param(&self, name: &str) -> &ObjectParamDesc {
        self.object_param(&self.desc.buffer_params, "buffer", name)
    }

    /// # Panics
    ///
    /// Panics if the shader declares no sampler parameter `name`.
    pub fn sampler_param(&self, name: &str) -> &ObjectParamDesc {
        self.object_param(&self.desc.sampler_params, "sampler", name)
    }

    fn object_param<'a>(
        &self,
        map: &'a std::collections::HashMap<String, ObjectParamDesc>,
        kind: &str,
        name: &str,
    ) -> &'a ObjectParamDesc {
        match map.get(name) {
            Some(param) => param,
            None => panic!("shader '{}' has no {} parameter '{}'", self.identity.name(), kind, name),
        }
    }
}

impl Resource for Shader {
    fn identity(&self) -> &ResourceIdentity {
        &self.identity
    }

    /// Resolve the techniques supported by the backend.
    fn initialize(&mut self) -> Result<(), GraphicsError> {
        self.compatible = self
            .desc
            .techniques
            .iter()
            .filter(|technique| technique.is_supported())
            .cloned()
            .collect();
        self.initialized = true;
        log::debug!(
            "Shader: '{}' initialized, {}/{} techniques supported",
            self.identity.name(),
            self.compatible.len(),
            self.desc.techniques.len()
        );
        Ok(())
    }
}

impl std::fmt::Debug for Shader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shader")
            .field("name", &self.identity.name())
            .field("id", &self.id)
            .field("techniques", &self.desc.techniques.len())
            .field("compatible", &self.compatible.len())
            .finish()
    }
}

static_assertions::assert_impl_all!(Shader: Send, Sync);
