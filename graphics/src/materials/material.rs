//! Materials.
//!
//! A [`Material`] stores parameter values for a [`Shader`], picks the
//! technique to render with, and pushes its values into the per-pass
//! [`GpuParams`] of that technique.
//!
//! # Technique selection
//!
//! [`Material::find_technique`] walks every technique of the shader that
//! the backend supports. A technique missing a requested tag is skipped.
//! Each parameter of the technique's variation is then classified against
//! the search variation and against the material's own variation as absent,
//! matching (same raw bits) or not matching, and the pair decides:
//!
//! | search \ material | absent          | not matching          | matching   |
//! |-------------------|-----------------|-----------------------|------------|
//! | absent            | add raw to score| reject                | material+1 |
//! | not matching      | reject          | reject                | both+1, reject with override |
//! | matching          | search+1        | both+1 with override, else reject | both+1 |
//!
//! A technique qualifies when every parameter of the search variation (if
//! given) and of the material variation was counted. The qualifying
//! technique with the lowest score wins; ties keep the earlier technique.

use std::collections::HashMap;
use std::sync::Arc;

use crate::profiling::profile_function;

use crate::device::GraphicsDevice;
use crate::error::GraphicsError;
use crate::resource::{Resource, ResourceIdentity};
use crate::resources::{GpuBufferView, Sampler, Texture};
use crate::shader::{Shader, ShaderVariation, ShaderVariationParam};
use crate::types::{GpuProgramType, TextureSurface};

use super::params::{BoundTexture, GpuParams};
use super::technique::Technique;

/// Search criteria for [`Material::find_technique`].
#[derive(Debug, Clone, Default)]
pub struct FindTechniqueDesc {
    /// Tags the technique must carry.
    pub tags: Vec<String>,
    /// Variation the technique should be compiled for.
    pub variation: Option<ShaderVariation>,
    /// Let the search variation win over the material's variation.
    pub override_variation: bool,
}

impl FindTechniqueDesc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn with_variation(mut self, variation: ShaderVariation) -> Self {
        self.variation = Some(variation);
        self
    }

    pub fn with_override(mut self) -> Self {
        self.override_variation = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParamMatch {
    NoParam,
    NotMatching,
    Matching,
}

fn classify(variation: Option<&ShaderVariation>, name: &str, param: &ShaderVariationParam) -> ParamMatch {
    match variation.and_then(|v| v.get_param(name)) {
        None => ParamMatch::NoParam,
        Some(other) if other.raw() == param.raw() => ParamMatch::Matching,
        Some(_) => ParamMatch::NotMatching,
    }
}

#[derive(Debug, Clone)]
struct DataValue {
    bytes: Vec<u8>,
    stage: Option<GpuProgramType>,
}

/// Parameter values and technique selection for a shader.
///
/// # Example
///
/// ```ignore
/// let mut material = Material::create(&device, "Bricks", shader)?;
/// material.set_vec4("Tint", [1.0, 0.9, 0.8, 1.0]);
/// material.set_texture("Albedo", Some(bricks), TextureSurface::COMPLETE);
///
/// let technique = material.default_technique().expect("no usable technique");
/// let mut params = material.create_gpu_params(technique)?;
/// material.set_gpu_params(&mut params)?;
/// ```
pub struct Material {
    identity: ResourceIdentity,
    id: u32,
    shader: Option<Arc<Shader>>,
    variation: ShaderVariation,
    techniques: Vec<Arc<Technique>>,
    data: HashMap<String, DataValue>,
    textures: HashMap<String, BoundTexture>,
    load_store_textures: HashMap<String, BoundTexture>,
    buffers: HashMap<String, Arc<GpuBufferView>>,
    samplers: HashMap<String, Arc<Sampler>>,
    initialized: bool,
}

impl Material {
    /// A material with no shader. It has no techniques until a shader is set.
    pub fn create_empty(device: &Arc<GraphicsDevice>, name: &str) -> Self {
        let id = device.ids().next_material_id();
        log::trace!("Material: created '{}' with id {}", name, id);
        Self {
            identity: ResourceIdentity::new(device.registry(), name),
            id,
            shader: None,
            variation: ShaderVariation::new(),
            techniques: Vec::new(),
            data: HashMap::new(),
            textures: HashMap::new(),
            load_store_textures: HashMap::new(),
            buffers: HashMap::new(),
            samplers: HashMap::new(),
            initialized: false,
        }
    }

    /// Create and initialize a material for `shader`.
    pub fn create(
        device: &Arc<GraphicsDevice>,
        name: &str,
        shader: Arc<Shader>,
    ) -> Result<Self, GraphicsError> {
        let mut material = Self::create_empty(device, name);
        material.shader = Some(shader);
        material.initialize()?;
        Ok(material)
    }

    /// Process-unique material id.
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn shader(&self) -> Option<&Arc<Shader>> {
        self.shader.as_ref()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Replace the shader and re-resolve techniques.
    ///
    /// Values of parameters the new shader does not declare are dropped.
    /// `None` clears the techniques.
    pub fn set_shader(&mut self, shader: Option<Arc<Shader>>) {
        self.shader = shader;
        match &self.shader {
            Some(shader) => {
                self.data.retain(|name, _| shader.has_data_param(name));
                self.textures.retain(|name, _| shader.has_texture_param(name));
                self.load_store_textures
                    .retain(|name, _| shader.has_load_store_texture_param(name));
                self.buffers.retain(|name, _| shader.has_buffer_param(name));
                self.samplers.retain(|name, _| shader.has_sampler_param(name));
            }
            None => {
                self.data.clear();
                self.textures.clear();
                self.load_store_textures.clear();
                self.buffers.clear();
                self.samplers.clear();
            }
        }
        self.initialize_techniques();
        self.initialized = self.shader.is_some();
    }

    /// Clear the techniques and copy the shader's compatible ones.
    pub fn initialize_techniques(&mut self) {
        self.techniques.clear();
        if let Some(shader) = &self.shader {
            self.techniques
                .extend(shader.compatible_techniques().iter().cloned());
        }
        log::debug!(
            "Material: '{}' resolved {} techniques",
            self.identity.name(),
            self.techniques.len()
        );
    }

    pub fn variation(&self) -> &ShaderVariation {
        &self.variation
    }

    pub fn set_variation(&mut self, variation: ShaderVariation) {
        self.variation = variation;
    }

    pub fn num_techniques(&self) -> usize {
        self.techniques.len()
    }

    pub fn techniques(&self) -> &[Arc<Technique>] {
        &self.techniques
    }

    /// # Panics
    ///
    /// Panics if `idx` is out of range.
    pub fn technique(&self, idx: usize) -> &Arc<Technique> {
        match self.techniques.get(idx) {
            Some(technique) => technique,
            None => panic!(
                "technique index {} out of range, material '{}' has {} techniques",
                idx,
                self.identity.name(),
                self.techniques.len()
            ),
        }
    }

    /// Index of the best technique for `desc`, or `None`.
    pub fn find_technique(&self, desc: &FindTechniqueDesc) -> Option<usize> {
        profile_function!();
        let found = self.select_technique(desc, |_| true);
        if found.is_none() {
            log::debug!(
                "Material: '{}' has no technique for tags {:?}",
                self.identity.name(),
                desc.tags
            );
        }
        found
    }

    /// Best untagged technique for the material's own variation.
    pub fn default_technique(&self) -> Option<usize> {
        self.select_technique(&FindTechniqueDesc::default(), |t| t.tags().is_empty())
    }

    fn select_technique(
        &self,
        desc: &FindTechniqueDesc,
        candidate: impl Fn(&Technique) -> bool,
    ) -> Option<usize> {
        let search = desc.variation.as_ref();
        let overrides = desc.override_variation;
        let mut best: Option<(usize, u64)> = None;

        'techniques: for (idx, technique) in self.techniques.iter().enumerate() {
            if !candidate(technique) || !technique.has_tags(&desc.tags) {
                continue;
            }

            let mut search_matches = 0usize;
            let mut internal_matches = 0usize;
            let mut score = 0u64;

            for (name, param) in technique.variation().params() {
                let by_search = classify(search, name, param);
                let by_material = classify(Some(&self.variation), name, param);

                use ParamMatch::*;
                match (by_search, by_material) {
                    (NoParam, NoParam) => score += param.raw() as u32 as u64,
                    (NoParam, Matching) => internal_matches += 1,
                    (Matching, NoParam) => search_matches += 1,
                    (Matching, Matching) => {
                        search_matches += 1;
                        internal_matches += 1;
                    }
                    (NotMatching, Matching) if !overrides => {
                        search_matches += 1;
                        internal_matches += 1;
                    }
                    (Matching, NotMatching) if overrides => {
                        search_matches += 1;
                        internal_matches += 1;
                    }
                    // Counts nothing, so the search variation stays unsatisfied.
                    (NotMatching, NoParam) if overrides => {}
                    _ => continue 'techniques,
                }
            }

            let search_satisfied = search.is_none_or(|v| search_matches == v.len());
            if !search_satisfied || internal_matches != self.variation.len() {
                continue;
            }
            if best.is_none_or(|(_, best_score)| score < best_score) {
                best = Some((idx, score));
            }
        }

        best.map(|(idx, _)| idx)
    }

    fn shader_ref(&self) -> &Arc<Shader> {
        match &self.shader {
            Some(shader) => shader,
            None => panic!("material '{}' has no shader", self.identity.name()),
        }
    }

    /// Set the raw bytes of a data parameter for every stage.
    ///
    /// # Panics
    ///
    /// Panics if the shader declares no data parameter `name`.
    pub fn set_data(&mut self, name: &str, data: &[u8]) {
        self.store_data(name, data, None);
    }

    /// Set the raw bytes of a data parameter for one program stage only.
    pub fn set_data_for_stage(&mut self, name: &str, data: &[u8], stage: GpuProgramType) {
        self.store_data(name, data, Some(stage));
    }

    fn store_data(&mut self, name: &str, data: &[u8], stage: Option<GpuProgramType>) {
        let size = self.shader_ref().data_param(name).size() as usize;
        if data.len() > size {
            log::warn!(
                "Material: '{}' is {} bytes, ignoring {} byte value",
                name,
                size,
                data.len()
            );
            return;
        }
        self.data.insert(
            name.to_string(),
            DataValue {
                bytes: data.to_vec(),
                stage,
            },
        );
    }

    pub fn set_float(&mut self, name: &str, value: f32) {
        self.set_data(name, bytemuck::bytes_of(&value));
    }

    pub fn set_int(&mut self, name: &str, value: i32) {
        self.set_data(name, bytemuck::bytes_of(&value));
    }

    pub fn set_vec4(&mut self, name: &str, value: [f32; 4]) {
        self.set_data(name, bytemuck::bytes_of(&value));
    }

    /// Set a column-major 4x4 matrix.
    pub fn set_mat4(&mut self, name: &str, value: [[f32; 4]; 4]) {
        self.set_data(name, bytemuck::bytes_of(&value));
    }

    /// Bytes of a data parameter, falling back to the shader default.
    ///
    /// # Panics
    ///
    /// Panics if the shader declares no data parameter `name`.
    pub fn get_data(&self, name: &str) -> Option<&[u8]> {
        let param = self.shader_ref().data_param(name);
        match self.data.get(name) {
            Some(value) => Some(&value.bytes),
            None => param.default_value.as_deref(),
        }
    }

    /// Float value of a data parameter, 0.0 when unset.
    pub fn get_float(&self, name: &str) -> f32 {
        self.read_pod(name).unwrap_or_default()
    }

    pub fn get_int(&self, name: &str) -> i32 {
        self.read_pod(name).unwrap_or_default()
    }

    pub fn get_vec4(&self, name: &str) -> [f32; 4] {
        self.read_pod(name).unwrap_or_default()
    }

    fn read_pod<T: bytemuck::Pod>(&self, name: &str) -> Option<T> {
        let bytes = self.get_data(name)?;
        let size = std::mem::size_of::<T>();
        (bytes.len() >= size).then(|| bytemuck::pod_read_unaligned(&bytes[..size]))
    }

    /// Bind a texture, or unbind with `None`.
    ///
    /// # Panics
    ///
    /// Panics if the shader declares no texture parameter `name`.
    pub fn set_texture(&mut self, name: &str, texture: Option<Arc<Texture>>, surface: TextureSurface) {
        self.shader_ref().texture_param(name);
        match texture {
            Some(texture) => {
                self.textures
                    .insert(name.to_string(), BoundTexture { texture, surface });
            }
            None => {
                self.textures.remove(name);
            }
        }
    }

    pub fn set_load_store_texture(
        &mut self,
        name: &str,
        texture: Option<Arc<Texture>>,
        surface: TextureSurface,
    ) {
        self.shader_ref().load_store_texture_param(name);
        match texture {
            Some(texture) => {
                self.load_store_textures
                    .insert(name.to_string(), BoundTexture { texture, surface });
            }
            None => {
                self.load_store_textures.remove(name);
            }
        }
    }

    pub fn set_buffer(&mut self, name: &str, buffer: Option<Arc<GpuBufferView>>) {
        self.shader_ref().buffer_param(name);
        match buffer {
            Some(buffer) => {
                self.buffers.insert(name.to_string(), buffer);
            }
            None => {
                self.buffers.remove(name);
            }
        }
    }

    pub fn set_sampler_state(&mut self, name: &str, sampler: Option<Arc<Sampler>>) {
        self.shader_ref().sampler_param(name);
        match sampler {
            Some(sampler) => {
                self.samplers.insert(name.to_string(), sampler);
            }
            None => {
                self.samplers.remove(name);
            }
        }
    }

    /// Bound texture, falling back to the shader default.
    pub fn get_texture(&self, name: &str) -> Option<Arc<Texture>> {
        let param = self.shader_ref().texture_param(name);
        match self.textures.get(name) {
            Some(bound) => Some(Arc::clone(&bound.texture)),
            None => param.default_texture.clone(),
        }
    }

    /// Surface the bound texture is viewed through.
    pub fn get_texture_surface(&self, name: &str) -> TextureSurface {
        self.textures
            .get(name)
            .map_or(TextureSurface::COMPLETE, |bound| bound.surface)
    }

    pub fn get_load_store_texture(&self, name: &str) -> Option<Arc<Texture>> {
        self.shader_ref().load_store_texture_param(name);
        self.load_store_textures
            .get(name)
            .map(|bound| Arc::clone(&bound.texture))
    }

    pub fn get_buffer(&self, name: &str) -> Option<Arc<GpuBufferView>> {
        self.shader_ref().buffer_param(name);
        self.buffers.get(name).cloned()
    }

    /// Bound sampler, falling back to the shader default.
    pub fn get_sampler_state(&self, name: &str) -> Option<Arc<Sampler>> {
        let param = self.shader_ref().sampler_param(name);
        match self.samplers.get(name) {
            Some(sampler) => Some(Arc::clone(sampler)),
            None => param.default_sampler.clone(),
        }
    }

    /// Compile technique `technique_idx` and create one [`GpuParams`] per pass.
    ///
    /// # Panics
    ///
    /// Panics if `technique_idx` is out of range.
    pub fn create_gpu_params(&self, technique_idx: usize) -> Result<Vec<GpuParams>, GraphicsError> {
        let technique = self.technique(technique_idx);
        technique.compile(false)?;
        technique
            .passes()
            .iter()
            .map(|pass| pass.create_gpu_params())
            .collect()
    }

    /// Push every bound value into `params` under all GPU variable names of
    /// each parameter.
    ///
    /// Data parameters fall back to shader defaults and honor the stage
    /// they were set for. Unset objects fall back to shader defaults too.
    pub fn set_gpu_params(&self, params: &mut [GpuParams]) -> Result<(), GraphicsError> {
        let Some(shader) = &self.shader else {
            return Ok(());
        };
        let desc = shader.desc();

        for (name, param) in &desc.data_params {
            let (bytes, stage) = match self.data.get(name) {
                Some(value) => (value.bytes.as_slice(), value.stage),
                None => match &param.default_value {
                    Some(default) => (default.as_slice(), None),
                    None => continue,
                },
            };
            for gpu_params in params.iter_mut() {
                gpu_params.set_data(&param.gpu_variable_name, bytes, stage)?;
            }
        }

        for (name, param) in &desc.texture_params {
            let bound = self.textures.get(name);
            let texture = bound
                .map(|b| Arc::clone(&b.texture))
                .or_else(|| param.default_texture.clone());
            let surface = bound.map_or(TextureSurface::COMPLETE, |b| b.surface);
            for gpu_params in params.iter_mut() {
                for variable in &param.gpu_variable_names {
                    gpu_params.set_texture(variable, texture.clone(), surface);
                }
            }
        }

        for (name, param) in &desc.load_store_texture_params {
            let bound = self.load_store_textures.get(name);
            let texture = bound.map(|b| Arc::clone(&b.texture));
            let surface = bound.map_or(TextureSurface::COMPLETE, |b| b.surface);
            for gpu_params in params.iter_mut() {
                for variable in &param.gpu_variable_names {
                    gpu_params.set_load_store_texture(variable, texture.clone(), surface);
                }
            }
        }

        for (name, param) in &desc.buffer_params {
            let buffer = self.buffers.get(name).cloned();
            for gpu_params in params.iter_mut() {
                for variable in &param.gpu_variable_names {
                    gpu_params.set_buffer(variable, buffer.clone());
                }
            }
        }

        for (name, param) in &desc.sampler_params {
            let sampler = self
                .samplers
                .get(name)
                .cloned()
                .or_else(|| param.default_sampler.clone());
            for gpu_params in params.iter_mut() {
                for variable in &param.gpu_variable_names {
                    gpu_params.set_sampler(variable, sampler.clone());
                }
            }
        }

        Ok(())
    }
}

impl Resource for Material {
    fn identity(&self) -> &ResourceIdentity {
        &self.identity
    }

    fn initialize(&mut self) -> Result<(), GraphicsError> {
        self.initialize_techniques();
        self.initialized = self.shader.is_some();
        Ok(())
    }
}

impl std::fmt::Debug for Material {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Material")
            .field("name", &self.identity.name())
            .field("id", &self.id)
            .field("shader", &self.shader.as_ref().map(|s| s.id()))
            .field("variation", &self.variation)
            .field("techniques", &self.techniques.len())
            .finish()
    }
}

static_assertions::assert_impl_all!(Material: Send, Sync);
