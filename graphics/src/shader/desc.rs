//! Shader descriptors.
//!
//! A [`ShaderDesc`] declares the parameters a shader exposes to materials
//! and the techniques that implement it. Every parameter has a user-facing
//! name and one or more GPU variable names it is bound to in the compiled
//! programs. A name lives in exactly one parameter map at a time.

use std::collections::HashMap;
use std::sync::Arc;

use crate::materials::Technique;
use crate::resources::{Sampler, Texture};
use crate::types::{BufferUsage, GpuParamDataType, GpuParamObjectType, ObjectParamCategory};

/// Declaration of an inline data parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct DataParamDesc {
    pub name: String,
    pub gpu_variable_name: String,
    pub param_type: GpuParamDataType,
    /// Number of array elements; 1 for scalars.
    pub array_size: u32,
    pub element_size: u32,
    /// Value used while a material has not set the parameter.
    pub default_value: Option<Vec<u8>>,
}

impl DataParamDesc {
    pub fn new(name: impl Into<String>, gpu_variable_name: impl Into<String>, param_type: GpuParamDataType) -> Self {
        Self {
            name: name.into(),
            gpu_variable_name: gpu_variable_name.into(),
            param_type,
            array_size: 1,
            element_size: param_type.size(),
            default_value: None,
        }
    }

    pub fn with_array_size(mut self, array_size: u32) -> Self {
        self.array_size = array_size;
        self
    }

    /// Element size for [`GpuParamDataType::Struct`] parameters.
    pub fn with_element_size(mut self, element_size: u32) -> Self {
        self.element_size = element_size;
        self
    }

    pub fn with_default<T: bytemuck::Pod>(mut self, value: &T) -> Self {
        self.default_value = Some(bytemuck::bytes_of(value).to_vec());
        self
    }

    /// Total size in bytes.
    pub fn size(&self) -> u32 {
        self.element_size * self.array_size.max(1)
    }
}

/// Declaration of a texture, buffer or sampler parameter.
#[derive(Debug, Clone)]
pub struct ObjectParamDesc {
    pub name: String,
    /// Every GPU variable the parameter is bound to.
    pub gpu_variable_names: Vec<String>,
    pub object_type: GpuParamObjectType,
    pub default_texture: Option<Arc<Texture>>,
    pub default_sampler: Option<Arc<Sampler>>,
}

/// Per param block settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamBlockAttribs {
    /// Shared blocks are owned by the renderer, not by materials.
    pub shared: bool,
    pub usage: BufferUsage,
}

impl Default for ParamBlockAttribs {
    fn default() -> Self {
        Self {
            shared: false,
            usage: BufferUsage::DYNAMIC,
        }
    }
}

/// How objects using the shader are ordered in the render queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum QueueSortType {
    #[default]
    FrontToBack,
    BackToFront,
    None,
}

/// Parameters and techniques of a shader.
#[derive(Debug, Clone, Default)]
pub struct ShaderDesc {
    pub data_params: HashMap<String, DataParamDesc>,
    pub texture_params: HashMap<String, ObjectParamDesc>,
    pub load_store_texture_params: HashMap<String, ObjectParamDesc>,
    pub buffer_params: HashMap<String, ObjectParamDesc>,
    pub sampler_params: HashMap<String, ObjectParamDesc>,
    pub param_blocks: HashMap<String, ParamBlockAttribs>,
    pub queue_sort_type: QueueSortType,
    pub queue_priority: i32,
    /// Passes may be rendered out of order with other objects' passes.
    pub separable_passes: bool,
    pub techniques: Vec<Arc<Technique>>,
}

impl ShaderDesc {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a data parameter, replacing any parameter of the same name.
    pub fn add_data_parameter(&mut self, desc: DataParamDesc) {
        let name = desc.name.clone();
        self.texture_params.remove(&name);
        self.load_store_texture_params.remove(&name);
        self.buffer_params.remove(&name);
        self.sampler_params.remove(&name);
        self.data_params.insert(name, desc);
    }

    /// Declare a texture parameter. See [`add_object_parameter`](Self::add_object_parameter).
    pub fn add_texture_parameter(
        &mut self,
        name: &str,
        gpu_variable_name: &str,
        object_type: GpuParamObjectType,
        default_texture: Option<Arc<Texture>>,
    ) {
        self.add_object_parameter(name, gpu_variable_name, object_type);
        if default_texture.is_some() {
            if let Some(desc) = self.object_map_mut(object_type).get_mut(name) {
                if desc.object_type == object_type {
                    desc.default_texture = default_texture;
                }
            }
        }
    }

    /// Declare a sampler parameter. See [`add_object_parameter`](Self::add_object_parameter).
    pub fn add_sampler_parameter(
        &mut self,
        name: &str,
        gpu_variable_name: &str,
        object_type: GpuParamObjectType,
        default_sampler: Option<Arc<Sampler>>,
    ) {
        self.add_object_parameter(name, gpu_variable_name, object_type);
        if default_sampler.is_some() {
            if let Some(desc) = self.object_map_mut(object_type).get_mut(name) {
                if desc.object_type == object_type {
                    desc.default_sampler = default_sampler;
                }
            }
        }
    }

    /// Declare an object parameter bound to `gpu_variable_name`.
    ///
    /// The map is picked from `object_type`. Re-declaring an existing name
    /// with the same type adds another GPU variable alias; with a different
    /// type the declaration is ignored and a warning is logged. The name is
    /// removed from every other parameter map.
    pub fn add_object_parameter(
        &mut self,
        name: &str,
        gpu_variable_name: &str,
        object_type: GpuParamObjectType,
    ) {
        let map = self.object_map_mut(object_type);
        match map.get_mut(name) {
            Some(existing) if existing.object_type != object_type => {
                log::warn!(
                    "Shader parameter '{}' already declared as {:?}, ignoring redeclaration as {:?}",
                    name,
                    existing.object_type,
                    object_type
                );
                return;
            }
            Some(existing) => {
                if !existing.gpu_variable_names.iter().any(|v| v == gpu_variable_name) {
                    existing.gpu_variable_names.push(gpu_variable_name.to_string());
                }
            }
            None => {
                map.insert(
                    name.to_string(),
                    ObjectParamDesc {
                        name: name.to_string(),
                        gpu_variable_names: vec![gpu_variable_name.to_string()],
                        object_type,
                        default_texture: None,
                        default_sampler: None,
                    },
                );
            }
        }

        self.data_params.remove(name);
        let keep = map_kind(object_type);
        for kind in [MapKind::Texture, MapKind::LoadStoreTexture, MapKind::Buffer, MapKind::Sampler] {
            if kind != keep {
                self.object_map_by_kind(kind).remove(name);
            }
        }
    }

    /// Set how a param block is allocated.
    pub fn set_param_block_attribs(&mut self, name: &str, shared: bool, usage: BufferUsage) {
        self.param_blocks
            .insert(name.to_string(), ParamBlockAttribs { shared, usage });
    }

    pub fn add_technique(&mut self, technique: Arc<Technique>) {
        self.techniques.push(technique);
    }

    fn object_map_mut(&mut self, object_type: GpuParamObjectType) -> &mut HashMap<String, ObjectParamDesc> {
        self.object_map_by_kind(map_kind(object_type))
    }

    fn object_map_by_kind(&mut self, kind: MapKind) -> &mut HashMap<String, ObjectParamDesc> {
        match kind {
            MapKind::Texture => &mut self.texture_params,
            MapKind::LoadStoreTexture => &mut self.load_store_texture_params,
            MapKind::Buffer => &mut self.buffer_params,
            MapKind::Sampler => &mut self.sampler_params,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MapKind {
    Texture,
    LoadStoreTexture,
    Buffer,
    Sampler,
}

fn map_kind(object_type: GpuParamObjectType) -> MapKind {
    match object_type.category() {
        ObjectParamCategory::Sampler => MapKind::Sampler,
        ObjectParamCategory::Buffer => MapKind::Buffer,
        ObjectParamCategory::Texture if object_type.is_load_store_texture() => MapKind::LoadStoreTexture,
        ObjectParamCategory::Texture => MapKind::Texture,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_param_replaces_object_param() {
        let mut desc = ShaderDesc::new();
        desc.add_texture_parameter("Albedo", "gAlbedoTex", GpuParamObjectType::Texture2D, None);
        desc.add_data_parameter(DataParamDesc::new("Albedo", "gAlbedo", GpuParamDataType::Color));

        assert!(desc.texture_params.is_empty());
        assert_eq!(desc.data_params["Albedo"].size(), 16);
    }

    #[test]
    fn test_object_param_aliases() {
        let mut desc = ShaderDesc::new();
        desc.add_texture_parameter("Albedo", "gAlbedoTex", GpuParamObjectType::Texture2D, None);
        desc.add_texture_parameter("Albedo", "gDiffuseTex", GpuParamObjectType::Texture2D, None);
        desc.add_texture_parameter("Albedo", "gAlbedoTex", GpuParamObjectType::Texture2D, None);

        assert_eq!(
            desc.texture_params["Albedo"].gpu_variable_names,
            vec!["gAlbedoTex".to_string(), "gDiffuseTex".to_string()]
        );
    }

    #[test]
    fn test_conflicting_object_type_is_ignored() {
        let mut desc = ShaderDesc::new();
        desc.add_texture_parameter("Albedo", "gAlbedoTex", GpuParamObjectType::Texture2D, None);
        desc.add_texture_parameter("Albedo", "gAlbedoCube", GpuParamObjectType::TextureCube, None);

        let param = &desc.texture_params["Albedo"];
        assert_eq!(param.object_type, GpuParamObjectType::Texture2D);
        assert_eq!(param.gpu_variable_names, vec!["gAlbedoTex".to_string()]);
    }

    #[test]
    fn test_object_param_moves_between_maps() {
        let mut desc = ShaderDesc::new();
        desc.add_data_parameter(DataParamDesc::new("Lights", "gLights", GpuParamDataType::Float4));
        desc.add_object_parameter("Lights", "gLightBuffer", GpuParamObjectType::StructuredBuffer);
        assert!(desc.data_params.is_empty());
        assert!(desc.buffer_params.contains_key("Lights"));

        desc.add_sampler_parameter("Lights", "gLightSampler", GpuParamObjectType::Sampler2D, None);
        assert!(desc.buffer_params.is_empty());
        assert!(desc.sampler_params.contains_key("Lights"));
    }

    #[test]
    fn test_default_value() {
        let param = DataParamDesc::new("Roughness", "gRoughness", GpuParamDataType::Float1)
            .with_default(&0.5f32);
        assert_eq!(param.default_value.as_deref(), Some(&0.5f32.to_ne_bytes()[..]));
    }
}
