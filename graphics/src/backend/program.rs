//! Program compilation contract and parameter reflection.

use std::collections::HashMap;
use std::sync::Arc;

use crate::types::{GpuParamDataType, GpuParamObjectType, GpuProgramType, ObjectParamCategory};

/// Input to [`GpuBackend::compile_program`](super::GpuBackend::compile_program).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramCompileRequest {
    pub program_type: GpuProgramType,
    pub entry_point: String,
    pub source: String,
    /// Shading language tag, e.g. `"hlsl"`.
    pub language: String,
    pub include_path: Option<String>,
    /// Preprocessor defines as name/value pairs.
    pub defines: Vec<(String, String)>,
}

/// Result of a program compilation.
#[derive(Debug, Clone)]
pub struct ProgramCompileOutput {
    pub success: bool,
    /// Diagnostic text; empty on a clean compile.
    pub message: String,
    /// Backend-specific bytecode.
    pub instructions: Vec<u8>,
    /// Reflected parameters.
    pub param_desc: Arc<GpuParamDesc>,
}

impl ProgramCompileOutput {
    /// Failed compilation with a diagnostic.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            instructions: Vec::new(),
            param_desc: Arc::new(GpuParamDesc::default()),
        }
    }
}

/// A reflected constant buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GpuParamBlockDesc {
    pub name: String,
    pub slot: u32,
    pub set: u32,
    /// Size in bytes.
    pub block_size: u32,
}

/// A reflected inline data parameter living in a param block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GpuParamDataDesc {
    pub name: String,
    pub param_type: GpuParamDataType,
    /// Name of the owning param block.
    pub block: String,
    /// Byte offset inside the block.
    pub offset: u32,
    pub array_size: u32,
    pub element_size: u32,
}

impl GpuParamDataDesc {
    /// Total size in bytes.
    pub fn size(&self) -> u32 {
        self.element_size * self.array_size.max(1)
    }
}

/// A reflected texture, buffer or sampler slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GpuParamObjectDesc {
    pub name: String,
    pub object_type: GpuParamObjectType,
    pub slot: u32,
    pub set: u32,
}

/// All parameters a compiled program exposes, keyed by GPU variable name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GpuParamDesc {
    pub param_blocks: HashMap<String, GpuParamBlockDesc>,
    pub params: HashMap<String, GpuParamDataDesc>,
    pub textures: HashMap<String, GpuParamObjectDesc>,
    pub load_store_textures: HashMap<String, GpuParamObjectDesc>,
    pub buffers: HashMap<String, GpuParamObjectDesc>,
    pub samplers: HashMap<String, GpuParamObjectDesc>,
}

impl GpuParamDesc {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a param block.
    pub fn with_param_block(mut self, name: &str, slot: u32, block_size: u32) -> Self {
        self.param_blocks.insert(
            name.to_string(),
            GpuParamBlockDesc {
                name: name.to_string(),
                slot,
                set: 0,
                block_size,
            },
        );
        self
    }

    /// Add a data parameter inside an existing block.
    pub fn with_data_param(
        mut self,
        name: &str,
        block: &str,
        offset: u32,
        param_type: GpuParamDataType,
    ) -> Self {
        self.params.insert(
            name.to_string(),
            GpuParamDataDesc {
                name: name.to_string(),
                param_type,
                block: block.to_string(),
                offset,
                array_size: 1,
                element_size: param_type.size(),
            },
        );
        self
    }

    /// Add an object parameter; the map is chosen from its type.
    pub fn with_object(mut self, name: &str, object_type: GpuParamObjectType, slot: u32) -> Self {
        let desc = GpuParamObjectDesc {
            name: name.to_string(),
            object_type,
            slot,
            set: 0,
        };
        let map = match object_type.category() {
            ObjectParamCategory::Sampler => &mut self.samplers,
            ObjectParamCategory::Buffer => &mut self.buffers,
            ObjectParamCategory::Texture if object_type.is_load_store_texture() => {
                &mut self.load_store_textures
            }
            ObjectParamCategory::Texture => &mut self.textures,
        };
        map.insert(name.to_string(), desc);
        self
    }

    /// Whether the program declares nothing.
    pub fn is_empty(&self) -> bool {
        self.param_blocks.is_empty()
            && self.params.is_empty()
            && self.textures.is_empty()
            && self.load_store_textures.is_empty()
            && self.buffers.is_empty()
            && self.samplers.is_empty()
    }
}
