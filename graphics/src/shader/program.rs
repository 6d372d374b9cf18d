//! Lazily compiled GPU programs.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::backend::{GpuParamDesc, ProgramCompileRequest};
use crate::device::GraphicsDevice;
use crate::error::GraphicsError;
use crate::types::GpuProgramType;

use super::variation::ShaderDefines;

/// Source and entry point of one program stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GpuProgramDesc {
    pub program_type: GpuProgramType,
    pub entry_point: String,
    pub source: String,
    /// Shading language tag, e.g. `"hlsl"`.
    pub language: String,
    pub include_path: Option<String>,
}

impl GpuProgramDesc {
    pub fn new(
        program_type: GpuProgramType,
        entry_point: impl Into<String>,
        source: impl Into<String>,
        language: impl Into<String>,
    ) -> Self {
        Self {
            program_type,
            entry_point: entry_point.into(),
            source: source.into(),
            language: language.into(),
            include_path: None,
        }
    }

    pub fn with_include_path(mut self, path: impl Into<String>) -> Self {
        self.include_path = Some(path.into());
        self
    }
}

#[derive(Debug)]
struct CompiledProgram {
    instructions: Arc<[u8]>,
    param_desc: Arc<GpuParamDesc>,
}

/// A GPU program compiled on first use.
pub struct GpuProgram {
    device: Arc<GraphicsDevice>,
    desc: GpuProgramDesc,
    compiled: Mutex<Option<CompiledProgram>>,
}

impl GpuProgram {
    pub fn new(device: Arc<GraphicsDevice>, desc: GpuProgramDesc) -> Self {
        Self {
            device,
            desc,
            compiled: Mutex::new(None),
        }
    }

    pub fn desc(&self) -> &GpuProgramDesc {
        &self.desc
    }

    pub fn program_type(&self) -> GpuProgramType {
        self.desc.program_type
    }

    pub fn is_compiled(&self) -> bool {
        self.compiled.lock().is_some()
    }

    /// Compile with `defines` unless already compiled; `force` recompiles.
    ///
    /// The stage define (e.g. `VERTEX`) is always added.
    pub fn compile(&self, defines: &ShaderDefines, force: bool) -> Result<(), GraphicsError> {
        let mut compiled = self.compiled.lock();
        if compiled.is_some() && !force {
            return Ok(());
        }

        let mut request_defines: Vec<(String, String)> = defines
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        request_defines.push((self.desc.program_type.define().to_string(), "1".to_string()));

        let output = self.device.compile_program(&ProgramCompileRequest {
            program_type: self.desc.program_type,
            entry_point: self.desc.entry_point.clone(),
            source: self.desc.source.clone(),
            language: self.desc.language.clone(),
            include_path: self.desc.include_path.clone(),
            defines: request_defines,
        });

        if !output.success {
            log::warn!(
                "GpuProgram: '{}' failed to compile: {}",
                self.desc.entry_point,
                output.message
            );
            *compiled = None;
            return Err(GraphicsError::ProgramCompilation {
                entry_point: self.desc.entry_point.clone(),
                message: output.message,
            });
        }

        *compiled = Some(CompiledProgram {
            instructions: output.instructions.into(),
            param_desc: output.param_desc,
        });
        Ok(())
    }

    /// Reflected parameters, once compiled.
    pub fn param_desc(&self) -> Option<Arc<GpuParamDesc>> {
        self.compiled.lock().as_ref().map(|c| Arc::clone(&c.param_desc))
    }

    /// Compiled bytecode, once compiled.
    pub fn instructions(&self) -> Option<Arc<[u8]>> {
        self.compiled.lock().as_ref().map(|c| Arc::clone(&c.instructions))
    }
}

impl std::fmt::Debug for GpuProgram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GpuProgram")
            .field("type", &self.desc.program_type)
            .field("entry_point", &self.desc.entry_point)
            .field("language", &self.desc.language)
            .field("compiled", &self.is_compiled())
            .finish()
    }
}

static_assertions::assert_impl_all!(GpuProgram: Send, Sync);
