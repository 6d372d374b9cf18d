//! Render passes.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::device::GraphicsDevice;
use crate::error::GraphicsError;
use crate::shader::{GpuProgram, GpuProgramDesc, ShaderVariation};
use crate::types::{BlendState, DepthStencilState, GpuProgramType, RasterizerState};

use super::params::GpuParams;

/// Pipeline state and programs of one pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PassDesc {
    pub blend_state: BlendState,
    pub depth_stencil_state: DepthStencilState,
    pub rasterizer_state: RasterizerState,
    pub stencil_ref_value: u32,
    /// At most one program per stage.
    pub programs: BTreeMap<GpuProgramType, GpuProgramDesc>,
}

impl PassDesc {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the program for its stage, replacing any previous one.
    pub fn with_program(mut self, program: GpuProgramDesc) -> Self {
        self.programs.insert(program.program_type, program);
        self
    }

    pub fn with_blend_state(mut self, blend_state: BlendState) -> Self {
        self.blend_state = blend_state;
        self
    }

    pub fn with_depth_stencil_state(mut self, state: DepthStencilState) -> Self {
        self.depth_stencil_state = state;
        self
    }

    pub fn with_rasterizer_state(mut self, state: RasterizerState) -> Self {
        self.rasterizer_state = state;
        self
    }

    pub fn with_stencil_ref(mut self, value: u32) -> Self {
        self.stencil_ref_value = value;
        self
    }
}

/// One pass of a technique.
///
/// Programs are created with the pass and compiled on
/// [`compile`](Self::compile), using the defines of the owning technique's
/// variation.
pub struct Pass {
    device: Arc<GraphicsDevice>,
    desc: PassDesc,
    programs: BTreeMap<GpuProgramType, GpuProgram>,
}

impl Pass {
    pub fn new(device: &Arc<GraphicsDevice>, desc: PassDesc) -> Self {
        let programs = desc
            .programs
            .iter()
            .map(|(stage, program)| (*stage, GpuProgram::new(Arc::clone(device), program.clone())))
            .collect();
        Self {
            device: Arc::clone(device),
            desc,
            programs,
        }
    }

    pub fn desc(&self) -> &PassDesc {
        &self.desc
    }

    pub fn blend_state(&self) -> &BlendState {
        &self.desc.blend_state
    }

    pub fn depth_stencil_state(&self) -> &DepthStencilState {
        &self.desc.depth_stencil_state
    }

    pub fn rasterizer_state(&self) -> &RasterizerState {
        &self.desc.rasterizer_state
    }

    pub fn stencil_ref_value(&self) -> u32 {
        self.desc.stencil_ref_value
    }

    pub fn program(&self, stage: GpuProgramType) -> Option<&GpuProgram> {
        self.programs.get(&stage)
    }

    /// Whether the pass runs a compute program.
    pub fn is_compute(&self) -> bool {
        self.programs.contains_key(&GpuProgramType::Compute)
    }

    /// Whether the pass blends with what is already in the target.
    pub fn has_blending(&self) -> bool {
        self.desc.blend_state.is_enabled()
    }

    pub fn is_compiled(&self) -> bool {
        self.programs.values().all(GpuProgram::is_compiled)
    }

    /// Compile every program with the defines of `variation`.
    pub fn compile(&self, variation: &ShaderVariation, force: bool) -> Result<(), GraphicsError> {
        let defines = variation.defines();
        for program in self.programs.values() {
            program.compile(&defines, force)?;
        }
        Ok(())
    }

    /// Parameter storage matching the compiled programs' reflection.
    ///
    /// # Errors
    ///
    /// [`GraphicsError::InvalidState`] if the pass has not been compiled.
    pub fn create_gpu_params(&self) -> Result<GpuParams, GraphicsError> {
        let mut descs = BTreeMap::new();
        for (stage, program) in &self.programs {
            let Some(desc) = program.param_desc() else {
                return Err(GraphicsError::InvalidState(format!(
                    "{:?} program '{}' is not compiled",
                    stage,
                    program.desc().entry_point
                )));
            };
            descs.insert(*stage, desc);
        }
        GpuParams::new(&self.device, descs)
    }
}

impl std::fmt::Debug for Pass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pass")
            .field("programs", &self.programs.keys().collect::<Vec<_>>())
            .field("blend_state", &self.desc.blend_state)
            .finish()
    }
}

static_assertions::assert_impl_all!(Pass: Send, Sync);
