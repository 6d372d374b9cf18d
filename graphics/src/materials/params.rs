//! Per-pass GPU parameter sets.
//!
//! [`GpuParams`] is the hand-off point between materials and the render
//! backend. It is built from the reflected [`GpuParamDesc`] of every program
//! in a pass and holds the values bound to each GPU variable: param block
//! contents, textures, buffers and samplers. Param blocks with the same name
//! are shared between stages.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::backend::GpuParamDesc;
use crate::device::GraphicsDevice;
use crate::error::GraphicsError;
use crate::resources::{GpuBufferView, GpuParamBlockBuffer, Sampler, Texture};
use crate::types::{BufferUsage, GpuProgramType, TextureSurface};

/// A texture bound together with the surface it is viewed through.
#[derive(Debug, Clone)]
pub struct BoundTexture {
    pub texture: Arc<Texture>,
    pub surface: TextureSurface,
}

#[derive(Debug, Default)]
struct StageBindings {
    textures: HashMap<String, BoundTexture>,
    load_store_textures: HashMap<String, BoundTexture>,
    buffers: HashMap<String, Arc<GpuBufferView>>,
    samplers: HashMap<String, Arc<Sampler>>,
}

/// Parameter values for every program stage of one pass.
pub struct GpuParams {
    descs: BTreeMap<GpuProgramType, Arc<GpuParamDesc>>,
    blocks: HashMap<String, GpuParamBlockBuffer>,
    bindings: BTreeMap<GpuProgramType, StageBindings>,
}

impl GpuParams {
    /// Create parameter storage for the given per-stage reflections.
    ///
    /// One param block buffer is allocated per distinct block name, sized to
    /// the largest declaration.
    pub fn new(
        device: &GraphicsDevice,
        descs: BTreeMap<GpuProgramType, Arc<GpuParamDesc>>,
    ) -> Result<Self, GraphicsError> {
        let mut block_sizes: HashMap<&str, u32> = HashMap::new();
        for desc in descs.values() {
            for block in desc.param_blocks.values() {
                let size = block_sizes.entry(block.name.as_str()).or_default();
                *size = (*size).max(block.block_size);
            }
        }

        let mut blocks = HashMap::new();
        for (name, size) in block_sizes {
            if size == 0 {
                continue;
            }
            let block = device.create_param_block_buffer(size, BufferUsage::DYNAMIC)?;
            blocks.insert(name.to_string(), block);
        }

        let bindings = descs
            .keys()
            .map(|stage| (*stage, StageBindings::default()))
            .collect();

        Ok(Self {
            descs,
            blocks,
            bindings,
        })
    }

    /// Stages with a program.
    pub fn stages(&self) -> impl Iterator<Item = GpuProgramType> + '_ {
        self.descs.keys().copied()
    }

    pub fn param_desc(&self, stage: GpuProgramType) -> Option<&Arc<GpuParamDesc>> {
        self.descs.get(&stage)
    }

    pub fn param_block(&self, name: &str) -> Option<&GpuParamBlockBuffer> {
        self.blocks.get(name)
    }

    pub fn param_block_mut(&mut self, name: &str) -> Option<&mut GpuParamBlockBuffer> {
        self.blocks.get_mut(name)
    }

    pub fn num_param_blocks(&self) -> usize {
        self.blocks.len()
    }

    /// Whether any stage declares the data parameter `gpu_variable`.
    pub fn has_data(&self, gpu_variable: &str) -> bool {
        self.descs.values().any(|d| d.params.contains_key(gpu_variable))
    }

    /// Write `data` into the block slot of `gpu_variable`.
    ///
    /// With `stage` set only that stage's declaration is used. Data longer
    /// than the declared size is truncated. Returns the number of stage
    /// declarations written.
    pub fn set_data(
        &mut self,
        gpu_variable: &str,
        data: &[u8],
        stage: Option<GpuProgramType>,
    ) -> Result<usize, GraphicsError> {
        let mut written = 0;
        for (program_type, desc) in &self.descs {
            if stage.is_some_and(|s| s != *program_type) {
                continue;
            }
            let Some(param) = desc.params.get(gpu_variable) else {
                continue;
            };
            let Some(block) = self.blocks.get_mut(&param.block) else {
                continue;
            };

            let size = (param.size() as usize).min(data.len());
            if size < data.len() {
                log::warn!(
                    "GpuParams: '{}' holds {} bytes, {} given; truncating",
                    gpu_variable,
                    param.size(),
                    data.len()
                );
            }
            block.write(param.offset, &data[..size])?;
            written += 1;
        }
        Ok(written)
    }

    /// Bind `texture` to `gpu_variable` in every stage that declares it.
    pub fn set_texture(
        &mut self,
        gpu_variable: &str,
        texture: Option<Arc<Texture>>,
        surface: TextureSurface,
    ) -> usize {
        self.bind(
            |d| d.textures.contains_key(gpu_variable),
            |b| match &texture {
                Some(texture) => {
                    b.textures.insert(
                        gpu_variable.to_string(),
                        BoundTexture {
                            texture: Arc::clone(texture),
                            surface,
                        },
                    );
                }
                None => {
                    b.textures.remove(gpu_variable);
                }
            },
        )
    }

    pub fn set_load_store_texture(
        &mut self,
        gpu_variable: &str,
        texture: Option<Arc<Texture>>,
        surface: TextureSurface,
    ) -> usize {
        self.bind(
            |d| d.load_store_textures.contains_key(gpu_variable),
            |b| match &texture {
                Some(texture) => {
                    b.load_store_textures.insert(
                        gpu_variable.to_string(),
                        BoundTexture {
                            texture: Arc::clone(texture),
                            surface,
                        },
                    );
                }
                None => {
                    b.load_store_textures.remove(gpu_variable);
                }
            },
        )
    }

    pub fn set_buffer(&mut self, gpu_variable: &str, buffer: Option<Arc<GpuBufferView>>) -> usize {
        self.bind(
            |d| d.buffers.contains_key(gpu_variable),
            |b| match &buffer {
                Some(buffer) => {
                    b.buffers.insert(gpu_variable.to_string(), Arc::clone(buffer));
                }
                None => {
                    b.buffers.remove(gpu_variable);
                }
            },
        )
    }

    pub fn set_sampler(&mut self, gpu_variable: &str, sampler: Option<Arc<Sampler>>) -> usize {
        self.bind(
            |d| d.samplers.contains_key(gpu_variable),
            |b| match &sampler {
                Some(sampler) => {
                    b.samplers.insert(gpu_variable.to_string(), Arc::clone(sampler));
                }
                None => {
                    b.samplers.remove(gpu_variable);
                }
            },
        )
    }

    pub fn texture(&self, stage: GpuProgramType, gpu_variable: &str) -> Option<&BoundTexture> {
        self.bindings.get(&stage)?.textures.get(gpu_variable)
    }

    pub fn load_store_texture(&self, stage: GpuProgramType, gpu_variable: &str) -> Option<&BoundTexture> {
        self.bindings.get(&stage)?.load_store_textures.get(gpu_variable)
    }

    pub fn buffer(&self, stage: GpuProgramType, gpu_variable: &str) -> Option<&Arc<GpuBufferView>> {
        self.bindings.get(&stage)?.buffers.get(gpu_variable)
    }

    pub fn sampler(&self, stage: GpuProgramType, gpu_variable: &str) -> Option<&Arc<Sampler>> {
        self.bindings.get(&stage)?.samplers.get(gpu_variable)
    }

    /// Upload every dirty param block. Returns how many were uploaded.
    pub fn flush(&mut self) -> Result<usize, GraphicsError> {
        let mut uploaded = 0;
        for block in self.blocks.values_mut() {
            if block.flush_to_gpu()? {
                uploaded += 1;
            }
        }
        Ok(uploaded)
    }

    fn bind(
        &mut self,
        declares: impl Fn(&GpuParamDesc) -> bool,
        mut apply: impl FnMut(&mut StageBindings),
    ) -> usize {
        let mut bound = 0;
        for (stage, desc) in &self.descs {
            if !declares(desc) {
                continue;
            }
            if let Some(bindings) = self.bindings.get_mut(stage) {
                apply(bindings);
                bound += 1;
            }
        }
        bound
    }
}

impl std::fmt::Debug for GpuParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GpuParams")
            .field("stages", &self.descs.keys().collect::<Vec<_>>())
            .field("param_blocks", &self.blocks.len())
            .finish()
    }
}

static_assertions::assert_impl_all!(GpuParams: Send, Sync);
