//! Descriptors, usage flags and format enums for graphics resources.

mod buffer;
mod param;
mod sampler;
mod state;
mod texture;

pub use buffer::{
    BufferUsage, BufferWriteType, GpuBufferDesc, GpuBufferFormat, GpuBufferType, GpuLockOptions,
    GpuViewKey, IndexBufferDesc, VertexBufferDesc,
};
pub use param::{GpuParamDataType, GpuParamObjectType, GpuProgramType, ObjectParamCategory};
pub use sampler::{
    CompareFunction, FilterOptions, FilterType, SamplerDescriptor, TextureAddressingMode,
    UvwAddressing,
};
pub use state::{
    BlendComponent, BlendFactor, BlendOperation, BlendState, CullMode, DepthStencilState,
    MAX_RENDER_TARGETS, PolygonMode, RasterizerState, RenderTargetBlendState, StencilFace,
    StencilOperation,
};
pub use texture::{
    TextureDescriptor, TextureFormat, TextureSurface, TextureType, TextureUsage,
};
