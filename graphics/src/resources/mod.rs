//! GPU resources.
//!
//! This module contains the resource types created by [`GraphicsDevice`]:
//! - [`HardwareBuffer`] - lockable GPU memory shared by every buffer kind
//! - [`VertexBuffer`], [`IndexBuffer`], [`GpuBuffer`] - typed buffer kinds
//! - [`GpuParamBlockBuffer`] - parameter block with a CPU shadow copy
//! - [`GpuBufferView`] - cached typed view over a buffer
//! - [`VertexDeclaration`] - shared vertex input layout
//! - [`Texture`], [`Sampler`] - bindable texture and sampling state
//!
//! Buffers are owned values locked through `&mut self`. Views, declarations,
//! textures and samplers are shared with [`Arc`].
//!
//! [`GraphicsDevice`]: crate::GraphicsDevice
//! [`Arc`]: std::sync::Arc

mod buffer_view;
mod gpu_buffer;
mod hardware_buffer;
mod index_buffer;
mod param_block;
mod sampler;
mod texture;
mod vertex_buffer;
mod vertex_declaration;

pub use buffer_view::GpuBufferView;
pub use gpu_buffer::GpuBuffer;
pub use hardware_buffer::HardwareBuffer;
pub use index_buffer::IndexBuffer;
pub use param_block::GpuParamBlockBuffer;
pub use sampler::Sampler;
pub use texture::Texture;
pub use vertex_buffer::VertexBuffer;
pub use vertex_declaration::VertexDeclaration;
