//! # Tessel Graphics
//!
//! GPU resource and material layer of the Tessel renderer.
//!
//! ## Overview
//!
//! This crate provides:
//! - [`GraphicsDevice`] - Factory for hardware buffers, vertex declarations,
//!   textures and samplers on top of a [`GpuBackend`]
//! - [`resources`] - Lockable vertex, index, generic and param block buffers
//! - [`shader`] - Shader descriptions, variations and GPU programs
//! - [`materials`] - Techniques, passes, materials and per-pass GPU parameters
//! - [`mesh`] - Meshes uploaded from [`tessel_core::mesh::MeshData`]
//! - A dummy backend keeping everything in host memory (feature `dummy`)
//!
//! ## Example
//!
//! ```ignore
//! use tessel_graphics::{GraphicsDevice, Material, Shader, ShaderDesc, create_backend};
//!
//! let device = GraphicsDevice::new(create_backend()?);
//! let shader = Shader::create(&device, "Unlit", ShaderDesc::new())?;
//! let material = Material::create(&device, "Unlit", shader)?;
//! let technique = material.default_technique();
//! ```

pub mod backend;
pub mod device;
pub mod error;
pub mod materials;
pub mod mesh;
pub mod profiling;
pub mod resource;
pub mod resources;
pub mod shader;
pub mod types;

#[cfg(feature = "dummy")]
pub use backend::DummyBackend;
pub use backend::{BufferStorage, GpuBackend, GpuParamDesc, create_backend};
pub use device::{DeviceCapabilities, DeviceDescriptor, GraphicsDevice};
pub use error::GraphicsError;
pub use materials::{FindTechniqueDesc, GpuParams, Material, Pass, PassDesc, Technique};
pub use mesh::{Mesh, MeshDesc};
pub use resource::{LocalRegistry, Resource, ResourceIdentity, ResourceRegistry};
pub use resources::{
    GpuBuffer, GpuBufferView, GpuParamBlockBuffer, HardwareBuffer, IndexBuffer, Sampler, Texture,
    VertexBuffer, VertexDeclaration,
};
pub use shader::{
    DataParamDesc, GpuProgramDesc, Shader, ShaderDesc, ShaderVariation, ShaderVariationParam,
    VariationAxis, generate_variations,
};

/// Graphics library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Log the graphics library version.
pub fn init() {
    log::info!("Tessel Graphics v{} initialized", VERSION);
}
