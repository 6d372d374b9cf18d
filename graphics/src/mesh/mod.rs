//! GPU meshes.
//!
//! A [`Mesh`] owns the hardware buffers that [`MeshData`] is uploaded into:
//! one index buffer plus one vertex buffer per stream, together with the
//! cached vertex declaration, sub-meshes and bounds.
//!
//! [`MeshData`]: tessel_core::mesh::MeshData

mod data;

pub use data::{Mesh, MeshDesc};
