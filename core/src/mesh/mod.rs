//! Vertex layouts and CPU-side mesh data.
//!
//! - [`VertexDataDesc`] - Ordered vertex elements across one or more streams
//! - [`MeshData`] - Index region plus vertex streams in a single buffer
//! - [`SubMesh`] - Index range drawn with one material
//!
//! These types are GPU-agnostic; `tessel-graphics` uploads them into
//! hardware buffers.

mod data;
mod error;
mod layout;

pub use data::{DrawOperation, IndexType, MeshData, SubMesh};
pub use error::MeshError;
pub use layout::{
    INVALID_ELEMENT, VertexDataDesc, VertexElement, VertexElementSemantic, VertexElementType,
};
