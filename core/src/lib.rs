//! # Tessel Core
//!
//! GPU-agnostic building blocks for the Tessel renderer:
//!
//! - [`mesh`] - Vertex layout descriptors and the combined index/vertex [`mesh::MeshData`] buffer
//! - [`math`] - Axis-aligned boxes, bounding spheres and mesh bounds
//! - [`id`] - Thread-safe unique id allocation for engine objects
//! - [`profiling`] - Optional Tracy instrumentation macros

pub mod id;
pub mod math;
pub mod mesh;
pub mod profiling;

/// Core library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Log the core library version.
pub fn init() {
    log::info!("Tessel Core v{} initialized", VERSION);
}
