//! Materials and the techniques they render with.
//!
//! - [`Technique`]: language, tags, variation and an ordered list of [`Pass`]es
//! - [`Pass`]: fixed-function state plus one GPU program per stage
//! - [`GpuParams`]: per-pass parameter storage as reflected from the programs
//! - [`Material`]: parameter values for a shader and technique selection

mod material;
mod params;
mod pass;
mod technique;

pub use material::{FindTechniqueDesc, Material};
pub use params::{BoundTexture, GpuParams};
pub use pass::{Pass, PassDesc};
pub use technique::{ANY_LANGUAGE, Technique};
