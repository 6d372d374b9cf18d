//! GPU sampler state.

use std::sync::{Arc, Weak};

use crate::device::GraphicsDevice;
use crate::types::{FilterType, SamplerDescriptor};

/// Immutable sampling state bound next to textures.
///
/// Built by [`GraphicsDevice::create_sampler`], which rejects inverted LOD
/// ranges and anisotropic filtering without an anisotropy level.
pub struct Sampler {
    device: Weak<GraphicsDevice>,
    descriptor: SamplerDescriptor,
}

impl Sampler {
    pub(crate) fn new(device: Weak<GraphicsDevice>, descriptor: SamplerDescriptor) -> Self {
        Self { device, descriptor }
    }

    /// Get the parent device, if it still exists.
    pub fn device(&self) -> Option<Arc<GraphicsDevice>> {
        self.device.upgrade()
    }

    pub fn descriptor(&self) -> &SamplerDescriptor {
        &self.descriptor
    }

    /// Get the sampler label, if set.
    pub fn label(&self) -> Option<&str> {
        self.descriptor.label.as_deref()
    }

    /// Whether the sampler performs depth comparison.
    pub fn is_comparison(&self) -> bool {
        self.descriptor.compare.is_some()
    }

    /// Anisotropy level in effect, 1 when no filter is anisotropic.
    pub fn effective_anisotropy(&self) -> u32 {
        let filter = &self.descriptor.filter;
        let anisotropic = [filter.min, filter.mag, filter.mip]
            .contains(&FilterType::Anisotropic);
        if anisotropic {
            self.descriptor.max_anisotropy.max(1)
        } else {
            1
        }
    }

    /// Clamp `lod` into the sampler's range after applying the mip bias.
    pub fn resolve_lod(&self, lod: f32) -> f32 {
        (lod + self.descriptor.mip_bias).clamp(self.descriptor.min_lod, self.descriptor.max_lod)
    }
}

impl std::fmt::Debug for Sampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sampler")
            .field("filter", &self.descriptor.filter)
            .field("addressing", &self.descriptor.addressing)
            .field("compare", &self.descriptor.compare)
            .field("label", &self.descriptor.label)
            .finish()
    }
}

static_assertions::assert_impl_all!(Sampler: Send, Sync);
