//! Texture resources.

use std::sync::{Arc, Weak};

use crate::device::GraphicsDevice;
use crate::types::{TextureDescriptor, TextureFormat, TextureSurface, TextureType, TextureUsage};

/// Image data living on the GPU.
///
/// Created through [`GraphicsDevice::create_texture`]. Materials hold an
/// `Arc` for every bound texture, so a texture outlives the last material
/// that samples it.
///
/// ```ignore
/// let bricks = device.create_texture(
///     &TextureDescriptor::new_2d(512, 512, TextureFormat::Rgba8, TextureUsage::SAMPLED)
///         .with_mip_levels(10)
///         .with_label("bricks"),
/// )?;
/// material.set_texture("Albedo", Some(bricks), TextureSurface::COMPLETE);
/// ```
pub struct Texture {
    device: Weak<GraphicsDevice>,
    desc: TextureDescriptor,
}

impl Texture {
    pub(crate) fn new(device: Weak<GraphicsDevice>, desc: TextureDescriptor) -> Self {
        Self { device, desc }
    }

    pub fn device(&self) -> Option<Arc<GraphicsDevice>> {
        self.device.upgrade()
    }

    pub fn descriptor(&self) -> &TextureDescriptor {
        &self.desc
    }

    pub fn texture_type(&self) -> TextureType {
        self.desc.texture_type
    }

    pub fn format(&self) -> TextureFormat {
        self.desc.format
    }

    pub fn usage(&self) -> TextureUsage {
        self.desc.usage
    }

    pub fn width(&self) -> u32 {
        self.desc.width
    }

    pub fn height(&self) -> u32 {
        self.desc.height
    }

    pub fn depth(&self) -> u32 {
        self.desc.depth
    }

    pub fn mip_level_count(&self) -> u32 {
        self.desc.mip_level_count()
    }

    pub fn num_faces(&self) -> u32 {
        self.desc.num_faces()
    }

    pub fn label(&self) -> Option<&str> {
        self.desc.label.as_deref()
    }

    /// Width, height and depth of mip level `mip`, clamped to one texel.
    pub fn mip_dimensions(&self, mip: u32) -> (u32, u32, u32) {
        let shrink = |v: u32| v.checked_shr(mip).unwrap_or(0).max(1);
        (shrink(self.desc.width), shrink(self.desc.height), shrink(self.desc.depth))
    }

    /// Bytes used by every mip level of every face.
    pub fn memory_size(&self) -> u64 {
        (0..self.mip_level_count())
            .map(|mip| {
                let (w, h, d) = self.mip_dimensions(mip);
                self.desc.format.surface_size(w, h) * d as u64
            })
            .sum::<u64>()
            * self.num_faces() as u64
    }

    /// Whether `surface` addresses only mips and faces this texture has.
    pub fn contains_surface(&self, surface: &TextureSurface) -> bool {
        let in_range = |start: u32, count: u32, total: u32| {
            let end = if count == 0 { total } else { start.saturating_add(count) };
            start < total && end <= total
        };
        in_range(surface.mip_level, surface.num_mip_levels, self.mip_level_count())
            && in_range(surface.face, surface.num_faces, self.num_faces())
    }
}

impl std::fmt::Debug for Texture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Texture")
            .field("label", &self.desc.label)
            .field("type", &self.desc.texture_type)
            .field("format", &self.desc.format)
            .field("width", &self.desc.width)
            .field("height", &self.desc.height)
            .field("mips", &self.mip_level_count())
            .finish()
    }
}

static_assertions::assert_impl_all!(Texture: Send, Sync);
