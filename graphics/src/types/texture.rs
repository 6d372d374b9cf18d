//! Texture formats, descriptors and surfaces.

use bitflags::bitflags;

use crate::error::GraphicsError;

/// Pixel format of a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureFormat {
    R8,
    Rg8,
    #[default]
    Rgba8,
    Rgba8Srgb,
    Bgra8,
    R16F,
    Rg16F,
    Rgba16F,
    R32F,
    Rg32F,
    Rgba32F,
    R32U,
    /// 4x4 blocks, 8 bytes each.
    Bc1,
    /// 4x4 blocks, 16 bytes each.
    Bc3,
    D32,
    D24S8,
}

impl TextureFormat {
    pub fn is_depth(&self) -> bool {
        matches!(self, Self::D32 | Self::D24S8)
    }

    pub fn is_compressed(&self) -> bool {
        matches!(self, Self::Bc1 | Self::Bc3)
    }

    /// Bytes per texel, or per 4x4 block for compressed formats.
    pub fn element_size(&self) -> u32 {
        match self {
            Self::R8 => 1,
            Self::Rg8 | Self::R16F => 2,
            Self::Rgba8
            | Self::Rgba8Srgb
            | Self::Bgra8
            | Self::Rg16F
            | Self::R32F
            | Self::R32U
            | Self::D32
            | Self::D24S8 => 4,
            Self::Rgba16F | Self::Rg32F | Self::Bc1 => 8,
            Self::Rgba32F | Self::Bc3 => 16,
        }
    }

    /// Bytes needed for a `width` x `height` image.
    pub fn surface_size(&self, width: u32, height: u32) -> u64 {
        if self.is_compressed() {
            let blocks_x = width.div_ceil(4) as u64;
            let blocks_y = height.div_ceil(4) as u64;
            blocks_x * blocks_y * self.element_size() as u64
        } else {
            width as u64 * height as u64 * self.element_size() as u64
        }
    }
}

/// Dimensionality of a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureType {
    Tex1D,
    #[default]
    Tex2D,
    Tex3D,
    /// Six square faces.
    TexCube,
}

bitflags! {
    /// How a texture may be bound.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TextureUsage: u32 {
        const SAMPLED = 1 << 0;
        /// Unordered read/write access from shaders.
        const LOAD_STORE = 1 << 1;
        const RENDER_TARGET = 1 << 2;
        const DEPTH_STENCIL = 1 << 3;
        /// Contents are rewritten from the CPU every frame.
        const DYNAMIC = 1 << 4;
        const CPU_READABLE = 1 << 5;
    }
}

impl Default for TextureUsage {
    fn default() -> Self {
        Self::SAMPLED
    }
}

/// Description of a texture to create.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextureDescriptor {
    pub label: Option<String>,
    pub texture_type: TextureType,
    pub format: TextureFormat,
    pub width: u32,
    pub height: u32,
    /// Depth of 3D textures, 1 otherwise.
    pub depth: u32,
    /// Mip levels below the top level.
    pub num_mips: u32,
    /// Array slices; cube maps count six faces per slice.
    pub num_array_slices: u32,
    pub usage: TextureUsage,
}

impl TextureDescriptor {
    pub fn new_2d(width: u32, height: u32, format: TextureFormat, usage: TextureUsage) -> Self {
        Self {
            label: None,
            texture_type: TextureType::Tex2D,
            format,
            width,
            height,
            depth: 1,
            num_mips: 0,
            num_array_slices: 1,
            usage,
        }
    }

    pub fn new_cube(size: u32, format: TextureFormat, usage: TextureUsage) -> Self {
        Self {
            texture_type: TextureType::TexCube,
            ..Self::new_2d(size, size, format, usage)
        }
    }

    pub fn new_3d(width: u32, height: u32, depth: u32, format: TextureFormat) -> Self {
        Self {
            texture_type: TextureType::Tex3D,
            depth,
            ..Self::new_2d(width, height, format, TextureUsage::SAMPLED)
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the total number of mip levels, top level included.
    pub fn with_mip_levels(mut self, count: u32) -> Self {
        self.num_mips = count.saturating_sub(1);
        self
    }

    pub fn with_array_slices(mut self, count: u32) -> Self {
        self.num_array_slices = count;
        self
    }

    /// Total mip levels, top level included.
    pub fn mip_level_count(&self) -> u32 {
        self.num_mips + 1
    }

    /// Addressable faces across all array slices.
    pub fn num_faces(&self) -> u32 {
        match self.texture_type {
            TextureType::TexCube => self.num_array_slices * 6,
            _ => self.num_array_slices,
        }
    }

    /// Longest mip chain the top level allows.
    pub fn max_mip_levels(&self) -> u32 {
        let largest = self.width.max(self.height).max(self.depth).max(1);
        32 - largest.leading_zeros()
    }

    /// Check the descriptor against a device dimension limit.
    pub fn validate(&self, max_dimension: u32) -> Result<(), GraphicsError> {
        if self.width == 0 || self.height == 0 || self.depth == 0 || self.num_array_slices == 0 {
            return Err(GraphicsError::InvalidArgument(format!(
                "texture {:?} has a zero dimension",
                self.label
            )));
        }
        if self.width > max_dimension || self.height > max_dimension || self.depth > max_dimension {
            return Err(GraphicsError::InvalidArgument(format!(
                "texture {:?} exceeds the maximum dimension {max_dimension}",
                self.label
            )));
        }
        if self.texture_type == TextureType::TexCube && self.width != self.height {
            return Err(GraphicsError::InvalidArgument(
                "cube map faces must be square".to_string(),
            ));
        }
        if self.mip_level_count() > self.max_mip_levels() {
            return Err(GraphicsError::InvalidArgument(format!(
                "{} mip levels requested, at most {} possible",
                self.mip_level_count(),
                self.max_mip_levels()
            )));
        }
        if self.format.is_depth() && self.usage.contains(TextureUsage::LOAD_STORE) {
            return Err(GraphicsError::InvalidArgument(
                "depth formats cannot be bound for load-store access".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for TextureDescriptor {
    fn default() -> Self {
        Self::new_2d(1, 1, TextureFormat::default(), TextureUsage::default())
    }
}

/// A range of mip levels and faces within a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureSurface {
    pub mip_level: u32,
    /// Zero covers every mip from `mip_level` on.
    pub num_mip_levels: u32,
    pub face: u32,
    /// Zero covers every face from `face` on.
    pub num_faces: u32,
}

impl TextureSurface {
    /// Every mip level and face.
    pub const COMPLETE: Self = Self {
        mip_level: 0,
        num_mip_levels: 0,
        face: 0,
        num_faces: 0,
    };

    pub fn single(mip_level: u32, face: u32) -> Self {
        Self {
            mip_level,
            num_mip_levels: 1,
            face,
            num_faces: 1,
        }
    }
}

impl Default for TextureSurface {
    fn default() -> Self {
        Self::COMPLETE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compressed_sizes() {
        assert_eq!(TextureFormat::Rgba8.surface_size(4, 4), 64);
        assert_eq!(TextureFormat::Bc1.surface_size(4, 4), 8);
        assert_eq!(TextureFormat::Bc3.surface_size(5, 1), 32);
    }

    #[test]
    fn test_mip_limits() {
        let desc = TextureDescriptor::new_2d(256, 64, TextureFormat::Rgba8, TextureUsage::SAMPLED);
        assert_eq!(desc.max_mip_levels(), 9);
        assert!(desc.clone().with_mip_levels(9).validate(4096).is_ok());
        assert!(desc.with_mip_levels(10).validate(4096).is_err());
    }

    #[test]
    fn test_validation() {
        let cube = TextureDescriptor::new_cube(64, TextureFormat::Rgba16F, TextureUsage::SAMPLED);
        assert_eq!(cube.num_faces(), 6);
        assert!(cube.validate(64).is_ok());
        assert!(cube.validate(32).is_err());

        let mut skewed = TextureDescriptor::new_cube(64, TextureFormat::Rgba8, TextureUsage::SAMPLED);
        skewed.height = 32;
        assert!(skewed.validate(4096).is_err());

        let depth = TextureDescriptor::new_2d(8, 8, TextureFormat::D32, TextureUsage::LOAD_STORE);
        assert!(depth.validate(4096).is_err());
    }
}
