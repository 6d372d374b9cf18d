//! Sampler state descriptors.

/// Filtering applied for one of minification, magnification or mip selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FilterType {
    /// No filtering. Only valid for mip selection, where it disables mipmapping.
    None,
    #[default]
    Point,
    Linear,
    Anisotropic,
}

/// Filters for each sampling stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FilterOptions {
    pub min: FilterType,
    pub mag: FilterType,
    pub mip: FilterType,
}

impl FilterOptions {
    /// The same filter for all three stages.
    pub const fn uniform(filter: FilterType) -> Self {
        Self {
            min: filter,
            mag: filter,
            mip: filter,
        }
    }
}

/// How coordinates outside `[0, 1]` are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureAddressingMode {
    #[default]
    Wrap,
    Mirror,
    Clamp,
    /// Samples outside the texture return the border color.
    Border,
}

/// Addressing mode per texture axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct UvwAddressing {
    pub u: TextureAddressingMode,
    pub v: TextureAddressingMode,
    pub w: TextureAddressingMode,
}

impl UvwAddressing {
    pub const fn uniform(mode: TextureAddressingMode) -> Self {
        Self {
            u: mode,
            v: mode,
            w: mode,
        }
    }
}

/// Comparison used by depth tests and comparison samplers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareFunction {
    AlwaysFail,
    AlwaysPass,
    Less,
    LessEqual,
    Equal,
    NotEqual,
    GreaterEqual,
    Greater,
}

/// Descriptor for a sampler state.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplerDescriptor {
    pub label: Option<String>,
    pub filter: FilterOptions,
    pub addressing: UvwAddressing,
    /// Lowest mip level that may be sampled.
    pub min_lod: f32,
    /// Highest mip level that may be sampled.
    pub max_lod: f32,
    /// Offset added to the computed mip level.
    pub mip_bias: f32,
    /// Upper bound for anisotropic filtering.
    pub max_anisotropy: u32,
    /// RGBA color returned by [`TextureAddressingMode::Border`].
    pub border_color: [f32; 4],
    /// Turns the sampler into a comparison sampler.
    pub compare: Option<CompareFunction>,
}

impl Default for SamplerDescriptor {
    fn default() -> Self {
        Self {
            label: None,
            filter: FilterOptions {
                min: FilterType::Linear,
                mag: FilterType::Linear,
                mip: FilterType::Point,
            },
            addressing: UvwAddressing::default(),
            min_lod: f32::MIN,
            max_lod: f32::MAX,
            mip_bias: 0.0,
            max_anisotropy: 0,
            border_color: [1.0; 4],
            compare: None,
        }
    }
}

impl SamplerDescriptor {
    /// Bilinear filtering with point mip selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Trilinear filtering.
    pub fn linear() -> Self {
        Self {
            filter: FilterOptions::uniform(FilterType::Linear),
            ..Self::default()
        }
    }

    /// Point sampling without filtering.
    pub fn point() -> Self {
        Self {
            filter: FilterOptions::uniform(FilterType::Point),
            ..Self::default()
        }
    }

    /// Anisotropic filtering up to `max_anisotropy` samples.
    pub fn anisotropic(max_anisotropy: u32) -> Self {
        Self {
            filter: FilterOptions {
                min: FilterType::Anisotropic,
                mag: FilterType::Anisotropic,
                mip: FilterType::Linear,
            },
            max_anisotropy,
            ..Self::default()
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_addressing(mut self, mode: TextureAddressingMode) -> Self {
        self.addressing = UvwAddressing::uniform(mode);
        self
    }

    pub fn with_lod_range(mut self, min_lod: f32, max_lod: f32) -> Self {
        self.min_lod = min_lod;
        self.max_lod = max_lod;
        self
    }

    pub fn with_compare(mut self, compare: CompareFunction) -> Self {
        self.compare = Some(compare);
        self
    }

    /// Whether any axis uses [`TextureAddressingMode::Border`].
    pub fn uses_border(&self) -> bool {
        [self.addressing.u, self.addressing.v, self.addressing.w]
            .contains(&TextureAddressingMode::Border)
    }
}
