//! Fixed-function pipeline state carried by passes.

use super::sampler::CompareFunction;

/// Maximum number of simultaneously bound render targets.
pub const MAX_RENDER_TARGETS: usize = 8;

/// Factor multiplied with a blend operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendFactor {
    Zero,
    One,
    SourceColor,
    InvSourceColor,
    SourceAlpha,
    InvSourceAlpha,
    DestColor,
    InvDestColor,
    DestAlpha,
    InvDestAlpha,
}

/// How the weighted source and destination are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendOperation {
    #[default]
    Add,
    Subtract,
    ReverseSubtract,
    Min,
    Max,
}

/// Color and alpha blend equations of one channel group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlendComponent {
    pub source: BlendFactor,
    pub dest: BlendFactor,
    pub operation: BlendOperation,
}

impl BlendComponent {
    /// Source replaces destination.
    pub const REPLACE: Self = Self {
        source: BlendFactor::One,
        dest: BlendFactor::Zero,
        operation: BlendOperation::Add,
    };

    /// Source weighted by its alpha over the destination.
    pub const OVER: Self = Self {
        source: BlendFactor::SourceAlpha,
        dest: BlendFactor::InvSourceAlpha,
        operation: BlendOperation::Add,
    };

    pub const ADDITIVE: Self = Self {
        source: BlendFactor::One,
        dest: BlendFactor::One,
        operation: BlendOperation::Add,
    };
}

impl Default for BlendComponent {
    fn default() -> Self {
        Self::REPLACE
    }
}

/// Blending of a single render target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderTargetBlendState {
    pub enabled: bool,
    pub color: BlendComponent,
    pub alpha: BlendComponent,
    /// RGBA channels written, one bit per channel.
    pub write_mask: u8,
}

impl Default for RenderTargetBlendState {
    fn default() -> Self {
        Self {
            enabled: false,
            color: BlendComponent::REPLACE,
            alpha: BlendComponent::REPLACE,
            write_mask: 0b1111,
        }
    }
}

/// Blending for every render target of a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BlendState {
    pub alpha_to_coverage: bool,
    /// When false only the first target's state is used.
    pub independent_blend: bool,
    pub targets: [RenderTargetBlendState; MAX_RENDER_TARGETS],
}

impl BlendState {
    /// Every target uses `target`.
    pub fn uniform(target: RenderTargetBlendState) -> Self {
        Self {
            alpha_to_coverage: false,
            independent_blend: false,
            targets: [target; MAX_RENDER_TARGETS],
        }
    }

    /// Alpha blending on every target.
    pub fn transparent() -> Self {
        Self::uniform(RenderTargetBlendState {
            enabled: true,
            color: BlendComponent::OVER,
            alpha: BlendComponent::OVER,
            ..Default::default()
        })
    }

    pub fn additive() -> Self {
        Self::uniform(RenderTargetBlendState {
            enabled: true,
            color: BlendComponent::ADDITIVE,
            alpha: BlendComponent::ADDITIVE,
            ..Default::default()
        })
    }

    /// State that applies to render target `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is not below [`MAX_RENDER_TARGETS`].
    pub fn target(&self, idx: usize) -> &RenderTargetBlendState {
        if self.independent_blend {
            &self.targets[idx]
        } else {
            assert!(idx < MAX_RENDER_TARGETS, "render target {idx} out of range");
            &self.targets[0]
        }
    }

    /// Whether any used render target blends.
    pub fn is_enabled(&self) -> bool {
        if self.independent_blend {
            self.targets.iter().any(|t| t.enabled)
        } else {
            self.targets[0].enabled
        }
    }
}

/// Stencil operation applied on a test outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StencilOperation {
    #[default]
    Keep,
    Zero,
    Replace,
    Increment,
    Decrement,
    IncrementWrap,
    DecrementWrap,
    Invert,
}

/// Stencil test of one face orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StencilFace {
    pub compare: CompareFunction,
    pub fail: StencilOperation,
    pub depth_fail: StencilOperation,
    pub pass: StencilOperation,
}

impl Default for StencilFace {
    fn default() -> Self {
        Self {
            compare: CompareFunction::AlwaysPass,
            fail: StencilOperation::Keep,
            depth_fail: StencilOperation::Keep,
            pass: StencilOperation::Keep,
        }
    }
}

/// Depth and stencil testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DepthStencilState {
    pub depth_read: bool,
    pub depth_write: bool,
    pub depth_compare: CompareFunction,
    pub stencil_enabled: bool,
    pub stencil_read_mask: u8,
    pub stencil_write_mask: u8,
    pub front: StencilFace,
    pub back: StencilFace,
}

impl Default for DepthStencilState {
    fn default() -> Self {
        Self {
            depth_read: true,
            depth_write: true,
            depth_compare: CompareFunction::Less,
            stencil_enabled: false,
            stencil_read_mask: 0xff,
            stencil_write_mask: 0xff,
            front: StencilFace::default(),
            back: StencilFace::default(),
        }
    }
}

impl DepthStencilState {
    /// Depth tested but not written, as used by transparent geometry.
    pub fn read_only() -> Self {
        Self {
            depth_write: false,
            ..Self::default()
        }
    }
}

/// Which triangle winding is discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CullMode {
    None,
    Clockwise,
    #[default]
    CounterClockwise,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PolygonMode {
    #[default]
    Solid,
    Wireframe,
}

/// Rasterization settings.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RasterizerState {
    pub polygon_mode: PolygonMode,
    pub cull_mode: CullMode,
    pub depth_bias: f32,
    pub slope_scaled_depth_bias: f32,
    pub depth_clip: bool,
    pub scissor_enabled: bool,
    pub multisample_enabled: bool,
    pub antialiased_lines: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blend_presets() {
        assert!(!BlendState::default().is_enabled());
        let transparent = BlendState::transparent();
        assert!(transparent.is_enabled());
        assert_eq!(transparent.target(5).color, BlendComponent::OVER);
    }

    #[test]
    fn test_independent_targets() {
        let mut state = BlendState::default();
        state.targets[2].enabled = true;
        assert!(!state.is_enabled());

        state.independent_blend = true;
        assert!(state.is_enabled());
        assert!(state.target(2).enabled);
        assert!(!state.target(0).enabled);
    }

    #[test]
    fn test_read_only_depth() {
        let state = DepthStencilState::read_only();
        assert!(state.depth_read);
        assert!(!state.depth_write);
    }
}
