//! Shader parameter and program type enums shared by reflection and shader
//! descriptors.

/// Programmable pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GpuProgramType {
    Vertex,
    Fragment,
    Geometry,
    Hull,
    Domain,
    Compute,
}

impl GpuProgramType {
    /// Every stage, in pipeline order.
    pub const ALL: [Self; 6] = [
        Self::Vertex,
        Self::Fragment,
        Self::Geometry,
        Self::Hull,
        Self::Domain,
        Self::Compute,
    ];

    /// Define set while compiling a program of this type.
    pub fn define(&self) -> &'static str {
        match self {
            Self::Vertex => "VERTEX",
            Self::Fragment => "FRAGMENT",
            Self::Geometry => "GEOMETRY",
            Self::Hull => "HULL",
            Self::Domain => "DOMAIN",
            Self::Compute => "COMPUTE",
        }
    }
}

/// Type of an inline data parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GpuParamDataType {
    Float1,
    Float2,
    Float3,
    Float4,
    Matrix3x3,
    Matrix4x4,
    Int1,
    Int2,
    Int3,
    Int4,
    Bool,
    /// RGBA color, four floats.
    Color,
    /// User-defined structure; the size comes from the declaration.
    Struct,
}

impl GpuParamDataType {
    /// Size of one element in bytes, zero for [`GpuParamDataType::Struct`].
    pub fn size(&self) -> u32 {
        match self {
            Self::Float1 | Self::Int1 | Self::Bool => 4,
            Self::Float2 | Self::Int2 => 8,
            Self::Float3 | Self::Int3 => 12,
            Self::Float4 | Self::Int4 | Self::Color => 16,
            Self::Matrix3x3 => 36,
            Self::Matrix4x4 => 64,
            Self::Struct => 0,
        }
    }
}

/// Type of an object (texture, buffer or sampler) parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GpuParamObjectType {
    Sampler1D,
    Sampler2D,
    Sampler3D,
    SamplerCube,
    Texture1D,
    Texture2D,
    Texture3D,
    TextureCube,
    Texture2DArray,
    Texture2DMs,
    RwTexture1D,
    RwTexture2D,
    RwTexture3D,
    RwTexture2DArray,
    ByteBuffer,
    StructuredBuffer,
    RwTypedBuffer,
    RwByteBuffer,
    RwStructuredBuffer,
}

/// Which object map a parameter type belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectParamCategory {
    Texture,
    Buffer,
    Sampler,
}

impl GpuParamObjectType {
    pub fn is_sampler(&self) -> bool {
        matches!(
            self,
            Self::Sampler1D | Self::Sampler2D | Self::Sampler3D | Self::SamplerCube
        )
    }

    pub fn is_buffer(&self) -> bool {
        matches!(
            self,
            Self::ByteBuffer
                | Self::StructuredBuffer
                | Self::RwTypedBuffer
                | Self::RwByteBuffer
                | Self::RwStructuredBuffer
        )
    }

    /// Texture bound for unordered read/write access.
    pub fn is_load_store_texture(&self) -> bool {
        matches!(
            self,
            Self::RwTexture1D | Self::RwTexture2D | Self::RwTexture3D | Self::RwTexture2DArray
        )
    }

    pub fn category(&self) -> ObjectParamCategory {
        if self.is_sampler() {
            ObjectParamCategory::Sampler
        } else if self.is_buffer() {
            ObjectParamCategory::Buffer
        } else {
            ObjectParamCategory::Texture
        }
    }
}
