//! Vertex layout descriptors.
//!
//! A [`VertexDataDesc`] is an ordered list of [`VertexElement`]s spread over
//! one or more vertex streams. Each stream is an interleaved buffer; an
//! element's byte offset inside its stream is the sum of the sizes of the
//! elements that precede it in the same stream.
//!
//! Elements are kept sorted by stream index. Adding an element whose
//! (semantic, semantic index, stream) key already exists replaces the old one.
//!
//! # Example
//!
//! ```
//! use tessel_core::mesh::{VertexDataDesc, VertexElementSemantic, VertexElementType};
//!
//! let mut desc = VertexDataDesc::new();
//! desc.add_element(VertexElementType::Float3, VertexElementSemantic::Position, 0, 0, 0);
//! desc.add_element(VertexElementType::Float2, VertexElementSemantic::TexCoord, 0, 0, 0);
//! desc.add_element(VertexElementType::Float3, VertexElementSemantic::Normal, 0, 1, 0);
//!
//! assert_eq!(desc.vertex_stride(0), 20);
//! assert_eq!(desc.vertex_stride(1), 12);
//! assert_eq!(desc.total_vertex_stride(), 32);
//! ```

/// Returned by size and offset queries for elements that are not in the layout.
pub const INVALID_ELEMENT: u32 = u32::MAX;

/// Semantic meaning of a vertex element.
///
/// Semantics are used to match mesh data with shader inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VertexElementSemantic {
    /// Vertex position.
    Position,
    /// Skinning blend weights.
    BlendWeights,
    /// Skinning blend indices.
    BlendIndices,
    /// Vertex normal.
    Normal,
    /// Vertex color.
    Color,
    /// Texture coordinates.
    TexCoord,
    /// Bitangent vector.
    Bitangent,
    /// Tangent vector.
    Tangent,
    /// Pre-transformed position.
    PositionTransformed,
    /// Point sprite size.
    PointSize,
}

/// Data type of a vertex element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexElementType {
    Float1,
    Float2,
    Float3,
    Float4,
    /// Packed 8-bit RGBA color in the platform's native order.
    Color,
    /// Packed 8-bit color, ARGB order.
    ColorArgb,
    /// Packed 8-bit color, ABGR order.
    ColorAbgr,
    UByte4,
    /// Four unsigned bytes normalized to 0.0-1.0.
    UByte4Norm,
    Short1,
    /// Two shorts. Three-component shorts are not supported.
    Short2,
    Short4,
    UShort1,
    UShort2,
    UShort4,
    Int1,
    Int2,
    Int3,
    Int4,
    UInt1,
    UInt2,
    UInt3,
    UInt4,
}

impl VertexElementType {
    /// Size of one element of this type in bytes.
    pub fn size(&self) -> u32 {
        match self {
            Self::Float1 => 4,
            Self::Float2 => 8,
            Self::Float3 => 12,
            Self::Float4 => 16,
            Self::Color | Self::ColorArgb | Self::ColorAbgr => 4,
            Self::UByte4 | Self::UByte4Norm => 4,
            Self::Short1 | Self::UShort1 => 2,
            Self::Short2 | Self::UShort2 => 4,
            Self::Short4 | Self::UShort4 => 8,
            Self::Int1 | Self::UInt1 => 4,
            Self::Int2 | Self::UInt2 => 8,
            Self::Int3 | Self::UInt3 => 12,
            Self::Int4 | Self::UInt4 => 16,
        }
    }

    /// Number of components.
    pub fn component_count(&self) -> u32 {
        match self {
            Self::Float1 | Self::Short1 | Self::UShort1 | Self::Int1 | Self::UInt1 => 1,
            Self::Float2 | Self::Short2 | Self::UShort2 | Self::Int2 | Self::UInt2 => 2,
            Self::Float3 | Self::Int3 | Self::UInt3 => 3,
            Self::Float4
            | Self::Short4
            | Self::UShort4
            | Self::Int4
            | Self::UInt4
            | Self::UByte4
            | Self::UByte4Norm
            | Self::Color
            | Self::ColorArgb
            | Self::ColorAbgr => 4,
        }
    }
}

/// A single element of a vertex layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexElement {
    /// Vertex stream this element is read from.
    pub stream: u32,
    /// Byte offset inside the stream.
    pub offset: u32,
    /// Data type.
    pub element_type: VertexElementType,
    /// Semantic meaning.
    pub semantic: VertexElementSemantic,
    /// Distinguishes elements sharing a semantic (e.g. multiple texcoord sets).
    pub semantic_index: u32,
    /// Instances drawn per element advance. Zero means per-vertex data.
    pub instance_step_rate: u32,
}

impl VertexElement {
    /// Create a new vertex element.
    pub fn new(
        stream: u32,
        offset: u32,
        element_type: VertexElementType,
        semantic: VertexElementSemantic,
        semantic_index: u32,
        instance_step_rate: u32,
    ) -> Self {
        Self {
            stream,
            offset,
            element_type,
            semantic,
            semantic_index,
            instance_step_rate,
        }
    }

    /// Size of this element in bytes.
    pub fn size(&self) -> u32 {
        self.element_type.size()
    }

    /// Whether this element is identified by the given key.
    pub fn is_key(&self, semantic: VertexElementSemantic, semantic_index: u32, stream: u32) -> bool {
        self.semantic == semantic && self.semantic_index == semantic_index && self.stream == stream
    }
}

/// Describes the layout of vertex data across one or more streams.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct VertexDataDesc {
    elements: Vec<VertexElement>,
}

impl VertexDataDesc {
    /// Create an empty layout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an element to the layout.
    ///
    /// An existing element with the same semantic, semantic index and stream
    /// is replaced. Otherwise the element is inserted before the first
    /// element with a higher stream index.
    pub fn add_element(
        &mut self,
        element_type: VertexElementType,
        semantic: VertexElementSemantic,
        semantic_index: u32,
        stream: u32,
        instance_step_rate: u32,
    ) {
        let element = VertexElement::new(
            stream,
            0,
            element_type,
            semantic,
            semantic_index,
            instance_step_rate,
        );

        if let Some(existing) = self
            .elements
            .iter_mut()
            .find(|e| e.is_key(semantic, semantic_index, stream))
        {
            *existing = element;
            return;
        }

        let insert_at = self
            .elements
            .iter()
            .position(|e| e.stream > stream)
            .unwrap_or(self.elements.len());
        self.elements.insert(insert_at, element);
    }

    /// Builder form of [`add_element`](Self::add_element) for per-vertex data.
    pub fn with_element(
        mut self,
        element_type: VertexElementType,
        semantic: VertexElementSemantic,
        semantic_index: u32,
        stream: u32,
    ) -> Self {
        self.add_element(element_type, semantic, semantic_index, stream, 0);
        self
    }

    /// Position (float3), normal (float3) and texcoord (float2) in stream 0.
    pub fn position_normal_uv() -> Self {
        Self::new()
            .with_element(VertexElementType::Float3, VertexElementSemantic::Position, 0, 0)
            .with_element(VertexElementType::Float3, VertexElementSemantic::Normal, 0, 0)
            .with_element(VertexElementType::Float2, VertexElementSemantic::TexCoord, 0, 0)
    }

    /// Check whether an element with the given key exists.
    pub fn has_element(&self, semantic: VertexElementSemantic, semantic_index: u32, stream: u32) -> bool {
        self.find(semantic, semantic_index, stream).is_some()
    }

    /// Find the element with the given key.
    pub fn find(
        &self,
        semantic: VertexElementSemantic,
        semantic_index: u32,
        stream: u32,
    ) -> Option<&VertexElement> {
        self.elements
            .iter()
            .find(|e| e.is_key(semantic, semantic_index, stream))
    }

    /// Size in bytes of the given element, or [`INVALID_ELEMENT`] if absent.
    pub fn element_size(&self, semantic: VertexElementSemantic, semantic_index: u32, stream: u32) -> u32 {
        self.find(semantic, semantic_index, stream)
            .map_or(INVALID_ELEMENT, VertexElement::size)
    }

    /// Byte offset of the given element from the start of its stream, or
    /// [`INVALID_ELEMENT`] if absent.
    pub fn element_offset_from_stream(
        &self,
        semantic: VertexElementSemantic,
        semantic_index: u32,
        stream: u32,
    ) -> u32 {
        let mut offset = 0;
        for element in self.elements.iter().filter(|e| e.stream == stream) {
            if element.is_key(semantic, semantic_index, stream) {
                return offset;
            }
            offset += element.size();
        }
        INVALID_ELEMENT
    }

    /// Size of one vertex in the given stream.
    pub fn vertex_stride(&self, stream: u32) -> u32 {
        self.elements
            .iter()
            .filter(|e| e.stream == stream)
            .map(VertexElement::size)
            .sum()
    }

    /// Size of one vertex summed over all streams.
    pub fn total_vertex_stride(&self) -> u32 {
        self.elements.iter().map(VertexElement::size).sum()
    }

    /// Highest stream index used by any element, `None` for an empty layout.
    pub fn max_stream_index(&self) -> Option<u32> {
        self.elements.iter().map(|e| e.stream).max()
    }

    /// Number of streams, counting unused streams below the maximum.
    pub fn stream_count(&self) -> u32 {
        self.max_stream_index().map_or(0, |max| max + 1)
    }

    /// Element at the given position in the layout.
    pub fn element(&self, idx: usize) -> Option<&VertexElement> {
        self.elements.get(idx)
    }

    /// All elements, sorted by stream.
    pub fn elements(&self) -> &[VertexElement] {
        &self.elements
    }

    /// Number of elements.
    pub fn num_elements(&self) -> usize {
        self.elements.len()
    }

    /// Produce the element list with offsets computed per stream.
    ///
    /// This is the form consumed when creating a vertex declaration.
    pub fn create_elements(&self) -> Vec<VertexElement> {
        let stream_count = self.stream_count() as usize;
        let mut stream_offsets = vec![0u32; stream_count];

        self.elements
            .iter()
            .map(|element| {
                let slot = &mut stream_offsets[element.stream as usize];
                let normalized = VertexElement {
                    offset: *slot,
                    ..*element
                };
                *slot += element.size();
                normalized
            })
            .collect()
    }
}
