//! Vertex declarations.
//!
//! A declaration is the device-side object describing how vertex streams are
//! fed to the input assembler. The device caches declarations by their
//! element list, so identical layouts share one instance.

use tessel_core::mesh::{VertexElement, VertexElementSemantic};

/// Immutable vertex input layout.
#[derive(Debug, PartialEq, Eq)]
pub struct VertexDeclaration {
    id: u32,
    elements: Vec<VertexElement>,
}

impl VertexDeclaration {
    pub(crate) fn new(id: u32, elements: Vec<VertexElement>) -> Self {
        Self { id, elements }
    }

    /// Device-unique id.
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn elements(&self) -> &[VertexElement] {
        &self.elements
    }

    pub fn num_elements(&self) -> usize {
        self.elements.len()
    }

    /// Find an element by semantic and semantic index, in any stream.
    pub fn find(&self, semantic: VertexElementSemantic, semantic_index: u32) -> Option<&VertexElement> {
        self.elements
            .iter()
            .find(|e| e.semantic == semantic && e.semantic_index == semantic_index)
    }

    /// Stride of `stream` in bytes.
    pub fn vertex_stride(&self, stream: u32) -> u32 {
        self.elements
            .iter()
            .filter(|e| e.stream == stream)
            .map(|e| e.size())
            .sum()
    }

    /// Whether this declaration provides every input `shader_decl` needs.
    ///
    /// Elements are matched by semantic and semantic index; streams and
    /// offsets may differ.
    pub fn is_compatible(&self, shader_decl: &VertexDeclaration) -> bool {
        self.missing_elements(shader_decl).is_empty()
    }

    /// Inputs of `shader_decl` this declaration does not provide.
    pub fn missing_elements(&self, shader_decl: &VertexDeclaration) -> Vec<VertexElement> {
        shader_decl
            .elements
            .iter()
            .filter(|needed| self.find(needed.semantic, needed.semantic_index).is_none())
            .copied()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessel_core::mesh::{VertexDataDesc, VertexElementType};

    #[test]
    fn test_strides_and_lookup() {
        let desc = VertexDataDesc::position_normal_uv();
        let decl = VertexDeclaration::new(0, desc.create_elements());
        assert_eq!(decl.vertex_stride(0), 32);
        assert_eq!(
            decl.find(VertexElementSemantic::TexCoord, 0).map(|e| e.offset),
            Some(24)
        );
        assert!(decl.find(VertexElementSemantic::Tangent, 0).is_none());
    }

    #[test]
    fn test_compatibility() {
        let mesh_decl = VertexDeclaration::new(0, VertexDataDesc::position_normal_uv().create_elements());
        let shader_decl = VertexDeclaration::new(
            1,
            VertexDataDesc::new()
                .with_element(VertexElementType::Float3, VertexElementSemantic::Position, 0, 0)
                .with_element(VertexElementType::Float2, VertexElementSemantic::TexCoord, 0, 1)
                .create_elements(),
        );
        assert!(mesh_decl.is_compatible(&shader_decl));

        let skinned_decl = VertexDeclaration::new(
            2,
            VertexDataDesc::new()
                .with_element(VertexElementType::Float3, VertexElementSemantic::Position, 0, 0)
                .with_element(VertexElementType::UByte4, VertexElementSemantic::BlendIndices, 0, 0)
                .create_elements(),
        );
        assert!(!mesh_decl.is_compatible(&skinned_decl));
        let missing = mesh_decl.missing_elements(&skinned_decl);
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].semantic, VertexElementSemantic::BlendIndices);
    }
}
