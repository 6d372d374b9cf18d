//! Mesh data error types.

use std::fmt;

use super::data::IndexType;
use super::layout::{VertexElementSemantic, VertexElementType};

/// Errors produced by [`MeshData`](super::MeshData) operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeshError {
    /// Caller-supplied byte count does not match element size times vertex count.
    SizeMismatch { expected: usize, actual: usize },
    /// Index accessor used on a buffer of the other index width.
    WrongIndexType {
        expected: IndexType,
        actual: IndexType,
    },
    /// Two meshes declare the same element with different data types.
    ElementTypeConflict {
        semantic: VertexElementSemantic,
        semantic_index: u32,
        stream: u32,
        existing: VertexElementType,
        incoming: VertexElementType,
    },
    /// Invalid argument.
    InvalidArgument(String),
}

impl fmt::Display for MeshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SizeMismatch { expected, actual } => {
                write!(f, "Size mismatch: expected {} bytes, got {}", expected, actual)
            }
            Self::WrongIndexType { expected, actual } => {
                write!(
                    f,
                    "Wrong index type: requested {:?} but buffer holds {:?}",
                    expected, actual
                )
            }
            Self::ElementTypeConflict {
                semantic,
                semantic_index,
                stream,
                existing,
                incoming,
            } => write!(
                f,
                "Vertex element {:?}{} in stream {} declared as both {:?} and {:?}",
                semantic, semantic_index, stream, existing, incoming
            ),
            Self::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
        }
    }
}

impl std::error::Error for MeshError {}
