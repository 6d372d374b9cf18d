//! Graphics error types.

use std::fmt;

use tessel_core::mesh::MeshError;

/// Errors that can occur in the graphics system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphicsError {
    /// An invalid argument was provided.
    InvalidArgument(String),
    /// The buffer is already locked.
    AlreadyLocked,
    /// The buffer is not locked.
    NotLocked,
    /// A byte range falls outside the buffer.
    OutOfRange {
        offset: u64,
        length: u64,
        size: u64,
    },
    /// Two buffers or blobs that must have equal sizes do not.
    SizeMismatch { expected: u64, actual: u64 },
    /// A requested feature is not supported by the device.
    FeatureNotSupported(String),
    /// An object was used before it reached the required state.
    InvalidState(String),
    /// A GPU program failed to compile.
    ProgramCompilation {
        entry_point: String,
        message: String,
    },
    /// Mesh data error.
    Mesh(MeshError),
    /// Opaque backend failure.
    Backend(String),
}

impl fmt::Display for GraphicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            Self::AlreadyLocked => write!(f, "buffer is already locked"),
            Self::NotLocked => write!(f, "buffer is not locked"),
            Self::OutOfRange {
                offset,
                length,
                size,
            } => write!(
                f,
                "range {offset}..{} out of bounds for buffer of size {size}",
                offset.saturating_add(*length)
            ),
            Self::SizeMismatch { expected, actual } => {
                write!(f, "size mismatch: expected {expected} bytes, got {actual}")
            }
            Self::FeatureNotSupported(msg) => write!(f, "feature not supported: {msg}"),
            Self::InvalidState(msg) => write!(f, "invalid state: {msg}"),
            Self::ProgramCompilation {
                entry_point,
                message,
            } => write!(f, "failed to compile program '{entry_point}': {message}"),
            Self::Mesh(err) => write!(f, "mesh error: {err}"),
            Self::Backend(msg) => write!(f, "backend error: {msg}"),
        }
    }
}

impl std::error::Error for GraphicsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Mesh(err) => Some(err),
            _ => None,
        }
    }
}

impl From<MeshError> for GraphicsError {
    fn from(err: MeshError) -> Self {
        Self::Mesh(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GraphicsError::AlreadyLocked;
        assert_eq!(err.to_string(), "buffer is already locked");

        let err = GraphicsError::OutOfRange {
            offset: 8,
            length: 16,
            size: 16,
        };
        assert_eq!(
            err.to_string(),
            "range 8..24 out of bounds for buffer of size 16"
        );
    }

    #[test]
    fn test_mesh_error_conversion() {
        let err: GraphicsError = MeshError::SizeMismatch {
            expected: 12,
            actual: 8,
        }
        .into();
        assert!(matches!(err, GraphicsError::Mesh(_)));
        assert!(std::error::Error::source(&err).is_some());
    }
}
