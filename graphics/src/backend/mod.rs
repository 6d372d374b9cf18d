//! GPU backend abstraction layer.
//!
//! Concrete graphics APIs plug in through two traits:
//!
//! - [`GpuBackend`] creates buffer storage and compiles GPU programs
//! - [`BufferStorage`] is the raw memory behind a hardware buffer
//!
//! Range validation and lock bookkeeping happen in
//! [`HardwareBuffer`](crate::resources::HardwareBuffer) before a storage is
//! touched, so implementations may assume every offset and length they get
//! lies inside the storage.
//!
//! # Available Backends
//!
//! - `dummy` (default): CPU-memory backend for tests and tools

#[cfg(feature = "dummy")]
pub mod dummy;
mod program;

use std::sync::Arc;

use crate::error::GraphicsError;
use crate::types::{BufferUsage, BufferWriteType};

#[cfg(feature = "dummy")]
pub use dummy::DummyBackend;
pub use program::{
    GpuParamBlockDesc, GpuParamDataDesc, GpuParamDesc, GpuParamObjectDesc, ProgramCompileOutput,
    ProgramCompileRequest,
};

/// Raw memory of a hardware buffer.
///
/// Storage is shared: the owning buffer and every view over it hold the same
/// `Arc`, so implementations synchronize internally.
pub trait BufferStorage: Send + Sync + std::fmt::Debug {
    /// Size in bytes.
    fn size(&self) -> u64;

    /// Copy bytes out of the storage.
    fn read(&self, offset: u64, dest: &mut [u8]) -> Result<(), GraphicsError>;

    /// Copy bytes into the storage.
    fn write(&self, offset: u64, src: &[u8], write_type: BufferWriteType)
    -> Result<(), GraphicsError>;

    /// Copy a range from another storage of the same backend.
    fn copy_from(
        &self,
        src: &dyn BufferStorage,
        src_offset: u64,
        dst_offset: u64,
        length: u64,
        write_type: BufferWriteType,
    ) -> Result<(), GraphicsError> {
        let mut staging = vec![0u8; length as usize];
        src.read(src_offset, &mut staging)?;
        self.write(dst_offset, &staging, write_type)
    }
}

/// GPU backend trait for abstracting different GPU APIs.
pub trait GpuBackend: Send + Sync + std::fmt::Debug + 'static {
    /// Get the backend name.
    fn name(&self) -> &'static str;

    /// Allocate storage for a hardware buffer.
    fn create_buffer_storage(
        &self,
        size: u64,
        usage: BufferUsage,
    ) -> Result<Arc<dyn BufferStorage>, GraphicsError>;

    /// Whether programs written in `language` can be compiled.
    fn is_language_supported(&self, language: &str) -> bool;

    /// Compile a GPU program. Failures are reported through
    /// [`ProgramCompileOutput::success`].
    fn compile_program(&self, request: &ProgramCompileRequest) -> ProgramCompileOutput;
}

/// Create the best backend enabled at build time.
pub fn create_backend() -> Result<Arc<dyn GpuBackend>, GraphicsError> {
    #[cfg(feature = "dummy")]
    {
        log::info!("Using dummy backend");
        Ok(Arc::new(dummy::DummyBackend::new()))
    }

    #[cfg(not(feature = "dummy"))]
    {
        Err(GraphicsError::FeatureNotSupported(
            "no graphics backend enabled".to_string(),
        ))
    }
}
