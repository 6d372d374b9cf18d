//! Dummy GPU backend for testing and development.
//!
//! Buffers live in host memory and program compilation only records the
//! request. Tests can register reflection data per entry point and force
//! compile failures, which is enough to drive techniques, passes and
//! material parameter binding without GPU hardware.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::error::GraphicsError;
use crate::types::{BufferUsage, BufferWriteType};

use super::{BufferStorage, GpuBackend, GpuParamDesc, ProgramCompileOutput, ProgramCompileRequest};

/// Host-memory buffer storage.
#[derive(Debug)]
pub struct DummyStorage {
    data: RwLock<Vec<u8>>,
}

impl DummyStorage {
    fn new(size: u64) -> Self {
        Self {
            data: RwLock::new(vec![0; size as usize]),
        }
    }
}

impl BufferStorage for DummyStorage {
    fn size(&self) -> u64 {
        self.data.read().len() as u64
    }

    fn read(&self, offset: u64, dest: &mut [u8]) -> Result<(), GraphicsError> {
        let start = offset as usize;
        dest.copy_from_slice(&self.data.read()[start..start + dest.len()]);
        Ok(())
    }

    fn write(
        &self,
        offset: u64,
        src: &[u8],
        write_type: BufferWriteType,
    ) -> Result<(), GraphicsError> {
        log::trace!(
            "DummyBackend: write offset={} len={} type={:?}",
            offset,
            src.len(),
            write_type
        );
        let start = offset as usize;
        self.data.write()[start..start + src.len()].copy_from_slice(src);
        Ok(())
    }
}

/// Dummy GPU backend.
#[derive(Debug)]
pub struct DummyBackend {
    languages: RwLock<HashSet<String>>,
    reflections: RwLock<HashMap<String, Arc<GpuParamDesc>>>,
    failing: RwLock<HashSet<String>>,
    compile_count: AtomicU64,
}

impl DummyBackend {
    /// Create a dummy backend that accepts `hlsl` and `glsl`.
    pub fn new() -> Self {
        Self::with_languages(&["hlsl", "glsl"])
    }

    /// Create a dummy backend that accepts the given languages.
    pub fn with_languages(languages: &[&str]) -> Self {
        Self {
            languages: RwLock::new(languages.iter().map(|l| l.to_string()).collect()),
            reflections: RwLock::new(HashMap::new()),
            failing: RwLock::new(HashSet::new()),
            compile_count: AtomicU64::new(0),
        }
    }

    /// Reflection returned for programs compiled with `entry_point`.
    pub fn register_reflection(&self, entry_point: &str, desc: GpuParamDesc) {
        self.reflections
            .write()
            .insert(entry_point.to_string(), Arc::new(desc));
    }

    /// Make every compilation of `entry_point` fail.
    pub fn fail_compilation(&self, entry_point: &str) {
        self.failing.write().insert(entry_point.to_string());
    }

    /// Number of programs compiled so far.
    pub fn compile_count(&self) -> u64 {
        self.compile_count.load(Ordering::Relaxed)
    }
}

impl Default for DummyBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl GpuBackend for DummyBackend {
    fn name(&self) -> &'static str {
        "Dummy"
    }

    fn create_buffer_storage(
        &self,
        size: u64,
        usage: BufferUsage,
    ) -> Result<Arc<dyn BufferStorage>, GraphicsError> {
        log::trace!(
            "DummyBackend: creating buffer storage size={} usage={:?}",
            size,
            usage
        );
        Ok(Arc::new(DummyStorage::new(size)))
    }

    fn is_language_supported(&self, language: &str) -> bool {
        self.languages.read().contains(language)
    }

    fn compile_program(&self, request: &ProgramCompileRequest) -> ProgramCompileOutput {
        self.compile_count.fetch_add(1, Ordering::Relaxed);
        log::trace!(
            "DummyBackend: compiling {:?} program '{}' ({}, {} defines)",
            request.program_type,
            request.entry_point,
            request.language,
            request.defines.len()
        );

        if !self.is_language_supported(&request.language) {
            return ProgramCompileOutput::failure(format!(
                "language '{}' is not supported",
                request.language
            ));
        }
        if self.failing.read().contains(&request.entry_point) {
            return ProgramCompileOutput::failure(format!(
                "forced failure for '{}'",
                request.entry_point
            ));
        }

        let mut instructions = request.source.clone().into_bytes();
        for (name, value) in &request.defines {
            instructions.extend_from_slice(format!("\n#define {name} {value}").as_bytes());
        }

        let param_desc = self
            .reflections
            .read()
            .get(&request.entry_point)
            .cloned()
            .unwrap_or_default();

        ProgramCompileOutput {
            success: true,
            message: String::new(),
            instructions,
            param_desc,
        }
    }
}

static_assertions::assert_impl_all!(DummyBackend: Send, Sync);
