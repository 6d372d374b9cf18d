//! Unique id allocation.
//!
//! Shaders, techniques and materials each carry a process-unique numeric id.
//! Instead of hidden statics, an [`IdAllocator`] is created once and shared
//! (via `Arc`) with every constructor that needs ids. Tests create their own
//! allocator, or [`reset`](IdAllocator::reset) a shared one, to get
//! deterministic numbering.

use std::sync::atomic::{AtomicU32, Ordering};

/// Thread-safe monotonically increasing id source.
///
/// Ids are never reused for the lifetime of the allocator, even after the
/// object that received an id is dropped.
#[derive(Debug, Default)]
pub struct IdAllocator {
    next_material: AtomicU32,
    next_shader: AtomicU32,
    next_technique: AtomicU32,
}

/// The kind of object an id is allocated for. Each kind has its own counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdKind {
    /// Material ids.
    Material,
    /// Shader ids.
    Shader,
    /// Technique ids.
    Technique,
}

impl IdAllocator {
    /// Create an allocator whose counters all start at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next id of the given kind.
    pub fn allocate(&self, kind: IdKind) -> u32 {
        self.counter(kind).fetch_add(1, Ordering::Relaxed)
    }

    /// Allocate a material id.
    pub fn next_material_id(&self) -> u32 {
        self.allocate(IdKind::Material)
    }

    /// Allocate a shader id.
    pub fn next_shader_id(&self) -> u32 {
        self.allocate(IdKind::Shader)
    }

    /// Allocate a technique id.
    pub fn next_technique_id(&self) -> u32 {
        self.allocate(IdKind::Technique)
    }

    /// Number of ids handed out so far for `kind`.
    pub fn allocated(&self, kind: IdKind) -> u32 {
        self.counter(kind).load(Ordering::Relaxed)
    }

    /// Reset every counter to zero.
    ///
    /// Only meant for tests; objects created before the reset keep their ids
    /// and may collide with ids handed out afterwards.
    pub fn reset(&self) {
        self.next_material.store(0, Ordering::Relaxed);
        self.next_shader.store(0, Ordering::Relaxed);
        self.next_technique.store(0, Ordering::Relaxed);
    }

    fn counter(&self, kind: IdKind) -> &AtomicU32 {
        match kind {
            IdKind::Material => &self.next_material,
            IdKind::Shader => &self.next_shader,
            IdKind::Technique => &self.next_technique,
        }
    }
}
