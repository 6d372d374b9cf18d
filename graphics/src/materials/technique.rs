//! Techniques.
//!
//! A technique is one way of rendering a shader: a shading language, a set
//! of tags, the variation its programs are compiled for, and an ordered list
//! of passes.

use std::sync::Arc;

use crate::profiling::profile_scope;

use crate::device::GraphicsDevice;
use crate::error::GraphicsError;
use crate::shader::ShaderVariation;

use super::pass::{Pass, PassDesc};

/// Language tag of techniques that run on every backend.
pub const ANY_LANGUAGE: &str = "any";

/// An implementation of a shader for one language and variation.
pub struct Technique {
    id: u32,
    device: Arc<GraphicsDevice>,
    language: String,
    tags: Vec<String>,
    variation: ShaderVariation,
    passes: Vec<Pass>,
}

impl Technique {
    pub fn new(
        device: &Arc<GraphicsDevice>,
        language: &str,
        tags: Vec<String>,
        variation: ShaderVariation,
        passes: Vec<PassDesc>,
    ) -> Arc<Self> {
        let id = device.ids().next_technique_id();
        log::trace!(
            "Technique: created {} ({}, {} passes, tags {:?})",
            id,
            language,
            passes.len(),
            tags
        );
        Arc::new(Self {
            id,
            device: Arc::clone(device),
            language: language.to_string(),
            tags,
            variation,
            passes: passes.into_iter().map(|desc| Pass::new(device, desc)).collect(),
        })
    }

    /// Process-unique technique id.
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Whether the device's backend can compile this technique.
    pub fn is_supported(&self) -> bool {
        self.language == ANY_LANGUAGE || self.device.is_language_supported(&self.language)
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Whether every tag in `tags` is present.
    pub fn has_tags(&self, tags: &[String]) -> bool {
        tags.iter().all(|tag| self.has_tag(tag))
    }

    pub fn variation(&self) -> &ShaderVariation {
        &self.variation
    }

    pub fn num_passes(&self) -> usize {
        self.passes.len()
    }

    /// # Panics
    ///
    /// Panics if `idx` is out of range.
    pub fn pass(&self, idx: usize) -> &Pass {
        match self.passes.get(idx) {
            Some(pass) => pass,
            None => panic!(
                "pass index {} out of range, technique {} has {} passes",
                idx,
                self.id,
                self.passes.len()
            ),
        }
    }

    pub fn passes(&self) -> &[Pass] {
        &self.passes
    }

    /// Whether every pass holds compiled programs.
    pub fn is_compiled(&self) -> bool {
        self.passes.iter().all(Pass::is_compiled)
    }

    /// Compile every pass for this technique's variation.
    ///
    /// Does nothing when already compiled, unless `force` is set.
    pub fn compile(&self, force: bool) -> Result<(), GraphicsError> {
        if self.is_compiled() && !force {
            return Ok(());
        }
        profile_scope!("technique_compile");

        for pass in &self.passes {
            pass.compile(&self.variation, force)?;
        }
        log::debug!("Technique: {} compiled ({} passes)", self.id, self.passes.len());
        Ok(())
    }
}

impl std::fmt::Debug for Technique {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Technique")
            .field("id", &self.id)
            .field("language", &self.language)
            .field("tags", &self.tags)
            .field("variation", &self.variation)
            .field("passes", &self.passes.len())
            .finish()
    }
}

static_assertions::assert_impl_all!(Technique: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::DummyBackend;
    use crate::shader::GpuProgramDesc;
    use crate::types::GpuProgramType;

    fn pass(entry_point: &str) -> PassDesc {
        PassDesc::new().with_program(GpuProgramDesc::new(
            GpuProgramType::Vertex,
            entry_point,
            "",
            "hlsl",
        ))
    }

    #[test]
    fn test_support_and_tags() {
        let device = GraphicsDevice::new(Arc::new(DummyBackend::with_languages(&["hlsl"])));
        let hlsl = Technique::new(
            &device,
            "hlsl",
            vec!["Skinned".to_string(), "Shadow".to_string()],
            ShaderVariation::new(),
            vec![pass("vs")],
        );
        let glsl = Technique::new(&device, "glsl", Vec::new(), ShaderVariation::new(), Vec::new());
        let any = Technique::new(&device, ANY_LANGUAGE, Vec::new(), ShaderVariation::new(), Vec::new());

        assert!(hlsl.is_supported());
        assert!(!glsl.is_supported());
        assert!(any.is_supported());

        assert!(hlsl.has_tag("Shadow"));
        assert!(hlsl.has_tags(&["Skinned".to_string()]));
        assert!(!hlsl.has_tags(&["Skinned".to_string(), "Transparent".to_string()]));
        assert!(glsl.has_tags(&[]));
    }

    #[test]
    fn test_compile_is_idempotent() {
        let backend = Arc::new(DummyBackend::new());
        let device = GraphicsDevice::new(backend.clone());
        let technique = Technique::new(
            &device,
            "hlsl",
            Vec::new(),
            ShaderVariation::new(),
            vec![pass("vs_a"), pass("vs_b")],
        );

        technique.compile(false).unwrap();
        technique.compile(false).unwrap();
        assert!(technique.is_compiled());
        assert_eq!(backend.compile_count(), 2);

        technique.compile(true).unwrap();
        assert_eq!(backend.compile_count(), 4);
    }

    #[test]
    fn test_compile_failure_propagates() {
        let backend = Arc::new(DummyBackend::new());
        backend.fail_compilation("vs_bad");
        let device = GraphicsDevice::new(backend);
        let technique = Technique::new(&device, "hlsl", Vec::new(), ShaderVariation::new(), vec![pass("vs_bad")]);

        assert!(matches!(technique.compile(false), Err(GraphicsError::ProgramCompilation { .. })));
        assert!(!technique.is_compiled());
    }

    #[test]
    fn test_failed_recompile_is_retried() {
        let backend = Arc::new(DummyBackend::new());
        let device = GraphicsDevice::new(backend.clone());
        let technique = Technique::new(&device, "hlsl", Vec::new(), ShaderVariation::new(), vec![pass("vs")]);
        technique.compile(false).unwrap();

        backend.fail_compilation("vs");
        assert!(technique.compile(true).is_err());
        assert!(!technique.is_compiled());
        assert!(!technique.pass(0).is_compiled());

        let attempts = backend.compile_count();
        assert!(technique.compile(false).is_err());
        assert_eq!(backend.compile_count(), attempts + 1);
    }

    #[test]
    fn test_unique_ids() {
        let device = GraphicsDevice::new(Arc::new(DummyBackend::new()));
        let a = Technique::new(&device, "any", Vec::new(), ShaderVariation::new(), Vec::new());
        let b = Technique::new(&device, "any", Vec::new(), ShaderVariation::new(), Vec::new());
        assert_ne!(a.id(), b.id());
    }

    #[test]
    #[should_panic(expected = "pass index 1 out of range")]
    fn test_pass_out_of_range() {
        let device = GraphicsDevice::new(Arc::new(DummyBackend::new()));
        let technique = Technique::new(&device, "any", Vec::new(), ShaderVariation::new(), vec![pass("vs")]);
        technique.pass(1);
    }
}
