//! Common utilities for graphics integration tests.
//!
//! Every test runs against the dummy backend. [`TestContext`] keeps the
//! backend handle so tests can register reflection data and count compiles.

#![allow(dead_code)]

use std::sync::Arc;

use tessel_core::mesh::{IndexType, MeshData, VertexDataDesc, VertexElementSemantic};
use tessel_graphics::{
    DummyBackend, GraphicsDevice, Material, PassDesc, Shader, ShaderDesc, ShaderVariation,
    ShaderVariationParam, Technique,
};

/// Initialize test logging once per process.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A dummy backend and a device created on it.
pub struct TestContext {
    pub backend: Arc<DummyBackend>,
    pub device: Arc<GraphicsDevice>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_languages(&["hlsl", "glsl"])
    }

    pub fn with_languages(languages: &[&str]) -> Self {
        init_logging();
        let backend = Arc::new(DummyBackend::with_languages(languages));
        let device = GraphicsDevice::new(backend.clone());
        Self { backend, device }
    }

    /// Technique with no passes for `language`, tagged with `tags`.
    pub fn technique(&self, language: &str, tags: &[&str], variation: ShaderVariation) -> Arc<Technique> {
        Technique::new(
            &self.device,
            language,
            tags.iter().map(|t| t.to_string()).collect(),
            variation,
            Vec::new(),
        )
    }

    /// Technique running `passes` in hlsl.
    pub fn technique_with_passes(&self, passes: Vec<PassDesc>) -> Arc<Technique> {
        Technique::new(&self.device, "hlsl", Vec::new(), ShaderVariation::new(), passes)
    }

    /// Shader holding `techniques` and no parameters.
    pub fn shader(&self, techniques: Vec<Arc<Technique>>) -> Arc<Shader> {
        let mut desc = ShaderDesc::new();
        for technique in techniques {
            desc.add_technique(technique);
        }
        Shader::create(&self.device, "TestShader", desc).expect("shader creation failed")
    }

    /// Initialized material over a parameterless shader holding `techniques`.
    pub fn material(&self, techniques: Vec<Arc<Technique>>) -> Material {
        Material::create(&self.device, "TestMaterial", self.shader(techniques))
            .expect("material creation failed")
    }
}

/// Variation with a single int parameter.
pub fn int_variation(name: &str, value: i32) -> ShaderVariation {
    ShaderVariation::new().with(name, ShaderVariationParam::int(value))
}

/// Unit quad in the XY plane from (-1, -1) to (1, 1), two triangles.
pub const QUAD_POSITIONS: [f32; 12] = [
    -1.0, -1.0, 0.0, //
    1.0, -1.0, 0.0, //
    1.0, 1.0, 0.0, //
    -1.0, 1.0, 0.0,
];

pub const QUAD_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

/// Unit quad with position, normal and uv elements in stream 0.
pub fn quad_mesh_data() -> MeshData {
    let desc = Arc::new(VertexDataDesc::position_normal_uv());
    let mut data = MeshData::new(4, 6, desc, IndexType::Index16);
    data.set_vertex_data(
        VertexElementSemantic::Position,
        bytemuck::cast_slice(&QUAD_POSITIONS),
        0,
        0,
    )
    .expect("quad positions");
    let normals = [[0.0f32, 0.0, 1.0]; 4];
    data.set_vertex_data(VertexElementSemantic::Normal, bytemuck::cast_slice(&normals), 0, 0)
        .expect("quad normals");
    data.indices16_mut()
        .expect("16-bit indices")
        .copy_from_slice(&QUAD_INDICES);
    data
}
