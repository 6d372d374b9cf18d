//! Integration tests for shader variations, technique selection and materials.

mod common;

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use rstest::rstest;

use common::{TestContext, int_variation};
use tessel_graphics::backend::GpuParamDesc;
use tessel_graphics::shader::MAX_VARIATIONS;
use tessel_graphics::types::{GpuParamDataType, GpuProgramType};
use tessel_graphics::{
    DataParamDesc, FindTechniqueDesc, GpuProgramDesc, GraphicsError, Material, PassDesc, Shader,
    ShaderDesc, ShaderVariation, ShaderVariationParam, VariationAxis,
    generate_variations,
};

#[test]
fn test_float_zero_matches_int_zero() {
    let float = ShaderVariation::new().with("X", ShaderVariationParam::float(0.0));
    let int = ShaderVariation::new().with("X", ShaderVariationParam::int(0));
    assert!(float.matches(&int, true));
    assert!(int.matches(&float, true));

    let one = ShaderVariation::new().with("X", ShaderVariationParam::float(1.0));
    assert!(!one.matches(&ShaderVariation::new().with("X", ShaderVariationParam::int(1)), false));
}

#[test]
fn test_partial_and_exact_matching() {
    let full = int_variation("A", 1).with("B", ShaderVariationParam::bool(true));
    let part = int_variation("A", 1);
    assert!(full.matches(&part, false));
    assert!(!full.matches(&part, true));
    assert!(!part.matches(&full, false));
}

#[rstest]
#[case::no_axes(0, 1)]
#[case::one_axis(1, 2)]
#[case::four_axes(4, 16)]
#[case::five_axes(5, 0)]
fn test_variation_cap(#[case] num_axes: usize, #[case] expected: usize) {
    let axes: Vec<VariationAxis> = (0..num_axes)
        .map(|i| VariationAxis::bool(format!("FLAG_{i}")))
        .collect();
    let variations = generate_variations(&axes);
    assert_eq!(variations.len(), expected);
    assert!(variations.len() <= MAX_VARIATIONS);
    assert!(variations.iter().all(|v| v.len() == num_axes));
}

#[test]
fn test_generated_variations_are_distinct() {
    let axes = [VariationAxis::int("QUALITY", &[0, 1, 2, 1]), VariationAxis::bool("FOG")];
    let variations = generate_variations(&axes);
    assert_eq!(variations.len(), 6);
    for (i, a) in variations.iter().enumerate() {
        for b in &variations[i + 1..] {
            assert!(!a.matches(b, true));
        }
    }
}

#[rstest]
#[case::lower_first(3, 5, 0)]
#[case::lower_second(5, 3, 1)]
#[case::tie(4, 4, 0)]
fn test_technique_tie_break(#[case] first: i32, #[case] second: i32, #[case] expected: usize) {
    let ctx = TestContext::new();
    let material = ctx.material(vec![
        ctx.technique("hlsl", &[], int_variation("Q", first)),
        ctx.technique("hlsl", &[], int_variation("Q", second)),
    ]);
    assert_eq!(material.default_technique(), Some(expected));
}

#[test]
fn test_unsupported_techniques_are_skipped() {
    let ctx = TestContext::with_languages(&["glsl"]);
    let material = ctx.material(vec![
        ctx.technique("hlsl", &[], ShaderVariation::new()),
        ctx.technique("glsl", &[], ShaderVariation::new()),
    ]);
    assert_eq!(material.num_techniques(), 1);
    assert_eq!(material.technique(0).language(), "glsl");
    assert_eq!(material.default_technique(), Some(0));
}

#[test]
fn test_find_by_tag_and_variation() {
    let ctx = TestContext::new();
    let material = ctx.material(vec![
        ctx.technique("hlsl", &[], ShaderVariation::new()),
        ctx.technique("hlsl", &["Skinned"], int_variation("BONES", 2)),
        ctx.technique("hlsl", &["Skinned"], int_variation("BONES", 4)),
    ]);

    let desc = FindTechniqueDesc::new()
        .with_tag("Skinned")
        .with_variation(int_variation("BONES", 4));
    assert_eq!(material.find_technique(&desc), Some(2));

    // Without a search variation the lower score wins.
    assert_eq!(material.find_technique(&FindTechniqueDesc::new().with_tag("Skinned")), Some(1));
    assert_eq!(material.default_technique(), Some(0));
}

#[test]
fn test_unique_material_ids_across_threads() {
    let ctx = TestContext::new();
    let device = Arc::clone(&ctx.device);

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let device = Arc::clone(&device);
            thread::spawn(move || {
                (0..50)
                    .map(|i| Material::create_empty(&device, &format!("M{t}_{i}")).id())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut ids = HashSet::new();
    for handle in handles {
        for id in handle.join().unwrap() {
            assert!(ids.insert(id), "duplicate material id {id}");
        }
    }
    assert_eq!(ids.len(), 400);
}

#[test]
fn test_gpu_params_receive_material_values() {
    let ctx = TestContext::new();
    ctx.backend.register_reflection(
        "vs_main",
        GpuParamDesc::new()
            .with_param_block("PerObject", 0, 80)
            .with_data_param("gWorld", "PerObject", 0, GpuParamDataType::Matrix4x4)
            .with_data_param("gAlpha", "PerObject", 64, GpuParamDataType::Float1),
    );
    let pass = PassDesc::new()
        .with_program(GpuProgramDesc::new(GpuProgramType::Vertex, "vs_main", "", "hlsl"));

    let mut desc = ShaderDesc::new();
    desc.add_data_parameter(DataParamDesc::new("World", "gWorld", GpuParamDataType::Matrix4x4));
    desc.add_data_parameter(DataParamDesc::new("Alpha", "gAlpha", GpuParamDataType::Float1));
    desc.add_technique(ctx.technique_with_passes(vec![pass]));
    let shader = Shader::create(&ctx.device, "Transform", desc).unwrap();
    let mut material = Material::create(&ctx.device, "Transform", shader).unwrap();

    let mut world = [[0.0f32; 4]; 4];
    for (i, column) in world.iter_mut().enumerate() {
        column[i] = 1.0;
    }
    world[3] = [5.0, 6.0, 7.0, 1.0];
    material.set_mat4("World", world);
    material.set_float("Alpha", 0.5);

    let technique = material.default_technique().unwrap();
    let mut params = material.create_gpu_params(technique).unwrap();
    material.set_gpu_params(&mut params).unwrap();
    assert_eq!(params[0].flush().unwrap(), 1);

    let block = params[0].param_block("PerObject").unwrap();
    let gpu = block.read_gpu_data().unwrap();
    let translation: [f32; 4] = bytemuck::pod_read_unaligned(&gpu[48..64]);
    let alpha: f32 = bytemuck::pod_read_unaligned(&gpu[64..68]);
    assert_eq!(translation, [5.0, 6.0, 7.0, 1.0]);
    assert_eq!(alpha, 0.5);
    assert_eq!(ctx.backend.compile_count(), 1);
}

#[test]
fn test_compile_failure_surfaces_from_material() {
    let ctx = TestContext::new();
    ctx.backend.fail_compilation("vs_broken");
    let pass = PassDesc::new()
        .with_program(GpuProgramDesc::new(GpuProgramType::Vertex, "vs_broken", "", "hlsl"));
    let material = ctx.material(vec![ctx.technique_with_passes(vec![pass])]);

    let result = material.create_gpu_params(0);
    assert!(matches!(result, Err(GraphicsError::ProgramCompilation { .. })));
}

#[test]
fn test_techniques_are_shared_between_materials() {
    let ctx = TestContext::new();
    let shader = ctx.shader(vec![ctx.technique("hlsl", &[], ShaderVariation::new())]);
    let a = Material::create(&ctx.device, "A", Arc::clone(&shader)).unwrap();
    let b = Material::create(&ctx.device, "B", shader).unwrap();
    assert!(Arc::ptr_eq(a.technique(0), b.technique(0)));
    assert_ne!(a.id(), b.id());
}
