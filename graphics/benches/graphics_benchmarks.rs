use std::sync::Arc;

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use tessel_graphics::types::BufferUsage;
use tessel_graphics::{
    DummyBackend, FindTechniqueDesc, GraphicsDevice, Material, Shader, ShaderDesc,
    ShaderVariation, ShaderVariationParam, Technique, VariationAxis, generate_variations,
};

fn create_device() -> Arc<GraphicsDevice> {
    GraphicsDevice::new(Arc::new(DummyBackend::new()))
}

/// Material over a shader with one technique per generated variation.
fn material_with_variations(device: &Arc<GraphicsDevice>) -> Material {
    let axes = [
        VariationAxis::bool("SKINNED"),
        VariationAxis::bool("MORPH"),
        VariationAxis::int("QUALITY", &[0, 1, 2]),
    ];
    let mut desc = ShaderDesc::new();
    for variation in generate_variations(&axes) {
        desc.add_technique(Technique::new(device, "hlsl", Vec::new(), variation, Vec::new()));
    }
    let shader = Shader::create(device, "Bench", desc).unwrap();
    Material::create(device, "Bench", shader).unwrap()
}

// ---------------------------------------------------------------------------
// Variations
// ---------------------------------------------------------------------------

fn bench_generate_variations(c: &mut Criterion) {
    let axes = [
        VariationAxis::bool("A"),
        VariationAxis::bool("B"),
        VariationAxis::bool("C"),
        VariationAxis::bool("D"),
    ];
    c.bench_function("generate_variations_4_axes", |b| {
        b.iter(|| black_box(generate_variations(black_box(&axes))));
    });
}

fn bench_variation_matches(c: &mut Criterion) {
    let full = ShaderVariation::new()
        .with("SKINNED", ShaderVariationParam::bool(true))
        .with("MORPH", ShaderVariationParam::bool(false))
        .with("QUALITY", ShaderVariationParam::int(2));
    let part = ShaderVariation::new().with("QUALITY", ShaderVariationParam::int(2));
    c.bench_function("variation_matches_partial", |b| {
        b.iter(|| black_box(full.matches(black_box(&part), false)));
    });
}

// ---------------------------------------------------------------------------
// Technique selection
// ---------------------------------------------------------------------------

fn bench_default_technique(c: &mut Criterion) {
    let device = create_device();
    let material = material_with_variations(&device);
    c.bench_function("default_technique_12_candidates", |b| {
        b.iter(|| black_box(material.default_technique()));
    });
}

fn bench_find_technique(c: &mut Criterion) {
    let device = create_device();
    let material = material_with_variations(&device);
    let desc = FindTechniqueDesc::new().with_variation(
        ShaderVariation::new()
            .with("SKINNED", ShaderVariationParam::bool(true))
            .with("QUALITY", ShaderVariationParam::int(1)),
    );
    c.bench_function("find_technique_by_variation", |b| {
        b.iter(|| black_box(material.find_technique(black_box(&desc))));
    });
}

// ---------------------------------------------------------------------------
// Param blocks
// ---------------------------------------------------------------------------

fn bench_param_block_write_flush(c: &mut Criterion) {
    let device = create_device();
    let mut block = device
        .create_param_block_buffer(256, BufferUsage::DYNAMIC)
        .unwrap();
    c.bench_function("param_block_write_flush_256", |b| {
        b.iter(|| {
            block.write_value(64, black_box(&[1.0f32; 16])).unwrap();
            black_box(block.flush_to_gpu().unwrap());
        });
    });
}

criterion_group!(
    benches,
    bench_generate_variations,
    bench_variation_matches,
    bench_default_technique,
    bench_find_technique,
    bench_param_block_write_flush,
);
criterion_main!(benches);
