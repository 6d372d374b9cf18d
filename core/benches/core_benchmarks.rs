use std::sync::Arc;

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use tessel_core::mesh::{
    IndexType, MeshData, SubMesh, VertexDataDesc, VertexElementSemantic, VertexElementType,
};

fn grid_mesh(size: u32) -> MeshData {
    let desc = Arc::new(VertexDataDesc::position_normal_uv());
    let num_vertices = size * size;
    let num_indices = (size - 1) * (size - 1) * 6;
    let mut mesh = MeshData::new(num_vertices, num_indices, desc, IndexType::Index32);

    let positions: Vec<[f32; 3]> = (0..num_vertices)
        .map(|i| [(i % size) as f32, (i / size) as f32, 0.0])
        .collect();
    mesh.set_vertex_data(
        VertexElementSemantic::Position,
        bytemuck::cast_slice(&positions),
        0,
        0,
    )
    .unwrap();

    let indices = mesh.indices32_mut().unwrap();
    let mut n = 0;
    for y in 0..size - 1 {
        for x in 0..size - 1 {
            let i = y * size + x;
            indices[n..n + 6].copy_from_slice(&[i, i + 1, i + size, i + 1, i + size + 1, i + size]);
            n += 6;
        }
    }
    mesh
}

// ---------------------------------------------------------------------------
// Vertex layout
// ---------------------------------------------------------------------------

fn bench_layout_build(c: &mut Criterion) {
    c.bench_function("vertex_desc_build_two_streams", |b| {
        b.iter(|| {
            let mut desc = VertexDataDesc::new();
            desc.add_element(VertexElementType::Float3, VertexElementSemantic::Position, 0, 0, 0);
            desc.add_element(VertexElementType::Float3, VertexElementSemantic::Normal, 0, 1, 0);
            desc.add_element(VertexElementType::Float4, VertexElementSemantic::Tangent, 0, 1, 0);
            desc.add_element(VertexElementType::Float2, VertexElementSemantic::TexCoord, 0, 0, 0);
            black_box(desc)
        });
    });
}

fn bench_layout_create_elements(c: &mut Criterion) {
    let desc = VertexDataDesc::position_normal_uv()
        .with_element(VertexElementType::Float4, VertexElementSemantic::Tangent, 0, 1)
        .with_element(VertexElementType::Color, VertexElementSemantic::Color, 0, 1);
    c.bench_function("vertex_desc_create_elements", |b| {
        b.iter(|| black_box(desc.create_elements()));
    });
}

// ---------------------------------------------------------------------------
// Mesh data
// ---------------------------------------------------------------------------

fn bench_calculate_bounds(c: &mut Criterion) {
    let mesh = grid_mesh(64);
    c.bench_function("mesh_data_bounds_64x64", |b| {
        b.iter(|| black_box(mesh.calculate_bounds()));
    });
}

fn bench_combine(c: &mut Criterion) {
    let meshes: Vec<MeshData> = (0..8).map(|_| grid_mesh(32)).collect();
    let refs: Vec<&MeshData> = meshes.iter().collect();
    let subs: Vec<Vec<SubMesh>> = meshes
        .iter()
        .map(|m| vec![SubMesh::new(0, m.num_indices())])
        .collect();
    c.bench_function("mesh_data_combine_8x32x32", |b| {
        b.iter(|| black_box(MeshData::combine(black_box(&refs), &subs).unwrap()));
    });
}

criterion_group!(
    benches,
    bench_layout_build,
    bench_layout_create_elements,
    bench_calculate_bounds,
    bench_combine,
);
criterion_main!(benches);
