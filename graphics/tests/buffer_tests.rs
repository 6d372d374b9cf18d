//! Integration tests for hardware buffers, views and declarations.

mod common;

use std::sync::Arc;

use rstest::rstest;

use common::TestContext;
use tessel_core::mesh::{IndexType, VertexDataDesc};
use tessel_graphics::GraphicsError;
use tessel_graphics::types::{
    BufferUsage, BufferWriteType, GpuBufferDesc, GpuBufferFormat, GpuBufferType, GpuLockOptions,
    IndexBufferDesc, VertexBufferDesc,
};

#[rstest]
#[case::read_only(GpuLockOptions::ReadOnly)]
#[case::write_only(GpuLockOptions::WriteOnly)]
#[case::write_discard(GpuLockOptions::WriteDiscard)]
fn test_lock_discipline(#[case] options: GpuLockOptions) {
    let ctx = TestContext::new();
    let mut buffer = ctx
        .device
        .create_vertex_buffer(&VertexBufferDesc::new(16, 4))
        .unwrap();

    buffer.lock(0, 16, options).unwrap();
    assert_eq!(buffer.lock(0, 16, options).unwrap_err(), GraphicsError::AlreadyLocked);
    buffer.unlock().unwrap();
    assert_eq!(buffer.unlock().unwrap_err(), GraphicsError::NotLocked);
}

#[rstest]
#[case::past_end(60, 8)]
#[case::overflow(u64::MAX, 2)]
fn test_lock_out_of_range(#[case] offset: u64, #[case] length: u64) {
    let ctx = TestContext::new();
    let mut buffer = ctx
        .device
        .create_index_buffer(&IndexBufferDesc::new(IndexType::Index32, 16))
        .unwrap();

    assert!(matches!(
        buffer.lock(offset, length, GpuLockOptions::ReadWrite),
        Err(GraphicsError::OutOfRange { .. })
    ));
    assert!(!buffer.is_locked());
}

#[test]
fn test_vertex_buffer_copy() {
    let ctx = TestContext::new();
    let desc = VertexBufferDesc::new(4, 4);
    let mut src = ctx.device.create_vertex_buffer(&desc).unwrap();
    let mut dst = ctx.device.create_vertex_buffer(&desc).unwrap();

    let values: [u32; 4] = [1, 2, 3, 4];
    src.write_data(0, bytemuck::cast_slice(&values), BufferWriteType::Discard)
        .unwrap();
    dst.copy_all(&src).unwrap();

    let bytes = dst.read_all().unwrap();
    let copied: Vec<u32> = bytemuck::pod_collect_to_vec(&bytes);
    assert_eq!(copied, values);
}

#[test]
fn test_param_block_flush_is_noop_when_clean() {
    let ctx = TestContext::new();
    let mut block = ctx
        .device
        .create_param_block_buffer(64, BufferUsage::DYNAMIC)
        .unwrap();

    assert!(block.flush_to_gpu().unwrap());
    assert!(!block.flush_to_gpu().unwrap());

    block.write_value(16, &2.5f32).unwrap();
    assert!(block.is_dirty());
    assert!(block.flush_to_gpu().unwrap());
    assert!(!block.is_dirty());
    assert!(!block.flush_to_gpu().unwrap());

    let gpu = block.read_gpu_data().unwrap();
    let value: f32 = bytemuck::pod_read_unaligned(&gpu[16..20]);
    assert_eq!(value, 2.5);
}

#[test]
fn test_view_identity() {
    let ctx = TestContext::new();
    let buffer = ctx
        .device
        .create_gpu_buffer(&GpuBufferDesc::standard(GpuBufferFormat::Rgba32Float, 8))
        .unwrap();

    let a = buffer.default_view();
    let b = buffer.default_view();
    assert!(Arc::ptr_eq(&a, &b));

    let raw = buffer
        .view(GpuBufferType::Raw, GpuBufferFormat::R32Uint, 4, false)
        .unwrap();
    assert!(!Arc::ptr_eq(&a, &raw));
    assert_eq!(raw.num_elements(), 32);
    assert_eq!(buffer.view_count(), 2);

    drop(a);
    drop(b);
    assert_eq!(buffer.view_count(), 1);
}

#[test]
fn test_views_belong_to_their_buffer() {
    let ctx = TestContext::new();
    let desc = GpuBufferDesc::standard(GpuBufferFormat::R32Uint, 4);
    let mut a = ctx.device.create_gpu_buffer(&desc).unwrap();
    let b = ctx.device.create_gpu_buffer(&desc).unwrap();
    a.write_data(0, bytemuck::cast_slice(&[10u32, 20, 30, 40]), BufferWriteType::Normal)
        .unwrap();

    let view_a = a.default_view();
    let view_b = b.default_view();
    assert_ne!(*view_a, *view_b);
    assert_eq!(view_a.buffer_id(), a.id());
    assert_eq!(view_b.buffer_id(), b.id());

    drop(a);
    drop(b);
    let mut out = [0u8; 8];
    view_a.read_data(8, &mut out).unwrap();
    assert_eq!(bytemuck::pod_read_unaligned::<[u32; 2]>(&out), [30, 40]);
}

#[test]
fn test_load_store_view_requires_usage() {
    let ctx = TestContext::new();
    let buffer = ctx
        .device
        .create_gpu_buffer(&GpuBufferDesc::structured(16, 4))
        .unwrap();
    assert!(matches!(
        buffer.view(GpuBufferType::Structured, GpuBufferFormat::Unknown, 16, true),
        Err(GraphicsError::InvalidArgument(_))
    ));
}

#[test]
fn test_declaration_cache() {
    let ctx = TestContext::new();
    let elements = VertexDataDesc::position_normal_uv().create_elements();

    let a = ctx.device.create_vertex_declaration(&elements);
    let b = ctx.device.create_vertex_declaration(&elements);
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(ctx.device.vertex_declaration_count(), 1);
    assert_eq!(a.vertex_stride(0), 32);

    drop(a);
    drop(b);
    assert_eq!(ctx.device.vertex_declaration_count(), 0);
}

#[rstest]
#[case::empty_vertex(VertexBufferDesc::new(0, 4))]
#[case::no_vertices(VertexBufferDesc::new(12, 0))]
fn test_empty_buffers_are_rejected(#[case] desc: VertexBufferDesc) {
    let ctx = TestContext::new();
    assert!(matches!(
        ctx.device.create_vertex_buffer(&desc),
        Err(GraphicsError::InvalidArgument(_))
    ));
}
