//! Shared views over buffers.
//!
//! A view describes how shaders interpret a buffer: element format and
//! stride, and whether access is read-only or read-write. Views are cached on
//! their buffer by [`GpuViewKey`]; asking twice for the same key returns the
//! same `Arc`. The cache only holds weak references, so the last dropped
//! `Arc` destroys the view and its entry is pruned on the next lookup.
//!
//! Every view records the id of the buffer it was created from and holds
//! that buffer's backend storage, so binding a view keeps the memory alive
//! after the buffer object itself is dropped.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::backend::BufferStorage;
use crate::error::GraphicsError;
use crate::types::GpuViewKey;

use super::hardware_buffer::HardwareBuffer;

/// A typed window over a buffer.
#[derive(Debug)]
pub struct GpuBufferView {
    buffer_id: u64,
    storage: Arc<dyn BufferStorage>,
    key: GpuViewKey,
    num_elements: u32,
    load_store: bool,
}

impl GpuBufferView {
    pub(crate) fn new(
        buffer: &HardwareBuffer,
        key: GpuViewKey,
        num_elements: u32,
        load_store: bool,
    ) -> Self {
        Self {
            buffer_id: buffer.id(),
            storage: Arc::clone(buffer.storage()),
            key,
            num_elements,
            load_store,
        }
    }

    /// Id of the viewed buffer, see [`HardwareBuffer::id`].
    pub fn buffer_id(&self) -> u64 {
        self.buffer_id
    }

    /// Backend memory of the viewed buffer.
    pub fn storage(&self) -> &Arc<dyn BufferStorage> {
        &self.storage
    }

    /// Key the view is cached under.
    pub fn key(&self) -> &GpuViewKey {
        &self.key
    }

    /// Number of elements visible through the view.
    pub fn num_elements(&self) -> u32 {
        self.num_elements
    }

    /// Whether the view allows unordered read/write access.
    pub fn is_load_store(&self) -> bool {
        self.load_store
    }

    /// Copy bytes of the viewed buffer starting at `offset` into `dest`.
    pub fn read_data(&self, offset: u64, dest: &mut [u8]) -> Result<(), GraphicsError> {
        let size = self.storage.size();
        match offset.checked_add(dest.len() as u64) {
            Some(end) if end <= size => self.storage.read(offset, dest),
            _ => Err(GraphicsError::OutOfRange {
                offset,
                length: dest.len() as u64,
                size,
            }),
        }
    }
}

impl PartialEq for GpuBufferView {
    fn eq(&self, other: &Self) -> bool {
        self.buffer_id == other.buffer_id
            && self.key == other.key
            && self.num_elements == other.num_elements
            && self.load_store == other.load_store
    }
}

impl Eq for GpuBufferView {}

/// Per-buffer view cache.
#[derive(Debug, Default)]
pub(crate) struct ViewCache {
    views: Mutex<HashMap<GpuViewKey, Weak<GpuBufferView>>>,
}

impl ViewCache {
    /// Return the live view for `key`, creating it if none exists.
    pub(crate) fn get_or_create(
        &self,
        key: GpuViewKey,
        create: impl FnOnce() -> GpuBufferView,
    ) -> Arc<GpuBufferView> {
        let mut views = self.views.lock();
        views.retain(|_, view| view.strong_count() > 0);

        if let Some(view) = views.get(&key).and_then(Weak::upgrade) {
            return view;
        }

        let view = Arc::new(create());
        views.insert(key, Arc::downgrade(&view));
        log::trace!("ViewCache: created view {:?}", key);
        view
    }

    /// Number of views still alive.
    pub(crate) fn live_count(&self) -> usize {
        self.views
            .lock()
            .values()
            .filter(|view| view.strong_count() > 0)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{DummyBackend, GpuBackend};
    use crate::types::{BufferUsage, BufferWriteType, GpuBufferFormat, GpuBufferType};

    fn key(format: GpuBufferFormat) -> GpuViewKey {
        GpuViewKey::new(GpuBufferType::Standard, format, format.size())
    }

    fn create_test_buffer(size: u64) -> HardwareBuffer {
        let storage = DummyBackend::new()
            .create_buffer_storage(size, BufferUsage::STATIC)
            .unwrap();
        HardwareBuffer::new(storage, BufferUsage::STATIC)
    }

    #[test]
    fn test_same_key_returns_same_view() {
        let buffer = create_test_buffer(16);
        let cache = ViewCache::default();
        let a = cache.get_or_create(key(GpuBufferFormat::R32Float), || {
            GpuBufferView::new(&buffer, key(GpuBufferFormat::R32Float), 4, false)
        });
        let b = cache.get_or_create(key(GpuBufferFormat::R32Float), || {
            panic!("view should have been cached")
        });

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(Arc::strong_count(&a), 2);
    }

    #[test]
    fn test_different_keys_get_different_views() {
        let buffer = create_test_buffer(16);
        let cache = ViewCache::default();
        let a = cache.get_or_create(key(GpuBufferFormat::R32Float), || {
            GpuBufferView::new(&buffer, key(GpuBufferFormat::R32Float), 4, false)
        });
        let b = cache.get_or_create(key(GpuBufferFormat::R32Uint), || {
            GpuBufferView::new(&buffer, key(GpuBufferFormat::R32Uint), 4, false)
        });
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(cache.live_count(), 2);
    }

    #[test]
    fn test_last_release_destroys_view() {
        let buffer = create_test_buffer(32);
        let cache = ViewCache::default();
        let view = cache.get_or_create(key(GpuBufferFormat::R32Float), || {
            GpuBufferView::new(&buffer, key(GpuBufferFormat::R32Float), 4, false)
        });
        assert_eq!(cache.live_count(), 1);
        drop(view);
        assert_eq!(cache.live_count(), 0);

        let recreated = cache.get_or_create(key(GpuBufferFormat::R32Float), || {
            GpuBufferView::new(&buffer, key(GpuBufferFormat::R32Float), 8, false)
        });
        assert_eq!(recreated.num_elements(), 8);
    }

    #[test]
    fn test_view_identifies_its_buffer() {
        let a = create_test_buffer(16);
        let b = create_test_buffer(16);
        let view_a = GpuBufferView::new(&a, key(GpuBufferFormat::R32Float), 4, false);
        let view_b = GpuBufferView::new(&b, key(GpuBufferFormat::R32Float), 4, false);

        assert_eq!(view_a.buffer_id(), a.id());
        assert_ne!(view_a, view_b);
        assert_eq!(view_a, GpuBufferView::new(&a, key(GpuBufferFormat::R32Float), 4, false));
    }

    #[test]
    fn test_view_keeps_storage_alive() {
        let mut buffer = create_test_buffer(8);
        buffer
            .write_data(0, &[1, 2, 3, 4, 5, 6, 7, 8], BufferWriteType::Normal)
            .unwrap();
        let view = GpuBufferView::new(&buffer, key(GpuBufferFormat::R32Uint), 2, false);
        drop(buffer);

        assert_eq!(Arc::strong_count(view.storage()), 1);
        let mut out = [0u8; 4];
        view.read_data(4, &mut out).unwrap();
        assert_eq!(out, [5, 6, 7, 8]);
        assert!(view.read_data(6, &mut out).is_err());
    }
}
