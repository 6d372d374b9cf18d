//! Lockable GPU memory shared by every buffer kind.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::backend::BufferStorage;
use crate::error::GraphicsError;
use crate::types::{BufferUsage, BufferWriteType, GpuLockOptions};

static NEXT_BUFFER_ID: AtomicU64 = AtomicU64::new(1);

/// Raw GPU memory with a single-lock discipline.
///
/// At most one lock may be outstanding. A lock hands out a CPU staging copy
/// of the range; [`unlock`](Self::unlock) writes it back unless the lock was
/// read-only. [`read_data`](Self::read_data) and
/// [`write_data`](Self::write_data) work regardless of lock state. All ranges
/// are checked against the buffer size before the backend storage is touched.
///
/// # Example
///
/// ```ignore
/// let mut buffer = device.create_vertex_buffer(&VertexBufferDesc::new(12, 3))?;
/// let bytes = buffer.lock(0, 12, GpuLockOptions::WriteOnly)?;
/// bytes.copy_from_slice(bytemuck::cast_slice(&[0.0f32, 1.0, 0.0]));
/// buffer.unlock()?;
/// ```
#[derive(Debug)]
pub struct HardwareBuffer {
    id: u64,
    storage: Arc<dyn BufferStorage>,
    usage: BufferUsage,
    locked: Option<LockState>,
}

#[derive(Debug)]
struct LockState {
    offset: u64,
    options: GpuLockOptions,
    staging: Vec<u8>,
}

impl HardwareBuffer {
    pub(crate) fn new(storage: Arc<dyn BufferStorage>, usage: BufferUsage) -> Self {
        Self {
            id: NEXT_BUFFER_ID.fetch_add(1, Ordering::Relaxed),
            storage,
            usage,
            locked: None,
        }
    }

    /// Process-wide unique id of this buffer.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Backend memory, shared with every view over this buffer.
    pub(crate) fn storage(&self) -> &Arc<dyn BufferStorage> {
        &self.storage
    }

    /// Size in bytes.
    pub fn size(&self) -> u64 {
        self.storage.size()
    }

    /// Usage hints the buffer was created with.
    pub fn usage(&self) -> BufferUsage {
        self.usage
    }

    pub fn is_locked(&self) -> bool {
        self.locked.is_some()
    }

    /// Options of the outstanding lock, if any.
    pub fn lock_options(&self) -> Option<GpuLockOptions> {
        self.locked.as_ref().map(|l| l.options)
    }

    /// Map a range for CPU access.
    ///
    /// # Errors
    ///
    /// [`GraphicsError::AlreadyLocked`] if a lock is outstanding,
    /// [`GraphicsError::OutOfRange`] if the range exceeds the buffer.
    pub fn lock(
        &mut self,
        offset: u64,
        length: u64,
        options: GpuLockOptions,
    ) -> Result<&mut [u8], GraphicsError> {
        if self.locked.is_some() {
            return Err(GraphicsError::AlreadyLocked);
        }
        self.check_range(offset, length)?;

        let mut staging = vec![0u8; length as usize];
        if options != GpuLockOptions::WriteDiscard {
            self.storage.read(offset, &mut staging)?;
        }
        log::trace!(
            "HardwareBuffer: lock id={} offset={} len={} options={:?}",
            self.id,
            offset,
            length,
            options
        );
        let state = self.locked.insert(LockState {
            offset,
            options,
            staging,
        });
        Ok(state.staging.as_mut_slice())
    }

    /// Release the outstanding lock, writing the staging copy back for
    /// writable locks.
    ///
    /// # Errors
    ///
    /// [`GraphicsError::NotLocked`] if there is no outstanding lock.
    pub fn unlock(&mut self) -> Result<(), GraphicsError> {
        let Some(state) = self.locked.take() else {
            return Err(GraphicsError::NotLocked);
        };
        let write_type = match state.options {
            GpuLockOptions::ReadOnly => return Ok(()),
            GpuLockOptions::WriteDiscard => BufferWriteType::Discard,
            GpuLockOptions::WriteNoOverwrite => BufferWriteType::NoOverwrite,
            GpuLockOptions::ReadWrite | GpuLockOptions::WriteOnly => BufferWriteType::Normal,
        };
        self.storage.write(state.offset, &state.staging, write_type)
    }

    /// Copy `dest.len()` bytes starting at `offset` into `dest`.
    pub fn read_data(&self, offset: u64, dest: &mut [u8]) -> Result<(), GraphicsError> {
        self.check_range(offset, dest.len() as u64)?;
        self.storage.read(offset, dest)
    }

    /// Copy `src` into the buffer starting at `offset`.
    pub fn write_data(
        &mut self,
        offset: u64,
        src: &[u8],
        write_type: BufferWriteType,
    ) -> Result<(), GraphicsError> {
        self.check_range(offset, src.len() as u64)?;
        self.storage.write(offset, src, write_type)
    }

    /// Copy a range from another buffer.
    ///
    /// With `discard_whole_buffer` the rest of this buffer's contents may be
    /// lost.
    pub fn copy_data(
        &mut self,
        src: &HardwareBuffer,
        src_offset: u64,
        dst_offset: u64,
        length: u64,
        discard_whole_buffer: bool,
    ) -> Result<(), GraphicsError> {
        src.check_range(src_offset, length)?;
        self.check_range(dst_offset, length)?;

        let write_type = if discard_whole_buffer {
            BufferWriteType::Discard
        } else {
            BufferWriteType::Normal
        };
        self.storage
            .copy_from(src.storage.as_ref(), src_offset, dst_offset, length, write_type)
    }

    /// Copy the entire contents of an equally sized buffer.
    pub fn copy_all(&mut self, src: &HardwareBuffer) -> Result<(), GraphicsError> {
        if src.size() != self.size() {
            return Err(GraphicsError::SizeMismatch {
                expected: self.size(),
                actual: src.size(),
            });
        }
        self.copy_data(src, 0, 0, self.size(), true)
    }

    /// Read the whole buffer.
    pub fn read_all(&self) -> Result<Vec<u8>, GraphicsError> {
        let mut out = vec![0u8; self.size() as usize];
        self.read_data(0, &mut out)?;
        Ok(out)
    }

    fn check_range(&self, offset: u64, length: u64) -> Result<(), GraphicsError> {
        let size = self.size();
        match offset.checked_add(length) {
            Some(end) if end <= size => Ok(()),
            _ => Err(GraphicsError::OutOfRange {
                offset,
                length,
                size,
            }),
        }
    }
}

static_assertions::assert_impl_all!(HardwareBuffer: Send, Sync);
