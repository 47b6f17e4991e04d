//! Block handle returned by allocation

/// Handle to an allocated block's payload region
///
/// The handle is a plain (offset, length) pair into the owning allocator's
/// buffer; resolve it with [`FrameAllocator::block`](super::FrameAllocator::block),
/// [`block_mut`](super::FrameAllocator::block_mut) or
/// [`block_raw`](super::FrameAllocator::block_raw). A handle held across a
/// free of its block stays in bounds but reads whatever occupies the region
/// afterwards — a logical error, never memory unsafety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockPtr {
    offset: usize,
    len: usize,
}

impl BlockPtr {
    pub(super) fn new(offset: usize, len: usize) -> Self {
        Self { offset, len }
    }

    /// Byte offset of the payload within the allocator's buffer
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Payload length in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// True for zero-sized blocks
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
