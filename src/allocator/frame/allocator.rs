//! Main frame allocator implementation
//!
//! A fixed-capacity buffer carved into variable-size blocks in LIFO order.
//! Every block is preceded by a pointer-sized header holding the offset of
//! the previous `base`, forming an address-descending chain through the
//! buffer itself. That intrusive chain is what makes releasing a whole frame
//! (all blocks allocated since a [`FrameMark`] was captured) a single O(1)
//! pointer adjustment instead of a walk.
//!
//! ## Invariants
//!
//! - `HEADER_SIZE <= base <= top <= capacity`
//! - `top - base` equals the active block's header plus payload size
//!   (zero exactly when no block is active)
//! - `used() == top`: the sentinel slot plus every header and payload byte
//!   below the stack top
//! - No operation mutates state on its own failure path

use core::fmt;
use core::ptr::NonNull;

use super::{BlockPtr, FrameConfig, FrameMark};
use crate::allocator::MemoryUsage;
use crate::diagnostics::ErrorLog;
use crate::error::{FrameError, FrameResult};

/// Width of the per-block header holding the previous `base` offset
pub const HEADER_SIZE: usize = core::mem::size_of::<usize>();

/// Frame allocator with LIFO block discipline over a fixed buffer
///
/// # Memory Layout
/// ```text
/// +-----------------+ <- capacity
/// |  unused space   |
/// +-----------------+ <- top (first free byte)
/// |  payload        |
/// +-----------------+ <- handle returned by the last allocate_block
/// |  header:        |
/// |  previous base  |
/// +-----------------+ <- base
/// |  payload        |
/// +-----------------+
/// |  header:        |
/// |  previous base  |
/// +-----------------+ <- offset a previous mark() captured
/// |  payload        |
/// +-----------------+
/// |  header:        |
/// |  previous base  |
/// +-----------------+ <- HEADER_SIZE (empty-state base/top)
/// |  sentinel slot  |
/// +-----------------+ <- 0
/// ```
///
/// Blocks can only be freed in reverse allocation order, either one at a
/// time with [`free_block`](Self::free_block) or in bulk with
/// [`restore`](Self::restore). The allocator is single-threaded by design:
/// all mutation goes through `&mut self`, and callers needing concurrent
/// access must serialize externally.
pub struct FrameAllocator {
    /// Owned backing storage, zero-initialized at construction
    buffer: Box<[u8]>,

    /// Offset of the first free byte
    top: usize,

    /// Offset of the active block's header; equals `top` when empty
    base: usize,

    /// Configuration
    config: FrameConfig,

    /// Instance diagnostic log
    log: ErrorLog,

    /// Statistics (only tracked if enabled)
    total_allocations: u64,
    total_frees: u64,
    frame_restores: u64,
    peak_used: usize,
}

/// Point-in-time allocator statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameStats {
    /// Bytes currently consumed, headers and sentinel slot included
    pub used_bytes: usize,
    /// High-water mark of `used_bytes`
    pub peak_used_bytes: usize,
    /// Blocks handed out over the allocator's lifetime
    pub total_allocations: u64,
    /// Single-block frees over the allocator's lifetime
    pub total_frees: u64,
    /// Bulk frame releases over the allocator's lifetime
    pub frame_restores: u64,
}

impl FrameAllocator {
    /// Creates a new frame allocator with custom configuration
    ///
    /// Reserves `capacity` bytes, zero-filled, with the sentinel
    /// previous-base value written at the buffer start. Fails with
    /// [`FrameError::CapacityTooSmall`] if the buffer cannot hold even one
    /// block header.
    pub fn with_config(capacity: usize, config: FrameConfig) -> FrameResult<Self> {
        if capacity < HEADER_SIZE {
            return Err(FrameError::capacity_too_small(capacity, HEADER_SIZE));
        }

        let mut buffer = vec![0u8; capacity].into_boxed_slice();
        // Sentinel: the empty-state base offset, anchoring the header chain.
        buffer[..HEADER_SIZE].copy_from_slice(&HEADER_SIZE.to_ne_bytes());

        Ok(Self {
            buffer,
            top: HEADER_SIZE,
            base: HEADER_SIZE,
            config,
            log: ErrorLog::new(),
            total_allocations: 0,
            total_frees: 0,
            frame_restores: 0,
            peak_used: HEADER_SIZE,
        })
    }

    /// Creates a new frame allocator with default configuration
    pub fn new(capacity: usize) -> FrameResult<Self> {
        Self::with_config(capacity, FrameConfig::default())
    }

    /// Creates a production-optimized frame allocator
    pub fn production(capacity: usize) -> FrameResult<Self> {
        Self::with_config(capacity, FrameConfig::production())
    }

    /// Creates a debug-optimized frame allocator
    pub fn debug(capacity: usize) -> FrameResult<Self> {
        Self::with_config(capacity, FrameConfig::debug())
    }

    /// Returns the total capacity of the allocator
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Returns the bytes currently consumed, header overhead included
    pub fn used(&self) -> usize {
        self.top
    }

    /// Returns the bytes available for allocation
    pub fn unused(&self) -> usize {
        self.capacity() - self.top
    }

    /// True when no block is active
    pub fn is_empty(&self) -> bool {
        self.base == self.top
    }

    /// Returns the active configuration
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    /// Allocates a block of `size` bytes on top of the stack
    ///
    /// The block costs `size + HEADER_SIZE` bytes of buffer space. On
    /// success the returned handle addresses the payload region, which is
    /// zeroed before its first use only; once a region has been freed and
    /// reallocated its contents are unspecified.
    ///
    /// Fails with [`FrameError::StackExhausted`] when the block does not fit
    /// in the remaining space; no state is mutated on failure.
    pub fn allocate_block(&mut self, size: usize) -> FrameResult<BlockPtr> {
        let Some(needed) = size.checked_add(HEADER_SIZE) else {
            return self.fail(FrameError::size_overflow(size));
        };
        // Direct comparison against remaining space, evaluated before any
        // counter moves: failure must leave the allocator untouched.
        if needed > self.unused() {
            let available = self.unused();
            return self.fail(FrameError::stack_exhausted(size, available));
        }

        self.write_header(self.top, self.base);
        self.base = self.top;
        self.top += needed;

        if self.config.track_stats {
            self.total_allocations += 1;
            self.peak_used = self.peak_used.max(self.top);
        }

        debug_assert!(self.base <= self.top && self.top <= self.capacity());
        Ok(BlockPtr::new(self.base + HEADER_SIZE, size))
    }

    /// Frees the top-most block
    ///
    /// Fails with [`FrameError::NoActiveBlock`] when nothing is allocated;
    /// counters are untouched on failure.
    pub fn free_block(&mut self) -> FrameResult<()> {
        if self.is_empty() {
            return self.fail(FrameError::no_active_block());
        }

        let new_top = self.base;
        // The header must be read before the debug fill overwrites it.
        let prev_base = self.read_header(new_top);
        debug_assert!(prev_base >= HEADER_SIZE && prev_base <= new_top);

        if let Some(pattern) = self.config.dealloc_pattern {
            self.buffer[new_top..self.top].fill(pattern);
        }

        self.top = new_top;
        self.base = prev_base;

        if self.config.track_stats {
            self.total_frees += 1;
        }
        Ok(())
    }

    /// Captures the current frame position
    ///
    /// Always succeeds; on an empty allocator the mark captures the
    /// sentinel position. The mark stays valid until any free retreats the
    /// stack top below it.
    pub fn mark(&self) -> FrameMark {
        FrameMark { offset: self.base }
    }

    /// Releases every block allocated since `mark` was captured
    ///
    /// The block that was active at capture time is released as well; after
    /// the call the active block is whichever one was active just before it
    /// was allocated. Cost is O(1) no matter how many blocks collapse.
    ///
    /// Fails with [`FrameError::FrameAlreadyFreed`] when the stack top has
    /// already retreated past the mark, and [`FrameError::ForeignMark`] for
    /// offsets that cannot name a header of this allocator. Failure mutates
    /// nothing. A mark equal to the current top (nothing allocated since
    /// capture) is a successful no-op.
    pub fn restore(&mut self, mark: FrameMark) -> FrameResult<()> {
        let offset = mark.offset;

        if offset > self.top {
            let top = self.top;
            return self.fail(FrameError::frame_already_freed(offset, top));
        }
        if offset == self.top {
            // Already unwound to the mark; nothing to release.
            return Ok(());
        }
        if offset < HEADER_SIZE || offset + HEADER_SIZE > self.capacity() {
            return self.fail(FrameError::foreign_mark(offset));
        }

        let prev_base = self.read_header(offset);
        // A mark that does not sit on a real header yields an impossible
        // previous base.
        if prev_base < HEADER_SIZE || prev_base > offset {
            return self.fail(FrameError::foreign_mark(offset));
        }

        if let Some(pattern) = self.config.dealloc_pattern {
            self.buffer[offset..self.top].fill(pattern);
        }

        self.top = offset;
        self.base = prev_base;

        if self.config.track_stats {
            self.frame_restores += 1;
        }

        debug_assert!(self.base <= self.top && self.top <= self.capacity());
        Ok(())
    }

    /// Read access to a block's payload
    ///
    /// # Panics
    /// Panics if the handle was produced by a different allocator with a
    /// larger buffer.
    pub fn block(&self, block: BlockPtr) -> &[u8] {
        &self.buffer[block.offset()..block.offset() + block.len()]
    }

    /// Write access to a block's payload
    ///
    /// # Panics
    /// Panics if the handle was produced by a different allocator with a
    /// larger buffer.
    pub fn block_mut(&mut self, block: BlockPtr) -> &mut [u8] {
        &mut self.buffer[block.offset()..block.offset() + block.len()]
    }

    /// Raw pointer to a block's payload, for callers doing placement
    /// construction of typed values
    ///
    /// The allocator never constructs or drops typed objects itself; callers
    /// layering object lifecycles on top of raw blocks own both halves of
    /// that contract.
    pub fn block_raw(&mut self, block: BlockPtr) -> NonNull<u8> {
        debug_assert!(block.offset() + block.len() <= self.capacity());
        // SAFETY: allocate_block only hands out offsets within the owned
        // buffer, so the sum stays in bounds (one-past-the-end at most for
        // zero-sized blocks) and the result is never null.
        unsafe { NonNull::new_unchecked(self.buffer.as_mut_ptr().add(block.offset())) }
    }

    /// Pops the most recent diagnostic message
    ///
    /// Fails with [`FrameError::NoDiagnostics`] when no failure message is
    /// pending; callers should only read after observing a failed operation.
    pub fn take_error(&mut self) -> FrameResult<String> {
        self.log.pop().ok_or(FrameError::NoDiagnostics)
    }

    /// Read access to the instance diagnostic log
    pub fn error_log(&self) -> &ErrorLog {
        &self.log
    }

    /// Returns a snapshot of the allocator statistics
    ///
    /// With statistics tracking disabled the counters stay zero and the
    /// peak reflects the current usage.
    pub fn stats(&self) -> FrameStats {
        FrameStats {
            used_bytes: self.used(),
            peak_used_bytes: if self.config.track_stats {
                self.peak_used
            } else {
                self.used()
            },
            total_allocations: self.total_allocations,
            total_frees: self.total_frees,
            frame_restores: self.frame_restores,
        }
    }

    fn read_header(&self, at: usize) -> usize {
        let mut raw = [0u8; HEADER_SIZE];
        raw.copy_from_slice(&self.buffer[at..at + HEADER_SIZE]);
        usize::from_ne_bytes(raw)
    }

    fn write_header(&mut self, at: usize, prev_base: usize) {
        self.buffer[at..at + HEADER_SIZE].copy_from_slice(&prev_base.to_ne_bytes());
    }

    /// Records the failure in the instance log and propagates it
    fn fail<T>(&mut self, err: FrameError) -> FrameResult<T> {
        self.log.push(err.to_string());
        Err(err)
    }
}

impl fmt::Debug for FrameAllocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameAllocator")
            .field("capacity", &self.capacity())
            .field("top", &self.top)
            .field("base", &self.base)
            .field("unused", &self.unused())
            .field("pending_errors", &self.log.len())
            .finish_non_exhaustive()
    }
}

impl MemoryUsage for FrameAllocator {
    fn used_memory(&self) -> usize {
        self.used()
    }

    fn available_memory(&self) -> Option<usize> {
        Some(self.unused())
    }

    fn total_memory(&self) -> Option<usize> {
        Some(self.capacity())
    }
}
