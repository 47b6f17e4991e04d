//! # framestack
//!
//! A fixed-buffer frame allocator with LIFO block discipline and a named
//! allocator registry.
//!
//! The allocator carves variable-size blocks out of one contiguous buffer in
//! stack order. Allocation and free are pointer arithmetic; a captured
//! [`FrameMark`] releases every block allocated since the capture in a single
//! O(1) step. The trade-off is discipline: blocks can only be freed from the
//! top, and there is no general-purpose out-of-order free. That fits callers
//! with strict phase-based allocation patterns — per-iteration scratch
//! memory, render-frame temporaries, parser working sets.
//!
//! ```text
//!   One buffer, blocks stacked upward, each preceded by a header
//!   holding the previous base offset:
//!
//!   +--------+--------+---------+--------+---------+----------------+
//!   |sentinel| header | payload | header | payload |  unused space  |
//!   +--------+--------+---------+--------+---------+----------------+
//!   0        ^                  ^                  ^
//!            |                  '--- base          '--- top
//!            '--- chain anchor
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use framestack::FrameAllocator;
//!
//! # fn main() -> framestack::FrameResult<()> {
//! let mut scratch = FrameAllocator::new(4096)?;
//!
//! let block = scratch.allocate_block(128)?;
//! scratch.block_mut(block).fill(0xAB);
//!
//! let mark = scratch.mark();
//! scratch.allocate_block(256)?;
//! scratch.allocate_block(64)?;
//!
//! // Releases both blocks above plus the 128-byte one active at capture.
//! scratch.restore(mark)?;
//! assert!(scratch.is_empty());
//! # Ok(())
//! # }
//! ```
//!
//! Named allocators live in an [`AllocatorRegistry`] (or the lazily-created
//! process-wide [`GlobalRegistry`]):
//!
//! ```rust
//! use framestack::AllocatorRegistry;
//!
//! # fn main() -> framestack::FrameResult<()> {
//! let mut registry = AllocatorRegistry::new();
//! registry.create_allocator("physics", 64 * 1024)?;
//!
//! let physics = registry.get_allocator("physics")?;
//! physics.allocate_block(1024)?;
//!
//! registry.cleanup_allocator("physics")?; // entry and buffer released together
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - `logging` (default): emit tracing events on failure paths
//!
//! ## Concurrency
//!
//! Single-threaded by construction: every operation completes synchronously
//! and mutation goes through `&mut self`. Callers needing concurrent access
//! serialize externally (one allocator per thread, or a mutex around the
//! registry). Only the global registry cell itself is locked, for
//! lazy-init/teardown soundness.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(rust_2018_idioms)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
// Error conditions are documented on the error enum variants themselves
#![allow(clippy::missing_errors_doc)]
// Panic sections exist where foreign handles can trip slice indexing
#![allow(clippy::missing_panics_doc)]

// Error types
pub mod error;

// Core modules
pub mod allocator;
pub mod diagnostics;

// Re-export core types for convenience
pub use crate::allocator::{
    AllocatorRegistry, BlockPtr, FrameAllocator, FrameConfig, FrameMark, FrameScope, FrameStats,
    GlobalRegistry, HEADER_SIZE, MemoryUsage,
};
pub use crate::error::{FrameError, FrameResult, Result};

// Public API exports
pub mod prelude {
    //! Convenient re-exports of commonly used types and traits.

    pub use crate::allocator::{
        AllocatorRegistry, BlockPtr, FrameAllocator, FrameConfig, FrameMark, FrameScope,
        GlobalRegistry, MemoryUsage,
    };
    pub use crate::diagnostics::ErrorLog;
    pub use crate::error::{FrameError, FrameResult, Result};
}
