//! Standalone error types for framestack
//!
//! Uses thiserror for clean, idiomatic Rust error definitions. Every failing
//! operation also records its rendered message in the owning component's
//! diagnostic log (see [`crate::diagnostics`]).

use thiserror::Error;

#[cfg(feature = "logging")]
use tracing::{error, warn};

// ============================================================================
// Main Error Type
// ============================================================================

/// Frame allocator and registry errors
#[must_use = "errors should be handled"]
#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum FrameError {
    // --- Allocator Errors ---
    #[error("stack full: allocation of {requested} bytes failed ({available} bytes free)")]
    StackExhausted { requested: usize, available: usize },

    #[error("size overflow computing block footprint for {size} bytes")]
    SizeOverflow { size: usize },

    #[error("capacity {capacity} cannot hold a block header ({min} bytes minimum)")]
    CapacityTooSmall { capacity: usize, min: usize },

    #[error("free failed: no block is currently allocated")]
    NoActiveBlock,

    // --- Frame Errors ---
    #[error("frame already freed: mark at offset {mark} is above the stack top {top}")]
    FrameAlreadyFreed { mark: usize, top: usize },

    #[error("frame mark at offset {mark} does not belong to this allocator")]
    ForeignMark { mark: usize },

    // --- Registry Errors ---
    #[error("allocator id '{id}' is already registered")]
    DuplicateId { id: String },

    #[error("allocator id '{id}' is not registered")]
    UnknownId { id: String },

    #[error("allocator id must not be empty")]
    EmptyId,

    // --- Diagnostics ---
    #[error("no diagnostic message available")]
    NoDiagnostics,
}

impl FrameError {
    /// Check if the failed operation can succeed after the caller frees space
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StackExhausted { .. })
    }

    /// Get error code for categorization
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::StackExhausted { .. } => "FRAME:ALLOC:EXHAUSTED",
            Self::SizeOverflow { .. } => "FRAME:ALLOC:OVERFLOW",
            Self::CapacityTooSmall { .. } => "FRAME:INIT:CAPACITY",
            Self::NoActiveBlock => "FRAME:FREE:NO_BLOCK",
            Self::FrameAlreadyFreed { .. } => "FRAME:RESTORE:FREED",
            Self::ForeignMark { .. } => "FRAME:RESTORE:FOREIGN",
            Self::DuplicateId { .. } => "FRAME:REGISTRY:DUPLICATE",
            Self::UnknownId { .. } => "FRAME:REGISTRY:UNKNOWN",
            Self::EmptyId => "FRAME:REGISTRY:EMPTY_ID",
            Self::NoDiagnostics => "FRAME:DIAG:EMPTY",
        }
    }

    // ============================================================================
    // Convenience Constructors - Allocator Errors
    // ============================================================================

    /// Create stack exhausted error
    pub fn stack_exhausted(requested: usize, available: usize) -> Self {
        #[cfg(feature = "logging")]
        warn!(
            "stack full: allocation of {} bytes failed ({} bytes free)",
            requested, available
        );

        Self::StackExhausted {
            requested,
            available,
        }
    }

    /// Create size overflow error
    pub fn size_overflow(size: usize) -> Self {
        #[cfg(feature = "logging")]
        error!("size overflow computing block footprint for {} bytes", size);

        Self::SizeOverflow { size }
    }

    /// Create capacity too small error
    #[must_use]
    pub fn capacity_too_small(capacity: usize, min: usize) -> Self {
        Self::CapacityTooSmall { capacity, min }
    }

    /// Create free-without-block error
    pub fn no_active_block() -> Self {
        #[cfg(feature = "logging")]
        error!("free failed: no block is currently allocated");

        Self::NoActiveBlock
    }

    // --- Frame Errors ---

    /// Create frame already freed error
    pub fn frame_already_freed(mark: usize, top: usize) -> Self {
        #[cfg(feature = "logging")]
        error!(
            "frame already freed: mark at offset {} is above the stack top {}",
            mark, top
        );

        Self::FrameAlreadyFreed { mark, top }
    }

    /// Create foreign mark error
    pub fn foreign_mark(mark: usize) -> Self {
        #[cfg(feature = "logging")]
        error!("frame mark at offset {} does not belong to this allocator", mark);

        Self::ForeignMark { mark }
    }

    // --- Registry Errors ---

    /// Create duplicate id error
    pub fn duplicate_id(id: &str) -> Self {
        #[cfg(feature = "logging")]
        warn!("allocator id '{}' is already registered", id);

        Self::DuplicateId { id: id.to_string() }
    }

    /// Create unknown id error
    pub fn unknown_id(id: &str) -> Self {
        #[cfg(feature = "logging")]
        warn!("allocator id '{}' is not registered", id);

        Self::UnknownId { id: id.to_string() }
    }

    /// Create empty id error
    #[must_use]
    pub fn empty_id() -> Self {
        Self::EmptyId
    }
}

// ============================================================================
// Result Types
// ============================================================================

/// Result type for allocator and registry operations
pub type FrameResult<T> = core::result::Result<T, FrameError>;

/// Generic result type alias
pub type Result<T> = FrameResult<T>;

// ============================================================================
// Tests
// ============================================================================
