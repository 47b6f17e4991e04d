//! RAII-based frame guard for automatic restoration

use core::ops::{Deref, DerefMut};

use super::{FrameAllocator, FrameMark};

/// RAII helper for frame-scoped allocation
///
/// Captures a mark when created and restores the allocator to it when
/// dropped. Frame semantics apply: the restore also releases the block that
/// was active when the scope was opened, so the usual pattern is to open the
/// scope while the allocator is empty or right after allocating the block
/// that should bound the scope's lifetime.
pub struct FrameScope<'a> {
    allocator: &'a mut FrameAllocator,
    mark: FrameMark,
}

impl<'a> FrameScope<'a> {
    /// Opens a scope that restores to the current frame position on drop
    pub fn new(allocator: &'a mut FrameAllocator) -> Self {
        let mark = allocator.mark();
        Self { allocator, mark }
    }

    /// The mark this scope restores to
    pub fn mark(&self) -> FrameMark {
        self.mark
    }

    /// Manually restore and consume this scope
    pub fn restore(self) {
        // Drop will handle the restoration
        drop(self);
    }
}

impl Drop for FrameScope<'_> {
    fn drop(&mut self) {
        let _ = self.allocator.restore(self.mark);
    }
}

impl Deref for FrameScope<'_> {
    type Target = FrameAllocator;

    fn deref(&self) -> &FrameAllocator {
        self.allocator
    }
}

impl DerefMut for FrameScope<'_> {
    fn deref_mut(&mut self) -> &mut FrameAllocator {
        self.allocator
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_restores_on_drop() {
        let mut allocator = FrameAllocator::new(1024).unwrap();
        let used = allocator.used();

        {
            let mut scope = FrameScope::new(&mut allocator);
            scope.allocate_block(64).unwrap();
            scope.allocate_block(128).unwrap();
            assert!(!scope.is_empty());
        }

        assert_eq!(allocator.used(), used);
        assert!(allocator.is_empty());
    }

    #[test]
    fn test_scope_releases_capture_time_block() {
        let mut allocator = FrameAllocator::new(1024).unwrap();
        allocator.allocate_block(32).unwrap();

        {
            let mut scope = FrameScope::new(&mut allocator);
            scope.allocate_block(64).unwrap();
            scope.restore();
        }

        // The 32-byte block was active at capture time, so it went too.
        assert!(allocator.is_empty());
    }

    #[test]
    fn test_empty_scope_drop_leaves_no_diagnostics() {
        let mut allocator = FrameAllocator::new(256).unwrap();
        {
            let _scope = FrameScope::new(&mut allocator);
        }
        assert!(allocator.error_log().is_empty());
    }
}
