//! Named allocator registry
//!
//! Provides an owning lookup table from string identifiers to
//! [`FrameAllocator`] instances, so independent subsystems can each request
//! an isolated allocator by name without sharing state directly. The
//! registry never inspects an allocator beyond owning its lifetime.
//!
//! A process-wide singleton is available through [`GlobalRegistry`]: lazily
//! created on first use, torn down (allocators included) by
//! [`GlobalRegistry::cleanup_instance`], and recreated fresh on the next use.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use parking_lot::Mutex;

use super::MemoryUsage;
use super::frame::{FrameAllocator, FrameConfig};
use crate::diagnostics::ErrorLog;
use crate::error::{FrameError, FrameResult};

/// Owning collection of named frame allocators
///
/// Identifiers are arbitrary non-empty strings compared by exact equality
/// and unique within one registry. Removing an entry drops the allocator,
/// which releases its buffer with it; borrows handed out by
/// [`get_allocator`](Self::get_allocator) are tied to the registry borrow,
/// so they cannot outlive a later cleanup.
pub struct AllocatorRegistry {
    allocators: HashMap<String, FrameAllocator>,
    log: ErrorLog,
}

impl Default for AllocatorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl AllocatorRegistry {
    /// Creates an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            allocators: HashMap::new(),
            log: ErrorLog::new(),
        }
    }

    /// Creates a frame allocator under `id` with default configuration
    ///
    /// Fails with [`FrameError::DuplicateId`] if the id is taken (existing
    /// entries are never overwritten) and [`FrameError::EmptyId`] for empty
    /// identifiers; construction failures propagate unchanged.
    pub fn create_allocator(&mut self, id: &str, capacity: usize) -> FrameResult<()> {
        self.create_allocator_with_config(id, capacity, FrameConfig::default())
    }

    /// Creates a frame allocator under `id` with custom configuration
    pub fn create_allocator_with_config(
        &mut self,
        id: &str,
        capacity: usize,
        config: FrameConfig,
    ) -> FrameResult<()> {
        if id.is_empty() {
            return self.fail(FrameError::empty_id());
        }
        if self.allocators.contains_key(id) {
            return self.fail(FrameError::duplicate_id(id));
        }

        match FrameAllocator::with_config(capacity, config) {
            Ok(allocator) => {
                self.allocators.insert(id.to_owned(), allocator);
                Ok(())
            }
            Err(err) => self.fail(err),
        }
    }

    /// Borrows the allocator registered under `id`
    ///
    /// The registry retains ownership; the borrow ends with the registry
    /// borrow. Fails with [`FrameError::UnknownId`] for absent ids.
    pub fn get_allocator(&mut self, id: &str) -> FrameResult<&mut FrameAllocator> {
        match self.allocators.entry(id.to_owned()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let err = FrameError::unknown_id(entry.key());
                self.log.push(err.to_string());
                Err(err)
            }
        }
    }

    /// Destroys the allocator registered under `id` and removes the entry
    ///
    /// Fails with [`FrameError::UnknownId`] for absent ids.
    pub fn cleanup_allocator(&mut self, id: &str) -> FrameResult<()> {
        match self.allocators.remove(id) {
            Some(allocator) => {
                // Removal and release are one operation: the entry owned the
                // allocator, so dropping it frees the buffer here and now.
                drop(allocator);
                Ok(())
            }
            None => self.fail(FrameError::unknown_id(id)),
        }
    }

    /// Destroys every owned allocator and clears the table
    pub fn clear(&mut self) {
        self.allocators.clear();
    }

    /// True if `id` is registered
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.allocators.contains_key(id)
    }

    /// Number of registered allocators
    #[must_use]
    pub fn len(&self) -> usize {
        self.allocators.len()
    }

    /// True if no allocators are registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.allocators.is_empty()
    }

    /// Lists the registered identifiers
    pub fn ids(&self) -> Vec<&str> {
        self.allocators.keys().map(String::as_str).collect()
    }

    /// Bytes in use across every registered allocator
    pub fn total_used(&self) -> usize {
        self.allocators.values().map(MemoryUsage::used_memory).sum()
    }

    /// Combined capacity of every registered allocator
    pub fn total_capacity(&self) -> usize {
        self.allocators.values().map(FrameAllocator::capacity).sum()
    }

    /// Pops the most recent registry-level diagnostic message
    ///
    /// Fails with [`FrameError::NoDiagnostics`] when no failure message is
    /// pending. The registry log only records registry-level failures
    /// (duplicate or missing ids, construction errors); allocator-level
    /// failures live in each allocator's own log.
    pub fn take_error(&mut self) -> FrameResult<String> {
        self.log.pop().ok_or(FrameError::NoDiagnostics)
    }

    /// Read access to the registry diagnostic log
    pub fn error_log(&self) -> &ErrorLog {
        &self.log
    }

    fn fail<T>(&mut self, err: FrameError) -> FrameResult<T> {
        self.log.push(err.to_string());
        Err(err)
    }
}

/// Global registry cell; `None` until first use and after teardown
static GLOBAL_REGISTRY: Mutex<Option<AllocatorRegistry>> = Mutex::new(None);

/// Process-wide registry singleton
///
/// The singleton is created lazily on the first [`with`](Self::with) call.
/// The cell is locked for the duration of each access, which keeps the
/// lazy-init/teardown pair sound — the registry and its allocators remain
/// single-threaded and callers must still serialize their usage. Do not
/// nest `with` calls; the inner call would deadlock on the cell.
pub struct GlobalRegistry;

impl GlobalRegistry {
    /// Runs `f` with exclusive access to the global registry, creating it
    /// first if needed
    pub fn with<F, R>(f: F) -> R
    where
        F: FnOnce(&mut AllocatorRegistry) -> R,
    {
        let mut cell = GLOBAL_REGISTRY.lock();
        f(cell.get_or_insert_with(AllocatorRegistry::new))
    }

    /// True if the singleton currently exists
    #[must_use]
    pub fn is_active() -> bool {
        GLOBAL_REGISTRY.lock().is_some()
    }

    /// Destroys every owned allocator and releases the singleton
    ///
    /// The next [`with`](Self::with) call recreates a fresh registry.
    pub fn cleanup_instance() {
        // Dropping the registry drops every owned allocator with it.
        drop(GLOBAL_REGISTRY.lock().take());
    }
}

/// Convenience macro for global registry access
///
/// ```
/// framestack::with_registry!(|registry| {
///     registry.create_allocator("render-scratch", 16 * 1024)
/// })
/// .unwrap();
/// # framestack::GlobalRegistry::cleanup_instance();
/// ```
#[macro_export]
macro_rules! with_registry {
    (|$registry:ident| $body:expr) => {
        $crate::allocator::GlobalRegistry::with(|$registry| $body)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_get_cleanup_roundtrip() {
        let mut registry = AllocatorRegistry::new();
        registry.create_allocator("scratch", 4096).unwrap();
        assert!(registry.contains("scratch"));
        assert_eq!(registry.len(), 1);

        let allocator = registry.get_allocator("scratch").unwrap();
        allocator.allocate_block(128).unwrap();

        registry.cleanup_allocator("scratch").unwrap();
        assert!(registry.is_empty());
        assert!(matches!(
            registry.get_allocator("scratch"),
            Err(FrameError::UnknownId { .. })
        ));
    }

    #[test]
    fn test_duplicate_id_rejected_without_overwrite() {
        let mut registry = AllocatorRegistry::new();
        registry.create_allocator("frame", 1024).unwrap();

        // The original allocator must survive the rejected second create.
        registry
            .get_allocator("frame")
            .unwrap()
            .allocate_block(100)
            .unwrap();

        assert!(matches!(
            registry.create_allocator("frame", 2048),
            Err(FrameError::DuplicateId { .. })
        ));

        let survivor = registry.get_allocator("frame").unwrap();
        assert_eq!(survivor.capacity(), 1024);
        assert!(!survivor.is_empty());
    }

    #[test]
    fn test_missing_id_fails() {
        let mut registry = AllocatorRegistry::new();
        assert!(matches!(
            registry.get_allocator("missing"),
            Err(FrameError::UnknownId { .. })
        ));
        assert!(matches!(
            registry.cleanup_allocator("missing"),
            Err(FrameError::UnknownId { .. })
        ));
    }

    #[test]
    fn test_empty_id_rejected() {
        let mut registry = AllocatorRegistry::new();
        assert!(matches!(
            registry.create_allocator("", 1024),
            Err(FrameError::EmptyId)
        ));
    }

    #[test]
    fn test_construction_failure_propagates_and_is_logged() {
        let mut registry = AllocatorRegistry::new();
        let result = registry.create_allocator("tiny", 2);
        assert!(matches!(result, Err(FrameError::CapacityTooSmall { .. })));
        assert!(!registry.contains("tiny"));

        let message = registry.take_error().unwrap();
        assert!(message.contains("cannot hold a block header"));
    }

    #[test]
    fn test_registry_log_is_scoped_to_registry_failures() {
        let mut registry = AllocatorRegistry::new();
        registry.create_allocator("a", 64).unwrap();

        // Allocator-level failure lands in the allocator's log only.
        assert!(registry.get_allocator("a").unwrap().allocate_block(1024).is_err());
        assert!(registry.error_log().is_empty());
        assert!(!registry.get_allocator("a").unwrap().error_log().is_empty());

        // Registry-level failure lands in the registry log only.
        assert!(registry.get_allocator("b").is_err());
        assert_eq!(registry.error_log().len(), 1);
        let message = registry.take_error().unwrap();
        assert!(message.contains('b'));
        assert!(matches!(
            registry.take_error(),
            Err(FrameError::NoDiagnostics)
        ));
    }

    #[test]
    fn test_usage_aggregation() {
        let mut registry = AllocatorRegistry::new();
        registry.create_allocator("a", 1024).unwrap();
        registry.create_allocator("b", 2048).unwrap();
        registry.get_allocator("a").unwrap().allocate_block(100).unwrap();

        assert_eq!(registry.total_capacity(), 3072);
        let expected = registry.get_allocator("a").unwrap().used()
            + registry.get_allocator("b").unwrap().used();
        assert_eq!(registry.total_used(), expected);

        let mut ids = registry.ids();
        ids.sort_unstable();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_clear_drops_all_allocators() {
        let mut registry = AllocatorRegistry::new();
        registry.create_allocator("a", 1024).unwrap();
        registry.create_allocator("b", 1024).unwrap();

        registry.clear();
        assert!(registry.is_empty());
        assert_eq!(registry.total_capacity(), 0);
    }

    // The one test touching process-global state; keeping the whole
    // lifecycle (macro included) in a single test avoids interference
    // between parallel test threads.
    #[test]
    fn test_global_registry_lifecycle() {
        GlobalRegistry::cleanup_instance();

        crate::with_registry!(|registry| registry.create_allocator("global-scratch", 8192))
            .unwrap();
        assert!(GlobalRegistry::is_active());

        let used = GlobalRegistry::with(|registry| {
            let allocator = registry.get_allocator("global-scratch")?;
            allocator.allocate_block(256)?;
            Ok::<usize, FrameError>(allocator.used())
        })
        .unwrap();
        assert!(used > 256);

        GlobalRegistry::cleanup_instance();
        assert!(!GlobalRegistry::is_active());

        // A fresh singleton knows nothing about the old entries.
        let stale = GlobalRegistry::with(|registry| registry.get_allocator("global-scratch").err());
        assert!(matches!(stale, Some(FrameError::UnknownId { .. })));
        GlobalRegistry::cleanup_instance();
    }
}
