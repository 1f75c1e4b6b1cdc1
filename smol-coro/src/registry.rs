// Registry of routine borrows, swept once per pass.
//
// The registry owns nothing: entries are shared borrows of routines the
// embedding application keeps alive, so a routine cannot drop while
// registered (the borrow checker refuses). Entry storage only ever
// grows; removals keep the capacity for later re-registration.
//
// Single control thread. A worker must not add to, remove from, or
// sweep the registry that is currently sweeping it; sweep holds the
// registry exclusively, so the borrow checker refuses that too.

use alloc::vec::Vec;
use core::ptr;

use crate::clock::Clock;
use crate::routine::Resumable;

/// Holds shared borrows of routines. The registry's lifetime is tied
/// to theirs, so dropping a routine while it is still registered does
/// not compile:
///
/// ```compile_fail
/// use smol_coro::{Control, Registry, Routine, Worker};
///
/// struct Nop;
/// impl Worker for Nop {
///     fn work(&mut self) -> Control {
///         Control::Suspend
///     }
/// }
///
/// let mut registry = Registry::new();
/// {
///     let short_lived = Routine::new(Nop);
///     registry.add(&short_lived);
/// } // still registered here: rejected
/// registry.len();
/// ```
pub struct Registry<'a> {
    entries: Vec<&'a dyn Resumable>,
}

impl<'a> Registry<'a> {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Register a routine. Not deduplicated: adding the same routine
    /// twice makes it run twice per sweep.
    pub fn add(&mut self, routine: &'a dyn Resumable) {
        self.entries.push(routine);
    }

    /// Drop one occurrence of `routine`, the most recently added when
    /// it was registered more than once. No-op when it is not
    /// registered. Entries are matched by address, never by contents.
    pub fn remove(&mut self, routine: &dyn Resumable) {
        let target = routine as *const dyn Resumable;
        if let Some(i) = self
            .entries
            .iter()
            .rposition(|r| ptr::addr_eq(*r as *const dyn Resumable, target))
        {
            self.entries.remove(i);
        }
    }

    /// Give every registered routine one chance to run, in
    /// registration order. The clock is read once, so all routines see
    /// the same due check.
    ///
    /// With `prune_suspended`, every entry suspended by the end of the
    /// pass is dropped from the registry, first-registered included.
    /// The routines themselves are untouched; a caller holding its own
    /// borrow can `awake()` and re-`add` later. Without the flag the
    /// sweep does no dormancy bookkeeping at all.
    pub fn sweep(&mut self, clock: &dyn Clock, prune_suspended: bool) {
        let now = clock.now();
        for routine in &self.entries {
            routine.resume_at(now, clock);
        }

        if prune_suspended && !self.entries.is_empty() {
            let before = self.entries.len();
            self.entries.retain(|r| !r.is_suspended());
            let pruned = before - self.entries.len();
            if pruned > 0 {
                log::debug!("pruned {} suspended routine(s)", pruned);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.capacity()
    }

    /// Unregister everything. Keeps the capacity.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for Registry<'_> {
    fn default() -> Self {
        Self::new()
    }
}
