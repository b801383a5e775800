//! Thread-safe incremental assembly of wait-for graphs.
//!
//! Hosts whose task states change on several threads funnel updates
//! through a [`GraphBuilder`] and pull consistent snapshots for analysis,
//! instead of guarding a [`WaitForGraph`] themselves.

use parking_lot::Mutex;

use crate::{GraphError, Task, WaitForGraph};

/// Shared-mutability wrapper around a [`WaitForGraph`].
///
/// Unlike [`WaitForGraph::add_wait_for`], the builder's
/// [`add_wait_for`](GraphBuilder::add_wait_for) registers both endpoints
/// before linking them, so feeding it a raw stream of observed wait events
/// needs no separate registration pass.
pub struct GraphBuilder<T> {
    graph: Mutex<WaitForGraph<T>>,
}

impl<T: Ord + Clone> GraphBuilder<T> {
    pub fn new() -> Self {
        Self {
            graph: Mutex::new(WaitForGraph::new()),
        }
    }

    /// Registers a task; idempotent. Returns whether it was new.
    pub fn add_task(&self, id: T) -> bool {
        self.graph.lock().add_task(id)
    }

    pub fn add_tasks(&self, ids: impl IntoIterator<Item = T>) {
        let mut graph = self.graph.lock();
        for id in ids {
            graph.add_task(id);
        }
    }

    /// Records that `from` waits for `to`, registering either endpoint if
    /// it was not yet known. Returns whether the edge was new.
    pub fn add_wait_for(&self, from: T, to: T) -> bool {
        let mut graph = self.graph.lock();
        graph.add_task(from.clone());
        graph.add_task(to.clone());
        // Both endpoints exist now, so the link cannot fail.
        graph.add_wait_for(from, to).unwrap_or(false)
    }

    pub fn remove_task(&self, id: &T) -> Result<Task<T>, GraphError<T>> {
        self.graph.lock().remove_task(id)
    }

    pub fn remove_wait_for(&self, from: &T, to: &T) -> bool {
        self.graph.lock().remove_wait_for(from, to)
    }

    pub fn has_task(&self, id: &T) -> bool {
        self.graph.lock().has_task(id)
    }

    /// A consistent snapshot of everything recorded so far. The builder
    /// keeps accumulating; call again for a fresher view.
    pub fn build(&self) -> WaitForGraph<T> {
        self.graph.lock().snapshot()
    }
}

impl<T: Ord + Clone> Default for GraphBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tests ───────────────────────────────────────────────────────
