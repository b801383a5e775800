//! Deadlock detection over a wait-for graph snapshot.
//!
//! A depth-first walk tracks three states per task: unvisited, on the
//! current path (with its position in it), and fully explored. Reaching a
//! task that is on the current path closes a cycle, and the sub-path from
//! its position to the frontier becomes a [`DeadlockCycle`] candidate;
//! fully-explored tasks are pruned. Candidates are deduplicated with the
//! cycle's rotation-invariant equality, since the same cycle is reachable
//! from several roots and entry points.

use std::collections::BTreeMap;
use std::fmt;

use tracing::{debug, trace};

use crate::WaitForGraph;
use crate::cycle::DeadlockCycle;

// ── Analysis result ─────────────────────────────────────────────

/// Everything one detection pass found over a snapshot. Immutable and
/// safe to share across threads.
#[derive(Debug, Clone)]
pub struct DeadlockAnalysis<T> {
    cycles: Vec<DeadlockCycle<T>>,
}

impl<T: Ord + Clone> DeadlockAnalysis<T> {
    /// True when at least one wait-for cycle exists.
    pub fn has_deadlock(&self) -> bool {
        !self.cycles.is_empty()
    }

    /// The distinct cycles, in discovery order.
    pub fn cycles(&self) -> &[DeadlockCycle<T>] {
        &self.cycles
    }

    /// Whether `id` sits on a detected cycle. A task on a chain INTO a
    /// cycle waits forever too, but is not itself part of the deadlock.
    pub fn is_deadlocked(&self, id: &T) -> bool {
        self.cycles.iter().any(|c| c.contains(id))
    }

    pub fn into_cycles(self) -> Vec<DeadlockCycle<T>> {
        self.cycles
    }
}

impl<T: fmt::Display> fmt::Display for DeadlockAnalysis<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.cycles.is_empty() {
            return write!(f, "no deadlock");
        }
        for (i, cycle) in self.cycles.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "deadlock: {cycle}")?;
        }
        Ok(())
    }
}

// ── Depth-first walk ────────────────────────────────────────────

/// Where a task stands in the walk; unvisited tasks are absent from the
/// state map.
enum Visit {
    /// On the current path, at this position in it.
    OnPath(usize),
    /// All outgoing edges explored; no undiscovered cycle runs through it.
    Done,
}

/// Finds every distinct wait-for cycle in `graph`.
///
/// Read-only: the graph is borrowed and never mutated. Roots are taken in
/// id order, so results are deterministic for a given snapshot. An empty
/// cycle set means no deadlock.
pub fn analyze<T: Ord + Clone>(graph: &WaitForGraph<T>) -> DeadlockAnalysis<T> {
    let mut state: BTreeMap<&T, Visit> = BTreeMap::new();
    let mut path: Vec<&T> = Vec::new();
    let mut candidates: Vec<DeadlockCycle<T>> = Vec::new();

    for task in graph.tasks() {
        if !state.contains_key(task.id()) {
            walk(graph, task.id(), &mut state, &mut path, &mut candidates);
        }
    }

    let mut cycles: Vec<DeadlockCycle<T>> = Vec::new();
    for candidate in candidates {
        if !cycles.contains(&candidate) {
            cycles.push(candidate);
        }
    }

    debug!(
        tasks = graph.task_count(),
        edges = graph.edge_count(),
        cycles = cycles.len(),
        "wait-for analysis complete"
    );

    DeadlockAnalysis { cycles }
}

fn walk<'g, T: Ord + Clone>(
    graph: &'g WaitForGraph<T>,
    id: &'g T,
    state: &mut BTreeMap<&'g T, Visit>,
    path: &mut Vec<&'g T>,
    candidates: &mut Vec<DeadlockCycle<T>>,
) {
    state.insert(id, Visit::OnPath(path.len()));
    path.push(id);

    if let Some(task) = graph.task(id) {
        for next in task.waits_for() {
            match state.get(next) {
                None => walk(graph, next, state, path, candidates),
                Some(Visit::OnPath(entry)) => {
                    // The sub-path from the re-entered task to the frontier
                    // is a cycle. A self-wait lands here with a sub-path of
                    // one.
                    let tasks: Vec<T> = path[*entry..].iter().map(|&t| t.clone()).collect();
                    trace!(len = tasks.len(), "cycle candidate");
                    candidates.push(DeadlockCycle::from_traversal(tasks));
                }
                Some(Visit::Done) => {}
            }
        }
    }

    path.pop();
    state.insert(id, Visit::Done);
}

// ── Tests ───────────────────────────────────────────────────────
