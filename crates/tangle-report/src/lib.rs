//! Serializable summaries of a deadlock analysis.
//!
//! The core model is generic over the task id type; a report flattens one
//! analysis pass into rendered strings so a host can ship the result into
//! logs, over a wire, or onto a dashboard without the id type coming
//! along.

use std::fmt;

use compact_str::{CompactString, ToCompactString};
use facet::Facet;

use tangle::{DeadlockAnalysis, WaitForGraph};

// ── Report types ────────────────────────────────────────────────

/// One cycle, as individually rendered task ids plus a single
/// `A -> B -> C` line.
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct CycleSummary {
    pub tasks: Vec<CompactString>,
    pub rendered: CompactString,
}

/// Snapshot-level summary of one analysis pass.
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct AnalysisReport {
    pub task_count: u64,
    pub edge_count: u64,
    pub deadlocked: bool,
    pub cycles: Vec<CycleSummary>,
}

/// Flattens `analysis` (computed over `graph`) into a report.
pub fn summarize<T>(graph: &WaitForGraph<T>, analysis: &DeadlockAnalysis<T>) -> AnalysisReport
where
    T: Ord + Clone + fmt::Display,
{
    let cycles = analysis
        .cycles()
        .iter()
        .map(|cycle| CycleSummary {
            tasks: cycle
                .involved_tasks()
                .iter()
                .map(|t| t.to_compact_string())
                .collect(),
            rendered: cycle.to_compact_string(),
        })
        .collect();

    AnalysisReport {
        task_count: graph.task_count() as u64,
        edge_count: graph.edge_count() as u64,
        deadlocked: analysis.has_deadlock(),
        cycles,
    }
}

// ── JSON encoding ───────────────────────────────────────────────

#[derive(Debug)]
pub enum ReportError {
    Json(String),
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ReportError {}

pub fn encode_report(report: &AnalysisReport) -> Result<String, ReportError> {
    facet_json::to_string(report).map_err(|e| ReportError::Json(e.to_string()))
}

pub fn decode_report(payload: &[u8]) -> Result<AnalysisReport, ReportError> {
    facet_json::from_slice(payload).map_err(|e| ReportError::Json(e.to_string()))
}

// ── Tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn deadlocked_graph() -> WaitForGraph<&'static str> {
        let mut graph = WaitForGraph::new();
        graph.add_task("alpha");
        graph.add_task("beta");
        graph.add_task("gamma");
        graph.add_wait_for("alpha", "beta").unwrap();
        graph.add_wait_for("beta", "alpha").unwrap();
        graph.add_wait_for("gamma", "alpha").unwrap();
        graph
    }

    #[test]
    fn summarize_counts_and_renders() {
        let graph = deadlocked_graph();
        let analysis = tangle::analyze(&graph);
        let report = summarize(&graph, &analysis);

        assert_eq!(report.task_count, 3);
        assert_eq!(report.edge_count, 3);
        assert!(report.deadlocked);
        assert_eq!(report.cycles.len(), 1);
        assert_eq!(report.cycles[0].rendered, "alpha -> beta");
        assert_eq!(report.cycles[0].tasks, vec!["alpha", "beta"]);
    }

    #[test]
    fn quiet_graphs_summarize_as_clean() {
        let mut graph = WaitForGraph::new();
        graph.add_task("solo");
        let analysis = tangle::analyze(&graph);
        let report = summarize(&graph, &analysis);

        assert!(!report.deadlocked);
        assert!(report.cycles.is_empty());
        assert_eq!(report.task_count, 1);
        assert_eq!(report.edge_count, 0);
    }

    #[test]
    fn reports_survive_the_wire() {
        let graph = deadlocked_graph();
        let analysis = tangle::analyze(&graph);
        let report = summarize(&graph, &analysis);

        let json = encode_report(&report).unwrap();
        let decoded = decode_report(json.as_bytes()).unwrap();
        assert_eq!(decoded, report);
    }
}
