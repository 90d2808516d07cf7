//! Partition checks for proposed boundaries.

use crate::errors::{AssessmentError, Result};
use crate::graph::{DependencyGraph, NodeId};
use std::collections::{BTreeMap, BTreeSet};

/// Check that `clusters` cover every node of `graph` exactly once and name
/// no unknown units.
///
/// The error message lists every offending id so the failure can be
/// reproduced.
pub fn validate_partition(graph: &DependencyGraph, clusters: &[BTreeSet<NodeId>]) -> Result<()> {
    let mut seen: BTreeMap<&str, usize> = BTreeMap::new();
    for members in clusters {
        for id in members {
            *seen.entry(id.as_str()).or_insert(0) += 1;
        }
    }

    let missing: Vec<&str> = graph
        .node_ids()
        .filter(|id| !seen.contains_key(id))
        .collect();
    let duplicated: Vec<&str> = seen
        .iter()
        .filter(|(_, &count)| count > 1)
        .map(|(id, _)| *id)
        .collect();
    let unknown: Vec<&str> = seen
        .keys()
        .copied()
        .filter(|id| graph.node(id).is_none())
        .collect();
    let empty = clusters.iter().filter(|members| members.is_empty()).count();

    let mut problems = Vec::new();
    if !missing.is_empty() {
        problems.push(format!("unassigned nodes [{}]", missing.join(", ")));
    }
    if !duplicated.is_empty() {
        problems.push(format!("nodes in several clusters [{}]", duplicated.join(", ")));
    }
    if !unknown.is_empty() {
        problems.push(format!("unknown nodes [{}]", unknown.join(", ")));
    }
    if empty > 0 {
        problems.push(format!("{empty} empty clusters"));
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(AssessmentError::PartitionInvariant(problems.join("; ")))
    }
}
