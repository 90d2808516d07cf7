//! Fact ingestion: validation, deduplication and budget enforcement.
//!
//! Batches are independent, so validation fans out across rayon workers.
//! The merge that deduplicates and orders the accepted facts is a single
//! sequential pass, keeping the output independent of thread scheduling.

use super::{Fact, FactBatch, RawEntry};
use crate::config::RunBudget;
use crate::errors::{AssessmentError, BudgetKind, ErrorCode, Result};
use crate::observability::AnalysisPhase;
use crate::pipeline::Deadline;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, warn};

/// A fact dropped during ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFact {
    pub batch: String,
    pub index: usize,
    pub code: String,
    pub reason: String,
}

impl SkippedFact {
    fn from_error(error: &AssessmentError) -> Option<Self> {
        match error {
            AssessmentError::MalformedFact {
                code,
                batch,
                index,
                reason,
            } => Some(Self {
                batch: batch.clone(),
                index: *index,
                code: code.to_string(),
                reason: reason.clone(),
            }),
            _ => None,
        }
    }
}

/// Counters describing what ingestion did with its input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestionSummary {
    pub batches: usize,
    pub received: usize,
    pub accepted: usize,
    pub duplicates: usize,
    pub skipped: Vec<SkippedFact>,
}

impl IngestionSummary {
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

/// Deduplicated facts in first-seen order, plus the ingestion summary.
#[derive(Debug, Clone)]
pub struct IngestedFacts {
    pub facts: Vec<Fact>,
    pub summary: IngestionSummary,
}

struct ValidatedBatch {
    facts: Vec<Fact>,
    skipped: Vec<SkippedFact>,
}

/// Validate, normalize and deduplicate the incoming batches.
///
/// Malformed facts are logged and skipped. The fact-count budget is checked
/// against the raw input before any work, the deadline once per batch.
pub fn ingest(batches: &[FactBatch], budget: &RunBudget, deadline: &Deadline) -> Result<IngestedFacts> {
    let received: usize = batches.iter().map(FactBatch::len).sum();
    if received > budget.max_facts {
        return Err(AssessmentError::BudgetExceeded {
            kind: BudgetKind::FactCount,
            phase: AnalysisPhase::Ingestion,
            reason: format!(
                "received {received} facts, limit is {} (budget.max_facts)",
                budget.max_facts
            ),
        });
    }

    let validated = batches
        .par_iter()
        .map(|batch| {
            deadline.check(AnalysisPhase::Ingestion)?;
            Ok(validate_batch(batch))
        })
        .collect::<Result<Vec<_>>>()?;

    let ingested = merge_batches(validated, batches.len(), received);
    debug!(
        received = ingested.summary.received,
        accepted = ingested.summary.accepted,
        duplicates = ingested.summary.duplicates,
        skipped = ingested.summary.skipped_count(),
        "Ingestion complete"
    );
    Ok(ingested)
}

fn validate_batch(batch: &FactBatch) -> ValidatedBatch {
    let mut facts = Vec::with_capacity(batch.len());
    let mut skipped = Vec::new();

    for (index, entry) in batch.entries.iter().enumerate() {
        let result = match entry {
            RawEntry::Fact(raw) => Fact::from_raw(raw, &batch.name, index),
            RawEntry::Unparsable(error) => Err(AssessmentError::malformed(
                ErrorCode::FACT_UNPARSABLE,
                &batch.name,
                index,
                format!("record is not a fact: {error}"),
            )),
        };

        match result {
            Ok(fact) => facts.push(fact),
            Err(error) => {
                warn!("Skipping fact: {error}");
                skipped.extend(SkippedFact::from_error(&error));
            }
        }
    }

    ValidatedBatch { facts, skipped }
}

// Sole writer of the canonical fact list
fn merge_batches(validated: Vec<ValidatedBatch>, batch_count: usize, received: usize) -> IngestedFacts {
    let mut seen = HashSet::new();
    let mut facts = Vec::new();
    let mut skipped = Vec::new();
    let mut duplicates = 0;

    for batch in validated {
        for fact in batch.facts {
            if seen.contains(&fact) {
                duplicates += 1;
            } else {
                seen.insert(fact.clone());
                facts.push(fact);
            }
        }
        skipped.extend(batch.skipped);
    }

    IngestedFacts {
        summary: IngestionSummary {
            batches: batch_count,
            received,
            accepted: facts.len(),
            duplicates,
            skipped,
        },
        facts,
    }
}
