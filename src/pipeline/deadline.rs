//! Wall-clock budget for one assessment run.

use crate::errors::{AssessmentError, BudgetKind, Result};
use crate::observability::AnalysisPhase;
use std::time::{Duration, Instant};

/// Deadline started when a run begins.
///
/// Checked between stages, once per ingestion batch, and between Louvain
/// passes and levels while clustering. There is no other cancellation point.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    started: Instant,
    limit: Duration,
}

impl Deadline {
    pub fn start(limit: Duration) -> Self {
        Self {
            started: Instant::now(),
            limit,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }

    /// Fail with `BudgetExceeded` once the limit has been reached.
    pub fn check(&self, phase: AnalysisPhase) -> Result<()> {
        let elapsed = self.elapsed();
        if elapsed >= self.limit {
            return Err(AssessmentError::BudgetExceeded {
                kind: BudgetKind::Deadline,
                phase,
                reason: format!(
                    "run deadline of {}ms passed after {}ms",
                    self.limit.as_millis(),
                    elapsed.as_millis()
                ),
            });
        }
        Ok(())
    }
}
