use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Per-run resource limits. Exceeding either aborts the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunBudget {
    /// Maximum raw facts accepted for one run
    #[serde(default = "default_max_facts")]
    pub max_facts: usize,

    /// Wall-clock deadline for the whole run, in milliseconds
    #[serde(default = "default_deadline_ms")]
    pub deadline_ms: u64,
}

impl Default for RunBudget {
    fn default() -> Self {
        Self {
            max_facts: default_max_facts(),
            deadline_ms: default_deadline_ms(),
        }
    }
}

impl RunBudget {
    pub fn deadline(&self) -> Duration {
        Duration::from_millis(self.deadline_ms)
    }

    pub fn validate(&self) -> Vec<String> {
        if self.max_facts == 0 {
            vec!["budget.max_facts must be >= 1".to_string()]
        } else {
            Vec::new()
        }
    }
}

fn default_max_facts() -> usize {
    1_000_000
}
fn default_deadline_ms() -> u64 {
    300_000
}
