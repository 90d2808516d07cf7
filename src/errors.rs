//! Error taxonomy for assessment runs.
//!
//! Errors fall into two classes:
//!
//! - **Recoverable**: `MalformedFact`. The offending fact is skipped, the run
//!   continues, and the skip is surfaced in the ingestion summary of the
//!   result. `run_assessment` never returns this variant.
//! - **Fatal**: everything else. The run aborts and produces no result; the
//!   message carries enough detail to reproduce the failure.
//!
//! # Error Codes
//!
//! - E001-E009: fact ingestion
//! - E010-E019: run budget
//! - E020-E029: internal invariants
//! - E030-E039: empty input
//! - E040-E049: configuration
//! - E050-E059: I/O
//!
//! # Example
//!
//! ```rust
//! use splitmap::errors::{AssessmentError, ErrorCode};
//!
//! let err = AssessmentError::EmptyGraph { skipped: 3 };
//! assert!(err.is_fatal());
//! assert_eq!(err.code(), ErrorCode::EMPTY_GRAPH);
//! ```

use crate::observability::AnalysisPhase;
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Structured error code for documentation and programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ErrorCode(&'static str);

impl ErrorCode {
    /// Fact has an empty source unit
    pub const FACT_EMPTY_SOURCE: ErrorCode = ErrorCode("E001");
    /// Fact kind not recognized
    pub const FACT_UNKNOWN_KIND: ErrorCode = ErrorCode("E002");
    /// Fact is missing a field its kind requires
    pub const FACT_MISSING_FIELD: ErrorCode = ErrorCode("E003");
    /// Fact metadata value could not be interpreted
    pub const FACT_INVALID_METADATA: ErrorCode = ErrorCode("E004");
    /// Front-end record is not valid JSON
    pub const FACT_UNPARSABLE: ErrorCode = ErrorCode("E005");

    /// Raw fact count over the configured maximum
    pub const BUDGET_FACT_COUNT: ErrorCode = ErrorCode("E010");
    /// Run deadline passed
    pub const BUDGET_DEADLINE: ErrorCode = ErrorCode("E011");

    /// Boundary proposer produced a non-total or non-disjoint partition
    pub const PARTITION_INVARIANT: ErrorCode = ErrorCode("E020");

    /// Nothing was ingested
    pub const EMPTY_GRAPH: ErrorCode = ErrorCode("E030");

    /// Configuration value invalid
    pub const CONFIG_INVALID: ErrorCode = ErrorCode("E040");
    /// Configuration file unreadable or unparsable
    pub const CONFIG_FILE: ErrorCode = ErrorCode("E041");

    /// Generic I/O failure
    pub const IO_GENERIC: ErrorCode = ErrorCode("E050");

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

/// Which budget a run exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetKind {
    FactCount,
    Deadline,
}

/// Errors produced while assessing a codebase.
#[derive(Debug, Error)]
pub enum AssessmentError {
    /// A single fact failed validation. Recoverable.
    #[error("[{code}] malformed fact #{index} in batch '{batch}': {reason}")]
    MalformedFact {
        code: ErrorCode,
        batch: String,
        index: usize,
        reason: String,
    },

    /// The run exceeded its fact-count or time budget.
    #[error("[{}] budget exceeded during {phase}: {reason}", .kind.code())]
    BudgetExceeded {
        kind: BudgetKind,
        phase: AnalysisPhase,
        reason: String,
    },

    /// The proposed clusters do not partition the graph. Signals a bug.
    #[error("[E020] partition invariant violated: {0}")]
    PartitionInvariant(String),

    /// No facts survived ingestion.
    #[error("[E030] nothing to assess: no facts were ingested ({skipped} malformed facts skipped)")]
    EmptyGraph { skipped: usize },

    /// Invalid configuration, possibly listing several problems.
    #[error("[{code}] configuration error: {message}")]
    Config {
        code: ErrorCode,
        message: String,
        path: Option<PathBuf>,
    },

    /// I/O failure in the shell around the engine.
    #[error("[E050] I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BudgetKind {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::FactCount => ErrorCode::BUDGET_FACT_COUNT,
            Self::Deadline => ErrorCode::BUDGET_DEADLINE,
        }
    }
}

impl AssessmentError {
    /// Create a malformed-fact error.
    pub fn malformed(
        code: ErrorCode,
        batch: impl Into<String>,
        index: usize,
        reason: impl Into<String>,
    ) -> Self {
        Self::MalformedFact {
            code,
            batch: batch.into(),
            index,
            reason: reason.into(),
        }
    }

    /// Create an invalid-configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            code: ErrorCode::CONFIG_INVALID,
            message: message.into(),
            path: None,
        }
    }

    /// Create a configuration error tied to a file.
    pub fn config_file(message: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::Config {
            code: ErrorCode::CONFIG_FILE,
            message: message.into(),
            path: Some(path.into()),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Get the error code.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::MalformedFact { code, .. } => *code,
            Self::BudgetExceeded { kind, .. } => kind.code(),
            Self::PartitionInvariant(_) => ErrorCode::PARTITION_INVARIANT,
            Self::EmptyGraph { .. } => ErrorCode::EMPTY_GRAPH,
            Self::Config { code, .. } => *code,
            Self::Io { .. } => ErrorCode::IO_GENERIC,
        }
    }

    /// Whether this error aborts the run.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::MalformedFact { .. })
    }

    /// Phase the error arose in, when it is tied to one.
    #[must_use]
    pub fn phase(&self) -> Option<AnalysisPhase> {
        match self {
            Self::MalformedFact { .. } | Self::EmptyGraph { .. } => {
                Some(AnalysisPhase::Ingestion)
            }
            Self::BudgetExceeded { phase, .. } => Some(*phase),
            Self::PartitionInvariant(_) => Some(AnalysisPhase::Clustering),
            Self::Config { .. } | Self::Io { .. } => None,
        }
    }
}

/// Result type alias using the assessment error.
pub type Result<T> = std::result::Result<T, AssessmentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_malformed_fact_is_recoverable() {
        let malformed =
            AssessmentError::malformed(ErrorCode::FACT_EMPTY_SOURCE, "batch-a", 4, "empty");
        assert!(!malformed.is_fatal());

        let fatal = [
            AssessmentError::EmptyGraph { skipped: 0 },
            AssessmentError::PartitionInvariant("node x missing".into()),
            AssessmentError::config("bad weight"),
            AssessmentError::BudgetExceeded {
                kind: BudgetKind::Deadline,
                phase: AnalysisPhase::Metrics,
                reason: "deadline of 10ms passed".into(),
            },
        ];
        assert!(fatal.iter().all(AssessmentError::is_fatal));
    }

    #[test]
    fn test_messages_carry_code_and_detail() {
        let err = AssessmentError::BudgetExceeded {
            kind: BudgetKind::FactCount,
            phase: AnalysisPhase::Ingestion,
            reason: "received 12 facts, limit is 10".into(),
        };
        let message = err.to_string();
        assert!(message.starts_with("[E010]"));
        assert!(message.contains("ingestion"));
        assert!(message.contains("limit is 10"));
    }

    #[test]
    fn test_phase_classification() {
        assert_eq!(
            AssessmentError::PartitionInvariant(String::new()).phase(),
            Some(AnalysisPhase::Clustering)
        );
        assert_eq!(AssessmentError::config("x").phase(), None);
        assert_eq!(
            AssessmentError::EmptyGraph { skipped: 2 }.code().as_str(),
            "E030"
        );
    }
}
