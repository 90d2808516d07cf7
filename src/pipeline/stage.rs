//! Pipeline stage abstractions.
//!
//! Each step of an assessment is a [`Stage`] bound to an [`AnalysisPhase`].
//! Stages run strictly one after another; each consumes the complete output
//! of its predecessor. [`run_stage`] wraps a stage with its phase span, a
//! deadline check and a timing log.

use super::Deadline;
use crate::errors::Result;
use crate::observability::AnalysisPhase;
use std::marker::PhantomData;
use std::time::Instant;
use tracing::{debug, info_span};

/// A pipeline stage that transforms data.
pub trait Stage {
    type Input;
    type Output;

    /// Execute this stage with the given input.
    fn execute(&self, input: Self::Input) -> Result<Self::Output>;

    /// Stage name for logs.
    fn name(&self) -> &str;

    fn phase(&self) -> AnalysisPhase;
}

/// A stage that cannot fail.
///
/// # Example
///
/// ```rust,ignore
/// let stage = PureStage::new("compute node metrics", AnalysisPhase::Metrics, |graph| {
///     compute_node_metrics(graph)
/// });
/// ```
pub struct PureStage<F, I, O> {
    name: String,
    phase: AnalysisPhase,
    func: F,
    _phantom: PhantomData<(I, O)>,
}

impl<F, I, O> PureStage<F, I, O>
where
    F: Fn(I) -> O,
{
    pub fn new(name: impl Into<String>, phase: AnalysisPhase, func: F) -> Self {
        Self {
            name: name.into(),
            phase,
            func,
            _phantom: PhantomData,
        }
    }
}

impl<F, I, O> Stage for PureStage<F, I, O>
where
    F: Fn(I) -> O,
{
    type Input = I;
    type Output = O;

    fn execute(&self, input: Self::Input) -> Result<Self::Output> {
        Ok((self.func)(input))
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn phase(&self) -> AnalysisPhase {
        self.phase
    }
}

/// A stage that can abort the run.
pub struct FallibleStage<F, I, O> {
    name: String,
    phase: AnalysisPhase,
    func: F,
    _phantom: PhantomData<(I, O)>,
}

impl<F, I, O> FallibleStage<F, I, O>
where
    F: Fn(I) -> Result<O>,
{
    pub fn new(name: impl Into<String>, phase: AnalysisPhase, func: F) -> Self {
        Self {
            name: name.into(),
            phase,
            func,
            _phantom: PhantomData,
        }
    }
}

impl<F, I, O> Stage for FallibleStage<F, I, O>
where
    F: Fn(I) -> Result<O>,
{
    type Input = I;
    type Output = O;

    fn execute(&self, input: Self::Input) -> Result<Self::Output> {
        (self.func)(input)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn phase(&self) -> AnalysisPhase {
        self.phase
    }
}

/// Run one stage inside its phase span after checking the deadline.
pub fn run_stage<S: Stage>(stage: &S, input: S::Input, deadline: &Deadline) -> Result<S::Output> {
    let phase = stage.phase();
    let span = info_span!("stage", phase = %phase);
    let _entered = span.enter();

    deadline.check(phase)?;
    let start = Instant::now();
    let output = stage.execute(input)?;
    debug!(
        stage = stage.name(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Stage complete"
    );
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AssessmentError;
    use std::time::Duration;

    #[test]
    fn test_pure_stage() {
        let stage = PureStage::new("double", AnalysisPhase::Metrics, |x: i32| x * 2);
        let deadline = Deadline::start(Duration::from_secs(60));

        assert_eq!(run_stage(&stage, 21, &deadline).unwrap(), 42);
        assert_eq!(stage.name(), "double");
    }

    #[test]
    fn test_fallible_stage_propagates_error() {
        let stage = FallibleStage::new("reject", AnalysisPhase::Clustering, |_: ()| {
            Err::<(), _>(AssessmentError::PartitionInvariant("x".into()))
        });
        let deadline = Deadline::start(Duration::from_secs(60));

        let err = run_stage(&stage, (), &deadline).unwrap_err();
        assert_eq!(err.phase(), Some(AnalysisPhase::Clustering));
    }

    #[test]
    fn test_expired_deadline_skips_execution() {
        let stage = PureStage::new("never", AnalysisPhase::Planning, |_: ()| {
            panic!("stage must not run after the deadline")
        });
        let err = run_stage(&stage, (), &Deadline::start(Duration::ZERO)).unwrap_err();

        assert_eq!(err.phase(), Some(AnalysisPhase::Planning));
    }
}
