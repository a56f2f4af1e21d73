//! Error types for scoring and batch analysis.

use thiserror::Error;

use crate::cycles::Cycle;

/// Per-task scoring failure. The engine turns these into a zero-score result
/// instead of dropping the task.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoreError {
    #[error("invalid isoformat date: '{0}'")]
    InvalidDate(String),

    #[error("missing required field '{0}'")]
    MissingField(&'static str),
}

/// Batch-level failure; no task is scored.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("circular dependencies detected: {}", join_cycles(.0))]
    CircularDependency(Vec<Cycle>),
}

impl AnalysisError {
    pub fn cycles(&self) -> &[Cycle] {
        match self {
            AnalysisError::CircularDependency(cycles) => cycles,
        }
    }
}

/// Strict strategy lookup failed. Lenient lookup never produces this.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown strategy: {0}")]
pub struct UnknownStrategy(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid timezone: {0}")]
pub struct InvalidTimezone(pub String);

fn join_cycles(cycles: &[Cycle]) -> String {
    cycles
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
