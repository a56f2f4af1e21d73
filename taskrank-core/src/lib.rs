//! taskrank-core: priority scoring and ranking of task lists.
//!
//! Tasks are scored on urgency, importance, effort and dependency pressure,
//! combined with a named weighting strategy, and ranked. Dependency cycles
//! abort an analysis before anything is scored.

pub mod api;
pub mod cycles;
pub mod engine;
pub mod error;
pub mod scoring;
pub mod strategy;
pub mod task;
pub mod time;
pub mod validate;

pub use api::{AnalysisRecord, AnalyzeResponse, ApiError};
pub use cycles::{Cycle, detect_cycles};
pub use engine::{ComponentScores, PriorityEngine, ScoreResult, ScoredTask, explain, sort_by_priority};
pub use error::{AnalysisError, InvalidTimezone, ScoreError, UnknownStrategy};
pub use scoring::{dependency_pressure, effort_score, importance_score, urgency_for_days, urgency_score};
pub use strategy::{Strategy, WeightVector, engine_for};
pub use task::{DueDate, Task};
pub use time::{Clock, FixedClock, SystemClock, ZonedClock};
pub use validate::{FieldErrors, ValidationReport, validate_tasks};
