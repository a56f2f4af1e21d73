//! Priority engine: weighted combination of factor scores, explanations, and
//! batch orchestration (cycle check, per-task scoring, stable ranking).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::cycles::detect_cycles;
use crate::error::{AnalysisError, ScoreError};
use crate::scoring::{dependency_pressure, effort_score, importance_score, urgency_score};
use crate::strategy::WeightVector;
use crate::task::Task;
use crate::time::{Clock, SystemClock};

/// Output keys that a caller-supplied extra field must not shadow.
const RESERVED_KEYS: [&str; 3] = ["priority_score", "component_scores", "explanation"];

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ComponentScores {
    pub urgency: f64,
    pub importance: f64,
    pub effort: f64,
    pub dependencies: f64,
}

impl ComponentScores {
    pub fn weighted_total(&self, w: &WeightVector) -> f64 {
        self.urgency * w.urgency
            + self.importance * w.importance
            + self.effort * w.effort
            + self.dependencies * w.dependencies
    }

    fn rounded(&self) -> Self {
        Self {
            urgency: round3(self.urgency),
            importance: round3(self.importance),
            effort: round3(self.effort),
            dependencies: round3(self.dependencies),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub total_score: f64,
    pub component_scores: ComponentScores,
    pub explanation: String,
}

impl ScoreResult {
    /// Zero score carrying the error text, used when a task cannot be scored.
    pub fn degraded(err: &ScoreError) -> Self {
        Self {
            total_score: 0.0,
            component_scores: ComponentScores::default(),
            explanation: format!("Error calculating score: {err}"),
        }
    }
}

/// A task copy with its score attached; one output row of an analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredTask {
    #[serde(flatten)]
    pub task: Task,
    pub priority_score: f64,
    pub component_scores: ComponentScores,
    pub explanation: String,
}

impl ScoredTask {
    pub fn new(task: &Task, result: ScoreResult) -> Self {
        let mut task = task.clone();
        task.due_date = task.due_date.map(|d| d.normalized());
        for key in RESERVED_KEYS {
            task.extra.remove(key);
        }
        Self {
            task,
            priority_score: result.total_score,
            component_scores: result.component_scores,
            explanation: result.explanation,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PriorityEngine<C = SystemClock> {
    weights: WeightVector,
    clock: C,
}

impl PriorityEngine {
    pub fn new(weights: WeightVector) -> Self {
        Self::with_clock(weights, SystemClock)
    }
}

impl<C: Clock> PriorityEngine<C> {
    pub fn with_clock(weights: WeightVector, clock: C) -> Self {
        Self { weights, clock }
    }

    pub fn weights(&self) -> &WeightVector {
        &self.weights
    }

    /// Score one task against the batch it belongs to.
    pub fn try_score(&self, task: &Task, all_tasks: &[Task]) -> Result<ScoreResult, ScoreError> {
        self.try_score_on(task, all_tasks, self.clock.today())
    }

    /// Like [`try_score`](Self::try_score), but a task that cannot be scored
    /// yields a zero result instead of an error.
    pub fn score(&self, task: &Task, all_tasks: &[Task]) -> ScoreResult {
        self.score_on(task, all_tasks, self.clock.today())
    }

    /// Check for cycles, score every task, and rank by total score (descending,
    /// ties in input order).
    pub fn analyze(&self, tasks: &[Task]) -> Result<Vec<ScoredTask>, AnalysisError> {
        let cycles = detect_cycles(tasks);
        if !cycles.is_empty() {
            warn!(task_count = tasks.len(), "analysis aborted on dependency cycle");
            return Err(AnalysisError::CircularDependency(cycles));
        }

        let today = self.clock.today();
        let mut scored: Vec<ScoredTask> = tasks
            .iter()
            .map(|t| ScoredTask::new(t, self.score_on(t, tasks, today)))
            .collect();
        sort_by_priority(&mut scored);

        info!(task_count = scored.len(), %today, "analysis complete");
        Ok(scored)
    }

    fn score_on(&self, task: &Task, all_tasks: &[Task], today: NaiveDate) -> ScoreResult {
        match self.try_score_on(task, all_tasks, today) {
            Ok(result) => result,
            Err(err) => {
                warn!(title = %task.title, error = %err, "task scored as zero");
                ScoreResult::degraded(&err)
            }
        }
    }

    fn try_score_on(
        &self,
        task: &Task,
        all_tasks: &[Task],
        today: NaiveDate,
    ) -> Result<ScoreResult, ScoreError> {
        let due = task.due_date.as_ref().ok_or(ScoreError::MissingField("due_date"))?;
        let urgency = urgency_score(due, today)?;
        let importance = importance_score(task.importance.ok_or(ScoreError::MissingField("importance"))?);
        let effort = effort_score(
            task.estimated_hours
                .ok_or(ScoreError::MissingField("estimated_hours"))?,
        );
        let dependencies = dependency_pressure(&task.dependencies, all_tasks);

        let components = ComponentScores {
            urgency,
            importance,
            effort,
            dependencies,
        };
        let total_score = round3(components.weighted_total(&self.weights));
        debug!(title = %task.title, total_score, "scored task");

        Ok(ScoreResult {
            total_score,
            component_scores: components.rounded(),
            explanation: explain(&components),
        })
    }
}

/// Stable sort by priority score, highest first.
pub fn sort_by_priority(scored: &mut [ScoredTask]) {
    scored.sort_by(|a, b| b.priority_score.total_cmp(&a.priority_score));
}

/// Human-readable reason for a score. Descriptive only.
pub fn explain(scores: &ComponentScores) -> String {
    let mut reasons: Vec<&str> = Vec::new();

    if scores.urgency > 0.8 {
        reasons.push("very urgent deadline");
    } else if scores.urgency > 0.6 {
        reasons.push("approaching deadline");
    }

    if scores.importance > 0.8 {
        reasons.push("high importance");
    } else if scores.importance > 0.6 {
        reasons.push("moderate importance");
    }

    if scores.effort > 0.8 {
        reasons.push("quick win (low effort)");
    } else if scores.effort > 0.6 {
        reasons.push("moderate effort");
    }

    if scores.dependencies > 0.6 {
        reasons.push("blocks other tasks");
    } else if scores.dependencies > 0.4 {
        reasons.push("has dependencies");
    }

    if reasons.is_empty() {
        return "Moderate priority across all factors".to_string();
    }
    format!("High priority due to {}", reasons.join(", "))
}

fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}
