//! Per-factor score functions. All pure; each returns a value in [0, 1].

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::error::ScoreError;
use crate::task::{DueDate, Task};

/// Dependency pressure for tasks with no dependencies, or when nothing in the batch is referenced.
pub const BASELINE_DEPENDENCY_PRESSURE: f64 = 0.3;

/// Urgency from the due date relative to `today`.
pub fn urgency_score(due: &DueDate, today: NaiveDate) -> Result<f64, ScoreError> {
    let due = due.resolve()?;
    Ok(urgency_for_days((due - today).num_days()))
}

/// Urgency from whole days until due. Overdue saturates at 1.0; beyond a
/// week it decays logarithmically, floored at 0.1.
pub fn urgency_for_days(days: i64) -> f64 {
    match days {
        d if d < 0 => 1.0,
        0 => 0.9,
        1 => 0.8,
        2..=3 => 0.6,
        4..=7 => 0.4,
        d => (1.0 / (1.0 + ((d - 6) as f64).ln())).max(0.1),
    }
}

/// Smaller tasks score higher (quick wins).
pub fn effort_score(estimated_hours: f64) -> f64 {
    if estimated_hours <= 1.0 {
        1.0
    } else if estimated_hours <= 4.0 {
        0.8
    } else if estimated_hours <= 8.0 {
        0.6
    } else if estimated_hours <= 16.0 {
        0.4
    } else {
        0.2
    }
}

pub fn importance_score(raw: i64) -> f64 {
    raw as f64 / 10.0
}

/// Dependency pressure for a task with `task_deps`, given the whole batch.
///
/// Known quirk, kept because scores are part of the output contract: the
/// count is every dependency entry in the batch that points at any ID in the
/// batch, not only the entries pointing at this task. ID `0` is never a
/// valid target.
pub fn dependency_pressure(task_deps: &[i64], all_tasks: &[Task]) -> f64 {
    if task_deps.is_empty() {
        return BASELINE_DEPENDENCY_PRESSURE;
    }

    let ids: HashSet<i64> = all_tasks
        .iter()
        .filter_map(|t| t.id)
        .filter(|&id| id != 0)
        .collect();
    let blocking = all_tasks
        .iter()
        .flat_map(|t| t.dependencies.iter())
        .filter(|dep| ids.contains(dep))
        .count();

    if blocking == 0 {
        BASELINE_DEPENDENCY_PRESSURE
    } else {
        (0.5 + blocking as f64 * 0.1).min(1.0)
    }
}
