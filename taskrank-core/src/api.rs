//! Request boundary: Analyze / Validate / Suggest over JSON payloads, and the
//! audit record shape for analysis runs.
//!
//! Everything here is a thin adapter; scoring lives in [`crate::engine`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;

use crate::cycles::Cycle;
use crate::engine::ScoredTask;
use crate::error::AnalysisError;
use crate::strategy::Strategy;
use crate::task::Task;
use crate::time::{Clock, format_iso_timestamp};
use crate::validate::{ValidationReport, validate_tasks};

pub const DEFAULT_STRATEGY: &str = "smart_balance";

/// Fields every task must carry before the engine runs.
pub const REQUIRED_FIELDS: [&str; 4] = ["title", "due_date", "estimated_hours", "importance"];

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error("Invalid request payload: {0}")]
    InvalidPayload(String),

    #[error("No tasks provided")]
    NoTasks,

    #[error("Task {index} missing required fields")]
    MissingFields { index: usize },

    #[error("Circular dependencies detected")]
    CircularDependencies(Vec<Cycle>),

    #[error("Analysis failed: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Internal(_) => 500,
            _ => 400,
        }
    }

    /// JSON error body as returned to the caller.
    pub fn body(&self) -> Value {
        match self {
            ApiError::InvalidPayload(details) => {
                json!({ "error": "Invalid request payload", "details": details })
            }
            ApiError::NoTasks => {
                json!({ "error": self.to_string(), "details": "Tasks array is empty" })
            }
            ApiError::MissingFields { .. } => {
                json!({ "error": self.to_string(), "required_fields": REQUIRED_FIELDS })
            }
            ApiError::CircularDependencies(cycles) => {
                json!({ "error": self.to_string(), "circular_dependencies": cycles })
            }
            ApiError::Internal(_) => json!({ "error": self.to_string() }),
        }
    }
}

impl From<AnalysisError> for ApiError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::CircularDependency(cycles) => ApiError::CircularDependencies(cycles),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyzeResponse {
    /// Strategy name as requested (echoed even when it fell back to the default).
    pub strategy_used: String,
    pub tasks: Vec<ScoredTask>,
    pub total_tasks: usize,
    pub analysis_date: String,
}

/// Analyze `{ "tasks": [...], "strategy": "..." }`.
pub fn analyze<C: Clock + ?Sized>(payload: &Value, clock: &C) -> Result<AnalyzeResponse, ApiError> {
    let obj = payload
        .as_object()
        .ok_or_else(|| ApiError::InvalidPayload("expected a JSON object with a `tasks` array".into()))?;

    let raw_tasks = match obj.get("tasks") {
        None | Some(Value::Null) => return Err(ApiError::NoTasks),
        Some(Value::Array(items)) if items.is_empty() => return Err(ApiError::NoTasks),
        Some(Value::Array(items)) => items,
        Some(_) => return Err(ApiError::InvalidPayload("`tasks` must be an array".into())),
    };
    let strategy_name = obj
        .get("strategy")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_STRATEGY);

    let tasks = parse_tasks(raw_tasks)?;
    let engine = Strategy::resolve(strategy_name).engine_with_clock(clock);
    let ranked = engine.analyze(&tasks)?;

    Ok(AnalyzeResponse {
        strategy_used: strategy_name.to_string(),
        total_tasks: ranked.len(),
        tasks: ranked,
        analysis_date: format_iso_timestamp(clock.now()),
    })
}

fn parse_tasks(raw: &[Value]) -> Result<Vec<Task>, ApiError> {
    raw.iter()
        .enumerate()
        .map(|(index, item)| {
            let complete = item
                .as_object()
                .is_some_and(|o| REQUIRED_FIELDS.iter().all(|f| o.contains_key(*f)));
            if !complete {
                return Err(ApiError::MissingFields { index });
            }
            serde_json::from_value(item.clone())
                .map_err(|e| ApiError::InvalidPayload(format!("task {index}: {e}")))
        })
        .collect()
}

/// Validate a JSON array of tasks against the calendar date of `clock`.
pub fn validate<C: Clock + ?Sized>(payload: &Value, clock: &C) -> ValidationReport {
    validate_tasks(payload, clock.today())
}

/// Static usage guidance.
pub fn suggest() -> Value {
    let strategies: Vec<&str> = Strategy::ALL.iter().map(|s| s.name()).collect();
    json!({
        "message": "Analyze your tasks, then work through the top 3 results",
        "example_usage": {
            "command": "taskrank analyze --input tasks.json",
            "payload": {
                "tasks": [
                    {
                        "title": "Task name",
                        "due_date": "2024-12-31",
                        "estimated_hours": 2,
                        "importance": 8,
                        "dependencies": []
                    }
                ],
                "strategy": DEFAULT_STRATEGY
            },
            "strategies": strategies
        }
    })
}

/// One recorded analysis run, for audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub tasks_data: Value,
    pub analysis_results: Value,
    pub strategy_used: String,
    pub created_at: DateTime<Utc>,
}

impl AnalysisRecord {
    pub fn new(
        request: &Value,
        response: &AnalyzeResponse,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ApiError> {
        let analysis_results =
            serde_json::to_value(&response.tasks).map_err(|e| ApiError::Internal(e.to_string()))?;
        Ok(Self {
            tasks_data: request.get("tasks").cloned().unwrap_or(Value::Null),
            analysis_results,
            strategy_used: response.strategy_used.clone(),
            created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::FixedClock;
    use chrono::NaiveDate;

    fn clock() -> FixedClock {
        FixedClock::on(NaiveDate::from_ymd_opt(2026, 10, 16).unwrap())
    }

    #[test]
    fn test_rejects_non_object() {
        let err = analyze(&json!([1, 2]), &clock()).unwrap_err();
        assert!(matches!(err, ApiError::InvalidPayload(_)));
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_rejects_empty_tasks() {
        assert_eq!(analyze(&json!({ "tasks": [] }), &clock()), Err(ApiError::NoTasks));
        assert_eq!(analyze(&json!({}), &clock()), Err(ApiError::NoTasks));
        assert_eq!(
            ApiError::NoTasks.body(),
            json!({ "error": "No tasks provided", "details": "Tasks array is empty" })
        );
    }

    #[test]
    fn test_rejects_missing_fields_with_index() {
        let payload = json!({ "tasks": [
            { "title": "ok", "due_date": "2026-10-20", "estimated_hours": 1, "importance": 5 },
            { "title": "no hours", "due_date": "2026-10-20", "importance": 5 }
        ]});
        let err = analyze(&payload, &clock()).unwrap_err();
        assert_eq!(err, ApiError::MissingFields { index: 1 });
        assert_eq!(err.body()["error"], json!("Task 1 missing required fields"));
        assert_eq!(err.body()["required_fields"], json!(REQUIRED_FIELDS));
    }

    #[test]
    fn test_wrong_type_is_invalid_payload() {
        let payload = json!({ "tasks": [
            { "title": "t", "due_date": "2026-10-20", "estimated_hours": "two", "importance": 5 }
        ]});
        let err = analyze(&payload, &clock()).unwrap_err();
        assert!(matches!(err, ApiError::InvalidPayload(ref d) if d.starts_with("task 0:")));
    }

    #[test]
    fn test_internal_error_is_500() {
        let err = ApiError::Internal("boom".into());
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.body(), json!({ "error": "Analysis failed: boom" }));
    }

    #[test]
    fn test_suggest_lists_strategies() {
        let v = suggest();
        assert_eq!(v["example_usage"]["strategies"].as_array().map(|a| a.len()), Some(4));
        assert_eq!(v["example_usage"]["payload"]["strategy"], json!("smart_balance"));
    }

    #[test]
    fn test_analysis_record() {
        let payload = json!({ "tasks": [
            { "id": 1, "title": "t", "due_date": "2026-10-20", "estimated_hours": 1, "importance": 5 }
        ], "strategy": "high_impact" });
        let resp = analyze(&payload, &clock()).unwrap();
        let created = DateTime::parse_from_rfc3339("2026-10-16T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let record = AnalysisRecord::new(&payload, &resp, created).unwrap();

        assert_eq!(record.strategy_used, "high_impact");
        assert_eq!(record.tasks_data, payload["tasks"]);
        assert_eq!(record.analysis_results[0]["id"], json!(1));
        assert!(record.analysis_results[0]["priority_score"].is_number());
    }
}
