//! Task model consumed by the priority engine.
//!
//! The engine only reads tasks. Scored output is attached to a copy (see
//! [`crate::engine::ScoredTask`]).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ScoreError;
use crate::time::{format_iso_date, parse_iso_date};

/// Due date as supplied by the caller.
///
/// Text is kept verbatim and parsed when the task is scored, so one bad date
/// degrades that task rather than the whole batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DueDate {
    Date(NaiveDate),
    Text(String),
}

impl DueDate {
    pub fn resolve(&self) -> Result<NaiveDate, ScoreError> {
        match self {
            DueDate::Date(d) => Ok(*d),
            DueDate::Text(s) => parse_iso_date(s),
        }
    }

    /// Parsed form if the text is a valid date, otherwise unchanged.
    pub fn normalized(&self) -> DueDate {
        match self.resolve() {
            Ok(d) => DueDate::Date(d),
            Err(_) => self.clone(),
        }
    }
}

impl From<NaiveDate> for DueDate {
    fn from(d: NaiveDate) -> Self {
        DueDate::Date(d)
    }
}

impl From<String> for DueDate {
    fn from(s: String) -> Self {
        DueDate::Text(s)
    }
}

impl From<&str> for DueDate {
    fn from(s: &str) -> Self {
        DueDate::Text(s.to_string())
    }
}

impl From<DueDate> for String {
    fn from(d: DueDate) -> Self {
        match d {
            DueDate::Date(d) => format_iso_date(d),
            DueDate::Text(s) => s,
        }
    }
}

/// Core task type.
///
/// `due_date`, `estimated_hours` and `importance` are optional here so that a
/// task missing one still reaches the engine and comes back with a zero score.
/// Fields the engine does not know about are preserved in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    #[serde(default)]
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DueDate>,

    /// Hours, > 0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_hours: Option<f64>,

    /// 1-10, higher means more important.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub importance: Option<i64>,

    /// IDs of tasks this one depends on.
    #[serde(default)]
    pub dependencies: Vec<i64>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Task {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            due_date: None,
            estimated_hours: None,
            importance: None,
            dependencies: Vec::new(),
            extra: Map::new(),
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_due_date(mut self, due: impl Into<DueDate>) -> Self {
        self.due_date = Some(due.into());
        self
    }

    pub fn with_hours(mut self, hours: f64) -> Self {
        self.estimated_hours = Some(hours);
        self
    }

    pub fn with_importance(mut self, importance: i64) -> Self {
        self.importance = Some(importance);
        self
    }

    pub fn with_dependencies(mut self, deps: impl IntoIterator<Item = i64>) -> Self {
        self.dependencies = deps.into_iter().collect();
        self
    }

    /// Graph node for this task: its ID, or its position in the batch when it has none.
    pub fn node_key(&self, index: usize) -> i64 {
        self.id.unwrap_or(index as i64)
    }
}
