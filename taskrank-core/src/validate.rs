//! Field-level validation of a raw task list, independent of scoring.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::time::parse_iso_date;

pub const MAX_TITLE_LEN: usize = 200;
pub const MIN_ESTIMATED_HOURS: f64 = 0.1;
pub const IMPORTANCE_RANGE: std::ops::RangeInclusive<i64> = 1..=10;

const REQUIRED: &str = "This field is required.";
const NON_FIELD: &str = "non_field_errors";

/// Messages per field name for one task. Empty when the task is valid.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_count: Option<usize>,
    /// One entry per input task, in input order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldErrors>>,
}

impl ValidationReport {
    fn passed(task_count: usize) -> Self {
        Self {
            valid: true,
            message: Some("All tasks are valid".to_string()),
            task_count: Some(task_count),
            errors: None,
        }
    }

    fn failed(errors: Vec<FieldErrors>) -> Self {
        Self {
            valid: false,
            message: None,
            task_count: None,
            errors: Some(errors),
        }
    }
}

/// Validate a JSON array of task objects. Due dates before `today` are rejected.
pub fn validate_tasks(payload: &Value, today: NaiveDate) -> ValidationReport {
    let Some(items) = payload.as_array() else {
        let mut errs = FieldErrors::new();
        push(
            &mut errs,
            NON_FIELD,
            format!("Expected a list of items but got type \"{}\".", json_type(payload)),
        );
        return ValidationReport::failed(vec![errs]);
    };

    let errors: Vec<FieldErrors> = items.iter().map(|item| validate_item(item, today)).collect();
    if errors.iter().all(|e| e.is_empty()) {
        ValidationReport::passed(items.len())
    } else {
        ValidationReport::failed(errors)
    }
}

fn validate_item(item: &Value, today: NaiveDate) -> FieldErrors {
    let mut errs = FieldErrors::new();
    let Some(obj) = item.as_object() else {
        push(
            &mut errs,
            NON_FIELD,
            format!("Invalid data. Expected a dictionary, but got {}.", json_type(item)),
        );
        return errs;
    };

    check_id(obj, &mut errs);
    check_title(obj, &mut errs);
    check_due_date(obj, today, &mut errs);
    check_estimated_hours(obj, &mut errs);
    check_importance(obj, &mut errs);
    check_dependencies(obj, &mut errs);
    errs
}

fn check_id(obj: &Map<String, Value>, errs: &mut FieldErrors) {
    match obj.get("id") {
        None | Some(Value::Null) => {}
        Some(v) if as_integer(v).is_some() => {}
        Some(_) => push(errs, "id", "A valid integer is required."),
    }
}

fn check_title(obj: &Map<String, Value>, errs: &mut FieldErrors) {
    match obj.get("title") {
        None | Some(Value::Null) => push(errs, "title", REQUIRED),
        Some(Value::String(s)) if s.trim().is_empty() => {
            push(errs, "title", "This field may not be blank.")
        }
        Some(Value::String(s)) if s.chars().count() > MAX_TITLE_LEN => push(
            errs,
            "title",
            format!("Ensure this field has no more than {MAX_TITLE_LEN} characters."),
        ),
        Some(Value::String(_)) => {}
        Some(_) => push(errs, "title", "Not a valid string."),
    }
}

fn check_due_date(obj: &Map<String, Value>, today: NaiveDate, errs: &mut FieldErrors) {
    let raw = match obj.get("due_date") {
        None | Some(Value::Null) => return push(errs, "due_date", REQUIRED),
        Some(v) => v,
    };
    match raw.as_str().map(parse_iso_date) {
        Some(Ok(date)) if date < today => push(errs, "due_date", "Due date cannot be in the past"),
        Some(Ok(_)) => {}
        _ => push(
            errs,
            "due_date",
            "Date has wrong format. Use one of these formats instead: YYYY-MM-DD.",
        ),
    }
}

fn check_estimated_hours(obj: &Map<String, Value>, errs: &mut FieldErrors) {
    match obj.get("estimated_hours") {
        None | Some(Value::Null) => push(errs, "estimated_hours", REQUIRED),
        Some(v) => match v.as_f64() {
            Some(h) if h < MIN_ESTIMATED_HOURS => push(
                errs,
                "estimated_hours",
                format!("Ensure this value is greater than or equal to {MIN_ESTIMATED_HOURS}."),
            ),
            Some(_) => {}
            None => push(errs, "estimated_hours", "A valid number is required."),
        },
    }
}

fn check_importance(obj: &Map<String, Value>, errs: &mut FieldErrors) {
    match obj.get("importance") {
        None | Some(Value::Null) => push(errs, "importance", REQUIRED),
        Some(v) => match as_integer(v) {
            Some(i) if i < *IMPORTANCE_RANGE.start() => push(
                errs,
                "importance",
                format!("Ensure this value is greater than or equal to {}.", IMPORTANCE_RANGE.start()),
            ),
            Some(i) if i > *IMPORTANCE_RANGE.end() => push(
                errs,
                "importance",
                format!("Ensure this value is less than or equal to {}.", IMPORTANCE_RANGE.end()),
            ),
            Some(_) => {}
            None => push(errs, "importance", "A valid integer is required."),
        },
    }
}

fn check_dependencies(obj: &Map<String, Value>, errs: &mut FieldErrors) {
    match obj.get("dependencies") {
        None => {}
        Some(Value::Array(deps)) => {
            if deps.iter().any(|d| as_integer(d).is_none()) {
                push(errs, "dependencies", "Dependency IDs must be integers");
            }
        }
        Some(_) => push(errs, "dependencies", "Dependencies must be a list"),
    }
}

/// Integer value, also accepting integral floats such as `3.0`.
fn as_integer(v: &Value) -> Option<i64> {
    v.as_i64().or_else(|| {
        v.as_f64()
            .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
            .map(|f| f as i64)
    })
}

fn json_type(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

fn push(errs: &mut FieldErrors, field: &str, msg: impl Into<String>) {
    errs.entry(field.to_string()).or_default().push(msg.into());
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    fn good() -> Value {
        json!({
            "id": 1,
            "title": "Fix login bug",
            "due_date": "2026-10-20",
            "estimated_hours": 3,
            "importance": 8,
            "dependencies": []
        })
    }

    #[test]
    fn test_valid_tasks() {
        let report = validate_tasks(&json!([good(), good()]), today());
        assert!(report.valid);
        assert_eq!(report.task_count, Some(2));
        assert_eq!(report.message.as_deref(), Some("All tasks are valid"));
    }

    #[test]
    fn test_empty_list_is_valid() {
        let report = validate_tasks(&json!([]), today());
        assert!(report.valid);
        assert_eq!(report.task_count, Some(0));
    }

    #[test]
    fn test_not_a_list() {
        let report = validate_tasks(&json!({ "tasks": [] }), today());
        assert!(!report.valid);
        let errs = report.errors.unwrap();
        assert_eq!(
            errs[0][NON_FIELD],
            vec!["Expected a list of items but got type \"dict\".".to_string()]
        );
    }

    #[test]
    fn test_missing_required_fields() {
        let report = validate_tasks(&json!([good(), { "id": 2 }]), today());
        assert!(!report.valid);
        let errs = report.errors.unwrap();
        assert!(errs[0].is_empty());
        for field in ["title", "due_date", "estimated_hours", "importance"] {
            assert_eq!(errs[1][field], vec![REQUIRED.to_string()], "{field}");
        }
        assert!(!errs[1].contains_key("dependencies"));
    }

    #[test]
    fn test_ranges() {
        let mut t = good();
        t["importance"] = json!(11);
        t["estimated_hours"] = json!(0.05);
        t["due_date"] = json!("2026-10-15");
        let errs = validate_tasks(&json!([t]), today()).errors.unwrap();

        assert_eq!(errs[0]["importance"], vec!["Ensure this value is less than or equal to 10."]);
        assert_eq!(
            errs[0]["estimated_hours"],
            vec!["Ensure this value is greater than or equal to 0.1."]
        );
        assert_eq!(errs[0]["due_date"], vec!["Due date cannot be in the past"]);
    }

    #[test]
    fn test_due_today_is_allowed() {
        let mut t = good();
        t["due_date"] = json!("2026-10-16");
        assert!(validate_tasks(&json!([t]), today()).valid);
    }

    #[test]
    fn test_types() {
        let mut t = good();
        t["id"] = json!("one");
        t["title"] = json!(5);
        t["due_date"] = json!("16/10/2026");
        t["importance"] = json!(7.5);
        t["dependencies"] = json!([1, "two"]);
        let errs = validate_tasks(&json!([t]), today()).errors.unwrap();

        assert_eq!(errs[0]["id"], vec!["A valid integer is required."]);
        assert_eq!(errs[0]["title"], vec!["Not a valid string."]);
        assert!(errs[0]["due_date"][0].starts_with("Date has wrong format"));
        assert_eq!(errs[0]["importance"], vec!["A valid integer is required."]);
        assert_eq!(errs[0]["dependencies"], vec!["Dependency IDs must be integers"]);
    }

    #[test]
    fn test_dependencies_must_be_list() {
        let mut t = good();
        t["dependencies"] = json!(3);
        let errs = validate_tasks(&json!([t]), today()).errors.unwrap();
        assert_eq!(errs[0]["dependencies"], vec!["Dependencies must be a list"]);
    }

    #[test]
    fn test_title_length() {
        let mut t = good();
        t["title"] = json!("x".repeat(MAX_TITLE_LEN + 1));
        let errs = validate_tasks(&json!([t.clone()]), today()).errors.unwrap();
        assert_eq!(errs[0]["title"], vec!["Ensure this field has no more than 200 characters."]);

        t["title"] = json!("   ");
        let errs = validate_tasks(&json!([t]), today()).errors.unwrap();
        assert_eq!(errs[0]["title"], vec!["This field may not be blank."]);
    }

    #[test]
    fn test_integral_float_accepted() {
        let mut t = good();
        t["importance"] = json!(7.0);
        assert!(validate_tasks(&json!([t]), today()).valid);
    }

    #[test]
    fn test_report_serialization() {
        let v = serde_json::to_value(validate_tasks(&json!([good()]), today())).unwrap();
        assert_eq!(
            v,
            json!({ "valid": true, "message": "All tasks are valid", "task_count": 1 })
        );
    }
}
