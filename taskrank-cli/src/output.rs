//! Rendering of analysis results: aligned table, JSON, or CSV.

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::io::Write;
use taskrank_core::{AnalyzeResponse, ScoredTask};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    rank: usize,
    id: Option<i64>,
    title: &'a str,
    due_date: Option<String>,
    estimated_hours: Option<f64>,
    importance: Option<i64>,
    priority_score: f64,
    urgency: f64,
    importance_score: f64,
    effort: f64,
    dependencies: f64,
    explanation: &'a str,
}

impl<'a> CsvRow<'a> {
    fn new(rank: usize, t: &'a ScoredTask) -> Self {
        Self {
            rank,
            id: t.task.id,
            title: &t.task.title,
            due_date: t.task.due_date.clone().map(String::from),
            estimated_hours: t.task.estimated_hours,
            importance: t.task.importance,
            priority_score: t.priority_score,
            urgency: t.component_scores.urgency,
            importance_score: t.component_scores.importance,
            effort: t.component_scores.effort,
            dependencies: t.component_scores.dependencies,
            explanation: &t.explanation,
        }
    }
}

pub fn render(
    resp: &AnalyzeResponse,
    format: OutputFormat,
    limit: Option<usize>,
    out: &mut impl Write,
) -> Result<()> {
    let shown = &resp.tasks[..limit.unwrap_or(resp.tasks.len()).min(resp.tasks.len())];
    match format {
        OutputFormat::Json => {
            let mut trimmed = resp.clone();
            trimmed.tasks.truncate(shown.len());
            serde_json::to_writer_pretty(&mut *out, &trimmed).context("write json")?;
            writeln!(out)?;
        }
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(&mut *out);
            for (i, t) in shown.iter().enumerate() {
                wtr.serialize(CsvRow::new(i + 1, t)).context("write csv row")?;
            }
            wtr.flush()?;
        }
        OutputFormat::Table => {
            writeln!(
                out,
                "Strategy: {} | {} tasks | analyzed {}\n",
                resp.strategy_used, resp.total_tasks, resp.analysis_date
            )?;
            for (i, t) in shown.iter().enumerate() {
                let id = t.task.id.map(|id| format!("#{id}")).unwrap_or_else(|| "-".to_string());
                let due = t
                    .task
                    .due_date
                    .clone()
                    .map(String::from)
                    .unwrap_or_else(|| "?".to_string());
                writeln!(
                    out,
                    "{:>3}. [{:.3}] {:<5} {} (due {})",
                    i + 1,
                    t.priority_score,
                    id,
                    t.task.title,
                    due
                )?;
                writeln!(out, "      {}", t.explanation)?;
            }
            if shown.len() < resp.tasks.len() {
                writeln!(out, "\n... {} more", resp.tasks.len() - shown.len())?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;
    use taskrank_core::{FixedClock, api};

    fn response() -> AnalyzeResponse {
        let clock = FixedClock::on(NaiveDate::from_ymd_opt(2026, 10, 16).unwrap());
        let payload = json!({ "tasks": [
            { "id": 1, "title": "Ship, then rest", "due_date": "2026-10-16", "estimated_hours": 1, "importance": 9 },
            { "id": 2, "title": "Plan Q1", "due_date": "2026-12-01", "estimated_hours": 6, "importance": 5 },
            { "title": "No id", "due_date": "2026-11-01", "estimated_hours": 3, "importance": 4 }
        ]});
        api::analyze(&payload, &clock).unwrap()
    }

    fn render_str(format: OutputFormat, limit: Option<usize>) -> String {
        let mut buf = Vec::new();
        render(&response(), format, limit, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_table_output() {
        let s = render_str(OutputFormat::Table, Some(2));
        assert!(s.starts_with("Strategy: smart_balance | 3 tasks"));
        assert!(s.contains("  1. ["));
        assert!(s.contains("#1"));
        assert!(s.contains("(due 2026-10-16)"));
        assert!(s.contains("... 1 more"));
    }

    #[test]
    fn test_csv_output() {
        let s = render_str(OutputFormat::Csv, None);
        let mut lines = s.lines();
        assert_eq!(
            lines.next(),
            Some("rank,id,title,due_date,estimated_hours,importance,priority_score,urgency,importance_score,effort,dependencies,explanation")
        );
        let first = lines.next().unwrap();
        assert!(first.starts_with("1,1,\"Ship, then rest\",2026-10-16,"));
        assert_eq!(s.lines().count(), 4);
    }

    #[test]
    fn test_json_output_respects_limit() {
        let s = render_str(OutputFormat::Json, Some(1));
        let v: serde_json::Value = serde_json::from_str(&s).unwrap();
        assert_eq!(v["tasks"].as_array().unwrap().len(), 1);
        assert_eq!(v["total_tasks"], json!(3));
    }
}
