use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use taskrank_core::AnalysisRecord;
use tokio::io::AsyncWriteExt;

pub fn taskrank_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".taskrank"))
}

pub fn ensure_taskrank_home() -> Result<PathBuf> {
    let dir = taskrank_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn history_path() -> Result<PathBuf> {
    Ok(ensure_taskrank_home()?.join("analyses.jsonl"))
}

/// Append one analysis run to the JSONL audit log.
pub async fn append_record(record: &AnalysisRecord) -> Result<PathBuf> {
    let p = history_path()?;
    let mut line = serde_json::to_string(record).context("serialize analysis record")?;
    line.push('\n');

    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&p)
        .await
        .with_context(|| format!("open {}", p.display()))?;
    file.write_all(line.as_bytes())
        .await
        .with_context(|| format!("write {}", p.display()))?;
    Ok(p)
}

/// Most recent `limit` records, newest last.
pub async fn read_records(limit: usize) -> Result<Vec<AnalysisRecord>> {
    let p = history_path()?;
    if !p.exists() {
        return Ok(Vec::new());
    }
    let s = tokio::fs::read_to_string(&p)
        .await
        .with_context(|| format!("read {}", p.display()))?;
    parse_records(&s, limit)
}

fn parse_records(s: &str, limit: usize) -> Result<Vec<AnalysisRecord>> {
    let mut records = s
        .lines()
        .filter(|l| !l.trim().is_empty())
        .enumerate()
        .map(|(i, l)| serde_json::from_str(l).with_context(|| format!("parse record on line {}", i + 1)))
        .collect::<Result<Vec<AnalysisRecord>>>()?;
    let skip = records.len().saturating_sub(limit);
    Ok(records.split_off(skip))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn record(strategy: &str) -> AnalysisRecord {
        AnalysisRecord {
            tasks_data: json!([{ "title": "t" }]),
            analysis_results: json!([]),
            strategy_used: strategy.to_string(),
            created_at: Utc.with_ymd_and_hms(2026, 10, 16, 9, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_parse_records_keeps_latest() {
        let lines: Vec<String> = ["smart_balance", "high_impact", "fastest_wins"]
            .iter()
            .map(|s| serde_json::to_string(&record(s)).unwrap())
            .collect();
        let text = format!("{}\n\n", lines.join("\n"));

        let latest = parse_records(&text, 2).unwrap();
        assert_eq!(latest.len(), 2);
        assert_eq!(latest[0].strategy_used, "high_impact");
        assert_eq!(latest[1].strategy_used, "fastest_wins");

        assert_eq!(parse_records(&text, 10).unwrap().len(), 3);
    }

    #[test]
    fn test_parse_records_reports_bad_line() {
        let err = parse_records("{not json}\n", 5).unwrap_err();
        assert!(err.to_string().contains("line 1"));
    }
}
