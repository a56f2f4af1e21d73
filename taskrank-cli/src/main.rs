use anyhow::{Context, Result, bail};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use taskrank_core::{AnalysisRecord, Strategy, api};
use tracing_subscriber::EnvFilter;

mod config;
mod output;
mod state;

use output::OutputFormat;

#[derive(Parser, Debug)]
#[command(
    name = "taskrank",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("TASKRANK_BUILD_SHA"), ")"),
    about = "Rank tasks by computed priority"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Score and rank tasks from a JSON file (task array, or {"tasks": [...], "strategy": "..."})
    Analyze {
        /// Path to the tasks JSON file
        #[arg(long)]
        input: PathBuf,

        /// Weighting strategy (overrides the file and config)
        #[arg(long)]
        strategy: Option<String>,

        /// Score as of this date (YYYY-MM-DD) instead of today
        #[arg(long)]
        today: Option<NaiveDate>,

        /// Limit number of tasks printed
        #[arg(long)]
        limit: Option<usize>,

        /// Output format (default from config: table)
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,

        /// Do not append this run to the audit log
        #[arg(long)]
        no_audit: bool,
    },

    /// Check task fields (presence, types, ranges) without scoring
    Validate {
        /// Path to the tasks JSON file
        #[arg(long)]
        input: PathBuf,

        /// Reject due dates before this date instead of today
        #[arg(long)]
        today: Option<NaiveDate>,
    },

    /// Print usage guidance and an example payload
    Suggest,

    /// List available weighting strategies
    Strategies,

    /// Show recent recorded analyses
    History {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// Manage ~/.taskrank/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config if none exists
    Init,

    /// Print the effective config
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Analyze {
            input,
            strategy,
            today,
            limit,
            format,
            no_audit,
        } => {
            analyze(&input, strategy.as_deref(), today, limit, format, no_audit).await?;
        }

        Command::Validate { input, today } => {
            validate(&input, today).await?;
        }

        Command::Suggest => {
            println!("{}", serde_json::to_string_pretty(&api::suggest())?);
        }

        Command::Strategies => {
            let cfg = config::load_config()?;
            println!("{:<16} {:>8} {:>10} {:>7} {:>12}", "name", "urgency", "importance", "effort", "dependencies");
            for s in Strategy::ALL {
                let w = s.weights();
                let marker = if s.name() == cfg.analysis.strategy { " (default)" } else { "" };
                println!(
                    "{:<16} {:>8.2} {:>10.2} {:>7.2} {:>12.2}{}",
                    s.name(),
                    w.urgency,
                    w.importance,
                    w.effort,
                    w.dependencies,
                    marker
                );
            }
        }

        Command::History { limit } => {
            let records = state::read_records(limit).await?;
            if records.is_empty() {
                println!("No recorded analyses ({}).", state::history_path()?.display());
            }
            for r in &records {
                let count = r.tasks_data.as_array().map(|a| a.len()).unwrap_or(0);
                let top = r.analysis_results[0]["title"].as_str().unwrap_or("-");
                println!(
                    "{} | {} | {} tasks | top: {}",
                    r.created_at.format("%Y-%m-%d %H:%M:%S"),
                    r.strategy_used,
                    count,
                    top
                );
            }
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => config::show_config()?,
        },
    }

    Ok(())
}

async fn analyze(
    input: &Path,
    strategy: Option<&str>,
    today: Option<NaiveDate>,
    limit: Option<usize>,
    format: Option<OutputFormat>,
    no_audit: bool,
) -> Result<()> {
    let cfg = config::load_config()?;
    let payload = build_payload(read_json(input).await?, strategy, &cfg.analysis.strategy)?;
    let clock = cfg.clock(today)?;

    let resp = match api::analyze(&payload, &clock) {
        Ok(resp) => resp,
        Err(err) => {
            println!("{}", serde_json::to_string_pretty(&err.body())?);
            bail!("analysis rejected (status {}): {}", err.status_code(), err);
        }
    };

    if cfg.audit.enabled && !no_audit {
        let record = AnalysisRecord::new(&payload, &resp, Utc::now())?;
        let path = state::append_record(&record).await?;
        tracing::info!(path = %path.display(), "recorded analysis");
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    output::render(
        &resp,
        format.unwrap_or(cfg.output.format),
        limit.or(cfg.output.limit),
        &mut out,
    )
}

async fn validate(input: &Path, today: Option<NaiveDate>) -> Result<()> {
    let cfg = config::load_config()?;
    let clock = cfg.clock(today)?;

    let mut raw = read_json(input).await?;
    // Accept the analyze payload shape too.
    if let Some(tasks) = raw.get_mut("tasks") {
        raw = tasks.take();
    }

    let report = api::validate(&raw, &clock);
    println!("{}", serde_json::to_string_pretty(&report)?);
    if !report.valid {
        bail!("validation failed");
    }
    Ok(())
}

async fn read_json(path: &Path) -> Result<Value> {
    if !path.exists() {
        bail!("input not found: {}", path.display());
    }
    let s = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&s).with_context(|| format!("parse {}", path.display()))
}

/// Normalize file contents into an analyze payload. `--strategy` wins over the
/// file, the file wins over config.
fn build_payload(raw: Value, flag: Option<&str>, default_strategy: &str) -> Result<Value> {
    match raw {
        Value::Array(tasks) => Ok(json!({
            "tasks": tasks,
            "strategy": flag.unwrap_or(default_strategy),
        })),
        Value::Object(mut obj) => {
            if let Some(s) = flag {
                obj.insert("strategy".to_string(), json!(s));
            } else if !obj.contains_key("strategy") {
                obj.insert("strategy".to_string(), json!(default_strategy));
            }
            Ok(Value::Object(obj))
        }
        _ => bail!("expected a JSON array of tasks or an object with a `tasks` array"),
    }
}
