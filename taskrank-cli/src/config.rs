use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use taskrank_core::api::DEFAULT_STRATEGY;
use taskrank_core::{Clock, FixedClock, SystemClock, ZonedClock};

use crate::output::OutputFormat;
use crate::state::ensure_taskrank_home;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub analysis: AnalysisSection,
    pub output: OutputSection,
    pub audit: AuditSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSection {
    /// Strategy used when neither the input file nor `--strategy` names one.
    pub strategy: String,
    /// IANA time zone for "today", e.g. "America/Chicago". Host local time when unset.
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    /// Max rows printed by `analyze` (all when unset).
    pub limit: Option<usize>,
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditSection {
    /// Append each analysis to ~/.taskrank/analyses.jsonl
    pub enabled: bool,
}

impl Default for AnalysisSection {
    fn default() -> Self {
        Self {
            strategy: DEFAULT_STRATEGY.to_string(),
            timezone: None,
        }
    }
}

impl Default for AuditSection {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Config {
    /// Clock for scoring: a pinned date when given, else the configured zone, else host local.
    pub fn clock(&self, today: Option<NaiveDate>) -> Result<Box<dyn Clock>> {
        if let Some(d) = today {
            return Ok(Box::new(FixedClock::at(d.and_time(Local::now().time()))));
        }
        match &self.analysis.timezone {
            Some(tz) => {
                let clock = ZonedClock::new(tz).context("config [analysis].timezone")?;
                Ok(Box::new(clock))
            }
            None => Ok(Box::new(SystemClock)),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_taskrank_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    parse_config(&s)
}

fn parse_config(s: &str) -> Result<Config> {
    toml::from_str(s).context("parse config.toml")
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    let cfg = Config::default();
    save_config(&cfg)?;
    println!("Wrote {}", p.display());
    Ok(())
}

pub fn show_config() -> Result<()> {
    let cfg = load_config()?;
    println!("# {}", config_path()?.display());
    print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
    Ok(())
}
