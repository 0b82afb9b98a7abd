use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use chrono::Local;
use engine_logging::engine_info;
use linkcheck_engine::{EngineConfig, FetchSettings, RetryPolicy};
use serde::{Deserialize, Serialize};

use super::sheet::column_index;
use crate::cli::Cli;

/// Run settings, read from an optional RON file and overridden by the command line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub column: String,
    pub start_row: u32,
    pub end_row: u32,
    pub status_column: String,
    pub delay_secs: f64,
    pub timeout_secs: f64,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
    pub pause_poll_ms: u64,
    pub redirect_limit: usize,
    pub max_body_bytes: usize,
    pub verify_certificates: bool,
    pub log_file: PathBuf,
}

impl Default for AppSettings {
    fn default() -> Self {
        let fetch = FetchSettings::default();
        Self {
            column: "C".to_string(),
            start_row: 2,
            end_row: 100,
            status_column: "Z".to_string(),
            delay_secs: 2.0,
            timeout_secs: fetch.request_timeout.as_secs_f64(),
            max_retries: fetch.retry.max_retries,
            retry_backoff_ms: 1000,
            pause_poll_ms: 500,
            redirect_limit: fetch.redirect_limit,
            max_body_bytes: fetch.max_body_bytes,
            verify_certificates: fetch.verify_certificates,
            log_file: PathBuf::from("linkcheck.log"),
        }
    }
}

impl AppSettings {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading settings from {}", path.display()))?;
        let settings = ron::from_str(&content)
            .with_context(|| format!("parsing settings from {}", path.display()))?;
        engine_info!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    /// Settings file (if any) plus command-line overrides.
    pub fn resolve(cli: &Cli) -> anyhow::Result<Self> {
        let base = match &cli.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        Ok(base.with_cli(cli))
    }

    pub fn with_cli(mut self, cli: &Cli) -> Self {
        if let Some(column) = &cli.column {
            self.column = column.clone();
        }
        if let Some(row) = cli.start_row {
            self.start_row = row;
        }
        if let Some(row) = cli.end_row {
            self.end_row = row;
        }
        if let Some(column) = &cli.status_column {
            self.status_column = column.clone();
        }
        if let Some(delay) = cli.delay {
            self.delay_secs = delay;
        }
        if let Some(timeout) = cli.timeout {
            self.timeout_secs = timeout;
        }
        if let Some(retries) = cli.max_retries {
            self.max_retries = retries;
        }
        if cli.verify_certificates {
            self.verify_certificates = true;
        }
        if let Some(path) = &cli.log_file {
            self.log_file = path.clone();
        }
        self
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        column_index(&self.column).context("URL column")?;
        column_index(&self.status_column).context("status column")?;
        if self.start_row < 1 {
            bail!("start row must be 1 or greater");
        }
        if self.start_row > self.end_row {
            bail!(
                "start row {} is after end row {}",
                self.start_row,
                self.end_row
            );
        }
        seconds(self.delay_secs, "delay")?;
        let timeout = seconds(self.timeout_secs, "timeout")?;
        if timeout.is_zero() {
            bail!("timeout must be greater than zero");
        }
        Ok(())
    }

    pub fn engine_config(&self) -> anyhow::Result<EngineConfig> {
        let timeout = seconds(self.timeout_secs, "timeout")?;
        let fetch = FetchSettings {
            connect_timeout: timeout,
            request_timeout: timeout,
            redirect_limit: self.redirect_limit,
            max_body_bytes: self.max_body_bytes,
            verify_certificates: self.verify_certificates,
            retry: RetryPolicy {
                max_retries: self.max_retries,
                backoff: Duration::from_millis(self.retry_backoff_ms),
            },
            ..FetchSettings::default()
        };
        Ok(EngineConfig {
            request_delay: seconds(self.delay_secs, "delay")?,
            pause_poll_interval: Duration::from_millis(self.pause_poll_ms.max(1)),
            checked_at: Arc::new(|| Local::now().format("%Y-%m-%d %H:%M:%S").to_string()),
            ..EngineConfig::with_fetch(fetch)
        })
    }
}

fn seconds(value: f64, what: &str) -> anyhow::Result<Duration> {
    Duration::try_from_secs_f64(value)
        .with_context(|| format!("{what} must be a non-negative number of seconds, got {value}"))
}
