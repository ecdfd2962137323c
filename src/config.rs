//! Environment-driven configuration
//!
//! Values are read from the process environment after `.env` has been loaded.
//! Every key is optional and falls back to a default.

use std::env;

use crate::downsample::DownsampleMethod;

/// ---------------------------------------------------------------------------
/// Configuration Constants
/// ---------------------------------------------------------------------------

const DATABASE_URL_KEY: &str = "BODYLOG_DATABASE_URL";
const MAX_CONNECTIONS_KEY: &str = "BODYLOG_MAX_CONNECTIONS";
const CHART_POINTS_KEY: &str = "BODYLOG_CHART_POINTS";
const DOWNSAMPLE_KEY: &str = "BODYLOG_DOWNSAMPLE";
const LOG_FILTER_KEY: &str = "BODYLOG_LOG";

const DEFAULT_DATABASE_URL: &str = "sqlite://bodylog.db?mode=rwc";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_CHART_POINTS: usize = 13;
const DEFAULT_LOG_FILTER: &str = "info";

/// ---------------------------------------------------------------------------
/// Error Handling
/// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
  #[error("Invalid value for {key}: {value:?} ({reason})")]
  Invalid {
    key: String,
    value: String,
    reason: String,
  },
}

/// ---------------------------------------------------------------------------
/// Chart Settings
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartConfig {
  /// Upper bound on points per chart series
  pub target_points: usize,
  pub method: DownsampleMethod,
}

impl Default for ChartConfig {
  fn default() -> Self {
    Self {
      target_points: DEFAULT_CHART_POINTS,
      method: DownsampleMethod::Simple,
    }
  }
}

/// ---------------------------------------------------------------------------
/// Application Settings
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
  pub database_url: String,
  pub max_connections: u32,
  pub chart: ChartConfig,
  pub log_filter: String,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      database_url: DEFAULT_DATABASE_URL.to_string(),
      max_connections: DEFAULT_MAX_CONNECTIONS,
      chart: ChartConfig::default(),
      log_filter: DEFAULT_LOG_FILTER.to_string(),
    }
  }
}

impl AppConfig {
  pub fn from_env() -> Result<Self, ConfigError> {
    let defaults = Self::default();

    let max_connections = match read_var(MAX_CONNECTIONS_KEY) {
      Some(raw) => raw
        .parse::<u32>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| invalid(MAX_CONNECTIONS_KEY, &raw, "expected a positive integer"))?,
      None => defaults.max_connections,
    };

    let target_points = match read_var(CHART_POINTS_KEY) {
      Some(raw) => raw
        .parse::<usize>()
        .ok()
        .filter(|n| *n > 2)
        .ok_or_else(|| invalid(CHART_POINTS_KEY, &raw, "expected an integer greater than 2"))?,
      None => defaults.chart.target_points,
    };

    let method = match read_var(DOWNSAMPLE_KEY) {
      Some(raw) => raw
        .parse::<DownsampleMethod>()
        .map_err(|e| invalid(DOWNSAMPLE_KEY, &raw, &e))?,
      None => defaults.chart.method,
    };

    Ok(Self {
      database_url: read_var(DATABASE_URL_KEY).unwrap_or(defaults.database_url),
      max_connections,
      chart: ChartConfig {
        target_points,
        method,
      },
      log_filter: read_var(LOG_FILTER_KEY).unwrap_or(defaults.log_filter),
    })
  }
}

/// Blank values count as unset
fn read_var(key: &str) -> Option<String> {
  env::var(key)
    .ok()
    .map(|v| v.trim().to_string())
    .filter(|v| !v.is_empty())
}

fn invalid(key: &str, value: &str, reason: &str) -> ConfigError {
  ConfigError::Invalid {
    key: key.to_string(),
    value: value.to_string(),
    reason: reason.to_string(),
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
