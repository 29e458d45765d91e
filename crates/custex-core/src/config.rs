//! Optional TOML config file for the exporter.
//!
//! ```toml
//! [metric]
//! namespace = "prom"
//! subsystem = "custom"
//! name = "custom_metrics"
//! help = "Custom metrics from script execution"
//! labels = ["system", "subsystem", "name", "service", "component"]
//!
//! [runner]
//! backoff_secs = 5
//! script_timeout_secs = 30
//! ```
//!
//! Every key is optional. `labels` and `preset` are mutually exclusive.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::schema::{LabelSchema, MetricFamily};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExporterConfig {
    #[serde(default)]
    pub metric: MetricConfig,
    #[serde(default)]
    pub runner: RunnerConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricConfig {
    #[serde(default = "default_namespace")]
    pub namespace: String,
    #[serde(default = "default_subsystem")]
    pub subsystem: String,
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_help")]
    pub help: String,
    pub labels: Option<Vec<String>>,
    pub preset: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunnerConfig {
    /// Delay before retrying after a failed cycle.
    #[serde(default = "default_backoff_secs")]
    pub backoff_secs: u64,
    /// Kill the script if a single run takes longer than this.
    pub script_timeout_secs: Option<u64>,
}

impl Default for MetricConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            subsystem: default_subsystem(),
            name: default_name(),
            help: default_help(),
            labels: None,
            preset: None,
        }
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            backoff_secs: default_backoff_secs(),
            script_timeout_secs: None,
        }
    }
}

impl ExporterConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: ExporterConfig = toml::from_str(content)?;
        config.runner.validate()?;
        Ok(config)
    }

    /// Build the validated gauge family description.
    pub fn family(&self) -> Result<MetricFamily, ConfigError> {
        self.metric.family()
    }
}

impl MetricConfig {
    pub fn schema(&self) -> Result<LabelSchema, ConfigError> {
        match (&self.labels, &self.preset) {
            (Some(_), Some(_)) => Err(ConfigError::ConflictingSchema),
            (Some(labels), None) => LabelSchema::new(labels.iter().cloned()),
            (None, Some(preset)) => LabelSchema::preset(preset),
            (None, None) => Ok(LabelSchema::default()),
        }
    }

    pub fn family(&self) -> Result<MetricFamily, ConfigError> {
        MetricFamily::new(
            &self.namespace,
            &self.subsystem,
            &self.name,
            &self.help,
            self.schema()?,
        )
    }
}

impl RunnerConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.backoff_secs == 0 {
            return Err(ConfigError::ZeroDuration("runner.backoff_secs"));
        }
        if self.script_timeout_secs == Some(0) {
            return Err(ConfigError::ZeroDuration("runner.script_timeout_secs"));
        }
        Ok(())
    }

    pub fn backoff(&self) -> Duration {
        Duration::from_secs(self.backoff_secs)
    }

    pub fn script_timeout(&self) -> Option<Duration> {
        self.script_timeout_secs.map(Duration::from_secs)
    }
}

fn default_namespace() -> String {
    "prom".to_string()
}

fn default_subsystem() -> String {
    "custom".to_string()
}

fn default_name() -> String {
    "custom_metrics".to_string()
}

fn default_help() -> String {
    "Custom metrics from script execution".to_string()
}

fn default_backoff_secs() -> u64 {
    5
}
