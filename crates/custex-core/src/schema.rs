//! Label schema and gauge family description.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::ConfigError;

static LABEL_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*$").expect("static regex"));

static METRIC_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z_:][a-zA-Z0-9_:]*$").expect("static regex"));

/// Labels used by the classic process-monitoring scripts.
pub const DEFAULT_LABELS: [&str; 6] = [
    "component",
    "process_name",
    "application_name",
    "env",
    "domain_name",
    "mon_type",
];

/// Labels used by service-inventory scripts.
pub const SERVICE_LABELS: [&str; 5] = ["system", "subsystem", "name", "service", "component"];

/// Ordered set of label names a script line is parsed against.
///
/// A line carries one field per label followed by the numeric value, so
/// the expected field count is `len() + 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelSchema {
    names: Vec<String>,
}

impl LabelSchema {
    /// Build a schema, validating every label name.
    pub fn new<I, S>(names: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(ConfigError::EmptySchema);
        }

        let mut seen = HashSet::new();
        for name in &names {
            if !LABEL_NAME.is_match(name) || name.starts_with("__") {
                return Err(ConfigError::InvalidLabel(name.clone()));
            }
            if !seen.insert(name.as_str()) {
                return Err(ConfigError::DuplicateLabel(name.clone()));
            }
        }

        Ok(Self { names })
    }

    /// Look up a built-in schema by name (`default` or `service`).
    pub fn preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "default" => Self::new(DEFAULT_LABELS),
            "service" => Self::new(SERVICE_LABELS),
            other => Err(ConfigError::UnknownPreset(other.to_string())),
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Number of comma-separated fields a valid line must have.
    pub fn arity(&self) -> usize {
        self.names.len() + 1
    }
}

impl Default for LabelSchema {
    fn default() -> Self {
        Self {
            names: DEFAULT_LABELS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Description of the single gauge family the exporter publishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricFamily {
    name: String,
    help: String,
    schema: LabelSchema,
}

impl MetricFamily {
    /// Build a family from its name parts.
    ///
    /// Empty `namespace` / `subsystem` parts are skipped when joining.
    pub fn new(
        namespace: &str,
        subsystem: &str,
        name: &str,
        help: &str,
        schema: LabelSchema,
    ) -> Result<Self, ConfigError> {
        let full = [namespace, subsystem, name]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("_");

        if name.is_empty() || !METRIC_NAME.is_match(&full) {
            return Err(ConfigError::InvalidMetricName(full));
        }

        Ok(Self {
            name: full,
            help: help.to_string(),
            schema,
        })
    }

    /// Fully-qualified metric name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn help(&self) -> &str {
        &self.help
    }

    pub fn schema(&self) -> &LabelSchema {
        &self.schema
    }
}

impl Default for MetricFamily {
    fn default() -> Self {
        Self {
            name: "prom_custom_custom_metrics".to_string(),
            help: "Custom metrics from script execution".to_string(),
            schema: LabelSchema::default(),
        }
    }
}
