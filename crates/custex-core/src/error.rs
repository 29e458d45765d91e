//! Error types for line parsing and configuration.

use std::num::ParseFloatError;

use thiserror::Error;

/// A script output line that does not match the label schema.
#[derive(Debug, Error, PartialEq)]
pub enum FormatError {
    #[error("wrong field count: expected {expected}, found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("invalid numeric value {value:?}: {source}")]
    InvalidValue {
        value: String,
        #[source]
        source: ParseFloatError,
    },
}

/// Errors raised while building the exporter configuration.
///
/// All of these are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("label schema must contain at least one label")]
    EmptySchema,

    #[error("invalid label name: {0:?}")]
    InvalidLabel(String),

    #[error("duplicate label name: {0:?}")]
    DuplicateLabel(String),

    #[error("invalid metric name: {0:?}")]
    InvalidMetricName(String),

    #[error("unknown label preset: {0:?}")]
    UnknownPreset(String),

    #[error("`labels` and `preset` are mutually exclusive")]
    ConflictingSchema,

    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),

    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}
