//! custex-core — shared types for the custom script exporter.
//!
//! Defines the label schema a script's output is parsed against, the
//! `Sample` produced for each output line, and the optional TOML config
//! file that customises the exported gauge family.
//!
//! # Line format
//!
//! ```text
//! <label_1>, <label_2>, ..., <label_n>, <value>
//! ```
//!
//! Exactly `n + 1` comma-separated fields, whitespace-trimmed, the last
//! one parsed as `f64`.

pub mod config;
pub mod error;
pub mod sample;
pub mod schema;

pub use config::{ExporterConfig, MetricConfig, RunnerConfig};
pub use error::{ConfigError, FormatError};
pub use sample::{Sample, parse_line};
pub use schema::{LabelSchema, MetricFamily};
