//! custexd — the custom script exporter daemon.
//!
//! Assembles the exporter:
//! - Label schema + gauge family (from the optional config file)
//! - Script runner + polling loop
//! - Metric publisher
//! - HTTP exposition on `0.0.0.0:<port>`
//!
//! # Usage
//!
//! ```text
//! custom-exporter -script /opt/checks/app.sh -port 9101 -timeout 30
//! ```

pub mod cli;
pub mod exporter;

pub use cli::Cli;
pub use exporter::Exporter;
