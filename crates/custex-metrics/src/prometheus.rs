//! Prometheus text exposition format.
//!
//! Renders the published gauge set for scraping by a Prometheus server
//! or compatible agent.

use std::fmt::Write;

use custex_core::MetricFamily;

use crate::publisher::MetricSet;

/// Content type for the text exposition format.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Render a metric set into Prometheus text format.
///
/// HELP and TYPE lines are always emitted; an empty set yields no series.
pub fn render_prometheus(family: &MetricFamily, set: &MetricSet) -> String {
    let name = family.name();
    let mut out = String::new();

    let _ = writeln!(out, "# HELP {name} {}", escape_help(family.help()));
    let _ = writeln!(out, "# TYPE {name} gauge");

    for (labels, value) in set.iter() {
        let pairs = family
            .schema()
            .names()
            .iter()
            .zip(labels)
            .map(|(k, v)| format!("{k}=\"{}\"", escape_label_value(v)))
            .collect::<Vec<_>>()
            .join(",");
        let _ = writeln!(out, "{name}{{{pairs}}} {}", format_value(value));
    }

    out
}

fn escape_label_value(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

fn escape_help(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\n', "\\n")
}

fn format_value(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value == f64::INFINITY {
        "+Inf".to_string()
    } else if value == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else {
        value.to_string()
    }
}
