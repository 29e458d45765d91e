//! Metric samples and the line parser that produces them.

use crate::error::FormatError;
use crate::schema::LabelSchema;

/// One parsed script output line.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    labels: Vec<String>,
    value: f64,
}

impl Sample {
    /// Label values, in schema order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Pair each label value with its schema name.
    pub fn labeled<'a>(&'a self, schema: &'a LabelSchema) -> impl Iterator<Item = (&'a str, &'a str)> {
        schema
            .names()
            .iter()
            .map(String::as_str)
            .zip(self.labels.iter().map(String::as_str))
    }

    pub fn into_parts(self) -> (Vec<String>, f64) {
        (self.labels, self.value)
    }
}

/// Parse a single `label,...,label,value` line against `schema`.
///
/// The line must split into exactly `schema.arity()` comma-separated
/// fields. Every field is trimmed; the last one must parse as `f64`.
pub fn parse_line(line: &str, schema: &LabelSchema) -> Result<Sample, FormatError> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() != schema.arity() {
        return Err(FormatError::FieldCount {
            expected: schema.arity(),
            found: fields.len(),
        });
    }

    let (raw_value, labels) = fields
        .split_last()
        .ok_or(FormatError::FieldCount {
            expected: schema.arity(),
            found: 0,
        })?;

    let value = raw_value
        .parse::<f64>()
        .map_err(|source| FormatError::InvalidValue {
            value: raw_value.to_string(),
            source,
        })?;

    Ok(Sample {
        labels: labels.iter().map(|s| s.to_string()).collect(),
        value,
    })
}
