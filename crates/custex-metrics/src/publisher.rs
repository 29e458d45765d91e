//! Metric publisher — owns the current set of label tuples → values.
//!
//! Each publish builds a complete `MetricSet` before taking the write
//! lock, so the lock only guards a pointer swap. Readers hold an
//! `Arc<MetricSet>` and never see a half-built set.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::SystemTime;

use tokio::sync::RwLock;
use tracing::debug;

use custex_core::{MetricFamily, Sample};

/// An immutable generation of published gauge values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricSet {
    /// Number of successful publishes this set reflects (0 = never published).
    generation: u64,
    /// When this generation was published.
    published_at: Option<SystemTime>,
    /// Label values (schema order) → gauge value.
    series: BTreeMap<Vec<String>, f64>,
}

impl MetricSet {
    fn from_samples(generation: u64, samples: Vec<Sample>) -> Self {
        let mut series = BTreeMap::new();
        for sample in samples {
            let (labels, value) = sample.into_parts();
            // Repeated label tuples behave like repeated gauge sets.
            series.insert(labels, value);
        }
        Self {
            generation,
            published_at: Some(SystemTime::now()),
            series,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn published_at(&self) -> Option<SystemTime> {
        self.published_at
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Value published for an exact label tuple.
    pub fn get<S: AsRef<str>>(&self, labels: &[S]) -> Option<f64> {
        let key: Vec<String> = labels.iter().map(|s| s.as_ref().to_string()).collect();
        self.series.get(&key).copied()
    }

    /// Iterate series in label order.
    pub fn iter(&self) -> impl Iterator<Item = (&[String], f64)> {
        self.series.iter().map(|(labels, value)| (labels.as_slice(), *value))
    }
}

/// The registered gauge family plus its current published set.
///
/// Cheap to clone; clones share the same set.
#[derive(Clone)]
pub struct Publisher {
    family: Arc<MetricFamily>,
    current: Arc<RwLock<Arc<MetricSet>>>,
}

impl Publisher {
    /// Register a gauge family with an empty published set.
    pub fn new(family: MetricFamily) -> Self {
        Self {
            family: Arc::new(family),
            current: Arc::new(RwLock::new(Arc::new(MetricSet::default()))),
        }
    }

    pub fn family(&self) -> &MetricFamily {
        &self.family
    }

    /// Replace every published label tuple with `samples`.
    ///
    /// Returns the new generation number.
    pub async fn publish(&self, samples: Vec<Sample>) -> u64 {
        let count = samples.len();
        let mut next = MetricSet::from_samples(0, samples);

        let mut current = self.current.write().await;
        next.generation = current.generation + 1;
        let generation = next.generation;
        *current = Arc::new(next);
        drop(current);

        debug!(generation, samples = count, metric = %self.family.name(), "metric set published");
        generation
    }

    /// The currently published set.
    pub async fn snapshot(&self) -> Arc<MetricSet> {
        self.current.read().await.clone()
    }

    /// Render the current set in Prometheus text format.
    pub async fn render(&self) -> String {
        let snapshot = self.snapshot().await;
        crate::prometheus::render_prometheus(&self.family, &snapshot)
    }
}
