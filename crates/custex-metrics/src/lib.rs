//! custex-metrics — the published gauge set.
//!
//! Holds the label tuples produced by the latest successful script run
//! and renders them in the Prometheus text exposition format.
//!
//! # Architecture
//!
//! ```text
//! Publisher
//!   ├── publish() ← called by the poller once per successful cycle
//!   ├── snapshot() → Arc<MetricSet> (immutable, swapped wholesale)
//!   └── render() → text/plain for the /metrics endpoint
//! ```

pub mod prometheus;
pub mod publisher;

pub use prometheus::render_prometheus;
pub use publisher::{MetricSet, Publisher};
