//! custex-runner — drives the external script and publishes its output.
//!
//! # Architecture
//!
//! ```text
//! Poller (Running ⇄ BackingOff)
//!   ├── SampleSource::collect() ← ScriptRunner spawns the script once per cycle
//!   │     └── parse_line() per stdout line, all-or-nothing
//!   └── Publisher::publish() on success
//! ```
//!
//! A failed cycle never touches the published set: the last good values
//! stay visible until the script succeeds again.

pub mod error;
pub mod poller;
pub mod script;

pub use error::{RunError, RunResult};
pub use poller::{DEFAULT_BACKOFF, PollState, Poller};
pub use script::{SampleSource, ScriptRunner};
