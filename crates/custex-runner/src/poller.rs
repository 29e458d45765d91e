//! Polling loop — runs the sample source on a fixed cadence.
//!
//! Two states: `Running` after a successful cycle (next cycle after the
//! poll interval) and `BackingOff` after a failure (next cycle after the
//! fixed backoff). There is no failure limit; the loop only stops when
//! the shutdown channel fires.

use std::time::Duration;

use tokio::sync::watch;
use tracing::{error, info};

use custex_metrics::Publisher;

use crate::script::SampleSource;

/// Delay before retrying a failed cycle.
pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    /// Last cycle succeeded (or none has run yet).
    Running,
    /// Last cycle failed; the published set still holds older values.
    BackingOff,
}

/// Drives a `SampleSource` into a `Publisher`.
pub struct Poller<S> {
    source: S,
    publisher: Publisher,
    interval: Duration,
    backoff: Duration,
    state: PollState,
}

impl<S: SampleSource> Poller<S> {
    pub fn new(source: S, publisher: Publisher, interval: Duration) -> Self {
        Self {
            source,
            publisher,
            interval,
            backoff: DEFAULT_BACKOFF,
            state: PollState::Running,
        }
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn state(&self) -> PollState {
        self.state
    }

    /// Run a single cycle and return how long to wait before the next one.
    pub async fn step(&mut self) -> Duration {
        match self.source.collect().await {
            Ok(samples) => {
                let count = samples.len();
                let generation = self.publisher.publish(samples).await;
                if self.state == PollState::BackingOff {
                    info!("script recovered");
                }
                self.state = PollState::Running;
                info!(samples = count, generation, "metrics updated successfully");
                self.interval
            }
            Err(e) => {
                // Published values are left as they are.
                self.state = PollState::BackingOff;
                error!(error = %e, retry_in_secs = self.backoff.as_secs_f64(), "script cycle failed");
                self.backoff
            }
        }
    }

    /// Run cycles until shutdown.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!(
            interval_secs = self.interval.as_secs(),
            backoff_secs = self.backoff.as_secs(),
            "poller started"
        );

        loop {
            let delay = tokio::select! {
                delay = self.step() => delay,
                _ = shutdown.changed() => break,
            };

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = shutdown.changed() => break,
            }
        }

        info!("poller shutting down");
    }
}
