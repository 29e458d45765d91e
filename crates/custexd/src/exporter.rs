//! Wiring: config → publisher + poller → HTTP server.

use std::future::Future;
use std::net::SocketAddr;

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use custex_core::ExporterConfig;
use custex_metrics::Publisher;
use custex_runner::{Poller, ScriptRunner};

use crate::cli::Cli;

/// A fully assembled exporter, ready to serve.
pub struct Exporter {
    pub publisher: Publisher,
    pub poller: Poller<ScriptRunner>,
    port: u16,
}

impl Exporter {
    /// Build from parsed arguments, loading the config file if one was given.
    pub fn from_cli(cli: &Cli) -> anyhow::Result<Self> {
        let config = match &cli.config {
            Some(path) => ExporterConfig::from_file(path)
                .with_context(|| format!("invalid config file {}", path.display()))?,
            None => ExporterConfig::default(),
        };
        Self::new(cli, &config)
    }

    pub fn new(cli: &Cli, config: &ExporterConfig) -> anyhow::Result<Self> {
        let family = config.family().context("invalid metric configuration")?;
        info!(
            metric = %family.name(),
            labels = ?family.schema().names(),
            "gauge family registered"
        );

        let runner = ScriptRunner::new(&cli.script, family.schema().clone())
            .with_timeout(config.runner.script_timeout());
        let publisher = Publisher::new(family);
        let poller = Poller::new(runner, publisher.clone(), cli.interval())
            .with_backoff(config.runner.backoff());

        Ok(Self {
            publisher,
            poller,
            port: cli.port,
        })
    }

    /// Listen address (all interfaces).
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }

    pub fn router(&self) -> Router {
        custex_api::build_router(self.publisher.clone())
    }

    /// Run the poller in the background and serve HTTP until `shutdown` resolves.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let router = self.router();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let poller_handle = tokio::spawn(self.poller.run(shutdown_rx));

        info!(addr = %listener.local_addr()?, "metrics server starting");

        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                shutdown.await;
                info!("shutdown signal received");
                let _ = shutdown_tx.send(true);
            })
            .await?;

        join_poller(poller_handle).await
    }
}

/// Wait for the poller task, surfacing a panic or cancellation.
async fn join_poller(handle: JoinHandle<()>) -> anyhow::Result<()> {
    handle.await.map_err(|e| {
        error!(error = %e, "poller task did not exit cleanly");
        anyhow::anyhow!("poller task failed: {e}")
    })
}
