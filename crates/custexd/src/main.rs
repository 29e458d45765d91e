use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use custexd::{Cli, Exporter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse_args();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,custexd=debug,custex=debug")),
        )
        .init();

    info!(script = %cli.script.display(), port = cli.port, interval_secs = cli.timeout, "custom exporter starting");

    if let Err(e) = run(&cli).await {
        error!("custom exporter failed: {e:#}");
        return Err(e);
    }

    info!("custom exporter stopped");
    Ok(())
}

async fn run(cli: &Cli) -> anyhow::Result<()> {
    let exporter = Exporter::from_cli(cli)?;
    let listener = TcpListener::bind(exporter.addr())
        .await
        .with_context(|| format!("failed to bind port {}", cli.port))?;

    exporter.serve(listener, shutdown_signal()).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for ctrl-c; running until killed");
        std::future::pending::<()>().await;
    }
}
