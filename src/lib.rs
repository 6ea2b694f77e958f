pub mod certs;
pub mod cluster;
pub mod config;
pub mod error;
pub mod models;
pub mod publisher;
pub mod refresh;
pub mod server;

use std::future::Future;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing_subscriber::EnvFilter;

use crate::cluster::{build_client, KubeDirectory};
use crate::config::Config;
use crate::publisher::StatusPublisher;
use crate::refresh::RefreshLoop;

/// Installs the log backend. `log` records from every module are forwarded
/// to the tracing subscriber; `RUST_LOG` overrides the default `info` level.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Connects to the cluster, starts the refresh loop in the background and
/// serves the status endpoint until shutdown.
pub async fn run(config: Config) -> anyhow::Result<()> {
    config.validate();

    let client = build_client(config.kubeconfig.as_deref(), config.context.as_deref())
        .await
        .context("error connecting to kubernetes")?;
    let directory = Arc::new(KubeDirectory::new(client, config.source));

    let publisher = Arc::new(StatusPublisher::new());
    let refresh = RefreshLoop::new(
        directory,
        Arc::clone(&publisher),
        config.thresholds(),
        config.update_interval(),
        config.request_timeout(),
    );
    let refresh_task = tokio::spawn(refresh.run());

    let addr = config.listen_addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind status endpoint on {addr}"))?;
    log::info!("server: listening on {addr}");

    supervise(refresh_task, server::serve(listener, publisher)).await
}

/// Waits for the status endpoint while watching the refresh task. The
/// endpoint must not outlive the loop that feeds it.
async fn supervise(
    mut refresh_task: JoinHandle<()>,
    server: impl Future<Output = std::io::Result<()>>,
) -> anyhow::Result<()> {
    tokio::select! {
        result = server => {
            refresh_task.abort();
            result.context("status endpoint failed")
        }
        joined = &mut refresh_task => match joined {
            Ok(()) => Err(anyhow!("refresh loop stopped")),
            Err(e) => Err(anyhow::Error::new(e).context("refresh loop failed")),
        },
    }
}
