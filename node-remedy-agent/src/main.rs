use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use futures::StreamExt as _;
use kube::runtime::watcher;
use kube::runtime::Controller;
use node_remedy_controller as remedy;
use node_remedy_kubeapi::KubeApi;
use tracing_subscriber::EnvFilter;

use remedy::DeviceWatchdog;
use remedy::RemediationConfig;
use remedy::SoftWatchdog;
use remedy::Watchdog;

mod health;

/// Cordons machines flagged for remediation and lets the host watchdog reboot them
#[derive(Debug, Parser)]
#[command(name = "node-remedy-agent", version)]
struct Cli {
    /// Namespace holding the Machine objects.
    #[arg(long, env = "NAMESPACE", default_value = "openshift-machine-api")]
    namespace: String,

    /// Only reconcile this machine, normally the one backing the local host.
    #[arg(long, env = "MACHINE_NAME")]
    machine_name: Option<String>,

    /// Watchdog device to feed, e.g. /dev/watchdog. Without it feeding is only tracked in memory.
    /// Requires --machine-name, since only the machine backing this host may feed it.
    #[arg(long, env = "WATCHDOG_DEVICE", requires = "machine_name")]
    watchdog_device: Option<PathBuf>,

    /// How long after cordoning the node is assumed to have been rebooted by the watchdog.
    #[arg(
        long,
        env = "SAFE_TIME_TO_ASSUME_NODE_REBOOTED",
        default_value = "90s",
        value_parser = remedy::parse_duration
    )]
    safe_time_to_assume_node_rebooted: Duration,

    /// Longest delay between two passes over a machine.
    #[arg(
        long,
        env = "RECONCILE_INTERVAL",
        default_value = "10s",
        value_parser = remedy::parse_duration
    )]
    reconcile_interval: Duration,

    /// Delay before retrying a failed pass.
    #[arg(
        long,
        env = "ERROR_BACKOFF",
        default_value = "30s",
        value_parser = remedy::parse_duration
    )]
    error_backoff: Duration,

    /// Address of the health endpoint.
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:8080")]
    listen: SocketAddr,
}

impl Cli {
    fn config(&self) -> RemediationConfig {
        RemediationConfig {
            safe_time_to_assume_node_rebooted: self.safe_time_to_assume_node_rebooted,
            reconcile_interval: self.reconcile_interval,
            error_backoff: self.error_backoff,
        }
    }

    fn watchdog(&self) -> io::Result<Arc<dyn Watchdog>> {
        match &self.watchdog_device {
            Some(path) => Ok(Arc::new(DeviceWatchdog::open(path)?)),
            None => {
                tracing::warn!("No watchdog device configured, feeding is only tracked in memory");
                Ok(Arc::new(SoftWatchdog::new()))
            }
        }
    }

    fn context(&self, api: KubeApi, watchdog: Arc<dyn Watchdog>) -> remedy::Context {
        let ctx = remedy::Context::new(Arc::new(api), watchdog, self.config());
        match &self.machine_name {
            Some(name) => ctx.for_host_machine(name),
            None => ctx,
        }
    }

    fn watcher_config(&self) -> watcher::Config {
        let config = watcher::Config::default();
        match &self.machine_name {
            Some(name) => config.fields(&format!("metadata.name={name}")),
            None => config,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    tracing::info!(?cli, "Starting node-remedy-agent");

    let watchdog = cli.watchdog()?;
    let api = KubeApi::new().await?;
    let machines = api.machines(&cli.namespace);
    let ctx = Arc::new(cli.context(api, Arc::clone(&watchdog)));

    let listener = tokio::net::TcpListener::bind(cli.listen).await?;
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("Listening on http://{addr}");
    }
    let server = tokio::spawn(async move {
        if let Err(err) = axum::serve(listener, health::router(watchdog)).await {
            tracing::error!(%err, "Health endpoint failed");
        }
    });

    Controller::new(machines, cli.watcher_config())
        .shutdown_on_signal()
        .run(remedy::reconcile, remedy::error_policy, ctx)
        .for_each(|result| async move {
            match result {
                Ok((machine, action)) => {
                    tracing::debug!(machine = %machine.name, ?action, "Reconciled");
                }
                Err(err) => tracing::warn!(%err, "Reconcile failed"),
            }
        })
        .await;

    server.abort();
    tracing::info!("Controller shut down");

    Ok(())
}
