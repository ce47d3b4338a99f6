use k8s::openapi::Resource as _;
use kube::runtime::controller::Action;
use kube::ResourceExt as _;
use tracing::debug;
use tracing::info;
use tracing::warn;

use super::*;

use clock::Deadline;

const CONFLICT_RETRY: Duration = Duration::from_secs(1);

/// Shared state handed to every reconciliation pass
pub struct Context {
    cluster: Arc<dyn ClusterApi>,
    watchdog: Arc<dyn Watchdog>,
    config: RemediationConfig,
    host_machine: Option<String>,
}

impl Context {
    pub fn new(
        cluster: Arc<dyn ClusterApi>,
        watchdog: Arc<dyn Watchdog>,
        config: RemediationConfig,
    ) -> Self {
        Self {
            cluster,
            watchdog,
            config,
            host_machine: None,
        }
    }

    /// Only passes over `machine` feed the watchdog.
    ///
    /// The watchdog reboots the local host, so a healthy sibling machine must
    /// never keep it fed while the host's own machine is being remediated.
    pub fn for_host_machine(self, machine: impl ToString) -> Self {
        Self {
            host_machine: Some(machine.to_string()),
            ..self
        }
    }

    fn backs_this_host(&self, machine: &str) -> bool {
        self.host_machine
            .as_deref()
            .is_none_or(|host| host == machine)
    }

    pub fn config(&self) -> &RemediationConfig {
        &self.config
    }

    pub fn watchdog(&self) -> &Arc<dyn Watchdog> {
        &self.watchdog
    }

    /// Run one remediation pass over the machine `namespace/name` as of `now`.
    ///
    /// Both the machine and its node are read fresh, so a pass can be
    /// repeated at any point without side effects beyond what the current
    /// state calls for. Returns how long to wait before the next pass.
    pub async fn reconcile_machine(
        &self,
        namespace: &str,
        name: &str,
        now: Timestamp,
    ) -> Result<Duration> {
        let machine = self.cluster.get_machine(namespace, name).await?;
        let interval = self.config.reconcile_interval;

        let node = match machine.remediation_marker() {
            None => None,
            Some(marker) => match node_ref(&machine) {
                Ok(node) => self.lookup_node(node).await?,
                Err(err) => {
                    warn!(%err, marker, "Remediation is blocked");
                    return Ok(interval);
                }
            },
        };

        let state = RemediationState::classify(
            machine.remediation_marker(),
            node.as_ref(),
            self.config.safe_time_to_assume_node_rebooted,
            now,
        );
        debug!(machine = name, ?state, "Classified machine");

        match state.step(interval) {
            Step::FeedWatchdog => {
                if self.backs_this_host(name) {
                    self.watchdog.feed();
                }
                Ok(interval)
            }
            Step::CordonAndMark => self.cordon_and_mark(machine, node, now).await,
            Step::Requeue(delay) => {
                if state == (RemediationState::Waiting { remaining: None }) {
                    warn!(
                        machine = name,
                        marker = machine.remediation_marker(),
                        "Remediation marker is not an RFC3339 timestamp, waiting for it to be fixed"
                    );
                }
                Ok(delay)
            }
            Step::DeleteNode => {
                if let Some(node) = node {
                    self.delete_stale_node(name, node).await?;
                }
                Ok(interval)
            }
            Step::ClearAnnotations => {
                self.finish_remediation(machine).await?;
                Ok(interval)
            }
        }
    }

    async fn lookup_node(&self, name: &str) -> Result<Option<corev1::Node>> {
        match self.cluster.get_node(name).await {
            Ok(node) => Ok(Some(node)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Cordon the node and record when remediation started.
    ///
    /// The marker and the backup land on the machine in a single update, so
    /// either both exist or the next pass starts over. An already cordoned
    /// node is not written again.
    async fn cordon_and_mark(
        &self,
        mut machine: machinev1::Machine,
        node: Option<corev1::Node>,
        now: Timestamp,
    ) -> Result<Duration> {
        let machine_name = machine.name_any();
        let Some(mut node) = node else {
            let node_name = node_ref(&machine)?;
            return Err(Error::not_found::<corev1::Node>(node_name));
        };
        let node_name = node.name_any();

        if node.cordon() {
            info!(machine = %machine_name, node = %node_name, "Cordoning node");
            node = self.cluster.replace_node(&node).await?;
        }

        let backup = snapshot::serialize(&node)?;
        let marker = clock::format_marker(now);
        machine.mark_remediation_started(&marker, backup);
        self.cluster.replace_machine(&machine).await?;

        info!(
            machine = %machine_name,
            node = %node_name,
            %marker,
            "Remediation started, watchdog is no longer fed"
        );

        let safe = self.config.safe_time_to_assume_node_rebooted;
        Ok(clock::requeue_after(
            Deadline::Pending(safe),
            self.config.reconcile_interval,
        ))
    }

    async fn delete_stale_node(&self, machine: &str, node: corev1::Node) -> Result<()> {
        let node_name = node.name_any();
        match self.cluster.delete_node(&node_name, node.metadata.uid).await {
            Ok(()) => {
                info!(machine, node = %node_name, "Safety window elapsed, deleted stale node");
                Ok(())
            }
            Err(err) if err.is_not_found() => {
                debug!(machine, node = %node_name, "Node already gone");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    async fn finish_remediation(&self, mut machine: machinev1::Machine) -> Result<()> {
        machine.clear_remediation();
        self.cluster.replace_machine(&machine).await?;
        info!(
            machine = %machine.name_any(),
            node = machine.node_name(),
            "Node registered again, remediation complete"
        );
        Ok(())
    }
}

fn node_ref(machine: &machinev1::Machine) -> Result<&str> {
    machine
        .node_name()
        .ok_or_else(|| Error::MissingNodeRef(machine.name_any()))
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("cluster", &"<dyn ClusterApi>")
            .field("watchdog", &self.watchdog)
            .field("config", &self.config)
            .field("host_machine", &self.host_machine)
            .finish()
    }
}

/// Entry point for `kube::runtime::Controller`
pub async fn reconcile(machine: Arc<machinev1::Machine>, ctx: Arc<Context>) -> Result<Action> {
    let name = machine.name_any();
    let namespace = machine.namespace().unwrap_or_default();

    match ctx.reconcile_machine(&namespace, &name, Timestamp::now()).await {
        Ok(delay) => Ok(Action::requeue(delay)),
        Err(Error::NotFound { kind, .. }) if kind == machinev1::Machine::KIND => {
            debug!(machine = %name, "Machine is gone");
            Ok(Action::await_change())
        }
        Err(err) => Err(err),
    }
}

pub fn error_policy(machine: Arc<machinev1::Machine>, error: &Error, ctx: Arc<Context>) -> Action {
    let delay = if error.is_conflict() {
        CONFLICT_RETRY
    } else {
        ctx.config.error_backoff
    };
    warn!(machine = %machine.name_any(), %error, ?delay, "Remediation pass failed");
    Action::requeue(delay)
}
