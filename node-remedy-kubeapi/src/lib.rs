use std::fmt::Debug;

use kube::api;
use node_remedy_ext as k8s;

use k8s::corev1;
use k8s::default;
use k8s::machinev1;

pub struct KubeApi {
    post_params: api::PostParams,
    client: kube::Client,
}

impl KubeApi {
    /// Create a KubeApi configured with a default Kubernetes client.
    ///
    /// On success, returns an initialized `KubeApi` wrapped in `kube::Result`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # async fn run() -> Result<(), kube::Error> {
    /// let api = node_remedy_kubeapi::KubeApi::new().await?;
    /// // use `api`...
    /// # Ok(())
    /// # }
    /// ```
    pub async fn new() -> kube::Result<Self> {
        kube::Client::try_default().await.map(Self::with_client)
    }

    /// Create a KubeApi backed by the provided Kubernetes client.
    ///
    /// Updates are sent with default `PostParams`, so the `resourceVersion`
    /// carried by the object decides whether the write wins.
    pub fn with_client(client: kube::Client) -> Self {
        Self {
            post_params: api::PostParams::default(),
            client,
        }
    }

    /// Fetches the `Machine` called `name` in `namespace`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # async fn example() -> kube::Result<()> {
    /// let api = node_remedy_kubeapi::KubeApi::new().await?;
    /// let machine = api.get_machine("openshift-machine-api", "worker-0").await?;
    /// println!("{:?}", machine.node_name());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn get_machine(
        &self,
        namespace: &str,
        name: &str,
    ) -> kube::Result<machinev1::Machine> {
        self.machines(namespace).get(name).await
    }

    /// Replaces a `Machine` with `machine`.
    ///
    /// The write is rejected with `409 Conflict` when the stored object has moved
    /// past the `resourceVersion` carried by `machine`.
    pub async fn replace_machine(
        &self,
        machine: &machinev1::Machine,
    ) -> kube::Result<machinev1::Machine> {
        let name = machine.metadata.name.as_deref().unwrap_or_default();
        let namespace = machine.metadata.namespace.as_deref().unwrap_or_default();
        tracing::debug!(name, namespace, "Replacing machine");
        self.machines(namespace)
            .replace(name, &self.post_params, machine)
            .await
    }

    /// Fetches the `Node` called `name`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # async fn example() -> kube::Result<()> {
    /// let api = node_remedy_kubeapi::KubeApi::new().await?;
    /// let node = api.get_node("node1").await?;
    /// println!("{:?}", node.metadata.creation_timestamp);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn get_node(&self, name: &str) -> kube::Result<corev1::Node> {
        self.nodes().get(name).await
    }

    /// Replaces a `Node` with `node`, subject to the same optimistic
    /// concurrency check as [`KubeApi::replace_machine`].
    pub async fn replace_node(&self, node: &corev1::Node) -> kube::Result<corev1::Node> {
        let name = node.metadata.name.as_deref().unwrap_or_default();
        tracing::debug!(name, "Replacing node");
        self.nodes().replace(name, &self.post_params, node).await
    }

    /// Deletes the `Node` called `name`.
    ///
    /// When `uid` is given it is sent as a delete precondition, so a node that
    /// was re-registered under the same name in the meantime is left alone and
    /// the API answers `409 Conflict` instead.
    pub async fn delete_node(&self, name: &str, uid: Option<String>) -> kube::Result<()> {
        let preconditions = uid.map(|uid| api::Preconditions {
            uid: Some(uid),
            resource_version: None,
        });
        let dp = api::DeleteParams {
            preconditions,
            ..default()
        };
        tracing::debug!(name, "Deleting node");
        self.nodes().delete(name, &dp).await.map(drop)
    }

    /// Returns an Api handle scoped to the Machines in `namespace`.
    pub fn machines(&self, namespace: &str) -> api::Api<machinev1::Machine> {
        api::Api::namespaced(self.client.clone(), namespace)
    }

    /// Returns an Api handle scoped to all Nodes using the configured Kubernetes client.
    pub fn nodes(&self) -> api::Api<corev1::Node> {
        api::Api::all(self.client.clone())
    }
}

impl Debug for KubeApi {
    /// Formats the `KubeApi` for debugging, showing `post_params` while redacting the `client`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeApi")
            .field("post_params", &self.post_params)
            .field("client", &"<kube::Client>")
            .finish()
    }
}
