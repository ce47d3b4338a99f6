//! Cluster API operations the reconciler relies on.

use async_trait::async_trait;
use node_remedy_kubeapi::KubeApi;

#[cfg(test)]
use mockall::automock;

use super::*;

/// Read-modify-write access to machines and nodes
///
/// Replaces carry the `resourceVersion` of the object they were derived from
/// and fail with [`Error::Conflict`] if someone else wrote in between.
/// Lookups of objects that do not exist fail with [`Error::NotFound`].
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ClusterApi: Send + Sync {
    async fn get_machine(&self, namespace: &str, name: &str) -> Result<machinev1::Machine>;

    async fn replace_machine(&self, machine: &machinev1::Machine) -> Result<machinev1::Machine>;

    async fn get_node(&self, name: &str) -> Result<corev1::Node>;

    async fn replace_node(&self, node: &corev1::Node) -> Result<corev1::Node>;

    /// Delete the node, but only if its uid still matches `uid` when one is given
    async fn delete_node(&self, name: &str, uid: Option<String>) -> Result<()>;
}

#[async_trait]
impl ClusterApi for KubeApi {
    async fn get_machine(&self, namespace: &str, name: &str) -> Result<machinev1::Machine> {
        Self::get_machine(self, namespace, name)
            .await
            .map_err(|err| Error::from_kube::<machinev1::Machine>(name, err))
    }

    async fn replace_machine(&self, machine: &machinev1::Machine) -> Result<machinev1::Machine> {
        let name = machine.metadata.name.as_deref().unwrap_or_default();
        Self::replace_machine(self, machine)
            .await
            .map_err(|err| Error::from_kube::<machinev1::Machine>(name, err))
    }

    async fn get_node(&self, name: &str) -> Result<corev1::Node> {
        Self::get_node(self, name)
            .await
            .map_err(|err| Error::from_kube::<corev1::Node>(name, err))
    }

    async fn replace_node(&self, node: &corev1::Node) -> Result<corev1::Node> {
        let name = node.metadata.name.as_deref().unwrap_or_default();
        Self::replace_node(self, node)
            .await
            .map_err(|err| Error::from_kube::<corev1::Node>(name, err))
    }

    async fn delete_node(&self, name: &str, uid: Option<String>) -> Result<()> {
        Self::delete_node(self, name, uid)
            .await
            .map_err(|err| Error::from_kube::<corev1::Node>(name, err))
    }
}
