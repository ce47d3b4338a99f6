//! In-memory cluster with the optimistic concurrency rules of the API server.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::MutexGuard;

use async_trait::async_trait;
use k8s::ObjectMetaExt as _;

use super::*;

#[derive(Debug, Default)]
pub(crate) struct FakeCluster {
    objects: Mutex<Objects>,
}

#[derive(Debug, Default)]
struct Objects {
    machines: BTreeMap<(String, String), machinev1::Machine>,
    nodes: BTreeMap<String, corev1::Node>,
    revision: u64,
    registrations: u64,
    writes: usize,
    machine_conflicts: usize,
    register_before_delete: Option<Timestamp>,
}

impl Objects {
    fn next_revision(&mut self) -> Option<String> {
        self.revision += 1;
        Some(self.revision.to_string())
    }

    fn register_node(&mut self, name: &str, created: Timestamp) {
        self.registrations += 1;
        let mut node = corev1::Node::new(name);
        node.metadata = node.metadata.created(k8s::metav1::Time(created));
        node.metadata.uid = Some(format!("{name}-{}", self.registrations));
        node.metadata.resource_version = self.next_revision();
        self.nodes.insert(name.to_string(), node);
    }
}

fn machine_key(namespace: &str, name: &str) -> (String, String) {
    (namespace.to_string(), name.to_string())
}

impl FakeCluster {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn objects(&self) -> MutexGuard<'_, Objects> {
        self.objects.lock().unwrap()
    }

    pub(crate) fn add_machine(&self, mut machine: machinev1::Machine) {
        let mut objects = self.objects();
        machine.metadata.resource_version = objects.next_revision();
        let key = machine_key(
            machine.metadata.namespace.as_deref().unwrap_or_default(),
            machine.metadata.name.as_deref().unwrap_or_default(),
        );
        objects.machines.insert(key, machine);
    }

    /// Register (or re-register) a node the way the kubelet would: new uid, new creation time
    pub(crate) fn register_node(&self, name: &str, created: Timestamp) {
        let mut objects = self.objects();
        objects.register_node(name, created);
    }

    /// Have the node re-register right before the next delete reaches it
    pub(crate) fn register_node_before_next_delete(&self, created: Timestamp) {
        let mut objects = self.objects();
        objects.register_before_delete = Some(created);
    }

    pub(crate) fn machine(&self, namespace: &str, name: &str) -> machinev1::Machine {
        let objects = self.objects();
        objects.machines[&machine_key(namespace, name)].clone()
    }

    pub(crate) fn node(&self, name: &str) -> Option<corev1::Node> {
        let objects = self.objects();
        objects.nodes.get(name).cloned()
    }

    /// Modify a machine as some other client would
    pub(crate) fn update_machine(
        &self,
        namespace: &str,
        name: &str,
        update: impl FnOnce(&mut machinev1::Machine),
    ) {
        let mut objects = self.objects();
        let revision = objects.next_revision();
        if let Some(machine) = objects.machines.get_mut(&machine_key(namespace, name)) {
            update(machine);
            machine.metadata.resource_version = revision;
        }
    }

    /// Modify a node as some other client would
    pub(crate) fn update_node(&self, name: &str, update: impl FnOnce(&mut corev1::Node)) {
        let mut objects = self.objects();
        let revision = objects.next_revision();
        if let Some(node) = objects.nodes.get_mut(name) {
            update(node);
            node.metadata.resource_version = revision;
        }
    }

    pub(crate) fn remove_node(&self, name: &str) {
        let mut objects = self.objects();
        objects.nodes.remove(name);
    }

    /// Number of successful writes made through `ClusterApi`
    pub(crate) fn writes(&self) -> usize {
        let objects = self.objects();
        objects.writes
    }

    pub(crate) fn fail_next_machine_updates_with_conflict(&self, count: usize) {
        let mut objects = self.objects();
        objects.machine_conflicts = count;
    }
}

#[async_trait]
impl ClusterApi for FakeCluster {
    async fn get_machine(&self, namespace: &str, name: &str) -> Result<machinev1::Machine> {
        let objects = self.objects();
        objects
            .machines
            .get(&machine_key(namespace, name))
            .cloned()
            .ok_or_else(|| Error::not_found::<machinev1::Machine>(name))
    }

    async fn replace_machine(&self, machine: &machinev1::Machine) -> Result<machinev1::Machine> {
        let mut objects = self.objects();
        let namespace = machine.metadata.namespace.as_deref().unwrap_or_default();
        let name = machine.metadata.name.as_deref().unwrap_or_default();
        let key = machine_key(namespace, name);

        if objects.machine_conflicts > 0 {
            objects.machine_conflicts -= 1;
            return Err(Error::conflict::<machinev1::Machine>(name));
        }

        let Some(stored) = objects.machines.get(&key) else {
            return Err(Error::not_found::<machinev1::Machine>(name));
        };
        if stored.metadata.resource_version != machine.metadata.resource_version {
            return Err(Error::conflict::<machinev1::Machine>(name));
        }

        let mut machine = machine.clone();
        machine.metadata.resource_version = objects.next_revision();
        objects.machines.insert(key, machine.clone());
        objects.writes += 1;
        Ok(machine)
    }

    async fn get_node(&self, name: &str) -> Result<corev1::Node> {
        let objects = self.objects();
        objects
            .nodes
            .get(name)
            .cloned()
            .ok_or_else(|| Error::not_found::<corev1::Node>(name))
    }

    async fn replace_node(&self, node: &corev1::Node) -> Result<corev1::Node> {
        let mut objects = self.objects();
        let name = node.metadata.name.as_deref().unwrap_or_default();

        let Some(stored) = objects.nodes.get(name) else {
            return Err(Error::not_found::<corev1::Node>(name));
        };
        if stored.metadata.resource_version != node.metadata.resource_version {
            return Err(Error::conflict::<corev1::Node>(name));
        }

        let mut node = node.clone();
        node.metadata.resource_version = objects.next_revision();
        objects.nodes.insert(name.to_string(), node.clone());
        objects.writes += 1;
        Ok(node)
    }

    async fn delete_node(&self, name: &str, uid: Option<String>) -> Result<()> {
        let mut objects = self.objects();
        if let Some(created) = objects.register_before_delete.take() {
            objects.register_node(name, created);
        }

        let Some(stored) = objects.nodes.get(name) else {
            return Err(Error::not_found::<corev1::Node>(name));
        };
        if uid.is_some() && stored.metadata.uid != uid {
            return Err(Error::conflict::<corev1::Node>(name));
        }

        objects.nodes.remove(name);
        objects.writes += 1;
        Ok(())
    }
}
