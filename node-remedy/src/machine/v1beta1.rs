use constcat::concat;
use serde::ser::SerializeStruct as _;

use k8s::Resource as _;

use super::*;

pub const MACHINE_API_GROUP: &str = "machine.openshift.io";
pub const MACHINE_API_VERSION: &str = "v1beta1";
pub const MACHINE_API_GROUP_VERSION: &str = concat!(MACHINE_API_GROUP, "/", MACHINE_API_VERSION);

/// `Machine` is the Schema for the machines API
///
/// Only the parts the remediation controller reads are typed. `spec` and the
/// remaining `status` fields are carried verbatim so that a read-modify-write
/// replace never drops data owned by the machine API operator.
///
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Machine {
    #[serde(default)]
    pub metadata: metav1::ObjectMeta,

    /// Provider specific machine spec, opaque to remediation
    ///
    pub spec: Option<serde_json::Value>,

    pub status: Option<MachineStatus>,
}

/// `MachineStatus` defines the observed state of `Machine`
///
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineStatus {
    /// nodeRef will point to the corresponding Node if it exists.
    /// +optional
    ///
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_ref: Option<corev1::ObjectReference>,

    /// phase represents the current phase of machine actuation.
    /// One of: Failed, Provisioning, Provisioned, Running, Deleting
    /// +optional
    ///
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,

    /// Everything else the machine API reports (conditions, addresses, ...)
    ///
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

pub type MachineList = k8s::List<Machine>;

impl k8s::Resource for Machine {
    const API_VERSION: &'static str = MACHINE_API_GROUP_VERSION;
    const GROUP: &'static str = MACHINE_API_GROUP;
    const KIND: &'static str = "Machine";
    const VERSION: &'static str = MACHINE_API_VERSION;
    const URL_PATH_SEGMENT: &'static str = "machines";
    type Scope = k8s::NamespaceResourceScope;
}

impl k8s::ListableResource for Machine {
    const LIST_KIND: &'static str = "MachineList";
}

impl k8s::Metadata for Machine {
    type Ty = metav1::ObjectMeta;

    fn metadata(&self) -> &<Self as k8s::Metadata>::Ty {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut <Self as k8s::Metadata>::Ty {
        &mut self.metadata
    }
}

impl Serialize for Machine {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let fields = 3 + usize::from(self.spec.is_some()) + usize::from(self.status.is_some());
        let mut state = serializer.serialize_struct(Self::KIND, fields)?;
        state.serialize_field("apiVersion", Self::API_VERSION)?;
        state.serialize_field("kind", Self::KIND)?;
        state.serialize_field("metadata", &self.metadata)?;
        if let Some(spec) = &self.spec {
            state.serialize_field("spec", spec)?;
        }
        if let Some(status) = &self.status {
            state.serialize_field("status", status)?;
        }
        state.end()
    }
}

impl Machine {
    /// Create new `Machine` with given `name` in `namespace`
    ///
    pub fn new(name: impl ToString, namespace: impl ToString) -> Self {
        let metadata = metav1::ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            ..metav1::ObjectMeta::default()
        };
        Self {
            metadata,
            ..Self::default()
        }
    }

    /// Name of the node backing this machine, if the machine API has linked one
    ///
    pub fn node_name(&self) -> Option<&str> {
        self.status
            .as_ref()
            .and_then(|status| status.node_ref.as_ref())
            .and_then(|node_ref| node_ref.name.as_deref())
    }
}

#[cfg(test)]
mod tests;
