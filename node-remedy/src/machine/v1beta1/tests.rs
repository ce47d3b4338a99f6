use k8s::Metadata as _;

use super::*;

fn machine_with_node(node: &str) -> Machine {
    let node_ref = corev1::ObjectReference {
        kind: Some("Node".to_string()),
        name: Some(node.to_string()),
        ..corev1::ObjectReference::default()
    };
    Machine {
        status: Some(MachineStatus {
            node_ref: Some(node_ref),
            ..MachineStatus::default()
        }),
        ..Machine::new("worker-0", "openshift-machine-api")
    }
}

#[test]
fn machine_new() {
    let machine = Machine::new("worker-0", "openshift-machine-api");

    assert_eq!(machine.metadata().name.as_deref(), Some("worker-0"));
    assert_eq!(
        machine.metadata().namespace.as_deref(),
        Some("openshift-machine-api")
    );
    assert!(machine.spec.is_none());
    assert!(machine.status.is_none());
}

#[test]
fn machine_resource_constants() {
    assert_eq!(Machine::API_VERSION, "machine.openshift.io/v1beta1");
    assert_eq!(Machine::GROUP, "machine.openshift.io");
    assert_eq!(Machine::VERSION, "v1beta1");
    assert_eq!(Machine::KIND, "Machine");
    assert_eq!(Machine::URL_PATH_SEGMENT, "machines");
}

#[test]
fn node_name_from_node_ref() {
    let machine = machine_with_node("node1");

    assert_eq!(machine.node_name(), Some("node1"));
}

#[test]
fn node_name_missing_status() {
    let machine = Machine::new("worker-0", "openshift-machine-api");

    assert_eq!(machine.node_name(), None);
}

#[test]
fn serialize_writes_type_meta() {
    let machine = machine_with_node("node1");
    let value = serde_json::to_value(&machine).unwrap();

    assert_eq!(value["apiVersion"], "machine.openshift.io/v1beta1");
    assert_eq!(value["kind"], "Machine");
    assert_eq!(value["metadata"]["name"], "worker-0");
    assert_eq!(value["status"]["nodeRef"]["name"], "node1");
    assert!(value.get("spec").is_none());
}

#[test]
fn deserialize_keeps_unknown_fields() {
    let text = r#"{
        "apiVersion": "machine.openshift.io/v1beta1",
        "kind": "Machine",
        "metadata": {
            "name": "worker-1",
            "namespace": "openshift-machine-api",
            "annotations": {"host.metal3.io/external-remediation": ""}
        },
        "spec": {"providerID": "baremetalhost:///worker-1"},
        "status": {
            "phase": "Running",
            "nodeRef": {"kind": "Node", "name": "node2"},
            "addresses": [{"type": "InternalIP", "address": "10.0.0.7"}]
        }
    }"#;

    let machine: Machine = serde_json::from_str(text).unwrap();

    assert_eq!(machine.node_name(), Some("node2"));
    let status = machine.status.as_ref().unwrap();
    assert_eq!(status.phase.as_deref(), Some("Running"));
    assert!(status.extra.contains_key("addresses"));
    assert_eq!(
        machine.spec.as_ref().unwrap()["providerID"],
        "baremetalhost:///worker-1"
    );

    let value = serde_json::to_value(&machine).unwrap();
    assert_eq!(value["status"]["addresses"][0]["address"], "10.0.0.7");
    assert_eq!(value["spec"]["providerID"], "baremetalhost:///worker-1");
}
