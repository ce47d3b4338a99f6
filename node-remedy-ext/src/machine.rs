use super::*;

use annotations::EXTERNAL_REMEDIATION_ANNOTATION;
use annotations::NODE_BACKUP_ANNOTATION;

pub trait MachineExt {
    fn with_node_ref(self, node: impl ToString) -> Self;
    fn remediation_marker(&self) -> Option<&str>;
    fn node_backup(&self) -> Option<&str>;
    fn mark_remediation_started(&mut self, marker: impl ToString, backup: impl ToString);
    fn clear_remediation(&mut self) -> bool;
}

impl MachineExt for machinev1::Machine {
    fn with_node_ref(self, node: impl ToString) -> Self {
        let node_ref = corev1::ObjectReference {
            kind: Some("Node".to_string()),
            api_version: Some("v1".to_string()),
            name: Some(node.to_string()),
            ..default()
        };
        let status = machinev1::MachineStatus {
            node_ref: Some(node_ref),
            ..self.status.unwrap_or_default()
        };
        Self {
            status: Some(status),
            ..self
        }
    }

    fn remediation_marker(&self) -> Option<&str> {
        self.metadata.annotation(EXTERNAL_REMEDIATION_ANNOTATION)
    }

    fn node_backup(&self) -> Option<&str> {
        self.metadata.annotation(NODE_BACKUP_ANNOTATION)
    }

    fn mark_remediation_started(&mut self, marker: impl ToString, backup: impl ToString) {
        self.metadata
            .set_annotation(EXTERNAL_REMEDIATION_ANNOTATION, marker);
        self.metadata.set_annotation(NODE_BACKUP_ANNOTATION, backup);
    }

    /// Drops both remediation annotations, returns `true` if anything was removed
    fn clear_remediation(&mut self) -> bool {
        let marker = self
            .metadata
            .remove_annotation(EXTERNAL_REMEDIATION_ANNOTATION);
        let backup = self.metadata.remove_annotation(NODE_BACKUP_ANNOTATION);
        marker.is_some() || backup.is_some()
    }
}
