use super::*;

pub trait NodeExt {
    fn new(name: impl ToString) -> Self;
    fn is_unschedulable(&self) -> bool;
    fn cordon(&mut self) -> bool;
    fn taints(&self) -> &[corev1::Taint];
    fn created_at(&self) -> Option<jiff::Timestamp>;
    fn is_created_after(&self, ts: jiff::Timestamp) -> bool;
}

impl NodeExt for corev1::Node {
    fn new(name: impl ToString) -> Self {
        let metadata = metav1::ObjectMeta::new(name);
        Self {
            metadata,
            ..default()
        }
    }

    fn is_unschedulable(&self) -> bool {
        self.spec
            .as_ref()
            .and_then(|spec| spec.unschedulable)
            .unwrap_or_default()
    }

    /// Marks the node unschedulable, returns `false` if it already was
    fn cordon(&mut self) -> bool {
        let spec = self.spec.get_or_insert_with(default);
        let changed = spec.unschedulable != Some(true);
        spec.unschedulable = Some(true);
        changed
    }

    fn taints(&self) -> &[corev1::Taint] {
        self.spec
            .as_ref()
            .and_then(|spec| spec.taints.as_deref())
            .unwrap_or_default()
    }

    fn created_at(&self) -> Option<jiff::Timestamp> {
        self.metadata
            .creation_timestamp
            .as_ref()
            .map(|created| created.0)
    }

    /// A node without a creation timestamp is never considered newer
    fn is_created_after(&self, ts: jiff::Timestamp) -> bool {
        self.created_at().is_some_and(|created| created > ts)
    }
}
