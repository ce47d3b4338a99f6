pub use k8s_openapi as openapi;
pub use k8s_openapi::api::core::v1 as corev1;
pub use k8s_openapi::apimachinery::pkg::apis::meta::v1 as metav1;
pub use k8s_openapi::jiff;
pub use node_remedy::annotations;
pub use node_remedy::v1beta1 as machinev1;

pub use machine::MachineExt;
pub use node::NodeExt;

mod machine;
mod node;

pub trait ObjectMetaExt {
    fn new(name: impl ToString) -> Self;
    fn with_namespace(name: impl ToString, namespace: impl ToString) -> Self;
    fn created(self, ts: impl Into<Option<metav1::Time>>) -> Self;
    fn annotation(&self, key: &str) -> Option<&str>;
    fn set_annotation(&mut self, key: impl ToString, value: impl ToString);
    fn remove_annotation(&mut self, key: &str) -> Option<String>;
}

impl ObjectMetaExt for metav1::ObjectMeta {
    fn new(name: impl ToString) -> Self {
        let name = Some(name.to_string());
        Self { name, ..default() }
    }

    fn with_namespace(name: impl ToString, namespace: impl ToString) -> Self {
        Self {
            namespace: Some(namespace.to_string()),
            ..Self::new(name)
        }
    }

    fn created(self, ts: impl Into<Option<metav1::Time>>) -> Self {
        Self {
            creation_timestamp: ts.into(),
            ..self
        }
    }

    fn annotation(&self, key: &str) -> Option<&str> {
        self.annotations
            .as_ref()
            .and_then(|annotations| annotations.get(key))
            .map(String::as_str)
    }

    fn set_annotation(&mut self, key: impl ToString, value: impl ToString) {
        self.annotations
            .get_or_insert_with(default)
            .insert(key.to_string(), value.to_string());
    }

    /// Removes `key`, dropping the annotation map altogether once it is empty
    fn remove_annotation(&mut self, key: &str) -> Option<String> {
        let annotations = self.annotations.as_mut()?;
        let removed = annotations.remove(key);
        if annotations.is_empty() {
            self.annotations = None;
        }
        removed
    }
}

pub fn default<T: Default>() -> T {
    T::default()
}
