use k8s::openapi::Resource;

use super::*;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(r#"{kind} "{name}" not found"#)]
    NotFound { kind: &'static str, name: String },

    #[error(r#"{kind} "{name}" was modified concurrently"#)]
    Conflict { kind: &'static str, name: String },

    #[error("machine {0} has no node reference")]
    MissingNodeRef(String),

    #[error("node snapshot: {0}")]
    Snapshot(#[source] serde_json::Error),

    #[error(transparent)]
    Kube(kube::Error),
}

impl Error {
    pub fn not_found<K: Resource>(name: impl ToString) -> Self {
        Self::NotFound {
            kind: K::KIND,
            name: name.to_string(),
        }
    }

    pub fn conflict<K: Resource>(name: impl ToString) -> Self {
        Self::Conflict {
            kind: K::KIND,
            name: name.to_string(),
        }
    }

    /// Classify an API error for the `K` object called `name`
    ///
    /// 404 and 409 become [`Error::NotFound`] and [`Error::Conflict`], everything else
    /// is kept as is.
    pub fn from_kube<K: Resource>(name: &str, err: kube::Error) -> Self {
        match err {
            kube::Error::Api(ref status) if status.code == 404 => Self::not_found::<K>(name),
            kube::Error::Api(ref status) if status.code == 409 => Self::conflict::<K>(name),
            err => Self::Kube(err),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}
