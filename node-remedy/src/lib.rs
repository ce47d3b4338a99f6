use std::collections::BTreeMap;

use k8s_openapi as k8s;
use serde::Deserialize;
use serde::Serialize;

use k8s::api::core::v1 as corev1;
use k8s::apimachinery::pkg::apis::meta::v1 as metav1;

pub use machine::v1beta1;

pub mod annotations;
pub mod machine;
