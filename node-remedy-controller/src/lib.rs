use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use node_remedy_ext as k8s;

use k8s::corev1;
use k8s::jiff::Timestamp;
use k8s::machinev1;
use k8s::MachineExt as _;
use k8s::NodeExt as _;

pub use cluster::ClusterApi;
pub use config::parse_duration;
pub use config::RemediationConfig;
pub use error::Error;
pub use reconciler::error_policy;
pub use reconciler::reconcile;
pub use reconciler::Context;
pub use state::RemediationState;
pub use state::Step;
pub use watchdog::DeviceWatchdog;
pub use watchdog::SoftWatchdog;
pub use watchdog::Watchdog;

pub mod clock;
pub mod cluster;
pub mod snapshot;

mod config;
mod error;
mod reconciler;
mod state;
mod watchdog;

#[cfg(test)]
mod fake;

pub type Result<T, E = Error> = std::result::Result<T, E>;
