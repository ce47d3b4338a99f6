//! Annotation keys shared with the external health detector.
//!
//! Both keys live on the `Machine`. They are the only state the remediation
//! controller keeps, so it survives restarts without any other persistence.

/// Set by the health detector when a machine must be remediated.
///
/// An empty value means the machine was just flagged and nobody has acted on
/// it yet. Once the controller cordons the node it overwrites the value with
/// the RFC3339 time at which remediation started. The key is removed when the
/// node has re-registered.
pub const EXTERNAL_REMEDIATION_ANNOTATION: &str = "host.metal3.io/external-remediation";

/// JSON snapshot of the node as it was right after cordoning.
///
/// Present only while remediation is in progress.
pub const NODE_BACKUP_ANNOTATION: &str = "machine.openshift.io/node-backup";
