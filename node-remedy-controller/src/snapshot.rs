//! Codec for the node backup annotation.
//!
//! Snapshots are plain JSON, the same encoding the API server serves. Node
//! types write their own `apiVersion` and `kind` and verify them on decode,
//! so a decoded snapshot compares equal to the node it was taken from with
//! no type metadata patched in afterwards.

use super::*;

pub fn serialize(node: &corev1::Node) -> Result<String> {
    serde_json::to_string(node).map_err(Error::Snapshot)
}

pub fn deserialize(text: &str) -> Result<corev1::Node> {
    serde_json::from_str(text).map_err(Error::Snapshot)
}
