//! Immutable, content-hashed snapshots of a [`Definition`](super::definitions).

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::definitions::{DefinitionStatus, DefinitionType, Schematic};

/// `<name>-v<N>`: an immutable snapshot of a `Definition` taken the moment its content hash
/// changed. Referenced by an `Application` via `defName@vN`, and inlined into every
/// `ApplicationRevision` that resolved it.
#[derive(CustomResource, Clone, Debug, Deserialize, JsonSchema, PartialEq, Serialize)]
#[kube(
    group = "core.oam.dev",
    version = "v1beta1",
    kind = "DefinitionRevision",
    plural = "definitionrevisions",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct DefinitionRevisionSpec {
    /// Name of the `Definition` this is a revision of (without the `-vN` suffix).
    pub definition_name: String,

    pub definition_type: DefinitionType,

    /// Monotonic, per-(name, type) revision number, starting at 1.
    pub revision: u64,

    /// 8-byte stable hash over the normalized template + parameter schema, hex-encoded.
    pub revision_hash: String,

    pub schematic: Schematic,

    #[serde(default)]
    pub status: DefinitionStatus,

    #[serde(default)]
    pub parameter: serde_json::Value,
}

impl DefinitionRevisionSpec {
    /// The `<name>-v<N>` object name this revision is (or would be) stored under.
    pub fn revision_name(definition_name: &str, revision: u64) -> String {
        format!("{definition_name}-v{revision}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn revision_name_formats_as_name_v_n() {
        assert_eq!(
            DefinitionRevisionSpec::revision_name("webservice", 3),
            "webservice-v3"
        );
    }
}
