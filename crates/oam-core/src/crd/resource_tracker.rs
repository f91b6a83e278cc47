//! The persisted per-(application, revision) index of dispatched resources used by live-diff and
//! the garbage collector.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::utils::crds::raw_object_schema;

/// Which lifetime scope a [`ResourceTracker`] covers.
#[derive(
    Clone, Copy, Debug, Deserialize, Eq, JsonSchema, PartialEq, Serialize, strum::Display,
)]
#[serde(rename_all = "PascalCase")]
#[strum(serialize_all = "PascalCase")]
pub enum TrackerKind {
    /// Unique per application; lifetime = application lifetime; holds resources outside any
    /// single revision's scope (cluster-scoped objects, resources attached via a shared-resource
    /// policy).
    Root,
    /// Pinned to the revision whose workflow most recently succeeded. Resources here must be
    /// kept alive.
    Current,
    /// Previously current; a garbage-collection candidate once no resource in it is still
    /// referenced from a live tracker.
    Historical,
}

/// One resource the controller dispatched on behalf of a component.
#[derive(Clone, Debug, Deserialize, JsonSchema, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedResource {
    pub cluster: String,
    pub api_version: String,
    pub kind: String,
    pub namespace: Option<String>,
    pub name: String,

    /// The component that owns this resource, or `None` for root-tracker cluster-scoped
    /// resources not attributable to a single component.
    #[serde(default)]
    pub component: Option<String>,

    /// Raw payload as dispatched, used for live-diff without re-rendering.
    #[schemars(schema_with = "raw_object_schema")]
    pub raw: serde_json::Value,

    /// Never garbage-collect this resource even if it drops out of every live tracker.
    #[serde(default)]
    pub skip_gc: bool,

    /// Non-empty iff a shared-resource policy applies; the resource is deleted only once every
    /// owning application has released it.
    #[serde(default)]
    pub shared_by: Vec<String>,
}

impl ManagedResource {
    /// Identity used to deduplicate/diff resources across trackers: cluster + GVK + namespace +
    /// name, deliberately excluding the owning component and payload.
    pub fn identity_key(&self) -> (String, String, String, Option<String>, String) {
        (
            self.cluster.clone(),
            self.api_version.clone(),
            self.kind.clone(),
            self.namespace.clone(),
            self.name.clone(),
        )
    }
}

#[derive(CustomResource, Clone, Debug, Deserialize, JsonSchema, PartialEq, Serialize)]
#[kube(
    group = "core.oam.dev",
    version = "v1beta1",
    kind = "ResourceTracker",
    plural = "resourcetrackers",
    shortname = "rt"
)]
#[serde(rename_all = "camelCase")]
pub struct ResourceTrackerSpec {
    pub application_name: String,
    pub application_namespace: String,

    pub kind: TrackerKind,

    /// Set for `current`/`historical` trackers; `None` for `root`.
    #[serde(default)]
    pub application_revision: Option<String>,

    #[serde(default)]
    pub managed_resources: Vec<ManagedResource>,
}

impl ResourceTrackerSpec {
    /// `live = current ∪ root`; resources outside this set are GC candidates.
    pub fn is_live(&self) -> bool {
        matches!(self.kind, TrackerKind::Root | TrackerKind::Current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_key_ignores_component_and_payload() {
        let a = ManagedResource {
            cluster: "local".into(),
            api_version: "v1".into(),
            kind: "ConfigMap".into(),
            namespace: Some("default".into()),
            name: "cm".into(),
            component: Some("a".into()),
            raw: serde_json::json!({"data": {"k": "v1"}}),
            skip_gc: false,
            shared_by: vec![],
        };
        let b = ManagedResource {
            component: Some("b".into()),
            raw: serde_json::json!({"data": {"k": "v2"}}),
            ..a.clone()
        };
        assert_eq!(a.identity_key(), b.identity_key());
    }

    #[test]
    fn only_root_and_current_are_live() {
        let mut spec = ResourceTrackerSpec {
            application_name: "app".into(),
            application_namespace: "default".into(),
            kind: TrackerKind::Historical,
            application_revision: Some("app-v1".into()),
            managed_resources: vec![],
        };
        assert!(!spec.is_live());

        spec.kind = TrackerKind::Current;
        assert!(spec.is_live());

        spec.kind = TrackerKind::Root;
        assert!(spec.is_live());
    }
}
