//! The user-facing `Application` resource and its status projection.

use std::collections::BTreeMap;

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{constants, utils::crds::raw_object_schema};

/// One workload-bearing element of an application.
#[derive(Clone, Debug, Deserialize, JsonSchema, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    /// Unique within the application.
    pub name: String,

    /// Name of the `ComponentDefinition` (optionally `@vN`) this component renders with.
    #[serde(rename = "type")]
    pub type_: String,

    #[schemars(schema_with = "raw_object_schema")]
    #[serde(default)]
    pub properties: serde_json::Value,

    #[serde(default)]
    pub traits: Vec<Trait>,

    /// Healthscope / applicationscope names this component is placed into.
    #[serde(default)]
    pub scopes: BTreeMap<String, String>,

    /// Other component names this component depends on.
    #[serde(default)]
    pub depends_on: Vec<String>,

    /// Value-paths consumed from other components' `outputs`, keyed by local parameter name.
    #[serde(default)]
    pub inputs: Vec<InputItem>,

    /// Named value-paths this component exposes for downstream components to consume.
    #[serde(default)]
    pub outputs: Vec<OutputItem>,
}

#[derive(Clone, Debug, Deserialize, JsonSchema, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputItem {
    pub from: String,
    pub parameter_key: String,
}

#[derive(Clone, Debug, Deserialize, JsonSchema, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputItem {
    pub name: String,
    pub value_from: String,
}

/// An overlay that patches a component's workload, or emits auxiliary resources, position-ordered
/// relative to a component's other traits.
#[derive(Clone, Debug, Deserialize, JsonSchema, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Trait {
    #[serde(rename = "type")]
    pub type_: String,

    #[schemars(schema_with = "raw_object_schema")]
    #[serde(default)]
    pub properties: serde_json::Value,
}

/// A cross-cutting directive: topology, override, shared-resource, or an admin-defined policy
/// type.
#[derive(Clone, Debug, Deserialize, JsonSchema, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    pub name: String,

    #[serde(rename = "type")]
    pub type_: String,

    #[schemars(schema_with = "raw_object_schema")]
    #[serde(default)]
    pub properties: serde_json::Value,
}

/// Either a list of inline workflow steps, or a reference to a standalone `Workflow` object.
/// The two are mutually exclusive; the admission webhook rejects documents that set both.
#[derive(Clone, Debug, Deserialize, JsonSchema, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowSpecOrReference {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<crate::crd::workflow::WorkflowStep>,

    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl WorkflowSpecOrReference {
    /// True when both an inline step list and a `ref` are set, which is always rejected.
    pub fn is_ambiguous(&self) -> bool {
        !self.steps.is_empty() && self.reference.is_some()
    }
}

#[derive(CustomResource, Clone, Debug, Deserialize, JsonSchema, PartialEq, Serialize)]
#[kube(
    group = "core.oam.dev",
    version = "v1beta1",
    kind = "Application",
    plural = "applications",
    shortname = "app",
    namespaced,
    status = "ApplicationStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationSpec {
    pub components: Vec<Component>,

    #[serde(default)]
    pub policies: Vec<Policy>,

    #[serde(default)]
    pub workflow: Option<WorkflowSpecOrReference>,
}

impl ApplicationSpec {
    /// Reads the gating publish-version from the given object's annotations, if any.
    pub fn publish_version(annotations: &BTreeMap<String, String>) -> Option<&str> {
        annotations
            .get(constants::PUBLISH_VERSION_ANNOTATION)
            .map(String::as_str)
    }
}

/// Aggregated reconcile phase, surfaced as `status.phase`.
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, JsonSchema, PartialEq, Serialize, strum::Display,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum ApplicationPhase {
    #[default]
    Rendering,
    Running,
    HealthChecking,
    WorkflowSuspending,
    WorkflowFailed,
    WorkflowTerminated,
    Deleting,
    Error,
}

/// A stable `type` string plus human-readable detail, attached for any non-transient error.
#[derive(Clone, Debug, Deserialize, JsonSchema, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationCondition {
    #[serde(rename = "type")]
    pub type_: String,

    pub status: ConditionStatus,

    pub reason: String,

    #[serde(default)]
    pub message: Option<String>,

    #[serde(default)]
    pub last_transition_time: Option<String>,
}

#[derive(
    Clone, Copy, Debug, Deserialize, Eq, JsonSchema, PartialEq, Serialize, strum::Display,
)]
#[strum(serialize_all = "PascalCase")]
pub enum ConditionStatus {
    True,
    False,
    Unknown,
}

/// Per-component health and message, using the template engine's `isHealth`/`message`
/// expressions.
#[derive(Clone, Debug, Deserialize, JsonSchema, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStatus {
    pub name: String,

    pub healthy: bool,

    #[serde(default)]
    pub message: Option<String>,

    /// The `ApplicationRevision` that produced this component's currently-tracked output.
    pub app_revision: String,
}

/// Workflow progress projection: step name and state machine state per step.
#[derive(Clone, Debug, Deserialize, JsonSchema, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowStatus {
    pub app_revision: String,

    pub mode: String,

    pub finished: bool,

    pub suspend: bool,

    pub terminated: bool,

    pub steps: Vec<WorkflowStepStatus>,
}

#[derive(Clone, Debug, Deserialize, JsonSchema, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowStepStatus {
    pub name: String,

    #[serde(rename = "type")]
    pub type_: String,

    pub phase: String,

    #[serde(default)]
    pub message: Option<String>,

    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationStatus {
    #[serde(default)]
    pub phase: ApplicationPhase,

    /// Name of the `ApplicationRevision` currently tracked as current.
    #[serde(default)]
    pub latest_revision: Option<String>,

    #[serde(default)]
    pub workflow: Option<WorkflowStatus>,

    #[serde(default)]
    pub services: Vec<ServiceStatus>,

    #[serde(default)]
    pub conditions: Vec<ApplicationCondition>,

    /// Observed `metadata.generation`; used to detect a stale status read racing a live edit.
    #[serde(default)]
    pub observed_generation: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workflow_spec_or_reference_detects_ambiguity() {
        let ambiguous = WorkflowSpecOrReference {
            steps: vec![crate::crd::workflow::WorkflowStep {
                name: "deploy".into(),
                type_: "apply-component".into(),
                properties: serde_json::Value::Null,
                if_condition: None,
                timeout: None,
                depends_on: vec![],
                inputs: vec![],
                outputs: vec![],
                sub_steps: vec![],
            }],
            reference: Some("shared-workflow".into()),
        };
        assert!(ambiguous.is_ambiguous());

        let fine = WorkflowSpecOrReference {
            steps: vec![],
            reference: Some("shared-workflow".into()),
        };
        assert!(!fine.is_ambiguous());
    }
}
