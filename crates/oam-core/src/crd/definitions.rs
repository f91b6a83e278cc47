//! Admin-authored `Definition` resources: the templates that tell the controller how to render a
//! component, trait, policy, or workflow step.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::utils::crds::raw_object_schema;

/// The template source of a [`Definition`]: a constraint-language document declaring
/// `parameter`, `output`, `outputs`, `patch`, `context` and optional `status` blocks.
///
/// The controller does not interpret the constraint language itself (that's an external
/// collaborator, see the template engine); this struct only carries the raw source plus which
/// dialect it is written in.
#[derive(Clone, Debug, Deserialize, Eq, JsonSchema, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Schematic {
    /// Constraint-language source implementing `parameter`/`output`/`outputs`/`patch`/`context`.
    pub cue: CueSchematic,
}

#[derive(Clone, Debug, Deserialize, Eq, JsonSchema, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CueSchematic {
    pub template: String,
}

/// Optional health/status expressions attached to a [`Definition`].
#[derive(Clone, Debug, Default, Deserialize, Eq, JsonSchema, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DefinitionStatus {
    /// Expression yielding a boolean `isHealth`, evaluated against `context.output`/`outputs`.
    pub health_policy: Option<String>,

    /// Expression yielding a human-readable status message.
    pub custom_status: Option<String>,
}

/// A component definition: tells the controller how to render a workload type (e.g. `webservice`).
#[derive(CustomResource, Clone, Debug, Deserialize, JsonSchema, PartialEq, Serialize)]
#[kube(
    group = "core.oam.dev",
    version = "v1beta1",
    kind = "ComponentDefinition",
    plural = "componentdefinitions",
    shortname = "comp",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct ComponentDefinitionSpec {
    pub schematic: Schematic,

    #[serde(default)]
    pub status: DefinitionStatus,

    /// JSON Schema for the `parameter` record exposed to users of this component type.
    #[schemars(schema_with = "raw_object_schema")]
    #[serde(default)]
    pub parameter: serde_json::Value,

    /// Whether a workload rendered by this definition can be referenced as a revisioned
    /// component (its own child `*-rev-N` objects materialized on disk).
    #[serde(default)]
    pub revision_enabled: bool,
}

/// A trait definition: tells the controller how to patch a component's workload, or what
/// auxiliary resources to render alongside it (e.g. `scaler`, `ingress`).
#[derive(CustomResource, Clone, Debug, Deserialize, JsonSchema, PartialEq, Serialize)]
#[kube(
    group = "core.oam.dev",
    version = "v1beta1",
    kind = "TraitDefinition",
    plural = "traitdefinitions",
    shortname = "trait",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct TraitDefinitionSpec {
    pub schematic: Schematic,

    #[serde(default)]
    pub status: DefinitionStatus,

    #[schemars(schema_with = "raw_object_schema")]
    #[serde(default)]
    pub parameter: serde_json::Value,

    /// Glob list of component workload types this trait may be attached to, or `["*"]` for any.
    /// Empty means unconstrained.
    #[serde(default)]
    pub applies_to: Vec<String>,

    /// If true, a change to a property handled by this trait forces the underlying pod spec to
    /// roll (via a forced annotation bump) even though the trait itself doesn't touch the pod
    /// spec directly.
    #[serde(default)]
    pub pod_disruptive: bool,
}

/// A policy definition: topology, override, shared-resource, or an admin-defined custom policy
/// type.
#[derive(CustomResource, Clone, Debug, Deserialize, JsonSchema, PartialEq, Serialize)]
#[kube(
    group = "core.oam.dev",
    version = "v1beta1",
    kind = "PolicyDefinition",
    plural = "policydefinitions",
    shortname = "policy",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct PolicyDefinitionSpec {
    pub schematic: Schematic,

    #[serde(default)]
    pub status: DefinitionStatus,

    #[schemars(schema_with = "raw_object_schema")]
    #[serde(default)]
    pub parameter: serde_json::Value,
}

/// A workflow step definition: a user-defined workflow step type beyond the builtins
/// (`deploy`, `apply-component`, `suspend`, `notification`, `step-group`, `build-push-image`).
#[derive(CustomResource, Clone, Debug, Deserialize, JsonSchema, PartialEq, Serialize)]
#[kube(
    group = "core.oam.dev",
    version = "v1beta1",
    kind = "WorkflowStepDefinition",
    plural = "workflowstepdefinitions",
    shortname = "wfstep",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowStepDefinitionSpec {
    pub schematic: Schematic,

    #[serde(default)]
    pub status: DefinitionStatus,

    #[schemars(schema_with = "raw_object_schema")]
    #[serde(default)]
    pub parameter: serde_json::Value,
}

/// The four kinds of [`Definition`] the registry resolves, used as a discriminant when looking
/// up a `DefinitionRevision`.
#[derive(
    Clone, Copy, Debug, Deserialize, Eq, Hash, JsonSchema, PartialEq, Serialize, strum::Display,
)]
#[serde(rename_all = "PascalCase")]
#[strum(serialize_all = "PascalCase")]
pub enum DefinitionType {
    Component,
    Trait,
    Policy,
    WorkflowStep,
}
