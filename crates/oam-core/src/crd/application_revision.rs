//! Immutable snapshots of an `Application` plus the exact `Definition`s and external objects it
//! resolved to, enabling reproducible offline rendering and rollback.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::crd::{
    application::ApplicationSpec, definition_revision::DefinitionRevisionSpec,
    policy::PolicySpec, workflow::WorkflowSpec,
};

/// A referenced `Policy` or `Workflow` object's content, inlined so the revision is
/// self-contained: rendering revision `N` later must not depend on the current state of the
/// external object it once pointed to.
#[derive(Clone, Debug, Deserialize, JsonSchema, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InlinedPolicy {
    pub name: String,
    pub spec: PolicySpec,
}

#[derive(Clone, Debug, Deserialize, JsonSchema, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InlinedWorkflow {
    pub name: String,
    pub spec: WorkflowSpec,
}

/// `<app>-v<N>`: an immutable, fully self-contained snapshot of an application.
#[derive(CustomResource, Clone, Debug, Deserialize, JsonSchema, PartialEq, Serialize)]
#[kube(
    group = "core.oam.dev",
    version = "v1beta1",
    kind = "ApplicationRevision",
    plural = "applicationrevisions",
    namespaced,
    status = "ApplicationRevisionStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRevisionSpec {
    pub application_name: String,

    /// Monotonic revision number; the object name is `<app>-v<revision>`.
    pub revision: u64,

    /// The `app.oam.dev/publishVersion` annotation value at freeze time, if the application used
    /// one.
    #[serde(default)]
    pub publish_version: Option<String>,

    /// The frozen application spec at the moment this revision was taken.
    pub application: ApplicationSpec,

    /// Exact `DefinitionRevision` set resolved while rendering this revision, keyed by the
    /// (possibly unversioned) reference the application used.
    pub resolved_definitions: Vec<DefinitionRevisionSpec>,

    #[serde(default)]
    pub external_policies: Vec<InlinedPolicy>,

    #[serde(default)]
    pub external_workflow: Option<InlinedWorkflow>,

    /// Content hash of `application` + `resolved_definitions` + inlined externals, used to
    /// detect whether a subsequent reconcile actually changed anything.
    pub content_hash: String,
}

impl ApplicationRevisionSpec {
    pub fn revision_name(application_name: &str, revision: u64) -> String {
        format!("{application_name}-v{revision}")
    }
}

#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRevisionStatus {
    /// Whether the workflow driven off this revision reached a successful terminal state.
    #[serde(default)]
    pub succeeded: bool,
}
