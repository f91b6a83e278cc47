//! Standalone `Workflow` objects (referenced via `spec.workflow.ref`) and the step model shared
//! between inline and referenced workflows.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::crd::application::{InputItem, OutputItem};

/// One step in a workflow. `sub_steps` is only meaningful when `type_ == "step-group"`.
#[derive(Clone, Debug, Deserialize, JsonSchema, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowStep {
    /// Unique within the workflow; also the stable identifier used by `dependsOn`.
    pub name: String,

    #[serde(rename = "type")]
    pub type_: String,

    #[serde(default)]
    pub properties: serde_json::Value,

    #[serde(rename = "if", default)]
    pub if_condition: Option<String>,

    #[serde(default)]
    pub timeout: Option<String>,

    #[serde(default)]
    pub depends_on: Vec<String>,

    #[serde(default)]
    pub inputs: Vec<InputItem>,

    #[serde(default)]
    pub outputs: Vec<OutputItem>,

    /// Only populated when `type_ == "step-group"`.
    #[serde(default)]
    pub sub_steps: Vec<WorkflowStep>,
}

/// Whether steps (or sub-steps) at a given level run one-at-a-time or as a DAG keyed by
/// `dependsOn`.
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, JsonSchema, PartialEq, Serialize, strum::Display,
)]
#[serde(rename_all = "PascalCase")]
#[strum(serialize_all = "PascalCase")]
pub enum WorkflowMode {
    #[default]
    StepByStep,
    #[serde(rename = "DAG")]
    #[strum(serialize = "DAG")]
    Dag,
}

#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowModes {
    #[serde(default)]
    pub steps: WorkflowMode,

    #[serde(default = "default_sub_steps_mode")]
    pub sub_steps: WorkflowMode,
}

fn default_sub_steps_mode() -> WorkflowMode {
    WorkflowMode::Dag
}

/// A reusable, standalone workflow, referenced by name from `Application.spec.workflow.ref`.
#[derive(CustomResource, Clone, Debug, Deserialize, JsonSchema, PartialEq, Serialize)]
#[kube(
    group = "core.oam.dev",
    version = "v1beta1",
    kind = "Workflow",
    plural = "workflows",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowSpec {
    #[serde(default)]
    pub mode: WorkflowModes,

    pub steps: Vec<WorkflowStep>,
}

/// The state machine a single step (or sub-step) moves through during execution.
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, JsonSchema, PartialEq, Serialize, strum::Display,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum StepPhase {
    #[default]
    Pending,
    Running,
    Succeeded,
    Failed,
    Waiting,
    Suspending,
    Skipped,
    Terminated,
}

impl StepPhase {
    /// Terminal states from which the step will not advance on its own: `succeeded`, `skipped`,
    /// `terminated`, and `failed` once retries are exhausted (callers decide that last case).
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            StepPhase::Succeeded | StepPhase::Skipped | StepPhase::Terminated
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_modes_are_stepbystep_and_dag() {
        let modes = WorkflowModes::default();
        assert_eq!(modes.steps, WorkflowMode::StepByStep);
        assert_eq!(modes.sub_steps, WorkflowMode::Dag);
    }

    #[test]
    fn only_specific_states_are_terminal() {
        assert!(StepPhase::Succeeded.is_terminal());
        assert!(StepPhase::Skipped.is_terminal());
        assert!(StepPhase::Terminated.is_terminal());
        assert!(!StepPhase::Failed.is_terminal());
        assert!(!StepPhase::Waiting.is_terminal());
        assert!(!StepPhase::Running.is_terminal());
    }
}
