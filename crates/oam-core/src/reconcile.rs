//! Orchestrates one reconcile pass of the Application controller, per §4.8's seven phases.
//!
//! This module stays pure, like [`crate::parser`], [`crate::revision`], [`crate::workflow`], and
//! [`crate::dispatch`] that it composes: it decides *what phase to run next and what that phase
//! produced*, given already-fetched cluster state. The actual `kube::Api` reads/writes, and the
//! CUE evaluation behind [`crate::template::Evaluator`], are the reconciler binary's job; wiring
//! this module to a live [`kube::runtime::Controller`] only needs an `async fn reconcile` that
//! fetches state, calls into here, and applies the resulting [`ReconcileAction`].

use std::collections::{HashMap, HashSet};

use crate::{
    crd::application::{ApplicationCondition, ApplicationPhase, ConditionStatus},
    dispatch::DispatchOutcome,
    revision::SnapshotDecision,
    workflow::{StepState, is_workflow_finished, is_workflow_successful, terminal_condition},
};

/// Which of §4.8's seven phases a reconcile pass should (continue to) execute, decided from the
/// application's current status and the revision-gate outcome.
#[derive(Clone, Debug, PartialEq)]
pub enum ReconcileAction {
    /// Phase 2 blocked on the publish-version gate: leave the revision reference unchanged and
    /// report `running` without re-attaching the workflow.
    AwaitPublishVersion,
    /// Phases 3–4: the workflow isn't finished; run (or resume) it, including the dispatch calls
    /// its steps make.
    AdvanceWorkflow,
    /// Phase 7: the workflow just reached terminal success on this pass; invoke garbage
    /// collection once tracking (phase 5) has recorded the dispatched objects.
    RunGarbageCollection,
    /// The workflow reached a terminal failure; nothing left to drive forward this pass.
    Failed,
}

pub fn decide_action(
    snapshot: &SnapshotDecision,
    workflow_just_finished: bool,
    workflow_steps_done: bool,
    workflow_succeeded: bool,
) -> ReconcileAction {
    if matches!(snapshot, SnapshotDecision::GatedByPublishVersion) {
        return ReconcileAction::AwaitPublishVersion;
    }
    if !workflow_steps_done {
        return ReconcileAction::AdvanceWorkflow;
    }
    if workflow_just_finished && workflow_succeeded {
        return ReconcileAction::RunGarbageCollection;
    }
    if !workflow_succeeded {
        return ReconcileAction::Failed;
    }
    ReconcileAction::AdvanceWorkflow
}

/// Aggregates per-component health into the overall `status.phase`, per §4.8 phase 6. A
/// component is unhealthy if its [`crate::template::HealthStatus::healthy`] evaluated false.
pub fn aggregate_phase(
    all_components_healthy: bool,
    workflow_finished: bool,
    workflow_succeeded: bool,
) -> ApplicationPhase {
    if !workflow_finished {
        return ApplicationPhase::Running;
    }
    if !workflow_succeeded {
        return ApplicationPhase::WorkflowFailed;
    }
    if all_components_healthy {
        ApplicationPhase::Running
    } else {
        ApplicationPhase::HealthChecking
    }
}

/// Builds the full `status.conditions` list for this pass: the workflow's terminal condition (if
/// any) plus a `Dispatched`/`ApplyConflict` condition summarizing per-cluster dispatch outcomes.
pub fn build_conditions(
    steps: &[crate::crd::workflow::WorkflowStep],
    states: &HashMap<String, StepState>,
    dispatch_outcomes: &[DispatchOutcome],
) -> Vec<ApplicationCondition> {
    let mut conditions = Vec::new();

    if let Some(condition) = terminal_condition(steps, states) {
        conditions.push(condition);
    }

    if dispatch_outcomes
        .iter()
        .any(|outcome| matches!(outcome, DispatchOutcome::ApplyConflict))
    {
        conditions.push(ApplicationCondition {
            type_: "ApplyConflict".into(),
            status: ConditionStatus::True,
            reason: "ApplyConflict".into(),
            message: Some("one or more resources could not be applied after a retry".into()),
            last_transition_time: None,
        });
    } else if is_workflow_successful(steps, states) {
        conditions.push(ApplicationCondition {
            type_: "Dispatched".into(),
            status: ConditionStatus::True,
            reason: "Dispatched".into(),
            message: None,
            last_transition_time: None,
        });
    }

    conditions
}

/// Whether phase 7 (GC) should actually run this pass: only once the workflow is terminal-success
/// and tracking (phase 5) has happened, matching "if workflow terminal-success, invoke §4.7".
pub fn should_run_gc(steps: &[crate::crd::workflow::WorkflowStep], states: &HashMap<String, StepState>, error_retry_times: u32) -> bool {
    is_workflow_finished(steps, states, error_retry_times) && is_workflow_successful(steps, states)
}

/// §5's conflict-handling rule: a bounded number of optimistic-concurrency retries on the status
/// subresource write before deferring to the next reconcile.
pub fn should_retry_status_conflict(attempt: u32, max_attempts: u32) -> bool {
    attempt < max_attempts
}

/// Deletion-triggered reconcile (§4.7's `enableResourceTrackerDeleteOnlyTrigger`): whether a
/// watch event on a `ResourceTracker` should enqueue its owning `Application`.
pub fn should_requeue_on_tracker_delete(enabled: bool, event_is_delete: bool) -> bool {
    enabled && event_is_delete
}

/// Deduplicates the owning-application names a batch of tracker-delete events names, so the
/// controller enqueues each affected application at most once per reconcile tick.
pub fn owners_to_requeue(owning_applications: impl IntoIterator<Item = String>) -> HashSet<String> {
    owning_applications.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_version_gate_takes_priority_over_everything_else() {
        let action = decide_action(&SnapshotDecision::GatedByPublishVersion, true, true, true);
        assert_eq!(action, ReconcileAction::AwaitPublishVersion);
    }

    #[test]
    fn unfinished_workflow_keeps_advancing() {
        let action = decide_action(&SnapshotDecision::Unchanged, false, false, false);
        assert_eq!(action, ReconcileAction::AdvanceWorkflow);
    }

    #[test]
    fn freshly_succeeded_workflow_triggers_gc() {
        let action = decide_action(&SnapshotDecision::Unchanged, true, true, true);
        assert_eq!(action, ReconcileAction::RunGarbageCollection);
    }

    #[test]
    fn terminally_failed_workflow_reports_failed() {
        let action = decide_action(&SnapshotDecision::Unchanged, false, true, false);
        assert_eq!(action, ReconcileAction::Failed);
    }

    #[test]
    fn phase_is_running_until_workflow_finishes() {
        assert_eq!(aggregate_phase(true, false, false), ApplicationPhase::Running);
    }

    #[test]
    fn phase_is_workflow_failed_when_workflow_did_not_succeed() {
        assert_eq!(aggregate_phase(true, true, false), ApplicationPhase::WorkflowFailed);
    }

    #[test]
    fn phase_reports_health_checking_when_a_component_is_unhealthy_despite_workflow_success() {
        assert_eq!(aggregate_phase(false, true, true), ApplicationPhase::HealthChecking);
    }

    #[test]
    fn apply_conflict_dispatch_outcome_surfaces_as_a_condition() {
        let conditions = build_conditions(&[], &HashMap::new(), &[DispatchOutcome::ApplyConflict]);
        assert!(conditions.iter().any(|c| c.type_ == "ApplyConflict"));
    }

    #[test]
    fn tracker_delete_only_requeues_when_the_optimization_is_enabled() {
        assert!(should_requeue_on_tracker_delete(true, true));
        assert!(!should_requeue_on_tracker_delete(false, true));
        assert!(!should_requeue_on_tracker_delete(true, false));
    }

    #[test]
    fn owners_to_requeue_deduplicates() {
        let owners = owners_to_requeue(vec!["a".to_owned(), "b".to_owned(), "a".to_owned()]);
        assert_eq!(owners.len(), 2);
    }
}
