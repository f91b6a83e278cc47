//! The per-step state machine, backoff computation, and DAG/step-by-step sequencing rules
//! described by the workflow executor design. This module is pure: it decides *what should
//! happen next* given the current step statuses; the controller's reconcile loop is responsible
//! for actually running a step's side effect (a `deploy`, an `apply-component`, ...) and feeding
//! the resulting [`StepOutcome`] back in.

use std::{
    collections::{HashMap, HashSet},
    time::Duration,
};

use crate::crd::{
    application::ApplicationCondition,
    workflow::{StepPhase, WorkflowMode, WorkflowStep},
};

/// What running a step's side effect reported back to the executor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    Ok,
    Fail,
    Wait,
    Skip,
    Suspend,
    Terminate,
}

/// Tracked state for one step across reconciles: its phase plus the counters backoff needs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StepState {
    pub phase: StepPhase,
    pub attempts_since_transition: u32,
    pub total_attempts: u32,
}

impl StepState {
    /// Applies one [`StepOutcome`] to the current state, per the documented transition table.
    /// Whether a `fail` outcome is still retryable is decided separately by
    /// [`StepState::retries_exhausted`], since that depends on the step's `errorRetryTimes`.
    pub fn apply(&self, outcome: StepOutcome) -> StepState {
        match (self.phase, outcome) {
            (_, StepOutcome::Ok) => StepState {
                phase: StepPhase::Succeeded,
                attempts_since_transition: 0,
                total_attempts: self.total_attempts + 1,
            },
            (_, StepOutcome::Skip) => StepState {
                phase: StepPhase::Skipped,
                attempts_since_transition: 0,
                total_attempts: self.total_attempts,
            },
            (_, StepOutcome::Suspend) => StepState {
                phase: StepPhase::Suspending,
                attempts_since_transition: self.attempts_since_transition,
                total_attempts: self.total_attempts,
            },
            (_, StepOutcome::Terminate) => StepState {
                phase: StepPhase::Terminated,
                attempts_since_transition: self.attempts_since_transition,
                total_attempts: self.total_attempts,
            },
            (_, StepOutcome::Wait) => StepState {
                phase: StepPhase::Waiting,
                attempts_since_transition: self.attempts_since_transition + 1,
                total_attempts: self.total_attempts + 1,
            },
            (_, StepOutcome::Fail) => StepState {
                phase: StepPhase::Failed,
                attempts_since_transition: self.attempts_since_transition + 1,
                total_attempts: self.total_attempts + 1,
            },
        }
    }

    /// Whether this step has exhausted its retries and will not be attempted again on its own.
    pub fn retries_exhausted(&self, error_retry_times: u32) -> bool {
        self.phase == StepPhase::Failed && self.total_attempts >= error_retry_times
    }

    /// `min(2^(attempts - 1) * base, max)`, the shared shape of both the `wait` and `fail`
    /// backoff formulas; callers pass the formula-specific base/max. `attempts_since_transition`
    /// is already incremented by [`StepState::apply`] before this runs, so the first wait/fail
    /// (`attempts_since_transition == 1`) must back off by `1 * base`, not `2 * base`.
    pub fn backoff(&self, base: Duration, max: Duration) -> Duration {
        let exponent = self.attempts_since_transition.saturating_sub(1).min(32);
        let scaled = base.saturating_mul(1u32.checked_shl(exponent).unwrap_or(u32::MAX));
        scaled.min(max)
    }
}

/// A step is ready to run once every step named in `depends_on` is terminal-success or skipped.
pub fn dependencies_satisfied(step: &WorkflowStep, states: &HashMap<String, StepState>) -> bool {
    step.depends_on.iter().all(|dependency| {
        states
            .get(dependency)
            .is_some_and(|state| matches!(state.phase, StepPhase::Succeeded | StepPhase::Skipped))
    })
}

/// Which steps are eligible to run *right now*, given `mode` and the current `states`.
///
/// - `StepByStep`: at most one step runs at a time — the first pending step (in declaration
///   order) whose dependencies are satisfied.
/// - `DAG`: every pending step whose dependencies are satisfied runs concurrently.
pub fn runnable_steps<'a>(
    steps: &'a [WorkflowStep],
    mode: WorkflowMode,
    states: &HashMap<String, StepState>,
) -> Vec<&'a WorkflowStep> {
    let is_pending = |step: &WorkflowStep| {
        states
            .get(&step.name)
            .map(|state| state.phase == StepPhase::Pending)
            .unwrap_or(true)
    };

    match mode {
        WorkflowMode::StepByStep => steps
            .iter()
            .find(|step| is_pending(step) && dependencies_satisfied(step, states))
            .into_iter()
            .collect(),
        WorkflowMode::Dag => steps
            .iter()
            .filter(|step| is_pending(step) && dependencies_satisfied(step, states))
            .collect(),
    }
}

/// Whether the whole workflow has reached a terminal outcome: every step is in a terminal phase,
/// or an unretryable `failed` step blocks the rest.
pub fn is_workflow_finished(
    steps: &[WorkflowStep],
    states: &HashMap<String, StepState>,
    error_retry_times: u32,
) -> bool {
    steps.iter().all(|step| {
        states.get(&step.name).is_some_and(|state| {
            state.phase.is_terminal() || state.retries_exhausted(error_retry_times)
        })
    })
}

/// Whether the workflow terminated in overall success: every step reached a terminal-success
/// state (`succeeded` or `skipped`), none `failed`/`terminated`.
pub fn is_workflow_successful(steps: &[WorkflowStep], states: &HashMap<String, StepState>) -> bool {
    steps.iter().all(|step| {
        states
            .get(&step.name)
            .is_some_and(|state| matches!(state.phase, StepPhase::Succeeded | StepPhase::Skipped))
    })
}

/// §4.5's "parallel steps must not write overlapping output keys" rule: given the set of output
/// keys each concurrently-run step declares, returns the keys more than one step writes.
pub fn detect_output_key_collisions<'a>(
    concurrent_steps: &[(&'a str, &'a [String])],
) -> Vec<&'a str> {
    let mut seen: HashMap<&str, &str> = HashMap::new();
    let mut collisions = HashSet::new();

    for (step_name, keys) in concurrent_steps {
        for key in *keys {
            if let Some(&owner) = seen.get(key.as_str()) {
                if owner != *step_name {
                    collisions.insert(key.as_str());
                }
            } else {
                seen.insert(key.as_str(), step_name);
            }
        }
    }

    collisions.into_iter().collect()
}

/// Builds the `Workflow*`/`WorkflowTerminated`/`WorkflowFailed` condition for
/// `status.conditions` once the workflow reaches a terminal outcome.
pub fn terminal_condition(steps: &[WorkflowStep], states: &HashMap<String, StepState>) -> Option<ApplicationCondition> {
    use crate::crd::application::ConditionStatus;

    if is_workflow_successful(steps, states) {
        return None;
    }

    let failed_step = steps.iter().find(|step| {
        states
            .get(&step.name)
            .is_some_and(|state| state.phase == StepPhase::Failed)
    });
    let terminated_step = steps.iter().find(|step| {
        states
            .get(&step.name)
            .is_some_and(|state| state.phase == StepPhase::Terminated)
    });

    if let Some(step) = terminated_step {
        return Some(ApplicationCondition {
            type_: "WorkflowTerminated".into(),
            status: ConditionStatus::True,
            reason: "WorkflowTerminated".into(),
            message: Some(format!("workflow terminated at step {:?}", step.name)),
            last_transition_time: None,
        });
    }

    failed_step.map(|step| ApplicationCondition {
        type_: "WorkflowFailed".into(),
        status: ConditionStatus::True,
        reason: "WorkflowFailed".into(),
        message: Some(format!("step {:?} failed after exhausting retries", step.name)),
        last_transition_time: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(name: &str, depends_on: Vec<&str>) -> WorkflowStep {
        WorkflowStep {
            name: name.to_owned(),
            type_: "apply-component".into(),
            properties: serde_json::Value::Null,
            if_condition: None,
            timeout: None,
            depends_on: depends_on.into_iter().map(str::to_owned).collect(),
            inputs: vec![],
            outputs: vec![],
            sub_steps: vec![],
        }
    }

    #[test]
    fn ok_outcome_marks_succeeded_and_resets_attempts() {
        let state = StepState {
            phase: StepPhase::Running,
            attempts_since_transition: 2,
            total_attempts: 2,
        };
        let next = state.apply(StepOutcome::Ok);
        assert_eq!(next.phase, StepPhase::Succeeded);
        assert_eq!(next.attempts_since_transition, 0);
    }

    #[test]
    fn fail_outcome_is_terminal_once_retries_exhausted() {
        let mut state = StepState::default();
        for _ in 0..3 {
            state = state.apply(StepOutcome::Fail);
        }
        assert_eq!(state.phase, StepPhase::Failed);
        assert!(state.retries_exhausted(3));
    }

    #[test]
    fn wait_backoff_doubles_and_caps_at_max() {
        let mut state = StepState::default();
        let base = Duration::from_secs(1);
        let max = Duration::from_secs(60);

        let expected = [1u64, 2, 4, 8, 16];
        for expected_secs in expected {
            state = state.apply(StepOutcome::Wait);
            assert_eq!(state.backoff(base, max), Duration::from_secs(expected_secs));
        }

        for _ in 0..10 {
            state = state.apply(StepOutcome::Wait);
        }
        assert_eq!(state.backoff(base, max), max);
    }

    #[test]
    fn step_by_step_runs_only_the_first_ready_pending_step() {
        let steps = vec![step("a", vec![]), step("b", vec!["a"])];
        let states = HashMap::new();
        let runnable = runnable_steps(&steps, WorkflowMode::StepByStep, &states);
        assert_eq!(runnable.len(), 1);
        assert_eq!(runnable[0].name, "a");
    }

    #[test]
    fn dag_runs_every_ready_pending_step_concurrently() {
        let steps = vec![step("a", vec![]), step("b", vec![]), step("c", vec!["a"])];
        let states = HashMap::new();
        let runnable = runnable_steps(&steps, WorkflowMode::Dag, &states);
        let names: HashSet<&str> = runnable.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, HashSet::from(["a", "b"]));
    }

    #[test]
    fn dag_waits_for_dependencies_before_running_downstream_step() {
        let steps = vec![step("a", vec![]), step("b", vec!["a"])];
        let mut states = HashMap::new();
        states.insert(
            "a".to_owned(),
            StepState {
                phase: StepPhase::Succeeded,
                ..Default::default()
            },
        );
        let runnable = runnable_steps(&steps, WorkflowMode::Dag, &states);
        assert_eq!(runnable.len(), 1);
        assert_eq!(runnable[0].name, "b");
    }

    #[test]
    fn output_key_collision_is_detected_across_steps() {
        let a_keys = vec!["url".to_owned()];
        let b_keys = vec!["url".to_owned(), "port".to_owned()];
        let collisions = detect_output_key_collisions(&[("a", &a_keys), ("b", &b_keys)]);
        assert_eq!(collisions, vec!["url"]);
    }

    #[test]
    fn workflow_finished_requires_every_step_terminal() {
        let steps = vec![step("a", vec![]), step("b", vec![])];
        let mut states = HashMap::new();
        states.insert(
            "a".to_owned(),
            StepState {
                phase: StepPhase::Succeeded,
                ..Default::default()
            },
        );
        assert!(!is_workflow_finished(&steps, &states, 10));

        states.insert(
            "b".to_owned(),
            StepState {
                phase: StepPhase::Skipped,
                ..Default::default()
            },
        );
        assert!(is_workflow_finished(&steps, &states, 10));
        assert!(is_workflow_successful(&steps, &states));
    }
}
