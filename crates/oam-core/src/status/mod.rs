pub mod condition;
pub mod rollout;

use crate::crd::application::{ApplicationPhase, ApplicationStatus, ServiceStatus, WorkflowStatus};

/// Derives `status.phase` from the workflow projection and per-component health, per the
/// controller's phase taxonomy (`rendering`, `running`, `healthChecking`, `workflowSuspending`,
/// `workflowFailed`, `workflowTerminated`, `deleting`).
pub fn aggregate_phase(workflow: Option<&WorkflowStatus>, services: &[ServiceStatus]) -> ApplicationPhase {
    let Some(workflow) = workflow else {
        return ApplicationPhase::Rendering;
    };

    if workflow.terminated {
        return ApplicationPhase::WorkflowTerminated;
    }

    if workflow.suspend {
        return ApplicationPhase::WorkflowSuspending;
    }

    if !workflow.finished {
        return ApplicationPhase::Running;
    }

    let all_failed_steps_exhausted = workflow
        .steps
        .iter()
        .any(|step| step.phase == "failed");
    if all_failed_steps_exhausted {
        return ApplicationPhase::WorkflowFailed;
    }

    if services.iter().all(|service| service.healthy) {
        ApplicationPhase::HealthChecking
    } else {
        ApplicationPhase::Running
    }
}

/// Merges freshly-computed service health into `status.services`, replacing entries by
/// component name so repeated reconciles don't accumulate duplicates.
pub fn merge_service_status(status: &mut ApplicationStatus, fresh: Vec<ServiceStatus>) {
    for service in fresh {
        if let Some(existing) = status
            .services
            .iter_mut()
            .find(|existing| existing.name == service.name)
        {
            *existing = service;
        } else {
            status.services.push(service);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crd::application::WorkflowStepStatus;

    fn healthy_service(name: &str) -> ServiceStatus {
        ServiceStatus {
            name: name.to_owned(),
            healthy: true,
            message: None,
            app_revision: "app-v1".to_owned(),
        }
    }

    #[test]
    fn no_workflow_yet_means_rendering() {
        assert_eq!(aggregate_phase(None, &[]), ApplicationPhase::Rendering);
    }

    #[test]
    fn finished_and_healthy_is_health_checking() {
        let workflow = WorkflowStatus {
            app_revision: "app-v1".into(),
            mode: "StepByStep".into(),
            finished: true,
            suspend: false,
            terminated: false,
            steps: vec![WorkflowStepStatus {
                name: "deploy".into(),
                type_: "apply-component".into(),
                phase: "succeeded".into(),
                message: None,
                reason: None,
            }],
        };

        assert_eq!(
            aggregate_phase(Some(&workflow), &[healthy_service("web")]),
            ApplicationPhase::HealthChecking
        );
    }

    #[test]
    fn a_failed_step_yields_workflow_failed() {
        let workflow = WorkflowStatus {
            app_revision: "app-v1".into(),
            mode: "StepByStep".into(),
            finished: true,
            suspend: false,
            terminated: false,
            steps: vec![WorkflowStepStatus {
                name: "deploy".into(),
                type_: "apply-component".into(),
                phase: "failed".into(),
                message: Some("timed out".into()),
                reason: Some("Timeout".into()),
            }],
        };

        assert_eq!(
            aggregate_phase(Some(&workflow), &[]),
            ApplicationPhase::WorkflowFailed
        );
    }
}
