//! Builds [`ApplicationCondition`]s for the error taxonomy described by the controller's error
//! handling design: `Validation`, `Transient`, `Workflow`, `Rendering`, `GC`, `Fatal`.

use crate::crd::application::{ApplicationCondition, ConditionStatus};

/// Implemented by anything that can produce the set of conditions reflecting its current state.
/// Mirrors the pattern used for per-feature condition builders elsewhere in this crate: each
/// builder owns one slice of status and is merged into `status.conditions` by name.
pub trait ConditionBuilder {
    fn build_conditions(&self) -> Vec<ApplicationCondition>;
}

/// The six error categories surfaced in `status.conditions`. Each maps to a stable condition
/// `type` string and a retry disposition enforced by the caller, not by this type.
#[derive(Clone, Copy, Debug, Eq, PartialEq, strum::Display)]
#[strum(serialize_all = "PascalCase")]
pub enum ErrorCategory {
    /// Schema rejection, trait-not-applicable, unresolved reference. Reported, not retried.
    Validation,
    /// Dispatch conflict, read-modify-write race, wait conditions. Retried with backoff.
    Transient,
    /// Step failure after retries exhausted. Terminates the workflow.
    Workflow,
    /// Template evaluation errors, patch conflicts. Surfaced per component.
    Rendering,
    /// Delete conflict, cluster unreachable. Non-fatal; retried on the next GC tick.
    Gc,
    /// Tracker corruption or similar unrecoverable state. Requires operator intervention.
    Fatal,
}

impl ErrorCategory {
    /// Whether the controller should schedule a retry for errors of this category by itself, as
    /// opposed to waiting for the next externally-triggered reconcile (a spec edit, a resync
    /// tick, or operator intervention).
    pub fn is_retryable(self) -> bool {
        matches!(self, ErrorCategory::Transient | ErrorCategory::Gc)
    }
}

/// Builds a single condition reporting `error` under `category`, with a caller-supplied stable
/// `reason` and human-readable `message`.
pub struct ErrorConditionBuilder<'a> {
    pub category: ErrorCategory,
    pub reason: &'a str,
    pub message: String,
}

impl ConditionBuilder for ErrorConditionBuilder<'_> {
    fn build_conditions(&self) -> Vec<ApplicationCondition> {
        vec![ApplicationCondition {
            type_: self.category.to_string(),
            status: ConditionStatus::True,
            reason: self.reason.to_owned(),
            message: Some(self.message.clone()),
            last_transition_time: None,
        }]
    }
}

/// Replaces any existing condition of the same `type_` in `conditions` with `new`, preserving
/// the position of the first match (or appending if absent). This is how `status.conditions`
/// stays a set keyed by `type_` rather than growing unboundedly across reconciles.
pub fn upsert_condition(conditions: &mut Vec<ApplicationCondition>, new: ApplicationCondition) {
    if let Some(existing) = conditions.iter_mut().find(|c| c.type_ == new.type_) {
        *existing = new;
    } else {
        conditions.push(new);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_and_gc_errors_are_retryable() {
        assert!(ErrorCategory::Transient.is_retryable());
        assert!(ErrorCategory::Gc.is_retryable());
        assert!(!ErrorCategory::Validation.is_retryable());
        assert!(!ErrorCategory::Fatal.is_retryable());
    }

    #[test]
    fn upsert_replaces_same_type() {
        let mut conditions = vec![ApplicationCondition {
            type_: "Rendering".into(),
            status: ConditionStatus::True,
            reason: "SchemaRejected".into(),
            message: Some("old".into()),
            last_transition_time: None,
        }];

        upsert_condition(
            &mut conditions,
            ApplicationCondition {
                type_: "Rendering".into(),
                status: ConditionStatus::False,
                reason: "Resolved".into(),
                message: None,
                last_transition_time: None,
            },
        );

        assert_eq!(conditions.len(), 1);
        assert_eq!(conditions[0].reason, "Resolved");
    }
}
