//! Computes the garbage-collection plan described by the controller's `ResourceTracker` design:
//! diff the current/root trackers against historical ones, and decide, per stale resource,
//! whether to delete it outright, release a shared claim, or leave it untouched.
//!
//! This module is pure: it never talks to a cluster. [`crate::dispatch`] (or an equivalent
//! dispatcher) executes the plan this module produces.

use std::collections::{BTreeSet, HashMap};

use crate::crd::resource_tracker::{ManagedResource, ResourceTrackerSpec, TrackerKind};

type ResourceKey = (String, String, String, Option<String>, String);

/// What to do with one stale resource found during a GC pass.
#[derive(Clone, Debug, PartialEq)]
pub enum GcAction {
    /// Delete the resource outright; it isn't shared and isn't flagged `skipGC`.
    Delete(ManagedResource),
    /// Remove `application` from the resource's `sharedBy` list; the resource itself survives
    /// because other applications still claim it.
    ReleaseShare {
        resource: ManagedResource,
        application: String,
    },
    /// Delete the resource; it was shared, but `application` was its last owner.
    DeleteLastSharedOwner(ManagedResource),
}

/// The outcome of a single GC pass: resources to act on, plus which now-empty historical
/// trackers can be deleted outright.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GcPlan {
    pub actions: Vec<GcAction>,
    pub empty_historical_trackers: Vec<String>,
}

/// `live = union(current tracker, root tracker)`.
pub fn live_resources(trackers: &[(String, ResourceTrackerSpec)]) -> HashMap<ResourceKey, ManagedResource> {
    trackers
        .iter()
        .filter(|(_, tracker)| tracker.is_live())
        .flat_map(|(_, tracker)| tracker.managed_resources.iter())
        .map(|resource| (resource.identity_key(), resource.clone()))
        .collect()
}

/// Computes the full GC plan for one application: `stale = union(historical) - live`, then
/// classifies each stale resource per the shared-resource/skip-GC rules.
///
/// `owning_application` identifies which application is doing the collecting, needed to know
/// whose claim to release from a shared resource's `sharedBy` list.
pub fn plan(
    owning_application: &str,
    trackers: &[(String, ResourceTrackerSpec)],
) -> GcPlan {
    let live = live_resources(trackers);
    let live_keys: BTreeSet<ResourceKey> = live.keys().cloned().collect();

    let mut seen_stale: BTreeSet<ResourceKey> = BTreeSet::new();
    let mut actions = Vec::new();
    let mut empty_historical_trackers = Vec::new();

    for (tracker_name, tracker) in trackers {
        if tracker.kind != TrackerKind::Historical {
            continue;
        }

        let mut still_has_resources = false;
        for resource in &tracker.managed_resources {
            let key = resource.identity_key();
            if live_keys.contains(&key) {
                // Still referenced by a live tracker; this historical entry is itself the stale
                // candidate for removal once the historical tracker it lives in is pruned, but
                // the resource must not be deleted from the cluster.
                continue;
            }

            still_has_resources = true;

            if !seen_stale.insert(key) {
                continue;
            }

            if resource.skip_gc {
                continue;
            }

            if resource.shared_by.is_empty() {
                actions.push(GcAction::Delete(resource.clone()));
            } else if resource.shared_by.len() == 1
                && resource.shared_by[0] == owning_application
            {
                actions.push(GcAction::DeleteLastSharedOwner(resource.clone()));
            } else if resource.shared_by.contains(&owning_application.to_owned()) {
                actions.push(GcAction::ReleaseShare {
                    resource: resource.clone(),
                    application: owning_application.to_owned(),
                });
            }
        }

        if !still_has_resources {
            empty_historical_trackers.push(tracker_name.clone());
        }
    }

    GcPlan {
        actions,
        empty_historical_trackers,
    }
}

/// The probabilistic mark gate: a coin flip with `probability` chance of entering the mark
/// (i.e. GC) phase on a given reconcile, used to amortize GC cost across hot reconcile loops.
/// Always returns `true` when `force` is set (the current tracker just rolled, or a test wants a
/// deterministic mark).
pub fn should_mark(probability: f64, roll: f64, force: bool) -> bool {
    force || roll < probability
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource(name: &str, shared_by: Vec<&str>) -> ManagedResource {
        ManagedResource {
            cluster: "local".into(),
            api_version: "v1".into(),
            kind: "ConfigMap".into(),
            namespace: Some("default".into()),
            name: name.into(),
            component: Some("web".into()),
            raw: serde_json::json!({}),
            skip_gc: false,
            shared_by: shared_by.into_iter().map(str::to_owned).collect(),
        }
    }

    fn tracker(kind: TrackerKind, resources: Vec<ManagedResource>) -> ResourceTrackerSpec {
        ResourceTrackerSpec {
            application_name: "app".into(),
            application_namespace: "default".into(),
            kind,
            application_revision: Some("app-v1".into()),
            managed_resources: resources,
        }
    }

    #[test]
    fn resource_still_live_is_never_deleted() {
        let live_cm = resource("cm", vec![]);
        let trackers = vec![
            ("app-current".into(), tracker(TrackerKind::Current, vec![live_cm.clone()])),
            ("app-v1".into(), tracker(TrackerKind::Historical, vec![live_cm])),
        ];

        let plan = plan("app", &trackers);
        assert!(plan.actions.is_empty());
    }

    #[test]
    fn unshared_stale_resource_is_deleted() {
        let stale = resource("old-cm", vec![]);
        let trackers = vec![
            ("app-current".into(), tracker(TrackerKind::Current, vec![])),
            ("app-v1".into(), tracker(TrackerKind::Historical, vec![stale.clone()])),
        ];

        let plan = plan("app", &trackers);
        assert_eq!(plan.actions, vec![GcAction::Delete(stale)]);
        assert_eq!(plan.empty_historical_trackers, vec!["app-v1".to_string()]);
    }

    #[test]
    fn shared_resource_with_other_owners_is_released_not_deleted() {
        let shared = resource("shared-cm", vec!["app", "other-app"]);
        let trackers = vec![
            ("app-current".into(), tracker(TrackerKind::Current, vec![])),
            ("app-v1".into(), tracker(TrackerKind::Historical, vec![shared.clone()])),
        ];

        let plan = plan("app", &trackers);
        assert_eq!(
            plan.actions,
            vec![GcAction::ReleaseShare {
                resource: shared,
                application: "app".into(),
            }]
        );
    }

    #[test]
    fn shared_resource_with_last_owner_is_deleted() {
        let shared = resource("shared-cm", vec!["app"]);
        let trackers = vec![
            ("app-current".into(), tracker(TrackerKind::Current, vec![])),
            ("app-v1".into(), tracker(TrackerKind::Historical, vec![shared.clone()])),
        ];

        let plan = plan("app", &trackers);
        assert_eq!(plan.actions, vec![GcAction::DeleteLastSharedOwner(shared)]);
    }

    #[test]
    fn skip_gc_resource_is_left_alone() {
        let mut skipped = resource("keep-me", vec![]);
        skipped.skip_gc = true;
        let trackers = vec![
            ("app-current".into(), tracker(TrackerKind::Current, vec![])),
            ("app-v1".into(), tracker(TrackerKind::Historical, vec![skipped])),
        ];

        let plan = plan("app", &trackers);
        assert!(plan.actions.is_empty());
        // The tracker still "has resources" from the perspective of not being empty yet.
        assert!(plan.empty_historical_trackers.is_empty());
    }

    #[test]
    fn should_mark_is_forced_or_probabilistic() {
        assert!(should_mark(0.1, 0.5, true));
        assert!(should_mark(0.5, 0.1, false));
        assert!(!should_mark(0.1, 0.5, false));
    }
}
