//! Decides whether an `Application` reconcile should freeze a new `ApplicationRevision`, and
//! which revisions are safe to prune.
//!
//! Grounded on the same content-hash-gated snapshot idea as [`crate::registry`]'s revision
//! creation for `Definition`s, applied one layer up at the whole-application scope.

use std::collections::HashSet;

use sha2::{Digest, Sha256};

use crate::crd::{
    application::ApplicationSpec, application_revision::ApplicationRevisionSpec,
    definition_revision::DefinitionRevisionSpec,
};

/// Inputs the snapshot-trigger decision depends on, per §4.4: the application spec itself, the
/// resolved `DefinitionRevision` identities, and the content of any externally referenced
/// Policy/Workflow object.
pub struct SnapshotInputs<'a> {
    pub application: &'a ApplicationSpec,
    pub resolved_definitions: &'a [DefinitionRevisionSpec],
    pub external_content_hash: &'a str,
    pub publish_version: Option<&'a str>,
}

/// Computes the stable content hash an [`ApplicationRevisionSpec::content_hash`] stores, so a
/// later reconcile can tell whether anything changed without re-rendering.
pub fn content_hash(inputs: &SnapshotInputs<'_>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(serde_json::to_vec(inputs.application).unwrap_or_default());
    for definition in inputs.resolved_definitions {
        hasher.update(definition.definition_name.as_bytes());
        hasher.update([0u8]);
        hasher.update(definition.revision.to_le_bytes());
        hasher.update(definition.revision_hash.as_bytes());
    }
    hasher.update(inputs.external_content_hash.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Whether a new revision should be created, and if not, why — the publish-version gate from
/// §4.4 is the only case that suppresses a snapshot despite changed content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SnapshotDecision {
    /// No revision exists yet, or the publish-version annotation changed, or (with no annotation
    /// in use) the content hash changed: freeze `revision`.
    CreateRevision { revision: u64 },
    /// Content changed, but a `publishVersion` annotation is in effect and didn't change: the
    /// edit doesn't take effect yet.
    GatedByPublishVersion,
    /// Nothing relevant changed.
    Unchanged,
}

pub fn decide_snapshot(
    current: Option<&ApplicationRevisionSpec>,
    inputs: &SnapshotInputs<'_>,
) -> SnapshotDecision {
    let Some(current) = current else {
        return SnapshotDecision::CreateRevision { revision: 1 };
    };

    let hash = content_hash(inputs);
    let content_changed = current.content_hash != hash;

    match (inputs.publish_version, &current.publish_version) {
        (Some(incoming), Some(recorded)) if incoming == recorded => {
            // Annotation present and unchanged: content edits don't take effect yet, no matter
            // what else changed.
            SnapshotDecision::GatedByPublishVersion
        }
        (Some(_), _) => {
            // Annotation present and changed (or newly added): always snapshot, matching the
            // "changes take effect only on annotation change" rule.
            SnapshotDecision::CreateRevision {
                revision: current.revision + 1,
            }
        }
        (None, _) if content_changed => SnapshotDecision::CreateRevision {
            revision: current.revision + 1,
        },
        (None, _) => SnapshotDecision::Unchanged,
    }
}

/// Which historical `ApplicationRevision`s may be pruned once the count exceeds
/// `applicationRevisionLimit`: oldest first, never `current_revision` nor any revision named in
/// `tracked_by_live_resource_tracker`.
pub fn prune_candidates<'a>(
    revisions: &'a [ApplicationRevisionSpec],
    limit: usize,
    current_revision: u64,
    tracked_by_live_resource_tracker: &'a HashSet<u64>,
) -> Vec<&'a ApplicationRevisionSpec> {
    if revisions.len() <= limit {
        return Vec::new();
    }

    let mut sorted: Vec<&ApplicationRevisionSpec> = revisions.iter().collect();
    sorted.sort_by_key(|revision| revision.revision);

    let keep_newest = limit.saturating_sub(1);
    let protected_cutoff = sorted.len().saturating_sub(keep_newest);

    sorted[..protected_cutoff]
        .iter()
        .copied()
        .filter(|revision| {
            revision.revision != current_revision
                && !tracked_by_live_resource_tracker.contains(&revision.revision)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn application() -> ApplicationSpec {
        ApplicationSpec {
            components: vec![],
            policies: vec![],
            workflow: None,
        }
    }

    fn inputs(application: &ApplicationSpec, publish_version: Option<&str>) -> SnapshotInputs<'_> {
        SnapshotInputs {
            application,
            resolved_definitions: &[],
            external_content_hash: "none",
            publish_version,
        }
    }

    fn revision_with(content_hash: &str, publish_version: Option<&str>, revision: u64) -> ApplicationRevisionSpec {
        ApplicationRevisionSpec {
            application_name: "app".into(),
            revision,
            publish_version: publish_version.map(str::to_owned),
            application: application(),
            resolved_definitions: vec![],
            external_policies: vec![],
            external_workflow: None,
            content_hash: content_hash.into(),
        }
    }

    #[test]
    fn no_existing_revision_always_creates_the_first_one() {
        let app = application();
        let decision = decide_snapshot(None, &inputs(&app, None));
        assert_eq!(decision, SnapshotDecision::CreateRevision { revision: 1 });
    }

    #[test]
    fn without_publish_version_any_content_change_snapshots() {
        let app = application();
        let current = revision_with("old-hash", None, 3);
        let decision = decide_snapshot(Some(&current), &inputs(&app, None));
        assert_eq!(decision, SnapshotDecision::CreateRevision { revision: 4 });
    }

    #[test]
    fn unchanged_content_without_publish_version_is_a_no_op() {
        let app = application();
        let hash = content_hash(&inputs(&app, None));
        let current = revision_with(&hash, None, 3);
        let decision = decide_snapshot(Some(&current), &inputs(&app, None));
        assert_eq!(decision, SnapshotDecision::Unchanged);
    }

    #[test]
    fn unchanged_publish_version_gates_content_changes() {
        let app = application();
        let current = revision_with("old-hash", Some("v1"), 3);
        let decision = decide_snapshot(Some(&current), &inputs(&app, Some("v1")));
        assert_eq!(decision, SnapshotDecision::GatedByPublishVersion);
    }

    #[test]
    fn publish_version_change_always_snapshots() {
        let app = application();
        let current = revision_with("same-hash", Some("v1"), 3);
        let hash = content_hash(&inputs(&app, Some("v2")));
        let current = revision_with(&hash, Some("v1"), current.revision);
        let decision = decide_snapshot(Some(&current), &inputs(&app, Some("v2")));
        assert_eq!(decision, SnapshotDecision::CreateRevision { revision: 4 });
    }

    #[test]
    fn prune_protects_current_and_live_tracked_revisions() {
        let revisions: Vec<_> = (1..=5).map(|n| revision_with("h", None, n)).collect();
        let mut tracked = HashSet::new();
        tracked.insert(2);

        let candidates = prune_candidates(&revisions, 3, 5, &tracked);
        let pruned: Vec<u64> = candidates.iter().map(|r| r.revision).collect();
        assert_eq!(pruned, vec![1]);
    }
}
