//! Resolves a `Definition` name (optionally pinned to a revision) to the immutable
//! `DefinitionRevision` the renderer should use, and maintains the revision index as admins edit
//! `Definition` objects.

use sha2::{Digest, Sha256};
use snafu::Snafu;

use crate::crd::{
    definition_revision::DefinitionRevisionSpec,
    definitions::{DefinitionStatus, DefinitionType, Schematic},
};

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("no DefinitionRevision found for {definition_type} {name:?}"))]
    DefinitionNotFound {
        definition_type: DefinitionType,
        name: String,
    },

    #[snafu(display(
        "{definition_type} {name:?} has no revisions yet but an exact version {revision} was requested"
    ))]
    RevisionNotFound {
        definition_type: DefinitionType,
        name: String,
        revision: u64,
    },
}

/// Either "give me the latest revision" or "give me exactly this one", the two forms a component
/// or trait reference may pin a definition to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VersionSelector {
    Latest,
    Exact(u64),
}

/// Computes the stable content hash the registry uses to decide whether editing a `Definition`
/// warrants a new revision: an 8-byte (16 hex character) prefix of the SHA-256 digest over the
/// normalized template source and parameter schema, matching
/// [`DefinitionRevisionSpec::revision_hash`]'s documented contract.
pub fn content_hash(schematic: &Schematic, parameter: &serde_json::Value) -> String {
    let mut hasher = Sha256::new();
    hasher.update(schematic.cue.template.trim().as_bytes());
    hasher.update([0u8]);
    // `serde_json::Value` already normalizes key order for objects via `BTreeMap` when the
    // `preserve_order` feature is off, so hashing its canonical string form is stable.
    hasher.update(parameter.to_string().as_bytes());
    let full_hex = format!("{:x}", hasher.finalize());
    full_hex[..16].to_owned()
}

/// Resolves `(type, name, optionalVersion)` against the revisions known for that definition,
/// selecting the highest `revision` for [`VersionSelector::Latest`] or failing with
/// [`Error::RevisionNotFound`]/[`Error::DefinitionNotFound`] otherwise.
///
/// `revisions` is expected to already be scoped to the given `definition_type`/`name` (the
/// caller lists `DefinitionRevision` objects via a field selector before calling this).
pub fn resolve<'a>(
    definition_type: DefinitionType,
    name: &str,
    selector: VersionSelector,
    revisions: &'a [DefinitionRevisionSpec],
) -> Result<&'a DefinitionRevisionSpec, Error> {
    match selector {
        VersionSelector::Latest => revisions
            .iter()
            .max_by_key(|revision| revision.revision)
            .ok_or_else(|| {
                DefinitionNotFoundSnafu {
                    definition_type,
                    name: name.to_owned(),
                }
                .build()
            }),
        VersionSelector::Exact(wanted) => revisions
            .iter()
            .find(|revision| revision.revision == wanted)
            .ok_or_else(|| {
                RevisionNotFoundSnafu {
                    definition_type,
                    name: name.to_owned(),
                    revision: wanted,
                }
                .build()
            }),
    }
}

/// Decides what to do with a freshly-observed `Definition` edit: whether a new
/// `DefinitionRevision` is warranted, and if so, what its `revision`/`revisionHash` should be.
///
/// `latest` is the current highest-numbered revision for this definition, if any.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RevisionDecision {
    /// The new content hashes the same as `latest`; nothing to do.
    Unchanged,
    /// Content changed (or no revision exists yet); create `<name>-v<revision>` with this hash.
    CreateRevision { revision: u64, hash: String },
}

pub fn decide_revision(
    latest: Option<&DefinitionRevisionSpec>,
    schematic: &Schematic,
    parameter: &serde_json::Value,
) -> RevisionDecision {
    let hash = content_hash(schematic, parameter);
    match latest {
        Some(latest) if latest.revision_hash == hash => RevisionDecision::Unchanged,
        Some(latest) => RevisionDecision::CreateRevision {
            revision: latest.revision + 1,
            hash,
        },
        None => RevisionDecision::CreateRevision { revision: 1, hash },
    }
}

/// Which historical revisions may be pruned once the index exceeds `definitionRevisionLimit`:
/// the oldest ones first, but never the current `latest` revision nor any revision named in
/// `referenced` (still cited by a live `ApplicationRevision`).
pub fn prune_candidates<'a>(
    revisions: &'a [DefinitionRevisionSpec],
    limit: usize,
    referenced: &'a std::collections::HashSet<u64>,
) -> Vec<&'a DefinitionRevisionSpec> {
    if revisions.len() <= limit {
        return Vec::new();
    }

    let mut sorted: Vec<&DefinitionRevisionSpec> = revisions.iter().collect();
    sorted.sort_by_key(|revision| revision.revision);

    let keep_newest = limit.saturating_sub(1);
    let protected_cutoff = sorted.len().saturating_sub(keep_newest);

    sorted[..protected_cutoff]
        .iter()
        .copied()
        .filter(|revision| !referenced.contains(&revision.revision))
        .collect()
}

/// Builds a [`DefinitionRevisionSpec`] for a freshly-decided revision, carrying over the
/// definition's current status/parameter schema.
pub fn build_revision(
    definition_type: DefinitionType,
    definition_name: &str,
    revision: u64,
    hash: String,
    schematic: Schematic,
    status: DefinitionStatus,
    parameter: serde_json::Value,
) -> DefinitionRevisionSpec {
    DefinitionRevisionSpec {
        definition_name: definition_name.to_owned(),
        definition_type,
        revision,
        revision_hash: hash,
        schematic,
        status,
        parameter,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::crd::definitions::CueSchematic;

    fn schematic(template: &str) -> Schematic {
        Schematic {
            cue: CueSchematic {
                template: template.to_owned(),
            },
        }
    }

    fn revision(revision: u64, hash: &str) -> DefinitionRevisionSpec {
        DefinitionRevisionSpec {
            definition_name: "webservice".into(),
            definition_type: DefinitionType::Component,
            revision,
            revision_hash: hash.into(),
            schematic: schematic("output: {}"),
            status: DefinitionStatus::default(),
            parameter: serde_json::json!({}),
        }
    }

    #[test]
    fn content_hash_is_stable_and_order_independent() {
        let a = content_hash(&schematic("output: {}"), &serde_json::json!({"a": 1, "b": 2}));
        let b = content_hash(&schematic("output: {}"), &serde_json::json!({"b": 2, "a": 1}));
        assert_eq!(a, b);

        let c = content_hash(&schematic("output: {replicas: 1}"), &serde_json::json!({}));
        assert_ne!(a, c);
    }

    #[test]
    fn content_hash_is_an_8_byte_hex_string() {
        let hash = content_hash(&schematic("output: {}"), &serde_json::json!({"a": 1}));
        assert_eq!(hash.len(), 16);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn resolve_latest_picks_highest_revision() {
        let revisions = vec![revision(1, "h1"), revision(3, "h3"), revision(2, "h2")];
        let resolved = resolve(
            DefinitionType::Component,
            "webservice",
            VersionSelector::Latest,
            &revisions,
        )
        .unwrap();
        assert_eq!(resolved.revision, 3);
    }

    #[test]
    fn resolve_exact_missing_version_fails() {
        let revisions = vec![revision(1, "h1")];
        let err = resolve(
            DefinitionType::Component,
            "webservice",
            VersionSelector::Exact(9),
            &revisions,
        )
        .unwrap_err();
        assert!(matches!(err, Error::RevisionNotFound { revision: 9, .. }));
    }

    #[test]
    fn decide_revision_no_op_on_matching_hash() {
        let schematic = schematic("output: {}");
        let parameter = serde_json::json!({});
        let hash = content_hash(&schematic, &parameter);
        let latest = revision(1, &hash);

        assert_eq!(
            decide_revision(Some(&latest), &schematic, &parameter),
            RevisionDecision::Unchanged
        );
    }

    #[test]
    fn decide_revision_bumps_on_changed_hash() {
        let latest = revision(4, "stale-hash");
        let decision = decide_revision(Some(&latest), &schematic("output: {replicas: 2}"), &serde_json::json!({}));
        assert_eq!(
            decision,
            RevisionDecision::CreateRevision {
                revision: 5,
                hash: content_hash(&schematic("output: {replicas: 2}"), &serde_json::json!({})),
            }
        );
    }

    #[test]
    fn decide_revision_starts_at_one_with_no_prior() {
        let decision = decide_revision(None, &schematic("output: {}"), &serde_json::json!({}));
        assert_eq!(
            decision,
            RevisionDecision::CreateRevision {
                revision: 1,
                hash: content_hash(&schematic("output: {}"), &serde_json::json!({})),
            }
        );
    }

    #[test]
    fn prune_keeps_newest_and_referenced() {
        let revisions: Vec<_> = (1..=5).map(|n| revision(n, "h")).collect();
        let mut referenced = HashSet::new();
        referenced.insert(2);

        let candidates = prune_candidates(&revisions, 3, &referenced);
        let pruned: Vec<u64> = candidates.iter().map(|r| r.revision).collect();

        // Limit 3 keeps revisions 3,4,5 by default; 1 and 2 are candidates, but 2 is referenced.
        assert_eq!(pruned, vec![1]);
    }

    #[test]
    fn prune_is_noop_under_the_limit() {
        let revisions: Vec<_> = (1..=3).map(|n| revision(n, "h")).collect();
        assert!(prune_candidates(&revisions, 20, &HashSet::new()).is_empty());
    }
}
