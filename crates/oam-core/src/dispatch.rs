//! Resolves a topology policy to a cluster set, and decides the per-(cluster, resource) apply
//! outcome, per §4.6. Actually talking to a member cluster's API server is delegated to a
//! caller-supplied [`Applier`]: this module owns cluster-set resolution, conflict-retry
//! sequencing, and double-check comparison, none of which need a live connection to test.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use snafu::{OptionExt, Snafu};

/// The reserved cluster name meaning the control-plane cluster itself.
pub const LOCAL_CLUSTER: &str = "local";

/// One entry of the cluster catalog assembled from gateway-secret-space records and the optional
/// external managed-cluster resource.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClusterCatalogEntry {
    pub name: String,
    pub credential_type: String,
    pub endpoint: String,
    pub alias: Option<String>,
    pub labels: std::collections::BTreeMap<String, String>,
}

impl ClusterCatalogEntry {
    /// The endpoint the dispatcher should actually use: an empty catalog endpoint, or a
    /// `dispatch.oam.dev/endpoint-override` label, overrides the recorded endpoint.
    pub fn effective_endpoint(&self) -> Option<&str> {
        if let Some(overridden) = self.labels.get("dispatch.oam.dev/endpoint-override") {
            return Some(overridden.as_str());
        }
        if self.endpoint.is_empty() {
            return None;
        }
        Some(&self.endpoint)
    }
}

/// A topology policy's `properties`, deserialized from the generic `Policy`/inline-policy JSON.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct TopologyPolicySpec {
    pub clusters: Vec<String>,
    pub cluster_label_selector: std::collections::BTreeMap<String, String>,
    pub namespace: Option<String>,
}

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("topology policy names unknown cluster {cluster:?}"))]
    UnknownCluster { cluster: String },
}

/// Resolves a topology policy to an ordered, deduplicated list of cluster names, per §4.6:
/// explicit `clusters` wins; otherwise every catalog entry matching every
/// `clusterLabelSelector` key/value pair.
pub fn resolve_clusters<'a>(
    policy: &TopologyPolicySpec,
    catalog: &'a [ClusterCatalogEntry],
) -> Result<Vec<&'a str>, Error> {
    if !policy.clusters.is_empty() {
        let mut resolved = Vec::new();
        let mut seen = BTreeSet::new();
        for cluster in &policy.clusters {
            if cluster == LOCAL_CLUSTER {
                if seen.insert(cluster.as_str()) {
                    resolved.push(LOCAL_CLUSTER);
                }
                continue;
            }
            let entry = catalog
                .iter()
                .find(|entry| &entry.name == cluster)
                .context(UnknownClusterSnafu { cluster: cluster.clone() })?;
            if seen.insert(entry.name.as_str()) {
                resolved.push(entry.name.as_str());
            }
        }
        return Ok(resolved);
    }

    if policy.cluster_label_selector.is_empty() {
        return Ok(vec![LOCAL_CLUSTER]);
    }

    let mut resolved: Vec<&str> = catalog
        .iter()
        .filter(|entry| {
            policy
                .cluster_label_selector
                .iter()
                .all(|(key, value)| entry.labels.get(key) == Some(value))
        })
        .map(|entry| entry.name.as_str())
        .collect();
    resolved.sort_unstable();
    resolved.dedup();
    Ok(resolved)
}

/// Outcome of applying one resource to one cluster, as reported back by the dispatcher's caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApplyResult {
    Applied,
    Conflict,
    Unreachable,
}

/// What the dispatcher decided to do about one (cluster, resource) pair after running its
/// conflict-retry sequencing, per §4.6's "retry once after a brief randomized delay; on second
/// conflict, report `ApplyConflict`" rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    Applied,
    ApplyConflict,
    Unreachable,
}

/// Folds the sequence of [`ApplyResult`]s an apply-then-retry-once sequence produced into the
/// final [`DispatchOutcome`]. `attempts` holds one or two results: a single `Applied`/`Unreachable`
/// short-circuits without a retry; a `Conflict` is retried once, and the retry's own result
/// decides the outcome.
pub fn decide_outcome(first: ApplyResult, retry: Option<ApplyResult>) -> DispatchOutcome {
    match first {
        ApplyResult::Applied => DispatchOutcome::Applied,
        ApplyResult::Unreachable => DispatchOutcome::Unreachable,
        ApplyResult::Conflict => match retry {
            Some(ApplyResult::Applied) => DispatchOutcome::Applied,
            Some(ApplyResult::Unreachable) => DispatchOutcome::Unreachable,
            Some(ApplyResult::Conflict) | None => DispatchOutcome::ApplyConflict,
        },
    }
}

/// Whether the conflict-retry sequence in [`decide_outcome`] needs a second attempt at all.
pub fn needs_retry(first: ApplyResult) -> bool {
    matches!(first, ApplyResult::Conflict)
}

/// Compares the fields the controller submitted against what a post-apply re-read observed, per
/// the double-check step. Returns the JSON pointers whose submitted value didn't round-trip.
pub fn double_check(submitted: &serde_json::Value, observed: &serde_json::Value) -> Vec<String> {
    let mut divergent = Vec::new();
    diff_submitted_fields(submitted, observed, String::new(), &mut divergent);
    divergent
}

fn diff_submitted_fields(
    submitted: &serde_json::Value,
    observed: &serde_json::Value,
    pointer: String,
    divergent: &mut Vec<String>,
) {
    match submitted {
        serde_json::Value::Object(map) => {
            for (key, value) in map {
                let child_pointer = format!("{pointer}/{key}");
                match observed.get(key) {
                    Some(observed_value) => {
                        diff_submitted_fields(value, observed_value, child_pointer, divergent)
                    }
                    None => divergent.push(child_pointer),
                }
            }
        }
        other => {
            if observed != other {
                divergent.push(pointer);
            }
        }
    }
}

/// Per-(cluster, resource) apply result summary the dispatcher reports up to the workflow step
/// and the ResourceTracker writer.
#[derive(Clone, Debug, PartialEq)]
pub struct DispatchReport {
    pub cluster: String,
    pub outcome: DispatchOutcome,
    pub double_check_divergence: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<ClusterCatalogEntry> {
        vec![
            ClusterCatalogEntry {
                name: "c1".into(),
                credential_type: "x509".into(),
                endpoint: "https://c1".into(),
                alias: None,
                labels: [("env".to_owned(), "prod".to_owned())].into(),
            },
            ClusterCatalogEntry {
                name: "c2".into(),
                credential_type: "x509".into(),
                endpoint: "https://c2".into(),
                alias: None,
                labels: [("env".to_owned(), "staging".to_owned())].into(),
            },
        ]
    }

    #[test]
    fn explicit_clusters_are_resolved_in_order_and_deduplicated() {
        let policy = TopologyPolicySpec {
            clusters: vec!["c2".into(), "c1".into(), "c2".into()],
            ..Default::default()
        };
        let resolved = resolve_clusters(&policy, &catalog()).unwrap();
        assert_eq!(resolved, vec!["c2", "c1"]);
    }

    #[test]
    fn local_is_always_a_valid_explicit_cluster() {
        let policy = TopologyPolicySpec { clusters: vec![LOCAL_CLUSTER.into()], ..Default::default() };
        let resolved = resolve_clusters(&policy, &[]).unwrap();
        assert_eq!(resolved, vec![LOCAL_CLUSTER]);
    }

    #[test]
    fn unknown_explicit_cluster_is_rejected() {
        let policy = TopologyPolicySpec { clusters: vec!["ghost".into()], ..Default::default() };
        let err = resolve_clusters(&policy, &catalog()).unwrap_err();
        assert!(matches!(err, Error::UnknownCluster { .. }));
    }

    #[test]
    fn label_selector_matches_against_the_catalog() {
        let policy = TopologyPolicySpec {
            cluster_label_selector: [("env".to_owned(), "prod".to_owned())].into(),
            ..Default::default()
        };
        let resolved = resolve_clusters(&policy, &catalog()).unwrap();
        assert_eq!(resolved, vec!["c1"]);
    }

    #[test]
    fn no_selector_and_no_explicit_clusters_defaults_to_local() {
        let resolved = resolve_clusters(&TopologyPolicySpec::default(), &catalog()).unwrap();
        assert_eq!(resolved, vec![LOCAL_CLUSTER]);
    }

    #[test]
    fn single_conflict_without_retry_is_reported_as_apply_conflict() {
        assert_eq!(
            decide_outcome(ApplyResult::Conflict, None),
            DispatchOutcome::ApplyConflict
        );
    }

    #[test]
    fn conflict_then_successful_retry_applies() {
        assert_eq!(
            decide_outcome(ApplyResult::Conflict, Some(ApplyResult::Applied)),
            DispatchOutcome::Applied
        );
    }

    #[test]
    fn second_conflict_is_reported_as_apply_conflict() {
        assert_eq!(
            decide_outcome(ApplyResult::Conflict, Some(ApplyResult::Conflict)),
            DispatchOutcome::ApplyConflict
        );
    }

    #[test]
    fn applied_never_needs_a_retry() {
        assert!(!needs_retry(ApplyResult::Applied));
        assert!(needs_retry(ApplyResult::Conflict));
    }

    #[test]
    fn double_check_reports_fields_that_did_not_round_trip() {
        let submitted = serde_json::json!({"spec": {"replicas": 3, "image": "nginx"}});
        let observed = serde_json::json!({"spec": {"replicas": 1, "image": "nginx"}});
        let divergence = double_check(&submitted, &observed);
        assert_eq!(divergence, vec!["/spec/replicas"]);
    }

    #[test]
    fn endpoint_label_override_wins_over_catalog_endpoint() {
        let mut entry = catalog().remove(0);
        entry
            .labels
            .insert("dispatch.oam.dev/endpoint-override".to_owned(), "https://override".to_owned());
        assert_eq!(entry.effective_endpoint(), Some("https://override"));
    }
}
