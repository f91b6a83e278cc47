//! Process-wide configuration for the application controller.
//!
//! All of the knobs here are read once at startup and injected into the reconciler as an
//! immutable [`Config`]; nothing in a hot reconcile path reads ambient configuration directly.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default number of `ApplicationRevision`s retained per application.
pub const DEFAULT_APPLICATION_REVISION_LIMIT: usize = 10;

/// Default number of `DefinitionRevision`s retained per definition.
pub const DEFAULT_DEFINITION_REVISION_LIMIT: usize = 20;

/// Default number of concurrent reconcile workers.
pub const DEFAULT_CONCURRENT_RECONCILES: usize = 4;

/// Default coarse resync period.
pub const DEFAULT_RESYNC_PERIOD: Duration = Duration::from_secs(5 * 60);

/// Default delay before a component's unready dependency is surfaced.
pub const DEFAULT_DEPEND_CHECK_WAIT: Duration = Duration::from_secs(30);

/// Default cap on the `wait`-state backoff.
pub const DEFAULT_WORKFLOW_BACKOFF_MAX_WAIT: Duration = Duration::from_secs(60);

/// Default cap on the `failed`-state backoff.
pub const DEFAULT_WORKFLOW_BACKOFF_MAX_FAILED: Duration = Duration::from_secs(300);

/// Default number of retries a failing workflow step is allowed before giving up.
pub const DEFAULT_WORKFLOW_STEP_ERROR_RETRY_TIMES: u32 = 10;

/// Default probability of entering the garbage-collector mark phase on a given reconcile.
pub const DEFAULT_GC_MARK_PROBABILITY: f64 = 0.1;

/// Optimization flags that trade correctness guarantees or durability for throughput.
///
/// None of these are enabled by default; operators opt in knowing the tradeoff documented on
/// each field.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct OptimizationOptions {
    /// Hold the workflow value store in memory instead of persisting it between reconciles.
    ///
    /// A controller restart mid-workflow loses step outputs produced so far; the workflow
    /// re-executes affected steps from scratch on the next reconcile. Not recommended unless
    /// reconcile throughput is the binding constraint.
    pub enable_in_memory_workflow_context: bool,

    /// Skip `ApplicationRevision` creation entirely.
    pub disable_application_revision: bool,

    /// Skip `DefinitionRevision` creation entirely.
    pub disable_component_revision: bool,

    /// Skip the post-apply double-check performed by the multi-cluster dispatcher.
    pub disable_resource_apply_double_check: bool,

    /// Trigger a reconcile of the owning application whenever one of its `ResourceTracker`s is
    /// deleted, so manual tracker deletion causes re-dispatch.
    pub enable_resource_tracker_delete_only_trigger: bool,
}

/// Impersonation settings used when applying resources to member clusters.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthenticationOptions {
    pub enabled: bool,
    pub with_user: bool,
    pub default_user: Option<String>,
    pub group_pattern: Option<String>,
}

/// Immutable, process-wide configuration injected into the reconciler at startup.
///
/// Construct via [`Config::default`] and override individual fields (or via CLI flags, see
/// [`crate::cli`]); never read ambient state from within a reconcile.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub application_revision_limit: usize,
    pub definition_revision_limit: usize,
    pub concurrent_reconciles: usize,

    #[serde(with = "humantime_serde")]
    pub re_sync_period: Duration,

    #[serde(with = "humantime_serde")]
    pub depend_check_wait: Duration,

    #[serde(with = "humantime_serde")]
    pub workflow_backoff_max_wait: Duration,

    #[serde(with = "humantime_serde")]
    pub workflow_backoff_max_failed: Duration,

    pub workflow_step_error_retry_times: u32,
    pub gc_mark_probability: f64,

    pub optimize: OptimizationOptions,
    pub authentication: AuthenticationOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            application_revision_limit: DEFAULT_APPLICATION_REVISION_LIMIT,
            definition_revision_limit: DEFAULT_DEFINITION_REVISION_LIMIT,
            concurrent_reconciles: DEFAULT_CONCURRENT_RECONCILES,
            re_sync_period: DEFAULT_RESYNC_PERIOD,
            depend_check_wait: DEFAULT_DEPEND_CHECK_WAIT,
            workflow_backoff_max_wait: DEFAULT_WORKFLOW_BACKOFF_MAX_WAIT,
            workflow_backoff_max_failed: DEFAULT_WORKFLOW_BACKOFF_MAX_FAILED,
            workflow_step_error_retry_times: DEFAULT_WORKFLOW_STEP_ERROR_RETRY_TIMES,
            gc_mark_probability: DEFAULT_GC_MARK_PROBABILITY,
            optimize: OptimizationOptions::default(),
            authentication: AuthenticationOptions::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_documented_defaults() {
        let config = Config::default();
        assert_eq!(config.application_revision_limit, 10);
        assert_eq!(config.definition_revision_limit, 20);
        assert_eq!(config.concurrent_reconciles, 4);
        assert_eq!(config.gc_mark_probability, 0.1);
        assert!(!config.optimize.enable_in_memory_workflow_context);
    }
}
