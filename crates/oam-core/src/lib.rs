//! ## Crate Features
//!
//! - `default` enables a default set of features which most operators need.
//! - `full` enables all available features.
//! - `crd` enables the CRD-versioning macro dependency ([`oam_versioned`]).
//! - `telemetry` enables various helpers for emitting telemetry data.
//! - `webhook` enables the admission-webhook helper crate.
//! - `time` enables interoperability between [`oam_shared::time::Duration`] and `jiff`/`chrono`.
//! - `certs` enables certificate-handling helpers.

pub mod builder;
pub mod cli;
pub mod client;
pub mod cluster_resources;
pub mod config;
pub mod constants;
pub mod crd;
pub mod dispatch;
pub mod iter;
pub mod kvp;
pub mod logging;
pub mod namespace;
pub mod parser;
pub mod patchinator;
pub mod reconcile;
pub mod registry;
pub mod revision;
pub mod status;
pub mod template;
pub mod time;
pub mod utils;
pub mod validation;
pub mod workflow;
pub mod yaml;

// External re-exports
pub use k8s_openapi;
pub use kube;
pub use schemars;
// Internal re-exports
// TODO (@Techassi): Ideally we would want webhook and certs exported here as
// well, but that would require some restructuring of crates.
pub use oam_shared as shared;
pub use oam_shared::{crd::CustomResourceExt, yaml::YamlSchema};
#[cfg(feature = "telemetry")]
pub use oam_telemetry as telemetry;
#[cfg(feature = "versioned")]
pub use oam_versioned as versioned;
