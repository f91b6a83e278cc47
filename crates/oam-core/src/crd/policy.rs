//! Standalone `Policy` objects, referenced when inline application policies are insufficient.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::utils::crds::raw_object_schema;

#[derive(CustomResource, Clone, Debug, Deserialize, JsonSchema, PartialEq, Serialize)]
#[kube(
    group = "core.oam.dev",
    version = "v1beta1",
    kind = "Policy",
    plural = "policies",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct PolicySpec {
    #[serde(rename = "type")]
    pub type_: String,

    #[schemars(schema_with = "raw_object_schema")]
    #[serde(default)]
    pub properties: serde_json::Value,
}
