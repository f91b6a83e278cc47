//! Renders a `Definition`'s schematic against a parameter record, and patches a rendered
//! workload with trait-produced patches under one of four merge strategies.
//!
//! Evaluating the constraint-language schematic itself (CUE `parameter`/`output`/`outputs`
//! unification, and the `healthPolicy`/`customStatus` expressions) is delegated to an
//! [`Evaluator`] supplied by the caller: this module only owns JSON-level merge semantics, which
//! is the part the controller itself is responsible for once the schematic has produced a
//! candidate document.

use std::collections::HashMap;

use serde_json::Value;
use snafu::Snafu;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("parameter record rejected by schema: {reason}"))]
    SchemaRejected { reason: String },

    #[snafu(display("patch at {pointer:?} conflicts with a concrete value already set"))]
    PatchConflict { pointer: String },

    #[snafu(display("schematic read context.{field} without declaring it"))]
    UndeclaredContextRead { field: String },

    #[snafu(display("unification of {pointer:?} would require evaluating itself"))]
    CyclicUnification { pointer: String },
}

/// Evaluates a `Definition`'s schematic: given the already-unified `parameter` record and
/// rendering `Context`, produces the workload document and any secondary outputs.
///
/// The controller wires a concrete CUE interpreter behind this trait; this crate only needs the
/// contract.
pub trait Evaluator {
    fn render(&self, parameter: &Value, context: &Context) -> Result<RenderResult, Error>;

    /// Evaluates the schematic's `healthPolicy`/`customStatus` expressions, if present. Per
    /// spec, an evaluation error degrades to `healthy=false` rather than propagating, so this
    /// returns the degraded outcome directly instead of `Result`.
    fn evaluate_status(&self, output: &Value, outputs: &HashMap<String, Value>) -> HealthStatus;
}

/// `context.output`/`context.outputs`, the two values a schematic may read while rendering a
/// trait or evaluating status expressions.
#[derive(Clone, Debug, Default)]
pub struct Context {
    pub output: Value,
    pub outputs: HashMap<String, Value>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderResult {
    pub output: Value,
    pub outputs: HashMap<String, Value>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct HealthStatus {
    pub healthy: bool,
    pub message: Option<String>,
}

impl HealthStatus {
    pub fn degraded(error: impl std::fmt::Display) -> Self {
        Self {
            healthy: false,
            message: Some(error.to_string()),
        }
    }
}

/// One of the four merge strategies [`Patch::apply`] supports, named after the OAM `Patch`
/// semantics they implement.
#[derive(Clone, Debug)]
pub enum PatchStrategy {
    /// Deep unification: recurse into objects, merging keys; fails with [`Error::PatchConflict`]
    /// if both sides set the same scalar (or array) to different concrete values.
    Default,
    /// Arrays named in `patch_keys` (JSON-pointer-to-array -> key field name) are merged element
    /// by element, matched on the key field; unmatched patch elements are appended. Objects merge
    /// like [`PatchStrategy::Default`] otherwise.
    Strategic { patch_keys: HashMap<String, String> },
    /// RFC 7396 JSON Merge Patch: `null` deletes a key, objects merge recursively, anything else
    /// replaces wholesale.
    JsonMerge,
    /// Only the JSON-pointer paths listed in `keys` are overwritten from `patch`; every other
    /// field of `base` is retained untouched.
    RetainKeys { keys: Vec<String> },
}

/// *Patch(base, patch, strategy) → result* from the template engine design.
pub fn patch(base: &Value, overlay: &Value, strategy: &PatchStrategy) -> Result<Value, Error> {
    match strategy {
        PatchStrategy::Default => deep_unify(base, overlay, "".to_owned()),
        PatchStrategy::Strategic { patch_keys } => strategic_merge(base, overlay, patch_keys, ""),
        PatchStrategy::JsonMerge => {
            let mut result = base.clone();
            json_patch::merge(&mut result, overlay);
            Ok(result)
        }
        PatchStrategy::RetainKeys { keys } => retain_keys_merge(base, overlay, keys),
    }
}

fn deep_unify(base: &Value, overlay: &Value, pointer: String) -> Result<Value, Error> {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            let mut result = base_map.clone();
            for (key, overlay_value) in overlay_map {
                let child_pointer = format!("{pointer}/{key}");
                let merged = match result.get(key) {
                    Some(base_value) => deep_unify(base_value, overlay_value, child_pointer)?,
                    None => overlay_value.clone(),
                };
                result.insert(key.clone(), merged);
            }
            Ok(Value::Object(result))
        }
        (Value::Null, other) | (other, Value::Null) => Ok(other.clone()),
        (a, b) if a == b => Ok(a.clone()),
        _ => PatchConflictSnafu { pointer }.fail(),
    }
}

fn strategic_merge(
    base: &Value,
    overlay: &Value,
    patch_keys: &HashMap<String, String>,
    pointer: &str,
) -> Result<Value, Error> {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            let mut result = base_map.clone();
            for (key, overlay_value) in overlay_map {
                let child_pointer = format!("{pointer}/{key}");
                let merged = match result.get(key) {
                    Some(base_value) => {
                        strategic_merge(base_value, overlay_value, patch_keys, &child_pointer)?
                    }
                    None => overlay_value.clone(),
                };
                result.insert(key.clone(), merged);
            }
            Ok(Value::Object(result))
        }
        (Value::Array(base_items), Value::Array(overlay_items)) => {
            match patch_keys.get(pointer) {
                Some(merge_key) => {
                    Ok(Value::Array(merge_list_by_key(base_items, overlay_items, merge_key)))
                }
                // No merge key declared for this list: strategic merge falls back to append.
                None => {
                    let mut merged = base_items.clone();
                    merged.extend(overlay_items.iter().cloned());
                    Ok(Value::Array(merged))
                }
            }
        }
        (Value::Null, other) | (other, Value::Null) => Ok(other.clone()),
        (_, overlay) => Ok(overlay.clone()),
    }
}

fn merge_list_by_key(base: &[Value], overlay: &[Value], key: &str) -> Vec<Value> {
    let mut result = base.to_vec();
    for overlay_item in overlay {
        let overlay_key = overlay_item.get(key);
        let existing = result
            .iter()
            .position(|item| item.get(key) == overlay_key && overlay_key.is_some());

        match existing {
            Some(index) => {
                if let Ok(merged) = deep_unify(&result[index], overlay_item, String::new()) {
                    result[index] = merged;
                } else {
                    result[index] = overlay_item.clone();
                }
            }
            None => result.push(overlay_item.clone()),
        }
    }
    result
}

fn retain_keys_merge(base: &Value, overlay: &Value, keys: &[String]) -> Result<Value, Error> {
    let mut result = base.clone();
    for key in keys {
        if let Some(overlay_value) = overlay.pointer(key) {
            set_pointer(&mut result, key, overlay_value.clone());
        }
    }
    Ok(result)
}

fn set_pointer(target: &mut Value, pointer: &str, value: Value) {
    let segments: Vec<&str> = pointer.trim_start_matches('/').split('/').collect();
    let Some((last, parents)) = segments.split_last() else {
        *target = value;
        return;
    };

    let mut cursor = target;
    for segment in parents {
        if !cursor.is_object() {
            *cursor = Value::Object(serde_json::Map::new());
        }
        cursor = cursor
            .as_object_mut()
            .expect("just ensured object")
            .entry(segment.to_owned())
            .or_insert_with(|| Value::Object(serde_json::Map::new()));
    }

    if !cursor.is_object() {
        *cursor = Value::Object(serde_json::Map::new());
    }
    cursor
        .as_object_mut()
        .expect("just ensured object")
        .insert((*last).to_owned(), value);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_strategy_merges_objects_and_rejects_conflicts() {
        let base = serde_json::json!({"spec": {"replicas": 1, "image": "nginx"}});
        let overlay = serde_json::json!({"spec": {"replicas": 3}});

        let merged = patch(&base, &overlay, &PatchStrategy::Default).unwrap();
        assert_eq!(merged, serde_json::json!({"spec": {"replicas": 3, "image": "nginx"}}));

        let conflicting = serde_json::json!({"spec": {"image": "other"}});
        let err = patch(&base, &conflicting, &PatchStrategy::Default).unwrap_err();
        assert!(matches!(err, Error::PatchConflict { .. }));
    }

    #[test]
    fn strategic_strategy_merges_list_members_by_key() {
        let base = serde_json::json!({
            "containers": [
                {"name": "app", "image": "old"},
                {"name": "sidecar", "image": "sidecar:1"},
            ]
        });
        let overlay = serde_json::json!({
            "containers": [
                {"name": "app", "image": "new"},
                {"name": "extra", "image": "extra:1"},
            ]
        });
        let mut patch_keys = HashMap::new();
        patch_keys.insert("/containers".to_owned(), "name".to_owned());

        let merged = patch(&base, &overlay, &PatchStrategy::Strategic { patch_keys }).unwrap();
        let containers = merged["containers"].as_array().unwrap();
        assert_eq!(containers.len(), 3);
        assert_eq!(containers[0]["image"], "new");
        assert_eq!(containers[1]["image"], "sidecar:1");
        assert_eq!(containers[2]["name"], "extra");
    }

    #[test]
    fn strategic_strategy_without_key_hint_appends() {
        let base = serde_json::json!({"items": [1, 2]});
        let overlay = serde_json::json!({"items": [3]});
        let merged =
            patch(&base, &overlay, &PatchStrategy::Strategic { patch_keys: HashMap::new() })
                .unwrap();
        assert_eq!(merged, serde_json::json!({"items": [1, 2, 3]}));
    }

    #[test]
    fn json_merge_strategy_deletes_on_null() {
        let base = serde_json::json!({"a": 1, "b": 2});
        let overlay = serde_json::json!({"b": null, "c": 3});
        let merged = patch(&base, &overlay, &PatchStrategy::JsonMerge).unwrap();
        assert_eq!(merged, serde_json::json!({"a": 1, "c": 3}));
    }

    #[test]
    fn retain_keys_strategy_only_overwrites_listed_paths() {
        let base = serde_json::json!({"spec": {"replicas": 1, "image": "nginx"}});
        let overlay = serde_json::json!({"spec": {"replicas": 5, "image": "ignored"}});
        let merged = patch(&base, &overlay, &PatchStrategy::RetainKeys {
            keys: vec!["/spec/replicas".to_owned()],
        })
        .unwrap();
        assert_eq!(merged, serde_json::json!({"spec": {"replicas": 5, "image": "nginx"}}));
    }

    #[test]
    fn health_status_degrades_on_evaluation_error() {
        let status = HealthStatus::degraded("boom");
        assert!(!status.healthy);
        assert_eq!(status.message.as_deref(), Some("boom"));
    }
}
