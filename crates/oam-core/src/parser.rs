//! Turns an `Application`'s component list into an ordered sequence of `ComponentManifest`s,
//! wiring up the read-edges (`dependsOn`, `inputs` sourced from another component's `outputs`)
//! the workflow executor later uses to sequence built-in `apply-component` steps.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use snafu::Snafu;

use crate::{
    constants::POD_ROLLING_TRIGGER_ANNOTATION,
    crd::application::Component,
    template::{self, Context, Evaluator, PatchStrategy},
};

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("component {name:?} is not declared in this application"))]
    UnknownComponent { name: String },

    #[snafu(display(
        "dependency cycle detected among components: {}",
        participants.join(" -> ")
    ))]
    DependencyCycle { participants: Vec<String> },

    #[snafu(display("component {component:?} declares duplicate trait type {trait_type:?}"))]
    DuplicateTrait {
        component: String,
        trait_type: String,
    },

    #[snafu(display(
        "trait {trait_type:?} on component {component:?} does not apply to workload type {workload_type:?}"
    ))]
    TraitNotApplicable {
        component: String,
        trait_type: String,
        workload_type: String,
    },

    #[snafu(display("rendering component {component:?} failed"))]
    Render {
        component: String,
        source: template::Error,
    },

    #[snafu(display("patching component {component:?} with trait {trait_type:?} failed"))]
    Patch {
        component: String,
        trait_type: String,
        source: template::Error,
    },

    #[snafu(display("merging override policies into component {component:?} failed"))]
    OverrideMerge {
        component: String,
        source: template::Error,
    },
}

/// The fully-rendered form of one `Application` component: its workload output plus any
/// secondary outputs traits contributed, ready to be dispatched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentManifest {
    pub component_name: String,
    pub workload_type: String,
    pub output: serde_json::Value,
    pub outputs: HashMap<String, serde_json::Value>,
}

/// What a [`TraitDefinition`](crate::crd::definitions::TraitDefinitionSpec) needs the parser to
/// know about it to apply ordering/applicability/patch rules; resolved ahead of time by the
/// caller via the [`crate::registry`].
pub struct ResolvedTrait<'a> {
    pub type_: &'a str,
    pub applies_to: &'a [String],
    pub pod_disruptive: bool,
    pub evaluator: &'a dyn Evaluator,
    pub parameter: &'a serde_json::Value,
}

/// What a [`ComponentDefinitionSpec`](crate::crd::definitions::ComponentDefinitionSpec) needs
/// the parser to know about it, resolved ahead of time by the caller.
pub struct ResolvedComponentDefinition<'a> {
    pub workload_type: &'a str,
    pub evaluator: &'a dyn Evaluator,
}

/// One `override`-type [`Policy`](crate::crd::policy::Policy)'s contribution to a component's
/// effective parameter record, already resolved to apply to this component by the caller — the
/// same injection pattern [`dispatch::resolve_clusters`](crate::dispatch::resolve_clusters) uses
/// for already-fetched topology data.
pub struct ResolvedOverride<'a> {
    pub properties: &'a serde_json::Value,
}

/// *Apply any `override` policies in effect* — §4.3 step 2: deep-merges `overrides` into
/// `properties` in declaration order, producing the effective parameter record `render_component`
/// renders. Declaration order is binding per the Open Questions decision recorded in
/// `DESIGN.md` — later overrides win on concrete conflicts, consistent with
/// [`PatchStrategy::Default`]'s last-writer-wins semantics.
pub fn merge_overrides(
    component: &str,
    properties: &serde_json::Value,
    overrides: &[ResolvedOverride<'_>],
) -> Result<serde_json::Value, Error> {
    let mut effective = properties.clone();
    for override_ in overrides {
        effective = template::patch(&effective, override_.properties, &PatchStrategy::Default)
            .map_err(|source| Error::OverrideMerge {
                component: component.to_owned(),
                source,
            })?;
    }
    Ok(effective)
}

/// *Render the workload, then apply each trait in declared order* — §4.3 step 3-4 of the parser
/// responsibility, operating on one already-resolved component.
///
/// `resolve_trait` looks up a `TraitDefinition` (plus its pre-bound evaluator) by `type_`; it is
/// injected so the parser itself never talks to the cluster.
pub fn render_component<'a>(
    component: &Component,
    effective_parameter: &serde_json::Value,
    definition: &ResolvedComponentDefinition<'_>,
    resolve_trait: impl Fn(&str) -> Option<ResolvedTrait<'a>>,
) -> Result<ComponentManifest, Error> {
    let mut seen_trait_types = HashSet::new();
    for trait_ in &component.traits {
        if !seen_trait_types.insert(trait_.type_.clone()) {
            return DuplicateTraitSnafu {
                component: component.name.clone(),
                trait_type: trait_.type_.clone(),
            }
            .fail();
        }
    }

    let rendered = definition
        .evaluator
        .render(effective_parameter, &Context::default())
        .context_component(&component.name)?;

    let mut output = rendered.output;
    let mut outputs = rendered.outputs;
    let mut force_roll = false;

    for trait_ in &component.traits {
        let resolved = resolve_trait(&trait_.type_);
        let Some(resolved) = resolved else {
            // An unresolvable trait type is a registry-level `DefinitionNotFound`, surfaced by
            // the caller before this function is reached in practice; treat defensively here as
            // "not applicable" so rendering can still report a precise error.
            return TraitNotApplicableSnafu {
                component: component.name.clone(),
                trait_type: trait_.type_.clone(),
                workload_type: definition.workload_type.to_owned(),
            }
            .fail();
        };

        if !resolved.applies_to.is_empty()
            && !resolved
                .applies_to
                .iter()
                .any(|glob| glob == "*" || glob == definition.workload_type)
        {
            return TraitNotApplicableSnafu {
                component: component.name.clone(),
                trait_type: trait_.type_.clone(),
                workload_type: definition.workload_type.to_owned(),
            }
            .fail();
        }

        let context = Context {
            output: output.clone(),
            outputs: outputs.clone(),
        };

        let trait_result = resolved
            .evaluator
            .render(resolved.parameter, &context)
            .map_err(|source| Error::Patch {
                component: component.name.clone(),
                trait_type: trait_.type_.clone(),
                source,
            })?;

        if trait_result.output != Value::Null {
            output = template::patch(&output, &trait_result.output, &PatchStrategy::Default)
                .map_err(|source| Error::Patch {
                    component: component.name.clone(),
                    trait_type: trait_.type_.clone(),
                    source,
                })?;

            if resolved.pod_disruptive {
                force_roll = true;
            }
        }
        outputs.extend(trait_result.outputs);
    }

    if force_roll {
        output = force_rolling_annotation(&output, effective_parameter).map_err(|source| {
            Error::Patch {
                component: component.name.clone(),
                trait_type: "podDisruptive".to_owned(),
                source,
            }
        })?;
    }

    Ok(ComponentManifest {
        component_name: component.name.clone(),
        workload_type: definition.workload_type.to_owned(),
        output,
        outputs,
    })
}

/// Forces a workload-rolling annotation bump per §4.1 point 3: a `podDisruptive` trait's patch
/// must roll the workload even if the patch itself never touched the pod template. The trigger
/// value is a hash of the effective parameter record rather than a timestamp, preserving the
/// parser's purity invariant — the same inputs still produce byte-identical output.
fn force_rolling_annotation(output: &Value, effective_parameter: &Value) -> Result<Value, template::Error> {
    let mut hasher = Sha256::new();
    hasher.update(effective_parameter.to_string().as_bytes());
    let trigger = format!("{:x}", hasher.finalize());

    let mut annotations = serde_json::Map::new();
    annotations.insert(POD_ROLLING_TRIGGER_ANNOTATION.to_owned(), Value::String(trigger));

    let mut metadata = serde_json::Map::new();
    metadata.insert("annotations".to_owned(), Value::Object(annotations));

    let mut overlay = serde_json::Map::new();
    overlay.insert("metadata".to_owned(), Value::Object(metadata));

    template::patch(output, &Value::Object(overlay), &PatchStrategy::JsonMerge)
}

trait RenderContextExt<T> {
    fn context_component(self, component: &str) -> Result<T, Error>;
}

impl RenderContextExt<template::RenderResult> for Result<template::RenderResult, template::Error> {
    fn context_component(self, component: &str) -> Result<template::RenderResult, Error> {
        self.map_err(|source| Error::Render {
            component: component.to_owned(),
            source,
        })
    }
}

/// A read-edge `a -> b`: component `b` depends on (reads from, or declares `dependsOn`) `a`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DependencyEdge {
    pub from: String,
    pub to: String,
}

/// Builds the dependency graph for `components`: one edge per explicit `dependsOn` entry, plus
/// one edge per `inputs` item whose `from` names another component.
///
/// Fails with [`Error::UnknownComponent`] if an edge names a component absent from the
/// application, and [`Error::DependencyCycle`] if the edges form a cycle, naming every
/// participant in cycle order.
pub fn dependency_edges(components: &[Component]) -> Result<Vec<DependencyEdge>, Error> {
    let known: HashSet<&str> = components.iter().map(|c| c.name.as_str()).collect();
    let mut edges = Vec::new();

    for component in components {
        for dependency in &component.depends_on {
            if !known.contains(dependency.as_str()) {
                return UnknownComponentSnafu {
                    name: dependency.clone(),
                }
                .fail();
            }
            edges.push(DependencyEdge {
                from: dependency.clone(),
                to: component.name.clone(),
            });
        }
        for input in &component.inputs {
            if !known.contains(input.from.as_str()) {
                return UnknownComponentSnafu {
                    name: input.from.clone(),
                }
                .fail();
            }
            edges.push(DependencyEdge {
                from: input.from.clone(),
                to: component.name.clone(),
            });
        }
    }

    detect_cycle(components, &edges)?;
    Ok(edges)
}

/// Topologically sorts `components` by their dependency edges (a stable Kahn's-algorithm pass
/// that otherwise preserves declaration order), for callers that need an apply sequence rather
/// than just the edge list.
pub fn topological_order(
    components: &[Component],
    edges: &[DependencyEdge],
) -> Result<Vec<String>, Error> {
    let mut indegree: HashMap<&str, usize> =
        components.iter().map(|c| (c.name.as_str(), 0)).collect();
    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();

    for edge in edges {
        *indegree.entry(edge.to.as_str()).or_insert(0) += 1;
        adjacency.entry(edge.from.as_str()).or_default().push(edge.to.as_str());
    }

    let mut ready: Vec<&str> = components
        .iter()
        .map(|c| c.name.as_str())
        .filter(|name| indegree[name] == 0)
        .collect();

    let mut order = Vec::with_capacity(components.len());
    while let Some(next) = ready.first().copied() {
        ready.remove(0);
        order.push(next.to_owned());

        if let Some(successors) = adjacency.get(next) {
            for &successor in successors {
                let entry = indegree.get_mut(successor).expect("known component");
                *entry -= 1;
                if *entry == 0 {
                    ready.push(successor);
                }
            }
        }
    }

    if order.len() != components.len() {
        // Should already have been caught by `detect_cycle`, but stay defensive.
        return DependencyCycleSnafu {
            participants: components
                .iter()
                .map(|c| c.name.clone())
                .filter(|name| !order.contains(name))
                .collect::<Vec<_>>(),
        }
        .fail();
    }

    Ok(order)
}

fn detect_cycle(components: &[Component], edges: &[DependencyEdge]) -> Result<(), Error> {
    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in edges {
        adjacency.entry(edge.from.as_str()).or_default().push(edge.to.as_str());
    }

    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Visiting,
        Done,
    }

    let mut marks: HashMap<&str, Mark> = HashMap::new();
    let mut stack: Vec<&str> = Vec::new();

    fn visit<'a>(
        node: &'a str,
        adjacency: &HashMap<&'a str, Vec<&'a str>>,
        marks: &mut HashMap<&'a str, Mark>,
        stack: &mut Vec<&'a str>,
    ) -> Result<(), Vec<String>> {
        if marks.get(node) == Some(&Mark::Done) {
            return Ok(());
        }
        if marks.get(node) == Some(&Mark::Visiting) {
            let cycle_start = stack.iter().position(|&n| n == node).unwrap_or(0);
            let mut participants: Vec<String> =
                stack[cycle_start..].iter().map(|s| (*s).to_owned()).collect();
            participants.push(node.to_owned());
            return Err(participants);
        }

        marks.insert(node, Mark::Visiting);
        stack.push(node);
        if let Some(successors) = adjacency.get(node) {
            for &successor in successors {
                visit(successor, adjacency, marks, stack)?;
            }
        }
        stack.pop();
        marks.insert(node, Mark::Done);
        Ok(())
    }

    for component in components {
        if let Err(participants) = visit(component.name.as_str(), &adjacency, &mut marks, &mut stack) {
            return DependencyCycleSnafu { participants }.fail();
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn component(name: &str, depends_on: Vec<&str>) -> Component {
        Component {
            name: name.to_owned(),
            type_: "webservice".into(),
            properties: serde_json::Value::Null,
            traits: vec![],
            scopes: Default::default(),
            depends_on: depends_on.into_iter().map(str::to_owned).collect(),
            inputs: vec![],
            outputs: vec![],
        }
    }

    /// Renders `parameter` verbatim as the workload output, and applies `parameter` as the
    /// trait patch — enough behavior to exercise `render_component`'s trait loop without a real
    /// CUE interpreter.
    struct PassthroughEvaluator;

    impl Evaluator for PassthroughEvaluator {
        fn render(&self, parameter: &Value, _context: &Context) -> Result<template::RenderResult, template::Error> {
            Ok(template::RenderResult {
                output: parameter.clone(),
                outputs: HashMap::new(),
            })
        }

        fn evaluate_status(&self, _output: &Value, _outputs: &HashMap<String, Value>) -> template::HealthStatus {
            template::HealthStatus {
                healthy: true,
                message: None,
            }
        }
    }

    #[test]
    fn merge_overrides_applies_in_declaration_order() {
        let properties = serde_json::json!({"replicas": 1, "image": "nginx"});
        let overrides = vec![
            ResolvedOverride {
                properties: &serde_json::json!({"replicas": 3}),
            },
            ResolvedOverride {
                properties: &serde_json::json!({"image": "nginx:1.2"}),
            },
        ];

        let effective = merge_overrides("web", &properties, &overrides).unwrap();
        assert_eq!(
            effective,
            serde_json::json!({"replicas": 3, "image": "nginx:1.2"})
        );
    }

    #[test]
    fn merge_overrides_rejects_conflicting_concrete_values() {
        let properties = serde_json::json!({"image": "nginx"});
        let overrides = vec![
            ResolvedOverride {
                properties: &serde_json::json!({"image": "nginx"}),
            },
            ResolvedOverride {
                properties: &serde_json::json!({"image": "other"}),
            },
        ];

        let err = merge_overrides("web", &properties, &overrides).unwrap_err();
        assert!(matches!(err, Error::OverrideMerge { .. }));
    }

    #[test]
    fn pod_disruptive_trait_forces_rolling_annotation() {
        let evaluator = PassthroughEvaluator;
        let component_def = ResolvedComponentDefinition {
            workload_type: "webservice",
            evaluator: &evaluator,
        };

        let mut component = component("web", vec![]);
        component.traits.push(crate::crd::application::Trait {
            type_: "restart-on-config-change".into(),
            properties: serde_json::Value::Null,
        });

        let trait_parameter = serde_json::json!({"configHash": "abc123"});
        let effective_parameter = serde_json::json!({"image": "nginx"});

        let manifest = render_component(&component, &effective_parameter, &component_def, |_| {
            Some(ResolvedTrait {
                type_: "restart-on-config-change",
                applies_to: &[],
                pod_disruptive: true,
                evaluator: &evaluator,
                parameter: &trait_parameter,
            })
        })
        .unwrap();

        let annotation = manifest.output["metadata"]["annotations"][POD_ROLLING_TRIGGER_ANNOTATION]
            .as_str()
            .expect("rolling-trigger annotation must be set");
        assert!(!annotation.is_empty());
    }

    #[test]
    fn non_disruptive_trait_does_not_force_rolling_annotation() {
        let evaluator = PassthroughEvaluator;
        let component_def = ResolvedComponentDefinition {
            workload_type: "webservice",
            evaluator: &evaluator,
        };

        let mut component = component("web", vec![]);
        component.traits.push(crate::crd::application::Trait {
            type_: "labels".into(),
            properties: serde_json::Value::Null,
        });

        let trait_parameter = serde_json::json!({"team": "platform"});
        let effective_parameter = serde_json::json!({"image": "nginx"});

        let manifest = render_component(&component, &effective_parameter, &component_def, |_| {
            Some(ResolvedTrait {
                type_: "labels",
                applies_to: &[],
                pod_disruptive: false,
                evaluator: &evaluator,
                parameter: &trait_parameter,
            })
        })
        .unwrap();

        assert!(manifest.output.get("metadata").is_none());
    }

    #[test]
    fn linear_chain_sorts_in_order() {
        let components = vec![
            component("db", vec![]),
            component("backend", vec!["db"]),
            component("frontend", vec!["backend"]),
        ];
        let edges = dependency_edges(&components).unwrap();
        let order = topological_order(&components, &edges).unwrap();
        assert_eq!(order, vec!["db", "backend", "frontend"]);
    }

    #[test]
    fn cycle_is_rejected_naming_participants() {
        let components = vec![component("a", vec!["b"]), component("b", vec!["a"])];
        let err = dependency_edges(&components).unwrap_err();
        match err {
            Error::DependencyCycle { participants } => {
                assert!(participants.contains(&"a".to_owned()));
                assert!(participants.contains(&"b".to_owned()));
            }
            other => panic!("expected DependencyCycle, got {other:?}"),
        }
    }

    #[test]
    fn unknown_dependency_is_rejected() {
        let components = vec![component("a", vec!["missing"])];
        let err = dependency_edges(&components).unwrap_err();
        assert!(matches!(err, Error::UnknownComponent { name } if name == "missing"));
    }

    #[test]
    fn input_from_another_component_is_also_an_edge() {
        let mut consumer = component("consumer", vec![]);
        consumer.inputs.push(crate::crd::application::InputItem {
            from: "producer".into(),
            parameter_key: "url".into(),
        });
        let components = vec![component("producer", vec![]), consumer];

        let edges = dependency_edges(&components).unwrap();
        assert!(edges.contains(&DependencyEdge {
            from: "producer".into(),
            to: "consumer".into(),
        }));
    }
}
