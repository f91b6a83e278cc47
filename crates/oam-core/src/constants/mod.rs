//! Well-known annotation and label keys recognized by the controller.

/// Gates workflow re-entry: a change to the application spec or its resolved definitions takes
/// effect only once this annotation's value changes. See the revision manager's publish-version
/// semantics.
pub const PUBLISH_VERSION_ANNOTATION: &str = "app.oam.dev/publishVersion";

/// Opaque rollout-orchestration signal. The controller renders it into the emitted workload but
/// does not itself drive a rollout state machine from its value.
pub const ROLLOUT_TEMPLATE_ANNOTATION: &str = "app.oam.dev/rollout-template";

/// Comma-separated list of component names currently subject to rollout orchestration.
pub const ROLLING_COMPONENTS_ANNOTATION: &str = "app.oam.dev/rolling-components";

/// Applied to every resource dispatched by the controller; value is the owning application name.
pub const APP_NAME_LABEL: &str = "app.oam.dev/name";

/// Applied to every resource dispatched by the controller; value is the owning component name.
pub const APP_COMPONENT_LABEL: &str = "app.oam.dev/component";

/// Applied to every resource dispatched by the controller; value is the `ApplicationRevision`
/// name the resource was last (re)dispatched under.
pub const APP_REVISION_LABEL: &str = "app.oam.dev/appRevision";

/// Forced onto a rendered workload whenever a `podDisruptive` trait's patch is applied, so the
/// workload rolls even if the patch itself left the pod template untouched. See
/// `parser::render_component`.
pub const POD_ROLLING_TRIGGER_ANNOTATION: &str = "app.oam.dev/pod-rolling-trigger";

/// Field manager identifier used for server-side-apply, derived per application.
pub fn field_manager_for(app_name: &str) -> String {
    format!("application-controller/{app_name}")
}
