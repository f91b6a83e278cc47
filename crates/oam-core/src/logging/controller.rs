//! Helper traits that let reconcile errors be reported consistently, both as `tracing` events and
//! as Kubernetes events attached to the object that failed to reconcile.

use std::fmt::Debug;

use kube::runtime::reflector::ObjectRef;

/// An error that occurred during reconciliation, with enough metadata attached to report it as a
/// Kubernetes event.
pub trait ReconcilerError: std::error::Error {
    /// A unique, `UpperCamelCase` category for this error.
    ///
    /// This is expected to be mapped from the error enum's variant name, typically using
    /// `#[derive(EnumDiscriminants)] #[strum_discriminants(derive(IntoStaticStr))]` (see
    /// [`strum`]).
    ///
    /// Must be unique for a given error type, since it is used as the event's `reason` field,
    /// which is expected by Kubernetes to act as a kind of error code.
    fn category(&self) -> &'static str;

    /// The underlying object associated with the error, if it differs from the object being
    /// reconciled (for example, a referenced `ComponentDefinition` that could not be resolved).
    fn secondary_object(&self) -> Option<ObjectRef<kube::core::DynamicObject>> {
        None
    }
}

/// Blanket conversion for use with [`crate::status::condition::ErrorCategory`]: reconcile errors
/// that come tagged with their error-handling-taxonomy category report that category's name as
/// their [`ReconcilerError::category`] unless the implementor overrides it for finer-grained
/// reporting.
pub trait ReconcilerErrorExt: ReconcilerError + Debug {}
impl<E: ReconcilerError + Debug> ReconcilerErrorExt for E {}
