use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, OwnerReference};
use kube::{Resource, ResourceExt};

use crate::kvp::{Annotation, Annotations, Label, Labels};

/// A builder for [`ObjectMeta`].
#[derive(Clone, Default)]
pub struct ObjectMetaBuilder {
    name: Option<String>,
    generate_name: Option<String>,
    namespace: Option<String>,
    owner_references: Vec<OwnerReference>,
    labels: Labels,
    annotations: Annotations,
}

impl ObjectMetaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = Some(name.into());
        self
    }

    pub fn generate_name(&mut self, generate_name: impl Into<String>) -> &mut Self {
        self.generate_name = Some(generate_name.into());
        self
    }

    pub fn namespace(&mut self, namespace: impl Into<String>) -> &mut Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn namespace_opt(&mut self, namespace: Option<impl Into<String>>) -> &mut Self {
        self.namespace = namespace.map(Into::into);
        self
    }

    /// Sets the namespace of `resource` as this object's namespace, if any.
    pub fn namespace_opt_from_resource<K: Resource>(&mut self, resource: &K) -> &mut Self {
        self.namespace = resource.namespace();
        self
    }

    pub fn with_label(&mut self, label: Label) -> &mut Self {
        let (key, value) = label.into();
        self.labels.insert(key, value);
        self
    }

    pub fn with_labels(&mut self, labels: Labels) -> &mut Self {
        self.labels.extend(labels);
        self
    }

    pub fn with_annotation(&mut self, annotation: Annotation) -> &mut Self {
        let (key, value) = annotation.into();
        self.annotations.insert(key, value);
        self
    }

    pub fn with_annotations(&mut self, annotations: Annotations) -> &mut Self {
        self.annotations.extend(annotations);
        self
    }

    /// Sets `resource` as the controlling owner of the built object, so it's garbage-collected
    /// by Kubernetes when `resource` is deleted.
    pub fn ownerreference_from_resource<K: Resource<DynamicType = ()>>(
        &mut self,
        resource: &K,
        block_owner_deletion: Option<bool>,
        controller: Option<bool>,
    ) -> &mut Self {
        if let Some(owner_reference) = resource.controller_owner_ref(&()) {
            self.owner_references.push(OwnerReference {
                block_owner_deletion,
                controller,
                ..owner_reference
            });
        }
        self
    }

    pub fn build(&self) -> ObjectMeta {
        ObjectMeta {
            name: self.name.clone(),
            generate_name: self.generate_name.clone(),
            namespace: self.namespace.clone(),
            owner_references: if self.owner_references.is_empty() {
                None
            } else {
                Some(self.owner_references.clone())
            },
            labels: if self.labels.is_empty() {
                None
            } else {
                Some(self.labels.to_unvalidated())
            },
            annotations: if self.annotations.is_empty() {
                None
            } else {
                Some(self.annotations.to_unvalidated())
            },
            ..ObjectMeta::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_and_namespace_are_set() {
        let meta = ObjectMetaBuilder::new()
            .name("test")
            .namespace("default")
            .build();

        assert_eq!(meta.name.as_deref(), Some("test"));
        assert_eq!(meta.namespace.as_deref(), Some("default"));
    }

    #[test]
    fn empty_label_set_produces_no_labels_field() {
        let meta = ObjectMetaBuilder::new().name("test").build();
        assert!(meta.labels.is_none());
    }
}
