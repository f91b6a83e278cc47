//! A thin wrapper around [`kube::Client`] that centralizes how the controller builds typed and
//! dynamic [`Api`] handles.

use k8s_openapi::{ClusterResourceScope, NamespaceResourceScope};
use kube::{api::DynamicObject, core::ApiResource, Api, Resource};

/// Wraps a [`kube::Client`], exposing convenience constructors for typed and dynamic [`Api`]
/// handles scoped the way the reconciler needs them (namespaced vs. cluster-wide, per-cluster
/// dispatch targets).
#[derive(Clone)]
pub struct Client {
    client: kube::Client,

    /// Name of the cluster this client talks to; `"local"` for the control-plane cluster.
    pub cluster_name: String,
}

impl Client {
    pub fn new(client: kube::Client, cluster_name: impl Into<String>) -> Self {
        Self {
            client,
            cluster_name: cluster_name.into(),
        }
    }

    /// A client for the control-plane cluster.
    pub fn local(client: kube::Client) -> Self {
        Self::new(client, "local")
    }

    pub fn as_kube_client(&self) -> kube::Client {
        self.client.clone()
    }

    /// A typed, namespaced API handle.
    pub fn get_api<T>(&self, namespace: &str) -> Api<T>
    where
        T: Resource<Scope = NamespaceResourceScope>,
        <T as Resource>::DynamicType: Default,
    {
        Api::namespaced(self.client.clone(), namespace)
    }

    /// A typed API handle spanning every namespace.
    pub fn get_all_api<T>(&self) -> Api<T>
    where
        T: Resource<Scope = NamespaceResourceScope>,
        <T as Resource>::DynamicType: Default,
    {
        Api::all(self.client.clone())
    }

    /// A typed API handle for a cluster-scoped resource kind.
    pub fn get_cluster_api<T>(&self) -> Api<T>
    where
        T: Resource<Scope = ClusterResourceScope>,
        <T as Resource>::DynamicType: Default,
    {
        Api::all(self.client.clone())
    }

    /// A dynamic, namespaced API handle for an arbitrary GVK, used by the multi-cluster
    /// dispatcher to apply rendered payloads whose concrete Rust type is unknown.
    pub fn get_dynamic_api(&self, resource: ApiResource, namespace: Option<&str>) -> Api<DynamicObject> {
        match namespace {
            Some(namespace) => Api::namespaced_with(self.client.clone(), namespace, &resource),
            None => Api::all_with(self.client.clone(), &resource),
        }
    }
}
