#[derive(Debug, Clone)]
pub struct KubernetesClusterInfo {
    /// The Kubernetes cluster domain, typically `cluster.local`.
    pub cluster_domain: String,
}

#[cfg_attr(
    feature = "clap",
    derive(clap::Parser),
    command(next_help_heading = "Cluster Options")
)]
#[derive(Debug, PartialEq, Eq)]
pub struct KubernetesClusterInfoOptions {
    /// Kubernetes cluster domain, usually this is `cluster.local`.
    #[cfg_attr(
        feature = "clap",
        arg(long, env, default_value = "cluster.local")
    )]
    pub kubernetes_cluster_domain: String,
}

impl Default for KubernetesClusterInfoOptions {
    fn default() -> Self {
        Self {
            kubernetes_cluster_domain: "cluster.local".to_owned(),
        }
    }
}

impl From<&KubernetesClusterInfoOptions> for KubernetesClusterInfo {
    fn from(opts: &KubernetesClusterInfoOptions) -> Self {
        Self {
            cluster_domain: opts.kubernetes_cluster_domain.clone(),
        }
    }
}
