#[derive(Debug, PartialEq, Eq, clap::Parser)]
#[command(next_help_heading = "Environment Options")]
pub struct OperatorEnvironmentOptions {
    /// The namespace the controller is running in, usually `oam-system`.
    ///
    /// Note that when running on Kubernetes we recommend using the
    /// [downward API](https://kubernetes.io/docs/concepts/workloads/pods/downward-api/)
    /// to let Kubernetes project the namespace as the `OPERATOR_NAMESPACE` env variable.
    #[arg(long, env)]
    pub operator_namespace: String,

    /// The name of the service the controller (and its webhook, if enabled) is reachable at.
    #[arg(long, env)]
    pub operator_service_name: String,
}
