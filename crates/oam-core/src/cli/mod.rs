//! Contains various types for composing the CLI interface for operators and other applications
//! running in a Kubernetes cluster.

use clap::{Args, Parser};
use oam_telemetry::tracing::TelemetryOptions;

use crate::{namespace::WatchNamespace, utils::cluster_info::KubernetesClusterInfoOptions};

mod environment;
mod maintenance;
mod product_config;

pub use environment::*;
pub use maintenance::*;
pub use product_config::*;

/// A common set of commands used by controllers.
///
/// This enum is generic over the arguments available to the [`Command::Run`] subcommand. By default,
/// [`RunArguments`] is used, but a custom type can be used.
///
/// ```rust
/// use oam_core::cli::Command;
/// use clap::Parser;
///
/// #[derive(Parser)]
/// struct Run {
///     #[arg(long)]
///     name: String,
/// }
///
/// let _ = Command::<Run>::parse_from(["foobar-operator", "run", "--name", "foo"]);
/// ```
///
/// If you need operator-specific commands then you can flatten [`Command`] into your own command
/// enum.
///
/// ```rust
/// use oam_core::cli::Command;
/// use clap::Parser;
///
/// #[derive(Parser)]
/// enum CustomCommand {
///     /// Print hello world message
///     Hello,
///
///     #[clap(flatten)]
///     Framework(Command)
/// }
/// ```
#[derive(Debug, PartialEq, Eq, Parser)]
pub enum Command<Run: Args = RunArguments> {
    /// Print CRD objects.
    Crd,

    /// Run the operator.
    Run(Run),
}

/// Default CLI arguments that most operators take when running.
///
/// ### Embed into an extended argument set
///
/// ```rust
/// use oam_core::cli::RunArguments;
/// use clap::Parser;
///
/// #[derive(clap::Parser, Debug, PartialEq, Eq)]
/// struct Run {
///     #[clap(long)]
///     name: String,
///
///     #[clap(flatten)]
///     common: RunArguments,
/// }
/// ```
#[derive(Debug, PartialEq, Eq, Parser)]
#[command(long_about = "")]
pub struct RunArguments {
    /// Provides the path to a seed file of bootstrap `ComponentDefinition`/`TraitDefinition`
    /// objects applied once on startup.
    #[arg(long, short = 's', value_name = "FILE", default_value = "", env)]
    pub seed_definitions: SeedFilePath,

    // TODO (@Techassi): This should be moved into the environment options
    /// Provides a specific namespace to watch (instead of watching all namespaces)
    #[arg(long, env, default_value = "")]
    pub watch_namespace: WatchNamespace,

    // IMPORTANT: All (flattened) sub structs should be placed at the end to ensure the help
    // headings are correct.
    #[command(flatten)]
    pub common: CommonOptions,

    #[command(flatten)]
    pub maintenance: MaintenanceOptions,

    #[command(flatten)]
    pub operator_environment: OperatorEnvironmentOptions,
}

/// A set of CLI arguments shared by every binary in this workspace, including ones that don't run
/// the full reconcile loop (for example a one-shot `crd` printer).
#[derive(Debug, PartialEq, Eq, Args)]
pub struct CommonOptions {
    #[command(flatten)]
    pub telemetry: TelemetryOptions,

    #[command(flatten)]
    pub cluster_info: KubernetesClusterInfoOptions,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;

        RunArguments::command().print_long_help().unwrap();
        RunArguments::command().debug_assert()
    }
}
