use std::path::PathBuf;

use snafu::{OptionExt, ResultExt, Snafu};
use oam_core::{
    CustomResourceExt,
    crd::{
        application::Application,
        application_revision::ApplicationRevision,
        definition_revision::DefinitionRevision,
        definitions::{ComponentDefinition, PolicyDefinition, TraitDefinition, WorkflowStepDefinition},
        policy::Policy,
        resource_tracker::ResourceTracker,
        workflow::Workflow,
    },
};

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("failed to get manifest directory"))]
    GetManifestDirectory { source: std::env::VarError },

    #[snafu(display("failed to get parent directory of {path}", path = path.display()))]
    GetParentDirectory { path: PathBuf },

    #[snafu(display("failed to write CRD to file at {path}", path = path.display()))]
    WriteCrd {
        source: oam_core::shared::crd::Error,
        path: PathBuf,
    },
}

macro_rules! write_crd {
    ($base_path:expr, $crd_name:ident) => {{
        let mut path = $base_path.join(stringify!($crd_name));
        path.set_extension("yaml");

        $crd_name::write_yaml_schema(&path, "0.0.0-dev")
            .context(WriteCrdSnafu { path: path.clone() })?;
    }};
}

pub fn generate_preview() -> Result<(), Error> {
    let path = std::env::var("CARGO_MANIFEST_DIR")
        .map(PathBuf::from)
        .context(GetManifestDirectorySnafu)?;

    let path = path
        .parent()
        .with_context(|| GetParentDirectorySnafu { path: path.clone() })?
        .join("oam-core/crds");

    write_crd!(path, Application);
    write_crd!(path, ApplicationRevision);
    write_crd!(path, DefinitionRevision);
    write_crd!(path, ComponentDefinition);
    write_crd!(path, TraitDefinition);
    write_crd!(path, PolicyDefinition);
    write_crd!(path, WorkflowStepDefinition);
    write_crd!(path, Policy);
    write_crd!(path, Workflow);
    write_crd!(path, ResourceTracker);

    Ok(())
}
