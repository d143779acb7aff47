use std::path::Path;

use anyhow::Context;
use slipway::orchestrator::{self, EnsureOutcome};
use slipway::remote::HarborClient;
use slipway::{ProjectPolicy, RegistryProject, SlipwayConfig};

/// Create the registry project backing the configured image, if missing.
pub async fn project_ensure(name: Option<&str>, public: bool) -> anyhow::Result<()> {
    let config = SlipwayConfig::load(Path::new("."))?;
    let registry = config
        .registry
        .as_ref()
        .context("no registry configured; add a [registry] table to slipway.toml")?;

    let project_name = match name {
        Some(name) => name.to_owned(),
        None => config
            .image
            .name
            .clone()
            .context("project name not given and [image].name not set")?,
    };

    let client = HarborClient::new(registry)?;
    let project = RegistryProject {
        name: project_name.clone(),
        public,
        policy: ProjectPolicy::default(),
    };

    match orchestrator::ensure_project(&client, &project).await? {
        EnsureOutcome::Created => println!("Created project {project_name}"),
        EnsureOutcome::AlreadyExists => println!("Project {project_name} already exists"),
    }
    Ok(())
}
