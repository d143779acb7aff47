mod build;
mod generate;
mod init;
mod preview;
mod project;

use std::path::Path;

use anyhow::Context;
use slipway::{BuildRequest, RegistryTarget, SlipwayConfig, Topology};

pub use build::build;
pub use generate::generate;
pub use init::init_project;
pub use preview::preview;
pub use project::project_ensure;

/// Assemble a build request from slipway.toml plus flag overrides.
pub(crate) fn request_from_config(
    config: &SlipwayConfig,
    build_file_text: String,
    topology: Option<Topology>,
) -> anyhow::Result<BuildRequest> {
    let source_url = config
        .source
        .url
        .clone()
        .context("source url not set; add [source].url to slipway.toml")?;
    // The job name doubles as the image name until one is configured.
    let image_name = config
        .image
        .name
        .clone()
        .unwrap_or_else(|| config.jenkins.job.clone());

    let mut request = BuildRequest::new(source_url, image_name, build_file_text);
    request.source_ref = config.source.branch.clone();
    request.source_credential_id = config.source.credential_id.clone();
    request.image_tag = config.image.tag.clone();
    request.topology = topology.unwrap_or(config.build.topology);
    request.registry = config.registry.as_ref().map(|registry| RegistryTarget {
        url: registry.url.clone(),
        credential_id: registry.credential_id.clone(),
    });
    Ok(request)
}

/// Dockerfile text for the request: an explicit `--file` wins, then
/// ./Dockerfile, then generation from the [dockerfile] config table.
pub(crate) fn resolve_build_file(
    config: &SlipwayConfig,
    file: Option<&Path>,
) -> anyhow::Result<String> {
    if let Some(path) = file {
        return std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()));
    }
    let default = Path::new("Dockerfile");
    if default.exists() {
        return std::fs::read_to_string(default).context("failed to read Dockerfile");
    }
    eprintln!("No Dockerfile found, generating one from [dockerfile] config");
    generate::render_dockerfile(config)
}
