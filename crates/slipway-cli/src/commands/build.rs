use std::path::Path;

use slipway::orchestrator;
use slipway::remote::JenkinsClient;
use slipway::{SlipwayConfig, Topology};

use super::{request_from_config, resolve_build_file};

/// Render the pipeline, install it on the configured job, and trigger a run.
pub async fn build(
    file: Option<&Path>,
    topology: Option<Topology>,
    create_job: bool,
    json: bool,
) -> anyhow::Result<()> {
    let config = SlipwayConfig::load(Path::new("."))?;
    let build_file = resolve_build_file(&config, file)?;
    let request = request_from_config(&config, build_file, topology)?;

    if let Some(registry) = &request.registry {
        if registry.credential_id.is_none() && request.topology == Topology::KubernetesKaniko {
            tracing::warn!(
                registry = %registry.url,
                "no credential id configured, kaniko will push unauthenticated"
            );
        }
    }

    let job = config.jenkins.job.clone();
    println!("Connecting to {}...", config.jenkins.url);
    let client = JenkinsClient::connect(&config.jenkins).await?;

    println!("Submitting pipeline to job {job}...");
    let outcome = orchestrator::run_build(&client, &job, &request, create_job).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    println!();
    println!("{}: {}", outcome.status, outcome.message);
    println!("  Job:   {}", outcome.job_url);
    match (&outcome.build_url, &outcome.queue_url) {
        (Some(url), _) => println!("  Build: {url}"),
        (None, Some(url)) => println!("  Queue: {url}"),
        (None, None) => {}
    }

    Ok(())
}
