//! High-level verbs composing the pipeline renderer with the remote
//! clients.
//!
//! Rendering stays pure and the clients own the wire details; the functions
//! here only sequence them the way the CLI (and most library callers) want.

use slipway_core::{BuildOutcome, BuildRequest, RegistryProject, RenderedScript};
use slipway_pipeline::{EmbedStrategy, PipelineBuilder};
use slipway_remote::jenkins::DEFAULT_JOB_DESCRIPTION;
use slipway_remote::transport::HttpTransport;
use slipway_remote::{ApiError, HarborClient, JenkinsClient};

/// How an ensure-style operation concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnsureOutcome {
    Created,
    AlreadyExists,
}

impl EnsureOutcome {
    pub fn created(self) -> bool {
        matches!(self, EnsureOutcome::Created)
    }
}

/// Render the pipeline for human eyes: the build file appears inline as an
/// escaped heredoc, readable in place.
pub fn preview(request: &BuildRequest) -> RenderedScript {
    PipelineBuilder::new(request).render(EmbedStrategy::Heredoc)
}

/// Render the pipeline for submission: the build file travels as Base64,
/// immune to quoting and interpolation mishaps en route.
pub fn render_for_submission(request: &BuildRequest) -> RenderedScript {
    PipelineBuilder::new(request).render(EmbedStrategy::Base64)
}

/// Render the request's pipeline, install it on the job, and trigger a
/// build.
///
/// With `create_missing` set, a job that does not exist yet is created on
/// the fly. Otherwise a missing job is an error, so nothing gets set up on
/// the server behind the caller's back.
pub async fn run_build<T: HttpTransport>(
    jenkins: &JenkinsClient<T>,
    job: &str,
    request: &BuildRequest,
    create_missing: bool,
) -> Result<BuildOutcome, ApiError> {
    let script = render_for_submission(request);
    if !jenkins.job_exists(job).await? {
        if !create_missing {
            return Err(ApiError::NotFound {
                kind: "job",
                name: job.to_owned(),
            });
        }
        jenkins.create_job(job, DEFAULT_JOB_DESCRIPTION).await?;
        tracing::info!(job, "created missing pipeline job");
    }
    jenkins.update_and_trigger(job, &script).await
}

/// Install a caller-supplied script on the job and trigger a build.
///
/// The script is submitted verbatim and takes the same path through the
/// server as a rendered one.
pub async fn run_custom_build<T: HttpTransport>(
    jenkins: &JenkinsClient<T>,
    job: &str,
    script: &RenderedScript,
) -> Result<BuildOutcome, ApiError> {
    jenkins.update_and_trigger(job, script).await
}

/// Make sure the pipeline job exists. Safe to call repeatedly.
pub async fn ensure_job<T: HttpTransport>(
    jenkins: &JenkinsClient<T>,
    job: &str,
) -> Result<EnsureOutcome, ApiError> {
    if jenkins.job_exists(job).await? {
        return Ok(EnsureOutcome::AlreadyExists);
    }
    match jenkins.create_job(job, DEFAULT_JOB_DESCRIPTION).await {
        Ok(()) => {
            tracing::info!(job, "created pipeline job");
            Ok(EnsureOutcome::Created)
        }
        // Lost the check-then-create race; the job exists either way.
        Err(ApiError::AlreadyExists { .. }) => Ok(EnsureOutcome::AlreadyExists),
        Err(e) => Err(e),
    }
}

/// Make sure the registry project exists. Safe to call repeatedly.
pub async fn ensure_project<T: HttpTransport>(
    harbor: &HarborClient<T>,
    project: &RegistryProject,
) -> Result<EnsureOutcome, ApiError> {
    if harbor.project_exists(&project.name).await? {
        return Ok(EnsureOutcome::AlreadyExists);
    }
    match harbor.create_project(project).await {
        Ok(()) => {
            tracing::info!(project = %project.name, "created registry project");
            Ok(EnsureOutcome::Created)
        }
        Err(ApiError::AlreadyExists { .. }) => Ok(EnsureOutcome::AlreadyExists),
        Err(e) => Err(e),
    }
}
