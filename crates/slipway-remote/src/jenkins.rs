use std::time::Duration;

use serde::Deserialize;
use slipway_core::{BuildOutcome, BuildStatus, Credentials, JenkinsConfig, RenderedScript};

use crate::error::{snippet, status_error, ApiError};
use crate::transport::{ApiRequest, ApiResponse, HttpTransport, ReqwestTransport};

const SERVICE: &str = "Jenkins";

/// Job description applied by script updates.
pub const DEFAULT_JOB_DESCRIPTION: &str = "Auto-generated pipeline for Docker image builds";

const CRUMB_TIMEOUT: Duration = Duration::from_secs(10);
const CONFIG_TIMEOUT: Duration = Duration::from_secs(30);
const TRIGGER_TIMEOUT: Duration = Duration::from_secs(30);
const POLL_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
const POLL_INTERVAL: Duration = Duration::from_millis(500);
const POLL_BOUND: Duration = Duration::from_secs(15);

#[derive(Deserialize)]
struct CrumbResponse {
    crumb: String,
    #[serde(rename = "crumbRequestField")]
    crumb_request_field: String,
}

#[derive(Deserialize)]
struct QueueItem {
    #[serde(default)]
    executable: Option<Executable>,
}

#[derive(Deserialize)]
struct Executable {
    #[serde(default)]
    number: Option<u64>,
}

#[derive(Deserialize)]
struct JobInfo {
    #[serde(default, rename = "lastBuild")]
    last_build: Option<BuildRef>,
}

#[derive(Deserialize)]
struct BuildRef {
    number: u64,
}

/// Client for the CI server's REST API.
///
/// Construction goes through [`JenkinsClient::connect`]: credentials are
/// resolved first, then the one-time crumb fetch runs, so every client in
/// existence is ready to issue requests. The crumb rides along on every
/// mutating request for servers with CSRF protection enabled.
pub struct JenkinsClient<T: HttpTransport = ReqwestTransport> {
    transport: T,
    base_url: String,
    credentials: Credentials,
    crumb: Option<(String, String)>,
}

impl JenkinsClient<ReqwestTransport> {
    /// Connect with the default transport. Fails fast when the API token is
    /// missing from the environment or the credentials are rejected.
    pub async fn connect(config: &JenkinsConfig) -> Result<Self, ApiError> {
        let credentials = config.credentials().map_err(|e| ApiError::Authentication {
            service: SERVICE,
            detail: e.to_string(),
        })?;
        Self::connect_with(ReqwestTransport::new(), config, credentials).await
    }
}

impl<T: HttpTransport> JenkinsClient<T> {
    /// Connect over a caller-supplied transport with already-resolved
    /// credentials.
    pub async fn connect_with(
        transport: T,
        config: &JenkinsConfig,
        credentials: Credentials,
    ) -> Result<Self, ApiError> {
        let mut client = Self {
            transport,
            base_url: config.url.trim_end_matches('/').to_owned(),
            credentials,
            crumb: None,
        };
        client.crumb = client.fetch_crumb().await?;
        Ok(client)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Job page URL as shown to users.
    pub fn job_url(&self, job: &str) -> String {
        format!("{}/job/{}", self.base_url, job)
    }

    async fn fetch_crumb(&self) -> Result<Option<(String, String)>, ApiError> {
        let request = ApiRequest::get(format!("{}/crumbIssuer/api/json", self.base_url))
            .auth(&self.credentials)
            .timeout(CRUMB_TIMEOUT);
        let response = self.send(&request).await?;

        if response.status == 404 {
            tracing::info!("CSRF protection not enabled, no crumb required");
            return Ok(None);
        }
        // An HTML body here is a login page: the credentials were not
        // accepted, whatever the status code says.
        if response
            .header("Content-Type")
            .unwrap_or_default()
            .contains("text/html")
        {
            return Err(ApiError::Authentication {
                service: SERVICE,
                detail: "crumb endpoint returned HTML instead of JSON; check username and API token"
                    .to_owned(),
            });
        }
        if response.status != 200 {
            return Err(status_error(SERVICE, response.status, &response.body));
        }

        let crumb: CrumbResponse =
            serde_json::from_str(&response.body).map_err(|e| ApiError::Transient {
                service: SERVICE,
                detail: format!("malformed crumb response: {e}"),
            })?;
        tracing::debug!(field = %crumb.crumb_request_field, "retrieved crumb");
        Ok(Some((crumb.crumb_request_field, crumb.crumb)))
    }

    pub async fn job_exists(&self, job: &str) -> Result<bool, ApiError> {
        let request = ApiRequest::get(format!("{}/job/{}/api/json", self.base_url, job))
            .auth(&self.credentials);
        let response = self.send(&request).await?;
        match response.status {
            200 => Ok(true),
            404 => Ok(false),
            status => Err(status_error(SERVICE, status, &response.body)),
        }
    }

    /// Create the pipeline job with an empty script; the real definition
    /// arrives through [`JenkinsClient::update_script`]. Not idempotent, the
    /// caller is expected to check [`JenkinsClient::job_exists`] first.
    pub async fn create_job(&self, job: &str, description: &str) -> Result<(), ApiError> {
        let request = self
            .post(format!("{}/createItem?name={}", self.base_url, job))
            .xml(job_config_xml(description, &RenderedScript::new("")))
            .timeout(CONFIG_TIMEOUT);
        let response = self.send(&request).await?;
        match response.status {
            200 => {
                tracing::info!(job, "created pipeline job");
                Ok(())
            }
            400 if response.body.to_lowercase().contains("already exists") => {
                Err(ApiError::AlreadyExists {
                    kind: "job",
                    name: job.to_owned(),
                })
            }
            status => Err(status_error(SERVICE, status, &response.body)),
        }
    }

    /// Replace the job's pipeline definition.
    ///
    /// Existence is checked first so a missing job surfaces as a clear
    /// not-found instead of whatever the config endpoint answers.
    pub async fn update_script(&self, job: &str, script: &RenderedScript) -> Result<(), ApiError> {
        if !self.job_exists(job).await? {
            return Err(ApiError::NotFound {
                kind: "job",
                name: job.to_owned(),
            });
        }

        let request = self
            .post(format!("{}/job/{}/config.xml", self.base_url, job))
            .xml(job_config_xml(DEFAULT_JOB_DESCRIPTION, script))
            .timeout(CONFIG_TIMEOUT);
        let response = self.send(&request).await?;
        match response.status {
            200 => {
                tracing::info!(job, "updated pipeline script");
                Ok(())
            }
            404 => Err(ApiError::NotFound {
                kind: "job",
                name: job.to_owned(),
            }),
            500 => Err(ApiError::Script {
                detail: format!(
                    "server error 500 applying the job configuration ({})",
                    snippet(&response.body)
                ),
            }),
            status => Err(status_error(SERVICE, status, &response.body)),
        }
    }

    /// Trigger a build and poll the queue briefly for its build number.
    ///
    /// A missing build number is not a failure: the request was admitted to
    /// the queue but no executor picked it up within the polling bound. The
    /// outcome then reports QUEUED with the queue URL for later resolution.
    pub async fn trigger_build(&self, job: &str) -> Result<BuildOutcome, ApiError> {
        let request = self
            .post(format!("{}/job/{}/build", self.base_url, job))
            .timeout(TRIGGER_TIMEOUT);
        let response = self.send(&request).await?;
        match response.status {
            200 | 201 => {}
            404 => {
                return Err(ApiError::NotFound {
                    kind: "job",
                    name: job.to_owned(),
                });
            }
            status => return Err(status_error(SERVICE, status, &response.body)),
        }

        let queue_url = response.header("Location").map(str::to_owned);
        let queue_id = queue_url.as_deref().and_then(queue_id_from_location);

        let mut build_number = match queue_id {
            Some(id) => self.wait_for_build_number(id).await,
            None => None,
        };
        if build_number.is_none() {
            tracing::debug!(job, "queue gave no build number, checking last build");
            build_number = self.latest_build_number(job).await;
        }

        let job_url = self.job_url(job);
        let build_url = build_number.map(|n| format!("{job_url}/{n}"));
        let status = if build_number.is_some() {
            BuildStatus::Building
        } else {
            BuildStatus::Queued
        };
        tracing::info!(job, ?queue_id, ?build_number, %status, "build triggered");

        Ok(BuildOutcome {
            job_name: job.to_owned(),
            queue_id,
            queue_url,
            job_url,
            build_number,
            build_url,
            status,
            message: "Build triggered successfully".to_owned(),
        })
    }

    /// Update the script, then trigger. The trigger only runs after the
    /// update succeeded, so a rejected script never starts a build.
    pub async fn update_and_trigger(
        &self,
        job: &str,
        script: &RenderedScript,
    ) -> Result<BuildOutcome, ApiError> {
        self.update_script(job, script).await?;
        self.trigger_build(job).await
    }

    /// Poll the queue item until it carries an executable, bounded in time.
    ///
    /// Failures here are swallowed: the trigger already succeeded, and the
    /// caller has a fallback for naming the build.
    async fn wait_for_build_number(&self, queue_id: u64) -> Option<u64> {
        let url = format!("{}/queue/item/{}/api/json", self.base_url, queue_id);
        let deadline = tokio::time::Instant::now() + POLL_BOUND;

        while tokio::time::Instant::now() < deadline {
            let request = ApiRequest::get(url.clone())
                .auth(&self.credentials)
                .timeout(POLL_REQUEST_TIMEOUT);
            let response = match self.transport.send(&request).await {
                Ok(response) => response,
                Err(e) => {
                    tracing::debug!(queue_id, error = %e, "queue poll failed");
                    return None;
                }
            };
            match response.status {
                200 => {}
                404 => {
                    // Queue items are garbage-collected shortly after the
                    // build starts; the last-build fallback covers this.
                    tracing::debug!(queue_id, "queue item already gone");
                    return None;
                }
                status => {
                    tracing::debug!(queue_id, status, "unexpected status polling queue");
                    return None;
                }
            }
            let Ok(item) = serde_json::from_str::<QueueItem>(&response.body) else {
                return None;
            };
            if let Some(number) = item.executable.and_then(|e| e.number) {
                tracing::debug!(queue_id, number, "queue item resolved to build");
                return Some(number);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }

        tracing::debug!(queue_id, "no build number within the polling bound");
        None
    }

    /// Best-effort last-build lookup, used when the queue cannot name the
    /// build. May pick up an older build on a busy job.
    async fn latest_build_number(&self, job: &str) -> Option<u64> {
        let request = ApiRequest::get(format!("{}/job/{}/api/json", self.base_url, job))
            .auth(&self.credentials)
            .timeout(POLL_REQUEST_TIMEOUT);
        let response = self.transport.send(&request).await.ok()?;
        if response.status != 200 {
            return None;
        }
        let info: JobInfo = serde_json::from_str(&response.body).ok()?;
        info.last_build.map(|b| b.number)
    }

    /// POST with the crumb header attached when the server issued one.
    fn post(&self, url: String) -> ApiRequest {
        let mut request = ApiRequest::post(url).auth(&self.credentials);
        if let Some((field, value)) = &self.crumb {
            request = request.header(field.clone(), value.clone());
        }
        request
    }

    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        self.transport
            .send(request)
            .await
            .map_err(|e| ApiError::Transient {
                service: SERVICE,
                detail: e.to_string(),
            })
    }
}

/// Pipeline job definition with the script wrapped in CDATA, so arbitrary
/// Groovy cannot break the XML.
fn job_config_xml(description: &str, script: &RenderedScript) -> String {
    format!(
        r#"<?xml version='1.1' encoding='UTF-8'?>
<flow-definition plugin="workflow-job@2.40">
  <actions/>
  <description>{description}</description>
  <keepDependencies>false</keepDependencies>
  <properties/>
  <definition class="org.jenkinsci.plugins.workflow.cps.CpsFlowDefinition" plugin="workflow-cps@2.90">
    <script><![CDATA[{script}]]></script>
    <sandbox>true</sandbox>
  </definition>
  <triggers/>
  <disabled>false</disabled>
</flow-definition>"#
    )
}

/// Queue id from a Location header like `http://host/queue/item/123/`.
fn queue_id_from_location(location: &str) -> Option<u64> {
    location.trim_end_matches('/').rsplit('/').next()?.parse().ok()
}
