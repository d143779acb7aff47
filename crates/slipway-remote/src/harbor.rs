use std::time::Duration;

use serde::Deserialize;
use slipway_core::{Credentials, RegistryConfig, RegistryProject};

use crate::error::{status_error, ApiError};
use crate::transport::{ApiRequest, ApiResponse, HttpTransport, ReqwestTransport};

const SERVICE: &str = "Harbor";

const CREATE_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the registry's project API.
///
/// Stateless: every call authenticates itself with basic auth and no
/// session is established. Cookie-bearing sessions would arm the registry's
/// CSRF check and break mutating requests, so the client never holds one.
pub struct HarborClient<T: HttpTransport = ReqwestTransport> {
    transport: T,
    api_base: String,
    credentials: Credentials,
}

impl HarborClient<ReqwestTransport> {
    /// Build a client with the default transport. Fails fast when the admin
    /// password is missing from the environment.
    pub fn new(config: &RegistryConfig) -> Result<Self, ApiError> {
        let credentials = config.credentials().map_err(|e| ApiError::Authentication {
            service: SERVICE,
            detail: e.to_string(),
        })?;
        Ok(Self::with_transport(
            ReqwestTransport::new(),
            config,
            credentials,
        ))
    }
}

impl<T: HttpTransport> HarborClient<T> {
    pub fn with_transport(transport: T, config: &RegistryConfig, credentials: Credentials) -> Self {
        Self {
            transport,
            api_base: api_base(&config.url),
            credentials,
        }
    }

    pub async fn project_exists(&self, name: &str) -> Result<bool, ApiError> {
        let request =
            ApiRequest::get(format!("{}/projects/{}", self.api_base, name)).auth(&self.credentials);
        let response = self.send(&request).await?;
        match response.status {
            200 => Ok(true),
            404 => Ok(false),
            status => Err(status_error(SERVICE, status, &response.body)),
        }
    }

    /// Create a project, sending only the policy options that are enabled.
    ///
    /// The registry's metadata schema treats a key's presence as intent, so
    /// disabled options are left out entirely rather than sent as "false".
    pub async fn create_project(&self, project: &RegistryProject) -> Result<(), ApiError> {
        let request = ApiRequest::post(format!("{}/projects", self.api_base))
            .auth(&self.credentials)
            .header("Accept", "application/json")
            .json(project_payload(project))
            .timeout(CREATE_TIMEOUT);
        let response = self.send(&request).await?;

        match response.status {
            201 => {
                let location = response.header("Location").unwrap_or_default();
                tracing::info!(name = %project.name, location, "registry project created");
                Ok(())
            }
            409 => Err(ApiError::AlreadyExists {
                kind: "project",
                name: project.name.clone(),
            }),
            400 => Err(ApiError::Validation {
                service: SERVICE,
                detail: error_message(&response.body)
                    .unwrap_or_else(|| "invalid project configuration".to_owned()),
            }),
            401 => Err(ApiError::Authentication {
                service: SERVICE,
                detail: "credentials rejected; check the admin username and password".to_owned(),
            }),
            403 => Err(ApiError::Permission {
                service: SERVICE,
                detail: error_message(&response.body).unwrap_or_else(|| {
                    "user lacks the project-admin or system-admin role".to_owned()
                }),
            }),
            status => Err(status_error(SERVICE, status, &response.body)),
        }
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

/// Normalize a configured registry URL to its API root, tolerating configs
/// that already carry the API prefix.
fn api_base(url: &str) -> String {
    let base = url
        .trim_end_matches('/')
        .trim_end_matches("/api/v2.0")
        .trim_end_matches('/');
    format!("{base}/api/v2.0")
}

fn project_payload(project: &RegistryProject) -> serde_json::Value {
    let policy = &project.policy;
    let mut metadata = serde_json::Map::new();
    if policy.content_trust {
        metadata.insert("enable_content_trust".to_owned(), "true".into());
    }
    if policy.auto_scan {
        metadata.insert("auto_scan".to_owned(), "true".into());
    }
    if let Some(severity) = policy.severity {
        metadata.insert("severity".to_owned(), severity.as_str().into());
    }
    if policy.prevent_vulnerable {
        metadata.insert("prevent_vul".to_owned(), "true".into());
    }

    let mut payload = serde_json::Map::new();
    payload.insert("project_name".to_owned(), project.name.clone().into());
    payload.insert("public".to_owned(), project.public.into());
    if !metadata.is_empty() {
        payload.insert("metadata".to_owned(), serde_json::Value::Object(metadata));
    }
    serde_json::Value::Object(payload)
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    errors: Vec<ErrorItem>,
}

#[derive(Deserialize)]
struct ErrorItem {
    #[serde(default)]
    message: String,
}

/// First message from the registry's `{"errors": [{"message": ...}]}`
/// envelope.
fn error_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    parsed
        .errors
        .into_iter()
        .map(|e| e.message)
        .find(|m| !m.is_empty())
}
