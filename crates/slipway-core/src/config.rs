use std::collections::HashMap;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::model::Topology;

/// Environment variable holding the CI server API token.
pub const JENKINS_TOKEN_ENV: &str = "SLIPWAY_JENKINS_TOKEN";

/// Environment variable holding the registry admin password.
pub const REGISTRY_PASSWORD_ENV: &str = "SLIPWAY_REGISTRY_PASSWORD";

/// Username plus secret for basic authentication against an external server.
///
/// The secret is wrapped so it never shows up in Debug output or logs;
/// consumers expose it explicitly at the call site.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub secret: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            secret: SecretString::from(secret.into()),
        }
    }
}

/// slipway.toml configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlipwayConfig {
    #[serde(default)]
    pub jenkins: JenkinsConfig,
    /// Absent when builds are not pushed anywhere.
    #[serde(default)]
    pub registry: Option<RegistryConfig>,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub image: ImageConfig,
    #[serde(default)]
    pub build: BuildConfig,
    #[serde(default)]
    pub dockerfile: DockerfileConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JenkinsConfig {
    /// Base URL of the CI server
    #[serde(default = "default_jenkins_url")]
    pub url: String,
    /// API username
    #[serde(default = "default_username")]
    pub username: String,
    /// Pipeline job driven by `slipway build`
    #[serde(default = "default_job")]
    pub job: String,
}

impl JenkinsConfig {
    /// API credentials, with the token read from [`JENKINS_TOKEN_ENV`].
    pub fn credentials(&self) -> crate::Result<Credentials> {
        let token =
            std::env::var(JENKINS_TOKEN_ENV).map_err(|_| crate::Error::MissingSecret {
                name: JENKINS_TOKEN_ENV,
                purpose: "API token for the CI server",
            })?;
        Ok(Credentials::new(self.username.clone(), token))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Base URL of the image registry (scheme included)
    pub url: String,
    /// Admin API username
    #[serde(default = "default_username")]
    pub username: String,
    /// CI-server credential id used by the pipeline's push stage
    #[serde(default)]
    pub credential_id: Option<String>,
}

impl RegistryConfig {
    /// Admin credentials, with the password read from [`REGISTRY_PASSWORD_ENV`].
    pub fn credentials(&self) -> crate::Result<Credentials> {
        let password =
            std::env::var(REGISTRY_PASSWORD_ENV).map_err(|_| crate::Error::MissingSecret {
                name: REGISTRY_PASSWORD_ENV,
                purpose: "admin password for the image registry",
            })?;
        Ok(Credentials::new(self.username.clone(), password))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Git URL of the repository to build
    pub url: Option<String>,
    #[serde(default = "default_branch")]
    pub branch: String,
    /// CI-server credential id for private repositories
    #[serde(default)]
    pub credential_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    /// Image name (defaults to the job name when unset)
    pub name: Option<String>,
    #[serde(default = "default_tag")]
    pub tag: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildConfig {
    #[serde(default)]
    pub topology: Topology,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DockerfileConfig {
    /// Project language: python, node, or java
    #[serde(default = "default_language")]
    pub language: String,
    /// Framework hint (fastapi, flask, django, express, nestjs, nextjs,
    /// spring-boot); generic fallback when unset
    #[serde(default)]
    pub framework: Option<String>,
    /// Runtime version; per-language default when unset
    #[serde(default)]
    pub runtime_version: Option<String>,
    /// Port the application listens on; per-language default when unset
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default = "default_app_dir")]
    pub app_dir: String,
    /// Run the application as a dedicated non-root user
    #[serde(default = "default_true")]
    pub non_root_user: bool,
    /// Static environment variables baked into the image as ENV directives
    #[serde(default)]
    pub env: HashMap<String, String>,
    /// Emit a HEALTHCHECK directive against the service port
    #[serde(default)]
    pub healthcheck: bool,
    /// Entry hint: python module ("main:app"), node entry file, or jar path
    #[serde(default)]
    pub entry: Option<String>,
}

impl Default for JenkinsConfig {
    fn default() -> Self {
        Self {
            url: default_jenkins_url(),
            username: default_username(),
            job: default_job(),
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: None,
            branch: default_branch(),
            credential_id: None,
        }
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            name: None,
            tag: default_tag(),
        }
    }
}

impl Default for DockerfileConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            framework: None,
            runtime_version: None,
            port: None,
            app_dir: default_app_dir(),
            non_root_user: true,
            env: HashMap::new(),
            healthcheck: false,
            entry: None,
        }
    }
}

impl SlipwayConfig {
    /// Load from slipway.toml at the given path, or return defaults if not found.
    pub fn load(project_dir: &std::path::Path) -> crate::Result<Self> {
        let config_path = project_dir.join("slipway.toml");
        if config_path.exists() {
            tracing::debug!(path = %config_path.display(), "loading config");
            let content =
                std::fs::read_to_string(&config_path).map_err(|e| crate::Error::ConfigLoad {
                    path: config_path.clone(),
                    source: e,
                })?;
            toml::from_str(&content).map_err(|e| crate::Error::ConfigParse {
                path: config_path,
                source: e,
            })
        } else {
            Ok(Self::default())
        }
    }
}

fn default_jenkins_url() -> String {
    "http://localhost:8080".to_owned()
}

fn default_username() -> String {
    "admin".to_owned()
}

fn default_job() -> String {
    "docker-build".to_owned()
}

fn default_branch() -> String {
    "main".to_owned()
}

fn default_tag() -> String {
    "latest".to_owned()
}

fn default_language() -> String {
    "python".to_owned()
}

fn default_app_dir() -> String {
    "/app".to_owned()
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = SlipwayConfig::load(dir.path()).unwrap();
        assert_eq!(config.jenkins.url, "http://localhost:8080");
        assert_eq!(config.jenkins.job, "docker-build");
        assert!(config.registry.is_none());
        assert_eq!(config.image.tag, "latest");
        assert_eq!(config.build.topology, Topology::Standard);
    }

    #[test]
    fn parses_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("slipway.toml"),
            r#"
[jenkins]
url = "https://ci.example.com"
job = "acme-build"

[registry]
url = "https://harbor.example.com"
credential_id = "harbor-push"

[build]
topology = "kubernetes-kaniko"

[dockerfile]
language = "node"
framework = "express"
"#,
        )
        .unwrap();

        let config = SlipwayConfig::load(dir.path()).unwrap();
        assert_eq!(config.jenkins.url, "https://ci.example.com");
        assert_eq!(config.jenkins.username, "admin");
        let registry = config.registry.unwrap();
        assert_eq!(registry.credential_id.as_deref(), Some("harbor-push"));
        assert_eq!(config.build.topology, Topology::KubernetesKaniko);
        assert_eq!(config.dockerfile.language, "node");
        assert!(config.dockerfile.non_root_user);
    }

    #[test]
    fn rejects_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("slipway.toml"), "[jenkins\nurl=").unwrap();
        let err = SlipwayConfig::load(dir.path()).unwrap_err();
        assert!(matches!(err, crate::Error::ConfigParse { .. }));
    }

    #[test]
    fn credentials_redact_secret_in_debug() {
        let creds = Credentials::new("admin", "super-secret-token");
        let debug = format!("{creds:?}");
        assert!(!debug.contains("super-secret-token"));
    }
}
