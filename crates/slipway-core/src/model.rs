use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The execution-environment shape a rendered pipeline assumes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Topology {
    /// Plain agent with a local Docker daemon.
    #[default]
    Standard,
    /// Kubernetes pod running a privileged Docker-in-Docker daemon
    /// alongside a docker CLI container.
    KubernetesDind,
    /// Kubernetes pod running a daemonless Kaniko executor.
    KubernetesKaniko,
}

impl Topology {
    pub fn as_str(&self) -> &'static str {
        match self {
            Topology::Standard => "standard",
            Topology::KubernetesDind => "kubernetes-dind",
            Topology::KubernetesKaniko => "kubernetes-kaniko",
        }
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Topology {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standard" => Ok(Topology::Standard),
            "kubernetes-dind" | "dind" => Ok(Topology::KubernetesDind),
            "kubernetes-kaniko" | "kaniko" => Ok(Topology::KubernetesKaniko),
            other => Err(crate::Error::UnknownTopology {
                value: other.to_owned(),
            }),
        }
    }
}

/// Registry a built image is pushed to, as seen from inside the pipeline.
///
/// `credential_id` names a credential stored on the CI server (used by the
/// push stage), not an inline secret. When absent, the push runs without
/// authentication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryTarget {
    pub url: String,
    #[serde(default)]
    pub credential_id: Option<String>,
}

/// Everything needed to render and run one image build.
///
/// `build_file_text` is the full Dockerfile content; it may contain arbitrary
/// text and is embedded into the pipeline script via an encoding that cannot
/// break the script's syntax.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildRequest {
    pub source_url: String,
    #[serde(default = "default_branch")]
    pub source_ref: String,
    /// CI-server credential id for cloning private repositories.
    #[serde(default)]
    pub source_credential_id: Option<String>,
    pub build_file_text: String,
    pub image_name: String,
    #[serde(default = "default_tag")]
    pub image_tag: String,
    #[serde(default)]
    pub topology: Topology,
    #[serde(default)]
    pub registry: Option<RegistryTarget>,
}

impl BuildRequest {
    pub fn new(
        source_url: impl Into<String>,
        image_name: impl Into<String>,
        build_file_text: impl Into<String>,
    ) -> Self {
        Self {
            source_url: source_url.into(),
            source_ref: default_branch(),
            source_credential_id: None,
            build_file_text: build_file_text.into(),
            image_name: image_name.into(),
            image_tag: default_tag(),
            topology: Topology::Standard,
            registry: None,
        }
    }

    /// `name:tag` as passed to the image build tool.
    pub fn image_ref(&self) -> String {
        format!("{}:{}", self.image_name, self.image_tag)
    }
}

fn default_branch() -> String {
    "main".to_owned()
}

fn default_tag() -> String {
    "latest".to_owned()
}

/// A fully rendered pipeline script.
///
/// Immutable once produced. Callers either inspect it (preview) or submit it
/// verbatim; a script edited by hand is submitted through the same path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RenderedScript(String);

impl RenderedScript {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for RenderedScript {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RenderedScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where a triggered build currently stands.
///
/// `Queued` and `Building` are the only states this crate produces itself;
/// terminal states come from out-of-band status polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BuildStatus {
    Queued,
    Building,
    Success,
    Failure,
}

impl BuildStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildStatus::Queued => "QUEUED",
            BuildStatus::Building => "BUILDING",
            BuildStatus::Success => "SUCCESS",
            BuildStatus::Failure => "FAILURE",
        }
    }
}

impl fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result record of a triggered build.
///
/// A missing `build_number` is not an error: the build was admitted to the
/// queue but had not started executing within the polling bound. It can be
/// resolved later from the queue URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildOutcome {
    pub job_name: String,
    pub queue_id: Option<u64>,
    pub queue_url: Option<String>,
    pub job_url: String,
    pub build_number: Option<u64>,
    pub build_url: Option<String>,
    pub status: BuildStatus,
    pub message: String,
}

/// Vulnerability severity threshold understood by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            other => Err(crate::Error::UnknownSeverity {
                value: other.to_owned(),
            }),
        }
    }
}

/// Security policy applied to a registry project at creation time.
///
/// Every field defaults to off. The registry's metadata schema requires that
/// disabled options are absent from the creation payload, so only enabled
/// fields are ever sent over the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectPolicy {
    #[serde(default)]
    pub content_trust: bool,
    #[serde(default)]
    pub auto_scan: bool,
    #[serde(default)]
    pub severity: Option<Severity>,
    #[serde(default)]
    pub prevent_vulnerable: bool,
}

/// A registry project as created (or found) by the registry client.
#[derive(Debug, Clone, Serialize)]
pub struct RegistryProject {
    pub name: String,
    pub public: bool,
    pub policy: ProjectPolicy,
}

impl RegistryProject {
    /// Private project with no security policy, the registry's own default.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            public: false,
            policy: ProjectPolicy::default(),
        }
    }
}
