use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to load config from {path}")]
    ConfigLoad {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config at {path}")]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("environment variable {name} is not set ({purpose})")]
    MissingSecret {
        name: &'static str,
        purpose: &'static str,
    },

    #[error(
        "unknown topology '{value}'; expected one of: standard, kubernetes-dind, kubernetes-kaniko"
    )]
    UnknownTopology { value: String },

    #[error("unknown severity '{value}'; expected one of: low, medium, high, critical")]
    UnknownSeverity { value: String },
}
