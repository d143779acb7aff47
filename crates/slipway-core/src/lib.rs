//! Core types and configuration for slipway.
//!
//! This crate defines the `slipway.toml` schema ([`SlipwayConfig`]), the
//! shared build/registry data model ([`BuildRequest`], [`BuildOutcome`],
//! [`ProjectPolicy`]), and shared error types.

pub mod config;
pub mod error;
pub mod model;

pub use config::{
    Credentials, DockerfileConfig, ImageConfig, JenkinsConfig, RegistryConfig, SlipwayConfig,
    SourceConfig, JENKINS_TOKEN_ENV, REGISTRY_PASSWORD_ENV,
};
pub use error::{Error, Result};
pub use model::{
    BuildOutcome, BuildRequest, BuildStatus, ProjectPolicy, RegistryProject, RegistryTarget,
    RenderedScript, Severity, Topology,
};
