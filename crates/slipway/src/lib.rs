//! Build Docker images through a Jenkins pipeline, with Harbor as the
//! target registry.
//!
//! This is the unified facade crate that re-exports all Slipway sub-crates.
//! Use feature flags to control which components are included.
//!
//! # Feature flags
//!
//! | Feature | Default | Crate | Description |
//! |---------|---------|-------|-------------|
//! | `build` | yes | [`slipway-build`](https://crates.io/crates/slipway-build) | Dockerfile generation and project analysis |
//! | `pipeline` | yes | [`slipway-pipeline`](https://crates.io/crates/slipway-pipeline) | Declarative pipeline script rendering |
//! | `remote` | yes | [`slipway-remote`](https://crates.io/crates/slipway-remote) | Jenkins and Harbor REST clients |
//!
//! # Quick start
//!
//! ```toml
//! [dependencies]
//! slipway = "0.3"
//! ```
//!
//! ```rust
//! use slipway::{BuildRequest, Topology};
//! use slipway::orchestrator;
//!
//! let mut request = BuildRequest::new(
//!     "https://git.example.com/team/app.git",
//!     "app",
//!     "FROM python:3.11-slim\nCOPY . /app\n",
//! );
//! request.topology = Topology::KubernetesKaniko;
//! let script = orchestrator::preview(&request);
//! println!("{script}");
//! ```

// Core types flattened into root namespace for convenience.
pub use slipway_core::*;

/// Dockerfile generation and project analysis.
///
/// See [`slipway-build`](https://crates.io/crates/slipway-build) for details.
#[cfg(feature = "build")]
pub mod build {
    pub use slipway_build::*;
}

/// Declarative pipeline rendering for the supported build topologies.
///
/// See [`slipway-pipeline`](https://crates.io/crates/slipway-pipeline) for details.
#[cfg(feature = "pipeline")]
pub mod pipeline {
    pub use slipway_pipeline::*;
}

/// Jenkins and Harbor REST clients.
///
/// See [`slipway-remote`](https://crates.io/crates/slipway-remote) for details.
#[cfg(feature = "remote")]
pub mod remote {
    pub use slipway_remote::*;
}

#[cfg(all(feature = "pipeline", feature = "remote"))]
pub mod orchestrator;
