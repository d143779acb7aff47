//! Pipeline script generation for slipway.
//!
//! Turns a [`slipway_core::BuildRequest`] into a Jenkins declarative
//! pipeline, ready to be written into a job's `config.xml`:
//!
//! ```text
//!   BuildRequest ──► PipelineBuilder::render(strategy)
//!                        │
//!                        ├─ Standard          agent any, local daemon
//!                        ├─ KubernetesDind    pod with docker + dind
//!                        └─ KubernetesKaniko  pod with kaniko executor
//!                        │
//!                        ▼
//!                   RenderedScript
//! ```
//!
//! The Dockerfile travels inside the script itself, encoded per
//! [`EmbedStrategy`], so the agent needs no access to the machine that
//! generated it.

mod embed;
mod script;

pub use embed::{encode_for_embedding, EmbedStrategy};
pub use script::PipelineBuilder;
