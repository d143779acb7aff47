//! Dockerfile generation and project analysis for slipway.
//!
//! # Generation flow
//!
//! ```text
//! slipway generate
//!   1. Analyze    ── requirements.txt / package.json / MANIFEST.MF scan
//!   2. Merge      ── explicit [dockerfile] config wins over detected hints
//!   3. Render     ── DockerfileGenerator::render()
//! ```
//!
//! The rendered text feeds `BuildRequest.build_file_text`, where the
//! pipeline layer embeds it into a CI script without further interpretation.

pub mod analyze;
pub mod dockerfile;

pub use analyze::{
    analyze_java_manifest, analyze_node, analyze_python, AnalyzeError, JavaReport, NodeReport,
    PythonReport,
};
pub use dockerfile::{DockerfileError, DockerfileGenerator};
