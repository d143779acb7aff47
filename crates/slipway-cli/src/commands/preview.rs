use std::path::Path;

use slipway::orchestrator;
use slipway::{SlipwayConfig, Topology};

use super::{request_from_config, resolve_build_file};

/// Print the pipeline script that `slipway build` would submit, with the
/// Dockerfile readable inline instead of Base64-encoded.
pub async fn preview(file: Option<&Path>, topology: Option<Topology>) -> anyhow::Result<()> {
    let config = SlipwayConfig::load(Path::new("."))?;
    let build_file = resolve_build_file(&config, file)?;
    let request = request_from_config(&config, build_file, topology)?;

    let script = orchestrator::preview(&request);
    println!("{script}");
    Ok(())
}
