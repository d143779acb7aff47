use std::path::Path;

use anyhow::Context;
use slipway::build::{analyze_node, analyze_python, DockerfileGenerator};
use slipway::{DockerfileConfig, SlipwayConfig};

/// Render a Dockerfile from the [dockerfile] config table and print or
/// write it.
pub async fn generate(output: Option<&Path>) -> anyhow::Result<()> {
    let config = SlipwayConfig::load(Path::new("."))?;
    let text = render_dockerfile(&config)?;

    match output {
        Some(path) => {
            std::fs::write(path, &text)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Wrote {}", path.display());
        }
        None => print!("{text}"),
    }
    Ok(())
}

/// Render with project-file hints folded in where the config leaves a
/// choice open.
pub(crate) fn render_dockerfile(config: &SlipwayConfig) -> anyhow::Result<String> {
    let mut dockerfile = config.dockerfile.clone();
    if dockerfile.framework.is_none() {
        apply_framework_hint(&mut dockerfile);
    }
    Ok(DockerfileGenerator::new(&dockerfile).render()?)
}

/// Detect the framework from requirements.txt or package.json. Explicit
/// configuration always wins; this only fills a blank.
fn apply_framework_hint(config: &mut DockerfileConfig) {
    match config.language.as_str() {
        "python" => {
            if let Ok(requirements) = std::fs::read_to_string("requirements.txt") {
                let report = analyze_python(&requirements);
                if let Some(framework) = report.framework {
                    eprintln!("Detected {framework} from requirements.txt");
                    config.framework = Some(framework);
                }
            }
        }
        "node" | "nodejs" => {
            if let Ok(package_json) = std::fs::read_to_string("package.json") {
                match analyze_node(&package_json) {
                    Ok(report) => {
                        if let Some(framework) = report.framework {
                            eprintln!("Detected {framework} from package.json");
                            config.framework = Some(framework);
                        }
                    }
                    Err(e) => tracing::warn!(error = %e, "package.json scan failed"),
                }
            }
        }
        _ => {}
    }
}
