use std::path::Path;

/// Scaffold slipway.toml and .env.example in the current directory.
pub async fn init_project() -> anyhow::Result<()> {
    let mut created = Vec::new();

    let config_path = Path::new("slipway.toml");
    if config_path.exists() {
        eprintln!("slipway.toml already exists, skipping");
    } else {
        let config = r#"[jenkins]
url = "http://localhost:8080"
username = "admin"
job = "docker-build"

[source]
url = "https://github.com/your-org/your-app.git"
branch = "main"
# credential_id = "github-deploy-key"

[image]
name = "your-app"
tag = "latest"

[build]
# standard, kubernetes-dind, or kubernetes-kaniko
topology = "standard"

# [registry]
# url = "https://harbor.example.com"
# username = "admin"
# credential_id = "harbor-push"

# [dockerfile]
# language = "python"
# framework = "fastapi"
# port = 8000
"#;
        std::fs::write(config_path, config)?;
        created.push("slipway.toml");
    }

    let env_path = Path::new(".env.example");
    if env_path.exists() {
        eprintln!(".env.example already exists, skipping");
    } else {
        let env_example = r#"SLIPWAY_JENKINS_TOKEN=your-api-token
SLIPWAY_REGISTRY_PASSWORD=your-registry-password
"#;
        std::fs::write(env_path, env_example)?;
        created.push(".env.example");
    }

    if created.is_empty() {
        println!("Nothing to create, already initialized.");
    } else {
        for f in &created {
            println!("Created {f}");
        }
    }

    println!();
    println!("Next steps:");
    println!();
    println!("  1. Configure credentials:");
    println!("     cp .env.example .env");
    println!();
    println!("  2. Point [source] and [image] at your repository:");
    println!("     $EDITOR slipway.toml");
    println!();
    println!("  3. Check the pipeline:");
    println!("     slipway preview");
    println!();
    println!("  4. Run a build:");
    println!("     slipway build --create-job");

    Ok(())
}
