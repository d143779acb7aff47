//! Lightweight project scans that feed Dockerfile generation.
//!
//! All scans work on text the caller already has in hand (requirements.txt
//! content, package.json content, a jar's MANIFEST.MF), never on archives or
//! uploads. Results are hints; explicit configuration always wins over them.

use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum AnalyzeError {
    #[error("package.json is not valid JSON")]
    InvalidPackageJson { source: serde_json::Error },
}

/// What a requirements.txt scan tells us about a Python project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PythonReport {
    pub framework: Option<String>,
    /// WSGI/ASGI server the Dockerfile should launch.
    pub server: String,
    pub dependencies: Vec<String>,
}

pub fn analyze_python(requirements: &str) -> PythonReport {
    let mut dependencies = Vec::new();
    for line in requirements.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        // Package name ends at the first version-specifier character.
        let name = match line.find(['=', '<', '>', '!']) {
            Some(idx) => line[..idx].trim(),
            None => line,
        };
        if !name.is_empty() {
            dependencies.push(name.to_owned());
        }
    }

    let has = |pkg: &str| dependencies.iter().any(|d| d.eq_ignore_ascii_case(pkg));
    let (framework, server) = if has("fastapi") {
        (Some("fastapi"), "uvicorn")
    } else if has("flask") {
        (Some("flask"), "gunicorn")
    } else if has("django") {
        (Some("django"), "gunicorn")
    } else {
        (None, "uvicorn")
    };

    PythonReport {
        framework: framework.map(str::to_owned),
        server: server.to_owned(),
        dependencies,
    }
}

/// What a package.json scan tells us about a Node project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeReport {
    pub framework: Option<String>,
    pub package_manager: String,
    pub build_command: Option<String>,
    pub start_command: String,
    pub dependencies: Vec<String>,
}

pub fn analyze_node(package_json: &str) -> Result<NodeReport, AnalyzeError> {
    let value: Value = serde_json::from_str(package_json)
        .map_err(|e| AnalyzeError::InvalidPackageJson { source: e })?;

    let empty = serde_json::Map::new();
    let deps = value
        .get("dependencies")
        .and_then(Value::as_object)
        .unwrap_or(&empty);
    let dev_deps = value
        .get("devDependencies")
        .and_then(Value::as_object)
        .unwrap_or(&empty);
    let dependencies: Vec<String> = deps.keys().chain(dev_deps.keys()).cloned().collect();

    let mut framework = None;
    let mut build_command = None;
    let mut start_command = "npm start".to_owned();
    if deps.contains_key("next") || dev_deps.contains_key("next") {
        framework = Some("nextjs".to_owned());
        build_command = Some("npm run build".to_owned());
        start_command = "npm start".to_owned();
    } else if deps.contains_key("@nestjs/core") {
        framework = Some("nestjs".to_owned());
        build_command = Some("npm run build".to_owned());
        start_command = "npm run start:prod".to_owned();
    } else if deps.contains_key("express") {
        framework = Some("express".to_owned());
        start_command = "node server.js".to_owned();
    }

    let mut package_manager = "npm".to_owned();
    if let Some(pm) = value.get("packageManager").and_then(Value::as_str) {
        if pm.contains("yarn") {
            package_manager = "yarn".to_owned();
        } else if pm.contains("pnpm") {
            package_manager = "pnpm".to_owned();
        }
    }

    if let Some(scripts) = value.get("scripts").and_then(Value::as_object) {
        if scripts.contains_key("build") && build_command.is_none() {
            build_command = Some(format!("{package_manager} run build"));
        }
        // An explicit start script is canonical regardless of framework.
        if scripts.contains_key("start") {
            start_command = format!("{package_manager} start");
        }
    }

    Ok(NodeReport {
        framework,
        package_manager,
        build_command,
        start_command,
        dependencies,
    })
}

/// What a MANIFEST.MF scan tells us about a Java artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JavaReport {
    /// `Main-Class`, falling back to `Start-Class` for repackaged jars.
    pub main_class: Option<String>,
    pub spring_boot: bool,
    pub spring_boot_version: Option<String>,
    /// Major version from `Build-Jdk`, when present.
    pub java_version: Option<String>,
}

pub fn analyze_java_manifest(manifest: &str) -> JavaReport {
    let mut entries = std::collections::HashMap::new();
    for line in manifest.lines() {
        if let Some((key, value)) = line.split_once(':') {
            entries.insert(key.trim().to_owned(), value.trim().to_owned());
        }
    }

    let main_class = entries
        .get("Main-Class")
        .or_else(|| entries.get("Start-Class"))
        .cloned();
    let spring_boot_version = entries.get("Spring-Boot-Version").cloned();
    let java_version = entries
        .get("Build-Jdk")
        .and_then(|v| v.split('.').next())
        .map(str::to_owned);

    JavaReport {
        main_class,
        spring_boot: spring_boot_version.is_some(),
        spring_boot_version,
        java_version,
    }
}
