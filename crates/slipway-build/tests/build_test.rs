use std::collections::HashMap;

use slipway_build::dockerfile::{DockerfileError, DockerfileGenerator};
use slipway_core::DockerfileConfig;

fn config(language: &str, framework: Option<&str>) -> DockerfileConfig {
    DockerfileConfig {
        language: language.to_owned(),
        framework: framework.map(str::to_owned),
        ..Default::default()
    }
}

// ── Python ──

#[test]
fn fastapi_dockerfile_runs_uvicorn() {
    let config = config("python", Some("fastapi"));
    let output = DockerfileGenerator::new(&config).render().unwrap();

    assert!(output.contains("FROM python:3.11-slim"));
    assert!(output.contains("RUN pip install --no-cache-dir -r requirements.txt"));
    assert!(output.contains(r#"CMD ["uvicorn", "main:app", "--host", "0.0.0.0", "--port", "8000"]"#));
    assert!(output.contains("EXPOSE 8000"));
    assert!(output.contains("USER appuser"));
}

#[test]
fn flask_dockerfile_runs_gunicorn() {
    let config = config("python", Some("flask"));
    let output = DockerfileGenerator::new(&config).render().unwrap();

    assert!(output.contains(r#"CMD ["gunicorn", "--bind", "0.0.0.0:8000", "app:app"]"#));
}

#[test]
fn generic_python_runs_entry_file() {
    let mut config = config("python", None);
    config.entry = Some("worker.py".to_owned());
    let output = DockerfileGenerator::new(&config).render().unwrap();

    assert!(output.contains(r#"CMD ["python", "worker.py"]"#));
}

#[test]
fn python_respects_version_and_port() {
    let mut config = config("python", Some("fastapi"));
    config.runtime_version = Some("3.12".to_owned());
    config.port = Some(9000);
    let output = DockerfileGenerator::new(&config).render().unwrap();

    assert!(output.contains("FROM python:3.12-slim"));
    assert!(output.contains("EXPOSE 9000"));
    assert!(output.contains("--port\", \"9000\""));
}

// ── Node ──

#[test]
fn express_dockerfile_is_single_stage() {
    let config = config("node", Some("express"));
    let output = DockerfileGenerator::new(&config).render().unwrap();

    assert!(output.contains("FROM node:20-alpine"));
    assert!(!output.contains("AS builder"));
    assert!(output.contains("RUN npm ci --omit=dev"));
    assert!(output.contains(r#"CMD ["node", "server.js"]"#));
    assert!(output.contains("USER node"));
    assert!(output.contains("EXPOSE 3000"));
}

#[test]
fn nestjs_dockerfile_builds_then_prunes() {
    let config = config("node", Some("nestjs"));
    let output = DockerfileGenerator::new(&config).render().unwrap();

    assert!(output.contains("FROM node:20-alpine AS builder"));
    assert!(output.contains("RUN npm run build && npm prune --omit=dev"));
    assert!(output.contains("COPY --from=builder /app/dist ./dist"));
    assert!(output.contains(r#"CMD ["node", "dist/main.js"]"#));
}

#[test]
fn nextjs_dockerfile_copies_next_output() {
    let config = config("node", Some("nextjs"));
    let output = DockerfileGenerator::new(&config).render().unwrap();

    assert!(output.contains("COPY --from=builder /app/.next ./.next"));
    assert!(output.contains("COPY --from=builder /app/public ./public"));
    assert!(output.contains(r#"CMD ["npm", "start"]"#));
}

// ── Java ──

#[test]
fn java_dockerfile_runs_jar() {
    let config = config("java", None);
    let output = DockerfileGenerator::new(&config).render().unwrap();

    assert!(output.contains("FROM eclipse-temurin:17-jre-alpine"));
    assert!(output.contains("COPY target/*.jar app.jar"));
    assert!(output.contains(r#"ENTRYPOINT ["java", "-Xmx512m", "-jar", "app.jar"]"#));
    assert!(output.contains("EXPOSE 8080"));
}

// ── Shared behavior ──

#[test]
fn env_directives_are_sorted() {
    let mut config = config("python", Some("fastapi"));
    config.env = HashMap::from([
        ("ZONE".to_owned(), "eu".to_owned()),
        ("APP_MODE".to_owned(), "prod".to_owned()),
    ]);
    let output = DockerfileGenerator::new(&config).render().unwrap();

    let app = output.find("ENV APP_MODE=prod").unwrap();
    let zone = output.find("ENV ZONE=eu").unwrap();
    assert!(app < zone);
}

#[test]
fn healthcheck_only_when_enabled() {
    let mut config = config("python", Some("fastapi"));
    let without = DockerfileGenerator::new(&config).render().unwrap();
    assert!(!without.contains("HEALTHCHECK"));

    config.healthcheck = true;
    let with = DockerfileGenerator::new(&config).render().unwrap();
    assert!(with.contains("HEALTHCHECK --interval=30s"));
    assert!(with.contains("http://127.0.0.1:8000/health"));
}

#[test]
fn root_user_when_disabled() {
    let mut config = config("java", None);
    config.non_root_user = false;
    let output = DockerfileGenerator::new(&config).render().unwrap();

    assert!(!output.contains("USER "));
    assert!(!output.contains("adduser"));
}

#[test]
fn rendering_is_deterministic() {
    let mut config = config("node", Some("nextjs"));
    config.env = HashMap::from([
        ("B".to_owned(), "2".to_owned()),
        ("A".to_owned(), "1".to_owned()),
        ("C".to_owned(), "3".to_owned()),
    ]);
    let first = DockerfileGenerator::new(&config).render().unwrap();
    let second = DockerfileGenerator::new(&config).render().unwrap();

    assert_eq!(first, second);
}

#[test]
fn unknown_language_is_rejected() {
    let config = config("cobol", None);
    let err = DockerfileGenerator::new(&config).render().unwrap_err();

    assert!(matches!(
        err,
        DockerfileError::UnsupportedLanguage { language } if language == "cobol"
    ));
}
