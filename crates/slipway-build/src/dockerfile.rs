use slipway_core::DockerfileConfig;

#[derive(Debug, thiserror::Error)]
pub enum DockerfileError {
    #[error("unsupported language '{language}'; expected python, node, or java")]
    UnsupportedLanguage { language: String },
}

/// Health endpoint probed by the optional HEALTHCHECK directive.
const HEALTH_PATH: &str = "/health";

/// Generates a Dockerfile for a (language, framework) pair.
///
/// Output is a pure function of the config: environment variables are
/// emitted in sorted order and nothing time- or host-dependent is rendered,
/// so the same config always produces byte-identical text.
pub struct DockerfileGenerator<'a> {
    config: &'a DockerfileConfig,
}

impl<'a> DockerfileGenerator<'a> {
    pub fn new(config: &'a DockerfileConfig) -> Self {
        Self { config }
    }

    pub fn render(&self) -> Result<String, DockerfileError> {
        tracing::debug!(
            language = %self.config.language,
            framework = self.config.framework.as_deref().unwrap_or("generic"),
            "rendering dockerfile"
        );
        match self.config.language.as_str() {
            "python" => Ok(self.render_python()),
            "node" | "nodejs" => Ok(self.render_node()),
            "java" => Ok(self.render_java()),
            other => Err(DockerfileError::UnsupportedLanguage {
                language: other.to_owned(),
            }),
        }
    }

    fn render_python(&self) -> String {
        let version = self.config.runtime_version.as_deref().unwrap_or("3.11");
        let port = self.config.port.unwrap_or(8000);
        let command = match self.config.framework.as_deref() {
            Some("fastapi") => {
                let entry = self.config.entry.as_deref().unwrap_or("main:app");
                format!(r#"CMD ["uvicorn", "{entry}", "--host", "0.0.0.0", "--port", "{port}"]"#)
            }
            Some("flask") => {
                let entry = self.config.entry.as_deref().unwrap_or("app:app");
                format!(r#"CMD ["gunicorn", "--bind", "0.0.0.0:{port}", "{entry}"]"#)
            }
            Some("django") => {
                let entry = self.config.entry.as_deref().unwrap_or("config.wsgi:application");
                format!(r#"CMD ["gunicorn", "--bind", "0.0.0.0:{port}", "{entry}"]"#)
            }
            _ => {
                let entry = self.config.entry.as_deref().unwrap_or("main.py");
                format!(r#"CMD ["python", "{entry}"]"#)
            }
        };

        let user = if self.config.non_root_user {
            "RUN useradd --create-home appuser && chown -R appuser:appuser /app\nUSER appuser\n\n"
                .to_owned()
        } else {
            String::new()
        };

        format!(
            r#"FROM python:{version}-slim

WORKDIR {app_dir}

ENV PYTHONDONTWRITEBYTECODE=1 \
    PYTHONUNBUFFERED=1

{env}COPY requirements.txt .
RUN pip install --no-cache-dir -r requirements.txt

COPY . .

{user}EXPOSE {port}

{healthcheck}{command}
"#,
            app_dir = self.config.app_dir,
            env = self.env_fragment(),
            healthcheck = self.healthcheck_python(port),
        )
    }

    fn render_node(&self) -> String {
        let version = self.config.runtime_version.as_deref().unwrap_or("20");
        let port = self.config.port.unwrap_or(3000);
        // The official node images ship a non-root `node` user.
        let user = if self.config.non_root_user {
            "USER node\n\n"
        } else {
            ""
        };

        match self.config.framework.as_deref() {
            Some("nestjs") => format!(
                r#"FROM node:{version}-alpine AS builder

WORKDIR {app_dir}

COPY package*.json ./
RUN npm ci

COPY . .
RUN npm run build && npm prune --omit=dev

FROM node:{version}-alpine

WORKDIR {app_dir}

ENV NODE_ENV=production

{env}COPY --from=builder {app_dir}/node_modules ./node_modules
COPY --from=builder {app_dir}/dist ./dist
COPY --from=builder {app_dir}/package.json ./package.json

{user}EXPOSE {port}

{healthcheck}CMD ["node", "dist/main.js"]
"#,
                app_dir = self.config.app_dir,
                env = self.env_fragment(),
                healthcheck = self.healthcheck_wget(port),
            ),
            Some("nextjs") => format!(
                r#"FROM node:{version}-alpine AS builder

WORKDIR {app_dir}

COPY package*.json ./
RUN npm ci

COPY . .
RUN npm run build && npm prune --omit=dev

FROM node:{version}-alpine

WORKDIR {app_dir}

ENV NODE_ENV=production

{env}COPY --from=builder {app_dir}/node_modules ./node_modules
COPY --from=builder {app_dir}/.next ./.next
COPY --from=builder {app_dir}/public ./public
COPY --from=builder {app_dir}/package.json ./package.json

{user}EXPOSE {port}

{healthcheck}CMD ["npm", "start"]
"#,
                app_dir = self.config.app_dir,
                env = self.env_fragment(),
                healthcheck = self.healthcheck_wget(port),
            ),
            framework => {
                let command = if framework == Some("express") {
                    let entry = self.config.entry.as_deref().unwrap_or("server.js");
                    format!(r#"CMD ["node", "{entry}"]"#)
                } else {
                    r#"CMD ["npm", "start"]"#.to_owned()
                };
                format!(
                    r#"FROM node:{version}-alpine

WORKDIR {app_dir}

ENV NODE_ENV=production

{env}COPY package*.json ./
RUN npm ci --omit=dev

COPY . .

{user}EXPOSE {port}

{healthcheck}{command}
"#,
                    app_dir = self.config.app_dir,
                    env = self.env_fragment(),
                    healthcheck = self.healthcheck_wget(port),
                )
            }
        }
    }

    fn render_java(&self) -> String {
        let version = self.config.runtime_version.as_deref().unwrap_or("17");
        let port = self.config.port.unwrap_or(8080);
        let jar = self.config.entry.as_deref().unwrap_or("target/*.jar");
        let user = if self.config.non_root_user {
            "RUN adduser -D appuser && chown -R appuser:appuser /app\nUSER appuser\n\n"
        } else {
            ""
        };

        format!(
            r#"FROM eclipse-temurin:{version}-jre-alpine

WORKDIR {app_dir}

{env}COPY {jar} app.jar

{user}EXPOSE {port}

{healthcheck}ENTRYPOINT ["java", "-Xmx512m", "-jar", "app.jar"]
"#,
            app_dir = self.config.app_dir,
            env = self.env_fragment(),
            healthcheck = self.healthcheck_wget(port),
        )
    }

    /// One `ENV` directive per entry, key-sorted, each line `\n`-terminated.
    fn env_fragment(&self) -> String {
        let mut pairs: Vec<_> = self.config.env.iter().collect();
        pairs.sort_by(|a, b| a.0.cmp(b.0));
        pairs
            .iter()
            .map(|(key, value)| format!("ENV {key}={value}\n"))
            .collect()
    }

    fn healthcheck_python(&self, port: u16) -> String {
        if !self.config.healthcheck {
            return String::new();
        }
        format!(
            "HEALTHCHECK --interval=30s --timeout=5s --start-period=10s --retries=3 \\\n  CMD python -c \"import urllib.request; urllib.request.urlopen('http://127.0.0.1:{port}{HEALTH_PATH}')\"\n\n"
        )
    }

    fn healthcheck_wget(&self, port: u16) -> String {
        if !self.config.healthcheck {
            return String::new();
        }
        format!(
            "HEALTHCHECK --interval=30s --timeout=5s --start-period=10s --retries=3 \\\n  CMD wget -qO- http://127.0.0.1:{port}{HEALTH_PATH} || exit 1\n\n"
        )
    }
}
