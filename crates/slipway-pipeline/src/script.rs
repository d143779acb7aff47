//! Jenkins declarative-pipeline rendering.
//!
//! One template per topology, assembled from the same stage vocabulary:
//! Checkout → Create Dockerfile → Build Docker Image → Push to Registry or
//! Verify Image. Stage names are contract: operators read them in CI logs,
//! so they stay stable across topologies.

use slipway_core::{BuildRequest, RenderedScript, Topology};

use crate::embed::{encode_for_embedding, EmbedStrategy};

/// Renders a [`BuildRequest`] into a pipeline script.
///
/// Rendering is a pure function of the request: identical input yields
/// byte-identical output, with no timestamps or generated identifiers.
pub struct PipelineBuilder<'a> {
    request: &'a BuildRequest,
}

impl<'a> PipelineBuilder<'a> {
    pub fn new(request: &'a BuildRequest) -> Self {
        Self { request }
    }

    /// Render the script for the request's topology.
    ///
    /// The strategy decides how the Dockerfile text is embedded: base64 for
    /// scripts that run, heredoc for human preview. The decode site in the
    /// rendered script always matches the chosen strategy.
    pub fn render(&self, strategy: EmbedStrategy) -> RenderedScript {
        tracing::debug!(
            topology = %self.request.topology,
            image = %self.request.image_ref(),
            "rendering pipeline script"
        );
        let script = match self.request.topology {
            Topology::Standard => self.render_standard(strategy),
            Topology::KubernetesDind => self.render_dind(strategy),
            Topology::KubernetesKaniko => self.render_kaniko(strategy),
        };
        RenderedScript::new(script)
    }

    // ── Standard: plain agent with a local Docker daemon ──

    fn render_standard(&self, strategy: EmbedStrategy) -> String {
        let final_stage = match &self.request.registry {
            Some(registry) => format!(
                r#"stage('Push to Registry') {{
            steps {{
                echo 'Pushing image to registry...'
                script {{
                    {session} {{
                        docker.image("${{params.IMAGE_NAME}}:${{params.IMAGE_TAG}}").push()
                        docker.image("${{params.IMAGE_NAME}}:${{params.IMAGE_TAG}}").push('latest')
                    }}
                }}
            }}
        }}"#,
                session = registry_session(&registry.url, registry.credential_id.as_deref()),
            ),
            None => r#"stage('Verify Image') {
            steps {
                echo 'Verifying Docker image...'
                sh 'docker images | grep ${params.IMAGE_NAME}'
            }
        }"#
            .to_owned(),
        };

        format!(
            r#"pipeline {{
    agent any

    parameters {{
        string(name: 'IMAGE_NAME', defaultValue: '{image_name}', description: 'Docker image name')
        string(name: 'IMAGE_TAG', defaultValue: '{image_tag}', description: 'Docker image tag')
    }}

    stages {{
        stage('Checkout') {{
            steps {{
                echo 'Cloning repository from {source_url}...'
                {git_step}
            }}
        }}

        stage('Create Dockerfile') {{
            steps {{
                echo 'Creating Dockerfile from generated content...'
                script {{
                    {dockerfile_decl}
                    writeFile file: 'Dockerfile', text: dockerfileContent
                    echo 'Dockerfile created successfully'
                    sh 'cat Dockerfile'
                }}
            }}
        }}

        stage('Build Docker Image') {{
            steps {{
                echo "Building Docker image: ${{params.IMAGE_NAME}}:${{params.IMAGE_TAG}}"
                script {{
                    docker.build("${{params.IMAGE_NAME}}:${{params.IMAGE_TAG}}")
                }}
            }}
        }}

        {final_stage}
    }}

{post}}}
"#,
            image_name = self.request.image_name,
            image_tag = self.request.image_tag,
            source_url = self.request.source_url,
            git_step = self.git_step("                    "),
            dockerfile_decl = self.dockerfile_decl(strategy, "                    "),
            post = self.post_block(),
        )
    }

    // ── Kubernetes, Docker-in-Docker: privileged daemon + docker client ──

    fn render_dind(&self, strategy: EmbedStrategy) -> String {
        let final_stage = match &self.request.registry {
            Some(registry) => format!(
                r#"stage('Push to Registry') {{
            steps {{
                container('docker') {{
                    echo 'Pushing image to registry...'
                    script {{
                        {session} {{
                            docker.image("${{params.IMAGE_NAME}}:${{params.IMAGE_TAG}}").push()
                            docker.image("${{params.IMAGE_NAME}}:${{params.IMAGE_TAG}}").push('latest')
                        }}
                    }}
                }}
            }}
        }}"#,
                session = registry_session(&registry.url, registry.credential_id.as_deref()),
            ),
            None => r#"stage('Verify Image') {
            steps {
                container('docker') {
                    echo 'Verifying Docker image...'
                    sh 'docker images | grep ${params.IMAGE_NAME}'
                }
            }
        }"#
            .to_owned(),
        };

        format!(
            r#"pipeline {{
    agent {{
        kubernetes {{
            yaml '''
apiVersion: v1
kind: Pod
spec:
  containers:
  - name: docker
    image: docker:24-git
    command:
    - sleep
    args:
    - 99d
    env:
    - name: DOCKER_HOST
      value: unix:///var/run/docker.sock
    volumeMounts:
    - name: docker-sock
      mountPath: /var/run
  - name: dind
    image: docker:24-dind
    securityContext:
      privileged: true
    env:
    - name: DOCKER_TLS_CERTDIR
      value: ""
    volumeMounts:
    - name: docker-sock
      mountPath: /var/run
  volumes:
  - name: docker-sock
    emptyDir: {{}}
'''
        }}
    }}

    parameters {{
        string(name: 'IMAGE_NAME', defaultValue: '{image_name}', description: 'Docker image name')
        string(name: 'IMAGE_TAG', defaultValue: '{image_tag}', description: 'Docker image tag')
    }}

    stages {{
        stage('Wait for Docker Daemon') {{
            steps {{
                container('docker') {{
                    echo 'Waiting for the Docker daemon to come up...'
                    sh 'n=0; until docker info > /dev/null 2>&1; do n=$((n + 1)); if [ "$n" -ge 30 ]; then echo "Docker daemon not ready after 60s" >&2; exit 1; fi; sleep 2; done'
                }}
            }}
        }}

        stage('Checkout') {{
            steps {{
                container('docker') {{
                    echo 'Cloning repository from {source_url}...'
                    {git_step}
                }}
            }}
        }}

        stage('Create Dockerfile') {{
            steps {{
                container('docker') {{
                    echo 'Creating Dockerfile from generated content...'
                    script {{
                        {dockerfile_decl}
                        writeFile file: 'Dockerfile', text: dockerfileContent
                        echo 'Dockerfile created successfully'
                        sh 'cat Dockerfile'
                    }}
                }}
            }}
        }}

        stage('Build Docker Image') {{
            steps {{
                container('docker') {{
                    echo "Building Docker image: ${{params.IMAGE_NAME}}:${{params.IMAGE_TAG}}"
                    script {{
                        docker.build("${{params.IMAGE_NAME}}:${{params.IMAGE_TAG}}")
                    }}
                }}
            }}
        }}

        {final_stage}
    }}

{post}}}
"#,
            image_name = self.request.image_name,
            image_tag = self.request.image_tag,
            source_url = self.request.source_url,
            git_step = self.git_step("                        "),
            dockerfile_decl = self.dockerfile_decl(strategy, "                        "),
            post = self.post_block(),
        )
    }

    // ── Kubernetes, Kaniko: daemonless build, no readiness wait needed ──

    fn render_kaniko(&self, strategy: EmbedStrategy) -> String {
        let destination = self.kaniko_destination();
        let build_step = self.kaniko_build_step(&destination);
        let verify_stage = if self.request.registry.is_none() {
            r#"

        stage('Verify Image') {
            steps {
                container('kaniko') {
                    echo 'Verifying image tarball...'
                    sh 'ls -lh "$WORKSPACE/image.tar"'
                }
            }
        }
"#
            .to_owned()
        } else {
            "\n".to_owned()
        };

        format!(
            r#"pipeline {{
    agent {{
        kubernetes {{
            yaml '''
apiVersion: v1
kind: Pod
spec:
  containers:
  - name: kaniko
    image: gcr.io/kaniko-project/executor:debug
    command:
    - /busybox/cat
    tty: true
'''
        }}
    }}

    parameters {{
        string(name: 'IMAGE_NAME', defaultValue: '{image_name}', description: 'Docker image name')
        string(name: 'IMAGE_TAG', defaultValue: '{image_tag}', description: 'Docker image tag')
    }}

    stages {{
        stage('Checkout') {{
            steps {{
                echo 'Cloning repository from {source_url}...'
                {git_step}
            }}
        }}

        stage('Create Dockerfile') {{
            steps {{
                echo 'Creating Dockerfile from generated content...'
                script {{
                    {dockerfile_decl}
                    writeFile file: 'Dockerfile', text: dockerfileContent
                    echo 'Dockerfile created successfully'
                    sh 'cat Dockerfile'
                }}
            }}
        }}

        stage('Build Docker Image') {{
            steps {{
                echo 'Building image with Kaniko: {destination}'
                container('kaniko') {{
                    {build_step}
                }}
            }}
        }}{verify_stage}    }}

{post}}}
"#,
            image_name = self.request.image_name,
            image_tag = self.request.image_tag,
            source_url = self.request.source_url,
            git_step = self.git_step("                    "),
            dockerfile_decl = self.dockerfile_decl(strategy, "                    "),
            post = self.post_block(),
        )
    }

    /// Kaniko invocation for the three registry configurations.
    ///
    /// Registry credentials are materialized into the executor container's
    /// own filesystem inside a `withCredentials` block, so they exist only
    /// for the duration of the stage and never land in the workspace.
    fn kaniko_build_step(&self, destination: &str) -> String {
        match &self.request.registry {
            Some(registry) => match &registry.credential_id {
                Some(credential_id) => format!(
                    r#"withCredentials([usernamePassword(credentialsId: '{credential_id}', usernameVariable: 'REGISTRY_USER', passwordVariable: 'REGISTRY_PASS')]) {{
                        sh '''
                            auth=$(printf '%s:%s' "$REGISTRY_USER" "$REGISTRY_PASS" | base64)
                            mkdir -p /kaniko/.docker
                            printf '{{"auths":{{"%s":{{"auth":"%s"}}}}}}' '{host}' "$auth" > /kaniko/.docker/config.json
                            /kaniko/executor --context "$WORKSPACE" --dockerfile "$WORKSPACE/Dockerfile" --destination "{destination}"
                        '''
                    }}"#,
                    host = registry_host(&registry.url),
                ),
                // Explicit configuration for registries running without
                // auth; the executor pushes anonymously.
                None => format!(
                    r#"// No registry credential configured; pushing unauthenticated
                    sh '/kaniko/executor --context "$WORKSPACE" --dockerfile "$WORKSPACE/Dockerfile" --destination "{destination}"'"#
                ),
            },
            None => format!(
                r#"sh '/kaniko/executor --context "$WORKSPACE" --dockerfile "$WORKSPACE/Dockerfile" --destination "{destination}" --no-push --tarPath "$WORKSPACE/image.tar"'"#
            ),
        }
    }

    /// Fully-qualified push target: `registry/image:tag`, or bare
    /// `image:tag` for local-only builds.
    fn kaniko_destination(&self) -> String {
        match &self.request.registry {
            Some(registry) => format!(
                "{}/{}",
                strip_scheme(&registry.url).trim_end_matches('/'),
                self.request.image_ref()
            ),
            None => self.request.image_ref(),
        }
    }

    /// `git` step with the credential reference included only when one was
    /// provided; its absence must not leave an empty placeholder behind.
    fn git_step(&self, continuation: &str) -> String {
        let url = &self.request.source_url;
        let branch = &self.request.source_ref;
        match &self.request.source_credential_id {
            Some(id) => format!(
                "git url: '{url}',\n{continuation}branch: '{branch}',\n{continuation}credentialsId: '{id}'"
            ),
            None => format!("git url: '{url}',\n{continuation}branch: '{branch}'"),
        }
    }

    /// Groovy lines declaring `dockerfileContent`, matching the embedding
    /// strategy used to encode the payload.
    fn dockerfile_decl(&self, strategy: EmbedStrategy, indent: &str) -> String {
        let payload = encode_for_embedding(&self.request.build_file_text, strategy);
        match strategy {
            EmbedStrategy::Base64 => format!(
                "// Decode Base64 Dockerfile content\n{indent}def dockerfileBase64 = '{payload}'\n{indent}def dockerfileContent = new String(dockerfileBase64.decodeBase64())"
            ),
            EmbedStrategy::Heredoc => {
                format!("def dockerfileContent = \"\"\"{payload}\"\"\"")
            }
        }
    }

    fn post_block(&self) -> String {
        let (success, registry_echo) = match &self.request.registry {
            Some(registry) => (
                "Docker image built and pushed successfully!",
                format!("            echo \"Registry: {}\"\n", registry.url),
            ),
            None => ("Docker image built successfully!", String::new()),
        };
        format!(
            r#"    post {{
        success {{
            echo '{success}'
            echo "Image: ${{params.IMAGE_NAME}}:${{params.IMAGE_TAG}}"
{registry_echo}        }}
        failure {{
            echo 'Build failed!'
            echo 'Check the console output for details'
        }}
        always {{
            echo 'Build completed'
        }}
    }}
"#
        )
    }
}

/// `docker.withRegistry` session opener; the credential argument is only
/// present when a credential id was supplied.
fn registry_session(url: &str, credential_id: Option<&str>) -> String {
    let session_url = if url.contains("://") {
        url.to_owned()
    } else {
        format!("https://{url}")
    };
    match credential_id {
        Some(id) => format!("docker.withRegistry('{session_url}', '{id}')"),
        None => format!("docker.withRegistry('{session_url}')"),
    }
}

/// Registry reference without a scheme, as image tools expect it.
fn strip_scheme(url: &str) -> &str {
    url.split_once("://").map(|(_, rest)| rest).unwrap_or(url)
}

/// Host part of a registry URL, used as the auth key in a Docker
/// config.json.
fn registry_host(url: &str) -> &str {
    let bare = strip_scheme(url);
    bare.split('/').next().unwrap_or(bare)
}
