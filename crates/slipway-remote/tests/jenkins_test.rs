use mockall::mock;
use slipway_core::{BuildStatus, Credentials, JenkinsConfig, RenderedScript};
use slipway_remote::transport::{ApiRequest, ApiResponse, HttpTransport, Method, RequestBody, TransportError};
use slipway_remote::{ApiError, JenkinsClient};

mock! {
    Transport {}

    impl HttpTransport for Transport {
        async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError>;
    }
}

fn config() -> JenkinsConfig {
    JenkinsConfig {
        url: "http://jenkins.local:8080".to_owned(),
        username: "admin".to_owned(),
        job: "docker-build".to_owned(),
    }
}

fn credentials() -> Credentials {
    Credentials::new("admin", "api-token")
}

fn script() -> RenderedScript {
    RenderedScript::new("pipeline {\n    agent any\n}")
}

fn response(status: u16, body: &str) -> ApiResponse {
    ApiResponse {
        status,
        headers: vec![],
        body: body.to_owned(),
    }
}

fn json_response(status: u16, body: serde_json::Value) -> ApiResponse {
    ApiResponse {
        status,
        headers: vec![("Content-Type".to_owned(), "application/json".to_owned())],
        body: body.to_string(),
    }
}

fn crumb_ok() -> ApiResponse {
    json_response(
        200,
        serde_json::json!({
            "crumb": "abc123",
            "crumbRequestField": "Jenkins-Crumb"
        }),
    )
}

fn expect_crumb(mock: &mut MockTransport) {
    mock.expect_send()
        .withf(|request| request.url.ends_with("/crumbIssuer/api/json"))
        .times(1)
        .returning(|_| Ok(crumb_ok()));
}

async fn connect(mock: MockTransport) -> JenkinsClient<MockTransport> {
    JenkinsClient::connect_with(mock, &config(), credentials())
        .await
        .unwrap()
}

// ── Connection / crumb handling ──

#[tokio::test]
async fn connect_without_csrf_protection() {
    let mut mock = MockTransport::new();
    mock.expect_send()
        .withf(|request| request.url.ends_with("/crumbIssuer/api/json"))
        .times(1)
        .returning(|_| Ok(response(404, "no crumb issuer")));

    let client = JenkinsClient::connect_with(mock, &config(), credentials()).await;
    assert!(client.is_ok());
}

#[tokio::test]
async fn connect_rejects_html_login_page() {
    let mut mock = MockTransport::new();
    mock.expect_send()
        .withf(|request| request.url.ends_with("/crumbIssuer/api/json"))
        .returning(|_| {
            Ok(ApiResponse {
                status: 200,
                headers: vec![("Content-Type".to_owned(), "text/html; charset=utf-8".to_owned())],
                body: "<html><body>log in</body></html>".to_owned(),
            })
        });

    let result = JenkinsClient::connect_with(mock, &config(), credentials()).await;
    assert!(matches!(result, Err(ApiError::Authentication { .. })));
}

#[tokio::test]
async fn connect_network_failure_is_transient() {
    let mut mock = MockTransport::new();
    mock.expect_send().returning(|request| {
        Err(TransportError {
            url: request.url.clone(),
            reason: "connection refused".to_owned(),
        })
    });

    let result = JenkinsClient::connect_with(mock, &config(), credentials()).await;
    assert!(matches!(result, Err(ApiError::Transient { .. })));
}

#[tokio::test]
async fn crumb_rides_on_mutating_requests() {
    let mut mock = MockTransport::new();
    expect_crumb(&mut mock);

    mock.expect_send()
        .withf(|request| request.url.ends_with("/job/docker-build/api/json"))
        .returning(|_| Ok(json_response(200, serde_json::json!({"name": "docker-build"}))));

    mock.expect_send()
        .withf(|request| {
            request.url.ends_with("/job/docker-build/config.xml")
                && request.method == Method::Post
                && request
                    .headers
                    .iter()
                    .any(|(name, value)| name == "Jenkins-Crumb" && value == "abc123")
                && matches!(
                    &request.body,
                    Some(RequestBody::Xml(xml))
                        if xml.contains("<![CDATA[pipeline {") && xml.contains("<sandbox>true</sandbox>")
                )
        })
        .times(1)
        .returning(|_| Ok(response(200, "")));

    let client = connect(mock).await;
    client.update_script("docker-build", &script()).await.unwrap();
}

// ── Job existence / creation ──

#[tokio::test]
async fn job_exists_maps_status() {
    let mut mock = MockTransport::new();
    expect_crumb(&mut mock);

    mock.expect_send()
        .withf(|request| request.url.ends_with("/job/docker-build/api/json"))
        .times(1)
        .returning(|_| Ok(json_response(200, serde_json::json!({"name": "docker-build"}))));
    mock.expect_send()
        .withf(|request| request.url.ends_with("/job/docker-build/api/json"))
        .times(1)
        .returning(|_| Ok(response(404, "not found")));

    let client = connect(mock).await;
    assert!(client.job_exists("docker-build").await.unwrap());
    assert!(!client.job_exists("docker-build").await.unwrap());
}

#[tokio::test]
async fn create_job_duplicate_is_already_exists() {
    let mut mock = MockTransport::new();
    expect_crumb(&mut mock);

    mock.expect_send()
        .withf(|request| request.url.contains("/createItem?name=docker-build"))
        .returning(|_| {
            Ok(response(
                400,
                "A job already exists with the name 'docker-build'",
            ))
        });

    let client = connect(mock).await;
    let result = client.create_job("docker-build", "Docker build pipeline").await;
    assert!(matches!(
        result,
        Err(ApiError::AlreadyExists { kind: "job", ref name }) if name == "docker-build"
    ));
}

#[tokio::test]
async fn create_job_posts_empty_definition() {
    let mut mock = MockTransport::new();
    expect_crumb(&mut mock);

    mock.expect_send()
        .withf(|request| {
            let Some(RequestBody::Xml(xml)) = &request.body else {
                return false;
            };
            request.url.contains("/createItem?name=docker-build")
                && xml.contains("<description>Docker build pipeline</description>")
                && xml.contains("<script><![CDATA[]]></script>")
        })
        .times(1)
        .returning(|_| Ok(response(200, "")));

    let client = connect(mock).await;
    client
        .create_job("docker-build", "Docker build pipeline")
        .await
        .unwrap();
}

// ── Script updates ──

#[tokio::test]
async fn update_script_missing_job_is_not_found() {
    let mut mock = MockTransport::new();
    expect_crumb(&mut mock);

    // Only the existence probe runs; no config POST is expected.
    mock.expect_send()
        .withf(|request| request.url.ends_with("/job/docker-build/api/json"))
        .times(1)
        .returning(|_| Ok(response(404, "not found")));

    let client = connect(mock).await;
    let result = client.update_script("docker-build", &script()).await;
    assert!(matches!(
        result,
        Err(ApiError::NotFound { kind: "job", ref name }) if name == "docker-build"
    ));
}

#[tokio::test]
async fn update_script_500_is_script_error() {
    let mut mock = MockTransport::new();
    expect_crumb(&mut mock);

    mock.expect_send()
        .withf(|request| request.url.ends_with("/job/docker-build/api/json"))
        .returning(|_| Ok(json_response(200, serde_json::json!({"name": "docker-build"}))));
    mock.expect_send()
        .withf(|request| request.url.ends_with("/job/docker-build/config.xml"))
        .returning(|_| Ok(response(500, "javax.servlet.ServletException: script failure")));

    let client = connect(mock).await;
    let result = client.update_script("docker-build", &script()).await;
    assert!(matches!(result, Err(ApiError::Script { .. })));
}

// ── Build triggering ──

#[tokio::test(start_paused = true)]
async fn trigger_resolves_build_number_from_queue() {
    let mut mock = MockTransport::new();
    expect_crumb(&mut mock);

    mock.expect_send()
        .withf(|request| {
            request.url.ends_with("/job/docker-build/build")
                && request.method == Method::Post
                && request
                    .headers
                    .iter()
                    .any(|(name, _)| name == "Jenkins-Crumb")
        })
        .times(1)
        .returning(|_| {
            Ok(ApiResponse {
                status: 201,
                headers: vec![(
                    "Location".to_owned(),
                    "http://jenkins.local:8080/queue/item/42/".to_owned(),
                )],
                body: String::new(),
            })
        });

    let mut polls = 0;
    mock.expect_send()
        .withf(|request| request.url.ends_with("/queue/item/42/api/json"))
        .returning(move |_| {
            polls += 1;
            if polls < 3 {
                Ok(json_response(200, serde_json::json!({"why": "waiting"})))
            } else {
                Ok(json_response(
                    200,
                    serde_json::json!({"executable": {"number": 7}}),
                ))
            }
        });

    let client = connect(mock).await;
    let outcome = client.trigger_build("docker-build").await.unwrap();

    assert_eq!(outcome.queue_id, Some(42));
    assert_eq!(outcome.build_number, Some(7));
    assert_eq!(outcome.status, BuildStatus::Building);
    assert_eq!(
        outcome.build_url.as_deref(),
        Some("http://jenkins.local:8080/job/docker-build/7")
    );
    assert_eq!(
        outcome.job_url,
        "http://jenkins.local:8080/job/docker-build"
    );
}

#[tokio::test(start_paused = true)]
async fn trigger_falls_back_to_last_build() {
    let mut mock = MockTransport::new();
    expect_crumb(&mut mock);

    mock.expect_send()
        .withf(|request| request.url.ends_with("/job/docker-build/build"))
        .returning(|_| {
            Ok(ApiResponse {
                status: 201,
                headers: vec![(
                    "Location".to_owned(),
                    "http://jenkins.local:8080/queue/item/42/".to_owned(),
                )],
                body: String::new(),
            })
        });

    // Queue item evaporated before the first poll.
    mock.expect_send()
        .withf(|request| request.url.ends_with("/queue/item/42/api/json"))
        .returning(|_| Ok(response(404, "gone")));

    mock.expect_send()
        .withf(|request| request.url.ends_with("/job/docker-build/api/json"))
        .returning(|_| Ok(json_response(200, serde_json::json!({"lastBuild": {"number": 12}}))));

    let client = connect(mock).await;
    let outcome = client.trigger_build("docker-build").await.unwrap();

    assert_eq!(outcome.build_number, Some(12));
    assert_eq!(outcome.status, BuildStatus::Building);
}

#[tokio::test(start_paused = true)]
async fn trigger_without_build_number_reports_queued() {
    let mut mock = MockTransport::new();
    expect_crumb(&mut mock);

    mock.expect_send()
        .withf(|request| request.url.ends_with("/job/docker-build/build"))
        .returning(|_| {
            Ok(ApiResponse {
                status: 201,
                headers: vec![(
                    "Location".to_owned(),
                    "http://jenkins.local:8080/queue/item/42/".to_owned(),
                )],
                body: String::new(),
            })
        });

    // Build never leaves the queue within the polling bound.
    mock.expect_send()
        .withf(|request| request.url.ends_with("/queue/item/42/api/json"))
        .returning(|_| Ok(json_response(200, serde_json::json!({"why": "waiting for executor"}))));

    // The job has no builds yet either.
    mock.expect_send()
        .withf(|request| request.url.ends_with("/job/docker-build/api/json"))
        .returning(|_| Ok(json_response(200, serde_json::json!({"lastBuild": null}))));

    let client = connect(mock).await;
    let outcome = client.trigger_build("docker-build").await.unwrap();

    assert_eq!(outcome.status, BuildStatus::Queued);
    assert_eq!(outcome.build_number, None);
    assert_eq!(outcome.build_url, None);
    assert_eq!(outcome.queue_id, Some(42));
    assert_eq!(
        outcome.queue_url.as_deref(),
        Some("http://jenkins.local:8080/queue/item/42/")
    );
    assert_eq!(outcome.message, "Build triggered successfully");
}

#[tokio::test(start_paused = true)]
async fn trigger_without_location_header_still_succeeds() {
    let mut mock = MockTransport::new();
    expect_crumb(&mut mock);

    mock.expect_send()
        .withf(|request| request.url.ends_with("/job/docker-build/build"))
        .returning(|_| Ok(response(201, "")));

    mock.expect_send()
        .withf(|request| request.url.ends_with("/job/docker-build/api/json"))
        .returning(|_| Ok(json_response(200, serde_json::json!({"lastBuild": null}))));

    let client = connect(mock).await;
    let outcome = client.trigger_build("docker-build").await.unwrap();

    assert_eq!(outcome.queue_id, None);
    assert_eq!(outcome.queue_url, None);
    assert_eq!(outcome.status, BuildStatus::Queued);
}

#[tokio::test]
async fn trigger_missing_job_is_not_found() {
    let mut mock = MockTransport::new();
    expect_crumb(&mut mock);

    mock.expect_send()
        .withf(|request| request.url.ends_with("/job/docker-build/build"))
        .returning(|_| Ok(response(404, "no such job")));

    let client = connect(mock).await;
    let result = client.trigger_build("docker-build").await;
    assert!(matches!(result, Err(ApiError::NotFound { .. })));
}

// ── Combined update-and-trigger ──

#[tokio::test]
async fn update_and_trigger_skips_trigger_when_update_fails() {
    let mut mock = MockTransport::new();
    expect_crumb(&mut mock);

    mock.expect_send()
        .withf(|request| request.url.ends_with("/job/docker-build/api/json"))
        .returning(|_| Ok(json_response(200, serde_json::json!({"name": "docker-build"}))));
    // Config update fails; no build POST may follow.
    mock.expect_send()
        .withf(|request| request.url.ends_with("/job/docker-build/config.xml"))
        .returning(|_| Ok(response(500, "script rejected")));

    let client = connect(mock).await;
    let result = client.update_and_trigger("docker-build", &script()).await;
    assert!(matches!(result, Err(ApiError::Script { .. })));
}
