use std::time::Duration;

use secrecy::ExposeSecret;
use slipway_core::Credentials;
use thiserror::Error;

/// Default per-request timeout; individual calls override it.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// The request never produced an HTTP response.
#[derive(Debug, Error)]
#[error("request to {url} failed: {reason}")]
pub struct TransportError {
    pub url: String,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

#[derive(Debug, Clone)]
pub enum RequestBody {
    Json(serde_json::Value),
    Xml(String),
}

/// One HTTP exchange, described independently of the client library.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub auth: Option<Credentials>,
    pub headers: Vec<(String, String)>,
    pub body: Option<RequestBody>,
    pub timeout: Duration,
}

impl ApiRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::Post, url)
    }

    fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            auth: None,
            headers: Vec::new(),
            body: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn auth(mut self, credentials: &Credentials) -> Self {
        self.auth = Some(credentials.clone());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(RequestBody::Json(body));
        self
    }

    pub fn xml(mut self, body: impl Into<String>) -> Self {
        self.body = Some(RequestBody::Xml(body.into()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Status, headers, and body of a completed exchange.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl ApiResponse {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Abstraction over HTTP exchange for testability.
///
/// Production code uses [`ReqwestTransport`], tests use mockall-generated
/// mocks. The transport never keeps cookies: the registry arms its CSRF
/// check only for cookie-bearing sessions, so staying cookieless keeps the
/// plain basic-auth path open.
#[allow(async_fn_in_trait)]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError>;
}

/// Real transport backed by a reqwest client without a cookie store.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
        }
        .timeout(request.timeout);

        if let Some(credentials) = &request.auth {
            builder = builder.basic_auth(
                &credentials.username,
                Some(credentials.secret.expose_secret()),
            );
        }
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        match &request.body {
            Some(RequestBody::Json(value)) => builder = builder.json(value),
            Some(RequestBody::Xml(text)) => {
                builder = builder
                    .header("Content-Type", "application/xml")
                    .body(text.clone());
            }
            None => {}
        }

        let response = builder
            .send()
            .await
            .map_err(|e| transport_error(&request.url, e))?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_owned(), v.to_owned()))
            })
            .collect();
        let body = response
            .text()
            .await
            .map_err(|e| transport_error(&request.url, e))?;

        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }
}

fn transport_error(url: &str, source: reqwest::Error) -> TransportError {
    TransportError {
        url: url.to_owned(),
        reason: source.to_string(),
    }
}
