use thiserror::Error;

/// Failure taxonomy shared by the CI-server and registry clients.
///
/// Variants carry the service name and a human-readable detail instead of
/// the raw response, so callers match on category without re-parsing server
/// output.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Credentials were rejected, or a login page came back where JSON was
    /// expected.
    #[error("authentication with {service} failed: {detail}")]
    Authentication {
        service: &'static str,
        detail: String,
    },

    #[error("{kind} '{name}' not found")]
    NotFound { kind: &'static str, name: String },

    #[error("{kind} '{name}' already exists")]
    AlreadyExists { kind: &'static str, name: String },

    #[error("{service} rejected the request: {detail}")]
    Validation {
        service: &'static str,
        detail: String,
    },

    #[error("{service} denied permission: {detail}")]
    Permission {
        service: &'static str,
        detail: String,
    },

    /// Network failures and unexpected server statuses. Retrying later is
    /// reasonable.
    #[error("{service} unavailable: {detail}")]
    Transient {
        service: &'static str,
        detail: String,
    },

    /// The server accepted the request but rejected the pipeline script.
    #[error("pipeline script rejected by the server: {detail}")]
    Script { detail: String },
}

/// Map a status the caller has no specific handling for.
pub(crate) fn status_error(service: &'static str, status: u16, body: &str) -> ApiError {
    let detail = format!("status {status}: {}", snippet(body));
    match status {
        401 => ApiError::Authentication { service, detail },
        403 => ApiError::Permission { service, detail },
        400 => ApiError::Validation { service, detail },
        _ => ApiError::Transient { service, detail },
    }
}

/// First line of a response body, bounded, for error messages.
pub(crate) fn snippet(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "(empty body)".to_owned();
    }
    let line = trimmed.lines().next().unwrap_or_default();
    let mut out: String = line.chars().take(200).collect();
    if line.chars().count() > 200 {
        out.push_str("...");
    }
    out
}
