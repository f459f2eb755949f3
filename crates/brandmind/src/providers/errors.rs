use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Execution error: {0}")]
    ExecutionError(String),

    #[error("Usage data error: {0}")]
    UsageError(String),
}

fn is_network_error(err: &reqwest::Error) -> bool {
    err.is_connect() || err.is_timeout() || (err.status().is_none() && err.is_request())
}

fn provider_error_from_reqwest(error: &reqwest::Error) -> ProviderError {
    if error.is_timeout() {
        return ProviderError::Timeout("upstream call exceeded the HTTP client timeout".to_string());
    }
    if is_network_error(error) {
        let msg = if error.is_connect() {
            match error.url().and_then(|u| u.host_str().map(str::to_string)) {
                Some(host) => format!("could not connect to {}", host),
                None => "could not connect to the provider".to_string(),
            }
        } else {
            "network error while calling the provider".to_string()
        };
        return ProviderError::NetworkError(msg);
    }

    let msg = match error.status() {
        Some(status) => format!("{} (status: {})", error, status),
        None => error.to_string(),
    };
    ProviderError::RequestFailed(msg)
}

impl From<reqwest::Error> for ProviderError {
    fn from(error: reqwest::Error) -> Self {
        provider_error_from_reqwest(&error)
    }
}

impl From<anyhow::Error> for ProviderError {
    fn from(error: anyhow::Error) -> Self {
        if let Some(reqwest_err) = error.downcast_ref::<reqwest::Error>() {
            return provider_error_from_reqwest(reqwest_err);
        }
        ProviderError::ExecutionError(error.to_string())
    }
}

/// Map a non-success HTTP status plus whatever body was readable into the
/// provider error taxonomy.
pub fn map_http_error(
    status: reqwest::StatusCode,
    payload: Option<&serde_json::Value>,
) -> ProviderError {
    let detail = payload
        .and_then(extract_error_message)
        .unwrap_or_else(|| format!("status {}", status));

    match status.as_u16() {
        401 | 403 => ProviderError::Authentication(detail),
        429 => ProviderError::RateLimitExceeded(detail),
        500..=599 => ProviderError::ServerError(detail),
        _ => ProviderError::RequestFailed(detail),
    }
}

/// Providers disagree on where the human-readable message lives:
/// `{"error": {"message": ...}}`, `{"error": "..."}` or `{"message": "..."}`.
fn extract_error_message(payload: &serde_json::Value) -> Option<String> {
    payload
        .get("error")
        .and_then(|e| e.get("message"))
        .and_then(|m| m.as_str())
        .or_else(|| payload.get("error").and_then(|e| e.as_str()))
        .or_else(|| payload.get("message").and_then(|m| m.as_str()))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_401_maps_to_authentication() {
        let err = map_http_error(reqwest::StatusCode::UNAUTHORIZED, None);
        assert!(matches!(err, ProviderError::Authentication(_)));
    }

    #[test]
    fn status_429_maps_to_rate_limit() {
        let err = map_http_error(reqwest::StatusCode::TOO_MANY_REQUESTS, None);
        assert!(matches!(err, ProviderError::RateLimitExceeded(_)));
    }

    #[test]
    fn status_503_maps_to_server_error() {
        let err = map_http_error(reqwest::StatusCode::SERVICE_UNAVAILABLE, None);
        assert!(matches!(err, ProviderError::ServerError(_)));
    }

    #[test]
    fn nested_error_message_is_extracted() {
        let payload = json!({"error": {"message": "invalid model"}});
        let err = map_http_error(reqwest::StatusCode::BAD_REQUEST, Some(&payload));
        assert_eq!(err, ProviderError::RequestFailed("invalid model".into()));
    }

    #[test]
    fn flat_message_is_extracted() {
        let payload = json!({"message": "proxy rejected the request"});
        let err = map_http_error(reqwest::StatusCode::BAD_REQUEST, Some(&payload));
        assert_eq!(
            err,
            ProviderError::RequestFailed("proxy rejected the request".into())
        );
    }
}
