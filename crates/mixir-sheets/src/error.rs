//! Error types for gateway calls.
//!
//! The gateway never retries and never interprets a failure beyond putting it
//! in a category. The raw response body is kept as `detail` so callers can
//! look for provider-specific markers (for example `invalidSharingRequest`).

use std::fmt;
use thiserror::Error;

/// The category of a gateway error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayErrorCode {
    /// Access token rejected or refresh failed (401).
    AuthenticationFailed,
    /// Credentials valid but access denied (403 without rate limiting).
    AuthorizationFailed,
    /// Connection failed, timed out, or the body could not be read.
    NetworkError,
    /// Quota or rate limit exceeded (429, or 403 with a rate-limit reason).
    RateLimited,
    /// 5xx from the remote API.
    ServerError,
    /// Response body did not decode into the expected shape.
    InvalidResponse,
    /// Resource not found (404).
    NotFound,
    /// Request rejected as invalid (400 and other 4xx).
    BadRequest,
    /// Local configuration problem (bad endpoint, missing client secret).
    ConfigurationError,
}

impl GatewayErrorCode {
    /// Returns true for failures caused by the request itself rather than by
    /// the transport or the provider's availability.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::NotFound | Self::BadRequest)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthenticationFailed => "authentication_failed",
            Self::AuthorizationFailed => "authorization_failed",
            Self::NetworkError => "network_error",
            Self::RateLimited => "rate_limited",
            Self::ServerError => "server_error",
            Self::InvalidResponse => "invalid_response",
            Self::NotFound => "not_found",
            Self::BadRequest => "bad_request",
            Self::ConfigurationError => "configuration_error",
        }
    }
}

impl fmt::Display for GatewayErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error returned by a gateway call.
#[derive(Debug, Error)]
pub struct GatewayError {
    code: GatewayErrorCode,
    message: String,
    /// HTTP status, when the failure came from a response.
    status: Option<u16>,
    /// Raw response body, when there was one.
    detail: Option<String>,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl GatewayError {
    pub fn new(code: GatewayErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            status: None,
            detail: None,
            source: None,
        }
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::AuthenticationFailed, message)
    }

    pub fn authorization(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::AuthorizationFailed, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::NetworkError, message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::RateLimited, message)
    }

    pub fn server(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::ServerError, message)
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::InvalidResponse, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::NotFound, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::BadRequest, message)
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::ConfigurationError, message)
    }

    /// Classifies a non-success HTTP response.
    ///
    /// Google reports quota exhaustion as 403 with a `rateLimitExceeded` or
    /// `userRateLimitExceeded` reason, so 403 bodies are inspected.
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        let code = match status {
            401 => GatewayErrorCode::AuthenticationFailed,
            403 if body.contains("RateLimitExceeded") || body.contains("rateLimitExceeded") => {
                GatewayErrorCode::RateLimited
            }
            403 => GatewayErrorCode::AuthorizationFailed,
            404 => GatewayErrorCode::NotFound,
            429 => GatewayErrorCode::RateLimited,
            400..=499 => GatewayErrorCode::BadRequest,
            _ => GatewayErrorCode::ServerError,
        };
        Self::new(code, format!("API error ({status})"))
            .with_status(status)
            .with_detail(body)
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    pub fn code(&self) -> GatewayErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    /// Returns true if the message or the raw detail contains `marker`.
    pub fn mentions(&self, marker: &str) -> bool {
        self.message.contains(marker) || self.detail.as_deref().is_some_and(|d| d.contains(marker))
    }
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)?;
        if let Some(ref detail) = self.detail
            && !detail.is_empty()
        {
            write!(f, ": {}", detail.trim())?;
        }
        Ok(())
    }
}

/// A specialized Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;
