use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Timeout(String),

    #[error("{0}")]
    InternalError(String),
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("invalid API key or unauthorized access")]
    Unauthorized,

    #[error("request timed out after {after_ms}ms")]
    Timeout { after_ms: u64 },

    #[error("API error ({status}): {body}")]
    Transport { status: u16, body: String },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("message content is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("max retries exceeded after {attempts} attempts: {last}")]
    MaxRetriesExceeded {
        attempts: u32,
        #[source]
        last: Box<LlmError>,
    },

    #[error("request cancelled")]
    Cancelled,

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl LlmError {
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            Self::Unauthorized
                | Self::Cancelled
                | Self::Configuration(_)
                | Self::MaxRetriesExceeded { .. }
        )
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// True for a timed out attempt, and for an exhausted retry loop whose
    /// last attempt timed out.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::MaxRetriesExceeded { last, .. } => last.is_timeout(),
            _ => false,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unauthorized => "unauthorized",
            Self::Timeout { .. } => "timeout",
            Self::Transport { .. } => "transport",
            Self::Network(_) => "network",
            Self::MalformedResponse(_) => "malformed_response",
            Self::InvalidResponse(_) => "invalid_response",
            Self::InvalidJson(_) => "invalid_json",
            Self::MaxRetriesExceeded { .. } => "max_retries_exceeded",
            Self::Cancelled => "cancelled",
            Self::Configuration(_) => "configuration",
        }
    }
}

#[derive(Debug, Error)]
pub enum ParseRecipeError {
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("parsed recipe failed validation: {0}")]
    InternalValidation(String),
}

impl ParseRecipeError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Llm(e) if e.is_unauthorized() => StatusCode::UNAUTHORIZED,
            Self::Llm(e) if e.is_timeout() => StatusCode::REQUEST_TIMEOUT,
            Self::Llm(_) | Self::InternalValidation(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::Llm(e) => e.kind(),
            Self::InternalValidation(_) => "internal_validation",
        }
    }
}

impl From<ParseRecipeError> for ApiError {
    fn from(err: ParseRecipeError) -> Self {
        match err.status_code() {
            StatusCode::BAD_REQUEST => ApiError::BadRequest(err.to_string()),
            StatusCode::UNAUTHORIZED => {
                ApiError::Unauthorized("AI provider rejected the request credentials".to_string())
            }
            StatusCode::REQUEST_TIMEOUT => ApiError::Timeout("AI processing timed out".to_string()),
            _ => ApiError::InternalError("Internal Server Error".to_string()),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required config: {0}")]
    MissingRequired(String),

    #[error("invalid value for {0}")]
    InvalidValue(String),
}

#[derive(Debug, Error)]
pub enum SupabaseError {
    #[error("supabase request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("supabase returned {status}: {body}")]
    Status { status: u16, body: String },
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Timeout(_) => StatusCode::REQUEST_TIMEOUT,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let code = match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Timeout(_) => "REQUEST_TIMEOUT",
            ApiError::InternalError(_) => "INTERNAL_ERROR",
        };
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
            details: None,
        })
    }
}
