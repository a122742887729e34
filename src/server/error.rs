use crate::error::Error;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

/// JSON error body returned by the API
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Error of one endpoint, with the fixed message shown for upstream failures
#[derive(Debug)]
pub struct ApiError {
    error: Error,
    failure_message: &'static str,
    expose_detail: bool,
}

impl ApiError {
    pub fn new(error: Error, failure_message: &'static str) -> Self {
        Self {
            error,
            failure_message,
            expose_detail: false,
        }
    }

    /// Include the underlying error text in 500 responses
    pub fn with_detail(mut self) -> Self {
        self.expose_detail = true;
        self
    }

    pub fn status(&self) -> StatusCode {
        match self.error {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::Unauthorized => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Adapter for `map_err` that tags an error with its endpoint message
pub fn failure(failure_message: &'static str) -> impl FnOnce(Error) -> ApiError {
    move |error| ApiError::new(error, failure_message)
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self.error {
            Error::Validation(message) => ErrorResponse { message, error: None },
            Error::Unauthorized => ErrorResponse {
                message: Error::Unauthorized.to_string(),
                error: None,
            },
            other => {
                error!("{} {}", self.failure_message, other);
                ErrorResponse {
                    message: self.failure_message.to_string(),
                    error: self.expose_detail.then(|| other.to_string()),
                }
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::validation_error;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::new(validation_error("bad"), "x").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::new(Error::Unauthorized, "x").status(),
            StatusCode::UNAUTHORIZED
        );
        let upstream = Error::Upstream {
            status: 404,
            message: "Not Found".to_string(),
        };
        assert_eq!(
            ApiError::new(upstream, "x").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
