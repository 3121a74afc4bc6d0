//! HTTP error replies
//!
//! Every failure leaves the server as `{"message": ..., "error": ...}`.
//! `error` carries the underlying detail and is omitted for plain 404s.

use dex_core::ServiceError;
use serde::Serialize;
use std::convert::Infallible;
use warp::http::StatusCode;
use warp::reply::Response;
use warp::{Rejection, Reply};

/// JSON body of an error reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    /// Summary shown to the client
    pub message: String,
    /// Underlying cause
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Error reply with its status code
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}: {}", .status, .body.message)]
pub struct ApiError {
    /// HTTP status
    pub status: StatusCode,
    /// Reply body
    pub body: ErrorBody,
}

impl ApiError {
    /// Reply with `status` and a bare message
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                message: message.into(),
                error: None,
            },
        }
    }

    /// Attach the underlying cause
    #[must_use]
    pub fn with_error(mut self, error: impl ToString) -> Self {
        self.body.error = Some(error.to_string());
        self
    }

    /// Map a service failure during `action`
    ///
    /// Not-found keeps its own message with status 404. Everything else is a
    /// 500 whose message names the failed action.
    #[must_use]
    pub fn from_service(action: &str, err: &ServiceError) -> Self {
        if err.is_not_found() {
            return Self::new(StatusCode::NOT_FOUND, err.to_string());
        }
        tracing::error!("{}: {}", action, err);
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, action).with_error(err)
    }
}

impl Reply for ApiError {
    fn into_response(self) -> Response {
        warp::reply::with_status(warp::reply::json(&self.body), self.status).into_response()
    }
}

/// Turn warp's own rejections into JSON error replies
///
/// # Errors
/// Never fails; the signature matches `Filter::recover`.
pub async fn recover(rejection: Rejection) -> Result<Response, Infallible> {
    let error = if rejection.is_not_found() {
        ApiError::new(StatusCode::NOT_FOUND, "Not found")
    } else if let Some(e) = rejection.find::<warp::filters::body::BodyDeserializeError>() {
        ApiError::new(StatusCode::BAD_REQUEST, "Invalid request body").with_error(e)
    } else if let Some(e) = rejection.find::<warp::reject::UnsupportedMediaType>() {
        ApiError::new(StatusCode::UNSUPPORTED_MEDIA_TYPE, "Unsupported media type").with_error(e)
    } else if let Some(e) = rejection.find::<warp::reject::PayloadTooLarge>() {
        ApiError::new(StatusCode::PAYLOAD_TOO_LARGE, "Payload too large").with_error(e)
    } else if let Some(e) = rejection.find::<warp::reject::LengthRequired>() {
        ApiError::new(StatusCode::LENGTH_REQUIRED, "Length required").with_error(e)
    } else if let Some(e) = rejection.find::<warp::reject::MethodNotAllowed>() {
        ApiError::new(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed").with_error(e)
    } else if let Some(e) = rejection.find::<warp::reject::InvalidHeader>() {
        ApiError::new(StatusCode::BAD_REQUEST, "Invalid header").with_error(e)
    } else {
        tracing::warn!("unhandled rejection: {:?}", rejection);
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    };
    Ok(error.into_response())
}
