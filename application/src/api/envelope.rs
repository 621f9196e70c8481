//! Response envelopes shared by every endpoint.

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Successful response carrying the `data`.
#[derive(Clone, Debug, Serialize)]
pub struct Success<T> {
    /// Always `true`.
    success: bool,

    /// Payload of this [`Success`].
    pub data: T,
}

impl<T> Success<T> {
    /// Wraps the provided `data` into a [`Success`] envelope.
    #[must_use]
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for Success<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Rejection of a request lacking a valid session.
///
/// Its wording never depends on why exactly the session is missing.
#[derive(Clone, Debug, Serialize)]
pub struct Rejection {
    /// Always `false`.
    success: bool,

    /// Reason phrase of the response status.
    error: &'static str,

    /// Human-readable instruction for the client.
    message: String,
}

impl Rejection {
    /// Creates a new [`Rejection`] with the provided `status` and `message`.
    #[must_use]
    pub fn new(status: http::StatusCode, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: status.canonical_reason().unwrap_or_default(),
            message: message.into(),
        }
    }
}

/// Failed response of any kind other than a [`Rejection`].
#[derive(Clone, Debug, Serialize)]
pub struct Failure {
    /// Always `false`.
    success: bool,

    /// [`Details`] of the failure.
    error: Details,
}

/// Details of a [`Failure`].
#[derive(Clone, Debug, Serialize)]
struct Details {
    /// Numeric status of the response.
    code: u16,

    /// Reason phrase of the response status.
    message: &'static str,

    /// Description of what went wrong.
    description: String,
}

impl Failure {
    /// Creates a new [`Failure`] with the provided `status` and `description`.
    #[must_use]
    pub fn new(
        status: http::StatusCode,
        description: impl Into<String>,
    ) -> Self {
        Self {
            success: false,
            error: Details {
                code: status.as_u16(),
                message: status.canonical_reason().unwrap_or_default(),
                description: description.into(),
            },
        }
    }
}
