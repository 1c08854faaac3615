/**
 * Error Conversion
 *
 * This module converts backend errors into HTTP responses.
 *
 * # Response Format
 *
 * Error responses are returned as JSON with the following structure:
 * ```json
 * {
 *   "success": false,
 *   "message": "Product not found",
 *   "status": 404
 * }
 * ```
 *
 * Server errors carry a generic message. The full detail travels in the
 * response extensions as an [`ErrorDetail`], and [`expose_error_detail`]
 * copies it into an `error` field. The router only installs that layer in
 * development mode.
 */
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        FromRequest, Request,
    },
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use crate::backend::error::types::BackendError;

/// Internal error detail attached to 5xx responses
#[derive(Debug, Clone)]
pub struct ErrorDetail {
    pub message: String,
    pub detail: String,
}

fn error_body(status: StatusCode, message: &str) -> serde_json::Value {
    json!({
        "success": false,
        "message": message,
        "status": status.as_u16(),
    })
}

impl IntoResponse for BackendError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.message();

        if status.is_server_error() {
            tracing::error!("[Error] {} {}", status.as_u16(), self.detail());
        } else {
            tracing::debug!("[Error] {} {}", status.as_u16(), message);
        }

        let mut response = (status, Json(error_body(status, &message))).into_response();

        if status.is_server_error() {
            response.extensions_mut().insert(ErrorDetail {
                message,
                detail: self.detail(),
            });
        }
        response
    }
}

impl From<JsonRejection> for BackendError {
    fn from(rejection: JsonRejection) -> Self {
        BackendError::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for BackendError {
    fn from(rejection: QueryRejection) -> Self {
        BackendError::bad_request(rejection.body_text())
    }
}

/// `Json` extractor whose rejection uses the API error shape
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = BackendError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(request, state).await?;
        Ok(ApiJson(value))
    }
}

/// Parse an id taken from the path. A malformed id cannot name an existing
/// record, so it is reported the same way as a missing one.
pub fn path_id(raw: &str, missing: &str) -> Result<uuid::Uuid, BackendError> {
    uuid::Uuid::parse_str(raw.trim()).map_err(|_| BackendError::not_found(missing))
}

/// Response mapper that rewrites 5xx bodies to include the internal detail
pub async fn expose_error_detail(mut response: Response) -> Response {
    let Some(ErrorDetail { message, detail }) = response.extensions_mut().remove::<ErrorDetail>()
    else {
        return response;
    };
    let status = response.status();
    let mut body = error_body(status, &message);
    body["error"] = serde_json::Value::String(detail);
    (status, Json(body)).into_response()
}
