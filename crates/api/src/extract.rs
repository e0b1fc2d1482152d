//! Request extractors whose rejections use the JSON error envelope.

use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;

use crate::error::AppError;

/// Drop-in for [`axum::Json`] on request bodies.
///
/// A body that is not JSON, or does not fit the target type, is rejected as
/// 400 `BAD_REQUEST` with the usual `{success, message, code}` body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}
