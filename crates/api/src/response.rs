//! Shared response envelope types for API handlers.
//!
//! Every successful response carries `"success": true` next to its payload.
//! Errors are rendered by [`crate::error::AppError`] with `"success": false`.

use serde::Serialize;

/// Standard `{ "success": true, "data": T }` response envelope.
///
/// # Example
///
/// ```ignore
/// Ok(Json(DataResponse::new(project)))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Paged listing envelope: `{ "success": true, "data": [...], "pagination": {...} }`.
#[derive(Debug, Serialize)]
pub struct PagedResponse<T: Serialize> {
    pub success: bool,
    pub data: Vec<T>,
    pub pagination: Pagination,
}

/// Position of a page within the full result set.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
    pub has_more: bool,
}

impl<T: Serialize> PagedResponse<T> {
    pub fn new(data: Vec<T>, total: i64, limit: i64, offset: i64) -> Self {
        let has_more = offset + (data.len() as i64) < total;
        Self {
            success: true,
            data,
            pagination: Pagination {
                total,
                limit,
                offset,
                has_more,
            },
        }
    }
}

/// `{ "success": true, "message": ... }` for operations with no payload.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}
