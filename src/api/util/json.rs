use anyhow::Result;
use axum::Json;

use crate::api::dto::ApiResponse;
use crate::errors::{internal_error, AppError};

/// Map a domain `Result<T>` into the JSON envelope, preserving the error
/// string for the 500 body.
pub fn to_json<T: serde::Serialize>(result: Result<T>) -> Result<Json<ApiResponse<T>>, AppError> {
    match result {
        Ok(value) => Ok(Json(ApiResponse::ok(value))),
        Err(err) => Err(internal_error(err)),
    }
}
