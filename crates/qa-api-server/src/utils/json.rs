use axum::extract::FromRequest;

use super::error::ApiError;

/// `axum::Json` whose rejections render as an `ApiError` body.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);
