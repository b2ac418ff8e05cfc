use axum::extract::FromRequestParts;

use crate::error::ApiError;

/// `Query` extractor whose rejections render as `ApiError` bodies
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);
