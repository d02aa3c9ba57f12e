//! Query and path extractors that reject with the JSON error envelope.
//!
//! axum's own `Query` and `Path` answer a malformed request with a plain-text
//! 400. These wrappers turn the rejection into `CoreError` so every failure a
//! client sees has the same shape.

use axum::extract::FromRequestParts;

use crate::common::CoreError;

/// `Query<T>` whose rejection is `CoreError::InvalidArgument`.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(CoreError))]
pub struct ApiQuery<T>(pub T);

/// `Path<T>` whose rejection is `CoreError::InvalidArgument`.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(CoreError))]
pub struct ApiPath<T>(pub T);
