//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use wlb_core::Error as CoreError;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error(transparent)]
  Core(#[from] CoreError),

  /// Missing or rejected Basic credentials.
  #[error("unauthorized")]
  Unauthorized,

  #[error("bad request: {0}")]
  BadRequest(String),
}

impl ApiError {
  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Core(e) => match e {
        CoreError::Validation(_)
        | CoreError::MissingParent(_)
        | CoreError::InvalidDuration => StatusCode::BAD_REQUEST,
        CoreError::Forbidden => StatusCode::FORBIDDEN,
        CoreError::NotFound(_) => StatusCode::NOT_FOUND,
        CoreError::Dependency | CoreError::Conflict(_) => StatusCode::CONFLICT,
        CoreError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
      },
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    // `Store` displays as a generic message; its source only reaches the log.
    let mut res = (status, Json(json!({ "error": self.to_string() }))).into_response();
    if status == StatusCode::UNAUTHORIZED {
      res.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Basic realm=\"wlb\""),
      );
    }
    res
  }
}

#[cfg(test)]
mod tests {
  use wlb_core::level::Level;

  use super::*;

  #[test]
  fn core_errors_map_to_statuses() {
    let cases = [
      (CoreError::Validation("x".into()), StatusCode::BAD_REQUEST),
      (CoreError::MissingParent(Level::Domain), StatusCode::BAD_REQUEST),
      (CoreError::InvalidDuration, StatusCode::BAD_REQUEST),
      (CoreError::Forbidden, StatusCode::FORBIDDEN),
      (CoreError::NotFound("x".into()), StatusCode::NOT_FOUND),
      (CoreError::Dependency, StatusCode::CONFLICT),
      (CoreError::Conflict("x".into()), StatusCode::CONFLICT),
    ];
    for (err, status) in cases {
      assert_eq!(ApiError::from(err).status(), status);
    }
  }

  #[test]
  fn store_failures_hide_their_source() {
    let source = std::io::Error::other("disk on fire");
    let err = ApiError::from(CoreError::Store(Box::new(source)));
    assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(err.to_string(), "operation failed");
  }

  #[test]
  fn unauthorized_carries_challenge() {
    let res = ApiError::Unauthorized.into_response();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(res.headers().contains_key(header::WWW_AUTHENTICATE));
  }
}
