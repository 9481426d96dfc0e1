//! HTTP Basic-auth extractor and password hashing.
//!
//! The username is the account email; the password is checked against the
//! stored argon2 PHC string.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use rand_core::OsRng;
use wlb_core::{accounts::AccountService, store::ActivityStore, user::Actor};

use crate::{AppState, error::ApiError};

/// The authenticated caller. Present in a handler means the request carried
/// valid credentials.
#[derive(Debug, Clone, Copy)]
pub struct CurrentActor(pub Actor);

/// Hash `password` into an argon2 PHC string with a fresh salt.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
  if password.is_empty() {
    return Err(ApiError::BadRequest("password must not be empty".into()));
  }
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| ApiError::BadRequest(e.to_string()))
}

/// `true` if `password` matches the PHC string `hash`. A malformed hash never
/// matches.
pub fn verify_password(password: &str, hash: &str) -> bool {
  PasswordHash::new(hash)
    .map(|parsed| {
      Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
    })
    .unwrap_or(false)
}

/// Decode `Authorization: Basic …` into `(username, password)`.
pub fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
  let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
  let encoded = value.strip_prefix("Basic ")?;
  let decoded = B64.decode(encoded.trim()).ok()?;
  let creds = String::from_utf8(decoded).ok()?;
  let (user, pass) = creds.split_once(':')?;
  Some((user.to_owned(), pass.to_owned()))
}

impl<S> FromRequestParts<AppState<S>> for CurrentActor
where
  S: ActivityStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let (email, password) =
      basic_credentials(&parts.headers).ok_or(ApiError::Unauthorized)?;

    let record = AccountService::new(state.store.as_ref())
      .find_credentials(&email)
      .await?;

    match record {
      Some(record) if verify_password(&password, &record.password_hash) => {
        Ok(CurrentActor(Actor::from(&record.user)))
      }
      _ => {
        tracing::debug!(%email, "basic auth rejected");
        Err(ApiError::Unauthorized)
      }
    }
  }
}
