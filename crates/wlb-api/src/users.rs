//! Handlers for sign-up, the current session and user administration.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/auth/signup` | Public. Body: `{"email":"…","password":"…"}` |
//! | `GET`  | `/auth/session` | The caller's id and role |
//! | `GET`  | `/admin/users` | Admin only |
//! | `PUT`  | `/admin/users/{id}/role` | Admin only. Body: `{"role":"admin"}` |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;
use wlb_core::{
  accounts::AccountService,
  store::ActivityStore,
  user::{Actor, Role, User},
};

use crate::{
  AppState,
  auth::{CurrentActor, hash_password},
  error::ApiError,
};

#[derive(Debug, Deserialize)]
pub struct SignUpBody {
  pub email:    String,
  pub password: String,
}

/// `POST /auth/signup`
pub async fn sign_up<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<SignUpBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ActivityStore + 'static,
{
  let hash = hash_password(&body.password)?;
  let user = AccountService::new(state.store.as_ref())
    .sign_up(&body.email, hash)
    .await?;
  Ok((StatusCode::CREATED, Json(user)))
}

/// `GET /auth/session`. Re-reads the role so a change made by an admin is
/// visible immediately.
pub async fn session<S>(
  State(state): State<AppState<S>>,
  CurrentActor(actor): CurrentActor,
) -> Result<Json<Actor>, ApiError>
where
  S: ActivityStore + 'static,
{
  let actor = AccountService::new(state.store.as_ref())
    .resolve_actor(actor.user_id)
    .await?;
  Ok(Json(actor))
}

/// `GET /admin/users`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  CurrentActor(actor): CurrentActor,
) -> Result<Json<Vec<User>>, ApiError>
where
  S: ActivityStore + 'static,
{
  let users = AccountService::new(state.store.as_ref())
    .list_users(&actor)
    .await?;
  Ok(Json(users))
}

#[derive(Debug, Deserialize)]
pub struct RoleBody {
  pub role: Role,
}

/// `PUT /admin/users/{id}/role`
pub async fn assign_role<S>(
  State(state): State<AppState<S>>,
  CurrentActor(actor): CurrentActor,
  Path(user_id): Path<Uuid>,
  Json(body): Json<RoleBody>,
) -> Result<Json<User>, ApiError>
where
  S: ActivityStore + 'static,
{
  let user = AccountService::new(state.store.as_ref())
    .assign_role(&actor, user_id, body.role)
    .await?;
  Ok(Json(user))
}
