//! Handlers for `/taxonomy` endpoints.
//!
//! `{level}` is `domain`, `type` or `tag` (plural forms are accepted too).
//! `{id}` is the node's row id.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/taxonomy/{level}` | `?parent=<external id>` required below domains; `?published=true` for the picker view |
//! | `POST`   | `/taxonomy/{level}` | Body: [`NewNode`]; admin only; returns 201 |
//! | `GET`    | `/taxonomy/{level}/{id}` | 404 if not found |
//! | `PATCH`  | `/taxonomy/{level}/{id}` | Body: [`NodePatch`]; admin only |
//! | `DELETE` | `/taxonomy/{level}/{id}` | 204; 409 while children exist |
//! | `POST`   | `/taxonomy/{level}/{id}/move` | Body: `{"direction":"up"}`; admin only |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use wlb_core::{
  level::Level,
  node::{Direction, NewNode, Node, NodePatch, ReorderOutcome},
  store::ActivityStore,
  taxonomy::TaxonomyService,
};

use crate::{AppState, auth::CurrentActor, error::ApiError};

fn parse_level(raw: &str) -> Result<Level, ApiError> { Ok(raw.parse()?) }

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub parent:    Option<String>,
  /// Only published nodes.
  #[serde(default)]
  pub published: bool,
}

/// `GET /taxonomy/{level}[?parent=<id>][&published=true]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  CurrentActor(_): CurrentActor,
  Path(level): Path<String>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Node>>, ApiError>
where
  S: ActivityStore + 'static,
{
  let level = parse_level(&level)?;
  let service = TaxonomyService::new(state.store.as_ref());
  let parent = params.parent.as_deref();

  let nodes = if params.published {
    service.available_children(level, parent).await?
  } else {
    service.list_children(level, parent).await?
  };
  Ok(Json(nodes))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /taxonomy/{level}`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  CurrentActor(actor): CurrentActor,
  Path(level): Path<String>,
  Json(body): Json<NewNode>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ActivityStore + 'static,
{
  let level = parse_level(&level)?;
  let node = TaxonomyService::new(state.store.as_ref())
    .create_node(&actor, level, body)
    .await?;
  Ok((StatusCode::CREATED, Json(node)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /taxonomy/{level}/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  CurrentActor(_): CurrentActor,
  Path((level, id)): Path<(String, Uuid)>,
) -> Result<Json<Node>, ApiError>
where
  S: ActivityStore + 'static,
{
  let level = parse_level(&level)?;
  let node = TaxonomyService::new(state.store.as_ref())
    .get_node(level, id)
    .await?;
  Ok(Json(node))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PATCH /taxonomy/{level}/{id}`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  CurrentActor(actor): CurrentActor,
  Path((level, id)): Path<(String, Uuid)>,
  Json(patch): Json<NodePatch>,
) -> Result<Json<Node>, ApiError>
where
  S: ActivityStore + 'static,
{
  let level = parse_level(&level)?;
  let node = TaxonomyService::new(state.store.as_ref())
    .update_node(&actor, level, id, patch)
    .await?;
  Ok(Json(node))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /taxonomy/{level}/{id}`
pub async fn delete<S>(
  State(state): State<AppState<S>>,
  CurrentActor(actor): CurrentActor,
  Path((level, id)): Path<(String, Uuid)>,
) -> Result<StatusCode, ApiError>
where
  S: ActivityStore + 'static,
{
  let level = parse_level(&level)?;
  TaxonomyService::new(state.store.as_ref())
    .delete_node(&actor, level, id)
    .await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Move ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct MoveBody {
  pub direction: Direction,
}

#[derive(Debug, Serialize)]
pub struct MoveResponse {
  pub outcome: ReorderOutcome,
}

/// `POST /taxonomy/{level}/{id}/move`
///
/// A lost race is not an error: the response reports `"stale"` and the
/// client should re-fetch the list.
pub async fn move_one<S>(
  State(state): State<AppState<S>>,
  CurrentActor(actor): CurrentActor,
  Path((level, id)): Path<(String, Uuid)>,
  Json(body): Json<MoveBody>,
) -> Result<Json<MoveResponse>, ApiError>
where
  S: ActivityStore + 'static,
{
  let level = parse_level(&level)?;
  let outcome = TaxonomyService::new(state.store.as_ref())
    .reorder_node(&actor, level, id, body.direction)
    .await?;
  Ok(Json(MoveResponse { outcome }))
}
