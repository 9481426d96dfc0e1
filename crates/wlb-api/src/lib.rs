//! JSON REST API for WLB.
//!
//! Exposes an axum [`Router`] backed by any [`wlb_core::store::ActivityStore`].
//! Every route except sign-up requires HTTP Basic credentials. TLS and
//! request tracing are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .merge(wlb_api::api_router(AppState::new(store, tz)))
//! ```

pub mod auth;
pub mod error;
pub mod logs;
pub mod taxonomy;
pub mod users;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use chrono::FixedOffset;
use wlb_core::store::ActivityStore;

pub use error::ApiError;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct AppState<S> {
  pub store: Arc<S>,
  /// Zone in which log start times are bucketed into days and displayed.
  pub tz:    FixedOffset,
}

impl<S> AppState<S> {
  pub fn new(store: Arc<S>, tz: FixedOffset) -> Self { Self { store, tz } }
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store: Arc::clone(&self.store),
      tz:    self.tz,
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be merged into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: AppState<S>) -> Router<()>
where
  S: ActivityStore + 'static,
{
  Router::new()
    // Accounts
    .route("/auth/signup", post(users::sign_up::<S>))
    .route("/auth/session", get(users::session::<S>))
    .route("/admin/users", get(users::list::<S>))
    .route("/admin/users/{id}/role", put(users::assign_role::<S>))
    // Taxonomy
    .route(
      "/taxonomy/{level}",
      get(taxonomy::list::<S>).post(taxonomy::create::<S>),
    )
    .route(
      "/taxonomy/{level}/{id}",
      get(taxonomy::get_one::<S>)
        .patch(taxonomy::update::<S>)
        .delete(taxonomy::delete::<S>),
    )
    .route("/taxonomy/{level}/{id}/move", post(taxonomy::move_one::<S>))
    // Logs
    .route("/logs", get(logs::day_report::<S>).post(logs::record::<S>))
    .route("/dashboard/{domain_id}", get(logs::dashboard::<S>))
    .with_state(state)
}

// ─── Router tests ─────────────────────────────────────────────────────────────
