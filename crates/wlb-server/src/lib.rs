//! Configuration and router assembly for the `wlb-server` binary.

use std::{path::PathBuf, sync::Arc};

use axum::Router;
use chrono::FixedOffset;
use serde::Deserialize;
use thiserror::Error;
use tower_http::trace::TraceLayer;
use wlb_api::AppState;
use wlb_core::store::ActivityStore;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `WLB_`-prefixed environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:               String,
  pub port:               u16,
  pub store_path:         PathBuf,
  /// Offset from UTC, in minutes, used to bucket logs into days.
  #[serde(default)]
  pub utc_offset_minutes: i32,
}

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("utc_offset_minutes {0} is outside ±24h")]
  OffsetOutOfRange(i32),
}

impl ServerConfig {
  pub fn tz(&self) -> Result<FixedOffset, ConfigError> {
    self
      .utc_offset_minutes
      .checked_mul(60)
      .and_then(FixedOffset::east_opt)
      .ok_or(ConfigError::OffsetOutOfRange(self.utc_offset_minutes))
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// The API router with request tracing applied.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: ActivityStore + 'static,
{
  Router::new()
    .merge(wlb_api::api_router(state))
    .layer(TraceLayer::new_for_http())
}

/// Wrap `store` into application state for `config`.
pub fn app_state<S>(store: S, config: &ServerConfig) -> Result<AppState<S>, ConfigError> {
  Ok(AppState::new(Arc::new(store), config.tz()?))
}

#[cfg(test)]
mod tests {
  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use tower::ServiceExt as _;
  use wlb_store_sqlite::SqliteStore;

  use super::*;

  fn config(offset: i32) -> ServerConfig {
    ServerConfig {
      host:               "127.0.0.1".into(),
      port:               8080,
      store_path:         PathBuf::from(":memory:"),
      utc_offset_minutes: offset,
    }
  }

  #[test]
  fn offset_becomes_fixed_zone() {
    let tz = config(420).tz().unwrap();
    assert_eq!(tz.local_minus_utc(), 7 * 3600);
    assert_eq!(config(-90).tz().unwrap().local_minus_utc(), -5400);
  }

  #[test]
  fn offset_beyond_a_day_is_rejected() {
    assert!(matches!(
      config(24 * 60).tz(),
      Err(ConfigError::OffsetOutOfRange(1440))
    ));
  }

  #[test]
  fn address_joins_host_and_port() {
    assert_eq!(config(0).address(), "127.0.0.1:8080");
  }

  #[tokio::test]
  async fn traced_router_serves_the_api() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let app = router(app_state(store, &config(0)).unwrap());

    let resp = app
      .oneshot(Request::get("/auth/session").body(Body::empty()).unwrap())
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }
}
