//! Handlers for activity logs and reports.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/logs` | Body: [`RecordBody`]; returns 201 + stored log |
//! | `GET`  | `/logs` | Day report of the caller's logs; optional `?domain_id=` |
//! | `GET`  | `/dashboard/{domain_id}` | Report for one domain |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use wlb_core::{
  activity::ActivityService,
  aggregate::{DayView, DomainReport},
  log::{NewLog, parse_hms},
  store::ActivityStore,
};

use crate::{AppState, auth::CurrentActor, error::ApiError};

// ─── Record ───────────────────────────────────────────────────────────────────

/// Body of `POST /logs`. The duration is given either in seconds or as an
/// `HH:MM:SS` string; seconds win when both are present.
#[derive(Debug, Deserialize)]
pub struct RecordBody {
  pub tag_id:           String,
  pub start_time:       Option<DateTime<Utc>>,
  pub duration_seconds: Option<i64>,
  pub duration_hms:     Option<String>,
  pub notes:            Option<String>,
}

impl RecordBody {
  fn into_new_log(self) -> NewLog {
    let duration_seconds = self
      .duration_seconds
      .or_else(|| self.duration_hms.as_deref().map(parse_hms))
      .unwrap_or(0);

    NewLog {
      tag_id: self.tag_id,
      start_time: self.start_time,
      duration_seconds,
      notes: self.notes,
    }
  }
}

/// `POST /logs`
pub async fn record<S>(
  State(state): State<AppState<S>>,
  CurrentActor(actor): CurrentActor,
  Json(body): Json<RecordBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ActivityStore + 'static,
{
  let log = ActivityService::new(state.store.as_ref())
    .record_log(&actor, body.into_new_log())
    .await?;
  Ok((StatusCode::CREATED, Json(log)))
}

// ─── Reports ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ReportParams {
  pub domain_id: Option<String>,
}

/// `GET /logs[?domain_id=<id>]`
pub async fn day_report<S>(
  State(state): State<AppState<S>>,
  CurrentActor(actor): CurrentActor,
  Query(params): Query<ReportParams>,
) -> Result<Json<Vec<DayView>>, ApiError>
where
  S: ActivityStore + 'static,
{
  let domain_id = params
    .domain_id
    .as_deref()
    .map(str::trim)
    .filter(|s| !s.is_empty());

  let days = ActivityService::new(state.store.as_ref())
    .day_report(&actor, domain_id, &state.tz)
    .await?;
  Ok(Json(days))
}

/// `GET /dashboard/{domain_id}`
pub async fn dashboard<S>(
  State(state): State<AppState<S>>,
  CurrentActor(actor): CurrentActor,
  Path(domain_id): Path<String>,
) -> Result<Json<DomainReport>, ApiError>
where
  S: ActivityStore + 'static,
{
  let report = ActivityService::new(state.store.as_ref())
    .domain_report(&actor, &domain_id, &state.tz)
    .await?;
  Ok(Json(report))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn body(seconds: Option<i64>, hms: Option<&str>) -> RecordBody {
    RecordBody {
      tag_id:           "AG-ABCDEFGH".into(),
      start_time:       None,
      duration_seconds: seconds,
      duration_hms:     hms.map(str::to_owned),
      notes:            None,
    }
  }

  #[test]
  fn seconds_take_precedence() {
    assert_eq!(body(Some(42), Some("01:00:00")).into_new_log().duration_seconds, 42);
  }

  #[test]
  fn hms_is_parsed_when_seconds_absent() {
    assert_eq!(body(None, Some("01:30:00")).into_new_log().duration_seconds, 5400);
  }

  #[test]
  fn missing_duration_is_zero() {
    assert_eq!(body(None, None).into_new_log().duration_seconds, 0);
  }
}
