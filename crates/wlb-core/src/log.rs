//! Activity log entries.
//!
//! A log is one recorded time interval attributed to a tag. Logs are never
//! updated after creation; they disappear only when their tag or owner is
//! deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── ActivityLog ─────────────────────────────────────────────────────────────

/// A persisted activity log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityLog {
  pub log_id:           Uuid,
  pub user_id:          Uuid,
  /// External id of the tag this time is attributed to.
  pub tag_id:           String,
  pub start_time:       DateTime<Utc>,
  /// Always greater than zero.
  pub duration_seconds: u32,
  pub notes:            Option<String>,
}

/// Input to [`crate::activity::ActivityService::record_log`].
///
/// The owning user comes from the caller's [`crate::user::Actor`], never
/// from the input.
#[derive(Debug, Clone)]
pub struct NewLog {
  pub tag_id:           String,
  /// Defaults to the time of recording.
  pub start_time:       Option<DateTime<Utc>>,
  /// Signed so that zero and negative input can be rejected explicitly.
  pub duration_seconds: i64,
  pub notes:            Option<String>,
}

impl NewLog {
  pub fn new(tag_id: impl Into<String>, duration_seconds: i64) -> Self {
    Self {
      tag_id: tag_id.into(),
      start_time: None,
      duration_seconds,
      notes: None,
    }
  }
}

// ─── Resolved chain ──────────────────────────────────────────────────────────

/// The id and name of a node referenced from a log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRef {
  pub id:   String,
  pub name: String,
}

/// A log together with its Tag → Type → Domain chain, resolved in one read.
///
/// Any link may be missing if the referenced row is gone; consumers treat
/// such logs as unattributed rather than failing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedLog {
  #[serde(flatten)]
  pub log:           ActivityLog,
  pub tag:           Option<NodeRef>,
  pub activity_type: Option<NodeRef>,
  pub domain:        Option<NodeRef>,
}

impl ResolvedLog {
  /// The domain id, only if every link of the chain resolved.
  pub fn domain_id(&self) -> Option<&str> {
    match (&self.tag, &self.activity_type, &self.domain) {
      (Some(_), Some(_), Some(domain)) => Some(&domain.id),
      _ => None,
    }
  }
}

// ─── Query ───────────────────────────────────────────────────────────────────

/// Parameters for [`crate::store::ActivityStore::list_logs`].
#[derive(Debug, Clone)]
pub struct LogQuery {
  pub user_id:      Uuid,
  /// Inclusive lower bound on `start_time`.
  pub since:        Option<DateTime<Utc>>,
  /// Exclusive upper bound on `start_time`.
  pub until:        Option<DateTime<Utc>>,
  pub newest_first: bool,
}

impl LogQuery {
  pub fn for_user(user_id: Uuid) -> Self {
    Self {
      user_id,
      since: None,
      until: None,
      newest_first: true,
    }
  }
}

// ─── Duration input ──────────────────────────────────────────────────────────

/// Convert `HH:MM:SS`, `MM:SS` or `SS` into seconds.
///
/// Parts that are not numbers count as zero, and so does input with more
/// than three parts; the caller rejects a zero result.
pub fn parse_hms(input: &str) -> i64 {
  let parts: Vec<i64> = input
    .trim()
    .split(':')
    .map(|p| p.trim().parse().unwrap_or(0))
    .collect();

  match parts.as_slice() {
    [h, m, s] => h
      .saturating_mul(3600)
      .saturating_add(m.saturating_mul(60))
      .saturating_add(*s),
    [m, s] => m.saturating_mul(60).saturating_add(*s),
    [s] => *s,
    _ => 0,
  }
}
