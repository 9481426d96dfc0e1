//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 UTC strings so that text
//! comparison orders them chronologically. UUIDs are stored as hyphenated
//! lowercase strings.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{ErrorCode, ffi};
use uuid::Uuid;
use wlb_core::{
  level::Level,
  log::{ActivityLog, NodeRef, ResolvedLog},
  node::Node,
  store::InsertOutcome,
  user::{Role, User, UserRecord},
};

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Role ─────────────────────────────────────────────────────────────────────

pub fn encode_role(role: Role) -> &'static str { role.as_str() }

pub fn decode_role(s: &str) -> Result<Role> {
  match s {
    "admin" => Ok(Role::Admin),
    "basic" => Ok(Role::Basic),
    other => Err(Error::Decode {
      column: "role",
      value:  other.to_owned(),
    }),
  }
}

// ─── Constraint failures ─────────────────────────────────────────────────────

/// Classify a failed write as a constraint outcome the services understand.
/// Returns `None` for every other kind of failure.
pub fn constraint_outcome(err: &rusqlite::Error) -> Option<InsertOutcome> {
  let rusqlite::Error::SqliteFailure(e, _) = err else {
    return None;
  };
  if e.code != ErrorCode::ConstraintViolation {
    return None;
  }
  match e.extended_code {
    ffi::SQLITE_CONSTRAINT_FOREIGNKEY => Some(InsertOutcome::MissingParent),
    ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
      Some(InsertOutcome::Conflict)
    }
    _ => None,
  }
}

/// Whether a failed `DELETE` was refused because other rows still reference
/// the target. `ON DELETE RESTRICT` reports through the trigger code rather
/// than the foreign-key one.
pub fn blocks_delete(err: &rusqlite::Error) -> bool {
  let rusqlite::Error::SqliteFailure(e, _) = err else {
    return false;
  };
  e.code == ErrorCode::ConstraintViolation
    && matches!(
      e.extended_code,
      ffi::SQLITE_CONSTRAINT_FOREIGNKEY | ffi::SQLITE_CONSTRAINT_TRIGGER
    )
}

// ─── Column lists ────────────────────────────────────────────────────────────

/// The `SELECT` list matching [`RawNode`]'s field order for `level`.
///
/// Levels without a parent or description select `NULL` in that position so
/// one row mapper serves all three tables.
pub fn node_columns(level: Level) -> String {
  let d = level.descriptor();
  format!(
    "id, {id}, {parent}, name, {description}, is_published, sort_order",
    id = d.id_column,
    parent = d.parent_column.unwrap_or("NULL"),
    description = if d.described { "description" } else { "NULL" },
  )
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a taxonomy row.
pub struct RawNode {
  pub row_id:       String,
  pub external_id:  String,
  pub parent_id:    Option<String>,
  pub name:         String,
  pub description:  Option<String>,
  pub is_published: bool,
  pub sort_order:   i64,
}

impl RawNode {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      row_id:       row.get(0)?,
      external_id:  row.get(1)?,
      parent_id:    row.get(2)?,
      name:         row.get(3)?,
      description:  row.get(4)?,
      is_published: row.get(5)?,
      sort_order:   row.get(6)?,
    })
  }

  pub fn into_node(self, level: Level) -> Result<Node> {
    Ok(Node {
      row_id: decode_uuid(&self.row_id)?,
      level,
      external_id: self.external_id,
      parent_id: self.parent_id,
      name: self.name,
      description: self.description,
      is_published: self.is_published,
      sort_order: self.sort_order,
    })
  }
}

/// Raw values read from `activity_logs` left-joined up the tag chain.
pub struct RawResolvedLog {
  // activity_logs columns
  pub log_id:           String,
  pub user_id:          String,
  pub tag_ref:          String,
  pub start_time:       String,
  pub duration_seconds: u32,
  pub notes:            Option<String>,
  // joined chain; NULL when a link is missing
  pub tag_id:           Option<String>,
  pub tag_name:         Option<String>,
  pub type_id:          Option<String>,
  pub type_name:        Option<String>,
  pub domain_id:        Option<String>,
  pub domain_name:      Option<String>,
}

impl RawResolvedLog {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      log_id:           row.get(0)?,
      user_id:          row.get(1)?,
      tag_ref:          row.get(2)?,
      start_time:       row.get(3)?,
      duration_seconds: row.get(4)?,
      notes:            row.get(5)?,
      tag_id:           row.get(6)?,
      tag_name:         row.get(7)?,
      type_id:          row.get(8)?,
      type_name:        row.get(9)?,
      domain_id:        row.get(10)?,
      domain_name:      row.get(11)?,
    })
  }

  pub fn into_resolved(self) -> Result<ResolvedLog> {
    let log = ActivityLog {
      log_id:           decode_uuid(&self.log_id)?,
      user_id:          decode_uuid(&self.user_id)?,
      tag_id:           self.tag_ref,
      start_time:       decode_dt(&self.start_time)?,
      duration_seconds: self.duration_seconds,
      notes:            self.notes,
    };

    Ok(ResolvedLog {
      log,
      tag: node_ref(self.tag_id, self.tag_name),
      activity_type: node_ref(self.type_id, self.type_name),
      domain: node_ref(self.domain_id, self.domain_name),
    })
  }
}

fn node_ref(id: Option<String>, name: Option<String>) -> Option<NodeRef> {
  Some(NodeRef { id: id?, name: name? })
}

/// Raw values read directly from a `users` row.
pub struct RawUser {
  pub user_id:       String,
  pub email:         String,
  pub role:          String,
  pub created_at:    String,
  pub password_hash: String,
}

/// The `SELECT` list matching [`RawUser`]'s field order.
pub const USER_COLUMNS: &str = "user_id, email, role, created_at, password_hash";

impl RawUser {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:       row.get(0)?,
      email:         row.get(1)?,
      role:          row.get(2)?,
      created_at:    row.get(3)?,
      password_hash: row.get(4)?,
    })
  }

  pub fn into_record(self) -> Result<UserRecord> {
    Ok(UserRecord {
      user:          User {
        user_id:    decode_uuid(&self.user_id)?,
        email:      self.email,
        role:       decode_role(&self.role)?,
        created_at: decode_dt(&self.created_at)?,
      },
      password_hash: self.password_hash,
    })
  }
}
