//! The `ActivityStore` trait and the outcome types its writes report.
//!
//! The trait is implemented by storage backends (e.g. `wlb-store-sqlite`).
//! The services in this crate and the HTTP layer depend on this abstraction,
//! not on any concrete backend.
//!
//! Referential integrity is the backend's job. Constraint results that the
//! services must react to come back as outcome values rather than errors, so
//! `Self::Error` is reserved for genuine backend failures.

use std::future::Future;

use uuid::Uuid;

use crate::{
  level::Level,
  log::{ActivityLog, LogQuery, ResolvedLog},
  node::{Node, SortSlot},
  user::{Role, User, UserRecord},
};

// ─── Outcomes ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
  Inserted,
  /// A unique key (external id, email) is already taken.
  Conflict,
  /// A referenced parent row does not exist.
  MissingParent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapOutcome {
  Swapped,
  /// At least one row no longer held its expected sort position; nothing was
  /// written.
  Stale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
  Deleted,
  NotFound,
  /// Dependent rows still reference this one.
  Blocked,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a WLB store backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait ActivityStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Taxonomy ──────────────────────────────────────────────────────────

  /// Persist a fully-built node.
  fn insert_node(
    &self,
    node: Node,
  ) -> impl Future<Output = Result<InsertOutcome, Self::Error>> + Send + '_;

  /// Retrieve a node by row id. Returns `None` if not found.
  fn get_node(
    &self,
    level: Level,
    row_id: Uuid,
  ) -> impl Future<Output = Result<Option<Node>, Self::Error>> + Send + '_;

  /// Retrieve a node by external id. Returns `None` if not found.
  fn find_node(
    &self,
    level: Level,
    external_id: String,
  ) -> impl Future<Output = Result<Option<Node>, Self::Error>> + Send + '_;

  /// List the nodes of `level` under `parent_id` (ignored for domains),
  /// ascending by sort position.
  fn list_nodes(
    &self,
    level: Level,
    parent_id: Option<String>,
  ) -> impl Future<Output = Result<Vec<Node>, Self::Error>> + Send + '_;

  /// Overwrite the mutable columns (name, description, publish flag) of an
  /// existing node. Returns `false` if the row does not exist.
  fn update_node(
    &self,
    node: Node,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Exchange the sort positions of two rows of `level`, all or nothing.
  ///
  /// Each row is only written if it still holds the position recorded in
  /// its [`SortSlot`].
  fn swap_sort_order(
    &self,
    level: Level,
    a: SortSlot,
    b: SortSlot,
  ) -> impl Future<Output = Result<SwapOutcome, Self::Error>> + Send + '_;

  fn delete_node(
    &self,
    level: Level,
    row_id: Uuid,
  ) -> impl Future<Output = Result<DeleteOutcome, Self::Error>> + Send + '_;

  // ── Logs ──────────────────────────────────────────────────────────────

  fn insert_log(
    &self,
    log: ActivityLog,
  ) -> impl Future<Output = Result<InsertOutcome, Self::Error>> + Send + '_;

  /// Return a user's logs with the Tag → Type → Domain chain resolved.
  fn list_logs(
    &self,
    query: LogQuery,
  ) -> impl Future<Output = Result<Vec<ResolvedLog>, Self::Error>> + Send + '_;

  // ── Users ─────────────────────────────────────────────────────────────

  fn insert_user(
    &self,
    record: UserRecord,
  ) -> impl Future<Output = Result<InsertOutcome, Self::Error>> + Send + '_;

  fn get_user(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Case-insensitive lookup, including the credential hash.
  fn find_user_by_email(
    &self,
    email: String,
  ) -> impl Future<Output = Result<Option<UserRecord>, Self::Error>> + Send + '_;

  fn list_users(
    &self,
  ) -> impl Future<Output = Result<Vec<User>, Self::Error>> + Send + '_;

  /// Returns `false` if the user does not exist.
  fn set_role(
    &self,
    user_id: Uuid,
    role: Role,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}
