//! [`SqliteStore`]: the SQLite implementation of [`ActivityStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use wlb_core::{
  level::Level,
  log::{ActivityLog, LogQuery, ResolvedLog},
  node::{Node, SortSlot},
  store::{ActivityStore, DeleteOutcome, InsertOutcome, SwapOutcome},
  user::{Role, User, UserRecord},
};

use crate::{
  Error, Result,
  encode::{
    RawNode, RawResolvedLog, RawUser, USER_COLUMNS, blocks_delete, constraint_outcome,
    encode_dt, encode_role, encode_uuid, node_columns,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A WLB store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run a single-row taxonomy lookup on `column = value`.
  async fn node_where(
    &self,
    level: Level,
    column: &'static str,
    value: String,
  ) -> Result<Option<Node>> {
    let d = level.descriptor();
    let sql = format!(
      "SELECT {} FROM {} WHERE {column} = ?1",
      node_columns(level),
      d.table
    );

    let raw: Option<RawNode> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![value], RawNode::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(|r| r.into_node(level)).transpose()
  }

  /// Run a single-row user lookup on `column = value`.
  async fn user_where(
    &self,
    column: &'static str,
    value: String,
  ) -> Result<Option<UserRecord>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = ?1");

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![value], RawUser::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_record).transpose()
  }
}

// ─── ActivityStore impl ──────────────────────────────────────────────────────

impl ActivityStore for SqliteStore {
  type Error = Error;

  // ── Taxonomy ──────────────────────────────────────────────────────────────

  async fn insert_node(&self, node: Node) -> Result<InsertOutcome> {
    let d = node.level.descriptor();
    let row_id = encode_uuid(node.row_id);

    // Both variants bind six values; the third is the parent id for child
    // levels and the description at the root.
    let (sql, third) = match d.parent_column {
      None => (
        format!(
          "INSERT INTO {} (id, {}, description, name, is_published, sort_order)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          d.table, d.id_column
        ),
        node.description,
      ),
      Some(parent_column) => (
        format!(
          "INSERT INTO {} (id, {}, {parent_column}, name, is_published, sort_order)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          d.table, d.id_column
        ),
        node.parent_id,
      ),
    };

    self
      .conn
      .call(move |conn| {
        let result = conn.execute(
          &sql,
          rusqlite::params![
            row_id,
            node.external_id,
            third,
            node.name,
            node.is_published,
            node.sort_order,
          ],
        );
        match result {
          Ok(_) => Ok(InsertOutcome::Inserted),
          Err(e) => constraint_outcome(&e).ok_or_else(|| e.into()),
        }
      })
      .await
      .map_err(Error::from)
  }

  async fn get_node(&self, level: Level, row_id: Uuid) -> Result<Option<Node>> {
    self.node_where(level, "id", encode_uuid(row_id)).await
  }

  async fn find_node(
    &self,
    level: Level,
    external_id: String,
  ) -> Result<Option<Node>> {
    self
      .node_where(level, level.descriptor().id_column, external_id)
      .await
  }

  async fn list_nodes(
    &self,
    level: Level,
    parent_id: Option<String>,
  ) -> Result<Vec<Node>> {
    let d = level.descriptor();
    let columns = node_columns(level);

    let raws: Vec<RawNode> = self
      .conn
      .call(move |conn| {
        let rows = match (d.parent_column, parent_id) {
          (Some(parent_column), Some(parent)) => {
            let mut stmt = conn.prepare(&format!(
              "SELECT {columns} FROM {} WHERE {parent_column} = ?1
               ORDER BY sort_order ASC, rowid ASC",
              d.table
            ))?;
            stmt
              .query_map(rusqlite::params![parent], RawNode::from_row)?
              .collect::<rusqlite::Result<Vec<_>>>()?
          }
          _ => {
            let mut stmt = conn.prepare(&format!(
              "SELECT {columns} FROM {} ORDER BY sort_order ASC, rowid ASC",
              d.table
            ))?;
            stmt
              .query_map([], RawNode::from_row)?
              .collect::<rusqlite::Result<Vec<_>>>()?
          }
        };
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(|r| r.into_node(level)).collect()
  }

  async fn update_node(&self, node: Node) -> Result<bool> {
    let d = node.level.descriptor();
    let row_id = encode_uuid(node.row_id);

    let changed = self
      .conn
      .call(move |conn| {
        let changed = if d.described {
          conn.execute(
            &format!(
              "UPDATE {} SET name = ?1, is_published = ?2, description = ?3
               WHERE id = ?4",
              d.table
            ),
            rusqlite::params![node.name, node.is_published, node.description, row_id],
          )?
        } else {
          conn.execute(
            &format!(
              "UPDATE {} SET name = ?1, is_published = ?2 WHERE id = ?3",
              d.table
            ),
            rusqlite::params![node.name, node.is_published, row_id],
          )?
        };
        Ok(changed)
      })
      .await?;

    Ok(changed == 1)
  }

  async fn swap_sort_order(
    &self,
    level: Level,
    a: SortSlot,
    b: SortSlot,
  ) -> Result<SwapOutcome> {
    let sql = format!(
      "UPDATE {} SET sort_order = ?1 WHERE id = ?2 AND sort_order = ?3",
      level.descriptor().table
    );
    let a_id = encode_uuid(a.row_id);
    let b_id = encode_uuid(b.row_id);

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let first = tx.execute(&sql, rusqlite::params![b.sort_order, a_id, a.sort_order])?;
        let second = tx.execute(&sql, rusqlite::params![a.sort_order, b_id, b.sort_order])?;

        if first == 1 && second == 1 {
          tx.commit()?;
          Ok(SwapOutcome::Swapped)
        } else {
          // Dropping the transaction rolls back the half that did apply.
          Ok(SwapOutcome::Stale)
        }
      })
      .await
      .map_err(Error::from)
  }

  async fn delete_node(&self, level: Level, row_id: Uuid) -> Result<DeleteOutcome> {
    let sql = format!("DELETE FROM {} WHERE id = ?1", level.descriptor().table);
    let row_id = encode_uuid(row_id);

    self
      .conn
      .call(move |conn| match conn.execute(&sql, rusqlite::params![row_id]) {
        Ok(0) => Ok(DeleteOutcome::NotFound),
        Ok(_) => Ok(DeleteOutcome::Deleted),
        Err(e) if blocks_delete(&e) => Ok(DeleteOutcome::Blocked),
        Err(e) => Err(e.into()),
      })
      .await
      .map_err(Error::from)
  }

  // ── Logs ──────────────────────────────────────────────────────────────────

  async fn insert_log(&self, log: ActivityLog) -> Result<InsertOutcome> {
    let log_id = encode_uuid(log.log_id);
    let user_id = encode_uuid(log.user_id);
    let start_time = encode_dt(log.start_time);

    self
      .conn
      .call(move |conn| {
        let result = conn.execute(
          "INSERT INTO activity_logs (
             id, user_id, tag_id, start_time, duration_seconds, notes
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            log_id,
            user_id,
            log.tag_id,
            start_time,
            log.duration_seconds,
            log.notes,
          ],
        );
        match result {
          Ok(_) => Ok(InsertOutcome::Inserted),
          Err(e) => constraint_outcome(&e).ok_or_else(|| e.into()),
        }
      })
      .await
      .map_err(Error::from)
  }

  async fn list_logs(&self, query: LogQuery) -> Result<Vec<ResolvedLog>> {
    let user_id = encode_uuid(query.user_id);
    let since = query.since.map(encode_dt);
    let until = query.until.map(encode_dt);
    let direction = if query.newest_first { "DESC" } else { "ASC" };

    let raws: Vec<RawResolvedLog> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT
             l.id, l.user_id, l.tag_id, l.start_time, l.duration_seconds, l.notes,
             g.tag_id, g.name,
             t.type_id, t.name,
             d.domain_id, d.name
           FROM activity_logs l
           LEFT JOIN activity_tags    g ON g.tag_id    = l.tag_id
           LEFT JOIN activity_types   t ON t.type_id   = g.type_id
           LEFT JOIN activity_domains d ON d.domain_id = t.domain_id
           WHERE l.user_id = ?1
             AND (?2 IS NULL OR l.start_time >= ?2)
             AND (?3 IS NULL OR l.start_time <  ?3)
           ORDER BY l.start_time {direction}, l.rowid {direction}"
        ))?;

        let rows = stmt
          .query_map(
            rusqlite::params![user_id, since, until],
            RawResolvedLog::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawResolvedLog::into_resolved).collect()
  }

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn insert_user(&self, record: UserRecord) -> Result<InsertOutcome> {
    let user_id = encode_uuid(record.user.user_id);
    let role = encode_role(record.user.role);
    let created_at = encode_dt(record.user.created_at);

    self
      .conn
      .call(move |conn| {
        let result = conn.execute(
          "INSERT INTO users (user_id, email, password_hash, role, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![
            user_id,
            record.user.email,
            record.password_hash,
            role,
            created_at,
          ],
        );
        match result {
          Ok(_) => Ok(InsertOutcome::Inserted),
          Err(e) => constraint_outcome(&e).ok_or_else(|| e.into()),
        }
      })
      .await
      .map_err(Error::from)
  }

  async fn get_user(&self, user_id: Uuid) -> Result<Option<User>> {
    Ok(
      self
        .user_where("user_id", encode_uuid(user_id))
        .await?
        .map(|r| r.user),
    )
  }

  async fn find_user_by_email(&self, email: String) -> Result<Option<UserRecord>> {
    self.user_where("email", email).await
  }

  async fn list_users(&self) -> Result<Vec<User>> {
    let raws: Vec<RawUser> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {USER_COLUMNS} FROM users ORDER BY created_at ASC, email ASC"
        ))?;
        let rows = stmt
          .query_map([], RawUser::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(|r| r.into_record().map(|rec| rec.user))
      .collect()
  }

  async fn set_role(&self, user_id: Uuid, role: Role) -> Result<bool> {
    let user_id = encode_uuid(user_id);
    let role = encode_role(role);

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE users SET role = ?1 WHERE user_id = ?2",
          rusqlite::params![role, user_id],
        )?)
      })
      .await?;

    Ok(changed == 1)
  }
}
