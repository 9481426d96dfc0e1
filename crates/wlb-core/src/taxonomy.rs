//! Taxonomy Service: maintains the Domain → Type → Tag tree and its
//! ordering.
//!
//! Every operation is written once against [`Level`]; per-level differences
//! come from [`crate::level::LevelDescriptor`]. Mutations require an admin
//! [`Actor`].

use uuid::Uuid;

use crate::{
  Error, Result,
  ids::generate_external_id,
  level::Level,
  node::{Direction, NewNode, Node, NodePatch, ReorderOutcome, SortSlot},
  store::{ActivityStore, DeleteOutcome, InsertOutcome, SwapOutcome},
  user::Actor,
};

/// How many freshly generated ids to try before giving up on a collision.
const MAX_ID_ATTEMPTS: usize = 5;

pub struct TaxonomyService<'a, S> {
  store: &'a S,
}

impl<'a, S: ActivityStore> TaxonomyService<'a, S> {
  pub fn new(store: &'a S) -> Self { Self { store } }

  // ── Reads ─────────────────────────────────────────────────────────────

  pub async fn get_node(&self, level: Level, row_id: Uuid) -> Result<Node> {
    self
      .store
      .get_node(level, row_id)
      .await
      .map_err(|e| Error::store("get_node", e))?
      .ok_or_else(|| Error::NotFound(format!("{level} {row_id}")))
  }

  /// Children of `parent_id` at `level`, ascending by sort position. An
  /// unknown or childless parent yields an empty list.
  pub async fn list_children(
    &self,
    level: Level,
    parent_id: Option<&str>,
  ) -> Result<Vec<Node>> {
    let parent_id = match (level.parent(), clean(parent_id)) {
      (None, _) => None,
      (Some(parent), None) => return Err(Error::MissingParent(parent)),
      (Some(_), Some(id)) => Some(id),
    };

    self
      .store
      .list_nodes(level, parent_id)
      .await
      .map_err(|e| Error::store("list_nodes", e))
  }

  /// The options offered when picking a node under `parent_id`: published
  /// children only, in display order.
  pub async fn available_children(
    &self,
    level: Level,
    parent_id: Option<&str>,
  ) -> Result<Vec<Node>> {
    let mut nodes = self.list_children(level, parent_id).await?;
    nodes.retain(|n| n.is_published);
    Ok(nodes)
  }

  // ── Mutations ─────────────────────────────────────────────────────────

  pub async fn create_node(
    &self,
    actor: &Actor,
    level: Level,
    input: NewNode,
  ) -> Result<Node> {
    actor.require_admin()?;

    let name = require_name(&input.name)?;
    let description = check_description(level, input.description)?;

    let parent_id = match (level.parent(), clean(input.parent_id.as_deref())) {
      (None, None) => None,
      (None, Some(_)) => {
        return Err(Error::Validation(format!("a {level} has no parent")));
      }
      (Some(parent), None) => return Err(Error::MissingParent(parent)),
      (Some(parent), Some(id)) => {
        let found = self
          .store
          .find_node(parent, id.clone())
          .await
          .map_err(|e| Error::store("find_node", e))?;
        if found.is_none() {
          return Err(Error::NotFound(format!("{parent} {id}")));
        }
        Some(id)
      }
    };

    let siblings = self
      .store
      .list_nodes(level, parent_id.clone())
      .await
      .map_err(|e| Error::store("list_nodes", e))?;

    let mut node = Node {
      row_id: Uuid::new_v4(),
      level,
      external_id: String::new(),
      parent_id,
      name,
      description,
      is_published: input.is_published,
      sort_order: next_sort_order(&siblings),
    };

    for _ in 0..MAX_ID_ATTEMPTS {
      node.external_id = generate_external_id(level);
      let outcome = self
        .store
        .insert_node(node.clone())
        .await
        .map_err(|e| Error::store("insert_node", e))?;

      match outcome {
        InsertOutcome::Inserted => {
          tracing::info!(
            %level,
            external_id = %node.external_id,
            sort_order = node.sort_order,
            "taxonomy node created"
          );
          return Ok(node);
        }
        InsertOutcome::Conflict => {
          tracing::debug!(external_id = %node.external_id, "id collision, retrying");
        }
        // The parent was deleted between the check and the insert.
        InsertOutcome::MissingParent => {
          return Err(Error::NotFound(format!(
            "{} {}",
            level.parent().unwrap_or(level),
            node.parent_id.unwrap_or_default()
          )));
        }
      }
    }

    Err(Error::Conflict(format!("could not allocate a unique {level} id")))
  }

  pub async fn update_node(
    &self,
    actor: &Actor,
    level: Level,
    row_id: Uuid,
    patch: NodePatch,
  ) -> Result<Node> {
    actor.require_admin()?;

    let mut node = self.get_node(level, row_id).await?;

    if let Some(name) = &patch.name {
      node.name = require_name(name)?;
    }
    if let Some(description) = patch.description {
      node.description = check_description(level, description)?;
    }
    if let Some(published) = patch.is_published {
      node.is_published = published;
    }

    let found = self
      .store
      .update_node(node.clone())
      .await
      .map_err(|e| Error::store("update_node", e))?;
    if !found {
      return Err(Error::NotFound(format!("{level} {row_id}")));
    }

    tracing::info!(%level, external_id = %node.external_id, "taxonomy node updated");
    Ok(node)
  }

  /// Move a node one place up or down among its siblings.
  ///
  /// Moving the first sibling up or the last one down changes nothing. A
  /// swap that loses a race with another reorder is reported as
  /// [`ReorderOutcome::Stale`] with nothing applied.
  pub async fn reorder_node(
    &self,
    actor: &Actor,
    level: Level,
    row_id: Uuid,
    direction: Direction,
  ) -> Result<ReorderOutcome> {
    actor.require_admin()?;

    let node = self.get_node(level, row_id).await?;
    let siblings = self
      .store
      .list_nodes(level, node.parent_id.clone())
      .await
      .map_err(|e| Error::store("list_nodes", e))?;

    if !siblings.iter().any(|n| n.row_id == row_id) {
      tracing::warn!(%level, %row_id, "node vanished from its sibling list");
      return Ok(ReorderOutcome::Stale);
    }

    let Some((a, b)) = plan_swap(&siblings, row_id, direction) else {
      return Ok(ReorderOutcome::Unchanged);
    };

    let outcome = self
      .store
      .swap_sort_order(level, a, b)
      .await
      .map_err(|e| Error::store("swap_sort_order", e))?;

    Ok(match outcome {
      SwapOutcome::Swapped => {
        tracing::info!(%level, external_id = %node.external_id, ?direction, "taxonomy node moved");
        ReorderOutcome::Swapped
      }
      SwapOutcome::Stale => {
        tracing::warn!(
          %level,
          external_id = %node.external_id,
          "reorder skipped: sibling order changed concurrently"
        );
        ReorderOutcome::Stale
      }
    })
  }

  pub async fn delete_node(
    &self,
    actor: &Actor,
    level: Level,
    row_id: Uuid,
  ) -> Result<()> {
    actor.require_admin()?;

    let outcome = self
      .store
      .delete_node(level, row_id)
      .await
      .map_err(|e| Error::store("delete_node", e))?;

    match outcome {
      DeleteOutcome::Deleted => {
        tracing::info!(%level, %row_id, "taxonomy node deleted");
        Ok(())
      }
      DeleteOutcome::NotFound => Err(Error::NotFound(format!("{level} {row_id}"))),
      DeleteOutcome::Blocked => Err(Error::Dependency),
    }
  }
}

// ─── Pure helpers ────────────────────────────────────────────────────────────

/// One past the highest sibling position, or 0 for the first child.
pub fn next_sort_order(siblings: &[Node]) -> i64 {
  siblings
    .iter()
    .map(|n| n.sort_order)
    .max()
    .map_or(0, |max| max + 1)
}

/// Work out the swap that moves `row_id` one place in `direction` within an
/// already-ordered sibling list.
///
/// Returns `None` when the node is absent or already at the end it is being
/// moved towards. The first slot is the moving node and the second its
/// neighbour, each with the position it holds now; the store exchanges them.
pub fn plan_swap(
  siblings: &[Node],
  row_id: Uuid,
  direction: Direction,
) -> Option<(SortSlot, SortSlot)> {
  let index = siblings.iter().position(|n| n.row_id == row_id)?;
  let neighbour = match direction {
    Direction::Up => index.checked_sub(1)?,
    Direction::Down => Some(index + 1).filter(|&i| i < siblings.len())?,
  };

  let current = &siblings[index];
  let other = &siblings[neighbour];
  Some((
    SortSlot { row_id: current.row_id, sort_order: current.sort_order },
    SortSlot { row_id: other.row_id, sort_order: other.sort_order },
  ))
}

fn clean(id: Option<&str>) -> Option<String> {
  id.map(str::trim).filter(|s| !s.is_empty()).map(str::to_owned)
}

fn require_name(name: &str) -> Result<String> {
  let trimmed = name.trim();
  if trimmed.is_empty() {
    return Err(Error::Validation("name must not be empty".into()));
  }
  Ok(trimmed.to_owned())
}

fn check_description(
  level: Level,
  description: Option<String>,
) -> Result<Option<String>> {
  let description = description
    .map(|d| d.trim().to_owned())
    .filter(|d| !d.is_empty());
  if description.is_some() && !level.descriptor().described {
    return Err(Error::Validation(format!("a {level} has no description")));
  }
  Ok(description)
}
