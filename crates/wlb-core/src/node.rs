//! Taxonomy nodes: domains, types and tags share this one shape.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::level::Level;

// ─── Node ────────────────────────────────────────────────────────────────────

/// A persisted domain, type or tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
  /// Internal row id; addresses the row for update, reorder and delete.
  pub row_id:       Uuid,
  pub level:        Level,
  /// Stable external id (`AD-…`, `AT-…`, `AG-…`). Children reference this,
  /// never the row id.
  pub external_id:  String,
  /// External id of the owning node one level up; `None` for domains.
  pub parent_id:    Option<String>,
  pub name:         String,
  /// Only ever set on domains.
  pub description:  Option<String>,
  pub is_published: bool,
  /// Display order among siblings, ascending.
  pub sort_order:   i64,
}

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// Input to [`crate::taxonomy::TaxonomyService::create_node`].
///
/// The row id, external id and sort position are assigned by the service.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewNode {
  /// External id of the parent; required for types and tags.
  pub parent_id:    Option<String>,
  pub name:         String,
  pub description:  Option<String>,
  #[serde(default = "default_published")]
  pub is_published: bool,
}

fn default_published() -> bool { true }

impl NewNode {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      is_published: true,
      ..Default::default()
    }
  }

  pub fn under(parent_id: impl Into<String>, name: impl Into<String>) -> Self {
    Self {
      parent_id: Some(parent_id.into()),
      ..Self::new(name)
    }
  }
}

/// A partial update. Absent fields are left untouched; the parent and the
/// external id are not patchable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NodePatch {
  pub name:         Option<String>,
  /// `Some(None)` clears the description.
  #[serde(default, with = "double_option")]
  pub description:  Option<Option<String>>,
  pub is_published: Option<bool>,
}

mod double_option {
  use serde::{Deserialize, Deserializer};

  pub fn deserialize<'de, D>(de: D) -> Result<Option<Option<String>>, D::Error>
  where
    D: Deserializer<'de>,
  {
    Option::<String>::deserialize(de).map(Some)
  }
}

// ─── Reordering ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
  Up,
  Down,
}

/// One side of a guarded sort-position swap: the row and the position the
/// caller last saw it at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSlot {
  pub row_id:     Uuid,
  pub sort_order: i64,
}

/// Result of [`crate::taxonomy::TaxonomyService::reorder_node`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReorderOutcome {
  /// The node exchanged positions with its neighbour.
  Swapped,
  /// The node is already first (moving up) or last (moving down).
  Unchanged,
  /// A concurrent change moved one of the two rows first; nothing was
  /// applied and the listed order may be out of date.
  Stale,
}
