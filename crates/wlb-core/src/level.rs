//! The three taxonomy levels and their per-level configuration.
//!
//! Domains, types and tags share one row shape and one set of operations.
//! Everything that differs between them lives in a [`LevelDescriptor`], so
//! the rest of the crate never branches on a level name.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

/// A level of the Domain → Type → Tag tree.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize,
  Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Level {
  Domain,
  Type,
  Tag,
}

/// Static configuration for one [`Level`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelDescriptor {
  /// Backing table name.
  pub table:         &'static str,
  /// Column holding the external id.
  pub id_column:     &'static str,
  /// Prefix of generated external ids, e.g. `AD` in `AD-7Q2M9XKD`.
  pub id_prefix:     &'static str,
  /// Column referencing the parent's external id; `None` at the root.
  pub parent_column: Option<&'static str>,
  pub parent:        Option<Level>,
  pub child:         Option<Level>,
  /// Only domains carry a free-text description.
  pub described:     bool,
}

const DOMAIN: LevelDescriptor = LevelDescriptor {
  table:         "activity_domains",
  id_column:     "domain_id",
  id_prefix:     "AD",
  parent_column: None,
  parent:        None,
  child:         Some(Level::Type),
  described:     true,
};

const TYPE: LevelDescriptor = LevelDescriptor {
  table:         "activity_types",
  id_column:     "type_id",
  id_prefix:     "AT",
  parent_column: Some("domain_id"),
  parent:        Some(Level::Domain),
  child:         Some(Level::Tag),
  described:     false,
};

const TAG: LevelDescriptor = LevelDescriptor {
  table:         "activity_tags",
  id_column:     "tag_id",
  id_prefix:     "AG",
  parent_column: Some("type_id"),
  parent:        Some(Level::Type),
  child:         None,
  described:     false,
};

impl Level {
  pub const ALL: [Level; 3] = [Level::Domain, Level::Type, Level::Tag];

  pub fn descriptor(self) -> &'static LevelDescriptor {
    match self {
      Self::Domain => &DOMAIN,
      Self::Type => &TYPE,
      Self::Tag => &TAG,
    }
  }

  pub fn parent(self) -> Option<Level> { self.descriptor().parent }

  pub fn is_root(self) -> bool { self.parent().is_none() }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Domain => "domain",
      Self::Type => "type",
      Self::Tag => "tag",
    }
  }
}

impl fmt::Display for Level {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Accepts singular and plural forms, so `/taxonomy/domains` and
/// `/taxonomy/domain` both resolve.
impl FromStr for Level {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "domain" | "domains" => Ok(Self::Domain),
      "type" | "types" => Ok(Self::Type),
      "tag" | "tags" => Ok(Self::Tag),
      other => Err(Error::NotFound(format!("taxonomy level {other:?}"))),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parents_point_strictly_upward() {
    assert_eq!(Level::Domain.parent(), None);
    assert_eq!(Level::Type.parent(), Some(Level::Domain));
    assert_eq!(Level::Tag.parent(), Some(Level::Type));

    for level in Level::ALL {
      if let Some(parent) = level.parent() {
        assert!(parent < level);
        assert_eq!(parent.descriptor().child, Some(level));
      }
    }
  }

  #[test]
  fn parent_column_is_parent_id_column() {
    for level in Level::ALL {
      let d = level.descriptor();
      assert_eq!(
        d.parent_column,
        d.parent.map(|p| p.descriptor().id_column),
        "{level}"
      );
    }
  }

  #[test]
  fn parses_singular_and_plural() {
    assert_eq!("domains".parse::<Level>().unwrap(), Level::Domain);
    assert_eq!("Type".parse::<Level>().unwrap(), Level::Type);
    assert_eq!("tags".parse::<Level>().unwrap(), Level::Tag);
    assert!(matches!("logs".parse::<Level>(), Err(Error::NotFound(_))));
  }
}
