//! Users, roles and the per-request [`Actor`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  Admin,
  #[default]
  Basic,
}

impl Role {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Admin => "admin",
      Self::Basic => "basic",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub user_id:    Uuid,
  pub email:      String,
  pub role:       Role,
  pub created_at: DateTime<Utc>,
}

/// A user row including the credential hash. Never serialised.
#[derive(Debug, Clone)]
pub struct UserRecord {
  pub user:          User,
  /// argon2 PHC string.
  pub password_hash: String,
}

/// The authenticated caller of a service operation.
///
/// Passed explicitly into every call that needs to scope data to a user or
/// gate on role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
  pub user_id: Uuid,
  pub role:    Role,
}

impl Actor {
  pub fn is_admin(&self) -> bool { self.role == Role::Admin }

  pub(crate) fn require_admin(&self) -> crate::Result<()> {
    if self.is_admin() {
      Ok(())
    } else {
      tracing::warn!(user_id = %self.user_id, "admin operation refused");
      Err(crate::Error::Forbidden)
    }
  }
}

impl From<&User> for Actor {
  fn from(user: &User) -> Self {
    Self {
      user_id: user.user_id,
      role:    user.role,
    }
  }
}
