//! User accounts and role assignment.
//!
//! Credential hashing and verification happen at the transport edge; this
//! service only sees finished argon2 hashes.

use chrono::Utc;
use uuid::Uuid;

use crate::{
  Error, Result,
  store::{ActivityStore, InsertOutcome},
  user::{Actor, Role, User, UserRecord},
};

pub struct AccountService<'a, S> {
  store: &'a S,
}

impl<'a, S: ActivityStore> AccountService<'a, S> {
  pub fn new(store: &'a S) -> Self { Self { store } }

  /// Register a new `basic` user.
  pub async fn sign_up(&self, email: &str, password_hash: String) -> Result<User> {
    self.insert(email, password_hash, Role::Basic).await
  }

  /// Create `email` as an admin, or promote it if it already exists.
  pub async fn ensure_admin(
    &self,
    email: &str,
    password_hash: String,
  ) -> Result<User> {
    let existing = self
      .store
      .find_user_by_email(normalize_email(email)?)
      .await
      .map_err(|e| Error::store("find_user_by_email", e))?;

    match existing {
      Some(record) => {
        self.write_role(record.user.user_id, Role::Admin).await?;
        Ok(User { role: Role::Admin, ..record.user })
      }
      None => self.insert(email, password_hash, Role::Admin).await,
    }
  }

  /// The stored credentials for `email`, if it is a registered address.
  pub async fn find_credentials(&self, email: &str) -> Result<Option<UserRecord>> {
    let Ok(email) = normalize_email(email) else {
      return Ok(None);
    };
    self
      .store
      .find_user_by_email(email)
      .await
      .map_err(|e| Error::store("find_user_by_email", e))
  }

  /// Look up the role of `user_id` and package it as the request's actor.
  pub async fn resolve_actor(&self, user_id: Uuid) -> Result<Actor> {
    let user = self
      .store
      .get_user(user_id)
      .await
      .map_err(|e| Error::store("get_user", e))?
      .ok_or_else(|| Error::NotFound(format!("user {user_id}")))?;
    Ok(Actor::from(&user))
  }

  pub async fn list_users(&self, actor: &Actor) -> Result<Vec<User>> {
    actor.require_admin()?;
    self
      .store
      .list_users()
      .await
      .map_err(|e| Error::store("list_users", e))
  }

  /// Change another user's role. Admins cannot demote themselves, which
  /// keeps at least one admin reachable through the API.
  pub async fn assign_role(
    &self,
    actor: &Actor,
    user_id: Uuid,
    role: Role,
  ) -> Result<User> {
    actor.require_admin()?;
    if user_id == actor.user_id && role != Role::Admin {
      return Err(Error::Validation("admins cannot demote themselves".into()));
    }

    self.write_role(user_id, role).await?;
    tracing::info!(by = %actor.user_id, %user_id, role = role.as_str(), "role assigned");

    self
      .store
      .get_user(user_id)
      .await
      .map_err(|e| Error::store("get_user", e))?
      .ok_or_else(|| Error::NotFound(format!("user {user_id}")))
  }

  async fn write_role(&self, user_id: Uuid, role: Role) -> Result<()> {
    let found = self
      .store
      .set_role(user_id, role)
      .await
      .map_err(|e| Error::store("set_role", e))?;
    if found {
      Ok(())
    } else {
      Err(Error::NotFound(format!("user {user_id}")))
    }
  }

  async fn insert(
    &self,
    email: &str,
    password_hash: String,
    role: Role,
  ) -> Result<User> {
    let user = User {
      user_id: Uuid::new_v4(),
      email: normalize_email(email)?,
      role,
      created_at: Utc::now(),
    };

    let outcome = self
      .store
      .insert_user(UserRecord { user: user.clone(), password_hash })
      .await
      .map_err(|e| Error::store("insert_user", e))?;

    match outcome {
      InsertOutcome::Inserted => {
        tracing::info!(user_id = %user.user_id, role = role.as_str(), "user registered");
        Ok(user)
      }
      InsertOutcome::Conflict | InsertOutcome::MissingParent => Err(
        Error::Conflict(format!("{} is already registered", user.email)),
      ),
    }
  }
}

/// Trim and lowercase; the address must contain an `@` with text on both
/// sides.
pub fn normalize_email(email: &str) -> Result<String> {
  let email = email.trim().to_lowercase();
  match email.split_once('@') {
    Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
    _ => Err(Error::Validation(format!("{email:?} is not an email address"))),
  }
}
