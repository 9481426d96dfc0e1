//! Recording activity logs and reading them back as reports.

use chrono::{TimeZone, Utc};
use uuid::Uuid;

use crate::{
  Error, Result,
  aggregate::{self, DayView, DomainReport},
  level::Level,
  log::{ActivityLog, LogQuery, NewLog, ResolvedLog},
  store::{ActivityStore, InsertOutcome},
  user::Actor,
};

pub struct ActivityService<'a, S> {
  store: &'a S,
}

impl<'a, S: ActivityStore> ActivityService<'a, S> {
  pub fn new(store: &'a S) -> Self { Self { store } }

  /// Record a log owned by `actor`.
  ///
  /// A non-positive duration is rejected before anything is written.
  pub async fn record_log(
    &self,
    actor: &Actor,
    input: NewLog,
  ) -> Result<ActivityLog> {
    if input.duration_seconds <= 0 {
      return Err(Error::InvalidDuration);
    }
    let duration_seconds = u32::try_from(input.duration_seconds).map_err(|_| {
      Error::Validation(format!(
        "duration must be at most {} seconds",
        u32::MAX
      ))
    })?;

    let tag_id = input.tag_id.trim().to_owned();
    if tag_id.is_empty() {
      return Err(Error::MissingParent(Level::Tag));
    }
    let tag = self
      .store
      .find_node(Level::Tag, tag_id.clone())
      .await
      .map_err(|e| Error::store("find_node", e))?;
    if tag.is_none() {
      return Err(Error::NotFound(format!("tag {tag_id}")));
    }

    let log = ActivityLog {
      log_id: Uuid::new_v4(),
      user_id: actor.user_id,
      tag_id,
      start_time: input.start_time.unwrap_or_else(Utc::now),
      duration_seconds,
      notes: input
        .notes
        .map(|n| n.trim().to_owned())
        .filter(|n| !n.is_empty()),
    };

    let outcome = self
      .store
      .insert_log(log.clone())
      .await
      .map_err(|e| Error::store("insert_log", e))?;

    match outcome {
      InsertOutcome::Inserted => {
        tracing::info!(
          user_id = %log.user_id,
          tag_id = %log.tag_id,
          duration_seconds,
          "activity logged"
        );
        Ok(log)
      }
      InsertOutcome::MissingParent => {
        Err(Error::NotFound(format!("tag {}", log.tag_id)))
      }
      InsertOutcome::Conflict => {
        Err(Error::Conflict(format!("log {} already exists", log.log_id)))
      }
    }
  }

  /// The actor's own logs. The query's user id is always replaced by the
  /// actor's.
  pub async fn list_logs(
    &self,
    actor: &Actor,
    mut query: LogQuery,
  ) -> Result<Vec<ResolvedLog>> {
    query.user_id = actor.user_id;
    self
      .store
      .list_logs(query)
      .await
      .map_err(|e| Error::store("list_logs", e))
  }

  /// The actor's logs grouped by day, optionally limited to one domain.
  pub async fn day_report<Tz>(
    &self,
    actor: &Actor,
    domain_id: Option<&str>,
    tz: &Tz,
  ) -> Result<Vec<DayView>>
  where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
  {
    let mut logs = self
      .list_logs(actor, LogQuery::for_user(actor.user_id))
      .await?;
    if let Some(domain_id) = domain_id {
      logs = aggregate::filter_by_domain(logs, domain_id);
    }
    Ok(aggregate::day_report(aggregate::group_by_day(logs, tz), tz))
  }

  /// Dashboard for the domain with external id `domain_id`.
  pub async fn domain_report<Tz>(
    &self,
    actor: &Actor,
    domain_id: &str,
    tz: &Tz,
  ) -> Result<DomainReport>
  where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
  {
    let domain = self
      .store
      .find_node(Level::Domain, domain_id.to_owned())
      .await
      .map_err(|e| Error::store("find_node", e))?
      .ok_or_else(|| Error::NotFound(format!("domain {domain_id}")))?;

    let logs = self
      .list_logs(actor, LogQuery::for_user(actor.user_id))
      .await?;
    Ok(aggregate::domain_report(&domain, logs, tz))
  }
}
