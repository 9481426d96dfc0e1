//! Log Aggregation Service: turns a flat list of resolved logs into
//! day-grouped reports.
//!
//! Everything here is a pure transform over already-fetched data. Malformed
//! input (logs whose tag chain no longer resolves) is never an error; such
//! logs simply drop out of domain-filtered views.

use std::collections::BTreeMap;

use chrono::{NaiveDate, TimeZone};
use serde::Serialize;

use crate::{
  log::{NodeRef, ResolvedLog},
  node::Node,
};

// ─── Grouping ────────────────────────────────────────────────────────────────

/// Logs sharing one calendar date in the display time zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayGroup {
  pub date:          NaiveDate,
  /// Sum of `duration_seconds` over `logs`.
  pub total_seconds: u64,
  /// Members in their original relative order.
  pub logs:          Vec<ResolvedLog>,
}

/// Keep only logs attributed to `domain_id` through a fully resolved chain.
pub fn filter_by_domain(
  logs: Vec<ResolvedLog>,
  domain_id: &str,
) -> Vec<ResolvedLog> {
  logs
    .into_iter()
    .filter(|l| l.domain_id() == Some(domain_id))
    .collect()
}

/// Bucket logs by the calendar date of `start_time` in `tz`.
///
/// Groups come back newest day first whatever the input order.
pub fn group_by_day<Tz: TimeZone>(
  logs: Vec<ResolvedLog>,
  tz: &Tz,
) -> Vec<DayGroup> {
  let mut days: BTreeMap<NaiveDate, DayGroup> = BTreeMap::new();

  for log in logs {
    let date = log.log.start_time.with_timezone(tz).date_naive();
    let group = days.entry(date).or_insert_with(|| DayGroup {
      date,
      total_seconds: 0,
      logs: Vec::new(),
    });
    group.total_seconds += u64::from(log.log.duration_seconds);
    group.logs.push(log);
  }

  days.into_values().rev().collect()
}

// ─── Formatting ──────────────────────────────────────────────────────────────

/// Human-readable duration, Indonesian short form.
///
/// | seconds | output |
/// |---------|--------|
/// | 45 | `45 detik` |
/// | 90 | `1 menit` |
/// | 3600 | `1 jam` |
/// | 5400 | `1j 30m` |
pub fn format_duration(seconds: u64) -> String {
  if seconds < 60 {
    return format!("{seconds} detik");
  }
  let hours = seconds / 3600;
  let minutes = (seconds % 3600) / 60;

  match (hours, minutes) {
    (0, m) => format!("{m} menit"),
    (h, 0) => format!("{h} jam"),
    (h, m) => format!("{h}j {m}m"),
  }
}

// ─── Report views ────────────────────────────────────────────────────────────

/// One log as shown inside a day.
#[derive(Debug, Clone, Serialize)]
pub struct LogEntryView {
  #[serde(flatten)]
  pub log:              ResolvedLog,
  /// Local start time, `HH:MM`.
  pub local_time:       String,
  pub duration_display: String,
}

/// One day as shown in a report.
#[derive(Debug, Clone, Serialize)]
pub struct DayView {
  pub date:          NaiveDate,
  pub total_seconds: u64,
  pub total_display: String,
  /// Only the newest day starts expanded.
  pub expanded:      bool,
  pub entries:       Vec<LogEntryView>,
}

/// Attach display strings to grouped logs. `groups` must already be in
/// [`group_by_day`] order.
pub fn day_report<Tz: TimeZone>(groups: Vec<DayGroup>, tz: &Tz) -> Vec<DayView>
where
  Tz::Offset: std::fmt::Display,
{
  groups
    .into_iter()
    .enumerate()
    .map(|(i, group)| DayView {
      date:          group.date,
      total_seconds: group.total_seconds,
      total_display: format_duration(group.total_seconds),
      expanded:      i == 0,
      entries:       group
        .logs
        .into_iter()
        .map(|log| LogEntryView {
          local_time:       log
            .log
            .start_time
            .with_timezone(tz)
            .format("%H:%M")
            .to_string(),
          duration_display: format_duration(u64::from(log.log.duration_seconds)),
          log,
        })
        .collect(),
    })
    .collect()
}

/// The per-domain dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct DomainReport {
  pub domain:        NodeRef,
  pub entry_count:   usize,
  pub total_seconds: u64,
  pub total_display: String,
  pub days:          Vec<DayView>,
}

/// Build the dashboard for `domain` from a user's logs.
///
/// The domain is matched by external id only.
pub fn domain_report<Tz: TimeZone>(
  domain: &Node,
  logs: Vec<ResolvedLog>,
  tz: &Tz,
) -> DomainReport
where
  Tz::Offset: std::fmt::Display,
{
  let logs = filter_by_domain(logs, &domain.external_id);
  let entry_count = logs.len();
  let groups = group_by_day(logs, tz);
  let total_seconds = groups.iter().map(|g| g.total_seconds).sum();

  DomainReport {
    domain: NodeRef {
      id:   domain.external_id.clone(),
      name: domain.name.clone(),
    },
    entry_count,
    total_seconds,
    total_display: format_duration(total_seconds),
    days: day_report(groups, tz),
  }
}

#[cfg(test)]
mod tests {
  use std::collections::HashSet;

  use chrono::{DateTime, FixedOffset, Utc};
  use uuid::Uuid;

  use super::*;
  use crate::{level::Level, log::ActivityLog};

  fn at(rfc3339: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(rfc3339)
      .unwrap()
      .with_timezone(&Utc)
  }

  fn chain(domain: &str) -> (Option<NodeRef>, Option<NodeRef>, Option<NodeRef>) {
    let r = |id: &str| Some(NodeRef { id: id.into(), name: id.into() });
    (r("AG-TAG00001"), r("AT-TYPE0001"), r(domain))
  }

  fn log(start: &str, seconds: u32, domain: &str) -> ResolvedLog {
    let (tag, activity_type, domain) = chain(domain);
    ResolvedLog {
      log: ActivityLog {
        log_id: Uuid::new_v4(),
        user_id: Uuid::nil(),
        tag_id: "AG-TAG00001".into(),
        start_time: at(start),
        duration_seconds: seconds,
        notes: None,
      },
      tag,
      activity_type,
      domain,
    }
  }

  // ── format_duration ───────────────────────────────────────────────────

  #[test]
  fn format_duration_examples() {
    assert_eq!(format_duration(45), "45 detik");
    assert_eq!(format_duration(90), "1 menit");
    assert_eq!(format_duration(3600), "1 jam");
    assert_eq!(format_duration(5400), "1j 30m");
  }

  #[test]
  fn format_duration_boundaries() {
    assert_eq!(format_duration(0), "0 detik");
    assert_eq!(format_duration(59), "59 detik");
    assert_eq!(format_duration(60), "1 menit");
    // Leftover seconds below a minute are dropped once past an hour.
    assert_eq!(format_duration(3659), "1 jam");
    assert_eq!(format_duration(3660), "1j 1m");
    assert_eq!(format_duration(86_400), "24 jam");
  }

  // ── group_by_day ──────────────────────────────────────────────────────

  #[test]
  fn groups_two_days_newest_first() {
    let logs = vec![
      log("2024-01-01T09:00:00Z", 600, "AD-WORK0001"),
      log("2023-12-31T10:00:00Z", 3600, "AD-WORK0001"),
      log("2024-01-01T14:00:00Z", 1800, "AD-WORK0001"),
    ];

    let groups = group_by_day(logs, &Utc);
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    assert_eq!(groups[0].total_seconds, 2400);
    assert_eq!(groups[1].date, NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
    assert_eq!(groups[1].total_seconds, 3600);
  }

  #[test]
  fn members_keep_input_order() {
    let logs = vec![
      log("2024-01-01T18:00:00Z", 60, "AD-A0000001"),
      log("2024-01-01T08:00:00Z", 120, "AD-A0000001"),
    ];
    let first = logs[0].log.log_id;
    let second = logs[1].log.log_id;

    let groups = group_by_day(logs, &Utc);
    let ids: Vec<_> = groups[0].logs.iter().map(|l| l.log.log_id).collect();
    assert_eq!(ids, vec![first, second]);
  }

  #[test]
  fn grouping_is_independent_of_input_order() {
    let logs = vec![
      log("2024-03-02T00:00:00Z", 10, "AD-A0000001"),
      log("2024-03-05T00:00:00Z", 20, "AD-A0000001"),
      log("2024-03-01T00:00:00Z", 30, "AD-A0000001"),
      log("2024-03-05T23:59:59Z", 40, "AD-A0000001"),
      log("2024-03-03T12:00:00Z", 50, "AD-A0000001"),
    ];
    let mut reversed = logs.clone();
    reversed.reverse();

    let dates = |groups: Vec<DayGroup>| -> Vec<(NaiveDate, u64)> {
      groups.iter().map(|g| (g.date, g.total_seconds)).collect()
    };
    assert_eq!(dates(group_by_day(logs, &Utc)), dates(group_by_day(reversed, &Utc)));
  }

  #[test]
  fn grouping_loses_and_duplicates_nothing() {
    let logs: Vec<ResolvedLog> = (0..40)
      .map(|i| {
        let start = format!("2024-02-{:02}T{:02}:00:00Z", 1 + (i * 7) % 28, i % 24);
        log(&start, 30 + i, "AD-A0000001")
      })
      .collect();
    let input_ids: HashSet<Uuid> = logs.iter().map(|l| l.log.log_id).collect();

    let groups = group_by_day(logs, &Utc);

    for pair in groups.windows(2) {
      assert!(pair[0].date > pair[1].date);
    }
    for g in &groups {
      let sum: u64 = g.logs.iter().map(|l| u64::from(l.log.duration_seconds)).sum();
      assert_eq!(sum, g.total_seconds);
    }
    let output: Vec<Uuid> = groups
      .iter()
      .flat_map(|g| g.logs.iter().map(|l| l.log.log_id))
      .collect();
    assert_eq!(output.len(), input_ids.len());
    assert_eq!(output.into_iter().collect::<HashSet<_>>(), input_ids);
  }

  #[test]
  fn day_boundary_follows_display_zone() {
    // 20:00 UTC on the 1st is already the 2nd at UTC+7.
    let logs = vec![
      log("2024-01-01T20:00:00Z", 60, "AD-A0000001"),
      log("2024-01-01T10:00:00Z", 60, "AD-A0000001"),
    ];
    let wib = FixedOffset::east_opt(7 * 3600).unwrap();

    assert_eq!(group_by_day(logs.clone(), &Utc).len(), 1);

    let local = group_by_day(logs, &wib);
    assert_eq!(local.len(), 2);
    assert_eq!(local[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
  }

  #[test]
  fn empty_input_gives_no_groups() {
    assert!(group_by_day(Vec::new(), &Utc).is_empty());
  }

  // ── filter_by_domain ──────────────────────────────────────────────────

  #[test]
  fn filter_keeps_matching_domain_only() {
    let logs = vec![
      log("2024-01-01T09:00:00Z", 60, "AD-WORK0001"),
      log("2024-01-01T10:00:00Z", 60, "AD-STUDY001"),
    ];
    let kept = filter_by_domain(logs, "AD-WORK0001");
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].domain_id(), Some("AD-WORK0001"));
  }

  #[test]
  fn filter_drops_orphaned_logs() {
    let mut orphan = log("2024-01-01T09:00:00Z", 60, "AD-WORK0001");
    orphan.activity_type = None;
    let kept = filter_by_domain(vec![orphan], "AD-WORK0001");
    assert!(kept.is_empty());
  }

  // ── reports ───────────────────────────────────────────────────────────

  #[test]
  fn only_newest_day_is_expanded() {
    let logs = vec![
      log("2024-01-01T09:00:00Z", 60, "AD-A0000001"),
      log("2024-01-03T09:00:00Z", 60, "AD-A0000001"),
      log("2024-01-02T09:00:00Z", 60, "AD-A0000001"),
    ];
    let days = day_report(group_by_day(logs, &Utc), &Utc);
    let expanded: Vec<bool> = days.iter().map(|d| d.expanded).collect();
    assert_eq!(expanded, vec![true, false, false]);
    assert_eq!(days[0].entries[0].local_time, "09:00");
    assert_eq!(days[0].entries[0].duration_display, "1 menit");
  }

  #[test]
  fn domain_report_totals_filtered_logs() {
    let domain = Node {
      row_id:       Uuid::new_v4(),
      level:        Level::Domain,
      external_id:  "AD-WORK0001".into(),
      parent_id:    None,
      name:         "Work".into(),
      description:  None,
      is_published: true,
      sort_order:   0,
    };
    let logs = vec![
      log("2024-01-01T09:00:00Z", 600, "AD-WORK0001"),
      log("2024-01-01T11:00:00Z", 1800, "AD-WORK0001"),
      log("2023-12-31T09:00:00Z", 3600, "AD-WORK0001"),
      log("2023-12-31T09:00:00Z", 999, "AD-OTHER001"),
    ];

    let report = domain_report(&domain, logs, &Utc);
    assert_eq!(report.domain.name, "Work");
    assert_eq!(report.entry_count, 3);
    assert_eq!(report.total_seconds, 6000);
    assert_eq!(report.total_display, "1j 40m");
    assert_eq!(report.days.len(), 2);
    assert_eq!(report.days[0].total_display, "40 menit");
  }
}
