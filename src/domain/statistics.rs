use std::collections::BTreeSet;
use std::time::Duration;

use chrono::{DateTime, Datelike, Days, NaiveDate, TimeZone};

use crate::domain::entity::WorkRecord;

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Aggregated focus history as seen from a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Summary {
    /// Focus time of every record.
    pub total: Duration,
    /// Number of distinct days with at least one record.
    pub days: usize,
    /// Focus time per weekday of the current week, Monday first.
    pub week: [Duration; 7],
    /// Focus time of the current day.
    pub today: Duration,
}

impl Summary {
    /// Summarize `records`. Days and weeks are those of the time zone `now`
    /// is expressed in.
    pub fn collect<Tz: TimeZone>(records: &[WorkRecord], now: &DateTime<Tz>) -> Self {
        Self {
            total: total_time(records),
            days: count_days(records, &now.timezone()),
            week: week_time(records, now),
            today: day_time(records, now),
        }
    }

    pub fn total_hours(&self) -> f64 {
        hours(self.total)
    }

    pub fn week_hours(&self) -> [f64; 7] {
        self.week.map(hours)
    }
}

/// Convert a duration into fractional hours.
pub fn hours(duration: Duration) -> f64 {
    duration.as_secs_f64() / SECONDS_PER_HOUR
}

pub fn total_time(records: &[WorkRecord]) -> Duration {
    records.iter().map(WorkRecord::elapsed).sum()
}

/// Count the distinct calendar days records were started on.
pub fn count_days<Tz: TimeZone>(records: &[WorkRecord], tz: &Tz) -> usize {
    records
        .iter()
        .map(|record| local_date(record, tz))
        .collect::<BTreeSet<_>>()
        .len()
}

/// Sum focus time per weekday for the week containing `now`.
pub fn week_time<Tz: TimeZone>(records: &[WorkRecord], now: &DateTime<Tz>) -> [Duration; 7] {
    let today = now.date_naive();
    let monday = today - Days::new(u64::from(today.weekday().num_days_from_monday()));
    let tz = now.timezone();

    let mut week = [Duration::ZERO; 7];
    for record in records {
        let date = local_date(record, &tz);
        if date >= monday && date <= today {
            week[date.weekday().num_days_from_monday() as usize] += record.elapsed();
        }
    }
    week
}

/// Sum focus time of records started on the same day as `now`.
pub fn day_time<Tz: TimeZone>(records: &[WorkRecord], now: &DateTime<Tz>) -> Duration {
    let today = now.date_naive();
    let tz = now.timezone();
    records
        .iter()
        .filter(|record| local_date(record, &tz) == today)
        .map(WorkRecord::elapsed)
        .sum()
}

fn local_date<Tz: TimeZone>(record: &WorkRecord, tz: &Tz) -> NaiveDate {
    record.started_at.with_timezone(tz).date_naive()
}
