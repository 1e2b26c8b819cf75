use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use std::str::FromStr;

/// Start of the harvest window, as typed by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Since {
    Date(NaiveDate),
    Instant(DateTime<Utc>),
    Today,
    Yesterday,
    Hours(u32),
    Days(u32),
    Week,
}

impl FromStr for Since {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let since = parse(s)?;
        since.to_instant()?;
        Ok(since)
    }
}

fn parse(s: &str) -> Result<Since, String> {
    match s.trim() {
        "today" => Ok(Since::Today),
        "yesterday" => Ok(Since::Yesterday),
        "week" => Ok(Since::Week),
        other => {
            if let Ok(date) = NaiveDate::parse_from_str(other, "%Y-%m-%d") {
                Ok(Since::Date(date))
            } else if let Ok(instant) = DateTime::parse_from_rfc3339(other) {
                Ok(Since::Instant(instant.with_timezone(&Utc)))
            } else if let Some(h) = other.strip_suffix('h') {
                h.parse::<u32>()
                    .map(Since::Hours)
                    .map_err(|_| format!("Invalid hours: {other}"))
            } else if let Some(d) = other.strip_suffix('d') {
                d.parse::<u32>()
                    .map(Since::Days)
                    .map_err(|_| format!("Invalid days: {other}"))
            } else {
                Err(format!(
                    "Unknown start: {other}. \
                     Use: YYYY-MM-DD, an RFC 3339 time, today, yesterday, 24h, 30d, week"
                ))
            }
        }
    }
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

fn before(
    at: DateTime<Utc>,
    span: Option<Duration>,
    raw: &str,
) -> Result<DateTime<Utc>, String> {
    span.and_then(|span| at.checked_sub_signed(span))
        .ok_or_else(|| format!("Start is out of range: {raw} before {}", at.to_rfc3339()))
}

impl Since {
    /// Start instant relative to `now`; fails when it falls outside the representable range.
    pub fn resolve(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>, String> {
        let start_of_today = midnight(now.date_naive());
        match self {
            Since::Date(date) => Ok(midnight(*date)),
            Since::Instant(instant) => Ok(*instant),
            Since::Today => Ok(start_of_today),
            Since::Yesterday => before(start_of_today, Duration::try_days(1), "1d"),
            Since::Hours(h) => before(now, Duration::try_hours(i64::from(*h)), &format!("{h}h")),
            Since::Days(d) => before(now, Duration::try_days(i64::from(*d)), &format!("{d}d")),
            Since::Week => {
                let days_since_monday = i64::from(now.weekday().num_days_from_monday());
                before(start_of_today, Duration::try_days(days_since_monday), "week")
            }
        }
    }

    pub fn to_instant(&self) -> Result<DateTime<Utc>, String> {
        self.resolve(Utc::now())
    }
}
