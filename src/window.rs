//! Report windows.
//!
//! Every fetch and every report is scoped by a half-open `[start, end)` range.
//! A bad range is fatal: nothing downstream can run without it.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::Serialize;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Which relative range to use when no explicit dates are given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    PastDay,
    PastWeek,
    PastMonth,
    PastYear,
}

impl Preset {
    fn span(self) -> Duration {
        match self {
            Preset::PastDay => Duration::days(1),
            Preset::PastWeek => Duration::days(7),
            Preset::PastMonth => Duration::days(30),
            Preset::PastYear => Duration::days(365),
        }
    }
}

/// Raw window selection as given on the command line.
#[derive(Debug, Clone, Default)]
pub struct WindowRequest {
    pub past_day: bool,
    pub past_week: bool,
    pub past_month: bool,
    pub past_year: bool,
    pub date_start: Option<String>,
    pub date_end: Option<String>,
}

impl WindowRequest {
    fn preset(&self) -> Option<Preset> {
        if self.past_day {
            Some(Preset::PastDay)
        } else if self.past_week {
            Some(Preset::PastWeek)
        } else if self.past_month {
            Some(Preset::PastMonth)
        } else if self.past_year {
            Some(Preset::PastYear)
        } else {
            None
        }
    }

    /// Resolve to a window relative to `now`.
    pub fn resolve(&self, now: DateTime<Utc>) -> Result<ReportWindow> {
        if let Some(preset) = self.preset() {
            let window = ReportWindow::trailing(now, preset.span());
            tracing::info!(?preset, start = %window.start, end = %window.end, "using preset window");
            return Ok(window);
        }

        match (self.date_start.as_deref(), self.date_end.as_deref()) {
            (Some(start), Some(end)) => {
                ReportWindow::new(parse_bound(start)?, parse_bound(end)?)
            }
            (Some(_), None) | (None, Some(_)) => Err(Error::InvalidDateRange(
                "both --date-start and --date-end must be provided together".to_string(),
            )),
            (None, None) => {
                let window = ReportWindow::previous_month(now);
                tracing::info!(start = %window.start, end = %window.end, "using previous calendar month");
                Ok(window)
            }
        }
    }
}

impl ReportWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if start >= end {
            return Err(Error::InvalidDateRange(format!(
                "start {} must be before end {}",
                start.to_rfc3339(),
                end.to_rfc3339()
            )));
        }
        Ok(Self { start, end })
    }

    fn trailing(now: DateTime<Utc>, span: Duration) -> Self {
        Self {
            start: now - span,
            end: now,
        }
    }

    /// First day of the previous month up to the first day of this month.
    pub fn previous_month(now: DateTime<Utc>) -> Self {
        let this_month = NaiveDate::from_ymd_opt(now.year(), now.month(), 1)
            .unwrap_or_else(|| now.date_naive());
        let previous = this_month
            .pred_opt()
            .and_then(|last| NaiveDate::from_ymd_opt(last.year(), last.month(), 1))
            .unwrap_or(this_month);
        Self {
            start: midnight(previous),
            end: midnight(this_month),
        }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.end
    }

    /// Seven days before the end of the window.
    pub fn week_start(&self) -> DateTime<Utc> {
        self.end - Duration::days(7)
    }

    pub fn start_rfc3339(&self) -> String {
        self.start.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
    }

    pub fn end_rfc3339(&self) -> String {
        self.end.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
    }

    /// `YYYY-MM-DD to YYYY-MM-DD` for headers.
    pub fn label(&self) -> String {
        format!(
            "{} to {}",
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        )
    }
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

/// Accept `YYYY-MM-DD` (midnight UTC) or a full RFC3339 timestamp.
pub fn parse_bound(raw: &str) -> Result<DateTime<Utc>> {
    let trimmed = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(midnight(date));
    }
    DateTime::parse_from_rfc3339(trimmed)
        .map(|value| value.with_timezone(&Utc))
        .map_err(|_| {
            Error::InvalidDateRange(format!(
                "invalid date '{trimmed}' (expected YYYY-MM-DD or RFC3339)"
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(raw: &str) -> DateTime<Utc> {
        raw.parse().expect("time")
    }

    #[test]
    fn explicit_dates_become_midnight_bounds() {
        let request = WindowRequest {
            date_start: Some("2024-05-01".to_string()),
            date_end: Some("2024-06-01".to_string()),
            ..Default::default()
        };
        let window = request.resolve(at("2024-07-15T12:00:00Z")).expect("window");
        assert_eq!(window.start, at("2024-05-01T00:00:00Z"));
        assert_eq!(window.end, at("2024-06-01T00:00:00Z"));
        assert_eq!(window.start_rfc3339(), "2024-05-01T00:00:00Z");
        assert_eq!(window.label(), "2024-05-01 to 2024-06-01");
    }

    #[test]
    fn lone_bound_is_fatal() {
        let request = WindowRequest {
            date_start: Some("2024-05-01".to_string()),
            ..Default::default()
        };
        let err = request.resolve(Utc::now()).expect_err("lone bound");
        assert!(matches!(err, Error::InvalidDateRange(_)));
    }

    #[test]
    fn malformed_and_inverted_ranges_are_fatal() {
        assert!(parse_bound("2024-13-01").is_err());
        assert!(parse_bound("yesterday").is_err());
        assert!(ReportWindow::new(at("2024-06-01T00:00:00Z"), at("2024-05-01T00:00:00Z")).is_err());
        assert!(ReportWindow::new(at("2024-06-01T00:00:00Z"), at("2024-06-01T00:00:00Z")).is_err());
    }

    #[test]
    fn presets_take_priority_over_dates() {
        let now = at("2024-07-15T12:00:00Z");
        let request = WindowRequest {
            past_week: true,
            past_year: true,
            date_start: Some("2020-01-01".to_string()),
            date_end: Some("2020-02-01".to_string()),
            ..Default::default()
        };
        let window = request.resolve(now).expect("window");
        assert_eq!(window.end, now);
        assert_eq!(window.start, now - Duration::days(7));
    }

    #[test]
    fn default_is_previous_calendar_month() {
        let window = WindowRequest::default()
            .resolve(at("2024-03-10T08:30:00Z"))
            .expect("window");
        assert_eq!(window.start, at("2024-02-01T00:00:00Z"));
        assert_eq!(window.end, at("2024-03-01T00:00:00Z"));

        let january = ReportWindow::previous_month(at("2024-01-20T00:00:00Z"));
        assert_eq!(january.start, at("2023-12-01T00:00:00Z"));
        assert_eq!(january.end, at("2024-01-01T00:00:00Z"));
    }

    #[test]
    fn window_is_half_open() {
        let window =
            ReportWindow::new(at("2024-05-01T00:00:00Z"), at("2024-05-02T00:00:00Z")).expect("window");
        assert!(window.contains(at("2024-05-01T00:00:00Z")));
        assert!(!window.contains(at("2024-05-02T00:00:00Z")));
        assert_eq!(window.week_start(), at("2024-04-25T00:00:00Z"));
    }

    #[test]
    fn rfc3339_bounds_are_accepted() {
        let parsed = parse_bound("2024-05-01T10:00:00+02:00").expect("parse");
        assert_eq!(parsed, at("2024-05-01T08:00:00Z"));
    }
}
