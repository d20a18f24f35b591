//! Time windows a log list or summary can cover

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TimeWindow {
    #[default]
    Today,
    ThisWeek,
    LastWeek,
}

impl TimeWindow {
    pub const ALL: [Self; 3] = [Self::Today, Self::ThisWeek, Self::LastWeek];

    /// Path segment used by the log service
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::ThisWeek => "this-week",
            Self::LastWeek => "last-week",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Today => "Today",
            Self::ThisWeek => "This Week",
            Self::LastWeek => "Last Week",
        }
    }

    /// Inclusive date range covered relative to `today`. Weeks start on Monday.
    #[must_use]
    pub fn date_range(self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let days_from_monday = u64::from(today.weekday().num_days_from_monday());
        let monday = today - Days::new(days_from_monday);
        match self {
            Self::Today => (today, today),
            Self::ThisWeek => (monday, monday + Days::new(6)),
            Self::LastWeek => (monday - Days::new(7), monday - Days::new(1)),
        }
    }

    /// Whether `date` falls inside the window
    #[must_use]
    pub fn contains(self, date: NaiveDate, today: NaiveDate) -> bool {
        let (start, end) = self.date_range(today);
        (start..=end).contains(&date)
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeWindow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|window| window.as_str() == wanted)
            .ok_or_else(|| format!("unknown window '{s}' (expected today, this-week or last-week)"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn week_ranges_start_on_monday() {
        // 2025-03-12 is a Wednesday
        let today = date(2025, 3, 12);
        assert_eq!(TimeWindow::Today.date_range(today), (today, today));
        assert_eq!(
            TimeWindow::ThisWeek.date_range(today),
            (date(2025, 3, 10), date(2025, 3, 16))
        );
        assert_eq!(
            TimeWindow::LastWeek.date_range(today),
            (date(2025, 3, 3), date(2025, 3, 9))
        );
    }

    #[test]
    fn week_range_on_monday_includes_today() {
        let monday = date(2025, 3, 10);
        assert!(TimeWindow::ThisWeek.contains(monday, monday));
        assert!(!TimeWindow::LastWeek.contains(monday, monday));
    }

    #[test]
    fn parses_service_spellings() {
        assert_eq!("this-week".parse(), Ok(TimeWindow::ThisWeek));
        assert_eq!("LAST_WEEK".parse(), Ok(TimeWindow::LastWeek));
        assert!("yesterday".parse::<TimeWindow>().is_err());
    }
}
