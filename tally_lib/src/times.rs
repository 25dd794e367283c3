use crate::errors::{Error, Result};
use chrono::NaiveDate;

/// Specifies a day, possibly relative to some "today".
/// It can be given on the command line as "3m", so that
/// running the same command a month later still means "three months ago".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instant {
    Today,
    Date(NaiveDate),
    DaysAgo(u64),
    MonthsAgo(u32),
    YearsAgo(u32),
}

impl Instant {
    /// Parse either an ISO date (2024-01-31), "today", or a count followed by
    /// one of d, m or y.
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        if text == "today" {
            return Ok(Instant::Today);
        }
        if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
            return Ok(Instant::Date(date));
        }

        let invalid = || Error::Str(format!("invalid date {text:?}"));
        let count = |c: &str| c.parse().map_err(|_| invalid());
        if let Some(c) = text.strip_suffix('d') {
            Ok(Instant::DaysAgo(count(c)?))
        } else if let Some(c) = text.strip_suffix('m') {
            Ok(Instant::MonthsAgo(u32::try_from(count(c)?).map_err(|_| invalid())?))
        } else if let Some(c) = text.strip_suffix('y') {
            Ok(Instant::YearsAgo(u32::try_from(count(c)?).map_err(|_| invalid())?))
        } else {
            Err(invalid())
        }
    }

    /// Convert self to an actual day.
    /// Fails when the day would be before the earliest supported date.
    pub fn to_date(&self, today: NaiveDate) -> Result<NaiveDate> {
        let date = match self {
            Instant::Today => Some(today),
            Instant::Date(d) => Some(*d),
            Instant::DaysAgo(count) => {
                today.checked_sub_days(chrono::Days::new(*count))
            }
            Instant::MonthsAgo(count) => {
                today.checked_sub_months(chrono::Months::new(*count))
            }
            Instant::YearsAgo(count) => count
                .checked_mul(12)
                .and_then(|m| today.checked_sub_months(chrono::Months::new(m))),
        };
        date.ok_or_else(|| Error::Str(format!("invalid date {self:?}")))
    }
}

/// A range of days [from; to], including both ends.  Either end can be
/// omitted to leave that side unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    #[must_use]
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        DateRange { from, to }
    }

    /// The unbounded range
    #[must_use]
    pub fn all() -> Self {
        DateRange::default()
    }

    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.map_or(true, |f| f <= date)
            && self.to.map_or(true, |t| date <= t)
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.from, self.to) {
            (None, None) => write!(f, "all time"),
            (Some(from), None) => write!(f, "since {from}"),
            (None, Some(to)) => write!(f, "until {to}"),
            (Some(from), Some(to)) => write!(f, "{from} to {to}"),
        }
    }
}
