use super::PlanError;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Intervalle de dates, bornes incluses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, PlanError> {
        if end < start {
            return Err(PlanError::InvalidRange {
                from: start,
                to: end,
            });
        }
        Ok(Self { start, end })
    }

    /// Du 1er janvier au 31 décembre.
    pub fn year(year: i32) -> Result<Self, PlanError> {
        let start = NaiveDate::from_ymd_opt(year, 1, 1)
            .ok_or_else(|| PlanError::InvalidDate(format!("{year}-01-01")))?;
        let end = NaiveDate::from_ymd_opt(year, 12, 31)
            .ok_or_else(|| PlanError::InvalidDate(format!("{year}-12-31")))?;
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }

    pub fn expand(&self, days: u32) -> Self {
        let margin = Duration::days(i64::from(days));
        Self {
            start: self.start - margin,
            end: self.end + margin,
        }
    }

    /// Un week-end coupé par une borne est inclus en entier.
    pub fn snap_weekends(&self) -> Self {
        let mut out = *self;
        if out.start.weekday() == Weekday::Sun {
            out.start -= Duration::days(1);
        }
        if out.end.weekday() == Weekday::Sat {
            out.end += Duration::days(1);
        }
        out
    }

    pub fn clamp_to(&self, bounds: &DateWindow) -> Self {
        Self {
            start: self.start.max(bounds.start),
            end: self.end.min(bounds.end),
        }
    }
}

pub(crate) fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Samedi et dimanche du week-end ancré sur `saturday`.
pub(crate) fn weekend_pair(saturday: NaiveDate) -> [NaiveDate; 2] {
    [saturday, saturday + Duration::days(1)]
}

/// Samedi du week-end contenant `date` (qui doit tomber un week-end).
pub(crate) fn weekend_anchor(date: NaiveDate) -> NaiveDate {
    if date.weekday() == Weekday::Sun {
        date - Duration::days(1)
    } else {
        date
    }
}
