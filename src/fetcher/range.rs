//! Date-span resolution for range fetches.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors resolving a date span.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// Neither a day count nor an end date was given
    #[error("date range is under-specified: set num_days or an end date")]
    Unspecified,

    /// The end date precedes the start date
    #[error("end date {end} precedes start date {start}")]
    EmptySpan { start: NaiveDate, end: NaiveDate },
}

/// A span of observation dates for a range fetch.
///
/// Exactly one of `num_days` / `end` has to resolve the span; when both
/// are set, `num_days` takes precedence. A day count of zero counts as
/// unset and falls back to the end date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateSpan {
    /// First observation date, inclusive
    pub start: NaiveDate,
    /// Number of days starting at `start`
    pub num_days: Option<u32>,
    /// Last observation date, inclusive
    pub end: Option<NaiveDate>,
}

impl DateSpan {
    /// Span of `num_days` days starting at `start`.
    pub fn days(start: NaiveDate, num_days: u32) -> Self {
        Self {
            start,
            num_days: Some(num_days),
            end: None,
        }
    }

    /// Inclusive span from `start` through `end`.
    pub fn until(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start,
            num_days: None,
            end: Some(end),
        }
    }

    /// Resolves the span into its ascending list of dates.
    pub fn resolve(&self) -> Result<Vec<NaiveDate>, ConfigurationError> {
        match self.num_days {
            Some(n) if n > 0 => Ok(self.start.iter_days().take(n as usize).collect()),
            _ => match self.end {
                Some(end) if end < self.start => Err(ConfigurationError::EmptySpan {
                    start: self.start,
                    end,
                }),
                Some(end) => Ok(self.start.iter_days().take_while(|d| *d <= end).collect()),
                None => Err(ConfigurationError::Unspecified),
            },
        }
    }
}
