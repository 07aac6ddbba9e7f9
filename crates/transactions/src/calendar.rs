//! Business-day arithmetic.
//!
//! Only the Saturday/Sunday weekend is excluded; no holiday calendar is
//! modelled.

use std::sync::Arc;

use chrono::{DateTime, Datelike, Days, FixedOffset, NaiveDate, Offset, TimeZone, Utc, Weekday};

use tradefeed_core::Clock;

/// The most recent business day strictly before the local date of `now` in
/// `zone`.
///
/// Subtract one day, then keep going back while the result is a weekend day:
/// Tuesday..=Saturday map to the previous day's date (Saturday maps to
/// Friday), Sunday and Monday map to the preceding Friday.
///
/// Dates within three days of `NaiveDate::MIN` have no earlier representable
/// business day; they clamp to `NaiveDate::MIN` itself.
pub fn previous_business_day<Tz: TimeZone>(now: DateTime<Utc>, zone: &Tz) -> NaiveDate {
    let local = now.with_timezone(zone).date_naive();

    let back = match local.weekday() {
        Weekday::Mon => 3,
        Weekday::Sun => 2,
        _ => 1,
    };

    local
        .checked_sub_days(Days::new(back))
        .unwrap_or(NaiveDate::MIN)
}

/// Render a business date as `YYYY-MM-DD`.
pub fn format_business_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Clock + zone pair used to stamp records at publish time.
#[derive(Clone)]
pub struct BusinessCalendar {
    clock: Arc<dyn Clock>,
    zone: FixedOffset,
}

impl BusinessCalendar {
    pub fn new(clock: Arc<dyn Clock>, zone: FixedOffset) -> Self {
        Self { clock, zone }
    }

    /// Calendar evaluated in UTC.
    pub fn utc(clock: Arc<dyn Clock>) -> Self {
        Self::new(clock, Utc.fix())
    }

    pub fn zone(&self) -> FixedOffset {
        self.zone
    }

    pub fn with_zone(mut self, zone: FixedOffset) -> Self {
        self.zone = zone;
        self
    }

    /// Previous business day relative to the clock's current instant.
    pub fn close_of_business_date(&self) -> NaiveDate {
        previous_business_day(self.clock.now(), &self.zone)
    }
}

impl core::fmt::Debug for BusinessCalendar {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BusinessCalendar")
            .field("zone", &self.zone)
            .finish_non_exhaustive()
    }
}
