//! Day-count conventions.
//!
//! A day count turns a pair of dates into the fraction of a year used to
//! scale a rate into an amount. The conventions are a closed enum so that
//! payments carrying one stay `Copy`/`Clone` and convention dispatch is
//! exhaustive.

use crate::date::{is_leap_year, Date};
use rf_core::{Real, Time};

/// A convention for counting days and year fractions between two dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DayCount {
    /// Actual days / 360.
    Act360,
    /// Actual days / 365, ignoring leap years.
    #[default]
    Act365Fixed,
    /// Actual/Actual (ISDA): the period is split at year boundaries and
    /// each piece divided by that year's actual length.
    ActActIsda,
    /// 30/360 US (bond basis).
    Thirty360Us,
    /// 30E/360 (Eurobond basis).
    ThirtyE360,
}

impl DayCount {
    /// Human-readable name of the convention.
    pub fn name(self) -> &'static str {
        match self {
            DayCount::Act360 => "Actual/360",
            DayCount::Act365Fixed => "Actual/365 (Fixed)",
            DayCount::ActActIsda => "Actual/Actual (ISDA)",
            DayCount::Thirty360Us => "30/360 (US)",
            DayCount::ThirtyE360 => "30E/360",
        }
    }

    /// Number of days between `start` and `end` under this convention.
    pub fn days(self, start: Date, end: Date) -> i64 {
        match self {
            DayCount::Act360 | DayCount::Act365Fixed | DayCount::ActActIsda => {
                (end - start) as i64
            }
            DayCount::Thirty360Us => {
                let (y1, m1, mut d1) = (start.year() as i64, start.month() as i64, start.day_of_month() as i64);
                let (y2, m2, mut d2) = (end.year() as i64, end.month() as i64, end.day_of_month() as i64);
                if d2 == 31 && d1 >= 30 {
                    d2 = 30;
                }
                if d1 == 31 {
                    d1 = 30;
                }
                360 * (y2 - y1) + 30 * (m2 - m1) + (d2 - d1)
            }
            DayCount::ThirtyE360 => {
                let (y1, m1, mut d1) = (start.year() as i64, start.month() as i64, start.day_of_month() as i64);
                let (y2, m2, mut d2) = (end.year() as i64, end.month() as i64, end.day_of_month() as i64);
                if d1 == 31 {
                    d1 = 30;
                }
                if d2 == 31 {
                    d2 = 30;
                }
                360 * (y2 - y1) + 30 * (m2 - m1) + (d2 - d1)
            }
        }
    }

    /// Fraction of a year between `start` and `end`.
    pub fn fraction(self, start: Date, end: Date) -> Time {
        if end <= start {
            return if end == start {
                0.0
            } else {
                -self.fraction(end, start)
            };
        }
        match self {
            DayCount::Act360 => self.days(start, end) as Real / 360.0,
            DayCount::Act365Fixed => self.days(start, end) as Real / 365.0,
            DayCount::Thirty360Us | DayCount::ThirtyE360 => {
                self.days(start, end) as Real / 360.0
            }
            DayCount::ActActIsda => {
                let y1 = start.year();
                let y2 = end.year();
                if y1 == y2 {
                    let basis = if is_leap_year(y1) { 366.0 } else { 365.0 };
                    return (end - start) as Real / basis;
                }
                let jan1 = Date::from_ymd(y1 + 1, 1, 1).expect("valid date");
                let basis = if is_leap_year(y1) { 366.0 } else { 365.0 };
                (jan1 - start) as Real / basis + self.fraction(jan1, end)
            }
        }
    }
}
