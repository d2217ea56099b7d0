//! # rf-time
//!
//! Date and day-count arithmetic for riskflow.
//!
//! Provides the serial-number [`Date`] type, the closed [`DayCount`]
//! convention enum, and the [`TimeUnit`] / [`Frequency`] period enums used
//! by compounding and time-grid logic. Business-day calendars and schedule
//! rolling are external collaborators and have no representation here.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod date;
pub mod day_count;

pub use date::Date;
pub use day_count::DayCount;

/// A calendar time unit for date arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    /// Calendar days.
    Days,
    /// Calendar weeks (7 days).
    Weeks,
    /// Calendar months (day-of-month clamped to month end).
    Months,
    /// Calendar years.
    Years,
}

impl std::fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TimeUnit::Days => "days",
            TimeUnit::Weeks => "weeks",
            TimeUnit::Months => "months",
            TimeUnit::Years => "years",
        };
        write!(f, "{s}")
    }
}

/// Payment or compounding frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Frequency {
    /// Once per year.
    Annual,
    /// Twice per year.
    SemiAnnual,
    /// Four times per year.
    Quarterly,
    /// Twelve times per year.
    Monthly,
    /// Fifty-two times per year.
    Weekly,
    /// Every calendar day.
    Daily,
}

impl Frequency {
    /// Number of periods per year.
    pub fn per_year(self) -> u32 {
        match self {
            Frequency::Annual => 1,
            Frequency::SemiAnnual => 2,
            Frequency::Quarterly => 4,
            Frequency::Monthly => 12,
            Frequency::Weekly => 52,
            Frequency::Daily => 365,
        }
    }
}
