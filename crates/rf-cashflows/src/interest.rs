//! Interest-bearing payments: shared accrual terms and the fixed-rate kind.

use crate::payment::{Accrued, PaymentTerms};
use rf_core::{Rate, Real};
use rf_time::{Date, DayCount, Frequency};

/// Accrual terms shared by fixed and floating interest payments.
#[derive(Debug, Clone, PartialEq)]
pub struct InterestTerms {
    /// Pay date of the previous interest payment, if any.
    pub previous_pay_date: Option<Date>,
    /// Start of the coupon cycle (may differ from the accrual start for
    /// stub periods).
    pub cycle_start: Date,
    /// End of the coupon cycle.
    pub cycle_end: Date,
    /// Start of the accrual period.
    pub accrual_start: Date,
    /// End of the accrual period.
    pub accrual_end: Date,
    /// Ex-dividend cutoff, if the market has one.
    pub ex_dividend_date: Option<Date>,
    /// Notional the coupon accrues on.
    pub notional: Real,
    /// Day-count convention for the accrual factor.
    pub day_count: DayCount,
    /// Compounding frequency of the sub-periods, when the coupon compounds.
    pub compounding_frequency: Option<Frequency>,
    /// Blend weight in [0, 1] approximating the expected default time
    /// within the period (0 = end-of-period default assumption).
    pub accrued_fraction_at_default: Real,
}

impl InterestTerms {
    /// Create terms for an accrual period; the cycle defaults to the
    /// accrual period.
    pub fn new(accrual_start: Date, accrual_end: Date, notional: Real, day_count: DayCount) -> Self {
        Self {
            previous_pay_date: None,
            cycle_start: accrual_start,
            cycle_end: accrual_end,
            accrual_start,
            accrual_end,
            ex_dividend_date: None,
            notional,
            day_count,
            compounding_frequency: None,
            accrued_fraction_at_default: 0.0,
        }
    }

    /// Set the accrued-fraction-at-default blend weight.
    pub fn with_accrued_fraction_at_default(mut self, fraction: Real) -> Self {
        self.accrued_fraction_at_default = fraction;
        self
    }

    /// Set the compounding frequency.
    pub fn with_compounding_frequency(mut self, frequency: Frequency) -> Self {
        self.compounding_frequency = Some(frequency);
        self
    }

    /// Set the previous payment date.
    pub fn with_previous_pay_date(mut self, date: Date) -> Self {
        self.previous_pay_date = Some(date);
        self
    }

    /// Day-count fraction of the full accrual period.
    pub fn accrual_factor(&self) -> Real {
        self.day_count.fraction(self.accrual_start, self.accrual_end)
    }

    /// Linearly prorate `full_amount` by the day-count fraction elapsed at
    /// `as_of`. Before the period start nothing has accrued.
    pub fn prorate(&self, full_amount: Real, as_of: Date) -> Accrued {
        if as_of <= self.accrual_start {
            return Accrued {
                accrued: 0.0,
                remaining: full_amount,
            };
        }
        if as_of >= self.accrual_end {
            return Accrued {
                accrued: full_amount,
                remaining: 0.0,
            };
        }
        let full = self.accrual_factor();
        if full <= 0.0 {
            return Accrued {
                accrued: full_amount,
                remaining: 0.0,
            };
        }
        let elapsed = self.day_count.fraction(self.accrual_start, as_of) / full;
        let accrued = full_amount * elapsed;
        Accrued {
            accrued,
            remaining: full_amount - accrued,
        }
    }
}

/// A fixed coupon rate: a single value or a step schedule.
#[derive(Debug, Clone, PartialEq)]
pub enum CouponRate {
    /// One rate over the whole period.
    Fixed(Rate),
    /// A right-open step schedule: `(from_date, rate)` pairs in ascending
    /// date order; each rate applies from its date to the next entry's.
    Schedule(Vec<(Date, Rate)>),
}

/// A fixed-rate interest payment.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedInterestPayment {
    /// Shared payment terms.
    pub terms: PaymentTerms,
    /// Shared accrual terms.
    pub interest: InterestTerms,
    /// The coupon rate.
    pub rate: CouponRate,
}

impl FixedInterestPayment {
    /// Create a fixed coupon.
    pub fn new(terms: PaymentTerms, interest: InterestTerms, rate: Rate) -> Self {
        Self {
            terms,
            interest,
            rate: CouponRate::Fixed(rate),
        }
    }

    /// Create a coupon over a step schedule of rates.
    pub fn with_rate_schedule(
        terms: PaymentTerms,
        interest: InterestTerms,
        schedule: Vec<(Date, Rate)>,
    ) -> Self {
        Self {
            terms,
            interest,
            rate: CouponRate::Schedule(schedule),
        }
    }

    /// The effective coupon rate: the fixed rate, or the time-weighted
    /// average of the step schedule over the accrual period.
    pub fn effective_rate(&self) -> Rate {
        match &self.rate {
            CouponRate::Fixed(r) => *r,
            CouponRate::Schedule(steps) => {
                if steps.is_empty() {
                    return 0.0;
                }
                let dc = self.interest.day_count;
                let (start, end) = (self.interest.accrual_start, self.interest.accrual_end);
                let total = dc.fraction(start, end);
                if total <= 0.0 {
                    return steps[0].1;
                }
                let mut weighted = 0.0;
                for (i, &(from, rate)) in steps.iter().enumerate() {
                    // Rates before the first step date extend backwards.
                    let seg_start = if i == 0 { start } else { from.max(start) };
                    let seg_end = match steps.get(i + 1) {
                        Some(&(next, _)) => next.min(end),
                        None => end,
                    };
                    if seg_end > seg_start {
                        weighted += rate * dc.fraction(seg_start, seg_end);
                    }
                }
                weighted / total
            }
        }
    }

    /// `rate × notional × accrual factor`.
    pub fn compute_amount(&self) -> Real {
        self.effective_rate() * self.interest.notional * self.interest.accrual_factor()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payment::Currency;
    use approx::assert_abs_diff_eq;

    fn date(y: u16, m: u8, d: u8) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    fn coupon(start: Date, end: Date, dc: DayCount, notional: Real, rate: Rate) -> FixedInterestPayment {
        FixedInterestPayment::new(
            PaymentTerms::new(end, Currency::USD),
            InterestTerms::new(start, end, notional, dc),
            rate,
        )
    }

    #[test]
    fn fixed_coupon_thirty360_quarter() {
        // 30/360 gives exactly 90/360 over a Jan-Apr quarter.
        let c = coupon(
            date(2024, 1, 1),
            date(2024, 4, 1),
            DayCount::Thirty360Us,
            1_000_000.0,
            0.05,
        );
        assert_abs_diff_eq!(c.compute_amount(), 12_500.0, epsilon = 1e-9);
    }

    #[test]
    fn fixed_coupon_act360_quarter() {
        // A true 90-day window under Act/360.
        let c = coupon(
            date(2024, 1, 2),
            date(2024, 4, 1),
            DayCount::Act360,
            1_000_000.0,
            0.05,
        );
        assert_abs_diff_eq!(c.compute_amount(), 12_500.0, epsilon = 1e-9);
    }

    #[test]
    fn step_schedule_time_weighted_average() {
        // 4% for the first half-year, 6% for the second (Act/365F, 2025).
        let start = date(2025, 1, 1);
        let switch = date(2025, 7, 2); // 182 days in
        let end = date(2026, 1, 1);
        let c = FixedInterestPayment::with_rate_schedule(
            PaymentTerms::new(end, Currency::USD),
            InterestTerms::new(start, end, 100.0, DayCount::Act365Fixed),
            vec![(start, 0.04), (switch, 0.06)],
        );
        let expected = (0.04 * 182.0 + 0.06 * 183.0) / 365.0;
        assert_abs_diff_eq!(c.effective_rate(), expected, epsilon = 1e-12);
    }

    #[test]
    fn step_schedule_first_rate_extends_backwards() {
        let start = date(2025, 1, 1);
        let end = date(2025, 7, 1);
        let c = FixedInterestPayment::with_rate_schedule(
            PaymentTerms::new(end, Currency::USD),
            InterestTerms::new(start, end, 100.0, DayCount::Act365Fixed),
            vec![(date(2025, 3, 1), 0.05)],
        );
        assert_abs_diff_eq!(c.effective_rate(), 0.05, epsilon = 1e-12);
    }

    #[test]
    fn proration_boundaries() {
        let it = InterestTerms::new(date(2025, 1, 1), date(2025, 7, 1), 100.0, DayCount::Act360);

        let before = it.prorate(100.0, date(2024, 12, 1));
        assert_eq!(before.accrued, 0.0);
        assert_eq!(before.remaining, 100.0);

        let at_start = it.prorate(100.0, date(2025, 1, 1));
        assert_eq!(at_start.accrued, 0.0);

        let after = it.prorate(100.0, date(2025, 8, 1));
        assert_eq!(after.accrued, 100.0);
        assert_eq!(after.remaining, 0.0);
    }

    #[test]
    fn proration_is_linear_in_days() {
        let it = InterestTerms::new(date(2025, 1, 1), date(2025, 1, 11), 100.0, DayCount::Act360);
        let mid = it.prorate(50.0, date(2025, 1, 4)); // 3 of 10 days
        assert_abs_diff_eq!(mid.accrued, 15.0, epsilon = 1e-12);
        assert_abs_diff_eq!(mid.remaining, 35.0, epsilon = 1e-12);
    }
}
