//! Floating-rate interest payments and the compounding engine.
//!
//! A floating coupon owns one or more compounding sub-periods, each tied to
//! a [`FixingSchedule`]. The engine turns the resolved fixings plus a
//! spread, a spread-application mode, and a compounding convention into a
//! single effective period rate, optionally convexity-adjusted and
//! capped/floored while the fixings are still projections.

use crate::fixing::{Fixing, FixingSchedule, ResetState};
use crate::interest::InterestTerms;
use crate::payment::{PaymentTerms, RateEnv};
use crate::simulation::CashflowNode;
use rf_core::{ensure, Error, Rate, Real, Result, Spread};
use rf_time::Frequency;

/// How multiple rate fixings within one payment period combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CompoundingMethod {
    /// No compounding: a single sub-period only.
    #[default]
    None,
    /// Simple summation of `(fixing + spread) × fraction` terms.
    Simple,
    /// ISDA compounding: the spread compounds with the rate.
    Isda,
    /// Flat-ISDA compounding: the spread is excluded from the
    /// compounding base.
    FlatIsda,
}

/// How the spread applies to the projected rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SpreadMode {
    /// `rate = forward × multiplier + spread`.
    #[default]
    Additive,
    /// `rate = forward × multiplier × spread` (spread acts as a coupon
    /// multiplier; a value of exactly zero is treated as one).
    Multiplicative,
}

/// One compounding sub-period and its rate observation handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubPeriod {
    /// Sub-period start.
    pub start: rf_time::Date,
    /// Sub-period end.
    pub end: rf_time::Date,
    /// Handle to the rate observation for this sub-period.
    pub schedule: FixingSchedule,
}

impl SubPeriod {
    /// Create a sub-period resetting at its start.
    pub fn new(start: rf_time::Date, end: rf_time::Date) -> Self {
        Self {
            start,
            end,
            schedule: FixingSchedule::new(start, end),
        }
    }

    /// Override the fixing schedule.
    pub fn with_schedule(mut self, schedule: FixingSchedule) -> Self {
        self.schedule = schedule;
        self
    }
}

/// A floating-rate interest payment.
#[derive(Debug, Clone, PartialEq)]
pub struct FloatingInterestPayment {
    /// Shared payment terms.
    pub terms: PaymentTerms,
    /// Shared accrual terms.
    pub interest: InterestTerms,
    sub_periods: Vec<SubPeriod>,
    spread: Spread,
    spread_mode: SpreadMode,
    compounding: CompoundingMethod,
    index_multiplier: Option<Real>,
    cap: Option<Rate>,
    floor: Option<Rate>,
    use_discount_rate_for_compounding: bool,
}

impl FloatingInterestPayment {
    /// Create a floating coupon over the given compounding sub-periods.
    /// The sub-period list is fixed at construction.
    pub fn new(
        terms: PaymentTerms,
        interest: InterestTerms,
        sub_periods: Vec<SubPeriod>,
        spread: Spread,
    ) -> Result<Self> {
        ensure!(
            !sub_periods.is_empty(),
            "a floating payment needs at least one compounding sub-period"
        );
        ensure!(
            sub_periods.iter().all(|sp| sp.start < sp.end),
            "compounding sub-periods must have positive length"
        );
        Ok(Self {
            terms,
            interest,
            sub_periods,
            spread,
            spread_mode: SpreadMode::Additive,
            compounding: CompoundingMethod::None,
            index_multiplier: None,
            cap: None,
            floor: None,
            use_discount_rate_for_compounding: false,
        })
    }

    /// Set the compounding convention.
    pub fn with_compounding(mut self, method: CompoundingMethod) -> Self {
        self.compounding = method;
        self
    }

    /// Set the spread-application mode.
    pub fn with_spread_mode(mut self, mode: SpreadMode) -> Self {
        self.spread_mode = mode;
        self
    }

    /// Set an index multiplier (gearing).
    pub fn with_index_multiplier(mut self, multiplier: Real) -> Self {
        self.index_multiplier = Some(multiplier);
        self
    }

    /// Set a cap on the effective rate (applied while projected).
    pub fn with_cap(mut self, cap: Rate) -> Self {
        self.cap = Some(cap);
        self
    }

    /// Set a floor on the effective rate (applied while projected).
    pub fn with_floor(mut self, floor: Rate) -> Self {
        self.floor = Some(floor);
        self
    }

    /// Use the discount-curve-implied forward as the compounding base.
    pub fn with_discount_rate_compounding(mut self, enabled: bool) -> Self {
        self.use_discount_rate_for_compounding = enabled;
        self
    }

    /// The index multiplier, defaulting to 1 when unset.
    pub fn index_multiplier(&self) -> Real {
        self.index_multiplier.unwrap_or(1.0)
    }

    /// The compounding sub-periods.
    pub fn sub_periods(&self) -> &[SubPeriod] {
        &self.sub_periods
    }

    /// The spread.
    pub fn spread(&self) -> Spread {
        self.spread
    }

    /// Resolve all sub-period fixings.
    fn resolved_fixings(&self, env: &RateEnv) -> Result<Vec<Fixing>> {
        self.sub_periods
            .iter()
            .map(|sp| env.projector.fixing(&sp.schedule))
            .collect()
    }

    /// Overall reset state: `Missing` dominates, then `IsProjected` if any
    /// sub-period is still a projection, else `ObservationFound`.
    pub fn reset_state(&self, env: &RateEnv) -> Result<ResetState> {
        let fixings = self.resolved_fixings(env)?;
        Ok(fold_reset_state(&fixings))
    }

    /// The effective period rate.
    ///
    /// Failures other than a missing fixing are annotated with the pay
    /// date; a missing fixing propagates verbatim.
    pub fn effective_rate(&self, env: &RateEnv) -> Result<Rate> {
        self.effective_rate_impl(env)
            .map_err(|e| e.in_payment(self.terms.pay_date))
    }

    /// `effective rate × notional × accrual factor`.
    pub fn compute_amount(&self, env: &RateEnv) -> Result<Real> {
        Ok(self.effective_rate(env)? * self.interest.notional * self.interest.accrual_factor())
    }

    fn effective_rate_impl(&self, env: &RateEnv) -> Result<Rate> {
        let fixings = self.resolved_fixings(env)?;
        for (sp, fixing) in self.sub_periods.iter().zip(&fixings) {
            if !fixing.state.is_resolved() {
                return Err(Error::MissingFixing(format!(
                    "no rate observed for reset on {}",
                    sp.schedule.reset_date
                )));
            }
        }
        if self.sub_periods.len() == 1 {
            self.single_period_rate(env, &fixings[0])
        } else {
            self.compounded_rate(env, &fixings)
        }
    }

    /// Single sub-period, no compounding: `f·m + s` (or `f·m·s`
    /// multiplicative), with convexity and cap/floor add-ons applied only
    /// while the fixing is still a projection.
    fn single_period_rate(&self, env: &RateEnv, fixing: &Fixing) -> Result<Rate> {
        let schedule = &self.sub_periods[0].schedule;
        let m = self.index_multiplier();
        let observed = fixing.state.is_observed();

        let mut forward = fixing.forward;
        if !observed {
            if let Some(adjuster) = env.adjuster {
                forward += adjuster.convexity_adjustment(self.terms.pay_date, schedule, fixing)?;
            }
        }

        let mut rate = match self.spread_mode {
            SpreadMode::Additive => forward * m + self.spread,
            SpreadMode::Multiplicative => forward * m * coupon_factor(self.spread),
        };

        if !observed {
            if let Some(cap) = self.cap {
                let level = match env.adjuster {
                    Some(a) => a.cap_value(cap, schedule, fixing)?,
                    None => cap,
                };
                rate = rate.min(level);
            }
            if let Some(floor) = self.floor {
                let level = match env.adjuster {
                    Some(a) => a.floor_value(floor, schedule, fixing)?,
                    None => floor,
                };
                rate = rate.max(level);
            }
        }
        Ok(rate)
    }

    /// Multiple sub-periods: run the compounding recurrence (or the daily
    /// fast path), difference in the convexity adjustment, then apply the
    /// multiplicative spread post-scale.
    fn compounded_rate(&self, env: &RateEnv, fixings: &[Fixing]) -> Result<Rate> {
        if self.compounding == CompoundingMethod::None {
            return Err(Error::Unsupported(format!(
                "compounding convention None cannot combine {} sub-periods",
                self.sub_periods.len()
            )));
        }
        let period_fraction = self.interest.accrual_factor();
        ensure!(
            period_fraction > 0.0,
            "accrual period [{}, {}) has non-positive day-count fraction",
            self.interest.accrual_start,
            self.interest.accrual_end
        );

        let spread = match self.spread_mode {
            SpreadMode::Additive => self.spread,
            SpreadMode::Multiplicative => 0.0,
        };

        let (compounded, convexity) = if self.daily_fast_path_applies(env, fixings) {
            (self.approximate_daily_compounded(env, spread)?, 0.0)
        } else {
            let dc = self.interest.day_count;
            let fractions: Vec<Real> = self
                .sub_periods
                .iter()
                .map(|sp| dc.fraction(sp.start, sp.end))
                .collect();
            let forwards: Vec<Real> = fixings.iter().map(|f| f.forward).collect();
            let base: Vec<Real> = if self.use_discount_rate_for_compounding {
                self.sub_periods
                    .iter()
                    .map(|sp| env.projector.implied_forward(sp.start, sp.end, dc))
                    .collect::<Result<_>>()?
            } else {
                forwards.clone()
            };

            let compounded = self.run_recurrence(&forwards, &base, &fractions, spread);

            let convexity = match env.adjuster {
                Some(adjuster) => {
                    let mut adjusted = forwards.clone();
                    for i in 0..adjusted.len() {
                        if !fixings[i].state.is_observed() {
                            adjusted[i] += adjuster.convexity_adjustment(
                                self.terms.pay_date,
                                &self.sub_periods[i].schedule,
                                &fixings[i],
                            )?;
                        }
                    }
                    let adjusted_base = if self.use_discount_rate_for_compounding {
                        base
                    } else {
                        adjusted.clone()
                    };
                    self.run_recurrence(&adjusted, &adjusted_base, &fractions, spread) - compounded
                }
                None => 0.0,
            };
            (compounded, convexity)
        };

        let scale = match self.spread_mode {
            SpreadMode::Additive => 1.0,
            SpreadMode::Multiplicative => coupon_factor(self.spread),
        };
        Ok((compounded * scale + convexity * scale) / period_fraction)
    }

    /// The compounding recurrence over sub-periods:
    ///
    /// ```text
    /// acc[i] = acc[i-1]
    ///        + (forward[i]·m + c)·frac[i]
    ///        + acc[i-1]·(base[i]·m + (flat ? 0 : c))·frac[i]
    /// ```
    ///
    /// `Simple` drops the cross term entirely.
    fn run_recurrence(&self, forwards: &[Real], base: &[Real], fractions: &[Real], c: Real) -> Real {
        let m = self.index_multiplier();
        match self.compounding {
            CompoundingMethod::Simple => forwards
                .iter()
                .zip(fractions)
                .map(|(f, fr)| (f * m + c) * fr)
                .sum(),
            CompoundingMethod::Isda | CompoundingMethod::FlatIsda => {
                let cross_spread = if self.compounding == CompoundingMethod::FlatIsda {
                    0.0
                } else {
                    c
                };
                let mut acc = 0.0;
                for i in 0..forwards.len() {
                    acc += (forwards[i] * m + c) * fractions[i]
                        + acc * (base[i] * m + cross_spread) * fractions[i];
                }
                acc
            }
            CompoundingMethod::None => 0.0, // rejected before dispatch
        }
    }

    /// The daily fast path applies when compounding is daily ISDA, every
    /// sub-period is still a projection (reset on or after the projection
    /// as-of date), and no forward adjuster is present.
    fn daily_fast_path_applies(&self, env: &RateEnv, fixings: &[Fixing]) -> bool {
        self.compounding == CompoundingMethod::Isda
            && self.interest.compounding_frequency == Some(Frequency::Daily)
            && env.adjuster.is_none()
            && self
                .sub_periods
                .iter()
                .all(|sp| sp.schedule.reset_date >= env.projector.projection_date())
            && fixings.iter().all(|f| f.state == ResetState::IsProjected)
    }

    /// Closed-form replacement for the daily compounding loop, using the
    /// end-to-end discount factor over the full period:
    ///
    /// ```text
    /// c = (df^(−1/days) − 1)·m + coupon·periodFrac/days
    /// compounded = (1 + c)^days − 1
    /// ```
    fn approximate_daily_compounded(&self, env: &RateEnv, coupon: Real) -> Result<Real> {
        let (start, end) = match (self.sub_periods.first(), self.sub_periods.last()) {
            (Some(first), Some(last)) => (first.start, last.end),
            _ => return Err(Error::InvalidArgument("floating payment has no sub-periods".into())),
        };
        let days = (end - start).max(1);
        let df = env.projector.discount_factor(start, end)?;
        ensure!(df > 0.0, "non-positive discount factor over [{start}, {end})");

        let period_fraction = self.interest.accrual_factor();
        let daily_growth = (df.powf(-1.0 / days as Real) - 1.0) * self.index_multiplier()
            + coupon * period_fraction / days as Real;
        Ok(compound_power(daily_growth, days))
    }

    /// Simulation node: a single-sub-period floating coupon reduces to the
    /// fixing handle plus the scalars needed to recompute the amount.
    pub(crate) fn simulation_node(&self) -> Result<CashflowNode> {
        if self.sub_periods.len() != 1 {
            return Err(Error::Unsupported(
                "cashflow simulation not supported for compounded floating payments".into(),
            ));
        }
        Ok(CashflowNode::FloatingCoupon {
            pay_date: self.terms.pay_date,
            principal: self.interest.notional,
            accrual_factor: self.interest.accrual_factor(),
            multiplier: self.index_multiplier(),
            spread: self.spread,
            schedule: self.sub_periods[0].schedule,
        })
    }
}

/// Fold sub-period fixing states into the payment-level reset state.
pub(crate) fn fold_reset_state(fixings: &[Fixing]) -> ResetState {
    if fixings.iter().any(|f| !f.state.is_resolved()) {
        ResetState::Missing
    } else if fixings.iter().any(|f| f.state == ResetState::IsProjected) {
        ResetState::IsProjected
    } else {
        ResetState::ObservationFound
    }
}

/// A coupon multiplier of exactly zero collapses every rate to zero, so it
/// is treated as one.
fn coupon_factor(coupon: Real) -> Real {
    if coupon == 0.0 {
        1.0
    } else {
        coupon
    }
}

/// Evaluate `(1 + x)^n − 1`.
///
/// For `n > 10` with `|n·x| < 0.1` the direct power loses precision to
/// cancellation, so a truncated binomial series is used instead.
pub fn compound_power(x: Real, n: i32) -> Real {
    let nf = n as Real;
    if n > 10 && (nf * x).abs() < 0.1 {
        let mut term = nf * x;
        let mut sum = term;
        let mut k = 1;
        while k < n && term.abs() > 1e-16 * sum.abs().max(Real::MIN_POSITIVE) {
            term *= (nf - k as Real) / (k as Real + 1.0) * x;
            sum += term;
            k += 1;
        }
        sum
    } else {
        (1.0 + x).powi(n) - 1.0
    }
}
