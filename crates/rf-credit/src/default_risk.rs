//! Survival-weighted discounting and default-contingent integrals.

use rf_cashflows::{InterestTerms, Payment, PaymentSchedule, RateEnv};
use rf_core::{ensure, Probability, Real, Result};
use rf_curves::{DiscountFactors, SurvivalProbabilities};
use rf_time::{Date, DayCount, TimeUnit};

/// Sub-intervals shorter than this (in year-fraction terms) use the
/// trapezoidal fallback instead of the rate decomposition.
const TINY_INTERVAL: Real = 1e-10;

/// Combined hazard-plus-rate magnitudes below this use the zero-rate limit
/// of the closed forms.
const TINY_RATE: Real = 1e-12;

/// Per-sub-interval formula for default-contingent integrals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AccrualApproximation {
    /// Trapezoidal: average discount factor times the survival drop.
    Linear,
    /// Piecewise-constant hazard and interest rate fitted per
    /// sub-interval, integrated in closed form.
    #[default]
    LogLinear,
}

/// A uniform time grid for splitting a risk window into sub-intervals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeGrid {
    step: i32,
    unit: TimeUnit,
}

impl TimeGrid {
    /// A grid stepping by `step` of `unit` from the window start.
    pub fn new(step: i32, unit: TimeUnit) -> Result<Self> {
        ensure!(step > 0, "time grid step must be positive, got {step}");
        Ok(Self { step, unit })
    }

    /// Grid nodes over `[begin, end]`: `begin`, `begin + step`,
    /// `begin + 2·step`, …, with `end` always the final node.
    pub fn grid(&self, begin: Date, end: Date) -> Result<Vec<Date>> {
        ensure!(begin < end, "time grid needs begin < end, got [{begin}, {end}]");
        let mut nodes = vec![begin];
        let mut i = 1;
        loop {
            // A step past the representable date range is past `end` too.
            match begin.add(i * self.step, self.unit) {
                Ok(node) if node < end => nodes.push(node),
                _ => {
                    nodes.push(end);
                    return Ok(nodes);
                }
            }
            i += 1;
        }
    }
}

/// Survival-weighted discounting engine.
///
/// Immutable after construction: curves, normalization, the optional
/// default date, and the approximation mode are fixed up front, and every
/// query is a pure function of its arguments.
///
/// Survival probabilities are normalized so that the risk-begin date maps
/// to exactly one; a curve whose reference predates the risk-begin date is
/// thereby re-based without recalibration.
pub struct DefaultRiskCalculator<'c> {
    credit: &'c dyn SurvivalProbabilities,
    prepay: Option<&'c dyn SurvivalProbabilities>,
    risk_begin: Date,
    initial_survival: Real,
    default_date: Option<Date>,
    pays_accrual_on_default: bool,
    include_default_date: bool,
    approximation: AccrualApproximation,
    time_grid: Option<TimeGrid>,
    day_count: DayCount,
    include_end_date_protection: bool,
    end_date_protection_shift: i32,
}

impl<'c> DefaultRiskCalculator<'c> {
    /// Create a calculator over a credit survival curve, normalized at
    /// `risk_begin`.
    pub fn new(credit: &'c dyn SurvivalProbabilities, risk_begin: Date) -> Result<Self> {
        let initial_survival = credit.survival(risk_begin);
        ensure!(
            initial_survival > 0.0,
            "credit curve survival at {risk_begin} must be positive, got {initial_survival}"
        );
        Ok(Self {
            credit,
            prepay: None,
            risk_begin,
            initial_survival,
            default_date: None,
            pays_accrual_on_default: false,
            include_default_date: false,
            approximation: AccrualApproximation::default(),
            time_grid: None,
            day_count: DayCount::Act365Fixed,
            include_end_date_protection: false,
            end_date_protection_shift: 1,
        })
    }

    /// Attach a prepay/counterparty survival curve. The normalization is
    /// recomputed over the combined survival at the risk-begin date.
    pub fn with_prepay_curve(mut self, prepay: &'c dyn SurvivalProbabilities) -> Result<Self> {
        let combined =
            self.credit.survival(self.risk_begin) + prepay.survival(self.risk_begin) - 1.0;
        ensure!(
            combined > 0.0,
            "combined survival at {} must be positive, got {combined}",
            self.risk_begin
        );
        self.prepay = Some(prepay);
        self.initial_survival = combined;
        Ok(self)
    }

    /// Fix a known default date: survival drops to zero past it.
    pub fn with_default_date(mut self, date: Date) -> Self {
        self.default_date = Some(date);
        self
    }

    /// Treat the default date itself as defaulted (survival zero at the
    /// date, not only after it).
    pub fn with_include_default_date(mut self, include: bool) -> Self {
        self.include_default_date = include;
        self
    }

    /// Whether schedule valuation adds the expected accrual paid at
    /// default for interest payments.
    pub fn with_accrual_on_default(mut self, pays: bool) -> Self {
        self.pays_accrual_on_default = pays;
        self
    }

    /// Select the per-sub-interval integral formula.
    pub fn with_approximation(mut self, approximation: AccrualApproximation) -> Self {
        self.approximation = approximation;
        self
    }

    /// Split risk windows on a uniform time grid instead of evaluating one
    /// closed form over the whole window.
    pub fn with_time_grid(mut self, grid: TimeGrid) -> Self {
        self.time_grid = Some(grid);
        self
    }

    /// Day count used for the hazard/rate decomposition time fractions.
    pub fn with_day_count(mut self, day_count: DayCount) -> Self {
        self.day_count = day_count;
        self
    }

    /// Cover a default falling on the risk-end date itself: risky
    /// discounting and default-contingent valuation extend their risk
    /// windows by the configured shift.
    pub fn with_end_date_protection(mut self, include: bool) -> Self {
        self.include_end_date_protection = include;
        self
    }

    /// Calendar-day shift applied to the window end when end-date
    /// protection is requested. Defaults to one day.
    pub fn with_end_date_protection_shift(mut self, days: i32) -> Self {
        self.end_date_protection_shift = days;
        self
    }

    /// The risk-begin (normalization) date.
    pub fn risk_begin(&self) -> Date {
        self.risk_begin
    }

    /// Survival probability at a date, normalized to one at the risk-begin
    /// date.
    ///
    /// Returns exactly 1 at or before the risk-begin date and exactly 0
    /// past a fixed default date. With a prepay curve, the two survival
    /// probabilities combine as `credit + prepay − 1`; the evaluation is
    /// split into three algebraically identical branches so that the
    /// subtraction never cancels two near-one values.
    pub fn survival_probability(&self, date: Date) -> Probability {
        if date <= self.risk_begin {
            return 1.0;
        }
        if let Some(default_date) = self.default_date {
            let defaulted = if self.include_default_date {
                date >= default_date
            } else {
                date > default_date
            };
            if defaulted {
                return 0.0;
            }
        }
        let credit_sp = self.credit.survival(date);
        let init = self.initial_survival;
        match self.prepay {
            None => credit_sp / init,
            Some(prepay) => {
                let prepay_sp = prepay.survival(date);
                if prepay_sp > 0.5 {
                    credit_sp / init + (prepay_sp - 1.0) / init
                } else if credit_sp > 0.5 {
                    (credit_sp - 1.0) / init + prepay_sp / init
                } else {
                    (credit_sp + prepay_sp - 1.0) / init
                }
            }
        }
    }

    /// Risky discount factor for a payment: discount at the pay date times
    /// normalized survival, blended over the accrual period for interest
    /// kinds.
    ///
    /// With end-date protection the survival is read at the credit-risk
    /// end date pushed out by the configured shift.
    pub fn risky_discount(
        &self,
        payment: &Payment,
        discount: &dyn DiscountFactors,
    ) -> Result<Real> {
        let risk_end = self.protected_risk_end(payment.credit_risk_end())?;
        Ok(payment.risky_discount_until(risk_end, discount, self))
    }

    /// The credit-risk end date with the end-date-protection shift applied
    /// when the calculator is configured for it.
    fn protected_risk_end(&self, risk_end: Date) -> Result<Date> {
        if self.include_end_date_protection {
            risk_end.add_days(self.end_date_protection_shift)
        } else {
            Ok(risk_end)
        }
    }

    /// Expected accrued year-fraction paid at default over the payment's
    /// accrual-risk window `[max(risk_begin, accrual_start), risk_end]`,
    /// discounted to the valuation date.
    ///
    /// The result is in year-fraction units: multiply by rate and notional
    /// to get a cash present value.
    pub fn accrual_on_default(
        &self,
        interest: &InterestTerms,
        risk_end: Date,
        discount: &dyn DiscountFactors,
    ) -> Result<Real> {
        let begin = self.risk_begin.max(interest.accrual_start);
        if begin >= risk_end {
            return Ok(0.0);
        }
        let mut total = 0.0;
        for (d0, d1) in self.sub_intervals(begin, risk_end)? {
            let a0 = interest.day_count.fraction(interest.accrual_start, d0);
            let a1 = interest.day_count.fraction(interest.accrual_start, d1);
            total += self.accrual_piece(d0, d1, a0, a1, discount);
        }
        Ok(total)
    }

    /// Present value of a unit payment made at the moment of default, for
    /// defaults inside `[begin, end)`.
    ///
    /// With `include_end_date_protection` the window end is pushed out by
    /// the configured shift so a default on the end date itself is
    /// covered.
    ///
    /// Summing over any partition of the window into consecutive
    /// sub-intervals reproduces the whole-window value, so results do not
    /// depend on the grid choice for curves that are log-linear between
    /// nodes.
    pub fn protection(
        &self,
        begin: Date,
        end: Date,
        include_end_date_protection: bool,
        discount: &dyn DiscountFactors,
    ) -> Result<Real> {
        let end = if include_end_date_protection {
            end.add_days(self.end_date_protection_shift)?
        } else {
            end
        };
        let begin = begin.max(self.risk_begin);
        if begin >= end {
            return Ok(0.0);
        }
        let mut total = 0.0;
        for (d0, d1) in self.sub_intervals(begin, end)? {
            total += self.protection_piece(d0, d1, discount);
        }
        Ok(total)
    }

    /// Risk-adjusted present value of one payment.
    ///
    /// Interest and one-time kinds discount on survival; default-contingent
    /// kinds weight by the default probability over their reference window;
    /// interest kinds additionally earn the expected accrual paid at
    /// default when the calculator is configured to pay it.
    pub fn payment_pv(
        &self,
        payment: &Payment,
        discount: &dyn DiscountFactors,
        env: &RateEnv,
    ) -> Result<Real> {
        let amount = payment.amount(env)?;
        let protect_end = self.include_end_date_protection;
        match payment {
            Payment::CreditContingent(p) => {
                Ok(amount * self.protection(p.begin, p.end, protect_end, discount)?)
            }
            Payment::Recovery(p) => {
                Ok(amount * self.protection(p.begin, p.end, protect_end, discount)?)
            }
            Payment::DefaultSettlement(_) => Ok(amount
                * self.protection(
                    self.risk_begin,
                    payment.credit_risk_end(),
                    protect_end,
                    discount,
                )?),
            _ => {
                let mut pv = amount * self.risky_discount(payment, discount)?;
                if self.pays_accrual_on_default {
                    if let Some(interest) = payment.interest() {
                        let fraction = interest.accrual_factor();
                        if fraction > 0.0 {
                            let accrued = self.accrual_on_default(
                                interest,
                                payment.credit_risk_end(),
                                discount,
                            )?;
                            // amount / fraction recovers rate × notional.
                            pv += amount / fraction * accrued;
                        }
                    }
                }
                Ok(pv)
            }
        }
    }

    /// Risk-adjusted present value of a whole schedule, ascending by pay
    /// date, insertion order within a date.
    pub fn schedule_pv(
        &self,
        schedule: &PaymentSchedule,
        discount: &dyn DiscountFactors,
        env: &RateEnv,
    ) -> Result<Real> {
        let mut pv = 0.0;
        for payment in schedule.iter() {
            pv += self.payment_pv(payment, discount, env)?;
        }
        Ok(pv)
    }

    /// The risk window split on the configured grid, or the whole window
    /// when no grid is set.
    fn sub_intervals(&self, begin: Date, end: Date) -> Result<Vec<(Date, Date)>> {
        let nodes = match self.time_grid {
            Some(grid) => grid.grid(begin, end)?,
            None => vec![begin, end],
        };
        Ok(nodes.windows(2).map(|w| (w[0], w[1])).collect())
    }

    /// Protection integral over one sub-interval.
    ///
    /// Log-linear mode fits a constant hazard `h = −ln(S₁/S₀)/Δt` and a
    /// constant rate `r = −ln(D₁/D₀)/Δt`, then evaluates
    /// `(h/(h+r))·D₀S₀·(1 − e^{−(h+r)Δt})` exactly.
    fn protection_piece(&self, d0: Date, d1: Date, discount: &dyn DiscountFactors) -> Real {
        let s0 = self.survival_probability(d0);
        let s1 = self.survival_probability(d1);
        let df0 = discount.discount(d0);
        let df1 = discount.discount(d1);
        let linear = || 0.5 * (df0 + df1) * (s0 - s1);
        if self.approximation == AccrualApproximation::Linear {
            return linear();
        }
        if s0 <= 0.0 || df0 <= 0.0 {
            return 0.0;
        }
        let dt = self.day_count.fraction(d0, d1);
        if dt < TINY_INTERVAL {
            return linear();
        }
        let survival_ratio = s1 / s0;
        if survival_ratio <= 0.0 {
            // Infinite hazard: default is certain at the interval start.
            return s0 * df0;
        }
        let discount_ratio = df1 / df0;
        if discount_ratio <= 0.0 {
            // Infinite interest rate: the payoff discounts to nothing.
            return 0.0;
        }
        let hazard = -survival_ratio.ln() / dt;
        let rate = -discount_ratio.ln() / dt;
        let combined = hazard + rate;
        if combined.abs() < TINY_RATE {
            return hazard * df0 * s0 * dt;
        }
        (hazard / combined) * df0 * s0 * (1.0 - (-combined * dt).exp())
    }

    /// Accrual-on-default integral over one sub-interval, where `a₀`/`a₁`
    /// are the year fractions accrued at the interval boundaries:
    ///
    /// ```text
    /// (h/(h+r))·D₀S₀·(a₀ − a₁e^{−(h+r)Δt} + (1 − e^{−(h+r)Δt})/(h+r))
    /// ```
    fn accrual_piece(
        &self,
        d0: Date,
        d1: Date,
        a0: Real,
        a1: Real,
        discount: &dyn DiscountFactors,
    ) -> Real {
        let s0 = self.survival_probability(d0);
        let s1 = self.survival_probability(d1);
        let df0 = discount.discount(d0);
        let df1 = discount.discount(d1);
        let linear = || 0.5 * (a0 + a1) * 0.5 * (df0 + df1) * (s0 - s1);
        if self.approximation == AccrualApproximation::Linear {
            return linear();
        }
        if s0 <= 0.0 || df0 <= 0.0 {
            return 0.0;
        }
        let dt = self.day_count.fraction(d0, d1);
        if dt < TINY_INTERVAL {
            return linear();
        }
        let survival_ratio = s1 / s0;
        if survival_ratio <= 0.0 {
            return s0 * df0 * a0;
        }
        let discount_ratio = df1 / df0;
        if discount_ratio <= 0.0 {
            return 0.0;
        }
        let hazard = -survival_ratio.ln() / dt;
        let rate = -discount_ratio.ln() / dt;
        let combined = hazard + rate;
        if combined.abs() < TINY_RATE {
            // Zero-rate limit of the closed form.
            return hazard * df0 * s0 * (a0 * dt + 0.5 * dt * dt);
        }
        let decay = (-combined * dt).exp();
        (hazard / combined) * df0 * s0 * (a0 - a1 * decay + (1.0 - decay) / combined)
    }
}

impl SurvivalProbabilities for DefaultRiskCalculator<'_> {
    fn survival(&self, date: Date) -> Probability {
        self.survival_probability(date)
    }
}
