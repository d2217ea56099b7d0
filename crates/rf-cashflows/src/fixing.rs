//! Rate fixings and the projection boundary.
//!
//! A [`FixingSchedule`] is an opaque handle to one sub-period's rate
//! observation; a [`RateProjector`] resolves it to a [`Fixing`] — either an
//! observed historical reset or a forward projected off a curve. Projection
//! curves themselves are built elsewhere; valuation code only sees these
//! traits.

use rf_core::{ensure, Rate, Real, Result};
use rf_curves::DiscountFactors;
use rf_time::{Date, DayCount};
use std::collections::BTreeMap;

/// How a rate fixing was (or was not) resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResetState {
    /// A historical observation was found for the reset date.
    ObservationFound,
    /// The value is a forward projected off a curve.
    IsProjected,
    /// A required historical observation is absent.
    Missing,
    /// A reset was found through a secondary source.
    ResetFound,
    /// No resolution was attempted.
    None,
}

impl ResetState {
    /// Whether the fixing is already pinned by an observation (as opposed
    /// to being a live projection).
    pub fn is_observed(self) -> bool {
        matches!(self, ResetState::ObservationFound | ResetState::ResetFound)
    }

    /// Whether the fixing carries a usable value at all.
    pub fn is_resolved(self) -> bool {
        !matches!(self, ResetState::Missing | ResetState::None)
    }
}

/// A resolved rate fixing: a forward value plus how it was resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fixing {
    /// The forward (or observed) rate.
    pub forward: Rate,
    /// Resolution state.
    pub state: ResetState,
}

impl Fixing {
    /// A projected fixing.
    pub fn projected(forward: Rate) -> Self {
        Self {
            forward,
            state: ResetState::IsProjected,
        }
    }

    /// An observed fixing.
    pub fn observed(forward: Rate) -> Self {
        Self {
            forward,
            state: ResetState::ObservationFound,
        }
    }

    /// A missing fixing (no usable value).
    pub fn missing() -> Self {
        Self {
            forward: 0.0,
            state: ResetState::Missing,
        }
    }
}

/// Opaque handle to the rate observation for one sub-period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixingSchedule {
    /// The reset (observation) date.
    pub reset_date: Date,
    /// Start of the rate period the fixing applies to.
    pub period_start: Date,
    /// End of the rate period the fixing applies to.
    pub period_end: Date,
}

impl FixingSchedule {
    /// Create a fixing schedule resetting at the period start.
    pub fn new(period_start: Date, period_end: Date) -> Self {
        Self {
            reset_date: period_start,
            period_start,
            period_end,
        }
    }

    /// Override the reset date.
    pub fn with_reset_date(mut self, reset_date: Date) -> Self {
        self.reset_date = reset_date;
        self
    }
}

/// Resolves fixing schedules against a projection source.
pub trait RateProjector {
    /// Resolve a fixing schedule to a fixing.
    ///
    /// A schedule whose reset lies in the past and has no recorded
    /// observation resolves to a [`Fixing::missing`] value rather than an
    /// error; the caller decides whether that fixing was required.
    fn fixing(&self, schedule: &FixingSchedule) -> Result<Fixing>;

    /// The projection as-of date: resets on or after this date are
    /// projected, resets before it must come from observations.
    fn projection_date(&self) -> Date;

    /// Whether an already-recorded observation is preferred over a
    /// projection when both are available.
    fn use_observed_resets(&self) -> bool {
        true
    }

    /// Discount factor of the projection curve between two dates.
    fn discount_factor(&self, from: Date, to: Date) -> Result<Real>;

    /// The simple forward implied by the projection curve over a period.
    fn implied_forward(&self, start: Date, end: Date, day_count: DayCount) -> Result<Rate> {
        let frac = day_count.fraction(start, end);
        ensure!(
            frac > 0.0,
            "implied forward requires a positive period, got [{start}, {end})"
        );
        let df = self.discount_factor(start, end)?;
        ensure!(df > 0.0, "non-positive discount factor over [{start}, {end})");
        Ok((1.0 / df - 1.0) / frac)
    }
}

/// Supplies convexity and cap/floor value adjustments for projected rates.
pub trait ForwardAdjuster {
    /// Convexity adjustment to add to a projected forward.
    fn convexity_adjustment(
        &self,
        pay_date: Date,
        schedule: &FixingSchedule,
        fixing: &Fixing,
    ) -> Result<Real>;

    /// Adjusted cap level for a strike. Defaults to the raw strike.
    fn cap_value(&self, strike: Rate, _schedule: &FixingSchedule, _fixing: &Fixing) -> Result<Rate> {
        Ok(strike)
    }

    /// Adjusted floor level for a strike. Defaults to the raw strike.
    fn floor_value(
        &self,
        strike: Rate,
        _schedule: &FixingSchedule,
        _fixing: &Fixing,
    ) -> Result<Rate> {
        Ok(strike)
    }
}

/// A [`RateProjector`] over a discount curve plus recorded observations.
///
/// Resets strictly before the as-of date require a recorded observation;
/// resets on or after it are projected as the curve-implied simple forward
/// over the fixing period. When [`RateProjector::use_observed_resets`] is
/// set, an observation recorded for the reset date wins even if the reset
/// could be projected.
pub struct CurveProjector<'c> {
    curve: &'c dyn DiscountFactors,
    observations: BTreeMap<Date, Rate>,
    as_of: Date,
    day_count: DayCount,
    prefer_observed: bool,
}

impl<'c> CurveProjector<'c> {
    /// Create a projector with projection as-of date `as_of`.
    pub fn new(curve: &'c dyn DiscountFactors, as_of: Date, day_count: DayCount) -> Self {
        Self {
            curve,
            observations: BTreeMap::new(),
            as_of,
            day_count,
            prefer_observed: true,
        }
    }

    /// Record a historical observation for a reset date.
    pub fn add_observation(&mut self, reset_date: Date, rate: Rate) {
        self.observations.insert(reset_date, rate);
    }

    /// Record a historical observation, builder style.
    pub fn with_observation(mut self, reset_date: Date, rate: Rate) -> Self {
        self.add_observation(reset_date, rate);
        self
    }

    /// Control whether recorded observations are preferred over projections.
    pub fn with_prefer_observed(mut self, prefer: bool) -> Self {
        self.prefer_observed = prefer;
        self
    }
}

impl DiscountFactors for CurveProjector<'_> {
    fn discount(&self, date: Date) -> Real {
        self.curve.discount(date)
    }
}

impl RateProjector for CurveProjector<'_> {
    fn fixing(&self, schedule: &FixingSchedule) -> Result<Fixing> {
        if self.prefer_observed {
            if let Some(&rate) = self.observations.get(&schedule.reset_date) {
                return Ok(Fixing::observed(rate));
            }
        }
        if schedule.reset_date >= self.as_of {
            let fwd = self.implied_forward(
                schedule.period_start,
                schedule.period_end,
                self.day_count,
            )?;
            return Ok(Fixing::projected(fwd));
        }
        match self.observations.get(&schedule.reset_date) {
            Some(&rate) => Ok(Fixing::observed(rate)),
            None => Ok(Fixing::missing()),
        }
    }

    fn projection_date(&self) -> Date {
        self.as_of
    }

    fn use_observed_resets(&self) -> bool {
        self.prefer_observed
    }

    fn discount_factor(&self, from: Date, to: Date) -> Result<Real> {
        let df_to = self.curve.discount(to);
        let df_from = self.curve.discount(from);
        ensure!(
            df_from > 0.0,
            "non-positive discount factor at {from}"
        );
        Ok(df_to / df_from)
    }
}
