//! Lightweight cashflow nodes for simulation.
//!
//! A [`CashflowNode`] is the minimal re-evaluable form of a payment:
//! enough scalars to recompute the amount under a fresh rate environment
//! without carrying the full payment object into a simulation loop.

use crate::fixing::FixingSchedule;
use crate::payment::RateEnv;
use rf_core::{Error, Rate, Real, Result, Spread};
use rf_time::Date;

/// The simulation-ready form of a payment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CashflowNode {
    /// A fully determined amount.
    Known {
        /// Payment date.
        pay_date: Date,
        /// The known amount.
        amount: Real,
    },
    /// A fixed coupon: `principal × rate × accrual_factor`.
    FixedCoupon {
        /// Payment date.
        pay_date: Date,
        /// Accruing notional.
        principal: Real,
        /// Effective fixed rate.
        rate: Rate,
        /// Day-count fraction of the accrual period.
        accrual_factor: Real,
    },
    /// A single-fixing floating coupon, re-projected on evaluation.
    FloatingCoupon {
        /// Payment date.
        pay_date: Date,
        /// Accruing notional.
        principal: Real,
        /// Day-count fraction of the accrual period.
        accrual_factor: Real,
        /// Index multiplier applied to the fixing.
        multiplier: Real,
        /// Additive spread over the geared fixing.
        spread: Spread,
        /// Handle to the rate observation.
        schedule: FixingSchedule,
    },
}

impl CashflowNode {
    /// The payment date of the underlying flow.
    pub fn pay_date(&self) -> Date {
        match self {
            CashflowNode::Known { pay_date, .. }
            | CashflowNode::FixedCoupon { pay_date, .. }
            | CashflowNode::FloatingCoupon { pay_date, .. } => *pay_date,
        }
    }

    /// Evaluate the amount under the given rate environment.
    ///
    /// Floating nodes resolve their fixing afresh; an unresolvable fixing
    /// is a [`Error::MissingFixing`].
    pub fn amount(&self, env: &RateEnv) -> Result<Real> {
        match self {
            CashflowNode::Known { amount, .. } => Ok(*amount),
            CashflowNode::FixedCoupon {
                principal,
                rate,
                accrual_factor,
                ..
            } => Ok(principal * rate * accrual_factor),
            CashflowNode::FloatingCoupon {
                principal,
                accrual_factor,
                multiplier,
                spread,
                schedule,
                ..
            } => {
                let fixing = env.projector.fixing(schedule)?;
                if !fixing.state.is_resolved() {
                    return Err(Error::MissingFixing(format!(
                        "no rate observed for reset on {}",
                        schedule.reset_date
                    )));
                }
                Ok(principal * (fixing.forward * multiplier + spread) * accrual_factor)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixing::{CurveProjector, Fixing, FixingSchedule, RateProjector};
    use approx::assert_abs_diff_eq;
    use rf_curves::FlatDiscount;
    use rf_time::{Date, DayCount};

    fn date(y: u16, m: u8, d: u8) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    #[test]
    fn known_node_ignores_environment() {
        let curve = FlatDiscount::new(date(2025, 1, 2), 0.03, DayCount::Act365Fixed);
        let proj = CurveProjector::new(&curve, date(2025, 1, 2), DayCount::Act360);
        let env = RateEnv::new(&proj);
        let node = CashflowNode::Known {
            pay_date: date(2025, 6, 1),
            amount: 42.0,
        };
        assert_eq!(node.amount(&env).unwrap(), 42.0);
        assert_eq!(node.pay_date(), date(2025, 6, 1));
    }

    #[test]
    fn floating_node_reprojects_its_fixing() {
        let curve = FlatDiscount::new(date(2025, 1, 2), 0.03, DayCount::Act365Fixed);
        let proj = CurveProjector::new(&curve, date(2025, 1, 2), DayCount::Act360);
        let env = RateEnv::new(&proj);

        let schedule = FixingSchedule::new(date(2025, 3, 1), date(2025, 6, 1));
        let node = CashflowNode::FloatingCoupon {
            pay_date: date(2025, 6, 1),
            principal: 1_000_000.0,
            accrual_factor: 0.25,
            multiplier: 1.0,
            spread: 0.001,
            schedule,
        };
        let Fixing { forward, .. } = proj.fixing(&schedule).unwrap();
        assert_abs_diff_eq!(
            node.amount(&env).unwrap(),
            1_000_000.0 * (forward + 0.001) * 0.25,
            epsilon = 1e-9
        );
    }

    #[test]
    fn floating_node_surfaces_missing_fixings() {
        let curve = FlatDiscount::new(date(2025, 6, 1), 0.03, DayCount::Act365Fixed);
        // As-of after the reset, no observation recorded.
        let proj = CurveProjector::new(&curve, date(2025, 6, 1), DayCount::Act360);
        let env = RateEnv::new(&proj);

        let node = CashflowNode::FloatingCoupon {
            pay_date: date(2025, 6, 1),
            principal: 1.0,
            accrual_factor: 0.25,
            multiplier: 1.0,
            spread: 0.0,
            schedule: FixingSchedule::new(date(2025, 3, 1), date(2025, 6, 1)),
        };
        assert!(matches!(node.amount(&env), Err(Error::MissingFixing(_))));
    }
}
