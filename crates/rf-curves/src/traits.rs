//! Curve boundary traits.

use rf_core::{DiscountFactor, Probability};
use rf_time::Date;

/// A discount-factor source: a pure mapping from date to a multiplicative
/// factor, typically in (0, 1] and non-increasing in date.
pub trait DiscountFactors {
    /// The discount factor at `date`.
    fn discount(&self, date: Date) -> DiscountFactor;
}

/// A survival-probability source: a pure mapping from date to the
/// probability that no credit event has occurred by that date,
/// non-increasing in date for a well-formed curve.
pub trait SurvivalProbabilities {
    /// The survival probability at `date`.
    fn survival(&self, date: Date) -> Probability;
}

// Closures double as curves, so tests and callers can pass lambdas.

impl<F> DiscountFactors for F
where
    F: Fn(Date) -> DiscountFactor,
{
    fn discount(&self, date: Date) -> DiscountFactor {
        self(date)
    }
}

impl<F> SurvivalProbabilities for F
where
    F: Fn(Date) -> Probability,
{
    fn survival(&self, date: Date) -> Probability {
        self(date)
    }
}
