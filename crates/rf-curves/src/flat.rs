//! Flat (single-parameter) curves.

use crate::traits::{DiscountFactors, SurvivalProbabilities};
use rf_core::{DiscountFactor, Probability, Rate, Real};
use rf_time::{Date, DayCount};

/// A flat continuously-compounded discount curve: `D(d) = exp(−r·τ)`.
#[derive(Debug, Clone, Copy)]
pub struct FlatDiscount {
    reference: Date,
    rate: Rate,
    day_count: DayCount,
}

impl FlatDiscount {
    /// Create a flat discount curve anchored at `reference`.
    pub fn new(reference: Date, rate: Rate, day_count: DayCount) -> Self {
        Self {
            reference,
            rate,
            day_count,
        }
    }

    /// The flat continuously-compounded rate.
    pub fn rate(&self) -> Rate {
        self.rate
    }
}

impl DiscountFactors for FlatDiscount {
    fn discount(&self, date: Date) -> DiscountFactor {
        let t = self.day_count.fraction(self.reference, date);
        (-self.rate * t).exp()
    }
}

/// A flat hazard-rate survival curve: `S(d) = exp(−h·τ)`.
#[derive(Debug, Clone, Copy)]
pub struct FlatHazard {
    reference: Date,
    hazard: Real,
    day_count: DayCount,
}

impl FlatHazard {
    /// Create a flat hazard-rate curve anchored at `reference`.
    pub fn new(reference: Date, hazard: Real, day_count: DayCount) -> Self {
        Self {
            reference,
            hazard,
            day_count,
        }
    }

    /// The constant hazard rate.
    pub fn hazard(&self) -> Real {
        self.hazard
    }
}

impl SurvivalProbabilities for FlatHazard {
    fn survival(&self, date: Date) -> Probability {
        let t = self.day_count.fraction(self.reference, date);
        if t <= 0.0 {
            return 1.0;
        }
        (-self.hazard * t).exp()
    }
}
