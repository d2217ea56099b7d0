//! Pillar-based curves: piecewise-flat hazard and log-linear discount.

use crate::traits::{DiscountFactors, SurvivalProbabilities};
use rf_core::{ensure, DiscountFactor, Probability, Real, Result};
use rf_time::{Date, DayCount};

/// A survival curve defined by hazard rates that are constant between
/// pillar dates.
///
/// `S(t) = exp(−∫₀ᵗ h(s) ds)`, integrated exactly over the flat segments.
/// The hazard rate of the last segment extrapolates beyond the final pillar.
#[derive(Debug, Clone)]
pub struct PiecewiseFlatHazard {
    reference: Date,
    day_count: DayCount,
    /// Segment boundaries as year fractions from the reference, strictly
    /// increasing, first entry 0.
    times: Vec<Real>,
    /// `hazards[i]` applies on `[times[i], times[i+1])`.
    hazards: Vec<Real>,
}

impl PiecewiseFlatHazard {
    /// Build from pillar dates and the hazard rate applying *from* each
    /// pillar. The first date is the curve reference.
    pub fn new(dates: &[Date], hazards: &[Real], day_count: DayCount) -> Result<Self> {
        ensure!(!dates.is_empty(), "need at least one pillar date");
        ensure!(
            dates.len() == hazards.len(),
            "dates and hazards must have the same length"
        );
        ensure!(
            dates.windows(2).all(|w| w[0] < w[1]),
            "pillar dates must be strictly increasing"
        );
        let reference = dates[0];
        let times = dates
            .iter()
            .map(|&d| day_count.fraction(reference, d))
            .collect();
        Ok(Self {
            reference,
            day_count,
            times,
            hazards: hazards.to_vec(),
        })
    }

    fn integrated_hazard(&self, t: Real) -> Real {
        let mut integral = 0.0;
        for i in 0..self.hazards.len() {
            let seg_start = self.times[i];
            if t <= seg_start {
                break;
            }
            let seg_end = if i + 1 < self.times.len() {
                self.times[i + 1].min(t)
            } else {
                t
            };
            integral += self.hazards[i] * (seg_end - seg_start);
        }
        integral
    }
}

impl SurvivalProbabilities for PiecewiseFlatHazard {
    fn survival(&self, date: Date) -> Probability {
        let t = self.day_count.fraction(self.reference, date);
        if t <= 0.0 {
            return 1.0;
        }
        (-self.integrated_hazard(t)).exp()
    }
}

/// A discount curve defined by discount factors at pillar dates,
/// interpolated log-linearly in time (flat-forward between pillars).
#[derive(Debug, Clone)]
pub struct LogLinearDiscount {
    reference: Date,
    day_count: DayCount,
    times: Vec<Real>,
    log_dfs: Vec<Real>,
}

impl LogLinearDiscount {
    /// Build from pillar dates and discount factors. The first date is the
    /// curve reference and must carry a factor of 1.
    pub fn new(dates: &[Date], factors: &[Real], day_count: DayCount) -> Result<Self> {
        ensure!(dates.len() >= 2, "need at least two pillars");
        ensure!(
            dates.len() == factors.len(),
            "dates and factors must have the same length"
        );
        ensure!(
            dates.windows(2).all(|w| w[0] < w[1]),
            "pillar dates must be strictly increasing"
        );
        ensure!(
            factors.iter().all(|&f| f > 0.0),
            "discount factors must be positive"
        );
        ensure!(
            (factors[0] - 1.0).abs() < 1e-12,
            "discount factor at the reference date must be 1, got {}",
            factors[0]
        );
        let reference = dates[0];
        let times = dates
            .iter()
            .map(|&d| day_count.fraction(reference, d))
            .collect();
        let log_dfs = factors.iter().map(|f| f.ln()).collect();
        Ok(Self {
            reference,
            day_count,
            times,
            log_dfs,
        })
    }
}

impl DiscountFactors for LogLinearDiscount {
    fn discount(&self, date: Date) -> DiscountFactor {
        let t = self.day_count.fraction(self.reference, date);
        if t <= 0.0 {
            return 1.0;
        }
        let n = self.times.len();
        // Locate the segment; extrapolate flat-forward off either end.
        let i = match self.times.iter().position(|&ti| ti >= t) {
            Some(0) => 1,
            Some(i) => i,
            None => n - 1,
        };
        let (t0, t1) = (self.times[i - 1], self.times[i]);
        let (l0, l1) = (self.log_dfs[i - 1], self.log_dfs[i]);
        let w = (t - t0) / (t1 - t0);
        (l0 + w * (l1 - l0)).exp()
    }
}
