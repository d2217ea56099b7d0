//! # rf-curves
//!
//! Discount and survival curve contracts for riskflow, plus the flat and
//! interpolated reference implementations used by tests and simple callers.
//!
//! Curve *calibration* is out of scope: valuation code only ever sees the
//! [`DiscountFactors`] and [`SurvivalProbabilities`] traits — pure
//! date-to-factor callbacks, monotonic in date for a well-formed curve.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod flat;
pub mod interpolated;
pub mod traits;

pub use flat::{FlatDiscount, FlatHazard};
pub use interpolated::{LogLinearDiscount, PiecewiseFlatHazard};
pub use traits::{DiscountFactors, SurvivalProbabilities};
