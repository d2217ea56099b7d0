//! # rf-credit
//!
//! Default-risk valuation on top of the payment model: survival-weighted
//! discount factors, expected accrual paid at default, and the present
//! value of protection legs.
//!
//! The central type is [`DefaultRiskCalculator`], which is configured once
//! (curves, normalization date, approximation mode, optional time grid)
//! and then queried as a pure function of dates and payments.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod default_risk;

pub use default_risk::{AccrualApproximation, DefaultRiskCalculator, TimeGrid};
