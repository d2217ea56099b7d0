//! # riskflow
//!
//! Deterministic cashflow representation and default-risk valuation for
//! fixed-income and credit derivatives.
//!
//! This crate is a **façade** that re-exports all public items from the
//! underlying workspace crates. Application code should depend on this
//! crate rather than the individual `rf-*` crates.
//!
//! ## Quick start
//!
//! ```toml
//! [dependencies]
//! riskflow = "0.1"
//! ```
//!
//! ```rust
//! use riskflow::time::{Date, DayCount};
//!
//! let start = Date::from_ymd(2025, 1, 2).unwrap();
//! let end = Date::from_ymd(2025, 7, 2).unwrap();
//! assert!(DayCount::Act365Fixed.fraction(start, end) > 0.49);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Core types, aliases, and error definitions.
pub use rf_core as core;

/// Date, day-count, and period types.
pub use rf_time as time;

/// Discount and survival curve contracts and reference implementations.
pub use rf_curves as curves;

/// Payment variants, fixing projection, compounding, and schedules.
pub use rf_cashflows as cashflows;

/// Survival-weighted discounting and default-contingent integrals.
pub use rf_credit as credit;
