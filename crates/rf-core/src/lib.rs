//! # rf-core
//!
//! Core types and error definitions for riskflow.
//!
//! This crate provides the foundational building blocks shared across all
//! other crates in the workspace — the scalar type aliases used by the
//! valuation code and the error hierarchy.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Error types and the `ensure!` / `fail!` convenience macros.
pub mod errors;

// ── Primitive type aliases ────────────────────────────────────────────────────

/// Floating-point type used throughout the library.
pub type Real = f64;

/// A rate expressed as a decimal (e.g. 0.05 = 5 %).
pub type Rate = Real;

/// A spread over a reference rate.
pub type Spread = Real;

/// A discount factor in [0, 1].
pub type DiscountFactor = Real;

/// A survival (or default) probability in [0, 1].
pub type Probability = Real;

/// A notional (face) amount.
pub type Notional = Real;

/// A time measurement in years.
pub type Time = Real;

/// Alias used for array sizes / indices.
pub type Size = usize;

// ── Re-exports for convenience ────────────────────────────────────────────────

pub use errors::{Error, Result};
