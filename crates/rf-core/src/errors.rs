//! Error types for riskflow.
//!
//! The whole workspace shares a single `thiserror`-derived enum. The
//! taxonomy is deliberately small:
//!
//! * [`Error::MissingFixing`] — a required historical rate reset is absent.
//!   This variant must reach the caller **verbatim**: callers special-case
//!   it, so it is never wrapped with additional context.
//! * [`Error::Unsupported`] — an unrecognized convention or an operation a
//!   given type does not support; raised immediately, never retried.
//! * [`Error::InvalidArgument`] — out-of-range inputs rejected before any
//!   numeric work begins (the `ensure!` macro produces this variant).
//! * [`Error::Computation`] — any other failure raised while computing an
//!   effective rate, annotated with the pay date of the payment being
//!   valued. Use [`Error::in_payment`] to apply the annotation; it forwards
//!   `MissingFixing` unchanged.

use thiserror::Error;

/// The top-level error type used throughout riskflow.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// A required historical rate fixing is absent. Never wrapped.
    #[error("missing fixing: {0}")]
    MissingFixing(String),

    /// Unrecognized convention or unsupported operation.
    #[error("not supported: {0}")]
    Unsupported(String),

    /// Out-of-range or otherwise invalid argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A failure while computing a payment, annotated with its pay date.
    #[error("error computing payment due {pay_date}: {source}")]
    Computation {
        /// Pay date of the payment being computed, as `YYYY-MM-DD`.
        pay_date: String,
        /// The underlying failure.
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Annotate `self` with the pay date of the payment being computed.
    ///
    /// `MissingFixing` is self-explanatory and callers match on it, so it
    /// passes through unchanged; everything else is wrapped once (an error
    /// that already carries a pay date is not re-wrapped).
    pub fn in_payment(self, pay_date: impl std::fmt::Display) -> Error {
        match self {
            Error::MissingFixing(_) | Error::Computation { .. } => self,
            other => Error::Computation {
                pay_date: pay_date.to_string(),
                source: Box::new(other),
            },
        }
    }
}

/// Shorthand `Result` type used throughout riskflow.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Validate a precondition, returning `Err(Error::InvalidArgument(...))` if
/// `$cond` is false.
///
/// # Example
/// ```
/// use rf_core::ensure;
/// fn recovery(r: f64) -> rf_core::Result<f64> {
///     ensure!((0.0..=1.0).contains(&r), "recovery rate {r} outside [0, 1]");
///     Ok(r)
/// }
/// assert!(recovery(0.4).is_ok());
/// assert!(recovery(1.5).is_err());
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::InvalidArgument(
                format!($($msg)*)
            ));
        }
    };
}

/// Return `Err(Error::Unsupported(...))` immediately.
///
/// # Example
/// ```
/// use rf_core::fail;
/// fn reject() -> rf_core::Result<()> {
///     fail!("reset-date override not supported here");
/// }
/// assert!(reject().is_err());
/// ```
#[macro_export]
macro_rules! fail {
    ($($msg:tt)*) => {
        return Err($crate::errors::Error::Unsupported(format!($($msg)*)))
    };
}
