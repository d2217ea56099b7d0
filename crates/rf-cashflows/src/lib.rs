//! # rf-cashflows
//!
//! The payment data model and the floating-rate compounding engine.
//!
//! A [`Payment`] is a closed set of tagged variants — fixed and floating
//! interest coupons, one-time/principal flows, and the credit-contingent
//! family — that each know how to compute their own nominal amount.
//! [`PaymentSchedule`] keeps payments ordered by pay date for valuation.
//! Schedule-date generation and curve calibration are external
//! collaborators: they populate the schedule, valuation code iterates it.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod contingent;
pub mod fixing;
pub mod floating;
pub mod interest;
pub mod payment;
pub mod schedule;
pub mod simulation;

pub use contingent::{
    CommodityPayment, CreditContingentPayment, DefaultSettlementPayment, OneTimePayment,
    PriceReturnPayment, RecoveryPayment,
};
pub use fixing::{
    CurveProjector, Fixing, FixingSchedule, ForwardAdjuster, RateProjector, ResetState,
};
pub use floating::{
    compound_power, CompoundingMethod, FloatingInterestPayment, SpreadMode, SubPeriod,
};
pub use interest::{CouponRate, FixedInterestPayment, InterestTerms};
pub use payment::{Accrued, Currency, Payment, PaymentKind, PaymentTerms, RateEnv};
pub use schedule::{PaymentGrouping, PaymentSchedule};
pub use simulation::CashflowNode;
