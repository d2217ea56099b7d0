//! One-time and credit-contingent payment kinds.
//!
//! The contingent kinds exist only if a credit event occurs within their
//! reference period `[begin, end)`; their nominal amounts are the unit
//! protection payment or the funded/unfunded recovery formulas. Whether
//! and how they are risk-weighted is the default-risk calculator's job.

use crate::payment::PaymentTerms;
use rf_core::{ensure, Notional, Rate, Real, Result};
use rf_time::Date;

/// A one-time known amount: principal exchange, fee, or any flow whose
/// amount is fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct OneTimePayment {
    /// Shared payment terms.
    pub terms: PaymentTerms,
    /// The amount paid.
    pub amount: Real,
}

impl OneTimePayment {
    /// Create a one-time payment.
    pub fn new(terms: PaymentTerms, amount: Real) -> Self {
        Self { terms, amount }
    }

    /// The fixed amount.
    pub fn compute_amount(&self) -> Real {
        self.amount
    }
}

/// A settlement paid at default: accrued coupon plus recovery.
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultSettlementPayment {
    /// Shared payment terms.
    pub terms: PaymentTerms,
    /// Notional being settled.
    pub notional: Notional,
    /// Recovery rate in [0, 1].
    pub recovery_rate: Rate,
    /// Accrued coupon fraction owed at settlement.
    pub accrual: Real,
    /// Funded (recovery paid) vs unfunded (loss paid).
    pub is_funded: bool,
    /// Notional outstanding before this settlement, for cumulative
    /// sequencing of successive settlements.
    pub prior_notional: Option<Notional>,
    /// Amount of the previous settlement in the sequence.
    pub prior_payment: Option<Real>,
}

impl DefaultSettlementPayment {
    /// Create a default settlement.
    pub fn new(
        terms: PaymentTerms,
        notional: Notional,
        recovery_rate: Rate,
        accrual: Real,
        is_funded: bool,
    ) -> Result<Self> {
        ensure!(
            (0.0..=1.0).contains(&recovery_rate),
            "recovery rate {recovery_rate} outside [0, 1]"
        );
        Ok(Self {
            terms,
            notional,
            recovery_rate,
            accrual,
            is_funded,
            prior_notional: None,
            prior_payment: None,
        })
    }

    /// `notional × (accrual + recovery)` when funded,
    /// `notional × (accrual + recovery − 1)` when unfunded.
    pub fn compute_amount(&self) -> Real {
        let recovery_leg = if self.is_funded {
            self.recovery_rate
        } else {
            self.recovery_rate - 1.0
        };
        self.notional * (self.accrual + recovery_leg)
    }
}

/// A unit protection payment contingent on default in `[begin, end)`.
#[derive(Debug, Clone, PartialEq)]
pub struct CreditContingentPayment {
    /// Shared payment terms.
    pub terms: PaymentTerms,
    /// Start of the protection reference period (inclusive).
    pub begin: Date,
    /// End of the protection reference period (exclusive).
    pub end: Date,
}

impl CreditContingentPayment {
    /// Create a unit protection payment.
    pub fn new(terms: PaymentTerms, begin: Date, end: Date) -> Self {
        Self { terms, begin, end }
    }

    /// Unit notional.
    pub fn compute_amount(&self) -> Real {
        1.0
    }
}

/// A recovery-value payment contingent on default in `[begin, end)`.
#[derive(Debug, Clone, PartialEq)]
pub struct RecoveryPayment {
    /// Shared payment terms.
    pub terms: PaymentTerms,
    /// Start of the reference period (inclusive).
    pub begin: Date,
    /// End of the reference period (exclusive).
    pub end: Date,
    /// Notional protected.
    pub notional: Notional,
    /// Recovery rate in [0, 1].
    pub recovery_rate: Rate,
    /// Funded (recovery paid) vs unfunded (loss paid).
    pub is_funded: bool,
}

impl RecoveryPayment {
    /// Create a recovery payment.
    pub fn new(
        terms: PaymentTerms,
        begin: Date,
        end: Date,
        notional: Notional,
        recovery_rate: Rate,
        is_funded: bool,
    ) -> Result<Self> {
        ensure!(
            (0.0..=1.0).contains(&recovery_rate),
            "recovery rate {recovery_rate} outside [0, 1]"
        );
        Ok(Self {
            terms,
            begin,
            end,
            notional,
            recovery_rate,
            is_funded,
        })
    }

    /// `notional × recovery` when funded, `notional × (recovery − 1)`
    /// when unfunded.
    pub fn compute_amount(&self) -> Real {
        if self.is_funded {
            self.notional * self.recovery_rate
        } else {
            self.notional * (self.recovery_rate - 1.0)
        }
    }
}

/// A price-return (performance) payment.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceReturnPayment {
    /// Shared payment terms.
    pub terms: PaymentTerms,
    /// Number of units held.
    pub units: Real,
    /// Price at the start of the return period.
    pub initial_price: Real,
    /// Price at the end of the return period.
    pub final_price: Real,
}

impl PriceReturnPayment {
    /// Create a price-return payment.
    pub fn new(terms: PaymentTerms, units: Real, initial_price: Real, final_price: Real) -> Self {
        Self {
            terms,
            units,
            initial_price,
            final_price,
        }
    }

    /// `units × (final − initial)`.
    pub fn compute_amount(&self) -> Real {
        self.units * (self.final_price - self.initial_price)
    }
}

/// A commodity quantity-times-price payment.
#[derive(Debug, Clone, PartialEq)]
pub struct CommodityPayment {
    /// Shared payment terms.
    pub terms: PaymentTerms,
    /// Quantity delivered.
    pub quantity: Real,
    /// Settlement price per unit.
    pub price: Real,
}

impl CommodityPayment {
    /// Create a commodity payment.
    pub fn new(terms: PaymentTerms, quantity: Real, price: Real) -> Self {
        Self {
            terms,
            quantity,
            price,
        }
    }

    /// `quantity × price`.
    pub fn compute_amount(&self) -> Real {
        self.quantity * self.price
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payment::Currency;
    use approx::assert_abs_diff_eq;

    fn date(y: u16, m: u8, d: u8) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    fn terms() -> PaymentTerms {
        PaymentTerms::new(date(2026, 1, 2), Currency::USD)
    }

    #[test]
    fn default_settlement_unfunded() {
        let p = DefaultSettlementPayment::new(terms(), 1_000_000.0, 0.4, 0.0125, false).unwrap();
        // N × (accrual + R − 1) = 1e6 × (0.0125 − 0.6)
        assert_abs_diff_eq!(p.compute_amount(), -587_500.0, epsilon = 1e-6);
    }

    #[test]
    fn default_settlement_funded() {
        let p = DefaultSettlementPayment::new(terms(), 1_000_000.0, 0.4, 0.0125, true).unwrap();
        // N × (accrual + R) = 1e6 × 0.4125
        assert_abs_diff_eq!(p.compute_amount(), 412_500.0, epsilon = 1e-6);
    }

    #[test]
    fn recovery_rate_validated() {
        assert!(DefaultSettlementPayment::new(terms(), 1.0, 1.5, 0.0, true).is_err());
        assert!(
            RecoveryPayment::new(terms(), date(2025, 1, 2), date(2026, 1, 2), 1.0, -0.1, true)
                .is_err()
        );
    }

    #[test]
    fn recovery_funded_and_unfunded() {
        let begin = date(2025, 1, 2);
        let end = date(2026, 1, 2);
        let funded = RecoveryPayment::new(terms(), begin, end, 100.0, 0.4, true).unwrap();
        assert_abs_diff_eq!(funded.compute_amount(), 40.0, epsilon = 1e-12);

        let unfunded = RecoveryPayment::new(terms(), begin, end, 100.0, 0.4, false).unwrap();
        assert_abs_diff_eq!(unfunded.compute_amount(), -60.0, epsilon = 1e-12);
    }

    #[test]
    fn unit_protection() {
        let p = CreditContingentPayment::new(terms(), date(2025, 1, 2), date(2026, 1, 2));
        assert_eq!(p.compute_amount(), 1.0);
    }

    #[test]
    fn price_return_and_commodity() {
        let pr = PriceReturnPayment::new(terms(), 10.0, 95.0, 101.5);
        assert_abs_diff_eq!(pr.compute_amount(), 65.0, epsilon = 1e-12);

        let co = CommodityPayment::new(terms(), 250.0, 71.4);
        assert_abs_diff_eq!(co.compute_amount(), 17_850.0, epsilon = 1e-12);
    }
}
