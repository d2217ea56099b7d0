//! The `Payment` variant model.
//!
//! A payment is one scheduled cash obligation. The concrete kinds form a
//! closed enum so the valuation switch is exhaustive and compiler-checked;
//! the fields shared by every kind live in [`PaymentTerms`].

use crate::contingent::{
    CommodityPayment, CreditContingentPayment, DefaultSettlementPayment, OneTimePayment,
    PriceReturnPayment, RecoveryPayment,
};
use crate::fixing::{ForwardAdjuster, RateProjector};
use crate::floating::FloatingInterestPayment;
use crate::interest::{FixedInterestPayment, InterestTerms};
use crate::simulation::CashflowNode;
use rf_core::{Error, Real, Result};
use rf_curves::{DiscountFactors, SurvivalProbabilities};
use rf_time::Date;

/// Accrued-fraction values below this are treated as exactly zero.
pub(crate) const AFD_EPSILON: Real = 1.0e-14;

/// A three-letter ISO currency code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Currency([u8; 3]);

impl Currency {
    /// US dollar.
    pub const USD: Currency = Currency(*b"USD");
    /// Euro.
    pub const EUR: Currency = Currency(*b"EUR");
    /// Pound sterling.
    pub const GBP: Currency = Currency(*b"GBP");
    /// Japanese yen.
    pub const JPY: Currency = Currency(*b"JPY");

    /// Create a currency from a three-letter uppercase ASCII code.
    pub fn new(code: &str) -> Result<Self> {
        let bytes = code.as_bytes();
        if bytes.len() != 3 || !bytes.iter().all(|b| b.is_ascii_uppercase()) {
            return Err(Error::InvalidArgument(format!(
                "currency code must be three uppercase ASCII letters, got {code:?}"
            )));
        }
        Ok(Currency([bytes[0], bytes[1], bytes[2]]))
    }

    /// The code as a string slice.
    pub fn code(&self) -> &str {
        std::str::from_utf8(&self.0).expect("validated ASCII")
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Fields shared by every payment kind.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentTerms {
    /// The date the cash moves.
    pub pay_date: Date,
    /// Payment currency.
    pub currency: Currency,
    /// When set, returned verbatim instead of computing the amount.
    pub amount_override: Option<Real>,
    /// Optional FX rate into the valuation currency.
    pub fx_rate: Option<Real>,
    /// Date used instead of the pay date for inclusion tests.
    pub cutoff_date: Option<Date>,
    /// End of credit-risk exposure; defaults to the pay date.
    pub credit_risk_end_date: Option<Date>,
    /// Start date used by optionality add-ons.
    pub volatility_start: Option<Date>,
}

impl PaymentTerms {
    /// Create terms for a payment on `pay_date`.
    pub fn new(pay_date: Date, currency: Currency) -> Self {
        Self {
            pay_date,
            currency,
            amount_override: None,
            fx_rate: None,
            cutoff_date: None,
            credit_risk_end_date: None,
            volatility_start: None,
        }
    }

    /// Set an amount override.
    pub fn with_amount_override(mut self, amount: Real) -> Self {
        self.amount_override = Some(amount);
        self
    }

    /// Set the cutoff date.
    pub fn with_cutoff_date(mut self, date: Date) -> Self {
        self.cutoff_date = Some(date);
        self
    }

    /// Set the credit-risk end date.
    pub fn with_credit_risk_end(mut self, date: Date) -> Self {
        self.credit_risk_end_date = Some(date);
        self
    }

    /// Set the FX rate.
    pub fn with_fx_rate(mut self, rate: Real) -> Self {
        self.fx_rate = Some(rate);
        self
    }

    /// The cutoff date, defaulting to the pay date.
    pub fn cutoff_date(&self) -> Date {
        self.cutoff_date.unwrap_or(self.pay_date)
    }

    /// The credit-risk end date, defaulting to the pay date.
    pub fn credit_risk_end(&self) -> Date {
        self.credit_risk_end_date.unwrap_or(self.pay_date)
    }
}

/// Projection collaborators threaded through amount computations.
///
/// Non-floating payment kinds ignore it; a schedule with no floating legs
/// can pass [`RateEnv::new`] over any projector, including one that only
/// reports missing fixings.
#[derive(Clone, Copy)]
pub struct RateEnv<'a> {
    /// Resolves fixing schedules to fixings.
    pub projector: &'a dyn RateProjector,
    /// Optional convexity / cap-floor value provider.
    pub adjuster: Option<&'a dyn ForwardAdjuster>,
}

impl<'a> RateEnv<'a> {
    /// An environment with no forward adjuster.
    pub fn new(projector: &'a dyn RateProjector) -> Self {
        Self {
            projector,
            adjuster: None,
        }
    }

    /// Attach a forward adjuster.
    pub fn with_adjuster(mut self, adjuster: &'a dyn ForwardAdjuster) -> Self {
        self.adjuster = Some(adjuster);
        self
    }
}

/// Accrual split of a payment amount at a valuation date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Accrued {
    /// Amount accrued up to the valuation date.
    pub accrued: Real,
    /// Amount still to accrue after the valuation date.
    pub remaining: Real,
}

/// Discriminant of the concrete payment kinds, used for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentKind {
    /// Fixed-rate interest coupon.
    FixedInterest,
    /// Floating-rate interest coupon.
    FloatingInterest,
    /// One-time known amount (principal exchange, fee, settlement).
    OneTime,
    /// Settlement paid upon default: accrual plus recovery.
    DefaultSettlement,
    /// Unit protection contingent on default in a reference period.
    CreditContingent,
    /// Recovery-value payment contingent on default.
    Recovery,
    /// Price-return (performance) payment.
    PriceReturn,
    /// Commodity quantity-times-price payment.
    Commodity,
}

impl std::fmt::Display for PaymentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PaymentKind::FixedInterest => "fixed interest",
            PaymentKind::FloatingInterest => "floating interest",
            PaymentKind::OneTime => "one-time",
            PaymentKind::DefaultSettlement => "default settlement",
            PaymentKind::CreditContingent => "credit contingent",
            PaymentKind::Recovery => "recovery",
            PaymentKind::PriceReturn => "price return",
            PaymentKind::Commodity => "commodity",
        };
        write!(f, "{s}")
    }
}

/// One scheduled cash obligation.
#[derive(Debug, Clone, PartialEq)]
pub enum Payment {
    /// Fixed-rate interest coupon.
    FixedInterest(FixedInterestPayment),
    /// Floating-rate interest coupon.
    FloatingInterest(FloatingInterestPayment),
    /// One-time known amount.
    OneTime(OneTimePayment),
    /// Settlement paid upon default.
    DefaultSettlement(DefaultSettlementPayment),
    /// Unit protection contingent on default.
    CreditContingent(CreditContingentPayment),
    /// Recovery-value payment contingent on default.
    Recovery(RecoveryPayment),
    /// Price-return payment.
    PriceReturn(PriceReturnPayment),
    /// Commodity payment.
    Commodity(CommodityPayment),
}

impl Payment {
    /// The concrete kind.
    pub fn kind(&self) -> PaymentKind {
        match self {
            Payment::FixedInterest(_) => PaymentKind::FixedInterest,
            Payment::FloatingInterest(_) => PaymentKind::FloatingInterest,
            Payment::OneTime(_) => PaymentKind::OneTime,
            Payment::DefaultSettlement(_) => PaymentKind::DefaultSettlement,
            Payment::CreditContingent(_) => PaymentKind::CreditContingent,
            Payment::Recovery(_) => PaymentKind::Recovery,
            Payment::PriceReturn(_) => PaymentKind::PriceReturn,
            Payment::Commodity(_) => PaymentKind::Commodity,
        }
    }

    /// The shared terms.
    pub fn terms(&self) -> &PaymentTerms {
        match self {
            Payment::FixedInterest(p) => &p.terms,
            Payment::FloatingInterest(p) => &p.terms,
            Payment::OneTime(p) => &p.terms,
            Payment::DefaultSettlement(p) => &p.terms,
            Payment::CreditContingent(p) => &p.terms,
            Payment::Recovery(p) => &p.terms,
            Payment::PriceReturn(p) => &p.terms,
            Payment::Commodity(p) => &p.terms,
        }
    }

    /// The shared terms, mutably.
    pub fn terms_mut(&mut self) -> &mut PaymentTerms {
        match self {
            Payment::FixedInterest(p) => &mut p.terms,
            Payment::FloatingInterest(p) => &mut p.terms,
            Payment::OneTime(p) => &mut p.terms,
            Payment::DefaultSettlement(p) => &mut p.terms,
            Payment::CreditContingent(p) => &mut p.terms,
            Payment::Recovery(p) => &mut p.terms,
            Payment::PriceReturn(p) => &mut p.terms,
            Payment::Commodity(p) => &mut p.terms,
        }
    }

    /// The pay date.
    pub fn pay_date(&self) -> Date {
        self.terms().pay_date
    }

    /// The cutoff date used for inclusion tests (defaults to pay date).
    pub fn cutoff_date(&self) -> Date {
        self.terms().cutoff_date()
    }

    /// End of credit-risk exposure (defaults to pay date).
    pub fn credit_risk_end(&self) -> Date {
        self.terms().credit_risk_end()
    }

    /// Interest terms, for the interest-bearing kinds.
    pub fn interest(&self) -> Option<&InterestTerms> {
        match self {
            Payment::FixedInterest(p) => Some(&p.interest),
            Payment::FloatingInterest(p) => Some(&p.interest),
            _ => None,
        }
    }

    /// Compute the nominal amount, ignoring any override.
    pub fn compute_amount(&self, env: &RateEnv) -> Result<Real> {
        match self {
            Payment::FixedInterest(p) => Ok(p.compute_amount()),
            Payment::FloatingInterest(p) => p.compute_amount(env),
            Payment::OneTime(p) => Ok(p.compute_amount()),
            Payment::DefaultSettlement(p) => Ok(p.compute_amount()),
            Payment::CreditContingent(p) => Ok(p.compute_amount()),
            Payment::Recovery(p) => Ok(p.compute_amount()),
            Payment::PriceReturn(p) => Ok(p.compute_amount()),
            Payment::Commodity(p) => Ok(p.compute_amount()),
        }
    }

    /// The payment amount: the override when one is set, the computed
    /// nominal amount otherwise.
    pub fn amount(&self, env: &RateEnv) -> Result<Real> {
        if let Some(amount) = self.terms().amount_override {
            return Ok(amount);
        }
        self.compute_amount(env)
    }

    /// Set or clear the amount override.
    pub fn set_amount_override(&mut self, amount: Option<Real>) {
        self.terms_mut().amount_override = amount;
    }

    /// Split the amount into accrued and remaining parts as of a date.
    ///
    /// Interest kinds prorate linearly by elapsed day-count fraction over
    /// the accrual period; before the period start nothing has accrued and
    /// the full amount remains. Kinds without an accrual period flip from
    /// all-remaining to all-accrued at the pay date.
    pub fn accrued(&self, as_of: Date, env: &RateEnv) -> Result<Accrued> {
        let full = self.amount(env)?;
        let Some(interest) = self.interest() else {
            return Ok(if as_of < self.pay_date() {
                Accrued {
                    accrued: 0.0,
                    remaining: full,
                }
            } else {
                Accrued {
                    accrued: full,
                    remaining: 0.0,
                }
            });
        };
        Ok(interest.prorate(full, as_of))
    }

    /// Proportionally rescale notional-bearing fields.
    pub fn scale(&mut self, factor: Real) {
        if let Some(amount) = self.terms_mut().amount_override.as_mut() {
            *amount *= factor;
        }
        match self {
            Payment::FixedInterest(p) => p.interest.notional *= factor,
            Payment::FloatingInterest(p) => p.interest.notional *= factor,
            Payment::OneTime(p) => p.amount *= factor,
            Payment::DefaultSettlement(p) => {
                p.notional *= factor;
                if let Some(prior) = p.prior_notional.as_mut() {
                    *prior *= factor;
                }
                if let Some(prior) = p.prior_payment.as_mut() {
                    *prior *= factor;
                }
            }
            Payment::CreditContingent(_) => {} // unit protection has no notional
            Payment::Recovery(p) => p.notional *= factor,
            Payment::PriceReturn(p) => p.units *= factor,
            Payment::Commodity(p) => p.quantity *= factor,
        }
    }

    /// Risky discount factor: the discount factor at the pay date times the
    /// survival probability at the credit-risk end date.
    ///
    /// Interest kinds blend survival at the accrual-period start and end
    /// using the accrued-fraction-at-default, approximating default timing
    /// within the period instead of assuming end-of-period default.
    pub fn risky_discount(
        &self,
        discount: &dyn DiscountFactors,
        survival: &dyn SurvivalProbabilities,
    ) -> Real {
        self.risky_discount_until(self.credit_risk_end(), discount, survival)
    }

    /// [`risky_discount`](Self::risky_discount) with an explicit credit-risk
    /// end date, for callers that extend the risk window past the payment's
    /// own end date (e.g. end-date protection).
    pub fn risky_discount_until(
        &self,
        risk_end: Date,
        discount: &dyn DiscountFactors,
        survival: &dyn SurvivalProbabilities,
    ) -> Real {
        let df = discount.discount(self.pay_date());
        let s_end = survival.survival(risk_end);
        match self.interest() {
            Some(interest) => {
                let afd = interest.accrued_fraction_at_default.clamp(0.0, 1.0);
                if afd < AFD_EPSILON {
                    df * s_end
                } else {
                    let s_start = survival.survival(interest.accrual_start);
                    df * (afd * s_start + (1.0 - afd) * s_end)
                }
            }
            None => df * s_end,
        }
    }

    /// Cut a lightweight simulation node from this payment.
    ///
    /// Only kinds with a simulation representation succeed; the rest
    /// return [`Error::Unsupported`]. An amount override always yields a
    /// known-amount node.
    pub fn simulation_node(&self) -> Result<CashflowNode> {
        if let Some(amount) = self.terms().amount_override {
            return Ok(CashflowNode::Known {
                pay_date: self.pay_date(),
                amount,
            });
        }
        match self {
            Payment::FixedInterest(p) => Ok(CashflowNode::FixedCoupon {
                pay_date: p.terms.pay_date,
                rate: p.effective_rate(),
                principal: p.interest.notional,
                accrual_factor: p.interest.accrual_factor(),
            }),
            Payment::FloatingInterest(p) => p.simulation_node(),
            Payment::OneTime(p) => Ok(CashflowNode::Known {
                pay_date: p.terms.pay_date,
                amount: p.amount,
            }),
            other => Err(Error::Unsupported(format!(
                "cashflow simulation not supported for {} payments",
                other.kind()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixing::CurveProjector;
    use approx::assert_abs_diff_eq;
    use rf_curves::{FlatDiscount, FlatHazard};
    use rf_time::DayCount;

    fn date(y: u16, m: u8, d: u8) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    fn one_time(pay: Date, amount: Real) -> Payment {
        Payment::OneTime(OneTimePayment::new(
            PaymentTerms::new(pay, Currency::USD),
            amount,
        ))
    }

    #[test]
    fn currency_codes() {
        assert_eq!(Currency::new("USD").unwrap(), Currency::USD);
        assert!(Currency::new("usd").is_err());
        assert!(Currency::new("USDX").is_err());
        assert_eq!(Currency::EUR.to_string(), "EUR");
    }

    #[test]
    fn override_wins_over_computation() {
        let curve = FlatDiscount::new(date(2025, 1, 2), 0.04, DayCount::Act360);
        let proj = CurveProjector::new(&curve, date(2025, 1, 2), DayCount::Act360);
        let env = RateEnv::new(&proj);

        let mut p = one_time(date(2025, 6, 1), 250.0);
        assert_abs_diff_eq!(p.amount(&env).unwrap(), 250.0, epsilon = 1e-15);

        p.set_amount_override(Some(99.0));
        assert_abs_diff_eq!(p.amount(&env).unwrap(), 99.0, epsilon = 1e-15);
        assert_abs_diff_eq!(p.compute_amount(&env).unwrap(), 250.0, epsilon = 1e-15);

        p.set_amount_override(None);
        assert_abs_diff_eq!(p.amount(&env).unwrap(), 250.0, epsilon = 1e-15);
    }

    #[test]
    fn default_dates_fall_back_to_pay_date() {
        let p = one_time(date(2025, 6, 1), 1.0);
        assert_eq!(p.cutoff_date(), date(2025, 6, 1));
        assert_eq!(p.credit_risk_end(), date(2025, 6, 1));

        let mut q = one_time(date(2025, 6, 1), 1.0);
        q.terms_mut().cutoff_date = Some(date(2025, 5, 15));
        q.terms_mut().credit_risk_end_date = Some(date(2025, 5, 31));
        assert_eq!(q.cutoff_date(), date(2025, 5, 15));
        assert_eq!(q.credit_risk_end(), date(2025, 5, 31));
    }

    #[test]
    fn scale_is_idempotent_at_one() {
        let mut p = one_time(date(2025, 6, 1), 100.0);
        p.scale(1.0);
        p.scale(1.0);
        let curve = FlatDiscount::new(date(2025, 1, 2), 0.0, DayCount::Act360);
        let proj = CurveProjector::new(&curve, date(2025, 1, 2), DayCount::Act360);
        assert_abs_diff_eq!(
            p.amount(&RateEnv::new(&proj)).unwrap(),
            100.0,
            epsilon = 1e-15
        );
        p.scale(0.5);
        assert_abs_diff_eq!(
            p.amount(&RateEnv::new(&proj)).unwrap(),
            50.0,
            epsilon = 1e-15
        );
    }

    #[test]
    fn scale_applies_to_override() {
        let mut p = one_time(date(2025, 6, 1), 100.0);
        p.set_amount_override(Some(40.0));
        p.scale(2.0);
        let curve = FlatDiscount::new(date(2025, 1, 2), 0.0, DayCount::Act360);
        let proj = CurveProjector::new(&curve, date(2025, 1, 2), DayCount::Act360);
        assert_abs_diff_eq!(
            p.amount(&RateEnv::new(&proj)).unwrap(),
            80.0,
            epsilon = 1e-15
        );
    }

    #[test]
    fn non_interest_risky_discount_uses_risk_end() {
        let ref_date = date(2025, 1, 2);
        let discount = FlatDiscount::new(ref_date, 0.03, DayCount::Act365Fixed);
        let survival = FlatHazard::new(ref_date, 0.02, DayCount::Act365Fixed);

        let mut p = one_time(date(2026, 1, 2), 1.0);
        p.terms_mut().credit_risk_end_date = Some(date(2025, 12, 2));

        let expected = discount.discount(date(2026, 1, 2)) * survival.survival(date(2025, 12, 2));
        assert_abs_diff_eq!(
            p.risky_discount(&discount, &survival),
            expected,
            epsilon = 1e-15
        );
    }

    #[test]
    fn accrued_fraction_blends_the_survival_dates() {
        let ref_date = date(2025, 1, 2);
        let discount = FlatDiscount::new(ref_date, 0.03, DayCount::Act365Fixed);
        let survival = FlatHazard::new(ref_date, 0.02, DayCount::Act365Fixed);

        let start = date(2025, 1, 2);
        let end = date(2026, 1, 2);
        let coupon = |afd: Real| {
            Payment::FixedInterest(FixedInterestPayment::new(
                PaymentTerms::new(end, Currency::USD),
                InterestTerms::new(start, end, 1_000_000.0, DayCount::Act365Fixed)
                    .with_accrued_fraction_at_default(afd),
                0.05,
            ))
        };
        let df = discount.discount(end);
        let s_start = survival.survival(start);
        let s_end = survival.survival(end);

        // Full weight on the period start: default timing costs nothing.
        assert_abs_diff_eq!(
            coupon(1.0).risky_discount(&discount, &survival),
            df * s_start,
            epsilon = 1e-15
        );
        // Zero weight collapses to the end-of-period shortcut.
        assert_abs_diff_eq!(
            coupon(0.0).risky_discount(&discount, &survival),
            df * s_end,
            epsilon = 1e-15
        );
        // Interior weights interpolate linearly between the two.
        assert_abs_diff_eq!(
            coupon(0.4).risky_discount(&discount, &survival),
            df * (0.4 * s_start + 0.6 * s_end),
            epsilon = 1e-15
        );
        // Out-of-range fractions clamp to [0, 1].
        assert_abs_diff_eq!(
            coupon(2.5).risky_discount(&discount, &survival),
            df * s_start,
            epsilon = 1e-15
        );
    }

    #[test]
    fn scale_rescales_settlement_prior_fields() {
        let mut settlement = DefaultSettlementPayment::new(
            PaymentTerms::new(date(2025, 6, 1), Currency::USD),
            1_000_000.0,
            0.40,
            0.0,
            false,
        )
        .unwrap();
        settlement.prior_notional = Some(800_000.0);
        settlement.prior_payment = Some(12_345.0);
        let mut p = Payment::DefaultSettlement(settlement);
        p.scale(0.5);
        let Payment::DefaultSettlement(scaled) = &p else {
            panic!("kind changed under scale");
        };
        assert_abs_diff_eq!(scaled.notional, 500_000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(scaled.prior_notional.unwrap(), 400_000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(scaled.prior_payment.unwrap(), 6_172.5, epsilon = 1e-9);
    }

    #[test]
    fn simulation_node_unsupported_for_contingent() {
        let terms = PaymentTerms::new(date(2026, 1, 2), Currency::USD);
        let p = Payment::CreditContingent(CreditContingentPayment::new(
            terms,
            date(2025, 1, 2),
            date(2026, 1, 2),
        ));
        match p.simulation_node() {
            Err(Error::Unsupported(msg)) => assert!(msg.contains("not supported"), "{msg}"),
            other => panic!("expected Unsupported, got {other:?}"),
        }
    }

    #[test]
    fn simulation_node_uses_override_when_set() {
        let mut p = one_time(date(2025, 6, 1), 100.0);
        p.set_amount_override(Some(7.5));
        match p.simulation_node().unwrap() {
            CashflowNode::Known { amount, .. } => assert_abs_diff_eq!(amount, 7.5),
            other => panic!("expected Known, got {other:?}"),
        }
    }
}
