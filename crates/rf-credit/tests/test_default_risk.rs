//! Closed-form and additivity checks for default-risk valuation.

use approx::assert_abs_diff_eq;
use proptest::prelude::*;
use rf_cashflows::{
    Currency, CurveProjector, DefaultSettlementPayment, FixedInterestPayment, InterestTerms,
    Payment, PaymentSchedule, PaymentTerms, RateEnv,
};
use rf_credit::{AccrualApproximation, DefaultRiskCalculator, TimeGrid};
use rf_curves::{FlatDiscount, FlatHazard, PiecewiseFlatHazard};
use rf_time::{Date, DayCount, TimeUnit};

const DC: DayCount = DayCount::Act365Fixed;

fn date(y: u16, m: u8, d: u8) -> Date {
    Date::from_ymd(y, m, d).unwrap()
}

fn risk_begin() -> Date {
    date(2025, 1, 2)
}

#[test]
fn protection_matches_the_flat_curve_closed_form() {
    let rb = risk_begin();
    let hazard = 0.035;
    let rate = 0.02;
    let credit = FlatHazard::new(rb, hazard, DC);
    let discount = FlatDiscount::new(rb, rate, DC);
    let calc = DefaultRiskCalculator::new(&credit, rb).unwrap();

    for years in [1, 3, 5, 10] {
        let end = rb.add(years, TimeUnit::Years).unwrap();
        let t = DC.fraction(rb, end);
        let lambda = hazard + rate;
        let expected = hazard / lambda * (1.0 - (-lambda * t).exp());
        assert_abs_diff_eq!(
            calc.protection(rb, end, false, &discount).unwrap(),
            expected,
            epsilon = 1e-12
        );
    }
}

#[test]
fn accrual_on_default_matches_the_analytic_integral() {
    let rb = risk_begin();
    let hazard = 0.04;
    let rate = 0.025;
    let credit = FlatHazard::new(rb, hazard, DC);
    let discount = FlatDiscount::new(rb, rate, DC);
    let calc = DefaultRiskCalculator::new(&credit, rb).unwrap();

    let end = rb.add(2, TimeUnit::Years).unwrap();
    let interest = InterestTerms::new(rb, end, 1.0, DC);

    // ∫₀ᵀ t·h·e^{−(h+r)t} dt with a linear accrual ramp starting at zero.
    let t = DC.fraction(rb, end);
    let lambda = hazard + rate;
    let expected = hazard * (1.0 - (1.0 + lambda * t) * (-lambda * t).exp()) / (lambda * lambda);
    assert_abs_diff_eq!(
        calc.accrual_on_default(&interest, end, &discount).unwrap(),
        expected,
        epsilon = 1e-12
    );
}

#[test]
fn time_grid_leaves_flat_curve_values_unchanged() {
    // The log-linear pieces are exact for exponential curves, so slicing
    // the window on a grid telescopes back to the single evaluation.
    let rb = risk_begin();
    let credit = FlatHazard::new(rb, 0.03, DC);
    let discount = FlatDiscount::new(rb, 0.02, DC);
    let whole = DefaultRiskCalculator::new(&credit, rb).unwrap();
    let gridded = DefaultRiskCalculator::new(&credit, rb)
        .unwrap()
        .with_time_grid(TimeGrid::new(1, TimeUnit::Months).unwrap());

    let end = rb.add(3, TimeUnit::Years).unwrap();
    assert_abs_diff_eq!(
        whole.protection(rb, end, false, &discount).unwrap(),
        gridded.protection(rb, end, false, &discount).unwrap(),
        epsilon = 1e-10
    );

    let interest = InterestTerms::new(rb, end, 1.0, DC);
    assert_abs_diff_eq!(
        whole.accrual_on_default(&interest, end, &discount).unwrap(),
        gridded
            .accrual_on_default(&interest, end, &discount)
            .unwrap(),
        epsilon = 1e-10
    );
}

#[test]
fn protection_telescopes_over_piecewise_curves() {
    // Piecewise-exponential survival: the per-segment fit is exact as long
    // as splits land on or between pillars, so additivity holds at
    // floating-point tolerance.
    let rb = risk_begin();
    let pillars = [
        rb.add(1, TimeUnit::Years).unwrap(),
        rb.add(3, TimeUnit::Years).unwrap(),
        rb.add(7, TimeUnit::Years).unwrap(),
    ];
    let credit = PiecewiseFlatHazard::new(&pillars, &[0.01, 0.025, 0.06], DC).unwrap();
    let discount = FlatDiscount::new(rb, 0.03, DC);
    let calc = DefaultRiskCalculator::new(&credit, rb)
        .unwrap()
        .with_time_grid(TimeGrid::new(1, TimeUnit::Days).unwrap());

    let t0 = rb;
    let t1 = rb.add(30, TimeUnit::Months).unwrap();
    let t2 = rb.add(6, TimeUnit::Years).unwrap();
    let split = calc.protection(t0, t1, false, &discount).unwrap()
        + calc.protection(t1, t2, false, &discount).unwrap();
    let whole = calc.protection(t0, t2, false, &discount).unwrap();
    assert_abs_diff_eq!(split, whole, epsilon = 1e-10);
}

#[test]
fn linear_mode_telescopes_on_a_daily_grid() {
    // Linear pieces are not grid-independent in general; a one-day grid
    // pins both sides of the comparison to the same per-day pieces.
    let rb = risk_begin();
    let credit = FlatHazard::new(rb, 0.08, DC);
    let discount = FlatDiscount::new(rb, 0.04, DC);
    let calc = DefaultRiskCalculator::new(&credit, rb)
        .unwrap()
        .with_approximation(AccrualApproximation::Linear)
        .with_time_grid(TimeGrid::new(1, TimeUnit::Days).unwrap());

    let t1 = rb.add(100, TimeUnit::Days).unwrap();
    let t2 = rb.add(365, TimeUnit::Days).unwrap();
    let split = calc.protection(rb, t1, false, &discount).unwrap()
        + calc.protection(t1, t2, false, &discount).unwrap();
    let whole = calc.protection(rb, t2, false, &discount).unwrap();
    assert_abs_diff_eq!(split, whole, epsilon = 1e-12);
}

#[test]
fn protection_is_monotone_in_the_window_end() {
    let rb = risk_begin();
    let credit = FlatHazard::new(rb, 0.02, DC);
    let discount = FlatDiscount::new(rb, 0.03, DC);
    let calc = DefaultRiskCalculator::new(&credit, rb).unwrap();

    let mut prev = 0.0;
    for months in (3..=60).step_by(3) {
        let end = rb.add(months, TimeUnit::Months).unwrap();
        let v = calc.protection(rb, end, false, &discount).unwrap();
        assert!(v > prev, "protection must grow with the window");
        assert!(v < 1.0);
        prev = v;
    }
}

#[test]
fn survival_is_non_increasing_in_date() {
    let rb = risk_begin();
    let flat = FlatHazard::new(rb, 0.03, DC);
    let pillars = [
        rb,
        rb.add(1, TimeUnit::Years).unwrap(),
        rb.add(3, TimeUnit::Years).unwrap(),
    ];
    let piecewise = PiecewiseFlatHazard::new(&pillars, &[0.01, 0.045, 0.08], DC).unwrap();
    let prepay = FlatHazard::new(rb, 0.015, DC);

    let curves: &[&dyn rf_curves::SurvivalProbabilities] = &[&flat, &piecewise];
    for &credit in curves {
        for with_prepay in [false, true] {
            let mut calc = DefaultRiskCalculator::new(credit, rb).unwrap();
            if with_prepay {
                calc = calc.with_prepay_curve(&prepay).unwrap();
            }
            // Weekly sweep from a year before risk begin to five years out.
            let mut d = rb.add(-1, TimeUnit::Years).unwrap();
            let horizon = rb.add(5, TimeUnit::Years).unwrap();
            let mut prev = calc.survival_probability(d);
            assert_eq!(prev, 1.0);
            while d < horizon {
                d = d.add_days(7).unwrap();
                let s = calc.survival_probability(d);
                assert!(
                    s <= prev,
                    "survival rose from {prev} to {s} at {d} (prepay: {with_prepay})"
                );
                assert!(s >= 0.0);
                prev = s;
            }
        }
    }
}

#[test]
fn schedule_pv_weights_each_kind_correctly() {
    let rb = risk_begin();
    let credit = FlatHazard::new(rb, 0.02, DC);
    let discount = FlatDiscount::new(rb, 0.03, DC);
    let proj = CurveProjector::new(&discount, rb, DayCount::Act360);
    let env = RateEnv::new(&proj);

    let end = rb.add(1, TimeUnit::Years).unwrap();
    let coupon = Payment::FixedInterest(FixedInterestPayment::new(
        PaymentTerms::new(end, Currency::USD),
        InterestTerms::new(rb, end, 1_000_000.0, DayCount::Thirty360Us),
        0.05,
    ));
    let settlement = Payment::DefaultSettlement(
        DefaultSettlementPayment::new(
            PaymentTerms::new(end, Currency::USD),
            1_000_000.0,
            0.40,
            0.0,
            false,
        )
        .unwrap(),
    );

    let calc = DefaultRiskCalculator::new(&credit, rb).unwrap();
    let mut schedule = PaymentSchedule::new();
    schedule.add(coupon.clone());
    schedule.add(settlement.clone());

    let expected_coupon = 50_000.0 * calc.risky_discount(&coupon, &discount).unwrap();
    let expected_settlement = -600_000.0
        * calc
            .protection(rb, settlement.credit_risk_end(), false, &discount)
            .unwrap();
    assert_abs_diff_eq!(
        calc.schedule_pv(&schedule, &discount, &env).unwrap(),
        expected_coupon + expected_settlement,
        epsilon = 1e-6
    );
}

#[test]
fn accrual_on_default_adds_to_risky_coupon_pv() {
    let rb = risk_begin();
    let credit = FlatHazard::new(rb, 0.05, DC);
    let discount = FlatDiscount::new(rb, 0.03, DC);
    let proj = CurveProjector::new(&discount, rb, DayCount::Act360);
    let env = RateEnv::new(&proj);

    let end = rb.add(1, TimeUnit::Years).unwrap();
    let coupon = Payment::FixedInterest(FixedInterestPayment::new(
        PaymentTerms::new(end, Currency::USD),
        InterestTerms::new(rb, end, 1_000_000.0, DC),
        0.05,
    ));

    let base = DefaultRiskCalculator::new(&credit, rb).unwrap();
    let paying = DefaultRiskCalculator::new(&credit, rb)
        .unwrap()
        .with_accrual_on_default(true);

    let without = base.payment_pv(&coupon, &discount, &env).unwrap();
    let with = paying.payment_pv(&coupon, &discount, &env).unwrap();
    assert!(with > without);

    let interest = coupon.interest().unwrap();
    let accrued = paying
        .accrual_on_default(interest, end, &discount)
        .unwrap();
    assert_abs_diff_eq!(
        with - without,
        0.05 * 1_000_000.0 * accrued,
        epsilon = 1e-6
    );
}

proptest! {
    #[test]
    fn protection_additivity_over_arbitrary_splits(
        hazard in 0.001..0.5f64,
        rate in 0.0..0.2f64,
        first in 1..1000i32,
        second in 1..1000i32,
    ) {
        let rb = risk_begin();
        let credit = FlatHazard::new(rb, hazard, DC);
        let discount = FlatDiscount::new(rb, rate, DC);
        let calc = DefaultRiskCalculator::new(&credit, rb).unwrap();

        let t1 = rb.add_days(first).unwrap();
        let t2 = t1.add_days(second).unwrap();
        let split = calc.protection(rb, t1, false, &discount).unwrap()
            + calc.protection(t1, t2, false, &discount).unwrap();
        let whole = calc.protection(rb, t2, false, &discount).unwrap();
        prop_assert!((split - whole).abs() < 1e-10, "split {split} vs whole {whole}");
    }

    #[test]
    fn accrual_additivity_over_arbitrary_splits(
        hazard in 0.001..0.5f64,
        rate in 0.0..0.2f64,
        days in 2..1000i32,
    ) {
        let rb = risk_begin();
        let credit = FlatHazard::new(rb, hazard, DC);
        let discount = FlatDiscount::new(rb, rate, DC);
        let calc = DefaultRiskCalculator::new(&credit, rb).unwrap();

        let end = rb.add_days(days).unwrap();
        let interest = InterestTerms::new(rb, end, 1.0, DC);

        // Daily slicing must telescope back to the single evaluation.
        let gridded = DefaultRiskCalculator::new(&credit, rb)
            .unwrap()
            .with_time_grid(TimeGrid::new(1, TimeUnit::Days).unwrap());
        let whole = calc.accrual_on_default(&interest, end, &discount).unwrap();
        let sliced = gridded.accrual_on_default(&interest, end, &discount).unwrap();
        prop_assert!((whole - sliced).abs() < 1e-10, "whole {whole} vs sliced {sliced}");
    }
}
