//! Integration tests: bootstrap credit curves and reprice the inputs.

use approx::assert_relative_eq;
use hazard_credit::prelude::*;

// =============================================================================
// TEST DATA
// =============================================================================

const SETTLE: f64 = 3.0 / 365.0;

fn standard_cds(maturity: f64) -> CdsAnalytic {
    CdsAnalytic::builder()
        .accrual_start(-20.0 / 365.0)
        .maturity(maturity)
        .cash_settle_time(SETTLE)
        .recovery_rate(0.4)
        .build()
        .unwrap()
}

fn ladder(maturities: &[f64]) -> Vec<CdsAnalytic> {
    maturities.iter().map(|&m| standard_cds(m)).collect()
}

fn usd_curve() -> YieldCurve {
    YieldCurve::new(
        vec![1.0 / 12.0, 0.25, 0.5, 1.0, 2.0, 3.0, 5.0, 7.0, 10.0],
        vec![0.0045, 0.0052, 0.0061, 0.0075, 0.0098, 0.0121, 0.0163, 0.0196, 0.0231],
    )
    .unwrap()
}

const MATURITIES: [f64; 6] = [0.5, 1.0, 2.0, 3.0, 5.0, 7.0];
const SPREADS: [f64; 6] = [0.0040, 0.0048, 0.0061, 0.0075, 0.0098, 0.0112];

fn assert_reprices(
    cds: &[CdsAnalytic],
    curve: &CreditCurve,
    yield_curve: &YieldCurve,
    formula: AccrualOnDefaultFormula,
    premiums: &[f64],
    points_upfront: &[f64],
) {
    for (i, c) in cds.iter().enumerate() {
        let pricer = Cds::new(c, yield_curve, curve.times(), formula);
        let market = CdsMarketInfo::new(premiums[i], points_upfront[i], 1.0 - c.lgd()).unwrap();
        let pv = pricer.pv(curve, &market);
        assert!(pv.abs() < 1e-10, "CDS {i} reprices to {pv:e}");
    }
}

// =============================================================================
// SINGLE NAME SCENARIO
// =============================================================================

#[test]
fn test_five_year_flat_scenario() {
    // 5Y, flat 2% continuously compounded, 40% recovery, 100bp, no upfront
    let yield_curve = YieldCurve::flat(0.02);
    let cds = vec![CdsAnalytic::builder().maturity(5.0).build().unwrap()];

    let curve = SuperFastCreditCurveBuilder::new()
        .calibrate(&cds, &[0.01], &yield_curve, &[0.0])
        .unwrap();

    assert_eq!(curve.times(), &[5.0]);
    let hazard = curve.zero_rates()[0];
    assert_relative_eq!(hazard, 0.01 / 0.6, max_relative = 0.02);
    assert_relative_eq!(curve.forward_hazard_rate(2.5), hazard, epsilon = 1e-12);

    assert_reprices(
        &cds,
        &curve,
        &yield_curve,
        AccrualOnDefaultFormula::OriginalIsda,
        &[0.01],
        &[0.0],
    );
}

// =============================================================================
// ROUND TRIP
// =============================================================================

#[test]
fn test_round_trip_par_spreads_all_formulas() {
    let yield_curve = usd_curve();
    let cds = ladder(&MATURITIES);

    for formula in [
        AccrualOnDefaultFormula::OriginalIsda,
        AccrualOnDefaultFormula::MarkitFix,
        AccrualOnDefaultFormula::Correct,
    ] {
        let curve = SuperFastCreditCurveBuilder::new()
            .with_formula(formula)
            .calibrate_par_spreads(&cds, &SPREADS, &yield_curve)
            .unwrap();
        assert_eq!(curve.times(), &MATURITIES);
        assert_reprices(&cds, &curve, &yield_curve, formula, &SPREADS, &[0.0; 6]);
    }
}

#[test]
fn test_round_trip_with_points_upfront() {
    let yield_curve = usd_curve();
    let cds = ladder(&MATURITIES);
    let premiums = [0.01; 6];
    let puf = [-0.0030, -0.0052, -0.0078, -0.0071, 0.0009, 0.0085];

    let curve = SuperFastCreditCurveBuilder::new()
        .with_formula(AccrualOnDefaultFormula::MarkitFix)
        .calibrate(&cds, &premiums, &yield_curve, &puf)
        .unwrap();
    assert_reprices(
        &cds,
        &curve,
        &yield_curve,
        AccrualOnDefaultFormula::MarkitFix,
        &premiums,
        &puf,
    );
}

#[test]
fn test_round_trip_without_accrual_on_default() {
    let yield_curve = usd_curve();
    let cds: Vec<_> = MATURITIES
        .iter()
        .map(|&m| {
            CdsAnalytic::builder()
                .maturity(m)
                .pay_accrued_on_default(false)
                .recovery_rate(0.25)
                .build()
                .unwrap()
        })
        .collect();

    let curve = SuperFastCreditCurveBuilder::new()
        .calibrate_par_spreads(&cds, &SPREADS, &yield_curve)
        .unwrap();
    assert_reprices(
        &cds,
        &curve,
        &yield_curve,
        AccrualOnDefaultFormula::OriginalIsda,
        &SPREADS,
        &[0.0; 6],
    );
}

#[test]
fn test_par_spread_of_calibrated_curve_matches_quotes() {
    let yield_curve = usd_curve();
    let cds = ladder(&MATURITIES);
    let curve = SuperFastCreditCurveBuilder::new()
        .calibrate_par_spreads(&cds, &SPREADS, &yield_curve)
        .unwrap();

    let pricer = AnalyticCdsPricer::default();
    for (c, &spread) in cds.iter().zip(&SPREADS) {
        assert_relative_eq!(pricer.par_spread(c, &yield_curve, &curve), spread, epsilon = 1e-10);
        assert!(pricer.pv(c, &yield_curve, &curve, spread, PriceType::Clean).abs() < 1e-10);
    }
}

#[test]
fn test_reusable_calibrator() {
    let yield_curve = usd_curve();
    let cds = ladder(&MATURITIES);
    let calibrator = SuperFastCreditCurveBuilder::new()
        .calibrator(&cds, &yield_curve)
        .unwrap();

    let base = calibrator.calibrate_par_spreads(&SPREADS).unwrap();
    let bumped: Vec<f64> = SPREADS.iter().map(|s| s + 0.0001).collect();
    let wider = calibrator.calibrate_par_spreads(&bumped).unwrap();

    for (b, w) in base.zero_rates().iter().zip(wider.zero_rates()) {
        assert!(w > b);
    }
    assert_reprices(
        &cds,
        &wider,
        &yield_curve,
        AccrualOnDefaultFormula::OriginalIsda,
        &bumped,
        &[0.0; 6],
    );
}

// =============================================================================
// ARBITRAGE HANDLING
// =============================================================================

#[test]
fn test_policies_agree_on_arbitrage_free_quotes() {
    let yield_curve = usd_curve();
    let cds = ladder(&[1.0, 3.0, 5.0]);
    let spreads = [0.005, 0.007, 0.01];

    let calibrate = |policy| {
        SuperFastCreditCurveBuilder::new()
            .with_arbitrage_handling(policy)
            .calibrate_par_spreads(&cds, &spreads, &yield_curve)
            .unwrap()
    };
    let ignore = calibrate(ArbitrageHandling::Ignore);
    for policy in [ArbitrageHandling::Fail, ArbitrageHandling::ZeroHazardRate] {
        let curve = calibrate(policy);
        for (a, b) in ignore.zero_rates().iter().zip(curve.zero_rates()) {
            assert_relative_eq!(a, b, epsilon = 1e-10);
        }
    }
}

#[test]
fn test_inverted_quotes_detected() {
    let yield_curve = usd_curve();
    let cds = ladder(&[1.0, 5.0]);
    let spreads = [0.05, 0.005];
    let builder = SuperFastCreditCurveBuilder::new();

    let err = builder
        .with_arbitrage_handling(ArbitrageHandling::Fail)
        .calibrate_par_spreads(&cds, &spreads, &yield_curve)
        .unwrap_err();
    match err {
        CreditError::Arbitrage {
            index,
            quote,
            pv_at_floor,
        } => {
            assert_eq!(index, 1);
            assert_eq!(quote, QuoteKind::ParSpread);
            assert!(pv_at_floor > 0.0);
        }
        other => panic!("expected arbitrage error, got {other:?}"),
    }

    let err = builder
        .with_arbitrage_handling(ArbitrageHandling::Fail)
        .calibrate(&cds, &[0.01, 0.01], &yield_curve, &[0.04, -0.02])
        .unwrap_err();
    assert!(matches!(
        err,
        CreditError::Arbitrage {
            index: 1,
            quote: QuoteKind::PremiumAndUpfront,
            ..
        }
    ));

    let floored = builder
        .with_arbitrage_handling(ArbitrageHandling::ZeroHazardRate)
        .calibrate_par_spreads(&cds, &spreads, &yield_curve)
        .unwrap();
    assert!(floored.forward_hazard_rate(3.0).abs() < 1e-12);
    assert_relative_eq!(
        floored.rt_at_index(1),
        floored.rt_at_index(0),
        epsilon = 1e-14
    );

    let unconstrained = builder
        .with_arbitrage_handling(ArbitrageHandling::Ignore)
        .calibrate_par_spreads(&cds, &spreads, &yield_curve)
        .unwrap();
    assert!(unconstrained.forward_hazard_rate(3.0) < 0.0);
    assert_eq!(floored.zero_rates()[0], unconstrained.zero_rates()[0]);
}

// =============================================================================
// COUPON SHARING
// =============================================================================

fn act_360_coupon(start: f64, end: f64) -> CdsCoupon {
    CdsCoupon::new(start, end, end, (end - start) * 365.0 / 360.0).unwrap()
}

#[test]
fn test_shared_terminal_coupon_built_once() {
    // Maturity rolled forward by a business day adjustment; the premium
    // schedule is unchanged, so the second contract adds no coupon.
    let yc = usd_curve();
    let coupons = vec![act_360_coupon(0.0, 0.5), act_360_coupon(0.5, 1.0)];
    let first = CdsAnalytic::builder()
        .coupons(coupons.clone())
        .maturity(1.0)
        .build()
        .unwrap();
    let second = CdsAnalytic::builder()
        .coupons(coupons)
        .maturity(1.01)
        .build()
        .unwrap();

    let calibrator = SuperFastCreditCurveBuilder::new()
        .calibrator(&[first.clone(), second.clone()], &yc)
        .unwrap();
    assert_eq!(calibrator.num_premium_elements(), 2);
    assert_eq!(calibrator.cds_coupons(0), &[0, 1]);
    assert_eq!(calibrator.cds_coupons(1), &[0, 1]);
    assert_eq!(calibrator.knot_coupons(0), &[0, 1]);
    assert!(calibrator.knot_coupons(1).is_empty());
    assert!(calibrator.cds_knot_coupons(1).is_empty());

    let spreads = [0.006, 0.0061];
    let curve = calibrator.calibrate_par_spreads(&spreads).unwrap();
    assert!(curve.forward_hazard_rate(1.005) > 0.0);
    assert_reprices(
        &[first, second],
        &curve,
        &yc,
        AccrualOnDefaultFormula::OriginalIsda,
        &spreads,
        &[0.0, 0.0],
    );
}

#[test]
fn test_common_coupons_built_once() {
    let yc = usd_curve();
    let coupon = act_360_coupon;
    let first = CdsAnalytic::builder()
        .coupons(vec![coupon(0.0, 0.5), coupon(0.5, 1.0)])
        .maturity(1.0)
        .build()
        .unwrap();
    let second = CdsAnalytic::builder()
        .coupons(vec![coupon(0.0, 0.5), coupon(0.5, 1.0), coupon(1.0, 1.5)])
        .maturity(1.5)
        .build()
        .unwrap();

    let calibrator = SuperFastCreditCurveBuilder::new()
        .calibrator(&[first.clone(), second.clone()], &yc)
        .unwrap();
    assert_eq!(calibrator.num_premium_elements(), 3);
    assert_eq!(calibrator.cds_coupons(0), &[0, 1]);
    assert_eq!(calibrator.cds_coupons(1), &[0, 1, 2]);
    assert_eq!(calibrator.cds_knot_coupons(1), &[2]);

    let curve = calibrator.calibrate_par_spreads(&[0.006, 0.008]).unwrap();
    assert_reprices(
        &[first, second],
        &curve,
        &yc,
        AccrualOnDefaultFormula::OriginalIsda,
        &[0.006, 0.008],
        &[0.0, 0.0],
    );
}

// =============================================================================
// VALIDATION
// =============================================================================

#[test]
fn test_inconsistent_conventions_rejected() {
    let yc = usd_curve();
    let builder = SuperFastCreditCurveBuilder::new();

    let mixed_accrual = vec![
        standard_cds(1.0),
        CdsAnalytic::builder()
            .accrual_start(-20.0 / 365.0)
            .maturity(2.0)
            .cash_settle_time(SETTLE)
            .pay_accrued_on_default(false)
            .build()
            .unwrap(),
    ];
    assert_eq!(
        builder.calibrator(&mixed_accrual, &yc).unwrap_err(),
        CreditError::InconsistentConventions {
            index: 1,
            field: "pay_accrued_on_default"
        }
    );

    let mixed_start = vec![
        standard_cds(1.0),
        CdsAnalytic::builder()
            .accrual_start(-10.0 / 365.0)
            .maturity(2.0)
            .cash_settle_time(SETTLE)
            .build()
            .unwrap(),
    ];
    assert!(matches!(
        builder.calibrator(&mixed_start, &yc),
        Err(CreditError::InconsistentConventions {
            field: "accrual_start",
            ..
        })
    ));
}

#[test]
fn test_bad_quote_arrays_rejected() {
    let yc = usd_curve();
    let cds = ladder(&MATURITIES);
    let builder = SuperFastCreditCurveBuilder::new();

    assert!(matches!(
        builder.calibrate(&cds, &[], &yc, &[]),
        Err(CreditError::EmptyInput { .. })
    ));
    assert!(matches!(
        builder.calibrate_par_spreads(&cds, &SPREADS[..5], &yc),
        Err(CreditError::LengthMismatch {
            expected: 6,
            got: 5,
            ..
        })
    ));
    assert!(matches!(
        builder.calibrate_par_spreads(&[], &SPREADS, &yc),
        Err(CreditError::EmptyInput { what: "cds" })
    ));
}

// =============================================================================
// BATCH
// =============================================================================

#[test]
fn test_batch_matches_serial() {
    let yc = usd_curve();
    let cds = ladder(&MATURITIES);
    let scaled: Vec<Vec<f64>> = (1..=8)
        .map(|k| SPREADS.iter().map(|s| s * f64::from(k) / 4.0).collect())
        .collect();
    let puf = [0.0; 6];

    let requests: Vec<CalibrationRequest<'_>> = scaled
        .iter()
        .map(|spreads| CalibrationRequest {
            cds: &cds,
            premiums: spreads,
            points_upfront: &puf,
            yield_curve: &yc,
        })
        .collect();

    let builder = SuperFastCreditCurveBuilder::new();
    let batch = builder.calibrate_batch(&requests);
    assert_eq!(batch.len(), scaled.len());
    for (result, spreads) in batch.iter().zip(&scaled) {
        let serial = builder.calibrate_par_spreads(&cds, spreads, &yc).unwrap();
        assert_eq!(result.as_ref().unwrap(), &serial);
    }
}
