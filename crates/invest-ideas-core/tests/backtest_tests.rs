#![cfg(feature = "backtest")]

use invest_ideas_core::backtest::{compound_returns, run_backtest, BacktestInput, SeriesBacktest};
use invest_ideas_core::cagr::annualized_return;
use invest_ideas_core::cost::DisposalSchedule;
use invest_ideas_core::tables::history::{
    find_series, BONDS_AAA_EUR, MSCI_WORLD, MSCI_WORLD_SRI, NASDAQ_100, SPAIN_CPI,
    SPAIN_HOUSING_M2,
};
use invest_ideas_core::tables::schedule::TransactionTaxSchedule;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

#[test]
fn test_entry_before_history_is_unavailable_for_every_series() {
    let input = BacktestInput::new(&[MSCI_WORLD, NASDAQ_100, SPAIN_HOUSING_M2], 1995);
    let out = run_backtest(&input).unwrap();
    assert_eq!(out.result.series.len(), 3);
    for series in &out.result.series {
        match series {
            SeriesBacktest::Unavailable { reason, .. } => assert!(reason.contains("2004")),
            other => panic!("expected unavailable, got {other:?}"),
        }
        assert!(series.points().is_empty());
    }
    assert_eq!(out.warnings.len(), 3);
}

#[test]
fn test_mixed_availability_keeps_available_series() {
    let input = BacktestInput::new(&[MSCI_WORLD_SRI, BONDS_AAA_EUR], 2012);
    let out = run_backtest(&input).unwrap();
    assert!(matches!(out.result.series[0], SeriesBacktest::Unavailable { .. }));
    let bonds = out.result.series[1].points();
    assert_eq!(bonds.first().map(|p| p.calendar_year), Some(2012));
    assert_eq!(bonds.last().map(|p| p.calendar_year), Some(2024));
    assert_eq!(bonds.len(), 13);
}

#[test]
fn test_observed_changes_are_not_compounded() {
    let input = BacktestInput::new(&[MSCI_WORLD], 2020);
    let out = run_backtest(&input).unwrap();
    match &out.result.series[0] {
        SeriesBacktest::Available {
            observed_changes, ..
        } => {
            let pct: Vec<Decimal> = observed_changes.iter().map(|c| c.change_pct).collect();
            assert_eq!(
                pct,
                vec![dec!(15.9), dec!(21.8), dec!(-17.7), dec!(23.8), dec!(18.2)]
            );
        }
        other => panic!("expected available, got {other:?}"),
    }
}

#[test]
fn test_crash_year_visible_in_curve() {
    let input = BacktestInput::new(&[MSCI_WORLD], 2008);
    let out = run_backtest(&input).unwrap();
    let first = &out.result.series[0].points()[0];
    assert_eq!(first.calendar_year, 2008);
    assert!(first.cagr < dec!(-0.40));
}

#[test]
fn test_real_cagr_reported_when_inflation_covers_span() {
    let mut input = BacktestInput::new(&[SPAIN_HOUSING_M2], 2015);
    input.inflation_series = Some(SPAIN_CPI.to_string());
    let out = run_backtest(&input).unwrap();
    assert!(out.result.series[0]
        .points()
        .iter()
        .all(|p| p.real_cagr_pct.is_some()));
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(24))]

    /// With no frictions the realised CAGR is the aggregator applied to the
    /// compounded returns of the same span.
    #[test]
    fn prop_backtest_consistency_law(entry in 2004i32..2025, series_pick in 0usize..3) {
        let id = [MSCI_WORLD, NASDAQ_100, BONDS_AAA_EUR][series_pick];
        let mut input = BacktestInput::new(&[id], entry);
        input.purchase_fee = TransactionTaxSchedule::Exempt;
        input.disposal = DisposalSchedule::default();

        let series = find_series(id).unwrap();
        let out = run_backtest(&input).unwrap();
        for point in out.result.series[0].points() {
            let returns: Vec<Decimal> = (entry..=point.calendar_year)
                .map(|y| series.get(y).unwrap())
                .collect();
            let final_value = input.amount * compound_returns(&returns);
            let expected = annualized_return(final_value, input.amount, point.holding_years).unwrap();
            prop_assert!(
                (point.cagr - expected).abs() < dec!(0.0000000001),
                "{} {}: {} vs {}", id, point.calendar_year, point.cagr, expected
            );
        }
    }
}
