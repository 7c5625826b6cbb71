use chrono::{Datelike, Utc};
use log::{debug, warn};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::cagr::annualized_return;
use crate::cost::{acquisition_costs, AcquisitionParameters, DisposalSchedule};
use crate::error::InvestIdeasError;
use crate::tables::history::{find_series, HistoricalSeries, SeriesKind, MSCI_WORLD, SP_500};
use crate::tables::presets::spain;
use crate::tables::schedule::{validate_amount, TransactionTaxSchedule};
use crate::types::{to_pct, with_metadata, CalendarYear, ComputationOutput, Money, Rate};
use crate::InvestIdeasResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestInput {
    /// Series ids from the built-in history tables
    #[serde(default = "default_series")]
    pub series: Vec<String>,
    pub entry_year: CalendarYear,
    /// Last calendar year to report; the run also stops at the first gap
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_year: Option<CalendarYear>,
    #[serde(default = "default_amount")]
    pub amount: Money,
    #[serde(default = "default_purchase_fee")]
    pub purchase_fee: TransactionTaxSchedule,
    #[serde(default = "default_disposal")]
    pub disposal: DisposalSchedule,
    /// Inflation series used for the real CAGR, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inflation_series: Option<String>,
}

fn default_series() -> Vec<String> {
    vec![MSCI_WORLD.to_string(), SP_500.to_string()]
}

fn default_amount() -> Money {
    dec!(50000)
}

fn default_purchase_fee() -> TransactionTaxSchedule {
    spain::broker_commission()
}

fn default_disposal() -> DisposalSchedule {
    DisposalSchedule {
        sale_fee: spain::broker_commission(),
        capital_gains_tax: spain::CORPORATE_TAX,
        ..Default::default()
    }
}

impl BacktestInput {
    pub fn new(series: &[&str], entry_year: CalendarYear) -> Self {
        BacktestInput {
            series: series.iter().map(|s| s.to_string()).collect(),
            entry_year,
            end_year: None,
            amount: default_amount(),
            purchase_fee: default_purchase_fee(),
            disposal: default_disposal(),
            inflation_series: None,
        }
    }
}

/// Liquidation at the end of one calendar year of the realised path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestPoint {
    pub calendar_year: CalendarYear,
    pub holding_years: u32,
    pub gross_value: Money,
    pub disposal_costs: Money,
    pub net_value: Money,
    pub cagr: Rate,
    pub cagr_pct: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub real_cagr_pct: Option<Decimal>,
}

/// Change observed in one calendar year, not compounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservedChange {
    pub calendar_year: CalendarYear,
    pub change_pct: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum SeriesBacktest {
    Available {
        series_id: String,
        name: String,
        kind: SeriesKind,
        points: Vec<BacktestPoint>,
        observed_changes: Vec<ObservedChange>,
        /// First missing year when a gap cut the run short
        #[serde(skip_serializing_if = "Option::is_none")]
        stopped_at_gap: Option<CalendarYear>,
    },
    Unavailable {
        series_id: String,
        reason: String,
    },
}

impl SeriesBacktest {
    pub fn series_id(&self) -> &str {
        match self {
            SeriesBacktest::Available { series_id, .. } => series_id,
            SeriesBacktest::Unavailable { series_id, .. } => series_id,
        }
    }

    pub fn points(&self) -> &[BacktestPoint] {
        match self {
            SeriesBacktest::Available { points, .. } => points,
            SeriesBacktest::Unavailable { .. } => &[],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestOutput {
    pub entry_year: CalendarYear,
    /// Amount paid including purchase fees; the CAGR denominator
    pub initial_investment: Money,
    pub series: Vec<SeriesBacktest>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Replay the built-in historical series from `entry_year`.
pub fn run_backtest(input: &BacktestInput) -> InvestIdeasResult<ComputationOutput<BacktestOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_input(input)?;
    let inflation = match &input.inflation_series {
        Some(id) => Some(lookup(id)?),
        None => None,
    };

    let mut results = Vec::with_capacity(input.series.len());
    for id in &input.series {
        let series = lookup(id)?;
        let result = backtest_series(&series, input, inflation.as_ref())?;
        match &result {
            SeriesBacktest::Unavailable { series_id, reason } => {
                warn!("backtest {series_id} unavailable: {reason}");
                warnings.push(format!("{series_id}: {reason}"));
            }
            SeriesBacktest::Available {
                series_id,
                stopped_at_gap: Some(gap),
                ..
            } => {
                warnings.push(format!("{series_id}: no observation for {gap}, run stopped"));
            }
            _ => {}
        }
        results.push(result);
    }

    debug!(
        "backtest from {} over {} series",
        input.entry_year,
        results.len()
    );

    let output = BacktestOutput {
        entry_year: input.entry_year,
        initial_investment: initial_investment(input)?,
        series: results,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Historical backtest: realised path compounded from the entry year, liquidated at each year end net of fees and capital gains tax",
        input,
        warnings,
        elapsed,
        output,
    ))
}

/// Realised CAGR curve of one series. Never synthesises missing years.
pub fn backtest_series(
    series: &HistoricalSeries,
    input: &BacktestInput,
    inflation: Option<&HistoricalSeries>,
) -> InvestIdeasResult<SeriesBacktest> {
    let entry = input.entry_year;
    let Some(entry_level) = series.get(entry) else {
        let reason = match series.first_year() {
            Some(first) if first > entry => {
                format!("series starts in {first}, after entry year {entry}")
            }
            _ => format!("no observation for entry year {entry}"),
        };
        return Ok(SeriesBacktest::Unavailable {
            series_id: series.id.clone(),
            reason,
        });
    };

    let last = input.end_year.unwrap_or(CalendarYear::MAX);
    let run: Vec<(CalendarYear, Decimal)> = series
        .contiguous_from(entry)
        .into_iter()
        .take_while(|(year, _)| *year <= last)
        .collect();
    let run_end = run.last().map(|(y, _)| *y).unwrap_or(entry);
    let stopped_at_gap = (run_end < last && series.last_year().is_some_and(|l| l > run_end))
        .then_some(run_end + 1);

    let initial = initial_investment(input)?;
    let invested = input.amount;
    let mut points = Vec::new();
    let mut growth = Decimal::ONE;

    for (year, value) in &run {
        let holding_years = match series.kind {
            SeriesKind::AnnualReturn => {
                growth *= Decimal::ONE + value;
                (year - entry + 1) as u32
            }
            SeriesKind::PriceLevel => {
                if *year == entry {
                    continue;
                }
                if entry_level <= Decimal::ZERO {
                    return Err(InvestIdeasError::InsufficientData(format!(
                        "{} has a non-positive level in {entry}",
                        series.id
                    )));
                }
                growth = value / entry_level;
                (year - entry) as u32
            }
        };

        let gross_value = invested * growth;
        let disposal = input.disposal.costs(gross_value, initial);
        let net_value = gross_value - disposal.total;
        let cagr = annualized_return(net_value, initial, holding_years)?;
        let real_cagr_pct = match inflation {
            Some(cpi) => real_cagr(cpi, series.kind, entry, *year, net_value, initial, holding_years)?
                .map(to_pct),
            None => None,
        };

        points.push(BacktestPoint {
            calendar_year: *year,
            holding_years,
            gross_value,
            disposal_costs: disposal.total,
            net_value,
            cagr,
            cagr_pct: to_pct(cagr),
            real_cagr_pct,
        });
    }

    if points.is_empty() {
        return Ok(SeriesBacktest::Unavailable {
            series_id: series.id.clone(),
            reason: format!("no observations after entry year {entry}"),
        });
    }

    let observed_changes = series
        .year_over_year()
        .into_iter()
        .filter(|(year, _)| *year >= entry && *year <= run_end)
        .map(|(calendar_year, change)| ObservedChange {
            calendar_year,
            change_pct: to_pct(change),
        })
        .collect();

    Ok(SeriesBacktest::Available {
        series_id: series.id.clone(),
        name: series.name.clone(),
        kind: series.kind,
        points,
        observed_changes,
        stopped_at_gap,
    })
}

/// Inflation-adjusted CAGR over the calendar years actually held, or `None`
/// when the inflation series does not cover all of them.
fn real_cagr(
    cpi: &HistoricalSeries,
    kind: SeriesKind,
    entry: CalendarYear,
    year: CalendarYear,
    net_value: Money,
    initial: Money,
    holding_years: u32,
) -> InvestIdeasResult<Option<Rate>> {
    let first_held = match kind {
        SeriesKind::AnnualReturn => entry,
        SeriesKind::PriceLevel => entry + 1,
    };
    let mut factor = Decimal::ONE;
    for y in first_held..=year {
        match cpi.get(y) {
            Some(rate) => factor *= Decimal::ONE + rate,
            None => return Ok(None),
        }
    }
    if factor <= Decimal::ZERO {
        return Ok(None);
    }
    annualized_return(net_value / factor, initial, holding_years).map(Some)
}

/// Amount plus purchase fees, the denominator of every realised CAGR.
fn initial_investment(input: &BacktestInput) -> InvestIdeasResult<Money> {
    let params = AcquisitionParameters::cash_purchase(input.amount, input.purchase_fee.clone());
    Ok(acquisition_costs(&params)?.total_investment)
}

/// Compound a sequence of yearly returns: Π(1 + r).
pub fn compound_returns(returns: &[Rate]) -> Decimal {
    returns
        .iter()
        .fold(Decimal::ONE, |acc, r| acc * (Decimal::ONE + r))
}

fn lookup(id: &str) -> InvestIdeasResult<HistoricalSeries> {
    find_series(id).ok_or_else(|| InvestIdeasError::NotFound {
        entity: "series".into(),
        id: id.to_string(),
    })
}

fn validate_input(input: &BacktestInput) -> InvestIdeasResult<()> {
    if input.series.is_empty() {
        return Err(InvestIdeasError::invalid(
            "series",
            "Select at least one series",
        ));
    }
    if input.amount <= Decimal::ZERO {
        return Err(InvestIdeasError::invalid(
            "amount",
            "Amount must be positive",
        ));
    }
    validate_amount("amount", input.amount)?;
    let current_year = Utc::now().year();
    if input.entry_year > current_year {
        return Err(InvestIdeasError::invalid(
            "entry_year",
            format!("Entry year {} is after {current_year}", input.entry_year),
        ));
    }
    if let Some(end) = input.end_year {
        if end < input.entry_year {
            return Err(InvestIdeasError::invalid(
                "end_year",
                "End year cannot precede the entry year",
            ));
        }
    }
    input.purchase_fee.validate("purchase_fee")?;
    input.disposal.validate()
}
