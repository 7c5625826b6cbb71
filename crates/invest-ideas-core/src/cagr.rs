use log::{debug, warn};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::cashflow::{CashFlowContext, OperatingAssumptions, YearCashFlow};
use crate::cost::{acquisition_costs, AcquisitionCosts, AcquisitionParameters, DisposalSchedule};
use crate::error::InvestIdeasError;
use crate::growth::{bounded_ratio, nth_root};
use crate::tables::schedule::{validate_amount, TaxRegime};
use crate::types::{to_pct, with_metadata, ComputationOutput, Currency, Money, Rate};
use crate::valuation::liquidate;
use crate::InvestIdeasResult;

/// CAGR reported for a year whose final net value is not positive (−100 %).
pub const NON_LIQUIDATABLE_CAGR: Rate = dec!(-1);

pub const MAX_HORIZON_YEARS: u32 = 50;
/// Horizons past this point are accepted but flagged.
pub const LONG_HORIZON_WARNING_YEARS: u32 = 30;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One asset scenario run through the full cost → cash flow → liquidation
/// pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub currency: Currency,
    pub acquisition: AcquisitionParameters,
    #[serde(default)]
    pub operating: OperatingAssumptions,
    #[serde(default)]
    pub tax_regime: TaxRegime,
    #[serde(default)]
    pub disposal: DisposalSchedule,
    /// Yearly appreciation of the asset value (or assumed product return)
    pub appreciation_rate: Rate,
    pub horizon_years: u32,
    /// Capital-gains basis; defaults to the purchase price
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capital_gains_basis: Option<Money>,
}

/// Result of liquidating at the end of one holding year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyResult {
    pub year: u32,
    pub asset_value: Money,
    pub gross_income: Money,
    pub total_expenses: Money,
    pub tax_paid: Money,
    pub net_cash_flow: Money,
    pub cumulative_net_cash_flow: Money,
    pub disposal_costs: Money,
    pub outstanding_loan: Money,
    pub net_liquidation_value: Money,
    /// net_liquidation_value + cumulative_net_cash_flow
    pub final_net_value: Money,
    pub cagr: Rate,
    pub cagr_pct: Decimal,
    pub liquidatable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionOutput {
    pub name: String,
    pub currency: Currency,
    pub acquisition: AcquisitionCosts,
    /// Equity the investor puts in; the CAGR denominator
    pub initial_investment: Money,
    /// Appreciation plus year-1 gross yield on price, before any cost or tax
    pub gross_return: Rate,
    pub years: Vec<YearlyResult>,
    pub final_cagr: Rate,
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Annualised growth from `initial_investment` to `final_value` over `years`.
///
/// Year 1 is the plain ratio − 1. A non-positive final value yields
/// [`NON_LIQUIDATABLE_CAGR`]; a non-positive initial investment is an error.
pub fn annualized_return(
    final_value: Money,
    initial_investment: Money,
    years: u32,
) -> InvestIdeasResult<Rate> {
    if years == 0 {
        return Err(InvestIdeasError::invalid(
            "years",
            "Holding period must be at least 1 year",
        ));
    }
    if initial_investment.is_zero() {
        return Err(InvestIdeasError::DivisionByZero {
            context: "CAGR with zero initial investment".into(),
        });
    }
    if initial_investment < Decimal::ZERO {
        return Err(InvestIdeasError::FinancialImpossibility(format!(
            "Initial investment must be positive, got {initial_investment}"
        )));
    }
    if final_value <= Decimal::ZERO {
        return Ok(NON_LIQUIDATABLE_CAGR);
    }

    let ratio = bounded_ratio(final_value, initial_investment)?;
    if years == 1 {
        return Ok(ratio - Decimal::ONE);
    }
    Ok(nth_root(ratio, years) - Decimal::ONE)
}

/// Check the horizon bound and return a warning when it is unusually long.
pub fn validate_horizon(horizon_years: u32) -> InvestIdeasResult<Option<String>> {
    if horizon_years == 0 || horizon_years > MAX_HORIZON_YEARS {
        return Err(InvestIdeasError::invalid(
            "horizon_years",
            format!("Horizon must be between 1 and {MAX_HORIZON_YEARS} years"),
        ));
    }
    if horizon_years > LONG_HORIZON_WARNING_YEARS {
        return Ok(Some(format!(
            "Horizon of {horizon_years} years exceeds {LONG_HORIZON_WARNING_YEARS}; long projections compound assumption error"
        )));
    }
    Ok(None)
}

/// Clamp a user assumption into `[min, max]`, recording a warning when it moves.
pub fn clamp_assumption(
    field: &str,
    value: Rate,
    min: Rate,
    max: Rate,
    warnings: &mut Vec<String>,
) -> Rate {
    let clamped = value.max(min).min(max);
    if clamped != value {
        warn!("{field} {value} outside [{min}, {max}], clamped to {clamped}");
        warnings.push(format!(
            "{field} {}% outside [{}%, {}%]; using {}%",
            to_pct(value).normalize(),
            to_pct(min).normalize(),
            to_pct(max).normalize(),
            to_pct(clamped).normalize()
        ));
    }
    clamped
}

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

/// Project a scenario over its horizon, liquidating at the end of every year.
pub fn project_cagr(
    input: &ProjectionInput,
) -> InvestIdeasResult<ComputationOutput<ProjectionOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if let Some(w) = validate_horizon(input.horizon_years)? {
        warnings.push(w);
    }
    let acquisition = prepare(input)?;
    let ctx = cash_flow_context(input);
    let flows = ctx.project(input.horizon_years)?;

    let mut years = Vec::with_capacity(flows.len());
    for flow in &flows {
        let result = yearly_result(input, &acquisition, flow)?;
        if !result.liquidatable {
            warnings.push(format!(
                "Year {}: final net value is not positive, CAGR reported as -100%",
                result.year
            ));
        }
        years.push(result);
    }

    let final_cagr = years
        .last()
        .map(|y| y.cagr)
        .unwrap_or(NON_LIQUIDATABLE_CAGR);
    let gross_return = gross_return(input)?;

    debug!(
        "projected '{}' over {} years: investment {}, final CAGR {}",
        input.name, input.horizon_years, acquisition.equity_investment, final_cagr
    );

    let output = ProjectionOutput {
        name: input.name.clone(),
        currency: input.currency.clone(),
        initial_investment: acquisition.equity_investment,
        acquisition,
        gross_return,
        years,
        final_cagr,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Net CAGR: (net liquidation + cumulative net cash flow) / equity, annualised per holding year",
        input,
        warnings,
        elapsed,
        output,
    ))
}

/// Liquidation result for a single year, computed from scratch.
pub fn cagr_at_year(input: &ProjectionInput, year: u32) -> InvestIdeasResult<YearlyResult> {
    validate_horizon(year)?;
    let acquisition = prepare(input)?;
    let ctx = cash_flow_context(input);
    let flows = ctx.project(year)?;
    match flows.last() {
        Some(flow) => yearly_result(input, &acquisition, flow),
        None => Err(InvestIdeasError::invalid("year", "Year must be at least 1")),
    }
}

/// Appreciation plus the year-1 gross revenue yield on price.
pub fn gross_return(input: &ProjectionInput) -> InvestIdeasResult<Rate> {
    let price = input.acquisition.price;
    if price <= Decimal::ZERO {
        return Ok(input.appreciation_rate);
    }
    let revenue = input.operating.revenue_in_year(1)?;
    Ok(input.appreciation_rate + bounded_ratio(revenue, price)?)
}

fn prepare(input: &ProjectionInput) -> InvestIdeasResult<AcquisitionCosts> {
    if input.appreciation_rate <= dec!(-1) || input.appreciation_rate >= Decimal::ONE {
        return Err(InvestIdeasError::invalid(
            "appreciation_rate",
            "Appreciation must be between -100% and 100% per year",
        ));
    }
    if let Some(basis) = input.capital_gains_basis {
        validate_amount("capital_gains_basis", basis)?;
    }
    input.operating.validate()?;
    input.tax_regime.validate()?;
    input.disposal.validate()?;

    let acquisition = acquisition_costs(&input.acquisition)?;
    if acquisition.equity_investment <= Decimal::ZERO {
        return Err(InvestIdeasError::FinancialImpossibility(format!(
            "Equity investment must be positive, got {} (financing covers the whole purchase)",
            acquisition.equity_investment
        )));
    }
    Ok(acquisition)
}

fn cash_flow_context(input: &ProjectionInput) -> CashFlowContext<'_> {
    CashFlowContext {
        operating: &input.operating,
        regime: &input.tax_regime,
        financing: input.acquisition.financing.as_ref(),
        asset_base: input.acquisition.price,
        appreciation_rate: input.appreciation_rate,
    }
}

fn yearly_result(
    input: &ProjectionInput,
    acquisition: &AcquisitionCosts,
    flow: &YearCashFlow,
) -> InvestIdeasResult<YearlyResult> {
    let basis = input
        .capital_gains_basis
        .unwrap_or(input.acquisition.price);
    let liquidation = liquidate(
        input.acquisition.price,
        input.appreciation_rate,
        flow.year,
        &input.disposal,
        basis,
        input.acquisition.financing.as_ref(),
    )?;

    let final_net_value = liquidation.net_proceeds + flow.cumulative_net_cash_flow;
    let cagr = annualized_return(final_net_value, acquisition.equity_investment, flow.year)?;
    let liquidatable = final_net_value > Decimal::ZERO;
    if !liquidatable {
        warn!(
            "'{}' year {}: final net value {} is not positive",
            input.name, flow.year, final_net_value
        );
    }

    Ok(YearlyResult {
        year: flow.year,
        asset_value: liquidation.terminal_value,
        gross_income: flow.gross_income,
        total_expenses: flow.total_expenses(),
        tax_paid: flow.tax_paid(),
        net_cash_flow: flow.net_cash_flow,
        cumulative_net_cash_flow: flow.cumulative_net_cash_flow,
        disposal_costs: liquidation.disposal.total,
        outstanding_loan: liquidation.outstanding_loan,
        net_liquidation_value: liquidation.net_proceeds,
        final_net_value,
        cagr,
        cagr_pct: to_pct(cagr),
        liquidatable,
    })
}
