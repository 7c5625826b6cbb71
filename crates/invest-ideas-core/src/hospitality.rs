use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::cagr::{
    annualized_return, clamp_assumption, project_cagr, validate_horizon, ProjectionInput,
    ProjectionOutput,
};
use crate::cashflow::{CashFlowContext, ExpenseItem, OperatingAssumptions, RevenueModel};
use crate::cost::{AcquisitionParameters, DisposalSchedule};
use crate::error::InvestIdeasError;
use crate::growth::bounded_ratio;
use crate::tables::history::SPAIN_INFLATION_50Y_AVG;
use crate::tables::presets::brazil;
use crate::tables::schedule::{validate_amount, TaxRegime};
use crate::types::{to_pct, with_metadata, ComputationOutput, Currency, Money, Rate};
use crate::InvestIdeasResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostLine {
    pub label: String,
    pub amount: Money,
}

impl CostLine {
    fn new(label: &str, amount: Money) -> Self {
        CostLine {
            label: label.to_string(),
            amount,
        }
    }
}

/// A guesthouse bought or built in Brazil and run through a Spanish company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HospitalityInput {
    pub name: String,
    #[serde(default)]
    pub currency: Currency,
    /// Purchase price, or land + construction + fit-out + licences
    pub investment: Vec<CostLine>,
    pub rooms: u32,
    pub nightly_rate: Money,
    pub occupancy: Rate,
    /// Operating costs as a share of revenue
    pub operating_cost_share: Rate,
    pub annual_maintenance: Money,
    pub annual_accounting: Money,
    #[serde(default)]
    pub revenue_growth: Rate,
    pub appreciation_rate: Rate,
    #[serde(default = "default_horizon")]
    pub horizon_years: u32,
}

fn default_horizon() -> u32 {
    25
}

/// Built-in scenarios shown on the showcase pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HospitalityPreset {
    /// Running 15-room pousada bought as a going concern
    ExistingBusiness,
    /// Land purchase plus construction of an 18-room pousada, EUR
    LandAndConstruction,
    /// Same development budgeted in BRL at a higher nightly rate
    BrlDevelopment,
}

impl HospitalityPreset {
    pub fn input(&self) -> HospitalityInput {
        match self {
            HospitalityPreset::ExistingBusiness => HospitalityInput {
                name: "Existing pousada".into(),
                currency: Currency::EUR,
                investment: vec![CostLine::new("purchase price", dec!(340000))],
                rooms: 15,
                nightly_rate: dec!(50),
                occupancy: dec!(0.55),
                operating_cost_share: dec!(0.40),
                annual_maintenance: dec!(8000),
                annual_accounting: dec!(2000),
                revenue_growth: dec!(0.05),
                appreciation_rate: dec!(0.10),
                horizon_years: default_horizon(),
            },
            HospitalityPreset::LandAndConstruction => HospitalityInput {
                name: "Pousada land and construction".into(),
                currency: Currency::EUR,
                investment: vec![
                    CostLine::new("land", dec!(100000)),
                    CostLine::new("construction", dec!(595000)),
                    CostLine::new("pool and gardens", dec!(40000)),
                    CostLine::new("licences", dec!(32000)),
                ],
                rooms: 18,
                nightly_rate: dec!(250),
                occupancy: dec!(0.45),
                operating_cost_share: dec!(0.35),
                annual_maintenance: dec!(12000),
                annual_accounting: dec!(2000),
                revenue_growth: Decimal::ZERO,
                appreciation_rate: dec!(0.10),
                horizon_years: default_horizon(),
            },
            HospitalityPreset::BrlDevelopment => HospitalityInput {
                name: "Pousada development (BRL)".into(),
                currency: Currency::BRL,
                investment: vec![
                    CostLine::new("land", dec!(600000)),
                    CostLine::new("construction", dec!(3740000)),
                    CostLine::new("pool and gardens", dec!(250000)),
                    CostLine::new("licences", dec!(200000)),
                ],
                rooms: 18,
                nightly_rate: dec!(400),
                occupancy: dec!(0.45),
                operating_cost_share: dec!(0.35),
                annual_maintenance: dec!(50000),
                annual_accounting: dec!(12000),
                revenue_growth: Decimal::ZERO,
                appreciation_rate: dec!(0.10),
                horizon_years: default_horizon(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HospitalityYear {
    pub year: u32,
    pub property_net_cagr_pct: Decimal,
    pub business_net_cagr_pct: Decimal,
    pub combined_net_cagr_pct: Decimal,
    pub property_gross_pct: Decimal,
    pub business_gross_pct: Decimal,
    pub inflation_pct: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HospitalityOutput {
    pub name: String,
    pub currency: Currency,
    pub total_cost: Money,
    /// Euro value of `total_cost` for BRL scenarios
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_cost_eur: Option<Money>,
    pub appreciation_rate: Rate,
    pub first_year_revenue: Money,
    pub years: Vec<HospitalityYear>,
    /// Property, business and tax model projected together
    pub combined: ProjectionOutput,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

pub fn analyze_hospitality(
    input: &HospitalityInput,
) -> InvestIdeasResult<ComputationOutput<HospitalityOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if let Some(w) = validate_horizon(input.horizon_years)? {
        warnings.push(w);
    }
    let total_cost = total_cost(input)?;
    let appreciation = clamp_assumption(
        "appreciation_rate",
        input.appreciation_rate,
        brazil::APPRECIATION_MIN,
        brazil::APPRECIATION_MAX,
        &mut warnings,
    );

    let operating = operating_assumptions(input);
    operating.validate()?;
    let regime = brazil::cross_border_regime();

    let property = project_cagr(&property_scenario(input, total_cost, appreciation))?;
    let combined = project_cagr(&combined_scenario(input, total_cost, appreciation))?;
    warnings.extend(combined.warnings.iter().map(|w| format!("combined: {w}")));

    let business_flows = CashFlowContext {
        operating: &operating,
        regime: &regime,
        financing: None,
        asset_base: total_cost,
        appreciation_rate: appreciation,
    }
    .project(input.horizon_years)?;

    let mut years = Vec::with_capacity(business_flows.len());
    for ((flow, prop), comb) in business_flows
        .iter()
        .zip(property.result.years.iter())
        .zip(combined.result.years.iter())
    {
        let business_cagr = annualized_return(
            total_cost + flow.cumulative_net_cash_flow,
            total_cost,
            flow.year,
        )?;
        years.push(HospitalityYear {
            year: flow.year,
            property_net_cagr_pct: prop.cagr_pct,
            business_net_cagr_pct: to_pct(business_cagr),
            combined_net_cagr_pct: comb.cagr_pct,
            property_gross_pct: to_pct(appreciation),
            business_gross_pct: to_pct(bounded_ratio(flow.gross_income, total_cost)?),
            inflation_pct: to_pct(SPAIN_INFLATION_50Y_AVG),
        });
    }

    let total_cost_eur = match input.currency {
        Currency::BRL => Some(total_cost * brazil::BRL_EUR),
        _ => None,
    };

    let output = HospitalityOutput {
        name: input.name.clone(),
        currency: input.currency.clone(),
        total_cost,
        total_cost_eur,
        appreciation_rate: appreciation,
        first_year_revenue: operating.revenue_in_year(1)?,
        years,
        combined: combined.result,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Brazilian guesthouse: property-only, business-only and integrated net CAGR under Simples Nacional, repatriation withholding and Spanish corporate tax",
        input,
        warnings,
        elapsed,
        output,
    ))
}

fn total_cost(input: &HospitalityInput) -> InvestIdeasResult<Money> {
    let mut total = Decimal::ZERO;
    for line in &input.investment {
        validate_amount("investment", line.amount)?;
        total += line.amount;
    }
    validate_amount("investment", total)?;
    if total <= Decimal::ZERO {
        return Err(InvestIdeasError::invalid(
            "investment",
            "Total investment must be positive",
        ));
    }
    Ok(total)
}

fn operating_assumptions(input: &HospitalityInput) -> OperatingAssumptions {
    OperatingAssumptions {
        revenue: RevenueModel::Nightly {
            rooms: input.rooms,
            nightly_rate: input.nightly_rate,
            occupancy: input.occupancy,
        },
        revenue_growth: input.revenue_growth,
        expenses: vec![
            ExpenseItem::share_of_revenue("operating costs", input.operating_cost_share),
            ExpenseItem::flat("maintenance", input.annual_maintenance),
            ExpenseItem::flat("accounting", input.annual_accounting),
        ],
        flat_expense_growth: Decimal::ZERO,
    }
}

fn property_scenario(input: &HospitalityInput, total_cost: Money, appreciation: Rate) -> ProjectionInput {
    ProjectionInput {
        name: format!("{} (property)", input.name),
        currency: input.currency.clone(),
        acquisition: AcquisitionParameters::cash_purchase(total_cost, brazil::purchase_tax()),
        operating: OperatingAssumptions::default(),
        tax_regime: TaxRegime::default(),
        disposal: DisposalSchedule {
            capital_gains_tax: brazil::CAPITAL_GAINS_TAX,
            ..Default::default()
        },
        appreciation_rate: appreciation,
        horizon_years: input.horizon_years,
        capital_gains_basis: None,
    }
}

/// Property and business in one projection: one investment, one sale, one
/// stream of after-tax profits.
pub fn combined_scenario(
    input: &HospitalityInput,
    total_cost: Money,
    appreciation: Rate,
) -> ProjectionInput {
    ProjectionInput {
        name: input.name.clone(),
        operating: operating_assumptions(input),
        tax_regime: brazil::cross_border_regime(),
        ..property_scenario(input, total_cost, appreciation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_existing_business_first_year() {
        let out = analyze_hospitality(&HospitalityPreset::ExistingBusiness.input()).unwrap();
        let r = &out.result;
        assert_eq!(r.total_cost, dec!(340000));
        assert_eq!(r.first_year_revenue, dec!(150562.5));
        assert_eq!(r.combined.initial_investment, dec!(353600));

        // business only: (340000 + 63775.625 * 0.6375) / 340000 - 1
        let expected = to_pct(
            (dec!(340000) + dec!(63775.625) * dec!(0.6375)) / dec!(340000) - Decimal::ONE,
        );
        assert_eq!(r.years[0].business_net_cagr_pct, expected);
    }

    #[test]
    fn test_property_only_first_year() {
        let out = analyze_hospitality(&HospitalityPreset::ExistingBusiness.input()).unwrap();
        // value 374000, CGT 5100, investment 353600
        let expected = to_pct(dec!(368900) / dec!(353600) - Decimal::ONE);
        assert_eq!(out.result.years[0].property_net_cagr_pct, expected);
    }

    #[test]
    fn test_combined_between_parts_not_their_sum() {
        let out = analyze_hospitality(&HospitalityPreset::LandAndConstruction.input()).unwrap();
        for y in &out.result.years {
            assert!(y.combined_net_cagr_pct > y.property_net_cagr_pct);
            assert!(
                y.combined_net_cagr_pct < y.property_net_cagr_pct + y.business_net_cagr_pct
            );
        }
    }

    #[test]
    fn test_brl_scenario_reports_eur_cost() {
        let out = analyze_hospitality(&HospitalityPreset::BrlDevelopment.input()).unwrap();
        assert_eq!(out.result.total_cost, dec!(4790000));
        assert_eq!(out.result.total_cost_eur, Some(dec!(761610)));
        assert_eq!(out.result.currency, Currency::BRL);
    }

    #[test]
    fn test_construction_budget_sums_lines() {
        let input = HospitalityPreset::LandAndConstruction.input();
        assert_eq!(total_cost(&input).unwrap(), dec!(767000));
    }

    #[test]
    fn test_empty_investment_rejected() {
        let mut input = HospitalityPreset::ExistingBusiness.input();
        input.investment.clear();
        assert!(analyze_hospitality(&input).is_err());
    }
}
