//! Catalonia residential property held through a company, compared vacant
//! versus let.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::cagr::{clamp_assumption, project_cagr, ProjectionInput, ProjectionOutput};
use crate::cashflow::{ExpenseItem, OperatingAssumptions, RevenueModel};
use crate::cost::{AcquisitionCosts, AcquisitionParameters, DisposalSchedule};
use crate::error::InvestIdeasError;
use crate::financing::Financing;
use crate::tables::history::SPAIN_INFLATION_50Y_AVG;
use crate::tables::presets::catalonia;
use crate::tables::schedule::{validate_amount, TaxRegime, TransactionTaxSchedule};
use crate::types::{to_pct, with_metadata, ComputationOutput, Currency, Money, Rate};
use crate::InvestIdeasResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Selects the transfer tax applied at purchase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyType {
    /// ITP progressive schedule
    #[default]
    SecondHand,
    /// IVA + AJD
    NewBuild,
}

impl PropertyType {
    pub fn transfer_tax(&self) -> TransactionTaxSchedule {
        match self {
            PropertyType::SecondHand => catalonia::itp_second_hand(),
            PropertyType::NewBuild => catalonia::new_build_vat_ajd(),
        }
    }
}

/// Mortgage terms; origination costs come from the Catalonia presets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MortgageTerms {
    pub loan_amount: Money,
    pub annual_rate: Rate,
    pub term_years: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentalPropertyInput {
    pub price: Money,
    #[serde(default)]
    pub property_type: PropertyType,
    #[serde(default = "default_appreciation")]
    pub appreciation_rate: Rate,
    #[serde(default = "default_horizon")]
    pub horizon_years: u32,
    pub monthly_rent: Money,
    /// IBI, community, insurance, maintenance
    #[serde(default = "default_holding_costs")]
    pub annual_holding_costs: Money,
    #[serde(default = "default_management_hours")]
    pub management_hours_per_month: Decimal,
    #[serde(default = "default_hourly_rate")]
    pub management_hourly_rate: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mortgage: Option<MortgageTerms>,
    #[serde(default)]
    pub legal_representation: bool,
    /// Let through an agency instead of self-managing
    #[serde(default)]
    pub rental_agency: bool,
    /// Grow rent with long-run Spanish inflation
    #[serde(default)]
    pub historical_rent: bool,
}

fn default_appreciation() -> Rate {
    catalonia::APPRECIATION_CONSERVATIVE
}

fn default_horizon() -> u32 {
    25
}

fn default_holding_costs() -> Money {
    dec!(3500)
}

fn default_management_hours() -> Decimal {
    Decimal::from(catalonia::MANAGEMENT_HOURS_PER_MONTH)
}

fn default_hourly_rate() -> Money {
    catalonia::MANAGEMENT_HOURLY_RATE
}

impl RentalPropertyInput {
    /// The 300 000 EUR flat let at 1 000 EUR/month used on the showcase page.
    pub fn showcase() -> Self {
        RentalPropertyInput {
            price: dec!(300000),
            property_type: PropertyType::SecondHand,
            appreciation_rate: default_appreciation(),
            horizon_years: default_horizon(),
            monthly_rent: dec!(1000),
            annual_holding_costs: default_holding_costs(),
            management_hours_per_month: default_management_hours(),
            management_hourly_rate: default_hourly_rate(),
            mortgage: None,
            legal_representation: false,
            rental_agency: false,
            historical_rent: false,
        }
    }
}

/// One point of the vacant-vs-let chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentalCurvePoint {
    pub year: u32,
    pub vacant_net_cagr_pct: Decimal,
    pub rented_net_cagr_pct: Decimal,
    pub vacant_gross_pct: Decimal,
    pub rented_gross_pct: Decimal,
    pub inflation_pct: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RentalAnalysisOutput {
    /// Appreciation after clamping to the allowed range
    pub appreciation_rate: Rate,
    pub acquisition: AcquisitionCosts,
    pub annual_management_cost: Money,
    pub curve: Vec<RentalCurvePoint>,
    pub vacant: ProjectionOutput,
    pub rented: ProjectionOutput,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

pub fn analyze_rental_property(
    input: &RentalPropertyInput,
) -> InvestIdeasResult<ComputationOutput<RentalAnalysisOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_input(input)?;
    let appreciation = clamp_assumption(
        "appreciation_rate",
        input.appreciation_rate,
        catalonia::APPRECIATION_MIN,
        catalonia::APPRECIATION_MAX,
        &mut warnings,
    );

    let vacant = project_cagr(&scenario(input, appreciation, false))?;
    let rented = project_cagr(&scenario(input, appreciation, true))?;
    warnings.extend(vacant.warnings.iter().map(|w| format!("vacant: {w}")));
    warnings.extend(rented.warnings.iter().map(|w| format!("rented: {w}")));

    let vacant_gross_pct = to_pct(vacant.result.gross_return);
    let rented_gross_pct = to_pct(rented.result.gross_return);
    let curve = vacant
        .result
        .years
        .iter()
        .zip(rented.result.years.iter())
        .map(|(v, r)| RentalCurvePoint {
            year: v.year,
            vacant_net_cagr_pct: v.cagr_pct,
            rented_net_cagr_pct: r.cagr_pct,
            vacant_gross_pct,
            rented_gross_pct,
            inflation_pct: to_pct(SPAIN_INFLATION_50Y_AVG),
        })
        .collect();

    let output = RentalAnalysisOutput {
        appreciation_rate: appreciation,
        acquisition: rented.result.acquisition.clone(),
        annual_management_cost: management_cost(input),
        curve,
        vacant: vacant.result,
        rented: rented.result,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Catalonia rental property: vacant vs let net CAGR, company-held (corporate tax on rent, capital gains on sale)",
        input,
        warnings,
        elapsed,
        output,
    ))
}

/// Build the projection for either the vacant or the let variant.
pub fn scenario(input: &RentalPropertyInput, appreciation: Rate, rented: bool) -> ProjectionInput {
    let mut expenses = vec![ExpenseItem::flat("holding costs", input.annual_holding_costs)];
    let revenue = if rented {
        if input.rental_agency {
            expenses.push(ExpenseItem::share_of_revenue(
                "rental agency",
                catalonia::RENTAL_AGENCY_FEE,
            ));
        } else {
            expenses.push(ExpenseItem::flat("self-management", management_cost(input)));
        }
        RevenueModel::MonthlyRent {
            monthly_rent: input.monthly_rent,
        }
    } else {
        RevenueModel::None
    };

    let revenue_growth = if rented && input.historical_rent {
        SPAIN_INFLATION_50Y_AVG
    } else {
        Decimal::ZERO
    };

    let acquisition = AcquisitionParameters {
        price: input.price,
        transfer_tax: input.property_type.transfer_tax(),
        notary_pct: Some(catalonia::NOTARY_PCT),
        registry_pct: Some(catalonia::REGISTRY_PCT),
        legal_pct: input.legal_representation.then_some(catalonia::LEGAL_PCT),
        flat_fees: Decimal::ZERO,
        financing: input.mortgage.as_ref().map(|m| Financing {
            loan_amount: m.loan_amount,
            annual_rate: m.annual_rate,
            term_years: m.term_years,
            origination_pct: catalonia::MORTGAGE_ORIGINATION_PCT,
            origination_fixed: catalonia::MORTGAGE_ORIGINATION_FIXED,
        }),
    };

    ProjectionInput {
        name: if rented { "rented" } else { "vacant" }.to_string(),
        currency: Currency::EUR,
        acquisition,
        operating: OperatingAssumptions {
            revenue,
            revenue_growth,
            expenses,
            flat_expense_growth: Decimal::ZERO,
        },
        tax_regime: TaxRegime::single("corporate tax", catalonia::CORPORATE_TAX),
        disposal: DisposalSchedule {
            agent_commission: Some(catalonia::SALE_AGENT_COMMISSION),
            capital_gains_tax: catalonia::PERSONAL_CAPITAL_GAINS_TAX,
            ..Default::default()
        },
        appreciation_rate: appreciation,
        horizon_years: input.horizon_years,
        capital_gains_basis: None,
    }
}

/// Hours in a 31-day month.
const MAX_MANAGEMENT_HOURS: Decimal = dec!(744);

fn management_cost(input: &RentalPropertyInput) -> Money {
    input.management_hours_per_month * dec!(12) * input.management_hourly_rate
}

fn validate_input(input: &RentalPropertyInput) -> InvestIdeasResult<()> {
    validate_amount("monthly_rent", input.monthly_rent)?;
    validate_amount("annual_holding_costs", input.annual_holding_costs)?;
    validate_amount("management_hourly_rate", input.management_hourly_rate)?;
    if input.management_hours_per_month < Decimal::ZERO
        || input.management_hours_per_month > MAX_MANAGEMENT_HOURS
    {
        return Err(InvestIdeasError::invalid(
            "management_hours_per_month",
            format!("Management hours must be between 0 and {MAX_MANAGEMENT_HOURS}"),
        ));
    }
    Ok(())
}
