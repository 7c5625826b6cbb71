use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;

use crate::cagr::{clamp_assumption, project_cagr, ProjectionInput, ProjectionOutput};
use crate::cashflow::OperatingAssumptions;
use crate::cost::{AcquisitionParameters, DisposalSchedule};
use crate::error::InvestIdeasError;
use crate::tables::history::{
    BONDS_AAA_EUR, MSCI_WORLD, MSCI_WORLD_SRI, NASDAQ_100, SPAIN_INFLATION_50Y_AVG, SP_500,
};
use crate::tables::presets::spain;
use crate::tables::schedule::{validate_amount, TaxRegime, TransactionTaxSchedule};
use crate::types::{to_pct, with_metadata, ComputationOutput, Currency, Money, Rate};
use crate::InvestIdeasResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Expected-return assumptions for one tracked index product.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AssetProfile {
    pub id: &'static str,
    pub name: &'static str,
    pub default_return: Rate,
    pub min_return: Rate,
    pub max_return: Rate,
}

pub const ASSET_CATALOGUE: [AssetProfile; 5] = [
    AssetProfile {
        id: MSCI_WORLD,
        name: "MSCI World",
        default_return: dec!(0.085),
        min_return: dec!(0.05),
        max_return: dec!(0.12),
    },
    AssetProfile {
        id: NASDAQ_100,
        name: "Nasdaq-100",
        default_return: dec!(0.13),
        min_return: dec!(0.08),
        max_return: dec!(0.18),
    },
    AssetProfile {
        id: SP_500,
        name: "S&P 500",
        default_return: dec!(0.105),
        min_return: dec!(0.06),
        max_return: dec!(0.15),
    },
    AssetProfile {
        id: MSCI_WORLD_SRI,
        name: "MSCI World SRI",
        default_return: dec!(0.075),
        min_return: dec!(0.04),
        max_return: dec!(0.11),
    },
    AssetProfile {
        id: BONDS_AAA_EUR,
        name: "Bonds AAA EUR",
        default_return: dec!(0.025),
        min_return: dec!(0.01),
        max_return: dec!(0.05),
    },
];

pub fn find_asset(id: &str) -> Option<&'static AssetProfile> {
    ASSET_CATALOGUE.iter().find(|a| a.id == id)
}

/// An asset to project, optionally overriding its default return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetSelection {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annual_return: Option<Rate>,
}

impl AssetSelection {
    pub fn new(id: &str) -> Self {
        AssetSelection {
            id: id.to_string(),
            annual_return: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialProductsInput {
    #[serde(default = "default_investment")]
    pub initial_investment: Money,
    #[serde(default = "default_horizon")]
    pub horizon_years: u32,
    #[serde(default = "default_selection")]
    pub assets: Vec<AssetSelection>,
    /// Tax on realised gains; company holder by default
    #[serde(default = "default_gains_tax")]
    pub capital_gains_tax: Rate,
}

fn default_investment() -> Money {
    dec!(50000)
}

fn default_horizon() -> u32 {
    20
}

fn default_selection() -> Vec<AssetSelection> {
    vec![AssetSelection::new(MSCI_WORLD), AssetSelection::new(SP_500)]
}

fn default_gains_tax() -> Rate {
    spain::CORPORATE_TAX
}

impl Default for FinancialProductsInput {
    fn default() -> Self {
        FinancialProductsInput {
            initial_investment: default_investment(),
            horizon_years: default_horizon(),
            assets: default_selection(),
            capital_gains_tax: default_gains_tax(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetProjection {
    pub id: String,
    pub name: String,
    pub annual_return: Rate,
    /// (return − custody) × (1 − savings tax), for quick comparison
    pub approximate_net_return: Rate,
    pub projection: ProjectionOutput,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductCurvePoint {
    pub year: u32,
    /// Net CAGR in percent keyed by asset id
    pub cagr_pct: BTreeMap<String, Decimal>,
    pub inflation_pct: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialProductsOutput {
    pub buy_commission: Money,
    /// Buy plus a sale of the same size
    pub round_trip_commission: Money,
    pub assets: Vec<AssetProjection>,
    pub curve: Vec<ProductCurvePoint>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Project each selected product bought with a single lump sum and sold at
/// the end of every year.
pub fn project_financial_products(
    input: &FinancialProductsInput,
) -> InvestIdeasResult<ComputationOutput<FinancialProductsOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_input(input)?;
    let buy_commission = spain::broker_commission().tax_on(input.initial_investment);

    let mut assets = Vec::with_capacity(input.assets.len());
    for selection in &input.assets {
        let profile = find_asset(&selection.id).ok_or_else(|| InvestIdeasError::NotFound {
            entity: "asset".into(),
            id: selection.id.clone(),
        })?;
        let annual_return = clamp_assumption(
            &format!("{} annual_return", profile.id),
            selection.annual_return.unwrap_or(profile.default_return),
            profile.min_return,
            profile.max_return,
            &mut warnings,
        );

        let projection = project_cagr(&lump_sum_scenario(
            profile,
            input.initial_investment,
            annual_return,
            input.horizon_years,
            input.capital_gains_tax,
        ))?;
        warnings.extend(
            projection
                .warnings
                .into_iter()
                .map(|w| format!("{}: {w}", profile.id)),
        );

        assets.push(AssetProjection {
            id: profile.id.to_string(),
            name: profile.name.to_string(),
            annual_return,
            approximate_net_return: approximate_net_return(
                annual_return,
                spain::CUSTODY_FEE,
                spain::SAVINGS_TAX,
            ),
            projection: projection.result,
        });
    }

    let curve = (1..=input.horizon_years)
        .map(|year| ProductCurvePoint {
            year,
            cagr_pct: assets
                .iter()
                .filter_map(|a| {
                    a.projection
                        .years
                        .get((year - 1) as usize)
                        .map(|y| (a.id.clone(), y.cagr_pct))
                })
                .collect(),
            inflation_pct: to_pct(SPAIN_INFLATION_50Y_AVG),
        })
        .collect();

    let output = FinancialProductsOutput {
        buy_commission,
        round_trip_commission: buy_commission * dec!(2),
        assets,
        curve,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Lump-sum index products: clamped broker commission on both legs, capital gains tax on sale",
        input,
        warnings,
        elapsed,
        output,
    ))
}

/// Simple yearly net return ignoring compounding of fees and deferral of tax.
pub fn approximate_net_return(gross_return: Rate, custody_fee: Rate, tax_rate: Rate) -> Rate {
    (gross_return - custody_fee) * (Decimal::ONE - tax_rate)
}

/// The buy commission comes out of the invested amount; capital gains are
/// measured against the full outlay.
pub fn lump_sum_scenario(
    profile: &AssetProfile,
    amount: Money,
    annual_return: Rate,
    horizon_years: u32,
    capital_gains_tax: Rate,
) -> ProjectionInput {
    let commission = spain::broker_commission().tax_on(amount);
    let mut acquisition =
        AcquisitionParameters::cash_purchase(amount - commission, TransactionTaxSchedule::Exempt);
    acquisition.flat_fees = commission;

    ProjectionInput {
        name: profile.name.to_string(),
        currency: Currency::EUR,
        acquisition,
        operating: OperatingAssumptions::default(),
        tax_regime: TaxRegime::default(),
        disposal: DisposalSchedule {
            sale_fee: spain::broker_commission(),
            capital_gains_tax,
            ..Default::default()
        },
        appreciation_rate: annual_return,
        horizon_years,
        capital_gains_basis: Some(amount),
    }
}

fn validate_input(input: &FinancialProductsInput) -> InvestIdeasResult<()> {
    if input.initial_investment <= spain::BROKER_COMMISSION_MAX {
        return Err(InvestIdeasError::invalid(
            "initial_investment",
            "Investment must exceed the broker commission",
        ));
    }
    validate_amount("initial_investment", input.initial_investment)?;
    if input.assets.is_empty() {
        return Err(InvestIdeasError::invalid(
            "assets",
            "Select at least one asset",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_first_year_msci_world() {
        let input = FinancialProductsInput {
            assets: vec![AssetSelection::new(MSCI_WORLD)],
            ..Default::default()
        };
        let out = project_financial_products(&input).unwrap();
        // 49975 * 1.085 = 54222.875; sell 25; CGT (4222.875 * 0.25)
        let y1 = &out.result.assets[0].projection.years[0];
        assert_eq!(y1.final_net_value, dec!(53142.15625));
        assert_eq!(y1.cagr, dec!(0.062843125));
        assert_eq!(out.result.buy_commission, dec!(25));
        assert_eq!(out.result.round_trip_commission, dec!(50));
    }

    #[test]
    fn test_outlay_is_gross_amount() {
        let out = project_financial_products(&FinancialProductsInput::default()).unwrap();
        for asset in &out.result.assets {
            assert_eq!(asset.projection.initial_investment, dec!(50000));
        }
        assert_eq!(out.result.curve.len(), 20);
        assert_eq!(out.result.curve[0].cagr_pct.len(), 2);
    }

    #[test]
    fn test_approximate_net_return() {
        // (0.08 - 0.0015) * 0.79
        assert_eq!(
            approximate_net_return(dec!(0.08), spain::CUSTODY_FEE, spain::SAVINGS_TAX),
            dec!(0.0620150)
        );
    }

    #[test]
    fn test_unknown_asset_not_found() {
        let input = FinancialProductsInput {
            assets: vec![AssetSelection::new("gold")],
            ..Default::default()
        };
        assert!(matches!(
            project_financial_products(&input),
            Err(InvestIdeasError::NotFound { .. })
        ));
    }

    #[test]
    fn test_return_clamped_to_asset_bounds() {
        let input = FinancialProductsInput {
            assets: vec![AssetSelection {
                id: BONDS_AAA_EUR.into(),
                annual_return: Some(dec!(0.09)),
            }],
            ..Default::default()
        };
        let out = project_financial_products(&input).unwrap();
        assert_eq!(out.result.assets[0].annual_return, dec!(0.05));
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_small_amount_commission_floor() {
        assert_eq!(spain::broker_commission().tax_on(dec!(500)), dec!(1));
    }
}
