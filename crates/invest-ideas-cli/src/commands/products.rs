use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use invest_ideas_core::financial_products::{
    self, AssetSelection, FinancialProductsInput, ASSET_CATALOGUE,
};

use crate::input;

/// Arguments for the ETF and bond calculator
#[derive(Args)]
pub struct EtfArgs {
    /// Lump sum invested at the start
    #[arg(long)]
    pub amount: Option<Decimal>,

    #[arg(long)]
    pub horizon: Option<u32>,

    /// Asset ids, comma separated (msci-world, nasdaq-100, sp500, msci-world-sri, bonds-aaa-eur)
    #[arg(long, value_delimiter = ',')]
    pub assets: Vec<String>,

    /// Override the expected return of every selected asset
    #[arg(long)]
    pub annual_return: Option<Decimal>,

    /// Tax on realised gains (0.25 company, 0.21 individual)
    #[arg(long)]
    pub capital_gains_tax: Option<Decimal>,

    /// List the asset catalogue and exit
    #[arg(long)]
    pub list: bool,

    /// Path to a JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_etf(args: EtfArgs) -> Result<Value, Box<dyn std::error::Error>> {
    if args.list {
        return Ok(serde_json::to_value(ASSET_CATALOGUE)?);
    }

    let products: FinancialProductsInput = match input::read_input(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => from_flags(&args),
    };

    let result = financial_products::project_financial_products(&products)?;
    Ok(serde_json::to_value(result)?)
}

fn from_flags(args: &EtfArgs) -> FinancialProductsInput {
    let mut products = FinancialProductsInput::default();
    if let Some(amount) = args.amount {
        products.initial_investment = amount;
    }
    if let Some(horizon) = args.horizon {
        products.horizon_years = horizon;
    }
    if !args.assets.is_empty() {
        products.assets = args.assets.iter().map(|id| AssetSelection::new(id)).collect();
    }
    if let Some(rate) = args.annual_return {
        for asset in &mut products.assets {
            asset.annual_return = Some(rate);
        }
    }
    if let Some(tax) = args.capital_gains_tax {
        products.capital_gains_tax = tax;
    }
    products
}
