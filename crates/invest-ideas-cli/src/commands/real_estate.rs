use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::Value;

use invest_ideas_core::real_estate::{
    self, MortgageTerms, PropertyType, RentalPropertyInput,
};
use invest_ideas_core::tables::presets::catalonia;

use crate::input;

#[derive(Clone, Copy, ValueEnum)]
pub enum PropertyKind {
    SecondHand,
    NewBuild,
}

impl From<PropertyKind> for PropertyType {
    fn from(kind: PropertyKind) -> Self {
        match kind {
            PropertyKind::SecondHand => PropertyType::SecondHand,
            PropertyKind::NewBuild => PropertyType::NewBuild,
        }
    }
}

/// Arguments for the rental property calculator
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct RealEstateArgs {
    /// Purchase price (defaults to the 300 000 EUR showcase flat)
    #[arg(long)]
    pub price: Option<Decimal>,

    #[arg(long, value_enum)]
    pub property_type: Option<PropertyKind>,

    /// Annual appreciation (e.g. 0.05); bounded to [0.02, 0.09]
    #[arg(long)]
    pub appreciation: Option<Decimal>,

    /// Use the historical 9% appreciation preset
    #[arg(long, conflicts_with = "appreciation")]
    pub historical: bool,

    #[arg(long)]
    pub horizon: Option<u32>,

    /// Monthly rent for the let scenario
    #[arg(long)]
    pub monthly_rent: Option<Decimal>,

    /// IBI, community fees, insurance and maintenance per year
    #[arg(long)]
    pub holding_costs: Option<Decimal>,

    /// Mortgage principal; enables financing
    #[arg(long)]
    pub loan_amount: Option<Decimal>,

    #[arg(long, requires = "loan_amount")]
    pub loan_rate: Option<Decimal>,

    #[arg(long, requires = "loan_amount", default_value_t = 25)]
    pub loan_term: u32,

    /// Hire legal representation for the purchase
    #[arg(long)]
    pub legal: bool,

    /// Let through an agency instead of self-managing
    #[arg(long)]
    pub agency: bool,

    /// Grow rent with long-run inflation
    #[arg(long)]
    pub historical_rent: bool,

    /// Path to a JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_real_estate(args: RealEstateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let rental: RentalPropertyInput = match input::read_input(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => from_flags(&args)?,
    };

    let result = real_estate::analyze_rental_property(&rental)?;
    Ok(serde_json::to_value(result)?)
}

fn from_flags(args: &RealEstateArgs) -> Result<RentalPropertyInput, Box<dyn std::error::Error>> {
    let mut rental = RentalPropertyInput::showcase();
    if let Some(price) = args.price {
        rental.price = price;
    }
    if let Some(kind) = args.property_type {
        rental.property_type = kind.into();
    }
    if args.historical {
        rental.appreciation_rate = catalonia::APPRECIATION_HISTORICAL;
    } else if let Some(rate) = args.appreciation {
        rental.appreciation_rate = rate;
    }
    if let Some(horizon) = args.horizon {
        rental.horizon_years = horizon;
    }
    if let Some(rent) = args.monthly_rent {
        rental.monthly_rent = rent;
    }
    if let Some(costs) = args.holding_costs {
        rental.annual_holding_costs = costs;
    }
    if let Some(loan_amount) = args.loan_amount {
        rental.mortgage = Some(MortgageTerms {
            loan_amount,
            annual_rate: args
                .loan_rate
                .ok_or("--loan-rate is required with --loan-amount")?,
            term_years: args.loan_term,
        });
    }
    rental.legal_representation = args.legal;
    rental.rental_agency = args.agency;
    rental.historical_rent = args.historical_rent;
    Ok(rental)
}
