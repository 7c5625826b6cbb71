use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use invest_ideas_core::backtest::{self, BacktestInput};
use invest_ideas_core::tables::history::{MSCI_WORLD, SP_500, SPAIN_CPI};

use crate::input;

/// Arguments for a historical backtest
#[derive(Args)]
pub struct BacktestArgs {
    /// Calendar year the lump sum is invested (at the start of the year)
    #[arg(long)]
    pub entry_year: Option<i32>,

    /// Last calendar year to report
    #[arg(long)]
    pub end_year: Option<i32>,

    /// Series ids, comma separated
    #[arg(long, value_delimiter = ',')]
    pub series: Vec<String>,

    #[arg(long)]
    pub amount: Option<Decimal>,

    /// Deflate results by Spanish CPI
    #[arg(long)]
    pub real: bool,

    /// Path to a JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_backtest(args: BacktestArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let backtest_input: BacktestInput = match input::read_input(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => from_flags(&args)?,
    };

    let result = backtest::run_backtest(&backtest_input)?;
    Ok(serde_json::to_value(result)?)
}

fn from_flags(args: &BacktestArgs) -> Result<BacktestInput, Box<dyn std::error::Error>> {
    let entry_year = args
        .entry_year
        .ok_or("--entry-year is required (or provide --input)")?;

    let mut backtest_input = BacktestInput::new(&[MSCI_WORLD, SP_500], entry_year);
    if !args.series.is_empty() {
        backtest_input.series = args.series.clone();
    }
    backtest_input.end_year = args.end_year;
    if let Some(amount) = args.amount {
        backtest_input.amount = amount;
    }
    if args.real {
        backtest_input.inflation_series = Some(SPAIN_CPI.to_string());
    }
    Ok(backtest_input)
}
