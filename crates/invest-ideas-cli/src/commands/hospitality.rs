use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::Value;

use invest_ideas_core::hospitality::{self, HospitalityInput, HospitalityPreset};
use invest_ideas_core::tables::presets::brazil;

use crate::input;

#[derive(Clone, Copy, ValueEnum)]
pub enum PresetArg {
    Existing,
    LandConstruction,
    BrlDevelopment,
}

impl From<PresetArg> for HospitalityPreset {
    fn from(preset: PresetArg) -> Self {
        match preset {
            PresetArg::Existing => HospitalityPreset::ExistingBusiness,
            PresetArg::LandConstruction => HospitalityPreset::LandAndConstruction,
            PresetArg::BrlDevelopment => HospitalityPreset::BrlDevelopment,
        }
    }
}

/// Arguments for the pousada calculator
#[derive(Args)]
pub struct HospitalityArgs {
    /// Built-in scenario to start from
    #[arg(long, value_enum, default_value = "existing")]
    pub preset: PresetArg,

    #[arg(long)]
    pub nightly_rate: Option<Decimal>,

    /// Average occupancy (e.g. 0.55)
    #[arg(long)]
    pub occupancy: Option<Decimal>,

    /// Annual property appreciation; bounded to [0.05, 0.18]
    #[arg(long)]
    pub appreciation: Option<Decimal>,

    /// Use the conservative 8% appreciation preset
    #[arg(long, conflicts_with_all = ["appreciation", "historical"])]
    pub conservative: bool,

    /// Use the historical 12% appreciation preset
    #[arg(long, conflicts_with = "appreciation")]
    pub historical: bool,

    #[arg(long)]
    pub revenue_growth: Option<Decimal>,

    #[arg(long)]
    pub horizon: Option<u32>,

    /// Path to a JSON or YAML input file (overrides the preset and flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_hospitality(args: HospitalityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let scenario: HospitalityInput = match input::read_input(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => from_flags(&args),
    };

    let result = hospitality::analyze_hospitality(&scenario)?;
    Ok(serde_json::to_value(result)?)
}

fn from_flags(args: &HospitalityArgs) -> HospitalityInput {
    let mut scenario = HospitalityPreset::from(args.preset).input();
    if let Some(rate) = args.nightly_rate {
        scenario.nightly_rate = rate;
    }
    if let Some(occupancy) = args.occupancy {
        scenario.occupancy = occupancy;
    }
    if args.conservative {
        scenario.appreciation_rate = brazil::APPRECIATION_CONSERVATIVE;
    } else if args.historical {
        scenario.appreciation_rate = brazil::APPRECIATION_HISTORICAL;
    } else if let Some(rate) = args.appreciation {
        scenario.appreciation_rate = rate;
    }
    if let Some(growth) = args.revenue_growth {
        scenario.revenue_growth = growth;
    }
    if let Some(horizon) = args.horizon {
        scenario.horizon_years = horizon;
    }
    scenario
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::str::FromStr;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        args: HospitalityArgs,
    }

    fn parse(flags: &[&str]) -> Result<HospitalityArgs, clap::Error> {
        let argv = std::iter::once("hospitality").chain(flags.iter().copied());
        Harness::try_parse_from(argv).map(|h| h.args)
    }

    #[test]
    fn test_appreciation_presets() {
        let args = parse(&["--conservative"]).unwrap();
        assert_eq!(from_flags(&args).appreciation_rate, brazil::APPRECIATION_CONSERVATIVE);

        let args = parse(&["--preset", "brl-development", "--historical"]).unwrap();
        assert_eq!(from_flags(&args).appreciation_rate, brazil::APPRECIATION_HISTORICAL);

        let args = parse(&["--appreciation", "0.15"]).unwrap();
        assert_eq!(
            from_flags(&args).appreciation_rate,
            Decimal::from_str("0.15").unwrap()
        );
    }

    #[test]
    fn test_appreciation_presets_conflict() {
        assert!(parse(&["--conservative", "--historical"]).is_err());
        assert!(parse(&["--historical", "--appreciation", "0.1"]).is_err());
        assert!(parse(&["--conservative", "--appreciation", "0.1"]).is_err());
    }

    #[test]
    fn test_preset_default_kept_without_flags() {
        let args = parse(&["--preset", "land-construction"]).unwrap();
        assert_eq!(
            from_flags(&args).appreciation_rate,
            HospitalityPreset::LandAndConstruction.input().appreciation_rate
        );
    }
}
