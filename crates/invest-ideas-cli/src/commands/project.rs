use clap::Args;
use serde_json::Value;

use invest_ideas_core::cagr::{self, ProjectionInput};

use crate::input;

/// Arguments for a generic projection
#[derive(Args)]
pub struct ProjectArgs {
    /// Path to a JSON or YAML scenario (reads stdin when omitted)
    #[arg(long)]
    pub input: Option<String>,

    /// Only compute this holding year
    #[arg(long)]
    pub year: Option<u32>,
}

pub fn run_project(args: ProjectArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let projection: ProjectionInput = input::read_input(args.input.as_deref())?
        .ok_or("a scenario is required: pass --input <file> or pipe JSON on stdin")?;

    match args.year {
        Some(year) => {
            let result = cagr::cagr_at_year(&projection, year)?;
            Ok(serde_json::to_value(result)?)
        }
        None => {
            let result = cagr::project_cagr(&projection)?;
            Ok(serde_json::to_value(result)?)
        }
    }
}
