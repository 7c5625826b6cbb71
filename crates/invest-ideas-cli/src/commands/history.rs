use clap::Args;
use serde_json::{json, Value};

use invest_ideas_core::tables::history;

/// Arguments for printing built-in series
#[derive(Args)]
pub struct HistoryArgs {
    /// Series id; lists every series when omitted
    pub series: Option<String>,
}

pub fn run_history(args: HistoryArgs) -> Result<Value, Box<dyn std::error::Error>> {
    match args.series {
        Some(id) => {
            let series =
                history::find_series(&id).ok_or_else(|| format!("unknown series '{id}'"))?;
            let rows: Vec<Value> = series
                .observations
                .iter()
                .map(|(year, value)| json!({ "year": year, "value": value }))
                .collect();
            Ok(Value::Array(rows))
        }
        None => {
            let rows: Vec<Value> = history::builtin_series()
                .iter()
                .map(|s| {
                    json!({
                        "id": s.id,
                        "name": s.name,
                        "kind": s.kind,
                        "first_year": s.first_year(),
                        "last_year": s.last_year(),
                        "mean_change": s.mean_change(),
                    })
                })
                .collect();
            Ok(Value::Array(rows))
        }
    }
}
