pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Result fields holding one row per projection year or series.
pub(crate) const SERIES_KEYS: [&str; 5] = ["years", "curve", "points", "assets", "series"];

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// The first year-by-year array in a result object, if any.
pub(crate) fn series_rows(
    result: &serde_json::Map<String, Value>,
) -> Option<(&'static str, &[Value])> {
    SERIES_KEYS.iter().find_map(|key| match result.get(*key) {
        Some(Value::Array(rows)) if rows.first().is_some_and(Value::is_object) => {
            Some((*key, rows.as_slice()))
        }
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_series_rows_prefers_year_table() {
        let result = json!({ "final_cagr": "0.04", "years": [{ "year": 1 }, { "year": 2 }] });
        let (key, rows) = series_rows(result.as_object().unwrap()).unwrap();
        assert_eq!(key, "years");
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_series_rows_ignores_scalar_arrays() {
        let result = json!({ "pros": ["liquid", "cheap"] , "series": [] });
        assert!(series_rows(result.as_object().unwrap()).is_none());
    }
}
