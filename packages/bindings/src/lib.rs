use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Core projection
// ---------------------------------------------------------------------------

#[napi]
pub fn project_cagr(input_json: String) -> NapiResult<String> {
    let input: invest_ideas_core::cagr::ProjectionInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = invest_ideas_core::cagr::project_cagr(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// Catalonia second-hand transfer tax (ITP) on a price given as a decimal string.
#[napi]
pub fn itp_tax(price: String) -> NapiResult<String> {
    let price = Decimal::from_str(price.trim()).map_err(to_napi_error)?;
    if price < Decimal::ZERO {
        return Err(to_napi_error("price must be non-negative"));
    }
    let tax = invest_ideas_core::tables::presets::catalonia::itp_second_hand().tax_on(price);
    Ok(tax.to_string())
}

// ---------------------------------------------------------------------------
// Calculators
// ---------------------------------------------------------------------------

#[napi]
pub fn analyze_rental_property(input_json: String) -> NapiResult<String> {
    let input: invest_ideas_core::real_estate::RentalPropertyInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        invest_ideas_core::real_estate::analyze_rental_property(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn project_financial_products(input_json: String) -> NapiResult<String> {
    let input: invest_ideas_core::financial_products::FinancialProductsInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = invest_ideas_core::financial_products::project_financial_products(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn analyze_hospitality(input_json: String) -> NapiResult<String> {
    let input: invest_ideas_core::hospitality::HospitalityInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        invest_ideas_core::hospitality::analyze_hospitality(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

#[napi]
pub fn run_backtest(input_json: String) -> NapiResult<String> {
    let input: invest_ideas_core::backtest::BacktestInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = invest_ideas_core::backtest::run_backtest(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// One built-in series by id, or every series when `id` is omitted.
#[napi]
pub fn historical_series(id: Option<String>) -> NapiResult<String> {
    use invest_ideas_core::tables::history;

    match id {
        Some(id) => {
            let series = history::find_series(&id)
                .ok_or_else(|| to_napi_error(format!("unknown series '{id}'")))?;
            serde_json::to_string(&series).map_err(to_napi_error)
        }
        None => serde_json::to_string(&history::builtin_series()).map_err(to_napi_error),
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[napi]
pub fn seed_catalog() -> NapiResult<String> {
    let categories = invest_ideas_core::catalog::seed_catalog().map_err(to_napi_error)?;
    serde_json::to_string(&categories).map_err(to_napi_error)
}
