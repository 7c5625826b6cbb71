use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::{CalendarYear, Rate};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// What each observation of a series measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeriesKind {
    /// Decimal return realised during the calendar year (0.152 = +15.2%)
    AnnualReturn,
    /// Price or index level observed in the calendar year (e.g. EUR per m²)
    PriceLevel,
}

/// A named calendar-year series. Years may be missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalSeries {
    pub id: String,
    pub name: String,
    pub kind: SeriesKind,
    pub observations: BTreeMap<CalendarYear, Decimal>,
}

impl HistoricalSeries {
    pub fn new(id: &str, name: &str, kind: SeriesKind) -> Self {
        HistoricalSeries {
            id: id.to_string(),
            name: name.to_string(),
            kind,
            observations: BTreeMap::new(),
        }
    }

    pub fn get(&self, year: CalendarYear) -> Option<Decimal> {
        self.observations.get(&year).copied()
    }

    pub fn first_year(&self) -> Option<CalendarYear> {
        self.observations.keys().next().copied()
    }

    pub fn last_year(&self) -> Option<CalendarYear> {
        self.observations.keys().next_back().copied()
    }

    /// Observations from `start` onward, stopping at the first missing year.
    pub fn contiguous_from(&self, start: CalendarYear) -> Vec<(CalendarYear, Decimal)> {
        let mut run = Vec::new();
        let mut year = start;
        while let Some(value) = self.get(year) {
            run.push((year, value));
            year += 1;
        }
        run
    }

    /// Each year's own observed change, without compounding. For return
    /// series this is the observation itself; for level series the change
    /// from the previous year, emitted only when both years exist.
    pub fn year_over_year(&self) -> Vec<(CalendarYear, Rate)> {
        match self.kind {
            SeriesKind::AnnualReturn => self.observations.iter().map(|(y, r)| (*y, *r)).collect(),
            SeriesKind::PriceLevel => self
                .observations
                .iter()
                .filter_map(|(year, level)| {
                    let prev = self.get(year - 1)?;
                    if prev.is_zero() {
                        return None;
                    }
                    Some((*year, level / prev - Decimal::ONE))
                })
                .collect(),
        }
    }

    /// Arithmetic mean of the year-over-year changes.
    pub fn mean_change(&self) -> Option<Rate> {
        let changes = self.year_over_year();
        if changes.is_empty() {
            return None;
        }
        let sum: Decimal = changes.iter().map(|(_, r)| *r).sum();
        Some(sum / Decimal::from(changes.len()))
    }
}

// ---------------------------------------------------------------------------
// Built-in tables
// ---------------------------------------------------------------------------

pub const MSCI_WORLD: &str = "msci-world";
pub const NASDAQ_100: &str = "nasdaq-100";
pub const SP_500: &str = "sp500";
pub const MSCI_WORLD_SRI: &str = "msci-world-sri";
pub const BONDS_AAA_EUR: &str = "bonds-aaa-eur";
pub const SPAIN_CPI: &str = "es-cpi";
pub const SPAIN_HOUSING_M2: &str = "es-housing-m2";

/// Long-run Spanish inflation reference drawn on every chart
pub const SPAIN_INFLATION_50Y_AVG: Rate = dec!(0.024);

/// Annual total returns in percent, 2004-2024:
/// MSCI World, Nasdaq-100, S&P 500, MSCI World SRI, Bonds AAA EUR.
const INDEX_RETURNS_PCT: [(CalendarYear, [Option<Decimal>; 5]); 21] = [
    (2004, [Some(dec!(15.2)), Some(dec!(8.6)), Some(dec!(10.9)), None, Some(dec!(7.3))]),
    (2005, [Some(dec!(9.5)), Some(dec!(1.4)), Some(dec!(4.9)), None, Some(dec!(3.4))]),
    (2006, [Some(dec!(20.1)), Some(dec!(9.5)), Some(dec!(15.8)), None, Some(dec!(1.2))]),
    (2007, [Some(dec!(9.0)), Some(dec!(19.2)), Some(dec!(5.5)), None, Some(dec!(2.8))]),
    (2008, [Some(dec!(-40.3)), Some(dec!(-41.9)), Some(dec!(-37.0)), None, Some(dec!(8.5))]),
    (2009, [Some(dec!(30.0)), Some(dec!(43.9)), Some(dec!(26.5)), None, Some(dec!(5.2))]),
    (2010, [Some(dec!(11.8)), Some(dec!(19.2)), Some(dec!(15.1)), None, Some(dec!(4.1))]),
    (2011, [Some(dec!(-5.0)), Some(dec!(2.7)), Some(dec!(2.1)), None, Some(dec!(6.8))]),
    (2012, [Some(dec!(15.8)), Some(dec!(17.5)), Some(dec!(16.0)), None, Some(dec!(7.2))]),
    (2013, [Some(dec!(26.7)), Some(dec!(38.3)), Some(dec!(32.4)), None, Some(dec!(2.1))]),
    (2014, [Some(dec!(4.9)), Some(dec!(19.2)), Some(dec!(13.7)), None, Some(dec!(8.5))]),
    (2015, [Some(dec!(-0.3)), Some(dec!(9.7)), Some(dec!(1.4)), None, Some(dec!(1.2))]),
    (2016, [Some(dec!(7.5)), Some(dec!(7.5)), Some(dec!(12.0)), Some(dec!(7.2)), Some(dec!(3.4))]),
    (2017, [Some(dec!(22.4)), Some(dec!(32.0)), Some(dec!(21.8)), Some(dec!(21.8)), Some(dec!(0.8))]),
    (2018, [Some(dec!(-8.2)), Some(dec!(-0.1)), Some(dec!(-4.4)), Some(dec!(-8.5)), Some(dec!(1.5))]),
    (2019, [Some(dec!(27.7)), Some(dec!(38.7)), Some(dec!(31.5)), Some(dec!(27.2)), Some(dec!(5.8))]),
    (2020, [Some(dec!(15.9)), Some(dec!(47.6)), Some(dec!(18.4)), Some(dec!(15.4)), Some(dec!(4.1))]),
    (2021, [Some(dec!(21.8)), Some(dec!(26.6)), Some(dec!(28.7)), Some(dec!(21.3)), Some(dec!(-3.2))]),
    (2022, [Some(dec!(-17.7)), Some(dec!(-32.5)), Some(dec!(-18.1)), Some(dec!(-18.1)), Some(dec!(-16.2))]),
    (2023, [Some(dec!(23.8)), Some(dec!(54.8)), Some(dec!(26.3)), Some(dec!(23.2)), Some(dec!(6.4))]),
    (2024, [Some(dec!(18.2)), Some(dec!(28.6)), Some(dec!(24.2)), Some(dec!(17.8)), Some(dec!(3.2))]),
];

const INDEX_COLUMNS: [(&str, &str); 5] = [
    (MSCI_WORLD, "MSCI World"),
    (NASDAQ_100, "Nasdaq-100"),
    (SP_500, "S&P 500"),
    (MSCI_WORLD_SRI, "MSCI World SRI"),
    (BONDS_AAA_EUR, "Bonds AAA EUR"),
];

/// Spanish CPI, annual average change in percent.
const SPAIN_CPI_PCT: [(CalendarYear, Decimal); 21] = [
    (2004, dec!(3.0)),
    (2005, dec!(3.4)),
    (2006, dec!(3.5)),
    (2007, dec!(2.8)),
    (2008, dec!(4.1)),
    (2009, dec!(-0.3)),
    (2010, dec!(1.8)),
    (2011, dec!(3.2)),
    (2012, dec!(2.4)),
    (2013, dec!(1.4)),
    (2014, dec!(-0.2)),
    (2015, dec!(-0.5)),
    (2016, dec!(-0.2)),
    (2017, dec!(2.0)),
    (2018, dec!(1.7)),
    (2019, dec!(0.7)),
    (2020, dec!(-0.3)),
    (2021, dec!(3.1)),
    (2022, dec!(8.4)),
    (2023, dec!(3.5)),
    (2024, dec!(2.8)),
];

/// Spanish average appraised price of free-market housing, EUR per m²
/// (year-end, rounded).
const SPAIN_HOUSING_EUR_M2: [(CalendarYear, Decimal); 21] = [
    (2004, dec!(1618)),
    (2005, dec!(1824)),
    (2006, dec!(1991)),
    (2007, dec!(2085)),
    (2008, dec!(2018)),
    (2009, dec!(1892)),
    (2010, dec!(1825)),
    (2011, dec!(1702)),
    (2012, dec!(1551)),
    (2013, dec!(1466)),
    (2014, dec!(1462)),
    (2015, dec!(1490)),
    (2016, dec!(1512)),
    (2017, dec!(1559)),
    (2018, dec!(1618)),
    (2019, dec!(1638)),
    (2020, dec!(1625)),
    (2021, dec!(1662)),
    (2022, dec!(1742)),
    (2023, dec!(1813)),
    (2024, dec!(1906)),
];

/// Yearly index returns (decimal) for the five tracked indices.
pub fn index_returns() -> Vec<HistoricalSeries> {
    INDEX_COLUMNS
        .iter()
        .enumerate()
        .map(|(col, (id, name))| {
            let mut series = HistoricalSeries::new(id, name, SeriesKind::AnnualReturn);
            for (year, row) in INDEX_RETURNS_PCT.iter() {
                if let Some(pct) = row[col] {
                    series.observations.insert(*year, pct / Decimal::ONE_HUNDRED);
                }
            }
            series
        })
        .collect()
}

pub fn spain_inflation() -> HistoricalSeries {
    let mut series = HistoricalSeries::new(SPAIN_CPI, "Spain CPI", SeriesKind::AnnualReturn);
    for (year, pct) in SPAIN_CPI_PCT.iter() {
        series.observations.insert(*year, *pct / Decimal::ONE_HUNDRED);
    }
    series
}

pub fn spain_housing_price_per_m2() -> HistoricalSeries {
    let mut series = HistoricalSeries::new(
        SPAIN_HOUSING_M2,
        "Spain housing EUR/m²",
        SeriesKind::PriceLevel,
    );
    for (year, level) in SPAIN_HOUSING_EUR_M2.iter() {
        series.observations.insert(*year, *level);
    }
    series
}

/// Every built-in series.
pub fn builtin_series() -> Vec<HistoricalSeries> {
    let mut all = index_returns();
    all.push(spain_inflation());
    all.push(spain_housing_price_per_m2());
    all
}

pub fn find_series(id: &str) -> Option<HistoricalSeries> {
    builtin_series().into_iter().find(|s| s.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_msci_world_2008_canonical_value() {
        let msci = find_series(MSCI_WORLD).unwrap();
        assert_eq!(msci.get(2008), Some(dec!(-0.403)));
    }

    #[test]
    fn test_sri_series_starts_2016() {
        let sri = find_series(MSCI_WORLD_SRI).unwrap();
        assert_eq!(sri.first_year(), Some(2016));
        assert_eq!(sri.last_year(), Some(2024));
        assert_eq!(sri.get(2010), None);
    }

    #[test]
    fn test_contiguous_run_stops_at_gap() {
        let mut s = HistoricalSeries::new("x", "x", SeriesKind::AnnualReturn);
        s.observations.insert(2000, dec!(0.1));
        s.observations.insert(2001, dec!(0.1));
        s.observations.insert(2003, dec!(0.1));
        let run = s.contiguous_from(2000);
        assert_eq!(run.len(), 2);
        assert_eq!(run.last().map(|(y, _)| *y), Some(2001));
        assert!(s.contiguous_from(2002).is_empty());
    }

    #[test]
    fn test_level_year_over_year() {
        let housing = spain_housing_price_per_m2();
        let yoy = housing.year_over_year();
        // no change reported for the first year
        assert_eq!(yoy.first().map(|(y, _)| *y), Some(2005));
        let (_, change_2024) = yoy.last().copied().unwrap();
        assert_eq!(change_2024, dec!(1906) / dec!(1813) - Decimal::ONE);
    }

    #[test]
    fn test_builtin_series_ids_unique() {
        let all = builtin_series();
        let mut ids: Vec<&str> = all.iter().map(|s| s.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), all.len());
    }
}
