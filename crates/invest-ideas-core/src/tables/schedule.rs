use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::InvestIdeasError;
use crate::growth::{positive_part, tax_on_positive};
use crate::types::{Money, Rate, MAX_AMOUNT};
use crate::InvestIdeasResult;

// ---------------------------------------------------------------------------
// Transaction tax schedules
// ---------------------------------------------------------------------------

/// One slice of a progressive schedule. `upper_bound = None` marks the
/// open-ended top bracket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxBracket {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upper_bound: Option<Money>,
    pub rate: Rate,
}

/// One-time tax or fee charged on a transaction amount (purchase or sale price).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum TransactionTaxSchedule {
    /// No transaction tax
    #[default]
    Exempt,
    /// Single proportional rate on the whole amount
    Flat { rate: Rate },
    /// Marginal rates applied slice by slice with cumulative thresholds
    Progressive { brackets: Vec<TaxBracket> },
    /// Proportional fee with a per-operation floor and cap (broker commissions)
    Clamped { rate: Rate, min: Money, max: Money },
    /// Several schedules charged on the same amount (e.g. VAT + stamp duty)
    Composite { parts: Vec<TransactionTaxSchedule> },
}

impl TransactionTaxSchedule {
    /// Tax due on `amount`. Non-positive amounts owe nothing.
    pub fn tax_on(&self, amount: Money) -> Money {
        if amount <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        match self {
            TransactionTaxSchedule::Exempt => Decimal::ZERO,
            TransactionTaxSchedule::Flat { rate } => amount * rate,
            TransactionTaxSchedule::Progressive { brackets } => progressive_tax(amount, brackets),
            TransactionTaxSchedule::Clamped { rate, min, max } => {
                (amount * rate).max(*min).min(*max)
            }
            TransactionTaxSchedule::Composite { parts } => {
                parts.iter().map(|p| p.tax_on(amount)).sum()
            }
        }
    }

    /// Average rate actually paid on `amount`.
    pub fn effective_rate(&self, amount: Money) -> Rate {
        if amount <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        self.tax_on(amount) / amount
    }

    pub fn validate(&self, field: &str) -> InvestIdeasResult<()> {
        match self {
            TransactionTaxSchedule::Exempt => Ok(()),
            TransactionTaxSchedule::Flat { rate } => validate_rate(field, *rate),
            TransactionTaxSchedule::Clamped { rate, min, max } => {
                validate_rate(field, *rate)?;
                if *min < Decimal::ZERO || max < min {
                    return Err(InvestIdeasError::invalid(
                        field,
                        "Clamped fee requires 0 <= min <= max",
                    ));
                }
                validate_amount(field, *max)
            }
            TransactionTaxSchedule::Progressive { brackets } => {
                validate_brackets(field, brackets)
            }
            TransactionTaxSchedule::Composite { parts } => {
                parts.iter().try_for_each(|p| p.validate(field))
            }
        }
    }
}

fn progressive_tax(amount: Money, brackets: &[TaxBracket]) -> Money {
    let mut tax = Decimal::ZERO;
    let mut lower = Decimal::ZERO;

    for bracket in brackets {
        if amount <= lower {
            break;
        }
        let top = match bracket.upper_bound {
            Some(upper) => amount.min(upper),
            None => amount,
        };
        tax += (top - lower) * bracket.rate;
        match bracket.upper_bound {
            Some(upper) => lower = upper,
            None => break,
        }
    }

    tax
}

fn validate_brackets(field: &str, brackets: &[TaxBracket]) -> InvestIdeasResult<()> {
    if brackets.is_empty() {
        return Err(InvestIdeasError::invalid(
            field,
            "Progressive schedule requires at least one bracket",
        ));
    }

    let mut previous = Decimal::ZERO;
    for (i, bracket) in brackets.iter().enumerate() {
        validate_rate(field, bracket.rate)?;
        let is_last = i + 1 == brackets.len();
        match bracket.upper_bound {
            Some(upper) if upper <= previous => {
                return Err(InvestIdeasError::invalid(
                    field,
                    format!("Bracket thresholds must be strictly ascending (bracket {i})"),
                ));
            }
            Some(upper) => {
                if is_last {
                    return Err(InvestIdeasError::invalid(
                        field,
                        "The top bracket must be open-ended",
                    ));
                }
                previous = upper;
            }
            None if !is_last => {
                return Err(InvestIdeasError::invalid(
                    field,
                    format!("Only the top bracket may be open-ended (bracket {i})"),
                ));
            }
            None => {}
        }
    }

    Ok(())
}

pub(crate) fn validate_rate(field: &str, rate: Rate) -> InvestIdeasResult<()> {
    if rate < Decimal::ZERO || rate >= Decimal::ONE {
        return Err(InvestIdeasError::invalid(
            field,
            format!("Rate {rate} must be in [0, 1)"),
        ));
    }
    Ok(())
}

/// Input amounts must be non-negative and at most [`MAX_AMOUNT`].
pub(crate) fn validate_amount(field: &str, amount: Money) -> InvestIdeasResult<()> {
    if amount < Decimal::ZERO || amount > MAX_AMOUNT {
        return Err(InvestIdeasError::invalid(
            field,
            format!("Amount {amount} must be in [0, {MAX_AMOUNT}]"),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Income tax layers
// ---------------------------------------------------------------------------

/// A proportional tax charged on whatever positive residual the previous
/// layer left behind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxLayer {
    pub label: String,
    pub rate: Rate,
}

impl TaxLayer {
    pub fn new(label: &str, rate: Rate) -> Self {
        TaxLayer {
            label: label.to_string(),
            rate,
        }
    }
}

/// Taxes charged on operating income.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaxRegime {
    /// Charged on gross revenue before any expense (e.g. Simples Nacional)
    #[serde(default)]
    pub turnover_tax: Rate,
    /// Applied in order, each on the post-previous-layer residual
    #[serde(default)]
    pub income_layers: Vec<TaxLayer>,
}

impl TaxRegime {
    pub fn single(label: &str, rate: Rate) -> Self {
        TaxRegime {
            turnover_tax: Decimal::ZERO,
            income_layers: vec![TaxLayer::new(label, rate)],
        }
    }

    pub fn validate(&self) -> InvestIdeasResult<()> {
        validate_rate("tax_regime.turnover_tax", self.turnover_tax)?;
        for layer in &self.income_layers {
            validate_rate("tax_regime.income_layers", layer.rate)?;
        }
        Ok(())
    }

    /// Run the layers over a pre-tax profit.
    pub fn apply_layers(&self, profit: Money) -> LayeredTax {
        let mut residual = profit;
        let mut total_tax = Decimal::ZERO;

        for layer in &self.income_layers {
            let tax = tax_on_positive(residual, layer.rate);
            total_tax += tax;
            residual -= tax;
        }

        LayeredTax {
            total_tax,
            residual,
        }
    }

    /// Share of a positive profit left after every layer: Π(1 − rate).
    pub fn retention_factor(&self) -> Rate {
        self.income_layers
            .iter()
            .fold(Decimal::ONE, |acc, l| acc * (Decimal::ONE - l.rate))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayeredTax {
    pub total_tax: Money,
    pub residual: Money,
}

/// Capital gain on disposal, floored at zero.
pub fn capital_gain(sale_price: Money, basis: Money) -> Money {
    positive_part(sale_price - basis)
}
