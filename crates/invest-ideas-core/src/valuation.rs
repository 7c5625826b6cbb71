use serde::{Deserialize, Serialize};

use crate::cost::{DisposalCosts, DisposalSchedule};
use crate::financing::Financing;
use crate::growth::grow;
use crate::types::{Money, Rate};
use crate::InvestIdeasResult;

/// What the investor walks away with when selling at the end of a year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Liquidation {
    pub year: u32,
    pub terminal_value: Money,
    pub disposal: DisposalCosts,
    pub outstanding_loan: Money,
    /// terminal_value − disposal.total − outstanding_loan
    pub net_proceeds: Money,
}

/// Asset value after `year` years: initial × (1 + rate)^year.
pub fn terminal_value(initial_value: Money, rate: Rate, year: u32) -> InvestIdeasResult<Money> {
    grow(initial_value, rate, year)
}

/// Sell at the end of `year`: terminal value less disposal costs (capital
/// gains measured against `basis`) less any loan still owed.
pub fn liquidate(
    initial_value: Money,
    rate: Rate,
    year: u32,
    disposal: &DisposalSchedule,
    basis: Money,
    financing: Option<&Financing>,
) -> InvestIdeasResult<Liquidation> {
    let value = terminal_value(initial_value, rate, year)?;
    let costs = disposal.costs(value, basis);
    let outstanding_loan = match financing {
        Some(f) => f.balance_after(year)?,
        None => Money::ZERO,
    };

    Ok(Liquidation {
        year,
        terminal_value: value,
        net_proceeds: value - costs.total - outstanding_loan,
        disposal: costs,
        outstanding_loan,
    })
}
