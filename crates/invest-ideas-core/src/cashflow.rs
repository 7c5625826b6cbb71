use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::InvestIdeasError;
use crate::financing::Financing;
use crate::growth::{grow, tax_on_positive};
use crate::tables::schedule::{validate_amount, TaxRegime};
use crate::types::{Money, Rate};
use crate::InvestIdeasResult;

const DAYS_PER_YEAR: Decimal = dec!(365);
const MONTHS_PER_YEAR: Decimal = dec!(12);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// How the asset earns its gross revenue in year 1.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum RevenueModel {
    /// Held empty (or accumulating product): no operating revenue
    #[default]
    None,
    /// Long-term letting
    MonthlyRent { monthly_rent: Money },
    /// Rooms × nightly rate × 365 × occupancy
    Nightly {
        rooms: u32,
        nightly_rate: Money,
        occupancy: Rate,
    },
    /// Any other yearly revenue figure
    Annual { amount: Money },
}

impl RevenueModel {
    /// Gross revenue for the first holding year.
    pub fn base_annual(&self) -> Money {
        match self {
            RevenueModel::None => Decimal::ZERO,
            RevenueModel::MonthlyRent { monthly_rent } => monthly_rent * MONTHS_PER_YEAR,
            RevenueModel::Nightly {
                rooms,
                nightly_rate,
                occupancy,
            } => Decimal::from(*rooms) * nightly_rate * DAYS_PER_YEAR * occupancy,
            RevenueModel::Annual { amount } => *amount,
        }
    }

    fn validate(&self) -> InvestIdeasResult<()> {
        match self {
            RevenueModel::None => {}
            RevenueModel::MonthlyRent { monthly_rent } => {
                validate_amount("operating.revenue.monthly_rent", *monthly_rent)?
            }
            RevenueModel::Nightly {
                nightly_rate,
                occupancy,
                ..
            } => {
                validate_amount("operating.revenue.nightly_rate", *nightly_rate)?;
                if *occupancy < Decimal::ZERO || *occupancy > Decimal::ONE {
                    return Err(InvestIdeasError::invalid(
                        "operating.revenue.occupancy",
                        "Occupancy must be between 0 and 1",
                    ));
                }
            }
            RevenueModel::Annual { amount } => {
                validate_amount("operating.revenue.amount", *amount)?
            }
        }
        validate_amount("operating.revenue", self.base_annual())
    }
}

/// What a recurring expense is proportional to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExpenseBasis {
    /// Fixed yearly amount, grows at `flat_expense_growth`
    Flat { amount: Money },
    /// Share of the year's gross revenue (operating costs, agency fees)
    ShareOfRevenue { rate: Rate },
    /// Share of the asset value in that year (property tax, maintenance)
    ShareOfAssetValue { rate: Rate },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseItem {
    pub label: String,
    pub basis: ExpenseBasis,
}

impl ExpenseItem {
    pub fn flat(label: &str, amount: Money) -> Self {
        ExpenseItem {
            label: label.to_string(),
            basis: ExpenseBasis::Flat { amount },
        }
    }

    pub fn share_of_revenue(label: &str, rate: Rate) -> Self {
        ExpenseItem {
            label: label.to_string(),
            basis: ExpenseBasis::ShareOfRevenue { rate },
        }
    }

    pub fn share_of_value(label: &str, rate: Rate) -> Self {
        ExpenseItem {
            label: label.to_string(),
            basis: ExpenseBasis::ShareOfAssetValue { rate },
        }
    }
}

/// Recurring yearly figures of an operated asset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperatingAssumptions {
    #[serde(default)]
    pub revenue: RevenueModel,
    /// Compounding growth of revenue from year 1 onward
    #[serde(default)]
    pub revenue_growth: Rate,
    #[serde(default)]
    pub expenses: Vec<ExpenseItem>,
    /// Compounding growth of `Flat` expenses
    #[serde(default)]
    pub flat_expense_growth: Rate,
}

impl OperatingAssumptions {
    pub fn validate(&self) -> InvestIdeasResult<()> {
        self.revenue.validate()?;
        if self.revenue_growth <= dec!(-1) || self.flat_expense_growth <= dec!(-1) {
            return Err(InvestIdeasError::invalid(
                "operating.growth",
                "Growth rates must be greater than -100%",
            ));
        }
        for item in &self.expenses {
            match item.basis {
                ExpenseBasis::Flat { amount } => validate_amount("operating.expenses", amount)?,
                ExpenseBasis::ShareOfRevenue { rate } | ExpenseBasis::ShareOfAssetValue { rate } => {
                    if rate < Decimal::ZERO || rate > Decimal::ONE {
                        return Err(InvestIdeasError::invalid(
                            "operating.expenses",
                            format!("Expense share '{}' must be between 0 and 1", item.label),
                        ));
                    }
                }
            }
        }
        Ok(())
    }

    /// Gross revenue in holding year `year`: base × (1 + g)^(year − 1).
    pub fn revenue_in_year(&self, year: u32) -> InvestIdeasResult<Money> {
        grow(
            self.revenue.base_annual(),
            self.revenue_growth,
            year.saturating_sub(1),
        )
    }
}

/// One holding year of operating cash flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearCashFlow {
    pub year: u32,
    /// Asset value the value-proportional expenses were charged on
    pub asset_value: Money,
    pub gross_income: Money,
    pub turnover_tax: Money,
    pub operating_expenses: Money,
    pub interest: Money,
    pub pre_tax_profit: Money,
    pub income_tax: Money,
    pub principal_repayment: Money,
    pub net_cash_flow: Money,
    pub cumulative_net_cash_flow: Money,
}

impl YearCashFlow {
    pub fn total_expenses(&self) -> Money {
        self.operating_expenses + self.interest
    }

    pub fn tax_paid(&self) -> Money {
        self.turnover_tax + self.income_tax
    }
}

/// Everything the projector needs besides the year.
#[derive(Debug, Clone, Copy)]
pub struct CashFlowContext<'a> {
    pub operating: &'a OperatingAssumptions,
    pub regime: &'a TaxRegime,
    pub financing: Option<&'a Financing>,
    /// Asset value at acquisition
    pub asset_base: Money,
    pub appreciation_rate: Rate,
}

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

impl<'a> CashFlowContext<'a> {
    /// Asset value at the start of holding year `year`, recomputed from the
    /// base each time.
    pub fn asset_value_in_year(&self, year: u32) -> InvestIdeasResult<Money> {
        grow(self.asset_base, self.appreciation_rate, year.saturating_sub(1))
    }

    /// Cash flow of a single holding year. `cumulative_net_cash_flow` is left
    /// equal to the year's own net flow; `project` fills in the running total.
    pub fn year(&self, year: u32) -> InvestIdeasResult<YearCashFlow> {
        let op = self.operating;
        let asset_value = self.asset_value_in_year(year)?;
        let gross_income = op.revenue_in_year(year)?;
        let turnover_tax = tax_on_positive(gross_income, self.regime.turnover_tax);

        let flat_growth = grow(Decimal::ONE, op.flat_expense_growth, year.saturating_sub(1))?;
        let operating_expenses: Money = op
            .expenses
            .iter()
            .map(|item| match item.basis {
                ExpenseBasis::Flat { amount } => amount * flat_growth,
                ExpenseBasis::ShareOfRevenue { rate } => gross_income * rate,
                ExpenseBasis::ShareOfAssetValue { rate } => asset_value * rate,
            })
            .sum();

        let loan = match self.financing {
            Some(f) => f.year(year)?,
            None => Default::default(),
        };

        let pre_tax_profit = gross_income - turnover_tax - operating_expenses - loan.interest;
        let layered = self.regime.apply_layers(pre_tax_profit);
        let net_cash_flow = layered.residual - loan.principal;

        Ok(YearCashFlow {
            year,
            asset_value,
            gross_income,
            turnover_tax,
            operating_expenses,
            interest: loan.interest,
            pre_tax_profit,
            income_tax: layered.total_tax,
            principal_repayment: loan.principal,
            net_cash_flow,
            cumulative_net_cash_flow: net_cash_flow,
        })
    }

    /// Years 1..=horizon with running cumulative totals.
    pub fn project(&self, horizon: u32) -> InvestIdeasResult<Vec<YearCashFlow>> {
        let mut cumulative = Decimal::ZERO;
        let mut flows = Vec::with_capacity(horizon as usize);
        for year in 1..=horizon {
            let mut flow = self.year(year)?;
            cumulative += flow.net_cash_flow;
            flow.cumulative_net_cash_flow = cumulative;
            flows.push(flow);
        }
        Ok(flows)
    }

    /// Cumulative net cash flow through `year`, recomputed from year 1.
    pub fn cumulative_through(&self, year: u32) -> InvestIdeasResult<Money> {
        Ok(self
            .project(year)?
            .last()
            .map(|f| f.cumulative_net_cash_flow)
            .unwrap_or(Decimal::ZERO))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::presets::brazil;
    use crate::tables::schedule::TaxLayer;

    fn rental() -> OperatingAssumptions {
        OperatingAssumptions {
            revenue: RevenueModel::MonthlyRent {
                monthly_rent: dec!(1000),
            },
            revenue_growth: Decimal::ZERO,
            expenses: vec![
                ExpenseItem::flat("holding costs", dec!(3500)),
                ExpenseItem::flat("management", dec!(864)),
            ],
            flat_expense_growth: Decimal::ZERO,
        }
    }

    #[test]
    fn test_rental_year_net_after_corporate_tax() {
        // (12000 - 3500 - 864) * (1 - 0.25) = 7636 * 0.75 = 5727
        let op = rental();
        let regime = TaxRegime::single("corporate", dec!(0.25));
        let ctx = CashFlowContext {
            operating: &op,
            regime: &regime,
            financing: None,
            asset_base: dec!(300000),
            appreciation_rate: dec!(0.05),
        };
        let y1 = ctx.year(1).unwrap();
        assert_eq!(y1.gross_income, dec!(12000));
        assert_eq!(y1.pre_tax_profit, dec!(7636));
        assert_eq!(y1.income_tax, dec!(1909));
        assert_eq!(y1.net_cash_flow, dec!(5727));
    }

    #[test]
    fn test_vacant_property_loses_expenses_without_rebate() {
        let mut op = rental();
        op.revenue = RevenueModel::None;
        op.expenses = vec![ExpenseItem::flat("holding costs", dec!(3500))];
        let regime = TaxRegime::single("corporate", dec!(0.25));
        let ctx = CashFlowContext {
            operating: &op,
            regime: &regime,
            financing: None,
            asset_base: dec!(300000),
            appreciation_rate: Decimal::ZERO,
        };
        let flows = ctx.project(3).unwrap();
        assert_eq!(flows[0].income_tax, Decimal::ZERO);
        assert_eq!(flows[2].cumulative_net_cash_flow, dec!(-10500));
    }

    #[test]
    fn test_double_taxation_on_residual() {
        // Existing pousada: 15 rooms, 50/night, 55% occupancy
        let op = OperatingAssumptions {
            revenue: RevenueModel::Nightly {
                rooms: 15,
                nightly_rate: dec!(50),
                occupancy: dec!(0.55),
            },
            revenue_growth: Decimal::ZERO,
            expenses: vec![
                ExpenseItem::share_of_revenue("operating costs", dec!(0.40)),
                ExpenseItem::flat("maintenance", dec!(8000)),
                ExpenseItem::flat("accounting", dec!(2000)),
            ],
            flat_expense_growth: Decimal::ZERO,
        };
        let regime = brazil::cross_border_regime();
        let ctx = CashFlowContext {
            operating: &op,
            regime: &regime,
            financing: None,
            asset_base: dec!(340000),
            appreciation_rate: Decimal::ZERO,
        };
        let y1 = ctx.year(1).unwrap();
        // revenue = 15 * 50 * 365 * 0.55 = 150562.5
        assert_eq!(y1.gross_income, dec!(150562.5));
        // profit = 150562.5 * (1 - 0.11 - 0.40) - 10000 = 63775.625
        assert_eq!(y1.pre_tax_profit, dec!(63775.625));
        // net = profit * 0.85 * 0.75
        assert_eq!(y1.net_cash_flow, dec!(63775.625) * dec!(0.6375));
    }

    #[test]
    fn test_revenue_growth_compounds_from_year_one() {
        let mut op = rental();
        op.revenue_growth = dec!(0.05);
        assert_eq!(op.revenue_in_year(1).unwrap(), dec!(12000));
        assert_eq!(op.revenue_in_year(3).unwrap(), dec!(12000) * dec!(1.1025));
    }

    #[test]
    fn test_value_based_expense_tracks_appreciation() {
        let op = OperatingAssumptions {
            expenses: vec![ExpenseItem::share_of_value("property tax", dec!(0.01))],
            ..Default::default()
        };
        let regime = TaxRegime::default();
        let ctx = CashFlowContext {
            operating: &op,
            regime: &regime,
            financing: None,
            asset_base: dec!(100000),
            appreciation_rate: dec!(0.10),
        };
        let flows = ctx.project(3).unwrap();
        assert_eq!(flows[0].operating_expenses, dec!(1000));
        assert_eq!(flows[1].operating_expenses, dec!(1100));
        assert_eq!(flows[2].operating_expenses, dec!(1210));
    }

    #[test]
    fn test_interest_deductible_principal_not() {
        let op = rental();
        let regime = TaxRegime {
            turnover_tax: Decimal::ZERO,
            income_layers: vec![TaxLayer::new("corporate", dec!(0.25))],
        };
        let loan = Financing {
            loan_amount: dec!(100000),
            annual_rate: dec!(0.03),
            term_years: 20,
            origination_pct: Decimal::ZERO,
            origination_fixed: Decimal::ZERO,
        };
        let ctx = CashFlowContext {
            operating: &op,
            regime: &regime,
            financing: Some(&loan),
            asset_base: dec!(300000),
            appreciation_rate: Decimal::ZERO,
        };
        let y1 = ctx.year(1).unwrap();
        assert!(y1.interest > Decimal::ZERO);
        assert_eq!(y1.pre_tax_profit, dec!(7636) - y1.interest);
        assert_eq!(
            y1.net_cash_flow,
            y1.pre_tax_profit - y1.income_tax - y1.principal_repayment
        );
    }

    #[test]
    fn test_cumulative_through_matches_projection() {
        let op = rental();
        let regime = TaxRegime::single("corporate", dec!(0.25));
        let ctx = CashFlowContext {
            operating: &op,
            regime: &regime,
            financing: None,
            asset_base: dec!(300000),
            appreciation_rate: dec!(0.05),
        };
        let flows = ctx.project(10).unwrap();
        assert_eq!(
            ctx.cumulative_through(7).unwrap(),
            flows[6].cumulative_net_cash_flow
        );
    }

    #[test]
    fn test_occupancy_above_one_rejected() {
        let op = OperatingAssumptions {
            revenue: RevenueModel::Nightly {
                rooms: 10,
                nightly_rate: dec!(80),
                occupancy: dec!(1.2),
            },
            ..Default::default()
        };
        assert!(op.validate().is_err());
    }

    #[test]
    fn test_runaway_revenue_growth_fails_instead_of_overflowing() {
        let op = OperatingAssumptions {
            revenue: RevenueModel::Annual {
                amount: dec!(100000),
            },
            revenue_growth: dec!(4),
            ..Default::default()
        };
        op.validate().unwrap();
        assert!(matches!(
            op.revenue_in_year(50),
            Err(InvestIdeasError::FinancialImpossibility(_))
        ));
    }

    #[test]
    fn test_oversized_amounts_and_shares_rejected() {
        let huge_rent = OperatingAssumptions {
            revenue: RevenueModel::MonthlyRent {
                monthly_rent: dec!(10000000000000000000),
            },
            ..Default::default()
        };
        assert!(huge_rent.validate().is_err());

        let share_above_one = OperatingAssumptions {
            expenses: vec![ExpenseItem::share_of_revenue("fees", dec!(3))],
            ..Default::default()
        };
        assert!(share_above_one.validate().is_err());
    }
}

