use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::InvestIdeasError;
use crate::growth::compound;
use crate::tables::schedule::validate_amount;
use crate::types::{Money, Rate};
use crate::InvestIdeasResult;

pub const MAX_TERM_YEARS: u32 = 50;

/// Fixed-rate amortising mortgage taken at acquisition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Financing {
    pub loan_amount: Money,
    /// Annual nominal interest rate
    pub annual_rate: Rate,
    pub term_years: u32,
    /// Origination fee as a share of the loan
    #[serde(default)]
    pub origination_pct: Rate,
    /// Fixed origination costs (valuation, broker, deed)
    #[serde(default)]
    pub origination_fixed: Money,
}

/// Debt service over one holding year.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoanYear {
    pub interest: Money,
    pub principal: Money,
    pub closing_balance: Money,
}

impl Financing {
    pub fn validate(&self, price: Money) -> InvestIdeasResult<()> {
        if self.loan_amount < Decimal::ZERO || self.loan_amount > price {
            return Err(InvestIdeasError::invalid(
                "financing.loan_amount",
                "Loan amount must be between 0 and the purchase price",
            ));
        }
        if self.annual_rate < Decimal::ZERO || self.annual_rate >= Decimal::ONE {
            return Err(InvestIdeasError::invalid(
                "financing.annual_rate",
                "Interest rate must be in [0, 1)",
            ));
        }
        if self.term_years == 0 || self.term_years > MAX_TERM_YEARS {
            return Err(InvestIdeasError::invalid(
                "financing.term_years",
                format!("Loan term must be between 1 and {MAX_TERM_YEARS} years"),
            ));
        }
        if self.origination_pct < Decimal::ZERO || self.origination_fixed < Decimal::ZERO {
            return Err(InvestIdeasError::invalid(
                "financing.origination",
                "Origination costs cannot be negative",
            ));
        }
        validate_amount("financing.origination_fixed", self.origination_fixed)
    }

    /// One-time origination cost: fixed + pct × loan.
    pub fn origination_cost(&self) -> Money {
        if self.loan_amount.is_zero() {
            return Decimal::ZERO;
        }
        self.origination_fixed + self.origination_pct * self.loan_amount
    }

    /// Standard fixed-rate mortgage payment: P * r(1+r)^n / ((1+r)^n - 1)
    pub fn monthly_payment(&self) -> InvestIdeasResult<Money> {
        let total_months = self.term_years * 12;
        let monthly_rate = self.annual_rate / dec!(12);

        if monthly_rate.is_zero() {
            if total_months == 0 {
                return Err(InvestIdeasError::DivisionByZero {
                    context: "monthly payment with zero rate and zero months".into(),
                });
            }
            return Ok(self.loan_amount / Decimal::from(total_months));
        }

        let growth = compound(monthly_rate, total_months)?;
        let denominator = growth - Decimal::ONE;
        if denominator.is_zero() {
            return Err(InvestIdeasError::DivisionByZero {
                context: "mortgage payment denominator".into(),
            });
        }

        Ok(self.loan_amount * monthly_rate * growth / denominator)
    }

    /// Interest, principal and closing balance for holding year `year` (1-based).
    /// Years past the term carry no debt service.
    pub fn year(&self, year: u32) -> InvestIdeasResult<LoanYear> {
        if year == 0 || self.loan_amount.is_zero() {
            return Ok(LoanYear::default());
        }

        let payment = self.monthly_payment()?;
        let monthly_rate = self.annual_rate / dec!(12);
        let total_months = self.term_years * 12;
        let first_month = (year - 1) * 12;

        let mut balance = self.balance_after_months(payment, monthly_rate, first_month);
        let mut out = LoanYear::default();

        for month in first_month..(first_month + 12) {
            if month >= total_months || balance <= Decimal::ZERO {
                break;
            }
            let interest = balance * monthly_rate;
            let principal = (payment - interest).min(balance);
            out.interest += interest;
            out.principal += principal;
            balance -= principal;
        }

        out.closing_balance = balance.max(Decimal::ZERO);
        Ok(out)
    }

    /// Outstanding balance after `years` full years of payments.
    pub fn balance_after(&self, years: u32) -> InvestIdeasResult<Money> {
        if self.loan_amount.is_zero() {
            return Ok(Decimal::ZERO);
        }
        let payment = self.monthly_payment()?;
        let monthly_rate = self.annual_rate / dec!(12);
        Ok(self.balance_after_months(payment, monthly_rate, years * 12))
    }

    fn balance_after_months(&self, payment: Money, monthly_rate: Rate, months: u32) -> Money {
        let total_months = self.term_years * 12;
        let mut balance = self.loan_amount;
        for _ in 0..months.min(total_months) {
            let interest = balance * monthly_rate;
            balance -= payment - interest;
            if balance <= Decimal::ZERO {
                return Decimal::ZERO;
            }
        }
        if months >= total_months {
            return Decimal::ZERO;
        }
        balance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loan() -> Financing {
        Financing {
            loan_amount: dec!(200000),
            annual_rate: dec!(0.03),
            term_years: 25,
            origination_pct: dec!(0.01),
            origination_fixed: dec!(1000),
        }
    }

    #[test]
    fn test_origination_cost() {
        assert_eq!(loan().origination_cost(), dec!(3000));
    }

    #[test]
    fn test_monthly_payment_sanity() {
        // 200k at 3% over 25y is roughly 948/month
        let pmt = loan().monthly_payment().unwrap();
        assert!(pmt > dec!(940) && pmt < dec!(955), "payment {pmt}");
    }

    #[test]
    fn test_zero_rate_straight_line() {
        let mut l = loan();
        l.annual_rate = Decimal::ZERO;
        l.term_years = 20;
        assert_eq!(l.monthly_payment().unwrap(), dec!(200000) / dec!(240));
        let balance = l.balance_after(10).unwrap();
        assert!((balance - dec!(100000)).abs() < dec!(0.0001), "balance {balance}");
    }

    #[test]
    fn test_year_schedule_matches_balance() {
        let l = loan();
        let y1 = l.year(1).unwrap();
        let y2 = l.year(2).unwrap();
        assert!(y1.interest > y2.interest);
        assert!(y1.principal < y2.principal);
        let diff = (y2.closing_balance - l.balance_after(2).unwrap()).abs();
        assert!(diff < dec!(0.000001));
    }

    #[test]
    fn test_loan_fully_repaid_at_term() {
        let l = loan();
        assert_eq!(l.balance_after(25).unwrap(), Decimal::ZERO);
        assert_eq!(l.balance_after(30).unwrap(), Decimal::ZERO);
        assert_eq!(l.year(26).unwrap(), LoanYear::default());
    }

    #[test]
    fn test_loan_above_price_rejected() {
        assert!(loan().validate(dec!(150000)).is_err());
    }
}
