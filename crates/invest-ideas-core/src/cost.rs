use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::InvestIdeasError;
use crate::financing::Financing;
use crate::growth::tax_on_positive;
use crate::tables::schedule::{capital_gain, validate_amount, validate_rate, TransactionTaxSchedule};
use crate::types::{Money, Rate};
use crate::InvestIdeasResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Purchase-side configuration. Optional fees are `None` when disabled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcquisitionParameters {
    /// Sticker price of the asset
    pub price: Money,
    /// Transfer / transaction tax selected by property or product type
    #[serde(default)]
    pub transfer_tax: TransactionTaxSchedule,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notary_pct: Option<Rate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry_pct: Option<Rate>,
    /// Legal representation, share of price
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legal_pct: Option<Rate>,
    /// Fixed one-time fees (licences, valuation, project)
    #[serde(default)]
    pub flat_fees: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub financing: Option<Financing>,
}

impl AcquisitionParameters {
    pub fn cash_purchase(price: Money, transfer_tax: TransactionTaxSchedule) -> Self {
        AcquisitionParameters {
            price,
            transfer_tax,
            notary_pct: None,
            registry_pct: None,
            legal_pct: None,
            flat_fees: Decimal::ZERO,
            financing: None,
        }
    }

    pub fn loan_amount(&self) -> Money {
        self.financing
            .as_ref()
            .map(|f| f.loan_amount)
            .unwrap_or(Decimal::ZERO)
    }
}

/// Breakdown of one-time acquisition costs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcquisitionCosts {
    pub transfer_tax: Money,
    pub notary: Money,
    pub registry: Money,
    pub legal: Money,
    pub financing_costs: Money,
    pub flat_fees: Money,
    /// Sum of every cost above
    pub total: Money,
    /// price + total
    pub total_investment: Money,
    pub loan_amount: Money,
    /// Cash the investor puts in: total_investment − loan_amount
    pub equity_investment: Money,
}

/// Sale-side configuration. Each component is computed independently on the
/// sale price and summed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisposalSchedule {
    /// Estate-agent commission, share of sale price
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_commission: Option<Rate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notary_pct: Option<Rate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry_pct: Option<Rate>,
    /// Per-operation transaction fee (e.g. broker commission)
    #[serde(default)]
    pub sale_fee: TransactionTaxSchedule,
    /// Tax on (sale price − basis), never negative
    #[serde(default)]
    pub capital_gains_tax: Rate,
}

/// Breakdown of one-time disposal costs for a given sale price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisposalCosts {
    pub agent_commission: Money,
    pub notary: Money,
    pub registry: Money,
    pub sale_fee: Money,
    pub capital_gain: Money,
    pub capital_gains_tax: Money,
    pub total: Money,
}

// ---------------------------------------------------------------------------
// Acquisition
// ---------------------------------------------------------------------------

/// Total one-time acquisition cost for a purchase.
///
/// Guarantees `total_investment = price + total` and `total >= 0`.
pub fn acquisition_costs(params: &AcquisitionParameters) -> InvestIdeasResult<AcquisitionCosts> {
    validate_acquisition(params)?;

    let price = params.price;
    let pct_of_price = |pct: Option<Rate>| pct.map(|p| price * p).unwrap_or(Decimal::ZERO);

    let transfer_tax = params.transfer_tax.tax_on(price);
    let notary = pct_of_price(params.notary_pct);
    let registry = pct_of_price(params.registry_pct);
    let legal = pct_of_price(params.legal_pct);
    let financing_costs = params
        .financing
        .as_ref()
        .map(|f| f.origination_cost())
        .unwrap_or(Decimal::ZERO);
    let flat_fees = params.flat_fees;

    let total = transfer_tax + notary + registry + legal + financing_costs + flat_fees;
    let total_investment = price + total;
    let loan_amount = params.loan_amount();

    Ok(AcquisitionCosts {
        transfer_tax,
        notary,
        registry,
        legal,
        financing_costs,
        flat_fees,
        total,
        total_investment,
        loan_amount,
        equity_investment: total_investment - loan_amount,
    })
}

fn validate_acquisition(params: &AcquisitionParameters) -> InvestIdeasResult<()> {
    if params.price <= Decimal::ZERO {
        return Err(InvestIdeasError::invalid(
            "price",
            "Purchase price must be positive",
        ));
    }
    validate_amount("price", params.price)?;
    validate_amount("flat_fees", params.flat_fees)?;
    params.transfer_tax.validate("transfer_tax")?;
    for (field, pct) in [
        ("notary_pct", params.notary_pct),
        ("registry_pct", params.registry_pct),
        ("legal_pct", params.legal_pct),
    ] {
        if let Some(p) = pct {
            validate_rate(field, p)?;
        }
    }
    if let Some(ref financing) = params.financing {
        financing.validate(params.price)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Disposal
// ---------------------------------------------------------------------------

impl DisposalSchedule {
    pub fn validate(&self) -> InvestIdeasResult<()> {
        for (field, pct) in [
            ("disposal.agent_commission", self.agent_commission),
            ("disposal.notary_pct", self.notary_pct),
            ("disposal.registry_pct", self.registry_pct),
        ] {
            if let Some(p) = pct {
                validate_rate(field, p)?;
            }
        }
        self.sale_fee.validate("disposal.sale_fee")?;
        validate_rate("disposal.capital_gains_tax", self.capital_gains_tax)
    }

    /// Disposal costs when selling at `sale_price` an asset acquired for `basis`.
    pub fn costs(&self, sale_price: Money, basis: Money) -> DisposalCosts {
        let pct_of_sale = |pct: Option<Rate>| {
            pct.map(|p| tax_on_positive(sale_price, p))
                .unwrap_or(Decimal::ZERO)
        };

        let agent_commission = pct_of_sale(self.agent_commission);
        let notary = pct_of_sale(self.notary_pct);
        let registry = pct_of_sale(self.registry_pct);
        let sale_fee = self.sale_fee.tax_on(sale_price);
        let gain = capital_gain(sale_price, basis);
        let capital_gains_tax = gain * self.capital_gains_tax;

        DisposalCosts {
            agent_commission,
            notary,
            registry,
            sale_fee,
            capital_gain: gain,
            capital_gains_tax,
            total: agent_commission + notary + registry + sale_fee + capital_gains_tax,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::presets::catalonia;
    use rust_decimal_macros::dec;

    fn flat_purchase(price: Money) -> AcquisitionParameters {
        AcquisitionParameters::cash_purchase(price, TransactionTaxSchedule::Flat { rate: dec!(0.10) })
    }

    #[test]
    fn test_flat_rate_plus_flat_fees() {
        let mut params = flat_purchase(dec!(300000));
        params.flat_fees = dec!(1500);
        let costs = acquisition_costs(&params).unwrap();
        assert_eq!(costs.total, dec!(31500));
        assert_eq!(costs.total_investment, dec!(331500));
        assert_eq!(costs.equity_investment, dec!(331500));
    }

    #[test]
    fn test_fee_stacking() {
        let mut params = flat_purchase(dec!(300000));
        params.notary_pct = Some(dec!(0.007));
        params.registry_pct = Some(dec!(0.005));
        let costs = acquisition_costs(&params).unwrap();
        assert_eq!(costs.notary, dec!(2100));
        assert_eq!(costs.registry, dec!(1500));
        assert_eq!(costs.total_investment, dec!(333600));
    }

    #[test]
    fn test_progressive_schedule_in_costs() {
        let params = AcquisitionParameters::cash_purchase(dec!(900000), catalonia::itp_second_hand());
        let costs = acquisition_costs(&params).unwrap();
        assert_eq!(costs.transfer_tax, dec!(93000));
    }

    #[test]
    fn test_financing_reduces_equity() {
        let mut params = flat_purchase(dec!(300000));
        params.financing = Some(Financing {
            loan_amount: dec!(200000),
            annual_rate: dec!(0.03),
            term_years: 25,
            origination_pct: dec!(0.01),
            origination_fixed: dec!(1000),
        });
        let costs = acquisition_costs(&params).unwrap();
        assert_eq!(costs.financing_costs, dec!(3000));
        assert_eq!(costs.total_investment, dec!(333000));
        assert_eq!(costs.equity_investment, dec!(133000));
    }

    #[test]
    fn test_zero_price_rejected() {
        let params = flat_purchase(Decimal::ZERO);
        assert!(matches!(
            acquisition_costs(&params),
            Err(InvestIdeasError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_negative_fee_pct_rejected() {
        let mut params = flat_purchase(dec!(100000));
        params.legal_pct = Some(dec!(-0.01));
        assert!(acquisition_costs(&params).is_err());
    }

    #[test]
    fn test_disposal_components_independent() {
        let schedule = DisposalSchedule {
            agent_commission: Some(dec!(0.03)),
            notary_pct: Some(dec!(0.005)),
            registry_pct: None,
            sale_fee: TransactionTaxSchedule::Exempt,
            capital_gains_tax: dec!(0.25),
        };
        let costs = schedule.costs(dec!(400000), dec!(300000));
        assert_eq!(costs.agent_commission, dec!(12000));
        assert_eq!(costs.notary, dec!(2000));
        assert_eq!(costs.capital_gain, dec!(100000));
        assert_eq!(costs.capital_gains_tax, dec!(25000));
        assert_eq!(costs.total, dec!(39000));
    }

    #[test]
    fn test_no_capital_gains_tax_on_loss() {
        let schedule = DisposalSchedule {
            capital_gains_tax: dec!(0.21),
            ..Default::default()
        };
        let costs = schedule.costs(dec!(280000), dec!(300000));
        assert_eq!(costs.capital_gains_tax, Decimal::ZERO);
        assert_eq!(costs.total, Decimal::ZERO);
    }
}
