//! Jurisdiction rate tables. Every calculator builds its scenario from these
//! values instead of carrying its own constants.

/// Catalonia (Spain) residential property.
pub mod catalonia {
    use rust_decimal_macros::dec;

    use crate::tables::schedule::{TaxBracket, TransactionTaxSchedule};
    use crate::types::{Money, Rate};

    /// ITP bracket thresholds (cumulative) and marginal rates.
    pub const ITP_THRESHOLDS: [Money; 3] = [dec!(600000), dec!(900000), dec!(1500000)];
    pub const ITP_RATES: [Rate; 4] = [dec!(0.10), dec!(0.11), dec!(0.12), dec!(0.13)];

    /// IVA on new-build housing
    pub const NEW_BUILD_VAT: Rate = dec!(0.10);
    /// AJD stamp duty on new-build deeds
    pub const NEW_BUILD_AJD: Rate = dec!(0.015);

    pub const NOTARY_PCT: Rate = dec!(0.007);
    pub const REGISTRY_PCT: Rate = dec!(0.005);
    pub const LEGAL_PCT: Rate = dec!(0.01);

    pub const MORTGAGE_ORIGINATION_PCT: Rate = dec!(0.01);
    pub const MORTGAGE_ORIGINATION_FIXED: Money = dec!(1000);

    pub const SALE_AGENT_COMMISSION: Rate = dec!(0.03);
    /// Agency fee for letting, as a share of collected rent
    pub const RENTAL_AGENCY_FEE: Rate = dec!(0.08);

    pub const PERSONAL_CAPITAL_GAINS_TAX: Rate = dec!(0.21);
    pub const CORPORATE_TAX: Rate = dec!(0.25);

    /// Self-managed letting: hours per month and hourly rate.
    pub const MANAGEMENT_HOURS_PER_MONTH: u32 = 2;
    pub const MANAGEMENT_HOURLY_RATE: Money = dec!(36);

    pub const APPRECIATION_CONSERVATIVE: Rate = dec!(0.05);
    pub const APPRECIATION_HISTORICAL: Rate = dec!(0.09);
    pub const APPRECIATION_MIN: Rate = dec!(0.02);
    pub const APPRECIATION_MAX: Rate = dec!(0.09);

    /// Second-hand housing transfer tax (ITP), progressive.
    pub fn itp_second_hand() -> TransactionTaxSchedule {
        TransactionTaxSchedule::Progressive {
            brackets: vec![
                TaxBracket {
                    upper_bound: Some(ITP_THRESHOLDS[0]),
                    rate: ITP_RATES[0],
                },
                TaxBracket {
                    upper_bound: Some(ITP_THRESHOLDS[1]),
                    rate: ITP_RATES[1],
                },
                TaxBracket {
                    upper_bound: Some(ITP_THRESHOLDS[2]),
                    rate: ITP_RATES[2],
                },
                TaxBracket {
                    upper_bound: None,
                    rate: ITP_RATES[3],
                },
            ],
        }
    }

    /// New-build housing: IVA plus AJD on the same price.
    pub fn new_build_vat_ajd() -> TransactionTaxSchedule {
        TransactionTaxSchedule::Composite {
            parts: vec![
                TransactionTaxSchedule::Flat {
                    rate: NEW_BUILD_VAT,
                },
                TransactionTaxSchedule::Flat {
                    rate: NEW_BUILD_AJD,
                },
            ],
        }
    }
}

/// Spanish retail brokerage and savings taxation.
pub mod spain {
    use rust_decimal_macros::dec;

    use crate::tables::schedule::TransactionTaxSchedule;
    use crate::types::{Money, Rate};

    pub const BROKER_COMMISSION: Rate = dec!(0.0012);
    pub const BROKER_COMMISSION_MIN: Money = dec!(1);
    pub const BROKER_COMMISSION_MAX: Money = dec!(25);

    /// Annual custody fee, used by the approximate net-return summary
    pub const CUSTODY_FEE: Rate = dec!(0.0015);
    /// Savings-income tax on realised gains (individuals)
    pub const SAVINGS_TAX: Rate = dec!(0.21);
    /// Corporate tax on realised gains (holding company)
    pub const CORPORATE_TAX: Rate = dec!(0.25);

    /// Per-operation broker commission: 0.12% clamped to [1, 25].
    pub fn broker_commission() -> TransactionTaxSchedule {
        TransactionTaxSchedule::Clamped {
            rate: BROKER_COMMISSION,
            min: BROKER_COMMISSION_MIN,
            max: BROKER_COMMISSION_MAX,
        }
    }
}

/// Brazil (Ceará coast) operated through a Spanish company.
pub mod brazil {
    use rust_decimal_macros::dec;

    use crate::tables::schedule::{TaxLayer, TaxRegime, TransactionTaxSchedule};
    use crate::types::Rate;

    pub const PURCHASE_TAX: Rate = dec!(0.04);
    pub const CAPITAL_GAINS_TAX: Rate = dec!(0.15);
    pub const SIMPLES_NACIONAL: Rate = dec!(0.11);
    pub const REPATRIATION_WITHHOLDING: Rate = dec!(0.15);
    pub const SPAIN_CORPORATE_TAX: Rate = dec!(0.25);

    /// Constant BRL→EUR rate used to express BRL scenarios in euros
    pub const BRL_EUR: Rate = dec!(0.159);

    pub const APPRECIATION_CONSERVATIVE: Rate = dec!(0.08);
    pub const APPRECIATION_HISTORICAL: Rate = dec!(0.12);
    pub const APPRECIATION_MIN: Rate = dec!(0.05);
    pub const APPRECIATION_MAX: Rate = dec!(0.18);

    pub fn purchase_tax() -> TransactionTaxSchedule {
        TransactionTaxSchedule::Flat { rate: PURCHASE_TAX }
    }

    /// Simples Nacional on turnover, then withholding on repatriation, then
    /// Spanish corporate tax on what arrives.
    pub fn cross_border_regime() -> TaxRegime {
        TaxRegime {
            turnover_tax: SIMPLES_NACIONAL,
            income_layers: vec![
                TaxLayer::new("Brazil repatriation withholding", REPATRIATION_WITHHOLDING),
                TaxLayer::new("Spain corporate tax", SPAIN_CORPORATE_TAX),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_itp_schedule_validates() {
        assert!(catalonia::itp_second_hand().validate("itp").is_ok());
    }

    #[test]
    fn test_cross_border_regime_retention() {
        // (1 - 0.15) * (1 - 0.25)
        let regime = brazil::cross_border_regime();
        assert_eq!(regime.retention_factor(), dec!(0.6375));
        assert_eq!(regime.turnover_tax, dec!(0.11));
    }

    #[test]
    fn test_broker_commission_cap() {
        assert_eq!(spain::broker_commission().tax_on(dec!(100000)), dec!(25));
    }
}
