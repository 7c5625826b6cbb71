use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::InvestIdeasError;
use crate::types::{Money, Rate};
use crate::InvestIdeasResult;

const CONVERGENCE_THRESHOLD: Decimal = dec!(0.0000000000001);
const NEWTON_ITERATIONS: u32 = 40;

/// Largest (1 + r)^n a projection may reach. Inputs are capped at
/// `MAX_AMOUNT`, so every yearly figure stays below 1e24.
pub const MAX_GROWTH_FACTOR: Decimal = dec!(1000000000);

/// Largest final-to-initial value ratio an annualised return is taken over.
pub const MAX_RETURN_RATIO: Decimal = dec!(1000000000000000);

/// Compute (1 + r)^n via iterative multiplication (avoids Decimal::powd drift).
pub fn compound(rate: Rate, n: u32) -> InvestIdeasResult<Decimal> {
    let factor = Decimal::ONE
        .checked_add(rate)
        .ok_or_else(|| out_of_range(rate, n))?;
    let mut result = Decimal::ONE;
    for _ in 0..n {
        result = result
            .checked_mul(factor)
            .filter(|r| r.abs() <= MAX_GROWTH_FACTOR)
            .ok_or_else(|| out_of_range(rate, n))?;
    }
    Ok(result)
}

/// Project `base` forward `n` years at `rate`.
pub fn grow(base: Money, rate: Rate, n: u32) -> InvestIdeasResult<Money> {
    let factor = compound(rate, n)?;
    base.checked_mul(factor).ok_or_else(|| out_of_range(rate, n))
}

/// `numerator / denominator`, failing instead of overflowing when the
/// denominator is tiny next to the numerator.
pub fn bounded_ratio(numerator: Money, denominator: Money) -> InvestIdeasResult<Decimal> {
    if denominator.is_zero() {
        return Err(InvestIdeasError::DivisionByZero {
            context: "ratio with zero denominator".into(),
        });
    }
    numerator
        .checked_div(denominator)
        .filter(|r| r.abs() <= MAX_RETURN_RATIO)
        .ok_or_else(|| {
            InvestIdeasError::FinancialImpossibility(format!(
                "{numerator} is more than {MAX_RETURN_RATIO} times {denominator}"
            ))
        })
}

fn out_of_range(rate: Rate, n: u32) -> InvestIdeasError {
    InvestIdeasError::FinancialImpossibility(format!(
        "Compounding {rate} over {n} periods exceeds a growth factor of {MAX_GROWTH_FACTOR}"
    ))
}

/// `max(0, base)`. Taxes and fees never produce rebates.
pub fn positive_part(base: Money) -> Money {
    base.max(Decimal::ZERO)
}

/// Proportional tax on the positive part of `base`.
pub fn tax_on_positive(base: Money, rate: Rate) -> Money {
    positive_part(base) * rate
}

/// Compute the nth root of a positive `x` via Newton's method: x^(1/n).
///
/// Seeded from an f64 estimate and refined in Decimal so the result matches
/// the iterative `compound` helper to Decimal precision.
pub fn nth_root(x: Decimal, n: u32) -> Decimal {
    if n <= 1 || x <= Decimal::ZERO {
        return x;
    }

    let n_dec = Decimal::from(n);
    let n_minus_1 = n_dec - Decimal::ONE;

    let mut guess = x
        .to_f64()
        .and_then(|v| Decimal::from_f64(v.powf(1.0 / f64::from(n))))
        .filter(|g| *g > Decimal::ZERO)
        .unwrap_or(Decimal::ONE);

    for _ in 0..NEWTON_ITERATIONS {
        let power = match checked_powu(guess, n - 1) {
            Some(p) if !p.is_zero() => p,
            _ => break,
        };
        let next = (n_minus_1 * guess + x / power) / n_dec;
        let delta = (next - guess).abs();
        guess = next;
        if delta < CONVERGENCE_THRESHOLD {
            break;
        }
    }

    guess
}

fn checked_powu(base: Decimal, n: u32) -> Option<Decimal> {
    let mut result = Decimal::ONE;
    for _ in 0..n {
        result = result.checked_mul(base)?;
    }
    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: Decimal, expected: Decimal, tol: Decimal) {
        assert!(
            (actual - expected).abs() < tol,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_compound_five_percent_ten_years() {
        assert_close(compound(dec!(0.05), 10).unwrap(), dec!(1.628894626777), dec!(0.000000001));
    }

    #[test]
    fn test_compound_zero_years_is_one() {
        assert_eq!(compound(dec!(0.12), 0).unwrap(), Decimal::ONE);
    }

    #[test]
    fn test_nth_root_inverts_compound() {
        let factor = compound(dec!(0.07), 12).unwrap();
        assert_close(nth_root(factor, 12), dec!(1.07), dec!(0.0000000001));
    }

    #[test]
    fn test_nth_root_below_one() {
        // 0.81^(1/2) = 0.9
        assert_close(nth_root(dec!(0.81), 2), dec!(0.9), dec!(0.0000000001));
    }

    #[test]
    fn test_nth_root_first_root_is_identity() {
        assert_eq!(nth_root(dec!(1.2345), 1), dec!(1.2345));
    }

    #[test]
    fn test_nth_root_large_ratio_does_not_overflow() {
        let root = nth_root(dec!(1000), 50);
        assert_close(compound(root - Decimal::ONE, 50).unwrap(), dec!(1000), dec!(0.0001));
    }

    #[test]
    fn test_tax_on_positive_never_rebates() {
        assert_eq!(tax_on_positive(dec!(-5000), dec!(0.25)), Decimal::ZERO);
        assert_eq!(tax_on_positive(dec!(4000), dec!(0.25)), dec!(1000));
    }

    #[test]
    fn test_runaway_growth_is_an_error() {
        // 5^50 is far past Decimal range
        assert!(matches!(
            compound(dec!(4), 50),
            Err(InvestIdeasError::FinancialImpossibility(_))
        ));
        assert!(grow(dec!(100000), dec!(4), 50).is_err());
        assert!(compound(Decimal::MAX, 1).is_err());
    }

    #[test]
    fn test_grow_rejects_overflowing_base() {
        assert!(grow(Decimal::MAX, dec!(0.5), 1).is_err());
        assert_eq!(grow(dec!(100), dec!(0.1), 2).unwrap(), dec!(121));
    }

    #[test]
    fn test_bounded_ratio() {
        assert_eq!(bounded_ratio(dec!(3), dec!(2)).unwrap(), dec!(1.5));
        assert!(bounded_ratio(dec!(1000000), dec!(0.0000000001)).is_err());
        assert!(matches!(
            bounded_ratio(Decimal::ONE, Decimal::ZERO),
            Err(InvestIdeasError::DivisionByZero { .. })
        ));
    }
}
