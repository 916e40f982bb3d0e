//! Weighted constant-product swap kernels
//!
//! The two invariant solutions every estimator is built from, matching the
//! pool contract's fixed-point arithmetic. Weights are 18-decimal
//! denormalized values, balances are raw on-chain integers, and the fee is a
//! decimal fraction of trade value. All math stays in `Decimal`.

use parlay_core::{EngineError, EngineResult};
use rust_decimal::{Decimal, MathematicalOps};

/// A single swap may consume at most half of the in-side balance.
pub fn max_in_amount(balance_in: Decimal) -> Decimal {
    balance_in / Decimal::from(2)
}

/// A single swap may extract at most a third of the out-side balance.
pub fn max_out_amount(balance_out: Decimal) -> Decimal {
    balance_out / Decimal::from(3)
}

fn pow_ratio(base: Decimal, exponent: Decimal) -> EngineResult<Decimal> {
    // equal weights are the common case; skip the transcendental path
    if exponent == Decimal::ONE {
        return Ok(base);
    }
    base.checked_powd(exponent)
        .ok_or_else(|| EngineError::no_convergence("fixed-point pow overflow"))
}

/// Amount of the out-token received for `amount_in` of the in-token.
///
/// `out = balance_out * (1 - (balance_in / (balance_in + in*(1-fee)))^(w_in/w_out))`
pub fn calc_out_given_in(
    balance_in: Decimal,
    weight_in: Decimal,
    balance_out: Decimal,
    weight_out: Decimal,
    amount_in: Decimal,
    fee: Decimal,
) -> EngineResult<Decimal> {
    if balance_in <= Decimal::ZERO || balance_out <= Decimal::ZERO {
        return Err(EngineError::no_convergence("empty pool balance"));
    }
    if weight_in <= Decimal::ZERO || weight_out <= Decimal::ZERO {
        return Err(EngineError::malformed("non-positive pool weight"));
    }
    if amount_in > max_in_amount(balance_in) {
        return Err(EngineError::no_convergence("swap exceeds max-in ratio"));
    }

    let weight_ratio = weight_in / weight_out;
    let adjusted_in = amount_in * (Decimal::ONE - fee);
    let y = balance_in / (balance_in + adjusted_in);
    let foo = pow_ratio(y, weight_ratio)?;
    Ok(balance_out * (Decimal::ONE - foo))
}

/// Amount of the in-token required to receive `amount_out` of the out-token.
///
/// `in = balance_in * ((balance_out / (balance_out - out))^(w_out/w_in) - 1) / (1-fee)`
pub fn calc_in_given_out(
    balance_in: Decimal,
    weight_in: Decimal,
    balance_out: Decimal,
    weight_out: Decimal,
    amount_out: Decimal,
    fee: Decimal,
) -> EngineResult<Decimal> {
    if balance_in <= Decimal::ZERO || balance_out <= Decimal::ZERO {
        return Err(EngineError::no_convergence("empty pool balance"));
    }
    if weight_in <= Decimal::ZERO || weight_out <= Decimal::ZERO {
        return Err(EngineError::malformed("non-positive pool weight"));
    }
    if amount_out > max_out_amount(balance_out) {
        return Err(EngineError::no_convergence("swap exceeds max-out ratio"));
    }

    let diff = balance_out - amount_out;
    if diff <= Decimal::ZERO {
        return Err(EngineError::no_convergence("swap drains out-side balance"));
    }

    let weight_ratio = weight_out / weight_in;
    let y = balance_out / diff;
    let foo = pow_ratio(y, weight_ratio)? - Decimal::ONE;
    let fee_complement = Decimal::ONE - fee;
    if fee_complement <= Decimal::ZERO {
        return Err(EngineError::malformed("fee at or above 100%"));
    }
    Ok(balance_in * foo / fee_complement)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const FEE: Decimal = dec!(0.01);

    #[test]
    fn test_out_given_in_equal_weights_no_fee() {
        // constant product with equal weights: out = bO * in / (bI + in)
        let out = calc_out_given_in(dec!(1000), dec!(1), dec!(1000), dec!(1), dec!(100), Decimal::ZERO)
            .unwrap();
        let expected = dec!(1000) * dec!(100) / dec!(1100);
        assert!((out - expected).abs() < dec!(0.000001));
    }

    #[test]
    fn test_out_given_in_fee_reduces_output() {
        let no_fee =
            calc_out_given_in(dec!(1000), dec!(1), dec!(1000), dec!(1), dec!(100), Decimal::ZERO)
                .unwrap();
        let with_fee =
            calc_out_given_in(dec!(1000), dec!(1), dec!(1000), dec!(1), dec!(100), FEE).unwrap();
        assert!(with_fee < no_fee);
    }

    #[test]
    fn test_in_out_inverse() {
        let out = calc_out_given_in(dec!(1000), dec!(2), dec!(500), dec!(3), dec!(80), FEE).unwrap();
        let back = calc_in_given_out(dec!(1000), dec!(2), dec!(500), dec!(3), out, FEE).unwrap();
        assert!((back - dec!(80)).abs() < dec!(0.01));
    }

    #[test]
    fn test_max_in_ratio_guard() {
        let result =
            calc_out_given_in(dec!(1000), dec!(1), dec!(1000), dec!(1), dec!(501), Decimal::ZERO);
        assert!(matches!(result, Err(EngineError::NoConvergence(_))));
    }

    #[test]
    fn test_max_out_ratio_guard() {
        let result =
            calc_in_given_out(dec!(1000), dec!(1), dec!(1000), dec!(1), dec!(334), Decimal::ZERO);
        assert!(matches!(result, Err(EngineError::NoConvergence(_))));
    }

    #[test]
    fn test_empty_balance_is_no_convergence() {
        let result =
            calc_out_given_in(Decimal::ZERO, dec!(1), dec!(1000), dec!(1), dec!(10), Decimal::ZERO);
        assert!(matches!(result, Err(EngineError::NoConvergence(_))));
    }
}
