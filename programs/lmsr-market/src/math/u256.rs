//! 256-bit unsigned integer for overflow-free `a * b / d`
//!
//! Only the operations the ledger and pricing math need: widening
//! multiplication of two u128 values and division back down to u128.

use crate::error::MarketError;

/// 256-bit unsigned integer represented as two u128 values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct U256 {
    /// Low 128 bits
    pub lo: u128,
    /// High 128 bits
    pub hi: u128,
}

impl U256 {
    pub const ZERO: Self = Self { lo: 0, hi: 0 };

    pub const fn from_u128(val: u128) -> Self {
        Self { lo: val, hi: 0 }
    }

    pub fn is_zero(&self) -> bool {
        self.lo == 0 && self.hi == 0
    }

    /// Full 128x128 -> 256 bit product
    pub fn mul_u128(a: u128, b: u128) -> Self {
        const MASK: u128 = u64::MAX as u128;

        let a0 = a & MASK;
        let a1 = a >> 64;
        let b0 = b & MASK;
        let b1 = b >> 64;

        let p00 = a0 * b0;
        let p01 = a0 * b1;
        let p10 = a1 * b0;
        let p11 = a1 * b1;

        // Middle column: high half of p00 plus low halves of the cross terms
        let mid = (p00 >> 64) + (p01 & MASK) + (p10 & MASK);

        let lo = (p00 & MASK) | (mid << 64);
        let hi = p11 + (p01 >> 64) + (p10 >> 64) + (mid >> 64);

        Self { lo, hi }
    }

    /// Divide by a u128, failing if the quotient does not fit in u128
    pub fn div_u128(&self, divisor: u128) -> Result<u128, MarketError> {
        if divisor == 0 {
            return Err(MarketError::DivisionByZero);
        }
        if self.hi == 0 {
            return Ok(self.lo / divisor);
        }
        if self.hi >= divisor {
            return Err(MarketError::ArithmeticOverflow);
        }

        // Restoring long division over the low 128 bits; the running
        // remainder is always < divisor, so a carry bit tracks bit 128.
        let mut remainder = self.hi;
        let mut quotient = 0u128;
        for i in (0..128).rev() {
            let carry = remainder >> 127;
            remainder = (remainder << 1) | ((self.lo >> i) & 1);
            if carry == 1 || remainder >= divisor {
                remainder = remainder.wrapping_sub(divisor);
                quotient |= 1u128 << i;
            }
        }

        Ok(quotient)
    }
}

/// `a * b / d`, rounded down, without intermediate overflow
pub fn mul_div(a: u128, b: u128, d: u128) -> Result<u128, MarketError> {
    U256::mul_u128(a, b).div_u128(d)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wide_product() {
        let p = U256::mul_u128(u128::MAX, u128::MAX);
        // (2^128 - 1)^2 = 2^256 - 2^129 + 1
        assert_eq!(p.lo, 1);
        assert_eq!(p.hi, u128::MAX - 1);
        assert_eq!(U256::mul_u128(3, 7), U256::from_u128(21));
        assert!(U256::mul_u128(0, u128::MAX).is_zero());
    }

    #[test]
    fn test_mul_div_beyond_u128() {
        // 1e24 shares * 1e18 payout-per-share overflows u128 on its own
        let shares = 1_000_000_000_000_000_000_000_000u128;
        let unit = 1_000_000_000_000_000_000u128;
        assert_eq!(mul_div(shares, unit, unit).unwrap(), shares);
        assert_eq!(mul_div(u128::MAX, u128::MAX, u128::MAX).unwrap(), u128::MAX);
        assert_eq!(mul_div(10, 10, 3).unwrap(), 33);
    }

    #[test]
    fn test_mul_div_errors() {
        assert_eq!(mul_div(1, 1, 0), Err(MarketError::DivisionByZero));
        assert_eq!(mul_div(u128::MAX, 2, 1), Err(MarketError::ArithmeticOverflow));
    }
}
