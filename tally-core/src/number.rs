//! Arbitrary precision numbers using dashu
//!
//! Uses dashu-float (DBig) for decimal arithmetic. Operands keep every digit
//! they were written with; results are computed with at least
//! `DEFAULT_PRECISION` significant digits.

use dashu_float::DBig;
use dashu_int::ops::BitTest;
use dashu_int::IBig;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NumberError {
    #[error("not a decimal number: '{0}'")]
    ParseError(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("value outside the representable range")]
    Overflow,

    #[error("'{0}' is beyond 1e±{max}", max = MAX_EXPONENT)]
    OutOfRange(String),
}

/// Minimum working precision for calculations (significant decimal digits)
pub const DEFAULT_PRECISION: usize = 50;

/// Operands must have a magnitude between `1e-MAX_EXPONENT` and `1eMAX_EXPONENT`
pub const MAX_EXPONENT: isize = 10_000;

/// Beyond this exponent `to_plain_string` switches to scientific notation
const PLAIN_EXPONENT_LIMIT: usize = 100_000;

/// Arbitrary precision decimal number
///
/// Built on dashu-float's DBig. All operations return Results or new
/// Numbers - never panic.
#[derive(Debug, Clone)]
pub struct Number {
    inner: DBig,
}

impl Number {
    /// Raise a DBig to the working precision without dropping any of its digits
    fn with_work_precision(val: DBig) -> DBig {
        let digits = Self::digit_count(&val);
        val.with_precision(digits.max(DEFAULT_PRECISION)).value()
    }

    fn digit_count(val: &DBig) -> usize {
        let (significand, _) = val.clone().into_repr().into_parts();
        significand.to_string().trim_start_matches('-').len()
    }

    /// (significant digits, exponent of the last digit)
    fn extent(&self) -> (isize, isize) {
        let (significand, exponent) = self.inner.clone().into_repr().into_parts();
        let digits = significand.to_string().trim_start_matches('-').len();
        (digits as isize, exponent)
    }

    /// Exponent of the leading digit: 0 for 1..10, -3 for 0.00x
    fn magnitude(&self) -> isize {
        let (digits, exponent) = self.extent();
        exponent + digits - 1
    }

    fn widened(&self, precision: usize) -> DBig {
        self.inner.clone().with_precision(precision).value()
    }

    /// Digits needed to hold `self ± other` without rounding
    fn sum_precision(&self, other: &Self) -> usize {
        let (da, ea) = self.extent();
        let (db, eb) = other.extent();
        let top = (ea + da).max(eb + db);
        let bottom = ea.min(eb);
        ((top - bottom) as usize + 1).max(DEFAULT_PRECISION)
    }

    /// Digits needed to hold `self * other` without rounding
    fn product_precision(&self, other: &Self) -> usize {
        let (da, _) = self.extent();
        let (db, _) = other.extent();
        ((da + db) as usize).max(DEFAULT_PRECISION)
    }

    pub fn from_i64(n: i64) -> Self {
        Self { inner: Self::with_work_precision(DBig::from(n)) }
    }

    /// Create from a count (sample sizes, divisors)
    pub fn from_usize(n: usize) -> Self {
        match i64::try_from(n) {
            Ok(n) => Self::from_i64(n),
            Err(_) => Self { inner: Self::with_work_precision(DBig::from_parts(IBig::from(n), 0)) },
        }
    }

    /// Create from f64 through its shortest round-trip decimal text.
    ///
    /// `7.0710678118654755_f64` becomes exactly `7.0710678118654755`.
    pub fn from_f64(f: f64) -> Result<Self, NumberError> {
        if !f.is_finite() {
            return Err(NumberError::Overflow);
        }
        format!("{}", f).parse()
    }

    pub fn is_zero(&self) -> bool {
        let (significand, _) = self.inner.clone().into_repr().into_parts();
        significand == IBig::ZERO
    }

    pub fn is_negative(&self) -> bool {
        self.inner < DBig::ZERO
    }

    /// True when there is no fractional part
    pub fn is_integer(&self) -> bool {
        self.inner.clone().floor() == self.inner
    }

    /// Exact sum
    pub fn add(&self, other: &Self) -> Self {
        let precision = self.sum_precision(other);
        Self { inner: &self.widened(precision) + &other.widened(precision) }
    }

    /// Exact difference
    pub fn sub(&self, other: &Self) -> Self {
        let precision = self.sum_precision(other);
        Self { inner: &self.widened(precision) - &other.widened(precision) }
    }

    /// Exact product
    pub fn mul(&self, other: &Self) -> Self {
        let precision = self.product_precision(other);
        Self { inner: &self.widened(precision) * &other.widened(precision) }
    }

    /// `self / other`, `DivisionByZero` when `other` is zero
    pub fn checked_div(&self, other: &Self) -> Result<Self, NumberError> {
        if other.is_zero() {
            Err(NumberError::DivisionByZero)
        } else {
            Ok(Self { inner: &self.inner / &other.inner })
        }
    }

    /// Exact integer value, `None` for fractions or values outside `i64`
    pub fn to_i64(&self) -> Option<i64> {
        if self.is_zero() {
            return Some(0);
        }
        if !self.is_integer() || self.magnitude() > 18 {
            return None;
        }
        self.to_plain_string().parse().ok()
    }

    /// Convert to f64 (may lose precision)
    pub fn to_f64(&self) -> Option<f64> {
        let (significand, exponent) = self.inner.clone().into_repr().into_parts();

        let sig_f64: f64 = if significand.bit_len() <= 53 {
            let as_i64: i64 = significand.try_into().ok()?;
            as_i64 as f64
        } else {
            // Shift right to fit in 53 bits, then scale back up
            let is_neg = significand < IBig::ZERO;
            let abs_sig = if is_neg { -significand } else { significand };
            let extra_bits = abs_sig.bit_len() - 53;
            let shifted = &abs_sig >> extra_bits;
            let shifted_i64: i64 = shifted.try_into().ok()?;
            let base = shifted_i64 as f64 * 2_f64.powi(extra_bits as i32);
            if is_neg { -base } else { base }
        };

        let result = if exponent == 0 {
            sig_f64
        } else if exponent > 0 && exponent <= 308 {
            sig_f64 * 10_f64.powi(exponent as i32)
        } else if exponent < 0 && exponent >= -308 {
            sig_f64 / 10_f64.powi((-exponent) as i32)
        } else {
            return None;
        };

        if result.is_finite() {
            Some(result)
        } else {
            None
        }
    }

    /// Render as a plain decimal string: no exponent, no trailing zeros.
    ///
    /// `5.000` renders as `5`, `0.00012` as `0.00012`, `-1.5e3` as `-1500`.
    /// Exponents past 100000 in either direction render as `1.5e200000`.
    pub fn to_plain_string(&self) -> String {
        let (significand, exponent) = self.inner.clone().into_repr().into_parts();
        if significand == IBig::ZERO {
            return "0".to_string();
        }

        let negative = significand < IBig::ZERO;
        let digits = if negative { (-significand).to_string() } else { significand.to_string() };
        let sign = if negative { "-" } else { "" };

        if exponent.unsigned_abs() > PLAIN_EXPONENT_LIMIT {
            let magnitude = exponent + digits.len() as isize - 1;
            let (lead, rest) = digits.split_at(1);
            let rest = rest.trim_end_matches('0');
            return if rest.is_empty() {
                format!("{}{}e{}", sign, lead, magnitude)
            } else {
                format!("{}{}.{}e{}", sign, lead, rest, magnitude)
            };
        }

        let mut text = if exponent >= 0 {
            let mut s = digits;
            s.push_str(&"0".repeat(exponent as usize));
            s
        } else {
            let shift = exponent.unsigned_abs();
            if digits.len() > shift {
                let (int_part, frac_part) = digits.split_at(digits.len() - shift);
                format!("{}.{}", int_part, frac_part)
            } else {
                format!("0.{}{}", "0".repeat(shift - digits.len()), digits)
            }
        };

        if text.contains('.') {
            let trimmed = text.trim_end_matches('0').trim_end_matches('.').len();
            text.truncate(trimmed);
        }

        text.insert_str(0, sign);
        text
    }
}

impl Number {
    /// Reject parsed literals whose magnitude is beyond `MAX_EXPONENT`
    fn bounded(text: &str, value: DBig) -> Result<Self, NumberError> {
        let number = Self { inner: Self::with_work_precision(value) };
        if !number.is_zero() && number.magnitude().abs() > MAX_EXPONENT {
            return Err(NumberError::OutOfRange(text.to_string()));
        }
        Ok(number)
    }
}

impl FromStr for Number {
    type Err = NumberError;

    /// Parse a decimal literal: "123", "-3.14", "1.5e10", "602214076e15"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(NumberError::ParseError(s.to_string()));
        }

        // Scientific notation with integer mantissa: "602214076e15"
        if (s.contains('e') || s.contains('E')) && !s.contains('.') {
            let s_lower = s.to_lowercase();
            let parts: Vec<&str> = s_lower.split('e').collect();
            if parts.len() == 2 {
                let mantissa: IBig = parts[0]
                    .parse()
                    .map_err(|_| NumberError::ParseError(s.to_string()))?;
                let exp: isize = parts[1]
                    .parse()
                    .map_err(|_| NumberError::ParseError(s.to_string()))?;

                let result = DBig::from_parts(mantissa, exp);
                return Self::bounded(s, result);
            }
        }

        let inner: DBig = s
            .parse()
            .map_err(|_| NumberError::ParseError(s.to_string()))?;

        Self::bounded(s, inner)
    }
}

impl std::fmt::Display for Number {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_plain_string())
    }
}

impl Serialize for Number {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_plain_string())
    }
}

impl<'de> Deserialize<'de> for Number {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for Number {}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Number {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.inner.partial_cmp(&other.inner).unwrap_or(std::cmp::Ordering::Equal)
    }
}
