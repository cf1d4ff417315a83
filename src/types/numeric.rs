//! Arbitrary-precision decimal with the special values Oracle's binary
//! floating point columns can hold
//!
//! Values that fit a 28-digit [`Decimal`] exactly are kept as one. Anything
//! wider, such as a 38-digit NUMBER or `1E-32`, is kept as a [`BigDecimal`]
//! so no digit is ever rounded away.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::error::{Error, Result};

/// Scale magnitude beyond which a value is never tried as a [`Decimal`]
const MAX_NARROW_SCALE: i64 = 400;

/// Decimal value that can also be infinite or NaN
#[derive(Debug, Clone)]
pub enum Numeric {
    /// Finite decimal within 28 significant digits
    Finite(Decimal),
    /// Finite decimal too wide or too small for [`Numeric::Finite`]
    Wide(BigDecimal),
    /// Positive infinity
    Infinity,
    /// Negative infinity
    NegInfinity,
    /// Not a number (sign is not preserved)
    NaN,
}

impl Numeric {
    /// Convert from a float, keeping its shortest decimal representation
    pub fn from_f64(value: f64) -> Result<Self> {
        if value.is_nan() {
            return Ok(Numeric::NaN);
        }
        if value.is_infinite() {
            return Ok(if value > 0.0 {
                Numeric::Infinity
            } else {
                Numeric::NegInfinity
            });
        }
        value.to_string().parse()
    }

    /// Wrap an arbitrary-precision value, narrowing it when that is exact
    pub fn from_big(value: BigDecimal) -> Self {
        let (_, scale) = value.as_bigint_and_exponent();
        if scale.abs() > MAX_NARROW_SCALE {
            return Numeric::Wide(value);
        }
        let narrow = Decimal::from_str(&plain_text(&value))
            .ok()
            .filter(|d| BigDecimal::from_str(&d.to_string()).map_or(false, |b| b == value));
        match narrow {
            Some(d) => Numeric::Finite(d),
            None => Numeric::Wide(value),
        }
    }

    /// Convert to the nearest float
    pub fn to_f64(&self) -> f64 {
        match self {
            Numeric::Finite(d) => d.to_f64().unwrap_or(f64::NAN),
            Numeric::Wide(b) => plain_text(b).parse().unwrap_or(f64::NAN),
            Numeric::Infinity => f64::INFINITY,
            Numeric::NegInfinity => f64::NEG_INFINITY,
            Numeric::NaN => f64::NAN,
        }
    }

    /// Integer part, if it fits in i64
    pub fn trunc_i64(&self) -> Option<i64> {
        match self {
            Numeric::Finite(d) => d.trunc().to_i64(),
            Numeric::Wide(b) => {
                let text = plain_text(b);
                let integer = text.split('.').next().unwrap_or("0");
                integer.parse().ok()
            }
            _ => None,
        }
    }

    /// Whether this is a finite value
    pub fn is_finite(&self) -> bool {
        matches!(self, Numeric::Finite(_) | Numeric::Wide(_))
    }

    /// Whether this is positive or negative infinity
    pub fn is_infinite(&self) -> bool {
        matches!(self, Numeric::Infinity | Numeric::NegInfinity)
    }

    /// Whether this is NaN
    pub fn is_nan(&self) -> bool {
        matches!(self, Numeric::NaN)
    }

    /// The finite value as a 28-digit decimal, if it is one
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Numeric::Finite(d) => Some(*d),
            _ => None,
        }
    }

    /// The finite value at full precision
    pub fn to_big_decimal(&self) -> Option<BigDecimal> {
        match self {
            Numeric::Finite(d) => BigDecimal::from_str(&d.to_string()).ok(),
            Numeric::Wide(b) => Some(b.clone()),
            _ => None,
        }
    }
}

/// Render without an exponent: `1E-3` becomes `0.001`, `12E2` becomes `1200`
pub(crate) fn plain_text(value: &BigDecimal) -> String {
    let (mantissa, scale) = value.as_bigint_and_exponent();
    let text = mantissa.to_string();
    let (sign, digits) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.as_str()),
    };
    format!("{}{}", sign, place_point(digits, scale))
}

/// Place the decimal point `scale` digits from the right of `digits`
pub(crate) fn place_point(digits: &str, scale: i64) -> String {
    if scale <= 0 {
        if digits.trim_start_matches('0').is_empty() {
            return "0".to_string();
        }
        return format!("{}{}", digits, "0".repeat(scale.unsigned_abs() as usize));
    }
    let scale = scale as usize;
    let padded = if digits.len() <= scale {
        format!("{}{}", "0".repeat(scale + 1 - digits.len()), digits)
    } else {
        digits.to_string()
    };
    let (integer, fraction) = padded.split_at(padded.len() - scale);
    format!("{}.{}", integer, fraction)
}

impl PartialEq for Numeric {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Numeric::Finite(a), Numeric::Finite(b)) => a == b,
            (Numeric::Infinity, Numeric::Infinity)
            | (Numeric::NegInfinity, Numeric::NegInfinity)
            | (Numeric::NaN, Numeric::NaN) => true,
            _ => match (self.to_big_decimal(), other.to_big_decimal()) {
                (Some(a), Some(b)) => a.cmp(&b) == Ordering::Equal,
                _ => false,
            },
        }
    }
}

impl Eq for Numeric {}

impl From<Decimal> for Numeric {
    fn from(value: Decimal) -> Self {
        Numeric::Finite(value)
    }
}

impl From<BigDecimal> for Numeric {
    fn from(value: BigDecimal) -> Self {
        Numeric::from_big(value)
    }
}

impl fmt::Display for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Numeric::Finite(d) => write!(f, "{}", d),
            Numeric::Wide(b) => f.write_str(&plain_text(b)),
            Numeric::Infinity => f.write_str("Infinity"),
            Numeric::NegInfinity => f.write_str("-Infinity"),
            Numeric::NaN => f.write_str("NaN"),
        }
    }
}

impl FromStr for Numeric {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "infinity" | "+infinity" | "inf" | "+inf" => return Ok(Numeric::Infinity),
            "-infinity" | "-inf" => return Ok(Numeric::NegInfinity),
            "nan" | "-nan" | "+nan" => return Ok(Numeric::NaN),
            _ => {}
        }
        BigDecimal::from_str(trimmed)
            .map(Numeric::from_big)
            .map_err(|e| Error::DataConversionError(format!("invalid decimal {:?}: {}", s, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_special_values_parse_and_display() {
        assert_eq!("Infinity".parse::<Numeric>().unwrap(), Numeric::Infinity);
        assert_eq!("-Infinity".parse::<Numeric>().unwrap(), Numeric::NegInfinity);
        assert_eq!("-NaN".parse::<Numeric>().unwrap(), Numeric::NaN);
        assert_eq!(Numeric::Infinity.to_string(), "Infinity");
        assert_eq!(Numeric::NegInfinity.to_string(), "-Infinity");
        assert_eq!(Numeric::NaN.to_string(), "NaN");
    }

    #[test]
    fn test_finite_equality_ignores_trailing_zeros() {
        let a: Numeric = "45.0".parse().unwrap();
        let b: Numeric = "45".parse().unwrap();
        assert_eq!(a, b);
        assert_eq!("1.5e2".parse::<Numeric>().unwrap(), "150".parse().unwrap());
    }

    #[test]
    fn test_narrow_values_keep_their_scale() {
        let n: Numeric = "45.00".parse().unwrap();
        assert_eq!(n.as_decimal().map(|d| d.scale()), Some(2));
        assert_eq!(n.to_string(), "45.00");
    }

    #[test]
    fn test_from_f64() {
        assert_eq!(
            Numeric::from_f64(45.68392).unwrap(),
            Numeric::Finite(Decimal::from_str("45.68392").unwrap())
        );
        assert_eq!(Numeric::from_f64(f64::NEG_INFINITY).unwrap(), Numeric::NegInfinity);
        assert!(Numeric::from_f64(-f64::NAN).unwrap().is_nan());
        assert_eq!(Numeric::Infinity.to_f64(), f64::INFINITY);
    }

    #[test]
    fn test_wide_integers_are_exact() {
        let n: Numeric = "123456789012345678901234567890".parse().unwrap();
        assert!(matches!(n, Numeric::Wide(_)));
        assert_eq!(n.to_string(), "123456789012345678901234567890");
        assert_eq!(n, "1.2345678901234567890123456789e29".parse().unwrap());
        assert_eq!(n.trunc_i64(), None);
    }

    #[test]
    fn test_tiny_fractions_are_not_rounded_to_zero() {
        let n: Numeric = "0.00000000000000000000000000000001".parse().unwrap();
        assert!(matches!(n, Numeric::Wide(_)));
        assert_ne!(n, Numeric::Finite(Decimal::ZERO));
        assert_eq!(n, "1E-32".parse().unwrap());
        assert_eq!(n.to_string(), "0.00000000000000000000000000000001");
        assert_eq!(n.trunc_i64(), Some(0));
        assert!(n.to_f64() > 0.0);
    }

    #[test]
    fn test_large_float_converts() {
        let n = Numeric::from_f64(1e300).unwrap();
        assert!(n.is_finite());
        assert_eq!(n.to_f64(), 1e300);
        assert_eq!(Numeric::from_f64(-1e-300).unwrap().to_f64(), -1e-300);
    }

    #[test]
    fn test_place_point() {
        assert_eq!(place_point("12345", 2), "123.45");
        assert_eq!(place_point("5", 3), "0.005");
        assert_eq!(place_point("12", -2), "1200");
        assert_eq!(place_point("0", -5), "0");
    }
}
