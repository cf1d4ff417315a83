//! Oracle NUMBER encoding and decoding
//!
//! Oracle NUMBER is stored in a variable-length format:
//! - First byte: exponent (with sign encoding)
//! - Subsequent bytes: mantissa digits in base-100
//!
//! For positive numbers the exponent byte has the high bit set and mantissa
//! bytes are `digit + 1`. Negative numbers invert the exponent byte, store
//! `101 - digit`, and end with a 102 terminator unless all 20 mantissa bytes
//! are used.

use std::str::FromStr;

use super::Numeric;
use crate::error::{Error, Result};

/// Maximum number of decimal digits in an Oracle NUMBER
const MAX_DIGITS: usize = 40;

/// Maximum characters accepted in a number string
const MAX_STRING_CHARS: usize = 172;

/// Decoded Oracle NUMBER in canonical text form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleNumber {
    /// Canonical text, `.` as decimal separator, no exponent
    pub value: String,
    /// Whether the number has no fractional part
    pub is_integer: bool,
    /// Whether this is the reserved -1e126 value
    pub is_max_negative: bool,
}

impl OracleNumber {
    /// Create from canonical text
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        let is_integer = !value.contains('.');
        Self {
            value,
            is_integer,
            is_max_negative: false,
        }
    }

    /// Get the canonical text
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Convert to i64, failing when the value has a fraction or overflows
    pub fn to_i64(&self) -> Result<i64> {
        if self.is_max_negative {
            return Err(Error::DataConversionError(
                "maximum negative Oracle number cannot be represented as i64".to_string(),
            ));
        }
        self.value
            .parse()
            .map_err(|e| Error::DataConversionError(format!("cannot parse {} as i64: {}", self.value, e)))
    }

    /// Convert to f64
    pub fn to_f64(&self) -> Result<f64> {
        if self.is_max_negative {
            return Ok(-1e126);
        }
        self.value
            .parse()
            .map_err(|e| Error::DataConversionError(format!("cannot parse {} as f64: {}", self.value, e)))
    }

    /// Convert to a decimal at the full 38-digit precision
    pub fn to_numeric(&self) -> Result<Numeric> {
        if self.is_max_negative {
            return Numeric::from_str("-1E126");
        }
        Numeric::from_str(&self.value)
    }

    /// Render the way Oracle's default number-to-text conversion does:
    /// session decimal character, no leading zero before the separator.
    pub fn to_text(&self, decimal_char: char) -> String {
        if self.is_max_negative {
            return "-1E+126".to_string();
        }
        let (sign, digits) = match self.value.strip_prefix('-') {
            Some(rest) => ("-", rest),
            None => ("", self.value.as_str()),
        };
        let digits = match digits.strip_prefix("0.") {
            Some(fraction) => format!(".{}", fraction),
            None => digits.to_string(),
        };
        format!("{}{}", sign, digits.replace('.', &decimal_char.to_string()))
    }
}

/// Decode an Oracle NUMBER from wire format bytes
pub fn decode_oracle_number(data: &[u8]) -> Result<OracleNumber> {
    let (&exponent_byte, mantissa) = data.split_first().ok_or_else(|| {
        Error::DataConversionError("empty data for Oracle NUMBER".to_string())
    })?;
    let is_positive = (exponent_byte & 0x80) != 0;

    let exponent = if is_positive {
        (exponent_byte as i16) - 193
    } else {
        (!exponent_byte as i16) - 193
    };
    let mut decimal_point_index = (exponent * 2 + 2) as i32;

    // A lone exponent byte is zero, or -1e126 when negative
    if mantissa.is_empty() {
        if is_positive {
            return Ok(OracleNumber::new("0"));
        }
        return Ok(OracleNumber {
            value: String::new(),
            is_integer: false,
            is_max_negative: true,
        });
    }

    let mantissa = if !is_positive && mantissa.last() == Some(&102) {
        &mantissa[..mantissa.len() - 1]
    } else {
        mantissa
    };

    let mut digits: Vec<u8> = Vec::with_capacity(MAX_DIGITS);
    for (i, &byte) in mantissa.iter().enumerate() {
        let pair = if is_positive {
            byte.wrapping_sub(1)
        } else {
            101u8.wrapping_sub(byte)
        };

        let high = pair / 10;
        if high == 0 && digits.is_empty() {
            decimal_point_index -= 1;
        } else if high == 10 {
            digits.push(1);
            digits.push(0);
            decimal_point_index += 1;
        } else {
            digits.push(high);
        }

        let low = pair % 10;
        if low != 0 || i < mantissa.len() - 1 {
            digits.push(low);
        }
    }

    while digits.last() == Some(&0) && (digits.len() as i32) > decimal_point_index {
        digits.pop();
    }

    let mut text = String::with_capacity(MAX_STRING_CHARS);
    if !is_positive {
        text.push('-');
    }

    let is_integer;
    if decimal_point_index <= 0 {
        is_integer = false;
        text.push_str("0.");
        for _ in decimal_point_index..0 {
            text.push('0');
        }
        text.extend(digits.iter().map(|d| char::from(b'0' + d)));
    } else {
        is_integer = decimal_point_index as usize >= digits.len();
        for (i, d) in digits.iter().enumerate() {
            if i > 0 && i as i32 == decimal_point_index {
                text.push('.');
            }
            text.push(char::from(b'0' + d));
        }
        for _ in digits.len()..decimal_point_index as usize {
            text.push('0');
        }
    }

    if text.is_empty() || text == "-" {
        text = "0".to_string();
    }

    Ok(OracleNumber {
        value: text,
        is_integer,
        is_max_negative: false,
    })
}

/// Encode a number string to Oracle NUMBER wire format
///
/// Accepts an optional sign, digits, an optional `.` fraction and an
/// optional `e`/`E` exponent.
pub fn encode_oracle_number(value: &str) -> Result<Vec<u8>> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::DataConversionError(
            "empty string cannot be encoded as Oracle NUMBER".to_string(),
        ));
    }
    if value.len() > MAX_STRING_CHARS {
        return Err(Error::DataConversionError(
            "number string too long for Oracle NUMBER".to_string(),
        ));
    }

    let (is_negative, unsigned) = match value.as_bytes()[0] {
        b'-' => (true, &value[1..]),
        b'+' => (false, &value[1..]),
        _ => (false, value),
    };
    let (mantissa_text, exponent_text) = match unsigned.find(|c: char| c == 'e' || c == 'E') {
        Some(pos) => (&unsigned[..pos], Some(&unsigned[pos + 1..])),
        None => (unsigned, None),
    };
    let (int_text, frac_text) = match mantissa_text.find('.') {
        Some(pos) => (&mantissa_text[..pos], &mantissa_text[pos + 1..]),
        None => (mantissa_text, ""),
    };
    if int_text.is_empty() && frac_text.is_empty() {
        return Err(Error::DataConversionError(format!("invalid number: {}", value)));
    }

    let mut digits: Vec<u8> = Vec::with_capacity(MAX_DIGITS);
    for b in int_text.bytes() {
        let digit = ascii_digit(b)?;
        if digit != 0 || !digits.is_empty() {
            digits.push(digit);
        }
    }
    let mut decimal_point_index = digits.len() as i32;
    for b in frac_text.bytes() {
        let digit = ascii_digit(b)?;
        if digit == 0 && digits.is_empty() {
            decimal_point_index -= 1;
        } else {
            digits.push(digit);
        }
    }

    if let Some(exp) = exponent_text {
        let exp: i32 = exp
            .parse()
            .map_err(|_| Error::DataConversionError(format!("invalid exponent in {}", value)))?;
        decimal_point_index += exp;
    }

    while digits.last() == Some(&0) {
        digits.pop();
    }

    if digits.is_empty() {
        return Ok(vec![128]);
    }
    if digits.len() > MAX_DIGITS || decimal_point_index > 126 || decimal_point_index < -129 {
        return Err(Error::DataConversionError(format!(
            "{} is out of range for Oracle NUMBER",
            value
        )));
    }

    // An odd decimal point position puts a lone digit in the first pair
    let prepend_zero = decimal_point_index.rem_euclid(2) == 1;
    if prepend_zero {
        digits.push(0);
        decimal_point_index += 1;
    }
    if digits.len() % 2 == 1 {
        digits.push(0);
    }

    let num_pairs = digits.len() / 2;
    let mut encoded = Vec::with_capacity(num_pairs + 2);

    let exponent_on_wire = ((decimal_point_index / 2) + 192) as u8;
    encoded.push(if is_negative {
        !exponent_on_wire
    } else {
        exponent_on_wire
    });

    let mut pos = 0;
    for pair_num in 0..num_pairs {
        let pair = if pair_num == 0 && prepend_zero {
            pos += 1;
            digits[0]
        } else {
            let v = digits[pos] * 10 + digits[pos + 1];
            pos += 2;
            v
        };
        encoded.push(if is_negative { 101 - pair } else { pair + 1 });
    }

    if is_negative && num_pairs < 20 {
        encoded.push(102);
    }

    Ok(encoded)
}

/// Encode a finite f64 as an Oracle NUMBER
pub fn encode_f64_number(value: f64) -> Result<Vec<u8>> {
    if !value.is_finite() {
        return Err(Error::oracle(
            crate::error::code::NUMERIC_OVERFLOW,
            "numeric overflow",
        ));
    }
    encode_oracle_number(&format!("{:e}", value))
}

fn ascii_digit(b: u8) -> Result<u8> {
    if b.is_ascii_digit() {
        Ok(b - b'0')
    } else {
        Err(Error::DataConversionError(format!(
            "invalid character '{}' in number",
            char::from(b)
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn roundtrip(text: &str) -> String {
        let encoded = encode_oracle_number(text).unwrap();
        decode_oracle_number(&encoded).unwrap().value
    }

    #[test]
    fn test_decode_zero() {
        let num = decode_oracle_number(&[128]).unwrap();
        assert_eq!(num.value, "0");
        assert!(num.is_integer);
    }

    #[test]
    fn test_decode_known_bytes() {
        let num = decode_oracle_number(&[0xc2, 0x02, 0x18]).unwrap();
        assert_eq!(num.value, "123");
        assert!(num.is_integer);

        let num = decode_oracle_number(&[0x3d, 0x64, 0x4e, 0x66]).unwrap();
        assert_eq!(num.value, "-123");

        let num = decode_oracle_number(&[0xc1, 0x02, 0x33]).unwrap();
        assert_eq!(num.value, "1.5");
        assert!(!num.is_integer);
    }

    #[test]
    fn test_encode_wire_layout() {
        assert_eq!(encode_oracle_number("0").unwrap(), vec![0x80]);
        assert_eq!(encode_oracle_number("100").unwrap(), vec![0xc2, 0x02]);
        assert_eq!(encode_oracle_number("1234").unwrap(), vec![0xc2, 13, 35]);
        assert_eq!(encode_oracle_number("0.1").unwrap(), vec![0xc0, 11]);
        assert_eq!(*encode_oracle_number("-5").unwrap().last().unwrap(), 102);
    }

    #[test]
    fn test_roundtrip_values() {
        for (input, expected) in [
            ("1", "1"),
            ("-99", "-99"),
            ("1.1", "1.1"),
            ("0.1", "0.1"),
            ("-0.25", "-0.25"),
            ("45.0", "45"),
            ("14.85", "14.85"),
            ("1.5e10", "15000000000"),
            ("2.5E-3", "0.0025"),
            ("9999999999999999999", "9999999999999999999"),
        ] {
            assert_eq!(roundtrip(input), expected, "roundtrip of {}", input);
        }
    }

    #[test]
    fn test_encode_f64() {
        let encoded = encode_f64_number(45.68392).unwrap();
        assert_eq!(decode_oracle_number(&encoded).unwrap().value, "45.68392");
        let err = encode_f64_number(f64::INFINITY).unwrap_err();
        assert_eq!(err.oracle_code(), Some(1426));
    }

    #[test]
    fn test_invalid_input() {
        assert!(encode_oracle_number("").is_err());
        assert!(encode_oracle_number("12a").is_err());
        assert!(encode_oracle_number(".").is_err());
        assert!(encode_oracle_number("1e200").is_err());
    }

    #[test]
    fn test_conversions() {
        let num = OracleNumber::new("12345");
        assert_eq!(num.to_i64().unwrap(), 12345);
        assert_eq!(num.to_numeric().unwrap(), Numeric::Finite(Decimal::from(12345)));
        let wide = OracleNumber::new("12345678901234567890123456789012345678");
        assert_eq!(wide.to_numeric().unwrap().to_string(), wide.value);
        assert!(OracleNumber::new("3.5").to_i64().is_err());
        assert!((OracleNumber::new("3.14").to_f64().unwrap() - 3.14).abs() < 1e-9);
    }

    #[test]
    fn test_to_text_uses_session_separator() {
        assert_eq!(OracleNumber::new("1.1").to_text(','), "1,1");
        assert_eq!(OracleNumber::new("0.1").to_text('.'), ".1");
        assert_eq!(OracleNumber::new("-0.5").to_text(','), "-,5");
        assert_eq!(OracleNumber::new("15").to_text(','), "15");
    }
}
